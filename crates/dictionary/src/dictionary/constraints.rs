use {
    super::{not_found, uuid_equals, DataDictionary},
    crate::{
        catalog::{checks, constraints, foreign_keys, keys, CatalogNumber, RowFactory},
        descriptor::{
            ConstraintDescriptor, ConstraintKind, ConstraintType, SchemaDescriptor, SubConstraint,
            TableDescriptor,
        },
        error::{ConstraintReferencedSnafu, InternalSnafu, ObjectKind, Result},
        tab_info::ReadMode,
    },
    access::{Qualifiers, Transaction},
    def::{Row, Uuid, Value},
    snafu::OptionExt,
    std::sync::Arc,
    tracing::debug,
};

/// What dropping a referenced key does to the foreign keys pointing at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropBehavior {
    /// Refuse while any foreign key references the key.
    Restrict,
    /// Drop the referencing foreign keys first.
    Cascade,
}

/// The secondary catalog holding a constraint type's detail. Every one of
/// them keeps CONSTRAINTID first and indexes it first.
fn sub_catalog(ty: ConstraintType) -> CatalogNumber {
    match ty {
        ConstraintType::PrimaryKey | ConstraintType::Unique => CatalogNumber::Syskeys,
        ConstraintType::ForeignKey => CatalogNumber::Sysforeignkeys,
        ConstraintType::Check => CatalogNumber::Syschecks,
    }
}

const SUB_BY_CONSTRAINT: usize = 0;

impl DataDictionary {
    /// Records a constraint and its type specific row. A foreign key also
    /// bumps the reference count of the key it references.
    pub fn add_constraint_descriptor(
        &self,
        tc: &Transaction,
        cd: &ConstraintDescriptor,
    ) -> Result<()> {
        let row = constraints::SysConstraintsFactory::make_row(Some(cd), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysconstraints,
            row,
            ObjectKind::Constraint,
            &cd.name,
            &cd.schema_id.to_string(),
        )?;

        let sub = cd.sub_constraint();
        let (number, row) = match &sub {
            SubConstraint::Key(key) => (
                CatalogNumber::Syskeys,
                keys::SysKeysFactory::make_row(Some(key), None)?,
            ),
            SubConstraint::ForeignKey(fk) => (
                CatalogNumber::Sysforeignkeys,
                foreign_keys::SysForeignKeysFactory::make_row(Some(fk), None)?,
            ),
            SubConstraint::Check(check) => (
                CatalogNumber::Syschecks,
                checks::SysChecksFactory::make_row(Some(check), None)?,
            ),
        };
        self.insert_catalog_row(
            tc,
            number,
            row,
            ObjectKind::Constraint,
            &cd.name,
            &cd.schema_id.to_string(),
        )?;

        if let ConstraintKind::ForeignKey(fk) = &cd.kind {
            let count = self.adjust_reference_count(tc, fk.referenced_constraint_id, 1)?;
            debug!(key = %fk.referenced_constraint_id, count, "foreign key added");
        }
        Ok(())
    }

    /// Adds `delta` to the stored reference count of a key constraint and
    /// returns the new count.
    fn adjust_reference_count(&self, tc: &Transaction, key_id: Uuid, delta: i32) -> Result<i32> {
        let mut count = 0;
        let updated = self.catalog(tc, CatalogNumber::Sysconstraints)?.update_rows(
            tc,
            constraints::BY_ID,
            vec![Value::Uuid(key_id)],
            &Qualifiers::none(),
            |row| {
                let stored = row[constraints::REFERENCECOUNT - 1].as_i64().unwrap_or(0) as i32;
                count = stored + delta;
                row[constraints::REFERENCECOUNT - 1] = Value::Int(count);
                Ok(())
            },
        )?;
        if updated == 0 {
            return Err(not_found(ObjectKind::Constraint, key_id.to_string()));
        }
        Ok(count)
    }

    /// The type specific detail of a constraint.
    pub fn get_sub_key_constraint(
        &self,
        tc: &Transaction,
        constraint_id: Uuid,
        ty: ConstraintType,
    ) -> Result<Option<SubConstraint>> {
        let key = vec![Value::Uuid(constraint_id)];
        Ok(match ty {
            ConstraintType::PrimaryKey | ConstraintType::Unique => self
                .descriptor_via_index::<keys::SysKeysFactory>(tc, keys::BY_CONSTRAINT, key)?
                .map(SubConstraint::Key),
            ConstraintType::ForeignKey => self
                .descriptor_via_index::<foreign_keys::SysForeignKeysFactory>(
                    tc,
                    foreign_keys::BY_CONSTRAINT,
                    key,
                )?
                .map(SubConstraint::ForeignKey),
            ConstraintType::Check => self
                .descriptor_via_index::<checks::SysChecksFactory>(tc, checks::BY_CONSTRAINT, key)?
                .map(SubConstraint::Check),
        })
    }

    fn build_constraint(&self, tc: &Transaction, row: &Row) -> Result<ConstraintDescriptor> {
        let ty = constraints::SysConstraintsFactory::constraint_type(row)?;
        let constraint_id = row[constraints::CONSTRAINTID - 1]
            .as_uuid()
            .context(InternalSnafu {
                details: "constraint row without an id",
            })?;
        let sub = self
            .get_sub_key_constraint(tc, constraint_id, ty)?
            .context(InternalSnafu {
                details: format!("constraint {} has no {:?} row", constraint_id, ty),
            })?;
        constraints::SysConstraintsFactory::build_descriptor(row, Some(&sub))
    }

    fn constraints_via_index(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
    ) -> Result<Vec<ConstraintDescriptor>> {
        self.catalog(tc, CatalogNumber::Sysconstraints)?
            .fetch_via_index(tc, index, key, &Qualifiers::none(), ReadMode::RepeatableRead, false)?
            .iter()
            .map(|(_, row)| self.build_constraint(tc, row))
            .collect()
    }

    pub fn get_constraint_descriptor(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<ConstraintDescriptor>> {
        Ok(self
            .constraints_via_index(tc, constraints::BY_ID, vec![Value::Uuid(uuid)])?
            .into_iter()
            .next())
    }

    pub fn get_constraint_descriptor_by_name(
        &self,
        tc: &Transaction,
        name: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Option<ConstraintDescriptor>> {
        Ok(self
            .constraints_via_index(
                tc,
                constraints::BY_NAME,
                vec![Value::from(name), Value::Uuid(schema.uuid)],
            )?
            .into_iter()
            .next())
    }

    pub fn get_constraint_descriptors(
        &self,
        tc: &Transaction,
        table_id: Uuid,
    ) -> Result<Vec<ConstraintDescriptor>> {
        self.constraints_via_index(tc, constraints::BY_TABLE, vec![Value::Uuid(table_id)])
    }

    /// The enabled constraints of a table.
    pub fn get_active_constraint_descriptors(
        &self,
        tc: &Transaction,
        table_id: Uuid,
    ) -> Result<Vec<ConstraintDescriptor>> {
        let mut list = self.get_constraint_descriptors(tc, table_id)?;
        list.retain(|cd| cd.enabled);
        Ok(list)
    }

    /// The constraint backed by the index with descriptor id `index_id`.
    pub fn get_constraint_descriptor_by_index(
        &self,
        tc: &Transaction,
        td: &TableDescriptor,
        index_id: Uuid,
    ) -> Result<Option<ConstraintDescriptor>> {
        Ok(self
            .get_constraint_descriptors(tc, td.uuid)?
            .into_iter()
            .find(|cd| cd.index_id() == Some(index_id)))
    }

    pub fn get_constraint_table_descriptor(
        &self,
        tc: &Transaction,
        constraint_id: Uuid,
    ) -> Result<Option<Arc<TableDescriptor>>> {
        match self.get_constraint_descriptor(tc, constraint_id)? {
            Some(cd) => self.get_table_descriptor_by_id(tc, cd.table_id),
            None => Ok(None),
        }
    }

    /// Foreign keys referencing a primary key or unique constraint.
    /// SYSFOREIGNKEYS has no index on the referenced key, so this scans.
    pub fn get_foreign_keys(
        &self,
        tc: &Transaction,
        key_id: Uuid,
    ) -> Result<Vec<ConstraintDescriptor>> {
        let rows = self
            .catalog(tc, CatalogNumber::Sysforeignkeys)?
            .fetch_via_heap(tc, uuid_equals(foreign_keys::KEYCONSTRAINTID, key_id), None)?;

        let mut list = Vec::with_capacity(rows.len());
        for (_, row) in rows {
            let fk = foreign_keys::SysForeignKeysFactory::build_descriptor(&row, None)?;
            let cd = self
                .get_constraint_descriptor(tc, fk.constraint_id)?
                .context(InternalSnafu {
                    details: format!("foreign key {} has no SYSCONSTRAINTS row", fk.constraint_id),
                })?;
            list.push(cd);
        }
        Ok(list)
    }

    /// One column of the SYSCONSTRAINTS rows whose `index` key (BY_ID or
    /// BY_TABLE) is `uuid`.
    pub fn get_constraints(
        &self,
        tc: &Transaction,
        uuid: Uuid,
        index: usize,
        column: usize,
    ) -> Result<Vec<Value>> {
        snafu::ensure!(
            index == constraints::BY_ID || index == constraints::BY_TABLE,
            InternalSnafu {
                details: format!("SYSCONSTRAINTS index {} is not keyed by a UUID", index),
            }
        );
        snafu::ensure!(
            (1..=constraints::DEF.column_count()).contains(&column),
            InternalSnafu {
                details: format!("SYSCONSTRAINTS has no column {}", column),
            }
        );

        Ok(self
            .catalog(tc, CatalogNumber::Sysconstraints)?
            .fetch_via_index(
                tc,
                index,
                vec![Value::Uuid(uuid)],
                &Qualifiers::none(),
                ReadMode::RepeatableRead,
                false,
            )?
            .into_iter()
            .map(|(_, mut row)| row.swap_remove(column - 1))
            .collect())
    }

    /// Renames, enables or disables a constraint. The id, the owning table
    /// and the type specific row never change.
    pub fn update_constraint_descriptor(
        &self,
        tc: &Transaction,
        cd: &ConstraintDescriptor,
    ) -> Result<()> {
        let new_row = constraints::SysConstraintsFactory::make_row(Some(cd), None)?;
        let updated = self.catalog(tc, CatalogNumber::Sysconstraints)?.update_rows(
            tc,
            constraints::BY_ID,
            vec![Value::Uuid(cd.uuid)],
            &Qualifiers::none(),
            |row| {
                for column in [constraints::CONSTRAINTNAME, constraints::STATE] {
                    row[column - 1] = new_row[column - 1].clone();
                }
                Ok(())
            },
        )?;
        if updated == 0 {
            return Err(not_found(ObjectKind::Constraint, cd.name.as_str()));
        }
        Ok(())
    }

    /// Drops a constraint and its type specific row. Dropping a referenced
    /// key fails under `Restrict` and drops the foreign keys first under
    /// `Cascade`.
    pub fn drop_constraint_descriptor(
        &self,
        tc: &Transaction,
        cd: &ConstraintDescriptor,
        behavior: DropBehavior,
    ) -> Result<()> {
        if cd.is_referenced_key() {
            let stored = self
                .get_constraint_descriptor(tc, cd.uuid)?
                .map(|c| c.reference_count())
                .unwrap_or(0);
            if stored > 0 {
                match behavior {
                    DropBehavior::Restrict => {
                        return ConstraintReferencedSnafu {
                            name: cd.name.clone(),
                            count: stored,
                        }
                        .fail()
                    }
                    DropBehavior::Cascade => {
                        for fk in self.get_foreign_keys(tc, cd.uuid)? {
                            self.drop_constraint_descriptor(tc, &fk, DropBehavior::Restrict)?;
                        }
                    }
                }
            }
        }

        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysconstraints,
            constraints::BY_ID,
            vec![Value::Uuid(cd.uuid)],
        )?;
        if deleted == 0 {
            return Err(not_found(ObjectKind::Constraint, cd.name.as_str()));
        }
        self.delete_via_index(
            tc,
            sub_catalog(cd.constraint_type()),
            SUB_BY_CONSTRAINT,
            vec![Value::Uuid(cd.uuid)],
        )?;

        if let ConstraintKind::ForeignKey(fk) = &cd.kind {
            let count = self.adjust_reference_count(tc, fk.referenced_constraint_id, -1)?;
            debug!(key = %fk.referenced_constraint_id, count, "foreign key dropped");
        }
        Ok(())
    }

    /// Drops every constraint of a table, foreign keys first so the keys
    /// they reference are no longer counted as referenced.
    pub fn drop_all_constraint_descriptors(&self, tc: &Transaction, table_id: Uuid) -> Result<()> {
        let (foreign, other): (Vec<_>, Vec<_>) = self
            .get_constraint_descriptors(tc, table_id)?
            .into_iter()
            .partition(|cd| cd.constraint_type() == ConstraintType::ForeignKey);

        for cd in foreign.iter().chain(&other) {
            self.drop_constraint_descriptor(tc, cd, DropBehavior::Restrict)?;
        }
        Ok(())
    }
}

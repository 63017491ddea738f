use {
    super::{not_found, DataDictionary},
    crate::{
        catalog::{columns, CatalogNumber, RowFactory, RowReader},
        descriptor::{ColumnDescriptor, TableDescriptor},
        error::{InternalSnafu, ObjectKind, Result, SequenceExhaustedSnafu},
        generator::{GeneratorTarget, SequenceGenerator},
        tab_info::ReadMode,
    },
    access::{Qualifiers, RowLocation, Transaction},
    def::{Row, Uuid, Value},
    snafu::OptionExt,
    tracing::debug,
};

impl DataDictionary {
    /// Records the columns of a table, or the parameters of a stored
    /// statement.
    pub fn add_column_descriptors(
        &self,
        tc: &Transaction,
        columns: &[ColumnDescriptor],
    ) -> Result<()> {
        for cd in columns {
            let row = columns::SysColumnsFactory::make_row(Some(cd), None)?;
            self.insert_catalog_row(
                tc,
                CatalogNumber::Syscolumns,
                row,
                ObjectKind::Column,
                &cd.name,
                &cd.reference_id.to_string(),
            )?;
            self.evict_table(cd.reference_id);
        }
        Ok(())
    }

    /// Columns of a table or parameters of a statement, by position.
    pub fn get_column_descriptors(
        &self,
        tc: &Transaction,
        reference_id: Uuid,
    ) -> Result<Vec<ColumnDescriptor>> {
        let mut columns = self.descriptors_via_index::<columns::SysColumnsFactory>(
            tc,
            columns::BY_NAME,
            vec![Value::Uuid(reference_id)],
        )?;
        columns.sort_by_key(|cd| cd.position);
        Ok(columns)
    }

    /// The column whose default has the given id. Dependencies name
    /// defaults by this id.
    pub fn get_column_descriptor_by_default_id(
        &self,
        tc: &Transaction,
        default_id: Uuid,
    ) -> Result<Option<ColumnDescriptor>> {
        self.descriptor_via_index::<columns::SysColumnsFactory>(
            tc,
            columns::BY_DEFAULT_ID,
            vec![Value::Uuid(default_id)],
        )
    }

    pub fn drop_column_descriptor(
        &self,
        tc: &Transaction,
        reference_id: Uuid,
        name: &str,
    ) -> Result<()> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Syscolumns,
            columns::BY_NAME,
            column_key(reference_id, name),
        )?;
        self.evict_table(reference_id);
        if deleted == 0 {
            return Err(not_found(ObjectKind::Column, name));
        }
        Ok(())
    }

    pub fn drop_all_column_descriptors(
        &self,
        tc: &Transaction,
        reference_id: Uuid,
    ) -> Result<usize> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Syscolumns,
            columns::BY_NAME,
            vec![Value::Uuid(reference_id)],
        )?;
        self.evict_table(reference_id);
        Ok(deleted)
    }

    /// Rewrites a column, possibly renaming or renumbering it.
    pub fn update_column_descriptor(
        &self,
        tc: &Transaction,
        reference_id: Uuid,
        former_name: &str,
        cd: &ColumnDescriptor,
    ) -> Result<()> {
        let new_row = columns::SysColumnsFactory::make_row(Some(cd), None)?;
        let updated = self.catalog(tc, CatalogNumber::Syscolumns)?.update_rows(
            tc,
            columns::BY_NAME,
            column_key(reference_id, former_name),
            &Qualifiers::none(),
            |row| {
                *row = new_row.clone();
                Ok(())
            },
        )?;
        self.evict_table(reference_id);
        if updated == 0 {
            return Err(not_found(ObjectKind::Column, former_name));
        }
        Ok(())
    }

    /// Reads the next identity value stored at `location` in SYSCOLUMNS
    /// and, with `update`, advances the stored value by the increment. The
    /// value before the advance is returned.
    pub fn get_set_autoincrement_value(
        &self,
        tc: &Transaction,
        location: RowLocation,
        update: bool,
    ) -> Result<i64> {
        let _gate = self.generator_gate.lock();
        let ti = self.catalog(tc, CatalogNumber::Syscolumns)?;
        let fetch = || -> Result<Row> {
            ti.fetch_row(tc, location)?.context(InternalSnafu {
                details: format!("no SYSCOLUMNS row at {:?}", location),
            })
        };
        let mut old = fetch()?;
        // a cached generator may hold a newer value than the row
        let table_id = RowReader::new(&columns::DEF, &old).uuid(columns::REFERENCEID)?;
        if self.flush_cached_generator(&self.identities, &table_id)? {
            old = fetch()?;
        }
        let (current, increment) = identity_state(&old)?;
        let current = current.context(SequenceExhaustedSnafu {
            name: identity_name(&old),
        })?;

        if update {
            let mut new = old.clone();
            new[columns::AUTOINCREMENTVALUE - 1] = current
                .checked_add(increment)
                .map_or(Value::Null, Value::BigInt);
            ti.update_row(tc, location, &old, new)?;
        }
        Ok(current)
    }

    /// Stores `value` as the next identity value of a column, or the value
    /// after it when `increment_first` is set.
    pub fn set_autoincrement_value(
        &self,
        tc: &Transaction,
        table_id: Uuid,
        column: &str,
        value: i64,
        increment_first: bool,
    ) -> Result<()> {
        let _gate = self.generator_gate.lock();
        if let Some(generator) = self.identities.remove(&table_id) {
            generator.retire();
        }
        let updated = self.catalog(tc, CatalogNumber::Syscolumns)?.update_rows(
            tc,
            columns::BY_NAME,
            column_key(table_id, column),
            &Qualifiers::none(),
            |row| {
                let (_, increment) = identity_state(row)?;
                let next = if increment_first {
                    value.checked_add(increment)
                } else {
                    Some(value)
                };
                row[columns::AUTOINCREMENTVALUE - 1] = next.map_or(Value::Null, Value::BigInt);
                Ok(())
            },
        )?;
        self.evict_table(table_id);
        if updated == 0 {
            return Err(not_found(ObjectKind::Column, column));
        }
        Ok(())
    }

    /// SYSCOLUMNS locations of a table's identity columns, indexed by
    /// column position - 1. Other columns map to `None`.
    pub fn compute_autoinc_row_locations(
        &self,
        tc: &Transaction,
        td: &TableDescriptor,
    ) -> Result<Vec<Option<RowLocation>>> {
        let ti = self.catalog(tc, CatalogNumber::Syscolumns)?;
        let mut locations = vec![None; td.max_column_position() as usize];
        for cd in td.columns.iter().filter(|cd| cd.is_auto_increment()) {
            locations[cd.position as usize - 1] =
                ti.row_location(tc, columns::BY_NAME, column_key(td.uuid, &cd.name))?;
        }
        Ok(locations)
    }

    /// Next value of a table's identity column. Values are handed out from
    /// a cached generator that reserves ranges in SYSCOLUMNS.
    pub fn get_next_identity_value(&self, tc: &Transaction, table_id: Uuid) -> Result<i64> {
        self.next_generated_value(tc, &self.identities, table_id, || {
            self.identity_generator(tc, table_id)
        })
    }

    fn identity_generator(&self, tc: &Transaction, table_id: Uuid) -> Result<SequenceGenerator> {
        let rows = self.catalog(tc, CatalogNumber::Syscolumns)?.fetch_via_index(
            tc,
            columns::BY_NAME,
            vec![Value::Uuid(table_id)],
            &Qualifiers::none(),
            ReadMode::RepeatableRead,
            false,
        )?;
        let mut identity = None;
        for (_, row) in rows {
            let cd = columns::SysColumnsFactory::build_descriptor(&row, None)?;
            if cd.is_auto_increment() {
                identity = Some((cd, row));
                break;
            }
        }
        let (cd, row) = identity.ok_or_else(|| {
            not_found(ObjectKind::Column, format!("identity column of {}", table_id))
        })?;

        let (current, increment) = identity_state(&row)?;
        let ColumnDescriptor {
            name,
            type_descriptor: ty,
            ..
        } = cd;
        debug!(table = %table_id, column = %name, ?current, "created identity generator");

        SequenceGenerator::new(
            name.clone(),
            GeneratorTarget::Identity {
                table_id,
                column: name,
            },
            current,
            increment,
            ty.min_value().unwrap_or(i64::MIN),
            ty.max_value().unwrap_or(i64::MAX),
            false,
        )
    }

    /// Writes AUTOINCREMENTVALUE for an identity generator.
    pub(super) fn write_identity_value(
        &self,
        tc: &Transaction,
        table_id: Uuid,
        column: &str,
        stored: Option<i64>,
    ) -> Result<()> {
        let updated = self.catalog(tc, CatalogNumber::Syscolumns)?.update_rows(
            tc,
            columns::BY_NAME,
            column_key(table_id, column),
            &Qualifiers::none(),
            |row| {
                row[columns::AUTOINCREMENTVALUE - 1] = stored.map_or(Value::Null, Value::BigInt);
                Ok(())
            },
        )?;
        if updated == 0 {
            return Err(not_found(ObjectKind::Column, column));
        }
        self.evict_table(table_id);
        Ok(())
    }
}

fn column_key(reference_id: Uuid, name: &str) -> Row {
    vec![Value::Uuid(reference_id), Value::from(name)]
}

/// Stored next value (`None` once exhausted) and increment of an identity
/// column row.
fn identity_state(row: &[Value]) -> Result<(Option<i64>, i64)> {
    let r = RowReader::new(&columns::DEF, row);
    let increment = r
        .opt_i64(columns::AUTOINCREMENTINC)?
        .filter(|&increment| increment != 0)
        .context(InternalSnafu {
            details: format!("{} is not an identity column", identity_name(row)),
        })?;
    Ok((r.opt_i64(columns::AUTOINCREMENTVALUE)?, increment))
}

fn identity_name(row: &[Value]) -> String {
    row.get(columns::COLUMNNAME - 1)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_owned()
}

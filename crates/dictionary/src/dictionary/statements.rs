use {
    super::{not_found, DataDictionary},
    crate::{
        catalog::{statements, CatalogNumber, RowFactory},
        descriptor::{ColumnDescriptor, SchemaDescriptor, SpsDescriptor, TableKey},
        error::{ObjectKind, Result},
    },
    access::{Qualifiers, Transaction},
    def::{TypeDescriptor, Uuid, Value},
    tracing::debug,
};

impl DataDictionary {
    /// Records a stored statement with its parameters.
    pub fn add_sps_descriptor(&self, tc: &Transaction, sps: &SpsDescriptor) -> Result<()> {
        let row = statements::SysStatementsFactory::make_row(Some(sps), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysstatements,
            row,
            ObjectKind::Statement,
            &sps.name,
            &sps.schema_id.to_string(),
        )?;
        self.add_sps_params(tc, sps)?;
        self.evict_sps(sps.uuid);
        Ok(())
    }

    fn add_sps_params(&self, tc: &Transaction, sps: &SpsDescriptor) -> Result<()> {
        let params = sps
            .params
            .iter()
            .enumerate()
            .map(|(i, ty)| {
                ColumnDescriptor::new(sps.uuid, SpsDescriptor::param_name(i + 1), i as u32 + 1, *ty)
            })
            .collect::<Vec<_>>();
        self.add_column_descriptors(tc, &params)
    }

    fn evict_sps(&self, uuid: Uuid) {
        self.sps_by_id.remove(&uuid);
        self.sps_by_name.retain(|_, sps| sps.uuid != uuid);
    }

    pub fn get_sps_descriptor(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<SpsDescriptor>> {
        let trusted = self.caches_trusted();
        if trusted {
            if let Some(sps) = self.sps_by_id.get(&uuid) {
                return Ok(Some(sps));
            }
        }

        let found = self.descriptor_via_index::<statements::SysStatementsFactory>(
            tc,
            statements::BY_ID,
            vec![Value::Uuid(uuid)],
        )?;
        let Some(mut sps) = found else {
            return Ok(None);
        };
        sps.params = self.get_sps_params(tc, &sps)?;

        if trusted {
            self.sps_by_id.put(uuid, sps.clone());
        }
        Ok(Some(sps))
    }

    pub fn get_sps_descriptor_by_name(
        &self,
        tc: &Transaction,
        name: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Option<SpsDescriptor>> {
        let key = TableKey::new(schema.uuid, name);
        let trusted = self.caches_trusted();
        if trusted {
            if let Some(sps) = self.sps_by_name.get(&key) {
                return Ok(Some(sps));
            }
        }

        let found = self.descriptor_via_index::<statements::SysStatementsFactory>(
            tc,
            statements::BY_NAME,
            vec![Value::from(name), Value::Uuid(schema.uuid)],
        )?;
        let Some(mut sps) = found else {
            return Ok(None);
        };
        sps.params = self.get_sps_params(tc, &sps)?;

        if trusted {
            self.sps_by_name.put(key, sps.clone());
        }
        Ok(Some(sps))
    }

    /// Parameter types of a stored statement, by position.
    pub fn get_sps_params(
        &self,
        tc: &Transaction,
        sps: &SpsDescriptor,
    ) -> Result<Vec<TypeDescriptor>> {
        Ok(self
            .get_column_descriptors(tc, sps.uuid)?
            .into_iter()
            .map(|cd| cd.type_descriptor)
            .collect())
    }

    /// Writes a statement back after it was (re)compiled or invalidated.
    /// With `recompile` the parameter rows are replaced too.
    pub fn update_sps(&self, tc: &Transaction, sps: &SpsDescriptor, recompile: bool) -> Result<()> {
        let new_row = statements::SysStatementsFactory::make_row(Some(sps), None)?;
        let updated = self.catalog(tc, CatalogNumber::Sysstatements)?.update_rows(
            tc,
            statements::BY_ID,
            vec![Value::Uuid(sps.uuid)],
            &Qualifiers::none(),
            |row| {
                *row = new_row.clone();
                Ok(())
            },
        )?;
        if updated == 0 {
            return Err(not_found(ObjectKind::Statement, sps.name.as_str()));
        }

        if recompile {
            self.drop_all_column_descriptors(tc, sps.uuid)?;
            self.add_sps_params(tc, sps)?;
        }
        self.evict_sps(sps.uuid);
        debug!(statement = %sps.name, recompile, "updated stored statement");
        Ok(())
    }

    /// Marks every stored plan invalid, e.g. after the engine version
    /// changed. Plans are rebuilt on next execution.
    pub fn invalidate_all_sps_plans(&self, tc: &Transaction) -> Result<usize> {
        let ti = self.catalog(tc, CatalogNumber::Sysstatements)?;
        let rows = ti.fetch_via_heap(tc, Qualifiers::none(), None)?;
        for (location, old) in &rows {
            let mut new = old.clone();
            new[statements::VALID - 1] = Value::Boolean(false);
            new[statements::CONSTANTSTATE - 1] = Value::Null;
            ti.update_row(tc, *location, old, new)?;
        }

        self.sps_by_id.drain();
        self.sps_by_name.drain();
        debug!(count = rows.len(), "invalidated stored plans");
        Ok(rows.len())
    }

    pub fn drop_sps_descriptor(&self, tc: &Transaction, uuid: Uuid) -> Result<()> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysstatements,
            statements::BY_ID,
            vec![Value::Uuid(uuid)],
        )?;
        self.drop_all_column_descriptors(tc, uuid)?;
        self.evict_sps(uuid);
        if deleted == 0 {
            return Err(not_found(ObjectKind::Statement, uuid.to_string()));
        }
        Ok(())
    }

    pub fn get_all_sps_descriptors(&self, tc: &Transaction) -> Result<Vec<SpsDescriptor>> {
        let mut list =
            self.descriptors_via_heap::<statements::SysStatementsFactory>(tc, Qualifiers::none())?;
        for sps in &mut list {
            sps.params = self.get_sps_params(tc, sps)?;
        }
        Ok(list)
    }
}

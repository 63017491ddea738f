use {
    super::{not_found, uuid_equals, DataDictionary},
    crate::{
        catalog::{conglomerates, tables, CatalogNumber, RowFactory},
        descriptor::{
            ConglomerateDescriptor, LockGranularity, SchemaDescriptor, TableDescriptor, TableKey,
        },
        error::{ObjectKind, Result},
        tab_info::ReadMode,
    },
    access::{ConglomerateId, Qualifiers, Transaction},
    def::{Uuid, Value},
    std::{collections::HashMap, sync::Arc},
    tracing::debug,
};

impl DataDictionary {
    /// Looks a table, view or synonym up by name. The descriptor comes with
    /// its columns and conglomerates.
    pub fn get_table_descriptor(
        &self,
        tc: &Transaction,
        name: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Option<Arc<TableDescriptor>>> {
        let key = TableKey::new(schema.uuid, name);
        let trusted = self.caches_trusted();
        if trusted {
            if let Some(td) = self.tables_by_name.get(&key) {
                return Ok(Some(td));
            }
        }

        let found = self
            .fetch_descriptors::<tables::SysTablesFactory>(
                tc,
                tables::BY_NAME,
                vec![Value::from(name), Value::Uuid(schema.uuid)],
                &Qualifiers::none(),
                Some(schema),
                ReadMode::RepeatableRead,
            )?
            .into_iter()
            .next();
        let Some(td) = found else {
            return Ok(None);
        };

        let td = Arc::new(self.complete_table_descriptor(tc, td)?);
        if trusted {
            self.tables_by_name.put(key, td.clone());
            self.add_table_descriptor_to_other_cache(td.clone(), true);
        }
        Ok(Some(td))
    }

    pub fn get_table_descriptor_by_id(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<Arc<TableDescriptor>>> {
        let trusted = self.caches_trusted();
        if trusted {
            if let Some(td) = self.tables_by_id.get(&uuid) {
                return Ok(Some(td));
            }
        }

        let found = self.descriptor_via_index::<tables::SysTablesFactory>(
            tc,
            tables::BY_ID,
            vec![Value::Uuid(uuid)],
        )?;
        let Some(mut td) = found else {
            return Ok(None);
        };
        let schema = self
            .get_schema_descriptor_by_id(tc, td.schema_id)?
            .ok_or_else(|| not_found(ObjectKind::Schema, td.schema_id.to_string()))?;
        td.schema_name = schema.name;

        let td = Arc::new(self.complete_table_descriptor(tc, td)?);
        if trusted {
            self.tables_by_id.put(uuid, td.clone());
            self.add_table_descriptor_to_other_cache(td.clone(), false);
        }
        Ok(Some(td))
    }

    /// Makes a descriptor found through one cache reachable through the
    /// other. Nothing is cached while DDL is active.
    pub fn add_table_descriptor_to_other_cache(
        &self,
        td: Arc<TableDescriptor>,
        found_by_name: bool,
    ) {
        if !self.caches_trusted() {
            return;
        }
        if found_by_name {
            self.tables_by_id.put(td.uuid, td);
        } else {
            self.tables_by_name.put(td.key(), td);
        }
    }

    fn complete_table_descriptor(
        &self,
        tc: &Transaction,
        mut td: TableDescriptor,
    ) -> Result<TableDescriptor> {
        td.columns = self.get_column_descriptors(tc, td.uuid)?;
        td.conglomerates = self.get_conglomerate_descriptors_by_table(tc, td.uuid)?;
        Ok(td)
    }

    /// Drops every cached copy of a table.
    pub(super) fn evict_table(&self, table_id: Uuid) {
        if let Some(td) = self.tables_by_id.remove(&table_id) {
            self.tables_by_name.remove(&td.key());
        }
        self.tables_by_name.retain(|_, td| td.uuid != table_id);
    }

    /// Records the table itself. Columns and conglomerates are added
    /// separately.
    pub fn add_table_descriptor(
        &self,
        tc: &Transaction,
        td: &TableDescriptor,
        schema: &SchemaDescriptor,
    ) -> Result<()> {
        let row = tables::SysTablesFactory::make_row(Some(td), Some(schema))?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Systables,
            row,
            ObjectKind::Table,
            &td.name,
            &schema.name,
        )?;
        self.evict_table(td.uuid);
        debug!(table = %td.qualified_name(), "added table");
        Ok(())
    }

    pub fn drop_table_descriptor(&self, tc: &Transaction, td: &TableDescriptor) -> Result<()> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Systables,
            tables::BY_NAME,
            vec![Value::from(td.name.as_str()), Value::Uuid(td.schema_id)],
        )?;
        self.evict_table(td.uuid);
        if deleted == 0 {
            return Err(not_found(ObjectKind::Table, td.qualified_name()));
        }
        Ok(())
    }

    pub fn update_lock_granularity(
        &self,
        tc: &Transaction,
        td: &TableDescriptor,
        granularity: LockGranularity,
    ) -> Result<()> {
        let updated = self.catalog(tc, CatalogNumber::Systables)?.update_rows(
            tc,
            tables::BY_ID,
            vec![Value::Uuid(td.uuid)],
            &Qualifiers::none(),
            |row| {
                row[tables::LOCKGRANULARITY - 1] = Value::from(granularity.as_char());
                Ok(())
            },
        )?;
        self.evict_table(td.uuid);
        if updated == 0 {
            return Err(not_found(ObjectKind::Table, td.qualified_name()));
        }
        Ok(())
    }

    /// Every table of a schema, complete with columns and conglomerates.
    pub fn get_table_descriptors(
        &self,
        tc: &Transaction,
        schema: &SchemaDescriptor,
    ) -> Result<Vec<TableDescriptor>> {
        self.catalog(tc, CatalogNumber::Systables)?
            .fetch_via_heap(tc, uuid_equals(tables::SCHEMAID, schema.uuid), None)?
            .into_iter()
            .map(|(_, row)| {
                let td = tables::SysTablesFactory::build_descriptor(&row, Some(schema))?;
                self.complete_table_descriptor(tc, td)
            })
            .collect()
    }

    /// Removes the SYSTABLES rows of every table in a schema. Columns,
    /// conglomerates and constraints are the caller's to drop.
    pub fn drop_all_table_descriptors(
        &self,
        tc: &Transaction,
        schema: &SchemaDescriptor,
    ) -> Result<usize> {
        let ti = self.catalog(tc, CatalogNumber::Systables)?;
        let rows = ti.fetch_via_heap(tc, uuid_equals(tables::SCHEMAID, schema.uuid), None)?;
        for (location, row) in &rows {
            ti.delete_row(tc, *location, row)?;
            if let Some(table_id) = row[tables::TABLEID - 1].as_uuid() {
                self.evict_table(table_id);
            }
        }
        debug!(schema = %schema.name, count = rows.len(), "dropped all tables");
        Ok(rows.len())
    }

    /// Every table with its conglomerates but without columns, read
    /// without waiting on locks. Meant for space reporting and
    /// diagnostics, where a slightly stale answer is fine.
    pub fn hash_all_table_descriptors_by_table_id(
        &self,
        tc: &Transaction,
    ) -> Result<HashMap<Uuid, TableDescriptor>> {
        let tables = self.descriptors_via_heap::<tables::SysTablesFactory>(tc, Qualifiers::none())?;

        let mut hashed = HashMap::with_capacity(tables.len());
        for mut td in tables {
            td.conglomerates = self.fetch_descriptors::<conglomerates::SysConglomeratesFactory>(
                tc,
                conglomerates::BY_TABLE,
                vec![Value::Uuid(td.uuid)],
                &Qualifiers::none(),
                None,
                ReadMode::ReadUncommittedAdvisory,
            )?;
            hashed.insert(td.uuid, td);
        }
        Ok(hashed)
    }

    pub fn hash_all_conglomerate_descriptors_by_number(
        &self,
        tc: &Transaction,
    ) -> Result<HashMap<ConglomerateId, ConglomerateDescriptor>> {
        Ok(self
            .descriptors_via_heap::<conglomerates::SysConglomeratesFactory>(tc, Qualifiers::none())?
            .into_iter()
            .map(|cd| (cd.number, cd))
            .collect())
    }
}

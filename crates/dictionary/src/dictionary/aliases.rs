use {
    super::{not_found, DataDictionary},
    crate::{
        catalog::{aliases, CatalogNumber, RowFactory},
        descriptor::{
            AliasDescriptor, AliasType, TableDescriptor, IBM_SYSTEM_FUN_SCHEMA_UUID,
            SYSTEM_DIAG_SCHEMA_UUID,
        },
        error::{ObjectKind, Result},
        routines,
    },
    access::Transaction,
    def::{Uuid, Value},
};

impl DataDictionary {
    pub fn add_alias_descriptor(&self, tc: &Transaction, ad: &AliasDescriptor) -> Result<()> {
        let row = aliases::SysAliasesFactory::make_row(Some(ad), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysaliases,
            row,
            ObjectKind::Alias,
            &ad.name,
            &ad.schema_id.to_string(),
        )?;
        Ok(())
    }

    pub fn get_alias_descriptor(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<AliasDescriptor>> {
        self.descriptor_via_index::<aliases::SysAliasesFactory>(
            tc,
            aliases::BY_ID,
            vec![Value::Uuid(uuid)],
        )
    }

    /// Looks a routine, synonym or type up in one namespace of a schema.
    /// The SYSFUN functions are built in and never stored.
    pub fn get_alias_descriptor_by_name(
        &self,
        tc: &Transaction,
        schema_id: Uuid,
        name: &str,
        namespace: AliasType,
    ) -> Result<Option<AliasDescriptor>> {
        if schema_id == IBM_SYSTEM_FUN_SCHEMA_UUID {
            return Ok(routines::sysfun_function(name, namespace).cloned());
        }

        self.descriptor_via_index::<aliases::SysAliasesFactory>(
            tc,
            aliases::BY_NAME,
            vec![
                Value::Uuid(schema_id),
                Value::from(name),
                Value::from(namespace.as_char()),
            ],
        )
    }

    /// Candidate routines for an invocation of `name` in a schema.
    pub fn get_routine_list(
        &self,
        tc: &Transaction,
        schema_id: Uuid,
        name: &str,
        namespace: AliasType,
    ) -> Result<Vec<AliasDescriptor>> {
        if schema_id == IBM_SYSTEM_FUN_SCHEMA_UUID {
            return Ok(routines::sysfun_functions()
                .iter()
                .filter(|ad| ad.name == name && ad.namespace() == namespace)
                .cloned()
                .collect());
        }

        Ok(self
            .get_alias_descriptor_by_name(tc, schema_id, name, namespace)?
            .into_iter()
            .collect())
    }

    pub fn drop_alias_descriptor(&self, tc: &Transaction, ad: &AliasDescriptor) -> Result<()> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysaliases,
            aliases::BY_ID,
            vec![Value::Uuid(ad.uuid)],
        )?;
        if deleted == 0 {
            return Err(not_found(ObjectKind::Alias, ad.name.as_str()));
        }
        Ok(())
    }

    /// Implementation of a virtual table. SYSCS_DIAG tables are built in;
    /// elsewhere only user table functions qualify.
    pub fn get_vti_class(
        &self,
        tc: &Transaction,
        td: &TableDescriptor,
        as_table_function: bool,
    ) -> Result<Option<String>> {
        if td.schema_id == SYSTEM_DIAG_SCHEMA_UUID {
            return Ok(routines::diagnostic_table(&td.name, as_table_function)
                .map(|t| t.implementation.to_owned()));
        }
        if !as_table_function {
            return Ok(None);
        }

        Ok(self
            .get_alias_descriptor_by_name(tc, td.schema_id, &td.name, AliasType::Function)?
            .map(|ad| ad.java_class_name))
    }
}

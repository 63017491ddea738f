use {
    super::{not_found, uuid_equals, DataDictionary},
    crate::{
        catalog::{
            aliases, constraints, files, schemas, sequences, statements, tables, triggers,
            CatalogNumber, RowFactory,
        },
        descriptor::{
            self, SchemaDescriptor, IBM_SYSTEM_SCHEMA_NAME, IBM_SYSTEM_SCHEMA_UUID,
            SESSION_SCHEMA_NAME, SESSION_SCHEMA_UUID, SYSTEM_DIAG_SCHEMA_NAME,
            SYSTEM_DIAG_SCHEMA_UUID, SYSTEM_SCHEMA_NAME, SYSTEM_SCHEMA_UUID,
            SYSTEM_UTIL_SCHEMA_NAME, SYSTEM_UTIL_SCHEMA_UUID,
        },
        error::{ObjectKind, Result},
    },
    access::{Qualifiers, Transaction},
    def::{Uuid, Value},
    tracing::debug,
};

/// Schemas the dictionary answers for without reading SYSSCHEMAS.
pub(super) struct WellKnownSchemas {
    pub system: SchemaDescriptor,
    pub sysibm: SchemaDescriptor,
    pub system_utility: SchemaDescriptor,
    pub system_diag: SchemaDescriptor,
    pub session: SchemaDescriptor,
}

impl WellKnownSchemas {
    pub fn new(owner: &str) -> Self {
        Self {
            system: SchemaDescriptor::new(SYSTEM_SCHEMA_NAME, owner, SYSTEM_SCHEMA_UUID),
            sysibm: SchemaDescriptor::new(IBM_SYSTEM_SCHEMA_NAME, owner, IBM_SYSTEM_SCHEMA_UUID),
            system_utility: SchemaDescriptor::new(
                SYSTEM_UTIL_SCHEMA_NAME,
                owner,
                SYSTEM_UTIL_SCHEMA_UUID,
            ),
            system_diag: SchemaDescriptor::new(
                SYSTEM_DIAG_SCHEMA_NAME,
                owner,
                SYSTEM_DIAG_SCHEMA_UUID,
            ),
            session: SchemaDescriptor::new(SESSION_SCHEMA_NAME, owner, SESSION_SCHEMA_UUID),
        }
    }
}

/// Catalogs whose rows name a schema, with the position of that column.
const SCHEMA_REFERENCES: &[(CatalogNumber, usize)] = &[
    (CatalogNumber::Systables, tables::SCHEMAID),
    (CatalogNumber::Sysconstraints, constraints::SCHEMAID),
    (CatalogNumber::Sysaliases, aliases::SCHEMAID),
    (CatalogNumber::Systriggers, triggers::SCHEMAID),
    (CatalogNumber::Sysstatements, statements::SCHEMAID),
    (CatalogNumber::Sysfiles, files::SCHEMAID),
    (CatalogNumber::Syssequences, sequences::SCHEMAID),
];

impl DataDictionary {
    pub fn system_schema_descriptor(&self) -> &SchemaDescriptor {
        &self.system_schema
    }

    pub fn sysibm_schema_descriptor(&self) -> &SchemaDescriptor {
        &self.sysibm_schema
    }

    pub fn system_utility_schema_descriptor(&self) -> &SchemaDescriptor {
        &self.system_utility_schema
    }

    pub fn system_diag_schema_descriptor(&self) -> &SchemaDescriptor {
        &self.system_diag_schema
    }

    pub fn declared_global_temporary_tables_schema_descriptor(&self) -> &SchemaDescriptor {
        &self.session_schema
    }

    pub fn is_system_schema_name(&self, name: &str) -> bool {
        descriptor::is_system_schema_name(name)
    }

    /// Looks a schema up by name. SESSION exists implicitly: if nobody
    /// created it, its well-known descriptor is returned.
    pub fn get_schema_descriptor(
        &self,
        tc: &Transaction,
        name: &str,
        raise_error: bool,
    ) -> Result<Option<SchemaDescriptor>> {
        match name {
            SYSTEM_SCHEMA_NAME => return Ok(Some(self.system_schema.clone())),
            IBM_SYSTEM_SCHEMA_NAME => return Ok(Some(self.sysibm_schema.clone())),
            _ => {}
        }

        let found = self.descriptor_via_index::<schemas::SysSchemasFactory>(
            tc,
            schemas::BY_NAME,
            vec![Value::from(name)],
        )?;
        match found {
            Some(sd) => Ok(Some(sd)),
            None if name == SESSION_SCHEMA_NAME => Ok(Some(self.session_schema.clone())),
            None if raise_error => Err(not_found(ObjectKind::Schema, name)),
            None => Ok(None),
        }
    }

    pub fn get_schema_descriptor_by_id(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<SchemaDescriptor>> {
        if uuid == SYSTEM_SCHEMA_UUID {
            return Ok(Some(self.system_schema.clone()));
        }
        if uuid == IBM_SYSTEM_SCHEMA_UUID {
            return Ok(Some(self.sysibm_schema.clone()));
        }

        self.descriptor_via_index::<schemas::SysSchemasFactory>(
            tc,
            schemas::BY_ID,
            vec![Value::Uuid(uuid)],
        )
    }

    pub fn add_schema_descriptor(&self, tc: &Transaction, sd: &SchemaDescriptor) -> Result<()> {
        let row = schemas::SysSchemasFactory::make_row(Some(sd), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysschemas,
            row,
            ObjectKind::Schema,
            &sd.name,
            "",
        )?;
        debug!(schema = %sd.name, "added schema");
        Ok(())
    }

    pub fn drop_schema_descriptor(&self, tc: &Transaction, name: &str) -> Result<()> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysschemas,
            schemas::BY_NAME,
            vec![Value::from(name)],
        )?;
        if deleted == 0 {
            return Err(not_found(ObjectKind::Schema, name));
        }
        Ok(())
    }

    pub fn get_schema_descriptors(&self, tc: &Transaction) -> Result<Vec<SchemaDescriptor>> {
        self.descriptors_via_heap::<schemas::SysSchemasFactory>(tc, Qualifiers::none())
    }

    /// True when no table, constraint, routine, trigger, stored statement,
    /// jar file or sequence lives in the schema.
    pub fn is_schema_empty(&self, tc: &Transaction, sd: &SchemaDescriptor) -> Result<bool> {
        for &(number, position) in SCHEMA_REFERENCES {
            if number.def().since > self.version {
                continue;
            }
            let rows = self
                .catalog(tc, number)?
                .fetch_via_heap(tc, uuid_equals(position, sd.uuid), None)?;
            if !rows.is_empty() {
                debug!(schema = %sd.name, catalog = number.def().name, "schema is not empty");
                return Ok(false);
            }
        }
        Ok(true)
    }
}

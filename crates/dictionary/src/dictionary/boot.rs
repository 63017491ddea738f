use {
    super::{not_found, schemas::WellKnownSchemas, DataDictionary},
    crate::{
        catalog::{dummy1, schemas, CatalogDef, CatalogNumber, RowFactory},
        config::CatalogConfig,
        descriptor::{
            ColumnDescriptor, ConglomerateDescriptor, LockGranularity, PermissionsDescriptor,
            RoutinePermsDescriptor, SchemaDescriptor, SpsDescriptor, SpsType, TableDescriptor,
            TableType, DEFAULT_USER_SCHEMA_NAME, IBM_SYSTEM_SCHEMA_UUID, PUBLIC_AUTHORIZATION_ID,
            SYSTEM_SCHEMAS, SYSTEM_SCHEMA_NAME,
        },
        error::{InternalSnafu, MissingBootParameterSnafu, ObjectKind, Result},
        routines::{self, BuiltinRoutine},
        tab_info::CatalogConglomerates,
        version::{DictionaryVersion, CORE_VERSION_PROPERTY, CREATE_VERSION_PROPERTY},
    },
    access::{AccessManager, ConglomerateId, ConglomerateKind, Transaction},
    def::{DataType, TypeDescriptor, Uuid, Value},
    snafu::{ensure, OptionExt},
    std::{collections::BTreeMap, sync::Arc},
    tracing::{debug, info},
};

/// Settings for creating or booting a database's dictionary.
#[derive(Debug, Clone)]
pub struct BootOptions {
    properties: BTreeMap<String, String>,
    owner: String,
    version: DictionaryVersion,
}

impl Default for BootOptions {
    fn default() -> Self {
        Self {
            properties: BTreeMap::new(),
            owner: DEFAULT_USER_SCHEMA_NAME.to_owned(),
            version: DictionaryVersion::CURRENT,
        }
    }
}

impl BootOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Boot or service property, e.g. a cache size or `upgrade`.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn with_properties(mut self, properties: BTreeMap<String, String>) -> Self {
        self.properties.extend(properties);
        self
    }

    /// Authorization id of the user creating the database.
    pub fn with_owner(mut self, owner: impl Into<String>) -> Self {
        self.owner = owner.into();
        self
    }

    /// Creates the catalogs in the format of an older release.
    pub fn with_version(mut self, version: DictionaryVersion) -> Self {
        self.version = version;
        self
    }
}

/// Statements backing the metadata calls of the client drivers, stored in
/// SYSIBM when the database is created.
const METADATA_STATEMENTS: &[(&str, &str)] = &[
    (
        "GETSCHEMAS",
        "SELECT SCHEMANAME AS TABLE_SCHEM FROM SYS.SYSSCHEMAS \
         WHERE SCHEMANAME LIKE ? ORDER BY TABLE_SCHEM",
    ),
    (
        "GETTABLES",
        "SELECT S.SCHEMANAME AS TABLE_SCHEM, T.TABLENAME AS TABLE_NAME, \
         T.TABLETYPE AS TABLE_TYPE FROM SYS.SYSTABLES T, SYS.SYSSCHEMAS S \
         WHERE T.SCHEMAID = S.SCHEMAID AND S.SCHEMANAME LIKE ? AND T.TABLENAME LIKE ? \
         ORDER BY TABLE_TYPE, TABLE_SCHEM, TABLE_NAME",
    ),
    (
        "GETCOLUMNS",
        "SELECT S.SCHEMANAME AS TABLE_SCHEM, T.TABLENAME AS TABLE_NAME, \
         C.COLUMNNAME AS COLUMN_NAME, C.COLUMNNUMBER AS ORDINAL_POSITION \
         FROM SYS.SYSCOLUMNS C, SYS.SYSTABLES T, SYS.SYSSCHEMAS S \
         WHERE C.REFERENCEID = T.TABLEID AND T.SCHEMAID = S.SCHEMAID \
         AND S.SCHEMANAME LIKE ? AND T.TABLENAME LIKE ? AND C.COLUMNNAME LIKE ? \
         ORDER BY TABLE_SCHEM, TABLE_NAME, ORDINAL_POSITION",
    ),
    (
        "GETPROCEDURES",
        "SELECT S.SCHEMANAME AS PROCEDURE_SCHEM, A.ALIAS AS PROCEDURE_NAME \
         FROM SYS.SYSALIASES A, SYS.SYSSCHEMAS S \
         WHERE A.SCHEMAID = S.SCHEMAID AND A.ALIASTYPE = 'P' \
         AND S.SCHEMANAME LIKE ? AND A.ALIAS LIKE ? ORDER BY PROCEDURE_SCHEM, PROCEDURE_NAME",
    ),
    (
        "GETPRIMARYKEYS",
        "SELECT S.SCHEMANAME AS TABLE_SCHEM, T.TABLENAME AS TABLE_NAME, \
         C.CONSTRAINTNAME AS PK_NAME FROM SYS.SYSCONSTRAINTS C, SYS.SYSTABLES T, \
         SYS.SYSSCHEMAS S WHERE C.TABLEID = T.TABLEID AND T.SCHEMAID = S.SCHEMAID \
         AND C.TYPE = 'P' AND S.SCHEMANAME LIKE ? AND T.TABLENAME = ?",
    ),
];

/// Name of the database property recording a core conglomerate:
/// `SysconglomeratesIdentifier`, `SysconglomeratesIndex1Identifier`, ...
fn boot_parameter(def: &CatalogDef, index: Option<usize>) -> String {
    let mut name = def.name.to_ascii_lowercase();
    if let Some(first) = name.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    match index {
        None => format!("{}Identifier", name),
        Some(i) => format!("{}Index{}Identifier", name, i + 1),
    }
}

impl DataDictionary {
    /// Creates the catalogs of a new database and everything stored in
    /// them from the start: system schemas, routines, grants and metadata
    /// statements.
    pub fn create(manager: Arc<AccessManager>, options: BootOptions) -> Result<Self> {
        let config = CatalogConfig::from_properties(&options.properties);
        let version = options.version;
        let mut dd = Self::new(manager.clone(), config, version, options.owner);

        dd.bootstrapping = true;
        let tc = manager.begin();
        if let Err(e) = dd.create_catalogs(&tc) {
            tc.abort()?;
            return Err(e);
        }
        tc.commit()?;
        manager.checkpoint()?;
        dd.bootstrapping = false;

        info!(
            version = %version,
            owner = %dd.owner,
            conglomerates = manager.conglomerate_count(),
            "created data dictionary"
        );
        Ok(dd)
    }

    /// Boots the dictionary of an existing database and, when allowed,
    /// upgrades it to the current version.
    pub fn boot(manager: Arc<AccessManager>, options: BootOptions) -> Result<Self> {
        let stored = manager
            .property(CORE_VERSION_PROPERTY)
            .context(MissingBootParameterSnafu {
                key: CORE_VERSION_PROPERTY,
            })?;
        let on_disk = DictionaryVersion::from_property(&stored).context(InternalSnafu {
            details: format!("unreadable dictionary version '{}'", stored),
        })?;
        ensure!(
            on_disk <= DictionaryVersion::CURRENT,
            InternalSnafu {
                details: format!(
                    "database is at dictionary version {} which is newer than {}",
                    on_disk,
                    DictionaryVersion::CURRENT
                ),
            }
        );

        let tc = manager.begin();
        let mut properties = tc.properties();
        properties.extend(options.properties);
        let config = CatalogConfig::from_properties(&properties);
        let mut dd = Self::new(manager.clone(), config, on_disk, options.owner);

        for number in CatalogNumber::ALL.iter().filter(|n| n.is_core()) {
            let conglomerates = dd.read_core_boot_parameters(number.def())?;
            dd.tab_infos[number.index()].set_conglomerates(conglomerates);
        }

        let sys = dd.stored_schema(&tc, SYSTEM_SCHEMA_NAME)?;
        dd.set_owner(sys.authorization_id);

        let upgraded = match dd.upgrade(&tc) {
            Ok(upgraded) => upgraded,
            Err(e) => {
                tc.abort()?;
                return Err(e);
            }
        };
        tc.commit()?;
        if upgraded {
            manager.checkpoint()?;
        }

        info!(version = %dd.version, owner = %dd.owner, "booted data dictionary");
        Ok(dd)
    }

    fn set_owner(&mut self, owner: String) {
        let schemas = WellKnownSchemas::new(&owner);
        self.system_schema = schemas.system;
        self.sysibm_schema = schemas.sysibm;
        self.system_utility_schema = schemas.system_utility;
        self.system_diag_schema = schemas.system_diag;
        self.session_schema = schemas.session;
        self.owner = owner;
    }

    fn read_core_boot_parameters(&self, def: &'static CatalogDef) -> Result<CatalogConglomerates> {
        let read = |key: String, required: bool| -> Result<Option<ConglomerateId>> {
            let Some(value) = self.manager.property(&key) else {
                ensure!(!required, MissingBootParameterSnafu { key });
                return Ok(None);
            };
            let id = value.parse::<ConglomerateId>().ok().context(InternalSnafu {
                details: format!("boot parameter {} is not a conglomerate number: {}", key, value),
            })?;
            Ok(Some(id))
        };

        let heap = read(boot_parameter(def, None), true)?.context(MissingBootParameterSnafu {
            key: boot_parameter(def, None),
        })?;
        let indexes = (0..def.index_count())
            .map(|i| read(boot_parameter(def, Some(i)), def.indexes[i].since <= self.version))
            .collect::<Result<Vec<_>>>()?;

        Ok(CatalogConglomerates { heap, indexes })
    }

    fn create_catalogs(&self, tc: &Transaction) -> Result<()> {
        // Core heaps and indexes must all exist before any of them can be
        // described, since the descriptions live in the core catalogs.
        let core = CatalogNumber::ALL
            .iter()
            .filter(|n| n.is_core())
            .map(|n| -> Result<_> {
                let def = n.def();
                let conglomerates = self.create_catalog_conglomerates(tc, def)?;
                self.write_boot_parameters(tc, def, &conglomerates)?;
                self.tab_infos[n.index()].set_conglomerates(conglomerates.clone());
                Ok((def, conglomerates))
            })
            .collect::<Result<Vec<_>>>()?;

        for (def, conglomerates) in &core {
            self.register_catalog(tc, def, conglomerates)?;
        }

        for number in CatalogNumber::ALL.iter().filter(|n| !n.is_core()) {
            if number.def().since <= self.version {
                self.create_catalog(tc, number.def())?;
            }
        }

        self.catalog(tc, CatalogNumber::Sysdummy1)?
            .insert_row(tc, dummy1::SysDummy1Factory::make_row(Some(&()), None)?)?;

        for (name, uuid) in SYSTEM_SCHEMAS {
            self.add_schema_descriptor(tc, &SchemaDescriptor::new(name, &self.owner, uuid))?;
        }
        self.add_schema_descriptor(
            tc,
            &SchemaDescriptor::new(DEFAULT_USER_SCHEMA_NAME, &self.owner, Uuid::new_v4()),
        )?;

        self.create_system_routines(tc, routines::system_routines())?;
        self.create_metadata_statements(tc)?;

        tc.set_property(CORE_VERSION_PROPERTY, self.version.to_property())?;
        tc.set_property(CREATE_VERSION_PROPERTY, self.version.to_property())?;
        Ok(())
    }

    /// Heap and indexes of a catalog in the format of the dictionary's
    /// version.
    pub(super) fn create_catalog_conglomerates(
        &self,
        tc: &Transaction,
        def: &'static CatalogDef,
    ) -> Result<CatalogConglomerates> {
        let heap = tc.create_conglomerate(ConglomerateKind::Heap, def.heap_format(self.version))?;
        let indexes = (0..def.index_count())
            .map(|i| -> Result<_> {
                if def.indexes[i].since > self.version {
                    return Ok(None);
                }
                let kind = ConglomerateKind::BTree {
                    unique: def.indexes[i].unique,
                };
                Ok(Some(tc.create_conglomerate(kind, def.index_format(i))?))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(CatalogConglomerates { heap, indexes })
    }

    pub(super) fn write_boot_parameters(
        &self,
        tc: &Transaction,
        def: &'static CatalogDef,
        conglomerates: &CatalogConglomerates,
    ) -> Result<()> {
        tc.set_property(&boot_parameter(def, None), conglomerates.heap.to_string())?;
        for (i, index) in conglomerates.indexes.iter().enumerate() {
            if let Some(number) = index {
                tc.set_property(&boot_parameter(def, Some(i)), number.to_string())?;
            }
        }
        Ok(())
    }

    /// Creates a non-core catalog and describes it in the core catalogs.
    pub(super) fn create_catalog(&self, tc: &Transaction, def: &'static CatalogDef) -> Result<()> {
        let conglomerates = self.create_catalog_conglomerates(tc, def)?;
        self.tab_infos[def.number.index()].set_conglomerates(conglomerates.clone());
        self.register_catalog(tc, def, &conglomerates)?;
        debug!(catalog = def.name, heap = conglomerates.heap, "created catalog");
        Ok(())
    }

    /// Records a catalog's table, columns and conglomerates as rows of the
    /// core catalogs.
    fn register_catalog(
        &self,
        tc: &Transaction,
        def: &'static CatalogDef,
        conglomerates: &CatalogConglomerates,
    ) -> Result<()> {
        let schema = &self.system_schema;
        let table_id = def.table_id();
        let td = TableDescriptor {
            uuid: table_id,
            name: def.name.to_owned(),
            schema_id: schema.uuid,
            schema_name: schema.name.clone(),
            table_type: TableType::System,
            lock_granularity: LockGranularity::Row,
            columns: vec![],
            conglomerates: vec![],
        };
        self.add_table_descriptor(tc, &td, schema)?;

        let columns = def
            .columns
            .iter()
            .filter(|c| c.since <= self.version)
            .map(|c| ColumnDescriptor::new(table_id, c.name, c.position as u32, c.ty))
            .collect::<Vec<_>>();
        self.add_column_descriptors(tc, &columns)?;

        self.add_conglomerate_descriptor(
            tc,
            &ConglomerateDescriptor {
                uuid: def.heap_id(),
                number: conglomerates.heap,
                name: def.heap_id().to_string(),
                is_index: false,
                index_row_generator: None,
                is_constraint: false,
                table_id,
                schema_id: schema.uuid,
            },
        )?;
        for (i, index) in conglomerates.indexes.iter().enumerate() {
            if let Some(number) = index {
                self.add_catalog_index_descriptor(tc, def, i, *number)?;
            }
        }
        Ok(())
    }

    pub(super) fn add_catalog_index_descriptor(
        &self,
        tc: &Transaction,
        def: &'static CatalogDef,
        index: usize,
        number: ConglomerateId,
    ) -> Result<()> {
        self.add_conglomerate_descriptor(
            tc,
            &ConglomerateDescriptor {
                uuid: def.index_id(index),
                number,
                name: def.index_name(index),
                is_index: true,
                index_row_generator: Some(def.index_row_generator(index)),
                is_constraint: false,
                table_id: def.table_id(),
                schema_id: self.system_schema.uuid,
            },
        )
    }

    /// Stores builtin routines, granting PUBLIC execute on the allow-listed
    /// ones once the database enforces routine grants.
    pub(super) fn create_system_routines<'a>(
        &self,
        tc: &Transaction,
        routines: impl Iterator<Item = &'a BuiltinRoutine>,
    ) -> Result<usize> {
        let mut count = 0;
        for routine in routines.filter(|r| r.since <= self.version) {
            let (_, schema_id) = SYSTEM_SCHEMAS
                .iter()
                .find(|(name, _)| *name == routine.schema)
                .context(InternalSnafu {
                    details: format!("{} is in unknown schema {}", routine.name, routine.schema),
                })?;
            let ad = routine.descriptor(*schema_id);
            self.add_alias_descriptor(tc, &ad)?;

            if self.version >= DictionaryVersion::V10_2 && routines::is_public_routine(routine) {
                self.grant_public_execute(tc, ad.uuid)?;
            }
            count += 1;
        }
        debug!(count, "created system routines");
        Ok(count)
    }

    pub(super) fn grant_public_execute(&self, tc: &Transaction, routine_id: Uuid) -> Result<()> {
        let perm = RoutinePermsDescriptor::new(PUBLIC_AUTHORIZATION_ID, &self.owner, routine_id);
        self.add_remove_permissions_descriptor(
            tc,
            true,
            &PermissionsDescriptor::Routine(perm),
            PUBLIC_AUTHORIZATION_ID,
        )?;
        Ok(())
    }

    fn create_metadata_statements(&self, tc: &Transaction) -> Result<()> {
        for (name, text) in METADATA_STATEMENTS {
            let mut sps =
                SpsDescriptor::new(*name, IBM_SYSTEM_SCHEMA_UUID, SpsType::Statement, *text);
            sps.params = vec![
                TypeDescriptor::nullable(DataType::Varchar(128));
                text.matches('?').count()
            ];
            self.add_sps_descriptor(tc, &sps)?;
        }
        Ok(())
    }

    /// A schema as stored in SYSSCHEMAS, bypassing the well-known
    /// descriptors.
    pub(super) fn stored_schema(&self, tc: &Transaction, name: &str) -> Result<SchemaDescriptor> {
        self.descriptor_via_index::<schemas::SysSchemasFactory>(
            tc,
            schemas::BY_NAME,
            vec![Value::from(name)],
        )?
        .ok_or_else(|| not_found(ObjectKind::Schema, name))
    }
}

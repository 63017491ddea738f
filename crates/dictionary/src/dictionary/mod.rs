//! The data dictionary: one instance per database, shared by every
//! connection. Lookups consult the caches while no DDL is running and go
//! to the catalogs otherwise; DDL registers with the coordinator gate.

mod aliases;
mod boot;
mod columns;
mod conglomerates;
mod constraints;
mod dependencies;
mod files;
mod permissions;
mod schemas;
mod sequences;
mod statements;
mod statistics;
mod tables;
mod triggers;
mod upgrade;
mod views;

pub use {boot::BootOptions, constraints::DropBehavior, permissions::PermissionCheck};

use {
    crate::{
        cache::BoundedCache,
        catalog::{
            conglomerates as sysconglomerates, tables as systables, CatalogDef, CatalogNumber,
            RowFactory,
        },
        config::CatalogConfig,
        coordinator::{CacheMode, Coordinator, Session},
        descriptor::{
            PermissionKey, PermissionsDescriptor, SchemaDescriptor, SpsDescriptor,
            TableDescriptor, TableKey,
        },
        error::{
            Error, InternalSnafu, ObjectAlreadyExistsSnafu, ObjectKind, ObjectNotFoundSnafu,
            Result,
        },
        generator::SequenceGenerator,
        sql_name::SystemNameGenerator,
        tab_info::{column_equals, CatalogConglomerates, InsertResult, ReadMode, TabInfo},
        version::DictionaryVersion,
    },
    access::{AccessManager, ConglomerateId, Qualifiers, RowLocation, Transaction},
    def::{Row, Uuid, Value},
    parking_lot::Mutex,
    snafu::OptionExt,
    std::sync::Arc,
    tracing::warn,
};

pub struct DataDictionary {
    manager: Arc<AccessManager>,
    config: CatalogConfig,
    version: DictionaryVersion,
    /// Authorization id of the database owner, who owns the system schemas.
    owner: String,
    /// Indexed by `CatalogNumber`.
    tab_infos: Vec<TabInfo>,
    coordinator: Coordinator,
    names: SystemNameGenerator,

    system_schema: SchemaDescriptor,
    sysibm_schema: SchemaDescriptor,
    system_utility_schema: SchemaDescriptor,
    system_diag_schema: SchemaDescriptor,
    session_schema: SchemaDescriptor,

    tables_by_id: BoundedCache<Uuid, Arc<TableDescriptor>>,
    tables_by_name: BoundedCache<TableKey, Arc<TableDescriptor>>,
    sps_by_id: BoundedCache<Uuid, SpsDescriptor>,
    sps_by_name: BoundedCache<TableKey, SpsDescriptor>,
    /// Misses are cached too, as `None`.
    permissions: BoundedCache<PermissionKey, Option<PermissionsDescriptor>>,
    sequences: BoundedCache<Uuid, Arc<SequenceGenerator>>,
    /// Keyed by the UUID of the table owning the identity column.
    identities: BoundedCache<Uuid, Arc<SequenceGenerator>>,
    /// Held while a generator is loaded from, or handed back to, the
    /// catalog. At most one live generator exists per sequence or table.
    generator_gate: Mutex<()>,

    /// Set while the catalogs of a new database are being created; nothing
    /// is cached or faulted in meanwhile.
    bootstrapping: bool,
}

impl DataDictionary {
    fn new(
        manager: Arc<AccessManager>,
        config: CatalogConfig,
        version: DictionaryVersion,
        owner: String,
    ) -> Self {
        let schemas = schemas::WellKnownSchemas::new(&owner);

        Self {
            manager,
            version,
            tab_infos: CatalogNumber::ALL
                .iter()
                .map(|n| TabInfo::new(n.def()))
                .collect(),
            coordinator: Coordinator::new(config.lock_wait_timeout),
            names: SystemNameGenerator::new(),
            system_schema: schemas.system,
            sysibm_schema: schemas.sysibm,
            system_utility_schema: schemas.system_utility,
            system_diag_schema: schemas.system_diag,
            session_schema: schemas.session,
            tables_by_id: BoundedCache::new(config.table_cache_size),
            tables_by_name: BoundedCache::new(config.table_cache_size),
            sps_by_id: BoundedCache::new(config.sps_cache_size),
            sps_by_name: BoundedCache::new(config.sps_cache_size),
            permissions: BoundedCache::new(config.permissions_cache_size),
            sequences: BoundedCache::new(config.sequence_cache_size),
            identities: BoundedCache::new(config.identity_cache_size),
            generator_gate: Mutex::new(()),
            bootstrapping: false,
            owner,
            config,
        }
    }

    pub fn manager(&self) -> &Arc<AccessManager> {
        &self.manager
    }

    pub fn config(&self) -> &CatalogConfig {
        &self.config
    }

    /// Version of the catalogs on disk. Below the engine's version after a
    /// soft upgrade.
    pub fn version(&self) -> DictionaryVersion {
        self.version
    }

    pub fn authorization_database_owner(&self) -> &str {
        &self.owner
    }

    pub fn is_bootstrapping(&self) -> bool {
        self.bootstrapping
    }

    /// Fails with `VersionTooOld` unless the catalogs are at least at
    /// `required`.
    pub fn check_version(&self, required: DictionaryVersion, feature: &str) -> Result<()> {
        self.version.check(required, feature)
    }

    /// A fresh name for an unnamed constraint or other system named object.
    pub fn get_system_sql_name(&self) -> String {
        self.names.next_name()
    }

    pub fn cache_mode(&self) -> CacheMode {
        self.coordinator.mode()
    }

    fn caches_trusted(&self) -> bool {
        !self.bootstrapping && self.coordinator.mode() == CacheMode::CompileOnly
    }

    /// Starts a (possibly nested) bind of a statement.
    pub fn start_reading(&self, session: &Session) -> CacheMode {
        self.coordinator.start_reading(session)
    }

    pub fn done_reading(&self, session: &Session) {
        self.coordinator
            .done_reading(session, || self.clear_caches_on_transition());
    }

    /// Announces DDL in the session's current transaction. Call
    /// `transaction_finished` once the transaction commits or aborts.
    pub fn start_writing(&self, session: &Session) -> Result<()> {
        self.coordinator
            .start_writing(session, || self.clear_caches_on_transition())
    }

    pub fn transaction_finished(&self, session: &Session) {
        self.coordinator
            .transaction_finished(session, || self.clear_caches_on_transition());
    }

    /// Empties every cache. Sequence and identity generators write their
    /// unused ranges back first, per the configured flush policy.
    pub fn clear_caches(&self) -> Result<()> {
        let flushed = {
            let _gate = self.generator_gate.lock();
            let mut generators = self.sequences.drain();
            generators.extend(self.identities.drain());
            self.flush_generators(generators)
        };

        self.tables_by_id.drain();
        self.tables_by_name.drain();
        self.sps_by_id.drain();
        self.sps_by_name.drain();
        self.permissions.drain();
        flushed
    }

    fn clear_caches_on_transition(&self) {
        if let Err(e) = self.clear_caches() {
            warn!(error = %e, "failed to flush generators while clearing caches");
        }
    }

    /// The handle of a catalog by its table name, e.g. `SYSTABLES`.
    pub fn get_tab_info(&self, name: &str) -> Option<&TabInfo> {
        CatalogNumber::from_name(name).map(|n| &self.tab_infos[n.index()])
    }

    /// One of the four catalogs resolved at boot.
    pub fn get_core_catalog(&self, number: CatalogNumber) -> Option<&TabInfo> {
        number.is_core().then(|| &self.tab_infos[number.index()])
    }

    /// A row location of the right kind for rows of `td`'s heap.
    pub fn get_row_location_template(&self, td: &TableDescriptor) -> Result<RowLocation> {
        let heap = td
            .heap_conglomerate_number()
            .context(ObjectNotFoundSnafu {
                kind: ObjectKind::Conglomerate,
                name: td.qualified_name(),
            })?;
        Ok(RowLocation::new(heap, 0))
    }

    pub fn get_syscolumns_heap_conglomerate_number(&self) -> Result<ConglomerateId> {
        self.tab_infos[CatalogNumber::Syscolumns.index()].heap_conglomerate()
    }

    /// The handle of a catalog, faulting a non-core catalog in on first use.
    pub(crate) fn catalog(&self, tc: &Transaction, number: CatalogNumber) -> Result<&TabInfo> {
        let ti = &self.tab_infos[number.index()];
        if ti.is_complete() {
            return Ok(ti);
        }

        self.check_version(ti.def().since, ti.name())?;
        if self.bootstrapping || number.is_core() {
            return InternalSnafu {
                details: format!("{} has not been created yet", ti.name()),
            }
            .fail();
        }

        ti.fault_in(|| self.resolve_catalog(tc, ti.def()))?;
        Ok(ti)
    }

    /// Finds a catalog's conglomerates through SYSTABLES and
    /// SYSCONGLOMERATES, which describe themselves and every other catalog.
    fn resolve_catalog(
        &self,
        tc: &Transaction,
        def: &'static CatalogDef,
    ) -> Result<CatalogConglomerates> {
        let tables = &self.tab_infos[CatalogNumber::Systables.index()];
        let key = vec![Value::from(def.name), Value::Uuid(self.system_schema.uuid)];
        let rows = tables.fetch_via_index(
            tc,
            systables::BY_NAME,
            key,
            &Qualifiers::none(),
            ReadMode::RepeatableRead,
            false,
        )?;
        let (_, row) = rows.into_iter().next().context(ObjectNotFoundSnafu {
            kind: ObjectKind::Table,
            name: def.name,
        })?;
        let table_id = systables::SysTablesFactory::build_descriptor(&row, None)?.uuid;

        let conglomerates = self.fetch_descriptors::<sysconglomerates::SysConglomeratesFactory>(
            tc,
            sysconglomerates::BY_TABLE,
            vec![Value::Uuid(table_id)],
            &Qualifiers::none(),
            None,
            ReadMode::RepeatableRead,
        )?;

        let heap = conglomerates
            .iter()
            .find(|cd| !cd.is_index)
            .map(|cd| cd.number)
            .context(InternalSnafu {
                details: format!("{} has no heap conglomerate", def.name),
            })?;
        let indexes = (0..def.index_count())
            .map(|i| {
                let name = def.index_name(i);
                conglomerates
                    .iter()
                    .find(|cd| cd.is_index && cd.name == name)
                    .map(|cd| cd.number)
            })
            .collect();

        Ok(CatalogConglomerates { heap, indexes })
    }

    /// Inserts a catalog row, turning a unique index collision into
    /// `ObjectAlreadyExists`.
    pub(crate) fn insert_catalog_row(
        &self,
        tc: &Transaction,
        number: CatalogNumber,
        row: Row,
        kind: ObjectKind,
        name: &str,
        parent: &str,
    ) -> Result<RowLocation> {
        match self.catalog(tc, number)?.insert_row(tc, row)? {
            InsertResult::Inserted(location) => Ok(location),
            InsertResult::Duplicate { .. } => ObjectAlreadyExistsSnafu {
                kind,
                name,
                parent,
            }
            .fail(),
        }
    }

    /// Builds the descriptors of the rows whose `index` key starts with
    /// `key`.
    pub(crate) fn fetch_descriptors<F: RowFactory>(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
        filter: &Qualifiers,
        parent: Option<&F::Parent>,
        mode: ReadMode,
    ) -> Result<Vec<F::Descriptor>> {
        self.catalog(tc, F::def().number)?
            .fetch_via_index(tc, index, key, filter, mode, false)?
            .into_iter()
            .map(|(_, row)| F::build_descriptor(&row, parent))
            .collect()
    }

    pub(crate) fn descriptors_via_index<F: RowFactory>(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
    ) -> Result<Vec<F::Descriptor>> {
        self.fetch_descriptors::<F>(
            tc,
            index,
            key,
            &Qualifiers::none(),
            None,
            ReadMode::RepeatableRead,
        )
    }

    pub(crate) fn descriptor_via_index<F: RowFactory>(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
    ) -> Result<Option<F::Descriptor>> {
        Ok(self
            .descriptors_via_index::<F>(tc, index, key)?
            .into_iter()
            .next())
    }

    /// Full scan of a catalog's heap.
    pub(crate) fn descriptors_via_heap<F: RowFactory>(
        &self,
        tc: &Transaction,
        qualifiers: Qualifiers,
    ) -> Result<Vec<F::Descriptor>> {
        self.catalog(tc, F::def().number)?
            .fetch_via_heap(tc, qualifiers, None)?
            .into_iter()
            .map(|(_, row)| F::build_descriptor(&row, None))
            .collect()
    }

    pub(crate) fn delete_via_index(
        &self,
        tc: &Transaction,
        number: CatalogNumber,
        index: usize,
        key: Row,
    ) -> Result<usize> {
        self.catalog(tc, number)?
            .delete_rows(tc, index, key, &Qualifiers::none())
    }

    /// Deletes the heap rows matching `qualifiers`, for catalogs without an
    /// index on the column searched.
    pub(crate) fn delete_via_heap(
        &self,
        tc: &Transaction,
        number: CatalogNumber,
        qualifiers: Qualifiers,
    ) -> Result<usize> {
        let ti = self.catalog(tc, number)?;
        let rows = ti.fetch_via_heap(tc, qualifiers, None)?;
        for (location, row) in &rows {
            ti.delete_row(tc, *location, row)?;
        }
        Ok(rows.len())
    }
}

/// Qualifier matching one catalog column (1-based) against a UUID.
pub(crate) fn uuid_equals(position: usize, uuid: Uuid) -> Qualifiers {
    Qualifiers::all_of(vec![column_equals(position, Value::Uuid(uuid))])
}

pub(crate) fn not_found(kind: ObjectKind, name: impl Into<String>) -> Error {
    ObjectNotFoundSnafu {
        kind,
        name: name.into(),
    }
    .build()
}

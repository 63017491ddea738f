use {
    super::error::{self, Result},
    access::AccessManager,
    dictionary::{
        descriptor::TableType, BootOptions, DataDictionary, DictionaryVersion,
        CORE_VERSION_PROPERTY, UPGRADE_PROPERTY,
    },
    snafu::{ensure, ResultExt},
    std::{fmt, path::Path, sync::Arc},
    tracing::info,
};

/// What a booted dictionary holds, schema by schema.
#[derive(Debug)]
pub struct Summary {
    pub version: DictionaryVersion,
    pub owner: String,
    pub schemas: Vec<SchemaSummary>,
}

#[derive(Debug)]
pub struct SchemaSummary {
    pub name: String,
    pub owner: String,
    pub tables: Vec<(String, TableType)>,
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "dictionary version {}, owned by {}", self.version, self.owner)?;
        for schema in &self.schemas {
            writeln!(
                f,
                "{} ({} tables, owner {})",
                schema.name,
                schema.tables.len(),
                schema.owner
            )?;
            for (name, table_type) in &schema.tables {
                writeln!(f, "  {:<24} {:?}", name, table_type)?;
            }
        }
        Ok(())
    }
}

/// Creates a database in `data_dir` with its catalogs at the current version.
pub fn create_dictionary(data_dir: &Path, owner: &str) -> Result<DictionaryVersion> {
    ensure!(
        !AccessManager::exists(data_dir),
        error::AlreadyInitializedSnafu { path: data_dir }
    );
    let manager = AccessManager::create(data_dir).context(error::AccessSnafu)?;
    let dd = DataDictionary::create(manager, BootOptions::new().with_owner(owner))
        .context(error::DictionarySnafu)?;
    Ok(dd.version())
}

fn open(data_dir: &Path) -> Result<Arc<AccessManager>> {
    ensure!(
        AccessManager::exists(data_dir),
        error::NotInitializedSnafu { path: data_dir }
    );
    AccessManager::boot(data_dir).context(error::AccessSnafu)
}

fn boot(manager: Arc<AccessManager>, upgrade: bool) -> Result<DataDictionary> {
    let options = BootOptions::new().with_property(UPGRADE_PROPERTY, upgrade.to_string());
    DataDictionary::boot(manager, options).context(error::DictionarySnafu)
}

/// Boots the database without upgrading it and lists its schemas and tables.
pub fn describe(data_dir: &Path) -> Result<Summary> {
    let dd = boot(open(data_dir)?, false)?;
    let tc = dd.manager().begin();

    let mut schemas = Vec::new();
    for sd in dd.get_schema_descriptors(&tc).context(error::DictionarySnafu)? {
        let mut tables = dd
            .get_table_descriptors(&tc, &sd)
            .context(error::DictionarySnafu)?
            .into_iter()
            .map(|td| (td.name, td.table_type))
            .collect::<Vec<_>>();
        tables.sort_by(|a, b| a.0.cmp(&b.0));
        schemas.push(SchemaSummary {
            name: sd.name,
            owner: sd.authorization_id,
            tables,
        });
    }
    tc.commit().context(error::AccessSnafu)?;
    schemas.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(Summary {
        version: dd.version(),
        owner: dd.authorization_database_owner().to_owned(),
        schemas,
    })
}

/// Hard upgrades the catalogs, returning the versions before and after.
pub fn upgrade_dictionary(data_dir: &Path) -> Result<(DictionaryVersion, DictionaryVersion)> {
    let manager = open(data_dir)?;
    let stored = manager.property(CORE_VERSION_PROPERTY);
    let dd = boot(manager, true)?;
    let before = stored
        .as_deref()
        .and_then(DictionaryVersion::from_property)
        .unwrap_or(dd.version());

    if before != dd.version() {
        info!(from = %before, to = %dd.version(), "upgraded data dictionary");
    }
    Ok((before, dd.version()))
}

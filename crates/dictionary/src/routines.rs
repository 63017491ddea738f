//! Routines, diagnostic tables and grants that ship with every database.
//!
//! System procedures live in SYSALIASES like user routines and are created
//! when the database is created or upgraded. SYSFUN functions are never
//! stored; their descriptors are built once per process on first lookup.

use {
    crate::{
        descriptor::{
            AliasDescriptor, AliasInfo, AliasType, ParameterMode, RoutineInfo, RoutineParameter,
            SqlAccess, IBM_SYSTEM_FUN_SCHEMA_UUID, IBM_SYSTEM_SCHEMA_NAME, SQLJ_SCHEMA_NAME,
            SYSTEM_UTIL_SCHEMA_NAME,
        },
        version::DictionaryVersion,
    },
    def::{DataType, TypeDescriptor, Uuid},
    std::sync::OnceLock,
};

pub const SYSTEM_PROCEDURES_CLASS: &str = "SystemProcedures";
pub const SYSTEM_FUNCTIONS_CLASS: &str = "SystemFunctions";

const IDENT: DataType = DataType::Varchar(128);
const LONG_TEXT: DataType = DataType::Varchar(32672);
const SMALLINT: DataType = DataType::SmallInt;
const INT: DataType = DataType::Int;
const DELIM: DataType = DataType::Char(1);

/// A routine created in a system schema.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinRoutine {
    pub schema: &'static str,
    pub name: &'static str,
    pub parameters: &'static [(&'static str, DataType)],
    /// Number of trailing parameters that are OUT parameters.
    pub out_parameters: usize,
    pub result_sets: u16,
    pub sql_access: SqlAccess,
    /// Functions have a return type, procedures do not.
    pub return_type: Option<DataType>,
    pub since: DictionaryVersion,
}

impl BuiltinRoutine {
    const fn procedure(
        schema: &'static str,
        name: &'static str,
        parameters: &'static [(&'static str, DataType)],
        sql_access: SqlAccess,
    ) -> Self {
        Self {
            schema,
            name,
            parameters,
            out_parameters: 0,
            result_sets: 0,
            sql_access,
            return_type: None,
            since: DictionaryVersion::V10_0,
        }
    }

    const fn function(
        schema: &'static str,
        name: &'static str,
        parameters: &'static [(&'static str, DataType)],
        return_type: DataType,
        sql_access: SqlAccess,
    ) -> Self {
        let mut routine = Self::procedure(schema, name, parameters, sql_access);
        routine.return_type = Some(return_type);
        routine
    }

    const fn metadata(name: &'static str, parameters: &'static [(&'static str, DataType)]) -> Self {
        let mut routine =
            Self::procedure(IBM_SYSTEM_SCHEMA_NAME, name, parameters, SqlAccess::ReadsSql);
        routine.result_sets = 1;
        routine
    }

    const fn with_out_parameters(mut self, count: usize) -> Self {
        self.out_parameters = count;
        self
    }

    const fn since(mut self, version: DictionaryVersion) -> Self {
        self.since = version;
        self
    }

    pub fn alias_type(&self) -> AliasType {
        if self.return_type.is_some() {
            AliasType::Function
        } else {
            AliasType::Procedure
        }
    }

    pub fn routine_info(&self) -> RoutineInfo {
        let first_out = self.parameters.len() - self.out_parameters;
        let parameters = self
            .parameters
            .iter()
            .enumerate()
            .map(|(i, &(name, ty))| RoutineParameter {
                name: name.to_string(),
                ty: TypeDescriptor::nullable(ty),
                mode: if i < first_out {
                    ParameterMode::In
                } else {
                    ParameterMode::Out
                },
            })
            .collect();

        RoutineInfo {
            method_name: self.name.to_string(),
            parameters,
            return_type: self.return_type.map(TypeDescriptor::nullable),
            sql_access: self.sql_access,
            deterministic: false,
            called_on_null_input: true,
            dynamic_result_sets: self.result_sets,
        }
    }

    /// Builds the SYSALIASES descriptor of this routine in schema `schema_id`.
    pub fn descriptor(&self, schema_id: Uuid) -> AliasDescriptor {
        AliasDescriptor::new(
            self.name,
            schema_id,
            SYSTEM_PROCEDURES_CLASS,
            self.alias_type(),
            true,
            AliasInfo::Routine(self.routine_info()),
        )
    }
}

const SQLJ_ROUTINES: &[BuiltinRoutine] = &[
    BuiltinRoutine::procedure(
        SQLJ_SCHEMA_NAME,
        "INSTALL_JAR",
        &[("URL", DataType::Varchar(256)), ("JAR", IDENT), ("DEPLOY", INT)],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SQLJ_SCHEMA_NAME,
        "REPLACE_JAR",
        &[("URL", DataType::Varchar(256)), ("JAR", IDENT)],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SQLJ_SCHEMA_NAME,
        "REMOVE_JAR",
        &[("JAR", IDENT), ("UNDEPLOY", INT)],
        SqlAccess::ModifiesSql,
    ),
];

const UTIL_ROUTINES: &[BuiltinRoutine] = &[
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_SET_DATABASE_PROPERTY",
        &[("KEY", IDENT), ("VALUE", LONG_TEXT)],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_COMPRESS_TABLE",
        &[("SCHEMANAME", IDENT), ("TABLENAME", IDENT), ("SEQUENTIAL", SMALLINT)],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_CHECKPOINT_DATABASE",
        &[],
        SqlAccess::ContainsSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_FREEZE_DATABASE",
        &[],
        SqlAccess::ContainsSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_UNFREEZE_DATABASE",
        &[],
        SqlAccess::ContainsSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_BACKUP_DATABASE",
        &[("BACKUPDIR", LONG_TEXT)],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_BACKUP_DATABASE_AND_ENABLE_LOG_ARCHIVE_MODE",
        &[("BACKUPDIR", LONG_TEXT), ("DELETE_ARCHIVED_LOG_FILES", SMALLINT)],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_DISABLE_LOG_ARCHIVE_MODE",
        &[("DELETE_ARCHIVED_LOG_FILES", SMALLINT)],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_SET_RUNTIMESTATISTICS",
        &[("ENABLE", SMALLINT)],
        SqlAccess::ContainsSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_SET_STATISTICS_TIMING",
        &[("ENABLE", SMALLINT)],
        SqlAccess::ContainsSql,
    ),
    BuiltinRoutine::function(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_GET_DATABASE_PROPERTY",
        &[("KEY", IDENT)],
        LONG_TEXT,
        SqlAccess::ReadsSql,
    ),
    BuiltinRoutine::function(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_CHECK_TABLE",
        &[("SCHEMANAME", IDENT), ("TABLENAME", IDENT)],
        INT,
        SqlAccess::ReadsSql,
    ),
    BuiltinRoutine::function(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_GET_RUNTIMESTATISTICS",
        &[],
        DataType::LongVarchar,
        SqlAccess::ContainsSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_EXPORT_TABLE",
        &[
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("FILENAME", LONG_TEXT),
            ("COLUMNDELIMITER", DELIM),
            ("CHARACTERDELIMITER", DELIM),
            ("CODESET", IDENT),
        ],
        SqlAccess::ReadsSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_EXPORT_QUERY",
        &[
            ("SELECTSTATEMENT", LONG_TEXT),
            ("FILENAME", LONG_TEXT),
            ("COLUMNDELIMITER", DELIM),
            ("CHARACTERDELIMITER", DELIM),
            ("CODESET", IDENT),
        ],
        SqlAccess::ReadsSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_IMPORT_TABLE",
        &[
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("FILENAME", LONG_TEXT),
            ("COLUMNDELIMITER", DELIM),
            ("CHARACTERDELIMITER", DELIM),
            ("CODESET", IDENT),
            ("REPLACE", SMALLINT),
        ],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_IMPORT_DATA",
        &[
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("INSERTCOLUMNLIST", LONG_TEXT),
            ("COLUMNINDEXES", LONG_TEXT),
            ("FILENAME", LONG_TEXT),
            ("COLUMNDELIMITER", DELIM),
            ("CHARACTERDELIMITER", DELIM),
            ("CODESET", IDENT),
            ("REPLACE", SMALLINT),
        ],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_BULK_INSERT",
        &[
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("VTINAME", LONG_TEXT),
            ("VTIARG", LONG_TEXT),
        ],
        SqlAccess::ModifiesSql,
    ),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_INPLACE_COMPRESS_TABLE",
        &[
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("PURGE_ROWS", SMALLINT),
            ("DEFRAGMENT_ROWS", SMALLINT),
            ("TRUNCATE_END", SMALLINT),
        ],
        SqlAccess::ModifiesSql,
    )
    .since(DictionaryVersion::V10_1),
    BuiltinRoutine::procedure(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_UPDATE_STATISTICS",
        &[("SCHEMANAME", IDENT), ("TABLENAME", IDENT), ("INDEXNAME", IDENT)],
        SqlAccess::ModifiesSql,
    )
    .since(DictionaryVersion::V10_6),
    BuiltinRoutine::function(
        SYSTEM_UTIL_SCHEMA_NAME,
        "SYSCS_PEEK_AT_SEQUENCE",
        &[("SCHEMANAME", IDENT), ("SEQUENCENAME", IDENT)],
        DataType::BigInt,
        SqlAccess::ReadsSql,
    )
    .since(DictionaryVersion::V10_6),
];

const METADATA_ROUTINES: &[BuiltinRoutine] = &[
    BuiltinRoutine::procedure(
        IBM_SYSTEM_SCHEMA_NAME,
        "SQLCAMESSAGE",
        &[
            ("SQLCODE", INT),
            ("SQLERRML", SMALLINT),
            ("SQLERRMC", DataType::Varchar(70)),
            ("SQLERRP", DataType::Char(8)),
            ("SQLERRD0", INT),
            ("SQLERRD1", INT),
            ("SQLERRD2", INT),
            ("SQLERRD3", INT),
            ("SQLERRD4", INT),
            ("SQLERRD5", INT),
            ("SQLWARN", DataType::Char(11)),
            ("SQLSTATE", DataType::Char(5)),
            ("FILE", DataType::Varchar(50)),
            ("LOCALE", DataType::Varchar(5)),
            ("MESSAGE", DataType::Varchar(2400)),
            ("RETURNCODE", INT),
        ],
        SqlAccess::ReadsSql,
    )
    .with_out_parameters(2),
    BuiltinRoutine::metadata(
        "SQLPROCEDURES",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("PROCNAME", IDENT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLTABLES",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("TABLETYPE", DataType::Varchar(4000)),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLCOLUMNS",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("COLUMNNAME", IDENT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLPRIMARYKEYS",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLTABLEPRIVILEGES",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLPROCEDURECOLS",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("PROCNAME", IDENT),
            ("PARAMNAME", IDENT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLCOLPRIVILEGES",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("COLUMNNAME", IDENT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLUDTS",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMAPATTERN", IDENT),
            ("TYPENAMEPATTERN", IDENT),
            ("UDTTYPES", IDENT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLFOREIGNKEYS",
        &[
            ("PKCATALOGNAME", IDENT),
            ("PKSCHEMANAME", IDENT),
            ("PKTABLENAME", IDENT),
            ("FKCATALOGNAME", IDENT),
            ("FKSCHEMANAME", IDENT),
            ("FKTABLENAME", IDENT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLSPECIALCOLUMNS",
        &[
            ("COLTYPE", SMALLINT),
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("SCOPE", SMALLINT),
            ("NULLABLE", SMALLINT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata(
        "SQLGETTYPEINFO",
        &[("DATATYPE", SMALLINT), ("OPTIONS", DataType::Varchar(4000))],
    ),
    BuiltinRoutine::metadata(
        "SQLSTATISTICS",
        &[
            ("CATALOGNAME", IDENT),
            ("SCHEMANAME", IDENT),
            ("TABLENAME", IDENT),
            ("UNIQUE", SMALLINT),
            ("RESERVED", SMALLINT),
            ("OPTIONS", DataType::Varchar(4000)),
        ],
    ),
    BuiltinRoutine::metadata("METADATA", &[]),
];

/// Every routine stored in the catalogs at the current version.
pub fn system_routines() -> impl Iterator<Item = &'static BuiltinRoutine> {
    SQLJ_ROUTINES
        .iter()
        .chain(UTIL_ROUTINES)
        .chain(METADATA_ROUTINES)
}

/// Routines a database at `from` lacks and one at `to` has.
pub fn routines_added_between(
    from: DictionaryVersion,
    to: DictionaryVersion,
) -> impl Iterator<Item = &'static BuiltinRoutine> {
    system_routines().filter(move |r| r.since > from && r.since <= to)
}

/// SYSCS_UTIL routines PUBLIC may execute once grants are enforced. Every
/// other system routine is reserved to the database owner.
pub const PUBLIC_ROUTINES: &[&str] = &[
    "SYSCS_SET_RUNTIMESTATISTICS",
    "SYSCS_SET_STATISTICS_TIMING",
    "SYSCS_COMPRESS_TABLE",
    "SYSCS_INPLACE_COMPRESS_TABLE",
    "SYSCS_UPDATE_STATISTICS",
    "SYSCS_GET_RUNTIMESTATISTICS",
    "SYSCS_PEEK_AT_SEQUENCE",
];

pub fn is_public_routine(routine: &BuiltinRoutine) -> bool {
    routine.schema == SYSTEM_UTIL_SCHEMA_NAME && PUBLIC_ROUTINES.contains(&routine.name)
}

/// (name, parameters, return type, deterministic)
type SysfunSignature = (&'static str, &'static [&'static str], DataType, bool);

const SYSFUN_SIGNATURES: &[SysfunSignature] = &[
    ("ACOS", &["X"], DataType::Double, true),
    ("ASIN", &["X"], DataType::Double, true),
    ("ATAN", &["X"], DataType::Double, true),
    ("ATAN2", &["Y", "X"], DataType::Double, true),
    ("COS", &["X"], DataType::Double, true),
    ("SIN", &["X"], DataType::Double, true),
    ("TAN", &["X"], DataType::Double, true),
    ("COT", &["X"], DataType::Double, true),
    ("COSH", &["X"], DataType::Double, true),
    ("SINH", &["X"], DataType::Double, true),
    ("TANH", &["X"], DataType::Double, true),
    ("PI", &[], DataType::Double, true),
    ("DEGREES", &["X"], DataType::Double, true),
    ("RADIANS", &["X"], DataType::Double, true),
    ("LN", &["X"], DataType::Double, true),
    ("LOG", &["X"], DataType::Double, true),
    ("LOG10", &["X"], DataType::Double, true),
    ("EXP", &["X"], DataType::Double, true),
    ("CEIL", &["X"], DataType::Double, true),
    ("CEILING", &["X"], DataType::Double, true),
    ("FLOOR", &["X"], DataType::Double, true),
    ("SIGN", &["X"], DataType::Int, true),
    ("RANDOM", &[], DataType::Double, false),
    ("RAND", &["SEED"], DataType::Double, false),
];

fn sysfun_descriptor(
    &(name, params, return_type, deterministic): &SysfunSignature,
) -> AliasDescriptor {
    let arg_type = if name == "RAND" {
        DataType::Int
    } else {
        DataType::Double
    };
    let info = RoutineInfo {
        method_name: name.to_ascii_lowercase(),
        parameters: params
            .iter()
            .map(|p| RoutineParameter::input(*p, TypeDescriptor::nullable(arg_type)))
            .collect(),
        return_type: Some(TypeDescriptor::nullable(return_type)),
        sql_access: SqlAccess::NoSql,
        deterministic,
        called_on_null_input: false,
        dynamic_result_sets: 0,
    };

    AliasDescriptor::new(
        name,
        IBM_SYSTEM_FUN_SCHEMA_UUID,
        SYSTEM_FUNCTIONS_CLASS,
        AliasType::Function,
        true,
        AliasInfo::Routine(info),
    )
}

static SYSFUN_FUNCTIONS: OnceLock<Vec<AliasDescriptor>> = OnceLock::new();

pub fn sysfun_functions() -> &'static [AliasDescriptor] {
    SYSFUN_FUNCTIONS.get_or_init(|| SYSFUN_SIGNATURES.iter().map(sysfun_descriptor).collect())
}

/// Looks up a SYSFUN function; only the function namespace holds any.
pub fn sysfun_function(name: &str, namespace: AliasType) -> Option<&'static AliasDescriptor> {
    if namespace != AliasType::Function {
        return None;
    }
    sysfun_functions().iter().find(|ad| ad.name == name)
}

/// A virtual table in SYSCS_DIAG.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DiagnosticTable {
    pub name: &'static str,
    pub implementation: &'static str,
    /// Table functions take arguments and are invoked with TABLE(...).
    pub table_function: bool,
}

pub const DIAGNOSTIC_TABLES: &[DiagnosticTable] = &[
    DiagnosticTable {
        name: "LOCK_TABLE",
        implementation: "diag::LockTable",
        table_function: false,
    },
    DiagnosticTable {
        name: "STATEMENT_CACHE",
        implementation: "diag::StatementCache",
        table_function: false,
    },
    DiagnosticTable {
        name: "TRANSACTION_TABLE",
        implementation: "diag::TransactionTable",
        table_function: false,
    },
    DiagnosticTable {
        name: "ERROR_MESSAGES",
        implementation: "diag::ErrorMessages",
        table_function: false,
    },
    DiagnosticTable {
        name: "CONTAINED_ROLES",
        implementation: "diag::ContainedRoles",
        table_function: true,
    },
    DiagnosticTable {
        name: "SPACE_TABLE",
        implementation: "diag::SpaceTable",
        table_function: true,
    },
    DiagnosticTable {
        name: "ERROR_LOG_READER",
        implementation: "diag::ErrorLogReader",
        table_function: true,
    },
    DiagnosticTable {
        name: "STATEMENT_DURATION",
        implementation: "diag::StatementDuration",
        table_function: true,
    },
];

/// Resolves a SYSCS_DIAG name. Plain tables and table functions are
/// separate namespaces.
pub fn diagnostic_table(name: &str, table_function: bool) -> Option<&'static DiagnosticTable> {
    DIAGNOSTIC_TABLES
        .iter()
        .find(|t| t.name == name && t.table_function == table_function)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_unique_per_schema() {
        let mut seen = std::collections::HashSet::new();
        for r in system_routines() {
            assert!(seen.insert((r.schema, r.name)), "{}.{}", r.schema, r.name);
        }
    }

    #[test]
    fn out_parameters_trail() {
        let routine = system_routines().find(|r| r.name == "SQLCAMESSAGE").unwrap();
        let info = routine.routine_info();

        assert_eq!(info.parameters.len(), 16);
        let modes = info.parameters.iter().map(|p| p.mode).collect::<Vec<_>>();
        assert!(modes[..14].iter().all(|m| *m == ParameterMode::In));
        assert_eq!(&modes[14..], &[ParameterMode::Out, ParameterMode::Out]);
    }

    #[test]
    fn functions_have_return_types() {
        let routine = system_routines()
            .find(|r| r.name == "SYSCS_GET_DATABASE_PROPERTY")
            .unwrap();
        let ad = routine.descriptor(Uuid::new_v4());

        assert_eq!(ad.alias_type, AliasType::Function);
        assert!(ad.system);
        let info = ad.routine_info().unwrap();
        assert_eq!(info.return_type, Some(TypeDescriptor::nullable(LONG_TEXT)));
        assert!(info.called_on_null_input);

        let metadata = system_routines().find(|r| r.name == "SQLTABLES").unwrap();
        assert_eq!(metadata.alias_type(), AliasType::Procedure);
        assert_eq!(metadata.routine_info().dynamic_result_sets, 1);
    }

    #[test]
    fn upgrade_adds_later_routines() {
        let added = routines_added_between(DictionaryVersion::V10_2, DictionaryVersion::CURRENT)
            .map(|r| r.name)
            .collect::<Vec<_>>();
        assert_eq!(added, vec!["SYSCS_UPDATE_STATISTICS", "SYSCS_PEEK_AT_SEQUENCE"]);

        assert_eq!(
            routines_added_between(DictionaryVersion::CURRENT, DictionaryVersion::CURRENT).count(),
            0
        );
    }

    #[test]
    fn public_routines_exist() {
        for name in PUBLIC_ROUTINES {
            let routine = system_routines().find(|r| r.name == *name).unwrap();
            assert!(is_public_routine(routine));
        }
        let backup = system_routines()
            .find(|r| r.name == "SYSCS_BACKUP_DATABASE")
            .unwrap();
        assert!(!is_public_routine(backup));
    }

    #[test]
    fn sysfun_is_built_once() {
        let first = sysfun_function("ATAN2", AliasType::Function).unwrap();
        let again = sysfun_function("ATAN2", AliasType::Function).unwrap();

        assert_eq!(first.uuid, again.uuid);
        assert_eq!(first.schema_id, IBM_SYSTEM_FUN_SCHEMA_UUID);
        assert_eq!(first.routine_info().unwrap().parameters.len(), 2);
        assert!(sysfun_function("ATAN2", AliasType::Procedure).is_none());
        assert!(sysfun_function("NOPE", AliasType::Function).is_none());
    }

    #[test]
    fn diagnostic_namespaces() {
        assert_eq!(
            diagnostic_table("LOCK_TABLE", false).map(|t| t.implementation),
            Some("diag::LockTable")
        );
        assert!(diagnostic_table("LOCK_TABLE", true).is_none());
        assert!(diagnostic_table("SPACE_TABLE", true).is_some());
    }
}

use {
    crate::version::DictionaryVersion,
    snafu::{prelude::*, Backtrace},
    std::{fmt, time::Duration},
};

/// The kind of catalog object an error is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectKind {
    Schema,
    Table,
    View,
    Column,
    Conglomerate,
    Constraint,
    Trigger,
    Statement,
    Alias,
    File,
    Dependency,
    Statistics,
    Permission,
    Role,
    Sequence,
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}",
            match self {
                Self::Schema => "schema",
                Self::Table => "table",
                Self::View => "view",
                Self::Column => "column",
                Self::Conglomerate => "index",
                Self::Constraint => "constraint",
                Self::Trigger => "trigger",
                Self::Statement => "stored statement",
                Self::Alias => "routine or alias",
                Self::File => "file",
                Self::Dependency => "dependency",
                Self::Statistics => "statistics",
                Self::Permission => "permission",
                Self::Role => "role",
                Self::Sequence => "sequence",
            }
        )
    }
}

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("{} '{}' already exists in {}", kind, name, parent))]
    ObjectAlreadyExists {
        kind: ObjectKind,
        name: String,
        parent: String,
        backtrace: Backtrace,
    },

    #[snafu(display("{} '{}' does not exist", kind, name))]
    ObjectNotFound {
        kind: ObjectKind,
        name: String,
        backtrace: Backtrace,
    },

    #[snafu(display("internal error: {}", details))]
    Internal {
        details: String,
        backtrace: Backtrace,
    },

    #[snafu(display("malformed {} row: {}", catalog, details))]
    InvalidRow {
        catalog: &'static str,
        details: String,
        backtrace: Backtrace,
    },

    #[snafu(display(
        "{} requires dictionary version {} but the database is at {}",
        feature,
        required,
        actual
    ))]
    VersionTooOld {
        feature: String,
        required: DictionaryVersion,
        actual: DictionaryVersion,
        backtrace: Backtrace,
    },

    #[snafu(display("the schema cannot be changed while a statement is being compiled"))]
    DdlDuringBind { backtrace: Backtrace },

    #[snafu(display("timed out after {:?} waiting to change the dictionary", waited))]
    LockTimeout {
        waited: Duration,
        backtrace: Backtrace,
    },

    #[snafu(display("constraint '{}' is referenced by {} foreign key(s)", name, count))]
    ConstraintReferenced {
        name: String,
        count: i32,
        backtrace: Backtrace,
    },

    #[snafu(display("sequence generator '{}' is exhausted", name))]
    SequenceExhausted { name: String, backtrace: Backtrace },

    #[snafu(display("failed to boot the dictionary: missing boot parameter {}", key))]
    MissingBootParameter { key: String, backtrace: Backtrace },

    #[snafu(display("store error: {}", source))]
    Access {
        #[snafu(backtrace)]
        source: access::Error,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

impl From<access::Error> for Error {
    fn from(source: access::Error) -> Self {
        Error::Access { source }
    }
}

use {
    crate::{codec, ConglomerateId, TransactionId},
    def::TypeDescriptor,
    snafu::{prelude::*, Backtrace},
    std::{io, path::PathBuf},
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(crate)))]
pub enum Error {
    #[snafu(display("conglomerate {} does not exist", id))]
    NoSuchConglomerate { id: ConglomerateId, backtrace: Backtrace },

    #[snafu(display("conglomerate {} is not a {}", id, expected))]
    WrongConglomerateKind {
        id: ConglomerateId,
        expected: &'static str,
        backtrace: Backtrace,
    },

    #[snafu(display("expected {} values but got {}", expected, actual))]
    ValuesCount {
        expected: usize,
        actual: usize,
        backtrace: Backtrace,
    },

    #[snafu(display("value for column {} does not fit {:?}", column, ty))]
    TypeMismatch {
        column: usize,
        ty: TypeDescriptor,
        backtrace: Backtrace,
    },

    #[snafu(display("transaction {} has already finished", id))]
    TransactionFinished { id: TransactionId, backtrace: Backtrace },

    #[snafu(display("failed to encode or decode a row"))]
    Codec {
        #[snafu(backtrace)]
        source: codec::Error,
    },

    #[snafu(display("failed to access {}", path.display()))]
    Io { path: PathBuf, source: io::Error },

    #[snafu(display("corrupted data file: {}", details))]
    Corrupted {
        details: String,
        backtrace: Backtrace,
    },

    #[snafu(display("no database exists in {}", path.display()))]
    NoDatabase { path: PathBuf, backtrace: Backtrace },

    #[snafu(display("a database already exists in {}", path.display()))]
    DatabaseExists { path: PathBuf, backtrace: Backtrace },
}

pub type Result<T> = std::result::Result<T, Error>;

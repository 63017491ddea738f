use {
    access::Error as AccessError, dictionary::Error as DictionaryError, snafu::prelude::*,
    std::path::PathBuf,
};

#[derive(Debug, Snafu)]
#[snafu(visibility(pub(super)))]
pub enum Error {
    #[snafu(display("{} already holds a database", path.display()))]
    AlreadyInitialized { path: PathBuf },

    #[snafu(display("{} holds no database, run `initdb` first", path.display()))]
    NotInitialized { path: PathBuf },

    #[snafu(display("Failed with accessing, source: {}", source))]
    Access {
        #[snafu(backtrace)]
        source: AccessError,
    },

    #[snafu(display("Failed with the data dictionary, source: {}", source))]
    Dictionary {
        #[snafu(backtrace)]
        source: DictionaryError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

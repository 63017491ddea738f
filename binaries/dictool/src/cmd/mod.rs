mod error;
mod init;


pub use {
    error::{Error, Result},
    init::{create_dictionary, describe, upgrade_dictionary, SchemaSummary, Summary},
};

//! The data dictionary: system catalogs describing every schema, table,
//! column, index, constraint, trigger, view, stored statement, routine,
//! permission and sequence of a database, kept in the store they describe.

pub mod catalog;
mod cache;
mod config;
mod coordinator;
pub mod descriptor;
mod dictionary;
mod error;
mod formatable;
mod generator;
mod index_row;
pub mod routines;
mod sql_name;
mod tab_info;
pub mod trigger_rewrite;
mod version;

pub use {
    config::{CatalogConfig, FlushPolicy, UPGRADE as UPGRADE_PROPERTY},
    coordinator::{CacheMode, Session},
    dictionary::{BootOptions, DataDictionary, DropBehavior, PermissionCheck},
    error::{Error, ObjectKind, Result},
    index_row::IndexRowGenerator,
    tab_info::{ReadMode, TabInfo},
    version::{DictionaryVersion, CORE_VERSION_PROPERTY, CREATE_VERSION_PROPERTY},
};

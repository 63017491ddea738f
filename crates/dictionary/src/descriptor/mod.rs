//! In-memory descriptors of catalog objects. Descriptors are plain values
//! rebuilt from catalog rows; objects refer to each other by UUID only.

mod alias;
mod column;
mod conglomerate;
mod constraint;
mod dependency;
mod file_info;
mod permission;
mod schema;
mod sequence;
mod sps;
mod statistics;
mod table;
mod trigger;
mod view;

pub use {
    alias::*, column::*, conglomerate::*, constraint::*, dependency::*, file_info::*,
    permission::*, schema::*, sequence::*, sps::*, statistics::*, table::*, trigger::*, view::*,
};

use def::Uuid;

/// An object name qualified by the UUID of its schema.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TableKey {
    pub schema_id: Uuid,
    pub name: String,
}

impl TableKey {
    pub fn new(schema_id: Uuid, name: impl Into<String>) -> Self {
        Self {
            schema_id,
            name: name.into(),
        }
    }
}

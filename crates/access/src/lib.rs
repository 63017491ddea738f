pub mod btree;
pub mod codec;
mod error;
mod heap;
mod manager;
mod qualifier;
mod scan;
mod snapshot;
mod transaction;

pub use {
    btree::{BTree, IndexEntry},
    codec::Codec,
    error::{Error, Result},
    heap::Heap,
    manager::AccessManager,
    qualifier::{Comparison, Qualifier, Qualifiers},
    scan::{IsolationLevel, ScanController, ScanOp, ScanRow, ScanSpec},
    transaction::{ConglomerateController, InsertOutcome, Transaction},
};

pub type ConglomerateId = i64;
pub type TransactionId = u64;

/// Address of a heap row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RowLocation {
    pub conglomerate: ConglomerateId,
    pub slot: u64,
}

impl RowLocation {
    pub const MIN: RowLocation = RowLocation::new(ConglomerateId::MIN, 0);

    pub const fn new(conglomerate: ConglomerateId, slot: u64) -> Self {
        Self { conglomerate, slot }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConglomerateKind {
    Heap,
    BTree { unique: bool },
}

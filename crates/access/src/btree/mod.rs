#[cfg(test)]
mod tests;

use {
    crate::RowLocation,
    def::{Row, Value},
    std::{cmp::Ordering, collections::BTreeSet, ops::Bound},
};

/// An index entry: the key columns plus the location of the base row.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
pub struct IndexEntry {
    pub key: Row,
    pub location: RowLocation,
}

impl IndexEntry {
    pub fn new(key: Row, location: RowLocation) -> Self {
        Self { key, location }
    }
}

/// Ordered index. A unique index rejects a second entry with an equal key
/// regardless of the row location.
#[derive(Debug, Clone)]
pub struct BTree {
    unique: bool,
    entries: BTreeSet<IndexEntry>,
}

impl BTree {
    pub fn new(unique: bool) -> Self {
        Self {
            unique,
            entries: BTreeSet::new(),
        }
    }

    pub fn is_unique(&self) -> bool {
        self.unique
    }

    /// Returns false when the entry would violate uniqueness or already exists.
    pub(crate) fn insert(&mut self, entry: IndexEntry) -> bool {
        if self.unique && self.contains_key(&entry.key) {
            return false;
        }

        self.entries.insert(entry)
    }

    pub(crate) fn remove(&mut self, entry: &IndexEntry) -> bool {
        self.entries.remove(entry)
    }

    pub fn contains_key(&self, key: &[Value]) -> bool {
        self.range_from(key)
            .next()
            .map(|entry| entry.key.as_slice() == key)
            .unwrap_or(false)
    }

    /// Entries whose key is greater than or equal to `key`, in key order.
    pub(crate) fn range_from<'a>(&'a self, key: &[Value]) -> impl Iterator<Item = &'a IndexEntry> {
        let start = IndexEntry::new(key.to_vec(), RowLocation::MIN);
        self.entries.range((Bound::Included(start), Bound::Unbounded))
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Compares the leading `prefix.len()` columns of `key` with `prefix`.
pub fn compare_prefix(key: &[Value], prefix: &[Value]) -> Ordering {
    key.iter()
        .zip(prefix.iter())
        .map(|(k, p)| k.cmp(p))
        .find(|ord| ord.is_ne())
        .unwrap_or_else(|| {
            if key.len() < prefix.len() {
                Ordering::Less
            } else {
                Ordering::Equal
            }
        })
}

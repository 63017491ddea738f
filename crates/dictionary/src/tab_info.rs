//! Runtime handle of one system catalog: where its heap and indexes live,
//! and the index-scan-then-heap-fetch routines every lookup goes through.

use {
    crate::{
        catalog::{CatalogDef, CatalogNumber},
        error::{InternalSnafu, Result},
        index_row::IndexRowGenerator,
    },
    access::{
        ConglomerateId, IndexEntry, InsertOutcome, IsolationLevel, Qualifier, Qualifiers,
        RowLocation, ScanSpec, Transaction,
    },
    common::dsa::BitSet,
    def::{Row, Value},
    parking_lot::Mutex,
    snafu::OptionExt,
    std::sync::OnceLock,
    tracing::{debug, warn},
};

/// How an index lookup treats a base row that disappeared between reading
/// the index entry and fetching the row.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadMode {
    /// The normal case. A missing base row means the catalog is corrupt.
    RepeatableRead,
    /// Lock-free advisory reads. Rows deleted behind the scan are skipped.
    ReadUncommittedAdvisory,
}

impl ReadMode {
    fn isolation(&self) -> IsolationLevel {
        match self {
            Self::RepeatableRead => IsolationLevel::RepeatableRead,
            Self::ReadUncommittedAdvisory => IsolationLevel::ReadUncommitted,
        }
    }
}

/// Physical conglomerates of a catalog. An index that does not exist yet
/// in the on-disk version is `None`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CatalogConglomerates {
    pub heap: ConglomerateId,
    pub indexes: Vec<Option<ConglomerateId>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertResult {
    Inserted(RowLocation),
    /// The row collided in the given unique index and was not stored.
    Duplicate { index: usize },
}

pub struct TabInfo {
    def: &'static CatalogDef,
    conglomerates: OnceLock<CatalogConglomerates>,
    fault_in: Mutex<()>,
}

impl TabInfo {
    pub fn new(def: &'static CatalogDef) -> Self {
        Self {
            def,
            conglomerates: OnceLock::new(),
            fault_in: Mutex::new(()),
        }
    }

    pub fn def(&self) -> &'static CatalogDef {
        self.def
    }

    pub fn number(&self) -> CatalogNumber {
        self.def.number
    }

    pub fn name(&self) -> &'static str {
        self.def.name
    }

    pub fn is_complete(&self) -> bool {
        self.conglomerates.get().is_some()
    }

    pub(crate) fn conglomerates(&self) -> Result<&CatalogConglomerates> {
        self.conglomerates.get().context(InternalSnafu {
            details: format!("{} is used before its conglomerates are known", self.def.name),
        })
    }

    pub fn heap_conglomerate(&self) -> Result<ConglomerateId> {
        Ok(self.conglomerates()?.heap)
    }

    pub fn index_conglomerate(&self, index: usize) -> Result<Option<ConglomerateId>> {
        Ok(self.conglomerates()?.indexes.get(index).copied().flatten())
    }

    pub fn index_row_generator(&self, index: usize) -> IndexRowGenerator {
        self.def.index_row_generator(index)
    }

    /// Records the conglomerates of a catalog whose location is already
    /// known (core catalogs at boot, any catalog right after creation).
    pub(crate) fn set_conglomerates(&self, conglomerates: CatalogConglomerates) {
        if self.conglomerates.set(conglomerates).is_err() {
            debug!(catalog = self.def.name, "conglomerates already recorded");
        }
    }

    /// Resolves the conglomerates on first use. Concurrent callers wait for
    /// the first one; a failed resolution leaves the handle incomplete so
    /// the next caller retries.
    pub(crate) fn fault_in(
        &self,
        resolve: impl FnOnce() -> Result<CatalogConglomerates>,
    ) -> Result<&CatalogConglomerates> {
        if let Some(conglomerates) = self.conglomerates.get() {
            return Ok(conglomerates);
        }

        let _guard = self.fault_in.lock();
        if let Some(conglomerates) = self.conglomerates.get() {
            return Ok(conglomerates);
        }

        let resolved = resolve()?;
        debug!(
            catalog = self.def.name,
            heap = resolved.heap,
            indexes = ?resolved.indexes,
            "faulted in catalog"
        );
        Ok(self.conglomerates.get_or_init(|| resolved))
    }

    /// Forgets the conglomerates after an upgrade rebuilt the catalog.
    pub(crate) fn reset(&mut self) {
        self.conglomerates.take();
    }

    fn heap_width(&self, tc: &Transaction, heap: ConglomerateId) -> Result<usize> {
        Ok(tc.conglomerate_format(heap)?.len())
    }

    fn present_indexes(&self) -> Result<Vec<(usize, ConglomerateId)>> {
        Ok(self
            .conglomerates()?
            .indexes
            .iter()
            .enumerate()
            .filter_map(|(i, c)| c.map(|c| (i, c)))
            .collect())
    }

    fn index_entry(&self, index: usize, row: &[Value], location: RowLocation) -> IndexEntry {
        self.index_row_generator(index).index_row(row, location)
    }

    /// Inserts a row into the heap and every index. On a unique-key
    /// collision nothing of the row is left behind.
    pub fn insert_row(&self, tc: &Transaction, row: Row) -> Result<InsertResult> {
        let heap_id = self.heap_conglomerate()?;
        let row = fit_row(row, self.heap_width(tc, heap_id)?);

        let heap = tc.open_conglomerate(heap_id)?;
        let location = heap.insert(row.clone())?;

        let mut added = vec![];
        for (index, conglomerate) in self.present_indexes()? {
            let entry = self.index_entry(index, &row, location);
            let controller = tc.open_conglomerate(conglomerate)?;
            match controller.insert_entry(entry.clone())? {
                InsertOutcome::Inserted => added.push((conglomerate, entry)),
                InsertOutcome::Duplicate => {
                    for (conglomerate, entry) in added {
                        tc.open_conglomerate(conglomerate)?.delete_entry(&entry)?;
                    }
                    heap.delete(location)?;
                    return Ok(InsertResult::Duplicate { index });
                }
            }
        }

        Ok(InsertResult::Inserted(location))
    }

    /// Inserts rows in order, stopping at the first duplicate. Returns the
    /// position of the offending row together with the index it hit.
    pub fn insert_rows(
        &self,
        tc: &Transaction,
        rows: impl IntoIterator<Item = Row>,
    ) -> Result<Option<(usize, usize)>> {
        for (n, row) in rows.into_iter().enumerate() {
            if let InsertResult::Duplicate { index } = self.insert_row(tc, row)? {
                return Ok(Some((n, index)));
            }
        }
        Ok(None)
    }

    /// Rows whose `index` key starts with `key` and whose base row passes
    /// `filter` (0-based heap columns). Falls back to a heap scan when the
    /// index does not exist in the on-disk version.
    pub fn fetch_via_index(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
        filter: &Qualifiers,
        mode: ReadMode,
        for_update: bool,
    ) -> Result<Vec<(RowLocation, Row)>> {
        let Some(index_id) = self.index_conglomerate(index)? else {
            return self.fetch_via_heap_by_key(tc, index, &key, filter);
        };

        let heap = tc.open_conglomerate(self.heap_conglomerate()?)?;
        let spec = ScanSpec::exact(key)
            .with_isolation(mode.isolation())
            .for_update(for_update);

        let mut rows = vec![];
        for entry in tc.open_scan(index_id, spec)? {
            match heap.fetch(entry.location, None)? {
                Some(row) => {
                    if filter.matches(&row) {
                        rows.push((entry.location, row));
                    }
                }
                None => match mode {
                    ReadMode::RepeatableRead => {
                        return InternalSnafu {
                            details: format!(
                                "{} row at {:?} is missing although its index entry exists",
                                self.def.name, entry.location
                            ),
                        }
                        .fail()
                    }
                    ReadMode::ReadUncommittedAdvisory => warn!(
                        catalog = self.def.name,
                        location = ?entry.location,
                        "base row deleted behind a read-uncommitted scan, skipping"
                    ),
                },
            }
        }

        Ok(rows)
    }

    fn fetch_via_heap_by_key(
        &self,
        tc: &Transaction,
        index: usize,
        key: &[Value],
        filter: &Qualifiers,
    ) -> Result<Vec<(RowLocation, Row)>> {
        let generator = self.index_row_generator(index);
        let key_qualifiers = generator
            .base_columns
            .iter()
            .zip(key)
            .map(|(&pos, value)| column_equals(pos as usize, value.clone()).with_ordered_nulls())
            .collect();

        let rows = self.fetch_via_heap(tc, Qualifiers::all_of(key_qualifiers), None)?;
        Ok(rows
            .into_iter()
            .filter(|(_, row)| filter.matches(row))
            .collect())
    }

    /// Full heap scan. Qualifiers see the whole row; the projection only
    /// decides which columns come back.
    pub fn fetch_via_heap(
        &self,
        tc: &Transaction,
        qualifiers: Qualifiers,
        projection: Option<BitSet>,
    ) -> Result<Vec<(RowLocation, Row)>> {
        let spec = ScanSpec::default()
            .with_qualifiers(qualifiers)
            .with_projection(projection);

        Ok(tc
            .open_scan(self.heap_conglomerate()?, spec)?
            .map(|r| (r.location, r.row))
            .collect())
    }

    pub fn fetch_row(&self, tc: &Transaction, location: RowLocation) -> Result<Option<Row>> {
        Ok(tc
            .open_conglomerate(self.heap_conglomerate()?)?
            .fetch(location, None)?)
    }

    pub fn row_location(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
    ) -> Result<Option<RowLocation>> {
        let rows = self.fetch_via_index(
            tc,
            index,
            key,
            &Qualifiers::none(),
            ReadMode::RepeatableRead,
            false,
        )?;
        Ok(rows.first().map(|(location, _)| *location))
    }

    /// Removes a heap row and its index entries. `row` must be the full row
    /// stored at `location`.
    pub fn delete_row(&self, tc: &Transaction, location: RowLocation, row: &[Value]) -> Result<()> {
        tc.open_conglomerate(self.heap_conglomerate()?)?
            .delete(location)?;

        for (index, conglomerate) in self.present_indexes()? {
            let entry = self.index_entry(index, row, location);
            tc.open_conglomerate(conglomerate)?.delete_entry(&entry)?;
        }
        Ok(())
    }

    /// Deletes every row found through `index`; returns how many went.
    pub fn delete_rows(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
        filter: &Qualifiers,
    ) -> Result<usize> {
        let rows = self.fetch_via_index(tc, index, key, filter, ReadMode::RepeatableRead, true)?;
        for (location, row) in &rows {
            self.delete_row(tc, *location, row)?;
        }
        Ok(rows.len())
    }

    /// Replaces the row at `location` and re-keys the index entries whose
    /// key changed. A unique-key collision restores the old row.
    pub fn update_row(
        &self,
        tc: &Transaction,
        location: RowLocation,
        old: &[Value],
        new: Row,
    ) -> Result<InsertResult> {
        let heap_id = self.heap_conglomerate()?;
        let new = fit_row(new, self.heap_width(tc, heap_id)?);

        let mut rekeyed: Vec<(ConglomerateId, IndexEntry, IndexEntry)> = vec![];
        for (index, conglomerate) in self.present_indexes()? {
            let old_entry = self.index_entry(index, old, location);
            let new_entry = self.index_entry(index, &new, location);
            if old_entry == new_entry {
                continue;
            }

            let controller = tc.open_conglomerate(conglomerate)?;
            controller.delete_entry(&old_entry)?;
            if controller.insert_entry(new_entry.clone())? == InsertOutcome::Duplicate {
                controller.insert_entry(old_entry)?;
                for (conglomerate, old_entry, new_entry) in rekeyed {
                    let controller = tc.open_conglomerate(conglomerate)?;
                    controller.delete_entry(&new_entry)?;
                    controller.insert_entry(old_entry)?;
                }
                return Ok(InsertResult::Duplicate { index });
            }
            rekeyed.push((conglomerate, old_entry, new_entry));
        }

        tc.open_conglomerate(heap_id)?.replace(location, &new, None)?;
        Ok(InsertResult::Inserted(location))
    }

    /// Applies `update` to every row found through `index` and writes the
    /// result back. Returns the number of rows changed.
    pub fn update_rows(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
        filter: &Qualifiers,
        mut update: impl FnMut(&mut Row) -> Result<()>,
    ) -> Result<usize> {
        let rows = self.fetch_via_index(tc, index, key, filter, ReadMode::RepeatableRead, true)?;
        for (location, old) in &rows {
            let mut new = old.clone();
            update(&mut new)?;
            if let InsertResult::Duplicate { index } = self.update_row(tc, *location, old, new)? {
                return InternalSnafu {
                    details: format!(
                        "update of {} collided in {}",
                        self.def.name,
                        self.def.index_name(index)
                    ),
                }
                .fail();
            }
        }
        Ok(rows.len())
    }
}

/// Equality on a 1-based catalog column.
pub(crate) fn column_equals(position: usize, value: impl Into<Value>) -> Qualifier {
    Qualifier::equals(position - 1, value)
}

/// Rows of catalogs created by an older version are narrower than the
/// current layout.
fn fit_row(mut row: Row, width: usize) -> Row {
    row.resize(width, Value::Null);
    row
}

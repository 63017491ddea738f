use {
    crate::{
        btree::IndexEntry,
        error::{
            Result, TransactionFinishedSnafu, TypeMismatchSnafu, ValuesCountSnafu,
            WrongConglomerateKindSnafu,
        },
        manager::{AccessManager, Conglomerate, ConglomerateData, StoreState, Undo},
        scan::{self, ScanController, ScanSpec},
        ConglomerateId, ConglomerateKind, RowLocation, TransactionId,
    },
    common::dsa::BitSet,
    def::{Row, TypeDescriptor, Value},
    parking_lot::Mutex,
    snafu::prelude::*,
    std::{
        collections::BTreeMap,
        sync::{
            atomic::{AtomicBool, Ordering},
            Arc,
        },
    },
    tracing::{debug, warn},
};

/// Result of inserting an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertOutcome {
    Inserted,
    /// A unique index already holds an entry with the same key.
    Duplicate,
}

/// A unit of work against the store. Writes are visible immediately;
/// `abort` (or dropping an unfinished transaction) undoes them.
pub struct Transaction {
    id: TransactionId,
    manager: Arc<AccessManager>,
    undo: Mutex<Vec<Undo>>,
    finished: AtomicBool,
}

impl Transaction {
    pub(crate) fn new(id: TransactionId, manager: Arc<AccessManager>) -> Self {
        Self {
            id,
            manager,
            undo: Mutex::new(vec![]),
            finished: AtomicBool::new(false),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn manager(&self) -> &Arc<AccessManager> {
        &self.manager
    }

    /// Starts an independent transaction whose commit does not depend on
    /// the outcome of this one.
    pub fn start_nested(&self) -> Transaction {
        self.manager.begin()
    }

    fn check_active(&self) -> Result<()> {
        ensure!(
            !self.finished.load(Ordering::Acquire),
            TransactionFinishedSnafu { id: self.id }
        );
        Ok(())
    }

    fn log(&self, undo: Undo) {
        self.undo.lock().push(undo);
    }

    pub fn create_conglomerate(
        &self,
        kind: ConglomerateKind,
        format: Vec<TypeDescriptor>,
    ) -> Result<ConglomerateId> {
        self.check_active()?;

        let mut state = self.manager.write();
        let id = state.next_conglomerate_id;
        state.next_conglomerate_id += 1;
        state
            .conglomerates
            .insert(id, Conglomerate::new(id, kind, format));
        drop(state);

        self.log(Undo::CreateConglomerate(id));
        debug!(txn = self.id, conglomerate = id, ?kind, "created conglomerate");

        Ok(id)
    }

    pub fn drop_conglomerate(&self, id: ConglomerateId) -> Result<()> {
        self.check_active()?;

        let mut state = self.manager.write();
        state.conglomerate(id)?;
        if let Some(conglomerate) = state.conglomerates.remove(&id) {
            self.log(Undo::DropConglomerate(conglomerate));
        }

        Ok(())
    }

    pub fn conglomerate_exists(&self, id: ConglomerateId) -> bool {
        self.manager.read().conglomerates.contains_key(&id)
    }

    pub fn conglomerate_kind(&self, id: ConglomerateId) -> Result<ConglomerateKind> {
        Ok(self.manager.read().conglomerate(id)?.kind())
    }

    /// Column types of the rows (or keys) stored in a conglomerate.
    pub fn conglomerate_format(&self, id: ConglomerateId) -> Result<Vec<TypeDescriptor>> {
        Ok(self.manager.read().conglomerate(id)?.format.clone())
    }

    pub fn open_conglomerate(&self, id: ConglomerateId) -> Result<ConglomerateController<'_>> {
        self.check_active()?;
        self.manager.read().conglomerate(id)?;

        Ok(ConglomerateController { txn: self, id })
    }

    pub fn open_scan(&self, id: ConglomerateId, spec: ScanSpec) -> Result<ScanController> {
        self.check_active()?;

        let state = self.manager.read();
        let rows = scan::collect(state.conglomerate(id)?, &spec);

        Ok(ScanController::new(rows, spec.isolation))
    }

    pub fn get_property(&self, key: &str) -> Option<String> {
        self.manager.property(key)
    }

    pub fn set_property(&self, key: &str, value: impl Into<String>) -> Result<()> {
        self.check_active()?;

        let old = self
            .manager
            .write()
            .properties
            .insert(key.to_string(), value.into());
        self.log(Undo::SetProperty {
            key: key.to_string(),
            old,
        });

        Ok(())
    }

    pub fn properties(&self) -> BTreeMap<String, String> {
        self.manager.read().properties.clone()
    }

    pub fn commit(&self) -> Result<()> {
        self.check_active()?;
        self.undo.lock().clear();
        self.finished.store(true, Ordering::Release);
        debug!(txn = self.id, "commit");

        Ok(())
    }

    pub fn abort(&self) -> Result<()> {
        self.check_active()?;
        self.rollback();
        self.finished.store(true, Ordering::Release);

        Ok(())
    }

    fn rollback(&self) {
        let undo = std::mem::take(&mut *self.undo.lock());
        if undo.is_empty() {
            return;
        }

        debug!(txn = self.id, operations = undo.len(), "rolling back");
        let mut state = self.manager.write();
        undo.into_iter()
            .rev()
            .for_each(|op| op.apply(&mut state));
    }

    pub fn is_finished(&self) -> bool {
        self.finished.load(Ordering::Acquire)
    }
}

impl Drop for Transaction {
    fn drop(&mut self) {
        if !self.is_finished() && !self.undo.get_mut().is_empty() {
            warn!(txn = self.id, "transaction dropped without commit, rolling back");
            self.rollback();
        }
    }
}

/// Row-level access to one conglomerate inside a transaction.
pub struct ConglomerateController<'a> {
    txn: &'a Transaction,
    id: ConglomerateId,
}

impl ConglomerateController<'_> {
    pub fn id(&self) -> ConglomerateId {
        self.id
    }

    /// Appends a row to a heap.
    pub fn insert(&self, row: Row) -> Result<RowLocation> {
        self.txn.check_active()?;

        let mut state = self.txn.manager.write();
        let conglomerate = state.conglomerate_mut(self.id)?;
        check_row(&conglomerate.format, &row)?;

        let location = match &mut conglomerate.data {
            ConglomerateData::Heap(heap) => heap.insert(self.id, row),
            ConglomerateData::BTree(_) => return self.wrong_kind("heap"),
        };
        drop(state);

        self.txn.log(Undo::InsertRow {
            conglomerate: self.id,
            slot: location.slot,
        });

        Ok(location)
    }

    /// Adds an index entry; a unique index reports `Duplicate` instead of
    /// failing so the caller can raise its own error.
    pub fn insert_entry(&self, entry: IndexEntry) -> Result<InsertOutcome> {
        self.txn.check_active()?;

        let mut state = self.txn.manager.write();
        let conglomerate = state.conglomerate_mut(self.id)?;
        check_row(&conglomerate.format, &entry.key)?;

        let inserted = match &mut conglomerate.data {
            ConglomerateData::BTree(btree) => btree.insert(entry.clone()),
            ConglomerateData::Heap(_) => return self.wrong_kind("btree"),
        };
        drop(state);

        if !inserted {
            return Ok(InsertOutcome::Duplicate);
        }

        self.txn.log(Undo::InsertEntry {
            conglomerate: self.id,
            entry,
        });

        Ok(InsertOutcome::Inserted)
    }

    /// Fetches a heap row. Columns outside `projection` come back as NULL.
    pub fn fetch(
        &self,
        location: RowLocation,
        projection: Option<&BitSet>,
    ) -> Result<Option<Row>> {
        let state = self.txn.manager.read();

        Ok(heap_row(&state, self.id, location)?.map(|row| project(row, projection)))
    }

    /// Replaces the columns of a heap row named by `columns`, or the whole
    /// row when no column set is given. Returns false if the row is gone.
    pub fn replace(
        &self,
        location: RowLocation,
        row: &[Value],
        columns: Option<&BitSet>,
    ) -> Result<bool> {
        self.txn.check_active()?;

        let mut state = self.txn.manager.write();
        let conglomerate = state.conglomerate_mut(self.id)?;
        let format = conglomerate.format.clone();

        let heap = match &mut conglomerate.data {
            ConglomerateData::Heap(heap) => heap,
            ConglomerateData::BTree(_) => return self.wrong_kind("heap"),
        };

        let Some(current) = heap.get_mut(location.slot) else {
            return Ok(false);
        };

        let mut updated = current.clone();
        match columns {
            Some(columns) => columns.iter().for_each(|i| {
                if let (Some(dst), Some(src)) = (updated.get_mut(i), row.get(i)) {
                    *dst = src.clone();
                }
            }),
            None => updated = row.to_vec(),
        }
        check_row(&format, &updated)?;

        let old = std::mem::replace(current, updated);
        drop(state);

        self.txn.log(Undo::ReplaceRow {
            conglomerate: self.id,
            slot: location.slot,
            old,
        });

        Ok(true)
    }

    /// Removes a heap row, returning false if it was already gone.
    pub fn delete(&self, location: RowLocation) -> Result<bool> {
        self.txn.check_active()?;

        let mut state = self.txn.manager.write();
        let removed = match &mut state.conglomerate_mut(self.id)?.data {
            ConglomerateData::Heap(heap) => heap.remove(location.slot),
            ConglomerateData::BTree(_) => return self.wrong_kind("heap"),
        };
        drop(state);

        Ok(match removed {
            Some(row) => {
                self.txn.log(Undo::DeleteRow {
                    conglomerate: self.id,
                    slot: location.slot,
                    row,
                });
                true
            }
            None => false,
        })
    }

    pub fn delete_entry(&self, entry: &IndexEntry) -> Result<bool> {
        self.txn.check_active()?;

        let mut state = self.txn.manager.write();
        let removed = match &mut state.conglomerate_mut(self.id)?.data {
            ConglomerateData::BTree(btree) => btree.remove(entry),
            ConglomerateData::Heap(_) => return self.wrong_kind("btree"),
        };
        drop(state);

        if removed {
            self.txn.log(Undo::DeleteEntry {
                conglomerate: self.id,
                entry: entry.clone(),
            });
        }

        Ok(removed)
    }

    fn wrong_kind<T>(&self, expected: &'static str) -> Result<T> {
        WrongConglomerateKindSnafu {
            id: self.id,
            expected,
        }
        .fail()
    }
}

fn heap_row<'s>(
    state: &'s StoreState,
    id: ConglomerateId,
    location: RowLocation,
) -> Result<Option<&'s Row>> {
    match &state.conglomerate(id)?.data {
        ConglomerateData::Heap(heap) => Ok(heap.get(location.slot)),
        ConglomerateData::BTree(_) => WrongConglomerateKindSnafu {
            id,
            expected: "heap",
        }
        .fail(),
    }
}

pub(crate) fn project(row: &Row, projection: Option<&BitSet>) -> Row {
    match projection {
        Some(columns) => row
            .iter()
            .enumerate()
            .map(|(i, v)| if columns.get(i) { v.clone() } else { Value::Null })
            .collect(),
        None => row.clone(),
    }
}

fn check_row(format: &[TypeDescriptor], row: &[Value]) -> Result<()> {
    ensure!(
        format.len() == row.len(),
        ValuesCountSnafu {
            expected: format.len(),
            actual: row.len(),
        }
    );

    format
        .iter()
        .zip(row.iter())
        .enumerate()
        .try_for_each(|(column, (ty, value))| {
            ensure!(ty.accepts(value), TypeMismatchSnafu { column, ty: *ty });
            Ok(())
        })
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::Qualifier,
        def::DataType,
    };

    fn heap_format() -> Vec<TypeDescriptor> {
        vec![
            TypeDescriptor::not_null(DataType::Varchar(20)),
            TypeDescriptor::nullable(DataType::Int),
        ]
    }

    #[test]
    fn abort_restores_everything() -> Result<()> {
        let manager = AccessManager::in_memory();

        let setup = manager.begin();
        let heap = setup.create_conglomerate(ConglomerateKind::Heap, heap_format())?;
        let loc = setup
            .open_conglomerate(heap)?
            .insert(vec!["a".into(), Value::Int(1)])?;
        setup.commit()?;

        let txn = manager.begin();
        let cc = txn.open_conglomerate(heap)?;
        cc.replace(loc, &["b".into(), Value::Int(2)], None)?;
        cc.insert(vec!["c".into(), Value::Null])?;
        let index = txn.create_conglomerate(
            ConglomerateKind::BTree { unique: true },
            vec![TypeDescriptor::not_null(DataType::Int)],
        )?;
        txn.set_property("key", "value")?;
        txn.abort()?;

        let check = manager.begin();
        assert!(!check.conglomerate_exists(index));
        assert_eq!(check.get_property("key"), None);
        let rows = check
            .open_scan(heap, ScanSpec::default())?
            .map(|r| r.row)
            .collect::<Vec<_>>();
        assert_eq!(rows, vec![vec![Value::from("a"), Value::Int(1)]]);

        Ok(())
    }

    #[test]
    fn replace_selected_columns() -> Result<()> {
        let manager = AccessManager::in_memory();
        let txn = manager.begin();
        let heap = txn.create_conglomerate(ConglomerateKind::Heap, heap_format())?;
        let cc = txn.open_conglomerate(heap)?;
        let loc = cc.insert(vec!["a".into(), Value::Int(1)])?;

        let columns = BitSet::from_positions(2, [1]);
        assert!(cc.replace(loc, &[Value::Null, Value::Int(5)], Some(&columns))?);
        assert_eq!(
            cc.fetch(loc, None)?,
            Some(vec![Value::from("a"), Value::Int(5)])
        );
        assert_eq!(
            cc.fetch(loc, Some(&BitSet::from_positions(2, [0])))?,
            Some(vec![Value::from("a"), Value::Null])
        );

        assert!(cc.delete(loc)?);
        assert!(!cc.delete(loc)?);
        assert!(!cc.replace(loc, &[Value::Null, Value::Null], None)?);

        Ok(())
    }

    #[test]
    fn rejects_badly_shaped_rows() -> Result<()> {
        let manager = AccessManager::in_memory();
        let txn = manager.begin();
        let heap = txn.create_conglomerate(ConglomerateKind::Heap, heap_format())?;
        let cc = txn.open_conglomerate(heap)?;

        assert!(matches!(
            cc.insert(vec![Value::Null, Value::Int(1)]),
            Err(crate::Error::TypeMismatch { column: 0, .. })
        ));
        assert!(matches!(
            cc.insert(vec!["a".into()]),
            Err(crate::Error::ValuesCount { .. })
        ));
        assert!(matches!(
            cc.insert_entry(IndexEntry::new(vec![], RowLocation::MIN)),
            Err(crate::Error::ValuesCount { .. })
        ));

        Ok(())
    }

    #[test]
    fn duplicate_is_reported_not_raised() -> Result<()> {
        let manager = AccessManager::in_memory();
        let txn = manager.begin();
        let index = txn.create_conglomerate(
            ConglomerateKind::BTree { unique: true },
            vec![TypeDescriptor::not_null(DataType::Int)],
        )?;
        let cc = txn.open_conglomerate(index)?;

        let entry = |slot| IndexEntry::new(vec![Value::Int(7)], RowLocation::new(1, slot));
        assert_eq!(cc.insert_entry(entry(1))?, InsertOutcome::Inserted);
        assert_eq!(cc.insert_entry(entry(2))?, InsertOutcome::Duplicate);

        let found = txn
            .open_scan(index, ScanSpec::exact(vec![Value::Int(7)]))?
            .collect::<Vec<_>>();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].location, RowLocation::new(1, 1));

        let none = txn
            .open_scan(
                index,
                ScanSpec::exact(vec![Value::Int(7)])
                    .with_qualifiers(Qualifier::equals(0, 8).into()),
            )?
            .count();
        assert_eq!(none, 0);

        Ok(())
    }

    #[test]
    fn finished_transactions_refuse_work() -> Result<()> {
        let manager = AccessManager::in_memory();
        let txn = manager.begin();
        txn.commit()?;

        assert!(matches!(
            txn.create_conglomerate(ConglomerateKind::Heap, vec![]),
            Err(crate::Error::TransactionFinished { .. })
        ));

        Ok(())
    }

    #[test]
    fn dropping_an_open_transaction_rolls_back() -> Result<()> {
        let manager = AccessManager::in_memory();
        {
            let txn = manager.begin();
            txn.create_conglomerate(ConglomerateKind::Heap, heap_format())?;
        }
        assert_eq!(manager.conglomerate_count(), 0);

        Ok(())
    }
}

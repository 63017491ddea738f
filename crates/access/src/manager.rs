use {
    crate::{
        btree::{BTree, IndexEntry},
        error::{DatabaseExistsSnafu, NoDatabaseSnafu, NoSuchConglomerateSnafu, Result},
        heap::Heap,
        snapshot, ConglomerateId, ConglomerateKind, Transaction,
    },
    def::{Row, TypeDescriptor},
    parking_lot::{RwLock, RwLockReadGuard, RwLockWriteGuard},
    snafu::{ensure, OptionExt},
    std::{
        collections::{BTreeMap, HashMap},
        path::{Path, PathBuf},
        sync::{
            atomic::{AtomicU64, Ordering},
            Arc,
        },
    },
    tracing::{debug, info},
};

#[derive(Debug, Clone)]
pub(crate) enum ConglomerateData {
    Heap(Heap),
    BTree(BTree),
}

#[derive(Debug, Clone)]
pub(crate) struct Conglomerate {
    pub id: ConglomerateId,
    pub format: Vec<TypeDescriptor>,
    pub data: ConglomerateData,
}

impl Conglomerate {
    pub fn new(id: ConglomerateId, kind: ConglomerateKind, format: Vec<TypeDescriptor>) -> Self {
        let data = match kind {
            ConglomerateKind::Heap => ConglomerateData::Heap(Heap::default()),
            ConglomerateKind::BTree { unique } => ConglomerateData::BTree(BTree::new(unique)),
        };

        Self { id, format, data }
    }

    pub fn kind(&self) -> ConglomerateKind {
        match &self.data {
            ConglomerateData::Heap(_) => ConglomerateKind::Heap,
            ConglomerateData::BTree(btree) => ConglomerateKind::BTree {
                unique: btree.is_unique(),
            },
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct StoreState {
    pub conglomerates: HashMap<ConglomerateId, Conglomerate>,
    pub next_conglomerate_id: ConglomerateId,
    pub properties: BTreeMap<String, String>,
}

impl StoreState {
    pub fn conglomerate(&self, id: ConglomerateId) -> Result<&Conglomerate> {
        self.conglomerates
            .get(&id)
            .context(NoSuchConglomerateSnafu { id })
    }

    pub fn conglomerate_mut(&mut self, id: ConglomerateId) -> Result<&mut Conglomerate> {
        self.conglomerates
            .get_mut(&id)
            .context(NoSuchConglomerateSnafu { id })
    }
}

/// Reverse operations recorded by a transaction, applied newest first on abort.
#[derive(Debug)]
pub(crate) enum Undo {
    CreateConglomerate(ConglomerateId),
    DropConglomerate(Conglomerate),
    InsertRow {
        conglomerate: ConglomerateId,
        slot: u64,
    },
    DeleteRow {
        conglomerate: ConglomerateId,
        slot: u64,
        row: Row,
    },
    ReplaceRow {
        conglomerate: ConglomerateId,
        slot: u64,
        old: Row,
    },
    InsertEntry {
        conglomerate: ConglomerateId,
        entry: IndexEntry,
    },
    DeleteEntry {
        conglomerate: ConglomerateId,
        entry: IndexEntry,
    },
    SetProperty {
        key: String,
        old: Option<String>,
    },
}

impl Undo {
    pub fn apply(self, state: &mut StoreState) {
        match self {
            Self::CreateConglomerate(id) => {
                state.conglomerates.remove(&id);
            }
            Self::DropConglomerate(conglomerate) => {
                state.conglomerates.insert(conglomerate.id, conglomerate);
            }
            Self::InsertRow { conglomerate, slot } => {
                if let Some(ConglomerateData::Heap(heap)) = data_mut(state, conglomerate) {
                    heap.remove(slot);
                }
            }
            Self::DeleteRow {
                conglomerate,
                slot,
                row,
            }
            | Self::ReplaceRow {
                conglomerate,
                slot,
                old: row,
            } => {
                if let Some(ConglomerateData::Heap(heap)) = data_mut(state, conglomerate) {
                    heap.restore(slot, row);
                }
            }
            Self::InsertEntry {
                conglomerate,
                entry,
            } => {
                if let Some(ConglomerateData::BTree(btree)) = data_mut(state, conglomerate) {
                    btree.remove(&entry);
                }
            }
            Self::DeleteEntry {
                conglomerate,
                entry,
            } => {
                if let Some(ConglomerateData::BTree(btree)) = data_mut(state, conglomerate) {
                    btree.insert(entry);
                }
            }
            Self::SetProperty { key, old } => match old {
                Some(value) => {
                    state.properties.insert(key, value);
                }
                None => {
                    state.properties.remove(&key);
                }
            },
        }
    }
}

fn data_mut(state: &mut StoreState, id: ConglomerateId) -> Option<&mut ConglomerateData> {
    state.conglomerates.get_mut(&id).map(|c| &mut c.data)
}

/// Shared row store: every conglomerate plus the database properties.
pub struct AccessManager {
    state: RwLock<StoreState>,
    next_transaction_id: AtomicU64,
    data_dir: Option<PathBuf>,
}

impl AccessManager {
    /// A store that lives only in memory; `checkpoint` is a no-op.
    pub fn in_memory() -> Arc<Self> {
        Arc::new(Self::with_state(StoreState::new(), None))
    }

    /// Creates an empty store persisted under `data_dir`.
    pub fn create(data_dir: &Path) -> Result<Arc<Self>> {
        ensure!(
            !snapshot::exists(data_dir),
            DatabaseExistsSnafu { path: data_dir }
        );
        snapshot::prepare_dir(data_dir)?;

        info!(dir = %data_dir.display(), "creating store");
        Ok(Arc::new(Self::with_state(
            StoreState::new(),
            Some(data_dir.to_path_buf()),
        )))
    }

    /// Loads the store previously checkpointed under `data_dir`.
    pub fn boot(data_dir: &Path) -> Result<Arc<Self>> {
        ensure!(
            snapshot::exists(data_dir),
            NoDatabaseSnafu { path: data_dir }
        );

        let state = snapshot::read(data_dir)?;
        info!(
            dir = %data_dir.display(),
            conglomerates = state.conglomerates.len(),
            "booted store"
        );

        Ok(Arc::new(Self::with_state(
            state,
            Some(data_dir.to_path_buf()),
        )))
    }

    pub fn exists(data_dir: &Path) -> bool {
        snapshot::exists(data_dir)
    }

    fn with_state(state: StoreState, data_dir: Option<PathBuf>) -> Self {
        Self {
            state: RwLock::new(state),
            next_transaction_id: AtomicU64::new(1),
            data_dir,
        }
    }

    pub fn begin(self: &Arc<Self>) -> Transaction {
        let id = self.next_transaction_id.fetch_add(1, Ordering::Relaxed);
        debug!(txn = id, "begin transaction");
        Transaction::new(id, self.clone())
    }

    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Writes every conglomerate and property to the data directory.
    pub fn checkpoint(&self) -> Result<()> {
        match &self.data_dir {
            Some(dir) => snapshot::write(dir, &self.state.read()),
            None => Ok(()),
        }
    }

    pub fn property(&self, key: &str) -> Option<String> {
        self.state.read().properties.get(key).cloned()
    }

    pub fn conglomerate_count(&self) -> usize {
        self.state.read().conglomerates.len()
    }

    pub(crate) fn read(&self) -> RwLockReadGuard<'_, StoreState> {
        self.state.read()
    }

    pub(crate) fn write(&self) -> RwLockWriteGuard<'_, StoreState> {
        self.state.write()
    }
}

impl StoreState {
    fn new() -> Self {
        Self {
            next_conglomerate_id: 1,
            ..Default::default()
        }
    }
}

//! Durable image of the store: one data file holding the properties and
//! every conglomerate, rewritten whole at each checkpoint.

use {
    crate::{
        btree::IndexEntry,
        codec::Codec,
        error::{CodecSnafu, CorruptedSnafu, IoSnafu, Result},
        manager::{Conglomerate, ConglomerateData, StoreState},
        ConglomerateKind, RowLocation,
    },
    byteorder::{ReadBytesExt, WriteBytesExt, LE},
    def::{
        storage::{Decoder, Encoder},
        TypeDescriptor,
    },
    snafu::prelude::*,
    std::{
        fs,
        io::{self, BufReader, BufWriter, Read, Write},
        path::{Path, PathBuf},
    },
};

const DATA_FILE: &str = "seg0.dat";
const MAGIC: &[u8; 4] = b"DDS0";
const FORMAT_VERSION: u16 = 1;

const KIND_HEAP: u8 = 0;
const KIND_BTREE: u8 = 1;
const KIND_UNIQUE_BTREE: u8 = 2;

fn data_file(dir: &Path) -> PathBuf {
    dir.join(DATA_FILE)
}

pub(crate) fn exists(dir: &Path) -> bool {
    data_file(dir).is_file()
}

pub(crate) fn prepare_dir(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).context(IoSnafu { path: dir })
}

pub(crate) fn write(dir: &Path, state: &StoreState) -> Result<()> {
    let path = data_file(dir);
    let tmp = dir.join(format!("{}.tmp", DATA_FILE));

    let file = fs::File::create(&tmp).context(IoSnafu { path: &tmp })?;
    let mut w = BufWriter::new(file);
    write_state(&mut w, state).context(IoSnafu { path: &tmp })??;
    w.flush().context(IoSnafu { path: &tmp })?;
    drop(w);

    fs::rename(&tmp, &path).context(IoSnafu { path })
}

pub(crate) fn read(dir: &Path) -> Result<StoreState> {
    let path = data_file(dir);
    let file = fs::File::open(&path).context(IoSnafu { path: &path })?;

    read_state(&mut BufReader::new(file)).context(IoSnafu { path })?
}

// The outer io::Result carries file errors, the inner one codec errors.
fn write_state<W: Write>(w: &mut W, state: &StoreState) -> io::Result<Result<()>> {
    w.write_all(MAGIC)?;
    w.write_u16::<LE>(FORMAT_VERSION)?;
    w.write_i64::<LE>(state.next_conglomerate_id)?;

    w.write_u32::<LE>(state.properties.len() as u32)?;
    for (key, value) in state.properties.iter() {
        write_str(w, key)?;
        write_str(w, value)?;
    }

    let mut ids = state.conglomerates.keys().copied().collect::<Vec<_>>();
    ids.sort_unstable();

    w.write_u32::<LE>(ids.len() as u32)?;
    for id in ids {
        let conglomerate = &state.conglomerates[&id];
        w.write_i64::<LE>(id)?;
        w.write_u8(match conglomerate.kind() {
            ConglomerateKind::Heap => KIND_HEAP,
            ConglomerateKind::BTree { unique: false } => KIND_BTREE,
            ConglomerateKind::BTree { unique: true } => KIND_UNIQUE_BTREE,
        })?;

        w.write_u16::<LE>(conglomerate.format.len() as u16)?;
        for ty in conglomerate.format.iter() {
            ty.write_to(w)?;
        }

        let codec = Codec::new(conglomerate.format.clone());
        match &conglomerate.data {
            ConglomerateData::Heap(heap) => {
                w.write_u64::<LE>(heap.next_slot())?;
                w.write_u32::<LE>(heap.len() as u32)?;
                for (slot, row) in heap.iter() {
                    let bytes = match codec.encode(row).context(CodecSnafu) {
                        Ok(bytes) => bytes,
                        Err(e) => return Ok(Err(e)),
                    };
                    w.write_u64::<LE>(slot)?;
                    write_bytes(w, &bytes)?;
                }
            }
            ConglomerateData::BTree(btree) => {
                w.write_u32::<LE>(btree.len() as u32)?;
                for entry in btree.iter() {
                    let bytes = match codec.encode(&entry.key).context(CodecSnafu) {
                        Ok(bytes) => bytes,
                        Err(e) => return Ok(Err(e)),
                    };
                    write_bytes(w, &bytes)?;
                    w.write_i64::<LE>(entry.location.conglomerate)?;
                    w.write_u64::<LE>(entry.location.slot)?;
                }
            }
        }
    }

    Ok(Ok(()))
}

fn read_state<R: Read>(r: &mut R) -> io::Result<Result<StoreState>> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    let version = r.read_u16::<LE>()?;
    if &magic != MAGIC || version != FORMAT_VERSION {
        return Ok(CorruptedSnafu {
            details: format!("unknown header {:?} version {}", magic, version),
        }
        .fail());
    }

    let mut state = StoreState {
        next_conglomerate_id: r.read_i64::<LE>()?,
        ..Default::default()
    };

    for _ in 0..r.read_u32::<LE>()? {
        let key = read_str(r)?;
        let value = read_str(r)?;
        state.properties.insert(key, value);
    }

    for _ in 0..r.read_u32::<LE>()? {
        let id = r.read_i64::<LE>()?;
        let kind = match r.read_u8()? {
            KIND_HEAP => ConglomerateKind::Heap,
            KIND_BTREE => ConglomerateKind::BTree { unique: false },
            KIND_UNIQUE_BTREE => ConglomerateKind::BTree { unique: true },
            other => {
                return Ok(CorruptedSnafu {
                    details: format!("conglomerate {} has unknown kind {}", id, other),
                }
                .fail())
            }
        };

        let mut format = vec![];
        for _ in 0..r.read_u16::<LE>()? {
            match TypeDescriptor::read_from(r) {
                Ok(ty) => format.push(ty),
                Err(e) => {
                    return Ok(CorruptedSnafu {
                        details: format!("conglomerate {}: {}", id, e),
                    }
                    .fail())
                }
            }
        }

        let codec = Codec::new(format.clone());
        let mut conglomerate = Conglomerate::new(id, kind, format);
        match &mut conglomerate.data {
            ConglomerateData::Heap(heap) => {
                *heap = crate::heap::Heap::with_next_slot(r.read_u64::<LE>()?);
                for _ in 0..r.read_u32::<LE>()? {
                    let slot = r.read_u64::<LE>()?;
                    let bytes = read_bytes(r)?;
                    match codec.decode(&bytes).context(CodecSnafu) {
                        Ok((row, _)) => heap.restore(slot, row),
                        Err(e) => return Ok(Err(e)),
                    }
                }
            }
            ConglomerateData::BTree(btree) => {
                for _ in 0..r.read_u32::<LE>()? {
                    let bytes = read_bytes(r)?;
                    let location = RowLocation::new(r.read_i64::<LE>()?, r.read_u64::<LE>()?);
                    match codec.decode(&bytes).context(CodecSnafu) {
                        Ok((key, _)) => {
                            btree.insert(IndexEntry::new(key, location));
                        }
                        Err(e) => return Ok(Err(e)),
                    }
                }
            }
        }

        state.conglomerates.insert(id, conglomerate);
    }

    Ok(Ok(state))
}

fn write_bytes<W: Write>(w: &mut W, bytes: &[u8]) -> io::Result<()> {
    w.write_u32::<LE>(bytes.len() as u32)?;
    w.write_all(bytes)
}

fn read_bytes<R: Read>(r: &mut R) -> io::Result<Vec<u8>> {
    let len = r.read_u32::<LE>()? as usize;
    let mut buf = vec![0; len];
    r.read_exact(&mut buf)?;
    Ok(buf)
}

fn write_str<W: Write>(w: &mut W, s: &str) -> io::Result<()> {
    write_bytes(w, s.as_bytes())
}

fn read_str<R: Read>(r: &mut R) -> io::Result<String> {
    String::from_utf8(read_bytes(r)?).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
}

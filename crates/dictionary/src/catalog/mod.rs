//! Layout of the system catalogs and the row factories translating between
//! catalog rows and descriptors.

/// Declares the column layout of a catalog: a position constant per column
/// and the `COLUMNS` table. Columns added by later versions must come last;
/// `as "NAME"` overrides a column name that would clash with an item.
macro_rules! catalog_columns {
    (@since) => {
        $crate::version::DictionaryVersion::V10_0
    };
    (@since $since:ident) => {
        $crate::version::DictionaryVersion::$since
    };
    (@name $name:ident) => {
        stringify!($name)
    };
    (@name $name:ident $column:literal) => {
        $column
    };

    ($($name:ident $(as $column:literal)? = $pos:literal, $ty:expr $(, since $since:ident)?;)*) => {
        $(pub const $name: usize = $pos;)*

        pub(crate) const COLUMNS: &[$crate::catalog::SystemColumn] = &[
            $(
                $crate::catalog::SystemColumn {
                    name: catalog_columns!(@name $name $($column)?),
                    position: $pos,
                    ty: $ty,
                    since: catalog_columns!(@since $($since)?),
                },
            )*
        ];
    };
}

pub mod aliases;
pub mod checks;
pub mod column_perms;
pub mod columns;
pub mod conglomerates;
pub mod constraints;
pub mod depends;
pub mod dummy1;
pub mod files;
pub mod foreign_keys;
pub mod keys;
pub mod perms;
pub mod roles;
pub mod routine_perms;
pub mod schemas;
pub mod sequences;
pub mod statements;
pub mod statistics;
pub mod table_perms;
pub mod tables;
pub mod triggers;
pub mod views;

use {
    crate::{
        error::{InvalidRowSnafu, Result},
        formatable::Formatable,
        index_row::IndexRowGenerator,
        version::DictionaryVersion,
    },
    access::{IndexEntry, RowLocation},
    chrono::{DateTime, Utc},
    def::{DataType, Row, TypeDescriptor, Uuid, Value},
    snafu::prelude::*,
};

pub(crate) const UUID: DataType = DataType::Uuid;
pub(crate) const IDENTIFIER: DataType = DataType::Varchar(128);
pub(crate) const CHAR: DataType = DataType::Char(1);
pub(crate) const TEXT: DataType = DataType::LongVarchar;
pub(crate) const PAYLOAD: DataType = DataType::Blob;
pub(crate) const INT: DataType = DataType::Int;
pub(crate) const BIGINT: DataType = DataType::BigInt;
pub(crate) const BOOLEAN: DataType = DataType::Boolean;
/// Microseconds since the epoch.
pub(crate) const TIMESTAMP: DataType = DataType::BigInt;

pub(crate) const fn req(data_type: DataType) -> TypeDescriptor {
    TypeDescriptor::not_null(data_type)
}

pub(crate) const fn opt(data_type: DataType) -> TypeDescriptor {
    TypeDescriptor::nullable(data_type)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(usize)]
pub enum CatalogNumber {
    Sysconglomerates = 0,
    Systables,
    Syscolumns,
    Sysschemas,
    Sysconstraints,
    Syskeys,
    Sysdepends,
    Sysaliases,
    Sysviews,
    Syschecks,
    Sysforeignkeys,
    Sysstatements,
    Sysfiles,
    Systriggers,
    Sysstatistics,
    Sysdummy1,
    Systableperms,
    Syscolperms,
    Sysroutineperms,
    Sysroles,
    Syssequences,
    Sysperms,
}

impl CatalogNumber {
    /// Catalogs 0..NUM_CORE describe every catalog, themselves included.
    pub const NUM_CORE: usize = 4;

    pub const ALL: [CatalogNumber; 22] = [
        Self::Sysconglomerates,
        Self::Systables,
        Self::Syscolumns,
        Self::Sysschemas,
        Self::Sysconstraints,
        Self::Syskeys,
        Self::Sysdepends,
        Self::Sysaliases,
        Self::Sysviews,
        Self::Syschecks,
        Self::Sysforeignkeys,
        Self::Sysstatements,
        Self::Sysfiles,
        Self::Systriggers,
        Self::Sysstatistics,
        Self::Sysdummy1,
        Self::Systableperms,
        Self::Syscolperms,
        Self::Sysroutineperms,
        Self::Sysroles,
        Self::Syssequences,
        Self::Sysperms,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn is_core(&self) -> bool {
        self.index() < Self::NUM_CORE
    }

    pub fn def(&self) -> &'static CatalogDef {
        match self {
            Self::Sysconglomerates => &conglomerates::DEF,
            Self::Systables => &tables::DEF,
            Self::Syscolumns => &columns::DEF,
            Self::Sysschemas => &schemas::DEF,
            Self::Sysconstraints => &constraints::DEF,
            Self::Syskeys => &keys::DEF,
            Self::Sysdepends => &depends::DEF,
            Self::Sysaliases => &aliases::DEF,
            Self::Sysviews => &views::DEF,
            Self::Syschecks => &checks::DEF,
            Self::Sysforeignkeys => &foreign_keys::DEF,
            Self::Sysstatements => &statements::DEF,
            Self::Sysfiles => &files::DEF,
            Self::Systriggers => &triggers::DEF,
            Self::Sysstatistics => &statistics::DEF,
            Self::Sysdummy1 => &dummy1::DEF,
            Self::Systableperms => &table_perms::DEF,
            Self::Syscolperms => &column_perms::DEF,
            Self::Sysroutineperms => &routine_perms::DEF,
            Self::Sysroles => &roles::DEF,
            Self::Syssequences => &sequences::DEF,
            Self::Sysperms => &perms::DEF,
        }
    }

    pub fn from_name(name: &str) -> Option<CatalogNumber> {
        Self::ALL.into_iter().find(|n| n.def().name == name)
    }
}

/// Fixed UUIDs of the catalogs: slot 0 is the table, slot 1 its heap and
/// slot 2 onwards its indexes.
const fn catalog_uuid(number: CatalogNumber, slot: usize) -> Uuid {
    let prefix = (0x8000_0100 + number as usize * 0x10 + slot) as u128;
    Uuid::from_u128(prefix << 96 | 0x00d0_fd77_3ed8_000a_0a0b_1900)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SystemColumn {
    pub name: &'static str,
    /// 1-based.
    pub position: usize,
    pub ty: TypeDescriptor,
    pub since: DictionaryVersion,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IndexDef {
    /// 1-based base column positions.
    pub columns: &'static [u32],
    pub unique: bool,
    pub since: DictionaryVersion,
}

impl IndexDef {
    pub const fn unique(columns: &'static [u32]) -> Self {
        Self {
            columns,
            unique: true,
            since: DictionaryVersion::V10_0,
        }
    }

    pub const fn non_unique(columns: &'static [u32]) -> Self {
        Self {
            columns,
            unique: false,
            since: DictionaryVersion::V10_0,
        }
    }

    pub const fn since(mut self, version: DictionaryVersion) -> Self {
        self.since = version;
        self
    }
}

/// Static description of one system catalog.
#[derive(Debug)]
pub struct CatalogDef {
    pub number: CatalogNumber,
    pub name: &'static str,
    pub columns: &'static [SystemColumn],
    pub indexes: &'static [IndexDef],
    /// Version that introduced the catalog.
    pub since: DictionaryVersion,
}

impl CatalogDef {
    pub fn table_id(&self) -> Uuid {
        catalog_uuid(self.number, 0)
    }

    pub fn heap_id(&self) -> Uuid {
        catalog_uuid(self.number, 1)
    }

    pub fn index_id(&self, index: usize) -> Uuid {
        catalog_uuid(self.number, 2 + index)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    pub fn index_count(&self) -> usize {
        self.indexes.len()
    }

    pub fn index_name(&self, index: usize) -> String {
        format!("{}_INDEX{}", self.name, index + 1)
    }

    pub fn column_position(&self, name: &str) -> Option<usize> {
        self.columns.iter().find(|c| c.name == name).map(|c| c.position)
    }

    /// Heap row format of a catalog created by `version`.
    pub fn heap_format(&self, version: DictionaryVersion) -> Vec<TypeDescriptor> {
        self.columns
            .iter()
            .filter(|c| c.since <= version)
            .map(|c| c.ty)
            .collect()
    }

    /// Indexes that exist in a catalog created by `version`.
    pub fn indexes_at(&self, version: DictionaryVersion) -> impl Iterator<Item = usize> + '_ {
        self.indexes
            .iter()
            .enumerate()
            .filter(move |(_, i)| i.since <= version)
            .map(|(n, _)| n)
    }

    pub fn index_row_generator(&self, index: usize) -> IndexRowGenerator {
        let def = &self.indexes[index];
        IndexRowGenerator::btree(def.unique, def.columns)
    }

    pub fn index_format(&self, index: usize) -> Vec<TypeDescriptor> {
        let all = self.columns.iter().map(|c| c.ty).collect::<Vec<_>>();
        self.index_row_generator(index).key_format(&all)
    }

    pub fn null_row(&self) -> Row {
        vec![Value::Null; self.column_count()]
    }
}

/// Translates between the rows of one catalog and its descriptors.
pub trait RowFactory {
    type Descriptor;
    /// Context a descriptor is built with or decomposed against.
    type Parent;

    fn def() -> &'static CatalogDef;

    /// The catalog row of `descriptor`, or an all-NULL template row.
    fn make_row(descriptor: Option<&Self::Descriptor>, parent: Option<&Self::Parent>)
        -> Result<Row>;

    fn build_descriptor(row: &Row, parent: Option<&Self::Parent>) -> Result<Self::Descriptor>;

    fn build_empty_index_row(index: usize, location: RowLocation) -> IndexEntry {
        let width = Self::def().indexes[index].columns.len();
        IndexEntry::new(vec![Value::Null; width], location)
    }
}

/// Typed access to the columns of a catalog row. Positions are 1-based;
/// columns missing from rows of an older format read as NULL.
pub(crate) struct RowReader<'a> {
    catalog: &'static str,
    row: &'a [Value],
}

impl<'a> RowReader<'a> {
    pub fn new(def: &'static CatalogDef, row: &'a [Value]) -> Self {
        Self {
            catalog: def.name,
            row,
        }
    }

    fn invalid<T>(&self, pos: usize, expected: &str) -> Result<T> {
        InvalidRowSnafu {
            catalog: self.catalog,
            details: format!(
                "column {} holds {:?}, expected {}",
                pos,
                self.value(pos),
                expected
            ),
        }
        .fail()
    }

    pub fn value(&self, pos: usize) -> &'a Value {
        const NULL: &Value = &Value::Null;
        self.row.get(pos - 1).unwrap_or(NULL)
    }

    pub fn is_null(&self, pos: usize) -> bool {
        self.value(pos).is_null()
    }

    pub fn uuid(&self, pos: usize) -> Result<Uuid> {
        match self.opt_uuid(pos)? {
            Some(uuid) => Ok(uuid),
            None => self.invalid(pos, "a UUID"),
        }
    }

    pub fn opt_uuid(&self, pos: usize) -> Result<Option<Uuid>> {
        match self.value(pos) {
            Value::Null => Ok(None),
            v => match v.as_uuid() {
                Some(uuid) => Ok(Some(uuid)),
                None => self.invalid(pos, "a UUID"),
            },
        }
    }

    pub fn string(&self, pos: usize) -> Result<String> {
        match self.opt_string(pos)? {
            Some(s) => Ok(s),
            None => self.invalid(pos, "a string"),
        }
    }

    pub fn opt_string(&self, pos: usize) -> Result<Option<String>> {
        match self.value(pos) {
            Value::Null => Ok(None),
            Value::String(s) => Ok(Some(s.clone())),
            _ => self.invalid(pos, "a string"),
        }
    }

    pub fn char(&self, pos: usize) -> Result<char> {
        match self.value(pos).as_char() {
            Some(ch) => Ok(ch),
            None => self.invalid(pos, "a character"),
        }
    }

    /// A character column decoded into a character-coded enum.
    pub fn coded<T>(&self, pos: usize, decode: fn(char) -> Option<T>) -> Result<T> {
        match decode(self.char(pos)?) {
            Some(v) => Ok(v),
            None => self.invalid(pos, "a known code"),
        }
    }

    pub fn bool(&self, pos: usize) -> Result<bool> {
        match self.value(pos).as_bool() {
            Some(b) => Ok(b),
            None => self.invalid(pos, "a boolean"),
        }
    }

    pub fn opt_bool(&self, pos: usize) -> Result<Option<bool>> {
        match self.value(pos) {
            Value::Null => Ok(None),
            _ => self.bool(pos).map(Some),
        }
    }

    /// A 'Y'/'N' column.
    pub fn flag(&self, pos: usize) -> Result<bool> {
        match self.char(pos)? {
            'Y' | 'y' => Ok(true),
            'N' | 'n' => Ok(false),
            _ => self.invalid(pos, "'Y' or 'N'"),
        }
    }

    pub fn i64(&self, pos: usize) -> Result<i64> {
        match self.opt_i64(pos)? {
            Some(v) => Ok(v),
            None => self.invalid(pos, "an integer"),
        }
    }

    pub fn opt_i64(&self, pos: usize) -> Result<Option<i64>> {
        match self.value(pos) {
            Value::Null => Ok(None),
            v => match v.as_i64() {
                Some(v) => Ok(Some(v)),
                None => self.invalid(pos, "an integer"),
            },
        }
    }

    pub fn i32(&self, pos: usize) -> Result<i32> {
        match i32::try_from(self.i64(pos)?) {
            Ok(v) => Ok(v),
            Err(_) => self.invalid(pos, "a 32-bit integer"),
        }
    }

    pub fn opt_bytes(&self, pos: usize) -> Result<Option<&'a [u8]>> {
        match self.value(pos) {
            Value::Null => Ok(None),
            v => match v.as_bytes() {
                Some(b) => Ok(Some(b)),
                None => self.invalid(pos, "bytes"),
            },
        }
    }

    pub fn payload<T: Formatable>(&self, pos: usize) -> Result<T> {
        match self.opt_payload(pos)? {
            Some(v) => Ok(v),
            None => self.invalid(pos, "a payload"),
        }
    }

    pub fn opt_payload<T: Formatable>(&self, pos: usize) -> Result<Option<T>> {
        let Some(bytes) = self.opt_bytes(pos)? else {
            return Ok(None);
        };

        match T::from_bytes(bytes) {
            Ok(v) => Ok(Some(v)),
            Err(e) => InvalidRowSnafu {
                catalog: self.catalog,
                details: format!("column {}: {}", pos, e),
            }
            .fail(),
        }
    }

    pub fn timestamp(&self, pos: usize) -> Result<DateTime<Utc>> {
        match self.opt_timestamp(pos)? {
            Some(ts) => Ok(ts),
            None => self.invalid(pos, "a timestamp"),
        }
    }

    pub fn opt_timestamp(&self, pos: usize) -> Result<Option<DateTime<Utc>>> {
        match self.opt_i64(pos)? {
            None => Ok(None),
            Some(micros) => match DateTime::from_timestamp_micros(micros) {
                Some(ts) => Ok(Some(ts)),
                None => self.invalid(pos, "a timestamp"),
            },
        }
    }
}

pub(crate) fn flag_value(flag: bool) -> Value {
    Value::from(if flag { 'Y' } else { 'N' })
}

pub(crate) fn timestamp_value(ts: &DateTime<Utc>) -> Value {
    Value::BigInt(ts.timestamp_micros())
}

pub(crate) fn payload_value<T: Formatable>(def: &'static CatalogDef, payload: &T) -> Result<Value> {
    payload.to_bytes().map(Value::Bytes).map_err(|e| {
        InvalidRowSnafu {
            catalog: def.name,
            details: e.to_string(),
        }
        .build()
    })
}

/// Checks a row handed to a factory has the catalog's full width.
pub(crate) fn ensure_width(def: &'static CatalogDef, row: &[Value]) -> Result<()> {
    ensure!(
        row.len() <= def.column_count(),
        InvalidRowSnafu {
            catalog: def.name,
            details: format!("{} columns, expected at most {}", row.len(), def.column_count()),
        }
    );
    Ok(())
}

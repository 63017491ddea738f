use {
    super::{ColumnDescriptor, ConglomerateDescriptor, SchemaDescriptor, TableKey},
    access::ConglomerateId,
    common::char_enum,
    def::Uuid,
};

char_enum! {
    /// Kind of relation, stored in SYSTABLES.TABLETYPE.
    enum TableType {
        Base = 'T',
        System = 'S',
        View = 'V',
        Synonym = 'A',
        GlobalTemporary = 'X',
        VirtualTable = 'Y',
    }

    enum LockGranularity {
        Row = 'R',
        Table = 'T',
    }
}

/// A table, view or synonym together with its columns (ordered by
/// position) and conglomerates.
#[derive(Debug, Clone, PartialEq)]
pub struct TableDescriptor {
    pub uuid: Uuid,
    pub name: String,
    pub schema_id: Uuid,
    pub schema_name: String,
    pub table_type: TableType,
    pub lock_granularity: LockGranularity,
    pub columns: Vec<ColumnDescriptor>,
    pub conglomerates: Vec<ConglomerateDescriptor>,
}

impl TableDescriptor {
    pub fn new(
        name: impl Into<String>,
        schema: &SchemaDescriptor,
        table_type: TableType,
        lock_granularity: LockGranularity,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            schema_id: schema.uuid,
            schema_name: schema.name.clone(),
            table_type,
            lock_granularity,
            columns: vec![],
            conglomerates: vec![],
        }
    }

    pub fn key(&self) -> TableKey {
        TableKey::new(self.schema_id, self.name.clone())
    }

    pub fn qualified_name(&self) -> String {
        format!("\"{}\".\"{}\"", self.schema_name, self.name)
    }

    pub fn column(&self, name: &str) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column at a 1-based position.
    pub fn column_at(&self, position: u32) -> Option<&ColumnDescriptor> {
        self.columns.iter().find(|c| c.position == position)
    }

    pub fn max_column_position(&self) -> u32 {
        self.columns.iter().map(|c| c.position).max().unwrap_or(0)
    }

    pub fn heap_conglomerate_number(&self) -> Option<ConglomerateId> {
        self.conglomerates
            .iter()
            .find(|c| !c.is_index)
            .map(|c| c.number)
    }

    pub fn indexes(&self) -> impl Iterator<Item = &ConglomerateDescriptor> {
        self.conglomerates.iter().filter(|c| c.is_index)
    }

    pub fn conglomerate(&self, uuid: Uuid) -> Option<&ConglomerateDescriptor> {
        self.conglomerates.iter().find(|c| c.uuid == uuid)
    }
}

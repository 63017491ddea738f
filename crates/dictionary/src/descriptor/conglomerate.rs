use {crate::index_row::IndexRowGenerator, access::ConglomerateId, def::Uuid};

/// A heap or index. Several index descriptors may share one physical
/// conglomerate when their keys are identical.
#[derive(Debug, Clone, PartialEq)]
pub struct ConglomerateDescriptor {
    pub uuid: Uuid,
    pub number: ConglomerateId,
    pub name: String,
    pub is_index: bool,
    pub index_row_generator: Option<IndexRowGenerator>,
    /// Backs a primary key, unique or foreign key constraint.
    pub is_constraint: bool,
    pub table_id: Uuid,
    pub schema_id: Uuid,
}

impl ConglomerateDescriptor {
    pub fn heap(number: ConglomerateId, table_id: Uuid, schema_id: Uuid) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            uuid,
            number,
            name: uuid.to_string(),
            is_index: false,
            index_row_generator: None,
            is_constraint: false,
            table_id,
            schema_id,
        }
    }

    pub fn index(
        number: ConglomerateId,
        name: impl Into<String>,
        generator: IndexRowGenerator,
        is_constraint: bool,
        table_id: Uuid,
        schema_id: Uuid,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            number,
            name: name.into(),
            is_index: true,
            index_row_generator: Some(generator),
            is_constraint,
            table_id,
            schema_id,
        }
    }

    pub fn is_unique(&self) -> bool {
        self.index_row_generator
            .as_ref()
            .map(|g| g.unique)
            .unwrap_or(false)
    }
}

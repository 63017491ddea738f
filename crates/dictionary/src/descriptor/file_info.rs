use {common::pub_fields_struct, def::Uuid};

pub_fields_struct! {
    /// A jar file installed into a schema.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct FileInfoDescriptor {
        uuid: Uuid,
        schema_id: Uuid,
        name: String,
        generation_id: i64,
    }
}

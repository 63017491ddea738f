use {common::pub_fields_struct, def::Uuid};

pub_fields_struct! {
    /// Definition of a view; `uuid` is the UUID of its table descriptor.
    #[derive(Debug, Clone, PartialEq, Eq)]
    struct ViewDescriptor {
        uuid: Uuid,
        text: String,
        check_option: bool,
        compilation_schema_id: Option<Uuid>,
    }
}

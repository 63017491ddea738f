use {
    access::{AccessManager, ConglomerateKind, Transaction},
    def::{DataType, TypeDescriptor},
    dictionary::{
        descriptor::{
            ColumnDescriptor, ConglomerateDescriptor, LockGranularity, SchemaDescriptor,
            TableDescriptor, TableType, DEFAULT_USER_SCHEMA_NAME,
        },
        BootOptions, DataDictionary,
    },
    std::sync::Arc,
};

mod bootstrap;
mod caching;
mod constraints;
mod permissions;
mod sequences;
mod tables;
mod triggers;
mod upgrade;

fn new_dictionary() -> DataDictionary {
    DataDictionary::create(AccessManager::in_memory(), BootOptions::new()).unwrap()
}

fn app_schema(dd: &DataDictionary, tc: &Transaction) -> SchemaDescriptor {
    dd.get_schema_descriptor(tc, DEFAULT_USER_SCHEMA_NAME, true)
        .unwrap()
        .unwrap()
}

/// Records a base table with nullable columns and a heap, the way CREATE
/// TABLE does, and reads it back.
fn create_table(
    dd: &DataDictionary,
    tc: &Transaction,
    schema: &SchemaDescriptor,
    name: &str,
    columns: &[(&str, DataType)],
) -> Arc<TableDescriptor> {
    let td = TableDescriptor::new(name, schema, TableType::Base, LockGranularity::Row);
    dd.add_table_descriptor(tc, &td, schema).unwrap();

    let columns = columns
        .iter()
        .enumerate()
        .map(|(i, (column, ty))| {
            ColumnDescriptor::new(td.uuid, *column, i as u32 + 1, TypeDescriptor::nullable(*ty))
        })
        .collect::<Vec<_>>();
    dd.add_column_descriptors(tc, &columns).unwrap();

    let format = columns.iter().map(|c| c.type_descriptor).collect();
    let heap = tc.create_conglomerate(ConglomerateKind::Heap, format).unwrap();
    dd.add_conglomerate_descriptor(tc, &ConglomerateDescriptor::heap(heap, td.uuid, schema.uuid))
        .unwrap();

    dd.get_table_descriptor_by_id(tc, td.uuid).unwrap().unwrap()
}

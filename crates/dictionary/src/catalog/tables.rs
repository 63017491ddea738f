use {
    super::{
        ensure_width, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader, CHAR,
        IDENTIFIER, UUID,
    },
    crate::{
        descriptor::{LockGranularity, SchemaDescriptor, TableDescriptor, TableType},
        error::Result,
        version::DictionaryVersion,
    },
    def::{Row, Value},
};

catalog_columns! {
    TABLEID = 1, req(UUID);
    TABLENAME = 2, req(IDENTIFIER);
    TABLETYPE = 3, req(CHAR);
    SCHEMAID = 4, req(UUID);
    LOCKGRANULARITY = 5, req(CHAR);
}

pub const BY_NAME: usize = 0;
pub const BY_ID: usize = 1;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Systables,
    name: "SYSTABLES",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[TABLENAME as u32, SCHEMAID as u32]),
        IndexDef::unique(&[TABLEID as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

/// Builds table descriptors without columns or conglomerates; the parent
/// schema, when known, supplies the schema name.
pub struct SysTablesFactory;

impl RowFactory for SysTablesFactory {
    type Descriptor = TableDescriptor;
    type Parent = SchemaDescriptor;

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&TableDescriptor>, _: Option<&SchemaDescriptor>) -> Result<Row> {
        let Some(td) = descriptor else {
            return Ok(DEF.null_row());
        };

        Ok(vec![
            Value::Uuid(td.uuid),
            Value::from(td.name.as_str()),
            Value::from(td.table_type.as_char()),
            Value::Uuid(td.schema_id),
            Value::from(td.lock_granularity.as_char()),
        ])
    }

    fn build_descriptor(row: &Row, schema: Option<&SchemaDescriptor>) -> Result<TableDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(TableDescriptor {
            uuid: r.uuid(TABLEID)?,
            name: r.string(TABLENAME)?,
            schema_id: r.uuid(SCHEMAID)?,
            schema_name: schema.map(|s| s.name.clone()).unwrap_or_default(),
            table_type: r.coded(TABLETYPE, TableType::from_char)?,
            lock_granularity: r.coded(LOCKGRANULARITY, LockGranularity::from_char)?,
            columns: vec![],
            conglomerates: vec![],
        })
    }
}

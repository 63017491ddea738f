use {
    super::{
        ensure_width, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader,
        IDENTIFIER, UUID,
    },
    crate::{descriptor::SchemaDescriptor, error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    SCHEMAID = 1, req(UUID);
    SCHEMANAME = 2, req(IDENTIFIER);
    AUTHORIZATIONID = 3, req(IDENTIFIER);
}

pub const BY_NAME: usize = 0;
pub const BY_ID: usize = 1;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysschemas,
    name: "SYSSCHEMAS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[SCHEMANAME as u32]),
        IndexDef::unique(&[SCHEMAID as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

pub struct SysSchemasFactory;

impl RowFactory for SysSchemasFactory {
    type Descriptor = SchemaDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&SchemaDescriptor>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(sd) => vec![
                Value::Uuid(sd.uuid),
                Value::from(sd.name.as_str()),
                Value::from(sd.authorization_id.as_str()),
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<SchemaDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(SchemaDescriptor::new(
            r.string(SCHEMANAME)?,
            r.string(AUTHORIZATIONID)?,
            r.uuid(SCHEMAID)?,
        ))
    }
}

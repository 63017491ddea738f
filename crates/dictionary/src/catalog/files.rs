use {
    super::{
        ensure_width, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader, BIGINT,
        IDENTIFIER, UUID,
    },
    crate::{descriptor::FileInfoDescriptor, error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    FILEID = 1, req(UUID);
    SCHEMAID = 2, req(UUID);
    FILENAME = 3, req(IDENTIFIER);
    GENERATIONID = 4, req(BIGINT);
}

pub const BY_NAME: usize = 0;
pub const BY_ID: usize = 1;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysfiles,
    name: "SYSFILES",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[FILENAME as u32, SCHEMAID as u32]),
        IndexDef::unique(&[FILEID as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

pub struct SysFilesFactory;

impl RowFactory for SysFilesFactory {
    type Descriptor = FileInfoDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&FileInfoDescriptor>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(file) => vec![
                Value::Uuid(file.uuid),
                Value::Uuid(file.schema_id),
                Value::from(file.name.as_str()),
                Value::BigInt(file.generation_id),
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<FileInfoDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(FileInfoDescriptor {
            uuid: r.uuid(FILEID)?,
            schema_id: r.uuid(SCHEMAID)?,
            name: r.string(FILENAME)?,
            generation_id: r.i64(GENERATIONID)?,
        })
    }
}

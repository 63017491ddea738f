use {
    super::{ensure_width, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader, UUID},
    crate::{descriptor::SubKeyConstraint, error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    CONSTRAINTID = 1, req(UUID);
    CONGLOMERATEID = 2, req(UUID);
}

pub const BY_CONSTRAINT: usize = 0;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Syskeys,
    name: "SYSKEYS",
    columns: COLUMNS,
    indexes: &[IndexDef::unique(&[CONSTRAINTID as u32])],
    since: DictionaryVersion::V10_0,
};

pub struct SysKeysFactory;

impl RowFactory for SysKeysFactory {
    type Descriptor = SubKeyConstraint;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&SubKeyConstraint>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(key) => vec![Value::Uuid(key.constraint_id), Value::Uuid(key.index_id)],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<SubKeyConstraint> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(SubKeyConstraint {
            constraint_id: r.uuid(CONSTRAINTID)?,
            index_id: r.uuid(CONGLOMERATEID)?,
        })
    }
}

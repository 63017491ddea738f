use {
    super::{req, CatalogDef, CatalogNumber, RowFactory, RowReader, CHAR},
    crate::{error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    IBMREQD = 1, req(CHAR);
}

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysdummy1,
    name: "SYSDUMMY1",
    columns: COLUMNS,
    indexes: &[],
    since: DictionaryVersion::V10_0,
};

/// The single-row table `VALUES` style queries select from.
pub struct SysDummy1Factory;

impl RowFactory for SysDummy1Factory {
    type Descriptor = ();
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&()>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(()) => vec![Value::from('Y')],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<()> {
        RowReader::new(&DEF, row).char(IBMREQD).map(|_| ())
    }
}

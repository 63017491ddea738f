use {
    super::{
        ensure_width, payload_value, req, CatalogDef, CatalogNumber, IndexDef, RowFactory,
        RowReader, PAYLOAD, TEXT, UUID,
    },
    crate::{descriptor::SubCheckConstraint, error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    CONSTRAINTID = 1, req(UUID);
    CHECKDEFINITION = 2, req(TEXT);
    REFERENCEDCOLUMNS = 3, req(PAYLOAD);
}

pub const BY_CONSTRAINT: usize = 0;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Syschecks,
    name: "SYSCHECKS",
    columns: COLUMNS,
    indexes: &[IndexDef::unique(&[CONSTRAINTID as u32])],
    since: DictionaryVersion::V10_0,
};

pub struct SysChecksFactory;

impl RowFactory for SysChecksFactory {
    type Descriptor = SubCheckConstraint;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&SubCheckConstraint>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(check) => vec![
                Value::Uuid(check.constraint_id),
                Value::from(check.text.as_str()),
                payload_value(&DEF, &check.referenced_columns)?,
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<SubCheckConstraint> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(SubCheckConstraint {
            constraint_id: r.uuid(CONSTRAINTID)?,
            text: r.string(CHECKDEFINITION)?,
            referenced_columns: r.payload(REFERENCEDCOLUMNS)?,
        })
    }
}

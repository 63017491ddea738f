use {
    super::{
        ensure_width, opt, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader, CHAR,
        TEXT, UUID,
    },
    crate::{descriptor::ViewDescriptor, error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    TABLEID = 1, req(UUID);
    VIEWDEFINITION = 2, req(TEXT);
    CHECKOPTION = 3, req(CHAR);
    COMPILATIONSCHEMAID = 4, opt(UUID);
}

pub const BY_ID: usize = 0;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysviews,
    name: "SYSVIEWS",
    columns: COLUMNS,
    indexes: &[IndexDef::unique(&[TABLEID as u32])],
    since: DictionaryVersion::V10_0,
};

pub struct SysViewsFactory;

impl RowFactory for SysViewsFactory {
    type Descriptor = ViewDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&ViewDescriptor>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(vd) => vec![
                Value::Uuid(vd.uuid),
                Value::from(vd.text.as_str()),
                Value::from(if vd.check_option { 'C' } else { 'N' }),
                Value::from(vd.compilation_schema_id),
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<ViewDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(ViewDescriptor {
            uuid: r.uuid(TABLEID)?,
            text: r.string(VIEWDEFINITION)?,
            check_option: r.char(CHECKOPTION)? != 'N',
            compilation_schema_id: r.opt_uuid(COMPILATIONSCHEMAID)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, def::Uuid};

    #[test]
    fn round_trip() {
        let vd = ViewDescriptor {
            uuid: Uuid::new_v4(),
            text: "CREATE VIEW V AS SELECT * FROM T".into(),
            check_option: false,
            compilation_schema_id: None,
        };
        let row = SysViewsFactory::make_row(Some(&vd), None).unwrap();
        assert_eq!(SysViewsFactory::build_descriptor(&row, None).unwrap(), vd);
    }
}

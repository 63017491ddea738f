use {
    super::{
        ensure_width, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader, CHAR, UUID,
    },
    crate::{
        descriptor::{DependableKind, DependencyDescriptor},
        error::Result,
        version::DictionaryVersion,
    },
    def::{Row, Value},
};

catalog_columns! {
    DEPENDENTID = 1, req(UUID);
    DEPENDENTFINDER = 2, req(CHAR);
    PROVIDERID = 3, req(UUID);
    PROVIDERFINDER = 4, req(CHAR);
}

pub const BY_DEPENDENT: usize = 0;
pub const BY_PROVIDER: usize = 1;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysdepends,
    name: "SYSDEPENDS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::non_unique(&[DEPENDENTID as u32]),
        IndexDef::non_unique(&[PROVIDERID as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

pub struct SysDependsFactory;

impl RowFactory for SysDependsFactory {
    type Descriptor = DependencyDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&DependencyDescriptor>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(dd) => vec![
                Value::Uuid(dd.dependent_id),
                Value::from(dd.dependent_kind.as_char()),
                Value::Uuid(dd.provider_id),
                Value::from(dd.provider_kind.as_char()),
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<DependencyDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(DependencyDescriptor {
            dependent_id: r.uuid(DEPENDENTID)?,
            dependent_kind: r.coded(DEPENDENTFINDER, DependableKind::from_char)?,
            provider_id: r.uuid(PROVIDERID)?,
            provider_kind: r.coded(PROVIDERFINDER, DependableKind::from_char)?,
        })
    }
}

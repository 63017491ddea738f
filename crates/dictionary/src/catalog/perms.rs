use {
    super::{
        ensure_width, flag_value, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader,
        CHAR, IDENTIFIER, UUID,
    },
    crate::{descriptor::PermDescriptor, error::Result, version::DictionaryVersion},
    def::{DataType, Row, Value},
};

catalog_columns! {
    UUID_ as "UUID" = 1, req(UUID);
    OBJECTTYPE = 2, req(DataType::Varchar(36));
    OBJECTID = 3, req(UUID);
    PERMISSION = 4, req(DataType::Char(36));
    GRANTOR = 5, req(IDENTIFIER);
    GRANTEE = 6, req(IDENTIFIER);
    ISGRANTABLE = 7, req(CHAR);
}

pub const BY_ID: usize = 0;
pub const BY_OBJECT: usize = 1;
pub const BY_GRANTEE: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysperms,
    name: "SYSPERMS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[UUID_ as u32]),
        IndexDef::non_unique(&[OBJECTID as u32]),
        IndexDef::unique(&[GRANTEE as u32, OBJECTID as u32, GRANTOR as u32]),
    ],
    since: DictionaryVersion::V10_6,
};

pub struct SysPermsFactory;

impl RowFactory for SysPermsFactory {
    type Descriptor = PermDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&PermDescriptor>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(perm) => vec![
                Value::Uuid(perm.uuid),
                Value::from(perm.object_type.as_str()),
                Value::Uuid(perm.object_id),
                Value::from(perm.permission.as_str()),
                Value::from(perm.grantor.as_str()),
                Value::from(perm.grantee.as_str()),
                flag_value(perm.grantable),
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<PermDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(PermDescriptor {
            uuid: r.uuid(UUID_)?,
            object_type: r.string(OBJECTTYPE)?,
            object_id: r.uuid(OBJECTID)?,
            permission: r.string(PERMISSION)?,
            grantor: r.string(GRANTOR)?,
            grantee: r.string(GRANTEE)?,
            grantable: r.flag(ISGRANTABLE)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, def::Uuid};

    #[test]
    fn round_trip() {
        let perm =
            PermDescriptor::usage(PermDescriptor::SEQUENCE_TYPE, Uuid::new_v4(), "DBO", "BOB");
        let row = SysPermsFactory::make_row(Some(&perm), None).unwrap();
        assert_eq!(SysPermsFactory::build_descriptor(&row, None).unwrap(), perm);
    }
}

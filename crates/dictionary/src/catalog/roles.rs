use {
    super::{
        ensure_width, flag_value, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader,
        CHAR, IDENTIFIER, UUID,
    },
    crate::{descriptor::RoleGrantDescriptor, error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    UUID_ as "UUID" = 1, req(UUID);
    ROLEID = 2, req(IDENTIFIER);
    GRANTEE = 3, req(IDENTIFIER);
    GRANTOR = 4, req(IDENTIFIER);
    WITHADMINOPTION = 5, req(CHAR);
    ISDEF = 6, req(CHAR);
}

pub const BY_ROLE: usize = 0;
pub const BY_DEF: usize = 1;
pub const BY_ID: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysroles,
    name: "SYSROLES",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[ROLEID as u32, GRANTEE as u32, GRANTOR as u32]),
        IndexDef::non_unique(&[ROLEID as u32, ISDEF as u32]),
        IndexDef::unique(&[UUID_ as u32]),
    ],
    since: DictionaryVersion::V10_4,
};

pub struct SysRolesFactory;

impl RowFactory for SysRolesFactory {
    type Descriptor = RoleGrantDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&RoleGrantDescriptor>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(grant) => vec![
                Value::Uuid(grant.uuid),
                Value::from(grant.role_name.as_str()),
                Value::from(grant.grantee.as_str()),
                Value::from(grant.grantor.as_str()),
                flag_value(grant.with_admin_option),
                flag_value(grant.is_def),
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<RoleGrantDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(RoleGrantDescriptor {
            uuid: r.uuid(UUID_)?,
            role_name: r.string(ROLEID)?,
            grantee: r.string(GRANTEE)?,
            grantor: r.string(GRANTOR)?,
            with_admin_option: r.flag(WITHADMINOPTION)?,
            is_def: r.flag(ISDEF)?,
        })
    }
}

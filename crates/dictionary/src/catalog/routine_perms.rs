use {
    super::{
        ensure_width, flag_value, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader,
        CHAR, IDENTIFIER, UUID,
    },
    crate::{descriptor::RoutinePermsDescriptor, error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    ROUTINEPERMSID = 1, req(UUID);
    GRANTEE = 2, req(IDENTIFIER);
    GRANTOR = 3, req(IDENTIFIER);
    ALIASID = 4, req(UUID);
    GRANTOPTION = 5, req(CHAR);
}

pub const BY_GRANTEE: usize = 0;
pub const BY_ID: usize = 1;
pub const BY_ALIAS: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysroutineperms,
    name: "SYSROUTINEPERMS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[GRANTEE as u32, ALIASID as u32, GRANTOR as u32]),
        IndexDef::unique(&[ROUTINEPERMSID as u32]),
        IndexDef::non_unique(&[ALIASID as u32]),
    ],
    since: DictionaryVersion::V10_2,
};

/// A row exists only while EXECUTE is granted; GRANTOPTION is always 'N'.
pub struct SysRoutinePermsFactory;

impl RowFactory for SysRoutinePermsFactory {
    type Descriptor = RoutinePermsDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&RoutinePermsDescriptor>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(perms) => vec![
                Value::Uuid(perms.uuid),
                Value::from(perms.grantee.as_str()),
                Value::from(perms.grantor.as_str()),
                Value::Uuid(perms.routine_id),
                flag_value(false),
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<RoutinePermsDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(RoutinePermsDescriptor {
            uuid: r.uuid(ROUTINEPERMSID)?,
            grantee: r.string(GRANTEE)?,
            grantor: r.string(GRANTOR)?,
            routine_id: r.uuid(ALIASID)?,
            has_execute: true,
        })
    }
}

use {
    super::{
        ensure_width, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader, CHAR,
        IDENTIFIER, UUID,
    },
    crate::{
        descriptor::{Grant, TablePermsDescriptor, TablePrivilege},
        error::Result,
        version::DictionaryVersion,
    },
    def::{Row, Value},
};

catalog_columns! {
    TABLEPERMSID = 1, req(UUID);
    GRANTEE = 2, req(IDENTIFIER);
    GRANTOR = 3, req(IDENTIFIER);
    TABLEID = 4, req(UUID);
    SELECTPRIV = 5, req(CHAR);
    DELETEPRIV = 6, req(CHAR);
    INSERTPRIV = 7, req(CHAR);
    UPDATEPRIV = 8, req(CHAR);
    REFERENCESPRIV = 9, req(CHAR);
    TRIGGERPRIV = 10, req(CHAR);
}

pub const BY_GRANTEE: usize = 0;
pub const BY_ID: usize = 1;
pub const BY_TABLE: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Systableperms,
    name: "SYSTABLEPERMS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[GRANTEE as u32, TABLEID as u32, GRANTOR as u32]),
        IndexDef::unique(&[TABLEPERMSID as u32]),
        IndexDef::non_unique(&[TABLEID as u32]),
    ],
    since: DictionaryVersion::V10_2,
};

/// Position of the first privilege column; privileges follow in
/// `TablePrivilege` order.
const FIRST_PRIVILEGE: usize = SELECTPRIV;

pub struct SysTablePermsFactory;

impl RowFactory for SysTablePermsFactory {
    type Descriptor = TablePermsDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&TablePermsDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(perms) = descriptor else {
            return Ok(DEF.null_row());
        };

        let mut row = vec![
            Value::Uuid(perms.uuid),
            Value::from(perms.grantee.as_str()),
            Value::from(perms.grantor.as_str()),
            Value::Uuid(perms.table_id),
        ];
        row.extend(
            TablePrivilege::ALL
                .iter()
                .map(|&p| Value::from(perms.get(p).as_char())),
        );
        Ok(row)
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<TablePermsDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        let mut privileges = [Grant::No; 6];
        for (i, grant) in privileges.iter_mut().enumerate() {
            *grant = r.coded(FIRST_PRIVILEGE + i, Grant::from_char)?;
        }

        Ok(TablePermsDescriptor {
            uuid: r.uuid(TABLEPERMSID)?,
            grantee: r.string(GRANTEE)?,
            grantor: r.string(GRANTOR)?,
            table_id: r.uuid(TABLEID)?,
            privileges,
        })
    }
}

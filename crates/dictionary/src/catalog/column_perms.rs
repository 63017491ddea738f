use {
    super::{
        ensure_width, payload_value, req, CatalogDef, CatalogNumber, IndexDef, RowFactory,
        RowReader, CHAR, IDENTIFIER, PAYLOAD, UUID,
    },
    crate::{
        descriptor::{ColPermsDescriptor, ColumnPrivilege},
        error::Result,
        version::DictionaryVersion,
    },
    def::{Row, Value},
};

catalog_columns! {
    COLPERMSID = 1, req(UUID);
    GRANTEE = 2, req(IDENTIFIER);
    GRANTOR = 3, req(IDENTIFIER);
    TABLEID = 4, req(UUID);
    TYPE = 5, req(CHAR);
    COLUMNS_ as "COLUMNS" = 6, req(PAYLOAD);
}

pub const BY_GRANTEE: usize = 0;
pub const BY_ID: usize = 1;
pub const BY_TABLE: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Syscolperms,
    name: "SYSCOLPERMS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[GRANTEE as u32, TABLEID as u32, TYPE as u32, GRANTOR as u32]),
        IndexDef::unique(&[COLPERMSID as u32]),
        IndexDef::non_unique(&[TABLEID as u32]),
    ],
    since: DictionaryVersion::V10_2,
};

pub struct SysColPermsFactory;

impl RowFactory for SysColPermsFactory {
    type Descriptor = ColPermsDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&ColPermsDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(perms) = descriptor else {
            return Ok(DEF.null_row());
        };

        Ok(vec![
            Value::Uuid(perms.uuid),
            Value::from(perms.grantee.as_str()),
            Value::from(perms.grantor.as_str()),
            Value::Uuid(perms.table_id),
            Value::from(perms.privilege.as_char()),
            payload_value(&DEF, &perms.columns)?,
        ])
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<ColPermsDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(ColPermsDescriptor {
            uuid: r.uuid(COLPERMSID)?,
            grantee: r.string(GRANTEE)?,
            grantor: r.string(GRANTOR)?,
            table_id: r.uuid(TABLEID)?,
            privilege: r.coded(TYPE, ColumnPrivilege::from_char)?,
            columns: r.payload(COLUMNS_)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, common::dsa::BitSet, def::Uuid};

    #[test]
    fn round_trip() {
        let perms = ColPermsDescriptor::new(
            "BOB",
            "ALICE",
            Uuid::new_v4(),
            ColumnPrivilege::Update,
            BitSet::from_positions(5, [0, 3]),
        );
        let row = SysColPermsFactory::make_row(Some(&perms), None).unwrap();
        assert_eq!(SysColPermsFactory::build_descriptor(&row, None).unwrap(), perms);
    }
}

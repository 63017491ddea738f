use {
    super::{
        ensure_width, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader, CHAR, UUID,
    },
    crate::{
        descriptor::{ReferentialAction, SubForeignKeyConstraint},
        error::Result,
        version::DictionaryVersion,
    },
    def::{Row, Value},
};

catalog_columns! {
    CONSTRAINTID = 1, req(UUID);
    CONGLOMERATEID = 2, req(UUID);
    KEYCONSTRAINTID = 3, req(UUID);
    DELETERULE = 4, req(CHAR);
    UPDATERULE = 5, req(CHAR);
}

pub const BY_CONSTRAINT: usize = 0;
pub const BY_INDEX: usize = 1;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysforeignkeys,
    name: "SYSFOREIGNKEYS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[CONSTRAINTID as u32]),
        IndexDef::non_unique(&[CONGLOMERATEID as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

pub struct SysForeignKeysFactory;

impl RowFactory for SysForeignKeysFactory {
    type Descriptor = SubForeignKeyConstraint;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&SubForeignKeyConstraint>, _: Option<&()>) -> Result<Row> {
        Ok(match descriptor {
            Some(fk) => vec![
                Value::Uuid(fk.constraint_id),
                Value::Uuid(fk.index_id),
                Value::Uuid(fk.key_constraint_id),
                Value::from(fk.delete_rule.as_char()),
                Value::from(fk.update_rule.as_char()),
            ],
            None => DEF.null_row(),
        })
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<SubForeignKeyConstraint> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(SubForeignKeyConstraint {
            constraint_id: r.uuid(CONSTRAINTID)?,
            index_id: r.uuid(CONGLOMERATEID)?,
            key_constraint_id: r.uuid(KEYCONSTRAINTID)?,
            delete_rule: r.coded(DELETERULE, ReferentialAction::from_char)?,
            update_rule: r.coded(UPDATERULE, ReferentialAction::from_char)?,
        })
    }
}

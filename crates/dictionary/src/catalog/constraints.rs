use {
    super::{
        ensure_width, req, CatalogDef, CatalogNumber, IndexDef, RowFactory, RowReader, CHAR,
        IDENTIFIER, INT, UUID,
    },
    crate::{
        descriptor::{
            CheckConstraint, ConstraintDescriptor, ConstraintKind, ConstraintType,
            ForeignKeyConstraint, KeyConstraint, SubConstraint,
        },
        error::{InternalSnafu, InvalidRowSnafu, Result},
        version::DictionaryVersion,
    },
    def::{Row, Value},
    snafu::prelude::*,
};

catalog_columns! {
    CONSTRAINTID = 1, req(UUID);
    TABLEID = 2, req(UUID);
    CONSTRAINTNAME = 3, req(IDENTIFIER);
    TYPE = 4, req(CHAR);
    SCHEMAID = 5, req(UUID);
    STATE = 6, req(CHAR);
    REFERENCECOUNT = 7, req(INT);
}

pub const BY_ID: usize = 0;
pub const BY_NAME: usize = 1;
pub const BY_TABLE: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysconstraints,
    name: "SYSCONSTRAINTS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[CONSTRAINTID as u32]),
        IndexDef::unique(&[CONSTRAINTNAME as u32, SCHEMAID as u32]),
        IndexDef::non_unique(&[TABLEID as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

/// Constraint rows carry the common part of a constraint; the parent
/// sub-constraint supplies the type specific part.
pub struct SysConstraintsFactory;

impl SysConstraintsFactory {
    pub fn constraint_type(row: &Row) -> Result<ConstraintType> {
        RowReader::new(&DEF, row).coded(TYPE, ConstraintType::from_char)
    }
}

impl RowFactory for SysConstraintsFactory {
    type Descriptor = ConstraintDescriptor;
    type Parent = SubConstraint;

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(
        descriptor: Option<&ConstraintDescriptor>,
        _: Option<&SubConstraint>,
    ) -> Result<Row> {
        let Some(cd) = descriptor else {
            return Ok(DEF.null_row());
        };

        Ok(vec![
            Value::Uuid(cd.uuid),
            Value::Uuid(cd.table_id),
            Value::from(cd.name.as_str()),
            Value::from(cd.constraint_type().as_char()),
            Value::Uuid(cd.schema_id),
            Value::from(if cd.enabled { 'E' } else { 'D' }),
            Value::Int(cd.reference_count()),
        ])
    }

    fn build_descriptor(row: &Row, sub: Option<&SubConstraint>) -> Result<ConstraintDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);
        let sub = sub.context(InternalSnafu {
            details: "constraint rows are built with their sub-constraint",
        })?;

        let ty = r.coded(TYPE, ConstraintType::from_char)?;
        let kind = match (ty, sub) {
            (ConstraintType::PrimaryKey, SubConstraint::Key(key)) => {
                ConstraintKind::PrimaryKey(KeyConstraint {
                    index_id: key.index_id,
                    reference_count: r.i32(REFERENCECOUNT)?,
                })
            }
            (ConstraintType::Unique, SubConstraint::Key(key)) => {
                ConstraintKind::Unique(KeyConstraint {
                    index_id: key.index_id,
                    reference_count: r.i32(REFERENCECOUNT)?,
                })
            }
            (ConstraintType::ForeignKey, SubConstraint::ForeignKey(fk)) => {
                ConstraintKind::ForeignKey(ForeignKeyConstraint {
                    index_id: fk.index_id,
                    referenced_constraint_id: fk.key_constraint_id,
                    delete_rule: fk.delete_rule,
                    update_rule: fk.update_rule,
                })
            }
            (ConstraintType::Check, SubConstraint::Check(check)) => {
                ConstraintKind::Check(CheckConstraint {
                    text: check.text.clone(),
                    referenced_columns: check.referenced_columns.clone(),
                })
            }
            (ty, _) => {
                return InvalidRowSnafu {
                    catalog: DEF.name,
                    details: format!("sub-constraint does not match type {:?}", ty),
                }
                .fail()
            }
        };

        Ok(ConstraintDescriptor {
            uuid: r.uuid(CONSTRAINTID)?,
            name: r.string(CONSTRAINTNAME)?,
            table_id: r.uuid(TABLEID)?,
            schema_id: r.uuid(SCHEMAID)?,
            enabled: r.char(STATE)? == 'E',
            kind,
        })
    }
}

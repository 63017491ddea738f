use {
    super::{
        ensure_width, payload_value, req, opt, CatalogDef, CatalogNumber, IndexDef, RowFactory,
        RowReader, BIGINT, BOOLEAN, IDENTIFIER, PAYLOAD, UUID,
    },
    crate::{descriptor::ConglomerateDescriptor, error::Result, version::DictionaryVersion},
    def::{Row, Value},
};

catalog_columns! {
    SCHEMAID = 1, req(UUID);
    TABLEID = 2, req(UUID);
    CONGLOMERATENUMBER = 3, req(BIGINT);
    CONGLOMERATENAME = 4, opt(IDENTIFIER);
    ISINDEX = 5, req(BOOLEAN);
    DESCRIPTOR = 6, opt(PAYLOAD);
    ISCONSTRAINT = 7, req(BOOLEAN);
    CONGLOMERATEID = 8, req(UUID);
}

pub const BY_ID: usize = 0;
pub const BY_NAME: usize = 1;
pub const BY_TABLE: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysconglomerates,
    name: "SYSCONGLOMERATES",
    columns: COLUMNS,
    indexes: &[
        IndexDef::non_unique(&[CONGLOMERATEID as u32]),
        IndexDef::unique(&[CONGLOMERATENAME as u32, SCHEMAID as u32]),
        IndexDef::non_unique(&[TABLEID as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

pub struct SysConglomeratesFactory;

impl RowFactory for SysConglomeratesFactory {
    type Descriptor = ConglomerateDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&ConglomerateDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(cd) = descriptor else {
            return Ok(DEF.null_row());
        };

        Ok(vec![
            Value::Uuid(cd.schema_id),
            Value::Uuid(cd.table_id),
            Value::BigInt(cd.number),
            Value::from(cd.name.as_str()),
            Value::Boolean(cd.is_index),
            match &cd.index_row_generator {
                Some(generator) => payload_value(&DEF, generator)?,
                None => Value::Null,
            },
            Value::Boolean(cd.is_constraint),
            Value::Uuid(cd.uuid),
        ])
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<ConglomerateDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(ConglomerateDescriptor {
            uuid: r.uuid(CONGLOMERATEID)?,
            number: r.i64(CONGLOMERATENUMBER)?,
            name: r.string(CONGLOMERATENAME)?,
            is_index: r.bool(ISINDEX)?,
            index_row_generator: r.opt_payload(DESCRIPTOR)?,
            is_constraint: r.bool(ISCONSTRAINT)?,
            table_id: r.uuid(TABLEID)?,
            schema_id: r.uuid(SCHEMAID)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::index_row::IndexRowGenerator, def::Uuid};

    #[test]
    fn round_trip() {
        let table = Uuid::new_v4();
        let schema = Uuid::new_v4();
        let descriptors = [
            ConglomerateDescriptor::heap(17, table, schema),
            ConglomerateDescriptor::index(
                18,
                "T_IDX",
                IndexRowGenerator::btree(true, &[2, 1]),
                true,
                table,
                schema,
            ),
        ];

        for cd in descriptors {
            let row = SysConglomeratesFactory::make_row(Some(&cd), None).unwrap();
            assert_eq!(SysConglomeratesFactory::build_descriptor(&row, None).unwrap(), cd);
        }
    }

    #[test]
    fn template_row_is_null() {
        let row = SysConglomeratesFactory::make_row(None, None).unwrap();
        assert_eq!(row.len(), DEF.column_count());
        assert!(row.iter().all(Value::is_null));

        let entry =
            SysConglomeratesFactory::build_empty_index_row(BY_NAME, access::RowLocation::MIN);
        assert_eq!(entry.key, vec![Value::Null, Value::Null]);
    }
}

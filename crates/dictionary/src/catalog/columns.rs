use {
    super::{
        ensure_width, opt, payload_value, req, CatalogDef, CatalogNumber, IndexDef, RowFactory,
        RowReader, BIGINT, IDENTIFIER, INT, PAYLOAD, UUID,
    },
    crate::{
        descriptor::{AutoIncrement, ColumnDescriptor},
        error::Result,
        version::DictionaryVersion,
    },
    def::{Row, Value},
};

catalog_columns! {
    REFERENCEID = 1, req(UUID);
    COLUMNNAME = 2, req(IDENTIFIER);
    COLUMNNUMBER = 3, req(INT);
    COLUMNDATATYPE = 4, req(PAYLOAD);
    COLUMNDEFAULT = 5, opt(PAYLOAD);
    COLUMNDEFAULTID = 6, opt(UUID);
    AUTOINCREMENTVALUE = 7, opt(BIGINT);
    AUTOINCREMENTSTART = 8, opt(BIGINT);
    AUTOINCREMENTINC = 9, opt(BIGINT);
}

pub const BY_NAME: usize = 0;
pub const BY_DEFAULT_ID: usize = 1;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Syscolumns,
    name: "SYSCOLUMNS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[REFERENCEID as u32, COLUMNNAME as u32]),
        IndexDef::non_unique(&[COLUMNDEFAULTID as u32]).since(DictionaryVersion::V10_1),
    ],
    since: DictionaryVersion::V10_0,
};

pub struct SysColumnsFactory;

impl RowFactory for SysColumnsFactory {
    type Descriptor = ColumnDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&ColumnDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(cd) = descriptor else {
            return Ok(DEF.null_row());
        };

        let (value, start, increment) = match cd.auto_increment {
            Some(ai) => (
                Value::BigInt(ai.current),
                Value::BigInt(ai.start),
                Value::BigInt(ai.increment),
            ),
            None => (Value::Null, Value::Null, Value::Null),
        };

        Ok(vec![
            Value::Uuid(cd.reference_id),
            Value::from(cd.name.as_str()),
            Value::Int(cd.position as i32),
            payload_value(&DEF, &cd.type_descriptor)?,
            match &cd.default {
                Some(default) => payload_value(&DEF, default)?,
                None => Value::Null,
            },
            Value::from(cd.default_id),
            value,
            start,
            increment,
        ])
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<ColumnDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        // a zero or missing increment marks a plain column
        let auto_increment = match r.opt_i64(AUTOINCREMENTINC)? {
            Some(increment) if increment != 0 => {
                let start = r.opt_i64(AUTOINCREMENTSTART)?.unwrap_or(1);
                Some(AutoIncrement {
                    current: r.opt_i64(AUTOINCREMENTVALUE)?.unwrap_or(start),
                    start,
                    increment,
                })
            }
            _ => None,
        };

        Ok(ColumnDescriptor {
            reference_id: r.uuid(REFERENCEID)?,
            name: r.string(COLUMNNAME)?,
            position: r.i32(COLUMNNUMBER)? as u32,
            type_descriptor: r.payload(COLUMNDATATYPE)?,
            default: r.opt_payload(COLUMNDEFAULT)?,
            default_id: r.opt_uuid(COLUMNDEFAULTID)?,
            auto_increment,
        })
    }
}

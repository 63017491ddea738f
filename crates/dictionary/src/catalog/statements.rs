use {
    super::{
        ensure_width, opt, req, timestamp_value, CatalogDef, CatalogNumber, IndexDef, RowFactory,
        RowReader, BOOLEAN, CHAR, IDENTIFIER, PAYLOAD, TEXT, TIMESTAMP, UUID,
    },
    crate::{
        descriptor::{SpsDescriptor, SpsType},
        error::Result,
        version::DictionaryVersion,
    },
    def::{Row, Value},
};

catalog_columns! {
    STMTID = 1, req(UUID);
    STMTNAME = 2, req(IDENTIFIER);
    SCHEMAID = 3, req(UUID);
    TYPE = 4, req(CHAR);
    VALID = 5, req(BOOLEAN);
    TEXT_ as "TEXT" = 6, req(TEXT);
    LASTCOMPILED = 7, opt(TIMESTAMP);
    COMPILATIONSCHEMAID = 8, opt(UUID);
    USINGTEXT = 9, opt(TEXT);
    CONSTANTSTATE = 10, opt(PAYLOAD);
}

pub const BY_ID: usize = 0;
pub const BY_NAME: usize = 1;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysstatements,
    name: "SYSSTATEMENTS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[STMTID as u32]),
        IndexDef::unique(&[STMTNAME as u32, SCHEMAID as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

/// Statement rows. Parameters live in SYSCOLUMNS and are attached by the
/// dictionary.
pub struct SysStatementsFactory;

impl RowFactory for SysStatementsFactory {
    type Descriptor = SpsDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&SpsDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(sps) = descriptor else {
            return Ok(DEF.null_row());
        };

        Ok(vec![
            Value::Uuid(sps.uuid),
            Value::from(sps.name.as_str()),
            Value::Uuid(sps.schema_id),
            Value::from(sps.sps_type.as_char()),
            Value::Boolean(sps.valid),
            Value::from(sps.text.as_str()),
            sps.last_compiled
                .as_ref()
                .map(timestamp_value)
                .unwrap_or(Value::Null),
            Value::from(sps.compilation_schema_id),
            Value::from(sps.using_text.clone()),
            Value::from(sps.compiled_plan.clone()),
        ])
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<SpsDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(SpsDescriptor {
            uuid: r.uuid(STMTID)?,
            name: r.string(STMTNAME)?,
            schema_id: r.uuid(SCHEMAID)?,
            sps_type: r.coded(TYPE, SpsType::from_char)?,
            valid: r.bool(VALID)?,
            text: r.string(TEXT_)?,
            last_compiled: r.opt_timestamp(LASTCOMPILED)?,
            compilation_schema_id: r.opt_uuid(COMPILATIONSCHEMAID)?,
            using_text: r.opt_string(USINGTEXT)?,
            compiled_plan: r.opt_bytes(CONSTANTSTATE)?.map(<[u8]>::to_vec),
            params: vec![],
        })
    }
}

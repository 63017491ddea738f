use {
    super::{
        ensure_width, flag_value, opt, payload_value, req, CatalogDef, CatalogNumber, IndexDef,
        RowFactory, RowReader, BIGINT, CHAR, IDENTIFIER, PAYLOAD, UUID,
    },
    crate::{descriptor::SequenceDescriptor, error::Result, version::DictionaryVersion},
    def::{Row, TypeDescriptor, Value},
};

catalog_columns! {
    SEQUENCEID = 1, req(UUID);
    SEQUENCENAME = 2, req(IDENTIFIER);
    SCHEMAID = 3, req(UUID);
    SEQUENCEDATATYPE = 4, req(PAYLOAD);
    CURRENTVALUE = 5, opt(BIGINT);
    STARTVALUE = 6, req(BIGINT);
    MINIMUMVALUE = 7, req(BIGINT);
    MAXIMUMVALUE = 8, req(BIGINT);
    INCREMENT = 9, req(BIGINT);
    CYCLEOPTION = 10, req(CHAR);
}

pub const BY_ID: usize = 0;
pub const BY_NAME: usize = 1;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Syssequences,
    name: "SYSSEQUENCES",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[SEQUENCEID as u32]),
        IndexDef::unique(&[SCHEMAID as u32, SEQUENCENAME as u32]),
    ],
    since: DictionaryVersion::V10_6,
};

/// Sequence rows. CURRENTVALUE is NULL once a non-cycling sequence runs out.
pub struct SysSequencesFactory;

impl RowFactory for SysSequencesFactory {
    type Descriptor = SequenceDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&SequenceDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(seq) = descriptor else {
            return Ok(DEF.null_row());
        };

        Ok(vec![
            Value::Uuid(seq.uuid),
            Value::from(seq.name.as_str()),
            Value::Uuid(seq.schema_id),
            payload_value(&DEF, &seq.data_type)?,
            Value::from(seq.current_value),
            Value::BigInt(seq.start),
            Value::BigInt(seq.min),
            Value::BigInt(seq.max),
            Value::BigInt(seq.increment),
            flag_value(seq.cycle),
        ])
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<SequenceDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(SequenceDescriptor {
            uuid: r.uuid(SEQUENCEID)?,
            name: r.string(SEQUENCENAME)?,
            schema_id: r.uuid(SCHEMAID)?,
            data_type: r.payload::<TypeDescriptor>(SEQUENCEDATATYPE)?,
            current_value: r.opt_i64(CURRENTVALUE)?,
            start: r.i64(STARTVALUE)?,
            min: r.i64(MINIMUMVALUE)?,
            max: r.i64(MAXIMUMVALUE)?,
            increment: r.i64(INCREMENT)?,
            cycle: r.flag(CYCLEOPTION)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        def::{DataType, Uuid},
    };

    #[test]
    fn round_trip() {
        let mut seq = SequenceDescriptor::new(
            "ORDER_IDS",
            Uuid::new_v4(),
            TypeDescriptor::not_null(DataType::Int),
            Some(1),
            1,
            false,
        );
        let row = SysSequencesFactory::make_row(Some(&seq), None).unwrap();
        assert_eq!(SysSequencesFactory::build_descriptor(&row, None).unwrap(), seq);

        seq.current_value = None;
        let row = SysSequencesFactory::make_row(Some(&seq), None).unwrap();
        assert!(row[CURRENTVALUE - 1].is_null());
        assert_eq!(SysSequencesFactory::build_descriptor(&row, None).unwrap(), seq);
    }
}

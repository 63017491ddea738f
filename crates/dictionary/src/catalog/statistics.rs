use {
    super::{
        ensure_width, payload_value, req, timestamp_value, CatalogDef, CatalogNumber, IndexDef,
        RowFactory, RowReader, BOOLEAN, CHAR, INT, PAYLOAD, TIMESTAMP, UUID,
    },
    crate::{
        descriptor::StatisticsDescriptor,
        error::{InvalidRowSnafu, Result},
        formatable::Formatable,
        version::DictionaryVersion,
    },
    byteorder::{ReadBytesExt, WriteBytesExt, LE},
    def::{Row, Value},
    snafu::prelude::*,
    std::io::{self, Read, Write},
};

catalog_columns! {
    STATID = 1, req(UUID);
    REFERENCEID = 2, req(UUID);
    TABLEID = 3, req(UUID);
    CREATIONTIMESTAMP = 4, req(TIMESTAMP);
    TYPE = 5, req(CHAR);
    VALID = 6, req(BOOLEAN);
    COLCOUNT = 7, req(INT);
    STATISTICS = 8, req(PAYLOAD);
}

pub const BY_REFERENCE: usize = 0;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysstatistics,
    name: "SYSSTATISTICS",
    columns: COLUMNS,
    indexes: &[IndexDef::non_unique(&[TABLEID as u32, REFERENCEID as u32])],
    since: DictionaryVersion::V10_0,
};

const INDEX_STATISTICS: char = 'I';

/// Payload of SYSSTATISTICS.STATISTICS.
struct Cardinality {
    row_estimate: i64,
    unique_rows: i64,
}

impl Formatable for Cardinality {
    fn write_to<W: Write>(&self, w: &mut W) -> io::Result<()> {
        w.write_i64::<LE>(self.row_estimate)?;
        w.write_i64::<LE>(self.unique_rows)
    }

    fn read_from<R: Read>(r: &mut R) -> io::Result<Self> {
        Ok(Self {
            row_estimate: r.read_i64::<LE>()?,
            unique_rows: r.read_i64::<LE>()?,
        })
    }
}

pub struct SysStatisticsFactory;

impl RowFactory for SysStatisticsFactory {
    type Descriptor = StatisticsDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&StatisticsDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(sd) = descriptor else {
            return Ok(DEF.null_row());
        };

        let cardinality = Cardinality {
            row_estimate: sd.row_estimate,
            unique_rows: sd.unique_rows,
        };

        Ok(vec![
            Value::Uuid(sd.uuid),
            Value::Uuid(sd.reference_id),
            Value::Uuid(sd.table_id),
            timestamp_value(&sd.creation_timestamp),
            Value::from(INDEX_STATISTICS),
            Value::Boolean(sd.valid),
            Value::Int(sd.column_count),
            payload_value(&DEF, &cardinality)?,
        ])
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<StatisticsDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        let ty = r.char(TYPE)?;
        ensure!(
            ty == INDEX_STATISTICS,
            InvalidRowSnafu {
                catalog: DEF.name,
                details: format!("unknown statistics type {:?}", ty),
            }
        );
        let cardinality: Cardinality = r.payload(STATISTICS)?;

        Ok(StatisticsDescriptor {
            uuid: r.uuid(STATID)?,
            reference_id: r.uuid(REFERENCEID)?,
            table_id: r.uuid(TABLEID)?,
            creation_timestamp: r.timestamp(CREATIONTIMESTAMP)?,
            valid: r.bool(VALID)?,
            column_count: r.i32(COLCOUNT)?,
            row_estimate: cardinality.row_estimate,
            unique_rows: cardinality.unique_rows,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::DateTime, def::Uuid};

    #[test]
    fn round_trip() {
        let sd = StatisticsDescriptor {
            uuid: Uuid::new_v4(),
            reference_id: Uuid::new_v4(),
            table_id: Uuid::new_v4(),
            creation_timestamp: DateTime::from_timestamp_micros(1_600_000_000_000_000).unwrap(),
            valid: true,
            column_count: 2,
            row_estimate: 1000,
            unique_rows: 250,
        };
        let row = SysStatisticsFactory::make_row(Some(&sd), None).unwrap();
        assert_eq!(SysStatisticsFactory::build_descriptor(&row, None).unwrap(), sd);
    }
}

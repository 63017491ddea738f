use {
    super::{
        ensure_width, opt, payload_value, req, timestamp_value, CatalogDef, CatalogNumber,
        IndexDef, RowFactory, RowReader, BOOLEAN, CHAR, IDENTIFIER, PAYLOAD, TEXT, TIMESTAMP, UUID,
    },
    crate::{
        descriptor::{FiringTime, ReferencedColumns, TriggerDescriptor, TriggerEvent},
        error::Result,
        version::DictionaryVersion,
    },
    def::{Row, Value},
};

catalog_columns! {
    TRIGGERID = 1, req(UUID);
    TRIGGERNAME = 2, req(IDENTIFIER);
    SCHEMAID = 3, req(UUID);
    CREATIONTIMESTAMP = 4, req(TIMESTAMP);
    EVENT = 5, req(CHAR);
    FIRINGTIME = 6, req(CHAR);
    TYPE = 7, req(CHAR);
    STATE = 8, req(CHAR);
    TABLEID = 9, req(UUID);
    WHENSTMTID = 10, opt(UUID);
    ACTIONSTMTID = 11, req(UUID);
    REFERENCEDCOLUMNS = 12, opt(PAYLOAD);
    TRIGGERDEFINITION = 13, req(TEXT);
    REFERENCINGOLD = 14, req(BOOLEAN);
    REFERENCINGNEW = 15, req(BOOLEAN);
    OLDREFERENCINGNAME = 16, opt(IDENTIFIER);
    NEWREFERENCINGNAME = 17, opt(IDENTIFIER);
    WHENCLAUSETEXT = 18, opt(TEXT), since V10_7;
}

pub const BY_ID: usize = 0;
pub const BY_NAME: usize = 1;
pub const BY_TABLE: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Systriggers,
    name: "SYSTRIGGERS",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[TRIGGERID as u32]),
        IndexDef::unique(&[TRIGGERNAME as u32, SCHEMAID as u32]),
        // creation order within a table is firing order
        IndexDef::non_unique(&[TABLEID as u32, CREATIONTIMESTAMP as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

pub struct SysTriggersFactory;

impl RowFactory for SysTriggersFactory {
    type Descriptor = TriggerDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&TriggerDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(td) = descriptor else {
            return Ok(DEF.null_row());
        };

        let referenced_columns = match &td.referenced_columns {
            Some(columns) => payload_value(&DEF, columns)?,
            None => Value::Null,
        };

        Ok(vec![
            Value::Uuid(td.uuid),
            Value::from(td.name.as_str()),
            Value::Uuid(td.schema_id),
            timestamp_value(&td.creation_timestamp),
            Value::from(td.event.as_char()),
            Value::from(td.firing_time.as_char()),
            Value::from(if td.row_level { 'R' } else { 'S' }),
            Value::from(if td.enabled { 'E' } else { 'D' }),
            Value::Uuid(td.table_id),
            Value::from(td.when_stmt_id),
            Value::Uuid(td.action_stmt_id),
            referenced_columns,
            Value::from(td.definition.as_str()),
            Value::Boolean(td.referencing_old()),
            Value::Boolean(td.referencing_new()),
            Value::from(td.old_referencing_name.clone()),
            Value::from(td.new_referencing_name.clone()),
            Value::from(td.when_clause_text.clone()),
        ])
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<TriggerDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        Ok(TriggerDescriptor {
            uuid: r.uuid(TRIGGERID)?,
            name: r.string(TRIGGERNAME)?,
            schema_id: r.uuid(SCHEMAID)?,
            creation_timestamp: r.timestamp(CREATIONTIMESTAMP)?,
            event: r.coded(EVENT, TriggerEvent::from_char)?,
            firing_time: r.coded(FIRINGTIME, FiringTime::from_char)?,
            row_level: r.char(TYPE)? == 'R',
            enabled: r.char(STATE)? == 'E',
            table_id: r.uuid(TABLEID)?,
            when_stmt_id: r.opt_uuid(WHENSTMTID)?,
            action_stmt_id: r.uuid(ACTIONSTMTID)?,
            referenced_columns: r.opt_payload::<ReferencedColumns>(REFERENCEDCOLUMNS)?,
            definition: r.string(TRIGGERDEFINITION)?,
            old_referencing_name: r.opt_string(OLDREFERENCINGNAME)?,
            new_referencing_name: r.opt_string(NEWREFERENCINGNAME)?,
            when_clause_text: r.opt_string(WHENCLAUSETEXT)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use {super::*, chrono::DateTime, def::Uuid};

    fn trigger() -> TriggerDescriptor {
        TriggerDescriptor {
            uuid: Uuid::new_v4(),
            name: "AUDIT_UPD".into(),
            schema_id: Uuid::new_v4(),
            creation_timestamp: DateTime::from_timestamp_micros(1_650_000_000_000_001).unwrap(),
            event: TriggerEvent::Update,
            firing_time: FiringTime::After,
            row_level: true,
            enabled: true,
            table_id: Uuid::new_v4(),
            when_stmt_id: None,
            action_stmt_id: Uuid::new_v4(),
            referenced_columns: Some(ReferencedColumns {
                trigger_columns: vec![2],
                action_columns: vec![1, 2],
            }),
            definition: "INSERT INTO AUDIT VALUES (OLD.ID, NEW.QTY)".into(),
            old_referencing_name: Some("OLD".into()),
            new_referencing_name: Some("NEW".into()),
            when_clause_text: None,
        }
    }

    #[test]
    fn round_trip() {
        let td = trigger();
        let row = SysTriggersFactory::make_row(Some(&td), None).unwrap();
        assert_eq!(row[REFERENCINGOLD - 1], Value::Boolean(true));
        assert_eq!(SysTriggersFactory::build_descriptor(&row, None).unwrap(), td);
    }

    #[test]
    fn reads_rows_without_when_clause_column() {
        let td = trigger();
        let mut row = SysTriggersFactory::make_row(Some(&td), None).unwrap();
        row.truncate(WHENCLAUSETEXT - 1);

        let read = SysTriggersFactory::build_descriptor(&row, None).unwrap();
        assert_eq!(read.when_clause_text, None);
        assert_eq!(read.definition, td.definition);
    }
}

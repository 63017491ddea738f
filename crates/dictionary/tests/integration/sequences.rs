use {
    crate::{app_schema, create_table},
    access::AccessManager,
    def::{DataType, TypeDescriptor},
    dictionary::{
        descriptor::{AutoIncrement, SequenceDescriptor},
        BootOptions, DataDictionary, Error, Session,
    },
    std::{sync::Arc, thread},
};

fn dictionary(options: BootOptions) -> DataDictionary {
    DataDictionary::create(AccessManager::in_memory(), options).unwrap()
}

#[test]
fn sequences_reserve_ranges() {
    let dd = dictionary(BootOptions::new());
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let seq = SequenceDescriptor::new(
        "ORDER_IDS",
        app.uuid,
        TypeDescriptor::not_null(DataType::Int),
        Some(10),
        5,
        false,
    );
    dd.add_sequence_descriptor(&tc, &seq).unwrap();
    assert!(dd.add_sequence_descriptor(&tc, &seq).is_err());
    tc.commit().unwrap();

    let tc = dd.manager().begin();
    let values = (0..3)
        .map(|_| dd.get_next_sequence_value(&tc, seq.uuid).unwrap())
        .collect::<Vec<_>>();
    assert_eq!(values, vec![10, 15, 20]);
    assert_eq!(dd.peek_at_sequence(&tc, seq.uuid).unwrap(), Some(25));

    // a whole range was recorded, and survives the rollback
    tc.abort().unwrap();
    let tc = dd.manager().begin();
    let stored = dd.get_sequence_descriptor(&tc, seq.uuid).unwrap().unwrap();
    assert_eq!(stored.current_value, Some(10 + 100 * 5));

    // flushing hands the unused values back
    dd.clear_caches().unwrap();
    let stored = dd
        .get_sequence_descriptor_by_name(&tc, app.uuid, "ORDER_IDS")
        .unwrap()
        .unwrap();
    assert_eq!(stored.current_value, Some(25));
    assert_eq!(dd.get_next_sequence_value(&tc, seq.uuid).unwrap(), 25);

    dd.drop_sequence_descriptor(&tc, &seq).unwrap();
    assert!(dd.get_sequence_descriptor(&tc, seq.uuid).unwrap().is_none());
    assert!(dd.get_next_sequence_value(&tc, seq.uuid).is_err());
    tc.commit().unwrap();
}

#[test]
fn discarded_values_are_skipped() {
    let dd = dictionary(
        BootOptions::new()
            .with_property("derby.language.sequenceFlushPolicy", "discardUnused")
            .with_property("derby.language.sequencePreallocator", "20"),
    );
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let seq = SequenceDescriptor::new(
        "S",
        app.uuid,
        TypeDescriptor::not_null(DataType::BigInt),
        Some(1),
        1,
        false,
    );
    dd.add_sequence_descriptor(&tc, &seq).unwrap();

    assert_eq!(dd.get_next_sequence_value(&tc, seq.uuid).unwrap(), 1);
    dd.clear_caches().unwrap();
    assert_eq!(dd.get_next_sequence_value(&tc, seq.uuid).unwrap(), 21);
    tc.commit().unwrap();
}

#[test]
fn uncached_sequences_persist_every_value() {
    let dd = dictionary(
        BootOptions::new().with_property("derby.language.sequenceGeneratorCacheSize", "0"),
    );
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let seq = SequenceDescriptor::new(
        "S",
        app.uuid,
        TypeDescriptor::not_null(DataType::Int),
        Some(1),
        1,
        false,
    );
    dd.add_sequence_descriptor(&tc, &seq).unwrap();
    tc.commit().unwrap();

    let tc = dd.manager().begin();
    assert_eq!(dd.get_next_sequence_value(&tc, seq.uuid).unwrap(), 1);
    assert_eq!(dd.get_next_sequence_value(&tc, seq.uuid).unwrap(), 2);
    let stored = dd.get_sequence_descriptor(&tc, seq.uuid).unwrap().unwrap();
    assert_eq!(stored.current_value, Some(3));
    tc.abort().unwrap();

    let tc = dd.manager().begin();
    assert_eq!(dd.get_next_sequence_value(&tc, seq.uuid).unwrap(), 3);
    tc.commit().unwrap();
}

#[test]
fn sequences_run_out() {
    let dd = dictionary(BootOptions::new());
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let seq = SequenceDescriptor::new(
        "TINY",
        app.uuid,
        TypeDescriptor::not_null(DataType::SmallInt),
        Some(i16::MAX as i64 - 1),
        1,
        false,
    );
    dd.add_sequence_descriptor(&tc, &seq).unwrap();

    assert_eq!(dd.get_next_sequence_value(&tc, seq.uuid).unwrap(), 32766);
    assert_eq!(dd.get_next_sequence_value(&tc, seq.uuid).unwrap(), 32767);
    assert!(matches!(
        dd.get_next_sequence_value(&tc, seq.uuid).unwrap_err(),
        Error::SequenceExhausted { .. }
    ));
    assert_eq!(dd.peek_at_sequence(&tc, seq.uuid).unwrap(), None);

    let cycling = SequenceDescriptor::new(
        "WHEEL",
        app.uuid,
        TypeDescriptor::not_null(DataType::SmallInt),
        Some(i16::MAX as i64),
        1,
        true,
    );
    dd.add_sequence_descriptor(&tc, &cycling).unwrap();
    assert_eq!(dd.get_next_sequence_value(&tc, cycling.uuid).unwrap(), 32767);
    assert_eq!(dd.get_next_sequence_value(&tc, cycling.uuid).unwrap(), -32768);
    tc.commit().unwrap();
}

#[test]
fn identity_columns() {
    let dd = dictionary(BootOptions::new());
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let columns = [("ID", DataType::BigInt), ("X", DataType::Int)];
    let td = create_table(&dd, &tc, &app, "T", &columns);
    let id = td.column("ID").unwrap().clone().with_auto_increment(1, 1);
    dd.update_column_descriptor(&tc, td.uuid, "ID", &id).unwrap();
    tc.commit().unwrap();

    let tc = dd.manager().begin();
    assert_eq!(dd.get_next_identity_value(&tc, td.uuid).unwrap(), 1);
    assert_eq!(dd.get_next_identity_value(&tc, td.uuid).unwrap(), 2);

    let td = dd.get_table_descriptor_by_id(&tc, td.uuid).unwrap().unwrap();
    let locations = dd.compute_autoinc_row_locations(&tc, &td).unwrap();
    assert_eq!(locations.len(), 2);
    assert!(locations[1].is_none());
    let location = locations[0].unwrap();
    // reading the row directly hands the cached range back first
    assert_eq!(dd.get_set_autoincrement_value(&tc, location, false).unwrap(), 3);

    dd.clear_caches().unwrap();
    assert_eq!(dd.get_set_autoincrement_value(&tc, location, true).unwrap(), 3);
    assert_eq!(dd.get_set_autoincrement_value(&tc, location, false).unwrap(), 4);

    dd.set_autoincrement_value(&tc, td.uuid, "ID", 50, false).unwrap();
    assert_eq!(dd.get_next_identity_value(&tc, td.uuid).unwrap(), 50);
    tc.commit().unwrap();
}

#[test]
fn zero_increment_is_an_error() {
    let dd = dictionary(BootOptions::new());
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let td = create_table(&dd, &tc, &app, "T", &[("ID", DataType::BigInt)]);
    let mut id = td.column("ID").unwrap().clone();
    id.auto_increment = Some(AutoIncrement {
        current: 1,
        start: 1,
        increment: 0,
    });
    dd.update_column_descriptor(&tc, td.uuid, "ID", &id).unwrap();
    assert!(matches!(
        dd.get_next_identity_value(&tc, td.uuid).unwrap_err(),
        Error::ObjectNotFound { .. }
    ));

    let mut seq = SequenceDescriptor::new(
        "STUCK",
        app.uuid,
        TypeDescriptor::not_null(DataType::Int),
        Some(1),
        1,
        false,
    );
    seq.increment = 0;
    dd.add_sequence_descriptor(&tc, &seq).unwrap();
    assert!(matches!(
        dd.get_next_sequence_value(&tc, seq.uuid).unwrap_err(),
        Error::Internal { .. }
    ));
    tc.commit().unwrap();
}

#[test]
fn concurrent_sessions_never_share_values() {
    let dd = Arc::new(dictionary(
        BootOptions::new().with_property("derby.language.sequencePreallocator", "7"),
    ));
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let seq = SequenceDescriptor::new(
        "TICKETS",
        app.uuid,
        TypeDescriptor::not_null(DataType::BigInt),
        Some(1),
        1,
        false,
    );
    dd.add_sequence_descriptor(&tc, &seq).unwrap();
    let td = create_table(&dd, &tc, &app, "T", &[("ID", DataType::BigInt)]);
    let id = td.column("ID").unwrap().clone().with_auto_increment(1, 1);
    dd.update_column_descriptor(&tc, td.uuid, "ID", &id).unwrap();
    tc.commit().unwrap();

    let issuers = (0..4)
        .map(|_| {
            let dd = dd.clone();
            let (seq_id, table_id) = (seq.uuid, td.uuid);
            thread::spawn(move || {
                let mut issued = (vec![], vec![]);
                for _ in 0..200 {
                    let tc = dd.manager().begin();
                    issued.0.push(dd.get_next_sequence_value(&tc, seq_id).unwrap());
                    issued.1.push(dd.get_next_identity_value(&tc, table_id).unwrap());
                    tc.commit().unwrap();
                }
                issued
            })
        })
        .collect::<Vec<_>>();

    // caches are emptied and DDL comes and goes while values are issued
    let clearer = {
        let dd = dd.clone();
        thread::spawn(move || {
            let session = Session::new();
            for i in 0..60 {
                if i % 2 == 0 {
                    dd.clear_caches().unwrap();
                } else {
                    dd.start_writing(&session).unwrap();
                    thread::yield_now();
                    dd.transaction_finished(&session);
                }
            }
        })
    };
    clearer.join().unwrap();

    let (mut sequence, mut identity) = (vec![], vec![]);
    for handle in issuers {
        let (s, i) = handle.join().unwrap();
        sequence.extend(s);
        identity.extend(i);
    }
    for values in [&mut sequence, &mut identity] {
        assert_eq!(values.len(), 800);
        values.sort_unstable();
        values.dedup();
        assert_eq!(values.len(), 800);
    }
}

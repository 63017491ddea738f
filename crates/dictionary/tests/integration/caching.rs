use {
    crate::{app_schema, create_table, new_dictionary},
    access::AccessManager,
    def::{DataType, Uuid},
    dictionary::{BootOptions, CacheMode, DataDictionary, Error, Session},
    std::{sync::Arc, thread},
    tempfile::tempdir,
};

#[test]
fn ddl_switches_cache_mode() {
    let dd = new_dictionary();
    let reader = Session::new();
    let writer = Session::new();
    assert_eq!(dd.cache_mode(), CacheMode::CompileOnly);

    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);
    tc.commit().unwrap();

    assert_eq!(dd.start_reading(&reader), CacheMode::CompileOnly);
    let tc = dd.manager().begin();
    assert!(dd.get_table_descriptor(&tc, "T", &app).unwrap().is_some());
    tc.commit().unwrap();
    dd.done_reading(&reader);
    assert_eq!(reader.bind_count(), 0);

    // DDL may not start while the same session is binding
    dd.start_reading(&writer);
    assert!(matches!(
        dd.start_writing(&writer).unwrap_err(),
        Error::DdlDuringBind { .. }
    ));
    dd.done_reading(&writer);

    dd.start_writing(&writer).unwrap();
    assert!(writer.in_write_mode());
    assert_eq!(dd.cache_mode(), CacheMode::Ddl);
    let tc = dd.manager().begin();
    dd.drop_table_descriptor(&tc, &td).unwrap();
    tc.commit().unwrap();

    // readers arriving during DDL bind against the catalogs, nested binds
    // keep the mode of the outermost one
    assert_eq!(dd.start_reading(&reader), CacheMode::Ddl);
    assert_eq!(dd.start_reading(&reader), CacheMode::Ddl);
    assert_eq!(reader.bind_count(), 2);
    let tc = dd.manager().begin();
    assert!(dd.get_table_descriptor(&tc, "T", &app).unwrap().is_none());
    tc.commit().unwrap();
    dd.done_reading(&reader);
    dd.done_reading(&reader);

    // the writer's transaction is still open
    assert_eq!(dd.cache_mode(), CacheMode::Ddl);
    dd.transaction_finished(&writer);
    assert!(!writer.in_write_mode());
    assert_eq!(dd.cache_mode(), CacheMode::CompileOnly);

    let tc = dd.manager().begin();
    assert!(dd.get_table_descriptor(&tc, "T", &app).unwrap().is_none());
    tc.commit().unwrap();
}

#[test]
fn readers_and_writers_across_threads() {
    let dd = Arc::new(new_dictionary());
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);
    tc.commit().unwrap();

    let handles = (0..4)
        .map(|i| {
            let dd = dd.clone();
            let app = app.clone();
            thread::spawn(move || {
                let session = Session::new();
                for _ in 0..50 {
                    if i == 0 {
                        dd.start_writing(&session).unwrap();
                        assert_eq!(dd.cache_mode(), CacheMode::Ddl);
                        dd.transaction_finished(&session);
                    } else {
                        dd.start_reading(&session);
                        let tc = dd.manager().begin();
                        let td = dd.get_table_descriptor(&tc, "T", &app).unwrap().unwrap();
                        assert_eq!(td.columns.len(), 1);
                        tc.commit().unwrap();
                        dd.done_reading(&session);
                    }
                }
            })
        })
        .collect::<Vec<_>>();
    for handle in handles {
        handle.join().unwrap();
    }

    assert_eq!(dd.cache_mode(), CacheMode::CompileOnly);
}

#[test]
fn catalogs_fault_in_once() {
    let dir = tempdir().unwrap();
    {
        let manager = AccessManager::create(dir.path()).unwrap();
        DataDictionary::create(manager, BootOptions::new()).unwrap();
    }

    let manager = AccessManager::boot(dir.path()).unwrap();
    let dd = Arc::new(DataDictionary::boot(manager, BootOptions::new()).unwrap());
    assert!(dd.get_tab_info("SYSTABLES").unwrap().is_complete());
    assert!(!dd.get_tab_info("SYSVIEWS").unwrap().is_complete());

    let handles = (0..8)
        .map(|_| {
            let dd = dd.clone();
            thread::spawn(move || {
                let tc = dd.manager().begin();
                assert!(dd.get_view_descriptor(&tc, Uuid::new_v4()).unwrap().is_none());
                tc.commit().unwrap();
                dd.get_tab_info("SYSVIEWS").unwrap().heap_conglomerate().unwrap()
            })
        })
        .collect::<Vec<_>>();
    let heaps = handles
        .into_iter()
        .map(|h| h.join().unwrap())
        .collect::<Vec<_>>();

    assert!(heaps.windows(2).all(|w| w[0] == w[1]));
    assert!(dd.get_tab_info("SYSVIEWS").unwrap().is_complete());

    dir.close().unwrap();
}

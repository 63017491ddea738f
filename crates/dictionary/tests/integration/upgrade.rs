use {
    crate::{app_schema, create_table},
    access::{AccessManager, Qualifiers},
    chrono::Utc,
    def::{DataType, TypeDescriptor, Uuid, Value},
    dictionary::{
        descriptor::{
            AliasType, ColumnDefault, FiringTime, SequenceDescriptor, TriggerDescriptor,
            TriggerEvent, SYSTEM_SCHEMA_NAME, SYSTEM_UTIL_SCHEMA_UUID,
        },
        BootOptions, DataDictionary, DictionaryVersion, Error, PermissionCheck,
        CORE_VERSION_PROPERTY,
    },
    std::path::Path,
    tempfile::tempdir,
};

fn create_at(path: &Path, version: DictionaryVersion) -> DataDictionary {
    let manager = AccessManager::create(path).unwrap();
    DataDictionary::create(manager, BootOptions::new().with_version(version)).unwrap()
}

fn boot(path: &Path, upgrade: bool) -> DataDictionary {
    let manager = AccessManager::boot(path).unwrap();
    let options = BootOptions::new().with_property("upgrade", upgrade.to_string());
    DataDictionary::boot(manager, options).unwrap()
}

fn statement_trigger(name: &str, table_id: Uuid, schema_id: Uuid) -> TriggerDescriptor {
    TriggerDescriptor {
        uuid: Uuid::new_v4(),
        name: name.to_owned(),
        schema_id,
        creation_timestamp: Utc::now(),
        event: TriggerEvent::Insert,
        firing_time: FiringTime::After,
        row_level: false,
        enabled: true,
        table_id,
        when_stmt_id: None,
        action_stmt_id: Uuid::new_v4(),
        referenced_columns: None,
        definition: "VALUES 1".to_owned(),
        old_referencing_name: None,
        new_referencing_name: None,
        when_clause_text: None,
    }
}

#[test]
fn soft_upgrade_refuses_new_features() {
    let dir = tempdir().unwrap();
    {
        let dd = create_at(dir.path(), DictionaryVersion::V10_4);
        let tc = dd.manager().begin();
        let app = app_schema(&dd, &tc);
        let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);
        dd.add_trigger_descriptor(&tc, &statement_trigger("TR", td.uuid, app.uuid))
            .unwrap();
        tc.commit().unwrap();
        dd.manager().checkpoint().unwrap();
    }

    let dd = boot(dir.path(), false);
    assert_eq!(dd.version(), DictionaryVersion::V10_4);
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);

    let seq = SequenceDescriptor::new(
        "S",
        app.uuid,
        TypeDescriptor::not_null(DataType::Int),
        None,
        1,
        false,
    );
    assert!(matches!(
        dd.add_sequence_descriptor(&tc, &seq).unwrap_err(),
        Error::VersionTooOld {
            required: DictionaryVersion::V10_6,
            ..
        }
    ));
    assert!(dd
        .get_sequence_descriptor_by_name(&tc, app.uuid, "S")
        .unwrap()
        .is_none());

    let td = dd.get_table_descriptor(&tc, "T", &app).unwrap().unwrap();
    let mut with_when = statement_trigger("TR2", td.uuid, app.uuid);
    with_when.when_clause_text = Some("1 = 1".to_owned());
    assert!(matches!(
        dd.add_trigger_descriptor(&tc, &with_when).unwrap_err(),
        Error::VersionTooOld { .. }
    ));
    let stored = dd.get_trigger_descriptor_by_name(&tc, "TR", &app).unwrap().unwrap();
    assert_eq!(stored.when_clause_text, None);
    tc.commit().unwrap();

    assert_eq!(
        dd.manager().property(CORE_VERSION_PROPERTY),
        Some(DictionaryVersion::V10_4.to_property())
    );
    dir.close().unwrap();
}

#[test]
fn rebuild_rejects_duplicate_rows() {
    let dir = tempdir().unwrap();
    {
        let dd = create_at(dir.path(), DictionaryVersion::V10_4);
        let tc = dd.manager().begin();
        let app = app_schema(&dd, &tc);
        let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);
        dd.add_trigger_descriptor(&tc, &statement_trigger("TR", td.uuid, app.uuid))
            .unwrap();

        // a second copy of the row, stored behind the indexes' back
        let ti = dd.get_tab_info("SYSTRIGGERS").unwrap();
        let (_, row) = ti
            .fetch_via_heap(&tc, Qualifiers::none(), None)
            .unwrap()
            .pop()
            .unwrap();
        tc.open_conglomerate(ti.heap_conglomerate().unwrap())
            .unwrap()
            .insert(row)
            .unwrap();
        tc.commit().unwrap();
        dd.manager().checkpoint().unwrap();
    }

    let manager = AccessManager::boot(dir.path()).unwrap();
    let options = BootOptions::new().with_property("upgrade", "true");
    assert!(matches!(
        DataDictionary::boot(manager.clone(), options),
        Err(Error::Internal { .. })
    ));
    // the failed upgrade left the database at its old version
    assert_eq!(
        manager.property(CORE_VERSION_PROPERTY),
        Some(DictionaryVersion::V10_4.to_property())
    );
    dir.close().unwrap();
}

#[test]
fn hard_upgrade_rebuilds_triggers() {
    let dir = tempdir().unwrap();
    {
        let dd = create_at(dir.path(), DictionaryVersion::V10_4);
        let tc = dd.manager().begin();
        let app = app_schema(&dd, &tc);
        let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);
        dd.add_trigger_descriptor(&tc, &statement_trigger("TR", td.uuid, app.uuid))
            .unwrap();
        tc.commit().unwrap();
        dd.manager().checkpoint().unwrap();
    }

    let dd = boot(dir.path(), true);
    assert_eq!(dd.version(), DictionaryVersion::CURRENT);
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let sys = dd.get_schema_descriptor(&tc, SYSTEM_SCHEMA_NAME, true).unwrap().unwrap();

    let systriggers = dd.get_table_descriptor(&tc, "SYSTRIGGERS", &sys).unwrap().unwrap();
    assert!(systriggers.column("WHENCLAUSETEXT").is_some());
    assert_eq!(
        systriggers.heap_conglomerate_number(),
        Some(dd.get_tab_info("SYSTRIGGERS").unwrap().heap_conglomerate().unwrap())
    );

    let old = dd.get_trigger_descriptor_by_name(&tc, "TR", &app).unwrap().unwrap();
    assert_eq!(old.when_clause_text, None);
    let td = dd.get_table_descriptor(&tc, "T", &app).unwrap().unwrap();
    let mut with_when = statement_trigger("TR2", td.uuid, app.uuid);
    with_when.when_clause_text = Some("1 = 1".to_owned());
    dd.add_trigger_descriptor(&tc, &with_when).unwrap();
    assert_eq!(dd.get_trigger_descriptors(&tc, td.uuid).unwrap().len(), 2);

    let seq = SequenceDescriptor::new(
        "S",
        app.uuid,
        TypeDescriptor::not_null(DataType::Int),
        Some(1),
        1,
        false,
    );
    dd.add_sequence_descriptor(&tc, &seq).unwrap();
    assert!(dd
        .get_alias_descriptor_by_name(
            &tc,
            SYSTEM_UTIL_SCHEMA_UUID,
            "SYSCS_PEEK_AT_SEQUENCE",
            AliasType::Function,
        )
        .unwrap()
        .is_some());
    tc.commit().unwrap();
    drop(dd);

    // the upgrade was checkpointed; booting again changes nothing
    let dd = boot(dir.path(), false);
    assert_eq!(dd.version(), DictionaryVersion::CURRENT);
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    assert!(dd
        .get_trigger_descriptor_by_name(&tc, "TR", &app)
        .unwrap()
        .is_some());
    tc.commit().unwrap();

    dir.close().unwrap();
}

#[test]
fn upgrade_from_the_first_release() {
    let dir = tempdir().unwrap();
    let default_id = {
        let dd = create_at(dir.path(), DictionaryVersion::V10_0);
        let tc = dd.manager().begin();
        let app = app_schema(&dd, &tc);
        let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);
        let with_default = td
            .column("A")
            .unwrap()
            .clone()
            .with_default(ColumnDefault::Literal(Value::Int(7)));
        dd.update_column_descriptor(&tc, td.uuid, "A", &with_default)
            .unwrap();
        tc.commit().unwrap();
        dd.manager().checkpoint().unwrap();
        with_default.default_id.unwrap()
    };

    let dd = boot(dir.path(), true);
    assert_eq!(dd.version(), DictionaryVersion::CURRENT);
    let syscolumns = dd.get_tab_info("SYSCOLUMNS").unwrap();
    assert!(syscolumns.index_conglomerate(1).unwrap().is_some());

    let tc = dd.manager().begin();
    let column = dd
        .get_column_descriptor_by_default_id(&tc, default_id)
        .unwrap()
        .unwrap();
    assert_eq!(column.name, "A");

    // routines that predate routine grants are opened up to PUBLIC
    let compress = dd
        .get_alias_descriptor_by_name(
            &tc,
            SYSTEM_UTIL_SCHEMA_UUID,
            "SYSCS_COMPRESS_TABLE",
            AliasType::Procedure,
        )
        .unwrap()
        .unwrap();
    assert_eq!(
        dd.check_routine_privilege(&tc, &compress, "ALICE").unwrap(),
        PermissionCheck::Routine {
            grantee: "PUBLIC".to_owned()
        }
    );
    assert!(dd.get_role_grants(&tc, "NOBODY").unwrap().is_empty());
    tc.commit().unwrap();

    dir.close().unwrap();
}

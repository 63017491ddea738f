use {
    crate::{app_schema, create_table, new_dictionary},
    chrono::{Duration, Utc},
    def::{DataType, Uuid},
    dictionary::descriptor::{
        DependableKind, DependencyDescriptor, FiringTime, SpsDescriptor, SpsType,
        TriggerDescriptor, TriggerEvent,
    },
};

const ACTION: &str = "UPDATE AUDIT SET LAST_C = OLD.c WHERE ID = old.A AND NOTE <> 'OLD.B'";

#[test]
fn row_trigger_round_trip() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let table = create_table(
        &dd,
        &tc,
        &app,
        "T",
        &[("A", DataType::Int), ("B", DataType::Varchar(20)), ("C", DataType::Int)],
    );

    let action = dd
        .get_trigger_action_text(&table, ACTION, Some("OLD"), None, &[3])
        .unwrap();
    assert_eq!(
        action.text,
        "UPDATE AUDIT SET LAST_C = CAST (TRIGGER_OLD_ROW(2) AS INTEGER) \
         WHERE ID = CAST (TRIGGER_OLD_ROW(1) AS INTEGER) AND NOTE <> 'OLD.B'"
    );
    assert_eq!(action.projection, vec![1, 3]);
    assert_eq!(action.referenced_columns.trigger_columns, vec![3]);
    assert_eq!(action.referenced_columns.action_columns, vec![1, 3]);

    let sps = SpsDescriptor::new(
        dd.get_system_sql_name(),
        app.uuid,
        SpsType::Trigger,
        action.text.clone(),
    );
    dd.add_sps_descriptor(&tc, &sps).unwrap();

    let created = Utc::now();
    let trigger = |name: &str, at| TriggerDescriptor {
        uuid: Uuid::new_v4(),
        name: name.to_owned(),
        schema_id: app.uuid,
        creation_timestamp: at,
        event: TriggerEvent::Update,
        firing_time: FiringTime::After,
        row_level: true,
        enabled: true,
        table_id: table.uuid,
        when_stmt_id: None,
        action_stmt_id: sps.uuid,
        referenced_columns: Some(action.referenced_columns.clone()),
        definition: ACTION.to_owned(),
        old_referencing_name: Some("OLD".to_owned()),
        new_referencing_name: None,
        when_clause_text: Some("OLD.C > 0".to_owned()),
    };
    let second = trigger("TR2", created + Duration::seconds(1));
    let first = trigger("TR1", created);
    dd.add_trigger_descriptor(&tc, &second).unwrap();
    dd.add_trigger_descriptor(&tc, &first).unwrap();
    assert!(dd.add_trigger_descriptor(&tc, &first).is_err());

    let found = dd
        .get_trigger_descriptor_by_name(&tc, "TR1", &app)
        .unwrap()
        .unwrap();
    assert_eq!(found.uuid, first.uuid);
    assert_eq!(found.referenced_columns, first.referenced_columns);
    assert_eq!(found.when_clause_text.as_deref(), Some("OLD.C > 0"));
    assert!(found.referencing_old());
    assert!(found.listens_for(TriggerEvent::UPDATE_MASK));

    let names = dd
        .get_trigger_descriptors(&tc, table.uuid)
        .unwrap()
        .into_iter()
        .map(|t| t.name)
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["TR1", "TR2"]);

    let stored = dd.get_sps_descriptor(&tc, found.action_stmt_id).unwrap().unwrap();
    assert_eq!(stored.text, action.text);

    dd.drop_trigger_descriptor(&tc, &first).unwrap();
    assert!(dd.get_trigger_descriptor(&tc, first.uuid).unwrap().is_none());
    assert!(dd.drop_trigger_descriptor(&tc, &first).is_err());

    tc.commit().unwrap();
}

#[test]
fn transition_references_must_name_columns() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let table = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);

    let rewritten = dd
        .get_trigger_action_text(&table, "VALUES NEW.A", None, Some("NEW"), &[])
        .unwrap();
    assert_eq!(rewritten.text, "VALUES CAST (TRIGGER_NEW_ROW(1) AS INTEGER)");
    assert!(dd
        .get_trigger_action_text(&table, "VALUES NEW.MISSING", None, Some("NEW"), &[])
        .is_err());

    tc.commit().unwrap();
}

#[test]
fn stored_dependencies() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let table = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);
    let trigger = Uuid::new_v4();
    let statement = Uuid::new_v4();

    let on_table = DependencyDescriptor::new(
        trigger,
        DependableKind::Trigger,
        table.uuid,
        DependableKind::Table,
    );
    let on_statement = DependencyDescriptor::new(
        trigger,
        DependableKind::Trigger,
        statement,
        DependableKind::StoredStatement,
    );
    dd.add_dependency_descriptor(&tc, &on_table).unwrap();
    dd.add_dependency_descriptor(&tc, &on_statement).unwrap();
    // recording the same dependency twice keeps one row
    dd.add_dependency_descriptor(&tc, &on_table).unwrap();

    assert_eq!(dd.get_providers_descriptor_list(&tc, trigger).unwrap().len(), 2);
    assert_eq!(
        dd.get_dependents_descriptor_list(&tc, table.uuid).unwrap(),
        vec![on_table.clone()]
    );

    assert_eq!(dd.drop_stored_dependency(&tc, &on_table).unwrap(), 1);
    assert!(dd.get_dependents_descriptor_list(&tc, table.uuid).unwrap().is_empty());
    assert_eq!(dd.drop_dependents_stored_dependencies(&tc, trigger).unwrap(), 1);
    assert!(dd.get_providers_descriptor_list(&tc, trigger).unwrap().is_empty());

    tc.commit().unwrap();
}

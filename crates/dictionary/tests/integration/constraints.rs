use {
    crate::{app_schema, create_table, new_dictionary},
    access::Transaction,
    def::{DataType, Uuid},
    dictionary::{
        descriptor::{
            CheckConstraint, ConstraintDescriptor, ConstraintKind, ConstraintType,
            ForeignKeyConstraint, KeyConstraint, ReferentialAction, TableDescriptor,
        },
        DataDictionary, DropBehavior, Error,
    },
};

fn foreign_key(
    dd: &DataDictionary,
    tc: &Transaction,
    name: &str,
    child: &TableDescriptor,
    key: &ConstraintDescriptor,
) -> ConstraintDescriptor {
    let fk = ConstraintDescriptor::new(
        name,
        child,
        ConstraintKind::ForeignKey(ForeignKeyConstraint {
            index_id: Uuid::new_v4(),
            referenced_constraint_id: key.uuid,
            delete_rule: ReferentialAction::Cascade,
            update_rule: ReferentialAction::NoAction,
        }),
    );
    dd.add_constraint_descriptor(tc, &fk).unwrap();
    fk
}

fn stored_count(dd: &DataDictionary, tc: &Transaction, key: &ConstraintDescriptor) -> i32 {
    dd.get_constraint_descriptor(tc, key.uuid)
        .unwrap()
        .unwrap()
        .reference_count()
}

#[test]
fn foreign_keys_count_references() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let parent = create_table(&dd, &tc, &app, "PARENT", &[("ID", DataType::Int)]);
    let child = create_table(&dd, &tc, &app, "CHILD", &[("PID", DataType::Int)]);

    let pk = ConstraintDescriptor::new(
        "PARENT_PK",
        &parent,
        ConstraintKind::PrimaryKey(KeyConstraint {
            index_id: Uuid::new_v4(),
            reference_count: 0,
        }),
    );
    dd.add_constraint_descriptor(&tc, &pk).unwrap();

    let fks = (1..=3)
        .map(|i| foreign_key(&dd, &tc, &format!("FK{}", i), &child, &pk))
        .collect::<Vec<_>>();
    assert_eq!(stored_count(&dd, &tc, &pk), 3);

    dd.drop_constraint_descriptor(&tc, &fks[0], DropBehavior::Restrict)
        .unwrap();
    assert_eq!(stored_count(&dd, &tc, &pk), 2);
    assert_eq!(dd.get_foreign_keys(&tc, pk.uuid).unwrap().len(), 2);

    let err = dd
        .drop_constraint_descriptor(&tc, &pk, DropBehavior::Restrict)
        .unwrap_err();
    assert!(matches!(err, Error::ConstraintReferenced { count: 2, .. }));
    assert!(dd.get_constraint_descriptor(&tc, pk.uuid).unwrap().is_some());

    dd.drop_constraint_descriptor(&tc, &pk, DropBehavior::Cascade)
        .unwrap();
    assert!(dd.get_constraint_descriptor(&tc, pk.uuid).unwrap().is_none());
    assert!(dd.get_constraint_descriptors(&tc, child.uuid).unwrap().is_empty());

    tc.commit().unwrap();
}

#[test]
fn renamed_key_keeps_its_foreign_keys() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let parent = create_table(&dd, &tc, &app, "PARENT", &[("ID", DataType::Int)]);
    let child = create_table(&dd, &tc, &app, "CHILD", &[("PID", DataType::Int)]);

    let pk = ConstraintDescriptor::new(
        "PARENT_PK",
        &parent,
        ConstraintKind::PrimaryKey(KeyConstraint {
            index_id: Uuid::new_v4(),
            reference_count: 0,
        }),
    );
    dd.add_constraint_descriptor(&tc, &pk).unwrap();
    let fk = foreign_key(&dd, &tc, "CHILD_FK", &child, &pk);

    let mut renamed = pk.clone();
    renamed.name = "PARENT_KEY".to_owned();
    renamed.enabled = false;
    dd.update_constraint_descriptor(&tc, &renamed).unwrap();

    let stored = dd.get_constraint_descriptor(&tc, pk.uuid).unwrap().unwrap();
    assert_eq!(stored.name, "PARENT_KEY");
    assert!(!stored.enabled);
    assert_eq!(stored.reference_count(), 1);
    assert!(dd
        .get_constraint_descriptor_by_name(&tc, "PARENT_PK", &app)
        .unwrap()
        .is_none());
    let fks = dd.get_foreign_keys(&tc, pk.uuid).unwrap();
    assert_eq!(fks.len(), 1);
    assert_eq!(fks[0].uuid, fk.uuid);

    dd.drop_constraint_descriptor(&tc, &renamed, DropBehavior::Cascade)
        .unwrap();
    assert!(dd.get_constraint_descriptor(&tc, fk.uuid).unwrap().is_none());
    assert!(dd.get_constraint_descriptors(&tc, child.uuid).unwrap().is_empty());
    tc.commit().unwrap();
}

#[test]
fn constraints_by_name_and_type() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int), ("B", DataType::Int)]);

    let name = dd.get_system_sql_name();
    assert!(name.starts_with("SQL"));
    let check = ConstraintDescriptor::new(
        name.as_str(),
        &td,
        ConstraintKind::Check(CheckConstraint {
            text: "A > B".to_owned(),
            referenced_columns: vec![1, 2],
        }),
    );
    dd.add_constraint_descriptor(&tc, &check).unwrap();
    assert!(dd.add_constraint_descriptor(&tc, &check).is_err());

    let found = dd
        .get_constraint_descriptor_by_name(&tc, &name, &app)
        .unwrap()
        .unwrap();
    assert_eq!(found, check);
    assert_eq!(found.constraint_type(), ConstraintType::Check);

    let mut disabled = check.clone();
    disabled.enabled = false;
    dd.update_constraint_descriptor(&tc, &disabled).unwrap();
    assert!(dd.get_active_constraint_descriptors(&tc, td.uuid).unwrap().is_empty());
    assert_eq!(
        dd.get_constraint_table_descriptor(&tc, check.uuid)
            .unwrap()
            .unwrap()
            .uuid,
        td.uuid
    );

    dd.drop_all_constraint_descriptors(&tc, td.uuid).unwrap();
    assert!(dd.get_constraint_descriptors(&tc, td.uuid).unwrap().is_empty());

    tc.commit().unwrap();
}

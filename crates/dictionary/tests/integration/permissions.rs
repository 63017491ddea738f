use {
    crate::{app_schema, create_table, new_dictionary},
    common::dsa::BitSet,
    def::{DataType, TypeDescriptor},
    dictionary::{
        descriptor::{
            ColPermsDescriptor, ColumnPrivilege, PermDescriptor, PermissionKey,
            PermissionsDescriptor, RoleGrantDescriptor, SequenceDescriptor, TablePermsDescriptor,
            TablePrivilege,
        },
        PermissionCheck,
    },
};

#[test]
fn grant_and_revoke_table_privileges() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int), ("B", DataType::Int)]);
    let key = PermissionKey::Table {
        table_id: td.uuid,
        grantee: "ALICE".to_owned(),
    };

    let check = |user| {
        dd.check_table_privilege(&tc, &td, user, TablePrivilege::Select, &[1])
            .unwrap()
    };
    assert_eq!(check("APP"), PermissionCheck::Owner);
    assert_eq!(check("ALICE"), PermissionCheck::Denied);
    // misses are cached as well
    assert!(dd.is_permission_cached(&key));

    let grant = PermissionsDescriptor::Table(
        TablePermsDescriptor::new("ALICE", "APP", td.uuid).with(TablePrivilege::Select),
    );
    assert!(dd
        .add_remove_permissions_descriptor(&tc, true, &grant, "ALICE")
        .unwrap());
    assert!(!dd.is_permission_cached(&key));
    assert_eq!(
        check("ALICE"),
        PermissionCheck::Table {
            grantee: "ALICE".to_owned()
        }
    );
    assert!(dd.is_permission_cached(&key));
    assert_eq!(check("BOB"), PermissionCheck::Denied);

    // granting what is already held changes nothing
    assert!(!dd
        .add_remove_permissions_descriptor(&tc, true, &grant, "ALICE")
        .unwrap());

    assert!(dd
        .add_remove_permissions_descriptor(&tc, false, &grant, "ALICE")
        .unwrap());
    assert!(!dd.is_permission_cached(&key));
    assert_eq!(check("ALICE"), PermissionCheck::Denied);
    assert!(dd.get_table_permissions(&tc, td.uuid, "ALICE").unwrap().is_none());

    // a grant to PUBLIC covers everyone
    assert!(dd
        .add_remove_permissions_descriptor(&tc, true, &grant, "PUBLIC")
        .unwrap());
    assert_eq!(
        check("BOB"),
        PermissionCheck::Table {
            grantee: "PUBLIC".to_owned()
        }
    );
    assert_eq!(dd.drop_all_table_permissions(&tc, td.uuid).unwrap(), 1);
    assert_eq!(check("BOB"), PermissionCheck::Denied);

    tc.commit().unwrap();
}

#[test]
fn column_grants_must_cover_every_column() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let td = create_table(
        &dd,
        &tc,
        &app,
        "T",
        &[("A", DataType::Int), ("B", DataType::Int), ("C", DataType::Int)],
    );

    let mut columns = BitSet::new(3);
    columns.set(0);
    let grant = PermissionsDescriptor::Column(ColPermsDescriptor::new(
        "ALICE",
        "APP",
        td.uuid,
        ColumnPrivilege::Select,
        columns,
    ));
    dd.add_remove_permissions_descriptor(&tc, true, &grant, "ALICE")
        .unwrap();

    let mut columns = BitSet::new(3);
    columns.set(2);
    let public = PermissionsDescriptor::Column(ColPermsDescriptor::new(
        "PUBLIC",
        "APP",
        td.uuid,
        ColumnPrivilege::Select,
        columns,
    ));
    dd.add_remove_permissions_descriptor(&tc, true, &public, "PUBLIC")
        .unwrap();

    let check = |columns: &[u32]| {
        dd.check_table_privilege(&tc, &td, "ALICE", TablePrivilege::Select, columns)
            .unwrap()
    };
    assert_eq!(check(&[1]), PermissionCheck::Columns);
    assert_eq!(check(&[1, 3]), PermissionCheck::Columns);
    assert_eq!(check(&[1, 2]), PermissionCheck::Denied);
    assert_eq!(
        dd.check_table_privilege(&tc, &td, "ALICE", TablePrivilege::Delete, &[1])
            .unwrap(),
        PermissionCheck::Denied
    );

    let held = dd
        .get_column_permissions(&tc, td.uuid, ColumnPrivilege::Select, "ALICE")
        .unwrap()
        .unwrap();
    assert_eq!(held.columns.iter().collect::<Vec<_>>(), vec![0]);

    dd.add_remove_permissions_descriptor(&tc, false, &grant, "ALICE")
        .unwrap();
    assert_eq!(check(&[1]), PermissionCheck::Denied);
    assert_eq!(check(&[3]), PermissionCheck::Columns);

    tc.commit().unwrap();
}

#[test]
fn usage_on_sequences() {
    let dd = new_dictionary();
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
    dd.add_sequence_descriptor(&tc, &seq).unwrap();

    let check = |user| {
        dd.check_usage_privilege(&tc, seq.uuid, PermDescriptor::SEQUENCE_TYPE, app.uuid, user)
            .unwrap()
    };
    assert_eq!(check("APP"), PermissionCheck::Owner);
    assert_eq!(check("ALICE"), PermissionCheck::Denied);

    let usage = PermDescriptor::usage(PermDescriptor::SEQUENCE_TYPE, seq.uuid, "APP", "ALICE");
    dd.add_remove_permissions_descriptor(
        &tc,
        true,
        &PermissionsDescriptor::Generic(usage),
        "ALICE",
    )
    .unwrap();
    assert_eq!(
        check("ALICE"),
        PermissionCheck::Usage {
            grantee: "ALICE".to_owned()
        }
    );

    assert_eq!(dd.drop_all_permissions_by_object(&tc, seq.uuid).unwrap(), 1);
    assert_eq!(check("ALICE"), PermissionCheck::Denied);

    tc.commit().unwrap();
}

#[test]
fn roles() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let grant = |grantee: &str, is_def| RoleGrantDescriptor {
        uuid: def::Uuid::new_v4(),
        role_name: "AUDITOR".to_owned(),
        grantee: grantee.to_owned(),
        grantor: "APP".to_owned(),
        with_admin_option: is_def,
        is_def,
    };

    dd.add_role_grant(&tc, &grant("APP", true)).unwrap();
    dd.add_role_grant(&tc, &grant("ALICE", false)).unwrap();
    dd.add_role_grant(&tc, &grant("BOB", false)).unwrap();
    assert!(dd.add_role_grant(&tc, &grant("BOB", false)).is_err());

    assert!(dd.get_role_definition(&tc, "AUDITOR").unwrap().unwrap().is_def);
    assert_eq!(dd.get_role_grants(&tc, "AUDITOR").unwrap().len(), 2);
    assert!(dd
        .get_role_grant(&tc, "AUDITOR", "ALICE", "APP")
        .unwrap()
        .is_some());

    assert!(dd.drop_role_grant(&tc, "AUDITOR", "ALICE", "APP").unwrap());
    assert!(!dd.drop_role_grant(&tc, "AUDITOR", "ALICE", "APP").unwrap());
    assert_eq!(dd.drop_role_grants_by_name(&tc, "AUDITOR").unwrap(), 2);
    assert!(dd.get_role_definition(&tc, "AUDITOR").unwrap().is_none());

    tc.commit().unwrap();
}

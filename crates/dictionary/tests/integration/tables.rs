use {
    crate::{app_schema, create_table, new_dictionary},
    access::ConglomerateKind,
    def::{DataType, TypeDescriptor, Uuid},
    dictionary::{
        descriptor::{
            ColumnDescriptor, ConglomerateDescriptor, LockGranularity, SchemaDescriptor,
            TableDescriptor, TableType, ViewDescriptor,
        },
        Error, IndexRowGenerator, ObjectKind,
    },
};

#[test]
fn table_round_trip() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);

    let td = create_table(
        &dd,
        &tc,
        &app,
        "ORDERS",
        &[
            ("ID", DataType::Int),
            ("CUSTOMER", DataType::Varchar(64)),
            ("TOTAL", DataType::Double),
        ],
    );
    assert_eq!(td.name, "ORDERS");
    assert_eq!(td.schema_name, "APP");
    assert_eq!(td.table_type, TableType::Base);
    assert_eq!(td.lock_granularity, LockGranularity::Row);
    assert_eq!(td.columns.len(), 3);
    assert_eq!(td.column("CUSTOMER").unwrap().position, 2);
    assert_eq!(
        td.column_at(3).unwrap().type_descriptor,
        TypeDescriptor::nullable(DataType::Double)
    );
    assert!(td.heap_conglomerate_number().is_some());
    assert!(dd.get_row_location_template(&td).is_ok());

    let by_name = dd.get_table_descriptor(&tc, "ORDERS", &app).unwrap().unwrap();
    assert_eq!(by_name.uuid, td.uuid);
    assert_eq!(by_name.columns, td.columns);

    dd.update_lock_granularity(&tc, &td, LockGranularity::Table).unwrap();
    let td = dd.get_table_descriptor_by_id(&tc, td.uuid).unwrap().unwrap();
    assert_eq!(td.lock_granularity, LockGranularity::Table);

    assert!(!dd.is_schema_empty(&tc, &app).unwrap());
    tc.commit().unwrap();
}

#[test]
fn table_names_are_unique_per_schema() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let first = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);

    let again = TableDescriptor::new("T", &app, TableType::Base, LockGranularity::Row);
    let err = dd.add_table_descriptor(&tc, &again, &app).unwrap_err();
    assert!(matches!(
        err,
        Error::ObjectAlreadyExists {
            kind: ObjectKind::Table,
            ..
        }
    ));

    // the failed insert left nothing behind in either index
    assert!(dd.get_table_descriptor_by_id(&tc, again.uuid).unwrap().is_none());
    let found = dd.get_table_descriptor(&tc, "T", &app).unwrap().unwrap();
    assert_eq!(found.uuid, first.uuid);
    assert_eq!(dd.get_table_descriptors(&tc, &app).unwrap().len(), 1);

    // the same name is free in another schema
    let other = SchemaDescriptor::new("OTHER", "APP", Uuid::new_v4());
    dd.add_schema_descriptor(&tc, &other).unwrap();
    create_table(&dd, &tc, &other, "T", &[("A", DataType::Int)]);
    assert!(dd.add_schema_descriptor(&tc, &other).is_err());

    tc.commit().unwrap();
}

#[test]
fn columns_are_renumbered_and_renamed() {
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

    dd.drop_column_descriptor(&tc, td.uuid, "B").unwrap();
    let mut c = td.column("C").unwrap().clone();
    c.position = 2;
    c.name = "CC".to_owned();
    dd.update_column_descriptor(&tc, td.uuid, "C", &c).unwrap();

    let columns = dd.get_column_descriptors(&tc, td.uuid).unwrap();
    let layout = columns
        .iter()
        .map(|c| (c.name.as_str(), c.position))
        .collect::<Vec<_>>();
    assert_eq!(layout, vec![("A", 1), ("CC", 2)]);

    let td = dd.get_table_descriptor_by_id(&tc, td.uuid).unwrap().unwrap();
    assert_eq!(td.max_column_position(), 2);
    assert!(dd.drop_column_descriptor(&tc, td.uuid, "B").is_err());

    let added = ColumnDescriptor::new(td.uuid, "D", 3, TypeDescriptor::not_null(DataType::BigInt));
    dd.add_column_descriptors(&tc, &[added]).unwrap();
    assert_eq!(dd.get_column_descriptors(&tc, td.uuid).unwrap().len(), 3);

    tc.commit().unwrap();
}

#[test]
fn columns_come_back_in_position_order() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let td = create_table(
        &dd,
        &tc,
        &app,
        "T",
        &[("Z", DataType::Int), ("A", DataType::BigInt), ("M", DataType::Int)],
    );
    let added = ColumnDescriptor::new(td.uuid, "B", 4, TypeDescriptor::nullable(DataType::Int));
    dd.add_column_descriptors(&tc, &[added]).unwrap();

    fn layout(columns: &[ColumnDescriptor]) -> Vec<(&str, u32)> {
        columns.iter().map(|c| (c.name.as_str(), c.position)).collect()
    }
    let expected = vec![("Z", 1), ("A", 2), ("M", 3), ("B", 4)];

    let columns = dd.get_column_descriptors(&tc, td.uuid).unwrap();
    assert_eq!(layout(&columns), expected);

    let td = dd.get_table_descriptor_by_id(&tc, td.uuid).unwrap().unwrap();
    assert_eq!(layout(&td.columns), expected);
    assert_eq!(td.column_at(2).unwrap().name, "A");
    assert_eq!(td.max_column_position(), 4);

    tc.commit().unwrap();
}

#[test]
fn duplicate_indexes_share_a_conglomerate() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);
    let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int), ("B", DataType::Int)]);

    let generator = IndexRowGenerator::btree(false, &[1]);
    let number = tc
        .create_conglomerate(
            ConglomerateKind::BTree { unique: false },
            generator.key_format(&td.columns.iter().map(|c| c.type_descriptor).collect::<Vec<_>>()),
        )
        .unwrap();
    for name in ["IX_A", "IX_A_AGAIN"] {
        let cd = ConglomerateDescriptor::index(
            number,
            name,
            generator.clone(),
            false,
            td.uuid,
            app.uuid,
        );
        dd.add_conglomerate_descriptor(&tc, &cd).unwrap();
    }

    let shared = dd.get_conglomerate_descriptors(&tc, number).unwrap();
    assert_eq!(shared.len(), 2);
    assert_ne!(shared[0].uuid, shared[1].uuid);

    let td = dd.get_table_descriptor_by_id(&tc, td.uuid).unwrap().unwrap();
    assert_eq!(td.indexes().count(), 2);

    let first = dd
        .get_conglomerate_descriptor_by_name(&tc, "IX_A", &app)
        .unwrap()
        .unwrap();
    dd.drop_conglomerate_descriptor(&tc, &first).unwrap();
    let left = dd.get_conglomerate_descriptors(&tc, number).unwrap();
    assert_eq!(left.len(), 1);
    assert_eq!(left[0].name, "IX_A_AGAIN");

    tc.commit().unwrap();
}

#[test]
fn dropping_a_table_and_its_view() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let app = app_schema(&dd, &tc);

    let view = TableDescriptor::new("V", &app, TableType::View, LockGranularity::Row);
    dd.add_table_descriptor(&tc, &view, &app).unwrap();
    let vd = ViewDescriptor {
        uuid: view.uuid,
        text: "SELECT 1 FROM SYSIBM.SYSDUMMY1".to_owned(),
        check_option: false,
        compilation_schema_id: Some(app.uuid),
    };
    dd.add_view_descriptor(&tc, &vd).unwrap();
    assert_eq!(dd.get_view_descriptor(&tc, view.uuid).unwrap(), Some(vd.clone()));

    dd.drop_view_descriptor(&tc, &vd).unwrap();
    dd.drop_table_descriptor(&tc, &view).unwrap();
    assert!(dd.get_view_descriptor(&tc, view.uuid).unwrap().is_none());
    assert!(dd.get_table_descriptor(&tc, "V", &app).unwrap().is_none());

    let td = create_table(&dd, &tc, &app, "T", &[("A", DataType::Int)]);
    assert_eq!(dd.drop_all_conglomerate_descriptors(&tc, td.uuid).unwrap(), 1);
    assert_eq!(dd.drop_all_column_descriptors(&tc, td.uuid).unwrap(), 1);
    assert_eq!(dd.drop_all_table_descriptors(&tc, &app).unwrap(), 1);
    assert!(dd.get_table_descriptor_by_id(&tc, td.uuid).unwrap().is_none());
    assert!(dd.is_schema_empty(&tc, &app).unwrap());

    let err = dd.drop_table_descriptor(&tc, &td).unwrap_err();
    assert!(matches!(err, Error::ObjectNotFound { .. }));

    tc.commit().unwrap();
}

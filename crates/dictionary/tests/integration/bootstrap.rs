use {
    crate::{app_schema, new_dictionary},
    access::AccessManager,
    dictionary::{
        descriptor::{
            is_system_schema_name, AliasType, TableType, IBM_SYSTEM_SCHEMA_UUID,
            SESSION_SCHEMA_NAME, SYSTEM_SCHEMAS, SYSTEM_SCHEMA_NAME, SYSTEM_UTIL_SCHEMA_UUID,
        },
        BootOptions, DataDictionary, DictionaryVersion, PermissionCheck,
    },
    tempfile::tempdir,
};

#[test]
fn creates_system_schemas() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();

    for (name, uuid) in SYSTEM_SCHEMAS {
        let sd = dd.get_schema_descriptor(&tc, name, true).unwrap().unwrap();
        assert_eq!(sd.uuid, uuid);
        assert_eq!(sd.authorization_id, "APP");
        assert!(dd.is_system_schema_name(name));
    }

    let app = app_schema(&dd, &tc);
    assert_eq!(app.authorization_id, "APP");
    assert!(!is_system_schema_name("APP"));
    assert!(dd.is_schema_empty(&tc, &app).unwrap());

    // never stored, yet always found
    let session = dd.get_schema_descriptor(&tc, SESSION_SCHEMA_NAME, true).unwrap();
    assert!(session.is_some());
    assert!(dd.get_schema_descriptor(&tc, "NOBODY", false).unwrap().is_none());
    assert!(dd.get_schema_descriptor(&tc, "NOBODY", true).is_err());

    tc.commit().unwrap();
}

#[test]
fn catalogs_describe_themselves() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();
    let sys = dd.get_schema_descriptor(&tc, SYSTEM_SCHEMA_NAME, true).unwrap().unwrap();

    let systables = dd.get_table_descriptor(&tc, "SYSTABLES", &sys).unwrap().unwrap();
    assert_eq!(systables.table_type, TableType::System);
    let positions = systables.columns.iter().map(|c| c.position).collect::<Vec<_>>();
    assert_eq!(positions, (1..=positions.len() as u32).collect::<Vec<_>>());
    assert_eq!(
        systables.heap_conglomerate_number(),
        Some(dd.get_tab_info("SYSTABLES").unwrap().heap_conglomerate().unwrap())
    );
    assert_eq!(systables.indexes().count(), 2);

    let triggers = dd.get_table_descriptor(&tc, "SYSTRIGGERS", &sys).unwrap().unwrap();
    assert!(triggers.column("WHENCLAUSETEXT").is_some());

    tc.commit().unwrap();
}

#[test]
fn stores_routines_and_metadata_statements() {
    let dd = new_dictionary();
    let tc = dd.manager().begin();

    let compress = dd
        .get_alias_descriptor_by_name(
            &tc,
            SYSTEM_UTIL_SCHEMA_UUID,
            "SYSCS_COMPRESS_TABLE",
            AliasType::Procedure,
        )
        .unwrap()
        .unwrap();
    assert!(compress.system);
    assert_eq!(
        dd.check_routine_privilege(&tc, &compress, "ALICE").unwrap(),
        PermissionCheck::Routine {
            grantee: "PUBLIC".to_owned()
        }
    );
    assert_eq!(
        dd.check_routine_privilege(&tc, &compress, "APP").unwrap(),
        PermissionCheck::Owner
    );

    let sysibm = dd
        .get_schema_descriptor_by_id(&tc, IBM_SYSTEM_SCHEMA_UUID)
        .unwrap()
        .unwrap();
    let tables = dd.get_sps_descriptor_by_name(&tc, "GETTABLES", &sysibm).unwrap().unwrap();
    assert!(!tables.params.is_empty());
    assert_eq!(tables.params.len(), tables.text.matches('?').count());

    tc.commit().unwrap();
}

#[test]
fn boots_what_was_created() {
    let dir = tempdir().unwrap();
    let owner = "DBA";

    let created = {
        let manager = AccessManager::create(dir.path()).unwrap();
        let dd = DataDictionary::create(manager, BootOptions::new().with_owner(owner)).unwrap();
        assert_eq!(dd.authorization_database_owner(), owner);
        dd.manager().conglomerate_count()
    };

    let manager = AccessManager::boot(dir.path()).unwrap();
    assert_eq!(manager.conglomerate_count(), created);
    let dd = DataDictionary::boot(manager, BootOptions::new()).unwrap();
    assert_eq!(dd.version(), DictionaryVersion::CURRENT);
    assert_eq!(dd.authorization_database_owner(), owner);

    let tc = dd.manager().begin();
    let sys = dd.get_schema_descriptor(&tc, SYSTEM_SCHEMA_NAME, true).unwrap().unwrap();
    assert_eq!(sys.authorization_id, owner);
    assert!(dd.get_table_descriptor(&tc, "SYSVIEWS", &sys).unwrap().is_some());
    tc.commit().unwrap();

    dir.close().unwrap();
}

#[test]
fn boot_needs_a_dictionary() {
    let dir = tempdir().unwrap();
    let manager = AccessManager::create(dir.path()).unwrap();
    assert!(DataDictionary::boot(manager, BootOptions::new()).is_err());
}

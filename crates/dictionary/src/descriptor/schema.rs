use def::Uuid;

pub const SYSTEM_SCHEMA_NAME: &str = "SYS";
pub const IBM_SYSTEM_SCHEMA_NAME: &str = "SYSIBM";
pub const IBM_SYSTEM_CAT_SCHEMA_NAME: &str = "SYSCAT";
pub const IBM_SYSTEM_FUN_SCHEMA_NAME: &str = "SYSFUN";
pub const IBM_SYSTEM_PROC_SCHEMA_NAME: &str = "SYSPROC";
pub const IBM_SYSTEM_STAT_SCHEMA_NAME: &str = "SYSSTAT";
pub const IBM_SYSTEM_NULLID_SCHEMA_NAME: &str = "NULLID";
pub const SQLJ_SCHEMA_NAME: &str = "SQLJ";
pub const SYSTEM_DIAG_SCHEMA_NAME: &str = "SYSCS_DIAG";
pub const SYSTEM_UTIL_SCHEMA_NAME: &str = "SYSCS_UTIL";
pub const DEFAULT_USER_SCHEMA_NAME: &str = "APP";
/// Schema of declared global temporary tables. Never stored.
pub const SESSION_SCHEMA_NAME: &str = "SESSION";

pub const SYSTEM_SCHEMA_UUID: Uuid = Uuid::from_u128(0x8000000d_00d0_fd77_3ed8_000a0a0b1900);
pub const IBM_SYSTEM_SCHEMA_UUID: Uuid = Uuid::from_u128(0xc013800d_00f8_5b53_28a9_00000019ed88);
pub const IBM_SYSTEM_CAT_SCHEMA_UUID: Uuid =
    Uuid::from_u128(0xc013800d_00d7_ddbd_08ce_000a0a411400);
pub const IBM_SYSTEM_FUN_SCHEMA_UUID: Uuid =
    Uuid::from_u128(0xc013800d_00d7_ddbe_c4e8_000a0a411400);
pub const IBM_SYSTEM_PROC_SCHEMA_UUID: Uuid =
    Uuid::from_u128(0xc013800d_00d7_ddbf_0d01_000a0a411400);
pub const IBM_SYSTEM_STAT_SCHEMA_UUID: Uuid =
    Uuid::from_u128(0xc013800d_00d7_ddc0_5c0f_000a0a411400);
pub const IBM_SYSTEM_NULLID_SCHEMA_UUID: Uuid =
    Uuid::from_u128(0xc013800d_00d7_ddc1_b69a_000a0a411400);
pub const SQLJ_SCHEMA_UUID: Uuid = Uuid::from_u128(0xc013800d_00d7_ddc2_f9e4_000a0a411400);
pub const SYSTEM_DIAG_SCHEMA_UUID: Uuid = Uuid::from_u128(0xc013800d_00d7_ddc3_8fd3_000a0a411400);
pub const SYSTEM_UTIL_SCHEMA_UUID: Uuid = Uuid::from_u128(0xc013800d_00d7_ddc4_7df4_000a0a411400);
pub const SESSION_SCHEMA_UUID: Uuid = Uuid::from_u128(0xc013800d_00d7_ddc5_a0b2_000a0a411400);

/// Schemas created with every database, in creation order.
pub const SYSTEM_SCHEMAS: [(&str, Uuid); 10] = [
    (SYSTEM_SCHEMA_NAME, SYSTEM_SCHEMA_UUID),
    (IBM_SYSTEM_SCHEMA_NAME, IBM_SYSTEM_SCHEMA_UUID),
    (IBM_SYSTEM_CAT_SCHEMA_NAME, IBM_SYSTEM_CAT_SCHEMA_UUID),
    (IBM_SYSTEM_FUN_SCHEMA_NAME, IBM_SYSTEM_FUN_SCHEMA_UUID),
    (IBM_SYSTEM_PROC_SCHEMA_NAME, IBM_SYSTEM_PROC_SCHEMA_UUID),
    (IBM_SYSTEM_STAT_SCHEMA_NAME, IBM_SYSTEM_STAT_SCHEMA_UUID),
    (IBM_SYSTEM_NULLID_SCHEMA_NAME, IBM_SYSTEM_NULLID_SCHEMA_UUID),
    (SQLJ_SCHEMA_NAME, SQLJ_SCHEMA_UUID),
    (SYSTEM_DIAG_SCHEMA_NAME, SYSTEM_DIAG_SCHEMA_UUID),
    (SYSTEM_UTIL_SCHEMA_NAME, SYSTEM_UTIL_SCHEMA_UUID),
];

pub fn is_system_schema_name(name: &str) -> bool {
    SYSTEM_SCHEMAS.iter().any(|(n, _)| *n == name)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaDescriptor {
    pub uuid: Uuid,
    pub name: String,
    pub authorization_id: String,
}

impl SchemaDescriptor {
    pub fn new(name: impl Into<String>, authorization_id: impl Into<String>, uuid: Uuid) -> Self {
        Self {
            uuid,
            name: name.into(),
            authorization_id: authorization_id.into(),
        }
    }

    pub fn is_system(&self) -> bool {
        is_system_schema_name(&self.name)
    }

    pub fn is_session(&self) -> bool {
        self.name == SESSION_SCHEMA_NAME
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_schema_names() {
        assert!(is_system_schema_name("SYS"));
        assert!(is_system_schema_name("SYSCS_UTIL"));
        assert!(!is_system_schema_name("APP"));
        assert!(!is_system_schema_name("sys"));
        assert!(!is_system_schema_name(SESSION_SCHEMA_NAME));
    }

    #[test]
    fn system_schema_ids_are_distinct() {
        let mut ids = SYSTEM_SCHEMAS.iter().map(|(_, id)| *id).collect::<Vec<_>>();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), SYSTEM_SCHEMAS.len());
    }
}

use {
    common::{char_enum, dsa::BitSet},
    def::Uuid,
};

pub const PUBLIC_AUTHORIZATION_ID: &str = "PUBLIC";

char_enum! {
    /// State of one privilege in SYSTABLEPERMS.
    enum Grant {
        No = 'N',
        Yes = 'y',
        WithGrantOption = 'Y',
    }
}

impl Grant {
    pub fn is_granted(&self) -> bool {
        !matches!(self, Self::No)
    }

    /// The stronger of two grants.
    fn merge(self, other: Grant) -> Grant {
        match (self, other) {
            (Self::WithGrantOption, _) | (_, Self::WithGrantOption) => Self::WithGrantOption,
            (Self::Yes, _) | (_, Self::Yes) => Self::Yes,
            _ => Self::No,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TablePrivilege {
    Select,
    Delete,
    Insert,
    Update,
    References,
    Trigger,
}

impl TablePrivilege {
    pub const ALL: [TablePrivilege; 6] = [
        Self::Select,
        Self::Delete,
        Self::Insert,
        Self::Update,
        Self::References,
        Self::Trigger,
    ];

    fn index(&self) -> usize {
        *self as usize
    }

    /// The column-level privilege that can stand in for this one.
    pub fn column_privilege(&self) -> Option<ColumnPrivilege> {
        match self {
            Self::Select => Some(ColumnPrivilege::Select),
            Self::Update => Some(ColumnPrivilege::Update),
            Self::References => Some(ColumnPrivilege::References),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TablePermsDescriptor {
    pub uuid: Uuid,
    pub grantee: String,
    pub grantor: String,
    pub table_id: Uuid,
    /// Indexed by `TablePrivilege`.
    pub privileges: [Grant; 6],
}

impl TablePermsDescriptor {
    pub fn new(grantee: impl Into<String>, grantor: impl Into<String>, table_id: Uuid) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            grantee: grantee.into(),
            grantor: grantor.into(),
            table_id,
            privileges: [Grant::No; 6],
        }
    }

    pub fn with(mut self, privilege: TablePrivilege) -> Self {
        self.privileges[privilege.index()] = Grant::Yes;
        self
    }

    pub fn get(&self, privilege: TablePrivilege) -> Grant {
        self.privileges[privilege.index()]
    }

    pub fn set(&mut self, privilege: TablePrivilege, grant: Grant) {
        self.privileges[privilege.index()] = grant;
    }

    pub fn is_empty(&self) -> bool {
        self.privileges.iter().all(|g| !g.is_granted())
    }

    /// Adds the privileges granted in `other`.
    pub fn merge(&mut self, other: &TablePermsDescriptor) {
        for (mine, theirs) in self.privileges.iter_mut().zip(other.privileges) {
            *mine = mine.merge(theirs);
        }
    }

    /// Clears the privileges granted in `other`, returning whether anything
    /// changed.
    pub fn remove(&mut self, other: &TablePermsDescriptor) -> bool {
        let mut changed = false;
        for (mine, theirs) in self.privileges.iter_mut().zip(other.privileges) {
            if theirs.is_granted() && mine.is_granted() {
                *mine = Grant::No;
                changed = true;
            }
        }
        changed
    }
}

char_enum! {
    /// Stored in SYSCOLPERMS.TYPE; upper case marks the grant option.
    enum ColumnPrivilege {
        Select = 's',
        Update = 'u',
        References = 'r',
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColPermsDescriptor {
    pub uuid: Uuid,
    pub grantee: String,
    pub grantor: String,
    pub table_id: Uuid,
    pub privilege: ColumnPrivilege,
    /// 0-based column positions.
    pub columns: BitSet,
}

impl ColPermsDescriptor {
    pub fn new(
        grantee: impl Into<String>,
        grantor: impl Into<String>,
        table_id: Uuid,
        privilege: ColumnPrivilege,
        columns: BitSet,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            grantee: grantee.into(),
            grantor: grantor.into(),
            table_id,
            privilege,
            columns,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutinePermsDescriptor {
    pub uuid: Uuid,
    pub grantee: String,
    pub grantor: String,
    pub routine_id: Uuid,
    pub has_execute: bool,
}

impl RoutinePermsDescriptor {
    pub fn new(grantee: impl Into<String>, grantor: impl Into<String>, routine_id: Uuid) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            grantee: grantee.into(),
            grantor: grantor.into(),
            routine_id,
            has_execute: true,
        }
    }
}

/// A USAGE privilege on a sequence or user defined type (SYSPERMS).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermDescriptor {
    pub uuid: Uuid,
    pub object_type: String,
    pub object_id: Uuid,
    pub permission: String,
    pub grantor: String,
    pub grantee: String,
    pub grantable: bool,
}

impl PermDescriptor {
    pub const SEQUENCE_TYPE: &'static str = "SEQUENCE";
    pub const UDT_TYPE: &'static str = "TYPE";
    pub const USAGE_PRIV: &'static str = "USAGE";

    pub fn usage(
        object_type: &str,
        object_id: Uuid,
        grantor: impl Into<String>,
        grantee: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            object_type: object_type.to_string(),
            object_id,
            permission: Self::USAGE_PRIV.to_string(),
            grantor: grantor.into(),
            grantee: grantee.into(),
            grantable: false,
        }
    }
}

/// A role definition (`is_def`) or a grant of a role to a user or role.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleGrantDescriptor {
    pub uuid: Uuid,
    pub role_name: String,
    pub grantee: String,
    pub grantor: String,
    pub with_admin_option: bool,
    pub is_def: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionsDescriptor {
    Table(TablePermsDescriptor),
    Column(ColPermsDescriptor),
    Routine(RoutinePermsDescriptor),
    Generic(PermDescriptor),
}

impl PermissionsDescriptor {
    pub fn uuid(&self) -> Uuid {
        match self {
            Self::Table(p) => p.uuid,
            Self::Column(p) => p.uuid,
            Self::Routine(p) => p.uuid,
            Self::Generic(p) => p.uuid,
        }
    }

    pub fn grantee(&self) -> &str {
        match self {
            Self::Table(p) => &p.grantee,
            Self::Column(p) => &p.grantee,
            Self::Routine(p) => &p.grantee,
            Self::Generic(p) => &p.grantee,
        }
    }

    pub fn key(&self) -> PermissionKey {
        match self {
            Self::Table(p) => PermissionKey::Table {
                table_id: p.table_id,
                grantee: p.grantee.clone(),
            },
            Self::Column(p) => PermissionKey::Column {
                table_id: p.table_id,
                privilege: p.privilege,
                grantee: p.grantee.clone(),
            },
            Self::Routine(p) => PermissionKey::Routine {
                routine_id: p.routine_id,
                grantee: p.grantee.clone(),
            },
            Self::Generic(p) => PermissionKey::Generic {
                object_id: p.object_id,
                object_type: p.object_type.clone(),
                grantee: p.grantee.clone(),
            },
        }
    }
}

/// Identifies the permission row of one grantee on one object; the key of
/// the permissions cache.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PermissionKey {
    Table {
        table_id: Uuid,
        grantee: String,
    },
    Column {
        table_id: Uuid,
        privilege: ColumnPrivilege,
        grantee: String,
    },
    Routine {
        routine_id: Uuid,
        grantee: String,
    },
    Generic {
        object_id: Uuid,
        object_type: String,
        grantee: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_and_remove_table_privileges() {
        let table = Uuid::new_v4();
        let mut existing =
            TablePermsDescriptor::new("U", "APP", table).with(TablePrivilege::Select);
        let grant = TablePermsDescriptor::new("U", "APP", table)
            .with(TablePrivilege::Insert)
            .with(TablePrivilege::Select);

        existing.merge(&grant);
        assert!(existing.get(TablePrivilege::Insert).is_granted());
        assert!(existing.get(TablePrivilege::Select).is_granted());
        assert!(!existing.get(TablePrivilege::Delete).is_granted());

        let revoke = TablePermsDescriptor::new("U", "APP", table).with(TablePrivilege::Delete);
        assert!(!existing.remove(&revoke));

        assert!(existing.remove(&grant));
        assert!(existing.is_empty());
    }

    #[test]
    fn grant_option_wins() {
        assert_eq!(Grant::Yes.merge(Grant::WithGrantOption), Grant::WithGrantOption);
        assert_eq!(Grant::No.merge(Grant::Yes), Grant::Yes);
        assert_eq!(Grant::No.merge(Grant::No), Grant::No);
    }
}

use {
    super::DataDictionary,
    crate::{
        catalog::{
            column_perms, flag_value, perms, roles, routine_perms, table_perms, CatalogNumber,
            RowFactory,
        },
        descriptor::{
            AliasDescriptor, ColPermsDescriptor, ColumnPrivilege, PermDescriptor, PermissionKey,
            PermissionsDescriptor, RoleGrantDescriptor, RoutinePermsDescriptor,
            TableDescriptor, TablePermsDescriptor, TablePrivilege, PUBLIC_AUTHORIZATION_ID,
        },
        error::{ObjectKind, Result},
        tab_info::{column_equals, ReadMode},
        version::DictionaryVersion,
    },
    access::{Qualifiers, Transaction},
    common::dsa::BitSet,
    def::{Row, Uuid, Value},
    tracing::debug,
};

/// Outcome of a privilege check, naming what granted the privilege.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PermissionCheck {
    /// The user owns the object or the database.
    Owner,
    Table { grantee: String },
    /// Every required column is covered by column grants to the user or
    /// PUBLIC.
    Columns,
    Routine { grantee: String },
    Usage { grantee: String },
    Denied,
}

impl PermissionCheck {
    pub fn is_granted(&self) -> bool {
        !matches!(self, Self::Denied)
    }
}

/// How a grant or revoke changes an existing permission row.
enum Change {
    Unchanged,
    Updated,
    Emptied,
}

/// The user itself, then PUBLIC.
fn grantees(user: &str) -> [&str; 2] {
    [user, PUBLIC_AUTHORIZATION_ID]
}

impl DataDictionary {
    /// Grants (`add`) or revokes the privileges of `perm` for `grantee`.
    /// Privileges merge into an existing row; a row left without any
    /// privilege is deleted. Returns whether the catalog changed.
    pub fn add_remove_permissions_descriptor(
        &self,
        tc: &Transaction,
        add: bool,
        perm: &PermissionsDescriptor,
        grantee: &str,
    ) -> Result<bool> {
        let feature = if add { "GRANT" } else { "REVOKE" };
        self.check_version(DictionaryVersion::V10_2, feature)?;

        let changed = match perm {
            PermissionsDescriptor::Table(p) => {
                let new = TablePermsDescriptor {
                    uuid: Uuid::new_v4(),
                    grantee: grantee.to_owned(),
                    ..p.clone()
                };
                let key = vec![
                    Value::from(grantee),
                    Value::Uuid(p.table_id),
                    Value::from(p.grantor.as_str()),
                ];
                self.apply_grant::<table_perms::SysTablePermsFactory>(
                    tc,
                    table_perms::BY_GRANTEE,
                    key,
                    add,
                    &new,
                    |current| {
                        let before = current.clone();
                        if add {
                            current.merge(&new);
                        } else {
                            current.remove(&new);
                        }
                        if current.is_empty() {
                            Change::Emptied
                        } else if *current == before {
                            Change::Unchanged
                        } else {
                            Change::Updated
                        }
                    },
                )?
            }
            PermissionsDescriptor::Column(p) => {
                let new = ColPermsDescriptor {
                    uuid: Uuid::new_v4(),
                    grantee: grantee.to_owned(),
                    ..p.clone()
                };
                let key = vec![
                    Value::from(grantee),
                    Value::Uuid(p.table_id),
                    Value::from(p.privilege.as_char()),
                    Value::from(p.grantor.as_str()),
                ];
                self.apply_grant::<column_perms::SysColPermsFactory>(
                    tc,
                    column_perms::BY_GRANTEE,
                    key,
                    add,
                    &new,
                    |current| {
                        let before = current.columns.count();
                        if add {
                            current.columns.union(&new.columns);
                        } else {
                            current.columns.difference(&new.columns);
                        }
                        if current.columns.count() == 0 {
                            Change::Emptied
                        } else if current.columns.count() == before {
                            Change::Unchanged
                        } else {
                            Change::Updated
                        }
                    },
                )?
            }
            PermissionsDescriptor::Routine(p) => {
                let new = RoutinePermsDescriptor {
                    uuid: Uuid::new_v4(),
                    grantee: grantee.to_owned(),
                    ..p.clone()
                };
                let key = vec![
                    Value::from(grantee),
                    Value::Uuid(p.routine_id),
                    Value::from(p.grantor.as_str()),
                ];
                self.apply_grant::<routine_perms::SysRoutinePermsFactory>(
                    tc,
                    routine_perms::BY_GRANTEE,
                    key,
                    add,
                    &new,
                    |_| if add { Change::Unchanged } else { Change::Emptied },
                )?
            }
            PermissionsDescriptor::Generic(p) => {
                self.check_version(DictionaryVersion::V10_6, "GRANT USAGE")?;
                let new = PermDescriptor {
                    uuid: Uuid::new_v4(),
                    grantee: grantee.to_owned(),
                    ..p.clone()
                };
                let key = vec![
                    Value::from(grantee),
                    Value::Uuid(p.object_id),
                    Value::from(p.grantor.as_str()),
                ];
                self.apply_grant::<perms::SysPermsFactory>(
                    tc,
                    perms::BY_GRANTEE,
                    key,
                    add,
                    &new,
                    |_| if add { Change::Unchanged } else { Change::Emptied },
                )?
            }
        };

        let mut key = perm.key();
        match &mut key {
            PermissionKey::Table { grantee: g, .. }
            | PermissionKey::Column { grantee: g, .. }
            | PermissionKey::Routine { grantee: g, .. }
            | PermissionKey::Generic { grantee: g, .. } => *g = grantee.to_owned(),
        }
        self.permissions.remove(&key);
        debug!(?key, add, changed, "permissions changed");
        Ok(changed)
    }

    /// Inserts `new` if the grantee holds no row under `key` yet, otherwise
    /// lets `change` adjust the existing row.
    fn apply_grant<F: RowFactory<Parent = ()>>(
        &self,
        tc: &Transaction,
        index: usize,
        key: Row,
        add: bool,
        new: &F::Descriptor,
        change: impl FnOnce(&mut F::Descriptor) -> Change,
    ) -> Result<bool> {
        let number = F::def().number;
        let ti = self.catalog(tc, number)?;
        let existing = ti
            .fetch_via_index(tc, index, key, &Qualifiers::none(), ReadMode::RepeatableRead, true)?
            .into_iter()
            .next();

        match existing {
            None if add => {
                let row = F::make_row(Some(new), None)?;
                self.insert_catalog_row(tc, number, row, ObjectKind::Permission, "", "")?;
                Ok(true)
            }
            None => Ok(false),
            Some((location, row)) => {
                let mut current = F::build_descriptor(&row, None)?;
                match change(&mut current) {
                    Change::Unchanged => Ok(false),
                    Change::Updated => {
                        ti.update_row(tc, location, &row, F::make_row(Some(&current), None)?)?;
                        Ok(true)
                    }
                    Change::Emptied => {
                        ti.delete_row(tc, location, &row)?;
                        Ok(true)
                    }
                }
            }
        }
    }

    /// Consults the permissions cache, which also remembers misses.
    fn cached_permission(
        &self,
        key: PermissionKey,
        load: impl FnOnce() -> Result<Option<PermissionsDescriptor>>,
    ) -> Result<Option<PermissionsDescriptor>> {
        let use_cache = !self.bootstrapping && self.permissions.is_enabled();
        if use_cache {
            if let Some(found) = self.permissions.get(&key) {
                return Ok(found);
            }
        }

        let found = load()?;
        if use_cache {
            self.permissions.put(key, found.clone());
        }
        Ok(found)
    }

    /// Whether a lookup result for `key` is currently cached.
    pub fn is_permission_cached(&self, key: &PermissionKey) -> bool {
        self.permissions.get(key).is_some()
    }

    /// Table privileges of a grantee, merged over all grantors.
    pub fn get_table_permissions(
        &self,
        tc: &Transaction,
        table_id: Uuid,
        grantee: &str,
    ) -> Result<Option<TablePermsDescriptor>> {
        if self.version < DictionaryVersion::V10_2 {
            return Ok(None);
        }
        let key = PermissionKey::Table {
            table_id,
            grantee: grantee.to_owned(),
        };
        let found = self.cached_permission(key, || {
            let rows = self.descriptors_via_index::<table_perms::SysTablePermsFactory>(
                tc,
                table_perms::BY_GRANTEE,
                vec![Value::from(grantee), Value::Uuid(table_id)],
            )?;
            Ok(rows
                .into_iter()
                .reduce(|mut merged, p| {
                    merged.merge(&p);
                    merged
                })
                .map(PermissionsDescriptor::Table))
        })?;

        Ok(match found {
            Some(PermissionsDescriptor::Table(p)) => Some(p),
            _ => None,
        })
    }

    /// Columns on which a grantee holds a column privilege, merged over
    /// all grantors.
    pub fn get_column_permissions(
        &self,
        tc: &Transaction,
        table_id: Uuid,
        privilege: ColumnPrivilege,
        grantee: &str,
    ) -> Result<Option<ColPermsDescriptor>> {
        if self.version < DictionaryVersion::V10_2 {
            return Ok(None);
        }
        let key = PermissionKey::Column {
            table_id,
            privilege,
            grantee: grantee.to_owned(),
        };
        let found = self.cached_permission(key, || {
            let rows = self.descriptors_via_index::<column_perms::SysColPermsFactory>(
                tc,
                column_perms::BY_GRANTEE,
                vec![
                    Value::from(grantee),
                    Value::Uuid(table_id),
                    Value::from(privilege.as_char()),
                ],
            )?;
            Ok(rows
                .into_iter()
                .reduce(|mut merged, p| {
                    merged.columns.union(&p.columns);
                    merged
                })
                .map(PermissionsDescriptor::Column))
        })?;

        Ok(match found {
            Some(PermissionsDescriptor::Column(p)) => Some(p),
            _ => None,
        })
    }

    pub fn get_routine_permissions(
        &self,
        tc: &Transaction,
        routine_id: Uuid,
        grantee: &str,
    ) -> Result<Option<RoutinePermsDescriptor>> {
        if self.version < DictionaryVersion::V10_2 {
            return Ok(None);
        }
        let key = PermissionKey::Routine {
            routine_id,
            grantee: grantee.to_owned(),
        };
        let found = self.cached_permission(key, || {
            Ok(self
                .descriptor_via_index::<routine_perms::SysRoutinePermsFactory>(
                    tc,
                    routine_perms::BY_GRANTEE,
                    vec![Value::from(grantee), Value::Uuid(routine_id)],
                )?
                .map(PermissionsDescriptor::Routine))
        })?;

        Ok(match found {
            Some(PermissionsDescriptor::Routine(p)) => Some(p),
            _ => None,
        })
    }

    /// USAGE privilege of a grantee on a sequence or user defined type.
    pub fn get_generic_permissions(
        &self,
        tc: &Transaction,
        object_id: Uuid,
        object_type: &str,
        grantee: &str,
    ) -> Result<Option<PermDescriptor>> {
        if self.version < DictionaryVersion::V10_6 {
            return Ok(None);
        }
        let key = PermissionKey::Generic {
            object_id,
            object_type: object_type.to_owned(),
            grantee: grantee.to_owned(),
        };
        let found = self.cached_permission(key, || {
            Ok(self
                .fetch_descriptors::<perms::SysPermsFactory>(
                    tc,
                    perms::BY_GRANTEE,
                    vec![Value::from(grantee), Value::Uuid(object_id)],
                    &Qualifiers::all_of(vec![column_equals(perms::OBJECTTYPE, object_type)]),
                    None,
                    ReadMode::RepeatableRead,
                )?
                .into_iter()
                .next()
                .map(PermissionsDescriptor::Generic))
        })?;

        Ok(match found {
            Some(PermissionsDescriptor::Generic(p)) => Some(p),
            _ => None,
        })
    }

    fn owns_schema(&self, tc: &Transaction, schema_id: Uuid, user: &str) -> Result<bool> {
        if user == self.owner {
            return Ok(true);
        }
        Ok(self
            .get_schema_descriptor_by_id(tc, schema_id)?
            .map(|sd| sd.authorization_id == user)
            .unwrap_or(false))
    }

    /// Checks a table privilege for `user`. A table-level grant, to the
    /// user before PUBLIC, wins over column grants; column grants succeed
    /// only if together they cover every column in `columns` (1-based).
    pub fn check_table_privilege(
        &self,
        tc: &Transaction,
        td: &TableDescriptor,
        user: &str,
        privilege: TablePrivilege,
        columns: &[u32],
    ) -> Result<PermissionCheck> {
        if self.owns_schema(tc, td.schema_id, user)? {
            return Ok(PermissionCheck::Owner);
        }

        for grantee in grantees(user) {
            if let Some(p) = self.get_table_permissions(tc, td.uuid, grantee)? {
                if p.get(privilege).is_granted() {
                    return Ok(PermissionCheck::Table {
                        grantee: grantee.to_owned(),
                    });
                }
            }
        }

        let Some(column_privilege) = privilege.column_privilege() else {
            return Ok(PermissionCheck::Denied);
        };
        if columns.is_empty() {
            return Ok(PermissionCheck::Denied);
        }

        let mut granted = BitSet::new(td.max_column_position() as usize);
        for grantee in grantees(user) {
            if let Some(p) = self.get_column_permissions(tc, td.uuid, column_privilege, grantee)? {
                granted.union(&p.columns);
            }
        }
        let covered = columns
            .iter()
            .all(|&c| c >= 1 && (c as usize) <= granted.len() && granted.get(c as usize - 1));

        Ok(if covered {
            PermissionCheck::Columns
        } else {
            PermissionCheck::Denied
        })
    }

    /// Checks EXECUTE on a routine for `user`, then for PUBLIC.
    pub fn check_routine_privilege(
        &self,
        tc: &Transaction,
        routine: &AliasDescriptor,
        user: &str,
    ) -> Result<PermissionCheck> {
        if self.owns_schema(tc, routine.schema_id, user)? {
            return Ok(PermissionCheck::Owner);
        }

        for grantee in grantees(user) {
            if let Some(p) = self.get_routine_permissions(tc, routine.uuid, grantee)? {
                if p.has_execute {
                    return Ok(PermissionCheck::Routine {
                        grantee: grantee.to_owned(),
                    });
                }
            }
        }
        Ok(PermissionCheck::Denied)
    }

    /// Checks USAGE on a sequence or user defined type living in
    /// `schema_id`.
    pub fn check_usage_privilege(
        &self,
        tc: &Transaction,
        object_id: Uuid,
        object_type: &str,
        schema_id: Uuid,
        user: &str,
    ) -> Result<PermissionCheck> {
        if self.owns_schema(tc, schema_id, user)? {
            return Ok(PermissionCheck::Owner);
        }

        for grantee in grantees(user) {
            if self
                .get_generic_permissions(tc, object_id, object_type, grantee)?
                .is_some()
            {
                return Ok(PermissionCheck::Usage {
                    grantee: grantee.to_owned(),
                });
            }
        }
        Ok(PermissionCheck::Denied)
    }

    /// Removes every table and column grant on a dropped table.
    pub fn drop_all_table_permissions(&self, tc: &Transaction, table_id: Uuid) -> Result<usize> {
        if self.version < DictionaryVersion::V10_2 {
            return Ok(0);
        }
        let key = vec![Value::Uuid(table_id)];
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Systableperms,
            table_perms::BY_TABLE,
            key.clone(),
        )? + self.delete_via_index(tc, CatalogNumber::Syscolperms, column_perms::BY_TABLE, key)?;

        self.permissions.retain(|key, _| match key {
            PermissionKey::Table { table_id: t, .. }
            | PermissionKey::Column { table_id: t, .. } => *t != table_id,
            _ => true,
        });
        Ok(deleted)
    }

    /// Removes every EXECUTE grant on a dropped routine.
    pub fn drop_all_routine_permissions(
        &self,
        tc: &Transaction,
        routine_id: Uuid,
    ) -> Result<usize> {
        if self.version < DictionaryVersion::V10_2 {
            return Ok(0);
        }
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysroutineperms,
            routine_perms::BY_ALIAS,
            vec![Value::Uuid(routine_id)],
        )?;
        self.permissions.retain(|key, _| {
            !matches!(key, PermissionKey::Routine { routine_id: r, .. } if *r == routine_id)
        });
        Ok(deleted)
    }

    /// Removes every USAGE grant on a dropped sequence or type.
    pub fn drop_all_permissions_by_object(
        &self,
        tc: &Transaction,
        object_id: Uuid,
    ) -> Result<usize> {
        if self.version < DictionaryVersion::V10_6 {
            return Ok(0);
        }
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysperms,
            perms::BY_OBJECT,
            vec![Value::Uuid(object_id)],
        )?;
        self.permissions.retain(|key, _| {
            !matches!(key, PermissionKey::Generic { object_id: o, .. } if *o == object_id)
        });
        Ok(deleted)
    }

    /// Records a role definition or a grant of a role.
    pub fn add_role_grant(&self, tc: &Transaction, grant: &RoleGrantDescriptor) -> Result<()> {
        self.check_version(DictionaryVersion::V10_4, "ROLES")?;
        let row = roles::SysRolesFactory::make_row(Some(grant), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysroles,
            row,
            ObjectKind::Role,
            &grant.role_name,
            &grant.grantee,
        )?;
        Ok(())
    }

    /// The row created by CREATE ROLE.
    pub fn get_role_definition(
        &self,
        tc: &Transaction,
        role: &str,
    ) -> Result<Option<RoleGrantDescriptor>> {
        self.check_version(DictionaryVersion::V10_4, "ROLES")?;
        self.descriptor_via_index::<roles::SysRolesFactory>(
            tc,
            roles::BY_DEF,
            vec![Value::from(role), flag_value(true)],
        )
    }

    pub fn get_role_grant(
        &self,
        tc: &Transaction,
        role: &str,
        grantee: &str,
        grantor: &str,
    ) -> Result<Option<RoleGrantDescriptor>> {
        self.check_version(DictionaryVersion::V10_4, "ROLES")?;
        self.descriptor_via_index::<roles::SysRolesFactory>(
            tc,
            roles::BY_ROLE,
            vec![Value::from(role), Value::from(grantee), Value::from(grantor)],
        )
    }

    /// Grants of a role to users and roles, excluding its definition.
    pub fn get_role_grants(
        &self,
        tc: &Transaction,
        role: &str,
    ) -> Result<Vec<RoleGrantDescriptor>> {
        self.check_version(DictionaryVersion::V10_4, "ROLES")?;
        let mut grants = self.descriptors_via_index::<roles::SysRolesFactory>(
            tc,
            roles::BY_ROLE,
            vec![Value::from(role)],
        )?;
        grants.retain(|g| !g.is_def);
        Ok(grants)
    }

    pub fn drop_role_grant(
        &self,
        tc: &Transaction,
        role: &str,
        grantee: &str,
        grantor: &str,
    ) -> Result<bool> {
        self.check_version(DictionaryVersion::V10_4, "ROLES")?;
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysroles,
            roles::BY_ROLE,
            vec![Value::from(role), Value::from(grantee), Value::from(grantor)],
        )?;
        Ok(deleted > 0)
    }

    /// Drops a role: its definition and every grant of it.
    pub fn drop_role_grants_by_name(&self, tc: &Transaction, role: &str) -> Result<usize> {
        self.check_version(DictionaryVersion::V10_4, "ROLES")?;
        self.delete_via_index(tc, CatalogNumber::Sysroles, roles::BY_ROLE, vec![Value::from(role)])
    }
}

use {
    super::{ConglomerateDescriptor, TableDescriptor},
    common::char_enum,
    def::Uuid,
};

char_enum! {
    /// Stored in SYSCONSTRAINTS.TYPE.
    enum ConstraintType {
        PrimaryKey = 'P',
        Unique = 'U',
        Check = 'C',
        ForeignKey = 'F',
    }

    /// Action of a foreign key, stored in SYSFOREIGNKEYS.
    enum ReferentialAction {
        Restrict = 'R',
        NoAction = 'S',
        Cascade = 'C',
        SetNull = 'U',
        SetDefault = 'D',
    }
}

/// Detail of a primary key or unique constraint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyConstraint {
    /// Conglomerate descriptor of the backing index.
    pub index_id: Uuid,
    /// Number of foreign keys referencing this key.
    pub reference_count: i32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForeignKeyConstraint {
    pub index_id: Uuid,
    pub referenced_constraint_id: Uuid,
    pub delete_rule: ReferentialAction,
    pub update_rule: ReferentialAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckConstraint {
    pub text: String,
    /// 1-based positions of the columns the check clause reads.
    pub referenced_columns: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConstraintKind {
    PrimaryKey(KeyConstraint),
    Unique(KeyConstraint),
    ForeignKey(ForeignKeyConstraint),
    Check(CheckConstraint),
}

impl ConstraintKind {
    pub fn constraint_type(&self) -> ConstraintType {
        match self {
            Self::PrimaryKey(_) => ConstraintType::PrimaryKey,
            Self::Unique(_) => ConstraintType::Unique,
            Self::ForeignKey(_) => ConstraintType::ForeignKey,
            Self::Check(_) => ConstraintType::Check,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConstraintDescriptor {
    pub uuid: Uuid,
    pub name: String,
    pub table_id: Uuid,
    pub schema_id: Uuid,
    pub enabled: bool,
    pub kind: ConstraintKind,
}

impl ConstraintDescriptor {
    pub fn new(name: impl Into<String>, table: &TableDescriptor, kind: ConstraintKind) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            table_id: table.uuid,
            schema_id: table.schema_id,
            enabled: true,
            kind,
        }
    }

    pub fn constraint_type(&self) -> ConstraintType {
        self.kind.constraint_type()
    }

    /// The backing index of a key or foreign key constraint.
    pub fn index_id(&self) -> Option<Uuid> {
        match &self.kind {
            ConstraintKind::PrimaryKey(k) | ConstraintKind::Unique(k) => Some(k.index_id),
            ConstraintKind::ForeignKey(fk) => Some(fk.index_id),
            ConstraintKind::Check(_) => None,
        }
    }

    pub fn is_referenced_key(&self) -> bool {
        matches!(
            self.kind,
            ConstraintKind::PrimaryKey(_) | ConstraintKind::Unique(_)
        )
    }

    pub fn reference_count(&self) -> i32 {
        match &self.kind {
            ConstraintKind::PrimaryKey(k) | ConstraintKind::Unique(k) => k.reference_count,
            _ => 0,
        }
    }

    /// Key columns of the constraint, read off its backing index.
    pub fn key_columns<'a>(&self, table: &'a TableDescriptor) -> Option<&'a [u32]> {
        let index: &ConglomerateDescriptor = table.conglomerate(self.index_id()?)?;
        index
            .index_row_generator
            .as_ref()
            .map(|g| g.base_columns.as_slice())
    }

    /// The SYSKEYS, SYSFOREIGNKEYS or SYSCHECKS row of this constraint.
    pub fn sub_constraint(&self) -> SubConstraint {
        match &self.kind {
            ConstraintKind::PrimaryKey(k) | ConstraintKind::Unique(k) => {
                SubConstraint::Key(SubKeyConstraint {
                    constraint_id: self.uuid,
                    index_id: k.index_id,
                })
            }
            ConstraintKind::ForeignKey(fk) => SubConstraint::ForeignKey(SubForeignKeyConstraint {
                constraint_id: self.uuid,
                index_id: fk.index_id,
                key_constraint_id: fk.referenced_constraint_id,
                delete_rule: fk.delete_rule,
                update_rule: fk.update_rule,
            }),
            ConstraintKind::Check(c) => SubConstraint::Check(SubCheckConstraint {
                constraint_id: self.uuid,
                text: c.text.clone(),
                referenced_columns: c.referenced_columns.clone(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubKeyConstraint {
    pub constraint_id: Uuid,
    pub index_id: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubForeignKeyConstraint {
    pub constraint_id: Uuid,
    pub index_id: Uuid,
    pub key_constraint_id: Uuid,
    pub delete_rule: ReferentialAction,
    pub update_rule: ReferentialAction,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubCheckConstraint {
    pub constraint_id: Uuid,
    pub text: String,
    pub referenced_columns: Vec<u32>,
}

/// Type specific detail of a constraint kept in a secondary catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubConstraint {
    Key(SubKeyConstraint),
    ForeignKey(SubForeignKeyConstraint),
    Check(SubCheckConstraint),
}

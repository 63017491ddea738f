use {
    common::char_enum,
    def::{TypeDescriptor, Uuid},
};

char_enum! {
    /// Stored in both SYSALIASES.ALIASTYPE and SYSALIASES.NAMESPACE.
    enum AliasType {
        Procedure = 'P',
        Function = 'F',
        Synonym = 'S',
        UserDefinedType = 'A',
    }

    enum SqlAccess {
        NoSql = 'N',
        ContainsSql = 'C',
        ReadsSql = 'R',
        ModifiesSql = 'M',
    }

    enum ParameterMode {
        In = 'I',
        Out = 'O',
        InOut = 'B',
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineParameter {
    pub name: String,
    pub ty: TypeDescriptor,
    pub mode: ParameterMode,
}

impl RoutineParameter {
    pub fn input(name: impl Into<String>, ty: TypeDescriptor) -> Self {
        Self {
            name: name.into(),
            ty,
            mode: ParameterMode::In,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutineInfo {
    pub method_name: String,
    pub parameters: Vec<RoutineParameter>,
    pub return_type: Option<TypeDescriptor>,
    pub sql_access: SqlAccess,
    pub deterministic: bool,
    pub called_on_null_input: bool,
    pub dynamic_result_sets: u16,
}

/// Payload of SYSALIASES.ALIASINFO.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AliasInfo {
    Routine(RoutineInfo),
    Synonym { schema_name: String, table_name: String },
    UserType { external_name: String },
}

/// A procedure, function, synonym or user defined type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasDescriptor {
    pub uuid: Uuid,
    pub name: String,
    pub schema_id: Uuid,
    /// Class implementing the routine, or the target of a synonym.
    pub java_class_name: String,
    pub alias_type: AliasType,
    pub system: bool,
    pub info: AliasInfo,
    pub specific_name: String,
}

impl AliasDescriptor {
    pub fn new(
        name: impl Into<String>,
        schema_id: Uuid,
        java_class_name: impl Into<String>,
        alias_type: AliasType,
        system: bool,
        info: AliasInfo,
    ) -> Self {
        let uuid = Uuid::new_v4();
        Self {
            uuid,
            name: name.into(),
            schema_id,
            java_class_name: java_class_name.into(),
            alias_type,
            system,
            info,
            specific_name: format!("SQL{}", uuid.simple()).to_uppercase(),
        }
    }

    pub fn namespace(&self) -> AliasType {
        self.alias_type
    }

    pub fn routine_info(&self) -> Option<&RoutineInfo> {
        match &self.info {
            AliasInfo::Routine(info) => Some(info),
            _ => None,
        }
    }
}

use {
    chrono::{DateTime, Utc},
    common::char_enum,
    def::{TypeDescriptor, Uuid},
};

char_enum! {
    enum SpsType {
        /// Stored metadata statement.
        Statement = 'S',
        /// Action or WHEN clause of a trigger.
        Trigger = 'T',
    }
}

/// A stored prepared statement. Parameters are kept as SYSCOLUMNS rows
/// that reference the statement.
#[derive(Debug, Clone, PartialEq)]
pub struct SpsDescriptor {
    pub uuid: Uuid,
    pub name: String,
    pub schema_id: Uuid,
    pub sps_type: SpsType,
    pub valid: bool,
    pub text: String,
    pub last_compiled: Option<DateTime<Utc>>,
    pub compilation_schema_id: Option<Uuid>,
    pub using_text: Option<String>,
    pub compiled_plan: Option<Vec<u8>>,
    pub params: Vec<TypeDescriptor>,
}

impl SpsDescriptor {
    pub fn new(
        name: impl Into<String>,
        schema_id: Uuid,
        sps_type: SpsType,
        text: impl Into<String>,
    ) -> Self {
        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            schema_id,
            sps_type,
            valid: false,
            text: text.into(),
            last_compiled: None,
            compilation_schema_id: Some(schema_id),
            using_text: None,
            compiled_plan: None,
            params: vec![],
        }
    }

    /// Marks the plan stale; it is rebuilt on next use.
    pub fn invalidate(&mut self) {
        self.valid = false;
        self.compiled_plan = None;
    }

    pub fn param_name(position: usize) -> String {
        format!("PARAM{}", position)
    }
}

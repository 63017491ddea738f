use {
    chrono::{DateTime, Utc},
    common::char_enum,
    def::Uuid,
};

char_enum! {
    enum TriggerEvent {
        Update = 'U',
        Delete = 'D',
        Insert = 'I',
    }

    enum FiringTime {
        Before = 'B',
        After = 'A',
    }
}

impl TriggerEvent {
    pub const UPDATE_MASK: u8 = 0x1;
    pub const DELETE_MASK: u8 = 0x2;
    pub const INSERT_MASK: u8 = 0x4;

    pub fn mask(&self) -> u8 {
        match self {
            Self::Update => Self::UPDATE_MASK,
            Self::Delete => Self::DELETE_MASK,
            Self::Insert => Self::INSERT_MASK,
        }
    }
}

/// Columns a trigger depends on: the columns named in `UPDATE OF` and the
/// columns its action reads through the OLD/NEW transition variables.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReferencedColumns {
    pub trigger_columns: Vec<u32>,
    pub action_columns: Vec<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriggerDescriptor {
    pub uuid: Uuid,
    pub name: String,
    pub schema_id: Uuid,
    pub creation_timestamp: DateTime<Utc>,
    pub event: TriggerEvent,
    pub firing_time: FiringTime,
    pub row_level: bool,
    pub enabled: bool,
    pub table_id: Uuid,
    pub when_stmt_id: Option<Uuid>,
    /// Stored statement holding the rewritten action.
    pub action_stmt_id: Uuid,
    pub referenced_columns: Option<ReferencedColumns>,
    /// Action text as written by the user.
    pub definition: String,
    pub old_referencing_name: Option<String>,
    pub new_referencing_name: Option<String>,
    pub when_clause_text: Option<String>,
}

impl TriggerDescriptor {
    pub fn referencing_old(&self) -> bool {
        self.old_referencing_name.is_some()
    }

    pub fn referencing_new(&self) -> bool {
        self.new_referencing_name.is_some()
    }

    pub fn listens_for(&self, event_mask: u8) -> bool {
        self.event.mask() & event_mask != 0
    }
}

use def::{TypeDescriptor, Uuid, Value};

/// Default of a column: a stored literal, or the text of an expression
/// evaluated when a row is inserted.
#[derive(Debug, Clone, PartialEq)]
pub enum ColumnDefault {
    Literal(Value),
    Expression(String),
}

/// Identity state of an autoincrement column. `current` is the next value
/// to hand out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoIncrement {
    pub current: i64,
    pub start: i64,
    pub increment: i64,
}

impl AutoIncrement {
    pub fn new(start: i64, increment: i64) -> Self {
        Self {
            current: start,
            start,
            increment,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ColumnDescriptor {
    /// The table, or stored statement for parameters, owning the column.
    pub reference_id: Uuid,
    pub name: String,
    /// 1-based.
    pub position: u32,
    pub type_descriptor: TypeDescriptor,
    pub default: Option<ColumnDefault>,
    pub default_id: Option<Uuid>,
    pub auto_increment: Option<AutoIncrement>,
}

impl ColumnDescriptor {
    pub fn new(
        reference_id: Uuid,
        name: impl Into<String>,
        position: u32,
        type_descriptor: TypeDescriptor,
    ) -> Self {
        Self {
            reference_id,
            name: name.into(),
            position,
            type_descriptor,
            default: None,
            default_id: None,
            auto_increment: None,
        }
    }

    pub fn with_default(mut self, default: ColumnDefault) -> Self {
        self.default = Some(default);
        self.default_id = Some(Uuid::new_v4());
        self
    }

    pub fn with_auto_increment(mut self, start: i64, increment: i64) -> Self {
        // zero increment marks a plain column
        self.auto_increment = (increment != 0).then(|| AutoIncrement::new(start, increment));
        self
    }

    pub fn is_auto_increment(&self) -> bool {
        self.auto_increment.is_some()
    }
}

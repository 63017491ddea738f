use def::{TypeDescriptor, Uuid};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceDescriptor {
    pub uuid: Uuid,
    pub name: String,
    pub schema_id: Uuid,
    pub data_type: TypeDescriptor,
    /// Next value to hand out; `None` once a non-cycling sequence is
    /// exhausted.
    pub current_value: Option<i64>,
    pub start: i64,
    pub min: i64,
    pub max: i64,
    pub increment: i64,
    pub cycle: bool,
}

impl SequenceDescriptor {
    /// A sequence with bounds taken from its integer type.
    pub fn new(
        name: impl Into<String>,
        schema_id: Uuid,
        data_type: TypeDescriptor,
        start: Option<i64>,
        increment: i64,
        cycle: bool,
    ) -> Self {
        let min = data_type.min_value().unwrap_or(i64::MIN);
        let max = data_type.max_value().unwrap_or(i64::MAX);
        let start = start.unwrap_or(if increment > 0 { min } else { max });

        Self {
            uuid: Uuid::new_v4(),
            name: name.into(),
            schema_id,
            data_type,
            current_value: Some(start),
            start,
            min,
            max,
            increment,
            cycle,
        }
    }
}

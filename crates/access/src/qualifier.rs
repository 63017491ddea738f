use {
    def::Value,
    std::cmp::Ordering,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Comparison {
    Eq,
    Lt,
    Le,
    Gt,
    Ge,
}

/// A single column predicate evaluated by the store during a scan.
#[derive(Debug, Clone, PartialEq)]
pub struct Qualifier {
    /// Zero-based position in the scanned row.
    pub column: usize,
    pub op: Comparison,
    pub operand: Value,
    pub negate: bool,
    /// When set, NULL takes part in the comparison as the lowest value.
    pub ordered_nulls: bool,
    /// Result returned when a NULL is compared and nulls are unordered.
    pub unknown_rv: bool,
}

impl Qualifier {
    pub fn new(column: usize, op: Comparison, operand: impl Into<Value>) -> Self {
        Self {
            column,
            op,
            operand: operand.into(),
            negate: false,
            ordered_nulls: false,
            unknown_rv: false,
        }
    }

    pub fn equals(column: usize, operand: impl Into<Value>) -> Self {
        Self::new(column, Comparison::Eq, operand)
    }

    pub fn negated(mut self) -> Self {
        self.negate = !self.negate;
        self
    }

    pub fn with_ordered_nulls(mut self) -> Self {
        self.ordered_nulls = true;
        self
    }

    pub fn matches(&self, row: &[Value]) -> bool {
        let column = match row.get(self.column) {
            Some(v) => v,
            None => return self.unknown_rv,
        };

        if !self.ordered_nulls && (column.is_null() || self.operand.is_null()) {
            return self.unknown_rv;
        }

        let ord = column.cmp(&self.operand);
        let result = match self.op {
            Comparison::Eq => ord == Ordering::Equal,
            Comparison::Lt => ord == Ordering::Less,
            Comparison::Le => ord != Ordering::Greater,
            Comparison::Gt => ord == Ordering::Greater,
            Comparison::Ge => ord != Ordering::Less,
        };

        result != self.negate
    }
}

/// Qualifiers in disjunctive form: the qualifiers of one inner list are
/// AND-ed, the inner lists are OR-ed. No lists means every row qualifies.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Qualifiers(Vec<Vec<Qualifier>>);

impl Qualifiers {
    pub fn none() -> Self {
        Self(vec![])
    }

    pub fn all_of(qualifiers: Vec<Qualifier>) -> Self {
        Self(vec![qualifiers])
    }

    pub fn any_of(rows: Vec<Vec<Qualifier>>) -> Self {
        Self(rows)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn matches(&self, row: &[Value]) -> bool {
        self.0.is_empty()
            || self
                .0
                .iter()
                .any(|conjunction| conjunction.iter().all(|q| q.matches(row)))
    }
}

impl From<Qualifier> for Qualifiers {
    fn from(qualifier: Qualifier) -> Self {
        Self::all_of(vec![qualifier])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn null_handling() {
        let row = [Value::Null, Value::Int(3)];

        assert!(!Qualifier::equals(0, 1).matches(&row));
        assert!(Qualifier { unknown_rv: true, ..Qualifier::equals(0, 1) }.matches(&row));
        assert!(Qualifier::new(0, Comparison::Lt, 1)
            .with_ordered_nulls()
            .matches(&row));
    }

    #[test]
    fn negation() {
        let row = [Value::Int(3)];
        assert!(Qualifier::equals(0, 4).negated().matches(&row));
        assert!(!Qualifier::equals(0, 3).negated().matches(&row));
        assert!(Qualifier::new(0, Comparison::Ge, 3).matches(&row));
    }

    #[test]
    fn and_within_or_across() {
        let row = [Value::String("A".into()), Value::Int(1)];

        let both = Qualifiers::all_of(vec![Qualifier::equals(0, "A"), Qualifier::equals(1, 2)]);
        assert!(!both.matches(&row));

        let either = Qualifiers::any_of(vec![
            vec![Qualifier::equals(0, "A"), Qualifier::equals(1, 2)],
            vec![Qualifier::equals(1, 1)],
        ]);
        assert!(either.matches(&row));
        assert!(Qualifiers::none().matches(&row));
    }
}

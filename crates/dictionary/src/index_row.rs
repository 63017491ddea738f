use {
    access::{IndexEntry, RowLocation},
    def::{TypeDescriptor, Value},
};

pub const BTREE: &str = "BTREE";

/// Describes how index rows are derived from base rows: which base columns
/// (1-based) form the key, their ordering and whether keys are unique.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexRowGenerator {
    pub index_type: String,
    pub unique: bool,
    pub base_columns: Vec<u32>,
    pub ascending: Vec<bool>,
}

impl IndexRowGenerator {
    pub fn btree(unique: bool, base_columns: &[u32]) -> Self {
        Self {
            index_type: BTREE.to_string(),
            unique,
            base_columns: base_columns.to_vec(),
            ascending: vec![true; base_columns.len()],
        }
    }

    pub fn column_count(&self) -> usize {
        self.base_columns.len()
    }

    /// Builds the index entry of a base row.
    pub fn index_row(&self, base_row: &[Value], location: RowLocation) -> IndexEntry {
        let key = self
            .base_columns
            .iter()
            .map(|&pos| {
                base_row
                    .get(pos as usize - 1)
                    .cloned()
                    .unwrap_or(Value::Null)
            })
            .collect();

        IndexEntry::new(key, location)
    }

    /// Key column types, taken from the base row format.
    pub fn key_format(&self, base_format: &[TypeDescriptor]) -> Vec<TypeDescriptor> {
        self.base_columns
            .iter()
            .filter_map(|&pos| base_format.get(pos as usize - 1).copied())
            .collect()
    }

    /// Whether an index built by `other` would hold the same entries, so the
    /// two can share one conglomerate.
    pub fn same_keying(&self, other: &IndexRowGenerator) -> bool {
        self.index_type == other.index_type
            && self.unique == other.unique
            && self.base_columns == other.base_columns
            && self.ascending == other.ascending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn projects_key_columns() {
        let generator = IndexRowGenerator::btree(true, &[3, 1]);
        let row = vec![Value::Int(1), Value::Int(2), Value::from("C")];
        let location = RowLocation::new(7, 3);

        let entry = generator.index_row(&row, location);
        assert_eq!(entry.key, vec![Value::from("C"), Value::Int(1)]);
        assert_eq!(entry.location, location);
    }

    #[test]
    fn keying() {
        let a = IndexRowGenerator::btree(false, &[1, 2]);
        assert!(a.same_keying(&IndexRowGenerator::btree(false, &[1, 2])));
        assert!(!a.same_keying(&IndexRowGenerator::btree(true, &[1, 2])));
        assert!(!a.same_keying(&IndexRowGenerator::btree(false, &[2, 1])));
    }
}

use {
    chrono::{DateTime, Utc},
    def::Uuid,
};

/// Cardinality statistics of the leading columns of an index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatisticsDescriptor {
    pub uuid: Uuid,
    /// Conglomerate descriptor of the index.
    pub reference_id: Uuid,
    pub table_id: Uuid,
    pub creation_timestamp: DateTime<Utc>,
    pub valid: bool,
    pub column_count: i32,
    pub row_estimate: i64,
    pub unique_rows: i64,
}

impl StatisticsDescriptor {
    /// Average number of rows sharing one key prefix.
    pub fn selectivity(&self) -> f64 {
        if self.row_estimate == 0 || self.unique_rows == 0 {
            return 0.1;
        }
        self.unique_rows as f64 / self.row_estimate as f64
    }
}

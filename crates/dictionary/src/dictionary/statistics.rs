use {
    super::DataDictionary,
    crate::{
        catalog::{statistics, CatalogNumber, RowFactory},
        descriptor::StatisticsDescriptor,
        error::{ObjectKind, Result},
        tab_info::ReadMode,
    },
    access::{Qualifiers, Transaction},
    def::{Uuid, Value},
};

impl DataDictionary {
    pub fn add_statistics_descriptor(
        &self,
        tc: &Transaction,
        sd: &StatisticsDescriptor,
    ) -> Result<()> {
        let row = statistics::SysStatisticsFactory::make_row(Some(sd), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysstatistics,
            row,
            ObjectKind::Statistics,
            &sd.uuid.to_string(),
            &sd.table_id.to_string(),
        )?;
        Ok(())
    }

    /// Statistics of a table's indexes. Read without waiting on locks, so a
    /// row deleted by a concurrent update of the statistics is skipped.
    pub fn get_statistics_descriptors(
        &self,
        tc: &Transaction,
        table_id: Uuid,
    ) -> Result<Vec<StatisticsDescriptor>> {
        self.fetch_descriptors::<statistics::SysStatisticsFactory>(
            tc,
            statistics::BY_REFERENCE,
            vec![Value::Uuid(table_id)],
            &Qualifiers::none(),
            None,
            ReadMode::ReadUncommittedAdvisory,
        )
    }

    /// Drops the statistics of one index of a table, or of all of them.
    pub fn drop_statistics_descriptors(
        &self,
        tc: &Transaction,
        table_id: Uuid,
        reference_id: Option<Uuid>,
    ) -> Result<usize> {
        let mut key = vec![Value::Uuid(table_id)];
        key.extend(reference_id.map(Value::Uuid));
        self.delete_via_index(tc, CatalogNumber::Sysstatistics, statistics::BY_REFERENCE, key)
    }
}

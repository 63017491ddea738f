use {
    super::{not_found, DataDictionary},
    crate::{
        catalog::{triggers, CatalogNumber, RowFactory},
        descriptor::{SchemaDescriptor, TableDescriptor, TriggerDescriptor},
        error::{ObjectKind, Result},
        trigger_rewrite::{find_transition_references, rewrite_trigger_action, RewrittenAction},
        version::DictionaryVersion,
    },
    access::Transaction,
    def::{Uuid, Value},
};

impl DataDictionary {
    pub fn add_trigger_descriptor(&self, tc: &Transaction, td: &TriggerDescriptor) -> Result<()> {
        if td.when_clause_text.is_some() {
            self.check_version(DictionaryVersion::V10_7, "WHEN clause in CREATE TRIGGER")?;
        }

        let row = triggers::SysTriggersFactory::make_row(Some(td), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Systriggers,
            row,
            ObjectKind::Trigger,
            &td.name,
            &td.schema_id.to_string(),
        )?;
        Ok(())
    }

    pub fn get_trigger_descriptor(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<TriggerDescriptor>> {
        self.descriptor_via_index::<triggers::SysTriggersFactory>(
            tc,
            triggers::BY_ID,
            vec![Value::Uuid(uuid)],
        )
    }

    pub fn get_trigger_descriptor_by_name(
        &self,
        tc: &Transaction,
        name: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Option<TriggerDescriptor>> {
        self.descriptor_via_index::<triggers::SysTriggersFactory>(
            tc,
            triggers::BY_NAME,
            vec![Value::from(name), Value::Uuid(schema.uuid)],
        )
    }

    /// Triggers on a table in the order they were created, which is the
    /// order they fire in.
    pub fn get_trigger_descriptors(
        &self,
        tc: &Transaction,
        table_id: Uuid,
    ) -> Result<Vec<TriggerDescriptor>> {
        let mut list = self.descriptors_via_index::<triggers::SysTriggersFactory>(
            tc,
            triggers::BY_TABLE,
            vec![Value::Uuid(table_id)],
        )?;
        list.sort_by_key(|td| td.creation_timestamp);
        Ok(list)
    }

    pub fn drop_trigger_descriptor(&self, tc: &Transaction, td: &TriggerDescriptor) -> Result<()> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Systriggers,
            triggers::BY_ID,
            vec![Value::Uuid(td.uuid)],
        )?;
        if deleted == 0 {
            return Err(not_found(ObjectKind::Trigger, td.name.as_str()));
        }
        Ok(())
    }

    /// Rewrites a row trigger's action so that references to the OLD and
    /// NEW transition rows read the fire-time row positionally, and works
    /// out which columns that row must carry.
    pub fn get_trigger_action_text(
        &self,
        table: &TableDescriptor,
        action: &str,
        old_name: Option<&str>,
        new_name: Option<&str>,
        trigger_columns: &[u32],
    ) -> Result<RewrittenAction> {
        let references = find_transition_references(action, old_name, new_name);
        rewrite_trigger_action(action, &references, table, old_name, trigger_columns)
    }
}

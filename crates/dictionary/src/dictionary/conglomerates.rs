use {
    super::{not_found, DataDictionary},
    crate::{
        catalog::{conglomerates, CatalogNumber, RowFactory},
        descriptor::{ConglomerateDescriptor, SchemaDescriptor},
        error::{ObjectKind, Result},
        tab_info::column_equals,
    },
    access::{ConglomerateId, Qualifiers, Transaction},
    def::{Uuid, Value},
    tracing::debug,
};

impl DataDictionary {
    pub fn add_conglomerate_descriptor(
        &self,
        tc: &Transaction,
        cd: &ConglomerateDescriptor,
    ) -> Result<()> {
        let row = conglomerates::SysConglomeratesFactory::make_row(Some(cd), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysconglomerates,
            row,
            ObjectKind::Conglomerate,
            &cd.name,
            &cd.schema_id.to_string(),
        )?;
        self.evict_table(cd.table_id);
        debug!(conglomerate = cd.number, name = %cd.name, "added conglomerate");
        Ok(())
    }

    pub fn get_conglomerate_descriptor(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<ConglomerateDescriptor>> {
        Ok(self
            .get_conglomerate_descriptors_by_id(tc, uuid)?
            .into_iter()
            .next())
    }

    pub fn get_conglomerate_descriptors_by_id(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Vec<ConglomerateDescriptor>> {
        self.descriptors_via_index::<conglomerates::SysConglomeratesFactory>(
            tc,
            conglomerates::BY_ID,
            vec![Value::Uuid(uuid)],
        )
    }

    /// Every descriptor of a physical conglomerate. Duplicate indexes share
    /// one conglomerate, so there may be several.
    pub fn get_conglomerate_descriptors(
        &self,
        tc: &Transaction,
        number: ConglomerateId,
    ) -> Result<Vec<ConglomerateDescriptor>> {
        self.descriptors_via_heap::<conglomerates::SysConglomeratesFactory>(
            tc,
            Qualifiers::all_of(vec![column_equals(
                conglomerates::CONGLOMERATENUMBER,
                Value::BigInt(number),
            )]),
        )
    }

    pub fn get_conglomerate_descriptor_by_number(
        &self,
        tc: &Transaction,
        number: ConglomerateId,
    ) -> Result<Option<ConglomerateDescriptor>> {
        Ok(self.get_conglomerate_descriptors(tc, number)?.into_iter().next())
    }

    pub fn get_conglomerate_descriptor_by_name(
        &self,
        tc: &Transaction,
        name: &str,
        schema: &SchemaDescriptor,
    ) -> Result<Option<ConglomerateDescriptor>> {
        self.descriptor_via_index::<conglomerates::SysConglomeratesFactory>(
            tc,
            conglomerates::BY_NAME,
            vec![Value::from(name), Value::Uuid(schema.uuid)],
        )
    }

    pub fn get_conglomerate_descriptors_by_table(
        &self,
        tc: &Transaction,
        table_id: Uuid,
    ) -> Result<Vec<ConglomerateDescriptor>> {
        self.descriptors_via_index::<conglomerates::SysConglomeratesFactory>(
            tc,
            conglomerates::BY_TABLE,
            vec![Value::Uuid(table_id)],
        )
    }

    pub fn drop_conglomerate_descriptor(
        &self,
        tc: &Transaction,
        cd: &ConglomerateDescriptor,
    ) -> Result<()> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysconglomerates,
            conglomerates::BY_NAME,
            vec![Value::from(cd.name.as_str()), Value::Uuid(cd.schema_id)],
        )?;
        self.evict_table(cd.table_id);
        if deleted == 0 {
            return Err(not_found(ObjectKind::Conglomerate, cd.name.as_str()));
        }
        Ok(())
    }

    pub fn drop_all_conglomerate_descriptors(
        &self,
        tc: &Transaction,
        table_id: Uuid,
    ) -> Result<usize> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysconglomerates,
            conglomerates::BY_TABLE,
            vec![Value::Uuid(table_id)],
        )?;
        self.evict_table(table_id);
        Ok(deleted)
    }

    /// Points descriptors at a new physical conglomerate, as after a
    /// compress rebuilt it.
    pub fn update_conglomerate_descriptor(
        &self,
        tc: &Transaction,
        descriptors: &[ConglomerateDescriptor],
        new_number: ConglomerateId,
    ) -> Result<()> {
        let ti = self.catalog(tc, CatalogNumber::Sysconglomerates)?;
        for cd in descriptors {
            let updated = ti.update_rows(
                tc,
                conglomerates::BY_NAME,
                vec![Value::from(cd.name.as_str()), Value::Uuid(cd.schema_id)],
                &Qualifiers::none(),
                |row| {
                    row[conglomerates::CONGLOMERATENUMBER - 1] = Value::BigInt(new_number);
                    Ok(())
                },
            )?;
            self.evict_table(cd.table_id);
            if updated == 0 {
                return Err(not_found(ObjectKind::Conglomerate, cd.name.as_str()));
            }
        }
        Ok(())
    }
}

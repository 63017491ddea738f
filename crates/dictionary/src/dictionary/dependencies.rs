use {
    super::DataDictionary,
    crate::{
        catalog::{depends, CatalogNumber, RowFactory},
        descriptor::DependencyDescriptor,
        error::{ObjectKind, Result},
        tab_info::{column_equals, ReadMode},
    },
    access::{Qualifiers, Transaction},
    def::{Uuid, Value},
};

fn provider_filter(provider_id: Uuid) -> Qualifiers {
    Qualifiers::all_of(vec![column_equals(depends::PROVIDERID, Value::Uuid(provider_id))])
}

impl DataDictionary {
    /// Records that `dd.dependent_id` depends on `dd.provider_id`. Recording
    /// the same pair twice is a no-op.
    pub fn add_dependency_descriptor(
        &self,
        tc: &Transaction,
        dd: &DependencyDescriptor,
    ) -> Result<()> {
        let existing = self.fetch_descriptors::<depends::SysDependsFactory>(
            tc,
            depends::BY_DEPENDENT,
            vec![Value::Uuid(dd.dependent_id)],
            &provider_filter(dd.provider_id),
            None,
            ReadMode::RepeatableRead,
        )?;
        if !existing.is_empty() {
            return Ok(());
        }

        let row = depends::SysDependsFactory::make_row(Some(dd), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysdepends,
            row,
            ObjectKind::Dependency,
            &dd.dependent_id.to_string(),
            &dd.provider_id.to_string(),
        )?;
        Ok(())
    }

    /// Everything that depends on `provider_id`.
    pub fn get_dependents_descriptor_list(
        &self,
        tc: &Transaction,
        provider_id: Uuid,
    ) -> Result<Vec<DependencyDescriptor>> {
        self.descriptors_via_index::<depends::SysDependsFactory>(
            tc,
            depends::BY_PROVIDER,
            vec![Value::Uuid(provider_id)],
        )
    }

    /// Everything `dependent_id` depends on.
    pub fn get_providers_descriptor_list(
        &self,
        tc: &Transaction,
        dependent_id: Uuid,
    ) -> Result<Vec<DependencyDescriptor>> {
        self.descriptors_via_index::<depends::SysDependsFactory>(
            tc,
            depends::BY_DEPENDENT,
            vec![Value::Uuid(dependent_id)],
        )
    }

    pub fn get_all_dependency_descriptors_list(
        &self,
        tc: &Transaction,
    ) -> Result<Vec<DependencyDescriptor>> {
        self.descriptors_via_heap::<depends::SysDependsFactory>(tc, Qualifiers::none())
    }

    /// Removes one dependent/provider pair.
    pub fn drop_stored_dependency(
        &self,
        tc: &Transaction,
        dd: &DependencyDescriptor,
    ) -> Result<usize> {
        self.catalog(tc, CatalogNumber::Sysdepends)?.delete_rows(
            tc,
            depends::BY_DEPENDENT,
            vec![Value::Uuid(dd.dependent_id)],
            &provider_filter(dd.provider_id),
        )
    }

    /// Removes every dependency of `dependent_id`.
    pub fn drop_dependents_stored_dependencies(
        &self,
        tc: &Transaction,
        dependent_id: Uuid,
    ) -> Result<usize> {
        self.delete_via_index(
            tc,
            CatalogNumber::Sysdepends,
            depends::BY_DEPENDENT,
            vec![Value::Uuid(dependent_id)],
        )
    }
}

use {
    super::{not_found, DataDictionary},
    crate::{
        catalog::{views, CatalogNumber, RowFactory},
        descriptor::ViewDescriptor,
        error::{ObjectKind, Result},
    },
    access::Transaction,
    def::{Uuid, Value},
};

impl DataDictionary {
    /// Records a view definition. The view's table descriptor is added
    /// separately, under the same UUID.
    pub fn add_view_descriptor(&self, tc: &Transaction, vd: &ViewDescriptor) -> Result<()> {
        let row = views::SysViewsFactory::make_row(Some(vd), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysviews,
            row,
            ObjectKind::View,
            &vd.uuid.to_string(),
            "",
        )?;
        Ok(())
    }

    pub fn get_view_descriptor(
        &self,
        tc: &Transaction,
        table_id: Uuid,
    ) -> Result<Option<ViewDescriptor>> {
        self.descriptor_via_index::<views::SysViewsFactory>(
            tc,
            views::BY_ID,
            vec![Value::Uuid(table_id)],
        )
    }

    pub fn drop_view_descriptor(&self, tc: &Transaction, vd: &ViewDescriptor) -> Result<()> {
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Sysviews,
            views::BY_ID,
            vec![Value::Uuid(vd.uuid)],
        )?;
        if deleted == 0 {
            return Err(not_found(ObjectKind::View, vd.uuid.to_string()));
        }
        Ok(())
    }
}

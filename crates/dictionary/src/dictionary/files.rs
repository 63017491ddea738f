use {
    super::{not_found, DataDictionary},
    crate::{
        catalog::{files, CatalogNumber, RowFactory},
        descriptor::{FileInfoDescriptor, SchemaDescriptor},
        error::{ObjectKind, Result},
    },
    access::Transaction,
    def::{Uuid, Value},
};

impl DataDictionary {
    /// Records a jar file installed into a schema.
    pub fn add_file_info_descriptor(
        &self,
        tc: &Transaction,
        fd: &FileInfoDescriptor,
        schema: &SchemaDescriptor,
    ) -> Result<()> {
        let row = files::SysFilesFactory::make_row(Some(fd), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Sysfiles,
            row,
            ObjectKind::File,
            &fd.name,
            &schema.name,
        )?;
        Ok(())
    }

    pub fn get_file_info_descriptor(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<FileInfoDescriptor>> {
        let key = vec![Value::Uuid(uuid)];
        self.descriptor_via_index::<files::SysFilesFactory>(tc, files::BY_ID, key)
    }

    pub fn get_file_info_descriptor_by_name(
        &self,
        tc: &Transaction,
        schema: &SchemaDescriptor,
        name: &str,
    ) -> Result<Option<FileInfoDescriptor>> {
        self.descriptor_via_index::<files::SysFilesFactory>(
            tc,
            files::BY_NAME,
            vec![Value::from(name), Value::Uuid(schema.uuid)],
        )
    }

    pub fn drop_file_info_descriptor(
        &self,
        tc: &Transaction,
        fd: &FileInfoDescriptor,
    ) -> Result<()> {
        let key = vec![Value::Uuid(fd.uuid)];
        let deleted = self.delete_via_index(tc, CatalogNumber::Sysfiles, files::BY_ID, key)?;
        if deleted == 0 {
            return Err(not_found(ObjectKind::File, fd.name.as_str()));
        }
        Ok(())
    }
}

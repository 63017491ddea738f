use {
    super::{
        ensure_width, opt, payload_value, req, CatalogDef, CatalogNumber, IndexDef, RowFactory,
        RowReader, BOOLEAN, CHAR, IDENTIFIER, PAYLOAD, TEXT, UUID,
    },
    crate::{
        descriptor::{AliasDescriptor, AliasInfo, AliasType},
        error::{InvalidRowSnafu, Result},
        version::DictionaryVersion,
    },
    def::{Row, Value},
    snafu::prelude::*,
};

catalog_columns! {
    ALIASID = 1, req(UUID);
    ALIAS = 2, req(IDENTIFIER);
    SCHEMAID = 3, req(UUID);
    JAVACLASSNAME = 4, req(TEXT);
    ALIASTYPE = 5, req(CHAR);
    NAMESPACE = 6, req(CHAR);
    SYSTEMALIAS = 7, req(BOOLEAN);
    ALIASINFO = 8, opt(PAYLOAD);
    SPECIFICNAME = 9, req(IDENTIFIER);
}

pub const BY_NAME: usize = 0;
pub const BY_ID: usize = 1;
pub const BY_SPECIFIC_NAME: usize = 2;

pub static DEF: CatalogDef = CatalogDef {
    number: CatalogNumber::Sysaliases,
    name: "SYSALIASES",
    columns: COLUMNS,
    indexes: &[
        IndexDef::unique(&[SCHEMAID as u32, ALIAS as u32, NAMESPACE as u32]),
        IndexDef::unique(&[ALIASID as u32]),
        IndexDef::unique(&[SCHEMAID as u32, SPECIFICNAME as u32]),
    ],
    since: DictionaryVersion::V10_0,
};

pub struct SysAliasesFactory;

impl RowFactory for SysAliasesFactory {
    type Descriptor = AliasDescriptor;
    type Parent = ();

    fn def() -> &'static CatalogDef {
        &DEF
    }

    fn make_row(descriptor: Option<&AliasDescriptor>, _: Option<&()>) -> Result<Row> {
        let Some(ad) = descriptor else {
            return Ok(DEF.null_row());
        };

        Ok(vec![
            Value::Uuid(ad.uuid),
            Value::from(ad.name.as_str()),
            Value::Uuid(ad.schema_id),
            Value::from(ad.java_class_name.as_str()),
            Value::from(ad.alias_type.as_char()),
            Value::from(ad.namespace().as_char()),
            Value::Boolean(ad.system),
            payload_value(&DEF, &ad.info)?,
            Value::from(ad.specific_name.as_str()),
        ])
    }

    fn build_descriptor(row: &Row, _: Option<&()>) -> Result<AliasDescriptor> {
        ensure_width(&DEF, row)?;
        let r = RowReader::new(&DEF, row);

        let alias_type = r.coded(ALIASTYPE, AliasType::from_char)?;
        let info: AliasInfo = r.payload(ALIASINFO)?;
        let consistent = matches!(
            (alias_type, &info),
            (AliasType::Procedure | AliasType::Function, AliasInfo::Routine(_))
                | (AliasType::Synonym, AliasInfo::Synonym { .. })
                | (AliasType::UserDefinedType, AliasInfo::UserType { .. })
        );
        ensure!(
            consistent,
            InvalidRowSnafu {
                catalog: DEF.name,
                details: format!("alias info does not match alias type {:?}", alias_type),
            }
        );

        Ok(AliasDescriptor {
            uuid: r.uuid(ALIASID)?,
            name: r.string(ALIAS)?,
            schema_id: r.uuid(SCHEMAID)?,
            java_class_name: r.string(JAVACLASSNAME)?,
            alias_type,
            system: r.bool(SYSTEMALIAS)?,
            info,
            specific_name: r.string(SPECIFICNAME)?,
        })
    }
}

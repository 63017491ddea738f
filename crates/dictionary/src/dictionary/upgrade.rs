use {
    super::DataDictionary,
    crate::{
        catalog::{columns, CatalogNumber},
        descriptor::{ColumnDescriptor, SYSTEM_UTIL_SCHEMA_UUID},
        error::{InternalSnafu, Result},
        routines,
        version::{DictionaryVersion, CORE_VERSION_PROPERTY},
    },
    access::{ConglomerateKind, Qualifiers, Transaction},
    tracing::{debug, info},
};

impl DataDictionary {
    /// Brings an older dictionary up to the current version. Without the
    /// `upgrade` property the database stays in soft upgrade: nothing on
    /// disk changes and newer features are refused. Returns whether the
    /// catalogs were changed.
    pub(super) fn upgrade(&mut self, tc: &Transaction) -> Result<bool> {
        let from = self.version;
        if from >= DictionaryVersion::CURRENT {
            return Ok(false);
        }
        if !self.config.upgrade {
            info!(version = %from, "running in soft upgrade mode");
            return Ok(false);
        }

        info!(from = %from, to = %DictionaryVersion::CURRENT, "upgrading data dictionary");
        if self.version < DictionaryVersion::V10_1 {
            self.version = DictionaryVersion::V10_1;
            self.add_core_index(tc, CatalogNumber::Syscolumns, columns::BY_DEFAULT_ID)?;
        }
        if self.version < DictionaryVersion::V10_2 {
            self.version = DictionaryVersion::V10_2;
            for number in [
                CatalogNumber::Systableperms,
                CatalogNumber::Syscolperms,
                CatalogNumber::Sysroutineperms,
            ] {
                self.create_catalog(tc, number.def())?;
            }
            self.grant_public_routines(tc, from)?;
        }
        if self.version < DictionaryVersion::V10_4 {
            self.version = DictionaryVersion::V10_4;
            self.create_catalog(tc, CatalogNumber::Sysroles.def())?;
        }
        if self.version < DictionaryVersion::V10_6 {
            self.version = DictionaryVersion::V10_6;
            self.create_catalog(tc, CatalogNumber::Syssequences.def())?;
            self.create_catalog(tc, CatalogNumber::Sysperms.def())?;
        }
        if self.version < DictionaryVersion::V10_7 {
            let before = self.version;
            self.version = DictionaryVersion::V10_7;
            self.rebuild_catalog(tc, CatalogNumber::Systriggers, before)?;
        }

        self.create_system_routines(
            tc,
            routines::routines_added_between(from, DictionaryVersion::CURRENT),
        )?;
        tc.set_property(CORE_VERSION_PROPERTY, self.version.to_property())?;
        self.clear_caches()?;

        info!(version = %self.version, "upgraded data dictionary");
        Ok(true)
    }

    /// Grants PUBLIC execute on allow-listed routines that predate routine
    /// grants.
    fn grant_public_routines(&self, tc: &Transaction, from: DictionaryVersion) -> Result<()> {
        let existing = routines::system_routines()
            .filter(|r| r.since <= from && routines::is_public_routine(r));
        for routine in existing {
            let found = self.get_alias_descriptor_by_name(
                tc,
                SYSTEM_UTIL_SCHEMA_UUID,
                routine.name,
                routine.alias_type(),
            )?;
            if let Some(ad) = found {
                self.grant_public_execute(tc, ad.uuid)?;
            }
        }
        Ok(())
    }

    /// Adds an index introduced by a later version to a core catalog and
    /// fills it from the existing rows.
    fn add_core_index(
        &mut self,
        tc: &Transaction,
        number: CatalogNumber,
        index: usize,
    ) -> Result<()> {
        let def = number.def();
        let ti = &self.tab_infos[number.index()];
        let mut conglomerates = ti.conglomerates()?.clone();

        let id = tc.create_conglomerate(
            ConglomerateKind::BTree {
                unique: def.indexes[index].unique,
            },
            def.index_format(index),
        )?;
        let generator = def.index_row_generator(index);
        let controller = tc.open_conglomerate(id)?;
        let rows = ti.fetch_via_heap(tc, Qualifiers::none(), None)?;
        for (location, row) in &rows {
            controller.insert_entry(generator.index_row(row, *location))?;
        }

        conglomerates.indexes[index] = Some(id);
        self.write_boot_parameters(tc, def, &conglomerates)?;
        let ti = &mut self.tab_infos[number.index()];
        ti.reset();
        ti.set_conglomerates(conglomerates);
        self.add_catalog_index_descriptor(tc, def, index, id)?;

        debug!(catalog = def.name, index, rows = rows.len(), "added catalog index");
        Ok(())
    }

    /// Copies a catalog into conglomerates of the current format, which
    /// adds the columns introduced after `before`.
    fn rebuild_catalog(
        &mut self,
        tc: &Transaction,
        number: CatalogNumber,
        before: DictionaryVersion,
    ) -> Result<()> {
        let def = number.def();
        let ti = self.catalog(tc, number)?;
        let old = ti.conglomerates()?.clone();
        let rows = ti.fetch_via_heap(tc, Qualifiers::none(), None)?;

        let new = self.create_catalog_conglomerates(tc, def)?;
        let ti = &mut self.tab_infos[number.index()];
        ti.reset();
        ti.set_conglomerates(new.clone());
        let count = rows.len();
        let rows = rows.into_iter().map(|(_, row)| row);
        if let Some((row, index)) = self.tab_infos[number.index()].insert_rows(tc, rows)? {
            return InternalSnafu {
                details: format!(
                    "{} row {} is a duplicate in index {} while rebuilding",
                    def.name, row, index
                ),
            }
            .fail();
        }

        for cd in self.get_conglomerate_descriptors_by_table(tc, def.table_id())? {
            let number = if cd.is_index {
                (0..def.index_count())
                    .find(|i| def.index_name(*i) == cd.name)
                    .and_then(|i| new.indexes[i])
            } else {
                Some(new.heap)
            };
            if let Some(number) = number {
                self.update_conglomerate_descriptor(tc, &[cd], number)?;
            }
        }
        for (i, index) in new.indexes.iter().enumerate() {
            if let (None, Some(number)) = (old.indexes[i], index) {
                self.add_catalog_index_descriptor(tc, def, i, *number)?;
            }
        }

        let added = def
            .columns
            .iter()
            .filter(|c| c.since > before && c.since <= self.version)
            .map(|c| ColumnDescriptor::new(def.table_id(), c.name, c.position as u32, c.ty))
            .collect::<Vec<_>>();
        self.add_column_descriptors(tc, &added)?;

        tc.drop_conglomerate(old.heap)?;
        for index in old.indexes.into_iter().flatten() {
            tc.drop_conglomerate(index)?;
        }

        debug!(catalog = def.name, rows = count, heap = new.heap, "rebuilt catalog");
        Ok(())
    }
}

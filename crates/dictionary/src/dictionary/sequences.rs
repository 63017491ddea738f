use {
    super::{not_found, DataDictionary},
    crate::{
        cache::BoundedCache,
        catalog::{sequences, CatalogNumber, RowFactory},
        descriptor::SequenceDescriptor,
        error::{InternalSnafu, ObjectKind, Result},
        generator::{GeneratorTarget, SequenceGenerator},
        version::DictionaryVersion,
    },
    access::{Qualifiers, Transaction},
    def::{Uuid, Value},
    snafu::OptionExt,
    std::sync::Arc,
    tracing::{debug, warn},
};

impl DataDictionary {
    pub fn add_sequence_descriptor(
        &self,
        tc: &Transaction,
        seq: &SequenceDescriptor,
    ) -> Result<()> {
        self.check_version(DictionaryVersion::V10_6, "CREATE SEQUENCE")?;
        let row = sequences::SysSequencesFactory::make_row(Some(seq), None)?;
        self.insert_catalog_row(
            tc,
            CatalogNumber::Syssequences,
            row,
            ObjectKind::Sequence,
            &seq.name,
            &seq.schema_id.to_string(),
        )?;
        Ok(())
    }

    pub fn get_sequence_descriptor(
        &self,
        tc: &Transaction,
        uuid: Uuid,
    ) -> Result<Option<SequenceDescriptor>> {
        if self.version < DictionaryVersion::V10_6 {
            return Ok(None);
        }
        self.descriptor_via_index::<sequences::SysSequencesFactory>(
            tc,
            sequences::BY_ID,
            vec![Value::Uuid(uuid)],
        )
    }

    pub fn get_sequence_descriptor_by_name(
        &self,
        tc: &Transaction,
        schema_id: Uuid,
        name: &str,
    ) -> Result<Option<SequenceDescriptor>> {
        if self.version < DictionaryVersion::V10_6 {
            return Ok(None);
        }
        self.descriptor_via_index::<sequences::SysSequencesFactory>(
            tc,
            sequences::BY_NAME,
            vec![Value::Uuid(schema_id), Value::from(name)],
        )
    }

    /// Drops a sequence. Its cached generator is discarded unflushed, as
    /// there is no row left to return values to.
    pub fn drop_sequence_descriptor(
        &self,
        tc: &Transaction,
        seq: &SequenceDescriptor,
    ) -> Result<()> {
        let _gate = self.generator_gate.lock();
        if let Some(generator) = self.sequences.remove(&seq.uuid) {
            generator.retire();
        }
        let deleted = self.delete_via_index(
            tc,
            CatalogNumber::Syssequences,
            sequences::BY_ID,
            vec![Value::Uuid(seq.uuid)],
        )?;
        if deleted == 0 {
            return Err(not_found(ObjectKind::Sequence, seq.name.as_str()));
        }
        Ok(())
    }

    /// NEXT VALUE FOR a sequence.
    pub fn get_next_sequence_value(&self, tc: &Transaction, uuid: Uuid) -> Result<i64> {
        self.next_generated_value(tc, &self.sequences, uuid, || {
            self.sequence_generator(tc, uuid)
        })
    }

    /// Issues the next value of the generator stored under `key`, loading
    /// it through `load` when it is not cached. Loads happen under the
    /// generator gate so two sessions never start from the same catalog
    /// value.
    pub(super) fn next_generated_value(
        &self,
        tc: &Transaction,
        cache: &BoundedCache<Uuid, Arc<SequenceGenerator>>,
        key: Uuid,
        load: impl Fn() -> Result<SequenceGenerator>,
    ) -> Result<i64> {
        // read before the gate: clearing caches holds the coordinator while
        // it waits for the gate
        let cached = self.caches_trusted() && cache.is_enabled();

        if !cached {
            let _gate = self.generator_gate.lock();
            self.flush_cached_generator(cache, &key)?;
            let generator = load()?;
            let issued = generator.next_value(1, |stored| {
                self.persist_generator_value(tc, generator.target(), stored)
            })?;
            return issued.context(InternalSnafu {
                details: format!("generator {} retired while loading", generator.name()),
            });
        }

        loop {
            let generator = match cache.get(&key) {
                Some(g) => g,
                None => {
                    let _gate = self.generator_gate.lock();
                    match cache.get(&key) {
                        Some(g) => g,
                        None => {
                            let g = Arc::new(load()?);
                            if let Some((_, evicted)) = cache.put(key, g.clone()) {
                                self.flush_generators(vec![evicted])?;
                            }
                            g
                        }
                    }
                }
            };

            let issued = generator.next_value(self.config.sequence_preallocation, |stored| {
                self.persist_generator_value(tc, generator.target(), stored)
            })?;
            match issued {
                Some(value) => return Ok(value),
                None => debug!(generator = %generator.name(), "reloading retired generator"),
            }
        }
    }

    /// Hands back and retires the cached generator under `key`, so the
    /// catalog row can be read or written directly. The caller holds the
    /// generator gate.
    pub(super) fn flush_cached_generator(
        &self,
        cache: &BoundedCache<Uuid, Arc<SequenceGenerator>>,
        key: &Uuid,
    ) -> Result<bool> {
        match cache.remove(key) {
            Some(generator) => {
                self.flush_generators(vec![generator])?;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    /// The value NEXT VALUE FOR would return, without consuming it. `None`
    /// once the sequence is exhausted.
    pub fn peek_at_sequence(&self, tc: &Transaction, uuid: Uuid) -> Result<Option<i64>> {
        if let Some(g) = self.sequences.get(&uuid) {
            return Ok(g.peek());
        }
        let seq = self
            .get_sequence_descriptor(tc, uuid)?
            .ok_or_else(|| not_found(ObjectKind::Sequence, uuid.to_string()))?;
        Ok(seq.current_value)
    }

    fn sequence_generator(&self, tc: &Transaction, uuid: Uuid) -> Result<SequenceGenerator> {
        let seq = self
            .get_sequence_descriptor(tc, uuid)?
            .ok_or_else(|| not_found(ObjectKind::Sequence, uuid.to_string()))?;
        debug!(sequence = %seq.name, current = ?seq.current_value, "created sequence generator");

        SequenceGenerator::new(
            seq.name,
            GeneratorTarget::Sequence(uuid),
            seq.current_value,
            seq.increment,
            seq.min,
            seq.max,
            seq.cycle,
        )
    }

    /// Flushes generators leaving the cache in a transaction of their own.
    /// Every generator is attempted; the first failure is returned.
    pub(super) fn flush_generators(&self, generators: Vec<Arc<SequenceGenerator>>) -> Result<()> {
        if generators.is_empty() {
            return Ok(());
        }

        let tc = self.manager.begin();
        let mut first_error = None;
        for generator in generators {
            let flushed = generator.flush(self.config.flush_policy, |stored| {
                self.write_generator_value(&tc, generator.target(), stored)
            });
            if let Err(e) = flushed {
                warn!(generator = %generator.name(), error = %e, "failed to flush generator");
                first_error.get_or_insert(e);
            }
        }

        match first_error {
            None => Ok(tc.commit()?),
            Some(e) => {
                tc.abort()?;
                Err(e)
            }
        }
    }

    /// Records a generator's reserved range. The write commits on its own
    /// so values handed out stay consumed even if the user transaction
    /// rolls back.
    pub(super) fn persist_generator_value(
        &self,
        tc: &Transaction,
        target: &GeneratorTarget,
        stored: Option<i64>,
    ) -> Result<()> {
        let nested = tc.start_nested();
        match self.write_generator_value(&nested, target, stored) {
            Ok(()) => Ok(nested.commit()?),
            Err(e) => {
                nested.abort()?;
                Err(e)
            }
        }
    }

    fn write_generator_value(
        &self,
        tc: &Transaction,
        target: &GeneratorTarget,
        stored: Option<i64>,
    ) -> Result<()> {
        match target {
            GeneratorTarget::Sequence(uuid) => {
                let updated = self.catalog(tc, CatalogNumber::Syssequences)?.update_rows(
                    tc,
                    sequences::BY_ID,
                    vec![Value::Uuid(*uuid)],
                    &Qualifiers::none(),
                    |row| {
                        row[sequences::CURRENTVALUE - 1] =
                            stored.map_or(Value::Null, Value::BigInt);
                        Ok(())
                    },
                )?;
                if updated == 0 {
                    return Err(not_found(ObjectKind::Sequence, uuid.to_string()));
                }
                Ok(())
            }
            GeneratorTarget::Identity { table_id, column } => {
                self.write_identity_value(tc, *table_id, column, stored)
            }
        }
    }
}

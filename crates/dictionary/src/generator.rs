use {
    crate::{
        config::FlushPolicy,
        error::{InternalSnafu, Result, SequenceExhaustedSnafu},
    },
    snafu::ensure,
    def::Uuid,
    parking_lot::Mutex,
    tracing::debug,
};

/// Where a generator keeps its persistent current value.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum GeneratorTarget {
    /// SYSSEQUENCES.CURRENTVALUE of a sequence.
    Sequence(Uuid),
    /// SYSCOLUMNS.AUTOINCREMENTVALUE of an identity column.
    Identity { table_id: Uuid, column: String },
}

#[derive(Debug)]
struct GeneratorState {
    /// Next value to hand out, `None` once exhausted.
    next: Option<i64>,
    /// Values left in the range already recorded in the catalog.
    reserved: i64,
    /// Set once the generator has been flushed or dropped. A retired
    /// generator no longer speaks for the catalog and issues nothing.
    retired: bool,
}

/// Hands out the values of a sequence or identity column. Ranges of values
/// are reserved in the catalog ahead of use, so most calls do not write.
#[derive(Debug)]
pub struct SequenceGenerator {
    name: String,
    target: GeneratorTarget,
    increment: i64,
    min: i64,
    max: i64,
    cycle: bool,
    state: Mutex<GeneratorState>,
}

impl SequenceGenerator {
    pub fn new(
        name: impl Into<String>,
        target: GeneratorTarget,
        current: Option<i64>,
        increment: i64,
        min: i64,
        max: i64,
        cycle: bool,
    ) -> Result<Self> {
        let name = name.into();
        ensure!(
            increment != 0,
            InternalSnafu {
                details: format!("generator {} has a zero increment", name),
            }
        );

        Ok(Self {
            name,
            target,
            increment,
            min,
            max,
            cycle,
            state: Mutex::new(GeneratorState {
                next: current,
                reserved: 0,
                retired: false,
            }),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn target(&self) -> &GeneratorTarget {
        &self.target
    }

    /// The value the next call would return.
    pub fn peek(&self) -> Option<i64> {
        self.state.lock().next
    }

    fn in_bounds(&self, v: i128) -> bool {
        (self.min as i128..=self.max as i128).contains(&v)
    }

    fn wrap_value(&self) -> i64 {
        if self.increment > 0 {
            self.min
        } else {
            self.max
        }
    }

    /// Value that follows `v`, wrapping or exhausting at the bound.
    fn successor(&self, v: i64) -> Option<i64> {
        let next = v as i128 + self.increment as i128;
        if self.in_bounds(next) {
            Some(next as i64)
        } else if self.cycle {
            Some(self.wrap_value())
        } else {
            None
        }
    }

    /// How many values starting at `from` fit before the bound, capped by
    /// `preallocation`.
    fn range_len(&self, from: i64, preallocation: i64) -> i64 {
        let step = self.increment as i128;
        let room = if step > 0 {
            (self.max as i128 - from as i128) / step
        } else {
            (from as i128 - self.min as i128) / -step
        };
        (room + 1).clamp(1, preallocation.max(1) as i128) as i64
    }

    /// Returns the next value. When the reserved range is used up a new one
    /// is recorded through `persist`, which receives the value the catalog
    /// should hold after the range. `None` means the generator was retired
    /// and the caller has to load a fresh one from the catalog.
    pub fn next_value(
        &self,
        preallocation: i64,
        persist: impl FnOnce(Option<i64>) -> Result<()>,
    ) -> Result<Option<i64>> {
        let mut state = self.state.lock();
        if state.retired {
            return Ok(None);
        }
        let Some(value) = state.next else {
            return SequenceExhaustedSnafu {
                name: self.name.clone(),
            }
            .fail();
        };

        if state.reserved == 0 {
            let count = self.range_len(value, preallocation);
            let end = value as i128 + count as i128 * self.increment as i128;
            let stored = if self.in_bounds(end) {
                Some(end as i64)
            } else if self.cycle {
                Some(self.wrap_value())
            } else {
                None
            };

            persist(stored)?;
            debug!(generator = %self.name, from = value, count, "reserved values");
            state.reserved = count;
        }

        state.reserved -= 1;
        state.next = self.successor(value);
        Ok(Some(value))
    }

    /// Gives back the unused part of the reserved range and retires the
    /// generator. With `ReturnUnused` the catalog is rewound to the next
    /// unissued value. The generator is retired even when that write
    /// fails, since the catalog still holds the end of the reserved range.
    pub fn flush(
        &self,
        policy: FlushPolicy,
        persist: impl FnOnce(Option<i64>) -> Result<()>,
    ) -> Result<()> {
        let mut state = self.state.lock();
        let returned = if state.reserved > 0 && policy == FlushPolicy::ReturnUnused {
            persist(state.next)
        } else {
            Ok(())
        };
        state.reserved = 0;
        state.retired = true;

        returned?;
        debug!(generator = %self.name, next = ?state.next, ?policy, "flushed generator");
        Ok(())
    }

    /// Retires the generator without writing anything back, for when its
    /// catalog row is dropped or overwritten.
    pub fn retire(&self) {
        let mut state = self.state.lock();
        state.reserved = 0;
        state.retired = true;
    }
}

#[cfg(test)]
mod tests {
    use {super::*, crate::Error, std::cell::RefCell};

    fn generator(
        current: i64,
        increment: i64,
        min: i64,
        max: i64,
        cycle: bool,
    ) -> SequenceGenerator {
        SequenceGenerator::new(
            "S",
            GeneratorTarget::Sequence(Uuid::nil()),
            Some(current),
            increment,
            min,
            max,
            cycle,
        )
        .unwrap()
    }

    #[test]
    fn reserves_ranges() {
        let g = generator(1, 1, 1, 1000, false);
        let stored = RefCell::new(vec![]);
        let persist = |v| {
            stored.borrow_mut().push(v);
            Ok(())
        };

        let values = (0..12)
            .map(|_| g.next_value(5, persist).unwrap().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(values, (1..=12).collect::<Vec<_>>());
        assert_eq!(*stored.borrow(), vec![Some(6), Some(11), Some(16)]);

        g.flush(FlushPolicy::ReturnUnused, persist).unwrap();
        assert_eq!(stored.borrow().last(), Some(&Some(13)));
        // nothing left to return
        g.flush(FlushPolicy::ReturnUnused, persist).unwrap();
        assert_eq!(stored.borrow().len(), 4);
    }

    #[test]
    fn flushed_generator_issues_nothing() {
        let g = generator(1, 1, 1, 1000, false);
        let stored = RefCell::new(vec![]);
        let persist = |v| {
            stored.borrow_mut().push(v);
            Ok(())
        };

        assert_eq!(g.next_value(10, persist).unwrap(), Some(1));
        g.flush(FlushPolicy::ReturnUnused, persist).unwrap();
        assert_eq!(*stored.borrow(), vec![Some(11), Some(2)]);

        // a stale holder must reload rather than reissue 2
        assert_eq!(g.next_value(10, persist).unwrap(), None);
        assert_eq!(stored.borrow().len(), 2);

        // retired even when nothing was reserved
        let idle = generator(1, 1, 1, 1000, false);
        idle.flush(FlushPolicy::DiscardUnused, |_| unreachable!()).unwrap();
        assert_eq!(idle.next_value(10, |_| Ok(())).unwrap(), None);

        let dropped = generator(1, 1, 1, 1000, false);
        dropped.retire();
        assert_eq!(dropped.next_value(10, |_| Ok(())).unwrap(), None);
    }

    #[test]
    fn zero_increment_is_rejected() {
        let made = SequenceGenerator::new(
            "ID",
            GeneratorTarget::Sequence(Uuid::nil()),
            Some(1),
            0,
            i64::MIN,
            i64::MAX,
            false,
        );
        assert!(matches!(made, Err(Error::Internal { .. })));
    }

    #[test]
    fn exhausts_at_bound() {
        let g = generator(126, 1, -128, 127, false);
        let stored = RefCell::new(vec![]);
        let persist = |v| {
            stored.borrow_mut().push(v);
            Ok(())
        };

        assert_eq!(g.next_value(100, persist).unwrap(), Some(126));
        assert_eq!(g.next_value(100, persist).unwrap(), Some(127));
        assert!(matches!(
            g.next_value(100, persist),
            Err(Error::SequenceExhausted { .. })
        ));
        assert_eq!(*stored.borrow(), vec![None]);
    }

    #[test]
    fn cycles_downwards() {
        let g = generator(-127, -1, -128, 127, true);
        let values = (0..3)
            .map(|_| g.next_value(10, |_| Ok(())).unwrap().unwrap())
            .collect::<Vec<_>>();
        assert_eq!(values, vec![-127, -128, 127]);
    }

    #[test]
    fn extreme_bounds_do_not_overflow() {
        let g = generator(i64::MAX - 1, 1, i64::MIN, i64::MAX, false);
        let mut stored = None;
        assert_eq!(
            g.next_value(100, |v| {
                stored = v;
                Ok(())
            })
            .unwrap(),
            Some(i64::MAX - 1)
        );
        assert_eq!(stored, None);
        assert_eq!(g.peek(), Some(i64::MAX));
    }

    #[test]
    fn failed_persist_issues_nothing() {
        let g = generator(1, 1, 1, 10, false);
        assert!(g
            .next_value(5, |_| crate::error::InternalSnafu { details: "io" }.fail())
            .is_err());
        assert_eq!(g.peek(), Some(1));
    }
}

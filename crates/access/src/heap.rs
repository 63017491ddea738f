use {
    crate::{ConglomerateId, RowLocation},
    def::Row,
    std::collections::BTreeMap,
};

/// Unordered row container addressed by slot number.
#[derive(Debug, Clone, Default)]
pub struct Heap {
    rows: BTreeMap<u64, Row>,
    next_slot: u64,
}

impl Heap {
    pub(crate) fn with_next_slot(next_slot: u64) -> Self {
        Self {
            rows: BTreeMap::new(),
            next_slot,
        }
    }

    pub(crate) fn next_slot(&self) -> u64 {
        self.next_slot
    }

    pub(crate) fn insert(&mut self, id: ConglomerateId, row: Row) -> RowLocation {
        let slot = self.next_slot;
        self.next_slot += 1;
        self.rows.insert(slot, row);

        RowLocation::new(id, slot)
    }

    /// Puts a row back into a specific slot, used when undoing a delete and
    /// when loading a snapshot.
    pub(crate) fn restore(&mut self, slot: u64, row: Row) {
        self.next_slot = self.next_slot.max(slot + 1);
        self.rows.insert(slot, row);
    }

    pub(crate) fn get(&self, slot: u64) -> Option<&Row> {
        self.rows.get(&slot)
    }

    pub(crate) fn get_mut(&mut self, slot: u64) -> Option<&mut Row> {
        self.rows.get_mut(&slot)
    }

    pub(crate) fn remove(&mut self, slot: u64) -> Option<Row> {
        self.rows.remove(&slot)
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (u64, &Row)> {
        self.rows.iter().map(|(slot, row)| (*slot, row))
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use {super::*, def::Value};

    #[test]
    fn slots_are_never_reused() {
        let mut heap = Heap::default();
        let first = heap.insert(7, vec![Value::Int(1)]);
        heap.remove(first.slot);
        let second = heap.insert(7, vec![Value::Int(2)]);

        assert_ne!(first, second);
        assert_eq!(heap.len(), 1);

        heap.restore(first.slot, vec![Value::Int(1)]);
        assert_eq!(heap.get(first.slot), Some(&vec![Value::Int(1)]));
        assert_eq!(heap.next_slot(), 2);
    }
}

use {
    crate::{
        btree::compare_prefix,
        manager::{Conglomerate, ConglomerateData},
        transaction::project,
        Qualifiers, RowLocation,
    },
    common::dsa::BitSet,
    def::Row,
    std::{cmp::Ordering, vec},
};

/// Positioning operator for start and stop keys.
///
/// As a start operator `Ge` positions on the first key equal to or after the
/// start key and `Gt` on the first key after it. As a stop operator `Gt`
/// ends the scan at the first key after the stop key and `Ge` at the first
/// key equal to or after it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanOp {
    Ge,
    Gt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum IsolationLevel {
    ReadUncommitted,
    ReadCommitted,
    RepeatableRead,
    Serializable,
}

#[derive(Debug, Clone)]
pub struct ScanSpec {
    pub start_key: Option<Row>,
    pub start_op: ScanOp,
    pub stop_key: Option<Row>,
    pub stop_op: ScanOp,
    pub qualifiers: Qualifiers,
    /// Heap columns to return; the others come back as NULL.
    pub projection: Option<BitSet>,
    pub isolation: IsolationLevel,
    pub for_update: bool,
}

impl Default for ScanSpec {
    fn default() -> Self {
        Self {
            start_key: None,
            start_op: ScanOp::Ge,
            stop_key: None,
            stop_op: ScanOp::Gt,
            qualifiers: Qualifiers::none(),
            projection: None,
            isolation: IsolationLevel::RepeatableRead,
            for_update: false,
        }
    }
}

impl ScanSpec {
    /// All index entries whose leading columns equal `key`.
    pub fn exact(key: Row) -> Self {
        Self {
            start_key: Some(key.clone()),
            start_op: ScanOp::Ge,
            stop_key: Some(key),
            stop_op: ScanOp::Gt,
            ..Default::default()
        }
    }

    pub fn with_qualifiers(mut self, qualifiers: Qualifiers) -> Self {
        self.qualifiers = qualifiers;
        self
    }

    pub fn with_projection(mut self, projection: Option<BitSet>) -> Self {
        self.projection = projection;
        self
    }

    pub fn with_isolation(mut self, isolation: IsolationLevel) -> Self {
        self.isolation = isolation;
        self
    }

    pub fn for_update(mut self, for_update: bool) -> Self {
        self.for_update = for_update;
        self
    }
}

/// A qualifying row. For an index scan `row` holds the key columns and
/// `location` points at the base row; for a heap scan it is the heap row.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanRow {
    pub row: Row,
    pub location: RowLocation,
}

pub struct ScanController {
    rows: vec::IntoIter<ScanRow>,
    isolation: IsolationLevel,
}

impl ScanController {
    pub(crate) fn new(rows: Vec<ScanRow>, isolation: IsolationLevel) -> Self {
        Self {
            rows: rows.into_iter(),
            isolation,
        }
    }

    pub fn fetch_next(&mut self) -> Option<ScanRow> {
        self.rows.next()
    }

    pub fn isolation(&self) -> IsolationLevel {
        self.isolation
    }
}

impl Iterator for ScanController {
    type Item = ScanRow;

    fn next(&mut self) -> Option<ScanRow> {
        self.fetch_next()
    }
}

pub(crate) fn collect(conglomerate: &Conglomerate, spec: &ScanSpec) -> Vec<ScanRow> {
    match &conglomerate.data {
        // heaps are unordered, keys do not apply
        ConglomerateData::Heap(heap) => heap
            .iter()
            .filter(|(_, row)| spec.qualifiers.matches(row))
            .map(|(slot, row)| ScanRow {
                row: project(row, spec.projection.as_ref()),
                location: RowLocation::new(conglomerate.id, slot),
            })
            .collect(),

        ConglomerateData::BTree(btree) => {
            let start = spec.start_key.as_deref().unwrap_or(&[]);

            btree
                .range_from(start)
                .skip_while(|entry| {
                    spec.start_op == ScanOp::Gt
                        && compare_prefix(&entry.key, start) == Ordering::Equal
                })
                .take_while(|entry| match &spec.stop_key {
                    Some(stop) => {
                        let ord = compare_prefix(&entry.key, stop);
                        match spec.stop_op {
                            ScanOp::Gt => ord != Ordering::Greater,
                            ScanOp::Ge => ord == Ordering::Less,
                        }
                    }
                    None => true,
                })
                .filter(|entry| spec.qualifiers.matches(&entry.key))
                .map(|entry| ScanRow {
                    row: entry.key.clone(),
                    location: entry.location,
                })
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use {
        super::*,
        crate::{AccessManager, ConglomerateKind, IndexEntry, Qualifier, Result},
        def::{DataType, TypeDescriptor, Value},
    };

    fn keys(rows: Vec<ScanRow>) -> Vec<Row> {
        rows.into_iter().map(|r| r.row).collect()
    }

    #[test]
    fn key_ranges() -> Result<()> {
        let manager = AccessManager::in_memory();
        let txn = manager.begin();
        let index = txn.create_conglomerate(
            ConglomerateKind::BTree { unique: true },
            vec![
                TypeDescriptor::not_null(DataType::Varchar(10)),
                TypeDescriptor::not_null(DataType::Int),
            ],
        )?;
        let cc = txn.open_conglomerate(index)?;
        for (i, (name, n)) in [("A", 1), ("A", 2), ("B", 1), ("C", 5)].iter().enumerate() {
            cc.insert_entry(IndexEntry::new(
                vec![(*name).into(), Value::Int(*n)],
                RowLocation::new(9, i as u64),
            ))?;
        }

        let exact = txn.open_scan(index, ScanSpec::exact(vec!["A".into()]))?;
        assert_eq!(
            keys(exact.collect()),
            vec![
                vec![Value::from("A"), Value::Int(1)],
                vec![Value::from("A"), Value::Int(2)]
            ]
        );

        let after_a = ScanSpec {
            start_key: Some(vec!["A".into()]),
            start_op: ScanOp::Gt,
            stop_key: Some(vec!["C".into()]),
            stop_op: ScanOp::Ge,
            ..Default::default()
        };
        assert_eq!(
            keys(txn.open_scan(index, after_a)?.collect()),
            vec![vec![Value::from("B"), Value::Int(1)]]
        );

        let qualified = ScanSpec::default()
            .with_qualifiers(Qualifier::equals(1, 1).into());
        assert_eq!(txn.open_scan(index, qualified)?.count(), 2);

        Ok(())
    }

    #[test]
    fn heap_scan_projects() -> Result<()> {
        let manager = AccessManager::in_memory();
        let txn = manager.begin();
        let heap = txn.create_conglomerate(
            ConglomerateKind::Heap,
            vec![
                TypeDescriptor::not_null(DataType::Int),
                TypeDescriptor::not_null(DataType::Int),
            ],
        )?;
        let cc = txn.open_conglomerate(heap)?;
        cc.insert(vec![Value::Int(1), Value::Int(10)])?;
        cc.insert(vec![Value::Int(2), Value::Int(20)])?;

        let spec = ScanSpec::default()
            .with_projection(Some(BitSet::from_positions(2, [1])))
            .with_qualifiers(Qualifier::equals(0, 2).into())
            .with_isolation(IsolationLevel::ReadUncommitted);
        let mut scan = txn.open_scan(heap, spec)?;

        assert_eq!(scan.isolation(), IsolationLevel::ReadUncommitted);
        assert_eq!(
            scan.fetch_next().map(|r| r.row),
            Some(vec![Value::Null, Value::Int(20)])
        );
        assert!(scan.fetch_next().is_none());

        Ok(())
    }
}

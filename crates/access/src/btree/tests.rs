use {super::*, rand::prelude::*};

fn loc(slot: u64) -> RowLocation {
    RowLocation::new(1, slot)
}

#[test]
fn random_insertion_keeps_key_order() {
    let mut btree = BTree::new(false);

    let mut rng = rand::thread_rng();
    let mut nums: Vec<i32> = (0..120).collect();
    nums.shuffle(&mut rng);

    for &i in nums.iter() {
        assert!(btree.insert(IndexEntry::new(vec![Value::Int(i)], loc(i as u64))));
    }

    let keys = btree
        .iter()
        .map(|entry| entry.key[0].clone())
        .collect::<Vec<_>>();
    assert_eq!(keys, (0..120).map(Value::Int).collect::<Vec<_>>());

    let first = btree.range_from(&[Value::Int(57)]).next().unwrap();
    assert_eq!(first.location, loc(57));
}

#[test]
fn unique_rejects_equal_keys() {
    let mut btree = BTree::new(true);
    let key = vec![Value::String("T".into()), Value::Int(1)];

    assert!(btree.insert(IndexEntry::new(key.clone(), loc(1))));
    assert!(!btree.insert(IndexEntry::new(key.clone(), loc(2))));
    assert_eq!(btree.len(), 1);

    assert!(btree.remove(&IndexEntry::new(key.clone(), loc(1))));
    assert!(btree.insert(IndexEntry::new(key, loc(2))));
}

#[test]
fn non_unique_keeps_duplicates_ordered_by_location() {
    let mut btree = BTree::new(false);
    let key = vec![Value::BigInt(42)];

    btree.insert(IndexEntry::new(key.clone(), loc(9)));
    btree.insert(IndexEntry::new(key.clone(), loc(3)));

    let locations = btree
        .range_from(&key)
        .map(|entry| entry.location)
        .collect::<Vec<_>>();
    assert_eq!(locations, vec![loc(3), loc(9)]);
}

#[test]
fn prefix_comparison() {
    let key = [Value::String("A".into()), Value::Int(5)];

    assert_eq!(compare_prefix(&key, &[Value::String("A".into())]), Ordering::Equal);
    assert_eq!(compare_prefix(&key, &[Value::String("B".into())]), Ordering::Less);
    assert_eq!(
        compare_prefix(&key, &[Value::String("A".into()), Value::Int(4)]),
        Ordering::Greater
    );
}

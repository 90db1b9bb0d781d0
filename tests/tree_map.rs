// TreeMap black-box suite, over the public surface only.
//
// Core behaviors exercised:
// - Construction: new()/from_pairs/From<[(K, V); N]>, duplicate keys in
//   a literal list update in place.
// - Ordering: begin..end walks ascending keys whatever the insertion
//   order; backward stepping from end starts at the maximum.
// - Removal: keyed and cursor-based, all child-count cases, with the
//   map still sorted afterward.
// - Cursor misuse: OutOfRange on overrun, InvalidIterator at end.

use duomap::{Error, TreeMap};

#[test]
fn new_map_is_empty_and_begin_equals_end() {
    let m: TreeMap<i32, String> = TreeMap::new();
    assert!(m.is_empty());
    assert_eq!(m.len(), 0);
    assert_eq!(m.begin(), m.end());
    assert_eq!(m.find(&7), m.end());
}

// Scenario: two inserts through the index operation, then find.
#[test]
fn insert_two_then_find() {
    let mut m: TreeMap<i32, String> = TreeMap::new();
    *m.get_or_insert_default(42) = "Alice".to_string();
    *m.get_or_insert_default(27) = "Bob".to_string();

    let c = m.find(&42);
    assert_ne!(c, m.end());
    assert_eq!(c.value(&m).map(String::as_str), Some("Alice"));
    assert_eq!(m.len(), 2);
}

// Scenario: removal by key leaves the remaining entry findable.
#[test]
fn remove_one_of_two() {
    let mut m: TreeMap<i32, String> = TreeMap::new();
    *m.get_or_insert_default(753) = "Rome".to_string();
    *m.get_or_insert_default(1789) = "Paris".to_string();

    m.remove(&753).unwrap();
    assert!(!m.is_empty());
    assert_eq!(m.find(&753), m.end());
    assert_ne!(m.find(&1789), m.end());
}

// Scenario: removing the only entry empties the map.
#[test]
fn remove_last_entry_empties_map() {
    let mut m: TreeMap<i32, String> = TreeMap::new();
    *m.get_or_insert_default(27) = "Bob".to_string();
    m.remove(&27).unwrap();
    assert!(m.is_empty());
    assert_eq!(m.begin(), m.end());
}

// Scenario: stepping past end or before begin is OutOfRange misuse.
#[test]
fn cursor_overrun_fails() {
    let empty: TreeMap<i32, i32> = TreeMap::new();
    assert_eq!(empty.end().next(&empty), Err(Error::OutOfRange));
    assert_eq!(empty.begin().prev(&empty), Err(Error::OutOfRange));

    let m = TreeMap::from([(1, 10)]);
    assert_eq!(m.end().next(&m), Err(Error::OutOfRange));
    assert_eq!(m.begin().prev(&m), Err(Error::OutOfRange));
}

#[test]
fn walk_is_sorted_regardless_of_insertion_order() {
    let m = TreeMap::from([(5, "e"), (1, "a"), (4, "d"), (2, "b"), (3, "c")]);

    let mut keys = Vec::new();
    let mut c = m.begin();
    while c != m.end() {
        keys.push(*c.key(&m).unwrap());
        c = c.next(&m).unwrap();
    }
    assert_eq!(keys, vec![1, 2, 3, 4, 5]);

    // Backward from end visits the same keys reversed.
    let mut back = Vec::new();
    let mut c = m.end();
    while let Ok(p) = c.prev(&m) {
        back.push(*p.key(&m).unwrap());
        c = p;
    }
    assert_eq!(back, vec![5, 4, 3, 2, 1]);
}

#[test]
fn iter_matches_cursor_walk() {
    let m = TreeMap::from([(3, 30), (1, 10), (2, 20)]);
    let from_iter: Vec<(i32, i32)> = m.iter().map(|(&k, &v)| (k, v)).collect();
    assert_eq!(from_iter, vec![(1, 10), (2, 20), (3, 30)]);
}

#[test]
fn end_cursor_does_not_dereference() {
    let m = TreeMap::from([(1, 2)]);
    assert_eq!(m.end().key(&m), None);
    assert_eq!(m.end().value(&m), None);
}

#[test]
fn value_mutable_through_cursor_and_get_mut() {
    let mut m: TreeMap<i32, String> = TreeMap::from([(1, "x".to_string())]);
    let c = m.find(&1);
    c.value_mut(&mut m).unwrap().push('y');
    assert_eq!(m.get(&1).map(String::as_str), Some("xy"));

    m.get_mut(&1).unwrap().push('z');
    assert_eq!(m.get(&1).map(String::as_str), Some("xyz"));
}

#[test]
fn failed_removal_mutates_nothing() {
    let mut m = TreeMap::from([(1, 10), (2, 20)]);
    assert_eq!(m.remove(&3), Err(Error::NotFound));
    assert_eq!(m.remove_at(m.end()), Err(Error::InvalidIterator));
    assert_eq!(m.len(), 2);
    assert_eq!(m.get(&1), Some(&10));
    assert_eq!(m.get(&2), Some(&20));
}

#[test]
fn remove_every_key_in_mixed_order() {
    let mut m = TreeMap::from_pairs((0..100).map(|i| (i, i)).collect());
    // Remove odds by key, evens by cursor.
    for k in (1..100).step_by(2) {
        assert_eq!(m.remove(&k), Ok((k, k)));
    }
    for k in (0..100).step_by(2) {
        let c = m.find(&k);
        assert_eq!(m.remove_at(c), Ok((k, k)));
    }
    assert!(m.is_empty());
}

#[test]
fn bulk_round_trip_stays_sorted() {
    let mut m: TreeMap<u32, u32> = TreeMap::new();
    let mut x: u32 = 123;
    for _ in 0..2_000 {
        x = x.wrapping_mul(1664525).wrapping_add(1013904223);
        *m.get_or_insert_default(x % 4096) = x;
    }
    let keys: Vec<u32> = m.iter().map(|(&k, _)| k).collect();
    assert!(keys.windows(2).all(|w| w[0] < w[1]));
    for &k in &keys {
        assert!(m.contains_key(&k));
    }
}

#[test]
fn clone_is_independent() {
    let mut a = TreeMap::from([(1, 10), (2, 20)]);
    let b = a.clone();
    a.remove(&1).unwrap();
    assert_eq!(a.len(), 1);
    assert_eq!(b.len(), 2);
    assert_eq!(b.get(&1), Some(&10));
}

#[test]
fn from_pairs_last_duplicate_wins() {
    let m = TreeMap::from([(1, "a"), (1, "b")]);
    assert_eq!(m.len(), 1);
    assert_eq!(m.get(&1), Some(&"b"));
}

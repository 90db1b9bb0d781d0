// The two engines deliberately carry different equality contracts:
// HashMap compares membership (order-independent), TreeMap compares the
// in-order sequences positionally. This suite pins that asymmetry down.

use duomap::{HashMap, TreeMap};

#[test]
fn hash_equality_is_order_independent() {
    let a: HashMap<i32, &str> = HashMap::from([(42, "Alice"), (27, "Bob")]);
    let b: HashMap<i32, &str> = HashMap::from([(27, "Bob"), (42, "Alice")]);
    assert_eq!(a, b);
    assert_eq!(b, a);
}

#[test]
fn hash_equality_detects_value_and_size_differences() {
    let a: HashMap<i32, &str> = HashMap::from([(42, "Alice"), (27, "Bob")]);
    let differs: HashMap<i32, &str> = HashMap::from([(42, "Alice"), (27, "Eve")]);
    assert_ne!(a, differs);

    let shorter: HashMap<i32, &str> = HashMap::from([(42, "Alice")]);
    assert_ne!(a, shorter);
    assert_ne!(shorter, a);
}

// Two trees built with different insertion orders still compare equal:
// positional equality walks sorted order, not insertion order.
#[test]
fn tree_equality_walks_sorted_order() {
    let a = TreeMap::from([(42, "Alice"), (27, "Bob")]);
    let b = TreeMap::from([(27, "Bob"), (42, "Alice")]);
    assert_eq!(a, b);

    // Deep shape differences don't matter either: force rotations on
    // one side by feeding sorted input.
    let rotated = TreeMap::from_pairs((0..64).map(|i| (i, i * 2)).collect());
    let mixed = {
        let mut m: TreeMap<i32, i32> = TreeMap::new();
        for i in [31, 47, 15, 7, 55, 23, 39, 63] {
            *m.get_or_insert_default(i) = i * 2;
        }
        for i in 0..64 {
            *m.get_or_insert_default(i) = i * 2;
        }
        m
    };
    assert_eq!(rotated, mixed);
}

#[test]
fn tree_equality_is_positional() {
    let a = TreeMap::from([(1, "x"), (2, "y")]);
    let value_differs = TreeMap::from([(1, "x"), (2, "z")]);
    let key_differs = TreeMap::from([(1, "x"), (3, "y")]);
    let prefix = TreeMap::from([(1, "x")]);
    assert_ne!(a, value_differs);
    assert_ne!(a, key_differs);
    assert_ne!(a, prefix);
}

#[test]
fn empty_maps_compare_equal() {
    let a: HashMap<i32, i32> = HashMap::new();
    let b: HashMap<i32, i32> = HashMap::new();
    assert_eq!(a, b);

    let c: TreeMap<i32, i32> = TreeMap::new();
    let d: TreeMap<i32, i32> = TreeMap::new();
    assert_eq!(c, d);
}

#![cfg(test)]

// Property tests for the tree engine: state-machine equivalence against
// BTreeMap plus a full structural invariant sweep after every operation.

use crate::error::Error;
use crate::tree_map::TreeMap;
use proptest::prelude::*;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum OpI {
    Set(i16, i32),
    Remove(i16),
    RemoveAt(i16),
    Get(i16),
    Mutate(i16, i32),
    Iterate,
    WalkBackward,
}

fn arb_ops() -> impl Strategy<Value = Vec<OpI>> {
    // Narrow key range so removals collide with live keys often.
    let key = -64i16..64;
    let op = prop_oneof![
        4 => (key.clone(), any::<i32>()).prop_map(|(k, v)| OpI::Set(k, v)),
        3 => key.clone().prop_map(OpI::Remove),
        2 => key.clone().prop_map(OpI::RemoveAt),
        2 => key.clone().prop_map(OpI::Get),
        1 => (key.clone(), any::<i32>()).prop_map(|(k, d)| OpI::Mutate(k, d)),
        1 => Just(OpI::Iterate),
        1 => Just(OpI::WalkBackward),
    ];
    proptest::collection::vec(op, 1..80)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine(ops in arb_ops()) {
        let mut sut: TreeMap<i16, i32> = TreeMap::new();
        let mut model: BTreeMap<i16, i32> = BTreeMap::new();

        for op in ops {
            match op {
                OpI::Set(k, v) => {
                    *sut.get_or_insert_default(k) = v;
                    model.insert(k, v);
                }
                OpI::Remove(k) => {
                    match (sut.remove(&k), model.remove(&k)) {
                        (Ok((rk, rv)), Some(mv)) => {
                            prop_assert_eq!(rk, k);
                            prop_assert_eq!(rv, mv);
                        }
                        (Err(Error::NotFound), None) => {}
                        (s, m) => prop_assert!(false, "remove mismatch: {:?} vs {:?}", s, m),
                    }
                }
                OpI::RemoveAt(k) => {
                    let c = sut.find(&k);
                    if model.contains_key(&k) {
                        let (rk, rv) = sut.remove_at(c).expect("cursor from find is live");
                        prop_assert_eq!(rk, k);
                        prop_assert_eq!(Some(rv), model.remove(&k));
                    } else {
                        prop_assert_eq!(c, sut.end());
                        prop_assert_eq!(sut.remove_at(c), Err(Error::InvalidIterator));
                    }
                }
                OpI::Get(k) => {
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                    prop_assert_eq!(sut.contains_key(&k), model.contains_key(&k));
                }
                OpI::Mutate(k, d) => {
                    match (sut.get_mut(&k), model.get_mut(&k)) {
                        (Some(sv), Some(mv)) => {
                            *sv = sv.saturating_add(d);
                            *mv = mv.saturating_add(d);
                        }
                        (None, None) => {}
                        _ => prop_assert!(false, "presence mismatch for {}", k),
                    }
                }
                OpI::Iterate => {
                    let s: Vec<(i16, i32)> = sut.iter().map(|(&k, &v)| (k, v)).collect();
                    let m: Vec<(i16, i32)> = model.iter().map(|(&k, &v)| (k, v)).collect();
                    prop_assert_eq!(s, m, "in-order traversal diverged from model");
                }
                OpI::WalkBackward => {
                    let mut s = Vec::new();
                    let mut c = sut.end();
                    loop {
                        match c.prev(&sut) {
                            Ok(p) => {
                                s.push(*p.key(&sut).expect("stepped cursor resolves"));
                                c = p;
                            }
                            Err(Error::OutOfRange) => break,
                            Err(e) => prop_assert!(false, "unexpected error {:?}", e),
                        }
                    }
                    let m: Vec<i16> = model.keys().rev().copied().collect();
                    prop_assert_eq!(s, m, "backward walk diverged from model");
                }
            }

            // Post-conditions after each op: structural soundness plus
            // size parity with the model.
            sut.check_invariants();
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}

// Property: insertion order never affects the final map, both for
// content and for positional equality.
proptest! {
    #![proptest_config(ProptestConfig { cases: 32, .. ProptestConfig::default() })]
    #[test]
    fn prop_insertion_order_irrelevant(mut pairs in proptest::collection::vec((any::<i16>(), any::<i32>()), 0..40)) {
        // Build forward and reversed; duplicates update in place either
        // way, so keep only the last value per key for the model.
        let forward = TreeMap::from_pairs(pairs.clone());
        let mut model: BTreeMap<i16, i32> = BTreeMap::new();
        for &(k, v) in &pairs {
            model.insert(k, v);
        }
        // A reversed duplicate-bearing list may resolve duplicates to
        // different survivors, so dedup before reversing.
        pairs.reverse();
        let mut seen = std::collections::HashSet::new();
        pairs.retain(|(k, _)| seen.insert(*k));
        let backward = TreeMap::from_pairs(pairs);

        let f: Vec<(i16, i32)> = forward.iter().map(|(&k, &v)| (k, v)).collect();
        let m: Vec<(i16, i32)> = model.iter().map(|(&k, &v)| (k, v)).collect();
        prop_assert_eq!(f, m);
        prop_assert!(forward == backward, "positional equality must ignore insertion order");
        forward.check_invariants();
        backward.check_invariants();
    }
}

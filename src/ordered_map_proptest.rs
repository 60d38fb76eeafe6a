#![cfg(test)]

// Property tests for OrderedMap kept inside the crate so they can check the
// tree's internal invariants after every operation.

use crate::equivalence::{Comparator, FnComparator, NaturalOrder, Reversed};
use crate::ordered_map::OrderedMap;
use proptest::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BTreeMap;
use std::fmt;

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Put(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Bounds,
    Iterate,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Put(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Bounds),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Property: State-machine equivalence against std::collections::BTreeMap.
// Invariants exercised across random operation sequences:
// - `put` returns the replaced value exactly when the model had the key.
// - `get`/`contains_key` parity, including borrowed `&str` lookups.
// - `remove` returns the model's value and the key is absent afterwards.
// - `first`/`last` and full iteration match the model's sorted order.
// - After every op the tree is balanced, heights are current and every
//   allocated node is reachable; `len`/`is_empty` match the model.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: OrderedMap<Key, i32> = OrderedMap::new();
        let mut model: BTreeMap<Key, i32> = BTreeMap::new();

        for op in ops {
            match op {
                OpI::Put(i, v) => {
                    let k = key_from(&pool, i);
                    let expected = model.insert(k.clone(), v);
                    prop_assert_eq!(sut.put(k, v), expected);
                }
                OpI::Remove(i) => {
                    let k = key_from(&pool, i);
                    let expected = model.remove(&k);
                    prop_assert_eq!(sut.remove(&k), expected);
                    prop_assert!(sut.get(&k).is_none());
                }
                OpI::Get(i) => {
                    let k = key_from(&pool, i);
                    prop_assert_eq!(sut.get(&k), model.get(&k));
                }
                OpI::Contains(s) => {
                    let has = sut.contains_key(s.as_str());
                    let has_model = model.contains_key(s.as_str());
                    prop_assert_eq!(has, has_model);
                }
                OpI::Mutate(i, d) => {
                    let k = key_from(&pool, i);
                    if let Some(vr) = sut.get_mut(&k) {
                        *vr = vr.saturating_add(d);
                        let mv = model.get_mut(&k).expect("present in model");
                        *mv = mv.saturating_add(d);
                    } else {
                        prop_assert!(!model.contains_key(&k));
                    }
                }
                OpI::Bounds => {
                    prop_assert_eq!(sut.first(), model.iter().next());
                    prop_assert_eq!(sut.last(), model.iter().next_back());
                }
                OpI::Iterate => {
                    let s: Vec<(&Key, &i32)> = sut.entries().collect();
                    let m: Vec<(&Key, &i32)> = model.iter().collect();
                    prop_assert_eq!(s, m);
                }
            }

            let count = sut.check_invariants();
            prop_assert_eq!(count, Ok(model.len()));
            prop_assert_eq!(sut.len(), model.len());
            prop_assert_eq!(sut.is_empty(), model.is_empty());
        }
    }
}

// Property: iteration order follows the configured comparator, not the key
// type's own order. Checked with a descending comparator and with an
// external projection that makes distinct keys order-equal.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_order_follows_comparator(keys in proptest::collection::vec(any::<u16>(), 0..200)) {
        let mut desc = OrderedMap::with_comparator(Reversed(NaturalOrder));
        let mut model: BTreeMap<Reverse<u16>, ()> = BTreeMap::new();
        for &k in &keys {
            desc.put(k, ());
            model.insert(Reverse(k), ());
        }
        let got: Vec<u16> = desc.keys().copied().collect();
        let want: Vec<u16> = model.keys().map(|r| r.0).collect();
        prop_assert_eq!(got, want);
        prop_assert!(desc.check_invariants().is_ok());

        // Keys equal modulo 10 collapse onto the first one stored.
        let by_digit = FnComparator::new(|a: &u16, b: &u16| (a % 10).cmp(&(b % 10)));
        let mut last_digit = OrderedMap::with_comparator(by_digit);
        let mut first_seen: BTreeMap<u16, u16> = BTreeMap::new();
        for &k in &keys {
            last_digit.put(k, k);
            first_seen.entry(k % 10).or_insert(k);
        }
        prop_assert_eq!(last_digit.len(), first_seen.len());
        for ((stored, value), (_, first)) in last_digit.entries().zip(first_seen.iter()) {
            prop_assert_eq!(stored, first);
            prop_assert_eq!(
                last_digit.comparator().compare(stored, value),
                Ordering::Equal
            );
        }
    }
}

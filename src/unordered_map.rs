//! UnorderedMap: hashed map with a pluggable key equivalence.
//!
//! Storage follows a two-part layout: entries live in a `SlotMap` and a
//! `hashbrown::HashTable` indexes slot keys by the entry's stored hash. The
//! user's hash function runs once per `put` and once per lookup; growth of
//! the index rehashes from stored hashes without calling back into user
//! code.

use crate::equivalence::{hash_with, Intrinsic, KeyEquivalence};
use crate::reentrancy::CallbackGuard;
use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_table;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::collections::hash_map::RandomState;

#[derive(Clone, Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

/// A map from unique keys to values, keyed by hash and equality.
///
/// Keys are unique under `E`. Putting a key that is already present
/// replaces the value and keeps the originally stored key instance.
/// Iteration order is unspecified and may change after any `put` or
/// `remove`.
#[derive(Clone)]
pub struct UnorderedMap<K, V, E = Intrinsic, S = RandomState> {
    equivalence: E,
    hasher: S,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    reentrancy: CallbackGuard,
}

impl<K, V> UnorderedMap<K, V>
where
    K: Eq + Hash,
{
    /// An empty map using the key type's own `Hash` and `Eq`.
    pub fn new() -> Self {
        Self::with_equivalence(Intrinsic)
    }
}

impl<K, V> Default for UnorderedMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, E> UnorderedMap<K, V, E>
where
    E: KeyEquivalence<K>,
{
    /// An empty map that decides key identity with `equivalence`.
    pub fn with_equivalence(equivalence: E) -> Self {
        Self::with_equivalence_and_hasher(equivalence, RandomState::new())
    }
}

/// Iterator over `(&K, &V)` in unspecified order.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over `(&K, &mut V)` in unspecified order.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Owning iterator over `(K, V)` in unspecified order.
pub struct IntoIter<K, V> {
    it: slotmap::basic::IntoIter<DefaultKey, Entry<K, V>>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (e.key, e.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V, E, S> UnorderedMap<K, V, E, S>
where
    E: KeyEquivalence<K>,
    S: BuildHasher,
{
    pub fn with_equivalence_and_hasher(equivalence: E, hasher: S) -> Self {
        Self {
            equivalence,
            hasher,
            index: HashTable::new(),
            slots: SlotMap::with_key(),
            reentrancy: CallbackGuard::new(),
        }
    }

    pub fn equivalence(&self) -> &E {
        &self.equivalence
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    fn find_slot<Q>(&self, q: &Q) -> Option<DefaultKey>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEquivalence<Q>,
    {
        let hash = hash_with(&self.equivalence, &self.hasher, q);
        self.index
            .find(hash, |&k| {
                self.slots
                    .get(k)
                    .map(|e| {
                        let stored: &Q = e.key.borrow();
                        KeyEquivalence::<Q>::equal(&self.equivalence, stored, q)
                    })
                    .unwrap_or(false)
            })
            .copied()
    }

    /// Insert `key -> value`, or replace the value of an equivalent key
    /// already present. Returns the replaced value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter("put");
        let hash = hash_with(&self.equivalence, &self.hasher, &key);
        match self.index.entry(
            hash,
            |&kk| {
                self.slots
                    .get(kk)
                    .map(|e| self.equivalence.equal(&e.key, &key))
                    .unwrap_or(false)
            },
            |&kk| self.slots.get(kk).map(|e| e.hash).unwrap_or(0),
        ) {
            hash_table::Entry::Occupied(o) => {
                let slot = *o.get();
                self.slots
                    .get_mut(slot)
                    .map(|e| core::mem::replace(&mut e.value, value))
            }
            hash_table::Entry::Vacant(v) => {
                let slot = self.slots.insert(Entry { key, value, hash });
                let _ = v.insert(slot);
                None
            }
        }
    }

    /// Value for `key`, inserting `default()` first if the key is absent.
    /// `default` only runs on insertion.
    pub fn get_or_insert_with<F>(&mut self, key: K, default: F) -> &mut V
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter("get_or_insert_with");
        let hash = hash_with(&self.equivalence, &self.hasher, &key);
        let slot = match self.index.entry(
            hash,
            |&kk| {
                self.slots
                    .get(kk)
                    .map(|e| self.equivalence.equal(&e.key, &key))
                    .unwrap_or(false)
            },
            |&kk| self.slots.get(kk).map(|e| e.hash).unwrap_or(0),
        ) {
            hash_table::Entry::Occupied(o) => *o.get(),
            hash_table::Entry::Vacant(v) => {
                let value = default();
                let slot = self.slots.insert(Entry { key, value, hash });
                let _ = v.insert(slot);
                slot
            }
        };
        &mut self.slots[slot].value
    }

    /// `None` means the key is absent; a stored value is always `Some`.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEquivalence<Q>,
    {
        let _g = self.reentrancy.enter("get");
        let slot = self.find_slot(q)?;
        self.slots.get(slot).map(|e| &e.value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEquivalence<Q>,
    {
        let _g = self.reentrancy.enter("get_key_value");
        let slot = self.find_slot(q)?;
        self.slots.get(slot).map(|e| (&e.key, &e.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEquivalence<Q>,
    {
        let slot = {
            let _g = self.reentrancy.enter("get_mut");
            self.find_slot(q)?
        };
        self.slots.get_mut(slot).map(|e| &mut e.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEquivalence<Q>,
    {
        let _g = self.reentrancy.enter("contains_key");
        self.find_slot(q).is_some()
    }

    /// Remove `key` and return its value. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEquivalence<Q>,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        E: KeyEquivalence<Q>,
    {
        let _g = self.reentrancy.enter("remove");
        let hash = hash_with(&self.equivalence, &self.hasher, q);
        let found = self.index.find_entry(hash, |&kk| {
            self.slots
                .get(kk)
                .map(|e| {
                    let stored: &Q = e.key.borrow();
                    KeyEquivalence::<Q>::equal(&self.equivalence, stored, q)
                })
                .unwrap_or(false)
        });
        let slot = match found {
            Ok(occupied) => occupied.remove().0,
            Err(_) => return None,
        };
        let entry = self.slots.remove(slot)?;
        Some((entry.key, entry.value))
    }

    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter("clear");
        log::trace!("clearing unordered map with {} entries", self.slots.len());
        self.index.clear();
        self.slots.clear();
    }

    /// All entries in unspecified order.
    pub fn entries(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.entries()
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    /// Keys are unique, so this yields each key exactly once.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries().map(|(k, _)| k)
    }

    /// Values may repeat even though keys do not.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }
}

impl<K, V, E, S> core::fmt::Debug for UnorderedMap<K, V, E, S>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map()
            .entries(self.slots.values().map(|e| (&e.key, &e.value)))
            .finish()
    }
}

impl<K, V, E, S> Extend<(K, V)> for UnorderedMap<K, V, E, S>
where
    E: KeyEquivalence<K>,
    S: BuildHasher,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for UnorderedMap<K, V>
where
    K: Eq + Hash,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<'a, K, V, E, S> IntoIterator for &'a UnorderedMap<K, V, E, S>
where
    E: KeyEquivalence<K>,
    S: BuildHasher,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

impl<K, V, E, S> IntoIterator for UnorderedMap<K, V, E, S> {
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        IntoIter {
            it: self.slots.into_iter(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::equivalence::EquivalentBy;
    use std::cell::Cell;
    use std::collections::BTreeSet;
    use std::hash::Hasher;

    #[derive(Clone, Default)]
    struct ConstBuildHasher;
    struct ConstHasher;
    impl BuildHasher for ConstBuildHasher {
        type Hasher = ConstHasher;
        fn build_hasher(&self) -> Self::Hasher {
            ConstHasher
        }
    }
    impl Hasher for ConstHasher {
        fn write(&mut self, _bytes: &[u8]) {}
        fn finish(&self) -> u64 {
            0
        } // force all keys into the same hash bucket
    }

    /// Invariant: putting an existing key replaces the value and keeps the count.
    #[test]
    fn put_replaces_existing_value() {
        let mut m: UnorderedMap<String, &str> = UnorderedMap::new();
        assert_eq!(m.put("Zoe".to_string(), "Alien"), None);
        assert_eq!(m.put("Zoe".to_string(), "Trainspotting"), Some("Alien"));
        assert_eq!(m.len(), 1);
        assert_eq!(m.get("Zoe"), Some(&"Trainspotting"));
    }

    /// Invariant: `get(k).is_some() == contains_key(k)` for present/absent keys.
    #[test]
    fn get_contains_parity() {
        let mut m: UnorderedMap<String, i32> = UnorderedMap::new();
        let present = ["a", "b", "c"];
        for (i, k) in present.iter().enumerate() {
            m.put((*k).to_string(), i as i32);
        }

        for k in present {
            assert!(m.get(k).is_some());
            assert!(m.contains_key(k));
        }
        for k in ["x", "y", "z"] {
            assert!(m.get(k).is_none());
            assert!(!m.contains_key(k));
        }
    }

    /// Invariant: a stored `None` is distinguishable from an absent key.
    #[test]
    fn stored_none_is_not_absent() {
        let mut m: UnorderedMap<&str, Option<u32>> = UnorderedMap::new();
        m.put("nobody", None);
        assert_eq!(m.get(&"nobody"), Some(&None));
        assert_eq!(m.get(&"elvis"), None);
        assert!(m.contains_key(&"nobody"));
    }

    /// Invariant: removal returns the value once; a second removal is a no-op.
    #[test]
    fn remove_then_reinsert_same_key_yields_new_value() {
        let mut m: UnorderedMap<String, i32> = UnorderedMap::new();
        m.put("k".to_string(), 1);

        assert_eq!(m.remove("k"), Some(1));
        assert_eq!(m.remove("k"), None);
        assert!(!m.contains_key("k"));
        assert!(m.is_empty());

        m.put("k".to_string(), 2);
        assert_eq!(m.get("k"), Some(&2));
        assert_eq!(m.remove_entry("k"), Some(("k".to_string(), 2)));
    }

    /// Invariant: iteration yields each live entry exactly once; `iter_mut`
    /// updates values as seen by subsequent lookups.
    #[test]
    fn iteration_and_mutation() {
        let mut m: UnorderedMap<String, i32> = UnorderedMap::new();
        let keys = ["k1", "k2", "k3"];
        for (i, k) in keys.iter().enumerate() {
            m.put((*k).to_string(), i as i32);
        }

        let seen: BTreeSet<String> = m.keys().cloned().collect();
        let expected: BTreeSet<String> = keys.iter().map(|s| (*s).to_string()).collect();
        assert_eq!(seen, expected);

        for v in m.values_mut() {
            *v += 10;
        }
        let mut values: Vec<i32> = m.values().copied().collect();
        values.sort();
        assert_eq!(values, vec![10, 11, 12]);

        *m.get_mut("k2").unwrap() = 99;
        assert_eq!(m.get("k2"), Some(&99));
    }

    /// Invariant: lookups work under heavy hash collisions; equality resolves
    /// to the correct entry.
    #[test]
    fn collision_handling_with_const_hasher() {
        let mut m: UnorderedMap<String, i32, Intrinsic, ConstBuildHasher> =
            UnorderedMap::with_equivalence_and_hasher(Intrinsic, ConstBuildHasher);
        m.put("a".to_string(), 1);
        m.put("b".to_string(), 2);
        m.put("a".to_string(), 3);

        assert_eq!(m.len(), 2);
        assert_eq!(m.get("a"), Some(&3));
        assert_eq!(m.get("b"), Some(&2));
        assert_eq!(m.remove("a"), Some(3));
        assert_eq!(m.get("b"), Some(&2));
    }

    /// Invariant: the stored key survives a replacing `put`.
    #[test]
    fn replacing_put_keeps_original_key() {
        let mut m = UnorderedMap::with_equivalence(EquivalentBy::new(|s: &String| s.to_lowercase()));
        m.put("Anne".to_string(), 1);
        m.put("ANNE".to_string(), 2);
        let (k, v) = m.get_key_value(&"anne".to_string()).unwrap();
        assert_eq!((k.as_str(), *v), ("Anne", 2));
    }

    /// Invariant: `get_or_insert_with` only runs the constructor on insertion.
    #[test]
    fn get_or_insert_with_is_lazy() {
        let mut m: UnorderedMap<String, Vec<&str>> = UnorderedMap::new();
        let calls = Cell::new(0);
        let make = || {
            calls.set(calls.get() + 1);
            Vec::new()
        };

        m.get_or_insert_with("John".to_string(), make).push("Kylie");
        m.get_or_insert_with("John".to_string(), || {
            calls.set(calls.get() + 1);
            Vec::new()
        })
        .push("Donald");

        assert_eq!(calls.get(), 1);
        assert_eq!(m.get("John").map(Vec::len), Some(2));
    }

    /// Contract violation: equal keys that hash differently are not found.
    /// Nothing panics; the map just cannot see the entry through the twin.
    #[test]
    fn inconsistent_equivalence_loses_entries() {
        struct EqualButHashApart;
        impl KeyEquivalence<(u32, u32)> for EqualButHashApart {
            fn hash<H: Hasher>(&self, key: &(u32, u32), state: &mut H) {
                key.1.hash(state);
            }
            fn equal(&self, a: &(u32, u32), b: &(u32, u32)) -> bool {
                a.0 == b.0
            }
        }

        let mut m = UnorderedMap::with_equivalence(EqualButHashApart);
        m.put((1, 100), "first");
        // Same id, different hashed field: almost surely a different bucket.
        let mut misses = 0;
        for noise in 0..64u32 {
            if m.get(&(1, 1000 + noise)).is_none() {
                misses += 1;
            }
        }
        assert!(misses > 0);
        assert_eq!(m.get(&(1, 100)), Some(&"first"));
    }

    #[test]
    fn clear_empties_and_allows_reuse() {
        let mut m: UnorderedMap<u32, u32> = (0..10).map(|i| (i, i * i)).collect();
        assert_eq!(m.len(), 10);
        m.clear();
        assert!(m.is_empty());
        assert!(!m.contains_key(&3));
        m.put(3, 9);
        assert_eq!(m.get(&3), Some(&9));
    }

    #[test]
    fn owned_iteration_returns_all_pairs() {
        let m: UnorderedMap<u32, char> = [(1, 'a'), (2, 'b')].into_iter().collect();
        let mut pairs: Vec<_> = m.into_iter().collect();
        pairs.sort();
        assert_eq!(pairs, vec![(1, 'a'), (2, 'b')]);
    }

    /// Invariant (debug-only): re-entering the map from within `K: Eq` during
    /// a probe panics due to the reentrancy guard.
    #[cfg(debug_assertions)]
    #[test]
    fn reentrancy_panics_from_eq_during_get() {
        struct ReentryKey {
            id: &'static str,
            map: *const UnorderedMap<ReentryKey, i32, Intrinsic, ConstBuildHasher>,
            trigger: bool,
        }
        impl PartialEq for ReentryKey {
            fn eq(&self, other: &Self) -> bool {
                if self.id == other.id {
                    return true;
                }
                if other.trigger {
                    // Attempt to re-enter the same map during probing.
                    unsafe {
                        let m = &*other.map;
                        let _ = m.contains_key(self.id);
                    }
                }
                false
            }
        }
        impl Eq for ReentryKey {}
        impl Hash for ReentryKey {
            fn hash<H: Hasher>(&self, state: &mut H) {
                self.id.hash(state);
            }
        }
        impl Borrow<str> for ReentryKey {
            fn borrow(&self) -> &str {
                self.id
            }
        }

        let mut m: UnorderedMap<ReentryKey, i32, Intrinsic, ConstBuildHasher> =
            UnorderedMap::with_equivalence_and_hasher(Intrinsic, ConstBuildHasher);
        let ptr = &m as *const _;
        m.put(
            ReentryKey {
                id: "a",
                map: ptr,
                trigger: false,
            },
            1,
        );

        let query = ReentryKey {
            id: "b",
            map: &m as *const _,
            trigger: true,
        };
        let res = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = m.get(&query);
        }));
        assert!(res.is_err(), "expected reentrancy to panic in debug builds");
    }
}

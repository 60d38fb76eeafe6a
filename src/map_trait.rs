//! Object-safe view shared by both maps.
//!
//! Code that only needs "some map from K to V" takes `&dyn KeyValueMap<K, V>`
//! and works with either variant. Lookups here take `&K`; borrowed-form
//! lookups (`&str` for `String` keys) stay on the concrete types.

use crate::equivalence::{Comparator, KeyEquivalence};
use crate::ordered_map::OrderedMap;
use crate::unordered_map::UnorderedMap;
use core::hash::BuildHasher;

pub trait KeyValueMap<K, V> {
    /// Insert or replace; returns the replaced value.
    fn put(&mut self, key: K, value: V) -> Option<V>;

    fn get(&self, key: &K) -> Option<&V>;

    fn remove(&mut self, key: &K) -> Option<V>;

    fn contains_key(&self, key: &K) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Entries in the variant's iteration order.
    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_>;

    fn keys<'a>(&'a self) -> Box<dyn Iterator<Item = &'a K> + 'a>
    where
        K: 'a,
        V: 'a,
    {
        Box::new(self.entries().map(|(k, _)| k))
    }

    fn values<'a>(&'a self) -> Box<dyn Iterator<Item = &'a V> + 'a>
    where
        K: 'a,
        V: 'a,
    {
        Box::new(self.entries().map(|(_, v)| v))
    }
}

impl<K, V, E, S> KeyValueMap<K, V> for UnorderedMap<K, V, E, S>
where
    E: KeyEquivalence<K>,
    S: BuildHasher,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        UnorderedMap::put(self, key, value)
    }

    fn get(&self, key: &K) -> Option<&V> {
        UnorderedMap::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        UnorderedMap::remove(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        UnorderedMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        UnorderedMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(UnorderedMap::entries(self))
    }
}

impl<K, V, C> KeyValueMap<K, V> for OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    fn put(&mut self, key: K, value: V) -> Option<V> {
        OrderedMap::put(self, key, value)
    }

    fn get(&self, key: &K) -> Option<&V> {
        OrderedMap::get(self, key)
    }

    fn remove(&mut self, key: &K) -> Option<V> {
        OrderedMap::remove(self, key)
    }

    fn contains_key(&self, key: &K) -> bool {
        OrderedMap::contains_key(self, key)
    }

    fn len(&self) -> usize {
        OrderedMap::len(self)
    }

    fn entries(&self) -> Box<dyn Iterator<Item = (&K, &V)> + '_> {
        Box::new(OrderedMap::entries(self))
    }
}

//! keyed-map: generic key/value containers with pluggable key semantics.
//!
//! Internal Design:
//!
//! Summary
//! - Two associative containers with one contract: unique keys, `put`
//!   replaces, absent keys read as `None`, removal of an absent key is a
//!   no-op.
//! - Layers:
//!   - equivalence: the strategy traits. `KeyEquivalence` (hash + equality)
//!     drives `UnorderedMap`; `Comparator` (total order) drives
//!     `OrderedMap`. Both default to the key type's own `Hash + Eq` / `Ord`
//!     and can be replaced per map.
//!   - UnorderedMap<K, V, E, S>: a hashbrown `HashTable` index over a
//!     slotmap of entries that store their hash. Average O(1) operations,
//!     unspecified iteration order.
//!   - OrderedMap<K, V, C>: an AVL tree in a slotmap arena. O(log n)
//!     operations, iteration in ascending comparator order.
//!   - KeyValueMap: the object-safe view over both, for code that does not
//!     care which variant it holds.
//!   - demos / cli: the demonstration harness on top of the public API.
//!
//! Constraints
//! - No internal synchronization. Maps are `Send` when their keys, values
//!   and strategies are, so they can move between threads or sit behind a
//!   caller's `Mutex`. Debug builds keep them `!Sync`.
//! - Key callbacks (`hash`, `equal`, `compare`) must not call back into the
//!   map they serve. Debug builds panic when they do.
//! - Keys are immutable while stored; there is no `key_mut`.
//! - A replacing `put` keeps the stored key and swaps only the value.
//!
//! Key contract
//! - An equivalence must give equal hashes to equal keys and must be
//!   reflexive, symmetric and transitive. A comparator must be a strict
//!   total order; order-equal keys are the same key.
//! - Violations are not detected. They cannot corrupt memory but make
//!   lookups miss and allow duplicates; see the tests for what breaks.
//! - Each entry hashes its key once on insertion and the index always uses
//!   the stored hash, so growth never calls user code.
//!
//! Notes
//! - Values are owned by the map. A map of maps owns one inner map per key;
//!   sharing an inner map between keys takes explicit `Rc<RefCell<_>>`,
//!   and then a mutation through one key is visible through all of them.
//! - Building an `OrderedMap` with no comparator and no intrinsic order is
//!   a configuration error reported by `OrderedMapBuilder::build`.

pub mod cli;
pub mod config;
pub mod demos;
pub mod equivalence;
pub mod error;
pub mod logger;
pub mod map_trait;
pub mod ordered_map;
#[cfg(test)]
mod ordered_map_proptest;
pub mod phone_book;
mod reentrancy;
pub mod sample;
pub mod unordered_map;

// Public surface
pub use equivalence::{
    Comparator, EquivalentBy, FnComparator, Intrinsic, KeyEquivalence, NaturalOrder, Reversed,
};
pub use error::{MapError, Result};
pub use map_trait::KeyValueMap;
pub use ordered_map::{OrderedMap, OrderedMapBuilder};
pub use unordered_map::UnorderedMap;

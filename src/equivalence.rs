//! Key equivalence and key ordering strategies.
//!
//! A map never inspects keys directly. `UnorderedMap` asks its
//! `KeyEquivalence` whether two keys are the same and how to hash one;
//! `OrderedMap` asks its `Comparator` how two keys order. Both capabilities
//! can come from the key type itself (`Intrinsic` over `Hash + Eq`,
//! `NaturalOrder` over `Ord`) or from a strategy value chosen when the map is
//! constructed, so the same key type can be grouped or ordered differently
//! in different maps.
//!
//! Contract
//! - `equal` is reflexive, symmetric and transitive.
//! - `equal(a, b)` implies `hash(a)` and `hash(b)` feed identical data to
//!   the hasher. Hash and equality must look at the same fields.
//! - `compare` is a strict total order: antisymmetric, transitive, total.
//!
//! None of this is checked at runtime. A strategy that breaks the contract
//! does not cause memory unsafety, but lookups may miss entries that are
//! present (two equal keys hashing apart) or the ordered map may iterate in
//! an order no caller expects.

use core::cmp::Ordering;
use core::hash::{BuildHasher, Hash, Hasher};
use core::marker::PhantomData;

/// Defines when two keys are the same key for a hashed map.
pub trait KeyEquivalence<Q: ?Sized> {
    /// Feed the parts of `key` that `equal` inspects into `state`.
    fn hash<H: Hasher>(&self, key: &Q, state: &mut H);

    fn equal(&self, a: &Q, b: &Q) -> bool;
}

/// Uses the key's own `Hash` and `Eq` implementations.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Intrinsic;

impl<Q> KeyEquivalence<Q> for Intrinsic
where
    Q: ?Sized + Hash + Eq,
{
    #[inline]
    fn hash<H: Hasher>(&self, key: &Q, state: &mut H) {
        key.hash(state);
    }

    #[inline]
    fn equal(&self, a: &Q, b: &Q) -> bool {
        a == b
    }
}

/// Treats keys as equal when a projection of them is equal, and hashes the
/// same projection. Consistent by construction.
///
/// ```
/// use keyed_map::{EquivalentBy, UnorderedMap};
///
/// // Case-insensitive keys.
/// let mut m = UnorderedMap::with_equivalence(EquivalentBy::new(|s: &String| s.to_lowercase()));
/// m.put("Anne".to_string(), 1);
/// m.put("ANNE".to_string(), 2);
/// assert_eq!(m.len(), 1);
/// assert_eq!(m.get(&"anne".to_string()), Some(&2));
/// ```
pub struct EquivalentBy<F, T> {
    project: F,
    _out: PhantomData<fn() -> T>,
}

impl<F, T> EquivalentBy<F, T> {
    pub fn new(project: F) -> Self {
        Self {
            project,
            _out: PhantomData,
        }
    }
}

impl<F: Clone, T> Clone for EquivalentBy<F, T> {
    fn clone(&self) -> Self {
        Self::new(self.project.clone())
    }
}

impl<F, T> core::fmt::Debug for EquivalentBy<F, T> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("EquivalentBy").finish_non_exhaustive()
    }
}

impl<K, F, T> KeyEquivalence<K> for EquivalentBy<F, T>
where
    K: ?Sized,
    F: Fn(&K) -> T,
    T: Hash + Eq,
{
    fn hash<H: Hasher>(&self, key: &K, state: &mut H) {
        (self.project)(key).hash(state);
    }

    fn equal(&self, a: &K, b: &K) -> bool {
        (self.project)(a) == (self.project)(b)
    }
}

/// Hash `key` under `equivalence` with a fresh hasher from `build`.
pub fn hash_with<E, Q, S>(equivalence: &E, build: &S, key: &Q) -> u64
where
    E: KeyEquivalence<Q> + ?Sized,
    Q: ?Sized,
    S: BuildHasher,
{
    let mut state = build.build_hasher();
    equivalence.hash(key, &mut state);
    state.finish()
}

/// Defines the order of keys in an ordered map.
pub trait Comparator<Q: ?Sized> {
    fn compare(&self, a: &Q, b: &Q) -> Ordering;
}

/// Uses the key's own `Ord` implementation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NaturalOrder;

impl<Q> Comparator<Q> for NaturalOrder
where
    Q: ?Sized + Ord,
{
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        a.cmp(b)
    }
}

/// A comparator backed by a closure.
#[derive(Clone, Copy)]
pub struct FnComparator<F>(pub F);

impl<F> FnComparator<F> {
    pub fn new(f: F) -> Self {
        FnComparator(f)
    }
}

impl<F> core::fmt::Debug for FnComparator<F> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str("FnComparator")
    }
}

impl<Q, F> Comparator<Q> for FnComparator<F>
where
    Q: ?Sized,
    F: Fn(&Q, &Q) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        (self.0)(a, b)
    }
}

/// Inverts the wrapped comparator.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reversed<C>(pub C);

impl<Q, C> Comparator<Q> for Reversed<C>
where
    Q: ?Sized,
    C: Comparator<Q>,
{
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        self.0.compare(b, a)
    }
}

impl<Q, C> Comparator<Q> for &C
where
    Q: ?Sized,
    C: Comparator<Q> + ?Sized,
{
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        (**self).compare(a, b)
    }
}

impl<Q, C> Comparator<Q> for Box<C>
where
    Q: ?Sized,
    C: Comparator<Q> + ?Sized,
{
    #[inline]
    fn compare(&self, a: &Q, b: &Q) -> Ordering {
        (**self).compare(a, b)
    }
}

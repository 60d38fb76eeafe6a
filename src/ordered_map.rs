//! OrderedMap: comparator-ordered map backed by an AVL tree.
//!
//! Nodes live in a `SlotMap` arena and link to their children by slot key,
//! so the tree needs no unsafe pointer juggling and freed slots are reused.
//! Every node stores its subtree height; after each structural change the
//! path back to the root is rebalanced so that sibling heights differ by at
//! most one.
//!
//! Keys are unique under the comparator, not under `Eq`. Two keys that
//! compare `Equal` are the same key even if their other fields differ: the
//! second `put` replaces the value stored under the first key.

use crate::equivalence::{Comparator, NaturalOrder};
use crate::error::{MapError, Result};
use crate::reentrancy::CallbackGuard;
use core::borrow::Borrow;
use core::cmp::Ordering;
use core::marker::PhantomData;
use slotmap::{DefaultKey, SlotMap};

type NodeId = DefaultKey;

#[derive(Clone, Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Option<NodeId>,
    right: Option<NodeId>,
    height: u8,
}

impl<K, V> Node<K, V> {
    fn leaf(key: K, value: V) -> Self {
        Self {
            key,
            value,
            left: None,
            right: None,
            height: 1,
        }
    }
}

// Structural layer: owns the nodes and knows nothing about which comparator
// is in use; callers pass it in.
#[derive(Clone)]
struct Tree<K, V> {
    root: Option<NodeId>,
    nodes: SlotMap<NodeId, Node<K, V>>,
}

impl<K, V> Tree<K, V> {
    fn new() -> Self {
        Self {
            root: None,
            nodes: SlotMap::with_key(),
        }
    }

    fn insert<C>(&mut self, cmp: &C, key: K, value: V) -> Option<V>
    where
        C: Comparator<K> + ?Sized,
    {
        let (root, replaced) = self.insert_at(cmp, self.root, key, value);
        self.root = Some(root);
        replaced
    }

    fn insert_at<C>(&mut self, cmp: &C, at: Option<NodeId>, key: K, value: V) -> (NodeId, Option<V>)
    where
        C: Comparator<K> + ?Sized,
    {
        let Some(id) = at else {
            return (self.nodes.insert(Node::leaf(key, value)), None);
        };
        match cmp.compare(&key, &self.nodes[id].key) {
            Ordering::Less => {
                let (child, replaced) = self.insert_at(cmp, self.nodes[id].left, key, value);
                self.nodes[id].left = Some(child);
                if replaced.is_some() {
                    return (id, replaced);
                }
                (self.rebalance(id), None)
            }
            Ordering::Greater => {
                let (child, replaced) = self.insert_at(cmp, self.nodes[id].right, key, value);
                self.nodes[id].right = Some(child);
                if replaced.is_some() {
                    return (id, replaced);
                }
                (self.rebalance(id), None)
            }
            Ordering::Equal => {
                log::debug!("put: key orders equal to a stored key, replacing its value");
                let old = core::mem::replace(&mut self.nodes[id].value, value);
                (id, Some(old))
            }
        }
    }

    fn find<Q, C>(&self, cmp: &C, q: &Q) -> Option<NodeId>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q> + ?Sized,
    {
        let mut at = self.root;
        while let Some(id) = at {
            let node = self.nodes.get(id)?;
            let k: &Q = node.key.borrow();
            at = match cmp.compare(q, k) {
                Ordering::Less => node.left,
                Ordering::Greater => node.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    fn remove<Q, C>(&mut self, cmp: &C, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q> + ?Sized,
    {
        let (root, removed) = self.remove_at(cmp, self.root, q);
        self.root = root;
        let node = self.nodes.remove(removed?)?;
        Some((node.key, node.value))
    }

    // Returns the new subtree root and the unlinked node, which is still
    // allocated in the arena.
    fn remove_at<Q, C>(
        &mut self,
        cmp: &C,
        at: Option<NodeId>,
        q: &Q,
    ) -> (Option<NodeId>, Option<NodeId>)
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q> + ?Sized,
    {
        let Some(id) = at else {
            return (None, None);
        };
        let k: &Q = self.nodes[id].key.borrow();
        match cmp.compare(q, k) {
            Ordering::Less => {
                let (child, removed) = self.remove_at(cmp, self.nodes[id].left, q);
                if removed.is_none() {
                    return (Some(id), None);
                }
                self.nodes[id].left = child;
                (Some(self.rebalance(id)), removed)
            }
            Ordering::Greater => {
                let (child, removed) = self.remove_at(cmp, self.nodes[id].right, q);
                if removed.is_none() {
                    return (Some(id), None);
                }
                self.nodes[id].right = child;
                (Some(self.rebalance(id)), removed)
            }
            Ordering::Equal => {
                let replacement = match (self.nodes[id].left, self.nodes[id].right) {
                    (None, right) => right,
                    (left, None) => left,
                    (Some(left), Some(right)) => {
                        let (rest, successor) = self.detach_min(right);
                        self.nodes[successor].left = Some(left);
                        self.nodes[successor].right = rest;
                        Some(self.rebalance(successor))
                    }
                };
                (replacement, Some(id))
            }
        }
    }

    // Unlink the leftmost node under `id`; returns (new subtree root, leftmost).
    fn detach_min(&mut self, id: NodeId) -> (Option<NodeId>, NodeId) {
        match self.nodes[id].left {
            None => (self.nodes[id].right, id),
            Some(left) => {
                let (rest, min) = self.detach_min(left);
                self.nodes[id].left = rest;
                (Some(self.rebalance(id)), min)
            }
        }
    }

    fn height(&self, at: Option<NodeId>) -> i16 {
        at.and_then(|id| self.nodes.get(id))
            .map_or(0, |n| i16::from(n.height))
    }

    fn update_height(&mut self, id: NodeId) {
        let h = 1 + self
            .height(self.nodes[id].left)
            .max(self.height(self.nodes[id].right));
        self.nodes[id].height = h as u8;
    }

    fn balance(&self, id: NodeId) -> i16 {
        self.height(self.nodes[id].left) - self.height(self.nodes[id].right)
    }

    fn rotate_right(&mut self, y: NodeId) -> NodeId {
        let Some(x) = self.nodes[y].left else {
            return y;
        };
        self.nodes[y].left = self.nodes[x].right;
        self.nodes[x].right = Some(y);
        self.update_height(y);
        self.update_height(x);
        x
    }

    fn rotate_left(&mut self, x: NodeId) -> NodeId {
        let Some(y) = self.nodes[x].right else {
            return x;
        };
        self.nodes[x].right = self.nodes[y].left;
        self.nodes[y].left = Some(x);
        self.update_height(x);
        self.update_height(y);
        y
    }

    // Restore the AVL bound at `id`; returns the subtree's new root.
    fn rebalance(&mut self, id: NodeId) -> NodeId {
        self.update_height(id);
        let bf = self.balance(id);
        if bf > 1 {
            if let Some(left) = self.nodes[id].left {
                if self.balance(left) < 0 {
                    log::trace!("rebalance: left-right rotation");
                    let l = self.rotate_left(left);
                    self.nodes[id].left = Some(l);
                }
            }
            return self.rotate_right(id);
        }
        if bf < -1 {
            if let Some(right) = self.nodes[id].right {
                if self.balance(right) > 0 {
                    log::trace!("rebalance: right-left rotation");
                    let r = self.rotate_right(right);
                    self.nodes[id].right = Some(r);
                }
            }
            return self.rotate_left(id);
        }
        id
    }

    fn edge(&self, leftmost: bool) -> Option<NodeId> {
        let mut id = self.root?;
        loop {
            let n = self.nodes.get(id)?;
            let next = if leftmost { n.left } else { n.right };
            match next {
                Some(child) => id = child,
                None => return Some(id),
            }
        }
    }

    fn in_order(&self) -> Vec<NodeId> {
        let mut ids = Vec::with_capacity(self.nodes.len());
        let mut stack = Vec::new();
        let mut at = self.root;
        loop {
            while let Some(id) = at {
                stack.push(id);
                at = self.nodes.get(id).and_then(|n| n.left);
            }
            let Some(id) = stack.pop() else { break };
            ids.push(id);
            at = self.nodes.get(id).and_then(|n| n.right);
        }
        ids
    }
}

/// A map whose entries iterate in ascending order of `C`.
#[derive(Clone)]
pub struct OrderedMap<K, V, C = NaturalOrder> {
    comparator: C,
    tree: Tree<K, V>,
    reentrancy: CallbackGuard,
}

impl<K, V> OrderedMap<K, V>
where
    K: Ord,
{
    /// An empty map ordered by the key type's own `Ord`.
    pub fn new() -> Self {
        Self::with_comparator(NaturalOrder)
    }

    /// Start assembling a map whose ordering is decided at runtime. The
    /// key type's own `Ord` is the fallback when no comparator is given.
    /// For key types without `Ord`, start from `OrderedMapBuilder::new`.
    pub fn builder() -> OrderedMapBuilder<K, V> {
        OrderedMapBuilder::new().natural_order()
    }
}

impl<K, V> Default for OrderedMap<K, V>
where
    K: Ord,
{
    fn default() -> Self {
        Self::new()
    }
}

/// In-order iterator over `(&K, &V)`.
pub struct Iter<'a, K, V> {
    nodes: &'a SlotMap<NodeId, Node<K, V>>,
    stack: Vec<NodeId>,
    remaining: usize,
}

impl<'a, K, V> Iter<'a, K, V> {
    fn new(tree: &'a Tree<K, V>) -> Self {
        let mut it = Self {
            nodes: &tree.nodes,
            stack: Vec::new(),
            remaining: tree.nodes.len(),
        };
        it.push_left_spine(tree.root);
        it
    }

    fn push_left_spine(&mut self, mut at: Option<NodeId>) {
        while let Some(id) = at {
            self.stack.push(id);
            at = self.nodes.get(id).and_then(|n| n.left);
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let nodes = self.nodes;
        let node = nodes.get(id)?;
        self.push_left_spine(node.right);
        self.remaining = self.remaining.saturating_sub(1);
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Owning in-order iterator over `(K, V)`.
pub struct IntoIter<K, V> {
    nodes: SlotMap<NodeId, Node<K, V>>,
    order: std::vec::IntoIter<NodeId>,
}

impl<K, V> Iterator for IntoIter<K, V> {
    type Item = (K, V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.order.next()?;
        self.nodes.remove(id).map(|n| (n.key, n.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.order.size_hint()
    }
}

impl<K, V, C> OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    /// An empty map ordered by `comparator`, regardless of any order the
    /// key type defines itself.
    pub fn with_comparator(comparator: C) -> Self {
        Self {
            comparator,
            tree: Tree::new(),
            reentrancy: CallbackGuard::new(),
        }
    }

    pub fn comparator(&self) -> &C {
        &self.comparator
    }

    pub fn len(&self) -> usize {
        self.tree.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.nodes.is_empty()
    }

    /// Insert `key -> value`, or replace the value stored under a key that
    /// compares `Equal`. The stored key is kept. Returns the replaced value.
    pub fn put(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter("put");
        self.tree.insert(&self.comparator, key, value)
    }

    /// `None` means the key is absent; a stored value is always `Some`.
    pub fn get<Q>(&self, q: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let _g = self.reentrancy.enter("get");
        let id = self.tree.find(&self.comparator, q)?;
        self.tree.nodes.get(id).map(|n| &n.value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Option<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let _g = self.reentrancy.enter("get_key_value");
        let id = self.tree.find(&self.comparator, q)?;
        self.tree.nodes.get(id).map(|n| (&n.key, &n.value))
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let _g = self.reentrancy.enter("get_mut");
        let id = self.tree.find(&self.comparator, q)?;
        self.tree.nodes.get_mut(id).map(|n| &mut n.value)
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let _g = self.reentrancy.enter("contains_key");
        self.tree.find(&self.comparator, q).is_some()
    }

    /// Remove `key` and return its value. Absent keys are a no-op.
    pub fn remove<Q>(&mut self, q: &Q) -> Option<V>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    pub fn remove_entry<Q>(&mut self, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized,
        C: Comparator<Q>,
    {
        let _g = self.reentrancy.enter("remove");
        self.tree.remove(&self.comparator, q)
    }

    /// Smallest entry under the comparator.
    pub fn first(&self) -> Option<(&K, &V)> {
        let id = self.tree.edge(true)?;
        self.tree.nodes.get(id).map(|n| (&n.key, &n.value))
    }

    /// Largest entry under the comparator.
    pub fn last(&self) -> Option<(&K, &V)> {
        let id = self.tree.edge(false)?;
        self.tree.nodes.get(id).map(|n| (&n.key, &n.value))
    }

    pub fn clear(&mut self) {
        let _g = self.reentrancy.enter("clear");
        log::trace!("clearing ordered map with {} entries", self.tree.nodes.len());
        self.tree = Tree::new();
    }

    /// All entries in ascending key order.
    pub fn entries(&self) -> Iter<'_, K, V> {
        Iter::new(&self.tree)
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.entries()
    }

    /// Keys in ascending order.
    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.entries().map(|(k, _)| k)
    }

    /// Values in ascending order of their keys.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.entries().map(|(_, v)| v)
    }
}

impl<K, V, C> core::fmt::Debug for OrderedMap<K, V, C>
where
    K: core::fmt::Debug,
    V: core::fmt::Debug,
    C: Comparator<K>,
{
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_map().entries(self.entries()).finish()
    }
}

impl<K, V, C> Extend<(K, V)> for OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.put(k, v);
        }
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMap<K, V>
where
    K: Ord,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut m = Self::new();
        m.extend(iter);
        m
    }
}

impl<'a, K, V, C> IntoIterator for &'a OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries()
    }
}

impl<K, V, C> IntoIterator for OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    type Item = (K, V);
    type IntoIter = IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        let order = self.tree.in_order();
        IntoIter {
            nodes: self.tree.nodes,
            order: order.into_iter(),
        }
    }
}

/// Assembles an `OrderedMap` whose ordering is chosen at runtime.
///
/// An external comparator wins over the key type's intrinsic order when
/// both are configured. `OrderedMap::builder` starts with the intrinsic
/// order already set; `OrderedMapBuilder::new` starts with nothing, and
/// `build` fails with `MapError::MissingOrdering` if nothing is added.
pub struct OrderedMapBuilder<K, V> {
    comparator: Option<Box<dyn Comparator<K>>>,
    intrinsic: Option<Box<dyn Comparator<K>>>,
    _values: PhantomData<fn() -> V>,
}

impl<K, V> OrderedMapBuilder<K, V> {
    /// A builder with no ordering configured yet.
    pub fn new() -> Self {
        Self {
            comparator: None,
            intrinsic: None,
            _values: PhantomData,
        }
    }

    /// Order keys with an external strategy.
    pub fn comparator<C>(mut self, comparator: C) -> Self
    where
        C: Comparator<K> + 'static,
    {
        self.comparator = Some(Box::new(comparator));
        self
    }

    /// Order keys with an external strategy if one is given.
    pub fn optional_comparator<C>(self, comparator: Option<C>) -> Self
    where
        C: Comparator<K> + 'static,
    {
        match comparator {
            Some(c) => self.comparator(c),
            None => self,
        }
    }

    /// Allow falling back to the key type's own `Ord`.
    pub fn natural_order(mut self) -> Self
    where
        K: Ord,
    {
        self.intrinsic = Some(Box::new(NaturalOrder));
        self
    }

    pub fn build(self) -> Result<OrderedMap<K, V, Box<dyn Comparator<K>>>> {
        let comparator = match (self.comparator, self.intrinsic) {
            (Some(external), intrinsic) => {
                if intrinsic.is_some() {
                    log::debug!(
                        "ordered map over {}: external comparator overrides intrinsic order",
                        core::any::type_name::<K>()
                    );
                }
                external
            }
            (None, Some(intrinsic)) => intrinsic,
            (None, None) => {
                return Err(MapError::MissingOrdering {
                    key_type: core::any::type_name::<K>(),
                })
            }
        };
        Ok(OrderedMap::with_comparator(comparator))
    }
}

impl<K, V> Default for OrderedMapBuilder<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
impl<K, V, C> OrderedMap<K, V, C>
where
    C: Comparator<K>,
{
    /// Verify ordering, AVL balance and stored heights; returns the number of
    /// reachable nodes.
    pub(crate) fn check_invariants(&self) -> core::result::Result<usize, String> {
        fn walk<K, V>(
            t: &Tree<K, V>,
            at: Option<NodeId>,
        ) -> core::result::Result<(i16, usize), String> {
            let Some(id) = at else { return Ok((0, 0)) };
            let n = t.nodes.get(id).ok_or("dangling child link")?;
            let (lh, lc) = walk(t, n.left)?;
            let (rh, rc) = walk(t, n.right)?;
            if (lh - rh).abs() > 1 {
                return Err(format!("unbalanced node: left {lh}, right {rh}"));
            }
            let h = 1 + lh.max(rh);
            if i16::from(n.height) != h {
                return Err(format!("stale height {} (actual {h})", n.height));
            }
            Ok((h, lc + rc + 1))
        }
        let (_, count) = walk(&self.tree, self.tree.root)?;
        if count != self.tree.nodes.len() {
            return Err(format!(
                "{} nodes reachable, {} allocated",
                count,
                self.tree.nodes.len()
            ));
        }
        let keys: Vec<&K> = self.keys().collect();
        for w in keys.windows(2) {
            if self.comparator.compare(w[0], w[1]) != Ordering::Less {
                return Err("keys out of order".to_string());
            }
        }
        Ok(count)
    }
}

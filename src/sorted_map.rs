//! StrategySortedMap: ordered map keyed by an [`OrderStrategy`].
//!
//! An AVL tree whose nodes live in a `SlotMap` arena and link to each other
//! by slot key. Every descent is guided by `order.compare`; keys comparing
//! `Equal` share one slot even if some equality strategy would tell them
//! apart. Iteration walks the tree in order with an explicit stack and never
//! calls the strategy.
//!
//! The tree is not re-sorted when a resident key changes, and iteration still
//! yields it at its old position. Lookups and inserts follow the compare path
//! from the root: a mutated key is found, and an equal key merges with it,
//! exactly when its node lies on that path. Otherwise the lookup misses and
//! an equal insert adds a second node.

use crate::error::{InsertError, StrategyError, StrategyResolutionError};
use crate::reentrancy::DebugReentrancy;
use crate::registry::StrategyRegistry;
use crate::resolve::Resolve;
use crate::strategy::OrderStrategy;
use core::cmp::Ordering;
use core::fmt;
use slotmap::{DefaultKey, SlotMap};
use std::rc::Rc;

type Link = Option<DefaultKey>;

#[derive(Debug)]
struct Node<K, V> {
    key: K,
    value: V,
    left: Link,
    right: Link,
    height: u8,
}

enum Placed<V> {
    New,
    Replaced(V),
    Rejected,
}

/// Arena-backed AVL tree. Methods that descend by key take the order as a
/// parameter so the owning map can hold its reentrancy guard meanwhile.
struct Tree<K, V> {
    nodes: SlotMap<DefaultKey, Node<K, V>>,
    root: Link,
}

impl<K, V> Tree<K, V> {
    fn new() -> Self {
        Self {
            nodes: SlotMap::with_key(),
            root: None,
        }
    }

    fn height_of(&self, link: Link) -> u8 {
        link.map_or(0, |id| self.nodes[id].height)
    }

    fn update_height(&mut self, id: DefaultKey) {
        let n = &self.nodes[id];
        let h = 1 + self.height_of(n.left).max(self.height_of(n.right));
        self.nodes[id].height = h;
    }

    fn balance_of(&self, id: DefaultKey) -> i16 {
        let n = &self.nodes[id];
        i16::from(self.height_of(n.left)) - i16::from(self.height_of(n.right))
    }

    fn rotate_right(&mut self, id: DefaultKey) -> DefaultKey {
        let l = self.nodes[id]
            .left
            .expect("right rotation requires a left child");
        self.nodes[id].left = self.nodes[l].right;
        self.nodes[l].right = Some(id);
        self.update_height(id);
        self.update_height(l);
        l
    }

    fn rotate_left(&mut self, id: DefaultKey) -> DefaultKey {
        let r = self.nodes[id]
            .right
            .expect("left rotation requires a right child");
        self.nodes[id].right = self.nodes[r].left;
        self.nodes[r].left = Some(id);
        self.update_height(id);
        self.update_height(r);
        r
    }

    /// Restore the AVL invariant at `id`; returns the subtree's new root.
    fn rebalance(&mut self, id: DefaultKey) -> DefaultKey {
        self.update_height(id);
        let balance = self.balance_of(id);
        if balance > 1 {
            let l = self.nodes[id].left.expect("left-heavy node has a left child");
            if self.balance_of(l) < 0 {
                let nl = self.rotate_left(l);
                self.nodes[id].left = Some(nl);
            }
            tracing::trace!(balance, "sorted map rotate right");
            self.rotate_right(id)
        } else if balance < -1 {
            let r = self.nodes[id]
                .right
                .expect("right-heavy node has a right child");
            if self.balance_of(r) > 0 {
                let nr = self.rotate_right(r);
                self.nodes[id].right = Some(nr);
            }
            tracing::trace!(balance, "sorted map rotate left");
            self.rotate_left(id)
        } else {
            id
        }
    }

    /// Unlink the minimum of the subtree at `id`; returns (new subtree root,
    /// detached node).
    fn detach_min(&mut self, id: DefaultKey) -> (Link, DefaultKey) {
        let left = self.nodes[id].left;
        match left {
            None => (self.nodes[id].right.take(), id),
            Some(l) => {
                let (nl, min) = self.detach_min(l);
                self.nodes[id].left = nl;
                (Some(self.rebalance(id)), min)
            }
        }
    }

    fn detach_max(&mut self, id: DefaultKey) -> (Link, DefaultKey) {
        let right = self.nodes[id].right;
        match right {
            None => (self.nodes[id].left.take(), id),
            Some(r) => {
                let (nr, max) = self.detach_max(r);
                self.nodes[id].right = nr;
                (Some(self.rebalance(id)), max)
            }
        }
    }

    fn extreme(&self, leftmost: bool) -> Option<(&K, &V)> {
        let mut at = self.root?;
        loop {
            let n = &self.nodes[at];
            let next = if leftmost { n.left } else { n.right };
            match next {
                Some(child) => at = child,
                None => return Some((&n.key, &n.value)),
            }
        }
    }

    fn pop_extreme(&mut self, leftmost: bool) -> Option<(K, V)> {
        let root = self.root?;
        let (new_root, id) = if leftmost {
            self.detach_min(root)
        } else {
            self.detach_max(root)
        };
        self.root = new_root;
        self.nodes.remove(id).map(|n| (n.key, n.value))
    }

    fn locate<O: OrderStrategy<K>>(&self, order: &O, key: &K) -> Link {
        let mut at = self.root;
        while let Some(id) = at {
            let n = &self.nodes[id];
            at = match order.compare(key, &n.key) {
                Ordering::Less => n.left,
                Ordering::Greater => n.right,
                Ordering::Equal => return Some(id),
            };
        }
        None
    }

    fn place<O: OrderStrategy<K>>(
        &mut self,
        order: &O,
        at: Link,
        key: K,
        value: V,
        overwrite: bool,
    ) -> (DefaultKey, Placed<V>) {
        let Some(id) = at else {
            let id = self.nodes.insert(Node {
                key,
                value,
                left: None,
                right: None,
                height: 1,
            });
            return (id, Placed::New);
        };
        match order.compare(&key, &self.nodes[id].key) {
            Ordering::Equal if overwrite => {
                let old = core::mem::replace(&mut self.nodes[id].value, value);
                (id, Placed::Replaced(old))
            }
            Ordering::Equal => (id, Placed::Rejected),
            Ordering::Less => {
                let left = self.nodes[id].left;
                let (child, placed) = self.place(order, left, key, value, overwrite);
                self.nodes[id].left = Some(child);
                (self.rebalance(id), placed)
            }
            Ordering::Greater => {
                let right = self.nodes[id].right;
                let (child, placed) = self.place(order, right, key, value, overwrite);
                self.nodes[id].right = Some(child);
                (self.rebalance(id), placed)
            }
        }
    }

    fn insert<O: OrderStrategy<K>>(
        &mut self,
        order: &O,
        key: K,
        value: V,
        overwrite: bool,
    ) -> Placed<V> {
        let (root, placed) = self.place(order, self.root, key, value, overwrite);
        self.root = Some(root);
        placed
    }

    /// Returns (new subtree root, unlinked node).
    fn unlink<O: OrderStrategy<K>>(&mut self, order: &O, at: Link, key: &K) -> (Link, Link) {
        let Some(id) = at else {
            return (None, None);
        };
        match order.compare(key, &self.nodes[id].key) {
            Ordering::Less => {
                let left = self.nodes[id].left;
                let (child, removed) = self.unlink(order, left, key);
                self.nodes[id].left = child;
                (Some(self.rebalance(id)), removed)
            }
            Ordering::Greater => {
                let right = self.nodes[id].right;
                let (child, removed) = self.unlink(order, right, key);
                self.nodes[id].right = child;
                (Some(self.rebalance(id)), removed)
            }
            Ordering::Equal => {
                let (left, right) = (self.nodes[id].left, self.nodes[id].right);
                match (left, right) {
                    (None, only) | (only, None) => (only, Some(id)),
                    (Some(l), Some(r)) => {
                        let (new_right, succ) = self.detach_min(r);
                        self.nodes[succ].left = Some(l);
                        self.nodes[succ].right = new_right;
                        (Some(self.rebalance(succ)), Some(id))
                    }
                }
            }
        }
    }

    fn remove<O: OrderStrategy<K>>(&mut self, order: &O, key: &K) -> Option<(K, V)> {
        let (root, removed) = self.unlink(order, self.root, key);
        self.root = root;
        let node = self.nodes.remove(removed?)?;
        Some((node.key, node.value))
    }
}

pub struct StrategySortedMap<K, V, O> {
    order: O,
    tree: Tree<K, V>,
    reentrancy: DebugReentrancy,
}

impl<K: Resolve, V> StrategySortedMap<K, V, K::Order> {
    /// Map using the key type's resolved default order. Fails for key types
    /// that only have identity.
    pub fn try_new() -> Result<Self, StrategyResolutionError> {
        K::default_order().map(Self::with_order)
    }
}

impl<K: 'static, V> StrategySortedMap<K, V, Rc<dyn OrderStrategy<K>>> {
    /// Map using the order registered under `name`.
    pub fn from_registry(registry: &StrategyRegistry, name: &str) -> Result<Self, StrategyError> {
        Ok(Self::with_order(registry.order::<K>(name)?))
    }
}

impl<K, V, O> StrategySortedMap<K, V, O> {
    pub fn with_order(order: O) -> Self {
        Self {
            order,
            tree: Tree::new(),
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// The order bound at construction. There is no setter.
    pub fn order(&self) -> &O {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.tree.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tree.nodes.is_empty()
    }

    pub fn clear(&mut self) {
        self.tree.nodes.clear();
        self.tree.root = None;
    }

    /// Ascending iterator. Each call starts over from the smallest key.
    pub fn iter(&self) -> Iter<'_, K, V> {
        let mut it = Iter {
            nodes: &self.tree.nodes,
            stack: Vec::new(),
            remaining: self.tree.nodes.len(),
        };
        it.push_left(self.tree.root);
        it
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn first(&self) -> Option<(&K, &V)> {
        self.tree.extreme(true)
    }

    pub fn last(&self) -> Option<(&K, &V)> {
        self.tree.extreme(false)
    }

    /// Remove the smallest entry by position; works even if keys have been
    /// mutated since insertion.
    pub fn pop_first(&mut self) -> Option<(K, V)> {
        self.tree.pop_extreme(true)
    }

    pub fn pop_last(&mut self) -> Option<(K, V)> {
        self.tree.pop_extreme(false)
    }

    /// Tree height; 0 when empty.
    pub fn height(&self) -> usize {
        usize::from(self.tree.height_of(self.tree.root))
    }
}

impl<K, V, O: OrderStrategy<K>> StrategySortedMap<K, V, O> {
    pub fn contains_key(&self, key: &K) -> bool {
        let _g = self.reentrancy.enter("contains_key");
        self.tree.locate(&self.order, key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let _g = self.reentrancy.enter("get");
        let id = self.tree.locate(&self.order, key)?;
        self.tree.nodes.get(id).map(|n| &n.value)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let _g = self.reentrancy.enter("get_key_value");
        let id = self.tree.locate(&self.order, key)?;
        self.tree.nodes.get(id).map(|n| (&n.key, &n.value))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let _g = self.reentrancy.enter("get_mut");
        let id = self.tree.locate(&self.order, key)?;
        self.tree.nodes.get_mut(id).map(|n| &mut n.value)
    }

    /// Insert or overwrite. On a resident key comparing `Equal` the value is
    /// replaced and returned; the resident key is kept.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter("insert");
        match self.tree.insert(&self.order, key, value, true) {
            Placed::Replaced(old) => Some(old),
            Placed::New | Placed::Rejected => None,
        }
    }

    /// Insert only if no resident key compares `Equal`.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<(), InsertError> {
        let _g = self.reentrancy.enter("try_insert");
        match self.tree.insert(&self.order, key, value, false) {
            Placed::New => Ok(()),
            Placed::Rejected | Placed::Replaced(_) => Err(InsertError::DuplicateKey),
        }
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Remove and return the resident key comparing `Equal` to `key`, with
    /// its value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let _g = self.reentrancy.enter("remove");
        self.tree.remove(&self.order, key)
    }
}

/// In-order iterator. Finite; holds a stack of at most `height` slots.
pub struct Iter<'a, K, V> {
    nodes: &'a SlotMap<DefaultKey, Node<K, V>>,
    stack: Vec<DefaultKey>,
    remaining: usize,
}

impl<K, V> Iter<'_, K, V> {
    fn push_left(&mut self, mut at: Link) {
        while let Some(id) = at {
            self.stack.push(id);
            at = self.nodes[id].left;
        }
    }
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.stack.pop()?;
        let nodes = self.nodes;
        let node = &nodes[id];
        self.push_left(node.right);
        self.remaining -= 1;
        Some((&node.key, &node.value))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

impl<K, V> core::iter::FusedIterator for Iter<'_, K, V> {}

impl<'a, K, V, O> IntoIterator for &'a StrategySortedMap<K, V, O> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, O: OrderStrategy<K>> Extend<(K, V)> for StrategySortedMap<K, V, O> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: fmt::Debug, V: fmt::Debug, O> fmt::Debug for StrategySortedMap<K, V, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

//! StrategyHashMap: hash map whose key identity comes from an
//! [`EqualityStrategy`], with stable handles and a debug reentrancy guard.
//!
//! Layout: entries live in a `SlotMap` (generational keys back the public
//! [`Handle`]), and a `hashbrown::HashTable` of slot keys indexes them by
//! hash. Each entry stores the hash computed when it was inserted; probing
//! requires the stored hash to match before `equals` is consulted, and table
//! growth rehashes from the stored hashes without calling the strategy.
//!
//! Consequence for mutable keys: if a resident key changes so that
//! `strategy.hash` changes, lookups for it miss, `len` is unchanged,
//! iteration still yields the entry, and a new key equal to the mutated one
//! is inserted beside it rather than merged.

use crate::error::{InsertError, StrategyError};
use crate::reentrancy::DebugReentrancy;
use crate::registry::StrategyRegistry;
use crate::resolve::Resolve;
use crate::strategy::EqualityStrategy;
use core::fmt;
use hashbrown::hash_table;
use hashbrown::HashTable;
use slotmap::{DefaultKey, SlotMap};
use std::rc::Rc;

/// Construction-time sizing.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HashConfig {
    /// Entries to reserve room for up front.
    pub initial_capacity: usize,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub struct Handle(DefaultKey);

impl Handle {
    pub fn key<'a, K, V, E>(&self, map: &'a StrategyHashMap<K, V, E>) -> Option<&'a K> {
        map.slots.get(self.0).map(|e| &e.key)
    }

    pub fn value<'a, K, V, E>(&self, map: &'a StrategyHashMap<K, V, E>) -> Option<&'a V> {
        map.slots.get(self.0).map(|e| &e.value)
    }

    pub fn value_mut<'a, K, V, E>(
        &self,
        map: &'a mut StrategyHashMap<K, V, E>,
    ) -> Option<&'a mut V> {
        map.slots.get_mut(self.0).map(|e| &mut e.value)
    }
}

#[derive(Debug)]
struct Entry<K, V> {
    key: K,
    value: V,
    hash: u64,
}

pub struct StrategyHashMap<K, V, E> {
    strategy: E,
    index: HashTable<DefaultKey>,
    slots: SlotMap<DefaultKey, Entry<K, V>>,
    reentrancy: DebugReentrancy,
}

impl<K: Resolve, V> StrategyHashMap<K, V, K::Equality> {
    /// Map using the key type's resolved default equality.
    pub fn new() -> Self {
        Self::with_strategy(K::default_equality())
    }
}

impl<K: Resolve, V> Default for StrategyHashMap<K, V, K::Equality> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static, V> StrategyHashMap<K, V, Rc<dyn EqualityStrategy<K>>> {
    /// Map using the equality registered under `name`. Fails if the name is
    /// unknown or the strategy was registered for a different key type.
    pub fn from_registry(registry: &StrategyRegistry, name: &str) -> Result<Self, StrategyError> {
        Ok(Self::with_strategy(registry.equality::<K>(name)?))
    }
}

/// Iterator over entries in unspecified order.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &e.value))
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for Iter<'_, K, V> {}

/// Iterator over entries with mutable values.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, DefaultKey, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }
    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<K, V> ExactSizeIterator for IterMut<'_, K, V> {}

impl<K, V, E> StrategyHashMap<K, V, E> {
    pub fn with_strategy(strategy: E) -> Self {
        Self::with_config(HashConfig::default(), strategy)
    }

    pub fn with_capacity_and_strategy(capacity: usize, strategy: E) -> Self {
        Self::with_config(
            HashConfig {
                initial_capacity: capacity,
            },
            strategy,
        )
    }

    pub fn with_config(config: HashConfig, strategy: E) -> Self {
        Self {
            strategy,
            index: HashTable::with_capacity(config.initial_capacity),
            slots: SlotMap::with_capacity_and_key(config.initial_capacity),
            reentrancy: DebugReentrancy::new(),
        }
    }

    /// The strategy bound at construction. There is no setter.
    pub fn strategy(&self) -> &E {
        &self.strategy
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Entries the index can hold before it grows.
    pub fn capacity(&self) -> usize {
        self.index.capacity()
    }

    pub fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.slots.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }

    pub fn values_mut(&mut self) -> impl Iterator<Item = &mut V> + '_ {
        self.iter_mut().map(|(_, v)| v)
    }

    /// Unlink the entry behind `handle`. Works from the stored hash, so it
    /// also removes entries whose key has since been mutated.
    pub fn remove_handle(&mut self, handle: Handle) -> Option<(K, V)> {
        let slot = handle.0;
        let entry = self.slots.remove(slot)?;
        if let Ok(occupied) = self.index.find_entry(entry.hash, |&s| s == slot) {
            occupied.remove();
        } else {
            debug_assert!(false, "live slot missing from index");
        }
        Some((entry.key, entry.value))
    }

    /// Keep only entries for which `keep` returns true.
    pub fn retain<F>(&mut self, mut keep: F)
    where
        F: FnMut(&K, &mut V) -> bool,
    {
        self.slots.retain(|_, e| keep(&e.key, &mut e.value));
        let slots = &self.slots;
        self.index.retain(|s| slots.contains_key(*s));
    }
}

impl<K, V, E: EqualityStrategy<K>> StrategyHashMap<K, V, E> {
    fn locate(&self, hash: u64, key: &K) -> Option<DefaultKey> {
        self.index
            .find(hash, |&s| {
                self.slots
                    .get(s)
                    .map(|e| e.hash == hash && self.strategy.equals(&e.key, key))
                    .unwrap_or(false)
            })
            .copied()
    }

    fn trace_growth(&self, before: usize) {
        let after = self.index.capacity();
        if after != before {
            tracing::trace!(
                old_capacity = before,
                new_capacity = after,
                len = self.slots.len(),
                "strategy hash map grew; entries re-indexed from stored hashes"
            );
        }
    }

    pub fn find(&self, key: &K) -> Option<Handle> {
        let _g = self.reentrancy.enter("find");
        let hash = self.strategy.hash(key);
        self.locate(hash, key).map(Handle)
    }

    pub fn contains_key(&self, key: &K) -> bool {
        let _g = self.reentrancy.enter("contains_key");
        let hash = self.strategy.hash(key);
        self.locate(hash, key).is_some()
    }

    pub fn get(&self, key: &K) -> Option<&V> {
        let _g = self.reentrancy.enter("get");
        let hash = self.strategy.hash(key);
        let slot = self.locate(hash, key)?;
        self.slots.get(slot).map(|e| &e.value)
    }

    pub fn get_key_value(&self, key: &K) -> Option<(&K, &V)> {
        let _g = self.reentrancy.enter("get_key_value");
        let hash = self.strategy.hash(key);
        let slot = self.locate(hash, key)?;
        self.slots.get(slot).map(|e| (&e.key, &e.value))
    }

    pub fn get_mut(&mut self, key: &K) -> Option<&mut V> {
        let slot = {
            let _g = self.reentrancy.enter("get_mut");
            let hash = self.strategy.hash(key);
            self.locate(hash, key)?
        };
        self.slots.get_mut(slot).map(|e| &mut e.value)
    }

    /// Insert or overwrite. On an equal resident key the value is replaced
    /// and returned; the resident key is kept and `key` is dropped.
    pub fn insert(&mut self, key: K, value: V) -> Option<V> {
        let _g = self.reentrancy.enter("insert");
        let hash = self.strategy.hash(&key);
        let before = self.index.capacity();
        let slots = &mut self.slots;
        let strategy = &self.strategy;
        let replaced = match self.index.entry(
            hash,
            |&s| {
                slots
                    .get(s)
                    .map(|e| e.hash == hash && strategy.equals(&e.key, &key))
                    .unwrap_or(false)
            },
            |&s| slots.get(s).map(|e| e.hash).unwrap_or(0),
        ) {
            hash_table::Entry::Occupied(o) => {
                let slot = *o.get();
                slots
                    .get_mut(slot)
                    .map(|e| core::mem::replace(&mut e.value, value))
            }
            hash_table::Entry::Vacant(v) => {
                let slot = slots.insert(Entry { key, value, hash });
                v.insert(slot);
                None
            }
        };
        self.trace_growth(before);
        replaced
    }

    /// Insert only if no equal key is resident; the map is unchanged on
    /// `Err`.
    pub fn try_insert(&mut self, key: K, value: V) -> Result<Handle, InsertError> {
        self.try_insert_with(key, || value)
    }

    /// Like [`try_insert`](Self::try_insert), but `default` only runs when
    /// the key is new.
    pub fn try_insert_with<F>(&mut self, key: K, default: F) -> Result<Handle, InsertError>
    where
        F: FnOnce() -> V,
    {
        let _g = self.reentrancy.enter("try_insert");
        let hash = self.strategy.hash(&key);
        let before = self.index.capacity();
        let slots = &mut self.slots;
        let strategy = &self.strategy;
        let res = match self.index.entry(
            hash,
            |&s| {
                slots
                    .get(s)
                    .map(|e| e.hash == hash && strategy.equals(&e.key, &key))
                    .unwrap_or(false)
            },
            |&s| slots.get(s).map(|e| e.hash).unwrap_or(0),
        ) {
            hash_table::Entry::Occupied(_) => Err(InsertError::DuplicateKey),
            hash_table::Entry::Vacant(v) => {
                let value = default();
                let slot = slots.insert(Entry { key, value, hash });
                v.insert(slot);
                Ok(Handle(slot))
            }
        };
        self.trace_growth(before);
        res
    }

    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.remove_entry(key).map(|(_, v)| v)
    }

    /// Remove and return the resident key (which may differ from `key` in
    /// ways the strategy ignores) together with its value.
    pub fn remove_entry(&mut self, key: &K) -> Option<(K, V)> {
        let slot = {
            let _g = self.reentrancy.enter("remove");
            let hash = self.strategy.hash(key);
            self.locate(hash, key)?
        };
        self.remove_handle(Handle(slot))
    }
}

impl<K, V, E: EqualityStrategy<K>> Extend<(K, V)> for StrategyHashMap<K, V, E> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl<K: Resolve, V> FromIterator<(K, V)> for StrategyHashMap<K, V, K::Equality> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut map = Self::new();
        map.extend(iter);
        map
    }
}

impl<'a, K, V, E> IntoIterator for &'a StrategyHashMap<K, V, E> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K: fmt::Debug, V: fmt::Debug, E> fmt::Debug for StrategyHashMap<K, V, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

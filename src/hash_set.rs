//! StrategyHashSet: set semantics over [`StrategyHashMap`] with the value
//! elided.

use crate::error::StrategyError;
use crate::hash_map::{HashConfig, StrategyHashMap};
use crate::registry::StrategyRegistry;
use crate::resolve::Resolve;
use crate::strategy::EqualityStrategy;
use core::fmt;
use std::rc::Rc;

pub struct StrategyHashSet<K, E> {
    map: StrategyHashMap<K, (), E>,
}

impl<K: Resolve> StrategyHashSet<K, K::Equality> {
    pub fn new() -> Self {
        Self {
            map: StrategyHashMap::new(),
        }
    }
}

impl<K: Resolve> Default for StrategyHashSet<K, K::Equality> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: 'static> StrategyHashSet<K, Rc<dyn EqualityStrategy<K>>> {
    pub fn from_registry(registry: &StrategyRegistry, name: &str) -> Result<Self, StrategyError> {
        Ok(Self {
            map: StrategyHashMap::from_registry(registry, name)?,
        })
    }
}

impl<K, E> StrategyHashSet<K, E> {
    pub fn with_strategy(strategy: E) -> Self {
        Self {
            map: StrategyHashMap::with_strategy(strategy),
        }
    }

    pub fn with_config(config: HashConfig, strategy: E) -> Self {
        Self {
            map: StrategyHashMap::with_config(config, strategy),
        }
    }

    pub fn strategy(&self) -> &E {
        self.map.strategy()
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn clear(&mut self) {
        self.map.clear()
    }

    /// Members in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = &K> + '_ {
        self.map.keys()
    }

    pub fn retain<F: FnMut(&K) -> bool>(&mut self, mut keep: F) {
        self.map.retain(|k, _| keep(k))
    }
}

impl<K, E: EqualityStrategy<K>> StrategyHashSet<K, E> {
    /// Adds `key` unless an equal member exists. Returns whether it was
    /// added; an existing member is kept and `key` is dropped.
    pub fn insert(&mut self, key: K) -> bool {
        self.map.try_insert(key, ()).is_ok()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    /// The resident member equal to `key`.
    pub fn get(&self, key: &K) -> Option<&K> {
        self.map.get_key_value(key).map(|(k, _)| k)
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }

    /// Remove and return the resident member equal to `key`.
    pub fn take(&mut self, key: &K) -> Option<K> {
        self.map.remove_entry(key).map(|(k, _)| k)
    }
}

impl<K, E: EqualityStrategy<K>> Extend<K> for StrategyHashSet<K, E> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K: Resolve> FromIterator<K> for StrategyHashSet<K, K::Equality> {
    fn from_iter<I: IntoIterator<Item = K>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<K: fmt::Debug, E> fmt::Debug for StrategyHashSet<K, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

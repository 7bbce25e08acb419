//! StrategySortedSet: set semantics over [`StrategySortedMap`] with the
//! value elided.

use crate::error::{StrategyError, StrategyResolutionError};
use crate::registry::StrategyRegistry;
use crate::resolve::Resolve;
use crate::sorted_map::StrategySortedMap;
use crate::strategy::OrderStrategy;
use core::fmt;
use std::rc::Rc;

pub struct StrategySortedSet<K, O> {
    map: StrategySortedMap<K, (), O>,
}

impl<K: Resolve> StrategySortedSet<K, K::Order> {
    pub fn try_new() -> Result<Self, StrategyResolutionError> {
        Ok(Self {
            map: StrategySortedMap::try_new()?,
        })
    }
}

impl<K: 'static> StrategySortedSet<K, Rc<dyn OrderStrategy<K>>> {
    pub fn from_registry(registry: &StrategyRegistry, name: &str) -> Result<Self, StrategyError> {
        Ok(Self {
            map: StrategySortedMap::from_registry(registry, name)?,
        })
    }
}

impl<K, O> StrategySortedSet<K, O> {
    pub fn with_order(order: O) -> Self {
        Self {
            map: StrategySortedMap::with_order(order),
        }
    }

    pub fn order(&self) -> &O {
        self.map.order()
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

    /// Members in ascending order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &K> + '_ {
        self.map.iter().map(|(k, _)| k)
    }

    pub fn first(&self) -> Option<&K> {
        self.map.first().map(|(k, _)| k)
    }

    pub fn last(&self) -> Option<&K> {
        self.map.last().map(|(k, _)| k)
    }

    pub fn pop_first(&mut self) -> Option<K> {
        self.map.pop_first().map(|(k, _)| k)
    }

    pub fn pop_last(&mut self) -> Option<K> {
        self.map.pop_last().map(|(k, _)| k)
    }
}

impl<K, O: OrderStrategy<K>> StrategySortedSet<K, O> {
    /// Adds `key` unless a member compares `Equal`. Returns whether it was
    /// added; an existing member is kept.
    pub fn insert(&mut self, key: K) -> bool {
        self.map.try_insert(key, ()).is_ok()
    }

    pub fn contains(&self, key: &K) -> bool {
        self.map.contains_key(key)
    }

    pub fn get(&self, key: &K) -> Option<&K> {
        self.map.get_key_value(key).map(|(k, _)| k)
    }

    pub fn remove(&mut self, key: &K) -> bool {
        self.map.remove(key).is_some()
    }

    pub fn take(&mut self, key: &K) -> Option<K> {
        self.map.remove_entry(key).map(|(k, _)| k)
    }
}

impl<K, O: OrderStrategy<K>> Extend<K> for StrategySortedSet<K, O> {
    fn extend<I: IntoIterator<Item = K>>(&mut self, iter: I) {
        for k in iter {
            self.insert(k);
        }
    }
}

impl<K: fmt::Debug, O> fmt::Debug for StrategySortedSet<K, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.iter()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::Shared;
    use crate::strategy::order_by;

    #[test]
    fn keeps_first_of_equal_members() {
        let mut s = StrategySortedSet::with_order(order_by(|w: &&str| w.len()));
        s.extend(["pear", "fig", "plum", "kiwi", "banana"]);
        assert_eq!(s.len(), 3);
        assert_eq!(s.iter().copied().collect::<Vec<_>>(), ["fig", "pear", "banana"]);
        assert_eq!(s.get(&"lime"), Some(&"pear"));
        assert!(!s.insert("date"));
        assert_eq!(s.take(&"xxxx"), Some("pear"));
        assert!(!s.contains(&"pear"));
    }

    #[test]
    fn ends() {
        let mut s: StrategySortedSet<u32, _> = StrategySortedSet::try_new().unwrap();
        assert_eq!(s.first(), None);
        s.extend([40, 10, 30, 20]);
        assert_eq!((s.first(), s.last()), (Some(&10), Some(&40)));
        assert_eq!(s.pop_first(), Some(10));
        assert_eq!(s.pop_last(), Some(40));
        assert!(s.remove(&20));
        assert_eq!(format!("{s:?}"), "{30}");
        s.clear();
        assert!(s.is_empty());
    }

    #[test]
    fn identity_keys_have_no_default_order() {
        let err = StrategySortedSet::<Shared<u8>, _>::try_new().unwrap_err();
        assert!(matches!(
            err,
            StrategyResolutionError::NoNaturalOrder { .. }
        ));
    }
}

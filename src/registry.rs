//! Named strategies chosen at runtime.
//!
//! A `StrategyRegistry` maps names to type-erased strategies so a container's
//! strategy can come from configuration rather than a type parameter. Each
//! entry remembers the key type it was registered for; fetching it for any
//! other key type is a [`TypeMismatchError`], fetching an unknown name is
//! [`StrategyResolutionError::Unregistered`].
//!
//! Equalities and orders live in separate namespaces, so `"by_name"` can
//! name one of each.

use crate::error::{StrategyError, StrategyResolutionError, TypeMismatchError};
use crate::strategy::{EqualityStrategy, OrderStrategy};
use core::any::{type_name, Any, TypeId};
use core::fmt;
use hashbrown::HashMap;
use std::rc::Rc;

/// A registered equality, as handed to containers.
pub type DynEquality<K> = Rc<dyn EqualityStrategy<K>>;

/// A registered order, as handed to containers.
pub type DynOrder<K> = Rc<dyn OrderStrategy<K>>;

struct Registered {
    key_type: TypeId,
    key_type_name: &'static str,
    // Holds a `DynEquality<K>` or `DynOrder<K>` for `K` = `key_type`.
    strategy: Box<dyn Any>,
}

impl Registered {
    fn new<K: 'static, T: 'static>(strategy: T) -> Self {
        Self {
            key_type: TypeId::of::<K>(),
            key_type_name: type_name::<K>(),
            strategy: Box::new(strategy),
        }
    }

    fn fetch<K: 'static, T: Clone + 'static>(&self, name: &str) -> Result<T, StrategyError> {
        let mismatch = || TypeMismatchError {
            name: name.to_string(),
            expected: type_name::<K>(),
            found: self.key_type_name,
        };
        if self.key_type != TypeId::of::<K>() {
            return Err(mismatch().into());
        }
        self.strategy
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| mismatch().into())
    }
}

#[derive(Default)]
pub struct StrategyRegistry {
    equalities: HashMap<String, Registered>,
    orders: HashMap<String, Registered>,
}

impl StrategyRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `strategy` as the equality `name` for keys of type `K`.
    /// Returns true if it replaced an earlier registration.
    pub fn register_equality<K, S>(&mut self, name: impl Into<String>, strategy: S) -> bool
    where
        K: 'static,
        S: EqualityStrategy<K> + 'static,
    {
        let name = name.into();
        let erased: DynEquality<K> = Rc::new(strategy);
        tracing::debug!(name = %name, key_type = type_name::<K>(), "register equality strategy");
        self.equalities
            .insert(name, Registered::new::<K, _>(erased))
            .is_some()
    }

    /// Register `strategy` as the order `name` for keys of type `K`.
    /// Returns true if it replaced an earlier registration.
    pub fn register_order<K, S>(&mut self, name: impl Into<String>, strategy: S) -> bool
    where
        K: 'static,
        S: OrderStrategy<K> + 'static,
    {
        let name = name.into();
        let erased: DynOrder<K> = Rc::new(strategy);
        tracing::debug!(name = %name, key_type = type_name::<K>(), "register order strategy");
        self.orders
            .insert(name, Registered::new::<K, _>(erased))
            .is_some()
    }

    /// The equality registered as `name`, for key type `K`.
    pub fn equality<K: 'static>(&self, name: &str) -> Result<DynEquality<K>, StrategyError> {
        lookup(&self.equalities, name)?.fetch::<K, DynEquality<K>>(name)
    }

    /// The order registered as `name`, for key type `K`.
    pub fn order<K: 'static>(&self, name: &str) -> Result<DynOrder<K>, StrategyError> {
        lookup(&self.orders, name)?.fetch::<K, DynOrder<K>>(name)
    }

    pub fn unregister_equality(&mut self, name: &str) -> bool {
        self.equalities.remove(name).is_some()
    }

    pub fn unregister_order(&mut self, name: &str) -> bool {
        self.orders.remove(name).is_some()
    }

    /// All registered names, equalities and orders together, sorted and
    /// deduplicated.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self
            .equalities
            .keys()
            .chain(self.orders.keys())
            .map(String::as_str)
            .collect();
        names.sort_unstable();
        names.dedup();
        names
    }

    pub fn is_empty(&self) -> bool {
        self.equalities.is_empty() && self.orders.is_empty()
    }
}

fn lookup<'r>(
    table: &'r HashMap<String, Registered>,
    name: &str,
) -> Result<&'r Registered, StrategyResolutionError> {
    table.get(name).ok_or_else(|| {
        tracing::debug!(name, "strategy lookup missed");
        StrategyResolutionError::Unregistered {
            name: name.to_string(),
        }
    })
}

impl fmt::Debug for StrategyRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let entries = |table: &HashMap<String, Registered>| {
            let mut v: Vec<(String, &'static str)> = table
                .iter()
                .map(|(name, r)| (name.clone(), r.key_type_name))
                .collect();
            v.sort();
            v
        };
        f.debug_struct("StrategyRegistry")
            .field("equalities", &entries(&self.equalities))
            .field("orders", &entries(&self.orders))
            .finish()
    }
}

//! Comparator chaining: sort by one key, break ties with the next.
//!
//! The order of links is significant. `then(by_priority, by_name)` sorts by
//! priority and only consults the name when priorities tie; swapping the
//! arguments sorts by name first.

use crate::strategy::OrderStrategy;
use core::cmp::Ordering;
use core::fmt;

/// Two orders fixed at compile time.
#[derive(Clone, Copy, Debug, Default)]
pub struct Then<A, B> {
    primary: A,
    secondary: B,
}

impl<A, B> Then<A, B> {
    pub fn new(primary: A, secondary: B) -> Self {
        Self { primary, secondary }
    }
}

/// `primary`, falling back to `secondary` on ties. Nest for longer chains:
/// `then(a, then(b, c))`.
pub fn then<A, B>(primary: A, secondary: B) -> Then<A, B> {
    Then::new(primary, secondary)
}

impl<K: ?Sized, A: OrderStrategy<K>, B: OrderStrategy<K>> OrderStrategy<K> for Then<A, B> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        match self.primary.compare(a, b) {
            Ordering::Equal => self.secondary.compare(a, b),
            non_eq => non_eq,
        }
    }
}

/// A chain assembled at runtime. An empty chain compares every pair
/// `Equal`.
pub struct Chain<K: ?Sized> {
    links: Vec<Box<dyn OrderStrategy<K>>>,
}

pub fn chain<K, I>(links: I) -> Chain<K>
where
    K: ?Sized,
    I: IntoIterator<Item = Box<dyn OrderStrategy<K>>>,
{
    Chain {
        links: links.into_iter().collect(),
    }
}

impl<K: ?Sized> Chain<K> {
    pub fn new() -> Self {
        Self { links: Vec::new() }
    }

    /// Append a tie-breaker after the existing links.
    pub fn then<O: OrderStrategy<K> + 'static>(mut self, order: O) -> Self {
        self.links.push(Box::new(order));
        self
    }

    pub fn len(&self) -> usize {
        self.links.len()
    }

    pub fn is_empty(&self) -> bool {
        self.links.is_empty()
    }
}

impl<K: ?Sized> Default for Chain<K> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K: ?Sized> fmt::Debug for Chain<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Chain")
            .field("links", &self.links.len())
            .finish()
    }
}

impl<K: ?Sized> OrderStrategy<K> for Chain<K> {
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.links
            .iter()
            .map(|link| link.compare(a, b))
            .find(|o| *o != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

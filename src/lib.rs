//! strategy-collections: hash and sorted maps/sets whose notion of "same
//! key" and "key order" comes from a strategy value bound at construction,
//! not from the key type.
//!
//! Internal Design:
//!
//! Summary
//! - Strategies: `EqualityStrategy<K>` (equals + hash) and
//!   `OrderStrategy<K>` (compare). Projections, closures, `Natural`,
//!   `Structural`, `Tolerance`, `Identity`, chains and reversal are all just
//!   values implementing these traits.
//! - Resolution: `Resolve` picks a default strategy per key type at compile
//!   time: natural first, then structural, then identity for `Shared`
//!   handles. Orders can fail to resolve; equalities cannot.
//! - Containers:
//!   - StrategyHashMap<K, V, E>: slot storage plus a hash index. The hash
//!     of each entry is computed once at insert and stored.
//!   - StrategyHashSet<K, E>: the map with `()` values.
//!   - StrategySortedMap<K, V, O>: AVL tree in a slot arena, every descent
//!     guided by `compare`.
//!   - StrategySortedSet<K, O>: the sorted map with `()` values.
//! - Registry: `StrategyRegistry` names type-erased strategies so they can
//!   be chosen at runtime, with key-type checks on retrieval.
//!
//! Constraints
//! - A container's strategy never changes after construction.
//! - Duplicates are decided only by the strategy: two keys are the same
//!   entry iff `equals` (hash) or `compare == Equal` (sorted).
//! - Growth re-indexes from stored hashes and never calls the strategy.
//! - Single-threaded use: containers are `Send` when their parts are, never
//!   `Sync`.
//! - Reentrancy: a strategy must not call back into the container that is
//!   invoking it. Debug builds panic if it does.
//!
//! Mutable keys
//! - If a resident key changes in a way that changes its strategy output,
//!   the container is not repaired. The entry is still counted by `len` and
//!   still yielded by iteration.
//! - Hash lookups probe with the new hash and miss, and a key equal to the
//!   mutated one is inserted alongside it.
//! - Sorted lookups descend from the root by the new comparisons. They find
//!   the stale entry exactly when it lies on that descent path (for example
//!   at the root); then an equal insert overwrites or rejects like any
//!   duplicate. Off the path they miss and an equal key is added beside it.
//!   See `Shared` and `tests/mutable_key_hazard.rs`.
//!
//! Notes and non-goals
//! - Strategy laws are not checked at runtime; `laws` offers sample-based
//!   checks for tests.
//! - No concurrent containers, no persistence, no custom allocators.

mod chain;
mod error;
mod hash_map;
#[cfg(test)]
mod hash_map_proptest;
mod hash_set;
pub mod laws;
mod reentrancy;
pub mod registry;
mod resolve;
mod shared;
mod sorted_map;
#[cfg(test)]
mod sorted_map_proptest;
mod sorted_set;
mod strategy;
mod structural;

// Public surface
pub use chain::{chain, then, Chain, Then};
pub use error::{
    InsertError, InvalidToleranceError, StrategyError, StrategyResolutionError, TypeMismatchError,
};
pub use hash_map::{Handle, HashConfig, StrategyHashMap};
pub use hash_set::StrategyHashSet;
pub use registry::StrategyRegistry;
pub use resolve::{default_equality, default_order, Resolution, Resolve};
pub use shared::{Identity, Shared};
pub use sorted_map::StrategySortedMap;
pub use sorted_set::StrategySortedSet;
pub use strategy::{
    equality_by, equality_fn, order_by, order_fn, reversed, EqualityStrategy, FnEquality, FnOrder,
    Natural, Nullable, OrderStrategy, ProjectEq, ProjectOrd, Reversed, TotalFloat, Unorderable,
};
pub use structural::{Structural, Tolerance};

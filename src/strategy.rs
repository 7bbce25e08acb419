//! Strategy traits and the leaf strategies built on them.
//!
//! An [`EqualityStrategy`] decides whether two keys are the same key and
//! supplies a hash for them; an [`OrderStrategy`] decides which of two keys
//! comes first. Containers own one strategy value and call back into it on
//! every insert, lookup and remove.
//!
//! Contract (not checked at runtime; see [`crate::laws`]):
//! - `equals` is reflexive, symmetric and transitive.
//! - `equals(a, b)` implies `hash(a) == hash(b)`.
//! - `compare` is antisymmetric and transitive.
//! - Output for a key never changes while the key is resident in a container.

use core::cmp::Ordering;
use core::hash::{BuildHasher, Hash};
use core::marker::PhantomData;
use std::collections::hash_map::RandomState;
use std::rc::Rc;
use std::sync::Arc;

/// Key identity: "are these the same key?" plus a hash consistent with it.
pub trait EqualityStrategy<K: ?Sized> {
    fn equals(&self, a: &K, b: &K) -> bool;
    fn hash(&self, key: &K) -> u64;
}

/// Key order: "which of these comes first?"
pub trait OrderStrategy<K: ?Sized> {
    fn compare(&self, a: &K, b: &K) -> Ordering;
}

macro_rules! delegate_strategy {
    ($($ptr:ident),+) => {$(
        impl<K: ?Sized, S: EqualityStrategy<K> + ?Sized> EqualityStrategy<K> for $ptr<S> {
            #[inline]
            fn equals(&self, a: &K, b: &K) -> bool {
                (**self).equals(a, b)
            }
            #[inline]
            fn hash(&self, key: &K) -> u64 {
                (**self).hash(key)
            }
        }

        impl<K: ?Sized, S: OrderStrategy<K> + ?Sized> OrderStrategy<K> for $ptr<S> {
            #[inline]
            fn compare(&self, a: &K, b: &K) -> Ordering {
                (**self).compare(a, b)
            }
        }
    )+};
}

delegate_strategy!(Box, Rc, Arc);

impl<K: ?Sized, S: EqualityStrategy<K> + ?Sized> EqualityStrategy<K> for &S {
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (**self).equals(a, b)
    }
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (**self).hash(key)
    }
}

impl<K: ?Sized, S: OrderStrategy<K> + ?Sized> OrderStrategy<K> for &S {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (**self).compare(a, b)
    }
}

/// Final avalanche step (splitmix64). Used wherever a strategy derives a hash
/// from raw bits rather than through a `BuildHasher`.
#[inline]
pub(crate) fn mix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9e37_79b9_7f4a_7c15);
    x = (x ^ (x >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    x = (x ^ (x >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    x ^ (x >> 31)
}

/// Order-sensitive fold of element hashes into a running seed.
#[inline]
pub(crate) fn combine(seed: u64, h: u64) -> u64 {
    (seed.rotate_left(5) ^ h).wrapping_mul(0x517c_c1b7_2722_0a95)
}

/// The key type's own `Eq + Hash` and `Ord`, hashed through `S`.
#[derive(Clone, Debug, Default)]
pub struct Natural<S = RandomState> {
    hasher: S,
}

impl Natural {
    pub fn new() -> Self {
        Self {
            hasher: RandomState::new(),
        }
    }
}

impl<S> Natural<S> {
    pub fn with_hasher(hasher: S) -> Self {
        Self { hasher }
    }
}

impl<K, S> EqualityStrategy<K> for Natural<S>
where
    K: ?Sized + Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        a == b
    }
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one(key)
    }
}

impl<K: ?Sized + Ord, S> OrderStrategy<K> for Natural<S> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        a.cmp(b)
    }
}

/// IEEE-754 total order for `f32`/`f64` (`total_cmp`), with equality and hash
/// on the bit pattern so the two agree. `-0.0` and `0.0` are distinct keys;
/// NaNs with equal payloads are equal.
#[derive(Clone, Copy, Debug, Default)]
pub struct TotalFloat;

macro_rules! total_float {
    ($($t:ty),+) => {$(
        impl EqualityStrategy<$t> for TotalFloat {
            #[inline]
            fn equals(&self, a: &$t, b: &$t) -> bool {
                a.to_bits() == b.to_bits()
            }
            #[inline]
            fn hash(&self, key: &$t) -> u64 {
                mix64(u64::from(key.to_bits()))
            }
        }

        impl OrderStrategy<$t> for TotalFloat {
            #[inline]
            fn compare(&self, a: &$t, b: &$t) -> Ordering {
                a.total_cmp(b)
            }
        }
    )+};
}

total_float!(f32, f64);

/// Equality and hash of a projection of the key, e.g. `(last, first)` of a
/// person record. Built with [`equality_by`].
pub struct ProjectEq<F, P, S = RandomState> {
    project: F,
    hasher: S,
    _out: PhantomData<fn() -> P>,
}

/// Compare keys by the given projection.
///
/// ```
/// use strategy_collections::{equality_by, EqualityStrategy};
///
/// let ci = equality_by(|s: &String| s.to_ascii_lowercase());
/// assert!(ci.equals(&"Content-Type".to_string(), &"content-type".to_string()));
/// ```
pub fn equality_by<K, P, F>(project: F) -> ProjectEq<F, P>
where
    K: ?Sized,
    F: Fn(&K) -> P,
    P: Eq + Hash,
{
    ProjectEq {
        project,
        hasher: RandomState::new(),
        _out: PhantomData,
    }
}

impl<F, P, S> ProjectEq<F, P, S> {
    pub fn with_hasher<S2>(self, hasher: S2) -> ProjectEq<F, P, S2> {
        ProjectEq {
            project: self.project,
            hasher,
            _out: PhantomData,
        }
    }
}

impl<F: Clone, P, S: Clone> Clone for ProjectEq<F, P, S> {
    fn clone(&self) -> Self {
        Self {
            project: self.project.clone(),
            hasher: self.hasher.clone(),
            _out: PhantomData,
        }
    }
}

impl<F, P, S> core::fmt::Debug for ProjectEq<F, P, S> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProjectEq")
            .field("projection", &core::any::type_name::<P>())
            .finish_non_exhaustive()
    }
}

impl<K, P, F, S> EqualityStrategy<K> for ProjectEq<F, P, S>
where
    K: ?Sized,
    F: Fn(&K) -> P,
    P: Eq + Hash,
    S: BuildHasher,
{
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.project)(a) == (self.project)(b)
    }
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        self.hasher.hash_one((self.project)(key))
    }
}

/// Order keys by a projection. Built with [`order_by`].
pub struct ProjectOrd<F, P> {
    project: F,
    _out: PhantomData<fn() -> P>,
}

pub fn order_by<K, P, F>(project: F) -> ProjectOrd<F, P>
where
    K: ?Sized,
    F: Fn(&K) -> P,
    P: Ord,
{
    ProjectOrd {
        project,
        _out: PhantomData,
    }
}

impl<F: Clone, P> Clone for ProjectOrd<F, P> {
    fn clone(&self) -> Self {
        Self {
            project: self.project.clone(),
            _out: PhantomData,
        }
    }
}

impl<F, P> core::fmt::Debug for ProjectOrd<F, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ProjectOrd")
            .field("projection", &core::any::type_name::<P>())
            .finish_non_exhaustive()
    }
}

impl<K, P, F> OrderStrategy<K> for ProjectOrd<F, P>
where
    K: ?Sized,
    F: Fn(&K) -> P,
    P: Ord,
{
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.project)(a).cmp(&(self.project)(b))
    }
}

/// A custom equality from a pair of closures. The caller owns the hash
/// contract between them.
#[derive(Clone, Copy)]
pub struct FnEquality<E, H> {
    eq: E,
    hash: H,
}

pub fn equality_fn<K, E, H>(eq: E, hash: H) -> FnEquality<E, H>
where
    K: ?Sized,
    E: Fn(&K, &K) -> bool,
    H: Fn(&K) -> u64,
{
    FnEquality { eq, hash }
}

impl<K, E, H> EqualityStrategy<K> for FnEquality<E, H>
where
    K: ?Sized,
    E: Fn(&K, &K) -> bool,
    H: Fn(&K) -> u64,
{
    #[inline]
    fn equals(&self, a: &K, b: &K) -> bool {
        (self.eq)(a, b)
    }
    #[inline]
    fn hash(&self, key: &K) -> u64 {
        (self.hash)(key)
    }
}

/// A custom order from a comparison closure.
#[derive(Clone, Copy)]
pub struct FnOrder<C> {
    cmp: C,
}

pub fn order_fn<K, C>(cmp: C) -> FnOrder<C>
where
    K: ?Sized,
    C: Fn(&K, &K) -> Ordering,
{
    FnOrder { cmp }
}

impl<K: ?Sized, C: Fn(&K, &K) -> Ordering> OrderStrategy<K> for FnOrder<C> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        (self.cmp)(a, b)
    }
}

/// Lifts an element strategy to `Option<K>`. Two absent keys are equal,
/// exactly one absent key is unequal, and absent sorts before present.
#[derive(Clone, Copy, Debug, Default)]
pub struct Nullable<S> {
    inner: S,
}

impl<S> Nullable<S> {
    /// Hash of the absent key.
    pub const ABSENT_HASH: u64 = 0x6e75_6c6c_6e75_6c6c;

    pub fn new(inner: S) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }
}

impl<K, S: EqualityStrategy<K>> EqualityStrategy<Option<K>> for Nullable<S> {
    fn equals(&self, a: &Option<K>, b: &Option<K>) -> bool {
        match (a, b) {
            (None, None) => true,
            (Some(a), Some(b)) => self.inner.equals(a, b),
            _ => false,
        }
    }

    fn hash(&self, key: &Option<K>) -> u64 {
        match key {
            None => Self::ABSENT_HASH,
            Some(k) => self.inner.hash(k),
        }
    }
}

impl<K, S: OrderStrategy<K>> OrderStrategy<Option<K>> for Nullable<S> {
    fn compare(&self, a: &Option<K>, b: &Option<K>) -> Ordering {
        match (a, b) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(a), Some(b)) => self.inner.compare(a, b),
        }
    }
}

/// Descending version of an order.
#[derive(Clone, Copy, Debug, Default)]
pub struct Reversed<O> {
    inner: O,
}

pub fn reversed<O>(order: O) -> Reversed<O> {
    Reversed { inner: order }
}

impl<K: ?Sized, O: OrderStrategy<K>> OrderStrategy<K> for Reversed<O> {
    #[inline]
    fn compare(&self, a: &K, b: &K) -> Ordering {
        self.inner.compare(b, a)
    }
}

/// Order for key types with no order at all. Uninhabited: resolution hands
/// out an error instead of a value.
#[derive(Clone, Copy, Debug)]
pub enum Unorderable {}

impl<K: ?Sized> OrderStrategy<K> for Unorderable {
    fn compare(&self, _a: &K, _b: &K) -> Ordering {
        match *self {}
    }
}

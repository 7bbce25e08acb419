//! Element-wise strategies over composite keys.
//!
//! [`Structural`] applies an element strategy across sequences: equal iff the
//! lengths match and every position is equal; ordered lexicographically with
//! a strict prefix first. A tuple of strategies is itself a strategy over the
//! tuple of keys, compared position by position.
//!
//! [`Tolerance`] is the approximate float strategy. It is *not* transitive,
//! and its hash (value snapped to the tolerance grid) can split two
//! tolerance-equal values across a grid boundary. Hash-based containers using
//! it may therefore miss equal keys; sorted containers only depend on
//! `compare` and do not have that particular failure.

use crate::error::InvalidToleranceError;
use crate::strategy::{combine, mix64, EqualityStrategy, OrderStrategy};
use core::cmp::Ordering;

#[derive(Clone, Copy, Debug, Default)]
pub struct Structural<S> {
    element: S,
}

impl<S> Structural<S> {
    pub fn new(element: S) -> Self {
        Self { element }
    }

    pub fn element(&self) -> &S {
        &self.element
    }
}

impl<T, S: EqualityStrategy<T>> EqualityStrategy<[T]> for Structural<S> {
    fn equals(&self, a: &[T], b: &[T]) -> bool {
        a.len() == b.len()
            && a.iter()
                .zip(b.iter())
                .all(|(x, y)| self.element.equals(x, y))
    }

    fn hash(&self, key: &[T]) -> u64 {
        key.iter()
            .fold(mix64(key.len() as u64), |h, e| combine(h, self.element.hash(e)))
    }
}

impl<T, S: OrderStrategy<T>> OrderStrategy<[T]> for Structural<S> {
    fn compare(&self, a: &[T], b: &[T]) -> Ordering {
        for (x, y) in a.iter().zip(b.iter()) {
            match self.element.compare(x, y) {
                Ordering::Equal => continue,
                non_eq => return non_eq,
            }
        }
        a.len().cmp(&b.len())
    }
}

macro_rules! structural_via_slice {
    ($([$($gen:tt)*] $ty:ty),+ $(,)?) => {$(
        impl<$($gen)*, S: EqualityStrategy<T>> EqualityStrategy<$ty> for Structural<S> {
            #[inline]
            fn equals(&self, a: &$ty, b: &$ty) -> bool {
                EqualityStrategy::<[T]>::equals(self, &a[..], &b[..])
            }
            #[inline]
            fn hash(&self, key: &$ty) -> u64 {
                EqualityStrategy::<[T]>::hash(self, &key[..])
            }
        }

        impl<$($gen)*, S: OrderStrategy<T>> OrderStrategy<$ty> for Structural<S> {
            #[inline]
            fn compare(&self, a: &$ty, b: &$ty) -> Ordering {
                OrderStrategy::<[T]>::compare(self, &a[..], &b[..])
            }
        }
    )+};
}

structural_via_slice! {
    [T] Vec<T>,
    [T] Box<[T]>,
    [T, const N: usize] [T; N],
}

macro_rules! tuple_strategy {
    ($(($($S:ident $K:ident $idx:tt),+))+) => {$(
        impl<$($K,)+ $($S: EqualityStrategy<$K>,)+> EqualityStrategy<($($K,)+)> for ($($S,)+) {
            fn equals(&self, a: &($($K,)+), b: &($($K,)+)) -> bool {
                $(self.$idx.equals(&a.$idx, &b.$idx))&&+
            }

            fn hash(&self, key: &($($K,)+)) -> u64 {
                let mut h = 0;
                $(h = combine(h, self.$idx.hash(&key.$idx));)+
                h
            }
        }

        impl<$($K,)+ $($S: OrderStrategy<$K>,)+> OrderStrategy<($($K,)+)> for ($($S,)+) {
            fn compare(&self, a: &($($K,)+), b: &($($K,)+)) -> Ordering {
                $(
                    match self.$idx.compare(&a.$idx, &b.$idx) {
                        Ordering::Equal => {}
                        non_eq => return non_eq,
                    }
                )+
                Ordering::Equal
            }
        }
    )+};
}

tuple_strategy! {
    (SA KA 0, SB KB 1)
    (SA KA 0, SB KB 1, SC KC 2)
    (SA KA 0, SB KB 1, SC KC 2, SD KD 3)
}

/// Approximate `f64` equality: `|a - b| <= epsilon`.
///
/// Hash snaps the value to the nearest multiple of `epsilon`, so values on
/// either side of a half-step boundary hash differently even when they are
/// within tolerance of each other. This gap is inherent and left as is.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerance {
    epsilon: f64,
}

impl Tolerance {
    /// # Panics
    ///
    /// If `epsilon` is not finite and positive. Use [`Tolerance::try_new`]
    /// for a caller-supplied value.
    pub fn new(epsilon: f64) -> Self {
        match Self::try_new(epsilon) {
            Ok(t) => t,
            Err(e) => panic!("{e}"),
        }
    }

    pub fn try_new(epsilon: f64) -> Result<Self, InvalidToleranceError> {
        if epsilon.is_finite() && epsilon > 0.0 {
            Ok(Self { epsilon })
        } else {
            Err(InvalidToleranceError { epsilon })
        }
    }

    pub fn epsilon(&self) -> f64 {
        self.epsilon
    }

    fn grid(&self, x: f64) -> i64 {
        // Saturating cast; NaN snaps to 0.
        (x / self.epsilon).round() as i64
    }
}

impl EqualityStrategy<f64> for Tolerance {
    fn equals(&self, a: &f64, b: &f64) -> bool {
        a.to_bits() == b.to_bits() || (a - b).abs() <= self.epsilon
    }

    fn hash(&self, key: &f64) -> u64 {
        mix64(self.grid(*key) as u64)
    }
}

/// Within tolerance compares `Equal`; otherwise by `total_cmp`. Not
/// transitive for chains of values spaced just under `epsilon`.
impl OrderStrategy<f64> for Tolerance {
    fn compare(&self, a: &f64, b: &f64) -> Ordering {
        if self.equals(a, b) {
            Ordering::Equal
        } else {
            a.total_cmp(b)
        }
    }
}

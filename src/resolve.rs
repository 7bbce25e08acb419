//! Default strategy selection per key type.
//!
//! Resolution is a compile-time trait lookup, in this order:
//! 1. `Natural`: the type declares its own value equality and order
//!    (integers, `bool`, `char`, strings, `()`); floats use their declared
//!    total order via [`TotalFloat`]. Used directly, with no boxing or
//!    conversion.
//! 2. `Structural`: sequences, arrays, tuples and `Option` combine the
//!    resolved strategies of their elements.
//! 3. `Identity`: reference-typed [`Shared`] keys compare by allocation.
//!    They have no order, so [`Resolve::default_order`] returns
//!    [`StrategyResolutionError::NoNaturalOrder`].
//!
//! Equality resolution never fails.

use crate::error::StrategyResolutionError;
use crate::shared::{Identity, Shared};
use crate::strategy::{EqualityStrategy, Natural, Nullable, OrderStrategy, TotalFloat, Unorderable};
use crate::structural::Structural;

/// Which rung of the resolution ladder a type landed on.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resolution {
    Natural,
    Structural,
    Identity,
}

pub trait Resolve: Sized {
    type Equality: EqualityStrategy<Self>;
    type Order: OrderStrategy<Self>;

    const RESOLUTION: Resolution;

    fn default_equality() -> Self::Equality;

    fn default_order() -> Result<Self::Order, StrategyResolutionError>;
}

macro_rules! resolve_natural {
    ($($t:ty),+ $(,)?) => {$(
        impl Resolve for $t {
            type Equality = Natural;
            type Order = Natural;

            const RESOLUTION: Resolution = Resolution::Natural;

            #[inline]
            fn default_equality() -> Natural {
                Natural::new()
            }

            #[inline]
            fn default_order() -> Result<Natural, StrategyResolutionError> {
                Ok(Natural::new())
            }
        }
    )+};
}

resolve_natural!(
    u8, u16, u32, u64, u128, usize, i8, i16, i32, i64, i128, isize, bool, char, String, (),
);

impl<'a> Resolve for &'a str {
    type Equality = Natural;
    type Order = Natural;

    const RESOLUTION: Resolution = Resolution::Natural;

    fn default_equality() -> Natural {
        Natural::new()
    }

    fn default_order() -> Result<Natural, StrategyResolutionError> {
        Ok(Natural::new())
    }
}

macro_rules! resolve_float {
    ($($t:ty),+) => {$(
        impl Resolve for $t {
            type Equality = TotalFloat;
            type Order = TotalFloat;

            const RESOLUTION: Resolution = Resolution::Natural;

            fn default_equality() -> TotalFloat {
                TotalFloat
            }

            fn default_order() -> Result<TotalFloat, StrategyResolutionError> {
                Ok(TotalFloat)
            }
        }
    )+};
}

resolve_float!(f32, f64);

macro_rules! resolve_sequence {
    ($([$($gen:tt)*] $ty:ty),+ $(,)?) => {$(
        impl<$($gen)*> Resolve for $ty {
            type Equality = Structural<T::Equality>;
            type Order = Structural<T::Order>;

            const RESOLUTION: Resolution = Resolution::Structural;

            fn default_equality() -> Self::Equality {
                Structural::new(T::default_equality())
            }

            fn default_order() -> Result<Self::Order, StrategyResolutionError> {
                T::default_order().map(Structural::new)
            }
        }
    )+};
}

resolve_sequence! {
    [T: Resolve] Vec<T>,
    [T: Resolve] Box<[T]>,
    [T: Resolve, const N: usize] [T; N],
}

impl<T: Resolve> Resolve for Option<T> {
    type Equality = Nullable<T::Equality>;
    type Order = Nullable<T::Order>;

    const RESOLUTION: Resolution = Resolution::Structural;

    fn default_equality() -> Self::Equality {
        Nullable::new(T::default_equality())
    }

    fn default_order() -> Result<Self::Order, StrategyResolutionError> {
        T::default_order().map(Nullable::new)
    }
}

macro_rules! resolve_tuple {
    ($(($($T:ident),+))+) => {$(
        impl<$($T: Resolve),+> Resolve for ($($T,)+) {
            type Equality = ($($T::Equality,)+);
            type Order = ($($T::Order,)+);

            const RESOLUTION: Resolution = Resolution::Structural;

            fn default_equality() -> Self::Equality {
                ($($T::default_equality(),)+)
            }

            fn default_order() -> Result<Self::Order, StrategyResolutionError> {
                Ok(($($T::default_order()?,)+))
            }
        }
    )+};
}

resolve_tuple! {
    (A, B)
    (A, B, C)
    (A, B, C, D)
}

impl<T> Resolve for Shared<T> {
    type Equality = Identity;
    type Order = Unorderable;

    const RESOLUTION: Resolution = Resolution::Identity;

    fn default_equality() -> Identity {
        Identity
    }

    fn default_order() -> Result<Unorderable, StrategyResolutionError> {
        let type_name = core::any::type_name::<Self>();
        tracing::debug!(type_name, "no default order for identity-compared key type");
        Err(StrategyResolutionError::NoNaturalOrder { type_name })
    }
}

/// The resolved equality for `K`.
pub fn default_equality<K: Resolve>() -> K::Equality {
    K::default_equality()
}

/// The resolved order for `K`, or why there is none.
pub fn default_order<K: Resolve>() -> Result<K::Order, StrategyResolutionError> {
    K::default_order()
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cmp::Ordering;

    #[test]
    fn primitives_resolve_naturally() {
        assert_eq!(<u32 as Resolve>::RESOLUTION, Resolution::Natural);
        assert_eq!(<f64 as Resolve>::RESOLUTION, Resolution::Natural);
        let e = default_equality::<String>();
        assert!(e.equals(&"a".to_string(), &"a".to_string()));
        let o = default_order::<i64>().unwrap();
        assert_eq!(o.compare(&-1, &1), Ordering::Less);
    }

    #[test]
    fn composites_resolve_structurally() {
        assert_eq!(<Vec<u8> as Resolve>::RESOLUTION, Resolution::Structural);
        assert_eq!(<(u8, String) as Resolve>::RESOLUTION, Resolution::Structural);
        let e = default_equality::<Vec<(u8, char)>>();
        assert!(e.equals(&vec![(1, 'a')], &vec![(1, 'a')]));
        let o = default_order::<Option<[u8; 2]>>().unwrap();
        assert_eq!(o.compare(&None, &Some([0, 0])), Ordering::Less);
    }

    #[test]
    fn shared_resolves_to_identity_without_order() {
        assert_eq!(<Shared<u8> as Resolve>::RESOLUTION, Resolution::Identity);
        let a = Shared::new(1u8);
        let b = Shared::new(1u8);
        let e = default_equality::<Shared<u8>>();
        assert!(!e.equals(&a, &b));
        assert!(e.equals(&a, &a.clone()));
        match default_order::<Shared<u8>>() {
            Err(StrategyResolutionError::NoNaturalOrder { type_name }) => {
                assert!(type_name.contains("Shared"));
            }
            Ok(_) => panic!("identity keys must not resolve an order"),
            Err(other) => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn unorderable_element_poisons_structural_order() {
        assert!(default_order::<Vec<Shared<u8>>>().is_err());
        assert!(default_order::<(u8, Shared<u8>)>().is_err());
        // Equality still resolves.
        let e = default_equality::<(u8, Shared<u8>)>();
        let s = Shared::new(0u8);
        assert!(e.equals(&(1, s.clone()), &(1, s)));
    }
}

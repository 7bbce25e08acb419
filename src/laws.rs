//! Executable checks for the strategy contract.
//!
//! Containers trust their strategy; nothing at runtime verifies it. These
//! functions test a strategy against a finite sample of keys and report the
//! first violation found, naming sample indices. They are meant for tests
//! (including property tests) of user strategies:
//!
//! | Law | Statement |
//! |-----|-----------|
//! | reflexive | `equals(a, a)` |
//! | symmetric | `equals(a, b) == equals(b, a)` |
//! | transitive | `equals(a, b) && equals(b, c)` implies `equals(a, c)` |
//! | hash contract | `equals(a, b)` implies `hash(a) == hash(b)` |
//! | antisymmetric | `compare(a, b) == compare(b, a).reverse()` |
//! | order transitive | `a <= b && b <= c` implies `a <= c` |
//!
//! Pairwise checks are O(n²) and triple checks O(n³) in the sample size.

use crate::strategy::{EqualityStrategy, OrderStrategy};
use core::cmp::Ordering;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LawViolation {
    #[error("equals(k[{index}], k[{index}]) is false")]
    NotReflexive { index: usize },
    #[error("equals is not symmetric for k[{a}], k[{b}]")]
    NotSymmetric { a: usize, b: usize },
    #[error("k[{a}] and k[{b}] are equal but hash to {hash_a:#x} and {hash_b:#x}")]
    HashMismatch {
        a: usize,
        b: usize,
        hash_a: u64,
        hash_b: u64,
    },
    #[error("equals is not transitive across k[{a}], k[{b}], k[{c}]")]
    EqualityNotTransitive { a: usize, b: usize, c: usize },
    #[error("compare(k[{a}], k[{b}]) is {forward:?} but the reverse is {backward:?}")]
    NotAntisymmetric {
        a: usize,
        b: usize,
        forward: Ordering,
        backward: Ordering,
    },
    #[error("compare is not transitive across k[{a}], k[{b}], k[{c}]")]
    OrderNotTransitive { a: usize, b: usize, c: usize },
}

pub fn check_reflexive<K, E: EqualityStrategy<K>>(
    strategy: &E,
    samples: &[K],
) -> Result<(), LawViolation> {
    match samples.iter().position(|k| !strategy.equals(k, k)) {
        Some(index) => Err(LawViolation::NotReflexive { index }),
        None => Ok(()),
    }
}

pub fn check_symmetry<K, E: EqualityStrategy<K>>(
    strategy: &E,
    samples: &[K],
) -> Result<(), LawViolation> {
    for (a, ka) in samples.iter().enumerate() {
        for (b, kb) in samples.iter().enumerate().skip(a + 1) {
            if strategy.equals(ka, kb) != strategy.equals(kb, ka) {
                return Err(LawViolation::NotSymmetric { a, b });
            }
        }
    }
    Ok(())
}

pub fn check_hash_contract<K, E: EqualityStrategy<K>>(
    strategy: &E,
    samples: &[K],
) -> Result<(), LawViolation> {
    let hashes: Vec<u64> = samples.iter().map(|k| strategy.hash(k)).collect();
    for (a, ka) in samples.iter().enumerate() {
        for (b, kb) in samples.iter().enumerate().skip(a + 1) {
            if hashes[a] != hashes[b] && strategy.equals(ka, kb) {
                return Err(LawViolation::HashMismatch {
                    a,
                    b,
                    hash_a: hashes[a],
                    hash_b: hashes[b],
                });
            }
        }
    }
    Ok(())
}

pub fn check_equality_transitive<K, E: EqualityStrategy<K>>(
    strategy: &E,
    samples: &[K],
) -> Result<(), LawViolation> {
    let n = samples.len();
    for a in 0..n {
        for b in 0..n {
            if !strategy.equals(&samples[a], &samples[b]) {
                continue;
            }
            for c in 0..n {
                if strategy.equals(&samples[b], &samples[c])
                    && !strategy.equals(&samples[a], &samples[c])
                {
                    return Err(LawViolation::EqualityNotTransitive { a, b, c });
                }
            }
        }
    }
    Ok(())
}

/// Reflexivity, symmetry, transitivity and the hash contract, in that order.
pub fn check_equality_laws<K, E: EqualityStrategy<K>>(
    strategy: &E,
    samples: &[K],
) -> Result<(), LawViolation> {
    check_reflexive(strategy, samples)?;
    check_symmetry(strategy, samples)?;
    check_equality_transitive(strategy, samples)?;
    check_hash_contract(strategy, samples)
}

pub fn check_antisymmetry<K, O: OrderStrategy<K>>(
    order: &O,
    samples: &[K],
) -> Result<(), LawViolation> {
    for (a, ka) in samples.iter().enumerate() {
        for (b, kb) in samples.iter().enumerate().skip(a) {
            let forward = order.compare(ka, kb);
            let backward = order.compare(kb, ka);
            if forward != backward.reverse() {
                return Err(LawViolation::NotAntisymmetric {
                    a,
                    b,
                    forward,
                    backward,
                });
            }
        }
    }
    Ok(())
}

pub fn check_order_transitive<K, O: OrderStrategy<K>>(
    order: &O,
    samples: &[K],
) -> Result<(), LawViolation> {
    let n = samples.len();
    for a in 0..n {
        for b in 0..n {
            let ab = order.compare(&samples[a], &samples[b]);
            if ab == Ordering::Greater {
                continue;
            }
            for c in 0..n {
                let bc = order.compare(&samples[b], &samples[c]);
                if bc == Ordering::Greater {
                    continue;
                }
                let ac = order.compare(&samples[a], &samples[c]);
                // a <= b <= c requires a <= c, and a == c when both steps are ties.
                let expect_equal = ab == Ordering::Equal && bc == Ordering::Equal;
                if ac == Ordering::Greater || (expect_equal && ac != Ordering::Equal) {
                    return Err(LawViolation::OrderNotTransitive { a, b, c });
                }
            }
        }
    }
    Ok(())
}

/// Antisymmetry, then transitivity.
pub fn check_order_laws<K, O: OrderStrategy<K>>(
    order: &O,
    samples: &[K],
) -> Result<(), LawViolation> {
    check_antisymmetry(order, samples)?;
    check_order_transitive(order, samples)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::strategy::{equality_fn, order_fn, Natural};
    use crate::structural::Tolerance;

    #[test]
    fn natural_passes() {
        let samples: Vec<i64> = vec![3, -1, 3, 0, i64::MAX, -1];
        check_equality_laws(&Natural::new(), &samples).unwrap();
        check_order_laws(&Natural::new(), &samples).unwrap();
    }

    #[test]
    fn inconsistent_hash_is_reported() {
        let bad = equality_fn(|a: &u8, b: &u8| a % 2 == b % 2, |k: &u8| u64::from(*k));
        assert_eq!(
            check_hash_contract(&bad, &[1, 2, 3]),
            Err(LawViolation::HashMismatch {
                a: 0,
                b: 2,
                hash_a: 1,
                hash_b: 3
            })
        );
    }

    #[test]
    fn lopsided_equality_is_reported() {
        let lopsided = equality_fn(|a: &u8, b: &u8| a <= b, |_: &u8| 0);
        assert_eq!(
            check_symmetry(&lopsided, &[1, 2]),
            Err(LawViolation::NotSymmetric { a: 0, b: 1 })
        );
    }

    #[test]
    fn tolerance_is_not_transitive() {
        let t = Tolerance::new(0.1);
        let samples = [0.0, 0.08, 0.16];
        assert_eq!(
            check_equality_transitive(&t, &samples),
            Err(LawViolation::EqualityNotTransitive { a: 0, b: 1, c: 2 })
        );
        assert!(check_order_laws(&t, &samples).is_err());
    }

    #[test]
    fn broken_orders_are_reported() {
        let always_less = order_fn(|_: &u8, _: &u8| Ordering::Less);
        assert!(matches!(
            check_antisymmetry(&always_less, &[1, 2]),
            Err(LawViolation::NotAntisymmetric { a: 0, b: 0, .. })
        ));
        // Rock-paper-scissors.
        let rps = order_fn(|a: &u8, b: &u8| match (a, b) {
            _ if a == b => Ordering::Equal,
            (0, 1) | (1, 2) | (2, 0) => Ordering::Less,
            _ => Ordering::Greater,
        });
        check_antisymmetry(&rps, &[0, 1, 2]).unwrap();
        assert!(matches!(
            check_order_transitive(&rps, &[0, 1, 2]),
            Err(LawViolation::OrderNotTransitive { .. })
        ));
    }
}

#![cfg(test)]

// Property tests for StrategySortedMap against std's BTreeMap.

use crate::error::InsertError;
use crate::sorted_map::StrategySortedMap;
use crate::strategy::{order_by, reversed, Natural, OrderStrategy};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cmp::Reverse;
use std::collections::BTreeMap;

#[derive(Clone, Debug)]
enum Op {
    Insert(i16, u32),
    TryInsert(i16, u32),
    Remove(i16),
    Get(i16),
    PopFirst,
    PopLast,
    Iterate,
}

fn arb_ops() -> impl Strategy<Value = Vec<Op>> {
    // A narrow key range forces plenty of duplicates and removals of present keys.
    let key = -40i16..40;
    let op = prop_oneof![
        4 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        2 => (key.clone(), any::<u32>()).prop_map(|(k, v)| Op::TryInsert(k, v)),
        3 => key.clone().prop_map(Op::Remove),
        2 => key.prop_map(Op::Get),
        1 => Just(Op::PopFirst),
        1 => Just(Op::PopLast),
        1 => Just(Op::Iterate),
    ];
    proptest::collection::vec(op, 1..200)
}

// Drives `sut` and a BTreeMap keyed by `model_key(k)` through `ops`. The
// model key must order exactly as `sut`'s strategy orders `k`.
fn run<O, M>(
    sut: &mut StrategySortedMap<i16, u32, O>,
    ops: Vec<Op>,
    model_key: impl Fn(i16) -> M,
    key_of: impl Fn(&M) -> i16,
) -> Result<(), TestCaseError>
where
    O: OrderStrategy<i16>,
    M: Ord,
{
    let mut model: BTreeMap<M, u32> = BTreeMap::new();
    for op in ops {
        match op {
            Op::Insert(k, v) => {
                prop_assert_eq!(sut.insert(k, v), model.insert(model_key(k), v));
            }
            Op::TryInsert(k, v) => {
                let mk = model_key(k);
                match sut.try_insert(k, v) {
                    Ok(()) => {
                        prop_assert!(!model.contains_key(&mk));
                        model.insert(mk, v);
                    }
                    Err(InsertError::DuplicateKey) => prop_assert!(model.contains_key(&mk)),
                }
            }
            Op::Remove(k) => {
                prop_assert_eq!(sut.remove(&k), model.remove(&model_key(k)));
            }
            Op::Get(k) => {
                prop_assert_eq!(sut.get(&k), model.get(&model_key(k)));
                prop_assert_eq!(sut.contains_key(&k), model.contains_key(&model_key(k)));
            }
            Op::PopFirst => {
                let expected = model.pop_first().map(|(m, v)| (key_of(&m), v));
                prop_assert_eq!(sut.pop_first(), expected);
            }
            Op::PopLast => {
                let expected = model.pop_last().map(|(m, v)| (key_of(&m), v));
                prop_assert_eq!(sut.pop_last(), expected);
            }
            Op::Iterate => {
                let got: Vec<(i16, u32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                let want: Vec<(i16, u32)> = model.iter().map(|(m, v)| (key_of(m), *v)).collect();
                prop_assert_eq!(got, want);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(
            sut.first().map(|(k, v)| (*k, *v)),
            model.iter().next().map(|(m, v)| (key_of(m), *v))
        );
        // AVL bound: height < 1.45 * log2(n + 2).
        let bound = 1.45 * ((sut.len() + 2) as f64).log2();
        prop_assert!((sut.height() as f64) < bound, "height {} for {} keys", sut.height(), sut.len());
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]

    #[test]
    fn prop_matches_btreemap(ops in arb_ops()) {
        let mut sut = StrategySortedMap::with_order(Natural::new());
        run(&mut sut, ops, |k| k, |m| *m)?;
    }

    #[test]
    fn prop_matches_btreemap_reversed(ops in arb_ops()) {
        let mut sut = StrategySortedMap::with_order(reversed(Natural::new()));
        run(&mut sut, ops, Reverse, |m| m.0)?;
    }

    // Coarse order: keys in the same bucket of 8 compare Equal and share a
    // slot. The model keeps the first key of each bucket, as the map does.
    #[test]
    fn prop_coarse_order_keeps_first_key(ops in arb_ops()) {
        let mut sut = StrategySortedMap::with_order(order_by(|k: &i16| k.div_euclid(8)));
        let mut model: BTreeMap<i16, (i16, u32)> = BTreeMap::new();
        for op in ops {
            match op {
                Op::Insert(k, v) | Op::TryInsert(k, v) => {
                    let overwrite = matches!(op, Op::Insert(..));
                    let bucket = k.div_euclid(8);
                    match model.get_mut(&bucket) {
                        Some(slot) if overwrite => {
                            prop_assert_eq!(sut.insert(k, v), Some(slot.1));
                            slot.1 = v;
                        }
                        Some(_) => {
                            prop_assert_eq!(sut.try_insert(k, v), Err(InsertError::DuplicateKey));
                        }
                        None => {
                            if overwrite {
                                prop_assert_eq!(sut.insert(k, v), None);
                            } else {
                                prop_assert_eq!(sut.try_insert(k, v), Ok(()));
                            }
                            model.insert(bucket, (k, v));
                        }
                    }
                }
                Op::Remove(k) => {
                    let expected = model.remove(&k.div_euclid(8));
                    prop_assert_eq!(sut.remove_entry(&k), expected);
                }
                Op::Get(k) => {
                    let expected = model.get(&k.div_euclid(8)).map(|(rk, v)| (rk, v));
                    prop_assert_eq!(sut.get_key_value(&k), expected);
                }
                Op::PopFirst => prop_assert_eq!(sut.pop_first(), model.pop_first().map(|(_, e)| e)),
                Op::PopLast => prop_assert_eq!(sut.pop_last(), model.pop_last().map(|(_, e)| e)),
                Op::Iterate => {
                    let got: Vec<(i16, u32)> = sut.iter().map(|(k, v)| (*k, *v)).collect();
                    let want: Vec<(i16, u32)> = model.values().copied().collect();
                    prop_assert_eq!(got, want);
                }
            }
            prop_assert_eq!(sut.len(), model.len());
        }
    }
}

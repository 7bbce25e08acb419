#![cfg(test)]

// Property tests for StrategyHashMap kept inside the crate so they can reach
// internal helpers without widening the public surface.

use crate::error::InsertError;
use crate::hash_map::{Handle, StrategyHashMap};
use crate::strategy::{equality_by, equality_fn, EqualityStrategy, Natural};
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::cell::Cell;
use std::collections::{BTreeSet, HashMap};
use std::rc::Rc;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    TryInsert(usize, i32),
    TryInsertWith(usize, i32),
    Remove(usize),
    RemoveHandle(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-cA-C]{0,3}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::TryInsert(i, v)),
            (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::TryInsertWith(i, v)),
            idx.clone().prop_map(OpI::Remove),
            idx.clone().prop_map(OpI::RemoveHandle),
            idx.clone().prop_map(OpI::Find),
            prop_oneof![contains_pool, "[a-cA-C]{0,3}".prop_map(|s| s)].prop_map(OpI::Contains),
            (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Model state: keyed by the normalized key (what the strategy considers
// identity); stores the resident original key, its value and its handle.
struct Model {
    entries: HashMap<String, (String, i32, Handle)>,
    normalize: fn(&str) -> String,
}

impl Model {
    fn new(normalize: fn(&str) -> String) -> Self {
        Self {
            entries: HashMap::new(),
            normalize,
        }
    }

    fn norm(&self, k: &str) -> String {
        (self.normalize)(k)
    }
}

// Drives `sut` and the model through `ops`, checking after every op:
// - Duplicates (per strategy) are rejected by `try_insert*`; `insert`
//   overwrites the value and keeps the first key.
// - `find`/`contains_key` parity with the model, handle stability.
// - Removal returns the resident key and its value; its handle goes stale.
// - `iter` yields each live entry exactly once.
// - `len`/`is_empty` parity.
fn run<E: EqualityStrategy<String>>(
    sut: &mut StrategyHashMap<String, i32, E>,
    pool: &[String],
    ops: Vec<OpI>,
    mut model: Model,
) -> Result<(), TestCaseError> {
    let mut stale: Vec<Handle> = Vec::new();
    let default_calls = Rc::new(Cell::new(0));
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let n = model.norm(&k);
                let prev = sut.insert(k.clone(), v);
                match model.entries.get_mut(&n) {
                    Some(e) => {
                        prop_assert_eq!(prev, Some(e.1));
                        e.1 = v;
                        prop_assert_eq!(e.2.key(sut), Some(&e.0), "resident key kept");
                    }
                    None => {
                        prop_assert_eq!(prev, None);
                        let h = sut.find(&k).expect("inserted key is findable");
                        model.entries.insert(n, (k, v, h));
                    }
                }
            }
            OpI::TryInsert(i, v) => {
                let k = pool[i].clone();
                let n = model.norm(&k);
                let already = model.entries.contains_key(&n);
                match sut.try_insert(k.clone(), v) {
                    Ok(h) => {
                        prop_assert!(!already, "try_insert must fail on duplicate");
                        model.entries.insert(n, (k, v, h));
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already, "duplicate error only when key exists");
                    }
                }
            }
            OpI::TryInsertWith(i, v) => {
                let k = pool[i].clone();
                let n = model.norm(&k);
                let already = model.entries.contains_key(&n);
                let counter = default_calls.clone();
                let before = counter.get();
                let made = move || {
                    counter.set(counter.get() + 1);
                    v
                };
                match sut.try_insert_with(k.clone(), made) {
                    Ok(h) => {
                        prop_assert!(!already);
                        prop_assert_eq!(default_calls.get(), before + 1, "default runs once");
                        model.entries.insert(n, (k, v, h));
                    }
                    Err(InsertError::DuplicateKey) => {
                        prop_assert!(already);
                        prop_assert_eq!(default_calls.get(), before, "default not run");
                    }
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let n = model.norm(k);
                match model.entries.remove(&n) {
                    Some((mk, mv, h)) => {
                        prop_assert_eq!(sut.remove_entry(k), Some((mk, mv)));
                        stale.push(h);
                    }
                    None => prop_assert!(sut.remove(k).is_none()),
                }
            }
            OpI::RemoveHandle(i) => {
                let n = model.norm(&pool[i]);
                if let Some((mk, mv, h)) = model.entries.remove(&n) {
                    prop_assert_eq!(sut.remove_handle(h), Some((mk, mv)));
                    prop_assert_eq!(sut.remove_handle(h), None);
                    stale.push(h);
                }
            }
            OpI::Find(i) => {
                let k = &pool[i];
                let found = sut.find(k);
                match model.entries.get(&model.norm(k)) {
                    Some(e) => prop_assert_eq!(found, Some(e.2)),
                    None => prop_assert!(found.is_none()),
                }
            }
            OpI::Contains(s) => {
                let n = model.norm(&s);
                prop_assert_eq!(sut.contains_key(&s), model.entries.contains_key(&n));
            }
            OpI::Mutate(i, d) => {
                let n = model.norm(&pool[i]);
                if let Some(e) = model.entries.get_mut(&n) {
                    match e.2.value_mut(sut) {
                        Some(vr) => {
                            *vr = vr.saturating_add(d);
                            e.1 = e.1.saturating_add(d);
                        }
                        None => prop_assert!(false, "live handle should resolve"),
                    }
                }
            }
            OpI::Iterate => {
                let s_entries: BTreeSet<(String, i32)> =
                    sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m_entries: BTreeSet<(String, i32)> = model
                    .entries
                    .values()
                    .map(|(k, v, _)| (k.clone(), *v))
                    .collect();
                prop_assert_eq!(sut.iter().count(), sut.len());
                prop_assert_eq!(s_entries, m_entries);
            }
        }

        for &h in &stale {
            prop_assert!(h.value(sut).is_none());
        }
        prop_assert_eq!(sut.len(), model.entries.len());
        prop_assert_eq!(sut.is_empty(), model.entries.is_empty());
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let mut sut: StrategyHashMap<String, i32, Natural> = StrategyHashMap::new();
        run(&mut sut, &pool, ops, Model::new(|s| s.to_string()))?;
    }

    // Same invariants when identity is case-insensitive: the model is keyed
    // by the lowercase form and the strategy alone decides duplicates.
    #[test]
    fn prop_state_machine_case_insensitive((pool, ops) in arb_scenario()) {
        let mut sut = StrategyHashMap::with_strategy(
            equality_by(|s: &String| s.to_ascii_lowercase()),
        );
        run(&mut sut, &pool, ops, Model::new(|s| s.to_ascii_lowercase()))?;
    }

    // Worst-case collisions: every key hashes to 0, so only `equals`
    // separates entries.
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let mut sut = StrategyHashMap::with_strategy(
            equality_fn(|a: &String, b: &String| a == b, |_: &String| 0),
        );
        run(&mut sut, &pool, ops, Model::new(|s| s.to_string()))?;
    }
}

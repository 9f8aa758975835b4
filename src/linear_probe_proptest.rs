#![cfg(test)]

// Property tests for LinearProbeTable kept inside the crate so they can
// inspect slot positions through `probe`.

use crate::hashing::{RollingHash, SlotHasher};
use crate::linear_probe::LinearProbeTable;
use crate::sizes::CapacitySequence;
use proptest::prelude::*;
use proptest::test_runner::TestCaseError;
use std::collections::{BTreeSet, HashMap};

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Find(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=12).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            3 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            1 => idx.clone().prop_map(OpI::Find),
            1 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

/// Sends every key to slot 0: one cluster holds everything.
#[derive(Clone, Default)]
struct HomeZero;
impl SlotHasher for HomeZero {
    fn slot(&self, _key: &[u8], _capacity: usize) -> usize {
        0
    }
}

// State-machine equivalence against std::collections::HashMap.
// Invariants checked after every op:
// - `len`/`is_empty` parity with the model.
// - Every model key is reachable by probing and maps to the model value
//   (cluster reinsertion never strands a key).
// - The occupied fraction never exceeds the max load factor.
fn run_state_machine<S: SlotHasher>(
    mut sut: LinearProbeTable<String, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();
    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let prev = sut.insert(k.clone(), v).expect("sizes are large enough");
                prop_assert_eq!(prev, model.insert(k, v));
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                match (sut.remove(k.as_str()), model.remove(k)) {
                    (Ok((kk, vv)), Some(mv)) => {
                        prop_assert_eq!(&kk, k);
                        prop_assert_eq!(vv, mv);
                    }
                    (Err(e), None) => prop_assert!(e.is_not_found()),
                    (got, want) => {
                        prop_assert!(false, "remove mismatch: {:?} vs {:?}", got, want)
                    }
                }
                prop_assert!(sut.probe(k.as_str(), false).is_err());
            }
            OpI::Find(i) => {
                let k = &pool[i];
                prop_assert_eq!(sut.find(k.as_str()), model.get(k));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(s.as_str()), model.contains_key(&s));
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(vr) = sut.find_mut(k.as_str()) {
                    *vr = vr.saturating_add(d);
                    let mv = model.get_mut(k).expect("present in model");
                    *mv = mv.saturating_add(d);
                } else {
                    prop_assert!(!model.contains_key(k));
                }
            }
            OpI::Iterate => {
                let s_keys: BTreeSet<_> = sut.keys().cloned().collect();
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(s_keys, m_keys);
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert!(sut.load_factor() <= sut.max_load_factor());
        for (k, v) in &model {
            let at = sut.probe(k.as_str(), false);
            prop_assert!(at.is_ok(), "key {:?} unreachable", k);
            prop_assert_eq!(sut.get(k.as_str()), Ok(v));
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let sizes = CapacitySequence::new(&[5, 13, 29, 53]).unwrap();
        let sut = LinearProbeTable::with_options(sizes, 0.5, RollingHash).unwrap();
        run_state_machine(sut, pool, ops)?;
    }
}

// Same invariants under worst-case collisions: every key shares one home
// slot, so every removal exercises cluster reinsertion.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sizes = CapacitySequence::new(&[5, 13, 29, 53]).unwrap();
        let sut = LinearProbeTable::with_options(sizes, 0.5, HomeZero).unwrap();
        run_state_machine(sut, pool, ops)?;
    }
}

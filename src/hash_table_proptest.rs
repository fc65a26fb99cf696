#![cfg(test)]

// Property tests for HashTable kept inside the crate so they can reach the
// internal hasher constructor and the invariant checker.

use crate::config::TableConfig;
use crate::error::TableError;
use crate::hash_table::HashTable;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hash, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations so shrinking moves towards earlier keys.
#[derive(Clone, Debug)]
enum Op {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Resize,
    Clear,
    Take,
    CloneAndDiverge(usize, i32),
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_config() -> impl Strategy<Value = TableConfig> {
    (1usize..=8, prop_oneof![Just(0.25), Just(0.5), Just(0.75), Just(1.0)]).prop_map(
        |(cap, lf)| {
            TableConfig::new()
                .with_initial_capacity(cap)
                .with_max_load_factor(lf)
        },
    )
}

fn arb_scenario() -> impl Strategy<Value = (TableConfig, Vec<String>, Vec<Op>)> {
    let pool = proptest::collection::vec("[a-z]{0,5}", 1..=24);
    (arb_config(), pool).prop_flat_map(|(cfg, pool)| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::Insert(i, v)),
            2 => idx.clone().prop_map(Op::Remove),
            2 => idx.clone().prop_map(Op::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(Op::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| Op::Mutate(i, d)),
            1 => Just(Op::Iterate),
            1 => Just(Op::Resize),
            1 => Just(Op::Clear),
            1 => Just(Op::Take),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| Op::CloneAndDiverge(i, v)),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (cfg, pool.clone(), ops))
    })
}

// Drives one operation sequence against the table and a std HashMap model.
// Invariants checked after every step:
// - `len`/`is_empty` parity with the model.
// - Structural invariants: bucket placement, no duplicate keys, reachable
//   count equals `len`, load bound.
// - Capacity never drops below 1 and only changes by growth or `take`.
fn run_state_machine<S>(
    mut sut: HashTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<Op>,
) -> Result<(), TestCaseError>
where
    S: BuildHasher + Clone,
{
    let mut model: HashMap<Key, i32> = HashMap::new();

    for op in ops {
        let cap_before = sut.capacity();
        match op {
            Op::Insert(i, v) => {
                let k = key_from(pool, i);
                let prev = sut.insert(k.clone(), v).expect("insert");
                prop_assert_eq!(prev, model.insert(k.clone(), v));
                prop_assert_eq!(sut.get(&k), Ok(&v));
                prop_assert!(sut.capacity() >= cap_before);
            }
            Op::Remove(i) => {
                let k = key_from(pool, i);
                match (sut.remove_entry(&k), model.remove(&k)) {
                    (Ok((kk, vv)), Some(mv)) => {
                        prop_assert_eq!(kk, k.clone());
                        prop_assert_eq!(vv, mv);
                    }
                    (Err(TableError::KeyNotFound), None) => {}
                    (got, want) => {
                        return Err(TestCaseError::fail(format!(
                            "remove mismatch: got {got:?}, model {want:?}"
                        )))
                    }
                }
                prop_assert_eq!(sut.get(&k), Err(TableError::KeyNotFound));
                prop_assert_eq!(sut.capacity(), cap_before);
            }
            Op::Get(i) => {
                let k = key_from(pool, i);
                match model.get(&k) {
                    Some(mv) => {
                        prop_assert_eq!(sut.get(&k), Ok(mv));
                    }
                    None => {
                        prop_assert_eq!(sut.get(&k), Err(TableError::KeyNotFound));
                    }
                }
            }
            Op::Contains(s) => {
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(sut.contains_key(s.as_str()), has_model);
            }
            Op::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Ok(v), Some(mv)) => {
                        *v = v.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (Err(TableError::KeyNotFound), None) => {}
                    _ => return Err(TestCaseError::fail("get_mut disagrees with model")),
                }
            }
            Op::Iterate => {
                let s: BTreeSet<(Key, i32)> = sut.iter().map(|(k, v)| (k.clone(), *v)).collect();
                let m: BTreeSet<(Key, i32)> = model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(s, m);
            }
            Op::Resize => {
                // Bound memory use on long runs of resizes.
                if cap_before < 1 << 12 {
                    sut.resize().expect("resize");
                    prop_assert_eq!(sut.capacity(), cap_before * 2);
                }
            }
            Op::Clear => {
                sut.clear();
                model.clear();
                prop_assert_eq!(sut.capacity(), cap_before);
            }
            Op::Take => {
                let moved = sut.take();
                prop_assert_eq!(moved.capacity(), cap_before);
                prop_assert_eq!(moved.len(), model.len());
                prop_assert_eq!(sut.capacity(), 1);
                prop_assert!(sut.is_empty());
                // Continue with the moved-out contents.
                sut = moved;
            }
            Op::CloneAndDiverge(i, v) => {
                let mut copy = sut.clone();
                prop_assert_eq!(copy.capacity(), sut.capacity());
                let k = key_from(pool, i);
                if copy.remove(&k).is_err() {
                    copy.insert(k.clone(), v).expect("insert into copy");
                }
                // The source is unaffected by edits to the copy.
                match model.get(&k) {
                    Some(mv) => {
                        prop_assert_eq!(sut.get(&k), Ok(mv));
                    }
                    None => {
                        prop_assert!(!sut.contains_key(&k));
                    }
                }
                copy.check_invariants().map_err(TestCaseError::fail)?;
            }
        }

        sut.check_invariants().map_err(TestCaseError::fail)?;
        prop_assert!(sut.capacity() >= 1);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Property: state-machine equivalence against std::collections::HashMap
// using the default hasher.
proptest! {
    #![proptest_config(ProptestConfig { cases: 96, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((cfg, pool, ops) in arb_scenario()) {
        let sut: HashTable<Key, i32> = HashTable::with_config(cfg).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress chain traversal.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: the same invariants hold when every key lands in one chain.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((cfg, pool, ops) in arb_scenario()) {
        let sut: HashTable<Key, i32, ConstBuildHasher> =
            HashTable::with_config_and_hasher(cfg, ConstBuildHasher).unwrap();
        run_state_machine(sut, &pool, ops)?;
    }
}

// Property: inserting distinct keys leaves exactly that many entries, each
// readable, and every intermediate state honours the load bound.
proptest! {
    #[test]
    fn prop_distinct_inserts_counted(cfg in arb_config(), keys in proptest::collection::btree_set(any::<u32>(), 0..200)) {
        let mut t: HashTable<u32, u32> = HashTable::with_config(cfg).unwrap();
        for &k in &keys {
            prop_assert_eq!(t.insert(k, k ^ 0x5555).unwrap(), None);
            prop_assert!(t.len() as f64 <= t.capacity() as f64 * t.max_load_factor());
        }
        prop_assert_eq!(t.len(), keys.len());
        for &k in &keys {
            prop_assert_eq!(t.get(&k), Ok(&(k ^ 0x5555)));
        }
        t.check_invariants().map_err(TestCaseError::fail)?;
    }
}

// Hash must be consistent with the key's Borrow<str> form.
#[test]
fn key_hash_matches_borrowed_str() {
    let hasher = hashbrown::hash_map::DefaultHashBuilder::default();
    let k = Key("abc".into());
    let mut h1 = hasher.build_hasher();
    k.hash(&mut h1);
    let mut h2 = hasher.build_hasher();
    "abc".hash(&mut h2);
    assert_eq!(h1.finish(), h2.finish());
}

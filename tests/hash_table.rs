// HashTable unit test suite for the public API.
//
// Each test documents what behavior is being verified. The core invariants
// exercised:
// - Uniqueness: inserting an existing key overwrites in place; len unchanged.
// - Misses: get/remove of an absent key report KeyNotFound, never a no-op.
// - Growth: the load bound holds after every insert; growth keeps contents.
// - Usability: clear() and take() never leave the table without buckets.
// - Copies: a clone is independent of its source.
use chain_hashtable::{
    HashTable, TableConfig, TableError, MAX_BUCKETS_PER_ENTRY, MIN_MAX_LOAD_FACTOR,
};

fn small(capacity: usize, load: f64) -> HashTable<String, i32> {
    HashTable::with_config(
        TableConfig::new()
            .with_initial_capacity(capacity)
            .with_max_load_factor(load),
    )
    .expect("valid config")
}

// Test: defaults.
// Verifies: 16 buckets, 0.75 load factor, empty.
#[test]
fn new_table_uses_defaults() {
    let t: HashTable<String, i32> = HashTable::new();
    assert_eq!(t.capacity(), 16);
    assert_eq!(t.max_load_factor(), 0.75);
    assert!(t.is_empty());
    assert_eq!(t.len(), 0);
    assert_eq!(t.load_factor(), 0.0);
}

// Test: configuration validation.
// Verifies: zero capacity and out-of-range load factors are rejected.
#[test]
fn invalid_configuration_rejected() {
    assert!(matches!(
        HashTable::<u8, u8>::with_capacity(0),
        Err(TableError::InvalidConfiguration { .. })
    ));
    for lf in [0.0, 1.5, -1.0, f64::NAN] {
        let cfg = TableConfig::new().with_max_load_factor(lf);
        assert!(matches!(
            HashTable::<u8, u8>::with_config(cfg),
            Err(TableError::InvalidConfiguration { .. })
        ));
    }
    assert_eq!(HashTable::<u8, u8>::with_capacity(1).unwrap().capacity(), 1);
}

// Test: load factors too small to hold one entry in a bounded bucket array
// are rejected at construction; the smallest accepted one still inserts.
#[test]
fn tiny_load_factor_rejected_before_insert() {
    for lf in [1e-300, 1e-9, f64::MIN_POSITIVE] {
        let cfg = TableConfig::new().with_max_load_factor(lf);
        assert!(matches!(
            HashTable::<u64, u64>::with_config(cfg),
            Err(TableError::InvalidConfiguration { .. })
        ));
    }

    let cfg = TableConfig::new()
        .with_initial_capacity(16)
        .with_max_load_factor(MIN_MAX_LOAD_FACTOR);
    let mut t: HashTable<u64, u64> = HashTable::with_config(cfg).unwrap();
    assert_eq!(t.insert(1, 1), Ok(None));
    assert_eq!(t.capacity(), MAX_BUCKETS_PER_ENTRY);
    assert_eq!(t.get(&1), Ok(&1));
}

// Test: insert/get round trip with borrowed lookup.
#[test]
fn insert_then_get() {
    let mut t = HashTable::new();
    t.insert("hello".to_string(), 1).unwrap();
    assert_eq!(t.get("hello"), Ok(&1));
    assert_eq!(t.get(&"hello".to_string()), Ok(&1));
    assert!(t.contains_key("hello"));
    assert!(!t.contains_key("world"));
    assert_eq!(t.get("world"), Err(TableError::KeyNotFound));
}

// Test: overwrite semantics.
// Verifies: second insert replaces the value and leaves len unchanged.
#[test]
fn overwrite_keeps_count() {
    let mut t = HashTable::new();
    t.insert("k".to_string(), 1).unwrap();
    let prev = t.insert("k".to_string(), 2).unwrap();
    assert_eq!(prev, Some(1));
    assert_eq!(t.get("k"), Ok(&2));
    assert_eq!(t.len(), 1);
}

// Test: remove then get.
// Verifies: a removed key is gone and a second remove fails.
#[test]
fn remove_then_get_fails() {
    let mut t = HashTable::new();
    t.insert("k".to_string(), 7).unwrap();
    assert_eq!(t.remove("k"), Ok(7));
    assert_eq!(t.get("k"), Err(TableError::KeyNotFound));
    assert_eq!(t.remove("k"), Err(TableError::KeyNotFound));
    assert!(t.is_empty());
}

// Test: remove on an empty table.
#[test]
fn remove_from_empty_table_fails() {
    let mut t: HashTable<String, i32> = HashTable::new();
    for k in ["", "a", "missing"] {
        assert_eq!(t.remove(k), Err(TableError::KeyNotFound));
    }
    assert_eq!(t.remove_entry("a"), Err(TableError::KeyNotFound));
}

// Test: remove_entry returns the owned key.
#[test]
fn remove_entry_returns_owned_pair() {
    let mut t = HashTable::new();
    t.insert("key".to_string(), vec![1, 2, 3]).unwrap();
    let (k, v) = t.remove_entry("key").unwrap();
    assert_eq!(k, "key");
    assert_eq!(v, vec![1, 2, 3]);
}

// Test: capacity 2 with load factor 0.75.
// Verifies: first insert does not grow; second grows to 4 before inserting.
#[test]
fn second_insert_grows_small_table() {
    let mut t = small(2, 0.75);
    t.insert("a".to_string(), 1).unwrap();
    assert_eq!(t.len(), 1);
    assert_eq!(t.capacity(), 2);

    t.insert("b".to_string(), 2).unwrap();
    assert_eq!(t.capacity(), 4);
    assert_eq!(t.get("a"), Ok(&1));
    assert_eq!(t.get("b"), Ok(&2));
    assert_eq!(t.len(), 2);
}

// Test: load factor bound.
// Verifies: len <= capacity * max_load_factor after every insert, and every
// earlier key survives each growth step with its value.
#[test]
fn load_bound_holds_through_growth() {
    let mut t = small(1, 0.5);
    let mut last_cap = t.capacity();
    for i in 0..300 {
        t.insert(format!("k{i}"), i).unwrap();
        assert!(t.len() as f64 <= t.capacity() as f64 * t.max_load_factor());
        if t.capacity() != last_cap {
            assert!(t.capacity() > last_cap);
            for j in 0..=i {
                assert_eq!(t.get(format!("k{j}").as_str()), Ok(&j));
            }
            last_cap = t.capacity();
        }
    }
    assert_eq!(t.len(), 300);
}

// Test: explicit resize.
#[test]
fn resize_doubles_and_keeps_entries() {
    let mut t = small(4, 1.0);
    for i in 0..4 {
        t.insert(i.to_string(), i).unwrap();
    }
    t.resize().unwrap();
    assert_eq!(t.capacity(), 8);
    assert_eq!(t.len(), 4);
    for i in 0..4 {
        assert_eq!(t.get(i.to_string().as_str()), Ok(&i));
    }
}

// Test: clear with ten entries.
// Verifies: len 0, all keys absent, capacity kept, next insert works.
#[test]
fn clear_then_reuse() {
    let mut t = HashTable::new();
    for i in 0..10 {
        t.insert(format!("k{i}"), i).unwrap();
    }
    let cap = t.capacity();
    t.clear();
    assert_eq!(t.len(), 0);
    assert_eq!(t.capacity(), cap);
    for i in 0..10 {
        assert!(!t.contains_key(format!("k{i}").as_str()));
    }
    t.insert("again".to_string(), 1).unwrap();
    assert_eq!(t.get("again"), Ok(&1));
}

// Test: copy independence.
// Verifies: edits to a clone do not show in the source and vice versa.
#[test]
fn clone_is_independent() {
    let mut a = HashTable::new();
    a.insert("x".to_string(), 1).unwrap();
    a.insert("y".to_string(), 2).unwrap();

    let mut b = a.clone();
    assert_eq!(b.capacity(), a.capacity());
    assert_eq!(b.max_load_factor(), a.max_load_factor());
    b.insert("z".to_string(), 3).unwrap();
    b.remove("x").unwrap();
    *b.get_mut("y").unwrap() = 20;

    assert_eq!(a.len(), 2);
    assert_eq!(a.get("x"), Ok(&1));
    assert_eq!(a.get("y"), Ok(&2));
    assert!(!a.contains_key("z"));

    a.insert("w".to_string(), 4).unwrap();
    assert!(!b.contains_key("w"));
}

// Test: copy assignment.
// Verifies: clone_from replaces the destination's contents and settings.
#[test]
fn clone_from_replaces_contents() {
    let mut src = small(8, 0.5);
    src.insert("s".to_string(), 1).unwrap();
    let mut dst = HashTable::new();
    dst.insert("d".to_string(), 2).unwrap();

    dst.clone_from(&src);
    assert_eq!(dst.capacity(), 8);
    assert_eq!(dst.max_load_factor(), 0.5);
    assert_eq!(dst.get("s"), Ok(&1));
    assert!(!dst.contains_key("d"));
}

// Test: move out with take.
// Verifies: contents move, the source is empty with one bucket and remains
// usable, and move-assignment via `*dst = src.take()` drops old contents.
#[test]
fn take_moves_and_leaves_usable_source() {
    let mut src = small(8, 0.75);
    src.insert("a".to_string(), 1).unwrap();
    src.insert("b".to_string(), 2).unwrap();

    let mut dst = HashTable::new();
    dst.insert("old".to_string(), 0).unwrap();
    dst = src.take();

    assert_eq!(dst.len(), 2);
    assert_eq!(dst.capacity(), 8);
    assert_eq!(dst.get("a"), Ok(&1));
    assert!(!dst.contains_key("old"));

    assert_eq!(src.len(), 0);
    assert_eq!(src.capacity(), 1);
    assert_eq!(src.get("a"), Err(TableError::KeyNotFound));
    src.insert("c".to_string(), 3).unwrap();
    assert_eq!(src.get("c"), Ok(&3));
}

// Test: iteration.
// Verifies: iter yields each entry once; iter_mut updates are visible.
#[test]
fn iteration_and_mutation() {
    let mut t = HashTable::new();
    for (i, k) in ["k1", "k2", "k3"].iter().enumerate() {
        t.insert(k.to_string(), i as i32).unwrap();
    }
    let mut seen: Vec<(String, i32)> = t.iter().map(|(k, v)| (k.clone(), *v)).collect();
    seen.sort();
    assert_eq!(
        seen,
        vec![
            ("k1".to_string(), 0),
            ("k2".to_string(), 1),
            ("k3".to_string(), 2)
        ]
    );

    for (_k, v) in t.iter_mut() {
        *v += 10;
    }
    for (_k, v) in &mut t {
        *v += 1;
    }
    assert_eq!(t.get("k1"), Ok(&11));
    assert_eq!(t.get("k3"), Ok(&13));
    assert_eq!((&t).into_iter().count(), 3);
}

// Test: get_key_value and get_mut.
#[test]
fn key_value_access() {
    let mut t = HashTable::new();
    t.insert("k".to_string(), 5).unwrap();
    let (k, v) = t.get_key_value("k").unwrap();
    assert_eq!((k.as_str(), *v), ("k", 5));
    *t.get_mut("k").unwrap() *= 3;
    assert_eq!(t.get("k"), Ok(&15));
    assert_eq!(t.get_mut("nope"), Err(TableError::KeyNotFound));
}

// Test: diagnostic dump.
// Verifies: one line per bucket, in order, each ending with the end marker.
#[test]
fn dump_has_one_line_per_bucket() {
    let mut t = small(4, 1.0);
    t.insert("a".to_string(), 1).unwrap();
    t.insert("b".to_string(), 2).unwrap();
    let out = t.dump().to_string();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 4);
    for (i, line) in lines.iter().enumerate() {
        assert!(line.starts_with(&format!("bucket {i}: ")));
        assert!(line.ends_with("end"));
    }
    assert!(out.contains("(a, 1) -> "));
    assert!(out.contains("(b, 2) -> "));
}

// Test: drop of a large table.
// Verifies: releasing many entries completes without recursion issues.
#[test]
fn large_table_drops_cleanly() {
    let mut t = HashTable::new();
    for i in 0..100_000u32 {
        t.insert(i, i).unwrap();
    }
    assert_eq!(t.len(), 100_000);
    drop(t);
}

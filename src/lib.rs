//! chain-hashtable: a single-threaded, separate-chaining hash table with
//! load-factor driven growth.
//!
//! Internal Design:
//!
//! Summary
//! - Layers:
//!   - `chain::Chains<K, V>`: structural layer. An entry arena plus a
//!     bucket array of chain heads; knows nothing about hashing keys or
//!     load factors.
//!   - `HashTable<K, V, S>`: public API. Hashes keys, enforces the load
//!     bound, and maps misses to `TableError::KeyNotFound`.
//!
//! Constraints
//! - Single-threaded; no internal locking. Wrap in a lock for shared use.
//! - Capacity is always at least 1. `clear()` keeps the bucket array and
//!   `take()` leaves a single bucket behind, so no operation ever computes
//!   an index modulo zero.
//! - Growth runs before the insert that would exceed the maximum load
//!   factor; the table never shrinks.
//! - Unique keys. Inserting an existing key replaces its value in place.
//!
//! Entry ownership
//! - Entries live in a `slotmap::SlotMap` and chains link them by
//!   generational id. A bucket slot owns its chain head and each entry owns
//!   its successor. Dropping, clearing, and resizing are loops over the
//!   arena or the bucket array; nothing recurses along a chain.
//! - Resize allocates the new bucket array first, then relinks each entry.
//!   Entries are never copied or rebuilt, and an allocation failure leaves
//!   the old layout intact.
//!
//! Hashing
//! - Each entry stores its full `u64` key hash. The bucket index is always
//!   recomputed as `hash % capacity`, so resizing never calls `K: Hash`.
//! - The default hasher is `hashbrown`'s `DefaultHashBuilder`. It is not
//!   configurable from outside the crate.
//!
//! Reentrancy
//! - Every operation holds a debug-only guard (`phase::PhaseTracker`) and
//!   panics if `K: Eq` or `K: Hash` re-enters the same table. The tracker
//!   also records the transient growing phase. Release builds compile it
//!   away.
//! - `clear()` detaches the entries before dropping them, so `Drop` for
//!   `K`/`V` runs with the table consistent and the guard released.

mod chain;
mod config;
mod error;
mod hash_table;
mod hash_table_proptest;
mod phase;

// Public surface
pub use config::{
    TableConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_LOAD_FACTOR, MAX_BUCKETS_PER_ENTRY,
    MIN_MAX_LOAD_FACTOR,
};
pub use error::{Result, TableError};
pub use hash_table::{Dump, HashTable, Iter, IterMut};

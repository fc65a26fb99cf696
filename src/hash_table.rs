//! HashTable: chained buckets, load-factor growth, and the public operation set.

use crate::chain::{Chains, Entry, EntryId};
use crate::config::{TableConfig, DEFAULT_INITIAL_CAPACITY, DEFAULT_MAX_LOAD_FACTOR};
use crate::error::{Result, TableError};
use crate::phase::PhaseTracker;
use core::borrow::Borrow;
use core::fmt;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;

/// Separate-chaining hash table.
///
/// Keys are unique. Inserting an existing key replaces its value in place.
/// The table grows before any insert that would push the load factor above
/// its configured maximum, and never shrinks.
///
/// ```
/// use chain_hashtable::{HashTable, TableError};
///
/// let mut t = HashTable::new();
/// t.insert("a".to_string(), 1).unwrap();
/// assert_eq!(t.get("a"), Ok(&1));
/// assert_eq!(t.remove("a"), Ok(1));
/// assert_eq!(t.get("a"), Err(TableError::KeyNotFound));
/// ```
pub struct HashTable<K, V, S = DefaultHashBuilder> {
    hasher: S,
    chains: Chains<K, V>,
    max_load_factor: f64,
    phase: PhaseTracker,
}

impl<K, V> HashTable<K, V>
where
    K: Eq + Hash,
{
    /// Empty table with 16 buckets and a 0.75 maximum load factor.
    pub fn new() -> Self {
        Self {
            hasher: DefaultHashBuilder::default(),
            chains: Chains::with_capacity(DEFAULT_INITIAL_CAPACITY),
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
            phase: PhaseTracker::new(),
        }
    }

    pub fn with_capacity(capacity: usize) -> Result<Self> {
        Self::with_config(TableConfig::new().with_initial_capacity(capacity))
    }

    pub fn with_config(config: TableConfig) -> Result<Self> {
        Self::with_config_and_hasher(config, DefaultHashBuilder::default())
    }
}

impl<K, V> Default for HashTable<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

/// Growth is required when `count` entries would exceed the allowed load.
#[inline]
fn exceeds_load(count: usize, capacity: usize, max_load_factor: f64) -> bool {
    count as f64 > capacity as f64 * max_load_factor
}

/// Relocates every entry into `target` buckets with the table in its growing
/// phase. Takes the fields separately so callers can hold an operation guard.
fn grow_chains<K, V>(chains: &mut Chains<K, V>, phase: &PhaseTracker, target: usize) -> Result<()> {
    let _grow = phase.grow();
    let from = chains.capacity();
    chains.relocate(target)?;
    log::debug!(
        "hash table grew from {} to {} buckets ({} entries relocated)",
        from,
        target,
        chains.len()
    );
    Ok(())
}

impl<K, V, S> HashTable<K, V, S> {
    /// Number of stored key/value pairs.
    pub fn len(&self) -> usize {
        self.chains.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chains.len() == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.chains.capacity()
    }

    pub fn max_load_factor(&self) -> f64 {
        self.max_load_factor
    }

    /// Current `len / capacity`.
    pub fn load_factor(&self) -> f64 {
        self.chains.len() as f64 / self.chains.capacity() as f64
    }

    /// Releases every entry. Bucket count and load factor are kept, so the
    /// table stays usable.
    pub fn clear(&mut self) {
        let released = {
            let _g = self.phase.enter();
            self.chains.detach_all()
        };
        log::trace!("hash table cleared {} entries", released.len());
        // Keys and values drop after the guard, with the table consistent.
        drop(released);
    }

    /// Iterate over all entries in unspecified order.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.chains.entries(),
        }
    }

    /// Iterate over all entries with mutable access to values.
    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.chains.entries_mut(),
        }
    }

    /// Human-readable view of every bucket and its chain, in bucket order.
    pub fn dump(&self) -> Dump<'_, K, V> {
        Dump {
            chains: &self.chains,
        }
    }
}

impl<K, V, S> HashTable<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    pub(crate) fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            hasher,
            chains: Chains::try_with_capacity(config.initial_capacity)?,
            max_load_factor: config.max_load_factor,
            phase: PhaseTracker::new(),
        })
    }

    fn make_hash<Q>(&self, q: &Q) -> u64
    where
        Q: ?Sized + Hash,
    {
        self.hasher.hash_one(q)
    }

    /// Bucket count needed to hold `count` entries, or `None` if the current
    /// one suffices.
    fn growth_target(&self, count: usize) -> Result<Option<usize>> {
        // Doubling from zero never terminates; `chain::bucket_index` owns the
        // zero-capacity error.
        let mut target = self.chains.capacity().max(1);
        if !exceeds_load(count, target, self.max_load_factor) {
            return Ok(None);
        }
        while exceeds_load(count, target, self.max_load_factor) {
            target = target
                .checked_mul(2)
                .ok_or(TableError::CapacityOverflow {
                    requested: usize::MAX,
                })?;
        }
        Ok(Some(target))
    }

    /// Insert `key -> value`, growing first if one more entry would exceed
    /// the maximum load factor. Returns the previous value when the key was
    /// already present; the entry count is then unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>> {
        let _g = self.phase.enter();
        let incoming = self.chains.len().saturating_add(1);
        if let Some(target) = self.growth_target(incoming)? {
            grow_chains(&mut self.chains, &self.phase, target)?;
        }

        let hash = self.make_hash(&key);
        if let Some(id) = self.chains.find(hash, |k| *k == key)? {
            let slot = &mut self.chains.entry_mut(id).value;
            return Ok(Some(core::mem::replace(slot, value)));
        }
        self.chains.push_front(hash, key, value)?;
        Ok(None)
    }

    fn lookup<Q>(&self, q: &Q) -> Result<EntryId>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let hash = self.make_hash(q);
        self.chains
            .find(hash, |k| k.borrow() == q)?
            .ok_or(TableError::KeyNotFound)
    }

    pub fn get<Q>(&self, q: &Q) -> Result<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.phase.enter();
        let id = self.lookup(q)?;
        Ok(&self.chains.entry(id).value)
    }

    pub fn get_mut<Q>(&mut self, q: &Q) -> Result<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.phase.enter();
        let id = self.lookup(q)?;
        Ok(&mut self.chains.entry_mut(id).value)
    }

    pub fn get_key_value<Q>(&self, q: &Q) -> Result<(&K, &V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.phase.enter();
        let id = self.lookup(q)?;
        let e = self.chains.entry(id);
        Ok((&e.key, &e.value))
    }

    pub fn contains_key<Q>(&self, q: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.phase.enter();
        self.lookup(q).is_ok()
    }

    /// Remove `q` and return its owned key and value.
    pub fn remove_entry<Q>(&mut self, q: &Q) -> Result<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let _g = self.phase.enter();
        let hash = self.make_hash(q);
        let Entry { key, value, .. } = self
            .chains
            .unlink(hash, |k| k.borrow() == q)?
            .ok_or(TableError::KeyNotFound)?;
        Ok((key, value))
    }

    pub fn remove<Q>(&mut self, q: &Q) -> Result<V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        self.remove_entry(q).map(|(_, v)| v)
    }

    /// Double the bucket count and rehash every entry into it.
    pub fn resize(&mut self) -> Result<()> {
        let _g = self.phase.enter();
        let target = self
            .chains
            .capacity()
            .checked_mul(2)
            .ok_or(TableError::CapacityOverflow {
                requested: usize::MAX,
            })?;
        grow_chains(&mut self.chains, &self.phase, target)
    }

    /// Move all contents out in O(1), leaving this table empty with a single
    /// bucket and the same maximum load factor.
    pub fn take(&mut self) -> Self
    where
        S: Clone,
    {
        let _g = self.phase.enter();
        let chains = self.chains.take();
        log::trace!(
            "hash table moved out {} entries across {} buckets",
            chains.len(),
            chains.capacity()
        );
        Self {
            hasher: self.hasher.clone(),
            chains,
            max_load_factor: self.max_load_factor,
            phase: PhaseTracker::new(),
        }
    }

    /// Verifies every structural invariant, returning a description of the
    /// first violation found.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) -> core::result::Result<(), String> {
        let cap = self.capacity();
        if cap == 0 {
            return Err("capacity is zero".into());
        }
        let mut reachable = 0usize;
        for idx in 0..cap {
            let chain: Vec<_> = self.chains.chain(idx).collect();
            for (pos, e) in chain.iter().enumerate() {
                if e.hash != self.make_hash(&e.key) {
                    return Err(format!("stale hash in bucket {idx}"));
                }
                let expected = crate::chain::bucket_index(e.hash, cap)
                    .map_err(|err| err.to_string())?;
                if expected != idx {
                    return Err(format!("entry in bucket {idx} belongs in {expected}"));
                }
                if chain[pos + 1..].iter().any(|o| o.key == e.key) {
                    return Err(format!("duplicate key in bucket {idx}"));
                }
            }
            reachable += chain.len();
        }
        if reachable != self.len() {
            return Err(format!("{reachable} reachable entries, len {}", self.len()));
        }
        if exceeds_load(self.len(), cap, self.max_load_factor) {
            return Err(format!("load bound violated: {} entries in {cap} buckets", self.len()));
        }
        Ok(())
    }
}

impl<K, V, S> Clone for HashTable<K, V, S>
where
    K: Clone,
    V: Clone,
    S: Clone,
{
    /// Deep copy with identical bucket count, load factor and chain layout.
    fn clone(&self) -> Self {
        Self {
            hasher: self.hasher.clone(),
            chains: self.chains.clone(),
            max_load_factor: self.max_load_factor,
            phase: PhaseTracker::new(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.hasher.clone_from(&source.hasher);
        self.chains.clone_from(&source.chains);
        self.max_load_factor = source.max_load_factor;
    }
}

impl<K, V, S> fmt::Debug for HashTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.iter()).finish()
    }
}

/// Iterator over immutable entries in `HashTable`.
pub struct Iter<'a, K, V> {
    it: slotmap::basic::Iter<'a, EntryId, Entry<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

/// Iterator over mutable entries in `HashTable`.
pub struct IterMut<'a, K, V> {
    it: slotmap::basic::IterMut<'a, EntryId, Entry<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.next().map(|(_, e)| (&e.key, &mut e.value))
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        self.it.size_hint()
    }
}

impl<'a, K, V, S> IntoIterator for &'a HashTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, K, V, S> IntoIterator for &'a mut HashTable<K, V, S> {
    type Item = (&'a K, &'a mut V);
    type IntoIter = IterMut<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}

/// Bucket-by-bucket rendering returned by [`HashTable::dump`].
///
/// One line per bucket: `bucket <i>: (k, v) -> (k, v) -> end`. The format is
/// meant for people and may change.
pub struct Dump<'a, K, V> {
    chains: &'a Chains<K, V>,
}

impl<K, V> fmt::Display for Dump<'_, K, V>
where
    K: fmt::Display,
    V: fmt::Display,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for idx in 0..self.chains.capacity() {
            write!(f, "bucket {idx}: ")?;
            for e in self.chains.chain(idx) {
                write!(f, "({}, {}) -> ", e.key, e.value)?;
            }
            writeln!(f, "end")?;
        }
        Ok(())
    }
}

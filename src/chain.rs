//! Chains: entry arena plus the bucket array of chain heads.
//!
//! Entries live in a `SlotMap` and link to their successor by `EntryId`, so
//! every chain is a singly linked list threaded through the arena. Each
//! bucket slot owns the head of its chain; each entry owns its successor.
//! Relocating an entry rewrites links only; the entry itself never moves
//! in or out of the arena during a resize.

use crate::error::{Result, TableError};
use core::num::NonZeroUsize;
use slotmap::SlotMap;

slotmap::new_key_type! {
    /// Generational id of an entry in the arena.
    pub(crate) struct EntryId;
}

#[derive(Clone, Debug)]
pub(crate) struct Entry<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    /// Full key hash; the bucket index is derived from it on demand.
    pub(crate) hash: u64,
    next: Option<EntryId>,
}

/// Maps a key hash onto `[0, capacity)`.
///
/// A zero capacity has no valid index and yields `InvalidState`.
#[inline]
pub(crate) fn bucket_index(hash: u64, capacity: usize) -> Result<usize> {
    NonZeroUsize::new(capacity)
        .map(|m| index_in(hash, m))
        .ok_or(TableError::InvalidState)
}

#[inline]
fn index_in(hash: u64, modulus: NonZeroUsize) -> usize {
    // The remainder is below `modulus`, so it fits in usize.
    (hash % modulus.get() as u64) as usize
}

fn alloc_buckets(capacity: usize) -> Result<Vec<Option<EntryId>>> {
    let mut buckets = Vec::new();
    buckets
        .try_reserve_exact(capacity)
        .map_err(|_| TableError::CapacityOverflow {
            requested: capacity,
        })?;
    buckets.resize(capacity, None);
    Ok(buckets)
}

pub(crate) struct Chains<K, V> {
    buckets: Vec<Option<EntryId>>,
    slots: SlotMap<EntryId, Entry<K, V>>,
}

impl<K, V> Chains<K, V> {
    /// Bucket array of `capacity` empty chains. `capacity` must be small
    /// enough that allocation cannot reasonably fail; use `try_with_capacity`
    /// for caller-supplied sizes.
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        debug_assert!(capacity >= 1);
        Self {
            buckets: vec![None; capacity],
            slots: SlotMap::with_key(),
        }
    }

    pub(crate) fn try_with_capacity(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TableError::InvalidState);
        }
        Ok(Self {
            buckets: alloc_buckets(capacity)?,
            slots: SlotMap::with_key(),
        })
    }

    #[inline]
    pub(crate) fn capacity(&self) -> usize {
        self.buckets.len()
    }

    #[inline]
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    /// Walks the chain addressed by `hash` and returns the first entry whose
    /// stored hash matches and whose key satisfies `eq`.
    pub(crate) fn find<F>(&self, hash: u64, mut eq: F) -> Result<Option<EntryId>>
    where
        F: FnMut(&K) -> bool,
    {
        let idx = bucket_index(hash, self.capacity())?;
        let mut cur = self.buckets[idx];
        while let Some(id) = cur {
            let e = &self.slots[id];
            if e.hash == hash && eq(&e.key) {
                return Ok(Some(id));
            }
            cur = e.next;
        }
        Ok(None)
    }

    #[inline]
    pub(crate) fn entry(&self, id: EntryId) -> &Entry<K, V> {
        &self.slots[id]
    }

    #[inline]
    pub(crate) fn entry_mut(&mut self, id: EntryId) -> &mut Entry<K, V> {
        &mut self.slots[id]
    }

    /// Links a new entry as the head of its chain. The caller has already
    /// checked that no equal key is present.
    pub(crate) fn push_front(&mut self, hash: u64, key: K, value: V) -> Result<EntryId> {
        let idx = bucket_index(hash, self.capacity())?;
        let next = self.buckets[idx];
        let id = self.slots.insert(Entry {
            key,
            value,
            hash,
            next,
        });
        self.buckets[idx] = Some(id);
        Ok(id)
    }

    /// Unlinks the matching entry from its chain and releases its slot.
    pub(crate) fn unlink<F>(&mut self, hash: u64, mut eq: F) -> Result<Option<Entry<K, V>>>
    where
        F: FnMut(&K) -> bool,
    {
        let idx = bucket_index(hash, self.capacity())?;
        let mut prev: Option<EntryId> = None;
        let mut cur = self.buckets[idx];
        while let Some(id) = cur {
            let e = &self.slots[id];
            if e.hash == hash && eq(&e.key) {
                let next = e.next;
                match prev {
                    None => self.buckets[idx] = next,
                    Some(p) => self.slots[p].next = next,
                }
                return Ok(self.slots.remove(id));
            }
            prev = Some(id);
            cur = e.next;
        }
        Ok(None)
    }

    /// Moves every entry into a fresh bucket array of `new_capacity` chains.
    ///
    /// The new array is allocated before any link is touched; on failure
    /// the current layout is left as it was.
    pub(crate) fn relocate(&mut self, new_capacity: usize) -> Result<()> {
        let modulus = NonZeroUsize::new(new_capacity).ok_or(TableError::InvalidState)?;
        let mut fresh = alloc_buckets(new_capacity)?;
        for head in self.buckets.iter_mut() {
            let mut cur = head.take();
            while let Some(id) = cur {
                let e = &mut self.slots[id];
                cur = e.next;
                let idx = index_in(e.hash, modulus);
                e.next = fresh[idx];
                fresh[idx] = Some(id);
            }
        }
        self.buckets = fresh;
        Ok(())
    }

    /// Detaches every entry, keeping the bucket array length. The returned
    /// arena owns the released entries.
    pub(crate) fn detach_all(&mut self) -> SlotMap<EntryId, Entry<K, V>> {
        self.buckets.fill(None);
        core::mem::replace(&mut self.slots, SlotMap::with_key())
    }

    /// Moves the whole structure out, leaving a single empty bucket behind.
    pub(crate) fn take(&mut self) -> Self {
        core::mem::replace(self, Self::with_capacity(1))
    }

    pub(crate) fn chain(&self, idx: usize) -> ChainIter<'_, K, V> {
        ChainIter {
            slots: &self.slots,
            cur: self.buckets.get(idx).copied().flatten(),
        }
    }

    pub(crate) fn entries(&self) -> slotmap::basic::Iter<'_, EntryId, Entry<K, V>> {
        self.slots.iter()
    }

    pub(crate) fn entries_mut(&mut self) -> slotmap::basic::IterMut<'_, EntryId, Entry<K, V>> {
        self.slots.iter_mut()
    }
}

impl<K: Clone, V: Clone> Clone for Chains<K, V> {
    fn clone(&self) -> Self {
        // Ids are preserved by the arena clone, so links stay valid.
        Self {
            buckets: self.buckets.clone(),
            slots: self.slots.clone(),
        }
    }

    fn clone_from(&mut self, source: &Self) {
        self.buckets.clone_from(&source.buckets);
        self.slots.clone_from(&source.slots);
    }
}

/// Iterator over the entries of one chain, head first.
pub(crate) struct ChainIter<'a, K, V> {
    slots: &'a SlotMap<EntryId, Entry<K, V>>,
    cur: Option<EntryId>,
}

impl<'a, K, V> Iterator for ChainIter<'a, K, V> {
    type Item = &'a Entry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        let id = self.cur?;
        let e = &self.slots[id];
        self.cur = e.next;
        Some(e)
    }
}

//! Construction parameters for [`HashTable`](crate::HashTable).

use crate::error::{Result, TableError};

/// Bucket count used when none is given.
pub const DEFAULT_INITIAL_CAPACITY: usize = 16;

/// Load factor above which an insert grows the table first.
pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.75;

/// Most buckets a table may need to hold a single entry.
pub const MAX_BUCKETS_PER_ENTRY: usize = 1 << 16;

/// Smallest accepted maximum load factor, `1 / MAX_BUCKETS_PER_ENTRY`.
pub const MIN_MAX_LOAD_FACTOR: f64 = 1.0 / MAX_BUCKETS_PER_ENTRY as f64;

/// Initial bucket count and growth threshold of a table.
///
/// ```
/// use chain_hashtable::{HashTable, TableConfig};
///
/// let cfg = TableConfig::new().with_initial_capacity(4).with_max_load_factor(0.5);
/// let table: HashTable<&str, i32> = HashTable::with_config(cfg).unwrap();
/// assert_eq!(table.capacity(), 4);
/// ```
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TableConfig {
    pub initial_capacity: usize,
    pub max_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            initial_capacity: DEFAULT_INITIAL_CAPACITY,
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_initial_capacity(mut self, capacity: usize) -> Self {
        self.initial_capacity = capacity;
        self
    }

    pub fn with_max_load_factor(mut self, load_factor: f64) -> Self {
        self.max_load_factor = load_factor;
        self
    }

    /// Rejects a zero capacity and any load factor outside
    /// `[MIN_MAX_LOAD_FACTOR, 1]`, NaN included. Below that floor a single
    /// entry would need more than `MAX_BUCKETS_PER_ENTRY` buckets.
    pub fn validate(&self) -> Result<()> {
        if self.initial_capacity < 1 {
            return Err(TableError::invalid_configuration(
                "initial_capacity must be at least 1",
            ));
        }
        if !(self.max_load_factor >= MIN_MAX_LOAD_FACTOR && self.max_load_factor <= 1.0) {
            return Err(TableError::invalid_configuration(format!(
                "max_load_factor must be in [{}, 1], got {}",
                MIN_MAX_LOAD_FACTOR, self.max_load_factor
            )));
        }
        Ok(())
    }
}

//! Error type shared by every table operation.

use thiserror::Error;

/// Errors reported by [`HashTable`](crate::HashTable) operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// No entry with an equal key is stored.
    #[error("key not found")]
    KeyNotFound,

    /// Construction parameters were rejected.
    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        /// Which parameter was rejected and why
        message: String,
    },

    /// The bucket array has no slots, so no index can be computed.
    #[error("table has no buckets")]
    InvalidState,

    /// Growing to `requested` buckets overflowed or could not be allocated.
    #[error("cannot grow bucket array to {requested} buckets")]
    CapacityOverflow {
        /// Bucket count that was requested, saturated at `usize::MAX`
        requested: usize,
    },
}

impl TableError {
    pub(crate) fn invalid_configuration<S: Into<String>>(message: S) -> Self {
        Self::InvalidConfiguration {
            message: message.into(),
        }
    }
}

pub type Result<T> = core::result::Result<T, TableError>;

//! Error type shared by every table in the crate.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TableError {
    /// The key (or one half of a key pair) is not present.
    #[error("key not found: {key:?}")]
    NotFound { key: String },
    /// Growth was required but the capacity sequence has no larger size.
    #[error("capacity sequence exhausted at capacity {capacity}")]
    CapacityExhausted { capacity: usize },
    /// A probe for insertion cycled through every slot.
    #[error("table of capacity {capacity} is full")]
    Full { capacity: usize },
    /// A capacity sequence was empty, held a zero or was not ascending.
    #[error("invalid capacity sequence: {0}")]
    InvalidSizes(&'static str),
    /// The max load factor was outside the open interval (0, 1).
    #[error("max load factor must be in (0, 1), got {0}")]
    InvalidLoadFactor(f64),
}

impl TableError {
    /// Builds a `NotFound` from any byte-addressable key.
    pub(crate) fn not_found<Q>(key: &Q) -> Self
    where
        Q: ?Sized + AsRef<[u8]>,
    {
        TableError::NotFound {
            key: String::from_utf8_lossy(key.as_ref()).into_owned(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, TableError::NotFound { .. })
    }
}

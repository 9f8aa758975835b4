//! double-key-table: a two-level open-addressing hash table keyed by
//! `(primary, secondary)` key pairs.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a composite-key map whose every level is a flat, linearly probed
//!   slot array, with deletion that needs no tombstones.
//! - Layers:
//!   - LinearProbeTable<K, V, S>: single-key structural map. Owns the probe
//!     loop, cluster-preserving removal and growth through a capacity
//!     sequence. Used directly as the secondary level (`SecondaryTable`).
//!   - PrimaryTable<K1, K2, V, S>: a LinearProbeTable whose values are owned
//!     SecondaryTables; adds the child-oriented operations.
//!   - DoubleKeyTable<K1, K2, V, S>: public facade. Keeps the total entry
//!     counter and the lifetime rule tying each secondary table to its
//!     primary slot.
//!
//! Constraints
//! - Single-threaded: `!Send`/`!Sync` (capacity sequences are shared through
//!   `Rc`). Callers needing sharing wrap the table themselves.
//! - Every mutation takes `&mut self`, so user code run while probing (`Eq`,
//!   `AsRef<[u8]>`) cannot reach a table mid-mutation.
//! - Keys are hashed over their bytes (`AsRef<[u8]>`); the hash is a function
//!   of the key and the table's current capacity only.
//! - Occupied/capacity never exceeds the max load factor (default 0.5) at
//!   either level. Growth runs before an insert would break the bound.
//! - Occupancy is a maintained counter; nothing rescans the slot array to
//!   count entries.
//!
//! Deletion
//! - Removing a slot clears it and then clear-and-reinserts every entry of
//!   the contiguous run that follows, up to the first empty slot. At the
//!   primary level the reinserted entries carry their owned tables with them.
//! - A secondary table is dropped, and its primary slot released, when its
//!   last entry is deleted.
//!
//! Failure model
//! - `NotFound` on read/delete of an absent key; state is unchanged.
//! - `CapacityExhausted` when growth is required past the last configured
//!   size. The insert is refused and the table stays valid at its current
//!   size; overwrites, reads and deletes keep working.
//!
//! Growth
//! - Each level grows inside its own insert: a LinearProbeTable decides when
//!   to move to a larger size. The facade never makes a growth decision; it
//!   only sees the `CapacityExhausted` a level reports.

mod double_key_table;
mod error;
pub mod hashing;
pub mod linear_probe;
#[cfg(test)]
mod linear_probe_proptest;
mod primary;
mod sizes;

// Public surface
pub use double_key_table::{DoubleKeyTable, Iter};
pub use error::TableError;
pub use hashing::{BuildHasherSlots, RollingHash, SlotHasher};
pub use linear_probe::{LinearProbeTable, SecondaryTable};
pub use primary::PrimaryTable;
pub use sizes::{CapacitySequence, TableConfig, DEFAULT_MAX_LOAD_FACTOR, DEFAULT_SIZES};

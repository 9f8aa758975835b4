//! PrimaryTable: the top level of a `DoubleKeyTable`.
//!
//! Each occupied slot holds a primary key and the `SecondaryTable` it owns.
//! Probing, growth and cluster-preserving removal are the linear-probe
//! discipline of `LinearProbeTable`; reinsertion and growth move each owned
//! sub-table whole, they never rebuild it.

use crate::error::TableError;
use crate::hashing::{RollingHash, SlotHasher};
use crate::linear_probe::{self, LinearProbeTable, SecondaryTable};
use crate::sizes::CapacitySequence;
use core::borrow::Borrow;
use log::debug;

pub struct PrimaryTable<K1, K2, V, S = RollingHash> {
    slots: LinearProbeTable<K1, SecondaryTable<K2, V, S>, S>,
}

/// Iterator over `(primary key, owned secondary table)` in primary-slot order.
pub type Iter<'a, K1, K2, V, S> = linear_probe::Iter<'a, K1, SecondaryTable<K2, V, S>>;

impl<K1, K2, V, S> PrimaryTable<K1, K2, V, S>
where
    K1: Eq + AsRef<[u8]>,
    K2: Eq + AsRef<[u8]>,
    S: SlotHasher,
{
    pub(crate) fn from_parts(sizes: CapacitySequence, max_load_factor: f64, hasher: S) -> Self {
        Self {
            slots: LinearProbeTable::from_parts(sizes, max_load_factor, hasher),
        }
    }

    /// Slot index of `k1`; see [`LinearProbeTable::probe`].
    pub fn probe<Q>(&self, k1: &Q, for_insert: bool) -> Result<usize, TableError>
    where
        K1: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.slots.probe(k1, for_insert)
    }

    pub fn contains_key<Q>(&self, k1: &Q) -> bool
    where
        K1: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.slots.contains_key(k1)
    }

    pub fn find_child<Q>(&self, k1: &Q) -> Option<&SecondaryTable<K2, V, S>>
    where
        K1: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.slots.find(k1)
    }

    pub(crate) fn find_child_mut<Q>(&mut self, k1: &Q) -> Option<&mut SecondaryTable<K2, V, S>>
    where
        K1: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.slots.find_mut(k1)
    }

    /// The secondary table owned by `k1`, or `NotFound`.
    pub fn child<Q>(&self, k1: &Q) -> Result<&SecondaryTable<K2, V, S>, TableError>
    where
        K1: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.slots.get(k1)
    }

    /// Claim a slot for a new primary key. The child must be non-empty: an
    /// empty secondary table is never stored.
    pub(crate) fn insert_child(
        &mut self,
        k1: K1,
        child: SecondaryTable<K2, V, S>,
    ) -> Result<(), TableError> {
        debug_assert!(!child.is_empty());
        let before = self.slots.capacity();
        let replaced = self.slots.insert(k1, child)?;
        debug_assert!(replaced.is_none(), "primary key already owned a table");
        debug!(
            target: "double_key_table",
            "primary slot claimed: {} keys in {} slots (was {})",
            self.slots.len(),
            self.slots.capacity(),
            before
        );
        Ok(())
    }

    /// Release the slot of `k1`, dropping its secondary table. Following
    /// primary slots in the cluster are reinserted along with their tables.
    pub(crate) fn remove_child<Q>(&mut self, k1: &Q) -> Result<SecondaryTable<K2, V, S>, TableError>
    where
        K1: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        let (_, child) = self.slots.remove(k1)?;
        debug!(
            target: "double_key_table",
            "primary slot released: {} keys remain",
            self.slots.len()
        );
        Ok(child)
    }
}

impl<K1, K2, V, S> PrimaryTable<K1, K2, V, S> {
    /// Number of distinct primary keys.
    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.slots.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.slots.load_factor()
    }

    pub fn iter(&self) -> Iter<'_, K1, K2, V, S> {
        self.slots.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K1> + '_ {
        self.slots.keys()
    }

    /// Sum of all secondary lengths. O(capacity); the facade keeps this as a
    /// counter and only tests recompute it.
    pub fn entry_count(&self) -> usize {
        self.slots.values().map(|child| child.len()).sum()
    }
}

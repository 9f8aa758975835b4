//! LinearProbeTable: flat open-addressing map with linear probing.
//!
//! - Slots are an explicit `Empty | Occupied` enum; there are no tombstones.
//! - Deleting a key clears its slot and then clear-and-reinserts every entry
//!   of the contiguous run that follows, so every remaining key stays
//!   reachable from its home slot.
//! - Capacities come from a `CapacitySequence`. A new key that would push the
//!   occupied fraction past the max load factor first grows the table to the
//!   next size that fits; if none does, the insert fails with
//!   `CapacityExhausted` and the table is left as it was.

use crate::error::TableError;
use crate::hashing::{RollingHash, SlotHasher};
use crate::sizes::{validate_load_factor, CapacitySequence, DEFAULT_MAX_LOAD_FACTOR};
use core::borrow::Borrow;
use core::fmt;
use core::mem;
use log::{trace, warn};

#[derive(Debug)]
pub(crate) enum Slot<K, V> {
    Empty,
    Occupied { key: K, value: V },
}

impl<K, V> Slot<K, V> {
    fn is_empty(&self) -> bool {
        matches!(self, Slot::Empty)
    }

    fn take(&mut self) -> Option<(K, V)> {
        match mem::replace(self, Slot::Empty) {
            Slot::Occupied { key, value } => Some((key, value)),
            Slot::Empty => None,
        }
    }

    fn entry(&self) -> Option<(&K, &V)> {
        match self {
            Slot::Occupied { key, value } => Some((key, value)),
            Slot::Empty => None,
        }
    }

    fn entry_mut(&mut self) -> Option<(&K, &mut V)> {
        match self {
            Slot::Occupied { key, value } => Some((&*key, value)),
            Slot::Empty => None,
        }
    }
}

enum Scan {
    Found(usize),
    Vacant(usize),
    Full,
}

/// Structural state behind the public API.
struct Table<K, V, S> {
    slots: Box<[Slot<K, V>]>,
    len: usize,
    sizes: CapacitySequence,
    size_index: usize,
    max_load: f64,
    hasher: S,
}

fn empty_slots<K, V>(capacity: usize) -> Box<[Slot<K, V>]> {
    core::iter::repeat_with(|| Slot::Empty).take(capacity).collect()
}

impl<K, V, S> Table<K, V, S> {
    fn capacity(&self) -> usize {
        self.slots.len()
    }
}

impl<K, V, S> Table<K, V, S>
where
    K: Eq + AsRef<[u8]>,
    S: SlotHasher,
{
    fn home(&self, key: &[u8]) -> usize {
        self.hasher.slot(key, self.capacity()) % self.capacity()
    }

    fn scan<Q>(&self, key: &Q) -> Scan
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        let cap = self.capacity();
        let mut i = self.home(key.as_ref());
        for _ in 0..cap {
            match &self.slots[i] {
                Slot::Empty => return Scan::Vacant(i),
                Slot::Occupied { key: k, .. } if k.borrow() == key => return Scan::Found(i),
                Slot::Occupied { .. } => i = (i + 1) % cap,
            }
        }
        Scan::Full
    }

    fn find_index<Q>(&self, key: &Q) -> Option<usize>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        match self.scan(key) {
            Scan::Found(i) => Some(i),
            Scan::Vacant(_) | Scan::Full => None,
        }
    }

    fn needs_growth(&self) -> bool {
        (self.len + 1) as f64 > self.capacity() as f64 * self.max_load
    }

    /// Writes an entry into the first empty slot of its probe sequence.
    /// Keys are already known to be unique, so no `Eq` calls are made.
    fn place(&mut self, key: K, value: V) {
        debug_assert!(self.len < self.capacity());
        let cap = self.capacity();
        let mut i = self.home(key.as_ref());
        while !self.slots[i].is_empty() {
            i = (i + 1) % cap;
        }
        self.slots[i] = Slot::Occupied { key, value };
    }

    fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        let index = match self.scan(&key) {
            Scan::Found(i) => {
                let old = match &mut self.slots[i] {
                    Slot::Occupied { value: v, .. } => Some(mem::replace(v, value)),
                    Slot::Empty => None,
                };
                return Ok(old);
            }
            Scan::Vacant(i) if !self.needs_growth() => i,
            Scan::Vacant(_) | Scan::Full => {
                self.grow_to_fit(self.len + 1)?;
                match self.scan(&key) {
                    Scan::Vacant(i) => i,
                    Scan::Found(_) | Scan::Full => {
                        return Err(TableError::Full {
                            capacity: self.capacity(),
                        })
                    }
                }
            }
        };
        self.slots[index] = Slot::Occupied { key, value };
        self.len += 1;
        Ok(None)
    }

    fn remove<Q>(&mut self, key: &Q) -> Result<(K, V), TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        let index = self
            .find_index(key)
            .ok_or_else(|| TableError::not_found(key))?;
        let removed = self.slots[index]
            .take()
            .ok_or_else(|| TableError::not_found(key))?;
        self.len -= 1;
        self.reinsert_cluster(index);
        Ok(removed)
    }

    /// Clear-and-reinsert every entry in the run following `freed`, stopping
    /// at the first empty slot.
    fn reinsert_cluster(&mut self, freed: usize) {
        let cap = self.capacity();
        let mut i = (freed + 1) % cap;
        let mut moved = 0usize;
        while let Some((key, value)) = self.slots[i].take() {
            self.place(key, value);
            moved += 1;
            i = (i + 1) % cap;
        }
        if moved > 0 {
            trace!(target: "linear_probe", "reinserted {moved} entries after slot {freed}");
        }
    }

    fn grow_to_fit(&mut self, entries: usize) -> Result<(), TableError> {
        let Some(index) = self
            .sizes
            .fitting_index(self.size_index + 1, entries, self.max_load)
        else {
            warn!(
                target: "linear_probe",
                "capacity sequence exhausted: {} slots cannot hold {entries} entries",
                self.capacity()
            );
            return Err(TableError::CapacityExhausted {
                capacity: self.capacity(),
            });
        };
        self.rebuild(index);
        Ok(())
    }

    fn rebuild(&mut self, size_index: usize) {
        let capacity = self.sizes[size_index];
        let mut old = mem::replace(&mut self.slots, empty_slots(capacity));
        self.size_index = size_index;
        for slot in old.iter_mut() {
            if let Some((key, value)) = slot.take() {
                self.place(key, value);
            }
        }
        trace!(
            target: "linear_probe",
            "grew {} -> {capacity} slots, moved {} entries",
            old.len(),
            self.len
        );
    }
}

/// Single-key open-addressing map. Also serves as the secondary level of a
/// `DoubleKeyTable`.
///
/// Keys are hashed over their bytes (`K: AsRef<[u8]>`); lookups accept any
/// borrowed form `Q` with `K: Borrow<Q>`.
pub struct LinearProbeTable<K, V, S = RollingHash> {
    table: Table<K, V, S>,
}

/// The per-primary-key table owned by each primary slot.
pub type SecondaryTable<K, V, S = RollingHash> = LinearProbeTable<K, V, S>;

impl<K, V> LinearProbeTable<K, V>
where
    K: Eq + AsRef<[u8]>,
{
    pub fn new() -> Self {
        Self::with_sizes(CapacitySequence::default())
    }

    pub fn with_sizes(sizes: CapacitySequence) -> Self {
        Self::from_parts(sizes, DEFAULT_MAX_LOAD_FACTOR, RollingHash)
    }
}

impl<K, V> Default for LinearProbeTable<K, V>
where
    K: Eq + AsRef<[u8]>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> LinearProbeTable<K, V, S>
where
    K: Eq + AsRef<[u8]>,
    S: SlotHasher,
{
    pub fn with_options(
        sizes: CapacitySequence,
        max_load_factor: f64,
        hasher: S,
    ) -> Result<Self, TableError> {
        validate_load_factor(max_load_factor)?;
        Ok(Self::from_parts(sizes, max_load_factor, hasher))
    }

    /// Caller has validated `max_load_factor`.
    pub(crate) fn from_parts(sizes: CapacitySequence, max_load_factor: f64, hasher: S) -> Self {
        let slots = empty_slots(sizes[0]);
        Self {
            table: Table {
                slots,
                len: 0,
                sizes,
                size_index: 0,
                max_load: max_load_factor,
                hasher,
            },
        }
    }

    /// Slot index for `key`.
    ///
    /// With `for_insert == false` this is the slot holding `key`, or
    /// `NotFound`. With `for_insert == true` it is the slot holding `key` or
    /// the empty slot it would be written to, or `Full` if the probe cycled.
    pub fn probe<Q>(&self, key: &Q, for_insert: bool) -> Result<usize, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        match (self.table.scan(key), for_insert) {
            (Scan::Found(i), _) | (Scan::Vacant(i), true) => Ok(i),
            (Scan::Full, true) => Err(TableError::Full {
                capacity: self.table.capacity(),
            }),
            (Scan::Vacant(_) | Scan::Full, false) => Err(TableError::not_found(key)),
        }
    }

    pub fn find<Q>(&self, key: &Q) -> Option<&V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        let i = self.table.find_index(key)?;
        self.table.slots[i].entry().map(|(_, v)| v)
    }

    pub fn find_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        let i = self.table.find_index(key)?;
        self.table.slots[i].entry_mut().map(|(_, v)| v)
    }

    /// Like [`find`](Self::find) but reports a missing key as `NotFound`.
    pub fn get<Q>(&self, key: &Q) -> Result<&V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.find(key).ok_or_else(|| TableError::not_found(key))
    }

    pub fn get_mut<Q>(&mut self, key: &Q) -> Result<&mut V, TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.find_mut(key).ok_or_else(|| TableError::not_found(key))
    }

    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.table.find_index(key).is_some()
    }

    /// Insert or overwrite. Returns the previous value for an existing key.
    ///
    /// A new key grows the table first if it would exceed the max load
    /// factor; `CapacityExhausted` leaves the table unchanged.
    pub fn insert(&mut self, key: K, value: V) -> Result<Option<V>, TableError> {
        self.table.insert(key, value)
    }

    /// Remove `key`, returning the owned entry.
    pub fn remove<Q>(&mut self, key: &Q) -> Result<(K, V), TableError>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq + AsRef<[u8]>,
    {
        self.table.remove(key)
    }

    /// Move to the next capacity in the sequence.
    pub fn grow(&mut self) -> Result<(), TableError> {
        let next = self.table.size_index + 1;
        if next >= self.table.sizes.len() {
            return Err(TableError::CapacityExhausted {
                capacity: self.table.capacity(),
            });
        }
        self.table.rebuild(next);
        Ok(())
    }
}

impl<K, V, S> LinearProbeTable<K, V, S> {
    pub fn len(&self) -> usize {
        self.table.len
    }

    pub fn is_empty(&self) -> bool {
        self.table.len == 0
    }

    /// Number of slots, always a member of the capacity sequence.
    pub fn capacity(&self) -> usize {
        self.table.capacity()
    }

    pub fn load_factor(&self) -> f64 {
        self.table.len as f64 / self.table.capacity() as f64
    }

    pub fn max_load_factor(&self) -> f64 {
        self.table.max_load
    }

    /// Entries in slot order. The order is not stable across growth or
    /// removal.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            it: self.table.slots.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> IterMut<'_, K, V> {
        IterMut {
            it: self.table.slots.iter_mut(),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> + '_ {
        self.iter().map(|(k, _)| k)
    }

    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, v)| v)
    }
}

/// Iterator over entries of a `LinearProbeTable` in slot order.
pub struct Iter<'a, K, V> {
    it: core::slice::Iter<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = (&'a K, &'a V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.by_ref().find_map(Slot::entry)
    }
}

/// Mutable iterator over entries of a `LinearProbeTable` in slot order.
pub struct IterMut<'a, K, V> {
    it: core::slice::IterMut<'a, Slot<K, V>>,
}

impl<'a, K, V> Iterator for IterMut<'a, K, V> {
    type Item = (&'a K, &'a mut V);
    #[inline]
    fn next(&mut self) -> Option<Self::Item> {
        self.it.by_ref().find_map(Slot::entry_mut)
    }
}

impl<'a, K, V, S> IntoIterator for &'a LinearProbeTable<K, V, S> {
    type Item = (&'a K, &'a V);
    type IntoIter = Iter<'a, K, V>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K, V, S> fmt::Debug for LinearProbeTable<K, V, S>
where
    K: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.table.slots.iter().filter_map(Slot::entry))
            .finish()
    }
}

//! DoubleKeyTable: composite-key facade over `PrimaryTable` and the
//! `SecondaryTable`s it owns.

use crate::error::TableError;
use crate::hashing::{RollingHash, SlotHasher};
use crate::linear_probe::{self, LinearProbeTable};
use crate::primary::{self, PrimaryTable};
use crate::sizes::{CapacitySequence, TableConfig};
use core::borrow::Borrow;
use core::fmt;
use log::trace;

/// Two-level open-addressing hash table keyed by `(K1, K2)`.
///
/// The primary key selects a secondary table; the secondary key selects the
/// value inside it. A secondary table exists exactly while it holds at least
/// one entry.
///
/// Single owner, no internal locking: the type is `!Send` and `!Sync`.
pub struct DoubleKeyTable<K1, K2, V, S = RollingHash> {
    primary: PrimaryTable<K1, K2, V, S>,
    secondary_sizes: CapacitySequence,
    max_load: f64,
    hasher: S,
    len: usize,
}

impl<K1, K2, V> DoubleKeyTable<K1, K2, V>
where
    K1: Eq + AsRef<[u8]>,
    K2: Eq + AsRef<[u8]>,
{
    /// Table with the default capacity sequence at both levels.
    pub fn new() -> Self {
        Self::build(TableConfig::default(), RollingHash)
    }

    pub fn with_sizes(primary: &[usize], secondary: &[usize]) -> Result<Self, TableError> {
        let config = TableConfig::new()
            .primary_sizes(CapacitySequence::new(primary)?)
            .secondary_sizes(CapacitySequence::new(secondary)?);
        Self::with_config(config)
    }

    pub fn with_config(config: TableConfig) -> Result<Self, TableError> {
        Self::with_config_and_hasher(config, RollingHash)
    }
}

impl<K1, K2, V> Default for DoubleKeyTable<K1, K2, V>
where
    K1: Eq + AsRef<[u8]>,
    K2: Eq + AsRef<[u8]>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K1, K2, V, S> DoubleKeyTable<K1, K2, V, S>
where
    K1: Eq + AsRef<[u8]>,
    K2: Eq + AsRef<[u8]>,
    S: SlotHasher + Clone,
{
    pub fn with_config_and_hasher(config: TableConfig, hasher: S) -> Result<Self, TableError> {
        config.validate()?;
        Ok(Self::build(config, hasher))
    }

    fn build(config: TableConfig, hasher: S) -> Self {
        Self {
            primary: PrimaryTable::from_parts(
                config.primary_sizes,
                config.max_load_factor,
                hasher.clone(),
            ),
            secondary_sizes: config.secondary_sizes,
            max_load: config.max_load_factor,
            hasher,
            len: 0,
        }
    }

    /// True iff `get(k1, k2)` would succeed. Never creates a slot.
    pub fn contains<Q1, Q2>(&self, k1: &Q1, k2: &Q2) -> bool
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq + AsRef<[u8]>,
        Q2: ?Sized + Eq + AsRef<[u8]>,
    {
        self.primary
            .find_child(k1)
            .is_some_and(|child| child.contains_key(k2))
    }

    /// `NotFound` names whichever key is missing: `k1` if it has no table,
    /// otherwise `k2`.
    pub fn get<Q1, Q2>(&self, k1: &Q1, k2: &Q2) -> Result<&V, TableError>
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq + AsRef<[u8]>,
        Q2: ?Sized + Eq + AsRef<[u8]>,
    {
        self.primary.child(k1)?.get(k2)
    }

    pub fn get_mut<Q1, Q2>(&mut self, k1: &Q1, k2: &Q2) -> Result<&mut V, TableError>
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq + AsRef<[u8]>,
        Q2: ?Sized + Eq + AsRef<[u8]>,
    {
        self.primary
            .find_child_mut(k1)
            .ok_or_else(|| TableError::not_found(k1))?
            .get_mut(k2)
    }

    /// Insert or overwrite `(k1, k2)`, returning the previous value.
    ///
    /// A new `k1` gets a fresh secondary table holding this one entry; that
    /// insert is the only one that can grow the primary table. Growth is not
    /// a step taken here: each level grows inside its own insert, and this
    /// method only propagates the `CapacityExhausted` a level reports. On
    /// that error nothing is inserted.
    pub fn set(&mut self, k1: K1, k2: K2, value: V) -> Result<Option<V>, TableError> {
        if let Some(child) = self.primary.find_child_mut(&k1) {
            let old = child.insert(k2, value)?;
            if old.is_none() {
                self.len += 1;
            }
            return Ok(old);
        }

        let mut child = LinearProbeTable::from_parts(
            self.secondary_sizes.clone(),
            self.max_load,
            self.hasher.clone(),
        );
        child.insert(k2, value)?;
        self.primary.insert_child(k1, child)?;
        self.len += 1;
        Ok(None)
    }

    /// Remove `(k1, k2)` and return its value. The primary slot goes away
    /// with its last secondary entry.
    pub fn delete<Q1, Q2>(&mut self, k1: &Q1, k2: &Q2) -> Result<V, TableError>
    where
        K1: Borrow<Q1>,
        K2: Borrow<Q2>,
        Q1: ?Sized + Eq + AsRef<[u8]>,
        Q2: ?Sized + Eq + AsRef<[u8]>,
    {
        let child = self
            .primary
            .find_child_mut(k1)
            .ok_or_else(|| TableError::not_found(k1))?;
        let (_, value) = child.remove(k2)?;
        if child.is_empty() {
            self.primary.remove_child(k1)?;
            trace!(target: "double_key_table", "dropped empty secondary table");
        }
        self.len -= 1;
        Ok(value)
    }

    /// Secondary keys stored under `k1`, in secondary-slot order.
    pub fn keys_under<Q1>(&self, k1: &Q1) -> Result<impl Iterator<Item = &K2> + '_, TableError>
    where
        K1: Borrow<Q1>,
        Q1: ?Sized + Eq + AsRef<[u8]>,
    {
        Ok(self.primary.child(k1)?.keys())
    }

    /// Values stored under `k1`, in secondary-slot order.
    pub fn values_under<Q1>(&self, k1: &Q1) -> Result<impl Iterator<Item = &V> + '_, TableError>
    where
        K1: Borrow<Q1>,
        Q1: ?Sized + Eq + AsRef<[u8]>,
    {
        Ok(self.primary.child(k1)?.values())
    }
}

impl<K1, K2, V, S> DoubleKeyTable<K1, K2, V, S> {
    /// Number of `(k1, k2)` pairs. O(1).
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Capacity of the primary table.
    pub fn table_size(&self) -> usize {
        self.primary.capacity()
    }

    pub fn primary(&self) -> &PrimaryTable<K1, K2, V, S> {
        &self.primary
    }

    /// Every primary key, in primary-slot order.
    pub fn keys(&self) -> impl Iterator<Item = &K1> + '_ {
        self.primary.keys()
    }

    /// Every value: primary-slot order, then secondary-slot order.
    pub fn values(&self) -> impl Iterator<Item = &V> + '_ {
        self.iter().map(|(_, _, v)| v)
    }

    pub fn key_pairs(&self) -> impl Iterator<Item = (&K1, &K2)> + '_ {
        self.iter().map(|(k1, k2, _)| (k1, k2))
    }

    /// `(k1, k2, value)` in primary-slot order, then secondary-slot order.
    pub fn iter(&self) -> Iter<'_, K1, K2, V, S> {
        Iter {
            outer: self.primary.iter(),
            current: None,
        }
    }
}

/// Iterator over `(&K1, &K2, &V)` triples of a `DoubleKeyTable`.
pub struct Iter<'a, K1, K2, V, S> {
    outer: primary::Iter<'a, K1, K2, V, S>,
    current: Option<(&'a K1, linear_probe::Iter<'a, K2, V>)>,
}

impl<'a, K1, K2, V, S> Iterator for Iter<'a, K1, K2, V, S> {
    type Item = (&'a K1, &'a K2, &'a V);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some((k1, inner)) = &mut self.current {
                if let Some((k2, v)) = inner.next() {
                    return Some((*k1, k2, v));
                }
            }
            let (k1, child) = self.outer.next()?;
            self.current = Some((k1, child.iter()));
        }
    }
}

impl<'a, K1, K2, V, S> IntoIterator for &'a DoubleKeyTable<K1, K2, V, S> {
    type Item = (&'a K1, &'a K2, &'a V);
    type IntoIter = Iter<'a, K1, K2, V, S>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<K1, K2, V, S> fmt::Debug for DoubleKeyTable<K1, K2, V, S>
where
    K1: fmt::Debug,
    K2: fmt::Debug,
    V: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k1, k2, v)| ((k1, k2), v)))
            .finish()
    }
}

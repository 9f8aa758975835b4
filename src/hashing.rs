//! Home-slot hashing.
//!
//! A table never stores hashes: the home slot of a key is recomputed from the
//! key bytes and the table's *current* capacity on every probe, so the same
//! hasher value serves every table size it is cloned into.

use core::hash::BuildHasher;

/// Maps a key's byte sequence to a home slot in `0..capacity`.
///
/// Implementations must be deterministic for a given `(key, capacity)` pair
/// for the lifetime of the table that owns them. `capacity` is never zero.
pub trait SlotHasher {
    fn slot(&self, key: &[u8], capacity: usize) -> usize;
}

/// Polynomial rolling hash whose multiplier is itself rolled modulo
/// `capacity - 1`. Works well with the prime-like default capacities.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct RollingHash;

impl RollingHash {
    const SEED: u128 = 31415;
    const BASE: u128 = 31;
}

impl SlotHasher for RollingHash {
    #[inline]
    fn slot(&self, key: &[u8], capacity: usize) -> usize {
        if capacity <= 1 {
            return 0;
        }
        let m = capacity as u128;
        let mut value: u128 = 0;
        let mut a = Self::SEED;
        for &b in key {
            value = (b as u128 + a * value) % m;
            a = a * Self::BASE % (m - 1);
        }
        value as usize
    }
}

/// Adapts any [`BuildHasher`] into a [`SlotHasher`] by reducing the 64-bit
/// hash modulo the capacity.
#[derive(Clone, Debug, Default)]
pub struct BuildHasherSlots<S>(pub S);

impl<S: BuildHasher> SlotHasher for BuildHasherSlots<S> {
    #[inline]
    fn slot(&self, key: &[u8], capacity: usize) -> usize {
        (self.0.hash_one(key) % capacity as u64) as usize
    }
}

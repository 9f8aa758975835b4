//! Capacity sequences and table configuration.

use crate::error::TableError;
use std::ops::Deref;
use std::rc::Rc;

/// Ascending, prime-like capacities. Large enough for about a million entries
/// at the default load factor.
pub const DEFAULT_SIZES: &[usize] = &[
    5, 13, 29, 53, 97, 193, 389, 769, 1543, 3079, 6151, 12289, 24593, 49157, 98317, 196613,
    393241, 786433, 1572869,
];

pub const DEFAULT_MAX_LOAD_FACTOR: f64 = 0.5;

/// Validated, strictly ascending list of table capacities.
///
/// Cheap to clone: every secondary table of a `DoubleKeyTable` shares one
/// allocation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CapacitySequence(Rc<[usize]>);

impl CapacitySequence {
    pub fn new(sizes: &[usize]) -> Result<Self, TableError> {
        if sizes.is_empty() {
            return Err(TableError::InvalidSizes("sequence is empty"));
        }
        if sizes.contains(&0) {
            return Err(TableError::InvalidSizes("capacities must be positive"));
        }
        if sizes.windows(2).any(|w| w[0] >= w[1]) {
            return Err(TableError::InvalidSizes("capacities must be strictly ascending"));
        }
        Ok(Self(Rc::from(sizes)))
    }

    /// First index at or after `from` whose capacity holds `entries` without
    /// exceeding `max_load`.
    pub(crate) fn fitting_index(&self, from: usize, entries: usize, max_load: f64) -> Option<usize> {
        (from..self.0.len()).find(|&i| entries as f64 <= self.0[i] as f64 * max_load)
    }
}

impl Default for CapacitySequence {
    fn default() -> Self {
        Self(Rc::from(DEFAULT_SIZES))
    }
}

impl Deref for CapacitySequence {
    type Target = [usize];
    fn deref(&self) -> &[usize] {
        &self.0
    }
}

/// Construction parameters for a `DoubleKeyTable`.
#[derive(Clone, Debug)]
pub struct TableConfig {
    pub(crate) primary_sizes: CapacitySequence,
    pub(crate) secondary_sizes: CapacitySequence,
    pub(crate) max_load_factor: f64,
}

impl Default for TableConfig {
    fn default() -> Self {
        Self {
            primary_sizes: CapacitySequence::default(),
            secondary_sizes: CapacitySequence::default(),
            max_load_factor: DEFAULT_MAX_LOAD_FACTOR,
        }
    }
}

impl TableConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn primary_sizes(mut self, sizes: CapacitySequence) -> Self {
        self.primary_sizes = sizes;
        self
    }

    pub fn secondary_sizes(mut self, sizes: CapacitySequence) -> Self {
        self.secondary_sizes = sizes;
        self
    }

    pub fn max_load_factor(mut self, max_load_factor: f64) -> Self {
        self.max_load_factor = max_load_factor;
        self
    }

    pub(crate) fn validate(&self) -> Result<(), TableError> {
        validate_load_factor(self.max_load_factor)
    }
}

pub(crate) fn validate_load_factor(lf: f64) -> Result<(), TableError> {
    // Strictly below 1 so an empty slot always terminates a probe.
    if lf > 0.0 && lf < 1.0 {
        Ok(())
    } else {
        Err(TableError::InvalidLoadFactor(lf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_malformed_sequences() {
        assert!(matches!(CapacitySequence::new(&[]), Err(TableError::InvalidSizes(_))));
        assert!(matches!(CapacitySequence::new(&[0, 5]), Err(TableError::InvalidSizes(_))));
        assert!(matches!(CapacitySequence::new(&[5, 5]), Err(TableError::InvalidSizes(_))));
        assert!(matches!(CapacitySequence::new(&[13, 5]), Err(TableError::InvalidSizes(_))));
        assert_eq!(&*CapacitySequence::new(&[5, 13]).unwrap(), &[5, 13]);
    }

    #[test]
    fn default_sequence_is_ascending() {
        let s = CapacitySequence::default();
        assert_eq!(s.len(), DEFAULT_SIZES.len());
        assert!(CapacitySequence::new(&s).is_ok());
    }

    /// Invariant: the chosen index is the first whose capacity keeps the
    /// occupied fraction at or under the bound.
    #[test]
    fn fitting_index_skips_too_small_sizes() {
        let s = CapacitySequence::new(&[5, 6, 13, 29]).unwrap();
        assert_eq!(s.fitting_index(0, 2, 0.5), Some(0));
        assert_eq!(s.fitting_index(1, 4, 0.5), Some(2));
        assert_eq!(s.fitting_index(1, 15, 0.5), None);
    }

    #[test]
    fn load_factor_bounds() {
        assert!(TableConfig::new().validate().is_ok());
        for bad in [0.0, 1.0, -0.5, 1.5, f64::NAN] {
            let cfg = TableConfig::new().max_load_factor(bad);
            assert!(matches!(cfg.validate(), Err(TableError::InvalidLoadFactor(_))));
        }
    }
}

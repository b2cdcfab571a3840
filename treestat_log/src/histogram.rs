//! Dense branch factor histogram
//!
//! The domain is `0..=max` where `max` is the largest fanout of the benchmarked
//! tree. Every bucket is always present, including empty ones, so consumers can
//! index any value in the domain.

use serde::Serialize;

/// Default inclusive upper bound of the branch factor domain.
pub const DEFAULT_MAX_BRANCH_FACTOR: u32 = 56;

/// Errors produced by [`Histogram`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// Value falls outside `0..=max`.
    #[error("Value {value} outside histogram domain [0, {max}]")]
    OutOfDomain {
        /// The rejected value
        value: i64,
        /// Inclusive upper bound of the domain
        max: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
/// Occurrence counts for every value in `0..=max`.
pub struct Histogram {
    buckets: Vec<u64>,
}

impl Default for Histogram {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_BRANCH_FACTOR)
    }
}

impl Histogram {
    /// Create an empty histogram over `0..=max`.
    #[must_use]
    pub fn new(max: u32) -> Self {
        Self {
            buckets: vec![0; max as usize + 1],
        }
    }

    /// Inclusive upper bound of the domain.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn max(&self) -> u32 {
        (self.buckets.len() - 1) as u32
    }

    /// Check `value` against the domain without recording it.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfDomain`] if `value` is negative or above
    /// [`Histogram::max`].
    pub fn check(&self, value: i64) -> Result<usize, Error> {
        usize::try_from(value)
            .ok()
            .filter(|idx| *idx < self.buckets.len())
            .ok_or(Error::OutOfDomain {
                value,
                max: self.max(),
            })
    }

    /// Count one occurrence of `value`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfDomain`] if `value` is outside the domain, in
    /// which case no bucket changes.
    pub fn record(&mut self, value: i64) -> Result<(), Error> {
        let idx = self.check(value)?;
        self.buckets[idx] += 1;
        Ok(())
    }

    /// Count for `value`, zero for values outside the domain.
    #[must_use]
    pub fn get(&self, value: usize) -> u64 {
        self.buckets.get(value).copied().unwrap_or(0)
    }

    /// Sum of all buckets.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.buckets.iter().sum()
    }

    /// Iterate `(value, count)` over the whole domain, empty buckets included.
    pub fn iter(&self) -> impl Iterator<Item = (usize, u64)> + '_ {
        self.buckets.iter().copied().enumerate()
    }
}

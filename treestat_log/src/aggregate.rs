//! Running aggregates
//!
//! A [`Running`] aggregate summarises an unbounded stream of integer samples
//! in constant space. Beyond count, sum, min and max it remembers the first,
//! second and most recent sample because the report needs them in order:
//! initial and final memory, tree size and solitary branch size.
//!
//! The min and max start at sentinels that no `i64` sample can beat, so the
//! first observation always replaces both. An aggregate with no observations
//! has no [`Summary`].

use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Incrementally updated summary of one metric.
pub struct Running {
    count: u64,
    // Wide enough that no stream of i64 samples this tool will ever see
    // overflows it.
    sum: i128,
    min: i64,
    max: i64,
    first: Option<i64>,
    second: Option<i64>,
    last: Option<i64>,
}

impl Default for Running {
    fn default() -> Self {
        Self::new()
    }
}

impl Running {
    /// Create an aggregate with no observations.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            count: 0,
            sum: 0,
            min: i64::MAX,
            max: i64::MIN,
            first: None,
            second: None,
            last: None,
        }
    }

    /// Fold one sample into the aggregate.
    pub fn observe(&mut self, value: i64) {
        match self.count {
            0 => self.first = Some(value),
            1 => self.second = Some(value),
            _ => {}
        }
        self.count += 1;
        self.sum += i128::from(value);
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        self.last = Some(value);
    }

    /// Number of samples observed.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    /// Sum of all samples observed.
    #[must_use]
    pub fn sum(&self) -> i128 {
        self.sum
    }

    /// The first sample, if any.
    #[must_use]
    pub fn first(&self) -> Option<i64> {
        self.first
    }

    /// The second sample, if any.
    #[must_use]
    pub fn second(&self) -> Option<i64> {
        self.second
    }

    /// The most recent sample, if any.
    #[must_use]
    pub fn last(&self) -> Option<i64> {
        self.last
    }

    /// Arithmetic mean of the samples, `None` when there are none.
    #[must_use]
    pub fn average(&self) -> Option<f64> {
        (self.count > 0).then(|| self.sum as f64 / self.count as f64)
    }

    /// Mean of the samples where an empty aggregate averages to zero.
    #[must_use]
    pub fn average_or_zero(&self) -> f64 {
        self.sum as f64 / self.count.max(1) as f64
    }

    /// Finalized statistics, `None` when nothing was observed.
    #[must_use]
    pub fn summary(&self) -> Option<Summary> {
        let (Some(first), Some(last), Some(average)) = (self.first, self.last, self.average())
        else {
            return None;
        };
        Some(Summary {
            count: self.count,
            min: self.min,
            max: self.max,
            average,
            first,
            last,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
/// Finalized statistics of a non-empty [`Running`] aggregate.
pub struct Summary {
    /// Number of samples
    pub count: u64,
    /// Smallest sample
    pub min: i64,
    /// Largest sample
    pub max: i64,
    /// Arithmetic mean
    pub average: f64,
    /// First sample in stream order
    pub first: i64,
    /// Last sample in stream order
    pub last: i64,
}

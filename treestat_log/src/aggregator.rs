//! Streaming statistics over classified events
//!
//! [`StatisticsAggregator`] owns one running aggregate per metric tag and is
//! driven by exactly one ordered sequence of [`Event`]s, the lines of a single
//! benchmark run. Order matters: initial and final memory, tree size and
//! solitary branch size are positional.
//!
//! The aggregator has two states. It accepts events while accumulating and
//! becomes a [`Report`] on [`StatisticsAggregator::finalize`]. Finalizing
//! consumes the aggregator, so the running sentinels can never leak into a
//! second logical run.

use std::collections::BTreeMap;

use tracing::debug;

use crate::aggregate::Running;
use crate::histogram::{self, DEFAULT_MAX_BRANCH_FACTOR, Histogram};
use crate::line::{Event, Operation};
use crate::report::Report;

/// Errors produced by [`StatisticsAggregator`]
#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// A BRANCH value fell outside the histogram domain. The event was not
    /// applied.
    #[error("Branch factor {value} outside of [0, {max}]")]
    OutOfDomainBranchValue {
        /// The rejected branch factor
        value: i64,
        /// Inclusive upper bound of the branch factor domain
        max: u32,
    },
}

impl From<histogram::Error> for Error {
    fn from(err: histogram::Error) -> Self {
        match err {
            histogram::Error::OutOfDomain { value, max } => {
                Error::OutOfDomainBranchValue { value, max }
            }
        }
    }
}

#[derive(Debug, Clone)]
/// Per-run accumulation of every metric found in a benchmark log.
pub struct StatisticsAggregator {
    memory: Running,
    splits: u64,
    shrinks: u64,
    height: Running,
    size: Running,
    polygon_size: Running,
    branch: Running,
    branch_search: Running,
    histogram: Histogram,
    average_times: BTreeMap<Operation, f64>,
}

impl Default for StatisticsAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl StatisticsAggregator {
    /// Create an aggregator whose branch factor domain is `[0, 56]`.
    #[must_use]
    pub fn new() -> Self {
        Self::with_max_branch_factor(DEFAULT_MAX_BRANCH_FACTOR)
    }

    /// Create an aggregator whose branch factor domain is `[0, max]`.
    #[must_use]
    pub fn with_max_branch_factor(max: u32) -> Self {
        Self {
            memory: Running::new(),
            splits: 0,
            shrinks: 0,
            height: Running::new(),
            size: Running::new(),
            polygon_size: Running::new(),
            branch: Running::new(),
            branch_search: Running::new(),
            histogram: Histogram::new(max),
            average_times: BTreeMap::new(),
        }
    }

    /// Apply one event.
    ///
    /// # Errors
    ///
    /// Returns [`Error::OutOfDomainBranchValue`] for a branch factor outside
    /// the histogram domain. No state changes in that case and the
    /// aggregator remains usable.
    pub fn observe(&mut self, event: Event) -> Result<(), Error> {
        match event {
            Event::Mem(v) => self.memory.observe(v),
            Event::Split => self.splits += 1,
            Event::Shrink => self.shrinks += 1,
            Event::Height(v) => self.height.observe(v),
            Event::Size(v) => self.size.observe(v),
            Event::PolygonSize(v) => self.polygon_size.observe(v),
            Event::Branch(v) => {
                self.histogram.record(v)?;
                self.branch.observe(v);
            }
            Event::BranchSearch(v) => self.branch_search.observe(v),
            Event::AverageTime { operation, seconds } => {
                self.average_times.insert(operation, seconds);
            }
        }
        Ok(())
    }

    /// Finish the run and compute derived statistics.
    #[must_use]
    pub fn finalize(self) -> Report {
        debug!(
            memory = self.memory.count(),
            height = self.height.count(),
            size = self.size.count(),
            polygon_size = self.polygon_size.count(),
            branch = self.branch.count(),
            branch_search = self.branch_search.count(),
            "finalizing aggregator"
        );
        Report {
            branches_searched_average: self.branch_search.average_or_zero(),
            memory: self.memory.summary(),
            splits: self.splits,
            shrinks: self.shrinks,
            height: self.height.summary(),
            tree_size: self.size.first(),
            solitary_branch_size: self.size.second(),
            polygon_size: self.polygon_size.summary(),
            branch_factor: self.branch.summary(),
            histogram: self.histogram,
            average_times: self.average_times,
        }
    }
}

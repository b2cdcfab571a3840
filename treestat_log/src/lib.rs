//! Crate regarding treestat's benchmark 'log' files
//!
//! A benchmark run writes an ordered stream of tagged lines: memory snapshots,
//! tree heights, structural sizes, split and shrink events, branch factors and
//! per-query search counts. This crate classifies those lines and folds them,
//! in a single pass, into a [`report::Report`].

#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
#![deny(clippy::dbg_macro)]
#![deny(unused_extern_crates)]
#![deny(unused_allocation)]
#![deny(unused_assignments)]
#![deny(unused_comparisons)]
#![deny(unreachable_pub)]
#![deny(missing_docs)]
#![deny(missing_debug_implementations)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::multiple_crate_versions)]

pub mod aggregate;
pub mod aggregator;
pub mod histogram;
pub mod line;
pub mod report;

pub use aggregator::StatisticsAggregator;
pub use line::{Event, MetricTag, Operation, classify};
pub use report::Report;

//! The treestat benchmark log summarizer.
//!
//! This library supports the treestat binary found elsewhere in this project:
//! configuration, log format detection and the streaming read loop that feeds
//! a log file through [`treestat_log`]. One [`treestat_log::StatisticsAggregator`]
//! is built per log; logs never share state.

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
#![deny(missing_copy_implementations)]
#![deny(missing_debug_implementations)]
#![allow(clippy::multiple_crate_versions)]

pub mod analyze;
pub mod config;
pub mod format;

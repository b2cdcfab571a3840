//! Finalized summary of one benchmark run
//!
//! A [`Report`] is produced once by
//! [`StatisticsAggregator::finalize`](crate::StatisticsAggregator::finalize).
//! Its [`Display`](std::fmt::Display) implementation renders the human
//! readable report; JSON and friends go through `serde`.
//!
//! Metrics with no observations render as `no data`. The branches searched
//! average is the exception: an empty run reports `0`.

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::aggregate::Summary;
use crate::histogram::Histogram;
use crate::line::Operation;

const NO_DATA: &str = "no data";

#[derive(Debug, Clone, PartialEq, Serialize)]
/// Statistics for one benchmark run.
pub struct Report {
    /// Mean of all `BRANCH SEARCH` samples, zero when there were none
    pub branches_searched_average: f64,
    /// `MEM` statistics
    pub memory: Option<Summary>,
    /// Number of `SPLIT` lines
    pub splits: u64,
    /// Number of `SHRINK` lines
    pub shrinks: u64,
    /// `HEIGHT` statistics
    pub height: Option<Summary>,
    /// The first `SIZE` sample
    pub tree_size: Option<i64>,
    /// The second `SIZE` sample
    pub solitary_branch_size: Option<i64>,
    /// `PSIZE` statistics, absent for logs that carry no polygon sizes
    pub polygon_size: Option<Summary>,
    /// `BRANCH` statistics
    pub branch_factor: Option<Summary>,
    /// Occurrences of each branch factor
    pub histogram: Histogram,
    /// Last reported average time per operation, in seconds
    pub average_times: BTreeMap<Operation, f64>,
}

/// Renders `value` followed by `unit`, or `no data`.
struct Field<T>(Option<T>, &'static str);

impl<T: fmt::Display> fmt::Display for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => write!(f, "{value}{unit}", unit = self.1),
            None => f.write_str(NO_DATA),
        }
    }
}

/// Float rendering that always keeps a fractional part, `4.0` not `4`.
struct Float(f64);

impl fmt::Display for Float {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.0)
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let memory = self.memory.as_ref();
        writeln!(
            f,
            "Average branches searched = {}",
            Float(self.branches_searched_average)
        )?;
        writeln!(f, "Maximum memory usage = {}", Field(memory.map(|s| s.max), "b"))?;
        writeln!(f, "Minimum memory usage = {}", Field(memory.map(|s| s.min), "b"))?;
        writeln!(f, "Initial memory usage = {}", Field(memory.map(|s| s.first), "b"))?;
        writeln!(f, "Final memory usage = {}", Field(memory.map(|s| s.last), "b"))?;
        writeln!(f)?;

        writeln!(f, "Number of splits induced = {}", self.splits)?;
        writeln!(f, "Number of shrinks induced = {}", self.shrinks)?;
        writeln!(f)?;

        write_summary(f, "tree height", self.height.as_ref())?;
        writeln!(f)?;

        writeln!(f, "Tree size = {}", Field(self.tree_size, ""))?;
        writeln!(
            f,
            "Solitary branches size = {}",
            Field(self.solitary_branch_size, "")
        )?;
        writeln!(f)?;

        if let Some(polygon_size) = &self.polygon_size {
            write_summary(f, "polygon size", Some(polygon_size))?;
            writeln!(f)?;
        }

        write_summary(f, "branch factor", self.branch_factor.as_ref())?;
        write!(f, "Histogram = {{ ")?;
        for (idx, (bucket, count)) in self.histogram.iter().enumerate() {
            if idx > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{bucket}: {count}")?;
        }
        writeln!(f, " }}")?;

        if !self.average_times.is_empty() {
            writeln!(f)?;
            for operation in Operation::ALL {
                if let Some(seconds) = self.average_times.get(&operation) {
                    writeln!(
                        f,
                        "Average time to {} = {}s",
                        operation.label(),
                        Float(*seconds)
                    )?;
                }
            }
        }
        Ok(())
    }
}

fn write_summary(f: &mut fmt::Formatter<'_>, name: &str, summary: Option<&Summary>) -> fmt::Result {
    writeln!(f, "Maximum {name} = {}", Field(summary.map(|s| s.max), ""))?;
    writeln!(f, "Minimum {name} = {}", Field(summary.map(|s| s.min), ""))?;
    writeln!(
        f,
        "Average {name} = {}",
        Field(summary.map(|s| Float(s.average)), "")
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Event, StatisticsAggregator};

    fn report(events: &[Event]) -> Report {
        let mut aggregator = StatisticsAggregator::new();
        for event in events {
            aggregator.observe(*event).expect("in domain");
        }
        aggregator.finalize()
    }

    #[test]
    fn renders_full_report() {
        let text = report(&[
            Event::BranchSearch(3),
            Event::Mem(100),
            Event::Height(3),
            Event::Split,
            Event::Mem(200),
            Event::Height(5),
            Event::Size(40),
            Event::Size(2),
            Event::Branch(10),
            Event::Branch(10),
            Event::Branch(12),
        ])
        .to_string();

        let expected_head = "\
Average branches searched = 3.0
Maximum memory usage = 200b
Minimum memory usage = 100b
Initial memory usage = 100b
Final memory usage = 200b

Number of splits induced = 1
Number of shrinks induced = 0

Maximum tree height = 5
Minimum tree height = 3
Average tree height = 4.0

Tree size = 40
Solitary branches size = 2

Maximum branch factor = 12
Minimum branch factor = 10
Average branch factor = 10.666666666666666
Histogram = { 0: 0, 1: 0,";
        assert!(text.starts_with(expected_head), "{text}");
        assert!(text.contains(", 10: 2, 11: 0, 12: 1, 13: 0,"));
        assert!(text.ends_with(", 56: 0 }\n"), "{text}");
        assert!(!text.contains("polygon"));
        assert!(!text.contains("Average time"));
    }

    #[test]
    fn renders_no_data() {
        let text = report(&[]).to_string();
        assert!(text.starts_with("Average branches searched = 0.0\n"));
        assert!(text.contains("Maximum memory usage = no data\n"));
        assert!(text.contains("Final memory usage = no data\n"));
        assert!(text.contains("Number of splits induced = 0\n"));
        assert!(text.contains("Average tree height = no data\n"));
        assert!(text.contains("Tree size = no data\n"));
        assert!(text.contains("Solitary branches size = no data\n"));
        assert!(text.contains("Minimum branch factor = no data\n"));
    }

    #[test]
    fn renders_polygon_section_and_times() {
        let text = report(&[
            Event::PolygonSize(4),
            Event::PolygonSize(8),
            Event::AverageTime {
                operation: Operation::Delete,
                seconds: 0.25,
            },
            Event::AverageTime {
                operation: Operation::Insert,
                seconds: 1.0,
            },
        ])
        .to_string();
        assert!(text.contains(
            "Solitary branches size = no data\n\nMaximum polygon size = 8\nMinimum polygon size = 4\nAverage polygon size = 6.0\n\nMaximum branch factor"
        ));
        assert!(text.ends_with(" }\n\nAverage time to insert = 1.0s\nAverage time to delete = 0.25s\n"));
    }

    #[test]
    fn serializes_to_json() {
        let value = serde_json::to_value(report(&[Event::Mem(5), Event::Branch(1)]))
            .expect("serialize");
        assert_eq!(value["memory"]["first"], 5);
        assert_eq!(value["height"], serde_json::Value::Null);
        assert_eq!(value["histogram"][1], 1);
        assert_eq!(value["histogram"].as_array().map(Vec::len), Some(57));
    }

    #[test]
    fn serializes_average_times_by_operation() {
        let value = serde_json::to_value(report(&[
            Event::AverageTime {
                operation: Operation::RangeSearch,
                seconds: 0.5,
            },
            Event::AverageTime {
                operation: Operation::Insert,
                seconds: 2.0,
            },
        ]))
        .expect("serialize");
        assert_eq!(value["average_times"]["range_search"], 0.5);
        assert_eq!(value["average_times"]["insert"], 2.0);
        assert_eq!(value["average_times"].as_object().map(|m| m.len()), Some(2));
    }
}

//! Classification of a single benchmark log line
//!
//! Every line of a benchmark log either carries one tagged event or is noise.
//! [`classify`] is the only entry point: it is a pure function of the line
//! text and never fails on unrecognized input. A line that looks like it
//! belongs to a tag but whose payload does not parse is reported as
//! [`Error::MalformedLine`] so callers can warn and move on.
//!
//! Grammar, checked in this order:
//!
//! * `MEM <uint>`
//! * any line containing `SPLIT`
//! * any line containing `SHRINK`
//! * `HEIGHT <uint>`
//! * `SIZE <uint>`
//! * `PSIZE <uint>`
//! * `BRANCH SEARCH <uint>`
//! * `BRANCH <uint>`
//! * `Avg time to <operation>: <seconds>s`

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

/// Errors produced by [`classify`]
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The line starts with a known tag but fails strict parsing.
    #[error("Malformed {tag} line: {line:?}")]
    MalformedLine {
        /// The tag the line claimed to carry
        tag: MetricTag,
        /// The offending line, without its terminator
        line: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
/// The closed set of event categories found in a benchmark log.
pub enum MetricTag {
    /// Memory snapshot in bytes
    Mem,
    /// A node split
    Split,
    /// A node shrink
    Shrink,
    /// Tree height sample
    Height,
    /// Structural size sample
    Size,
    /// Polygon size sample
    PolygonSize,
    /// Branch factor of one node
    Branch,
    /// Branches examined by one query
    BranchSearch,
    /// Average time of a benchmark operation
    AverageTime,
}

impl MetricTag {
    /// The textual prefix that identifies this tag in a log line.
    #[must_use]
    pub fn prefix(self) -> &'static str {
        match self {
            MetricTag::Mem => "MEM",
            MetricTag::Split => "SPLIT",
            MetricTag::Shrink => "SHRINK",
            MetricTag::Height => "HEIGHT",
            MetricTag::Size => "SIZE",
            MetricTag::PolygonSize => "PSIZE",
            MetricTag::Branch => "BRANCH",
            MetricTag::BranchSearch => "BRANCH SEARCH",
            MetricTag::AverageTime => "Avg time to",
        }
    }
}

impl fmt::Display for MetricTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
/// Benchmark operations whose average time is reported by the harness.
pub enum Operation {
    /// Point insertion
    Insert,
    /// Point search
    Search,
    /// Range search
    RangeSearch,
    /// Deletion
    Delete,
}

impl Operation {
    /// All operations, in report order.
    pub const ALL: [Operation; 4] = [
        Operation::Insert,
        Operation::Search,
        Operation::RangeSearch,
        Operation::Delete,
    ];

    /// Human readable name, as printed by the harness.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Operation::Insert => "insert",
            Operation::Search => "search",
            Operation::RangeSearch => "range search",
            Operation::Delete => "delete",
        }
    }

    fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.label() == label)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
/// One classified log line.
pub enum Event {
    /// `MEM <bytes>`
    Mem(i64),
    /// A line containing `SPLIT`
    Split,
    /// A line containing `SHRINK`
    Shrink,
    /// `HEIGHT <n>`
    Height(i64),
    /// `SIZE <n>`
    Size(i64),
    /// `PSIZE <n>`
    PolygonSize(i64),
    /// `BRANCH <n>`
    Branch(i64),
    /// `BRANCH SEARCH <n>`
    BranchSearch(i64),
    /// `Avg time to <operation>: <seconds>s`
    AverageTime {
        /// The timed operation
        operation: Operation,
        /// Average duration in seconds
        seconds: f64,
    },
}

impl Event {
    /// The category of this event.
    #[must_use]
    pub fn tag(&self) -> MetricTag {
        match self {
            Event::Mem(_) => MetricTag::Mem,
            Event::Split => MetricTag::Split,
            Event::Shrink => MetricTag::Shrink,
            Event::Height(_) => MetricTag::Height,
            Event::Size(_) => MetricTag::Size,
            Event::PolygonSize(_) => MetricTag::PolygonSize,
            Event::Branch(_) => MetricTag::Branch,
            Event::BranchSearch(_) => MetricTag::BranchSearch,
            Event::AverageTime { .. } => MetricTag::AverageTime,
        }
    }

    /// The integer payload, if this event carries one.
    #[must_use]
    pub fn value(&self) -> Option<i64> {
        match *self {
            Event::Mem(v)
            | Event::Height(v)
            | Event::Size(v)
            | Event::PolygonSize(v)
            | Event::Branch(v)
            | Event::BranchSearch(v) => Some(v),
            Event::Split | Event::Shrink | Event::AverageTime { .. } => None,
        }
    }
}

// BRANCH SEARCH must precede BRANCH: its prefix extends BRANCH's.
const NUMERIC_TAGS: [(MetricTag, fn(i64) -> Event); 6] = [
    (MetricTag::Mem, Event::Mem),
    (MetricTag::Height, Event::Height),
    (MetricTag::Size, Event::Size),
    (MetricTag::PolygonSize, Event::PolygonSize),
    (MetricTag::BranchSearch, Event::BranchSearch),
    (MetricTag::Branch, Event::Branch),
];

static AVERAGE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^Avg time to (insert|search|range search|delete): (\S+?)s?$")
        .expect("Invalid regex pattern provided")
});

/// Classify one log line.
///
/// Returns `Ok(None)` for lines that carry no event. Trailing line terminators
/// are ignored.
///
/// # Errors
///
/// Returns [`Error::MalformedLine`] if the line starts with a known tag but
/// its payload is missing, non-numeric or does not fit in an `i64`.
pub fn classify(line: &str) -> Result<Option<Event>, Error> {
    let line = line.trim_end_matches(['\n', '\r']);

    // MEM is checked ahead of SPLIT/SHRINK. None of the numeric grammars can
    // contain either word, so the remaining numeric tags are checked together.
    if let Some(event) = strict_numeric(line)? {
        return Ok(Some(event));
    }
    if line.contains(MetricTag::Split.prefix()) {
        return Ok(Some(Event::Split));
    }
    if line.contains(MetricTag::Shrink.prefix()) {
        return Ok(Some(Event::Shrink));
    }
    if let Some(event) = average_time(line)? {
        return Ok(Some(event));
    }

    match claimed_tag(line) {
        Some(tag) => Err(Error::MalformedLine {
            tag,
            line: line.to_string(),
        }),
        None => Ok(None),
    }
}

fn strict_numeric(line: &str) -> Result<Option<Event>, Error> {
    for (tag, ctor) in NUMERIC_TAGS {
        let Some(payload) = line
            .strip_prefix(tag.prefix())
            .and_then(|rest| rest.strip_prefix(' '))
        else {
            continue;
        };
        if payload.is_empty() || !payload.bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        return payload
            .parse::<i64>()
            .map(|value| Some(ctor(value)))
            .map_err(|_| Error::MalformedLine {
                tag,
                line: line.to_string(),
            });
    }
    Ok(None)
}

fn average_time(line: &str) -> Result<Option<Event>, Error> {
    let Some(caps) = AVERAGE_TIME.captures(line) else {
        return Ok(None);
    };
    let operation = Operation::from_label(&caps[1]);
    let seconds = caps[2].parse::<f64>().ok();
    match (operation, seconds) {
        (Some(operation), Some(seconds)) => Ok(Some(Event::AverageTime { operation, seconds })),
        _ => Err(Error::MalformedLine {
            tag: MetricTag::AverageTime,
            line: line.to_string(),
        }),
    }
}

/// The tag a line appears to carry: a known prefix followed by whitespace or
/// the end of the line.
fn claimed_tag(line: &str) -> Option<MetricTag> {
    NUMERIC_TAGS
        .iter()
        .map(|(tag, _)| *tag)
        .chain(std::iter::once(MetricTag::AverageTime))
        .find(|tag| {
            line.strip_prefix(tag.prefix())
                .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
        })
}

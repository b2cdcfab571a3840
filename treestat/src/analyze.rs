//! Streaming analysis of a single benchmark log
//!
//! Lines are read one at a time and never buffered as a whole. Each line is
//! classified and, if it carries an event, applied to the run's
//! [`StatisticsAggregator`]. Malformed lines, including lines that are not
//! valid UTF-8, are logged and skipped. A branch factor outside the histogram
//! is handled per [`BranchPolicy`].

use std::path::Path;

use async_compression::tokio::bufread::ZstdDecoder;
use tokio::{
    fs,
    io::{AsyncBufRead, AsyncBufReadExt, BufReader},
};
use tokio_util::either;
use tracing::{debug, info, warn};
use treestat_log::{Report, StatisticsAggregator, aggregator, classify};

use crate::config::{BranchPolicy, Config};
use crate::format::{self, LogFormat};

/// Errors produced while analysing a log
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// I/O operation failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
    /// The log format could not be determined.
    #[error("Failed to detect log format: {0}")]
    Detection(#[from] format::DetectionError),
    /// A branch factor fell outside the histogram and the policy is to fail.
    #[error("Line {line}: {source}")]
    Branch {
        /// 1-based line number of the offending line
        line: u64,
        /// The aggregator's rejection
        #[source]
        source: aggregator::Error,
    },
}

/// The outcome of analysing one log.
#[derive(Debug)]
pub struct Analysis {
    /// Finalized statistics
    pub report: Report,
    /// Lines read, including those without events
    pub lines_read: u64,
    /// Lines that carried an event
    pub events: u64,
    /// Lines that claimed a tag but failed to parse, or were not UTF-8
    pub malformed_lines: u64,
    /// Branch factors dropped under [`BranchPolicy::Skip`]
    pub skipped_branch_values: u64,
}

/// Analyse a log read from `reader`.
///
/// # Errors
///
/// Returns an error if reading fails or a branch factor is out of domain
/// under [`BranchPolicy::Fail`].
pub async fn analyze_reader<R>(mut reader: R, config: &Config) -> Result<Analysis, Error>
where
    R: AsyncBufRead + Unpin,
{
    let mut aggregator = StatisticsAggregator::with_max_branch_factor(config.max_branch_factor);
    let mut buf = Vec::new();

    let mut lines_read = 0u64;
    let mut events = 0u64;
    let mut malformed_lines = 0u64;
    let mut skipped_branch_values = 0u64;

    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf).await? == 0 {
            break;
        }
        lines_read += 1;

        let Ok(line) = std::str::from_utf8(&buf) else {
            warn!(
                "Skipping line {lines_read}: not valid UTF-8: {:?}",
                String::from_utf8_lossy(&buf)
            );
            malformed_lines += 1;
            continue;
        };

        let event = match classify(line) {
            Ok(Some(event)) => event,
            Ok(None) => continue,
            Err(err) => {
                warn!("Skipping line {lines_read}: {err}");
                malformed_lines += 1;
                continue;
            }
        };
        events += 1;

        if let Err(source) = aggregator.observe(event) {
            match config.branch_policy {
                BranchPolicy::Fail => {
                    return Err(Error::Branch {
                        line: lines_read,
                        source,
                    });
                }
                BranchPolicy::Skip => {
                    warn!("Dropping line {lines_read}: {source}");
                    skipped_branch_values += 1;
                }
            }
        }
    }

    info!(
        lines_read,
        events, malformed_lines, skipped_branch_values, "Finished reading log"
    );
    Ok(Analysis {
        report: aggregator.finalize(),
        lines_read,
        events,
        malformed_lines,
        skipped_branch_values,
    })
}

/// Analyse the log at `path`, decompressing it if needed.
///
/// # Errors
///
/// See [`analyze_reader`]. Also fails if the file cannot be opened.
pub async fn analyze_path(path: &Path, config: &Config) -> Result<Analysis, Error> {
    let format = format::detect_format(path)?;
    debug!("Reading {path} as {format:?}", path = path.display());

    let file = fs::File::open(path).await?;
    let reader = BufReader::new(file);
    let reader = match format {
        LogFormat::Plain => either::Either::Left(reader),
        LogFormat::Zstd => either::Either::Right(BufReader::new(ZstdDecoder::new(reader))),
    };
    analyze_reader(reader, config).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;
    use treestat_log::Operation;

    const RUN: &str = "\
Benchmark starting
MEM 100
HEIGHT 3
SPLIT x
MEM 200
HEIGHT 5
SIZE 1000
SIZE 12
SIZE 999
BRANCH 10
BRANCH 10
BRANCH 12
BRANCH SEARCH 4
BRANCH SEARCH 8
Avg time to insert: 0.5s
";

    #[tokio::test]
    async fn analyzes_a_run() {
        let analysis = analyze_reader(RUN.as_bytes(), &Config::default())
            .await
            .expect("analysis");

        assert_eq!(analysis.lines_read, 15);
        assert_eq!(analysis.events, 14);
        assert_eq!(analysis.malformed_lines, 0);

        let report = analysis.report;
        let memory = report.memory.expect("memory");
        assert_eq!((memory.first, memory.last, memory.max), (100, 200, 200));
        assert_eq!(report.splits, 1);
        assert!((report.height.expect("height").average - 4.0).abs() < f64::EPSILON);
        assert_eq!(report.tree_size, Some(1000));
        assert_eq!(report.solitary_branch_size, Some(12));
        assert_eq!(report.branch_factor.expect("branch").max, 12);
        assert_eq!(report.histogram.get(10), 2);
        assert_eq!(report.histogram.get(12), 1);
        assert_eq!(report.histogram.total(), 3);
        assert!((report.branches_searched_average - 6.0).abs() < f64::EPSILON);
        assert_eq!(report.average_times.get(&Operation::Insert), Some(&0.5));
    }

    #[tokio::test]
    async fn empty_log() {
        let analysis = analyze_reader(&b""[..], &Config::default())
            .await
            .expect("analysis");
        assert_eq!(analysis.lines_read, 0);
        assert_eq!(analysis.report.memory, None);
        assert_eq!(analysis.report.branches_searched_average, 0.0);
    }

    #[tokio::test]
    async fn malformed_lines_are_skipped() {
        let log = "MEM 10\nMEM ten\r\nHEIGHT\nMEM 30\r\n";
        let analysis = analyze_reader(log.as_bytes(), &Config::default())
            .await
            .expect("analysis");
        assert_eq!(analysis.malformed_lines, 2);
        assert_eq!(analysis.events, 2);
        let memory = analysis.report.memory.expect("memory");
        assert_eq!((memory.first, memory.last), (10, 30));
    }

    #[tokio::test]
    async fn invalid_utf8_line_is_skipped() {
        let log = b"MEM 100\n\xff\xfe garbage\nMEM 200\n";
        let analysis = analyze_reader(&log[..], &Config::default())
            .await
            .expect("analysis");
        assert_eq!(analysis.lines_read, 3);
        assert_eq!(analysis.malformed_lines, 1);
        assert_eq!(analysis.events, 2);
        let memory = analysis.report.memory.expect("memory");
        assert_eq!((memory.first, memory.last), (100, 200));
    }

    #[tokio::test]
    async fn final_line_without_terminator() {
        let analysis = analyze_reader(&b"MEM 1\r\nMEM 2"[..], &Config::default())
            .await
            .expect("analysis");
        assert_eq!(analysis.lines_read, 2);
        assert_eq!(analysis.report.memory.expect("memory").last, 2);
    }

    #[tokio::test]
    async fn out_of_domain_branch_fails_by_default() {
        let log = "BRANCH 3\nBRANCH 57\nBRANCH 4\n";
        let err = analyze_reader(log.as_bytes(), &Config::default())
            .await
            .expect_err("out of domain");
        match err {
            Error::Branch { line, source } => {
                assert_eq!(line, 2);
                assert_eq!(
                    source,
                    aggregator::Error::OutOfDomainBranchValue { value: 57, max: 56 }
                );
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn out_of_domain_branch_can_be_skipped() {
        let config = Config {
            branch_policy: BranchPolicy::Skip,
            ..Config::default()
        };
        let log = "BRANCH 3\nBRANCH 57\nBRANCH 4\n";
        let analysis = analyze_reader(log.as_bytes(), &config)
            .await
            .expect("analysis");
        assert_eq!(analysis.skipped_branch_values, 1);
        assert_eq!(analysis.report.histogram.total(), 2);
        assert_eq!(analysis.report.branch_factor.expect("branch").max, 4);
    }

    #[tokio::test]
    async fn wider_branch_domain() {
        let config = Config {
            max_branch_factor: 250,
            ..Config::default()
        };
        let analysis = analyze_reader(&b"BRANCH 200\n"[..], &config)
            .await
            .expect("analysis");
        assert_eq!(analysis.report.histogram.get(200), 1);
        assert_eq!(analysis.report.histogram.iter().count(), 251);
    }

    #[tokio::test]
    async fn analyzes_plain_file() {
        let mut file = NamedTempFile::new().expect("create temp file");
        file.write_all(RUN.as_bytes()).expect("write");
        file.flush().expect("flush");

        let analysis = analyze_path(file.path(), &Config::default())
            .await
            .expect("analysis");
        assert_eq!(analysis.events, 14);
    }

    #[tokio::test]
    async fn analyzes_zstd_file() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let path = dir.path().join("run.log.zst");
        let compressed = zstd::encode_all(RUN.as_bytes(), 3).expect("compress");
        std::fs::write(&path, compressed).expect("write file");

        let analysis = analyze_path(&path, &Config::default())
            .await
            .expect("analysis");
        assert_eq!(analysis.events, 14);
        assert_eq!(analysis.report.tree_size, Some(1000));
    }

    #[tokio::test]
    async fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().expect("create temp dir");
        let result = analyze_path(&dir.path().join("absent.log"), &Config::default()).await;
        assert!(matches!(result, Err(Error::Detection(_))));
    }
}

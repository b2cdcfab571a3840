//! Format detection for benchmark logs
//!
//! Logs are plain text, optionally zstd compressed. Detection looks at the
//! zstd frame magic first and falls back to the file extension.

use std::fs::File;
use std::io::Read;
use std::path::Path;

const ZSTD_MAGIC: [u8; 4] = [0x28, 0xB5, 0x2F, 0xFD];

/// The on-disk encoding of a benchmark log
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    /// Line-delimited text
    Plain,
    /// Line-delimited text inside a zstd stream
    Zstd,
}

/// Errors during format detection
#[derive(thiserror::Error, Debug)]
pub enum DetectionError {
    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Detects the format of a benchmark log.
///
/// # Errors
///
/// Returns an error if the file cannot be opened.
pub fn detect_format<P: AsRef<Path>>(path: P) -> Result<LogFormat, DetectionError> {
    let path = path.as_ref();

    let mut file = File::open(path)?;
    let mut magic = [0u8; 4];
    if file.read_exact(&mut magic).is_ok() && magic == ZSTD_MAGIC {
        return Ok(LogFormat::Zstd);
    }

    if let Some(ext) = path.extension() {
        if ext == "zst" || ext == "zstd" {
            return Ok(LogFormat::Zstd);
        }
    }

    Ok(LogFormat::Plain)
}

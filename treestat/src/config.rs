//! This module controls configuration parsing from the end user, providing a
//! convenience mechanism for the rest of the program.
//!
//! Configuration is YAML. It comes from, in order of preference, an explicit
//! path, the `TREESTAT_CONFIG` environment variable holding the YAML itself,
//! or the defaults. Command line flags override whatever was loaded.

use std::{
    env, fmt, fs, io,
    path::{Path, PathBuf},
    str,
};

use serde::Deserialize;
use tracing::debug;
use treestat_log::histogram::DEFAULT_MAX_BRANCH_FACTOR;

/// Environment variable consulted when no config path is given.
pub const CONFIG_ENV_VAR: &str = "TREESTAT_CONFIG";

/// Largest accepted `max_branch_factor`.
pub const MAX_BRANCH_FACTOR_LIMIT: u32 = 4096;

/// Errors produced by [`Config`]
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// Error for a serde [`serde_yaml`].
    #[error("Failed to deserialize yaml: {0}")]
    SerdeYaml(#[from] serde_yaml::Error),
    /// Error reading config file
    #[error("Failed to read config file {path:?}: {source}")]
    ReadFile {
        /// File path
        path: PathBuf,
        /// Underlying IO error
        #[source]
        source: Box<io::Error>,
    },
    /// The histogram bound is above [`MAX_BRANCH_FACTOR_LIMIT`].
    #[error("max_branch_factor {value} exceeds the limit of {limit}")]
    MaxBranchFactor {
        /// The rejected bound
        value: u32,
        /// Largest accepted bound
        limit: u32,
    },
}

fn default_max_branch_factor() -> u32 {
    DEFAULT_MAX_BRANCH_FACTOR
}

/// Main configuration struct for this program
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Inclusive upper bound of the branch factor histogram.
    #[serde(default = "default_max_branch_factor")]
    pub max_branch_factor: u32,
    /// What to do with a branch factor outside the histogram.
    #[serde(default)]
    pub branch_policy: BranchPolicy,
    /// How the report is written to stdout.
    #[serde(default)]
    pub output: Output,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_branch_factor: DEFAULT_MAX_BRANCH_FACTOR,
            branch_policy: BranchPolicy::default(),
            output: Output::default(),
        }
    }
}

impl Config {
    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the YAML is invalid, has unknown fields or fails
    /// [`Config::validate`].
    pub fn from_yaml(contents: &str) -> Result<Self, Error> {
        let config: Self = serde_yaml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check values that parse but cannot be used.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MaxBranchFactor`] if `max_branch_factor` is above
    /// [`MAX_BRANCH_FACTOR_LIMIT`].
    pub fn validate(self) -> Result<(), Error> {
        if self.max_branch_factor > MAX_BRANCH_FACTOR_LIMIT {
            return Err(Error::MaxBranchFactor {
                value: self.max_branch_factor,
                limit: MAX_BRANCH_FACTOR_LIMIT,
            });
        }
        Ok(())
    }

    /// Load configuration from `path`, else from [`CONFIG_ENV_VAR`], else
    /// use the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the YAML is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        if let Some(path) = path {
            debug!("Attempting to open configuration file at: {}", path.display());
            let contents = fs::read_to_string(path).map_err(|source| Error::ReadFile {
                path: path.to_path_buf(),
                source: Box::new(source),
            })?;
            Self::from_yaml(&contents)
        } else if let Ok(contents) = env::var(CONFIG_ENV_VAR) {
            debug!("Using config from env var '{CONFIG_ENV_VAR}'");
            Self::from_yaml(&contents)
        } else {
            debug!("No configuration given, using defaults");
            Ok(Self::default())
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Handling of branch factors outside the histogram domain.
pub enum BranchPolicy {
    /// Abort the run.
    #[default]
    Fail,
    /// Warn, drop the sample and continue.
    Skip,
}

impl fmt::Display for BranchPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BranchPolicy::Fail => write!(f, "fail"),
            BranchPolicy::Skip => write!(f, "skip"),
        }
    }
}

impl str::FromStr for BranchPolicy {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "fail" => Ok(BranchPolicy::Fail),
            "skip" => Ok(BranchPolicy::Skip),
            other => Err(format!("unknown branch policy '{other}', expected fail or skip")),
        }
    }
}

#[derive(Debug, Default, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
/// Report rendering.
pub enum Output {
    /// The human readable report
    #[default]
    Text,
    /// The report as a single JSON document
    Json,
}

impl fmt::Display for Output {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Output::Text => write!(f, "text"),
            Output::Json => write!(f, "json"),
        }
    }
}

impl str::FromStr for Output {
    type Err = String;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        match input {
            "text" => Ok(Output::Text),
            "json" => Ok(Output::Json),
            other => Err(format!("unknown output '{other}', expected text or json")),
        }
    }
}

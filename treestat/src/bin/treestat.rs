//! Summarise a spatial index benchmark log.

#![allow(clippy::print_stdout)]

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, util::SubscriberInitExt};
use treestat::{
    analyze,
    config::{self, BranchPolicy, Config, Output},
};

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
struct Args {
    /// path on disk to the configuration file
    #[clap(long)]
    config_path: Option<PathBuf>,

    /// inclusive upper bound of the branch factor histogram
    #[clap(long)]
    max_branch_factor: Option<u32>,

    /// what to do with an out of range branch factor: fail or skip
    #[clap(long)]
    branch_policy: Option<BranchPolicy>,

    /// report format: text or json
    #[clap(long)]
    output: Option<Output>,

    /// Path to the benchmark log, plain or zstd compressed
    log_path: PathBuf,
}

/// Errors that can occur while running treestat.
#[derive(thiserror::Error, Debug)]
enum Error {
    /// Invalid command line arguments provided.
    #[error("Invalid arguments specified")]
    InvalidArgs,
    /// Configuration could not be loaded.
    #[error(transparent)]
    Config(#[from] config::Error),
    /// The log could not be analysed.
    #[error(transparent)]
    Analyze(#[from] analyze::Error),
    /// The report could not be serialized.
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

fn get_config(args: &Args) -> Result<Config, Error> {
    let mut config = Config::load(args.config_path.as_deref())?;
    if let Some(max) = args.max_branch_factor {
        config.max_branch_factor = max;
    }
    if let Some(policy) = args.branch_policy {
        config.branch_policy = policy;
    }
    if let Some(output) = args.output {
        config.output = output;
    }
    config.validate()?;
    Ok(config)
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Error> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .finish()
        .init();

    let args = Args::parse();
    let config = get_config(&args)?;
    info!(
        max_branch_factor = config.max_branch_factor,
        branch_policy = %config.branch_policy,
        output = %config.output,
        "Starting treestat"
    );

    if !args.log_path.exists() {
        error!("Log file {} does not exist", args.log_path.display());
        return Err(Error::InvalidArgs);
    }

    let analysis = analyze::analyze_path(&args.log_path, &config).await?;
    match config.output {
        Output::Text => print!("{}", analysis.report),
        Output::Json => println!("{}", serde_json::to_string_pretty(&analysis.report)?),
    }

    Ok(())
}

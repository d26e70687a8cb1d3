// Disentangle CLI - Command-line evaluator for disentanglement metrics
// Copyright (c) 2025 David Martin Venti
//
// Dual-licensed under AGPL-3.0 and Commercial License.
// See LICENSE file for details.

//! # Disentangle CLI
//!
//! Scores a latent code dump against ground-truth attributes.
//!
//! ## Usage
//!
//! ```bash
//! # Evaluate and print the report
//! disentangle-cli --codes codes.csv --attributes attrs.csv
//!
//! # Reuse or create a cached report
//! disentangle-cli --codes codes.csv --attributes attrs.csv --cache ckpt/results_dict.json --persist
//! ```

use clap::Parser;
use disentangle::{
    compute_metrics, InformationConfig, MetricsConfig, MetricsEngine, MetricsReport, ResultsCache,
};
use disentangle_cli::{load_evaluation_data, log_report, CliError};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

/// Disentanglement metrics evaluator
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// CSV of latent codes (header row, one column per dimension)
    #[arg(long)]
    codes: PathBuf,

    /// CSV of ground-truth attributes (header row names the attributes)
    #[arg(long)]
    attributes: PathBuf,

    /// Results cache file; an existing file is returned without evaluating
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Write a freshly computed report to the cache file
    #[arg(long)]
    persist: bool,

    /// Seed for the estimator jitter
    #[arg(long, default_value = "0")]
    seed: u64,

    /// Neighbours used by the k-NN mutual information estimator
    #[arg(long, default_value = "3")]
    neighbors: usize,

    /// Z-score latent codes before evaluation
    #[arg(long)]
    normalize: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

fn main() -> ExitCode {
    let args = Args::parse();

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        let level = match args.log_level.to_lowercase().as_str() {
            "trace" => Level::TRACE,
            "debug" => Level::DEBUG,
            "info" => Level::INFO,
            "warn" => Level::WARN,
            "error" => Level::ERROR,
            _ => Level::INFO,
        };
        EnvFilter::from_default_env().add_directive(level.into())
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    info!("Disentangle CLI v{}", env!("CARGO_PKG_VERSION"));

    match run(&args) {
        Ok(report) => {
            log_report(&report);
            match report.to_json() {
                Ok(json) => {
                    println!("{}", json);
                    ExitCode::SUCCESS
                }
                Err(e) => {
                    tracing::error!("Failed to serialize report: {}", e);
                    ExitCode::FAILURE
                }
            }
        }
        Err(e) => {
            tracing::error!("Evaluation failed: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<MetricsReport, CliError> {
    let data = load_evaluation_data(&args.codes, &args.attributes, args.normalize)?;
    info!(
        "Dataset loaded: {} samples, {} codes, {} attributes",
        data.num_samples(),
        data.num_codes(),
        data.num_attributes()
    );

    let config = MetricsConfig {
        seed: args.seed,
        information: InformationConfig {
            n_neighbors: args.neighbors,
            ..Default::default()
        },
        persist: args.persist,
        ..Default::default()
    };
    let mut engine = MetricsEngine::new(config);

    let report = match &args.cache {
        Some(path) => compute_metrics(&mut engine, &ResultsCache::new(path), &data)?,
        None => {
            if args.persist {
                tracing::warn!("--persist has no effect without --cache");
            }
            engine.evaluate(&data)?
        }
    };
    Ok(report)
}

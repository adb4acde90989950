//! post_upload
//!
//! Places freshly built release files into the product delivery tree held in
//! an S3-compatible bucket.

use clap::Parser;
use postupload_storage::{PublishReport, Publisher, S3Store, StoreCopier, TransferCache};
use std::process::ExitCode;
use tracing::{error, info, warn};

mod cli;
mod config;
mod error;

use cli::Args;
use config::UploadConfig;
use error::{CliError, Result};

/// Exit status of a run where every file was placed
const EXIT_SUCCESS: u8 = 0;

/// Exit status when the run stopped on a configuration or fatal error
const EXIT_FAILURE: u8 = 1;

/// Exit status when the run finished but some files were not placed
const EXIT_PARTIAL: u8 = 2;

#[tokio::main]
async fn main() -> ExitCode {
    // Load environment variables
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(config::log_filter())
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let outcome = run(&args).await;

    match &outcome {
        Ok(report) if !report.is_success() => {
            error!(failed = report.failures.len(), "some files were not published");
        }
        Ok(_) => {}
        Err(CliError::Usage(problems)) => {
            for problem in problems {
                error!("{problem}");
            }
        }
        Err(e) => error!("{e}"),
    }

    ExitCode::from(exit_status(&outcome))
}

/// Process exit status for the outcome of a run
fn exit_status(outcome: &Result<PublishReport>) -> u8 {
    match outcome {
        Ok(report) if report.is_success() => EXIT_SUCCESS,
        Ok(_) => EXIT_PARTIAL,
        Err(_) => EXIT_FAILURE,
    }
}

async fn run(args: &Args) -> Result<PublishReport> {
    let problems = args.problems();
    if !problems.is_empty() {
        return Err(CliError::Usage(problems));
    }

    let context = args.path_context()?;
    let config = UploadConfig::from_args(args)?;
    let channels = args.channels();
    if channels.is_empty() {
        warn!("no release channel selected, nothing to do");
    }

    let cache = TransferCache::new();
    let report = match &config.storage {
        None => {
            Publisher::dry_run(&context, &cache)
                .with_concurrency(config.concurrency)
                .publish(&channels, &args.files)
                .await?
        }
        Some(settings) => {
            info!(
                endpoint = %settings.endpoint_url,
                buckets = ?settings.buckets.buckets(),
                "connecting to store"
            );
            let copier = StoreCopier::new(S3Store::connect(settings)?);
            Publisher::new(&context, &cache, &copier)
                .with_concurrency(config.concurrency)
                .publish(&channels, &args.files)
                .await?
        }
    };

    print_report(&report, args.json)?;
    Ok(report)
}

fn print_report(report: &PublishReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    for placement in &report.placements {
        println!("{} -> {}", placement.source.display(), placement.key);
    }
    for failure in &report.failures {
        println!("{} !! {}", failure.source.display(), failure.message);
    }
    Ok(())
}

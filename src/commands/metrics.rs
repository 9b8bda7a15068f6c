//! Functionality relating to the `ign-report metrics` subcommand itself.

use std::path::PathBuf;

use clap::Args;
use tracing::debug;
use tracing::info;
use tracing::Dispatch;

use crate::aggregate::Aggregator;
use crate::commands::resolve_samples;
use crate::config::ProjectInfo;
use crate::paths::PipelinePaths;

/// Clap arguments for the `ign-report metrics` subcommand.
#[derive(Args)]
pub struct MetricsArgs {
    /// Project working directory.
    #[arg(value_name = "WORKING_DIR")]
    working_dir: PathBuf,

    /// Sample to collect metrics for (can be repeated). Defaults to every
    /// sample found in the working directory.
    #[arg(short, long = "sample", value_name = "SAMPLE")]
    samples: Vec<String>,

    /// Writes the metrics to this file instead of stdout.
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

/// Main function for the `ign-report metrics` subcommand.
pub fn metrics(args: MetricsArgs, dispatch: Dispatch) -> anyhow::Result<()> {
    info!("Starting metrics subcommand.");
    debug!("  [*] Working directory: {}", args.working_dir.display());

    let paths = PipelinePaths::new(args.working_dir);
    let samples = resolve_samples(&paths, args.samples)?;

    let mut aggregator = Aggregator::new(paths, samples, dispatch)?;
    aggregator.collect();

    let results = aggregator.results(&ProjectInfo::default());
    match args.output {
        Some(output) => {
            info!("  [*] Writing metrics to {}", output.display());
            results.write(&output)?;
        }
        None => println!("{}", serde_json::to_string_pretty(&results)?),
    }

    Ok(())
}

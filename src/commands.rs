//! The `ign-report` subcommands.

pub mod metrics;
pub mod report;

use anyhow::Context;
use tracing::debug;

use crate::paths::PipelinePaths;

pub use self::metrics::metrics;
pub use self::report::report;

/// Returns the samples passed on the command line or, if none were passed,
/// every sample found in the working directory.
pub fn resolve_samples(paths: &PipelinePaths, samples: Vec<String>) -> anyhow::Result<Vec<String>> {
    if !samples.is_empty() {
        return Ok(samples);
    }

    let samples = paths.discover_samples().with_context(|| {
        format!(
            "could not find any samples in {}",
            paths.working_dir().display()
        )
    })?;

    debug!("  [*] Discovered samples: {}", samples.join(", "));
    Ok(samples)
}

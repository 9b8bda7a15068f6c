//! Functionality relating to the `ign-report report` subcommand itself.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use num_format::Locale;
use num_format::ToFormattedString;
use tracing::debug;
use tracing::error;
use tracing::info;
use tracing::Dispatch;

use crate::aggregate::Aggregator;
use crate::commands::resolve_samples;
use crate::config::sequencing_centre;
use crate::config::ProjectInfo;
use crate::config::ReportConfig;
use crate::config::ReportInfo;
use crate::paths::PipelinePaths;
use crate::plot::get_all_sample_plots;
use crate::plot::make_plots;
use crate::render::render_reports;
use crate::render::MarkdownReport;

//========================//
// Command line arguments //
//========================//

/// Clap arguments for the `ign-report report` subcommand.
#[derive(Args)]
pub struct ReportArgs {
    /// Project working directory.
    #[arg(value_name = "WORKING_DIR")]
    working_dir: PathBuf,

    /// Sample to report on (can be repeated). Defaults to every sample found
    /// in the working directory.
    #[arg(short, long = "sample", value_name = "SAMPLE")]
    samples: Vec<String>,

    /// JSON configuration file.
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Project identifier.
    #[arg(long, value_name = "STRING")]
    project_id: Option<String>,

    /// Sequencing platform used for the project.
    #[arg(long, value_name = "STRING")]
    sequencing_platform: Option<String>,

    /// Reference genome the samples were aligned to.
    #[arg(long, value_name = "STRING")]
    ref_genome: Option<String>,

    /// NGI node that produced the data. Overrides the configuration file.
    #[arg(long, value_name = "STRING")]
    ngi_node: Option<String>,

    /// Support e-mail printed in the reports. Overrides the configuration
    /// file.
    #[arg(long, value_name = "EMAIL")]
    support_email: Option<String>,
}

//==============//
// Main command //
//==============//

/// Main function for the `ign-report report` subcommand.
pub fn report(args: ReportArgs, dispatch: Dispatch) -> anyhow::Result<()> {
    info!("Starting report subcommand.");
    debug!("Arguments:");
    debug!("  [*] Working directory: {}", args.working_dir.display());

    //===============//
    // Configuration //
    //===============//

    let config = match &args.config {
        Some(path) => ReportConfig::read(path)?,
        None => ReportConfig::default(),
    };
    debug!("  [*] Config: {:?}", config);

    let ngi_node = args.ngi_node.or(config.ngi_node);
    let project = ProjectInfo {
        id: args.project_id,
        sequencing_centre: ngi_node.as_deref().map(sequencing_centre),
        sequencing_platform: args.sequencing_platform,
        ref_genome: args.ref_genome,
    };
    debug!("  [*] Project: {:?}", project);

    let info = ReportInfo::today(args.support_email.or(config.support_email));

    //=========//
    // Samples //
    //=========//

    let paths = PipelinePaths::new(args.working_dir);
    let samples = resolve_samples(&paths, args.samples)?;

    let mut aggregator = Aggregator::new(paths.clone(), samples, dispatch)?;
    aggregator.collect();

    //=======//
    // Plots //
    //=======//

    info!("Plotting graphs");
    let plots = get_all_sample_plots();
    let sample_ids: Vec<String> = aggregator.samples().keys().cloned().collect();
    for sample_id in &sample_ids {
        let rendered = make_plots(&plots, &paths, sample_id);
        aggregator.record_plots(sample_id, rendered);
    }

    //=========//
    // Reports //
    //=========//

    info!("Processing reports");
    let report_dir = paths.report_dir();
    fs::create_dir_all(&report_dir).with_context(|| {
        format!(
            "could not create the report directory: {}",
            report_dir.display()
        )
    })?;

    let metrics_file = report_dir.join("metrics.json");
    aggregator
        .results(&project)
        .write(&metrics_file)
        .with_context(|| format!("could not write metrics: {}", metrics_file.display()))?;

    let outputs = render_reports(
        &aggregator,
        &MarkdownReport,
        &config.required,
        &info,
        &project,
    );

    let mut written = 0usize;
    for (path, text) in &outputs {
        match fs::write(path, text) {
            Ok(()) => {
                info!("  [*] Wrote {}", path.display());
                written += 1;
            }
            Err(err) => error!("Could not write report {}: {}", path.display(), err),
        }
    }

    info!(
        "Wrote {} of {} sample reports.",
        written.to_formatted_string(&Locale::en),
        sample_ids.len().to_formatted_string(&Locale::en)
    );

    Ok(())
}

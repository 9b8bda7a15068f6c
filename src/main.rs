use clap::CommandFactory;
use clap::FromArgMatches;
use clap::Parser;
use clap::Subcommand;
use git_testament::git_testament;
use git_testament::render_testament;
use tracing::dispatcher;
use tracing::Dispatch;

use ign_report::commands;
use ign_report::commands::metrics::MetricsArgs;
use ign_report::commands::report::ReportArgs;

git_testament!(TESTAMENT);

#[derive(Subcommand)]
enum Subcommands {
    /// Collects the QC metrics of each sample and prints them as JSON.
    Metrics(MetricsArgs),

    /// Collects the QC metrics, plots them and renders a report per sample.
    Report(ReportArgs),
}

#[derive(Parser)]
#[command(author, about, long_about = None, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    pub subcommand: Subcommands,

    /// Only errors are printed to the stderr stream.
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// All available information, including debug information, is printed
    /// to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

fn main() -> anyhow::Result<()> {
    let matches = Cli::command()
        .version(render_testament!(TESTAMENT))
        .get_matches();
    let cli = Cli::from_arg_matches(&matches)?;

    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else if cli.quiet {
        tracing::Level::ERROR
    } else {
        tracing::Level::INFO
    };

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .finish();
    let dispatch = Dispatch::new(subscriber);

    dispatcher::with_default(&dispatch, || match cli.subcommand {
        Subcommands::Metrics(args) => commands::metrics(args, dispatch.clone()),
        Subcommands::Report(args) => commands::report(args, dispatch.clone()),
    })
}

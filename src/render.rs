//! Rendering of the per sample reports.

use std::fmt::Write;
use std::path::PathBuf;

use indexmap::IndexMap;
use prettytable::format::FormatBuilder;
use prettytable::format::LinePosition;
use prettytable::format::LineSeparator;
use prettytable::format::TableFormat;
use prettytable::row;
use prettytable::Table;
use tracing::dispatcher;
use tracing::error;
use tracing::info;

use crate::aggregate::Aggregator;
use crate::config::ProjectInfo;
use crate::config::ReportInfo;
use crate::config::RequiredFields;
use crate::metrics::SampleMetrics;
use crate::metrics::SamplePlots;
use crate::plot::get_all_sample_plots;

/// Everything a report is rendered from.
pub struct ReportContext<'a> {
    /// Information about the report itself.
    pub info: &'a ReportInfo,

    /// Information about the project.
    pub project: &'a ProjectInfo,

    /// The metrics of the sample being reported.
    pub sample: &'a SampleMetrics,

    /// The plots of the sample being reported.
    pub plots: &'a SamplePlots,
}

/// Renders the text of one sample report.
pub trait ReportRenderer {
    /// Extension of the rendered files, without the leading dot.
    fn extension(&self) -> &'static str;

    /// Renders the report for the sample in `context`.
    fn render(&self, context: &ReportContext<'_>) -> anyhow::Result<String>;
}

/// Renders a Markdown report with one table per section.
pub struct MarkdownReport;

fn markdown_format() -> TableFormat {
    FormatBuilder::new()
        .column_separator('|')
        .borders('|')
        .separator(LinePosition::Title, LineSeparator::new('-', '|', '|', '|'))
        .padding(1, 1)
        .build()
}

fn metrics_table(rows: &[(&str, Option<&str>)]) -> Table {
    let mut table = Table::new();
    table.set_format(markdown_format());
    table.set_titles(row!["Metric", "Value"]);

    for (name, value) in rows {
        table.add_row(row![name, value.unwrap_or("N/A")]);
    }

    table
}

impl ReportRenderer for MarkdownReport {
    fn extension(&self) -> &'static str {
        "md"
    }

    fn render(&self, context: &ReportContext<'_>) -> anyhow::Result<String> {
        let ReportContext {
            info,
            project,
            sample,
            plots,
        } = context;
        let mut out = String::new();

        writeln!(out, "# IGN Sample Report: {}", sample.sample_id)?;
        writeln!(out)?;

        let project_table = metrics_table(&[
            ("Project", project.id.as_deref()),
            ("Sequencing centre", project.sequencing_centre.as_deref()),
            ("Sequencing platform", project.sequencing_platform.as_deref()),
            ("Reference genome", project.ref_genome.as_deref()),
            ("Report date", Some(info.date.as_str())),
            ("Support", info.support_email.as_deref()),
        ]);
        write!(out, "{}", project_table)?;

        writeln!(out)?;
        writeln!(out, "## Alignment")?;
        writeln!(out)?;
        let alignment_table = metrics_table(&[
            ("Total reads", sample.total_reads.as_deref()),
            ("Aligned reads", sample.aligned_reads.as_deref()),
            ("Percent aligned", sample.percent_aligned.as_deref()),
            ("Median insert size", sample.median_insert_size.as_deref()),
            ("Duplication rate", sample.duplication_rate.as_deref()),
            ("GC percentage", sample.percent_gc.as_deref()),
        ]);
        write!(out, "{}", alignment_table)?;

        writeln!(out)?;
        writeln!(out, "## Coverage")?;
        writeln!(out)?;
        let coverage_table = metrics_table(&[
            ("Mean coverage", sample.mean_coverage.as_deref()),
            ("Autosomal coverage", sample.autosomal_coverage.as_deref()),
            ("Reference above 30X", sample.ref_above_30x.as_deref()),
        ]);
        write!(out, "{}", coverage_table)?;

        if let Some(variants) = &sample.variants {
            writeln!(out)?;
            writeln!(out, "## Variants")?;
            writeln!(out)?;
            let variants_table = metrics_table(&[
                ("Total SNPs", variants.total_snps.as_deref()),
                ("Change rate", variants.change_rate.as_deref()),
                ("Heterozygous SNPs", variants.heterotypic_snps.as_deref()),
                ("Homozygous SNPs", variants.homotypic_snps.as_deref()),
                ("Missense SNPs", variants.missense_snps.as_deref()),
                ("Missense (%)", variants.percent_missense.as_deref()),
                ("Nonsense SNPs", variants.nonsense_snps.as_deref()),
                ("Nonsense (%)", variants.percent_nonsense.as_deref()),
                ("Silent SNPs", variants.silent_snps.as_deref()),
                ("Silent (%)", variants.percent_silent.as_deref()),
                ("Synonymous SNPs", variants.synonymous_snps.as_deref()),
                ("Non-synonymous SNPs", variants.nonsynonymous_snps.as_deref()),
                ("Stops gained", variants.stops_gained.as_deref()),
                ("Stops lost", variants.stops_lost.as_deref()),
                ("Ts/Tv ratio", variants.ts_tv_ratio.as_deref()),
            ]);
            write!(out, "{}", variants_table)?;
        }

        if !plots.is_empty() {
            writeln!(out)?;
            writeln!(out, "## Plots")?;
            writeln!(out)?;

            let names = get_all_sample_plots();
            for (id, path) in plots.iter() {
                let name = names
                    .iter()
                    .find(|p| p.id() == id)
                    .map(|p| p.name())
                    .unwrap_or(id.as_str());
                writeln!(out, "- [{}]({})", name, path)?;
            }
        }

        Ok(out)
    }
}

/// Renders the report of every sample that passes the completeness check.
/// Samples that are incomplete or fail to render are logged and skipped.
/// Returns the output path of each report with its text.
pub fn render_reports(
    aggregator: &Aggregator,
    renderer: &dyn ReportRenderer,
    required: &RequiredFields,
    info: &ReportInfo,
    project: &ProjectInfo,
) -> IndexMap<PathBuf, String> {
    let mut outputs = IndexMap::new();
    let report_dir = aggregator.paths().report_dir();
    let no_plots = SamplePlots::new();

    for (sample_id, sample) in aggregator.samples() {
        if !aggregator.check_sample(sample_id, required, info, project) {
            dispatcher::with_default(aggregator.dispatch(), || {
                error!(
                    "Some mandatory fields were missing for sample {} - skipping",
                    sample_id
                )
            });
            continue;
        }

        let context = ReportContext {
            info,
            project,
            sample,
            plots: aggregator.plots(sample_id).unwrap_or(&no_plots),
        };

        dispatcher::with_default(aggregator.dispatch(), || match renderer.render(&context) {
            Ok(text) => {
                let filename = format!("{}_ign_sample_report.{}", sample_id, renderer.extension());
                info!("  [*] Rendered the report for sample {}", sample_id);
                outputs.insert(report_dir.join(filename), text);
            }
            Err(err) => error!(
                "Could not render the report for sample {} - skipping: {:#}",
                sample_id, err
            ),
        });
    }

    outputs
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::write_sample;
    use crate::fixtures::Source;
    use crate::paths::PipelinePaths;
    use crate::plot::make_plots;
    use tracing::Dispatch;

    fn project() -> ProjectInfo {
        ProjectInfo {
            id: Some("P1".into()),
            sequencing_centre: Some("NGI Stockholm".into()),
            sequencing_platform: Some("HiSeq X".into()),
            ref_genome: Some("GRCh37".into()),
        }
    }

    struct FailingRenderer;

    impl ReportRenderer for FailingRenderer {
        fn extension(&self) -> &'static str {
            "txt"
        }

        fn render(&self, context: &ReportContext<'_>) -> anyhow::Result<String> {
            if context.sample.sample_id == "broken" {
                anyhow::bail!("template error");
            }
            Ok(context.sample.sample_id.clone())
        }
    }

    #[test]
    fn test_markdown_report() {
        let mut sample = SampleMetrics::new("P1_101");
        sample.total_reads = Some("908,585,160".into());
        let mut plots = SamplePlots::new();
        plots.insert("coverage_plot".into(), "plots/P1_101/P1_101_coverage.html".into());

        let info = ReportInfo {
            support_email: Some("support@example.com".into()),
            date: "2024-01-31".into(),
        };
        let project = project();
        let context = ReportContext {
            info: &info,
            project: &project,
            sample: &sample,
            plots: &plots,
        };

        let text = MarkdownReport.render(&context).unwrap();
        assert!(text.starts_with("# IGN Sample Report: P1_101\n"));
        assert!(text.contains("| Total reads "));
        assert!(text.contains("908,585,160"));
        assert!(text.contains("| Aligned reads "));
        assert!(text.contains("N/A"));
        assert!(text.contains("- [Coverage Histogram](plots/P1_101/P1_101_coverage.html)"));
        assert!(!text.contains("## Variants"));
    }

    #[test]
    fn test_render_reports_with_markdown() {
        let directory = tempfile::tempdir().unwrap();
        write_sample(directory.path(), "P1_101", Source::Good, Source::Good, Source::Good);
        write_sample(directory.path(), "P1_102", Source::Good, Source::Good, Source::Missing);

        let paths = PipelinePaths::new(directory.path());
        let mut aggregator =
            Aggregator::new(paths.clone(), ["P1_101", "P1_102"], Dispatch::none()).unwrap();
        aggregator.collect();

        let plots = get_all_sample_plots();
        for sample_id in ["P1_101", "P1_102"] {
            let rendered = make_plots(&plots, &paths, sample_id);
            aggregator.record_plots(sample_id, rendered);
        }

        let info = ReportInfo::today(Some("support@example.com".into()));
        let outputs = render_reports(
            &aggregator,
            &MarkdownReport,
            &RequiredFields::default(),
            &info,
            &project(),
        );
        assert_eq!(outputs.len(), 2);

        let text = &outputs[&paths.report_dir().join("P1_101_ign_sample_report.md")];
        assert!(text.starts_with("# IGN Sample Report: P1_101\n"));
        assert!(text.contains("| Duplication rate "));
        assert!(text.contains("12.34%"));
        assert!(text.contains("## Variants"));
        assert!(text.contains("4,004,647"));
        assert!(text.contains("(plots/P1_101/P1_101_snpEff_effect_regions.html)"));

        let text = &outputs[&paths.report_dir().join("P1_102_ign_sample_report.md")];
        assert!(text.contains("| Duplication rate "));
        assert!(text.contains("N/A"));
    }

    #[test]
    fn test_render_reports_skips_failed_samples() {
        let directory = tempfile::tempdir().unwrap();
        for sample_id in ["broken", "fine", "incomplete"] {
            let coverage = if sample_id == "incomplete" {
                Source::Malformed
            } else {
                Source::Good
            };
            write_sample(directory.path(), sample_id, coverage, Source::Good, Source::Good);
        }

        let paths = PipelinePaths::new(directory.path());
        let mut aggregator =
            Aggregator::new(paths.clone(), ["broken", "fine", "incomplete"], Dispatch::none())
                .unwrap();
        aggregator.collect();

        let required = RequiredFields {
            plots: Vec::new(),
            ..Default::default()
        };
        let info = ReportInfo::today(None);
        let outputs = render_reports(&aggregator, &FailingRenderer, &required, &info, &project());

        assert_eq!(outputs.len(), 1);
        assert_eq!(
            outputs.get(&paths.report_dir().join("fine_ign_sample_report.txt")),
            Some(&"fine".to_string())
        );
    }
}

//! Plots drawn from the Qualimap raw data files.

use std::path::Path;
use std::path::PathBuf;

use plotly::common::Mode;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Layout;
use plotly::Scatter;

use crate::paths::SamplePaths;
use crate::plot::RawData;
use crate::plot::SamplePlot;

/// Draws every column after the first against the first column.
fn line_plot(
    source: &Path,
    title: Title,
    x_title: &str,
    y_title: &str,
) -> anyhow::Result<plotly::Plot> {
    let data = RawData::read(source)?;
    let x = data.column(0)?;
    let columns = data.rows.iter().map(Vec::len).min().unwrap_or(0);

    let mut plot = plotly::Plot::new();
    for index in 1..columns.max(2) {
        let trace = Scatter::new(x.clone(), data.column(index)?)
            .mode(Mode::Lines)
            .name(&data.column_name(index));
        plot.add_trace(trace);
    }

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title(Title::new(x_title)).auto_range(true))
        .y_axis(Axis::new().title(Title::new(y_title)).auto_range(true));
    plot.set_layout(layout);

    Ok(plot)
}

/// Number of genomic locations per coverage depth.
pub struct CoverageHistogramPlot;

impl SamplePlot for CoverageHistogramPlot {
    fn id(&self) -> &'static str {
        "coverage_plot"
    }

    fn name(&self) -> &'static str {
        "Coverage Histogram"
    }

    fn filename(&self) -> &'static str {
        "coverage"
    }

    fn source(&self, paths: &SamplePaths) -> PathBuf {
        paths.coverage_histogram()
    }

    fn generate(&self, source: &Path, title: Title) -> anyhow::Result<plotly::Plot> {
        line_plot(source, title, "Coverage (X)", "Number of Genomic Locations")
    }
}

/// Fraction of the genome covered at or above each depth.
pub struct GenomeFractionCoveragePlot;

impl SamplePlot for GenomeFractionCoveragePlot {
    fn id(&self) -> &'static str {
        "cov_frac_plot"
    }

    fn name(&self) -> &'static str {
        "Genome Fraction Coverage"
    }

    fn filename(&self) -> &'static str {
        "genome_fraction"
    }

    fn source(&self, paths: &SamplePaths) -> PathBuf {
        paths.genome_fraction_coverage()
    }

    fn generate(&self, source: &Path, title: Title) -> anyhow::Result<plotly::Plot> {
        line_plot(source, title, "Coverage (X)", "Fraction of Reference (%)")
    }
}

/// Insert size distribution of the read pairs.
pub struct InsertSizeHistogramPlot;

impl SamplePlot for InsertSizeHistogramPlot {
    fn id(&self) -> &'static str {
        "insert_size_plot"
    }

    fn name(&self) -> &'static str {
        "Insert Size Histogram"
    }

    fn filename(&self) -> &'static str {
        "insert_size"
    }

    fn source(&self, paths: &SamplePaths) -> PathBuf {
        paths.insert_size_histogram()
    }

    fn generate(&self, source: &Path, title: Title) -> anyhow::Result<plotly::Plot> {
        line_plot(source, title, "Insert Size (bp)", "Number of Read Pairs")
    }
}

/// GC content distribution of the mapped reads, with the reference
/// distribution when Qualimap reports one.
pub struct GCContentDistributionPlot;

impl SamplePlot for GCContentDistributionPlot {
    fn id(&self) -> &'static str {
        "gc_dist_plot"
    }

    fn name(&self) -> &'static str {
        "GC Content Distribution"
    }

    fn filename(&self) -> &'static str {
        "gc_distribution"
    }

    fn source(&self, paths: &SamplePaths) -> PathBuf {
        paths.gc_content_distribution()
    }

    fn generate(&self, source: &Path, title: Title) -> anyhow::Result<plotly::Plot> {
        line_plot(source, title, "Percentage GC", "Fraction of Reads")
    }
}

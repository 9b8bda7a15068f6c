//! Plots rendered for each sample report.
//!
//! Each plot reads one raw data file written by an upstream tool and renders
//! it as an interactive HTML page with `plotly`. The path of the rendered
//! page, relative to the report directory, is recorded under the plot's id so
//! that the report can link to it.

pub mod qualimap;
pub mod snpeff;

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use plotly::common::Title;
use tracing::error;
use tracing::info;

use crate::metrics::SamplePlots;
use crate::paths::PipelinePaths;
use crate::paths::SamplePaths;

//===================//
// Sample Plot trait //
//===================//

/// A single-sample graph included in the sample report.
pub trait SamplePlot {
    /// The id the rendered plot is recorded under.
    fn id(&self) -> &'static str;

    /// The name of this plot.
    fn name(&self) -> &'static str;

    /// Suffix of the output filename for this plot.
    fn filename(&self) -> &'static str;

    /// The raw data file this plot is drawn from.
    fn source(&self, paths: &SamplePaths) -> PathBuf;

    /// Generates the plot from its raw data file.
    fn generate(&self, source: &Path, title: Title) -> anyhow::Result<plotly::Plot>;
}

/// Gets all of the supported single-sample plots.
pub fn get_all_sample_plots() -> Vec<Box<dyn SamplePlot>> {
    vec![
        Box::new(qualimap::CoverageHistogramPlot),
        Box::new(qualimap::GenomeFractionCoveragePlot),
        Box::new(qualimap::InsertSizeHistogramPlot),
        Box::new(qualimap::GCContentDistributionPlot),
        Box::new(snpeff::EffectsByRegionPlot),
    ]
}

/// Renders the given plots for one sample into its plots directory. Plots
/// that cannot be rendered are logged and left out of the returned map.
pub fn make_plots(
    plots: &[Box<dyn SamplePlot>],
    paths: &PipelinePaths,
    sample_id: &str,
) -> SamplePlots {
    let mut rendered = SamplePlots::new();
    let sample_paths = paths.sample(sample_id);
    let plots_dir = paths.plots_dir(sample_id);

    if let Err(err) = fs::create_dir_all(&plots_dir) {
        error!(
            "Could not create the plots directory for sample {} ({}): {}",
            sample_id,
            plots_dir.display(),
            err
        );
        return rendered;
    }

    for p in plots {
        let source = p.source(&sample_paths);
        let title = Title::new(&format!("{} - {}", p.name(), sample_id));

        let plot = match p.generate(&source, title) {
            Ok(plot) => plot,
            Err(err) => {
                error!(
                    "Could not plot the {} for sample {}: {:#}",
                    p.name(),
                    sample_id,
                    err
                );
                continue;
            }
        };

        let filename = format!("{}_{}.html", sample_id, p.filename());
        let output = plots_dir.join(&filename);

        info!("  [*] Writing {} to {}", p.name(), output.display());
        if let Err(err) = fs::write(&output, plot.to_html()) {
            error!(
                "Could not write the {} for sample {} ({}): {}",
                p.name(),
                sample_id,
                output.display(),
                err
            );
            continue;
        }

        rendered.insert(
            p.id().to_string(),
            format!("plots/{}/{}", sample_id, filename),
        );
    }

    rendered
}

//==========//
// Raw data //
//==========//

/// A whitespace separated numeric table, as written in the raw data
/// directory of a Qualimap report. The header is the `#` commented line
/// preceding the data.
#[derive(Debug, Default)]
pub struct RawData {
    /// Column names.
    pub header: Vec<String>,

    /// The numeric rows.
    pub rows: Vec<Vec<f64>>,
}

impl RawData {
    /// Reads a raw data table from a file.
    pub fn read(path: &Path) -> anyhow::Result<RawData> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("could not read raw data file: {}", path.display()))?;
        contents
            .parse::<RawData>()
            .with_context(|| format!("invalid raw data file: {}", path.display()))
    }

    /// All values of a column. Fails if any row is too short.
    pub fn column(&self, index: usize) -> anyhow::Result<Vec<f64>> {
        self.rows
            .iter()
            .enumerate()
            .map(|(i, row)| {
                row.get(index)
                    .copied()
                    .with_context(|| format!("row {} has no column {}", i + 1, index))
            })
            .collect()
    }

    /// The name of a column, or a default name if the header is missing.
    pub fn column_name(&self, index: usize) -> String {
        self.header
            .get(index)
            .cloned()
            .unwrap_or_else(|| format!("Column {}", index + 1))
    }
}

impl std::str::FromStr for RawData {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut data = RawData::default();

        for (i, line) in s.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(header) = line.strip_prefix('#') {
                data.header = header.split('\t').map(|h| h.trim().to_string()).collect();
                continue;
            }

            let row = line
                .split_whitespace()
                .map(|value| value.parse::<f64>())
                .collect::<Result<Vec<_>, _>>()
                .with_context(|| format!("line {} is not numeric", i + 1))?;
            data.rows.push(row);
        }

        if data.rows.is_empty() {
            bail!("no data rows");
        }

        Ok(data)
    }
}

#[cfg(test)]
mod tests {
    use itertools::Itertools;

    use super::*;
    use crate::config::RequiredFields;
    use crate::fixtures::write_sample;
    use crate::fixtures::Source;

    #[test]
    fn test_parse_raw_data() {
        let data = "#GC Content (%)\tSample\tHUMAN (hg19)\n40.0\t0.02\t0.021\n\n41.0\t0.03\t0.029\n"
            .parse::<RawData>()
            .unwrap();

        assert_eq!(data.header, vec!["GC Content (%)", "Sample", "HUMAN (hg19)"]);
        assert_eq!(data.column(0).unwrap(), vec![40.0, 41.0]);
        assert_eq!(data.column(2).unwrap(), vec![0.021, 0.029]);
        assert!(data.column(3).is_err());
        assert_eq!(data.column_name(3), "Column 4");
    }

    #[test]
    fn test_raw_data_errors() {
        assert!("#Coverage\tCount\n".parse::<RawData>().is_err());
        assert!("1.0\tmany\n".parse::<RawData>().is_err());
    }

    #[test]
    fn test_plot_ids_are_the_required_plots() {
        let ids = get_all_sample_plots().iter().map(|p| p.id()).collect_vec();
        assert_eq!(ids, RequiredFields::default().plots);
    }

    #[test]
    fn test_make_plots() {
        let directory = tempfile::tempdir().unwrap();
        write_sample(directory.path(), "P1_101", Source::Good, Source::Good, Source::Missing);
        write_sample(directory.path(), "P1_102", Source::Missing, Source::Good, Source::Missing);

        let paths = PipelinePaths::new(directory.path());
        let plots = get_all_sample_plots();

        let rendered = make_plots(&plots, &paths, "P1_101");
        assert_eq!(rendered.len(), 5);
        assert_eq!(
            rendered.get("coverage_plot").map(String::as_str),
            Some("plots/P1_101/P1_101_coverage.html")
        );
        for relative in rendered.values() {
            assert!(paths.report_dir().join(relative).exists());
        }

        let rendered = make_plots(&plots, &paths, "P1_102");
        assert_eq!(rendered.keys().collect_vec(), vec!["snpeff_plot"]);
    }

    #[test]
    fn test_unwritable_plot_is_skipped() {
        let directory = tempfile::tempdir().unwrap();
        write_sample(directory.path(), "P1_101", Source::Good, Source::Good, Source::Good);

        let paths = PipelinePaths::new(directory.path());
        let blocked = paths.plots_dir("P1_101").join("P1_101_coverage.html");
        fs::create_dir_all(&blocked).unwrap();

        let rendered = make_plots(&get_all_sample_plots(), &paths, "P1_101");
        assert_eq!(rendered.len(), 4);
        assert!(!rendered.contains_key("coverage_plot"));
        assert!(rendered.contains_key("cov_frac_plot"));
    }
}

//! Plot of the variant effects by genomic region, drawn from the snpEff
//! summary CSV.

use std::fs;
use std::path::Path;
use std::path::PathBuf;

use anyhow::bail;
use anyhow::Context;
use plotly::common::Title;
use plotly::layout::Axis;
use plotly::Bar;
use plotly::Layout;

use crate::paths::SamplePaths;
use crate::plot::SamplePlot;

/// Header of the effects by genomic region section.
const REGION_SECTION: &str = "# Count by genomic region";

/// Reads the `(region, count)` rows of the genomic region section.
pub fn read_regions(contents: &str) -> anyhow::Result<Vec<(String, f64)>> {
    let mut regions = Vec::new();
    let mut lines = contents
        .lines()
        .map(str::trim)
        .skip_while(|line| *line != REGION_SECTION);

    if lines.next().is_none() {
        bail!("no `{}` section", REGION_SECTION);
    }

    for line in lines {
        if line.is_empty() || line.starts_with('#') {
            break;
        }

        let mut columns = line.split(',').map(str::trim);
        let (region, count) = match (columns.next(), columns.next()) {
            (Some(region), Some(count)) => (region, count),
            _ => bail!("invalid genomic region row: {}", line),
        };

        if region == "Type" {
            continue;
        }

        let count = count
            .parse::<f64>()
            .with_context(|| format!("invalid genomic region count: {}", count))?;
        regions.push((region.to_string(), count));
    }

    if regions.is_empty() {
        bail!("`{}` section is empty", REGION_SECTION);
    }

    Ok(regions)
}

/// Number of variant effects in each type of genomic region.
pub struct EffectsByRegionPlot;

impl SamplePlot for EffectsByRegionPlot {
    fn id(&self) -> &'static str {
        "snpeff_plot"
    }

    fn name(&self) -> &'static str {
        "Variant Effects by Region"
    }

    fn filename(&self) -> &'static str {
        "snpEff_effect_regions"
    }

    fn source(&self, paths: &SamplePaths) -> PathBuf {
        paths.snpeff_summary.clone()
    }

    fn generate(&self, source: &Path, title: Title) -> anyhow::Result<plotly::Plot> {
        let contents = fs::read_to_string(source)
            .with_context(|| format!("could not read snpEff summary: {}", source.display()))?;
        let (regions, counts): (Vec<String>, Vec<f64>) = read_regions(&contents)
            .with_context(|| format!("invalid snpEff summary: {}", source.display()))?
            .into_iter()
            .unzip();

        let mut plot = plotly::Plot::new();
        plot.add_trace(Bar::new(regions, counts));

        let layout = Layout::new()
            .title(title)
            .x_axis(Axis::new().title(Title::new("Genomic Region")))
            .y_axis(Axis::new().title(Title::new("Number of Effects")).auto_range(true));
        plot.set_layout(layout);

        Ok(plot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::SNPEFF_SUMMARY;

    #[test]
    fn test_read_regions() {
        let regions = read_regions(SNPEFF_SUMMARY).unwrap();
        assert_eq!(
            regions,
            vec![
                ("DOWNSTREAM".to_string(), 1200.0),
                ("EXON".to_string(), 300.0),
                ("INTRON".to_string(), 8500.0),
            ]
        );
    }

    #[test]
    fn test_read_regions_stops_at_next_section() {
        let contents = "# Count by genomic region\n\
                        Type , Count , Percent\n\
                        EXON , 3 , 1%\n\
                        # Count by effects\n\
                        stop_gained , 1 , 1%\n";
        let regions = read_regions(contents).unwrap();
        assert_eq!(regions, vec![("EXON".to_string(), 3.0)]);
    }

    #[test]
    fn test_read_regions_without_section() {
        assert!(read_regions("Het , 12\n").is_err());
        assert!(read_regions("# Count by genomic region\nType , Count , Percent\n\n").is_err());
    }
}

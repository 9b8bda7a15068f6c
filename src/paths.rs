//! Locations of the pipeline outputs within a project working directory.
//!
//! The pipeline lays its outputs out in numbered, stage specific
//! subdirectories. Any of the paths returned here may legitimately not exist.

use std::fs;
use std::io;
use std::path::Path;
use std::path::PathBuf;

use itertools::Itertools;

/// Directory holding the final alignment QC (Qualimap) outputs.
const ALIGNMENT_QC_DIR: &str = "06_final_alignment_qc";

/// Suffix of each sample's Qualimap output directory.
const ALIGNMENT_QC_SUFFIX: &str = ".clean.dedup.recal.qc";

/// Directory holding the variant calls and their snpEff summaries.
const VARIANT_CALLS_DIR: &str = "07_variant_calls";

/// Directory holding the processed alignments and the Picard metrics.
const PROCESSED_ALIGNMENTS_DIR: &str = "05_processed_alignments";

/// Root of a project working directory.
#[derive(Clone, Debug)]
pub struct PipelinePaths {
    working_dir: PathBuf,
}

impl PipelinePaths {
    /// Creates a new [`PipelinePaths`] rooted at `working_dir`.
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        PipelinePaths {
            working_dir: working_dir.into(),
        }
    }

    /// The project working directory.
    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// The expected locations of every source file for one sample.
    pub fn sample(&self, sample_id: &str) -> SamplePaths {
        let qualimap_dir = self
            .working_dir
            .join(ALIGNMENT_QC_DIR)
            .join(format!("{}{}", sample_id, ALIGNMENT_QC_SUFFIX));

        SamplePaths {
            genome_results: qualimap_dir.join("genome_results.txt"),
            qualimap_report: qualimap_dir.join("qualimapReport.html"),
            qualimap_raw_data: qualimap_dir.join("raw_data_qualimapReport"),
            snpeff_summary: self.working_dir.join(VARIANT_CALLS_DIR).join(format!(
                "{}.clean.dedup.recal.bam.raw.annotated.vcf.snpEff.summary.csv",
                sample_id
            )),
            picard_metrics: self
                .working_dir
                .join(PROCESSED_ALIGNMENTS_DIR)
                .join(format!("{}.metrics", sample_id)),
        }
    }

    /// Directory the rendered reports are written to.
    pub fn report_dir(&self) -> PathBuf {
        self.working_dir.join("delivery").join("reports")
    }

    /// Directory the plots of one sample are written to.
    pub fn plots_dir(&self, sample_id: &str) -> PathBuf {
        self.report_dir().join("plots").join(sample_id)
    }

    /// Lists the sample ids that have a Qualimap output directory, sorted.
    pub fn discover_samples(&self) -> io::Result<Vec<String>> {
        let mut samples = Vec::new();

        for entry in fs::read_dir(self.working_dir.join(ALIGNMENT_QC_DIR))? {
            let entry = entry?;
            if !entry.file_type()?.is_dir() {
                continue;
            }

            if let Some(name) = entry.file_name().to_str() {
                if let Some(sample_id) = name.strip_suffix(ALIGNMENT_QC_SUFFIX) {
                    if !sample_id.is_empty() {
                        samples.push(sample_id.to_string());
                    }
                }
            }
        }

        Ok(samples.into_iter().sorted().collect())
    }
}

/// The expected source files for one sample.
#[derive(Clone, Debug)]
pub struct SamplePaths {
    /// Qualimap `genome_results.txt`.
    pub genome_results: PathBuf,

    /// Qualimap `qualimapReport.html`.
    pub qualimap_report: PathBuf,

    /// Directory holding the Qualimap raw data files.
    pub qualimap_raw_data: PathBuf,

    /// snpEff summary CSV.
    pub snpeff_summary: PathBuf,

    /// Picard MarkDuplicates metrics.
    pub picard_metrics: PathBuf,
}

impl SamplePaths {
    /// Qualimap coverage histogram raw data.
    pub fn coverage_histogram(&self) -> PathBuf {
        self.qualimap_raw_data.join("coverage_histogram.txt")
    }

    /// Qualimap genome fraction coverage raw data.
    pub fn genome_fraction_coverage(&self) -> PathBuf {
        self.qualimap_raw_data.join("genome_fraction_coverage.txt")
    }

    /// Qualimap insert size histogram raw data.
    pub fn insert_size_histogram(&self) -> PathBuf {
        self.qualimap_raw_data.join("insert_size_histogram.txt")
    }

    /// Qualimap GC content distribution raw data.
    pub fn gc_content_distribution(&self) -> PathBuf {
        self.qualimap_raw_data.join("mapped_reads_gc-content_distribution.txt")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_paths() {
        let paths = PipelinePaths::new("/project").sample("P1_101");

        assert_eq!(
            paths.genome_results,
            PathBuf::from(
                "/project/06_final_alignment_qc/P1_101.clean.dedup.recal.qc/genome_results.txt"
            )
        );
        assert_eq!(
            paths.picard_metrics,
            PathBuf::from("/project/05_processed_alignments/P1_101.metrics")
        );
        assert_eq!(
            paths.snpeff_summary.file_name().unwrap(),
            "P1_101.clean.dedup.recal.bam.raw.annotated.vcf.snpEff.summary.csv"
        );
        assert_eq!(
            paths.coverage_histogram(),
            PathBuf::from(
                "/project/06_final_alignment_qc/P1_101.clean.dedup.recal.qc/\
                 raw_data_qualimapReport/coverage_histogram.txt"
            )
        );
    }

    #[test]
    fn test_report_dirs() {
        let paths = PipelinePaths::new("/project");
        assert_eq!(paths.report_dir(), PathBuf::from("/project/delivery/reports"));
        assert_eq!(
            paths.plots_dir("P1_101"),
            PathBuf::from("/project/delivery/reports/plots/P1_101")
        );
    }

    #[test]
    fn test_discover_samples() {
        let directory = tempfile::tempdir().unwrap();
        let qc_dir = directory.path().join(ALIGNMENT_QC_DIR);
        fs::create_dir_all(qc_dir.join("P1_102.clean.dedup.recal.qc")).unwrap();
        fs::create_dir_all(qc_dir.join("P1_101.clean.dedup.recal.qc")).unwrap();
        fs::create_dir_all(qc_dir.join("unrelated")).unwrap();
        fs::write(qc_dir.join("P1_103.clean.dedup.recal.qc"), "not a directory").unwrap();

        let samples = PipelinePaths::new(directory.path())
            .discover_samples()
            .unwrap();
        assert_eq!(samples, vec!["P1_101".to_string(), "P1_102".to_string()]);
    }

    #[test]
    fn test_discover_samples_without_qc_dir() {
        let directory = tempfile::tempdir().unwrap();
        assert!(PipelinePaths::new(directory.path())
            .discover_samples()
            .is_err());
    }
}

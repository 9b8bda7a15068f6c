//! Data model for the metrics collected for each sample.
//!
//! Every metric is stored as an `Option<String>`: a value is either present
//! with exactly the text extracted (and formatted) from the source report, or
//! it is absent. Nothing is ever filled in with a zero or an empty string,
//! which lets the completeness check tell "not computed" apart from "computed
//! as zero".

use std::fs;
use std::fs::File;
use std::io;
use std::io::Write;
use std::path::Path;

use indexmap::IndexMap;
use serde::Deserialize;
use serde::Serialize;

use crate::config::ProjectInfo;

/// The plots rendered for one sample: plot id to the path of the plot,
/// relative to the report directory.
pub type SamplePlots = IndexMap<String, String>;

/// Summary of the variant effects reported by snpEff for one sample.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VariantSummary {
    /// Total number of variants before filtering.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_snps: Option<String>,

    /// Change rate, rendered as `1 change per N bp`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub change_rate: Option<String>,

    /// Number of heterozygous calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heterotypic_snps: Option<String>,

    /// Number of homozygous calls.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub homotypic_snps: Option<String>,

    /// Number of missense variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missense_snps: Option<String>,

    /// Percentage of missense variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_missense: Option<String>,

    /// Number of nonsense variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonsense_snps: Option<String>,

    /// Percentage of nonsense variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_nonsense: Option<String>,

    /// Number of silent variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub silent_snps: Option<String>,

    /// Percentage of silent variants.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_silent: Option<String>,

    /// Number of synonymous variants, summed over every matching row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub synonymous_snps: Option<String>,

    /// Number of non-synonymous variants, summed over every matching row.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nonsynonymous_snps: Option<String>,

    /// Number of variants gaining a stop codon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops_gained: Option<String>,

    /// Number of variants losing a stop codon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stops_lost: Option<String>,

    /// Transition/transversion ratio.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ts_tv_ratio: Option<String>,
}

impl VariantSummary {
    /// Looks up a field by name. Unknown names yield `None`.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "total_snps" => &self.total_snps,
            "change_rate" => &self.change_rate,
            "heterotypic_snps" => &self.heterotypic_snps,
            "homotypic_snps" => &self.homotypic_snps,
            "missense_snps" => &self.missense_snps,
            "percent_missense" => &self.percent_missense,
            "nonsense_snps" => &self.nonsense_snps,
            "percent_nonsense" => &self.percent_nonsense,
            "silent_snps" => &self.silent_snps,
            "percent_silent" => &self.percent_silent,
            "synonymous_snps" => &self.synonymous_snps,
            "nonsynonymous_snps" => &self.nonsynonymous_snps,
            "stops_gained" => &self.stops_gained,
            "stops_lost" => &self.stops_lost,
            "ts_tv_ratio" => &self.ts_tv_ratio,
            _ => return None,
        };

        value.as_deref()
    }
}

/// All of the metrics collected for a single sample.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SampleMetrics {
    /// The externally assigned sample identifier.
    pub sample_id: String,

    /// Total number of reads, as formatted by Qualimap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_reads: Option<String>,

    /// Number of mapped reads, as formatted by Qualimap.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aligned_reads: Option<String>,

    /// Percentage of mapped reads (including the `%`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_aligned: Option<String>,

    /// GC percentage (including the `%`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percent_gc: Option<String>,

    /// Mean coverage over the reference.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mean_coverage: Option<String>,

    /// Percentage of the reference covered at 30X or more.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_above_30x: Option<String>,

    /// Mean coverage across chromosomes 1-22, derived from the per contig
    /// coverage table.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub autosomal_coverage: Option<String>,

    /// Median insert size.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub median_insert_size: Option<String>,

    /// Variant effect summary, if the snpEff summary could be parsed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variants: Option<VariantSummary>,

    /// Duplication rate (including the `%`).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duplication_rate: Option<String>,
}

impl SampleMetrics {
    /// Creates an empty [`SampleMetrics`] for the given sample.
    pub fn new<I>(sample_id: I) -> Self
    where
        I: Into<String>,
    {
        SampleMetrics {
            sample_id: sample_id.into(),
            ..Default::default()
        }
    }

    /// Looks up a field by name. Variant fields are addressed as
    /// `variants.<field>`. Unknown names yield `None`.
    pub fn field(&self, name: &str) -> Option<&str> {
        if let Some(variant_field) = name.strip_prefix("variants.") {
            return self.variants.as_ref()?.field(variant_field);
        }

        let value = match name {
            "sample_id" => return Some(self.sample_id.as_str()),
            "total_reads" => &self.total_reads,
            "aligned_reads" => &self.aligned_reads,
            "percent_aligned" => &self.percent_aligned,
            "percent_gc" => &self.percent_gc,
            "mean_coverage" => &self.mean_coverage,
            "ref_above_30x" => &self.ref_above_30x,
            "autosomal_coverage" => &self.autosomal_coverage,
            "median_insert_size" => &self.median_insert_size,
            "duplication_rate" => &self.duplication_rate,
            _ => return None,
        };

        value.as_deref()
    }
}

/// Main struct for collecting the metrics of _all_ samples in a project.
#[derive(Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Results {
    /// Information about the project the samples belong to.
    pub project: ProjectInfo,

    /// The per sample metrics, ordered by sample id.
    pub samples: IndexMap<String, SampleMetrics>,
}

impl Results {
    /// Attempts to write the [`Results`] struct to the specified file.
    pub fn write(&self, filepath: impl AsRef<Path>) -> Result<(), io::Error> {
        let mut file = File::create(filepath)?;
        let output = serde_json::to_string_pretty(&self)?;
        file.write_all(output.as_bytes())?;

        Ok(())
    }

    /// Attempts to read a [`Results`] struct from a file.
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<Results> {
        let path = filepath.as_ref();
        let contents = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&contents)?)
    }
}

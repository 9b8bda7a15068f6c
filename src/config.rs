//! Configuration of the report and the information about the project that
//! does not come from the QC reports themselves.

use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde::Serialize;

//==============//
// Project info //
//==============//

/// Information about the project the samples belong to.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectInfo {
    /// The project identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// The sequencing centre, e.g. `NGI Stockholm`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequencing_centre: Option<String>,

    /// The sequencing platform used for the project.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequencing_platform: Option<String>,

    /// The reference genome the samples were aligned to.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ref_genome: Option<String>,
}

impl ProjectInfo {
    /// Looks up a field by name. Unknown names yield `None`.
    pub fn field(&self, name: &str) -> Option<&str> {
        let value = match name {
            "id" => &self.id,
            "sequencing_centre" => &self.sequencing_centre,
            "sequencing_platform" => &self.sequencing_platform,
            "ref_genome" => &self.ref_genome,
            _ => return None,
        };

        value.as_deref()
    }
}

/// Formats the sequencing centre name for an NGI node, e.g. `stockholm`
/// becomes `NGI Stockholm`.
pub fn sequencing_centre(ngi_node: &str) -> String {
    let mut chars = ngi_node.chars();
    let title: String = match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(|c| c.to_lowercase()))
            .collect(),
        None => String::new(),
    };

    format!("NGI {}", title)
}

//=============//
// Report info //
//=============//

/// Information about the report itself.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ReportInfo {
    /// E-mail address the readers of the report can write to.
    pub support_email: Option<String>,

    /// Date the report was generated (`YYYY-MM-DD`).
    pub date: String,
}

impl ReportInfo {
    /// Creates a [`ReportInfo`] dated today.
    pub fn today(support_email: Option<String>) -> Self {
        ReportInfo {
            support_email,
            date: chrono::Local::now().format("%Y-%m-%d").to_string(),
        }
    }

    /// Looks up a field by name. Unknown names yield `None`.
    pub fn field(&self, name: &str) -> Option<&str> {
        match name {
            "support_email" => self.support_email.as_deref(),
            "date" => Some(self.date.as_str()),
            _ => None,
        }
    }
}

//=================//
// Required fields //
//=================//

/// The fields that must be present before a sample report is rendered.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RequiredFields {
    /// Required fields of the [`ReportInfo`].
    pub report: Vec<String>,

    /// Required fields of the [`ProjectInfo`].
    pub project: Vec<String>,

    /// Required fields of each sample.
    pub sample: Vec<String>,

    /// Required plot ids of each sample.
    pub plots: Vec<String>,
}

impl Default for RequiredFields {
    fn default() -> Self {
        fn owned(names: &[&str]) -> Vec<String> {
            names.iter().map(|name| name.to_string()).collect()
        }

        RequiredFields {
            report: Vec::new(),
            project: owned(&["id", "sequencing_centre", "sequencing_platform", "ref_genome"]),
            sample: owned(&[
                "total_reads",
                "percent_aligned",
                "aligned_reads",
                "median_insert_size",
                "autosomal_coverage",
                "ref_above_30x",
                "percent_gc",
            ]),
            plots: owned(&[
                "coverage_plot",
                "cov_frac_plot",
                "insert_size_plot",
                "gc_dist_plot",
                "snpeff_plot",
            ]),
        }
    }
}

//===============//
// Report config //
//===============//

/// Configuration for the `ign-report report` subcommand, read from a JSON
/// file. Every key is optional.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Support e-mail printed in the report.
    pub support_email: Option<String>,

    /// The NGI node that produced the data (e.g. `stockholm`).
    pub ngi_node: Option<String>,

    /// Fields checked before rendering each sample report.
    pub required: RequiredFields,
}

impl ReportConfig {
    /// Attempts to read a [`ReportConfig`] from a JSON file.
    pub fn read(filepath: impl AsRef<Path>) -> anyhow::Result<ReportConfig> {
        let path = filepath.as_ref();
        let contents = fs::read_to_string(path)
            .with_context(|| format!("could not read config file: {}", path.display()))?;
        serde_json::from_str(&contents)
            .with_context(|| format!("invalid config file: {}", path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sequencing_centre() {
        assert_eq!(sequencing_centre("stockholm"), "NGI Stockholm");
        assert_eq!(sequencing_centre("UPPSALA"), "NGI Uppsala");
        assert_eq!(sequencing_centre(""), "NGI ");
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config: ReportConfig =
            serde_json::from_str(r#"{"required": {"sample": ["duplication_rate"]}}"#).unwrap();

        assert_eq!(config.support_email, None);
        assert_eq!(config.required.sample, vec!["duplication_rate".to_string()]);
        assert_eq!(config.required.plots, RequiredFields::default().plots);
    }

    #[test]
    fn test_project_field_lookup() {
        let project = ProjectInfo {
            id: Some("P1".into()),
            ..Default::default()
        };

        assert_eq!(project.field("id"), Some("P1"));
        assert_eq!(project.field("ref_genome"), None);
        assert_eq!(project.field("unknown"), None);
    }
}

//! Collection of the metrics of every sample in a project.
//!
//! The [`Aggregator`] owns one [`SampleMetrics`] per sample and runs every
//! [`ReportParser`] against it. Problems with the reports of one sample are
//! logged and never stop the other samples from being processed.

use anyhow::bail;
use indexmap::IndexMap;
use itertools::Itertools;
use tracing::dispatcher;
use tracing::error;
use tracing::info;
use tracing::info_span;
use tracing::Dispatch;

use crate::config::ProjectInfo;
use crate::config::ReportInfo;
use crate::config::RequiredFields;
use crate::metrics::Results;
use crate::metrics::SampleMetrics;
use crate::metrics::SamplePlots;
use crate::parse::get_all_parsers;
use crate::parse::ReportParser;
use crate::paths::PipelinePaths;

/// Collects the metrics of a set of samples.
pub struct Aggregator {
    /// Locations of the pipeline outputs.
    paths: PipelinePaths,

    /// The parsers run for every sample.
    parsers: Vec<Box<dyn ReportParser>>,

    /// The metrics of each sample, ordered by sample id.
    samples: IndexMap<String, SampleMetrics>,

    /// The plots recorded for each sample.
    plots: IndexMap<String, SamplePlots>,

    /// Where log events are sent.
    dispatch: Dispatch,
}

impl Aggregator {
    /// Creates a new [`Aggregator`] with an empty record for every sample.
    /// Duplicate sample ids are collapsed. Fails if there are no samples.
    pub fn new<I, S>(
        paths: PipelinePaths,
        sample_ids: I,
        dispatch: Dispatch,
    ) -> anyhow::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let samples: IndexMap<String, SampleMetrics> = sample_ids
            .into_iter()
            .map(Into::<String>::into)
            .sorted()
            .dedup()
            .map(|id| (id.clone(), SampleMetrics::new(id)))
            .collect();

        if samples.is_empty() {
            bail!("No samples found!");
        }

        Ok(Aggregator {
            paths,
            parsers: get_all_parsers(),
            samples,
            plots: IndexMap::new(),
            dispatch,
        })
    }

    /// The locations of the pipeline outputs.
    pub fn paths(&self) -> &PipelinePaths {
        &self.paths
    }

    /// Where log events of this aggregator are sent.
    pub fn dispatch(&self) -> &Dispatch {
        &self.dispatch
    }

    /// The metrics of each sample, ordered by sample id.
    pub fn samples(&self) -> &IndexMap<String, SampleMetrics> {
        &self.samples
    }

    /// The plots recorded for a sample.
    pub fn plots(&self, sample_id: &str) -> Option<&SamplePlots> {
        self.plots.get(sample_id)
    }

    /// Runs every parser for every sample. Records are rebuilt from scratch,
    /// so collecting twice over the same inputs gives the same records.
    pub fn collect(&mut self) {
        let Aggregator {
            paths,
            parsers,
            samples,
            dispatch,
            ..
        } = self;

        dispatcher::with_default(dispatch, || {
            info!("Parsing QC files");

            for (sample_id, metrics) in samples.iter_mut() {
                let _span = info_span!("sample", id = %sample_id).entered();
                let sample_paths = paths.sample(sample_id);

                *metrics = SampleMetrics::new(sample_id.as_str());
                for parser in parsers.iter() {
                    parser.parse(&sample_paths, metrics);
                }
            }
        });
    }

    /// Records the plots rendered for a sample. Unknown samples are ignored.
    pub fn record_plots(&mut self, sample_id: &str, plots: SamplePlots) {
        if self.samples.contains_key(sample_id) {
            self.plots.insert(sample_id.to_string(), plots);
        }
    }

    /// Checks that every required field is present for one sample. The first
    /// missing field is logged.
    pub fn check_sample(
        &self,
        sample_id: &str,
        required: &RequiredFields,
        info: &ReportInfo,
        project: &ProjectInfo,
    ) -> bool {
        dispatcher::with_default(&self.dispatch, || {
            let metrics = match self.samples.get(sample_id) {
                Some(metrics) => metrics,
                None => {
                    error!("Unknown sample: {}", sample_id);
                    return false;
                }
            };

            let plots = self.plots.get(sample_id);
            let missing = required
                .report
                .iter()
                .find(|f| info.field(f).is_none())
                .map(|f| ("report", f))
                .or_else(|| {
                    required
                        .project
                        .iter()
                        .find(|f| project.field(f).is_none())
                        .map(|f| ("project", f))
                })
                .or_else(|| {
                    required
                        .sample
                        .iter()
                        .find(|f| metrics.field(f).is_none())
                        .map(|f| ("sample", f))
                })
                .or_else(|| {
                    required
                        .plots
                        .iter()
                        .find(|f| !plots.map_or(false, |p| p.contains_key(f.as_str())))
                        .map(|f| ("plot", f))
                });

            match missing {
                Some((kind, field)) => {
                    error!(
                        "Mandatory {} field missing for sample {}: {}",
                        kind, sample_id, field
                    );
                    false
                }
                None => true,
            }
        })
    }

    /// Checks every sample. Passes only if every sample passes.
    pub fn check_fields(
        &self,
        required: &RequiredFields,
        info: &ReportInfo,
        project: &ProjectInfo,
    ) -> bool {
        self.samples
            .keys()
            .map(|sample_id| self.check_sample(sample_id, required, info, project))
            .fold(true, |all, passed| all && passed)
    }

    /// A snapshot of the collected metrics.
    pub fn results(&self, project: &ProjectInfo) -> Results {
        Results {
            project: project.clone(),
            samples: self.samples.clone(),
        }
    }
}

//! Parser for the Picard MarkDuplicates metrics file.

use std::io::BufRead;

use tracing::debug;
use tracing::error;
use tracing::warn;

use crate::metrics::SampleMetrics;
use crate::parse::lines;
use crate::parse::open;
use crate::parse::ParseError;
use crate::parse::ReportParser;
use crate::paths::SamplePaths;
use crate::utils::display::PercentageFormat;

/// Header row of the metrics table.
pub const METRICS_HEADER: &str = "LIBRARY\tUNPAIRED_READS_EXAMINED\tREAD_PAIRS_EXAMINED\t\
    UNMAPPED_READS\tUNPAIRED_READ_DUPLICATES\tREAD_PAIR_DUPLICATES\t\
    READ_PAIR_OPTICAL_DUPLICATES\tPERCENT_DUPLICATION\tESTIMATED_LIBRARY_SIZE";

/// Index of the `PERCENT_DUPLICATION` column.
const PERCENT_DUPLICATION: usize = 7;

#[derive(Debug, PartialEq, Eq)]
enum State {
    SeekingHeader,
    HaveHeader,
}

/// Scans a Picard metrics file and returns the duplication rate of the first
/// data row following the header, if there is one.
pub fn scan<R>(reader: R) -> Result<Option<String>, ParseError>
where
    R: BufRead,
{
    let mut state = State::SeekingHeader;
    let mut duplication_rate = None;

    for (i, result) in lines(reader).enumerate() {
        let raw = result?;
        let line = raw.trim();

        match state {
            State::SeekingHeader => {
                if line == METRICS_HEADER {
                    state = State::HaveHeader;
                }
            }
            State::HaveHeader => {
                let value = line.split('\t').nth(PERCENT_DUPLICATION).ok_or_else(|| {
                    ParseError::malformed(i + 1, "metrics row has no PERCENT_DUPLICATION column")
                })?;
                let fraction = value.trim().parse::<f64>().map_err(|_| {
                    ParseError::malformed(i + 1, format!("invalid PERCENT_DUPLICATION: {}", value))
                })?;

                duplication_rate = Some(PercentageFormat(fraction * 100.0, 2).to_string());
                state = State::SeekingHeader;
            }
        }
    }

    Ok(duplication_rate)
}

/// Parser for the Picard MarkDuplicates metrics.
pub struct DuplicationParser;

impl ReportParser for DuplicationParser {
    fn name(&self) -> &'static str {
        "Picard"
    }

    fn parse(&self, paths: &SamplePaths, metrics: &mut SampleMetrics) {
        debug!("  [*] Reading {}", paths.picard_metrics.display());

        match open(&paths.picard_metrics).and_then(scan) {
            Ok(Some(rate)) => metrics.duplication_rate = Some(rate),
            Ok(None) => debug!(
                "No duplication metrics found in {}",
                paths.picard_metrics.display()
            ),
            // Not every pipeline configuration marks duplicates.
            Err(ParseError::MissingInput) => warn!(
                "Could not find the Picard metrics file for sample {}: {}",
                metrics.sample_id,
                paths.picard_metrics.display()
            ),
            Err(err) => error!(
                "Could not parse the Picard metrics for sample {} ({}): {}",
                metrics.sample_id,
                paths.picard_metrics.display(),
                err
            ),
        }
    }
}

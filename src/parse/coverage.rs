//! Parser for the Qualimap BAM QC outputs.
//!
//! Two files are read for each sample: the plain text `genome_results.txt`
//! and the `qualimapReport.html` page (the median insert size is only printed
//! in the latter). Both layouts are rigidly columnar, so values are cut out of
//! each labelled line at fixed offsets.

use std::io::BufRead;

use tracing::debug;
use tracing::error;

use crate::metrics::SampleMetrics;
use crate::parse::lines;
use crate::parse::open;
use crate::parse::ParseError;
use crate::parse::ReportParser;
use crate::paths::SamplePaths;

/// Header of the per contig coverage table.
const CONTIG_SECTION: &str = ">>>>>>> Coverage per contig";

/// Prefix of every section header in `genome_results.txt`.
const SECTION_DELIMITER: &str = ">>>>>>>";

/// Highest chromosome number considered autosomal.
const LAST_AUTOSOME: u64 = 22;

/// Cell preceding the insert size quartiles in the HTML report.
const INSERT_SIZE_QUARTILES_CELL: &str = "<td class=column1>P25/Median/P75</td>";

/// Returns `line[start..line.len() - back]`, if the line is long enough.
fn between(line: &str, start: usize, back: usize) -> Option<&str> {
    let end = line.len().checked_sub(back)?;
    if start > end {
        return None;
    }

    line.get(start..end)
}

/// Returns the `count` bytes that end `back` bytes before the end of the line.
fn from_end(line: &str, count: usize, back: usize) -> Option<&str> {
    let start = line.len().checked_sub(count + back)?;
    between(line, start, back)
}

fn require(value: Option<&str>, line: usize, what: &str) -> Result<String, ParseError> {
    value
        .map(String::from)
        .ok_or_else(|| ParseError::malformed(line, format!("line too short for {}", what)))
}

/// Running sums over the autosomal rows of the per contig coverage table.
#[derive(Debug, Default)]
struct AutosomalCoverage {
    length: f64,
    bases: f64,
}

impl AutosomalCoverage {
    /// Adds a row of the per contig table if it belongs to an autosome.
    fn add_row(&mut self, row: &str, line: usize) -> Result<(), ParseError> {
        let mut tokens = row.split_whitespace();

        let contig = match tokens.next() {
            Some(contig) => contig,
            None => return Ok(()),
        };

        if contig.is_empty() || !contig.bytes().all(|b| b.is_ascii_digit()) {
            return Ok(());
        }

        match contig.parse::<u64>() {
            Ok(n) if n <= LAST_AUTOSOME => {}
            _ => return Ok(()),
        }

        let mut next_number = |what: &str| -> Result<f64, ParseError> {
            let token = tokens
                .next()
                .ok_or_else(|| ParseError::malformed(line, format!("missing contig {}", what)))?;
            token.parse::<f64>().map_err(|_| {
                ParseError::malformed(line, format!("invalid contig {}: {}", what, token))
            })
        };

        let length = next_number("length")?;
        let bases = next_number("mapped bases")?;

        self.length += length;
        self.bases += bases;

        Ok(())
    }

    /// Mean coverage over the autosomes, if any autosomal row was seen.
    fn summarize(&self) -> Option<String> {
        if self.length > 0.0 && self.bases > 0.0 {
            Some(format!("{:.2}", self.bases / self.length))
        } else {
            None
        }
    }
}

/// Scans a Qualimap `genome_results.txt` into `metrics`. Fields found before
/// an error is raised are kept.
pub fn scan_genome_results<R>(reader: R, metrics: &mut SampleMetrics) -> Result<(), ParseError>
where
    R: BufRead,
{
    let mut in_contig_section = false;
    let mut autosomal = AutosomalCoverage::default();

    for (i, result) in lines(reader).enumerate() {
        let raw = result?;
        let line = raw.trim();
        let line_no = i + 1;

        // number of reads = 908,585,160
        if line.starts_with("number of reads =") {
            metrics.total_reads = Some(require(between(line, 18, 0), line_no, "total reads")?);
        }

        // number of mapped reads = 903,806,933 (99.47%)
        if line.starts_with("number of mapped reads =") {
            let percent = require(from_end(line, 6, 1), line_no, "percent aligned")?;
            let aligned = require(between(line, 25, 9), line_no, "aligned reads")?;
            metrics.percent_aligned = Some(percent);
            metrics.aligned_reads = Some(aligned);
        }

        // GC percentage = 39.87%
        if line.starts_with("GC percentage =") {
            metrics.percent_gc = Some(require(from_end(line, 6, 0), line_no, "GC percentage")?);
        }

        // mean coverageData = 29.04X
        if line.starts_with("mean coverageData =") {
            metrics.mean_coverage = Some(require(between(line, 20, 1), line_no, "mean coverage")?);
        }

        // There is a 51.72% of reference with a coverageData >= 30X
        if line.ends_with("of reference with a coverageData >= 30X") {
            metrics.ref_above_30x = Some(require(line.get(11..17), line_no, "coverage >= 30X")?);
        }

        if line == CONTIG_SECTION {
            in_contig_section = true;
        } else if line.starts_with(SECTION_DELIMITER) {
            in_contig_section = false;
        }

        if in_contig_section && !line.is_empty() {
            autosomal.add_row(line, line_no)?;
        }
    }

    if let Some(coverage) = autosomal.summarize() {
        metrics.autosomal_coverage = Some(coverage);
    }

    Ok(())
}

/// Scans a `qualimapReport.html` page for the median insert size.
///
/// ```html
/// <td class=column1>P25/Median/P75</td>
/// <td class=column2>318 / 369 / 422</td>
/// ```
pub fn scan_qualimap_report<R>(reader: R, metrics: &mut SampleMetrics) -> Result<(), ParseError>
where
    R: BufRead,
{
    let mut rows = lines(reader).enumerate();

    while let Some((i, result)) = rows.next() {
        let raw = result?;
        if raw.trim() != INSERT_SIZE_QUARTILES_CELL {
            continue;
        }

        let (j, next) = match rows.next() {
            Some((j, result)) => (j, result?),
            None => {
                return Err(ParseError::malformed(
                    i + 1,
                    "insert size quartiles header is not followed by a value",
                ))
            }
        };

        let cell = require(between(next.trim(), 18, 5), j + 1, "insert size quartiles")?;
        let median = cell.splitn(3, '/').nth(1).ok_or_else(|| {
            ParseError::malformed(j + 1, format!("invalid insert size quartiles: {}", cell))
        })?;

        metrics.median_insert_size = Some(median.trim().to_string());
    }

    Ok(())
}

/// Parser for the Qualimap genome results and HTML report.
pub struct CoverageParser;

impl ReportParser for CoverageParser {
    fn name(&self) -> &'static str {
        "Qualimap"
    }

    fn parse(&self, paths: &SamplePaths, metrics: &mut SampleMetrics) {
        let sample_id = metrics.sample_id.clone();

        // Each file fails on its own: a broken genome results file does not
        // stop the HTML report from being read.
        debug!("  [*] Reading {}", paths.genome_results.display());
        if let Err(err) =
            open(&paths.genome_results).and_then(|reader| scan_genome_results(reader, metrics))
        {
            error!(
                "Could not parse the Qualimap results for sample {} ({}): {}",
                sample_id,
                paths.genome_results.display(),
                err
            );
        }

        debug!("  [*] Reading {}", paths.qualimap_report.display());
        if let Err(err) =
            open(&paths.qualimap_report).and_then(|reader| scan_qualimap_report(reader, metrics))
        {
            error!(
                "Could not parse the Qualimap report for sample {} ({}): {}",
                sample_id,
                paths.qualimap_report.display(),
                err
            );
        }
    }
}

//! Parser for the snpEff summary CSV.
//!
//! Two generations of snpEff write this summary with different labels for
//! the same concepts (e.g. `synonymous_variant` in current releases and
//! `SYNONYMOUS_CODING`/`SYNONYMOUS_STOP` in legacy ones). Rather than
//! detecting the generation of a file, every line is checked against the
//! rules of both generations, and counts that are split over several rows are
//! summed.

use std::io::BufRead;

use tracing::debug;
use tracing::error;

use crate::metrics::SampleMetrics;
use crate::metrics::VariantSummary;
use crate::parse::lines;
use crate::parse::open;
use crate::parse::ParseError;
use crate::parse::ReportParser;
use crate::paths::SamplePaths;
use crate::utils::display::thousands;
use crate::utils::display::PercentageFormat;

/// Accessor for one field of a [`VariantSummary`].
type Slot = fn(&mut VariantSummary) -> &mut Option<String>;

/// How the value(s) of a matching row are extracted.
enum Extract {
    /// Integer following the label.
    Value(Slot),

    /// Base pair distance following the label, rendered as a change rate.
    ChangeRate,

    /// Ratio following the label, rendered with three decimals.
    Ratio(Slot),

    /// Integer in column 1.
    Count(Slot),

    /// Integer in column 1 and percentage in column 2.
    CountAndPercent(Slot, Slot),

    /// Integer in column 1, added to the synonymous total.
    Synonymous,

    /// Integer in column 1, added to the non-synonymous total.
    NonSynonymous,

    /// Legacy `SNP` row: homozygous count in column 2, heterozygous in 3.
    Zygosity,
}

/// A label and what to extract from the rows starting with it. Labels that
/// end in ` ,` must match up to and including the comma.
struct Rule {
    label: &'static str,
    extract: Extract,
}

const RULES: &[Rule] = &[
    Rule {
        label: "Number_of_variants_before_filter,",
        extract: Extract::Value(|v| &mut v.total_snps),
    },
    Rule {
        label: "Change_rate ,",
        extract: Extract::ChangeRate,
    },
    Rule {
        label: "Het ,",
        extract: Extract::Value(|v| &mut v.heterotypic_snps),
    },
    Rule {
        label: "Hom ,",
        extract: Extract::Value(|v| &mut v.homotypic_snps),
    },
    Rule {
        label: "MISSENSE ,",
        extract: Extract::CountAndPercent(|v| &mut v.missense_snps, |v| &mut v.percent_missense),
    },
    Rule {
        label: "NONSENSE ,",
        extract: Extract::CountAndPercent(|v| &mut v.nonsense_snps, |v| &mut v.percent_nonsense),
    },
    Rule {
        label: "SILENT ,",
        extract: Extract::CountAndPercent(|v| &mut v.silent_snps, |v| &mut v.percent_silent),
    },
    Rule {
        label: "synonymous_variant ,",
        extract: Extract::Synonymous,
    },
    Rule {
        label: "stop_gained ,",
        extract: Extract::Count(|v| &mut v.stops_gained),
    },
    Rule {
        label: "stop_lost ,",
        extract: Extract::Count(|v| &mut v.stops_lost),
    },
    Rule {
        label: "Ts_Tv_ratio ,",
        extract: Extract::Ratio(|v| &mut v.ts_tv_ratio),
    },
    // Legacy snpEff releases.
    Rule {
        label: "SNP ,",
        extract: Extract::Zygosity,
    },
    Rule {
        label: "SYNONYMOUS",
        extract: Extract::Synonymous,
    },
    Rule {
        label: "NON_SYNONYMOUS",
        extract: Extract::NonSynonymous,
    },
    Rule {
        label: "STOP_GAINED ,",
        extract: Extract::Count(|v| &mut v.stops_gained),
    },
    Rule {
        label: "STOP_LOST ,",
        extract: Extract::Count(|v| &mut v.stops_lost),
    },
];

fn parse_count(value: &str, line: usize) -> Result<u64, ParseError> {
    value
        .parse::<u64>()
        .map_err(|_| ParseError::malformed(line, format!("invalid count: {}", value)))
}

fn parse_float(value: &str, line: usize) -> Result<f64, ParseError> {
    value
        .parse::<f64>()
        .map_err(|_| ParseError::malformed(line, format!("invalid number: {}", value)))
}

/// The comma separated, trimmed columns of a row.
struct Columns<'a> {
    columns: Vec<&'a str>,
    line: usize,
}

impl<'a> Columns<'a> {
    fn new(row: &'a str, line: usize) -> Self {
        Columns {
            columns: row.split(',').map(str::trim).collect(),
            line,
        }
    }

    fn get(&self, index: usize) -> Result<&'a str, ParseError> {
        self.columns
            .get(index)
            .copied()
            .ok_or_else(|| ParseError::malformed(self.line, format!("missing column {}", index)))
    }

    fn count(&self, index: usize) -> Result<u64, ParseError> {
        parse_count(self.get(index)?, self.line)
    }

    fn percent(&self, index: usize) -> Result<f64, ParseError> {
        parse_float(self.get(index)?.trim_end_matches('%'), self.line)
    }
}

/// Accumulates a [`VariantSummary`] over the lines of one summary file.
#[derive(Debug, Default)]
struct VariantScanner {
    summary: VariantSummary,
    synonymous: u64,
    nonsynonymous: u64,
}

impl VariantScanner {
    fn scan_line(&mut self, line: &str, line_no: usize) -> Result<(), ParseError> {
        for rule in RULES {
            if let Some(rest) = line.strip_prefix(rule.label) {
                self.apply(&rule.extract, line, rest.trim(), line_no)?;
            }
        }

        Ok(())
    }

    fn apply(
        &mut self,
        extract: &Extract,
        row: &str,
        rest: &str,
        line_no: usize,
    ) -> Result<(), ParseError> {
        match extract {
            Extract::Value(slot) => {
                *slot(&mut self.summary) = Some(thousands(parse_count(rest, line_no)?));
            }
            Extract::ChangeRate => {
                let distance = parse_count(rest, line_no)?;
                self.summary.change_rate = Some(format!("1 change per {} bp", thousands(distance)));
            }
            Extract::Ratio(slot) => {
                *slot(&mut self.summary) = Some(format!("{:.3}", parse_float(rest, line_no)?));
            }
            Extract::Count(slot) => {
                let count = Columns::new(row, line_no).count(1)?;
                *slot(&mut self.summary) = Some(thousands(count));
            }
            Extract::CountAndPercent(count_slot, percent_slot) => {
                let columns = Columns::new(row, line_no);
                let percent = columns.percent(2)?;
                let count = columns.count(1)?;
                *percent_slot(&mut self.summary) = Some(PercentageFormat(percent, 1).to_string());
                *count_slot(&mut self.summary) = Some(thousands(count));
            }
            Extract::Synonymous => {
                let count = Columns::new(row, line_no).count(1)?;
                self.synonymous = self.synonymous.saturating_add(count);
            }
            Extract::NonSynonymous => {
                let count = Columns::new(row, line_no).count(1)?;
                self.nonsynonymous = self.nonsynonymous.saturating_add(count);
            }
            Extract::Zygosity => {
                let columns = Columns::new(row, line_no);
                let homozygous = columns.count(2)?;
                let heterozygous = columns.count(3)?;
                self.summary.homotypic_snps = Some(thousands(homozygous));
                self.summary.heterotypic_snps = Some(thousands(heterozygous));
            }
        }

        Ok(())
    }

    fn finish(self) -> VariantSummary {
        let mut summary = self.summary;

        // A zero total means the rows were never seen.
        if self.synonymous > 0 {
            summary.synonymous_snps = Some(thousands(self.synonymous));
        }

        if self.nonsynonymous > 0 {
            summary.nonsynonymous_snps = Some(thousands(self.nonsynonymous));
        }

        summary
    }
}

/// Scans a snpEff summary CSV. Any malformed row fails the whole file and
/// nothing extracted from it is returned.
pub fn scan<R>(reader: R) -> Result<VariantSummary, ParseError>
where
    R: BufRead,
{
    let mut scanner = VariantScanner::default();

    for (i, result) in lines(reader).enumerate() {
        let line = result?;
        scanner.scan_line(line.trim(), i + 1)?;
    }

    Ok(scanner.finish())
}

/// Parser for the snpEff summary CSV.
pub struct VariantEffectParser;

impl ReportParser for VariantEffectParser {
    fn name(&self) -> &'static str {
        "snpEff"
    }

    fn parse(&self, paths: &SamplePaths, metrics: &mut SampleMetrics) {
        debug!("  [*] Reading {}", paths.snpeff_summary.display());

        match open(&paths.snpeff_summary).and_then(scan) {
            Ok(summary) => metrics.variants = Some(summary),
            Err(err) => error!(
                "Could not parse the snpEff results for sample {} ({}): {}",
                metrics.sample_id,
                paths.snpeff_summary.display(),
                err
            ),
        }
    }
}

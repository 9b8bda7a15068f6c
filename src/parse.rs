//! Line scanners for the upstream QC reports.
//!
//! Each scanner reads one report format that is fixed by the tool producing
//! it. Matching is done on literal prefixes and fixed offsets per labelled
//! line, exactly as the upstream layouts are written.

use core::fmt;
use std::fs::File;
use std::io;
use std::io::BufRead;
use std::io::BufReader;
use std::path::Path;

use crate::metrics::SampleMetrics;
use crate::paths::SamplePaths;

pub mod coverage;
pub mod duplication;
pub mod variants;

//========//
// Errors //
//========//

/// An error raised while scanning a single report file.
#[derive(Debug)]
pub enum ParseError {
    /// The report file does not exist.
    MissingInput,

    /// The report file exists but could not be read.
    Io(io::Error),

    /// A line of the report did not have the expected shape.
    MalformedInput {
        /// One-based line number.
        line: usize,

        /// What was wrong with the line.
        reason: String,
    },
}

impl ParseError {
    /// Creates a [`ParseError::MalformedInput`] for the given line.
    pub fn malformed<I>(line: usize, reason: I) -> Self
    where
        I: Into<String>,
    {
        ParseError::MalformedInput {
            line,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for ParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParseError::MissingInput => write!(f, "file not found"),
            ParseError::Io(err) => write!(f, "i/o error: {}", err),
            ParseError::MalformedInput { line, reason } => {
                write!(f, "malformed line {}: {}", line, reason)
            }
        }
    }
}

impl std::error::Error for ParseError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ParseError::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for ParseError {
    fn from(err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => ParseError::MissingInput,
            _ => ParseError::Io(err),
        }
    }
}

/// Opens a report file for buffered, line by line reading. The handle is
/// released as soon as the returned reader is dropped.
pub fn open(path: &Path) -> Result<BufReader<File>, ParseError> {
    Ok(BufReader::new(File::open(path)?))
}

/// Iterator over the lines of a report, see [`lines`].
pub struct Lines<R> {
    reader: R,
    buffer: Vec<u8>,
}

/// Iterates over the lines of a report without the trailing `\n` or `\r\n`.
/// Bytes that are not valid UTF-8 are replaced rather than failing the read,
/// as free text lines (e.g. file paths) may be in any encoding.
pub fn lines<R>(reader: R) -> Lines<R>
where
    R: BufRead,
{
    Lines {
        reader,
        buffer: Vec::new(),
    }
}

impl<R> Iterator for Lines<R>
where
    R: BufRead,
{
    type Item = io::Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        self.buffer.clear();

        match self.reader.read_until(b'\n', &mut self.buffer) {
            Ok(0) => None,
            Ok(_) => {
                if self.buffer.ends_with(b"\n") {
                    self.buffer.pop();
                    if self.buffer.ends_with(b"\r") {
                        self.buffer.pop();
                    }
                }

                Some(Ok(String::from_utf8_lossy(&self.buffer).into_owned()))
            }
            Err(err) => Some(Err(err)),
        }
    }
}

//==============//
// Parser trait //
//==============//

/// A parser that fills in part of a sample's [`SampleMetrics`] from one of
/// the upstream reports.
///
/// Parsers write disjoint fields, so they can run in any order. A parser
/// never fails past the sample boundary: problems are logged and whatever
/// could be extracted is kept.
pub trait ReportParser {
    /// The name of the tool whose report is parsed.
    fn name(&self) -> &'static str;

    /// Parses the report(s) of one sample into its record.
    fn parse(&self, paths: &SamplePaths, metrics: &mut SampleMetrics);
}

/// Gets all of the supported report parsers.
pub fn get_all_parsers() -> Vec<Box<dyn ReportParser>> {
    vec![
        Box::new(coverage::CoverageParser),
        Box::new(variants::VariantEffectParser),
        Box::new(duplication::DuplicationParser),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_missing_input() {
        let directory = tempfile::tempdir().unwrap();
        let result = open(&directory.path().join("absent.txt"));
        assert!(matches!(result, Err(ParseError::MissingInput)));
    }

    #[test]
    fn test_lines_replace_invalid_utf8() {
        let input: &[u8] = b"bam file = /data/J\xf6rg/P1_101.bam\r\nnumber of reads = 1\nlast";
        let lines: Vec<String> = lines(input).collect::<io::Result<_>>().unwrap();

        assert_eq!(
            lines,
            vec![
                "bam file = /data/J\u{fffd}rg/P1_101.bam",
                "number of reads = 1",
                "last"
            ]
        );
    }

    #[test]
    fn test_malformed_display() {
        let err = ParseError::malformed(3, "expected a number");
        assert_eq!(err.to_string(), "malformed line 3: expected a number");
    }

    #[test]
    fn test_parser_names() {
        let names: Vec<_> = get_all_parsers().iter().map(|p| p.name()).collect();
        assert_eq!(names, vec!["Qualimap", "snpEff", "Picard"]);
    }
}

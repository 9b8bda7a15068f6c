//! Report fixtures shared by the tests of several modules.

use std::fs;
use std::io;
use std::path::Path;
use std::sync::Arc;
use std::sync::Mutex;

use tracing::Dispatch;

use crate::parse::duplication::METRICS_HEADER;
use crate::paths::PipelinePaths;

pub const GENOME_RESULTS: &str = ">>>>>>> Globals

     number of reads = 908,585,160
     number of mapped reads = 903,806,933 (99.47%)

>>>>>>> ACGT Content

     GC percentage = 39.87%

>>>>>>> Coverage

     mean coverageData = 29.04X
     There is a 51.72% of reference with a coverageData >= 30X

>>>>>>> Coverage per contig

\t1\t249250621\t7311413463\t29.33\t9.6
\t2\t243199373\t7150843012\t29.40\t9.1
\tX\t155270560\t2214131513\t14.26\t6.2
";

pub const MALFORMED_GENOME_RESULTS: &str = ">>>>>>> Globals

     number of reads = 908,585,160

>>>>>>> Coverage per contig

\t1\tunknown\t7311413463\t29.33\t9.6
";

pub const QUALIMAP_REPORT: &str = "<tr>
    <td class=column1>P25/Median/P75</td>
    <td class=column2>318 / 369 / 422</td>
</tr>
";

pub const SNPEFF_SUMMARY: &str = "Number_of_variants_before_filter, 4004647
Change_rate , 772
Het , 2513055
Hom , 1491592
MISSENSE , 10483 , 54.312%
synonymous_variant , 8714 , 0.0642%
Ts_Tv_ratio , 2.0712
# Count by genomic region
Type , Count , Percent
DOWNSTREAM , 1200 , 12.0%
EXON , 300 , 3.0%
INTRON , 8500 , 85.0%

";

pub const MALFORMED_SNPEFF_SUMMARY: &str = "Het , 2513055\nMISSENSE , lots , 54.3%\n";

/// Writes a Picard metrics file with the given duplication fraction.
pub fn picard_metrics(fraction: &str) -> String {
    format!(
        "## METRICS CLASS\tpicard.sam.DuplicationMetrics\n{}\n\
         P1\t0\t100\t0\t0\t10\t1\t{}\t1000\n",
        METRICS_HEADER, fraction
    )
}

/// Which version of a source file to write for a sample.
#[derive(Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Good,
    Malformed,
    Missing,
}

fn write(path: &Path, contents: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, contents).unwrap();
}

/// Writes the source files of one sample into a project working directory.
pub fn write_sample(
    working_dir: &Path,
    sample_id: &str,
    coverage: Source,
    variants: Source,
    duplication: Source,
) {
    let paths = PipelinePaths::new(working_dir).sample(sample_id);

    match coverage {
        Source::Good => write(&paths.genome_results, GENOME_RESULTS),
        Source::Malformed => write(&paths.genome_results, MALFORMED_GENOME_RESULTS),
        Source::Missing => {}
    }

    if coverage != Source::Missing {
        write(&paths.qualimap_report, QUALIMAP_REPORT);
        write(
            &paths.coverage_histogram(),
            "#Coverage\tNumber of genomic locations\n0.0\t100.0\n1.0\t250.0\n2.0\t80.0\n",
        );
        write(
            &paths.genome_fraction_coverage(),
            "#Coverage (X)\tCoverage (%)\n1.0\t99.0\n10.0\t90.0\n30.0\t51.7\n",
        );
        write(
            &paths.insert_size_histogram(),
            "#Insert size\tOccurrences\n300.0\t40.0\n369.0\t90.0\n420.0\t30.0\n",
        );
        write(
            &paths.gc_content_distribution(),
            "#GC Content (%)\tSample\tHUMAN (hg19)\n40.0\t0.02\t0.021\n41.0\t0.03\t0.029\n",
        );
    }

    match variants {
        Source::Good => write(&paths.snpeff_summary, SNPEFF_SUMMARY),
        Source::Malformed => write(&paths.snpeff_summary, MALFORMED_SNPEFF_SUMMARY),
        Source::Missing => {}
    }

    match duplication {
        Source::Good => write(&paths.picard_metrics, &picard_metrics("0.1234")),
        Source::Malformed => write(&paths.picard_metrics, &picard_metrics("n/a")),
        Source::Missing => {}
    }
}

/// Collects everything logged through its [`Dispatch`] as plain text lines.
#[derive(Clone, Default)]
pub struct LogCapture(Arc<Mutex<Vec<u8>>>);

impl LogCapture {
    pub fn dispatch(&self) -> Dispatch {
        let writer = self.clone();
        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_max_level(tracing::Level::DEBUG)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .without_time()
            .finish();

        Dispatch::new(subscriber)
    }

    pub fn lines(&self) -> Vec<String> {
        let buffer = self.0.lock().unwrap();
        String::from_utf8_lossy(&buffer)
            .lines()
            .map(String::from)
            .collect()
    }

    /// The first captured line containing `needle`.
    pub fn find(&self, needle: &str) -> String {
        self.lines()
            .into_iter()
            .find(|line| line.contains(needle))
            .unwrap_or_else(|| panic!("nothing logged containing `{}`", needle))
    }
}

impl io::Write for LogCapture {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

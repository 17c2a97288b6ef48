use super::BatchSummary;
use crate::error::{Result, ScanError};
use std::fs::File;
use std::io::{LineWriter, Write};
use std::path::{Path, PathBuf};

/// Detailed per-file log, written into the scanned root
pub const RESULT_LOG: &str = "result.txt";
/// Per-file lines plus the run summary, written into the scanned root
pub const SUMMARY_REPORT: &str = "results.txt";

/// `"<name> → OK | a, b | Method: <method>"`
pub fn ok_line(name: &str, codes: &[String], method: &str) -> String {
    format!("{name} → OK | {} | Method: {method}", codes.join(", "))
}

/// `"<name> → NOK | <status>"`
pub fn nok_line(name: &str, status: &str) -> String {
    format!("{name} → NOK | {status}")
}

/// Trailing block of the summary report (also printed to the console)
pub fn summary_block(summary: &BatchSummary) -> String {
    format!(
        "Total files: {}\nSucceeded: {}\nFailed: {}\nSuccess rate: {:.2}%\nElapsed: {:.2} s\n",
        summary.total_scanned,
        summary.succeeded,
        summary.failed,
        summary.percent_ok(),
        summary.elapsed.as_secs_f64()
    )
}

/// The two report files of a run.
///
/// Both are line buffered, so an interrupted run keeps every finished line.
pub struct ReportWriter {
    result_log: LineWriter<File>,
    summary: LineWriter<File>,
    result_path: PathBuf,
    summary_path: PathBuf,
}

impl ReportWriter {
    /// Create (truncate) both report files in `root`
    pub fn create(root: &Path) -> Result<Self> {
        let result_path = root.join(RESULT_LOG);
        let summary_path = root.join(SUMMARY_REPORT);
        let result_log = open(&result_path)?;
        let summary = open(&summary_path)?;
        Ok(Self {
            result_log,
            summary,
            result_path,
            summary_path,
        })
    }

    /// Path of the detailed log
    pub fn result_path(&self) -> &Path {
        &self.result_path
    }

    /// Path of the summary report
    pub fn summary_path(&self) -> &Path {
        &self.summary_path
    }

    /// Append one per-file line to both reports
    pub fn record(&mut self, line: &str) -> Result<()> {
        writeln!(self.result_log, "{line}").map_err(|source| ScanError::Report {
            path: self.result_path.clone(),
            source,
        })?;
        writeln!(self.summary, "{line}").map_err(|source| ScanError::Report {
            path: self.summary_path.clone(),
            source,
        })
    }

    /// Append the summary block and flush both files
    pub fn finish(mut self, summary: &BatchSummary) -> Result<()> {
        self.result_log.flush().map_err(|source| ScanError::Report {
            path: self.result_path.clone(),
            source,
        })?;
        write!(self.summary, "\n{}", summary_block(summary))
            .and_then(|()| self.summary.flush())
            .map_err(|source| ScanError::Report {
                path: self.summary_path.clone(),
                source,
            })
    }
}

fn open(path: &Path) -> Result<LineWriter<File>> {
    File::create(path)
        .map(LineWriter::new)
        .map_err(|source| ScanError::Report {
            path: path.to_path_buf(),
            source,
        })
}

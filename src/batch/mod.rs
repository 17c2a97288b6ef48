//! Batch directory processing
//!
//! Runs the strategy chain over every image under a directory, one file at a
//! time, and writes two reports into the directory:
//! - `result.txt`: one line per file
//! - `results.txt`: the same lines followed by a run summary
//!
//! Decoded files can be moved into an `ok/` subdirectory so later runs skip
//! them.

/// Pre-flight checks and image discovery
pub mod discover;
/// Single-line progress indicator
pub mod progress;
/// `result.txt` and `results.txt` writers
pub mod report;

use crate::error::Result;
use crate::pipeline::ScanEngine;
use progress::Progress;
use report::{ReportWriter, nok_line, ok_line};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

pub use discover::discover_images;
pub use report::{RESULT_LOG, SUMMARY_REPORT, summary_block};

/// Subdirectory of the scanned root that receives decoded files
pub const OK_DIR: &str = "ok";

/// Per-run switches
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchOptions {
    /// Move decoded files into `ok/`
    pub move_on_success: bool,
    /// Draw the live progress line
    pub show_progress: bool,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            move_on_success: false,
            show_progress: true,
        }
    }
}

/// Counters and artifacts of a finished run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct BatchSummary {
    /// Files the chain was run on
    pub total_scanned: usize,
    /// Files with at least one code
    pub succeeded: usize,
    /// Files without codes, including unreadable ones
    pub failed: usize,
    /// Wall-clock time of the run
    pub elapsed: Duration,
    /// Files moved into `ok/`
    pub moved: usize,
    /// Decoded files that could not be moved
    pub move_failures: usize,
    /// Path of `result.txt`
    pub result_log: PathBuf,
    /// Path of `results.txt`
    pub summary_report: PathBuf,
}

impl BatchSummary {
    /// Share of decoded files in percent, 0 for an empty run
    pub fn percent_ok(&self) -> f64 {
        if self.total_scanned == 0 {
            0.0
        } else {
            self.succeeded as f64 * 100.0 / self.total_scanned as f64
        }
    }
}

/// Runs a [`ScanEngine`] over a directory tree
pub struct BatchProcessor<'a> {
    engine: &'a ScanEngine,
    options: BatchOptions,
}

impl<'a> BatchProcessor<'a> {
    /// Create a processor
    pub fn new(engine: &'a ScanEngine, options: BatchOptions) -> Self {
        Self { engine, options }
    }

    /// Scan every image under `root`.
    ///
    /// A missing, non-directory or image-less root fails before any report
    /// file is created. Per-file problems only mark that file as failed.
    pub fn run(&self, root: &Path) -> Result<BatchSummary> {
        let images = discover_images(root)?;
        info!(root = %root.display(), files = images.len(), "batch started");

        let mut report = ReportWriter::create(root)?;
        let mut summary = BatchSummary {
            result_log: report.result_path().to_path_buf(),
            summary_report: report.summary_path().to_path_buf(),
            ..BatchSummary::default()
        };
        let progress = Progress::new(images.len() as u64, self.options.show_progress);
        let ok_dir = root.join(OK_DIR);
        let started = Instant::now();

        for path in &images {
            let name = display_name(root, path);
            progress.start_file(&name);

            let line = match self.engine.scan_path(path) {
                Ok(result) if result.is_success() => {
                    summary.succeeded += 1;
                    if self.options.move_on_success {
                        match relocate(path, &ok_dir) {
                            Ok(dest) => {
                                summary.moved += 1;
                                debug!(from = %path.display(), to = %dest.display(), "moved");
                            }
                            Err(err) => {
                                summary.move_failures += 1;
                                warn!(path = %path.display(), error = %err, "failed to move decoded file");
                                progress.println(&format!("could not move {name}: {err}"));
                            }
                        }
                    }
                    let method = result.method().map(|m| m.to_string()).unwrap_or_default();
                    ok_line(&name, result.codes(), &method)
                }
                Ok(result) => {
                    summary.failed += 1;
                    nok_line(&name, result.status())
                }
                Err(err) => {
                    summary.failed += 1;
                    debug!(path = %path.display(), error = %err, "unreadable file");
                    nok_line(&name, &err.to_string())
                }
            };
            summary.total_scanned += 1;

            report.record(&line)?;
            progress.file_done();
        }

        summary.elapsed = started.elapsed();
        progress.finish();
        report.finish(&summary)?;

        info!(
            total = summary.total_scanned,
            succeeded = summary.succeeded,
            failed = summary.failed,
            "batch finished"
        );
        Ok(summary)
    }
}

/// Path relative to the scanned root, for report lines
fn display_name(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .into_owned()
}

/// Move `src` into `ok_dir` (created on first use), returning the new path.
///
/// A name already taken in `ok_dir` gets a ` (n)` suffix.
pub fn relocate(src: &Path, ok_dir: &Path) -> io::Result<PathBuf> {
    fs::create_dir_all(ok_dir)?;
    let file_name = src
        .file_name()
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let dest = unique_destination(ok_dir, Path::new(file_name));
    fs::rename(src, &dest)?;
    Ok(dest)
}

fn unique_destination(dir: &Path, file_name: &Path) -> PathBuf {
    let mut dest = dir.join(file_name);
    if !dest.exists() {
        return dest;
    }

    let stem = file_name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| "file".to_string());
    let ext = file_name
        .extension()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut counter = 1u32;
    loop {
        let candidate = if ext.is_empty() {
            format!("{stem} ({counter})")
        } else {
            format!("{stem} ({counter}).{ext}")
        };
        dest = dir.join(candidate);
        if !dest.exists() {
            return dest;
        }
        counter += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relocate_with_collision() {
        let dir = tempfile::tempdir().unwrap();
        let ok = dir.path().join(OK_DIR);
        let first = dir.path().join("a.png");
        std::fs::write(&first, b"1").unwrap();
        assert_eq!(relocate(&first, &ok).unwrap(), ok.join("a.png"));

        let second = dir.path().join("sub");
        std::fs::create_dir(&second).unwrap();
        let second = second.join("a.png");
        std::fs::write(&second, b"2").unwrap();
        let dest = relocate(&second, &ok).unwrap();
        assert_eq!(dest, ok.join("a (1).png"));
        assert!(!second.exists());
        assert_eq!(std::fs::read(dest).unwrap(), b"2");
    }

    #[test]
    fn test_percent_ok() {
        let summary = BatchSummary {
            total_scanned: 10,
            succeeded: 7,
            failed: 3,
            ..BatchSummary::default()
        };
        assert!((summary.percent_ok() - 70.0).abs() < 1e-9);
        assert_eq!(BatchSummary::default().percent_ok(), 0.0);
    }

    #[test]
    fn test_display_name_is_relative() {
        let root = Path::new("/scans");
        assert_eq!(display_name(root, Path::new("/scans/sub/x.png")), "sub/x.png");
    }
}

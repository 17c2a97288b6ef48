use super::report::{RESULT_LOG, SUMMARY_REPORT};
use super::OK_DIR;
use crate::error::{Result, ScanError};
use crate::scratch::SCRATCH_PREFIX;
use std::path::{Path, PathBuf};
use tracing::warn;
use walkdir::WalkDir;

/// Extensions treated as images (compared case-insensitively)
pub const IMAGE_EXTENSIONS: [&str; 8] = ["png", "jpg", "jpeg", "bmp", "gif", "tif", "tiff", "webp"];

/// Check that `root` is an existing directory
pub fn check_root(root: &Path) -> Result<()> {
    if !root.exists() {
        return Err(ScanError::RootNotFound(root.to_path_buf()));
    }
    if !root.is_dir() {
        return Err(ScanError::NotADirectory(root.to_path_buf()));
    }
    Ok(())
}

/// True for file names the batch should try to decode
pub fn is_candidate(name: &str) -> bool {
    if name.starts_with(SCRATCH_PREFIX) || name == RESULT_LOG || name == SUMMARY_REPORT {
        return false;
    }
    Path::new(name)
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.iter().any(|known| ext.eq_ignore_ascii_case(known)))
        .unwrap_or(false)
}

/// Every candidate image under `root`, recursively, sorted by path.
///
/// The root's `ok/` subtree is not entered. Unreadable directory entries are
/// logged and skipped.
pub fn discover_images(root: &Path) -> Result<Vec<PathBuf>> {
    check_root(root)?;

    let mut images = Vec::new();
    let walker = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !(entry.depth() == 1 && entry.file_type().is_dir() && entry.file_name() == OK_DIR));

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(err) => {
                warn!(error = %err, "skipping unreadable entry");
                continue;
            }
        };
        if entry.file_type().is_file() && is_candidate(&entry.file_name().to_string_lossy()) {
            images.push(entry.into_path());
        }
    }

    if images.is_empty() {
        return Err(ScanError::NoImages(root.to_path_buf()));
    }
    images.sort();
    Ok(images)
}

//! Error types for scanning and batch triage

use std::path::PathBuf;
use thiserror::Error;

/// Result type for barscan operations
pub type Result<T> = std::result::Result<T, ScanError>;

/// Errors surfaced by the scanner and the batch processor.
///
/// "No barcode found" is not an error: it is a normal [`crate::DecodeResult`]
/// with no codes.
#[derive(Error, Debug)]
pub enum ScanError {
    /// File could not be opened (missing, permission denied, ...)
    #[error("cannot open {}: {source}", path.display())]
    Open {
        /// Offending file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// File opened but its bytes are not a decodable raster image
    #[error("cannot decode image {}: {source}", path.display())]
    Decode {
        /// Offending file
        path: PathBuf,
        /// Underlying codec error
        #[source]
        source: image::ImageError,
    },

    /// Batch root does not exist
    #[error("directory not found: {}", .0.display())]
    RootNotFound(PathBuf),

    /// Batch root exists but is not a directory
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Batch root contains no image files
    #[error("no image files found in {}", .0.display())]
    NoImages(PathBuf),

    /// A report file could not be created or written
    #[error("cannot write report {}: {source}", path.display())]
    Report {
        /// Report file
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Configuration failed validation
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ScanError {
    /// True for errors that belong to a single file rather than the whole run.
    pub fn is_per_file(&self) -> bool {
        matches!(self, ScanError::Open { .. } | ScanError::Decode { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn per_file_classification() {
        let open = ScanError::Open {
            path: PathBuf::from("a.png"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(open.is_per_file());
        assert!(!ScanError::RootNotFound(PathBuf::from("/nope")).is_per_file());
        assert!(!ScanError::NoImages(PathBuf::from("/empty")).is_per_file());
    }

    #[test]
    fn display_mentions_path() {
        let err = ScanError::NotADirectory(PathBuf::from("/tmp/file.png"));
        assert_eq!(err.to_string(), "not a directory: /tmp/file.png");
    }
}

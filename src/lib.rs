//! barscan - barcode and QR triage for degraded photographs
//!
//! Decodes barcodes from tilted, low-contrast, rotated or blurry photos by
//! running a chain of increasingly expensive recovery strategies, and sorts a
//! whole directory of such photos into decoded and failed buckets with a
//! report.

#![warn(missing_docs)]
#![allow(clippy::missing_docs_in_private_items)]

/// Directory triage (discovery, reports, relocation into `ok/`)
pub mod batch;
/// Scan configuration and environment overrides
pub mod config;
/// Decode primitives (in-memory `rxing` and `rqrr`, `zbarimg`)
pub mod decoder;
/// Error types
pub mod error;
/// Core data structures (ImageAsset, DecodeResult, CropRegion, Rotation)
pub mod models;
/// OCR engine capability and token filtering
pub mod ocr;
/// Strategy chain and rotation retry
pub mod pipeline;
/// Crop detection and enhancement
pub mod preprocess;
/// Scoped temporary files for path-based tools
pub mod scratch;
/// Pixel kernels beyond imageproc (grayscale, CLAHE, NL-means, gradient map)
pub mod utils;

pub use batch::{BatchOptions, BatchProcessor, BatchSummary};
pub use config::ScanConfig;
pub use error::{Result, ScanError};
pub use models::{CropRegion, DecodeResult, ImageAsset, Method, Rotation};
pub use pipeline::ScanEngine;

use image::DynamicImage;
use std::path::Path;

/// Decode barcodes in an image file with the default engine.
///
/// Configuration comes from the `BARSCAN_*` environment variables. Fails only
/// for files that cannot be opened or decoded as images.
pub fn scan_file<P: AsRef<Path>>(path: P) -> Result<DecodeResult> {
    let config = ScanConfig::from_env();
    config.validate()?;
    ScanEngine::with_defaults(config).scan_path(path.as_ref())
}

/// Decode barcodes in an in-memory image with the default engine
pub fn scan_image(image: &DynamicImage) -> DecodeResult {
    ScanEngine::with_defaults(ScanConfig::from_env()).scan_image(image)
}

/// Triage every image under `root` with the default engine
pub fn scan_directory<P: AsRef<Path>>(root: P, options: BatchOptions) -> Result<BatchSummary> {
    let config = ScanConfig::from_env();
    config.validate()?;
    let engine = ScanEngine::with_defaults(config);
    BatchProcessor::new(&engine, options).run(root.as_ref())
}

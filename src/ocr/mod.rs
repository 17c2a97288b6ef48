//! OCR fallback
//!
//! Last-resort text recognition. The engine is a capability that may be
//! absent; when it is, the OCR strategy is simply left out of the chain.

/// `tesseract` command-line engine
pub mod tesseract;
/// Barcode-like token extraction from OCR text
pub mod tokens;

use image::DynamicImage;
use std::io;

pub use tesseract::TesseractCli;
pub use tokens::extract_tokens;

/// A text recognition capability
pub trait OcrEngine {
    /// Short engine name for diagnostics
    fn name(&self) -> &str;

    /// Whether the engine can run on this machine
    fn is_available(&self) -> bool;

    /// Raw recognized text
    fn recognize_text(&self, image: &DynamicImage) -> io::Result<String>;
}

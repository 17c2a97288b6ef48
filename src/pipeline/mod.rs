//! Strategy chain
//!
//! Pipeline overview:
//! 1. Decode the image as loaded
//! 2. Crop to the most barcode-like area, enhance, decode
//! 3. Rotation retry on the enhanced crop
//! 4. Strong enhancement of the crop, decode
//! 5. Rotation retry on the original
//! 6. OCR tokens, when an OCR engine is available
//!
//! The chain stops at the first strategy that yields codes.

/// Rotated copies and the rotation retry loop
pub mod rotation;
/// Named strategies and the memoised per-image attempt
pub mod strategy;

use crate::config::ScanConfig;
use crate::decoder::DecoderStack;
use crate::error::Result;
use crate::models::{DecodeResult, ImageAsset, Method};
use crate::ocr::{OcrEngine, TesseractCli};
use crate::preprocess::{Preprocess, StandardPreprocessor};
use image::DynamicImage;
use std::path::Path;
use tracing::debug;

pub use rotation::{retry_rotations, rotate};
pub use strategy::{Attempt, Found, OCR_TAG, Strategy};

/// Everything one chain run needs: configuration and capabilities
pub struct ScanEngine {
    config: ScanConfig,
    decoders: DecoderStack,
    preprocessor: Box<dyn Preprocess>,
    ocr: Option<Box<dyn OcrEngine>>,
}

impl ScanEngine {
    /// Engine from explicit parts, without OCR
    pub fn new(config: ScanConfig, decoders: DecoderStack, preprocessor: Box<dyn Preprocess>) -> Self {
        Self {
            config,
            decoders,
            preprocessor,
            ocr: None,
        }
    }

    /// Engine with the system decoders, the standard preprocessor and
    /// `tesseract` when it is installed
    pub fn with_defaults(config: ScanConfig) -> Self {
        let decoders = DecoderStack::system_default(&config);
        let preprocessor = Box::new(StandardPreprocessor::from_config(&config));
        let tesseract = TesseractCli::new(config.scratch_dir.clone());
        Self::new(config, decoders, preprocessor).with_ocr(tesseract)
    }

    /// Attach an OCR engine (used only if it reports available)
    pub fn with_ocr<E: OcrEngine + 'static>(mut self, engine: E) -> Self {
        self.ocr = Some(Box::new(engine));
        self
    }

    /// Drop the OCR engine
    pub fn without_ocr(mut self) -> Self {
        self.ocr = None;
        self
    }

    /// Run configuration
    pub fn config(&self) -> &ScanConfig {
        &self.config
    }

    /// Decode primitives
    pub fn decoders(&self) -> &DecoderStack {
        &self.decoders
    }

    /// Image preprocessor
    pub fn preprocessor(&self) -> &dyn Preprocess {
        self.preprocessor.as_ref()
    }

    /// OCR engine, only when it is available
    pub fn ocr(&self) -> Option<&dyn OcrEngine> {
        self.ocr.as_deref().filter(|engine| engine.is_available())
    }

    /// The chain for this engine, in order
    pub fn strategies(&self) -> Vec<Strategy> {
        let mut strategies = strategy::IMAGE_STRATEGIES.to_vec();
        if self.ocr().is_some() {
            strategies.push(strategy::OCR_STRATEGY);
        }
        strategies
    }

    /// Run the chain on an in-memory image. Never fails.
    pub fn scan_image(&self, image: &DynamicImage) -> DecodeResult {
        let attempt = Attempt::new(image);
        let mut attempted = Vec::new();

        for strategy in self.strategies() {
            attempted.push(strategy.name);
            debug!(strategy = strategy.name, "trying strategy");
            if let Some(found) = (strategy.run)(self, &attempt) {
                debug!(strategy = strategy.name, tag = %found.tag, codes = found.codes.len(), "decoded");
                return DecodeResult::found(
                    found.codes,
                    Method::new(found.tag, strategy.name),
                    attempted,
                );
            }
        }

        DecodeResult::not_found(attempted)
    }

    /// Run the chain on a loaded asset
    pub fn scan_asset(&self, asset: &ImageAsset) -> DecodeResult {
        debug!(path = %asset.path().display(), "scanning");
        self.scan_image(asset.image())
    }

    /// Load `path` and run the chain.
    ///
    /// Fails only when the file cannot be opened or decoded as an image.
    pub fn scan_path(&self, path: &Path) -> Result<DecodeResult> {
        let asset = ImageAsset::load(path, self.config.max_dimension)?;
        Ok(self.scan_asset(&asset))
    }
}

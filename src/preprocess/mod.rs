//! Image preprocessing
//!
//! Alternate renderings of a photograph that are more likely to be machine
//! readable than the original. All operations are pure functions over pixel
//! buffers: no file I/O, no global state.

/// Barcode-region detection from the gradient map
pub mod crop;
/// Light and strong enhancement renderings
pub mod enhance;

use crate::config::{CropConfig, EnhanceConfig, ScanConfig};
use crate::models::CropRegion;
use image::DynamicImage;

pub use crop::detect_crop_region;
pub use enhance::{enhance_contrast_sharpen, enhance_strong};

/// The preprocessing capability used by the strategy chain.
///
/// A trait so the chain can be driven (and instrumented) with other
/// implementations.
pub trait Preprocess {
    /// Bounding box of the most barcode-like area, if any
    fn detect_crop_region(&self, image: &DynamicImage) -> Option<CropRegion>;

    /// Light enhancement: CLAHE then a 3x3 sharpen
    fn enhance_contrast_sharpen(&self, image: &DynamicImage) -> DynamicImage;

    /// Heavy enhancement: upscale, unsharp mask, denoise, Otsu binarize
    fn enhance_strong(&self, image: &DynamicImage) -> DynamicImage;
}

/// Preprocessor backed by the kernels in [`crate::utils`]
#[derive(Debug, Clone, Default)]
pub struct StandardPreprocessor {
    crop: CropConfig,
    enhance: EnhanceConfig,
}

impl StandardPreprocessor {
    /// Create a preprocessor with explicit parameters
    pub fn new(crop: CropConfig, enhance: EnhanceConfig) -> Self {
        Self { crop, enhance }
    }

    /// Create a preprocessor from a scan configuration
    pub fn from_config(config: &ScanConfig) -> Self {
        Self::new(config.crop.clone(), config.enhance.clone())
    }
}

impl Preprocess for StandardPreprocessor {
    fn detect_crop_region(&self, image: &DynamicImage) -> Option<CropRegion> {
        detect_crop_region(image, &self.crop)
    }

    fn enhance_contrast_sharpen(&self, image: &DynamicImage) -> DynamicImage {
        enhance_contrast_sharpen(image, &self.enhance)
    }

    fn enhance_strong(&self, image: &DynamicImage) -> DynamicImage {
        enhance_strong(image, &self.enhance)
    }
}

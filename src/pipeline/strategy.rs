//! The ordered decode strategies
//!
//! Each strategy has the same shape: it reads the shared [`Attempt`] and
//! either returns codes or nothing. Cheap strategies come first.

use super::ScanEngine;
use super::rotation::retry_rotations;
use crate::decoder::Decoded;
use crate::models::CropRegion;
use crate::ocr::extract_tokens;
use image::{DynamicImage, GenericImageView};
use std::cell::OnceCell;
use tracing::{debug, warn};

/// Method tag of OCR-derived results
pub const OCR_TAG: &str = "ocr";

/// Codes produced by one strategy, tagged with their producer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Found {
    /// Decoded payloads as text, never empty
    pub codes: Vec<String>,
    /// Decode primitive name, or [`OCR_TAG`]
    pub tag: String,
}

impl From<Decoded> for Found {
    fn from(decoded: Decoded) -> Self {
        Self {
            codes: decoded.codes(),
            tag: decoded.primitive,
        }
    }
}

/// A named step of the chain
#[derive(Clone, Copy)]
pub struct Strategy {
    /// Stable name used in diagnostics and results
    pub name: &'static str,
    /// The step itself
    pub run: fn(&ScanEngine, &Attempt<'_>) -> Option<Found>,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Strategy").field("name", &self.name).finish()
    }
}

/// One image going through the chain.
///
/// The crop and its light enhancement are computed at most once and only when
/// a strategy asks for them.
pub struct Attempt<'a> {
    image: &'a DynamicImage,
    region: OnceCell<Option<CropRegion>>,
    cropped: OnceCell<Option<DynamicImage>>,
    enhanced: OnceCell<Option<DynamicImage>>,
}

impl<'a> Attempt<'a> {
    /// Start an attempt on `image`
    pub fn new(image: &'a DynamicImage) -> Self {
        Self {
            image,
            region: OnceCell::new(),
            cropped: OnceCell::new(),
            enhanced: OnceCell::new(),
        }
    }

    /// The image as loaded
    pub fn image(&self) -> &DynamicImage {
        self.image
    }

    /// Detected crop, expanded by the configured margin
    pub fn region(&self, engine: &ScanEngine) -> Option<CropRegion> {
        *self.region.get_or_init(|| {
            let (w, h) = self.image.dimensions();
            let region = engine
                .preprocessor()
                .detect_crop_region(self.image)
                .map(|r| r.expand(engine.config().crop.margin, w, h))
                .filter(|r| r.width > 0 && r.height > 0);
            debug!(?region, "crop region");
            region
        })
    }

    /// The image cut down to [`Attempt::region`]
    pub fn cropped(&self, engine: &ScanEngine) -> Option<&DynamicImage> {
        self.cropped
            .get_or_init(|| {
                self.region(engine)
                    .map(|r| self.image.crop_imm(r.x, r.y, r.width, r.height))
            })
            .as_ref()
    }

    /// The crop after contrast enhancement and sharpening
    pub fn enhanced_crop(&self, engine: &ScanEngine) -> Option<&DynamicImage> {
        self.enhanced
            .get_or_init(|| {
                self.cropped(engine)
                    .map(|crop| engine.preprocessor().enhance_contrast_sharpen(crop))
            })
            .as_ref()
    }
}

/// The image-based strategies, in chain order
pub(crate) const IMAGE_STRATEGIES: [Strategy; 5] = [
    Strategy {
        name: "original",
        run: decode_original,
    },
    Strategy {
        name: "crop_enhance",
        run: decode_crop_enhance,
    },
    Strategy {
        name: "crop_enhance_rotate",
        run: decode_crop_enhance_rotate,
    },
    Strategy {
        name: "crop_strong",
        run: decode_crop_strong,
    },
    Strategy {
        name: "rotate_original",
        run: decode_rotate_original,
    },
];

/// OCR rescue; only part of the chain when an engine is available
pub(crate) const OCR_STRATEGY: Strategy = Strategy {
    name: OCR_TAG,
    run: recognize_tokens,
};

fn decode_original(engine: &ScanEngine, attempt: &Attempt<'_>) -> Option<Found> {
    engine.decoders().decode(attempt.image()).map(Found::from)
}

fn decode_crop_enhance(engine: &ScanEngine, attempt: &Attempt<'_>) -> Option<Found> {
    let enhanced = attempt.enhanced_crop(engine)?;
    engine.decoders().decode(enhanced).map(Found::from)
}

fn decode_crop_enhance_rotate(engine: &ScanEngine, attempt: &Attempt<'_>) -> Option<Found> {
    let enhanced = attempt.enhanced_crop(engine)?;
    retry_rotations(engine.decoders(), enhanced, &engine.config().rotations)
        .map(|(_, decoded)| decoded.into())
}

fn decode_crop_strong(engine: &ScanEngine, attempt: &Attempt<'_>) -> Option<Found> {
    let cropped = attempt.cropped(engine)?;
    let strong = engine.preprocessor().enhance_strong(cropped);
    engine.decoders().decode(&strong).map(Found::from)
}

fn decode_rotate_original(engine: &ScanEngine, attempt: &Attempt<'_>) -> Option<Found> {
    retry_rotations(engine.decoders(), attempt.image(), &engine.config().rotations)
        .map(|(_, decoded)| decoded.into())
}

fn recognize_tokens(engine: &ScanEngine, attempt: &Attempt<'_>) -> Option<Found> {
    let ocr = engine.ocr()?;
    let text = match ocr.recognize_text(attempt.image()) {
        Ok(text) => text,
        Err(err) => {
            warn!(engine = ocr.name(), error = %err, "OCR failed");
            return None;
        }
    };

    let codes = extract_tokens(&text, engine.config().ocr_tokens);
    debug!(engine = ocr.name(), tokens = codes.len(), "OCR tokens");
    if codes.is_empty() {
        return None;
    }
    Some(Found {
        codes,
        tag: OCR_TAG.to_string(),
    })
}

//! Scan configuration
//!
//! Defaults, then environment overrides, then whatever the caller (usually the
//! CLI) sets explicitly. A config is read-only for the duration of a run.

use crate::error::{Result, ScanError};
use crate::models::Rotation;
use std::env;
use std::path::PathBuf;

/// Largest closing-kernel side accepted by [`ScanConfig::validate`]
pub const MAX_CLOSE_KERNEL: u32 = 511;

/// Crop-region detection parameters (gradient + morphology).
#[derive(Debug, Clone, PartialEq)]
pub struct CropConfig {
    /// Box blur kernel applied to the gradient map (odd, pixels)
    pub blur_kernel: u32,
    /// Gradient level above which a pixel counts as "bar-like"
    pub gradient_threshold: u8,
    /// Closing kernel (width, height); wide to bridge gaps between bars.
    /// Each side must be below 512.
    pub close_kernel: (u32, u32),
    /// Erode then dilate iterations with a 3x3 kernel
    pub morph_iterations: u32,
    /// Extra pixels kept around the detected blob when cropping
    pub margin: u32,
}

impl Default for CropConfig {
    fn default() -> Self {
        Self {
            blur_kernel: 9,
            gradient_threshold: 225,
            close_kernel: (21, 7),
            morph_iterations: 4,
            margin: 10,
        }
    }
}

/// Enhancement parameters for the light and strong renderings.
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceConfig {
    /// CLAHE clip limit (multiple of the uniform bin height)
    pub clahe_clip_limit: f32,
    /// CLAHE tile grid (tiles per side)
    pub clahe_tiles: usize,
    /// Upscale factor for the strong rendering
    pub upscale_factor: u32,
    /// Gaussian sigma of the unsharp mask
    pub unsharp_sigma: f32,
    /// Weight of the original in the unsharp mask (blur gets `1 - amount`)
    pub unsharp_amount: f32,
    /// Most pixels the upscaled strong rendering may have; larger inputs
    /// are upscaled by less than `upscale_factor`
    pub strong_max_pixels: u64,
    /// Non-local means filter strength `h`
    pub nlm_strength: f32,
    /// Non-local means patch radius
    pub nlm_patch_radius: usize,
    /// Non-local means search window radius
    pub nlm_search_radius: usize,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            upscale_factor: 3,
            unsharp_sigma: 3.0,
            unsharp_amount: 1.5,
            strong_max_pixels: 2_000_000,
            nlm_strength: 30.0,
            nlm_patch_radius: 1,
            nlm_search_radius: 5,
        }
    }
}

/// Which OCR tokens look like barcode payloads.
///
/// Uppercase alphanumeric runs between `min_len` and `max_len` characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenPolicy {
    /// Shortest accepted token
    pub min_len: usize,
    /// Longest accepted token
    pub max_len: usize,
}

impl Default for TokenPolicy {
    fn default() -> Self {
        Self {
            min_len: 8,
            max_len: 20,
        }
    }
}

/// Full scanner configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct ScanConfig {
    /// Rotation angles tried by the rotation retry, in order
    pub rotations: Vec<Rotation>,
    /// Crop detection parameters
    pub crop: CropConfig,
    /// Enhancement parameters
    pub enhance: EnhanceConfig,
    /// OCR token filter
    pub ocr_tokens: TokenPolicy,
    /// Downscale images whose longest side exceeds this
    pub max_dimension: Option<u32>,
    /// Where scratch images for path-based tools go (system temp dir if unset)
    pub scratch_dir: Option<PathBuf>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            rotations: vec![Rotation::Deg90, Rotation::Deg180, Rotation::Deg270],
            crop: CropConfig::default(),
            enhance: EnhanceConfig::default(),
            ocr_tokens: TokenPolicy::default(),
            max_dimension: None,
            scratch_dir: None,
        }
    }
}

impl ScanConfig {
    /// Defaults plus `BARSCAN_*` environment overrides.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Defaults plus overrides read through `lookup`.
    ///
    /// Values that do not parse are ignored and the default is kept.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(rotations) = lookup("BARSCAN_ROTATIONS").and_then(|v| parse_rotations(&v).ok()) {
            config.rotations = rotations;
        }
        if let Some(value) = lookup("BARSCAN_MAX_DIM") {
            match value.trim().parse::<u32>() {
                Ok(0) => config.max_dimension = None,
                Ok(v) => config.max_dimension = Some(v),
                Err(_) => {}
            }
        }
        if let Some(v) = lookup("BARSCAN_OCR_MIN").and_then(|v| v.trim().parse().ok()) {
            config.ocr_tokens.min_len = v;
        }
        if let Some(v) = lookup("BARSCAN_OCR_MAX").and_then(|v| v.trim().parse().ok()) {
            config.ocr_tokens.max_len = v;
        }
        if let Some(v) = lookup("BARSCAN_STRONG_MAX_PIXELS").and_then(|v| v.trim().parse().ok()) {
            config.enhance.strong_max_pixels = v;
        }
        if let Some(dir) = lookup("BARSCAN_SCRATCH_DIR") {
            if !dir.trim().is_empty() {
                config.scratch_dir = Some(PathBuf::from(dir.trim()));
            }
        }

        config
    }

    /// Reject configurations the pipeline cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.rotations.is_empty() {
            return Err(ScanError::InvalidConfig("rotation set is empty".into()));
        }
        let crop = &self.crop;
        if crop.blur_kernel == 0 || crop.close_kernel.0 == 0 || crop.close_kernel.1 == 0 {
            return Err(ScanError::InvalidConfig("crop kernel sizes must be non-zero".into()));
        }
        if crop.close_kernel.0 > MAX_CLOSE_KERNEL || crop.close_kernel.1 > MAX_CLOSE_KERNEL {
            return Err(ScanError::InvalidConfig(format!(
                "closing kernel sides must be at most {MAX_CLOSE_KERNEL}"
            )));
        }
        let tokens = &self.ocr_tokens;
        if tokens.min_len == 0 || tokens.min_len > tokens.max_len {
            return Err(ScanError::InvalidConfig(format!(
                "OCR token bounds {}..={} are not a valid range",
                tokens.min_len, tokens.max_len
            )));
        }
        if self.enhance.upscale_factor == 0
            || self.enhance.clahe_tiles == 0
            || self.enhance.strong_max_pixels == 0
        {
            return Err(ScanError::InvalidConfig("enhancement factors must be non-zero".into()));
        }
        Ok(())
    }
}

/// Parse a comma-separated angle list such as `"90,180,270"`.
pub fn parse_rotations(value: &str) -> Result<Vec<Rotation>> {
    let mut rotations = Vec::new();
    for token in value.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let rotation = token
            .parse::<Rotation>()
            .map_err(|_| ScanError::InvalidConfig(format!("unsupported rotation angle: {token}")))?;
        if !rotations.contains(&rotation) {
            rotations.push(rotation);
        }
    }
    if rotations.is_empty() {
        return Err(ScanError::InvalidConfig("rotation set is empty".into()));
    }
    Ok(rotations)
}

use crate::config::EnhanceConfig;
use crate::utils::filters::{clahe, nl_means_denoise, upscale_within_budget};
use crate::utils::grayscale::to_gray;
use image::DynamicImage;
use imageproc::contrast::{otsu_level, threshold, ThresholdType};
use imageproc::filter::{sharpen3x3, sharpen_gaussian};
use tracing::debug;

/// Grayscale, CLAHE, then a fixed 3x3 sharpen.
///
/// Deterministic: identical input yields byte-identical output. Meant to run
/// once; applying it twice is not a no-op.
pub fn enhance_contrast_sharpen(image: &DynamicImage, config: &EnhanceConfig) -> DynamicImage {
    let gray = to_gray(image);
    let equalized = clahe(&gray, config.clahe_tiles, config.clahe_clip_limit);
    DynamicImage::ImageLuma8(sharpen3x3(&equalized))
}

/// Grayscale, cubic upscale, unsharp mask, non-local means, Otsu binarize.
///
/// Much slower than [`enhance_contrast_sharpen`]; output is pure black/white.
/// The upscale is capped at `strong_max_pixels`, which bounds the cost of
/// the denoise step.
pub fn enhance_strong(image: &DynamicImage, config: &EnhanceConfig) -> DynamicImage {
    let gray = to_gray(image);
    let upscaled = upscale_within_budget(&gray, config.upscale_factor, config.strong_max_pixels);
    debug!(
        from = ?gray.dimensions(),
        to = ?upscaled.dimensions(),
        "strong enhancement upscale"
    );
    // sharpen_gaussian computes (1 + a) * original - a * blur
    let sharpened = if config.unsharp_sigma > 0.0 {
        sharpen_gaussian(&upscaled, config.unsharp_sigma, config.unsharp_amount - 1.0)
    } else {
        upscaled
    };
    let denoised = nl_means_denoise(
        &sharpened,
        config.nlm_strength,
        config.nlm_patch_radius,
        config.nlm_search_radius,
    );
    let level = otsu_level(&denoised);
    DynamicImage::ImageLuma8(threshold(&denoised, level, ThresholdType::Binary))
}

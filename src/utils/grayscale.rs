//! Luminance conversion
//!
//! Y = 0.299*R + 0.587*G + 0.114*B with fast integer arithmetic:
//! Y = (76*R + 150*G + 29*B) >> 8, rows processed in parallel.

use image::{DynamicImage, GrayImage, RgbImage};
use rayon::prelude::*;

/// Coefficients for grayscale conversion: Y = (76*R + 150*G + 29*B) >> 8
const COEF_R: u32 = 76;
const COEF_G: u32 = 150;
const COEF_B: u32 = 29;

#[inline]
fn luminance(r: u8, g: u8, b: u8) -> u8 {
    let lum = (COEF_R * r as u32 + COEF_G * g as u32 + COEF_B * b as u32) >> 8;
    lum.min(255) as u8
}

/// Convert any image to 8-bit grayscale.
///
/// 8-bit gray input is copied as is; everything else goes through RGB.
pub fn to_gray(image: &DynamicImage) -> GrayImage {
    match image {
        DynamicImage::ImageLuma8(gray) => gray.clone(),
        other => rgb_to_gray(&other.to_rgb8()),
    }
}

/// Convert an RGB image to grayscale, one row per rayon task
pub fn rgb_to_gray(rgb: &RgbImage) -> GrayImage {
    let (width, height) = rgb.dimensions();
    let mut gray = GrayImage::new(width, height);
    if width == 0 || height == 0 {
        return gray;
    }

    let src = rgb.as_raw();
    let row_len = width as usize;
    gray.par_chunks_mut(row_len).enumerate().for_each(|(y, row)| {
        let row_start = y * row_len * 3;
        for (x, out) in row.iter_mut().enumerate() {
            let idx = row_start + x * 3;
            *out = luminance(src[idx], src[idx + 1], src[idx + 2]);
        }
    });

    gray
}

/// Summary statistics for grayscale data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GrayStats {
    /// Minimum grayscale value.
    pub min: u8,
    /// Maximum grayscale value.
    pub max: u8,
    /// Average grayscale value.
    pub avg: u8,
}

/// Compute min/max/avg for grayscale values.
pub fn gray_stats(gray: &GrayImage) -> GrayStats {
    let mut min = u8::MAX;
    let mut max = u8::MIN;
    let mut sum: u64 = 0;
    for &v in gray.as_raw() {
        min = min.min(v);
        max = max.max(v);
        sum += v as u64;
    }
    let len = gray.as_raw().len();
    if len == 0 {
        return GrayStats { min: 0, max: 0, avg: 0 };
    }
    GrayStats {
        min,
        max,
        avg: (sum / len as u64) as u8,
    }
}

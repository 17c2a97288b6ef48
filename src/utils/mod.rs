//! Raster primitives for the preprocessing cascade
//!
//! Thresholding, morphology and connected components come from `imageproc`;
//! what it lacks lives here.

/// Gradient map, CLAHE, budgeted upscale and non-local means
pub mod filters;
/// RGB to luminance conversion and gray-level statistics
pub mod grayscale;

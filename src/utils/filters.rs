//! Pixel filters used by the preprocessing cascade
//!
//! Everything here is a pure function of its input: no global state, and rows
//! processed in parallel write disjoint output so results are byte-identical
//! from run to run.

use image::imageops::{self, FilterType};
use image::{GrayImage, Luma};
use imageproc::gradients::{horizontal_scharr, vertical_scharr};
use imageproc::map::map_colors2;
use rayon::prelude::*;

#[inline]
fn clamp_coord(v: isize, max: usize) -> usize {
    v.clamp(0, max as isize - 1) as usize
}

fn from_rows(width: u32, height: u32, data: Vec<u8>, fallback: &GrayImage) -> GrayImage {
    GrayImage::from_raw(width, height, data).unwrap_or_else(|| fallback.clone())
}

/// Horizontal-dominant gradient map: `|Gx| - |Gy|` of the Scharr operator,
/// saturated to 0..=255. Vertical bar patterns light up, text and edges along
/// the x axis are suppressed.
pub fn horizontal_gradient_map(gray: &GrayImage) -> GrayImage {
    let gx = horizontal_scharr(gray);
    let gy = vertical_scharr(gray);
    map_colors2(&gx, &gy, |x, y| {
        let v = i32::from(x[0]).abs() - i32::from(y[0]).abs();
        Luma([v.clamp(0, 255) as u8])
    })
}

/// Contrast-limited adaptive histogram equalization.
///
/// Each tile gets a clipped-histogram CDF lookup table; pixels are mapped by
/// bilinear interpolation between the four nearest tiles.
pub fn clahe(gray: &GrayImage, tiles: usize, clip_limit: f32) -> GrayImage {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 || tiles == 0 {
        return gray.clone();
    }
    let tiles_x = tiles.min(w);
    let tiles_y = tiles.min(h);
    let tile_w = w / tiles_x;
    let tile_h = h / tiles_y;
    let src = gray.as_raw();

    // 1. Clipped histogram + CDF mapping per tile
    let maps: Vec<[u8; 256]> = (0..tiles_x * tiles_y)
        .into_par_iter()
        .map(|idx| {
            let (tx, ty) = (idx % tiles_x, idx / tiles_x);
            let x0 = tx * tile_w;
            let y0 = ty * tile_h;
            let x1 = if tx == tiles_x - 1 { w } else { x0 + tile_w };
            let y1 = if ty == tiles_y - 1 { h } else { y0 + tile_h };
            let tile_pixels = (x1 - x0) * (y1 - y0);

            let mut hist = [0u32; 256];
            for row in y0..y1 {
                for &v in &src[row * w + x0..row * w + x1] {
                    hist[v as usize] += 1;
                }
            }

            // Clip and redistribute
            let clip = ((clip_limit * tile_pixels as f32 / 256.0) as u32).max(1);
            let mut excess = 0u32;
            for bin in hist.iter_mut() {
                if *bin > clip {
                    excess += *bin - clip;
                    *bin = clip;
                }
            }
            let per_bin = excess / 256;
            let remainder = (excess % 256) as usize;
            for (i, bin) in hist.iter_mut().enumerate() {
                *bin += per_bin;
                if i < remainder {
                    *bin += 1;
                }
            }

            let mut map = [0u8; 256];
            let mut cdf = 0u32;
            let total = tile_pixels as f32;
            for (i, &count) in hist.iter().enumerate() {
                cdf += count;
                map[i] = ((cdf as f32 / total) * 255.0).round().min(255.0) as u8;
            }
            map
        })
        .collect();

    // 2. Bilinear interpolation between neighbouring tile maps
    let tw_f = tile_w as f32;
    let th_f = tile_h as f32;
    let mut out = vec![0u8; w * h];
    out.par_chunks_mut(w).enumerate().for_each(|(y, row)| {
        let fy = (y as f32 + 0.5) / th_f - 0.5;
        let ty0 = (fy.floor() as isize).clamp(0, tiles_y as isize - 1) as usize;
        let ty1 = (fy.floor() as isize + 1).clamp(0, tiles_y as isize - 1) as usize;
        let ay = (fy - fy.floor()).clamp(0.0, 1.0);

        for (x, dst) in row.iter_mut().enumerate() {
            let pixel = src[y * w + x] as usize;
            let fx = (x as f32 + 0.5) / tw_f - 0.5;
            let tx0 = (fx.floor() as isize).clamp(0, tiles_x as isize - 1) as usize;
            let tx1 = (fx.floor() as isize + 1).clamp(0, tiles_x as isize - 1) as usize;
            let ax = (fx - fx.floor()).clamp(0.0, 1.0);

            let v00 = maps[ty0 * tiles_x + tx0][pixel] as f32;
            let v10 = maps[ty0 * tiles_x + tx1][pixel] as f32;
            let v01 = maps[ty1 * tiles_x + tx0][pixel] as f32;
            let v11 = maps[ty1 * tiles_x + tx1][pixel] as f32;

            let top = v00 * (1.0 - ax) + v10 * ax;
            let bot = v01 * (1.0 - ax) + v11 * ax;
            *dst = (top * (1.0 - ay) + bot * ay).round().clamp(0.0, 255.0) as u8;
        }
    });

    from_rows(width, height, out, gray)
}

/// Cubic (Catmull-Rom) upscale by `factor`, shrunk so the result has at
/// most `max_pixels` pixels. Aspect ratio is kept; the result is never
/// smaller than 1x1.
pub fn upscale_within_budget(gray: &GrayImage, factor: u32, max_pixels: u64) -> GrayImage {
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return gray.clone();
    }
    let (w, h) = budget_dimensions(w, h, factor.max(1), max_pixels);
    if (w, h) == gray.dimensions() {
        return gray.clone();
    }
    imageops::resize(gray, w, h, FilterType::CatmullRom)
}

fn budget_dimensions(w: u32, h: u32, factor: u32, max_pixels: u64) -> (u32, u32) {
    let full_w = u64::from(w) * u64::from(factor);
    let full_h = u64::from(h) * u64::from(factor);
    if full_w * full_h <= max_pixels {
        return (full_w as u32, full_h as u32);
    }
    let scale = (max_pixels as f64 / (full_w * full_h) as f64).sqrt();
    let mut out_w = ((full_w as f64 * scale).floor() as u64).max(1);
    let mut out_h = ((full_h as f64 * scale).floor() as u64).max(1);
    // The 1px floor can still overshoot on extreme aspect ratios
    if out_w * out_h > max_pixels {
        if out_w >= out_h {
            out_w = (max_pixels / out_h).max(1);
        } else {
            out_h = (max_pixels / out_w).max(1);
        }
    }
    (out_w as u32, out_h as u32)
}

/// Non-local means denoising.
///
/// Every pixel becomes a weighted mean of the pixels in its search window,
/// weighted by `exp(-d² / strength²)` where `d²` is the mean squared
/// difference between the two surrounding patches. Patch distances come from
/// one summed-area table per search offset, so the cost is independent of
/// the patch size.
pub fn nl_means_denoise(
    gray: &GrayImage,
    strength: f32,
    patch_radius: usize,
    search_radius: usize,
) -> GrayImage {
    let (width, height) = gray.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 || strength <= 0.0 {
        return gray.clone();
    }
    let src = gray.as_raw();
    let pr = patch_radius;
    let sr = search_radius as isize;
    let h2 = strength * strength;
    let stride = w + 1;

    let mut weight_sum = vec![0.0f32; w * h];
    let mut value_sum = vec![0.0f32; w * h];
    // Summed-area table of squared differences, one row/column of zero padding
    let mut table = vec![0u64; stride * (h + 1)];

    for oy in -sr..=sr {
        for ox in -sr..=sr {
            let shifted = |x: usize, y: usize| {
                let sx = clamp_coord(x as isize + ox, w);
                let sy = clamp_coord(y as isize + oy, h);
                i32::from(src[sy * w + sx])
            };
            for y in 0..h {
                let mut row_acc = 0u64;
                for x in 0..w {
                    let diff = i32::from(src[y * w + x]) - shifted(x, y);
                    row_acc += (diff * diff) as u64;
                    table[(y + 1) * stride + x + 1] = table[y * stride + x + 1] + row_acc;
                }
            }

            let table = &table;
            weight_sum
                .par_chunks_mut(w)
                .zip(value_sum.par_chunks_mut(w))
                .enumerate()
                .for_each(|(y, (weights, values))| {
                    let qy = y as isize + oy;
                    if qy < 0 || qy >= h as isize {
                        return;
                    }
                    let y0 = y.saturating_sub(pr);
                    let y1 = (y + pr).min(h - 1) + 1;
                    for x in 0..w {
                        let qx = x as isize + ox;
                        if qx < 0 || qx >= w as isize {
                            continue;
                        }
                        let x0 = x.saturating_sub(pr);
                        let x1 = (x + pr).min(w - 1) + 1;
                        let sum = table[y1 * stride + x1] + table[y0 * stride + x0]
                            - table[y0 * stride + x1]
                            - table[y1 * stride + x0];
                        let count = ((x1 - x0) * (y1 - y0)) as f32;
                        let weight = (-(sum as f32 / count) / h2).exp();
                        weights[x] += weight;
                        values[x] += weight * f32::from(src[qy as usize * w + qx as usize]);
                    }
                });
        }
    }

    // The zero offset always contributes weight 1, so no sum is zero
    let out: Vec<u8> = value_sum
        .iter()
        .zip(&weight_sum)
        .map(|(&v, &wsum)| (v / wsum).round().clamp(0.0, 255.0) as u8)
        .collect();
    from_rows(width, height, out, gray)
}

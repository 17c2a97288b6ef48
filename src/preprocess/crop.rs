use crate::config::CropConfig;
use crate::models::CropRegion;
use crate::utils::filters::horizontal_gradient_map;
use crate::utils::grayscale::to_gray;
use image::{DynamicImage, GrayImage, Luma};
use imageproc::contrast::{threshold, ThresholdType};
use imageproc::distance_transform::Norm;
use imageproc::filter::box_filter;
use imageproc::morphology::{dilate, erode, grayscale_close, Mask};
use imageproc::region_labelling::{connected_components, Connectivity};
use tracing::debug;

/// Locate the largest area dense in vertical edges (a 1D barcode's bars).
///
/// Gradient map, box blur, threshold, closing to merge neighbouring bars,
/// then erode/dilate to drop specks. Returns the bounding box of the largest
/// remaining blob, or `None` when nothing survives.
pub fn detect_crop_region(image: &DynamicImage, config: &CropConfig) -> Option<CropRegion> {
    let gray = to_gray(image);
    let (w, h) = gray.dimensions();
    if w == 0 || h == 0 {
        return None;
    }

    let gradient = horizontal_gradient_map(&gray);
    let radius = config.blur_kernel / 2;
    let blurred = box_filter(&gradient, radius, radius);
    let binary = threshold(&blurred, config.gradient_threshold, ThresholdType::Binary);

    let (kw, kh) = config.close_kernel;
    let closed = grayscale_close(&binary, &rect_mask(kw, kh));
    // A 3x3 pass repeated k times equals one pass at LInf distance k
    let k = u8::try_from(config.morph_iterations).unwrap_or(u8::MAX);
    let cleaned = if k == 0 {
        closed
    } else {
        dilate(&erode(&closed, Norm::LInf, k), Norm::LInf, k)
    };

    let (bounds, pixels) = largest_component(&cleaned)?;
    debug!(
        x = bounds.x,
        y = bounds.y,
        width = bounds.width,
        height = bounds.height,
        pixels,
        "crop region detected"
    );
    Some(bounds)
}

/// Filled `kw` x `kh` structuring element anchored at its centre.
///
/// Sides are clamped to 511, the largest mask imageproc accepts.
fn rect_mask(kw: u32, kh: u32) -> Mask {
    let kw = kw.clamp(1, 511);
    let kh = kh.clamp(1, 511);
    let shape = GrayImage::from_pixel(kw, kh, Luma([255]));
    Mask::from_image(&shape, ((kw - 1) / 2) as u8, ((kh - 1) / 2) as u8)
}

/// Bounding box and pixel count of the 8-connected foreground component with
/// the most pixels. Ties go to the component labelled first (top-left).
fn largest_component(binary: &GrayImage) -> Option<(CropRegion, u64)> {
    let labels = connected_components(binary, Connectivity::Eight, Luma([0u8]));

    // Per label: min x, min y, max x, max y, pixel count
    let mut boxes: Vec<Option<(u32, u32, u32, u32, u64)>> = Vec::new();
    for (x, y, label) in labels.enumerate_pixels() {
        let label = label[0] as usize;
        if label == 0 {
            continue;
        }
        if boxes.len() <= label {
            boxes.resize(label + 1, None);
        }
        let entry = boxes[label].get_or_insert((x, y, x, y, 0));
        entry.0 = entry.0.min(x);
        entry.1 = entry.1.min(y);
        entry.2 = entry.2.max(x);
        entry.3 = entry.3.max(y);
        entry.4 += 1;
    }

    boxes
        .into_iter()
        .flatten()
        .fold(None, |best: Option<(u32, u32, u32, u32, u64)>, b| match best {
            Some(top) if top.4 >= b.4 => Some(top),
            _ => Some(b),
        })
        .map(|(x0, y0, x1, y1, pixels)| (CropRegion::from_bounds(x0, y0, x1, y1), pixels))
}

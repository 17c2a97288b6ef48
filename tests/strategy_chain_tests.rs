mod common;

use barscan::models::result::NO_BARCODE_FOUND;
use barscan::models::{CropRegion, Rotation};
use barscan::pipeline::OCR_TAG;
use barscan::{ScanConfig, ScanError};
use common::*;
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::atomic::Ordering;
use std::sync::{Arc, Mutex};

fn hit() -> Vec<Vec<u8>> {
    vec![b"4006381333931".to_vec()]
}

/// 4x2 black image with a red pixel at (0, 0)
fn marker_image() -> DynamicImage {
    let mut img = RgbImage::from_pixel(4, 2, Rgb([0, 0, 0]));
    img.put_pixel(0, 0, Rgb([255, 0, 0]));
    DynamicImage::ImageRgb8(img)
}

fn marker_position(image: &DynamicImage) -> Option<(u32, u32)> {
    image
        .to_rgb8()
        .enumerate_pixels()
        .find(|(_, _, p)| p[0] == 255)
        .map(|(x, y, _)| (x, y))
}

#[test]
fn test_clean_image_decodes_without_preprocessing() {
    let (decoder, decode_calls) = FnDecoder::new(|_| hit());
    let (preprocessor, calls) = FakePreprocessor::new(Some(CropRegion::new(1, 1, 4, 4)));
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor);

    let result = engine.scan_image(&uniform(32, 32, 100));

    assert!(result.is_success());
    assert_eq!(result.codes(), ["4006381333931".to_string()]);
    let method = result.method().unwrap();
    assert_eq!(method.tag, "fake");
    assert_eq!(method.strategy, "original");
    assert_eq!(result.attempted(), ["original"]);
    assert_eq!(calls.total(), 0);
    assert_eq!(decode_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_crop_and_enhance_rescues_low_contrast() {
    let (decoder, _) = FnDecoder::new(|img: &DynamicImage| if corner_luma(img) == 42 { hit() } else { vec![] });
    let (preprocessor, calls) = FakePreprocessor::new(Some(CropRegion::new(10, 10, 20, 20)));
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor);

    let result = engine.scan_image(&uniform(60, 60, 100));

    assert_eq!(result.method().unwrap().strategy, "crop_enhance");
    assert_eq!(result.attempted(), ["original", "crop_enhance"]);
    assert_eq!(calls.detect.load(Ordering::SeqCst), 1);
    assert_eq!(calls.strong.load(Ordering::SeqCst), 0);
    // 20x20 crop grown by the default 10px margin
    assert_eq!(*calls.light_inputs.lock().unwrap(), vec![(40, 40)]);
}

#[test]
fn test_strong_enhancement_after_light_fails() {
    let (decoder, decode_calls) =
        FnDecoder::new(|img: &DynamicImage| if corner_luma(img) == 7 { hit() } else { vec![] });
    let (preprocessor, calls) = FakePreprocessor::new(Some(CropRegion::new(5, 5, 10, 10)));
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor);

    let result = engine.scan_image(&uniform(40, 40, 100));

    assert_eq!(result.method().unwrap().strategy, "crop_strong");
    assert_eq!(
        result.attempted(),
        ["original", "crop_enhance", "crop_enhance_rotate", "crop_strong"]
    );
    // crop and light enhancement are shared between steps
    assert_eq!(calls.detect.load(Ordering::SeqCst), 1);
    assert_eq!(calls.light.load(Ordering::SeqCst), 1);
    assert_eq!(calls.strong.load(Ordering::SeqCst), 1);
    assert_eq!(decode_calls.load(Ordering::SeqCst), 1 + 1 + 3 + 1);
}

#[test]
fn test_missing_crop_skips_crop_strategies() {
    let (decoder, decode_calls) = FnDecoder::new(|_| vec![]);
    let (preprocessor, calls) = FakePreprocessor::new(None);
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor);

    let result = engine.scan_image(&uniform(16, 16, 100));

    assert!(!result.is_success());
    assert!(result.method().is_none());
    assert_eq!(result.status(), NO_BARCODE_FOUND);
    assert_eq!(result.attempted().len(), 5);
    assert_eq!(calls.detect.load(Ordering::SeqCst), 1);
    assert_eq!(calls.light.load(Ordering::SeqCst), 0);
    assert_eq!(calls.strong.load(Ordering::SeqCst), 0);
    // original + one call per rotation of the original
    assert_eq!(decode_calls.load(Ordering::SeqCst), 4);
}

#[test]
fn test_upside_down_code_found_by_rotation_retry() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let (decoder, _) = FnDecoder::new(move |img: &DynamicImage| {
        let pos = marker_position(img);
        log.lock().unwrap().push(pos);
        if pos == Some((3, 1)) { hit() } else { vec![] }
    });
    let (preprocessor, _) = FakePreprocessor::new(None);
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor);

    let result = engine.scan_image(&marker_image());

    assert_eq!(result.method().unwrap().strategy, "rotate_original");
    // as loaded, then 90 and 180 degrees; 270 is never reached
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some((0, 0)), Some((1, 0)), Some((3, 1))]
    );
}

#[test]
fn test_rotation_retry_uses_configured_order_only() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();
    let (decoder, _) = FnDecoder::new(move |img: &DynamicImage| {
        log.lock().unwrap().push(marker_position(img));
        vec![]
    });
    let (preprocessor, _) = FakePreprocessor::new(None);
    let config = ScanConfig {
        rotations: vec![Rotation::Deg270, Rotation::Deg90],
        ..ScanConfig::default()
    };
    let engine = engine_with(config, decoder, preprocessor);

    let result = engine.scan_image(&marker_image());

    assert!(!result.is_success());
    // (3, 1) would be the 180 degree rendering
    assert_eq!(
        *seen.lock().unwrap(),
        vec![Some((0, 0)), Some((0, 3)), Some((1, 0))]
    );
}

#[test]
fn test_ocr_rescues_unreadable_image() {
    let (decoder, _) = FnDecoder::new(|_| vec![]);
    let (preprocessor, _) = FakePreprocessor::new(None);
    let (ocr, ocr_calls) = FakeOcr::new(true, "LOT: A1B2C3D4E5\nexp 2031\n");
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor).with_ocr(ocr);

    let result = engine.scan_image(&uniform(16, 16, 100));

    assert_eq!(result.codes(), ["A1B2C3D4E5".to_string()]);
    assert_eq!(result.method().unwrap().tag, OCR_TAG);
    assert_eq!(result.method().unwrap().to_string(), "ocr");
    assert_eq!(result.attempted().last(), Some(&OCR_TAG));
    assert_eq!(result.attempted().len(), 6);
    assert_eq!(ocr_calls.load(Ordering::SeqCst), 1);
}

#[test]
fn test_ocr_not_called_when_image_decodes() {
    let (decoder, _) = FnDecoder::new(|_| hit());
    let (preprocessor, _) = FakePreprocessor::new(None);
    let (ocr, ocr_calls) = FakeOcr::new(true, "A1B2C3D4E5");
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor).with_ocr(ocr);

    let result = engine.scan_image(&uniform(16, 16, 100));

    assert_eq!(result.method().unwrap().tag, "fake");
    assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_unavailable_ocr_is_not_attempted() {
    let (decoder, _) = FnDecoder::new(|_| vec![]);
    let (preprocessor, _) = FakePreprocessor::new(None);
    let (ocr, ocr_calls) = FakeOcr::new(false, "A1B2C3D4E5");
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor).with_ocr(ocr);

    let result = engine.scan_image(&uniform(16, 16, 100));

    assert!(!result.is_success());
    assert!(!result.attempted().contains(&OCR_TAG));
    assert_eq!(ocr_calls.load(Ordering::SeqCst), 0);
}

#[test]
fn test_ocr_without_tokens_is_not_found() {
    let (decoder, _) = FnDecoder::new(|_| vec![]);
    let (preprocessor, _) = FakePreprocessor::new(None);
    let (ocr, _) = FakeOcr::new(true, "blurry text, short 1234");
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor).with_ocr(ocr);

    let result = engine.scan_image(&uniform(16, 16, 100));

    assert!(!result.is_success());
    assert!(result.codes().is_empty());
    assert_eq!(result.status(), NO_BARCODE_FOUND);
    assert_eq!(result.attempted().len(), 6);
}

#[test]
fn test_unreadable_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("truncated.png");
    std::fs::write(&path, b"\x89PNG\r\n").unwrap();

    let (decoder, _) = FnDecoder::new(|_| hit());
    let (preprocessor, _) = FakePreprocessor::new(None);
    let engine = engine_with(ScanConfig::default(), decoder, preprocessor);

    let err = engine.scan_path(&path).unwrap_err();
    assert!(matches!(err, ScanError::Decode { .. }));
    assert!(err.is_per_file());
}

#[test]
fn test_standard_preprocessor_is_deterministic() {
    use barscan::preprocess::Preprocess as _;
    let preprocessor = barscan::preprocess::StandardPreprocessor::default();
    let image = DynamicImage::ImageLuma8(image::GrayImage::from_fn(48, 24, |x, y| {
        image::Luma([((x * 5 + y * 3) % 256) as u8])
    }));

    assert_eq!(
        preprocessor.enhance_contrast_sharpen(&image).as_bytes(),
        preprocessor.enhance_contrast_sharpen(&image).as_bytes()
    );
    assert_eq!(
        preprocessor.enhance_strong(&image).as_bytes(),
        preprocessor.enhance_strong(&image).as_bytes()
    );
}

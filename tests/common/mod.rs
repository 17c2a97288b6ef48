#![allow(dead_code)]

use barscan::decoder::{Decode, DecoderStack};
use barscan::models::CropRegion;
use barscan::ocr::OcrEngine;
use barscan::preprocess::Preprocess;
use barscan::{ScanConfig, ScanEngine};
use image::{DynamicImage, GrayImage, Luma};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Decoder driven by a closure, counting its calls
pub struct FnDecoder<F> {
    pub calls: Arc<AtomicUsize>,
    f: F,
}

impl<F> FnDecoder<F>
where
    F: Fn(&DynamicImage) -> Vec<Vec<u8>>,
{
    pub fn new(f: F) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                calls: calls.clone(),
                f,
            },
            calls,
        )
    }
}

impl<F> Decode for FnDecoder<F>
where
    F: Fn(&DynamicImage) -> Vec<Vec<u8>>,
{
    fn name(&self) -> &str {
        "fake"
    }

    fn decode(&self, image: &DynamicImage) -> Vec<Vec<u8>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        (self.f)(image)
    }
}

/// Luma of the top-left pixel
pub fn corner_luma(image: &DynamicImage) -> u8 {
    image.to_luma8().get_pixel(0, 0)[0]
}

/// Call counters of [`FakePreprocessor`]
#[derive(Default)]
pub struct PreprocessCalls {
    pub detect: AtomicUsize,
    pub light: AtomicUsize,
    pub strong: AtomicUsize,
    pub light_inputs: Mutex<Vec<(u32, u32)>>,
}

impl PreprocessCalls {
    pub fn total(&self) -> usize {
        self.detect.load(Ordering::SeqCst)
            + self.light.load(Ordering::SeqCst)
            + self.strong.load(Ordering::SeqCst)
    }
}

/// Preprocessor returning a fixed crop and uniform renderings
pub struct FakePreprocessor {
    pub region: Option<CropRegion>,
    pub light_level: u8,
    pub strong_level: u8,
    pub calls: Arc<PreprocessCalls>,
}

impl FakePreprocessor {
    pub fn new(region: Option<CropRegion>) -> (Self, Arc<PreprocessCalls>) {
        let calls = Arc::new(PreprocessCalls::default());
        (
            Self {
                region,
                light_level: 42,
                strong_level: 7,
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl Preprocess for FakePreprocessor {
    fn detect_crop_region(&self, _image: &DynamicImage) -> Option<CropRegion> {
        self.calls.detect.fetch_add(1, Ordering::SeqCst);
        self.region
    }

    fn enhance_contrast_sharpen(&self, image: &DynamicImage) -> DynamicImage {
        self.calls.light.fetch_add(1, Ordering::SeqCst);
        self.calls
            .light_inputs
            .lock()
            .unwrap()
            .push((image.width(), image.height()));
        uniform(image.width(), image.height(), self.light_level)
    }

    fn enhance_strong(&self, image: &DynamicImage) -> DynamicImage {
        self.calls.strong.fetch_add(1, Ordering::SeqCst);
        uniform(image.width() * 3, image.height() * 3, self.strong_level)
    }
}

/// OCR engine returning fixed text
pub struct FakeOcr {
    pub available: bool,
    pub text: String,
    pub calls: Arc<AtomicUsize>,
}

impl FakeOcr {
    pub fn new(available: bool, text: &str) -> (Self, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        (
            Self {
                available,
                text: text.to_string(),
                calls: calls.clone(),
            },
            calls,
        )
    }
}

impl OcrEngine for FakeOcr {
    fn name(&self) -> &str {
        "fake-ocr"
    }

    fn is_available(&self) -> bool {
        self.available
    }

    fn recognize_text(&self, _image: &DynamicImage) -> std::io::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.text.clone())
    }
}

pub fn uniform(width: u32, height: u32, level: u8) -> DynamicImage {
    DynamicImage::ImageLuma8(GrayImage::from_pixel(width, height, Luma([level])))
}

pub fn engine_with<D: Decode + 'static>(
    config: ScanConfig,
    decoder: D,
    preprocessor: FakePreprocessor,
) -> ScanEngine {
    ScanEngine::new(config, DecoderStack::new().with(decoder), Box::new(preprocessor))
}

/// EAN-13 bit patterns for the left-hand odd-parity digits
const EAN_L_CODES: [&str; 10] = [
    "0001101", "0011001", "0010011", "0111101", "0100011", "0110001", "0101111", "0111011",
    "0110111", "0001011",
];
/// Parity of the six left-hand digits, keyed by the first digit
const EAN_PARITY: [&str; 10] = [
    "LLLLLL", "LLGLGG", "LLGGLG", "LLGGGL", "LGLLGG", "LGGLLG", "LGGGLL", "LGLGLG", "LGLGGL",
    "LGGLGL",
];

/// The 95 modules of an EAN-13 symbol, `true` for a bar
pub fn ean13_modules(digits: &str) -> Vec<bool> {
    let d: Vec<usize> = digits.bytes().map(|b| (b - b'0') as usize).collect();
    let r_code = |n: usize| -> String {
        EAN_L_CODES[n].chars().map(|c| if c == '0' { '1' } else { '0' }).collect()
    };
    let mut bits = String::from("101");
    for (i, parity) in EAN_PARITY[d[0]].chars().enumerate() {
        let digit = d[i + 1];
        if parity == 'L' {
            bits.push_str(EAN_L_CODES[digit]);
        } else {
            bits.extend(r_code(digit).chars().rev());
        }
    }
    bits.push_str("01010");
    for &digit in &d[7..13] {
        bits.push_str(&r_code(digit));
    }
    bits.push_str("101");
    bits.chars().map(|c| c == '1').collect()
}

/// An EAN-13 symbol centred on a `width` x `height` canvas.
///
/// Bars are `bar` gray, spaces and background `space` gray; bars span the
/// middle half of the height.
pub fn ean13_image(
    digits: &str,
    module_px: u32,
    width: u32,
    height: u32,
    bar: u8,
    space: u8,
) -> DynamicImage {
    let modules = ean13_modules(digits);
    let code_w = modules.len() as u32 * module_px;
    let x0 = width.saturating_sub(code_w) / 2;
    let (y0, y1) = (height / 4, height * 3 / 4);
    DynamicImage::ImageLuma8(GrayImage::from_fn(width, height, |x, y| {
        let in_code = x >= x0 && x < x0 + code_w && y >= y0 && y < y1;
        if in_code && modules[((x - x0) / module_px) as usize] {
            Luma([bar])
        } else {
            Luma([space])
        }
    }))
}

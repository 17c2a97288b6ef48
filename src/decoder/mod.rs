//! Decode primitives
//!
//! A primitive turns a raster into zero or more raw payloads. Primitives keep
//! no state between calls; the chain may call them any number of times.

/// In-memory 1D and 2D decoding (`rxing`)
pub mod multi;
/// In-memory QR decoding (`rqrr`)
pub mod qr;
/// `zbarimg` command-line decoding
pub mod zbar;

use crate::config::ScanConfig;
use image::DynamicImage;
use tracing::debug;

pub use multi::RxingDecoder;
pub use qr::RqrrDecoder;
pub use zbar::ZbarDecoder;

/// A barcode/QR decode capability
pub trait Decode {
    /// Short name used as the result's method tag
    fn name(&self) -> &str;

    /// All payloads found in `image`, empty when nothing decodes
    fn decode(&self, image: &DynamicImage) -> Vec<Vec<u8>>;
}

/// Payloads from one successful primitive call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decoded {
    /// Name of the primitive that produced the payloads
    pub primitive: String,
    /// Raw payloads, never empty
    pub payloads: Vec<Vec<u8>>,
}

impl Decoded {
    /// Payloads as text (invalid UTF-8 replaced)
    pub fn codes(&self) -> Vec<String> {
        self.payloads
            .iter()
            .map(|p| String::from_utf8_lossy(p).into_owned())
            .collect()
    }
}

/// Ordered set of primitives; the first one with payloads wins
#[derive(Default)]
pub struct DecoderStack {
    primitives: Vec<Box<dyn Decode>>,
}

impl DecoderStack {
    /// Empty stack
    pub fn new() -> Self {
        Self::default()
    }

    /// In-memory primitives first, then `zbarimg` when it is installed.
    ///
    /// `rxing` reads 1D and 2D symbols from the pixel buffer and `rqrr` is a
    /// second QR reader; neither touches the filesystem. `zbarimg` needs a
    /// scratch file, so it only runs when both come back empty.
    pub fn system_default(config: &ScanConfig) -> Self {
        let mut stack = Self::new().with(RxingDecoder).with(RqrrDecoder);
        match ZbarDecoder::detect(config.scratch_dir.clone()) {
            Some(zbar) => stack.push(zbar),
            None => debug!("zbarimg not found, using in-memory primitives only"),
        }
        stack
    }

    /// Append a primitive (builder style)
    pub fn with<D: Decode + 'static>(mut self, decoder: D) -> Self {
        self.push(decoder);
        self
    }

    /// Append a primitive
    pub fn push<D: Decode + 'static>(&mut self, decoder: D) {
        self.primitives.push(Box::new(decoder));
    }

    /// Append an already boxed primitive
    pub fn push_boxed(&mut self, decoder: Box<dyn Decode>) {
        self.primitives.push(decoder);
    }

    /// True when no primitive is registered
    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// Primitive names in call order
    pub fn names(&self) -> Vec<&str> {
        self.primitives.iter().map(|p| p.name()).collect()
    }

    /// Try each primitive in order and stop at the first with payloads
    pub fn decode(&self, image: &DynamicImage) -> Option<Decoded> {
        for primitive in &self.primitives {
            let payloads = primitive.decode(image);
            debug!(
                primitive = primitive.name(),
                found = payloads.len(),
                "decode primitive called"
            );
            if !payloads.is_empty() {
                return Some(Decoded {
                    primitive: primitive.name().to_string(),
                    payloads,
                });
            }
        }
        None
    }
}

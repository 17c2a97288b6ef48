use super::Decode;
use crate::utils::grayscale::to_gray;
use image::DynamicImage;
use tracing::debug;

/// In-memory 1D and 2D decoding with `rxing`.
///
/// Covers the linear symbologies (EAN/UPC, Code 128, Code 39, ITF, Codabar)
/// as well as QR, Data Matrix, Aztec and PDF417, straight from the luma
/// buffer. No file is written.
#[derive(Debug, Clone, Copy, Default)]
pub struct RxingDecoder;

impl Decode for RxingDecoder {
    fn name(&self) -> &str {
        "rxing"
    }

    fn decode(&self, image: &DynamicImage) -> Vec<Vec<u8>> {
        let gray = to_gray(image);
        let (w, h) = gray.dimensions();
        if w == 0 || h == 0 {
            return Vec::new();
        }

        match rxing::helpers::detect_multiple_in_luma(gray.into_raw(), w, h) {
            Ok(results) => {
                let mut payloads: Vec<Vec<u8>> = Vec::new();
                for result in results {
                    let payload = result.getText().as_bytes().to_vec();
                    if !payload.is_empty() && !payloads.contains(&payload) {
                        payloads.push(payload);
                    }
                }
                payloads
            }
            // Not-found is the common case and is reported as an error
            Err(err) => {
                debug!(error = %err, "rxing found nothing");
                Vec::new()
            }
        }
    }
}

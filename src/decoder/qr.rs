use super::Decode;
use crate::utils::grayscale::to_gray;
use image::DynamicImage;
use rqrr::PreparedImage;
use tracing::debug;

/// In-memory QR decoding with `rqrr`
#[derive(Debug, Clone, Copy, Default)]
pub struct RqrrDecoder;

impl Decode for RqrrDecoder {
    fn name(&self) -> &str {
        "rqrr"
    }

    fn decode(&self, image: &DynamicImage) -> Vec<Vec<u8>> {
        let gray = to_gray(image);
        let (w, h) = gray.dimensions();
        if w == 0 || h == 0 {
            return Vec::new();
        }

        let mut prepared = PreparedImage::prepare_from_greyscale(w as usize, h as usize, |x, y| {
            gray.get_pixel(x as u32, y as u32)[0]
        });
        prepared
            .detect_grids()
            .into_iter()
            .filter_map(|grid| match grid.decode() {
                Ok((_meta, content)) => Some(content.into_bytes()),
                Err(err) => {
                    debug!(error = ?err, "QR grid found but not decodable");
                    None
                }
            })
            .collect()
    }
}

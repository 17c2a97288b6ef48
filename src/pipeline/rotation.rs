use crate::decoder::{DecoderStack, Decoded};
use crate::models::Rotation;
use image::DynamicImage;
use tracing::debug;

/// Rotate clockwise by a right angle
pub fn rotate(image: &DynamicImage, rotation: Rotation) -> DynamicImage {
    match rotation {
        Rotation::Deg90 => image.rotate90(),
        Rotation::Deg180 => image.rotate180(),
        Rotation::Deg270 => image.rotate270(),
    }
}

/// Decode `base` at each angle of `rotations`, in order, stopping at the first
/// angle that yields payloads.
///
/// Only the listed angles are tried.
pub fn retry_rotations(
    decoders: &DecoderStack,
    base: &DynamicImage,
    rotations: &[Rotation],
) -> Option<(Rotation, Decoded)> {
    for &rotation in rotations {
        let rotated = rotate(base, rotation);
        if let Some(decoded) = decoders.decode(&rotated) {
            debug!(%rotation, primitive = %decoded.primitive, "decoded after rotation");
            return Some((rotation, decoded));
        }
        debug!(%rotation, "no payload at rotation");
    }
    None
}

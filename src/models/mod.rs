/// Loaded image plus its source path
pub mod asset;
/// Axis-aligned crop rectangle
pub mod region;
/// Per-image decode outcome
pub mod result;
/// Right-angle rotations
pub mod rotation;

pub use asset::ImageAsset;
pub use region::CropRegion;
pub use result::{DecodeResult, Method};
pub use rotation::Rotation;

use crate::error::{Result, ScanError};
use image::{DynamicImage, GenericImageView, ImageReader};
use std::path::{Path, PathBuf};

/// A file on disk plus its decoded raster
#[derive(Debug, Clone)]
pub struct ImageAsset {
    path: PathBuf,
    image: DynamicImage,
}

impl ImageAsset {
    /// Wrap an already-decoded image
    pub fn new(path: impl Into<PathBuf>, image: DynamicImage) -> Self {
        Self {
            path: path.into(),
            image,
        }
    }

    /// Load an image, sniffing the format from its content.
    ///
    /// Images whose longest side exceeds `max_dim` are downscaled.
    pub fn load<P: AsRef<Path>>(path: P, max_dim: Option<u32>) -> Result<Self> {
        let path = path.as_ref();
        let reader = ImageReader::open(path)
            .and_then(|r| r.with_guessed_format())
            .map_err(|source| ScanError::Open {
                path: path.to_path_buf(),
                source,
            })?;
        let img = reader.decode().map_err(|source| ScanError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

        let img = match max_dim {
            Some(max_dim) if max_dim > 0 => {
                let (orig_w, orig_h) = img.dimensions();
                if orig_w.max(orig_h) > max_dim {
                    img.resize(max_dim, max_dim, image::imageops::FilterType::Triangle)
                } else {
                    img
                }
            }
            _ => img,
        };

        Ok(Self::new(path, img))
    }

    /// Source path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Decoded raster
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// File name for display, falling back to the full path
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    #[test]
    fn test_load_downscales() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        RgbImage::from_pixel(400, 100, Rgb([10, 20, 30])).save(&path).unwrap();

        let asset = ImageAsset::load(&path, Some(200)).unwrap();
        assert_eq!(asset.image().dimensions(), (200, 50));
        assert_eq!(asset.file_name(), "wide.png");

        let full = ImageAsset::load(&path, None).unwrap();
        assert_eq!(full.image().dimensions(), (400, 100));
    }

    #[test]
    fn test_load_empty_file_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("empty.jpg");
        std::fs::write(&path, b"").unwrap();

        let err = ImageAsset::load(&path, None).unwrap_err();
        assert!(matches!(err, ScanError::Decode { .. }));
    }

    #[test]
    fn test_load_missing_file_is_open_error() {
        let err = ImageAsset::load("/definitely/not/here.png", None).unwrap_err();
        assert!(matches!(err, ScanError::Open { .. }));
    }
}

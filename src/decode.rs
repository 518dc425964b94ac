//! Loading the source image and decoding artifacts back into rasters.
//!
//! Decoding is delegated to the `image` crate, so any format it was built with
//! (PNG, JPEG, WebP, GIF, BMP, TIFF) is accepted as input.

use std::path::{Path, PathBuf};

use image::DynamicImage;

use crate::error::{Error, Result};
use crate::raster::Raster;

/// The original image under evaluation.
///
/// Loaded once per session and never mutated.
#[derive(Debug, Clone)]
pub struct SourceImage {
    path: PathBuf,
    byte_size: u64,
    image: DynamicImage,
    raster: Raster,
}

impl SourceImage {
    /// Open and decode the image at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InputUnreadable`] if the file is missing, empty or
    /// cannot be decoded.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let unreadable = |reason: String| Error::InputUnreadable {
            path: path.to_path_buf(),
            reason,
        };

        let byte_size = std::fs::metadata(path)
            .map_err(|e| unreadable(e.to_string()))?
            .len();
        if byte_size == 0 {
            return Err(unreadable("file is empty".to_string()));
        }

        let image = image::ImageReader::open(path)
            .map_err(|e| unreadable(e.to_string()))?
            .with_guessed_format()
            .map_err(|e| unreadable(e.to_string()))?
            .decode()
            .map_err(|e| unreadable(e.to_string()))?;

        log::debug!(
            "Loaded {} ({}x{}, {:?}, {} bytes)",
            path.display(),
            image.width(),
            image.height(),
            image.color(),
            byte_size
        );

        Ok(Self::from_parts(path.to_path_buf(), byte_size, image))
    }

    /// Build a source from an already decoded image and its on-disk size.
    #[must_use]
    pub fn from_parts(path: PathBuf, byte_size: u64, image: DynamicImage) -> Self {
        let raster = Raster::from_image(&image);
        Self {
            path,
            byte_size,
            image,
            raster,
        }
    }

    /// Path the image was loaded from.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Size of the original file in bytes.
    #[must_use]
    pub fn byte_size(&self) -> u64 {
        self.byte_size
    }

    /// Decoded image, as handed to the encoders.
    #[must_use]
    pub fn image(&self) -> &DynamicImage {
        &self.image
    }

    /// Raster used as the metric reference.
    #[must_use]
    pub fn raster(&self) -> &Raster {
        &self.raster
    }

    /// Image width in pixels.
    #[must_use]
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Image height in pixels.
    #[must_use]
    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

/// Decode an artifact file, guessing its format from content.
pub fn decode_artifact(path: &Path) -> Result<DynamicImage> {
    let image = image::ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?;
    Ok(image)
}

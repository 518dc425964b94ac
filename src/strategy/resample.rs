//! Half-resolution Lanczos resample.

use image::DynamicImage;
use image::imageops::FilterType;

use super::png::encode_png;
use super::{ArtifactFormat, Strategy, StrategySpec};
use crate::decode::SourceImage;
use crate::error::{Error, Result};

/// Filter used for both downscaling and the upscale before comparison.
pub const FILTER: FilterType = FilterType::Lanczos3;

/// Downscale both dimensions by half (integer division) and store as PNG.
///
/// The artifact is smaller than the source, so the evaluator upscales the
/// decoded artifact back to source resolution with [`FILTER`] before
/// computing metrics.
#[derive(Debug, Clone)]
pub struct HalfScale {
    spec: StrategySpec,
}

impl HalfScale {
    /// Report name of this strategy.
    pub const NAME: &'static str = "Half-Scale Lanczos";

    pub fn new() -> Self {
        Self {
            spec: StrategySpec {
                name: Self::NAME,
                file_stem: "resized_half",
                format: ArtifactFormat::Png,
                quality: None,
                colors: None,
                scale: Some(0.5),
            },
        }
    }

    /// Target dimensions for a source of the given size.
    pub fn target_dimensions(width: u32, height: u32) -> Result<(u32, u32)> {
        let (w, h) = (width / 2, height / 2);
        if w == 0 || h == 0 {
            return Err(Error::strategy(
                Self::NAME,
                format!("{width}x{height} is too small to halve"),
            ));
        }
        Ok((w, h))
    }

    /// Resample the image to half size.
    pub fn downscale(image: &DynamicImage) -> Result<DynamicImage> {
        let (w, h) = Self::target_dimensions(image.width(), image.height())?;
        Ok(image.resize_exact(w, h, FILTER))
    }
}

impl Default for HalfScale {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for HalfScale {
    fn spec(&self) -> &StrategySpec {
        &self.spec
    }

    fn encode(&self, source: &SourceImage) -> Result<Vec<u8>> {
        encode_png(&Self::downscale(source.image())?)
    }

    fn changes_dimensions(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_dimensions_round_down() {
        assert_eq!(HalfScale::target_dimensions(100, 100).unwrap(), (50, 50));
        assert_eq!(HalfScale::target_dimensions(101, 33).unwrap(), (50, 16));
    }

    #[test]
    fn test_too_small_to_halve() {
        assert!(HalfScale::target_dimensions(1, 100).is_err());
        assert!(HalfScale::target_dimensions(100, 1).is_err());
    }

    #[test]
    fn test_downscale() {
        let img = DynamicImage::new_rgb8(40, 30);
        let half = HalfScale::downscale(&img).unwrap();
        assert_eq!((half.width(), half.height()), (20, 15));
    }
}

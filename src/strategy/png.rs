//! PNG encoding and the maximum-effort lossless PNG strategy.

use image::codecs::png::{CompressionType, FilterType, PngEncoder};
use image::{DynamicImage, ImageEncoder};
use oxipng::Options;

use super::{ArtifactFormat, Strategy, StrategySpec};
use crate::decode::SourceImage;
use crate::error::{Error, Result};

/// Highest oxipng optimisation preset.
pub const OXIPNG_MAX_PRESET: u8 = 6;

/// Encode an image as PNG with best deflate compression and adaptive filtering.
///
/// Fails for pixel layouts PNG cannot store (e.g. 32-bit float).
pub fn encode_png(image: &DynamicImage) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    let encoder =
        PngEncoder::new_with_quality(&mut buffer, CompressionType::Best, FilterType::Adaptive);
    encoder.write_image(
        image.as_bytes(),
        image.width(),
        image.height(),
        image.color().into(),
    )?;
    Ok(buffer)
}

/// Losslessly re-optimise PNG bytes with oxipng.
///
/// Besides deflate and filter search this performs color type and bit depth
/// reductions, e.g. RGB with at most 256 colors becomes indexed.
pub fn optimize_png(data: &[u8], strategy: &str) -> Result<Vec<u8>> {
    oxipng::optimize_from_memory(data, &Options::from_preset(OXIPNG_MAX_PRESET))
        .map_err(|e| Error::strategy(strategy, format!("PNG optimization failed: {e}")))
}

/// Lossless PNG at maximum compression effort.
#[derive(Debug, Clone)]
pub struct PngMax {
    spec: StrategySpec,
}

impl PngMax {
    /// Report name of this strategy.
    pub const NAME: &'static str = "PNG Max";

    pub fn new() -> Self {
        Self {
            spec: StrategySpec {
                name: Self::NAME,
                file_stem: "png_max",
                format: ArtifactFormat::Png,
                quality: None,
                colors: None,
                scale: None,
            },
        }
    }
}

impl Default for PngMax {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for PngMax {
    fn spec(&self) -> &StrategySpec {
        &self.spec
    }

    fn encode(&self, source: &SourceImage) -> Result<Vec<u8>> {
        let png = encode_png(source.image())?;
        let optimized = optimize_png(&png, Self::NAME)?;
        log::debug!(
            "{}: deflate {} bytes, optimized {} bytes",
            Self::NAME,
            png.len(),
            optimized.len()
        );
        Ok(optimized)
    }
}

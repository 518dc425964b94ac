//! Near-lossless JPEG via MozJPEG.

use mozjpeg::{ColorSpace, Compress};

use super::{ArtifactFormat, Strategy, StrategySpec};
use crate::decode::SourceImage;
use crate::error::{Error, Result};
use crate::raster::flatten_alpha;

/// Encoder quality for the near-lossless JPEG.
pub const QUALITY: u8 = 95;

/// RGB JPEG at very high quality with 4:4:4 chroma sampling.
#[derive(Debug, Clone)]
pub struct JpegNearLossless {
    spec: StrategySpec,
}

impl JpegNearLossless {
    /// Report name of this strategy.
    pub const NAME: &'static str = "JPEG Near-Lossless";

    pub fn new() -> Self {
        Self::with_quality(QUALITY)
    }

    /// Same recipe at a different quality (clamped to 1-100).
    pub fn with_quality(quality: u8) -> Self {
        Self {
            spec: StrategySpec {
                name: Self::NAME,
                file_stem: "jpeg_high",
                format: ArtifactFormat::Jpeg,
                quality: Some(quality.clamp(1, 100)),
                colors: None,
                scale: None,
            },
        }
    }
}

impl Default for JpegNearLossless {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for JpegNearLossless {
    fn spec(&self) -> &StrategySpec {
        &self.spec
    }

    fn encode(&self, source: &SourceImage) -> Result<Vec<u8>> {
        // JPEG has no alpha: encode the same composite the metrics compare against.
        let rgb = flatten_alpha(source.image()).to_rgb8();
        let (width, height) = (rgb.width() as usize, rgb.height() as usize);
        let quality = self.spec.quality.unwrap_or(QUALITY);

        let mut comp = Compress::new(ColorSpace::JCS_RGB);
        comp.set_size(width, height);
        comp.set_quality(f32::from(quality));
        // 4:4:4, no chroma subsampling
        comp.set_chroma_sampling_pixel_sizes((1, 1), (1, 1));
        comp.set_optimize_coding(true);

        let mut comp = comp
            .start_compress(Vec::new())
            .map_err(|e| Error::strategy(Self::NAME, format!("Failed to start compression: {e}")))?;

        comp.write_scanlines(rgb.as_raw())
            .map_err(|e| Error::strategy(Self::NAME, format!("Failed to write scanlines: {e}")))?;

        comp.finish()
            .map_err(|e| Error::strategy(Self::NAME, format!("Failed to finish compression: {e}")))
    }
}

//! Compression/transform strategies.
//!
//! Each strategy turns the source image into one encoded artifact:
//!
//! | Strategy | File | Recipe |
//! |----------|------|--------|
//! | [`PngMax`] | `png_max.png` | best deflate, adaptive filters, oxipng max preset |
//! | [`WebpLossless`] | `webp_lossless.webp` | lossless, quality 100, method 6 |
//! | [`JpegNearLossless`] | `jpeg_high.jpg` | RGB, quality 95, 4:4:4 |
//! | `PaletteQuantize` | `quantized.png` | 256-color palette, no dithering (`quantize` feature) |
//! | [`HalfScale`] | `resized_half.png` | Lanczos3 to half size, PNG |
//!
//! Encoders are external libraries; strategies only choose their parameters.

pub mod jpeg;
pub mod png;
#[cfg(feature = "quantize")]
pub mod quantize;
pub mod resample;
pub mod webp;

pub use jpeg::JpegNearLossless;
pub use png::PngMax;
#[cfg(feature = "quantize")]
pub use quantize::PaletteQuantize;
pub use resample::HalfScale;
pub use webp::WebpLossless;

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::decode::SourceImage;
use crate::error::{Error, Result};

/// Container format of an artifact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ArtifactFormat {
    /// PNG, always lossless.
    Png,
    /// WebP (lossless mode).
    WebP,
    /// Baseline/progressive JPEG.
    Jpeg,
}

impl ArtifactFormat {
    /// Conventional file extension.
    #[must_use]
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::WebP => "webp",
            Self::Jpeg => "jpg",
        }
    }
}

/// Static description of one strategy.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StrategySpec {
    /// Display name, used as the report's method name.
    pub name: &'static str,
    /// Artifact file stem inside the output directory.
    pub file_stem: &'static str,
    /// Output format.
    pub format: ArtifactFormat,
    /// Encoder quality (0-100) where applicable.
    pub quality: Option<u8>,
    /// Palette size where applicable.
    pub colors: Option<u32>,
    /// Linear scale factor applied to both dimensions where applicable.
    pub scale: Option<f64>,
}

impl StrategySpec {
    /// File name of the artifact, e.g. `png_max.png`.
    #[must_use]
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.file_stem, self.format.extension())
    }
}

/// Output of running one strategy.
#[derive(Debug, Clone)]
pub struct Artifact {
    /// Where the artifact was written.
    pub path: PathBuf,
    /// On-disk size in bytes; always greater than zero.
    pub byte_size: u64,
    /// Wall-clock time spent encoding and writing.
    pub elapsed: Duration,
}

/// A compression/transform recipe.
pub trait Strategy {
    /// Static description of this strategy.
    fn spec(&self) -> &StrategySpec;

    /// Encode the source image into the artifact's bytes.
    fn encode(&self, source: &SourceImage) -> Result<Vec<u8>>;

    /// Whether the artifact's dimensions differ from the source, so the
    /// decoded artifact must be resampled back before comparison.
    fn changes_dimensions(&self) -> bool {
        false
    }

    /// Display name.
    fn name(&self) -> &'static str {
        self.spec().name
    }

    /// Encode, then write the artifact into `output_dir`.
    ///
    /// Every failure, including an empty encoder output, is reported as
    /// [`Error::StrategyFailed`] tagged with this strategy's name.
    fn apply(&self, source: &SourceImage, output_dir: &Path) -> Result<Artifact> {
        let name = self.name();
        let path = output_dir.join(self.spec().file_name());

        let start = Instant::now();
        let bytes = self.encode(source).map_err(|e| match e {
            Error::StrategyFailed { .. } => e,
            other => Error::strategy(name, other),
        })?;
        if bytes.is_empty() {
            return Err(Error::strategy(name, "encoder produced an empty artifact"));
        }
        std::fs::write(&path, &bytes)
            .map_err(|e| Error::strategy(name, format!("{}: {e}", path.display())))?;
        let elapsed = start.elapsed();

        let byte_size = std::fs::metadata(&path)
            .map_err(|e| Error::strategy(name, e))?
            .len();
        if byte_size == 0 {
            return Err(Error::strategy(name, "artifact on disk is empty"));
        }

        log::debug!(
            "{}: wrote {} ({} bytes) in {:.3}s",
            name,
            path.display(),
            byte_size,
            elapsed.as_secs_f64()
        );

        Ok(Artifact {
            path,
            byte_size,
            elapsed,
        })
    }
}

/// The built-in strategies in evaluation order.
///
/// Five with the `quantize` feature; without it `PNG Quantized` is left out.
#[must_use]
pub fn builtin() -> Vec<Box<dyn Strategy>> {
    let mut strategies: Vec<Box<dyn Strategy>> = vec![
        Box::new(PngMax::new()),
        Box::new(WebpLossless::new()),
        Box::new(JpegNearLossless::new()),
    ];
    #[cfg(feature = "quantize")]
    strategies.push(Box::new(PaletteQuantize::new()));
    strategies.push(Box::new(HalfScale::new()));
    strategies
}

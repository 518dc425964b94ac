//! Lossless WebP via libwebp.

use libwebp_sys::WebPConfig;
use webp::Encoder;

use super::{ArtifactFormat, Strategy, StrategySpec};
use crate::decode::SourceImage;
use crate::error::{Error, Result};

/// Slowest, densest libwebp compression method.
pub const MAX_METHOD: i32 = 6;

/// Lossless WebP at maximum encoder effort.
#[derive(Debug, Clone)]
pub struct WebpLossless {
    spec: StrategySpec,
}

impl WebpLossless {
    /// Report name of this strategy.
    pub const NAME: &'static str = "WebP Lossless";

    pub fn new() -> Self {
        Self {
            spec: StrategySpec {
                name: Self::NAME,
                file_stem: "webp_lossless",
                format: ArtifactFormat::WebP,
                quality: Some(100),
                colors: None,
                scale: None,
            },
        }
    }

    fn config(&self) -> Result<WebPConfig> {
        let mut config = WebPConfig::new()
            .map_err(|()| Error::strategy(Self::NAME, "libwebp rejected default config"))?;
        config.lossless = 1;
        config.quality = f32::from(self.spec.quality.unwrap_or(100));
        config.method = MAX_METHOD;
        // Keep RGB under transparent pixels so the comparison stays lossless.
        config.exact = 1;
        Ok(config)
    }
}

impl Default for WebpLossless {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for WebpLossless {
    fn spec(&self) -> &StrategySpec {
        &self.spec
    }

    fn encode(&self, source: &SourceImage) -> Result<Vec<u8>> {
        let image = source.image();
        let (width, height) = (image.width(), image.height());
        let config = self.config()?;

        let encoded = if image.color().has_alpha() {
            let rgba = image.to_rgba8();
            Encoder::from_rgba(rgba.as_raw(), width, height).encode_advanced(&config)
        } else {
            let rgb = image.to_rgb8();
            Encoder::from_rgb(rgb.as_raw(), width, height).encode_advanced(&config)
        };

        let memory = encoded.map_err(|e| Error::strategy(Self::NAME, format!("{e:?}")))?;
        Ok(memory.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, Rgba, RgbaImage};
    use std::path::PathBuf;

    #[test]
    fn test_webp_lossless_keeps_pixels() {
        let img = RgbaImage::from_fn(6, 4, |x, y| Rgba([x as u8 * 30, y as u8 * 50, 90, 255]));
        let source = SourceImage::from_parts(
            PathBuf::from("mem.png"),
            1,
            DynamicImage::ImageRgba8(img.clone()),
        );

        let bytes = WebpLossless::new().encode(&source).unwrap();
        let decoded = image::load_from_memory(&bytes).unwrap();
        assert_eq!(decoded.to_rgba8(), img);
    }
}

//! Adaptive palette quantization.
//!
//! Uses imagequant (libimagequant's modified median cut with k-means
//! refinement) to build a palette of at most 256 colors, remaps without
//! dithering, then stores the result as an optimised PNG. oxipng turns the
//! reduced image into an indexed PNG.
//!
//! This module requires the `quantize` feature flag, which enables the
//! `imagequant` dependency. imagequant is GPL-3.0-or-later, so enabling this
//! feature changes the effective license.

use image::{DynamicImage, RgbImage, RgbaImage};

use super::png::{encode_png, optimize_png};
use super::{ArtifactFormat, Strategy, StrategySpec};
use crate::decode::SourceImage;
use crate::error::{Error, Result};

/// Palette size.
pub const MAX_COLORS: u32 = 256;

/// Reduce to an adaptive palette, then encode losslessly.
#[derive(Debug, Clone)]
pub struct PaletteQuantize {
    spec: StrategySpec,
}

impl PaletteQuantize {
    /// Report name of this strategy.
    pub const NAME: &'static str = "PNG Quantized";

    pub fn new() -> Self {
        Self::with_colors(MAX_COLORS)
    }

    /// Same recipe with a smaller palette (clamped to 2-256).
    pub fn with_colors(colors: u32) -> Self {
        Self {
            spec: StrategySpec {
                name: Self::NAME,
                file_stem: "quantized",
                format: ArtifactFormat::Png,
                quality: None,
                colors: Some(colors.clamp(2, MAX_COLORS)),
                scale: None,
            },
        }
    }

    /// Quantize to at most `colors` colors, returning the remapped image.
    pub fn quantize(&self, image: &DynamicImage) -> Result<DynamicImage> {
        let fail = |e: imagequant::Error| Error::strategy(Self::NAME, e);
        let rgba = image.to_rgba8();
        let (width, height) = (rgba.width(), rgba.height());

        let pixels: Vec<imagequant::RGBA> = rgba
            .pixels()
            .map(|p| imagequant::RGBA::new(p[0], p[1], p[2], p[3]))
            .collect();

        let mut attr = imagequant::Attributes::new();
        attr.set_max_colors(self.spec.colors.unwrap_or(MAX_COLORS))
            .map_err(fail)?;
        attr.set_quality(0, 100).map_err(fail)?;

        let mut img = attr
            .new_image(pixels, width as usize, height as usize, 0.0)
            .map_err(fail)?;
        let mut result = attr.quantize(&mut img).map_err(fail)?;
        result.set_dithering_level(0.0).map_err(fail)?;
        let (palette, indices) = result.remapped(&mut img).map_err(fail)?;

        log::debug!("{}: palette of {} colors", Self::NAME, palette.len());

        let remapped = if image.color().has_alpha() {
            let buf = indices
                .iter()
                .flat_map(|&i| {
                    let c = palette[i as usize];
                    [c.r, c.g, c.b, c.a]
                })
                .collect();
            RgbaImage::from_raw(width, height, buf).map(DynamicImage::ImageRgba8)
        } else {
            let buf = indices
                .iter()
                .flat_map(|&i| {
                    let c = palette[i as usize];
                    [c.r, c.g, c.b]
                })
                .collect();
            RgbImage::from_raw(width, height, buf).map(DynamicImage::ImageRgb8)
        };

        remapped.ok_or_else(|| Error::strategy(Self::NAME, "remapped buffer has wrong length"))
    }
}

impl Default for PaletteQuantize {
    fn default() -> Self {
        Self::new()
    }
}

impl Strategy for PaletteQuantize {
    fn spec(&self) -> &StrategySpec {
        &self.spec
    }

    fn encode(&self, source: &SourceImage) -> Result<Vec<u8>> {
        let quantized = self.quantize(source.image())?;
        optimize_png(&encode_png(&quantized)?, Self::NAME)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use std::collections::HashSet;

    fn distinct_colors(img: &DynamicImage) -> usize {
        img.to_rgb8().pixels().map(|p| p.0).collect::<HashSet<_>>().len()
    }

    #[test]
    fn test_quantize_limits_palette() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_fn(64, 64, |x, y| {
            Rgb([(x * 4) as u8, (y * 4) as u8, ((x + y) * 2) as u8])
        }));
        assert!(distinct_colors(&img) > 256);

        let quantized = PaletteQuantize::with_colors(16).quantize(&img).unwrap();
        assert_eq!((quantized.width(), quantized.height()), (64, 64));
        assert!(distinct_colors(&quantized) <= 16);
    }

    #[test]
    fn test_quantize_flat_image_is_nearly_exact() {
        let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(10, 10, Rgb([200, 40, 90])));
        let quantized = PaletteQuantize::new().quantize(&img).unwrap();
        assert_eq!(distinct_colors(&quantized), 1);
        let p = quantized.to_rgb8().get_pixel(0, 0).0;
        for (got, want) in p.iter().zip([200u8, 40, 90]) {
            assert!(got.abs_diff(want) <= 2);
        }
    }

    #[test]
    fn test_colors_clamped() {
        assert_eq!(PaletteQuantize::with_colors(1).spec().colors, Some(2));
        assert_eq!(PaletteQuantize::with_colors(1000).spec().colors, Some(256));
    }
}

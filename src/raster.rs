//! 8-bit raster buffers used for metric comparison.

use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
use imgref::ImgVec;
use rgb::RGB8;

/// Luminance weights applied to R, G, B.
pub const LUMA_WEIGHTS: [f64; 3] = [0.2989, 0.5870, 0.1140];

/// Sample value of the opaque white background transparent pixels are
/// composited over.
pub const BACKGROUND: u8 = u8::MAX;

/// Composite any alpha channel over [`BACKGROUND`].
///
/// Returns an 8-bit `Luma8` image for grayscale sources and `Rgb8` otherwise.
/// Fully transparent pixels become the background whatever color they hide,
/// so encoders that discard hidden color are not penalised for it.
#[must_use]
pub fn flatten_alpha(image: &DynamicImage) -> DynamicImage {
    let color = image.color();
    match (color.has_color(), color.has_alpha()) {
        (true, false) => DynamicImage::ImageRgb8(image.to_rgb8()),
        (false, false) => DynamicImage::ImageLuma8(image.to_luma8()),
        (true, true) => {
            let rgba = image.to_rgba8();
            DynamicImage::ImageRgb8(RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
                let [r, g, b, a] = rgba.get_pixel(x, y).0;
                Rgb([over_background(r, a), over_background(g, a), over_background(b, a)])
            }))
        }
        (false, true) => {
            let gray_alpha = image.to_luma_alpha8();
            DynamicImage::ImageLuma8(GrayImage::from_fn(
                gray_alpha.width(),
                gray_alpha.height(),
                |x, y| {
                    let [v, a] = gray_alpha.get_pixel(x, y).0;
                    Luma([over_background(v, a)])
                },
            ))
        }
    }
}

fn over_background(value: u8, alpha: u8) -> u8 {
    let (value, alpha) = (u32::from(value), u32::from(alpha));
    let blended = value * alpha + u32::from(BACKGROUND) * (255 - alpha);
    ((blended + 127) / 255) as u8
}

/// An 8-bit raster with either one or three channels.
///
/// Alpha is never carried: images with alpha are composited over
/// [`BACKGROUND`] when converted from a [`DynamicImage`].
#[derive(Debug, Clone)]
pub enum Raster {
    /// Single-channel (grayscale) image.
    Gray(ImgVec<u8>),
    /// Three-channel RGB image.
    Rgb(ImgVec<RGB8>),
}

impl Raster {
    /// Build a grayscale raster from row-major bytes.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height`.
    #[must_use]
    pub fn gray(data: Vec<u8>, width: usize, height: usize) -> Self {
        assert_eq!(data.len(), width * height);
        Self::Gray(ImgVec::new(data, width, height))
    }

    /// Build an RGB raster from interleaved row-major bytes.
    ///
    /// # Panics
    ///
    /// Panics if `data.len() != width * height * 3`.
    #[must_use]
    pub fn rgb(data: &[u8], width: usize, height: usize) -> Self {
        assert_eq!(data.len(), width * height * 3);
        let pixels = data
            .chunks_exact(3)
            .map(|c| RGB8::new(c[0], c[1], c[2]))
            .collect();
        Self::Rgb(ImgVec::new(pixels, width, height))
    }

    /// Convert a decoded image, keeping grayscale sources single-channel.
    #[must_use]
    pub fn from_image(image: &DynamicImage) -> Self {
        let (width, height) = (image.width() as usize, image.height() as usize);
        match flatten_alpha(image) {
            DynamicImage::ImageLuma8(gray) => Self::gray(gray.into_raw(), width, height),
            flat => Self::rgb(flat.to_rgb8().as_raw(), width, height),
        }
    }

    /// Image width.
    #[must_use]
    pub fn width(&self) -> usize {
        match self {
            Self::Gray(img) => img.width(),
            Self::Rgb(img) => img.width(),
        }
    }

    /// Image height.
    #[must_use]
    pub fn height(&self) -> usize {
        match self {
            Self::Gray(img) => img.height(),
            Self::Rgb(img) => img.height(),
        }
    }

    /// (width, height) pair.
    #[must_use]
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width(), self.height())
    }

    /// Number of channels (1 or 3).
    #[must_use]
    pub fn channels(&self) -> usize {
        match self {
            Self::Gray(_) => 1,
            Self::Rgb(_) => 3,
        }
    }

    /// Interleaved RGB bytes; grayscale samples are replicated to all three channels.
    #[must_use]
    pub fn to_rgb8_vec(&self) -> Vec<u8> {
        match self {
            Self::Gray(img) => img.pixels().flat_map(|g| [g, g, g]).collect(),
            Self::Rgb(img) => img.pixels().flat_map(|p| [p.r, p.g, p.b]).collect(),
        }
    }

    /// Raw samples in their native channel layout.
    #[must_use]
    pub fn samples(&self) -> Vec<u8> {
        match self {
            Self::Gray(img) => img.pixels().collect(),
            Self::Rgb(_) => self.to_rgb8_vec(),
        }
    }

    /// Per-pixel luminance; grayscale samples are used as-is.
    #[must_use]
    pub fn luminance(&self) -> Vec<f64> {
        match self {
            Self::Gray(img) => img.pixels().map(f64::from).collect(),
            Self::Rgb(img) => img
                .pixels()
                .map(|p| {
                    LUMA_WEIGHTS[0] * f64::from(p.r)
                        + LUMA_WEIGHTS[1] * f64::from(p.g)
                        + LUMA_WEIGHTS[2] * f64::from(p.b)
                })
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{LumaA, Rgba, RgbaImage};

    #[test]
    fn test_gray_source_stays_single_channel() {
        let img = DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 3, Luma([9])));
        let raster = Raster::from_image(&img);
        assert_eq!(raster.channels(), 1);
        assert_eq!(raster.dimensions(), (4, 3));
    }

    #[test]
    fn test_alpha_composited_over_background() {
        let img = RgbaImage::from_fn(3, 1, |x, _| match x {
            0 => Rgba([10, 20, 30, 255]),
            1 => Rgba([10, 20, 30, 0]),
            _ => Rgba([0, 0, 0, 128]),
        });
        let raster = Raster::from_image(&DynamicImage::ImageRgba8(img));
        assert_eq!(raster.channels(), 3);
        assert_eq!(
            raster.to_rgb8_vec(),
            vec![10, 20, 30, 255, 255, 255, 127, 127, 127]
        );
    }

    #[test]
    fn test_hidden_color_does_not_matter() {
        let a = RgbaImage::from_pixel(2, 2, Rgba([200, 0, 0, 0]));
        let b = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let a = Raster::from_image(&DynamicImage::ImageRgba8(a));
        let b = Raster::from_image(&DynamicImage::ImageRgba8(b));
        assert_eq!(a.to_rgb8_vec(), b.to_rgb8_vec());
    }

    #[test]
    fn test_gray_alpha_stays_single_channel() {
        let img = image::GrayAlphaImage::from_pixel(2, 1, LumaA([40, 0]));
        let raster = Raster::from_image(&DynamicImage::ImageLumaA8(img));
        assert_eq!(raster.channels(), 1);
        assert_eq!(raster.samples(), vec![BACKGROUND, BACKGROUND]);
    }

    #[test]
    fn test_gray_replication() {
        let raster = Raster::gray(vec![1, 2], 2, 1);
        assert_eq!(raster.to_rgb8_vec(), vec![1, 1, 1, 2, 2, 2]);
        assert_eq!(raster.samples(), vec![1, 2]);
    }

    #[test]
    fn test_luminance_weights() {
        let raster = Raster::rgb(&[255, 0, 0, 0, 0, 255], 2, 1);
        let luma = raster.luminance();
        assert!((luma[0] - 0.2989 * 255.0).abs() < 1e-9);
        assert!((luma[1] - 0.1140 * 255.0).abs() < 1e-9);
    }
}

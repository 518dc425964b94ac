//! Whole-image SSIM approximation.
//!
//! Computes the structural similarity formula once over the entire image
//! (a single window spanning every pixel) on luminance. This is coarser than
//! the canonical Gaussian-windowed SSIM and will not match reference
//! implementations; scores are comparable only with other runs of this crate.

use crate::error::Result;
use crate::raster::Raster;

use super::ensure_same_dimensions;

/// Stabilization constant for the luminance term, `(0.01 * 255)^2`.
pub const C1: f64 = (0.01 * 255.0) * (0.01 * 255.0);

/// Stabilization constant for the contrast/structure term, `(0.03 * 255)^2`.
pub const C2: f64 = (0.03 * 255.0) * (0.03 * 255.0);

/// Calculate single-window SSIM between two rasters.
///
/// RGB inputs are reduced to luminance (`0.2989 R + 0.5870 G + 0.1140 B`);
/// grayscale inputs are used as-is. Means, population variances and the
/// covariance are taken over the whole image.
///
/// Returns a value in roughly `[-1, 1]`; `1.0` for identical inputs.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`](crate::Error::DimensionMismatch) if
/// the rasters differ in width or height.
pub fn ssim(a: &Raster, b: &Raster) -> Result<f64> {
    ensure_same_dimensions(a, b)?;

    let x = a.luminance();
    let y = b.luminance();
    if x.is_empty() {
        return Ok(1.0);
    }
    let n = x.len() as f64;

    let mu_x = x.iter().sum::<f64>() / n;
    let mu_y = y.iter().sum::<f64>() / n;

    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov = 0.0;
    for (&px, &py) in x.iter().zip(&y) {
        let dx = px - mu_x;
        let dy = py - mu_y;
        var_x += dx * dx;
        var_y += dy * dy;
        cov += dx * dy;
    }
    var_x /= n;
    var_y /= n;
    cov /= n;

    // 2 * (mu_x * mu_y) rather than (2 * mu_x) * mu_y keeps ssim(a, b) == ssim(b, a) bit-exact.
    let numerator = (2.0 * (mu_x * mu_y) + C1) * (2.0 * cov + C2);
    let denominator = (mu_x * mu_x + mu_y * mu_y + C1) * (var_x + var_y + C2);

    Ok(numerator / denominator)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gradient(width: usize, height: usize, offset: u8) -> Raster {
        let data = (0..width * height)
            .map(|i| ((i % 200) as u8).saturating_add(offset))
            .collect();
        Raster::gray(data, width, height)
    }

    #[test]
    fn test_ssim_identical() {
        let img = gradient(32, 32, 0);
        let score = ssim(&img, &img).unwrap();
        assert!((score - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ssim_identical_flat() {
        let img = Raster::rgb(&[77u8; 10 * 10 * 3], 10, 10);
        assert!((ssim(&img, &img).unwrap() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_ssim_symmetric() {
        let a = gradient(16, 16, 0);
        let b = gradient(16, 16, 30);
        assert_eq!(ssim(&a, &b).unwrap(), ssim(&b, &a).unwrap());
    }

    #[test]
    fn test_ssim_degrades_with_distortion() {
        let reference = gradient(16, 16, 0);
        let slight = gradient(16, 16, 2);
        let heavy = Raster::gray(vec![128; 256], 16, 16);

        let s_slight = ssim(&reference, &slight).unwrap();
        let s_heavy = ssim(&reference, &heavy).unwrap();
        assert!(s_slight < 1.0);
        assert!(s_heavy < s_slight);
    }

    #[test]
    fn test_ssim_inverted_structure_is_negative() {
        let a = Raster::gray(vec![0, 255, 0, 255], 2, 2);
        let b = Raster::gray(vec![255, 0, 255, 0], 2, 2);
        assert!(ssim(&a, &b).unwrap() < 0.0);
    }

    #[test]
    fn test_ssim_rgb_uses_luminance() {
        let rgb = Raster::rgb(&[100u8; 8 * 8 * 3], 8, 8);
        // 0.2989 + 0.5870 + 0.1140 = 0.9999, so gray 100 is a near-perfect match.
        let gray = Raster::gray(vec![100; 64], 8, 8);
        assert!(ssim(&rgb, &gray).unwrap() > 0.9999);
    }

    #[test]
    fn test_ssim_dimension_mismatch() {
        let a = gradient(8, 8, 0);
        let b = gradient(4, 4, 0);
        assert!(ssim(&a, &b).is_err());
    }
}

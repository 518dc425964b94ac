//! Fidelity metrics for image comparison.
//!
//! Supported metrics:
//!
//! - **PSNR**: Peak Signal-to-Noise Ratio in dB (higher is better, infinite
//!   when identical)
//! - **SSIM**: single-window structural similarity on luminance (higher is
//!   better, 1.0 when identical); see [`ssim`] for its precision trade-off
//!
//! Both functions are pure and require inputs of equal width and height.

pub mod ssim;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::raster::Raster;

pub use ssim::ssim;

/// PSNR and SSIM for one reference/test pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Fidelity {
    /// PSNR in dB; `f64::INFINITY` for identical images.
    pub psnr: f64,
    /// Whole-image SSIM.
    pub ssim: f64,
}

impl Fidelity {
    /// Compute both metrics.
    pub fn measure(reference: &Raster, test: &Raster) -> Result<Self> {
        Ok(Self {
            psnr: psnr(reference, test)?,
            ssim: ssim(reference, test)?,
        })
    }
}

pub(crate) fn ensure_same_dimensions(a: &Raster, b: &Raster) -> Result<()> {
    if a.dimensions() != b.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: a.dimensions(),
            actual: b.dimensions(),
        });
    }
    Ok(())
}

/// Calculate PSNR between two rasters.
///
/// When one raster is grayscale and the other RGB, the grayscale samples are
/// replicated to three channels before comparing; no colorimetric conversion
/// takes place.
///
/// # Returns
///
/// `20 * log10(255 / sqrt(MSE))` in decibels, or `f64::INFINITY` if the
/// images are identical.
///
/// # Errors
///
/// Returns [`Error::DimensionMismatch`] if the rasters differ in width or
/// height.
pub fn psnr(a: &Raster, b: &Raster) -> Result<f64> {
    ensure_same_dimensions(a, b)?;

    let (reference, test) = if a.channels() == b.channels() {
        (a.samples(), b.samples())
    } else {
        (a.to_rgb8_vec(), b.to_rgb8_vec())
    };

    Ok(psnr_from_mse(mean_squared_error(&reference, &test)))
}

fn mean_squared_error(reference: &[u8], test: &[u8]) -> f64 {
    debug_assert_eq!(reference.len(), test.len());
    if reference.is_empty() {
        return 0.0;
    }

    let sum: f64 = reference
        .iter()
        .zip(test)
        .map(|(&r, &t)| {
            let diff = f64::from(r) - f64::from(t);
            diff * diff
        })
        .sum();

    sum / reference.len() as f64
}

fn psnr_from_mse(mse: f64) -> f64 {
    if mse == 0.0 {
        f64::INFINITY
    } else {
        20.0 * (255.0 / mse.sqrt()).log10()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_psnr_identical() {
        let data = vec![128u8; 100 * 100 * 3];
        let img = Raster::rgb(&data, 100, 100);
        assert!(psnr(&img, &img).unwrap().is_infinite());
    }

    #[test]
    fn test_psnr_different() {
        let reference = Raster::rgb(&vec![100u8; 100 * 100 * 3], 100, 100);
        let test = Raster::rgb(&vec![110u8; 100 * 100 * 3], 100, 100);
        let value = psnr(&reference, &test).unwrap();
        // Constant difference of 10: 20 * log10(255 / 10) ≈ 28.13
        assert!((value - 28.1308).abs() < 1e-3);
    }

    #[test]
    fn test_psnr_symmetric() {
        let a = Raster::gray((0..=255).collect(), 16, 16);
        let b = Raster::gray((0..=255).rev().collect(), 16, 16);
        assert_eq!(psnr(&a, &b).unwrap(), psnr(&b, &a).unwrap());
    }

    #[test]
    fn test_psnr_broadcasts_gray() {
        let gray: Vec<u8> = (0..64).map(|i| (i * 3) as u8).collect();
        let g = Raster::gray(gray.clone(), 8, 8);
        let g3 = Raster::rgb(&gray.iter().flat_map(|&v| [v, v, v]).collect::<Vec<_>>(), 8, 8);
        let x = Raster::rgb(&(0..192).map(|i| (i % 251) as u8).collect::<Vec<_>>(), 8, 8);

        assert_eq!(psnr(&g, &x).unwrap(), psnr(&g3, &x).unwrap());
        assert!(psnr(&g, &g3).unwrap().is_infinite());
    }

    #[test]
    fn test_psnr_dimension_mismatch() {
        let a = Raster::gray(vec![0; 16], 4, 4);
        let b = Raster::gray(vec![0; 8], 4, 2);
        match psnr(&a, &b) {
            Err(Error::DimensionMismatch { expected, actual }) => {
                assert_eq!(expected, (4, 4));
                assert_eq!(actual, (4, 2));
            }
            other => panic!("expected DimensionMismatch, got {other:?}"),
        }
    }

    #[test]
    fn test_fidelity_measure_identical() {
        let img = Raster::gray(vec![42; 25], 5, 5);
        let fidelity = Fidelity::measure(&img, &img).unwrap();
        assert!(fidelity.psnr.is_infinite());
        assert!((fidelity.ssim - 1.0).abs() < 1e-12);
    }
}

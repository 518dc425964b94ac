//! # compress-eval
//!
//! Compare image compression strategies by output size and fidelity.
//!
//! One source image is run through a fixed set of encode/transform
//! strategies. Each artifact is written to disk, decoded again and scored
//! against the source with PSNR and a whole-image SSIM approximation. The
//! results are ranked by compression ratio.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use compress_eval::{EvalConfig, EvalSession, SourceImage};
//!
//! let config = EvalConfig::builder().output_dir("./compressed").build();
//! let session = EvalSession::new(config);
//!
//! let source = SourceImage::open("photo.png")?;
//! let report = session.evaluate(&source)?.into_report(&source);
//! session.write_report(&report)?;
//! print!("{}", report.render_summary());
//! ```
//!
//! ## Modules
//!
//! - [`error`]: Error types for the library
//! - [`raster`]: 8-bit gray/RGB buffers compared by the metrics
//! - [`decode`]: Source loading and artifact decoding
//! - [`metrics`]: PSNR and SSIM
//! - [`strategy`]: The built-in compression strategies
//! - [`eval`]: Evaluation session and report generation
//!
//! ## Features
//!
//! - `quantize`: adds the `PNG Quantized` strategy via imagequant. imagequant
//!   is GPL-3.0-or-later, so enabling this feature changes the effective
//!   license.

pub mod decode;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod raster;
pub mod strategy;

// Re-export commonly used types
pub use decode::SourceImage;
pub use error::{Error, Result};
pub use eval::{
    report::{Report, ResultRecord},
    session::{EvalConfig, EvalSession, Evaluation, FailurePolicy, StrategyFailure},
};
pub use metrics::{Fidelity, psnr, ssim};
pub use raster::Raster;
pub use strategy::{Artifact, Strategy, StrategySpec};

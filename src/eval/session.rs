//! Evaluation session over a fixed list of strategies.
//!
//! [`EvalSession`] runs each strategy once against a [`SourceImage`], decodes
//! the artifact it wrote, scores it against the source and collects one
//! [`ResultRecord`] per successful strategy. Strategies run sequentially in
//! registration order.

use std::path::{Path, PathBuf};

use crate::decode::{SourceImage, decode_artifact};
use crate::error::{Error, Result};
use crate::eval::report::{Report, ResultRecord, format_psnr};
use crate::metrics::Fidelity;
use crate::raster::Raster;
use crate::strategy::{self, Strategy, resample};

/// Default output directory, relative to the working directory.
pub const DEFAULT_OUTPUT_DIR: &str = "compressed";

/// Default report file stem.
pub const DEFAULT_REPORT_NAME: &str = "compression_report";

/// What to do when a single strategy fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FailurePolicy {
    /// Log the failure, leave the strategy out of the report and continue.
    #[default]
    SkipFailed,
    /// Stop the session at the first failing strategy.
    Abort,
}

/// Configuration for an evaluation session.
#[derive(Debug, Clone)]
pub struct EvalConfig {
    /// Directory for artifacts and reports.
    pub output_dir: PathBuf,

    /// Report file stem (`<name>.json`, `<name>.csv`).
    pub report_name: String,

    /// Behaviour on strategy failure.
    pub failure_policy: FailurePolicy,

    /// Also write a CSV summary next to the JSON report.
    pub write_csv: bool,
}

impl EvalConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> EvalConfigBuilder {
        EvalConfigBuilder::default()
    }

    /// Path of the JSON report.
    #[must_use]
    pub fn json_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.json", self.report_name))
    }

    /// Path of the CSV summary.
    #[must_use]
    pub fn csv_path(&self) -> PathBuf {
        self.output_dir.join(format!("{}.csv", self.report_name))
    }
}

impl Default for EvalConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

/// Builder for [`EvalConfig`].
#[derive(Debug, Default)]
pub struct EvalConfigBuilder {
    output_dir: Option<PathBuf>,
    report_name: Option<String>,
    failure_policy: Option<FailurePolicy>,
    write_csv: Option<bool>,
}

impl EvalConfigBuilder {
    /// Set the output directory.
    #[must_use]
    pub fn output_dir(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_dir = Some(path.into());
        self
    }

    /// Set the report file stem.
    #[must_use]
    pub fn report_name(mut self, name: impl Into<String>) -> Self {
        self.report_name = Some(name.into());
        self
    }

    /// Set the failure policy.
    #[must_use]
    pub fn failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = Some(policy);
        self
    }

    /// Enable or disable the CSV summary.
    #[must_use]
    pub fn write_csv(mut self, enabled: bool) -> Self {
        self.write_csv = Some(enabled);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> EvalConfig {
        EvalConfig {
            output_dir: self
                .output_dir
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            report_name: self
                .report_name
                .unwrap_or_else(|| DEFAULT_REPORT_NAME.to_string()),
            failure_policy: self.failure_policy.unwrap_or_default(),
            write_csv: self.write_csv.unwrap_or(true),
        }
    }
}

/// A strategy that was left out of the results.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyFailure {
    /// Strategy name.
    pub strategy: String,
    /// Rendered error.
    pub reason: String,
}

/// Outcome of running every strategy once.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    /// Records in strategy order.
    pub records: Vec<ResultRecord>,
    /// Strategies skipped under [`FailurePolicy::SkipFailed`].
    pub failures: Vec<StrategyFailure>,
}

impl Evaluation {
    /// Rank the records into a report for `source`.
    #[must_use]
    pub fn into_report(self, source: &SourceImage) -> Report {
        Report::build(source.path(), source.byte_size(), self.records)
    }

    /// Whether every strategy produced a record.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Evaluation session for compression strategies.
///
/// # Example
///
/// ```rust,ignore
/// use compress_eval::{EvalConfig, EvalSession, SourceImage};
///
/// let session = EvalSession::new(EvalConfig::builder().output_dir("out").build());
/// let source = SourceImage::open("photo.png")?;
/// let evaluation = session.evaluate(&source)?;
/// let report = evaluation.into_report(&source);
/// session.write_report(&report)?;
/// print!("{}", report.render_summary());
/// ```
pub struct EvalSession {
    config: EvalConfig,
    strategies: Vec<Box<dyn Strategy>>,
}

impl EvalSession {
    /// Create a session with the built-in strategies.
    #[must_use]
    pub fn new(config: EvalConfig) -> Self {
        Self::with_strategies(config, strategy::builtin())
    }

    /// Create a session with an explicit strategy list.
    #[must_use]
    pub fn with_strategies(config: EvalConfig, strategies: Vec<Box<dyn Strategy>>) -> Self {
        Self { config, strategies }
    }

    /// Append a strategy.
    pub fn add_strategy(&mut self, strategy: Box<dyn Strategy>) -> &mut Self {
        self.strategies.push(strategy);
        self
    }

    /// Get the number of registered strategies.
    #[must_use]
    pub fn strategy_count(&self) -> usize {
        self.strategies.len()
    }

    /// Session configuration.
    #[must_use]
    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    /// Run every strategy against `source`.
    ///
    /// Creates the output directory if needed. Under
    /// [`FailurePolicy::SkipFailed`] failing strategies are collected in
    /// [`Evaluation::failures`]; under [`FailurePolicy::Abort`] the first
    /// failure is returned.
    pub fn evaluate(&self, source: &SourceImage) -> Result<Evaluation> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        log::info!(
            "Evaluating {} ({}x{}, {} bytes) with {} strategies",
            source.path().display(),
            source.width(),
            source.height(),
            source.byte_size(),
            self.strategies.len()
        );

        let mut evaluation = Evaluation::default();
        for strategy in &self.strategies {
            match self.evaluate_strategy(source, strategy.as_ref()) {
                Ok(record) => {
                    log::debug!(
                        "{}: {} bytes, ratio {:.3}, PSNR {}, SSIM {:.4}",
                        record.method,
                        record.compressed_size,
                        record.compression_ratio,
                        format_psnr(record.psnr),
                        record.ssim
                    );
                    evaluation.records.push(record);
                }
                Err(e) => match self.config.failure_policy {
                    FailurePolicy::Abort => return Err(e),
                    FailurePolicy::SkipFailed => {
                        log::warn!("Skipping {}: {}", strategy.name(), e);
                        evaluation.failures.push(StrategyFailure {
                            strategy: strategy.name().to_string(),
                            reason: e.to_string(),
                        });
                    }
                },
            }
        }

        log::info!(
            "Evaluated {} of {} strategies",
            evaluation.records.len(),
            self.strategies.len()
        );
        Ok(evaluation)
    }

    /// Run one strategy and score its artifact.
    pub fn evaluate_strategy(
        &self,
        source: &SourceImage,
        strategy: &dyn Strategy,
    ) -> Result<ResultRecord> {
        let name = strategy.name();
        let artifact = strategy.apply(source, &self.config.output_dir)?;

        let fidelity = {
            let decoded = decode_artifact(&artifact.path).map_err(|e| Error::strategy(name, e))?;
            let decoded = if strategy.changes_dimensions()
                && (decoded.width(), decoded.height()) != (source.width(), source.height())
            {
                decoded.resize_exact(source.width(), source.height(), resample::FILTER)
            } else {
                decoded
            };
            Fidelity::measure(source.raster(), &Raster::from_image(&decoded))
                .map_err(|e| Error::strategy(name, e))?
        };

        ResultRecord::new(
            name,
            artifact.path,
            source.byte_size(),
            artifact.byte_size,
            fidelity,
            artifact.elapsed,
        )
    }

    /// Write the JSON report (and CSV summary if enabled).
    ///
    /// Returns the written paths.
    ///
    /// # Errors
    ///
    /// Any failure is reported as [`Error::ReportWriteFailed`].
    pub fn write_report(&self, report: &Report) -> Result<Vec<PathBuf>> {
        let json_path = self.config.json_path();
        let failed = |path: &Path, reason: String| Error::ReportWriteFailed {
            path: path.to_path_buf(),
            reason,
        };

        std::fs::create_dir_all(&self.config.output_dir)
            .map_err(|e| failed(&self.config.output_dir, e.to_string()))?;

        let json =
            serde_json::to_string_pretty(report).map_err(|e| failed(&json_path, e.to_string()))?;
        std::fs::write(&json_path, json).map_err(|e| failed(&json_path, e.to_string()))?;
        let mut written = vec![json_path];

        if self.config.write_csv {
            let csv_path = self.config.csv_path();
            write_csv_summary(report, &csv_path).map_err(|e| failed(&csv_path, e.to_string()))?;
            written.push(csv_path);
        }

        log::info!("Report written to {}", written[0].display());
        Ok(written)
    }
}

/// Write a CSV summary of the ranked records.
fn write_csv_summary(report: &Report, path: &Path) -> Result<()> {
    let mut wtr = csv::Writer::from_path(path)?;

    wtr.write_record([
        "method",
        "path",
        "original_size",
        "compressed_size",
        "compression_ratio",
        "size_reduction",
        "psnr",
        "ssim",
        "processing_time",
    ])?;

    for record in &report.compression_results {
        wtr.write_record([
            &record.method,
            &record.path.display().to_string(),
            &record.original_size.to_string(),
            &record.compressed_size.to_string(),
            &format!("{:.4}", record.compression_ratio),
            &format!("{:.1}", record.size_reduction),
            &format_psnr(record.psnr),
            &format!("{:.4}", record.ssim),
            &format!("{:.3}", record.processing_time.as_secs_f64()),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}

//! Report types for evaluation results.
//!
//! This module defines the per-strategy [`ResultRecord`], the ranked
//! [`Report`], and the human-readable summary rendering. Reports serialize to
//! JSON; see [`EvalSession::write_report`](super::EvalSession::write_report).

use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::metrics::Fidelity;

/// Result from evaluating a single strategy on the source image.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    /// Strategy name.
    pub method: String,

    /// Path of the written artifact.
    pub path: PathBuf,

    /// Source file size in bytes.
    pub original_size: u64,

    /// Artifact file size in bytes; never zero.
    pub compressed_size: u64,

    /// `original_size / compressed_size`.
    pub compression_ratio: f64,

    /// `(1 - compressed_size / original_size) * 100`.
    pub size_reduction: f64,

    /// PSNR in dB; infinite when the artifact decodes bit-identical.
    #[serde(with = "psnr_db")]
    pub psnr: f64,

    /// Whole-image SSIM.
    pub ssim: f64,

    /// Time spent producing the artifact.
    #[serde(with = "duration_secs")]
    pub processing_time: Duration,
}

impl ResultRecord {
    /// Build a record, deriving the size ratios.
    ///
    /// # Errors
    ///
    /// A zero `compressed_size` is rejected as [`Error::StrategyFailed`].
    pub fn new(
        method: &str,
        path: impl Into<PathBuf>,
        original_size: u64,
        compressed_size: u64,
        fidelity: Fidelity,
        processing_time: Duration,
    ) -> Result<Self> {
        if compressed_size == 0 {
            return Err(Error::strategy(method, "artifact is empty"));
        }

        let original = original_size as f64;
        let compressed = compressed_size as f64;

        Ok(Self {
            method: method.to_string(),
            path: path.into(),
            original_size,
            compressed_size,
            compression_ratio: original / compressed,
            size_reduction: (1.0 - compressed / original) * 100.0,
            psnr: fidelity.psnr,
            ssim: fidelity.ssim,
            processing_time,
        })
    }

    /// Whether the artifact decoded bit-identical to the source.
    #[must_use]
    pub fn is_lossless(&self) -> bool {
        self.psnr == f64::INFINITY
    }
}

/// Ranked results for one source image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    /// Path of the source image.
    pub input_image: PathBuf,

    /// Source file size in bytes.
    pub original_size: u64,

    /// Records ordered by compression ratio, best first.
    pub compression_results: Vec<ResultRecord>,

    /// When this report was generated.
    #[serde(with = "chrono_serde")]
    pub generated_at: chrono::DateTime<chrono::Utc>,
}

impl Report {
    /// Rank records by compression ratio, descending.
    ///
    /// The sort is stable: records with equal ratios keep their input order.
    #[must_use]
    pub fn build(input_image: &Path, original_size: u64, mut records: Vec<ResultRecord>) -> Self {
        records.sort_by(|a, b| b.compression_ratio.total_cmp(&a.compression_ratio));
        Self {
            input_image: input_image.to_path_buf(),
            original_size,
            compression_results: records,
            generated_at: chrono::Utc::now(),
        }
    }

    /// Record with the highest compression ratio.
    #[must_use]
    pub fn best_ratio(&self) -> Option<&ResultRecord> {
        self.compression_results.first()
    }

    /// Records whose artifacts decode bit-identical to the source.
    pub fn lossless(&self) -> impl Iterator<Item = &ResultRecord> {
        self.compression_results.iter().filter(|r| r.is_lossless())
    }

    /// Render the multi-line console summary.
    #[must_use]
    pub fn render_summary(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "=== Compression Report ===");
        let _ = writeln!(out, "Original image: {}", self.input_image.display());
        let _ = writeln!(
            out,
            "Original size: {} bytes",
            group_thousands(self.original_size)
        );
        let _ = writeln!(out);

        for record in &self.compression_results {
            let _ = writeln!(out, "{}:", record.method);
            let _ = writeln!(
                out,
                "  Size: {} bytes",
                group_thousands(record.compressed_size)
            );
            let _ = writeln!(out, "  Reduction: {:.1}%", record.size_reduction);
            let _ = writeln!(out, "  PSNR: {} dB", format_psnr(record.psnr));
            let _ = writeln!(out, "  SSIM: {:.4}", record.ssim);
            let _ = writeln!(
                out,
                "  Time: {:.2}s",
                record.processing_time.as_secs_f64()
            );
            let _ = writeln!(out);
        }

        out
    }
}

/// PSNR with two decimals, `inf` when infinite.
#[must_use]
pub fn format_psnr(psnr: f64) -> String {
    if psnr.is_infinite() {
        let text = if psnr > 0.0 { "inf" } else { "-inf" };
        text.to_string()
    } else {
        format!("{:.2}", psnr)
    }
}

/// Format an integer with `,` thousands separators.
#[must_use]
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

// JSON has no infinity literal; non-finite PSNR values are written as strings.
mod psnr_db {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(psnr: &f64, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        if psnr.is_finite() {
            serializer.serialize_f64(*psnr)
        } else if psnr.is_nan() {
            serializer.serialize_str("nan")
        } else {
            serializer.serialize_str(&super::format_psnr(*psnr))
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Repr {
        Number(f64),
        Text(String),
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<f64, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Repr::deserialize(deserializer)? {
            Repr::Number(v) => Ok(v),
            Repr::Text(text) => match text.as_str() {
                "inf" => Ok(f64::INFINITY),
                "-inf" => Ok(f64::NEG_INFINITY),
                "nan" => Ok(f64::NAN),
                other => Err(D::Error::custom(format!("invalid PSNR value: {other}"))),
            },
        }
    }
}

// Duration as floating-point seconds
mod duration_secs {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serialize, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(D::Error::custom)
    }
}

mod chrono_serde {
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(dt: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        dt.to_rfc3339().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(method: &str, compressed: u64, psnr: f64) -> ResultRecord {
        ResultRecord::new(
            method,
            format!("out/{method}.png"),
            10_000,
            compressed,
            Fidelity { psnr, ssim: 0.98 },
            Duration::from_millis(250),
        )
        .unwrap()
    }

    #[test]
    fn test_record_ratios() {
        let r = record("a", 2_500, 40.0);
        assert!((r.compression_ratio - 4.0).abs() < 1e-12);
        assert!((r.size_reduction - 75.0).abs() < 1e-12);
        assert!(
            (r.compression_ratio - r.original_size as f64 / r.compressed_size as f64).abs() < 1e-12
        );
    }

    #[test]
    fn test_record_growth_is_negative_reduction() {
        let r = record("a", 20_000, 40.0);
        assert!((r.compression_ratio - 0.5).abs() < 1e-12);
        assert!((r.size_reduction + 100.0).abs() < 1e-12);
    }

    #[test]
    fn test_record_rejects_empty_artifact() {
        let err = ResultRecord::new(
            "empty",
            "x",
            100,
            0,
            Fidelity { psnr: 1.0, ssim: 1.0 },
            Duration::ZERO,
        )
        .unwrap_err();
        assert!(matches!(err, Error::StrategyFailed { .. }));
    }

    #[test]
    fn test_report_ranking_is_stable_and_descending() {
        let records = vec![
            record("first", 5_000, 30.0),
            record("best", 1_000, 30.0),
            record("tie", 5_000, 30.0),
            record("worst", 9_000, f64::INFINITY),
        ];
        let report = Report::build(Path::new("in.png"), 10_000, records);

        let order: Vec<&str> = report
            .compression_results
            .iter()
            .map(|r| r.method.as_str())
            .collect();
        assert_eq!(order, ["best", "first", "tie", "worst"]);
        assert!(
            report
                .compression_results
                .windows(2)
                .all(|w| w[0].compression_ratio >= w[1].compression_ratio)
        );
        assert_eq!(report.best_ratio().unwrap().method, "best");
        assert_eq!(report.lossless().count(), 1);
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1,000");
        assert_eq!(group_thousands(1_234_567), "1,234,567");
    }

    #[test]
    fn test_summary_precision() {
        let mut r = record("PNG Max", 3_333, 41.23456);
        r.ssim = 0.987_654_3;
        r.processing_time = Duration::from_millis(1_236);
        let report = Report::build(Path::new("photo.png"), 10_000, vec![r]);
        let summary = report.render_summary();

        assert!(summary.contains("Original size: 10,000 bytes"));
        assert!(summary.contains("PNG Max:"));
        assert!(summary.contains("Size: 3,333 bytes"));
        assert!(summary.contains("Reduction: 66.7%"));
        assert!(summary.contains("PSNR: 41.23 dB"));
        assert!(summary.contains("SSIM: 0.9877"));
        assert!(summary.contains("Time: 1.24s"));
    }

    #[test]
    fn test_summary_infinite_psnr() {
        let report = Report::build(
            Path::new("a.png"),
            10_000,
            vec![record("lossless", 8_000, f64::INFINITY)],
        );
        assert!(report.render_summary().contains("PSNR: inf dB"));
    }

    #[test]
    fn test_json_infinite_psnr_roundtrip() {
        let report = Report::build(
            Path::new("a.png"),
            10_000,
            vec![record("lossless", 8_000, f64::INFINITY), record("lossy", 2_000, 35.5)],
        );
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"psnr\":\"inf\""));
        assert!(json.contains("\"psnr\":35.5"));

        let back: Report = serde_json::from_str(&json).unwrap();
        assert!(back.compression_results[1].psnr.is_infinite());
        assert!((back.compression_results[0].psnr - 35.5).abs() < 1e-12);
        assert_eq!(back.compression_results[0].method, "lossy");
        assert_eq!(back.compression_results[1].processing_time, Duration::from_millis(250));
    }
}

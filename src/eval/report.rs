//! Report types for comparison results.
//!
//! A [`ComparisonReport`] renders as the human-readable text report printed
//! by the command line tool, and serializes to JSON or CSV rows for
//! pipelines that collect many comparisons.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::eval::session::PooledComparison;
use crate::metrics::EvalParams;
use crate::stats::{PooledSummary, fixed_decimal};

/// Decimal digits for exposure values in the text report.
pub const EXPOSURE_DIGITS: usize = 4;

/// Decimal digits for error statistics in the text report.
pub const STAT_DIGITS: usize = 6;

/// Result of comparing one test image against one reference.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Path to the reference image.
    pub reference: PathBuf,

    /// Path to the test image.
    pub test: PathBuf,

    /// Image dimensions.
    pub width: usize,
    pub height: usize,

    /// Whether the comparison ran in HDR mode.
    pub hdr: bool,

    /// Name of the error evaluator.
    pub evaluator: String,

    /// Evaluator parameters, including any the evaluator resolved itself.
    pub params: EvalParams,

    /// Number of histogram bins used for pooling.
    pub bins: usize,

    /// Pooled error statistics.
    pub summary: PooledSummary,

    /// When the comparison was run.
    #[serde(with = "chrono_serde")]
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl ComparisonReport {
    /// Create a report from a pooled comparison.
    #[must_use]
    pub fn new(
        reference: PathBuf,
        test: PathBuf,
        pooled: &PooledComparison,
        evaluator: &str,
        summary: PooledSummary,
    ) -> Self {
        Self {
            reference,
            test,
            width: pooled.width,
            height: pooled.height,
            hdr: pooled.hdr,
            evaluator: evaluator.to_string(),
            params: pooled.params.clone(),
            bins: pooled.pool.bin_count(),
            summary,
            timestamp: chrono::Utc::now(),
        }
    }

    /// Write the text report.
    ///
    /// Exposure values use [`EXPOSURE_DIGITS`] decimals, statistics use
    /// [`STAT_DIGITS`]. Exposure fields the evaluator left unresolved (LDR
    /// comparisons) print as `-`.
    pub fn write_text<W: Write>(&self, out: &mut W) -> std::io::Result<()> {
        let exposure = |value: Option<f32>| {
            value.map_or_else(|| "-".to_string(), |v| fixed_decimal(f64::from(v), EXPOSURE_DIGITS))
        };
        let count = self
            .params
            .num_exposures
            .map_or_else(|| "-".to_string(), |n| n.to_string());
        let stat = |value: f64| fixed_decimal(value, STAT_DIGITS);

        writeln!(out, "     Assumed tone mapper: {}", self.params.tonemapper)?;
        writeln!(out, "     Start exposure: {}", exposure(self.params.start_exposure))?;
        writeln!(out, "     Stop exposure: {}", exposure(self.params.stop_exposure))?;
        writeln!(out, "     Number of exposures: {count}")?;
        writeln!(out)?;
        writeln!(
            out,
            "Pooled error between reference image <{}> and test image <{}>",
            self.reference.display(),
            self.test.display()
        )?;
        writeln!(out, "     Mean: {}", stat(self.summary.mean))?;
        writeln!(out, "     Weighted median: {}", stat(self.summary.weighted_median))?;
        writeln!(out, "     1st weighted quartile: {}", stat(self.summary.weighted_q1))?;
        writeln!(out, "     3rd weighted quartile: {}", stat(self.summary.weighted_q3))?;
        writeln!(out, "     Min: {}", stat(self.summary.min))?;
        writeln!(out, "     Max: {}", stat(self.summary.max))?;
        Ok(())
    }

    /// Render the text report into a string.
    #[must_use]
    pub fn to_text(&self) -> String {
        let mut buf = Vec::new();
        // Writing into a Vec cannot fail.
        let _ = self.write_text(&mut buf);
        String::from_utf8_lossy(&buf).into_owned()
    }

    /// Write the report as pretty-printed JSON.
    pub fn write_json(&self, path: &Path) -> Result<()> {
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    /// Append the report as one CSV row, writing the header if the file is new
    /// or empty.
    pub fn append_csv_row(&self, path: &Path) -> Result<()> {
        let needs_header = std::fs::metadata(path).map_or(true, |m| m.len() == 0);
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        let mut writer = csv::WriterBuilder::new().has_headers(false).from_writer(file);

        if needs_header {
            writer.write_record(CSV_HEADER)?;
        }

        let s = &self.summary;
        let optional = |v: Option<f32>| v.map(|v| v.to_string()).unwrap_or_default();
        writer.write_record([
            self.reference.display().to_string(),
            self.test.display().to_string(),
            self.width.to_string(),
            self.height.to_string(),
            self.hdr.to_string(),
            self.evaluator.clone(),
            self.params.tonemapper.label().to_string(),
            optional(self.params.start_exposure),
            optional(self.params.stop_exposure),
            self.params.num_exposures.map(|n| n.to_string()).unwrap_or_default(),
            self.bins.to_string(),
            s.mean.to_string(),
            s.std_dev.to_string(),
            s.weighted_median.to_string(),
            s.weighted_q1.to_string(),
            s.weighted_q3.to_string(),
            s.median.to_string(),
            s.min.to_string(),
            s.max.to_string(),
            self.timestamp.to_rfc3339(),
        ])?;
        writer.flush()?;
        Ok(())
    }
}

const CSV_HEADER: [&str; 20] = [
    "reference",
    "test",
    "width",
    "height",
    "hdr",
    "evaluator",
    "tonemapper",
    "start_exposure",
    "stop_exposure",
    "num_exposures",
    "bins",
    "mean",
    "std_dev",
    "weighted_median",
    "weighted_q1",
    "weighted_q3",
    "median",
    "min",
    "max",
    "timestamp",
];

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

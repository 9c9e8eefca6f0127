//! Summary statistics and report formatting helpers.
//!
//! - [`PooledSummary`]: the numbers reported for one comparison
//! - [`mean`], [`median`], [`percentile`]: exact statistics over a slice,
//!   used where the full value set is small enough to sort (e.g. reference
//!   luminance when choosing an exposure range)
//! - [`fixed_decimal`]: fixed-point formatting for the text report

use serde::{Deserialize, Serialize};

/// Pooled error statistics for one comparison.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PooledSummary {
    /// Number of pooled pixels.
    pub count: u64,
    /// Mean error.
    pub mean: f64,
    /// Population standard deviation of the error.
    pub std_dev: f64,
    /// Minimum error.
    pub min: f64,
    /// Maximum error.
    pub max: f64,
    /// Error-weighted median.
    pub weighted_median: f64,
    /// Error-weighted 1st quartile.
    pub weighted_q1: f64,
    /// Error-weighted 3rd quartile.
    pub weighted_q3: f64,
    /// Median by pixel count.
    pub median: f64,
}

/// Format `value` with exactly `digits` decimal places.
///
/// # Example
///
/// ```
/// use diffpool::stats::fixed_decimal;
///
/// assert_eq!(fixed_decimal(0.5, 6), "0.500000");
/// assert_eq!(fixed_decimal(-1.23456, 4), "-1.2346");
/// ```
#[must_use]
pub fn fixed_decimal(value: f64, digits: usize) -> String {
    format!("{value:.digits$}")
}

/// Compute median of a slice.
///
/// For even-length slices, returns the average of the two middle values.
///
/// # Example
///
/// ```
/// use diffpool::stats::median;
///
/// assert_eq!(median(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
/// assert_eq!(median(&[1.0, 2.0, 3.0, 4.0]), 2.5);
/// ```
#[must_use]
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Compute arithmetic mean.
///
/// # Example
///
/// ```
/// use diffpool::stats::mean;
///
/// assert!((mean(&[1.0, 2.0, 3.0, 4.0, 5.0]) - 3.0).abs() < 0.001);
/// ```
#[must_use]
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Compute percentile using linear interpolation (R-7 method).
///
/// The percentile `p` should be in the range 0.0 to 1.0.
///
/// # Example
///
/// ```
/// use diffpool::stats::percentile;
///
/// let values = [1.0, 2.0, 3.0, 4.0, 5.0];
/// assert!((percentile(&values, 0.5) - 3.0).abs() < 0.001);  // median
/// assert!((percentile(&values, 0.25) - 2.0).abs() < 0.001); // Q1
/// assert!((percentile(&values, 0.75) - 4.0).abs() < 0.001); // Q3
/// ```
#[must_use]
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let p = p.clamp(0.0, 1.0);
    let idx = p * (sorted.len() - 1) as f64;
    let lower = idx.floor() as usize;
    let upper = idx.ceil() as usize;
    let frac = idx - lower as f64;

    if lower == upper {
        sorted[lower]
    } else {
        sorted[lower] * (1.0 - frac) + sorted[upper] * frac
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_decimal() {
        assert_eq!(fixed_decimal(0.0, 6), "0.000000");
        assert_eq!(fixed_decimal(1.0 / 3.0, 4), "0.3333");
        assert_eq!(fixed_decimal(2.0, 0), "2");
        assert_eq!(fixed_decimal(f64::INFINITY, 4), "inf");
    }

    #[test]
    fn test_percentile() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        assert!((percentile(&values, 0.0) - 1.0).abs() < 0.001);
        assert!((percentile(&values, 0.5) - 3.0).abs() < 0.001);
        assert!((percentile(&values, 1.0) - 5.0).abs() < 0.001);
        assert_eq!(percentile(&[], 0.5), 0.0);
    }

    #[test]
    fn test_median() {
        assert_eq!(median(&[1.0, 2.0, 3.0, 4.0, 5.0]), 3.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
        assert_eq!(median(&[5.0]), 5.0);
        assert_eq!(median(&[]), 0.0);
    }

    #[test]
    fn test_summary_serializes() {
        let summary = PooledSummary {
            count: 4,
            mean: 0.25,
            std_dev: 0.1,
            min: 0.0,
            max: 0.5,
            weighted_median: 0.4,
            weighted_q1: 0.3,
            weighted_q3: 0.45,
            median: 0.25,
        };
        let json = serde_json::to_string(&summary).unwrap();
        assert!(json.contains("\"weighted_median\":0.4"));
        let back: PooledSummary = serde_json::from_str(&json).unwrap();
        assert_eq!(back, summary);
    }
}

//! Weighted histogram pooling of per-pixel error values.
//!
//! [`HistogramPool`] reduces an error map to a handful of numbers without
//! storing or sorting the individual values:
//!
//! - mean, variance, min and max are exact running statistics
//! - percentiles are read from a fixed-resolution histogram over `[0, 1]`
//!   and linearly interpolated inside the bin where the threshold falls
//!
//! Weighted percentiles weight each pixel by its bin's representative error,
//! so the weighted median is the point where half of the total error mass
//! (not half of the pixels) has accumulated.
//!
//! ## Input tolerance
//!
//! Finite values outside `[0, 1]` are accepted: they are binned into the first
//! or last bin, while the exact value still feeds the mean and extrema.
//! Non-finite values are rejected with [`Error::InvalidArgument`].
//!
//! ## Empty pools
//!
//! Every statistic returns [`Error::EmptyPool`] until the first value has been
//! added. No sentinel value is ever reported as a measurement.

mod histogram;

pub use histogram::{BinStats, write_histogram_csv};

use serde::{Deserialize, Serialize};

use crate::buffer::ErrorMap;
use crate::error::{Error, Result};
use crate::stats::PooledSummary;
use histogram::Histogram;

/// Default number of histogram bins.
pub const DEFAULT_BINS: usize = 100;

/// Configuration for building a [`HistogramPool`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PoolConfig {
    /// Number of equal-width bins over `[0, 1]`. Trades percentile accuracy
    /// for memory.
    pub bins: usize,
    /// Pool error maps row-parallel when the `parallel` feature is enabled.
    pub parallel: bool,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            bins: DEFAULT_BINS,
            parallel: true,
        }
    }
}

impl PoolConfig {
    /// Create a configuration with the given bin count.
    #[must_use]
    pub fn new(bins: usize) -> Self {
        Self {
            bins,
            ..Self::default()
        }
    }

    /// Enable or disable parallel pooling.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
}

/// Streaming error statistics backed by a fixed-resolution histogram.
#[derive(Debug, Clone, PartialEq)]
pub struct HistogramPool {
    histogram: Histogram,
    count: u64,
    sum: f64,
    sum_sq: f64,
    min: f64,
    max: f64,
}

impl HistogramPool {
    /// Create an empty pool with `bins` histogram bins.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if `bins` is zero.
    pub fn new(bins: usize) -> Result<Self> {
        if bins == 0 {
            return Err(Error::invalid("bin count must be positive"));
        }
        Ok(Self::zeroed(bins))
    }

    /// Create an empty pool from a configuration.
    pub fn with_config(config: &PoolConfig) -> Result<Self> {
        Self::new(config.bins)
    }

    fn zeroed(bins: usize) -> Self {
        Self {
            histogram: Histogram::new(bins),
            count: 0,
            sum: 0.0,
            sum_sq: 0.0,
            min: f64::INFINITY,
            max: f64::NEG_INFINITY,
        }
    }

    /// Pool every value of an error map.
    ///
    /// With `config.parallel` set and the `parallel` feature enabled, rows are
    /// pooled independently and merged. The resulting histogram is identical
    /// to a sequential pass.
    pub fn from_error_map(map: &ErrorMap, config: &PoolConfig) -> Result<Self> {
        let pool = Self::with_config(config)?;
        if config.parallel {
            pool.pool_rows_parallel(map)
        } else {
            pool.pool_rows(map)
        }
    }

    fn pool_rows(mut self, map: &ErrorMap) -> Result<Self> {
        for (y, row) in map.rows().enumerate() {
            for (x, &value) in row.iter().enumerate() {
                self.update(x, y, f64::from(value))?;
            }
        }
        Ok(self)
    }

    #[cfg(feature = "parallel")]
    fn pool_rows_parallel(self, map: &ErrorMap) -> Result<Self> {
        use rayon::prelude::*;

        let bins = self.bin_count();
        let partial = map
            .as_slice()
            .par_chunks(map.width())
            .enumerate()
            .try_fold(
                || Self::zeroed(bins),
                |mut pool, (y, row)| {
                    for (x, &value) in row.iter().enumerate() {
                        pool.update(x, y, f64::from(value))?;
                    }
                    Ok::<_, Error>(pool)
                },
            )
            .try_reduce(
                || Self::zeroed(bins),
                |mut a, b| {
                    a.merge(&b)?;
                    Ok(a)
                },
            )?;

        let mut pool = self;
        pool.merge(&partial)?;
        Ok(pool)
    }

    #[cfg(not(feature = "parallel"))]
    fn pool_rows_parallel(self, map: &ErrorMap) -> Result<Self> {
        self.pool_rows(map)
    }

    /// Add one error value.
    ///
    /// The pixel coordinates are accepted for symmetry with the error map but
    /// do not affect any statistic.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] for NaN or infinite values. The pool
    /// is left unchanged in that case.
    pub fn update(&mut self, _x: usize, _y: usize, value: f64) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::invalid(format!("non-finite error value {value}")));
        }
        self.histogram.include(value);
        self.count += 1;
        self.sum += value;
        self.sum_sq += value * value;
        self.min = self.min.min(value);
        self.max = self.max.max(value);
        Ok(())
    }

    /// Fold another pool into this one.
    ///
    /// Bin counts and sums are added, extrema combined. The operation is
    /// associative and commutative, so partial pools can be reduced in any
    /// order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidArgument`] if the bin counts differ.
    pub fn merge(&mut self, other: &Self) -> Result<()> {
        if self.bin_count() != other.bin_count() {
            return Err(Error::invalid(format!(
                "cannot merge pools with {} and {} bins",
                self.bin_count(),
                other.bin_count()
            )));
        }
        self.histogram.merge(&other.histogram);
        self.count += other.count;
        self.sum += other.sum;
        self.sum_sq += other.sum_sq;
        self.min = self.min.min(other.min);
        self.max = self.max.max(other.max);
        Ok(())
    }

    /// Number of histogram bins.
    #[must_use]
    pub fn bin_count(&self) -> usize {
        self.histogram.len()
    }

    /// Number of values added so far.
    #[must_use]
    pub fn count(&self) -> u64 {
        self.count
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    fn ensure_populated(&self) -> Result<()> {
        if self.is_empty() { Err(Error::EmptyPool) } else { Ok(()) }
    }

    /// Exact arithmetic mean of all values.
    pub fn mean(&self) -> Result<f64> {
        self.ensure_populated()?;
        Ok(self.sum / self.count as f64)
    }

    /// Population variance of all values.
    pub fn variance(&self) -> Result<f64> {
        let mean = self.mean()?;
        Ok((self.sum_sq / self.count as f64 - mean * mean).max(0.0))
    }

    /// Population standard deviation of all values.
    pub fn std_dev(&self) -> Result<f64> {
        Ok(self.variance()?.sqrt())
    }

    /// Smallest value seen.
    pub fn min_value(&self) -> Result<f64> {
        self.ensure_populated()?;
        Ok(self.min)
    }

    /// Largest value seen.
    pub fn max_value(&self) -> Result<f64> {
        self.ensure_populated()?;
        Ok(self.max)
    }

    /// Percentile of the pooled values, `fraction` in `[0, 1]`.
    ///
    /// Bins are scanned from low to high error, accumulating either the
    /// pixel count or, when `weighted`, count × bin center. Inside the bin
    /// where the accumulator reaches `fraction × total` the result is linearly
    /// interpolated between the bin boundaries. A threshold that lands exactly
    /// on the end of a bin followed by empty bins resolves to the middle of
    /// that gap.
    ///
    /// `fraction = 0` yields the lower boundary of the lowest occupied bin and
    /// `fraction = 1` the upper boundary of the highest. All results are
    /// clamped to the exact `[min, max]` of the input, so a pool holding a
    /// single repeated value reports that value for every fraction.
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] for a fraction outside `[0, 1]` (or NaN),
    /// [`Error::EmptyPool`] if nothing was added.
    pub fn percentile(&self, fraction: f64, weighted: bool) -> Result<f64> {
        if !(0.0..=1.0).contains(&fraction) {
            return Err(Error::invalid(format!(
                "percentile fraction {fraction} outside [0, 1]"
            )));
        }
        self.ensure_populated()?;

        let (Some(first), Some(last)) = (
            self.histogram.first_occupied(),
            self.histogram.last_occupied(),
        ) else {
            return Err(Error::EmptyPool);
        };

        let raw = if fraction == 0.0 {
            self.histogram.bounds(first).0
        } else if fraction == 1.0 {
            self.histogram.bounds(last).1
        } else {
            self.interpolate(fraction, weighted, last)
        };

        Ok(raw.clamp(self.min, self.max))
    }

    /// Shorthand for the error-weighted percentile.
    pub fn weighted_percentile(&self, fraction: f64) -> Result<f64> {
        self.percentile(fraction, true)
    }

    fn interpolate(&self, fraction: f64, weighted: bool, last: usize) -> f64 {
        let masses = self.histogram.masses(weighted);
        let total: f64 = masses.iter().sum();
        let target = fraction * total;

        let mut cumulative = 0.0;
        for (index, &mass) in masses.iter().enumerate() {
            if mass <= 0.0 {
                continue;
            }
            let next = cumulative + mass;
            if next >= target {
                let (lower, upper) = self.histogram.bounds(index);
                if next == target {
                    let gap_end = masses[index + 1..]
                        .iter()
                        .position(|&m| m > 0.0)
                        .map(|offset| self.histogram.bounds(index + 1 + offset).0);
                    return gap_end.map_or(upper, |end| (upper + end) / 2.0);
                }
                let t = (target - cumulative) / mass;
                return lower + t * (upper - lower);
            }
            cumulative = next;
        }

        // Rounding left the target just above the accumulated total.
        self.histogram.bounds(last).1
    }

    /// Iterate over all bins, lowest error first.
    pub fn bins(&self) -> impl Iterator<Item = BinStats> + '_ {
        (0..self.histogram.len()).map(move |index| {
            let (lower, upper) = self.histogram.bounds(index);
            let count = self.histogram.count(index);
            BinStats {
                index,
                lower,
                upper,
                count,
                weighted_mass: count as f64 * self.histogram.center(index),
            }
        })
    }

    /// Mean, extrema and the weighted median/quartiles in one pass.
    pub fn summary(&self) -> Result<PooledSummary> {
        Ok(PooledSummary {
            count: self.count,
            mean: self.mean()?,
            std_dev: self.std_dev()?,
            min: self.min_value()?,
            max: self.max_value()?,
            weighted_median: self.percentile(0.5, true)?,
            weighted_q1: self.percentile(0.25, true)?,
            weighted_q3: self.percentile(0.75, true)?,
            median: self.percentile(0.5, false)?,
        })
    }
}

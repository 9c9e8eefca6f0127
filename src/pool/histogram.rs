//! Fixed-resolution histogram over the normalized error range `[0, 1]`.

use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Equal-width bins partitioning `[0, 1]`.
///
/// Values below 0 land in the first bin and values at or above 1 land in the
/// last one. The bin count never changes after construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct Histogram {
    counts: Vec<u64>,
}

impl Histogram {
    /// Caller guarantees `bins > 0`.
    pub(crate) fn new(bins: usize) -> Self {
        debug_assert!(bins > 0);
        Self {
            counts: vec![0; bins],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.counts.len()
    }

    pub(crate) fn bin_width(&self) -> f64 {
        1.0 / self.counts.len() as f64
    }

    /// Index of the bin a (finite) value falls into, clamped to the range.
    pub(crate) fn index_of(&self, value: f64) -> usize {
        let last = self.counts.len() - 1;
        if value <= 0.0 {
            0
        } else {
            ((value * self.counts.len() as f64) as usize).min(last)
        }
    }

    pub(crate) fn include(&mut self, value: f64) {
        let index = self.index_of(value);
        self.counts[index] += 1;
    }

    pub(crate) fn count(&self, index: usize) -> u64 {
        self.counts[index]
    }

    pub(crate) fn bounds(&self, index: usize) -> (f64, f64) {
        let width = self.bin_width();
        (index as f64 * width, (index + 1) as f64 * width)
    }

    /// Representative value of a bin, used as the per-pixel weight in
    /// weighted percentiles.
    pub(crate) fn center(&self, index: usize) -> f64 {
        (index as f64 + 0.5) * self.bin_width()
    }

    pub(crate) fn first_occupied(&self) -> Option<usize> {
        self.counts.iter().position(|&c| c > 0)
    }

    pub(crate) fn last_occupied(&self) -> Option<usize> {
        self.counts.iter().rposition(|&c| c > 0)
    }

    /// Bin-wise addition. Caller checks that both sides have the same length.
    pub(crate) fn merge(&mut self, other: &Self) {
        debug_assert_eq!(self.counts.len(), other.counts.len());
        for (dst, src) in self.counts.iter_mut().zip(&other.counts) {
            *dst += src;
        }
    }

    /// Mass of every bin: the plain count, or count × bin center when weighted.
    pub(crate) fn masses(&self, weighted: bool) -> Vec<f64> {
        (0..self.counts.len())
            .map(|i| {
                let count = self.counts[i] as f64;
                if weighted { count * self.center(i) } else { count }
            })
            .collect()
    }
}

/// Snapshot of a single histogram bin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BinStats {
    /// Bin index, 0 is the lowest error range.
    pub index: usize,
    /// Inclusive lower boundary.
    pub lower: f64,
    /// Exclusive upper boundary (inclusive for the last bin).
    pub upper: f64,
    /// Number of values that fell into the bin.
    pub count: u64,
    /// Count weighted by the bin's representative value.
    pub weighted_mass: f64,
}

/// Write bins as CSV with the header `bin,lower,upper,count,weighted_mass`.
pub fn write_histogram_csv<W: Write>(bins: impl IntoIterator<Item = BinStats>, writer: W) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);
    wtr.write_record(["bin", "lower", "upper", "count", "weighted_mass"])?;
    for bin in bins {
        wtr.write_record([
            bin.index.to_string(),
            format!("{:.6}", bin.lower),
            format!("{:.6}", bin.upper),
            bin.count.to_string(),
            format!("{:.6}", bin.weighted_mass),
        ])?;
    }
    wtr.flush()?;
    Ok(())
}

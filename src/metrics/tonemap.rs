//! Tone mapping operators and HDR exposure range selection.
//!
//! All three operators share the rational form
//!
//! ```text
//! tonemap(x) = (a x^2 + b x + c) / (d x^2 + e x + f)
//! ```
//!
//! with fixed coefficients. The ACES fit includes a 0.6 pre-exposure factor.

use std::fmt;
use std::str::FromStr;

use rgb::RGB;
use serde::{Deserialize, Serialize};

use crate::buffer::PixelBuffer;
use crate::error::{Error, Result};
use crate::stats;

/// Display value the brightest reference pixel is mapped to when choosing
/// the start exposure.
const EXPOSURE_TARGET: f32 = 0.85;

/// Tone mapping operator assumed for HDR comparisons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tonemapper {
    /// ACES filmic fit.
    #[default]
    Aces,
    /// Hable (Uncharted 2) filmic curve.
    Hable,
    /// Reinhard `x / (1 + x)`.
    Reinhard,
}

impl Tonemapper {
    fn coefficients(self) -> [f32; 6] {
        match self {
            Self::Aces => [
                0.6 * 0.6 * 2.51,
                0.6 * 0.03,
                0.0,
                0.6 * 0.6 * 2.43,
                0.6 * 0.59,
                0.14,
            ],
            Self::Hable => [0.231683, 0.013791, 0.0, 0.18, 0.3, 0.018],
            Self::Reinhard => [0.0, 1.0, 0.0, 0.0, 1.0, 1.0],
        }
    }

    /// Map a linear value to a display value in `[0, 1]`.
    #[must_use]
    pub fn apply(self, x: f32) -> f32 {
        let [a, b, c, d, e, f] = self.coefficients();
        let x = x.max(0.0);
        let value = (a * x * x + b * x + c) / (d * x * x + e * x + f);
        value.clamp(0.0, 1.0)
    }

    /// Map each channel of a linear color.
    #[must_use]
    pub fn apply_rgb(self, color: RGB<f32>) -> RGB<f32> {
        RGB::new(self.apply(color.r), self.apply(color.g), self.apply(color.b))
    }

    /// Smallest non-negative input the curve maps to `target`.
    fn input_for(self, target: f32) -> f32 {
        let [a, b, c, d, e, f] = self.coefficients();
        // tonemap(x) = target  <=>  (a - t d) x^2 + (b - t e) x + (c - t f) = 0
        let qa = a - target * d;
        let qb = b - target * e;
        let qc = c - target * f;

        if qa.abs() < f32::EPSILON {
            if qb.abs() < f32::EPSILON {
                return 0.0;
            }
            return (-qc / qb).max(0.0);
        }

        let discriminant = qb * qb - 4.0 * qa * qc;
        if discriminant < 0.0 {
            return 0.0;
        }
        ((-qb + discriminant.sqrt()) / (2.0 * qa)).max(0.0)
    }

    /// Display name used in reports.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Aces => "ACES",
            Self::Hable => "Hable",
            Self::Reinhard => "Reinhard",
        }
    }
}

impl fmt::Display for Tonemapper {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Tonemapper {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "aces" => Ok(Self::Aces),
            "hable" => Ok(Self::Hable),
            "reinhard" => Ok(Self::Reinhard),
            other => Err(Error::invalid(format!(
                "unknown tone mapper '{other}' (expected aces, hable or reinhard)"
            ))),
        }
    }
}

/// Relative luminance of a linear Rec.709/sRGB color.
#[inline]
#[must_use]
pub fn luminance(color: RGB<f32>) -> f32 {
    0.2126729 * color.r + 0.7151522 * color.g + 0.0721750 * color.b
}

/// Exposure range covering the reference image's luminance.
///
/// The start exposure maps the brightest pixel to display value 0.85, the
/// stop exposure maps the median luminance there. Returns `(start, stop)` in
/// stops. A black reference yields `(0, 0)`; a reference whose median is
/// black collapses the range onto the start exposure.
#[must_use]
pub fn auto_exposure_range(reference: &PixelBuffer, tonemapper: Tonemapper) -> (f32, f32) {
    let luminances: Vec<f64> = reference.pixels().map(|p| f64::from(luminance(p))).collect();
    let y_max = luminances.iter().copied().fold(0.0_f64, f64::max);
    if y_max <= 0.0 {
        return (0.0, 0.0);
    }
    let y_median = stats::median(&luminances);

    let x_max = f64::from(tonemapper.input_for(EXPOSURE_TARGET));
    let start = (x_max / y_max).log2() as f32;
    let stop = if y_median > 0.0 {
        (x_max / y_median).log2() as f32
    } else {
        start
    };
    (start, stop)
}

/// Default number of exposures for a range: one per stop, at least two.
#[must_use]
pub fn default_exposure_count(start: f32, stop: f32) -> u32 {
    ((stop - start).ceil() as u32).max(2)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reinhard_curve() {
        assert_eq!(Tonemapper::Reinhard.apply(0.0), 0.0);
        assert!((Tonemapper::Reinhard.apply(1.0) - 0.5).abs() < 1e-6);
        assert!((Tonemapper::Reinhard.apply(3.0) - 0.75).abs() < 1e-6);
    }

    #[test]
    fn test_curves_are_monotonic_and_bounded() {
        for tm in [Tonemapper::Aces, Tonemapper::Hable, Tonemapper::Reinhard] {
            let mut previous = tm.apply(0.0);
            assert_eq!(previous, 0.0, "{tm}");
            for i in 1..=400 {
                let value = tm.apply(i as f32 * 0.05);
                assert!(value >= previous, "{tm} decreases at {}", i as f32 * 0.05);
                assert!(value <= 1.0);
                previous = value;
            }
        }
    }

    #[test]
    fn test_input_for_inverts_curve() {
        for tm in [Tonemapper::Aces, Tonemapper::Hable, Tonemapper::Reinhard] {
            let x = tm.input_for(EXPOSURE_TARGET);
            assert!(x > 0.0, "{tm}");
            assert!((tm.apply(x) - EXPOSURE_TARGET).abs() < 1e-4, "{tm}: {}", tm.apply(x));
        }
    }

    #[test]
    fn test_parse_and_display() {
        assert_eq!("aces".parse::<Tonemapper>().unwrap(), Tonemapper::Aces);
        assert_eq!("Hable".parse::<Tonemapper>().unwrap(), Tonemapper::Hable);
        assert_eq!("REINHARD".parse::<Tonemapper>().unwrap(), Tonemapper::Reinhard);
        assert!("filmic".parse::<Tonemapper>().is_err());
        assert_eq!(Tonemapper::Aces.to_string(), "ACES");
        assert_eq!(Tonemapper::default(), Tonemapper::Aces);
    }

    #[test]
    fn test_auto_exposure_range() {
        // Half the pixels at luminance 1, half at 4: median 2.5, max 4.
        let mut pixels = vec![RGB::new(1.0, 1.0, 1.0); 8];
        pixels.extend(vec![RGB::new(4.0, 4.0, 4.0); 8]);
        let reference = PixelBuffer::new(pixels, 4, 4).unwrap();

        let (start, stop) = auto_exposure_range(&reference, Tonemapper::Reinhard);
        let x_max = 0.85_f32 / 0.15;
        assert!((start - (x_max / 4.0).log2()).abs() < 1e-3);
        assert!((stop - (x_max / 2.5).log2()).abs() < 1e-3);
        assert!(start <= stop);
    }

    #[test]
    fn test_auto_exposure_black_reference() {
        let reference = PixelBuffer::filled(4, 4, RGB::new(0.0, 0.0, 0.0)).unwrap();
        assert_eq!(auto_exposure_range(&reference, Tonemapper::Aces), (0.0, 0.0));
    }

    #[test]
    fn test_default_exposure_count() {
        assert_eq!(default_exposure_count(0.0, 0.0), 2);
        assert_eq!(default_exposure_count(-2.0, 3.5), 6);
    }
}

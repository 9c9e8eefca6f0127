//! Per-pixel error evaluation.
//!
//! The perceptual error model is a collaborator behind the [`ErrorEvaluator`]
//! trait: given two equally sized linear-light buffers and an HDR flag it
//! produces an [`ErrorMap`] with one error value per pixel, normally in
//! `[0, 1]`. Evaluators may resolve parameters they were given as "automatic"
//! (the HDR exposure range) and write them back into [`EvalParams`] so the
//! caller can report what was assumed.
//!
//! [`ColorDistance`] is the built-in evaluator. It is a plain color-distance
//! model, not a perceptual one; plug in a real model through the trait.

pub mod tonemap;

use rgb::RGB;
use serde::{Deserialize, Serialize};

use crate::buffer::{ErrorMap, PixelBuffer};
use crate::error::{Error, Result};
use crate::viewing::ViewingCondition;
pub use tonemap::Tonemapper;

/// Parameters handed to an [`ErrorEvaluator`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvalParams {
    /// Tone mapper assumed when comparing HDR images.
    pub tonemapper: Tonemapper,
    /// First exposure of the HDR sweep, in stops. `None` = derive from the reference.
    pub start_exposure: Option<f32>,
    /// Last exposure of the HDR sweep, in stops. `None` = derive from the reference.
    pub stop_exposure: Option<f32>,
    /// Number of exposures in the sweep. `None` = one per stop, at least two.
    pub num_exposures: Option<u32>,
    /// Pixels per degree of visual angle.
    pub ppd: f64,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            tonemapper: Tonemapper::default(),
            start_exposure: None,
            stop_exposure: None,
            num_exposures: None,
            ppd: ViewingCondition::default().ppd(),
        }
    }
}

impl EvalParams {
    /// Check that explicitly given values are usable.
    pub fn validate(&self) -> Result<()> {
        if !(self.ppd.is_finite() && self.ppd > 0.0) {
            return Err(Error::invalid(format!("pixels per degree must be positive, got {}", self.ppd)));
        }
        if self.num_exposures == Some(0) {
            return Err(Error::invalid("number of exposures must be positive"));
        }
        for exposure in [self.start_exposure, self.stop_exposure].into_iter().flatten() {
            if !exposure.is_finite() {
                return Err(Error::invalid(format!("exposure {exposure} is not finite")));
            }
        }
        if let (Some(start), Some(stop)) = (self.start_exposure, self.stop_exposure) {
            if start > stop {
                return Err(Error::invalid(format!(
                    "start exposure {start} is above stop exposure {stop}"
                )));
            }
        }
        Ok(())
    }

    /// Fill in the exposure sweep for an HDR comparison.
    ///
    /// Missing start/stop values come from the reference luminance, a missing
    /// count from [`tonemap::default_exposure_count`].
    pub fn resolve_exposures(&mut self, reference: &PixelBuffer) -> Result<()> {
        let (start, stop) = match (self.start_exposure, self.stop_exposure) {
            (Some(start), Some(stop)) => (start, stop),
            (start, stop) => {
                let (auto_start, auto_stop) =
                    tonemap::auto_exposure_range(reference, self.tonemapper);
                let stop = stop.unwrap_or(auto_stop);
                // An explicit stop below the derived start pulls the start down with it.
                let start = start.unwrap_or(auto_start.min(stop));
                let stop = stop.max(start);
                log::debug!("auto exposure range {start}..{stop}");
                (start, stop)
            }
        };
        self.start_exposure = Some(start);
        self.stop_exposure = Some(stop);
        self.num_exposures
            .get_or_insert(tonemap::default_exposure_count(start, stop));
        self.validate()
    }

    /// Exposures of the sweep, in stops. Empty until resolved.
    #[must_use]
    pub fn exposures(&self) -> Vec<f32> {
        let (Some(start), Some(stop), Some(count)) =
            (self.start_exposure, self.stop_exposure, self.num_exposures)
        else {
            return Vec::new();
        };
        if count == 1 {
            return vec![start];
        }
        let step = (stop - start) / (count - 1) as f32;
        (0..count).map(|i| start + i as f32 * step).collect()
    }
}

/// Produces a per-pixel error map for a reference/test pair.
pub trait ErrorEvaluator {
    /// Short identifier used in logs and reports.
    fn name(&self) -> &str {
        "custom"
    }

    /// Evaluate the error between two linear-light buffers of equal size.
    ///
    /// `hdr` tells the evaluator the buffers hold unbounded scene-referred
    /// values. Implementations may fill automatic fields of `params`.
    fn evaluate(
        &self,
        reference: &PixelBuffer,
        test: &PixelBuffer,
        hdr: bool,
        params: &mut EvalParams,
    ) -> Result<ErrorMap>;
}

impl<F> ErrorEvaluator for F
where
    F: Fn(&PixelBuffer, &PixelBuffer, bool, &mut EvalParams) -> Result<ErrorMap>,
{
    fn evaluate(
        &self,
        reference: &PixelBuffer,
        test: &PixelBuffer,
        hdr: bool,
        params: &mut EvalParams,
    ) -> Result<ErrorMap> {
        self(reference, test, hdr, params)
    }
}

/// Euclidean distance between colors, normalized to `[0, 1]`.
///
/// Display-referred input is clamped to `[0, 1]` per channel. HDR input is
/// tone mapped at every exposure of the sweep and the largest distance over
/// the sweep is kept.
#[derive(Debug, Clone, Copy, Default)]
pub struct ColorDistance;

impl ColorDistance {
    fn distance(a: RGB<f32>, b: RGB<f32>) -> f32 {
        let dr = a.r.clamp(0.0, 1.0) - b.r.clamp(0.0, 1.0);
        let dg = a.g.clamp(0.0, 1.0) - b.g.clamp(0.0, 1.0);
        let db = a.b.clamp(0.0, 1.0) - b.b.clamp(0.0, 1.0);
        ((dr * dr + dg * dg + db * db) / 3.0).sqrt()
    }
}

impl ErrorEvaluator for ColorDistance {
    fn name(&self) -> &str {
        "color-distance"
    }

    fn evaluate(
        &self,
        reference: &PixelBuffer,
        test: &PixelBuffer,
        hdr: bool,
        params: &mut EvalParams,
    ) -> Result<ErrorMap> {
        if reference.dimensions() != test.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: reference.dimensions(),
                actual: test.dimensions(),
            });
        }
        params.validate()?;

        let (width, height) = reference.dimensions();
        let pairs = reference.as_slice().iter().zip(test.as_slice());

        let values: Vec<f32> = if hdr {
            params.resolve_exposures(reference)?;
            let scales: Vec<f32> = params.exposures().iter().map(|e| e.exp2()).collect();
            let tm = params.tonemapper;
            pairs
                .map(|(&r, &t)| {
                    scales
                        .iter()
                        .map(|&s| {
                            Self::distance(tm.apply_rgb(scale(r, s)), tm.apply_rgb(scale(t, s)))
                        })
                        .fold(0.0_f32, f32::max)
                })
                .collect()
        } else {
            pairs.map(|(&r, &t)| Self::distance(r, t)).collect()
        };

        ErrorMap::new(values, width, height)
    }
}

fn scale(color: RGB<f32>, factor: f32) -> RGB<f32> {
    RGB::new(color.r * factor, color.g * factor, color.b * factor)
}

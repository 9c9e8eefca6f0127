//! Comparison driver.
//!
//! [`CompareSession`] wires image loading, the error evaluator and the
//! histogram pool together:
//!
//! 1. decide HDR mode from the reference path ([`is_hdr_path`])
//! 2. load both images, reject mismatched sizes before evaluating anything
//! 3. linearize display-referred (non-HDR) buffers
//! 4. evaluate the error map and pool it
//! 5. summarize into a [`ComparisonReport`]

use std::path::Path;

use crate::buffer::PixelBuffer;
use crate::decode::{is_hdr_path, load_image};
use crate::error::{Error, Result};
use crate::eval::report::ComparisonReport;
use crate::metrics::{ColorDistance, ErrorEvaluator, EvalParams, Tonemapper};
use crate::pool::{HistogramPool, PoolConfig};
use crate::viewing::ViewingCondition;

/// Configuration for a comparison.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompareConfig {
    /// Histogram pool settings.
    pub pool: PoolConfig,

    /// Viewing condition, determines the PPD handed to the evaluator.
    pub viewing: ViewingCondition,

    /// Tone mapper assumed for HDR inputs.
    pub tonemapper: Tonemapper,

    /// Explicit HDR exposure range; `None` lets the evaluator choose.
    pub start_exposure: Option<f32>,
    pub stop_exposure: Option<f32>,

    /// Explicit number of HDR exposures.
    pub num_exposures: Option<u32>,
}

impl CompareConfig {
    /// Create a new configuration builder.
    #[must_use]
    pub fn builder() -> CompareConfigBuilder {
        CompareConfigBuilder::default()
    }

    /// Evaluator parameters for a fresh comparison.
    #[must_use]
    pub fn eval_params(&self) -> EvalParams {
        EvalParams {
            tonemapper: self.tonemapper,
            start_exposure: self.start_exposure,
            stop_exposure: self.stop_exposure,
            num_exposures: self.num_exposures,
            ppd: self.viewing.ppd(),
        }
    }
}

/// Builder for [`CompareConfig`].
#[derive(Debug, Default)]
pub struct CompareConfigBuilder {
    bins: Option<usize>,
    parallel: Option<bool>,
    viewing: Option<ViewingCondition>,
    tonemapper: Option<Tonemapper>,
    start_exposure: Option<f32>,
    stop_exposure: Option<f32>,
    num_exposures: Option<u32>,
}

impl CompareConfigBuilder {
    /// Set the number of histogram bins.
    #[must_use]
    pub fn bins(mut self, bins: usize) -> Self {
        self.bins = Some(bins);
        self
    }

    /// Enable or disable parallel pooling.
    #[must_use]
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = Some(parallel);
        self
    }

    /// Set the viewing condition.
    #[must_use]
    pub fn viewing(mut self, viewing: ViewingCondition) -> Self {
        self.viewing = Some(viewing);
        self
    }

    /// Set the tone mapper assumed for HDR inputs.
    #[must_use]
    pub fn tonemapper(mut self, tonemapper: Tonemapper) -> Self {
        self.tonemapper = Some(tonemapper);
        self
    }

    /// Set the first exposure of the HDR sweep.
    #[must_use]
    pub fn start_exposure(mut self, stops: f32) -> Self {
        self.start_exposure = Some(stops);
        self
    }

    /// Set the last exposure of the HDR sweep.
    #[must_use]
    pub fn stop_exposure(mut self, stops: f32) -> Self {
        self.stop_exposure = Some(stops);
        self
    }

    /// Set the number of HDR exposures.
    #[must_use]
    pub fn num_exposures(mut self, count: u32) -> Self {
        self.num_exposures = Some(count);
        self
    }

    /// Build the configuration.
    #[must_use]
    pub fn build(self) -> CompareConfig {
        let defaults = PoolConfig::default();
        CompareConfig {
            pool: PoolConfig {
                bins: self.bins.unwrap_or(defaults.bins),
                parallel: self.parallel.unwrap_or(defaults.parallel),
            },
            viewing: self.viewing.unwrap_or_default(),
            tonemapper: self.tonemapper.unwrap_or_default(),
            start_exposure: self.start_exposure,
            stop_exposure: self.stop_exposure,
            num_exposures: self.num_exposures,
        }
    }
}

/// Error map statistics for one reference/test pair, before reporting.
#[derive(Debug, Clone)]
pub struct PooledComparison {
    /// Image width in pixels.
    pub width: usize,
    /// Image height in pixels.
    pub height: usize,
    /// Whether the pair was evaluated as HDR.
    pub hdr: bool,
    /// Parameters as resolved by the evaluator.
    pub params: EvalParams,
    /// Pooled error values.
    pub pool: HistogramPool,
}

/// Comparison session: one configuration, one evaluator, any number of pairs.
///
/// # Example
///
/// ```rust,ignore
/// use diffpool::{CompareConfig, CompareSession};
///
/// let config = CompareConfig::builder().bins(100).build();
/// let session = CompareSession::new(config);
///
/// let report = session.run_comparison("reference.png".as_ref(), "test.png".as_ref())?;
/// report.write_text(&mut std::io::stdout())?;
/// ```
pub struct CompareSession<E = ColorDistance> {
    config: CompareConfig,
    evaluator: E,
}

impl CompareSession<ColorDistance> {
    /// Create a session using the built-in [`ColorDistance`] evaluator.
    #[must_use]
    pub fn new(config: CompareConfig) -> Self {
        Self::with_evaluator(config, ColorDistance)
    }
}

impl<E: ErrorEvaluator> CompareSession<E> {
    /// Create a session with a custom error evaluator.
    #[must_use]
    pub fn with_evaluator(config: CompareConfig, evaluator: E) -> Self {
        Self { config, evaluator }
    }

    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &CompareConfig {
        &self.config
    }

    /// Load, evaluate and pool a pair of image files.
    ///
    /// HDR mode is decided from the reference path alone. Non-HDR images are
    /// converted from sRGB to linear light before evaluation.
    ///
    /// # Errors
    ///
    /// [`Error::ImageLoad`] naming the offending file, or
    /// [`Error::DimensionMismatch`] if the images differ in size. The
    /// evaluator is not invoked in either case.
    pub fn pool_files(&self, reference: &Path, test: &Path) -> Result<PooledComparison> {
        let hdr = is_hdr_path(reference);
        log::debug!("{}: hdr={hdr}", reference.display());

        let mut reference_buf = load_image(reference)?;
        let mut test_buf = load_image(test)?;
        check_same_size(&reference_buf, &test_buf)?;

        if !hdr {
            reference_buf.srgb_to_linear();
            test_buf.srgb_to_linear();
        }

        self.pool_buffers(&reference_buf, &test_buf, hdr)
    }

    /// Evaluate and pool two linear-light buffers.
    pub fn pool_buffers(
        &self,
        reference: &PixelBuffer,
        test: &PixelBuffer,
        hdr: bool,
    ) -> Result<PooledComparison> {
        check_same_size(reference, test)?;

        let mut params = self.config.eval_params();
        let map = self.evaluator.evaluate(reference, test, hdr, &mut params)?;
        if (map.width(), map.height()) != reference.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: reference.dimensions(),
                actual: (map.width(), map.height()),
            });
        }

        let pool = HistogramPool::from_error_map(&map, &self.config.pool)?;
        log::debug!(
            "pooled {} values into {} bins with {}",
            pool.count(),
            pool.bin_count(),
            self.evaluator.name()
        );

        Ok(PooledComparison {
            width: map.width(),
            height: map.height(),
            hdr,
            params,
            pool,
        })
    }

    /// Compare two image files and summarize the pooled error.
    pub fn run_comparison(&self, reference: &Path, test: &Path) -> Result<ComparisonReport> {
        log::info!("comparing {} against {}", test.display(), reference.display());
        let pooled = self.pool_files(reference, test)?;
        let summary = pooled.pool.summary()?;

        Ok(ComparisonReport::new(
            reference.to_path_buf(),
            test.to_path_buf(),
            &pooled,
            self.evaluator.name(),
            summary,
        ))
    }
}

fn check_same_size(reference: &PixelBuffer, test: &PixelBuffer) -> Result<()> {
    if reference.dimensions() != test.dimensions() {
        return Err(Error::DimensionMismatch {
            expected: reference.dimensions(),
            actual: test.dimensions(),
        });
    }
    Ok(())
}

//! # diffpool
//!
//! Histogram pooling of per-pixel image error maps.
//!
//! A comparison produces one error value per pixel. This library reduces that
//! map to a few repeatable numbers (mean, error-weighted median and quartiles,
//! min and max) using a fixed-resolution histogram, so memory stays constant
//! regardless of image size.
//!
//! The error model itself sits behind the [`ErrorEvaluator`] trait. A plain
//! [`ColorDistance`] evaluator is included; perceptual models plug in the same
//! way.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use diffpool::{CompareConfig, CompareSession};
//!
//! let config = CompareConfig::builder().bins(100).build();
//! let session = CompareSession::new(config);
//!
//! let report = session.run_comparison("reference.png".as_ref(), "test.png".as_ref())?;
//! report.write_text(&mut std::io::stdout())?;
//! ```
//!
//! Pooling on its own:
//!
//! ```
//! use diffpool::HistogramPool;
//!
//! let mut pool = HistogramPool::new(100)?;
//! for (i, value) in [0.1, 0.2, 0.2, 0.9].into_iter().enumerate() {
//!     pool.update(i, 0, value)?;
//! }
//! assert!((pool.mean()? - 0.35).abs() < 1e-12);
//! assert_eq!(pool.max_value()?, 0.9);
//! # Ok::<(), diffpool::Error>(())
//! ```
//!
//! ## Modules
//!
//! - [`pool`]: the histogram pool
//! - [`buffer`]: pixel buffers and error maps
//! - [`decode`]: image loading and HDR detection
//! - [`metrics`]: error evaluators and tone mapping
//! - [`eval`]: comparison driver and reports
//! - [`viewing`]: viewing condition / pixels per degree
//! - [`stats`]: summary type and formatting helpers
//! - [`error`]: error types

pub mod buffer;
pub mod decode;
pub mod error;
pub mod eval;
pub mod metrics;
pub mod pool;
pub mod stats;
pub mod viewing;

// Re-export commonly used types
pub use buffer::{ErrorMap, PixelBuffer};
pub use error::{Error, Result};
pub use eval::{
    report::ComparisonReport,
    session::{CompareConfig, CompareSession, PooledComparison},
};
pub use metrics::{ColorDistance, ErrorEvaluator, EvalParams, Tonemapper};
pub use pool::{BinStats, HistogramPool, PoolConfig, write_histogram_csv};
pub use stats::PooledSummary;
pub use viewing::ViewingCondition;

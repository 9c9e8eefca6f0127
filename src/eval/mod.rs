//! Comparison driver and report generation.
//!
//! - [`session::CompareSession`]: loads an image pair, evaluates and pools the
//!   error map
//! - [`session::CompareConfig`]: configuration, built with
//!   [`CompareConfig::builder`](session::CompareConfig::builder)
//! - [`report::ComparisonReport`]: text, JSON and CSV output

pub mod report;
pub mod session;

pub use report::ComparisonReport;
pub use session::{CompareConfig, CompareConfigBuilder, CompareSession, PooledComparison};

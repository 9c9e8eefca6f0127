//! CLI command implementations.

pub mod compare;
pub mod histogram;

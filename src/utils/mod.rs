//! Numeric helpers shared by the analysis modules.

pub mod stats;

pub use stats::{defined, mean, mean_std, std_dev, variance};

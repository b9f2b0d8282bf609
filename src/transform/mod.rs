//! Series transformations.

pub mod window;

pub use window::{rolling_mean, rolling_std, rolling_var};

//! Rolling-window anomaly detection.
//!
//! A point is anomalous when it lies further than `sigma` rolling standard
//! deviations from the rolling mean of its own trailing window. The window
//! includes the point itself, so the test is local and causal.

use crate::transform::{rolling_mean, rolling_std};
use crate::utils::defined;

/// Default trailing window length in observations.
pub const DEFAULT_WINDOW: usize = 30;
/// Default band width in rolling standard deviations.
pub const DEFAULT_SIGMA: f64 = 2.0;

/// Configuration for rolling anomaly detection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RollingConfig {
    /// Trailing window length. A window of zero is treated as one.
    pub window: usize,
    /// Band width in rolling standard deviations.
    pub sigma: f64,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            sigma: DEFAULT_SIGMA,
        }
    }
}

impl RollingConfig {
    /// Use a different window length, keeping the other settings.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }

    /// Use a different band width, keeping the other settings.
    pub fn with_sigma(mut self, sigma: f64) -> Self {
        self.sigma = sigma;
        self
    }
}

/// Rolling statistics and anomaly flags for an ordered series.
#[derive(Debug, Clone, PartialEq)]
pub struct RollingAnomalyResult {
    /// Rolling mean per position; every window holds at least the point itself.
    pub rolling_mean: Vec<f64>,
    /// Rolling sample standard deviation; `None` when the window holds
    /// fewer than two observations.
    pub rolling_std: Vec<Option<f64>>,
    /// Anomaly flag per position.
    pub flags: Vec<bool>,
    /// Band width used.
    pub sigma: f64,
}

impl RollingAnomalyResult {
    /// Indices of flagged positions.
    pub fn anomaly_indices(&self) -> Vec<usize> {
        self.flags
            .iter()
            .enumerate()
            .filter(|(_, &f)| f)
            .map(|(i, _)| i)
            .collect()
    }

    /// Number of flagged positions.
    pub fn anomaly_count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }

    /// Check if a specific index is flagged.
    pub fn is_anomaly(&self, index: usize) -> bool {
        self.flags.get(index).copied().unwrap_or(false)
    }

    /// Share of flagged positions, in percent.
    pub fn anomaly_percentage(&self) -> f64 {
        if self.flags.is_empty() {
            0.0
        } else {
            100.0 * self.anomaly_count() as f64 / self.flags.len() as f64
        }
    }
}

/// Flag values outside the rolling `mean ± sigma * std` band.
///
/// `series` must already be in time order. Positions without a defined
/// rolling standard deviation are never flagged.
pub fn detect_rolling_anomalies(series: &[f64], config: &RollingConfig) -> RollingAnomalyResult {
    let window = config.window.max(1);
    let means = rolling_mean(series, window, 1);
    let stds: Vec<Option<f64>> = rolling_std(series, window, 1)
        .into_iter()
        .map(defined)
        .collect();

    let flags = series
        .iter()
        .zip(means.iter().zip(stds.iter()))
        .map(|(&value, (&mean, std))| exceeds_band(value, mean, *std, config.sigma))
        .collect();

    RollingAnomalyResult {
        rolling_mean: means,
        rolling_std: stds,
        flags,
        sigma: config.sigma,
    }
}

/// `|value - mean| > sigma * std`, false when either statistic is undefined.
#[inline]
pub fn exceeds_band(value: f64, mean: f64, std: Option<f64>, sigma: f64) -> bool {
    match std {
        Some(s) if mean.is_finite() => (value - mean).abs() > sigma * s,
        _ => false,
    }
}

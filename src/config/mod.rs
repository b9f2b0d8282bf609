//! Application configuration.
//!
//! Settings come from built-in defaults, an optional TOML file and the
//! environment, in that order of increasing precedence. The binary applies
//! command-line flags on top.

mod loader;

pub use loader::{
    apply_env, load_from_env, load_from_file, load_from_toml, load_with_precedence, save_to_file,
    ENV_PREFIX,
};

use crate::analysis::ExecutionStrategy;
use crate::detection::{RollingConfig, DEFAULT_SIGMA, DEFAULT_WINDOW};
use crate::error::{ClimateError, Result};
use crate::io::{LoadOptions, SeasonPolicy};
use crate::trend::{DEFAULT_TREND_TOLERANCE, MAX_FORECAST_HORIZON};
use crate::weather::{WeatherConfig, DEFAULT_BASE_URL, DEFAULT_NORM_SIGMA};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub analysis: AnalysisConfig,
    pub weather: WeatherSettings,
    pub output: OutputSettings,
}

/// Parameters of the historical analysis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Trailing window length for rolling statistics.
    pub window: usize,
    /// Rolling anomaly band width, in standard deviations.
    pub sigma: f64,
    /// Years to extrapolate the trend.
    pub forecast_years: usize,
    /// Slope magnitude treated as no trend.
    pub trend_tolerance: f64,
    /// Seasonal norm band width for live readings.
    pub norm_sigma: f64,
    pub strategy: ExecutionStrategy,
    pub season_policy: SeasonPolicy,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            window: DEFAULT_WINDOW,
            sigma: DEFAULT_SIGMA,
            forecast_years: 5,
            trend_tolerance: DEFAULT_TREND_TOLERANCE,
            norm_sigma: DEFAULT_NORM_SIGMA,
            strategy: ExecutionStrategy::default(),
            season_policy: SeasonPolicy::default(),
        }
    }
}

/// Weather service settings.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherSettings {
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherSettings {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 10,
        }
    }
}

impl std::fmt::Debug for WeatherSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherSettings")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

/// Where reports are written.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputSettings {
    pub dir: PathBuf,
}

impl Default for OutputSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("climate-report"),
        }
    }
}

impl AppConfig {
    /// Check value ranges.
    pub fn validate(&self) -> Result<()> {
        let a = &self.analysis;
        if a.window == 0 {
            return Err(ClimateError::Config("analysis.window must be at least 1".into()));
        }
        if !(a.sigma.is_finite() && a.sigma > 0.0) {
            return Err(ClimateError::Config("analysis.sigma must be positive".into()));
        }
        if !(a.norm_sigma.is_finite() && a.norm_sigma > 0.0) {
            return Err(ClimateError::Config("analysis.norm_sigma must be positive".into()));
        }
        if !(a.trend_tolerance.is_finite() && a.trend_tolerance >= 0.0) {
            return Err(ClimateError::Config(
                "analysis.trend_tolerance must be non-negative".into(),
            ));
        }
        if a.forecast_years == 0 || a.forecast_years > MAX_FORECAST_HORIZON {
            return Err(ClimateError::Config(format!(
                "analysis.forecast_years must be in 1..={}, got {}",
                MAX_FORECAST_HORIZON, a.forecast_years
            )));
        }
        if let ExecutionStrategy::Parallel { threads: Some(0) } = a.strategy {
            return Err(ClimateError::Config("analysis.strategy.threads must be at least 1".into()));
        }
        if self.weather.timeout_secs == 0 {
            return Err(ClimateError::Config("weather.timeout_secs must be at least 1".into()));
        }
        Ok(())
    }

    pub fn rolling_config(&self) -> RollingConfig {
        RollingConfig {
            window: self.analysis.window,
            sigma: self.analysis.sigma,
        }
    }

    pub fn load_options(&self) -> LoadOptions {
        LoadOptions {
            season_policy: self.analysis.season_policy,
        }
    }

    /// Weather client settings, if an API key is configured.
    pub fn weather_config(&self) -> Option<WeatherConfig> {
        let key = self.weather.api_key.as_deref()?.trim();
        if key.is_empty() {
            return None;
        }
        Some(
            WeatherConfig::new(key)
                .with_base_url(self.weather.base_url.clone())
                .with_timeout(Duration::from_secs(self.weather.timeout_secs)),
        )
    }
}

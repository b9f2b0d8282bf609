//! # climate-anomaly
//!
//! Historical temperature analysis per city: rolling-window anomaly
//! detection, seasonal norms, long-term linear trend with extrapolation,
//! and classification of live weather readings against seasonal norms.
//!
//! Cities are analysed independently, either sequentially or on a rayon
//! pool, with identical results.

#![allow(clippy::needless_range_loop)]

pub mod analysis;
pub mod config;
pub mod core;
pub mod detection;
pub mod error;
pub mod io;
pub mod seasonality;
pub mod transform;
pub mod trend;
pub mod utils;
pub mod weather;

pub use error::{ClimateError, Result};

pub mod prelude {
    pub use crate::analysis::{analyze_city, run_analysis, BatchReport, ExecutionStrategy};
    pub use crate::config::AppConfig;
    pub use crate::core::{AnnotatedObservation, Observation, Season, SeasonalStats};
    pub use crate::detection::RollingConfig;
    pub use crate::error::{ClimateError, Result};
    pub use crate::io::{load_observations, LoadOptions};
    pub use crate::trend::{trend_forecast, TrendForecast};
    pub use crate::weather::{live_comparison, OpenWeatherClient, WeatherConfig, WeatherProvider};
}

//! Live weather: the OpenWeatherMap client, classification of a reading
//! against seasonal norms, and a blocking/async latency probe.

mod client;
mod compare;
mod error;
mod latency;

pub use client::{
    fetch_current_async, CurrentReading, OpenWeatherClient, WeatherConfig, WeatherProvider,
    DEFAULT_BASE_URL, DEFAULT_TIMEOUT,
};
pub use compare::{
    classify_reading, live_comparison, LiveComparison, NormClassification, NormComparison,
    DEFAULT_NORM_SIGMA,
};
pub use error::{WeatherError, WeatherErrorKind};
pub use latency::{measure_latency, FetchTiming, LatencyReport};

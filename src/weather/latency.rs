//! Blocking versus async latency of one weather call.

use super::client::{fetch_current_async, OpenWeatherClient, WeatherConfig, WeatherProvider};
use super::error::WeatherError;
use serde::Serialize;
use std::time::{Duration, Instant};
use tracing::info;

/// Time taken by one fetch and what it returned.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchTiming {
    pub elapsed: Duration,
    /// Temperature on success, error message otherwise.
    pub outcome: std::result::Result<f64, String>,
}

/// One blocking and one async fetch of the same city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LatencyReport {
    pub city: String,
    pub blocking: FetchTiming,
    pub asynchronous: FetchTiming,
}

impl LatencyReport {
    /// `blocking / asynchronous` elapsed time.
    pub fn ratio(&self) -> f64 {
        let den = self.asynchronous.elapsed.as_secs_f64();
        if den == 0.0 {
            return f64::NAN;
        }
        self.blocking.elapsed.as_secs_f64() / den
    }
}

/// Time a blocking fetch, then an async fetch on a current-thread runtime.
///
/// Each timing includes building its HTTP client. Fetch failures are
/// recorded in the report; only failing to start the async runtime is an
/// error.
pub fn measure_latency(config: &WeatherConfig, city: &str) -> Result<LatencyReport, WeatherError> {
    let start = Instant::now();
    let outcome = OpenWeatherClient::new(config.clone()).and_then(|client| client.current(city));
    let blocking = FetchTiming {
        elapsed: start.elapsed(),
        outcome: outcome.map(|r| r.temperature).map_err(|e| e.to_string()),
    };

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| WeatherError::Network(format!("async runtime: {}", e)))?;

    let asynchronous = runtime.block_on(async {
        let start = Instant::now();
        let outcome = match reqwest::Client::builder().build() {
            Ok(http) => fetch_current_async(&http, config, city).await,
            Err(e) => Err(WeatherError::Network(e.to_string())),
        };
        FetchTiming {
            elapsed: start.elapsed(),
            outcome: outcome.map(|r| r.temperature).map_err(|e| e.to_string()),
        }
    });

    info!(
        city,
        blocking_ms = blocking.elapsed.as_millis() as u64,
        async_ms = asynchronous.elapsed.as_millis() as u64,
        "weather latency measured"
    );

    Ok(LatencyReport {
        city: city.to_string(),
        blocking,
        asynchronous,
    })
}

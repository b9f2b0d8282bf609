//! OpenWeatherMap current-weather client.

use super::error::WeatherError;
use crate::core::Season;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Current-weather endpoint of OpenWeatherMap.
pub const DEFAULT_BASE_URL: &str = "https://api.openweathermap.org/data/2.5/weather";
/// Request timeout used when none is configured.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Connection settings for the weather service.
///
/// The API key is passed in explicitly by the caller; nothing is read from
/// process-wide state here.
#[derive(Clone, PartialEq, Eq)]
pub struct WeatherConfig {
    pub api_key: String,
    pub base_url: String,
    /// Unit system requested from the service; `metric` yields Celsius.
    pub units: String,
    pub timeout: Duration,
}

impl WeatherConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: DEFAULT_BASE_URL.to_string(),
            units: "metric".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    fn query<'a>(&'a self, city: &'a str) -> [(&'static str, &'a str); 3] {
        [("q", city), ("appid", &self.api_key), ("units", &self.units)]
    }

    fn check(&self) -> Result<(), WeatherError> {
        if self.api_key.trim().is_empty() {
            return Err(WeatherError::MissingApiKey);
        }
        Ok(())
    }
}

impl fmt::Debug for WeatherConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WeatherConfig")
            .field("api_key", &"<redacted>")
            .field("base_url", &self.base_url)
            .field("units", &self.units)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// A live temperature reading.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CurrentReading {
    pub city: String,
    /// Temperature in the configured units (Celsius for `metric`).
    pub temperature: f64,
    /// Season of `observed_at`, northern-hemisphere convention.
    pub season: Season,
    pub observed_at: DateTime<Utc>,
}

/// Source of live readings.
pub trait WeatherProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Fetch the current reading for `city`.
    fn current(&self, city: &str) -> Result<CurrentReading, WeatherError>;
}

#[derive(Debug, Deserialize)]
struct ApiResponse {
    main: ApiMain,
    #[serde(default)]
    dt: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct ApiMain {
    temp: f64,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    #[serde(default)]
    message: Option<String>,
}

/// Blocking OpenWeatherMap client.
#[derive(Debug)]
pub struct OpenWeatherClient {
    config: WeatherConfig,
    http: reqwest::blocking::Client,
}

impl OpenWeatherClient {
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        config.check()?;
        let http = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| WeatherError::Network(e.to_string()))?;
        Ok(Self { config, http })
    }

    pub fn config(&self) -> &WeatherConfig {
        &self.config
    }
}

impl WeatherProvider for OpenWeatherClient {
    fn name(&self) -> &str {
        "openweathermap"
    }

    fn current(&self, city: &str) -> Result<CurrentReading, WeatherError> {
        debug!(city, "fetching current weather");
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&self.config.query(city))
            .send()
            .map_err(|e| transport_error(e, self.config.timeout))?;

        let status = response.status().as_u16();
        let body = response
            .text()
            .map_err(|e| transport_error(e, self.config.timeout))?;
        interpret_response(city, status, &body)
    }
}

/// Fetch the current reading with reqwest's async client.
pub async fn fetch_current_async(
    http: &reqwest::Client,
    config: &WeatherConfig,
    city: &str,
) -> Result<CurrentReading, WeatherError> {
    config.check()?;
    let response = http
        .get(&config.base_url)
        .query(&config.query(city))
        .timeout(config.timeout)
        .send()
        .await
        .map_err(|e| transport_error(e, config.timeout))?;

    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .map_err(|e| transport_error(e, config.timeout))?;
    interpret_response(city, status, &body)
}

fn transport_error(err: reqwest::Error, timeout: Duration) -> WeatherError {
    if err.is_timeout() {
        WeatherError::Timeout(timeout)
    } else {
        WeatherError::Network(err.to_string())
    }
}

/// Turn a status code and body into a reading or a typed error.
pub(crate) fn interpret_response(
    city: &str,
    status: u16,
    body: &str,
) -> Result<CurrentReading, WeatherError> {
    match status {
        200..=299 => decode_reading(city, body),
        401 => Err(WeatherError::Unauthorized),
        404 => Err(WeatherError::NotFound(city.to_string())),
        429 => Err(WeatherError::RateLimited),
        _ => {
            let message = serde_json::from_str::<ApiErrorBody>(body)
                .ok()
                .and_then(|b| b.message)
                .unwrap_or_else(|| "unknown error".to_string());
            Err(WeatherError::Http { status, message })
        }
    }
}

fn decode_reading(city: &str, body: &str) -> Result<CurrentReading, WeatherError> {
    let parsed: ApiResponse =
        serde_json::from_str(body).map_err(|e| WeatherError::Decode(e.to_string()))?;
    if !parsed.main.temp.is_finite() {
        return Err(WeatherError::Decode("non-finite temperature".to_string()));
    }

    let observed_at = parsed
        .dt
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now);
    let season = Season::from_month(observed_at.month())
        .ok_or_else(|| WeatherError::Decode("observation month out of range".to_string()))?;

    Ok(CurrentReading {
        city: city.to_string(),
        temperature: parsed.main.temp,
        season,
        observed_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const OK_BODY: &str = r#"{"coord":{"lon":37.62,"lat":55.75},"main":{"temp":-3.4,"humidity":80},"dt":1705320000,"name":"Moscow","cod":200}"#;

    #[test]
    fn decodes_success_body() {
        let reading = interpret_response("Moscow", 200, OK_BODY).unwrap();
        assert_eq!(reading.city, "Moscow");
        assert_eq!(reading.temperature, -3.4);
        // 2024-01-15
        assert_eq!(reading.season, Season::Winter);
        assert_eq!(reading.observed_at.timestamp(), 1_705_320_000);
    }

    #[test]
    fn maps_status_codes() {
        let body = r#"{"cod":401,"message":"Invalid API key"}"#;
        assert_eq!(
            interpret_response("Moscow", 401, body),
            Err(WeatherError::Unauthorized)
        );
        assert_eq!(
            interpret_response("Atlantis", 404, r#"{"cod":"404","message":"city not found"}"#),
            Err(WeatherError::NotFound("Atlantis".to_string()))
        );
        assert_eq!(
            interpret_response("Moscow", 429, ""),
            Err(WeatherError::RateLimited)
        );
    }

    #[test]
    fn other_status_carries_service_message() {
        let err = interpret_response("Moscow", 500, r#"{"message":"internal"}"#).unwrap_err();
        assert_eq!(
            err,
            WeatherError::Http {
                status: 500,
                message: "internal".to_string()
            }
        );

        let err = interpret_response("Moscow", 502, "<html>").unwrap_err();
        assert!(matches!(err, WeatherError::Http { status: 502, ref message } if message == "unknown error"));
    }

    #[test]
    fn malformed_success_body_is_decode_error() {
        let err = interpret_response("Moscow", 200, r#"{"main":{}}"#).unwrap_err();
        assert!(matches!(err, WeatherError::Decode(_)));
    }

    #[test]
    fn empty_key_is_rejected_before_any_request() {
        let err = OpenWeatherClient::new(WeatherConfig::new("  ")).unwrap_err();
        assert_eq!(err, WeatherError::MissingApiKey);
    }

    fn silent_endpoint() -> (std::net::TcpListener, WeatherConfig) {
        // Accepts connections into the backlog and never answers.
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let url = format!("http://{}/weather", listener.local_addr().unwrap());
        let config = WeatherConfig::new("test-key")
            .with_base_url(url)
            .with_timeout(Duration::from_millis(300));
        (listener, config)
    }

    #[test]
    fn blocking_fetch_stops_at_timeout() {
        let (_listener, config) = silent_endpoint();
        let client = OpenWeatherClient::new(config).unwrap();

        let started = std::time::Instant::now();
        let err = client.current("Moscow").unwrap_err();
        assert_eq!(err, WeatherError::Timeout(Duration::from_millis(300)));
        assert!(err.is_retryable());
        assert!(started.elapsed() < Duration::from_secs(5));
    }

    #[test]
    fn async_fetch_stops_at_timeout() {
        let (_listener, config) = silent_endpoint();
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();

        let err = runtime
            .block_on(async {
                let http = reqwest::Client::new();
                fetch_current_async(&http, &config, "Moscow").await
            })
            .unwrap_err();
        assert_eq!(err, WeatherError::Timeout(Duration::from_millis(300)));
    }

    #[test]
    fn debug_output_hides_key() {
        let config = WeatherConfig::new("secret-key");
        let text = format!("{:?}", config);
        assert!(!text.contains("secret-key"));
        assert!(text.contains("redacted"));
    }
}

//! Weather service errors.

use std::time::Duration;
use thiserror::Error;

/// Failures of the live weather lookup.
///
/// These are local to a single lookup; callers degrade to "no live
/// comparison" instead of aborting an analysis.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WeatherError {
    /// No API key was configured.
    #[error("no weather API key configured")]
    MissingApiKey,

    /// The service rejected the API key (HTTP 401).
    #[error("invalid API key")]
    Unauthorized,

    /// Too many requests (HTTP 429).
    #[error("rate limited by weather service")]
    RateLimited,

    /// The service does not know the city (HTTP 404).
    #[error("city not found: {0}")]
    NotFound(String),

    /// Any other non-success HTTP status.
    #[error("weather service returned {status}: {message}")]
    Http { status: u16, message: String },

    /// The request did not complete within the configured timeout.
    #[error("weather request timed out after {0:?}")]
    Timeout(Duration),

    /// Connection, DNS or TLS failure.
    #[error("network error: {0}")]
    Network(String),

    /// The response body was not the expected JSON.
    #[error("could not decode weather response: {0}")]
    Decode(String),
}

/// Coarse grouping of [`WeatherError`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WeatherErrorKind {
    Auth,
    Http,
    Network,
}

impl WeatherError {
    pub fn kind(&self) -> WeatherErrorKind {
        match self {
            WeatherError::MissingApiKey | WeatherError::Unauthorized => WeatherErrorKind::Auth,
            WeatherError::RateLimited
            | WeatherError::NotFound(_)
            | WeatherError::Http { .. }
            | WeatherError::Decode(_) => WeatherErrorKind::Http,
            WeatherError::Timeout(_) | WeatherError::Network(_) => WeatherErrorKind::Network,
        }
    }

    /// Whether repeating the same request may succeed.
    ///
    /// Authentication problems need new credentials and a missing city stays
    /// missing; timeouts, throttling, connection failures and server errors
    /// may clear up.
    pub fn is_retryable(&self) -> bool {
        match self {
            WeatherError::Timeout(_) | WeatherError::RateLimited | WeatherError::Network(_) => true,
            WeatherError::Http { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

//! Error types for the climate-anomaly library.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Result type alias for analysis operations.
pub type Result<T> = std::result::Result<T, ClimateError>;

/// Errors that can occur while loading or analysing temperature data.
///
/// Failures of the live weather service are reported separately through
/// [`crate::weather::WeatherError`] so that they never abort a batch run.
#[derive(Error, Debug)]
pub enum ClimateError {
    /// Input data is empty.
    #[error("empty input data")]
    EmptyData,

    /// Insufficient data points for the operation.
    #[error("insufficient data: need at least {needed}, got {got}")]
    InsufficientData { needed: usize, got: usize },

    /// Invalid parameter value.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// A source row could not be turned into an observation.
    #[error("invalid data at line {line}: {message}")]
    InvalidData { line: u64, message: String },

    /// A temperature that reached the analyzer is NaN or infinite.
    #[error("non-finite temperature for {city} at {timestamp}")]
    NonFiniteValue {
        city: String,
        timestamp: DateTime<Utc>,
    },

    /// The trend line cannot be fitted because the yearly series has fewer
    /// than two distinct years.
    #[error("degenerate trend: need at least 2 distinct years, got {distinct_years}")]
    DegenerateTrend { distinct_years: usize },

    /// No seasonal norm exists for the requested city and season.
    #[error("no seasonal norm for {city} in {season}")]
    MissingSeason { city: String, season: String },

    /// Configuration could not be loaded or failed validation.
    #[error("configuration error: {0}")]
    Config(String),

    /// Underlying I/O failure.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV reader or writer failure.
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
}

impl ClimateError {
    /// Shorthand for a data error on a given source line.
    pub fn invalid_data(line: u64, message: impl Into<String>) -> Self {
        Self::InvalidData {
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_messages_are_descriptive() {
        let err = ClimateError::EmptyData;
        assert_eq!(err.to_string(), "empty input data");

        let err = ClimateError::InsufficientData { needed: 2, got: 1 };
        assert_eq!(err.to_string(), "insufficient data: need at least 2, got 1");

        let err = ClimateError::InvalidParameter("horizon must be positive".to_string());
        assert_eq!(err.to_string(), "invalid parameter: horizon must be positive");

        let err = ClimateError::invalid_data(7, "unknown season 'monsoon'");
        assert_eq!(
            err.to_string(),
            "invalid data at line 7: unknown season 'monsoon'"
        );

        let err = ClimateError::DegenerateTrend { distinct_years: 1 };
        assert_eq!(
            err.to_string(),
            "degenerate trend: need at least 2 distinct years, got 1"
        );
    }

    #[test]
    fn missing_season_names_city_and_season() {
        let err = ClimateError::MissingSeason {
            city: "Berlin".to_string(),
            season: "winter".to_string(),
        };
        assert_eq!(err.to_string(), "no seasonal norm for Berlin in winter");
    }

    #[test]
    fn io_errors_convert() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing.csv");
        let err: ClimateError = io.into();
        assert!(matches!(err, ClimateError::Io(_)));
    }
}

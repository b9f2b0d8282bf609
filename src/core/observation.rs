//! Observation records and the values derived from them.

use super::Season;
use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// A single temperature reading for a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub city: String,
    pub timestamp: DateTime<Utc>,
    /// Temperature in degrees Celsius.
    pub temperature: f64,
    pub season: Season,
}

impl Observation {
    pub fn new(
        city: impl Into<String>,
        timestamp: DateTime<Utc>,
        temperature: f64,
        season: Season,
    ) -> Self {
        Self {
            city: city.into(),
            timestamp,
            temperature,
            season,
        }
    }

    /// Calendar year of the reading.
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }
}

/// An observation together with its local (rolling) and seasonal context.
///
/// `rolling_std` and `seasonal_std` are `None` when fewer than two values
/// contribute to them; in that case the row is never flagged as an anomaly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnnotatedObservation {
    pub city: String,
    pub timestamp: DateTime<Utc>,
    pub temperature: f64,
    pub season: Season,
    pub rolling_mean: f64,
    pub rolling_std: Option<f64>,
    pub is_anomaly: bool,
    pub seasonal_mean: f64,
    pub seasonal_std: Option<f64>,
}

impl AnnotatedObservation {
    /// Calendar year of the reading.
    pub fn year(&self) -> i32 {
        self.timestamp.year()
    }

    /// Signed distance from the rolling mean.
    pub fn deviation(&self) -> f64 {
        self.temperature - self.rolling_mean
    }

    /// The underlying observation without derived fields.
    pub fn observation(&self) -> Observation {
        Observation {
            city: self.city.clone(),
            timestamp: self.timestamp,
            temperature: self.temperature,
            season: self.season,
        }
    }
}

/// Temperature norm of one season for one city, computed over every
/// observation of that city carrying the season label.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeasonalStats {
    pub city: String,
    pub season: Season,
    pub seasonal_mean: f64,
    pub seasonal_std: Option<f64>,
    /// Number of observations the statistics were computed from.
    pub count: usize,
}

/// One year on the fitted trend line.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearlyTrendPoint {
    pub year: i32,
    /// Observed yearly mean; `None` for forecast years.
    pub temperature: Option<f64>,
    /// Value of the fitted line at `year`.
    pub trend: f64,
    pub is_future: bool,
}

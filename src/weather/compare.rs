//! Classification of a live reading against a city's seasonal norm.

use super::client::{CurrentReading, WeatherProvider};
use super::error::WeatherError;
use crate::core::SeasonalStats;
use crate::error::{ClimateError, Result};
use crate::seasonality::NormBand;
use serde::Serialize;
use tracing::{info, warn};

/// Half-width of the normal band in seasonal standard deviations.
pub const DEFAULT_NORM_SIGMA: f64 = 2.0;

/// Where a reading falls relative to its season's norm band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NormClassification {
    WithinNorm,
    Anomalous,
}

impl NormClassification {
    /// `WithinNorm` when `temperature` lies in the closed band.
    pub fn of(temperature: f64, band: &NormBand) -> Self {
        if band.contains(temperature) {
            NormClassification::WithinNorm
        } else {
            NormClassification::Anomalous
        }
    }
}

/// A reading together with the band it was judged against.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NormComparison {
    pub reading: CurrentReading,
    pub band: NormBand,
    pub classification: NormClassification,
}

impl NormComparison {
    pub fn is_anomalous(&self) -> bool {
        self.classification == NormClassification::Anomalous
    }
}

/// Judge a reading against the stats of its season.
///
/// `seasonal` holds the city's seasonal statistics. Fails when the season is
/// absent or its standard deviation is undefined.
pub fn classify_reading(
    reading: &CurrentReading,
    seasonal: &[SeasonalStats],
    sigma: f64,
) -> Result<NormComparison> {
    let stats = seasonal
        .iter()
        .find(|s| s.season == reading.season)
        .ok_or_else(|| ClimateError::MissingSeason {
            city: reading.city.clone(),
            season: reading.season.to_string(),
        })?;
    let band = NormBand::from_stats(stats, sigma).ok_or(ClimateError::InsufficientData {
        needed: 2,
        got: stats.count,
    })?;

    Ok(NormComparison {
        reading: reading.clone(),
        band,
        classification: NormClassification::of(reading.temperature, &band),
    })
}

/// Outcome of a live check.
#[derive(Debug)]
pub enum LiveComparison {
    Available(NormComparison),
    /// The weather service failed; no comparison possible.
    ServiceUnavailable(WeatherError),
    /// The reading arrived but there is no usable norm to compare with.
    NoNorm(CurrentReading, ClimateError),
}

impl LiveComparison {
    pub fn comparison(&self) -> Option<&NormComparison> {
        match self {
            LiveComparison::Available(c) => Some(c),
            _ => None,
        }
    }
}

/// Fetch the current reading for `city` and compare it to its norm.
///
/// Never fails: service and norm problems are reported as variants of
/// [`LiveComparison`].
pub fn live_comparison(
    provider: &dyn WeatherProvider,
    city: &str,
    seasonal: &[SeasonalStats],
    sigma: f64,
) -> LiveComparison {
    let reading = match provider.current(city) {
        Ok(reading) => reading,
        Err(error) => {
            warn!(
                provider = provider.name(),
                city,
                error = %error,
                retryable = error.is_retryable(),
                "live weather unavailable"
            );
            return LiveComparison::ServiceUnavailable(error);
        }
    };

    match classify_reading(&reading, seasonal, sigma) {
        Ok(comparison) => {
            info!(
                city,
                temperature = reading.temperature,
                season = %reading.season,
                classification = ?comparison.classification,
                "live reading classified"
            );
            LiveComparison::Available(comparison)
        }
        Err(error) => {
            warn!(city, error = %error, "no seasonal norm for live reading");
            LiveComparison::NoNorm(reading, error)
        }
    }
}

//! CSV loading of temperature observations.
//!
//! Expected header: `city,timestamp,temperature,season`. Extra columns are
//! ignored. The season column may be absent when the loader is asked to
//! derive seasons from the timestamp month.

use crate::core::{Observation, Season};
use crate::error::{ClimateError, Result};
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// What to do with the season column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeasonPolicy {
    /// Every row must carry a valid season label.
    #[default]
    Require,
    /// Use the label when present, otherwise map the timestamp month.
    DeriveFromMonth,
}

/// Options for reading an observation table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoadOptions {
    pub season_policy: SeasonPolicy,
}

impl LoadOptions {
    pub fn derive_seasons() -> Self {
        Self {
            season_policy: SeasonPolicy::DeriveFromMonth,
        }
    }
}

#[derive(Debug, Deserialize)]
struct RawRecord {
    city: String,
    timestamp: String,
    temperature: String,
    #[serde(default)]
    season: Option<String>,
}

/// Load observations from a CSV file.
pub fn load_observations<P: AsRef<Path>>(path: P, options: &LoadOptions) -> Result<Vec<Observation>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let observations = read_observations(file, options)?;
    debug!(path = %path.display(), rows = observations.len(), "loaded observations");
    Ok(observations)
}

/// Read observations from any CSV source.
///
/// Rows are returned in file order. The first malformed row aborts the read
/// with [`ClimateError::InvalidData`] naming its line.
pub fn read_observations<R: Read>(source: R, options: &LoadOptions) -> Result<Vec<Observation>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(source);
    let headers = reader.headers()?.clone();

    let mut observations = Vec::new();
    for record in reader.records() {
        let record = record?;
        let line = record.position().map_or(0, |p| p.line());
        let raw: RawRecord = record
            .deserialize(Some(&headers))
            .map_err(|e| ClimateError::invalid_data(line, e.to_string()))?;
        observations.push(parse_record(raw, line, options)?);
    }

    Ok(observations)
}

fn parse_record(raw: RawRecord, line: u64, options: &LoadOptions) -> Result<Observation> {
    if raw.city.is_empty() {
        return Err(ClimateError::invalid_data(line, "empty city"));
    }

    let timestamp = parse_timestamp(&raw.timestamp).ok_or_else(|| {
        ClimateError::invalid_data(line, format!("unparsable timestamp '{}'", raw.timestamp))
    })?;

    let temperature: f64 = raw.temperature.parse().map_err(|_| {
        ClimateError::invalid_data(line, format!("non-numeric temperature '{}'", raw.temperature))
    })?;
    if !temperature.is_finite() {
        return Err(ClimateError::invalid_data(
            line,
            format!("non-finite temperature '{}'", raw.temperature),
        ));
    }

    let label = raw.season.filter(|s| !s.is_empty());
    let season = match (label, options.season_policy) {
        (Some(label), _) => label
            .parse::<Season>()
            .map_err(|e| ClimateError::invalid_data(line, e.to_string()))?,
        (None, SeasonPolicy::DeriveFromMonth) => Season::from_month(timestamp.month())
            .ok_or_else(|| ClimateError::invalid_data(line, "timestamp month out of range"))?,
        (None, SeasonPolicy::Require) => {
            return Err(ClimateError::invalid_data(line, "missing season"));
        }
    };

    Ok(Observation {
        city: raw.city,
        timestamp,
        temperature,
        season,
    })
}

/// Parse an ISO-8601 date or date-time.
///
/// Accepts RFC 3339 with an offset (converted to UTC), naive date-times with
/// `T` or space separator, and plain dates (midnight UTC).
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, format) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| Utc.from_utc_datetime(&naive))
}

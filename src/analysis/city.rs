//! Analysis of a single city's observations.

use crate::core::{AnnotatedObservation, Observation, Season, SeasonalStats};
use crate::detection::{detect_rolling_anomalies, RollingConfig};
use crate::error::{ClimateError, Result};
use crate::seasonality::seasonal_stats;
use serde::Serialize;

/// Annotated rows and seasonal norms for one city.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CityAnalysis {
    pub city: String,
    /// Rows in ascending timestamp order.
    pub rows: Vec<AnnotatedObservation>,
    /// One entry per season present, in calendar order.
    pub seasonal: Vec<SeasonalStats>,
}

impl CityAnalysis {
    /// Rows flagged as anomalous.
    pub fn anomalies(&self) -> impl Iterator<Item = &AnnotatedObservation> {
        self.rows.iter().filter(|r| r.is_anomaly)
    }

    pub fn anomaly_count(&self) -> usize {
        self.anomalies().count()
    }

    /// Seasonal statistics for `season`, if the city has data for it.
    pub fn season(&self, season: Season) -> Option<&SeasonalStats> {
        self.seasonal.iter().find(|s| s.season == season)
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Annotate one city's observations with rolling and seasonal context.
///
/// Observations may arrive in any order; they are stably sorted by
/// timestamp first, so equal timestamps keep their input order. Every
/// observation must belong to `city` and carry a finite temperature.
/// Empty input produces an empty analysis.
pub fn analyze_city<'a, I>(city: &str, observations: I, config: &RollingConfig) -> Result<CityAnalysis>
where
    I: IntoIterator<Item = &'a Observation>,
{
    let mut sorted: Vec<&Observation> = observations.into_iter().collect();

    for obs in &sorted {
        if obs.city != city {
            return Err(ClimateError::InvalidParameter(format!(
                "observation for '{}' passed to analysis of '{}'",
                obs.city, city
            )));
        }
        if !obs.temperature.is_finite() {
            return Err(ClimateError::NonFiniteValue {
                city: city.to_string(),
                timestamp: obs.timestamp,
            });
        }
    }

    sorted.sort_by_key(|obs| obs.timestamp);

    let temperatures: Vec<f64> = sorted.iter().map(|obs| obs.temperature).collect();
    let rolling = detect_rolling_anomalies(&temperatures, config);
    let seasonal = seasonal_stats(city, sorted.iter().map(|obs| (obs.season, obs.temperature)));

    let rows = sorted
        .iter()
        .enumerate()
        .map(|(i, obs)| {
            // Every season of the city has a row in `seasonal`.
            let norm = seasonal.iter().find(|s| s.season == obs.season);
            AnnotatedObservation {
                city: obs.city.clone(),
                timestamp: obs.timestamp,
                temperature: obs.temperature,
                season: obs.season,
                rolling_mean: rolling.rolling_mean[i],
                rolling_std: rolling.rolling_std[i],
                is_anomaly: rolling.flags[i],
                seasonal_mean: norm.map_or(f64::NAN, |s| s.seasonal_mean),
                seasonal_std: norm.and_then(|s| s.seasonal_std),
            }
        })
        .collect();

    Ok(CityAnalysis {
        city: city.to_string(),
        rows,
        seasonal,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use chrono::{Duration, TimeZone, Utc};

    fn daily(city: &str, temps: &[f64]) -> Vec<Observation> {
        let base = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        temps
            .iter()
            .enumerate()
            .map(|(i, &t)| Observation::new(city, base + Duration::days(i as i64), t, Season::Winter))
            .collect()
    }

    #[test]
    fn rows_are_sorted_by_timestamp() {
        let mut observations = daily("Quito", &[1.0, 2.0, 3.0, 4.0]);
        observations.reverse();

        let analysis = analyze_city("Quito", &observations, &RollingConfig::default()).unwrap();

        let temps: Vec<f64> = analysis.rows.iter().map(|r| r.temperature).collect();
        assert_eq!(temps, vec![1.0, 2.0, 3.0, 4.0]);
        assert_relative_eq!(analysis.rows[1].rolling_mean, 1.5);
    }

    #[test]
    fn equal_timestamps_keep_input_order() {
        let ts = Utc.with_ymd_and_hms(2021, 6, 1, 0, 0, 0).unwrap();
        let observations = vec![
            Observation::new("Nice", ts, 21.0, Season::Summer),
            Observation::new("Nice", ts, 19.0, Season::Summer),
        ];
        let analysis = analyze_city("Nice", &observations, &RollingConfig::default()).unwrap();
        assert_eq!(analysis.rows[0].temperature, 21.0);
        assert_eq!(analysis.rows[1].temperature, 19.0);
    }

    #[test]
    fn seasonal_stats_are_joined_onto_rows() {
        let base = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let observations = vec![
            Observation::new("Kyiv", base, -4.0, Season::Winter),
            Observation::new("Kyiv", base + Duration::days(1), -6.0, Season::Winter),
            Observation::new("Kyiv", base + Duration::days(150), 22.0, Season::Summer),
        ];
        let analysis = analyze_city("Kyiv", &observations, &RollingConfig::default()).unwrap();

        assert_eq!(analysis.seasonal.len(), 2);
        let winter = &analysis.rows[0];
        assert_relative_eq!(winter.seasonal_mean, -5.0);
        assert_relative_eq!(winter.seasonal_std.unwrap(), 2.0_f64.sqrt(), epsilon = 1e-12);
        let summer = &analysis.rows[2];
        assert_relative_eq!(summer.seasonal_mean, 22.0);
        assert!(summer.seasonal_std.is_none());
    }

    #[test]
    fn outlier_after_constant_run_is_the_only_anomaly() {
        let mut temps = vec![20.0; 29];
        temps.push(100.0);
        let observations = daily("Perth", &temps);

        let analysis = analyze_city("Perth", &observations, &RollingConfig::default()).unwrap();

        assert_eq!(analysis.anomaly_count(), 1);
        assert!(analysis.rows[29].is_anomaly);
        assert!(analysis.rows[0].rolling_std.is_none());
    }

    #[test]
    fn empty_input_is_not_an_error() {
        let analysis = analyze_city("Nowhere", &[], &RollingConfig::default()).unwrap();
        assert!(analysis.is_empty());
        assert!(analysis.seasonal.is_empty());
    }

    #[test]
    fn foreign_city_is_rejected() {
        let observations = daily("Lagos", &[30.0]);
        let err = analyze_city("Accra", &observations, &RollingConfig::default()).unwrap_err();
        assert!(matches!(err, ClimateError::InvalidParameter(_)));
    }

    #[test]
    fn non_finite_temperature_is_a_data_error() {
        let observations = daily("Lagos", &[30.0, f64::NAN]);
        let err = analyze_city("Lagos", &observations, &RollingConfig::default()).unwrap_err();
        assert!(matches!(err, ClimateError::NonFiniteValue { .. }));
    }

    #[test]
    fn season_lookup() {
        let observations = daily("Oslo", &[-1.0, -3.0]);
        let analysis = analyze_city("Oslo", &observations, &RollingConfig::default()).unwrap();
        assert!(analysis.season(Season::Winter).is_some());
        assert!(analysis.season(Season::Summer).is_none());
    }
}

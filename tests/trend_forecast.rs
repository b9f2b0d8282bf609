//! End-to-end trend tests: from raw observations through the per-city
//! analyzer to the fitted and extrapolated yearly trend.

use approx::assert_relative_eq;
use chrono::{Duration, TimeZone, Utc};
use climate_anomaly::analysis::analyze_city;
use climate_anomaly::core::{Observation, Season};
use climate_anomaly::detection::RollingConfig;
use climate_anomaly::error::ClimateError;
use climate_anomaly::trend::{trend_forecast, TrendDirection, DEFAULT_TREND_TOLERANCE};
use proptest::prelude::*;

/// Four readings per year, all equal to `mean_of(year)`.
fn quarterly(city: &str, years: std::ops::Range<i32>, mean_of: impl Fn(i32) -> f64) -> Vec<Observation> {
    let mut out = Vec::new();
    for year in years {
        let start = Utc.with_ymd_and_hms(year, 1, 15, 0, 0, 0).unwrap();
        for (q, season) in Season::ALL.into_iter().enumerate() {
            out.push(Observation::new(
                city,
                start + Duration::days(90 * q as i64),
                mean_of(year),
                season,
            ));
        }
    }
    out
}

#[test]
fn linear_yearly_means_extrapolate_exactly() {
    let obs = quarterly("Lima", 2000..2004, |y| 10.0 + 0.5 * (y - 2000) as f64);
    let analysis = analyze_city("Lima", &obs, &RollingConfig::default()).unwrap();
    let forecast = trend_forecast(&analysis.rows, 2).unwrap();

    assert_relative_eq!(forecast.slope(), 0.5, epsilon = 1e-10);
    assert_eq!(forecast.last_observed_year(), Some(2003));

    let historical: Vec<_> = forecast.historical().collect();
    assert_eq!(historical.len(), 4);
    for point in &historical {
        assert!(!point.is_future);
        assert_relative_eq!(point.trend, point.temperature.unwrap(), epsilon = 1e-9);
    }

    let future: Vec<(i32, f64)> = forecast.future().map(|p| (p.year, p.trend)).collect();
    assert_eq!(future.len(), 2);
    assert_eq!(future[0].0, 2004);
    assert_relative_eq!(future[0].1, 12.0, epsilon = 1e-9);
    assert_eq!(future[1].0, 2005);
    assert_relative_eq!(future[1].1, 12.5, epsilon = 1e-9);

    assert_eq!(forecast.direction(DEFAULT_TREND_TOLERANCE), TrendDirection::Warming);
}

#[test]
fn single_year_is_degenerate() {
    let obs = quarterly("Lima", 2010..2011, |_| 18.0);
    let analysis = analyze_city("Lima", &obs, &RollingConfig::default()).unwrap();

    let err = trend_forecast(&analysis.rows, 3).unwrap_err();
    assert!(matches!(err, ClimateError::DegenerateTrend { distinct_years: 1 }));
}

#[test]
fn zero_horizon_is_rejected() {
    let obs = quarterly("Lima", 2000..2005, |_| 18.0);
    let analysis = analyze_city("Lima", &obs, &RollingConfig::default()).unwrap();

    let err = trend_forecast(&analysis.rows, 0).unwrap_err();
    assert!(matches!(err, ClimateError::InvalidParameter(_)));
}

#[test]
fn flat_series_has_zero_slope_not_error() {
    let obs = quarterly("Lima", 2000..2005, |_| 18.0);
    let analysis = analyze_city("Lima", &obs, &RollingConfig::default()).unwrap();
    let forecast = trend_forecast(&analysis.rows, 1).unwrap();

    assert_relative_eq!(forecast.slope(), 0.0, epsilon = 1e-12);
    assert_eq!(forecast.direction(DEFAULT_TREND_TOLERANCE), TrendDirection::Stable);
}

proptest! {
    #[test]
    fn forecast_years_follow_last_observed(
        first in 1950i32..2000,
        span in 2i32..30,
        horizon in 1usize..20,
        slope in -0.5..0.5_f64,
    ) {
        let obs = quarterly("Lima", first..first + span, |y| 5.0 + slope * (y - first) as f64);
        let analysis = analyze_city("Lima", &obs, &RollingConfig::default()).unwrap();
        let forecast = trend_forecast(&analysis.rows, horizon).unwrap();

        let last = first + span - 1;
        let future: Vec<i32> = forecast.future().map(|p| p.year).collect();
        let expected: Vec<i32> = (last + 1..=last + horizon as i32).collect();
        prop_assert_eq!(future, expected);
        prop_assert_eq!(forecast.historical().count(), span as usize);
        prop_assert!((forecast.slope() - slope).abs() < 1e-8);
    }
}

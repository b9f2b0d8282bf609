//! Yearly means, long-term trend and its linear extrapolation.

use super::linear::{fit_line, LinearFit};
use crate::core::{AnnotatedObservation, YearlyTrendPoint};
use crate::error::{ClimateError, Result};
use serde::Serialize;
use std::collections::BTreeMap;

/// Slope magnitude (°C per year) below which a trend counts as stable.
pub const DEFAULT_TREND_TOLERANCE: f64 = 0.01;

/// Longest accepted forecast horizon, in years.
pub const MAX_FORECAST_HORIZON: usize = 1000;

/// Observed mean temperature of one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct YearlyMean {
    pub year: i32,
    pub temperature: f64,
    /// Number of observations averaged.
    pub count: usize,
}

/// Qualitative reading of the fitted slope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendDirection {
    Warming,
    Cooling,
    Stable,
}

impl TrendDirection {
    /// `Warming` above `tolerance`, `Cooling` below `-tolerance`, else `Stable`.
    pub fn classify(slope: f64, tolerance: f64) -> Self {
        if slope > tolerance {
            TrendDirection::Warming
        } else if slope < -tolerance {
            TrendDirection::Cooling
        } else {
            TrendDirection::Stable
        }
    }
}

/// Yearly series, fitted line and its extension into future years.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrendForecast {
    /// Observed yearly means, ascending by year.
    pub yearly: Vec<YearlyMean>,
    /// Trend values for every observed year followed by the forecast years.
    pub points: Vec<YearlyTrendPoint>,
    pub fit: LinearFit,
}

impl TrendForecast {
    /// Fitted slope in °C per year.
    pub fn slope(&self) -> f64 {
        self.fit.slope
    }

    pub fn historical(&self) -> impl Iterator<Item = &YearlyTrendPoint> {
        self.points.iter().filter(|p| !p.is_future)
    }

    pub fn future(&self) -> impl Iterator<Item = &YearlyTrendPoint> {
        self.points.iter().filter(|p| p.is_future)
    }

    pub fn last_observed_year(&self) -> Option<i32> {
        self.yearly.last().map(|y| y.year)
    }

    pub fn direction(&self, tolerance: f64) -> TrendDirection {
        TrendDirection::classify(self.fit.slope, tolerance)
    }
}

/// Average `(year, temperature)` pairs per calendar year.
///
/// Years without data are simply absent; nothing is interpolated.
pub fn yearly_means<I>(readings: I) -> Vec<YearlyMean>
where
    I: IntoIterator<Item = (i32, f64)>,
{
    let mut sums: BTreeMap<i32, (f64, usize)> = BTreeMap::new();
    for (year, temperature) in readings {
        let entry = sums.entry(year).or_insert((0.0, 0));
        entry.0 += temperature;
        entry.1 += 1;
    }
    sums.into_iter()
        .map(|(year, (sum, count))| YearlyMean {
            year,
            temperature: sum / count as f64,
            count,
        })
        .collect()
}

/// Fit the long-term trend of one city and extend it `horizon` years.
pub fn trend_forecast(rows: &[AnnotatedObservation], horizon: usize) -> Result<TrendForecast> {
    if rows.is_empty() {
        return Err(ClimateError::EmptyData);
    }
    let yearly = yearly_means(rows.iter().map(|r| (r.year(), r.temperature)));
    trend_from_yearly(yearly, horizon)
}

/// Fit and extend a trend from an already aggregated yearly series.
pub fn trend_from_yearly(mut yearly: Vec<YearlyMean>, horizon: usize) -> Result<TrendForecast> {
    if horizon == 0 || horizon > MAX_FORECAST_HORIZON {
        return Err(ClimateError::InvalidParameter(format!(
            "forecast horizon must be between 1 and {} years, got {}",
            MAX_FORECAST_HORIZON, horizon
        )));
    }
    if yearly.is_empty() {
        return Err(ClimateError::EmptyData);
    }
    yearly.sort_by_key(|y| y.year);
    if yearly.len() < 2 {
        return Err(ClimateError::DegenerateTrend {
            distinct_years: yearly.len(),
        });
    }

    let xs: Vec<f64> = yearly.iter().map(|y| y.year as f64).collect();
    let ys: Vec<f64> = yearly.iter().map(|y| y.temperature).collect();
    let fit = fit_line(&xs, &ys)?;

    // Non-empty, checked above.
    let last_year = yearly[yearly.len() - 1].year;
    let end_year = i32::try_from(horizon)
        .ok()
        .and_then(|h| last_year.checked_add(h))
        .ok_or_else(|| {
            ClimateError::InvalidParameter(format!(
                "forecast of {} years past {} is out of range",
                horizon, last_year
            ))
        })?;

    let mut points = Vec::with_capacity(yearly.len() + horizon);
    points.extend(yearly.iter().map(|y| YearlyTrendPoint {
        year: y.year,
        temperature: Some(y.temperature),
        trend: fit.predict(y.year as f64),
        is_future: false,
    }));
    points.extend((last_year + 1..=end_year).map(|year| {
        YearlyTrendPoint {
            year,
            temperature: None,
            trend: fit.predict(year as f64),
            is_future: true,
        }
    }));

    Ok(TrendForecast {
        yearly,
        points,
        fit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn series(points: &[(i32, f64)]) -> Vec<YearlyMean> {
        points
            .iter()
            .map(|&(year, temperature)| YearlyMean {
                year,
                temperature,
                count: 1,
            })
            .collect()
    }

    #[test]
    fn linear_series_forecast() {
        let yearly = series(&[(2000, 10.0), (2001, 10.5), (2002, 11.0), (2003, 11.5)]);
        let forecast = trend_from_yearly(yearly, 2).unwrap();

        assert_relative_eq!(forecast.slope(), 0.5, epsilon = 1e-10);
        for (point, expected) in forecast.historical().zip([10.0, 10.5, 11.0, 11.5]) {
            assert_relative_eq!(point.trend, expected, epsilon = 1e-9);
        }
        let future: Vec<_> = forecast.future().collect();
        assert_eq!(future.len(), 2);
        assert_eq!(future[0].year, 2004);
        assert_relative_eq!(future[0].trend, 12.0, epsilon = 1e-9);
        assert_eq!(future[1].year, 2005);
        assert_relative_eq!(future[1].trend, 12.5, epsilon = 1e-9);
        assert!(future.iter().all(|p| p.is_future && p.temperature.is_none()));
    }

    #[test]
    fn gaps_are_not_interpolated() {
        let yearly = series(&[(1990, 5.0), (1995, 6.0), (2000, 7.0)]);
        let forecast = trend_from_yearly(yearly, 1).unwrap();

        let years: Vec<i32> = forecast.points.iter().map(|p| p.year).collect();
        assert_eq!(years, vec![1990, 1995, 2000, 2001]);
        assert_relative_eq!(forecast.slope(), 0.2, epsilon = 1e-10);
    }

    #[test]
    fn yearly_means_average_within_year() {
        let means = yearly_means(vec![(2011, 4.0), (2010, 1.0), (2011, 6.0), (2010, 3.0)]);
        assert_eq!(means.len(), 2);
        assert_eq!(means[0].year, 2010);
        assert_relative_eq!(means[0].temperature, 2.0);
        assert_eq!(means[1].count, 2);
        assert_relative_eq!(means[1].temperature, 5.0);
    }

    #[test]
    fn zero_horizon_is_invalid() {
        let yearly = series(&[(2000, 1.0), (2001, 2.0)]);
        assert!(matches!(
            trend_from_yearly(yearly, 0),
            Err(ClimateError::InvalidParameter(_))
        ));
    }

    #[test]
    fn oversized_horizon_is_invalid() {
        let yearly = series(&[(2000, 1.0), (2001, 2.0)]);
        assert!(matches!(
            trend_from_yearly(yearly.clone(), 3_000_000_000),
            Err(ClimateError::InvalidParameter(_))
        ));
        assert!(matches!(
            trend_from_yearly(yearly.clone(), MAX_FORECAST_HORIZON + 1),
            Err(ClimateError::InvalidParameter(_))
        ));
        let forecast = trend_from_yearly(yearly, MAX_FORECAST_HORIZON).unwrap();
        assert_eq!(forecast.future().count(), MAX_FORECAST_HORIZON);
        assert_eq!(forecast.points.last().map(|p| p.year), Some(3001));
    }

    #[test]
    fn year_overflow_is_invalid() {
        let yearly = series(&[(i32::MAX - 1, 1.0), (i32::MAX, 2.0)]);
        assert!(matches!(
            trend_from_yearly(yearly, 1),
            Err(ClimateError::InvalidParameter(_))
        ));
    }

    #[test]
    fn single_year_is_degenerate_not_flat() {
        let yearly = series(&[(2015, 12.0)]);
        assert!(matches!(
            trend_from_yearly(yearly, 3),
            Err(ClimateError::DegenerateTrend { distinct_years: 1 })
        ));
        assert!(matches!(trend_forecast(&[], 3), Err(ClimateError::EmptyData)));
    }

    #[test]
    fn direction_thresholds() {
        assert_eq!(TrendDirection::classify(0.02, 0.01), TrendDirection::Warming);
        assert_eq!(TrendDirection::classify(-0.02, 0.01), TrendDirection::Cooling);
        assert_eq!(TrendDirection::classify(0.01, 0.01), TrendDirection::Stable);
        assert_eq!(TrendDirection::classify(0.0, 0.01), TrendDirection::Stable);
    }
}

//! Long-term trend of yearly mean temperatures.

mod forecast;
mod linear;

pub use forecast::{
    trend_forecast, trend_from_yearly, yearly_means, TrendDirection, TrendForecast, YearlyMean,
    DEFAULT_TREND_TOLERANCE, MAX_FORECAST_HORIZON,
};
pub use linear::{fit_line, LinearFit};

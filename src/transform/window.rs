//! Trailing rolling window statistics.
//!
//! Every function here is causal: the value at position `i` is computed from
//! `series[i + 1 - w..=i]` where `w` is the window length, truncated at the
//! start of the series. A position yields a value once at least
//! `min_periods` observations are available; before that it is `NaN`.

/// Compute the trailing rolling mean.
///
/// # Arguments
/// * `series` - Input values in time order
/// * `window` - Maximum number of observations in the window
/// * `min_periods` - Minimum number of observations required for a value
pub fn rolling_mean(series: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_apply(series, window, min_periods, |s| {
        s.iter().sum::<f64>() / s.len() as f64
    })
}

/// Compute the trailing rolling sample variance (n-1 denominator).
///
/// Windows holding fewer than two observations have no sample variance and
/// produce `NaN` regardless of `min_periods`.
pub fn rolling_var(series: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_apply(series, window, min_periods, |s| {
        if s.len() < 2 {
            return f64::NAN;
        }
        let mean = s.iter().sum::<f64>() / s.len() as f64;
        s.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / (s.len() - 1) as f64
    })
}

/// Compute the trailing rolling sample standard deviation.
pub fn rolling_std(series: &[f64], window: usize, min_periods: usize) -> Vec<f64> {
    rolling_var(series, window, min_periods)
        .iter()
        .map(|v| v.sqrt())
        .collect()
}

/// Generic trailing window application.
fn rolling_apply<F>(series: &[f64], window: usize, min_periods: usize, f: F) -> Vec<f64>
where
    F: Fn(&[f64]) -> f64,
{
    if series.is_empty() || window == 0 {
        return vec![f64::NAN; series.len()];
    }

    let min_periods = min_periods.clamp(1, window);
    let mut result = vec![f64::NAN; series.len()];

    for (i, slot) in result.iter_mut().enumerate() {
        let start = (i + 1).saturating_sub(window);
        let segment = &series[start..=i];
        if segment.len() >= min_periods {
            *slot = f(segment);
        }
    }

    result
}

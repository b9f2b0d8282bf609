//! Descriptive statistics over temperature slices.
//!
//! These return `NaN` for undefined results, the same convention the window
//! transforms use. Callers that expose values in the data model convert
//! `NaN` into `None` through [`defined`].

/// Arithmetic mean of a slice, `NaN` when empty.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Sample variance (n-1 denominator), `NaN` for fewer than two values.
pub fn variance(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let m = mean(values);
    let sum_sq: f64 = values.iter().map(|x| (x - m).powi(2)).sum();
    sum_sq / (values.len() - 1) as f64
}

/// Sample standard deviation, `NaN` for fewer than two values.
pub fn std_dev(values: &[f64]) -> f64 {
    variance(values).sqrt()
}

/// Mean and sample standard deviation in one pass over the data model's
/// conventions: the mean is always defined for non-empty input, the
/// deviation only from two values on.
pub fn mean_std(values: &[f64]) -> (f64, Option<f64>) {
    (mean(values), defined(std_dev(values)))
}

/// Map a possibly-undefined statistic to an `Option`.
#[inline]
pub fn defined(value: f64) -> Option<f64> {
    if value.is_finite() {
        Some(value)
    } else {
        None
    }
}

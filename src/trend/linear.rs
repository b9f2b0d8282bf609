//! Ordinary least squares fit of a straight line.

use crate::error::{ClimateError, Result};
use serde::Serialize;

/// Result of a degree-1 least squares fit `y = slope * x + intercept`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LinearFit {
    /// Change in `y` per unit of `x`.
    pub slope: f64,
    /// Value of the line at `x = 0`.
    pub intercept: f64,
    /// Coefficient of determination.
    pub r_squared: f64,
}

impl LinearFit {
    /// Evaluate the fitted line.
    #[inline]
    pub fn predict(&self, x: f64) -> f64 {
        self.slope * x + self.intercept
    }
}

/// Fit a straight line to `(xs[i], ys[i])` by minimising squared residuals.
///
/// Sums are taken around the means of `x` and `y`, which keeps calendar
/// years (around 2000) from cancelling out in the normal equations.
///
/// Fails with [`ClimateError::DegenerateTrend`] when fewer than two distinct
/// `x` values are present, since the slope is then undefined.
pub fn fit_line(xs: &[f64], ys: &[f64]) -> Result<LinearFit> {
    if xs.len() != ys.len() {
        return Err(ClimateError::InvalidParameter(format!(
            "x and y lengths differ: {} vs {}",
            xs.len(),
            ys.len()
        )));
    }
    if xs.is_empty() {
        return Err(ClimateError::EmptyData);
    }

    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let ss_xx: f64 = xs.iter().map(|x| (x - mean_x).powi(2)).sum();
    let ss_xy: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (x - mean_x) * (y - mean_y))
        .sum();

    if ss_xx.abs() < 1e-10 {
        return Err(ClimateError::DegenerateTrend {
            distinct_years: distinct_count(xs),
        });
    }

    let slope = ss_xy / ss_xx;
    let intercept = mean_y - slope * mean_x;

    let ss_yy: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
    let ss_res: f64 = xs
        .iter()
        .zip(ys)
        .map(|(x, y)| (y - (slope * x + intercept)).powi(2))
        .sum();

    let r_squared = if ss_yy.abs() < 1e-10 {
        1.0 // Constant y is fitted exactly
    } else {
        1.0 - ss_res / ss_yy
    };

    Ok(LinearFit {
        slope,
        intercept,
        r_squared,
    })
}

fn distinct_count(xs: &[f64]) -> usize {
    let mut sorted = xs.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    sorted.dedup();
    sorted.len()
}

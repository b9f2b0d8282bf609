//! Seasonal temperature norms.

use crate::core::{Observation, Season, SeasonalStats};
use crate::utils::mean_std;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Compute one [`SeasonalStats`] row per season present in `readings`.
///
/// Statistics cover every reading of the season, not a window. Rows are
/// returned in calendar order (winter, spring, summer, autumn).
pub fn seasonal_stats<I>(city: &str, readings: I) -> Vec<SeasonalStats>
where
    I: IntoIterator<Item = (Season, f64)>,
{
    let mut by_season: BTreeMap<Season, Vec<f64>> = BTreeMap::new();
    for (season, temperature) in readings {
        by_season.entry(season).or_default().push(temperature);
    }

    by_season
        .into_iter()
        .map(|(season, temps)| {
            let (seasonal_mean, seasonal_std) = mean_std(&temps);
            SeasonalStats {
                city: city.to_string(),
                season,
                seasonal_mean,
                seasonal_std,
                count: temps.len(),
            }
        })
        .collect()
}

/// Closed interval `mean ± k * std` regarded as normal for a season.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct NormBand {
    pub mean: f64,
    pub std: f64,
    pub lower: f64,
    pub upper: f64,
}

impl NormBand {
    /// Build the band `mean ± k * std`.
    pub fn new(mean: f64, std: f64, k: f64) -> Self {
        Self {
            mean,
            std,
            lower: mean - k * std,
            upper: mean + k * std,
        }
    }

    /// Band for a season's statistics, `None` when the deviation is undefined.
    pub fn from_stats(stats: &SeasonalStats, k: f64) -> Option<Self> {
        stats.seasonal_std.map(|std| Self::new(stats.seasonal_mean, std, k))
    }

    /// Both bounds are inclusive.
    pub fn contains(&self, temperature: f64) -> bool {
        self.lower <= temperature && temperature <= self.upper
    }
}

/// Mean temperature for every city and season.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeasonalMatrix {
    /// Cities in ascending order.
    pub cities: Vec<String>,
    /// One row per city, columns in [`Season::ALL`] order.
    pub means: Vec<[Option<f64>; 4]>,
}

impl SeasonalMatrix {
    /// Mean for a city and season, if that combination has data.
    pub fn get(&self, city: &str, season: Season) -> Option<f64> {
        let row = self.cities.iter().position(|c| c == city)?;
        let col = Season::ALL.iter().position(|s| *s == season)?;
        self.means[row][col]
    }
}

/// Mean temperature per (city, season) over the whole table.
pub fn seasonal_matrix(observations: &[Observation]) -> SeasonalMatrix {
    let mut sums: BTreeMap<&str, [(f64, usize); 4]> = BTreeMap::new();
    for obs in observations {
        let cells = sums.entry(obs.city.as_str()).or_insert([(0.0, 0); 4]);
        let col = obs.season as usize;
        cells[col].0 += obs.temperature;
        cells[col].1 += 1;
    }

    let mut cities = Vec::with_capacity(sums.len());
    let mut means = Vec::with_capacity(sums.len());
    for (city, cells) in sums {
        cities.push(city.to_string());
        means.push(cells.map(|(sum, n)| if n == 0 { None } else { Some(sum / n as f64) }));
    }

    SeasonalMatrix { cities, means }
}

//! Seasonal norms: per-season statistics, the normal band around them and
//! the city-by-season mean matrix.

mod norms;

pub use norms::{seasonal_matrix, seasonal_stats, NormBand, SeasonalMatrix};

//! Core data structures for per-city temperature analysis.

mod observation;
mod season;

pub use observation::{AnnotatedObservation, Observation, SeasonalStats, YearlyTrendPoint};
pub use season::{ParseSeasonError, Season};

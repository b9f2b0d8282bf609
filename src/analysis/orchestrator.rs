//! Multi-city analysis.
//!
//! The table is partitioned by exact city name and every partition is
//! analysed on its own. Partitions share nothing, so the parallel strategy
//! is a plain rayon map with a join at the end and yields the same rows as
//! the sequential one.

use super::city::{analyze_city, CityAnalysis};
use crate::core::{AnnotatedObservation, Observation, SeasonalStats};
use crate::detection::RollingConfig;
use crate::error::{ClimateError, Result};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tracing::{debug, info, warn};

/// How partitions are scheduled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", tag = "mode")]
pub enum ExecutionStrategy {
    /// One partition after another on the calling thread.
    Sequential,
    /// One task per partition on a rayon pool. `threads: None` uses the
    /// global pool.
    Parallel {
        #[serde(default)]
        threads: Option<usize>,
    },
}

impl Default for ExecutionStrategy {
    fn default() -> Self {
        ExecutionStrategy::Parallel { threads: None }
    }
}

impl ExecutionStrategy {
    pub fn parallel() -> Self {
        ExecutionStrategy::Parallel { threads: None }
    }

    pub fn with_threads(threads: usize) -> Self {
        ExecutionStrategy::Parallel {
            threads: Some(threads),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ExecutionStrategy::Sequential => "sequential",
            ExecutionStrategy::Parallel { .. } => "parallel",
        }
    }
}

/// Observations of one city, borrowed from the source table.
#[derive(Debug, Clone)]
pub struct CityGroup<'a> {
    pub city: &'a str,
    pub observations: Vec<&'a Observation>,
}

/// A city whose analysis failed.
#[derive(Debug)]
pub struct CityFailure {
    pub city: String,
    pub error: ClimateError,
}

/// Outcome of a multi-city run.
///
/// Successful analyses and failures are kept side by side; a failing city
/// never removes the results of the others.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Successful analyses in order of the city's first appearance.
    pub analyses: Vec<CityAnalysis>,
    pub failures: Vec<CityFailure>,
}

impl BatchReport {
    /// Every annotated row, city blocks concatenated.
    pub fn rows(&self) -> impl Iterator<Item = &AnnotatedObservation> {
        self.analyses.iter().flat_map(|a| a.rows.iter())
    }

    /// Every seasonal statistics row, city blocks concatenated.
    pub fn seasonal_stats(&self) -> impl Iterator<Item = &SeasonalStats> {
        self.analyses.iter().flat_map(|a| a.seasonal.iter())
    }

    pub fn city(&self, name: &str) -> Option<&CityAnalysis> {
        self.analyses.iter().find(|a| a.city == name)
    }

    pub fn total_rows(&self) -> usize {
        self.analyses.iter().map(|a| a.rows.len()).sum()
    }

    pub fn total_anomalies(&self) -> usize {
        self.analyses.iter().map(|a| a.anomaly_count()).sum()
    }

    /// True when no city failed.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty()
    }

    /// Names of the failed cities.
    pub fn failed_cities(&self) -> Vec<&str> {
        self.failures.iter().map(|f| f.city.as_str()).collect()
    }

    /// Consume the report into flat row and seasonal tables.
    pub fn into_tables(self) -> (Vec<AnnotatedObservation>, Vec<SeasonalStats>) {
        let mut rows = Vec::with_capacity(self.total_rows());
        let mut seasonal = Vec::new();
        for analysis in self.analyses {
            rows.extend(analysis.rows);
            seasonal.extend(analysis.seasonal);
        }
        (rows, seasonal)
    }
}

/// Split the table into disjoint per-city groups.
///
/// Groups appear in order of each city's first row; every observation lands
/// in exactly one group.
pub fn partition_by_city(observations: &[Observation]) -> Vec<CityGroup<'_>> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut groups: Vec<CityGroup<'_>> = Vec::new();

    for obs in observations {
        let slot = *index.entry(obs.city.as_str()).or_insert_with(|| {
            groups.push(CityGroup {
                city: obs.city.as_str(),
                observations: Vec::new(),
            });
            groups.len() - 1
        });
        groups[slot].observations.push(obs);
    }

    groups
}

/// Analyse every city in the table.
///
/// Returns an error only when the strategy itself is unusable (for example
/// a parallel pool of zero threads); per-city failures are reported in the
/// [`BatchReport`].
pub fn run_analysis(
    observations: &[Observation],
    config: &RollingConfig,
    strategy: ExecutionStrategy,
) -> Result<BatchReport> {
    let groups = partition_by_city(observations);
    info!(
        rows = observations.len(),
        cities = groups.len(),
        strategy = strategy.name(),
        "running analysis"
    );

    let outcomes: Vec<(String, Result<CityAnalysis>)> = match strategy {
        ExecutionStrategy::Sequential => groups.iter().map(|g| analyze_group(g, config)).collect(),
        ExecutionStrategy::Parallel { threads: None } => {
            groups.par_iter().map(|g| analyze_group(g, config)).collect()
        }
        ExecutionStrategy::Parallel {
            threads: Some(threads),
        } => {
            if threads == 0 {
                return Err(ClimateError::InvalidParameter(
                    "parallel strategy needs at least one thread".to_string(),
                ));
            }
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|e| ClimateError::InvalidParameter(format!("thread pool: {}", e)))?;
            pool.install(|| groups.par_iter().map(|g| analyze_group(g, config)).collect())
        }
    };

    let mut report = BatchReport::default();
    for (city, outcome) in outcomes {
        match outcome {
            Ok(analysis) => report.analyses.push(analysis),
            Err(error) => {
                warn!(city = %city, error = %error, "city analysis failed");
                report.failures.push(CityFailure { city, error });
            }
        }
    }

    info!(
        analysed = report.analyses.len(),
        failed = report.failures.len(),
        anomalies = report.total_anomalies(),
        "analysis finished"
    );
    Ok(report)
}

fn analyze_group(group: &CityGroup<'_>, config: &RollingConfig) -> (String, Result<CityAnalysis>) {
    let outcome = analyze_city(group.city, group.observations.iter().copied(), config);
    if let Ok(analysis) = &outcome {
        debug!(
            city = group.city,
            rows = analysis.rows.len(),
            anomalies = analysis.anomaly_count(),
            "city analysed"
        );
    }
    (group.city.to_string(), outcome)
}

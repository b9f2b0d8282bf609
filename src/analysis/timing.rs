//! Wall-clock comparison of the execution strategies.

use super::orchestrator::{run_analysis, BatchReport, ExecutionStrategy};
use crate::core::Observation;
use crate::detection::RollingConfig;
use crate::error::Result;
use serde::Serialize;
use std::time::{Duration, Instant};

/// Timings of one sequential and one parallel run over the same table.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct StrategyTiming {
    pub sequential: Duration,
    pub parallel: Duration,
    pub cities: usize,
    pub rows: usize,
}

impl StrategyTiming {
    /// `sequential / parallel`; above 1 means the pool helped.
    pub fn speedup(&self) -> f64 {
        ratio(self.sequential, self.parallel)
    }

    /// `parallel / sequential`; above 1 means the pool hurt.
    pub fn slowdown(&self) -> f64 {
        ratio(self.parallel, self.sequential)
    }
}

fn ratio(num: Duration, den: Duration) -> f64 {
    let den = den.as_secs_f64();
    if den == 0.0 {
        return f64::NAN;
    }
    num.as_secs_f64() / den
}

/// Run the analysis sequentially, then in parallel, and time both.
///
/// The parallel report is returned alongside the timing so callers can use
/// the results without a third run.
pub fn compare_strategies(
    observations: &[Observation],
    config: &RollingConfig,
    threads: Option<usize>,
) -> Result<(StrategyTiming, BatchReport)> {
    let start = Instant::now();
    let sequential_report = run_analysis(observations, config, ExecutionStrategy::Sequential)?;
    let sequential = start.elapsed();

    let start = Instant::now();
    let report = run_analysis(observations, config, ExecutionStrategy::Parallel { threads })?;
    let parallel = start.elapsed();

    let timing = StrategyTiming {
        sequential,
        parallel,
        cities: sequential_report.analyses.len() + sequential_report.failures.len(),
        rows: sequential_report.total_rows(),
    };
    Ok((timing, report))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Season;
    use chrono::{Duration as ChronoDuration, TimeZone, Utc};

    #[test]
    fn ratios_are_reciprocal() {
        let timing = StrategyTiming {
            sequential: Duration::from_millis(300),
            parallel: Duration::from_millis(100),
            cities: 3,
            rows: 30,
        };
        assert!((timing.speedup() - 3.0).abs() < 1e-9);
        assert!((timing.slowdown() - 1.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn zero_duration_ratio_is_undefined() {
        let timing = StrategyTiming {
            sequential: Duration::from_millis(5),
            parallel: Duration::ZERO,
            cities: 1,
            rows: 1,
        };
        assert!(timing.speedup().is_nan());
    }

    #[test]
    fn compare_counts_rows_and_cities() {
        let base = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        let observations: Vec<Observation> = (0..20)
            .map(|i| {
                let city = if i % 2 == 0 { "Seoul" } else { "Busan" };
                Observation::new(city, base + ChronoDuration::days(i), i as f64, Season::Winter)
            })
            .collect();

        let (timing, report) =
            compare_strategies(&observations, &RollingConfig::default(), Some(2)).unwrap();

        assert_eq!(timing.cities, 2);
        assert_eq!(timing.rows, 20);
        assert_eq!(report.total_rows(), 20);
    }
}

//! Per-city analysis and its multi-city orchestration.
//!
//! This module provides:
//! - The per-city analyzer (rolling anomalies plus seasonal norms)
//! - Partitioning of a full table by city
//! - Sequential and parallel execution with per-city failure isolation
//! - Timing of both execution strategies

mod city;
mod orchestrator;
mod timing;

pub use city::{analyze_city, CityAnalysis};
pub use orchestrator::{
    partition_by_city, run_analysis, BatchReport, CityFailure, CityGroup, ExecutionStrategy,
};
pub use timing::{compare_strategies, StrategyTiming};

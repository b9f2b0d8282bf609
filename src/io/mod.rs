//! Reading observation tables and writing analysis results.

mod loader;
mod writer;

pub use loader::{load_observations, parse_timestamp, read_observations, LoadOptions, SeasonPolicy};
pub use writer::{
    write_csv, write_csv_file, write_json, write_report, CitySummary, FailureSummary, ReportFiles,
    RunSummary,
};

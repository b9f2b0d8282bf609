//! Export of analysis results as CSV tables and JSON summaries.

use crate::analysis::BatchReport;
use crate::error::{ClimateError, Result};
use serde::Serialize;
use std::fs::{self, File};
use std::io::Write;
use std::path::{Path, PathBuf};

/// Write any serialisable records as CSV with a header row.
///
/// Undefined optional values become empty fields.
pub fn write_csv<W, T>(sink: W, records: impl IntoIterator<Item = T>) -> Result<()>
where
    W: Write,
    T: Serialize,
{
    let mut writer = csv::Writer::from_writer(sink);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;
    Ok(())
}

/// Write records to a CSV file, creating parent directories as needed.
pub fn write_csv_file<T: Serialize>(
    path: &Path,
    records: impl IntoIterator<Item = T>,
) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    write_csv(File::create(path)?, records)
}

/// Pretty-printed JSON for summaries.
pub fn write_json<W: Write, T: Serialize>(sink: W, value: &T) -> Result<()> {
    serde_json::to_writer_pretty(sink, value)
        .map_err(|e| ClimateError::Io(std::io::Error::other(e)))
}

/// One failed city in a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureSummary {
    pub city: String,
    pub error: String,
}

/// Per-city counts in a [`RunSummary`].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CitySummary {
    pub city: String,
    pub rows: usize,
    pub anomalies: usize,
}

/// Compact description of a multi-city run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSummary {
    pub rows: usize,
    pub anomalies: usize,
    pub cities: Vec<CitySummary>,
    pub failures: Vec<FailureSummary>,
}

impl RunSummary {
    pub fn from_report(report: &BatchReport) -> Self {
        Self {
            rows: report.total_rows(),
            anomalies: report.total_anomalies(),
            cities: report
                .analyses
                .iter()
                .map(|a| CitySummary {
                    city: a.city.clone(),
                    rows: a.rows.len(),
                    anomalies: a.anomaly_count(),
                })
                .collect(),
            failures: report
                .failures
                .iter()
                .map(|f| FailureSummary {
                    city: f.city.clone(),
                    error: f.error.to_string(),
                })
                .collect(),
        }
    }
}

/// Paths written by [`write_report`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportFiles {
    pub annotated: PathBuf,
    pub seasonal: PathBuf,
    pub summary: PathBuf,
}

/// Write `annotated.csv`, `seasonal_stats.csv` and `summary.json` into `dir`.
pub fn write_report(dir: &Path, report: &BatchReport) -> Result<ReportFiles> {
    fs::create_dir_all(dir)?;
    let files = ReportFiles {
        annotated: dir.join("annotated.csv"),
        seasonal: dir.join("seasonal_stats.csv"),
        summary: dir.join("summary.json"),
    };

    write_csv_file(&files.annotated, report.rows())?;
    write_csv_file(&files.seasonal, report.seasonal_stats())?;
    write_json(File::create(&files.summary)?, &RunSummary::from_report(report))?;

    Ok(files)
}

//! File-level tests: CSV in, analysis, report files out.

use climate_anomaly::analysis::{run_analysis, ExecutionStrategy};
use climate_anomaly::core::{AnnotatedObservation, Season, SeasonalStats};
use climate_anomaly::detection::RollingConfig;
use climate_anomaly::error::ClimateError;
use climate_anomaly::io::{load_observations, write_report, LoadOptions};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

fn csv_file(content: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    file.write_all(content.as_bytes()).unwrap();
    file.flush().unwrap();
    file
}

fn read_back<T: serde::de::DeserializeOwned>(path: &Path) -> Vec<T> {
    csv::Reader::from_path(path)
        .unwrap()
        .deserialize()
        .collect::<Result<Vec<T>, _>>()
        .unwrap()
}

const TABLE: &str = "\
city,timestamp,temperature,season
Oslo,2015-01-01,-4.0,winter
Oslo,2015-01-02,-6.0,winter
Oslo,2015-01-03,-5.0,winter
Lima,2015-01-01,24.0,summer
Oslo,2015-04-01,3.5,spring
Lima,2015-07-01,16.0,winter
";

#[test]
fn report_files_reproduce_analysis() {
    let input = csv_file(TABLE);
    let observations = load_observations(input.path(), &LoadOptions::default()).unwrap();
    assert_eq!(observations.len(), 6);

    let report = run_analysis(&observations, &RollingConfig::default(), ExecutionStrategy::parallel())
        .unwrap();
    let out = tempdir().unwrap();
    let files = write_report(&out.path().join("report"), &report).unwrap();

    let annotated: Vec<AnnotatedObservation> = read_back(&files.annotated);
    let seasonal: Vec<SeasonalStats> = read_back(&files.seasonal);
    let (rows, stats) = report.into_tables();
    assert_eq!(annotated, rows);
    assert_eq!(seasonal, stats);

    // First Oslo row has a one-point window.
    assert_eq!(annotated[0].city, "Oslo");
    assert_eq!(annotated[0].rolling_std, None);

    let lima_summer = seasonal
        .iter()
        .find(|s| s.city == "Lima" && s.season == Season::Summer)
        .unwrap();
    assert_eq!(lima_summer.count, 1);
    assert_eq!(lima_summer.seasonal_std, None);

    let summary: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(&files.summary).unwrap()).unwrap();
    assert_eq!(summary["rows"], 6);
    assert_eq!(summary["cities"].as_array().unwrap().len(), 2);
}

#[test]
fn derived_seasons_from_month() {
    let input = csv_file(
        "city,timestamp,temperature\n\
         Rome,2020-01-10T12:00:00,8.0\n\
         Rome,2020-04-10 12:00:00,15.0\n\
         Rome,2020-07-10,28.0\n\
         Rome,2020-10-10T12:00:00+02:00,18.0\n",
    );
    let observations = load_observations(input.path(), &LoadOptions::derive_seasons()).unwrap();

    let seasons: Vec<Season> = observations.iter().map(|o| o.season).collect();
    assert_eq!(
        seasons,
        vec![Season::Winter, Season::Spring, Season::Summer, Season::Autumn]
    );
}

#[test]
fn malformed_row_aborts_load() {
    let input = csv_file(
        "city,timestamp,temperature,season\n\
         Rome,2020-01-10,8.0,winter\n\
         Rome,not-a-date,9.0,winter\n",
    );
    let err = load_observations(input.path(), &LoadOptions::default()).unwrap_err();
    assert!(matches!(err, ClimateError::InvalidData { line: 3, .. }));
}

#[test]
fn missing_file_is_io_error() {
    let dir = tempdir().unwrap();
    let err = load_observations(&dir.path().join("absent.csv"), &LoadOptions::default())
        .unwrap_err();
    assert!(matches!(err, ClimateError::Io(_)));
}

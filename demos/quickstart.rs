//! Quick start: synthetic data for two cities, rolling anomalies, seasonal
//! norms, a trend forecast and a classified "live" reading.
//!
//! Run with:
//! ```bash
//! cargo run --example quickstart
//! ```

use chrono::{Datelike, Duration, TimeZone, Utc};
use climate_anomaly::prelude::*;
use climate_anomaly::seasonality::seasonal_matrix;
use climate_anomaly::weather::{classify_reading, CurrentReading, DEFAULT_NORM_SIGMA};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn synthetic(city: &str, base_temp: f64, warming: f64, rng: &mut StdRng) -> Vec<Observation> {
    let start = Utc.with_ymd_and_hms(2010, 1, 1, 0, 0, 0).unwrap();
    (0..365 * 10)
        .map(|d| {
            let timestamp = start + Duration::days(d);
            let years = d as f64 / 365.25;
            let cycle = -12.0 * (2.0 * std::f64::consts::PI * years).cos();
            let mut temperature = base_temp + cycle + warming * years + rng.gen_range(-2.5..2.5);
            if rng.gen_bool(0.002) {
                temperature += 15.0;
            }
            let season = Season::from_month(timestamp.month()).unwrap_or(Season::Winter);
            Observation::new(city, timestamp, temperature, season)
        })
        .collect()
}

fn main() -> Result<()> {
    let mut rng = StdRng::seed_from_u64(2024);
    let mut table = synthetic("Berlin", 10.0, 0.04, &mut rng);
    table.extend(synthetic("Madrid", 15.0, 0.02, &mut rng));

    let report = run_analysis(&table, &RollingConfig::default(), ExecutionStrategy::parallel())?;
    println!("rows: {}, anomalies: {}", report.total_rows(), report.total_anomalies());

    for analysis in &report.analyses {
        println!("\n== {} ==", analysis.city);
        for stats in &analysis.seasonal {
            println!(
                "  {:<7} mean {:>6.2}  std {:>5.2}",
                stats.season,
                stats.seasonal_mean,
                stats.seasonal_std.unwrap_or(f64::NAN)
            );
        }

        let forecast = trend_forecast(&analysis.rows, 5)?;
        println!("  trend {:+.3} °C/year", forecast.slope());
        for point in forecast.future() {
            println!("  {} -> {:.2}", point.year, point.trend);
        }

        let reading = CurrentReading {
            city: analysis.city.clone(),
            temperature: 31.0,
            season: Season::Summer,
            observed_at: Utc::now(),
        };
        let comparison = classify_reading(&reading, &analysis.seasonal, DEFAULT_NORM_SIGMA)?;
        println!(
            "  31.0 °C in summer: {:?} (band {:.1}..{:.1})",
            comparison.classification, comparison.band.lower, comparison.band.upper
        );
    }

    let matrix = seasonal_matrix(&table);
    println!("\nseasonal means: {:?}", matrix.means);
    Ok(())
}

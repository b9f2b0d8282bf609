//! Command-line entry point for climate-anomaly.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use climate_anomaly::analysis::{analyze_city, compare_strategies, run_analysis, ExecutionStrategy};
use climate_anomaly::config::{load_with_precedence, AppConfig};
use climate_anomaly::core::{Observation, Season};
use climate_anomaly::io::{load_observations, write_csv_file, write_report, SeasonPolicy};
use climate_anomaly::seasonality::seasonal_matrix;
use climate_anomaly::trend::trend_forecast;
use climate_anomaly::weather::{live_comparison, measure_latency, LiveComparison, OpenWeatherClient};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "climate")]
#[command(about = "Historical temperature anomalies, seasonal norms and trends per city")]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, global = true, env = "CLIMATE_CONFIG")]
    config: Option<PathBuf>,

    /// Derive missing season labels from the timestamp month
    #[arg(long, global = true)]
    derive_seasons: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Strategy {
    Sequential,
    Parallel,
}

#[derive(Subcommand)]
enum Commands {
    /// Annotate every row and write the report files
    Analyze {
        /// Input CSV (city,timestamp,temperature,season)
        input: PathBuf,

        #[arg(short, long, value_enum)]
        strategy: Option<Strategy>,

        /// Worker threads for the parallel strategy
        #[arg(short, long)]
        threads: Option<usize>,

        /// Output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Rolling window length
        #[arg(short, long)]
        window: Option<usize>,

        /// Anomaly band width in standard deviations
        #[arg(long)]
        sigma: Option<f64>,
    },

    /// Fit the yearly trend of one city and extrapolate it
    Trend {
        input: PathBuf,

        #[arg(long)]
        city: String,

        /// Years to forecast
        #[arg(short, long)]
        years: Option<usize>,

        /// Write trend points to this CSV file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Compare the current temperature of a city with its seasonal norm
    Current {
        input: PathBuf,

        #[arg(long)]
        city: String,

        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Time the sequential and parallel strategies on the same table
    Bench {
        input: PathBuf,

        #[arg(short, long)]
        threads: Option<usize>,
    },

    /// Time one blocking and one async weather request
    Latency {
        #[arg(long)]
        city: String,

        #[arg(long, env = "OPENWEATHER_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Print the mean temperature of every city and season
    Seasons { input: PathBuf },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let mut config = load_with_precedence(cli.config.as_deref())
        .context("failed to load configuration")?;
    if cli.derive_seasons {
        config.analysis.season_policy = SeasonPolicy::DeriveFromMonth;
    }

    match cli.command {
        Commands::Analyze {
            input,
            strategy,
            threads,
            output,
            window,
            sigma,
        } => {
            if let Some(window) = window {
                config.analysis.window = window;
            }
            if let Some(sigma) = sigma {
                config.analysis.sigma = sigma;
            }
            config.analysis.strategy = match (strategy, threads) {
                (Some(Strategy::Sequential), _) => ExecutionStrategy::Sequential,
                (Some(Strategy::Parallel), threads) => ExecutionStrategy::Parallel { threads },
                (None, Some(n)) => ExecutionStrategy::with_threads(n),
                (None, None) => config.analysis.strategy,
            };
            if let Some(output) = output {
                config.output.dir = output;
            }
            config.validate()?;
            analyze(&config, &input)
        }
        Commands::Trend {
            input,
            city,
            years,
            output,
        } => {
            if let Some(years) = years {
                config.analysis.forecast_years = years;
            }
            config.validate()?;
            trend(&config, &input, &city, output.as_deref())
        }
        Commands::Current {
            input,
            city,
            api_key,
        } => {
            if api_key.is_some() {
                config.weather.api_key = api_key;
            }
            current(&config, &input, &city)
        }
        Commands::Bench { input, threads } => bench(&config, &input, threads),
        Commands::Latency { city, api_key } => {
            if api_key.is_some() {
                config.weather.api_key = api_key;
            }
            let weather = config
                .weather_config()
                .context("no API key: pass --api-key or set OPENWEATHER_API_KEY")?;
            let report = measure_latency(&weather, &city)?;
            for (label, timing) in [("blocking", &report.blocking), ("async", &report.asynchronous)] {
                match &timing.outcome {
                    Ok(t) => println!("{:<9} {:>8.1} ms  {:.1} °C", label, ms(timing.elapsed), t),
                    Err(e) => println!("{:<9} {:>8.1} ms  error: {}", label, ms(timing.elapsed), e),
                }
            }
            Ok(())
        }
        Commands::Seasons { input } => {
            let observations = load(&config, &input)?;
            print_matrix(&observations);
            Ok(())
        }
    }
}

fn load(config: &AppConfig, input: &Path) -> Result<Vec<Observation>> {
    let observations = load_observations(input, &config.load_options())
        .with_context(|| format!("failed to load {}", input.display()))?;
    info!(rows = observations.len(), path = %input.display(), "observations loaded");
    Ok(observations)
}

fn analyze(config: &AppConfig, input: &Path) -> Result<()> {
    let observations = load(config, input)?;
    let report = run_analysis(&observations, &config.rolling_config(), config.analysis.strategy)?;
    let files = write_report(&config.output.dir, &report)
        .with_context(|| format!("failed to write report to {}", config.output.dir.display()))?;

    println!("{:<20} {:>8} {:>10}", "city", "rows", "anomalies");
    for analysis in &report.analyses {
        println!(
            "{:<20} {:>8} {:>10}",
            analysis.city,
            analysis.rows.len(),
            analysis.anomaly_count()
        );
    }
    for failure in &report.failures {
        println!("{:<20} failed: {}", failure.city, failure.error);
    }
    println!(
        "\n{} rows, {} anomalies -> {}",
        report.total_rows(),
        report.total_anomalies(),
        files.annotated.display()
    );
    Ok(())
}

fn trend(config: &AppConfig, input: &Path, city: &str, output: Option<&Path>) -> Result<()> {
    let observations = load(config, input)?;
    let analysis = analyze_city(
        city,
        observations.iter().filter(|o| o.city == city),
        &config.rolling_config(),
    )?;
    if analysis.is_empty() {
        bail!("no observations for city '{}'", city);
    }

    let forecast = trend_forecast(&analysis.rows, config.analysis.forecast_years)?;
    println!(
        "{}: {:+.4} °C/year ({:?})",
        city,
        forecast.slope(),
        forecast.direction(config.analysis.trend_tolerance)
    );
    for point in &forecast.points {
        let observed = point
            .temperature
            .map_or_else(|| "-".to_string(), |t| format!("{:.2}", t));
        let marker = if point.is_future { "forecast" } else { "" };
        println!("{:>6} {:>8} {:>8.2} {}", point.year, observed, point.trend, marker);
    }

    if let Some(path) = output {
        write_csv_file(path, &forecast.points)?;
        info!(path = %path.display(), "trend points written");
    }
    Ok(())
}

fn current(config: &AppConfig, input: &Path, city: &str) -> Result<()> {
    let weather = config
        .weather_config()
        .context("no API key: pass --api-key or set OPENWEATHER_API_KEY")?;
    let observations = load(config, input)?;
    let analysis = analyze_city(
        city,
        observations.iter().filter(|o| o.city == city),
        &config.rolling_config(),
    )?;
    let client = OpenWeatherClient::new(weather)?;

    match live_comparison(&client, city, &analysis.seasonal, config.analysis.norm_sigma) {
        LiveComparison::Available(c) => {
            println!(
                "{} now {:.1} °C ({}), norm [{:.1}, {:.1}]: {}",
                city,
                c.reading.temperature,
                c.reading.season,
                c.band.lower,
                c.band.upper,
                if c.is_anomalous() { "ANOMALOUS" } else { "within norm" }
            );
        }
        LiveComparison::NoNorm(reading, error) => {
            println!(
                "{} now {:.1} °C ({}); no norm to compare: {}",
                city, reading.temperature, reading.season, error
            );
        }
        LiveComparison::ServiceUnavailable(error) => {
            println!("live comparison unavailable: {}", error);
        }
    }
    Ok(())
}

fn bench(config: &AppConfig, input: &Path, threads: Option<usize>) -> Result<()> {
    let observations = load(config, input)?;
    let (timing, _) = compare_strategies(&observations, &config.rolling_config(), threads)?;
    println!("cities:     {}", timing.cities);
    println!("rows:       {}", timing.rows);
    println!("sequential: {:.1} ms", ms(timing.sequential));
    println!("parallel:   {:.1} ms", ms(timing.parallel));
    println!("speedup:    {:.2}x", timing.speedup());
    Ok(())
}

fn print_matrix(observations: &[Observation]) {
    let matrix = seasonal_matrix(observations);
    print!("{:<20}", "city");
    for season in Season::ALL {
        print!(" {:>8}", season.as_str());
    }
    println!();
    for (city, row) in matrix.cities.iter().zip(&matrix.means) {
        print!("{:<20}", city);
        for cell in row {
            match cell {
                Some(mean) => print!(" {:>8.2}", mean),
                None => print!(" {:>8}", "-"),
            }
        }
        println!();
    }
}

fn ms(d: std::time::Duration) -> f64 {
    d.as_secs_f64() * 1000.0
}

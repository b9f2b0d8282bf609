//! Configuration loading with precedence: defaults, file, environment.

use super::AppConfig;
use crate::analysis::ExecutionStrategy;
use crate::error::{ClimateError, Result};
use crate::io::SeasonPolicy;
use std::env;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::debug;

/// Prefix of the environment variables read by [`load_from_env`].
pub const ENV_PREFIX: &str = "CLIMATE_";

/// Parse a TOML document. Missing keys take their defaults.
pub fn load_from_toml(toml: &str) -> Result<AppConfig> {
    toml::from_str(toml).map_err(|e| ClimateError::Config(format!("invalid TOML: {}", e)))
}

/// Read and parse a TOML file.
pub fn load_from_file(path: &Path) -> Result<AppConfig> {
    let content = fs::read_to_string(path).map_err(|e| {
        ClimateError::Config(format!("cannot read {}: {}", path.display(), e))
    })?;
    load_from_toml(&content)
}

/// Write `config` as TOML.
pub fn save_to_file(config: &AppConfig, path: &Path) -> Result<()> {
    let content = toml::to_string_pretty(config)
        .map_err(|e| ClimateError::Config(format!("cannot serialize config: {}", e)))?;
    fs::write(path, content)?;
    Ok(())
}

/// Defaults overridden by the process environment.
pub fn load_from_env() -> Result<AppConfig> {
    let mut config = AppConfig::default();
    apply_env(&mut config, |key| env::var(key).ok())?;
    Ok(config)
}

/// Defaults, then `config_file` if given, then the environment. The result
/// is validated.
pub fn load_with_precedence<P: AsRef<Path>>(config_file: Option<P>) -> Result<AppConfig> {
    let mut config = match config_file {
        Some(path) => {
            debug!(path = %path.as_ref().display(), "loading config file");
            load_from_file(path.as_ref())?
        }
        None => AppConfig::default(),
    };
    apply_env(&mut config, |key| env::var(key).ok())?;
    config.validate()?;
    Ok(config)
}

/// Override fields of `config` from variables visible through `lookup`.
///
/// Reads `CLIMATE_WINDOW`, `CLIMATE_SIGMA`, `CLIMATE_FORECAST_YEARS`,
/// `CLIMATE_TREND_TOLERANCE`, `CLIMATE_NORM_SIGMA`,
/// `CLIMATE_STRATEGY` (`sequential` or `parallel`), `CLIMATE_THREADS`,
/// `CLIMATE_DERIVE_SEASONS`, `CLIMATE_WEATHER_URL`,
/// `CLIMATE_WEATHER_TIMEOUT`, `CLIMATE_OUTPUT_DIR` and
/// `OPENWEATHER_API_KEY`.
pub fn apply_env<F>(config: &mut AppConfig, lookup: F) -> Result<()>
where
    F: Fn(&str) -> Option<String>,
{
    let var = |name: &str| lookup(&format!("{}{}", ENV_PREFIX, name));
    let a = &mut config.analysis;

    if let Some(v) = var("WINDOW") {
        a.window = parse_var("WINDOW", &v)?;
    }
    if let Some(v) = var("SIGMA") {
        a.sigma = parse_var("SIGMA", &v)?;
    }
    if let Some(v) = var("FORECAST_YEARS") {
        a.forecast_years = parse_var("FORECAST_YEARS", &v)?;
    }
    if let Some(v) = var("TREND_TOLERANCE") {
        a.trend_tolerance = parse_var("TREND_TOLERANCE", &v)?;
    }
    if let Some(v) = var("NORM_SIGMA") {
        a.norm_sigma = parse_var("NORM_SIGMA", &v)?;
    }

    let threads = match var("THREADS") {
        Some(v) => Some(parse_var::<usize>("THREADS", &v)?),
        None => None,
    };
    match var("STRATEGY").as_deref().map(str::to_ascii_lowercase).as_deref() {
        Some("sequential") => a.strategy = ExecutionStrategy::Sequential,
        Some("parallel") => a.strategy = ExecutionStrategy::Parallel { threads },
        Some(other) => {
            return Err(ClimateError::Config(format!(
                "invalid {}STRATEGY: '{}'",
                ENV_PREFIX, other
            )))
        }
        None => {
            if let (Some(n), ExecutionStrategy::Parallel { .. }) = (threads, a.strategy) {
                a.strategy = ExecutionStrategy::with_threads(n);
            }
        }
    }

    if let Some(v) = var("DERIVE_SEASONS") {
        let derive: bool = parse_var("DERIVE_SEASONS", &v)?;
        a.season_policy = if derive {
            SeasonPolicy::DeriveFromMonth
        } else {
            SeasonPolicy::Require
        };
    }

    if let Some(v) = var("WEATHER_URL") {
        config.weather.base_url = v;
    }
    if let Some(v) = var("WEATHER_TIMEOUT") {
        config.weather.timeout_secs = parse_var("WEATHER_TIMEOUT", &v)?;
    }
    if let Some(key) = lookup("OPENWEATHER_API_KEY") {
        config.weather.api_key = Some(key);
    }
    if let Some(v) = var("OUTPUT_DIR") {
        config.output.dir = v.into();
    }

    Ok(())
}

fn parse_var<T>(name: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e| ClimateError::Config(format!("invalid {}{}: {}", ENV_PREFIX, name, e)))
}

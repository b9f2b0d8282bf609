//! Anomaly detection over ordered temperature series.

mod rolling;

pub use rolling::{
    detect_rolling_anomalies, exceeds_band, RollingAnomalyResult, RollingConfig, DEFAULT_SIGMA,
    DEFAULT_WINDOW,
};

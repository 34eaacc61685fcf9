use std::env;

use thiserror::Error;

/// Public SpaceX launch table used when `LAUNCH_DASH_SOURCE` is unset.
pub const DEFAULT_SOURCE: &str = "https://cf-courses-data.s3.us.cloud-object-storage.appdomain.cloud/IBM-DS0321EN-SkillsNetwork/datasets/spacex_launch_dash.csv";

pub const ENV_SOURCE: &str = "LAUNCH_DASH_SOURCE";
pub const ENV_TITLE: &str = "LAUNCH_DASH_TITLE";
pub const ENV_PAYLOAD_MAX: &str = "LAUNCH_DASH_PAYLOAD_MAX";
pub const ENV_PAYLOAD_STEP: &str = "LAUNCH_DASH_PAYLOAD_STEP";
pub const ENV_MARK_INTERVAL: &str = "LAUNCH_DASH_MARK_INTERVAL";

/// Most slider steps between zero and the ceiling.
pub const MAX_SLIDER_STEPS: f64 = 100_000.0;
/// Most labelled ticks under the slider.
pub const MAX_SLIDER_MARKS: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("{key}={value:?} is not a number")]
    InvalidNumber { key: &'static str, value: String },
    #[error("{key} must be a finite positive number, got {value}")]
    NonPositive { key: &'static str, value: f64 },
    #[error("{key} ({value}) is larger than the payload ceiling ({ceiling})")]
    ExceedsCeiling {
        key: &'static str,
        value: f64,
        ceiling: f64,
    },
    #[error("{key} ({value}) splits the payload ceiling ({ceiling}) into more than {limit} parts")]
    TooFine {
        key: &'static str,
        value: f64,
        ceiling: f64,
        limit: f64,
    },
}

/// Dashboard settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct DashConfig {
    /// URI or path of the launch table.
    pub source: String,
    pub title: String,
    /// Upper bound of the payload slider (kg).
    pub payload_ceiling: f64,
    /// Slider step (kg).
    pub payload_step: f64,
    /// Distance between labelled slider ticks (kg).
    pub mark_interval: f64,
}

impl Default for DashConfig {
    fn default() -> Self {
        Self {
            source: DEFAULT_SOURCE.to_string(),
            title: "SpaceX Launch Dashboard".to_string(),
            payload_ceiling: 10000.0,
            payload_step: 1000.0,
            mark_interval: 2000.0,
        }
    }
}

impl DashConfig {
    /// Read the configuration from the process environment, falling back to
    /// the defaults for unset variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let number = |key: &'static str, default: f64| -> Result<f64, ConfigError> {
            let value = match lookup(key) {
                Some(raw) => raw
                    .trim()
                    .parse::<f64>()
                    .map_err(|_| ConfigError::InvalidNumber { key, value: raw })?,
                None => default,
            };
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::NonPositive { key, value });
            }
            Ok(value)
        };

        let config = Self {
            source: lookup(ENV_SOURCE).unwrap_or(defaults.source),
            title: lookup(ENV_TITLE).unwrap_or(defaults.title),
            payload_ceiling: number(ENV_PAYLOAD_MAX, defaults.payload_ceiling)?,
            payload_step: number(ENV_PAYLOAD_STEP, defaults.payload_step)?,
            mark_interval: number(ENV_MARK_INTERVAL, defaults.mark_interval)?,
        };

        for (key, value) in [
            (ENV_PAYLOAD_STEP, config.payload_step),
            (ENV_MARK_INTERVAL, config.mark_interval),
        ] {
            if value > config.payload_ceiling {
                return Err(ConfigError::ExceedsCeiling {
                    key,
                    value,
                    ceiling: config.payload_ceiling,
                });
            }
        }

        for (key, value, limit) in [
            (ENV_PAYLOAD_STEP, config.payload_step, MAX_SLIDER_STEPS),
            (ENV_MARK_INTERVAL, config.mark_interval, MAX_SLIDER_MARKS),
        ] {
            if config.payload_ceiling / value > limit {
                return Err(ConfigError::TooFine {
                    key,
                    value,
                    ceiling: config.payload_ceiling,
                    limit,
                });
            }
        }
        Ok(config)
    }
}

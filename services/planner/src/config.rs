//! services/planner/src/config.rs
//!
//! Defines the session configuration and its loading logic.
//!
//! Configuration is loaded from environment variables. The `.env` file is used
//! for local development.

use std::time::Duration;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds the tunables of a planner session.
#[derive(Clone, Debug)]
pub struct Config {
    pub log_level: Level,
    /// Idle time after the last grid edit before the layout is written.
    pub save_debounce: Duration,
    /// How long a pending error stays visible unless dismissed.
    pub error_clear_after: Duration,
    /// Size of the grid built when a persisted layout cannot be parsed.
    pub default_rows: usize,
    pub default_cols: usize,
    /// Bounds accepted for store setup and resize.
    pub min_dimension: usize,
    pub max_dimension: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: Level::INFO,
            save_debounce: Duration::from_millis(1000),
            error_clear_after: Duration::from_secs(10),
            default_rows: 20,
            default_cols: 30,
            min_dimension: 5,
            max_dimension: 100,
        }
    }
}

impl Config {
    /// Loads configuration from environment variables, falling back to the
    /// defaults for anything unset.
    ///
    /// A `.env` file in the current directory is honoured outside of tests so
    /// that tests stay hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let log_level = match lookup("RUST_LOG") {
            Some(raw) => raw.parse::<Level>().map_err(|_| {
                ConfigError::InvalidValue(
                    "RUST_LOG".to_string(),
                    format!("'{}' is not a valid log level", raw),
                )
            })?,
            None => defaults.log_level,
        };

        let save_debounce = parse_var(&lookup, "SAVE_DEBOUNCE_MS")?
            .map(Duration::from_millis)
            .unwrap_or(defaults.save_debounce);
        let error_clear_after = parse_var(&lookup, "ERROR_CLEAR_SECS")?
            .map(Duration::from_secs)
            .unwrap_or(defaults.error_clear_after);

        let min_dimension =
            parse_var(&lookup, "MIN_LAYOUT_DIMENSION")?.unwrap_or(defaults.min_dimension);
        let max_dimension =
            parse_var(&lookup, "MAX_LAYOUT_DIMENSION")?.unwrap_or(defaults.max_dimension);
        if min_dimension == 0 || min_dimension > max_dimension {
            return Err(ConfigError::InvalidValue(
                "MIN_LAYOUT_DIMENSION".to_string(),
                format!("must be between 1 and {}", max_dimension),
            ));
        }

        let default_rows =
            parse_var(&lookup, "DEFAULT_LAYOUT_ROWS")?.unwrap_or(defaults.default_rows);
        let default_cols =
            parse_var(&lookup, "DEFAULT_LAYOUT_COLS")?.unwrap_or(defaults.default_cols);
        for (key, value) in [
            ("DEFAULT_LAYOUT_ROWS", default_rows),
            ("DEFAULT_LAYOUT_COLS", default_cols),
        ] {
            if !(min_dimension..=max_dimension).contains(&value) {
                return Err(ConfigError::InvalidValue(
                    key.to_string(),
                    format!("{} is outside {}..={}", value, min_dimension, max_dimension),
                ));
            }
        }

        Ok(Self {
            log_level,
            save_debounce,
            error_clear_after,
            default_rows,
            default_cols,
            min_dimension,
            max_dimension,
        })
    }

    pub fn accepts_dimensions(&self, rows: usize, cols: usize) -> bool {
        let range = self.min_dimension..=self.max_dimension;
        range.contains(&rows) && range.contains(&cols)
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue(key.to_string(), e.to_string()))
        })
        .transpose()
}

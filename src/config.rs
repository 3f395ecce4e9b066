//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the tide-config.toml file.
//! It provides the default station used when no postal code is given (or resolution
//! fails), forecast matching parameters, and upstream API credentials.
//!
//! API keys may also come from the `PIRATE_WEATHER_API_KEY` and `OPENCAGE_API_KEY`
//! environment variables, which take precedence over the file.

use crate::{Coordinate, Station};
use chrono::Duration;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Default config file name, resolved relative to the working directory
pub const CONFIG_FILE: &str = "tide-config.toml";

pub const DEFAULT_FORECAST_HORIZON_DAYS: i64 = 2;

pub const PIRATE_WEATHER_KEY_VAR: &str = "PIRATE_WEATHER_API_KEY";
pub const OPENCAGE_KEY_VAR: &str = "OPENCAGE_API_KEY";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown time zone '{0}'")]
    InvalidTimezone(String),

    #[error("config write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("config serialization failed: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration loaded from tide-config.toml
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    /// Station used when no postal code resolves to a closer one
    #[serde(default)]
    pub station: StationConfig,
    /// Matching and request parameters
    #[serde(default)]
    pub forecast: ForecastConfig,
    /// Upstream API credentials
    #[serde(default)]
    pub api: ApiConfig,
}

/// Default NOAA tide station
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StationConfig {
    /// NOAA station ID (e.g., "8571858" for Sharptown, MD)
    pub id: String,
    /// Human-readable station name
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
}

/// Forecast window and merge parameters
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ForecastConfig {
    /// Maximum gap between a tide event and the weather sample shown with it
    pub match_tolerance_minutes: i64,
    /// Prediction range is today through today + this many days
    pub forecast_horizon_days: i64,
    /// IANA zone used for all displayed times (e.g., "America/New_York")
    pub timezone: String,
    /// Tidal datum for heights (e.g., "MLLW")
    pub datum: String,
    /// Per-request timeout for every upstream call
    pub request_timeout_secs: u64,
}

/// API keys; `None`, empty, or placeholder values mean "not configured"
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct ApiConfig {
    pub pirate_weather_key: Option<String>,
    pub opencage_key: Option<String>,
}

impl Default for StationConfig {
    fn default() -> Self {
        StationConfig {
            id: "8571858".to_string(),
            name: "Sharptown, Nanticoke River, MD".to_string(),
            latitude: 38.3970,
            longitude: -75.7600,
        }
    }
}

impl Default for ForecastConfig {
    fn default() -> Self {
        ForecastConfig {
            match_tolerance_minutes: crate::weather_align::DEFAULT_MATCH_TOLERANCE_MINUTES,
            forecast_horizon_days: DEFAULT_FORECAST_HORIZON_DAYS,
            timezone: "America/New_York".to_string(),
            datum: "MLLW".to_string(),
            request_timeout_secs: 10,
        }
    }
}

impl StationConfig {
    pub fn to_station(&self) -> Station {
        Station {
            id: self.id.clone(),
            name: self.name.clone(),
            location: Coordinate::new(self.latitude, self.longitude),
        }
    }
}

impl ForecastConfig {
    pub fn timezone(&self) -> Result<Tz, ConfigError> {
        self.timezone
            .parse::<Tz>()
            .map_err(|_| ConfigError::InvalidTimezone(self.timezone.clone()))
    }

    /// Negative values clamp to zero; values too large for a duration fall
    /// back to the default tolerance.
    pub fn match_tolerance(&self) -> Duration {
        Duration::try_minutes(self.match_tolerance_minutes.max(0))
            .unwrap_or_else(crate::weather_align::default_match_tolerance)
    }

    /// Length of the prediction window after today, clamped like the tolerance.
    pub fn forecast_horizon(&self) -> Duration {
        Duration::try_days(self.forecast_horizon_days.max(0))
            .unwrap_or_else(|| Duration::days(DEFAULT_FORECAST_HORIZON_DAYS))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.request_timeout_secs)
    }
}

/// Treat blank keys and the "YOUR_..._API_KEY" template values as unset.
fn usable_key(key: &Option<String>) -> Option<&str> {
    key.as_deref()
        .map(str::trim)
        .filter(|k| !k.is_empty() && !(k.starts_with("YOUR_") && k.ends_with("_API_KEY")))
}

impl ApiConfig {
    pub fn pirate_weather_key(&self) -> Option<&str> {
        usable_key(&self.pirate_weather_key)
    }

    pub fn opencage_key(&self) -> Option<&str> {
        usable_key(&self.opencage_key)
    }
}

impl Config {
    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<Config>(&contents) {
                Ok(config) => {
                    info!(station = %config.station.name, path = %path.display(), "loaded configuration");
                    config
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "invalid config file format, using defaults");
                    Self::default()
                }
            },
            Err(_) => {
                info!(path = %path.display(), "no config file found, using defaults");
                Self::default()
            }
        }
    }

    /// Override API keys from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|name| std::env::var(name).ok())
    }

    /// Override API keys from an arbitrary variable lookup.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(key) = lookup(PIRATE_WEATHER_KEY_VAR) {
            self.api.pirate_weather_key = Some(key);
        }
        if let Some(key) = lookup(OPENCAGE_KEY_VAR) {
            self.api.opencage_key = Some(key);
        }
        self
    }

    /// Write the current configuration as TOML
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path.as_ref(), contents)?;
        info!(path = %path.as_ref().display(), "configuration saved");
        Ok(())
    }
}

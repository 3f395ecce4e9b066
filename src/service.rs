//! # Forecast Request Orchestration
//!
//! Runs one forecast request start to finish:
//!
//! 1. Resolve the station (default, or nearest to a geocoded postal code)
//! 2. Fetch hourly and high/low tide predictions for the forecast window
//! 3. Fetch the hourly weather forecast at the station
//! 4. Compose the table with [`ForecastComposer`]
//!
//! Upstream calls run sequentially and are never retried. Each failure is
//! logged, turned into an advisory [`Notice`], and replaced by an empty input,
//! so a page is always produced.

use crate::composer::{Forecast, ForecastComposer};
use crate::config::{Config, DEFAULT_FORECAST_HORIZON_DAYS};
use crate::geo::find_nearest;
use crate::tide_data::{PredictionInterval, PredictionRequest};
use crate::{Coordinate, Station, TidePredictionSample, WeatherSample};
use async_trait::async_trait;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

/// User agent sent with every upstream request
pub const USER_AGENT: &str = concat!("tide-weather/", env!("CARGO_PKG_VERSION"));

/// Failure talking to one of the upstream providers.
#[derive(Error, Debug)]
pub enum UpstreamError {
    /// Network, timeout, or protocol error
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("{service} returned HTTP {status}")]
    Status {
        service: &'static str,
        status: reqwest::StatusCode,
    },

    /// Body was not valid JSON for the expected shape
    #[error("malformed response: {0}")]
    Json(#[from] serde_json::Error),

    /// Body parsed but lacked the data we need
    #[error("unusable response: {0}")]
    Payload(String),

    /// Provider reported an error in its response body
    #[error("provider error: {0}")]
    Api(String),
}

/// Build the shared HTTP client with the configured per-request timeout.
pub fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, UpstreamError> {
    Ok(reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()?)
}

/// Postal code → coordinate lookup.
#[async_trait]
pub trait Geocoder: Send + Sync {
    async fn locate(&self, postal_code: &str) -> Result<Coordinate, UpstreamError>;
}

/// Source of eligible tide stations.
#[async_trait]
pub trait StationDirectory: Send + Sync {
    async fn stations(&self) -> Result<Vec<Station>, UpstreamError>;
}

/// Source of tide predictions for one station and date range.
#[async_trait]
pub trait TidePredictionSource: Send + Sync {
    async fn predictions(
        &self,
        request: &PredictionRequest,
    ) -> Result<Vec<TidePredictionSample>, UpstreamError>;
}

/// Source of hourly weather samples at a coordinate.
#[async_trait]
pub trait WeatherSource: Send + Sync {
    async fn hourly_forecast(&self, at: Coordinate) -> Result<Vec<WeatherSample>, UpstreamError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Advisory message shown above an otherwise rendered forecast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn info(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Warning,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }
}

/// Everything the renderer needs for one request.
#[derive(Debug, Clone, Serialize)]
pub struct ForecastPage {
    #[serde(flatten)]
    pub forecast: Forecast,
    pub notices: Vec<Notice>,
}

impl ForecastPage {
    pub fn station_name(&self) -> &str {
        &self.forecast.station.name
    }
}

/// Upstream collaborators. Geocoding and weather are optional because they
/// require API keys.
pub struct Sources {
    pub geocoder: Option<Box<dyn Geocoder>>,
    pub stations: Box<dyn StationDirectory>,
    pub tides: Box<dyn TidePredictionSource>,
    pub weather: Option<Box<dyn WeatherSource>>,
}

pub struct ForecastService {
    default_station: Station,
    datum: String,
    horizon: Duration,
    composer: ForecastComposer,
    sources: Sources,
}

impl ForecastService {
    pub fn new(config: &Config, sources: Sources) -> Self {
        Self {
            default_station: config.station.to_station(),
            datum: config.forecast.datum.clone(),
            horizon: config.forecast.forecast_horizon(),
            composer: ForecastComposer::new(config.forecast.match_tolerance()),
            sources,
        }
    }

    /// Produce a forecast page for `postal_code` (or the default station).
    ///
    /// `now` fixes both the prediction date range and the "next tide" cut-off.
    pub async fn run(&self, postal_code: Option<&str>, now: DateTime<Tz>) -> ForecastPage {
        let mut notices = Vec::new();

        let station = match postal_code {
            Some(code) => self.resolve_station(code, &mut notices).await,
            None => self.default_station.clone(),
        };
        info!(station = %station.name, id = %station.id, "forecasting");

        let begin = now.date_naive();
        let end = now
            .checked_add_signed(self.horizon)
            .or_else(|| {
                warn!(days = self.horizon.num_days(), "forecast horizon out of range, using default");
                now.checked_add_signed(Duration::days(DEFAULT_FORECAST_HORIZON_DAYS))
            })
            .unwrap_or(now)
            .date_naive();
        let request = |interval| PredictionRequest {
            station_id: station.id.clone(),
            begin,
            end,
            datum: self.datum.clone(),
            interval,
        };

        let hourly = match self
            .sources
            .tides
            .predictions(&request(PredictionInterval::Hourly))
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, "hourly tide predictions unavailable");
                notices.push(Notice::error("Failed to retrieve hourly tide data."));
                Vec::new()
            }
        };

        let hilo = match self
            .sources
            .tides
            .predictions(&request(PredictionInterval::HighLow))
            .await
        {
            Ok(samples) => samples,
            Err(e) => {
                warn!(error = %e, "high/low tide predictions unavailable");
                notices.push(Notice::warning("Failed to retrieve high/low tide data."));
                Vec::new()
            }
        };

        let weather = match &self.sources.weather {
            None => {
                notices.push(Notice::warning(
                    "Skipping Pirate Weather requests. Please provide your API key.",
                ));
                Vec::new()
            }
            Some(source) => match source.hourly_forecast(station.location).await {
                Ok(samples) => samples,
                Err(e) => {
                    warn!(error = %e, "weather forecast unavailable");
                    notices.push(Notice::warning(
                        "Could not retrieve general weather forecast or hourly data from Pirate Weather.",
                    ));
                    Vec::new()
                }
            },
        };
        debug!(
            hourly = hourly.len(),
            hilo = hilo.len(),
            weather = weather.len(),
            "fetched inputs"
        );

        let forecast = self.composer.compose(&station, &hourly, &hilo, &weather, now);
        if forecast.rows.is_empty() {
            notices.push(Notice::info(
                "No combined tide and weather forecast data available for the specified date range.",
            ));
        }

        ForecastPage { forecast, notices }
    }

    /// Map a postal code to the nearest eligible station, or fall back to the
    /// default station with a notice explaining why.
    async fn resolve_station(&self, postal_code: &str, notices: &mut Vec<Notice>) -> Station {
        let default_name = &self.default_station.name;
        let postal_code = postal_code.trim();

        if postal_code.is_empty() {
            notices.push(Notice::info(format!(
                "No ZIP code entered. Using default {default_name} station."
            )));
            return self.default_station.clone();
        }

        let Some(geocoder) = &self.sources.geocoder else {
            notices.push(Notice::warning(format!(
                "OpenCage API Key not set. Cannot perform ZIP code lookup. Using default {default_name} station."
            )));
            return self.default_station.clone();
        };

        let target = match geocoder.locate(postal_code).await {
            Ok(target) => target,
            Err(e) => {
                warn!(postal_code, error = %e, "geocoding failed");
                notices.push(Notice::warning(format!(
                    "Failed to convert ZIP code to coordinates. Using default {default_name} station."
                )));
                return self.default_station.clone();
            }
        };

        let stations = match self.sources.stations.stations().await {
            Ok(stations) => stations,
            Err(e) => {
                warn!(error = %e, "station directory unavailable");
                notices.push(Notice::warning(format!(
                    "Failed to retrieve NOAA station list. Using default {default_name} station."
                )));
                return self.default_station.clone();
            }
        };

        match find_nearest(target, &stations) {
            Ok(found) => {
                info!(
                    station = %found.station.name,
                    id = %found.station.id,
                    miles = found.distance_miles,
                    "closest station found"
                );
                let station = found.station;
                notices.push(Notice::info(format!(
                    "Closest station found to {postal_code}: {} (ID: {}) at Lat: {:.4}, Lon: {:.4}",
                    station.name, station.id, station.location.latitude, station.location.longitude
                )));
                station
            }
            Err(e) => {
                warn!(error = %e, "no eligible station");
                notices.push(Notice::warning(format!(
                    "Could not find a closest station. Using default {default_name} station."
                )));
                self.default_station.clone()
            }
        }
    }
}

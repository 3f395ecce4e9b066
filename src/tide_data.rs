//! # NOAA Tide Data Fetching
//!
//! This module handles all network operations against NOAA's CO-OPS services:
//! the station directory (for nearest-station lookup) and the tide predictions
//! data getter (hourly and high/low products).
//!
//! ## Data Sources
//!
//! ### Station Directory
//! - **URL**: https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi/stations.json
//! - **Format**: JSON `stations[]` with `id`, `name`, `lat`, `lng` and an
//!   optional `active` flag
//!
//! ### Predictions
//! - **URL**: https://api.tidesandcurrents.noaa.gov/api/prod/datagetter
//! - **Format**: JSON `predictions[]` rows `{ "t": "2025-07-24 03:00", "v": "1.234", "type": "H" }`
//! - **Times**: local station time (`time_zone=lst`), localized here to the
//!   configured IANA zone
//!
//! ## Data Processing Pipeline
//! 1. **Fetch**: HTTP GET with a fixed timeout, no retries
//! 2. **Parse**: JSON body into raw rows
//! 3. **Clean**: rows with unparseable heights or timestamps are dropped
//! 4. **Return**: [`TidePredictionSample`]s in upstream order
//!
//! All errors propagate through [`UpstreamError`]; the forecast service turns
//! them into empty inputs.

use crate::geo::{eligible_stations, StationCandidate};
use crate::service::{StationDirectory, TidePredictionSource, UpstreamError};
use crate::{localize, Station, TideExtreme, TidePredictionSample};
use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

const STATIONS_URL: &str = "https://api.tidesandcurrents.noaa.gov/mdapi/prod/webapi/stations.json";

const DATAGETTER_URL: &str = "https://api.tidesandcurrents.noaa.gov/api/prod/datagetter";

/// Application name reported to NOAA with each request
const APPLICATION: &str = "TideWeather";

/// Timestamp format of the `t` field
const NOAA_TIME_FORMAT: &str = "%Y-%m-%d %H:%M";

/// NOAA date parameter format
const NOAA_DATE_FORMAT: &str = "%Y%m%d";

/// Which predictions product to request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PredictionInterval {
    /// One prediction per hour
    Hourly,
    /// Only local high and low extremes
    HighLow,
}

impl PredictionInterval {
    pub fn as_param(self) -> &'static str {
        match self {
            PredictionInterval::Hourly => "h",
            PredictionInterval::HighLow => "hilo",
        }
    }
}

/// Parameters of one predictions request.
#[derive(Clone, Debug, PartialEq)]
pub struct PredictionRequest {
    pub station_id: String,
    pub begin: NaiveDate,
    pub end: NaiveDate,
    /// Tidal datum, e.g. "MLLW"
    pub datum: String,
    pub interval: PredictionInterval,
}

impl PredictionRequest {
    /// Query parameters for the data getter endpoint.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("product", "predictions".to_string()),
            ("application", APPLICATION.to_string()),
            ("station", self.station_id.clone()),
            ("begin_date", self.begin.format(NOAA_DATE_FORMAT).to_string()),
            ("end_date", self.end.format(NOAA_DATE_FORMAT).to_string()),
            ("datum", self.datum.clone()),
            ("units", "english".to_string()),
            ("time_zone", "lst".to_string()),
            ("interval", self.interval.as_param().to_string()),
            ("format", "json".to_string()),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct StationsResponse {
    // Records are decoded one at a time so a malformed entry only loses itself
    stations: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct RawStation {
    id: String,
    #[serde(default)]
    name: Option<String>,
    lat: Option<f64>,
    lng: Option<f64>,
    active: Option<bool>,
}

#[derive(Debug, Deserialize)]
struct PredictionsResponse {
    predictions: Option<Vec<RawPrediction>>,
    data: Option<Vec<RawPrediction>>,
    error: Option<ApiErrorBody>,
}

#[derive(Debug, Deserialize)]
struct RawPrediction {
    t: String,
    v: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Parse the station directory and apply the eligibility filter.
///
/// An empty eligible list is returned as `Ok`; callers see it as "no station
/// found".
pub fn parse_stations(body: &str) -> Result<Vec<Station>, UpstreamError> {
    let response: StationsResponse = serde_json::from_str(body)?;
    let total = response.stations.len();

    let candidates: Vec<StationCandidate> = response
        .stations
        .into_iter()
        .filter_map(|record| serde_json::from_value::<RawStation>(record).ok())
        .map(|raw| StationCandidate {
            name: raw.name.unwrap_or_else(|| raw.id.clone()),
            id: raw.id,
            latitude: raw.lat,
            longitude: raw.lng,
            active: raw.active,
        })
        .collect();
    let malformed = total - candidates.len();
    if malformed > 0 {
        warn!(malformed, "skipped malformed station records");
    }

    let stations = eligible_stations(candidates);
    info!(total, eligible = stations.len(), "filtered NOAA station directory");
    Ok(stations)
}

/// Parse a predictions body into samples localized to `tz`.
pub fn parse_predictions(body: &str, tz: &Tz) -> Result<Vec<TidePredictionSample>, UpstreamError> {
    let response: PredictionsResponse = serde_json::from_str(body)?;

    if let Some(error) = response.error {
        return Err(UpstreamError::Api(error.message));
    }

    let rows = response
        .predictions
        .or(response.data)
        .ok_or_else(|| UpstreamError::Payload("no predictions in response".to_string()))?;

    let total = rows.len();
    let samples: Vec<_> = rows
        .into_iter()
        .filter_map(|row| parse_row(row, tz))
        .collect();

    if samples.len() < total {
        debug!(dropped = total - samples.len(), "dropped unparseable prediction rows");
    }
    Ok(samples)
}

fn parse_row(row: RawPrediction, tz: &Tz) -> Option<TidePredictionSample> {
    let naive = NaiveDateTime::parse_from_str(row.t.trim(), NOAA_TIME_FORMAT).ok()?;
    let time = localize(tz, naive)?;
    let height_ft = row.v.as_deref()?.trim().parse::<f64>().ok()?;

    Some(TidePredictionSample {
        time,
        height_ft: Some(height_ft),
        extreme: row.kind.as_deref().and_then(TideExtreme::from_code),
    })
}

/// HTTP client for NOAA CO-OPS endpoints.
#[derive(Debug, Clone)]
pub struct NoaaClient {
    http: Client,
    tz: Tz,
    stations_url: String,
    datagetter_url: String,
}

impl NoaaClient {
    pub fn new(http: Client, tz: Tz) -> Self {
        Self {
            http,
            tz,
            stations_url: STATIONS_URL.to_string(),
            datagetter_url: DATAGETTER_URL.to_string(),
        }
    }

    async fn get_text(&self, request: reqwest::RequestBuilder) -> Result<String, UpstreamError> {
        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: "NOAA",
                status,
            });
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl StationDirectory for NoaaClient {
    async fn stations(&self) -> Result<Vec<Station>, UpstreamError> {
        debug!(url = %self.stations_url, "fetching NOAA station directory");
        let body = self.get_text(self.http.get(&self.stations_url)).await?;
        parse_stations(&body)
    }
}

#[async_trait]
impl TidePredictionSource for NoaaClient {
    async fn predictions(
        &self,
        request: &PredictionRequest,
    ) -> Result<Vec<TidePredictionSample>, UpstreamError> {
        debug!(
            station = %request.station_id,
            interval = request.interval.as_param(),
            "fetching NOAA predictions"
        );
        let body = self
            .get_text(self.http.get(&self.datagetter_url).query(&request.query()))
            .await?;
        parse_predictions(&body, &self.tz)
    }
}

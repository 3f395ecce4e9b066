//! # Pirate Weather Hourly Forecast
//!
//! Fetches the hourly forecast block for a coordinate from Pirate Weather
//! (Dark Sky compatible API) in US units and converts each row into a
//! [`WeatherSample`] localized to the configured zone.
//!
//! - **URL**: `https://api.pirateweather.net/forecast/{key}/{lat},{lon}?units=us`
//! - **Rows**: `hourly.data[]` with a Unix `time` and optional measurements

use crate::service::{UpstreamError, WeatherSource};
use crate::{Coordinate, WeatherSample};
use async_trait::async_trait;
use chrono::DateTime;
use chrono_tz::Tz;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const BASE_URL: &str = "https://api.pirateweather.net/forecast";

#[derive(Debug, Deserialize)]
struct ForecastResponse {
    hourly: Option<HourlyBlock>,
}

#[derive(Debug, Deserialize)]
struct HourlyBlock {
    #[serde(default)]
    data: Vec<RawHour>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawHour {
    time: i64,
    summary: Option<String>,
    temperature: Option<f64>,
    apparent_temperature: Option<f64>,
    precip_probability: Option<f64>,
    wind_speed: Option<f64>,
    humidity: Option<f64>,
}

/// Parse a forecast body into hourly samples.
///
/// A response without an `hourly` block is an error; an empty block is not.
pub fn parse_forecast(body: &str, tz: &Tz) -> Result<Vec<WeatherSample>, UpstreamError> {
    let response: ForecastResponse = serde_json::from_str(body)?;
    let hourly = response
        .hourly
        .ok_or_else(|| UpstreamError::Payload("no hourly block in forecast".to_string()))?;

    Ok(hourly
        .data
        .into_iter()
        .filter_map(|hour| {
            let time = DateTime::from_timestamp(hour.time, 0)?.with_timezone(tz);
            Some(WeatherSample {
                time,
                summary: hour.summary,
                temperature_f: hour.temperature,
                apparent_temperature_f: hour.apparent_temperature,
                precip_probability: hour.precip_probability,
                wind_speed_mph: hour.wind_speed,
                humidity: hour.humidity,
            })
        })
        .collect())
}

pub struct PirateWeatherClient {
    http: Client,
    api_key: String,
    tz: Tz,
    base_url: String,
}

impl PirateWeatherClient {
    pub fn new(http: Client, api_key: impl Into<String>, tz: Tz) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            tz,
            base_url: BASE_URL.to_string(),
        }
    }

    fn forecast_url(&self, at: Coordinate) -> String {
        format!(
            "{}/{}/{},{}",
            self.base_url, self.api_key, at.latitude, at.longitude
        )
    }
}

#[async_trait]
impl WeatherSource for PirateWeatherClient {
    async fn hourly_forecast(&self, at: Coordinate) -> Result<Vec<WeatherSample>, UpstreamError> {
        debug!(
            latitude = at.latitude,
            longitude = at.longitude,
            "fetching Pirate Weather forecast"
        );
        let response = self
            .http
            .get(self.forecast_url(at))
            .query(&[("units", "us"), ("exclude", "minutely,alerts,flags")])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: "Pirate Weather",
                status,
            });
        }

        let samples = parse_forecast(&response.text().await?, &self.tz)?;
        debug!(samples = samples.len(), "parsed hourly forecast");
        Ok(samples)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    #[test]
    fn test_parse_hourly_rows() {
        // 1753362000 = 2025-07-24 13:00 UTC = 09:00 EDT
        let body = r#"{
            "latitude": 38.397,
            "hourly": {
                "summary": "Clear throughout the day.",
                "data": [
                    {"time": 1753362000, "summary": "Clear", "temperature": 84.2,
                     "apparentTemperature": 88.9, "precipProbability": 0.05,
                     "windSpeed": 6.3, "humidity": 0.71},
                    {"time": 1753365600, "summary": "Partly Cloudy"}
                ]
            }
        }"#;
        let samples = parse_forecast(body, &New_York).unwrap();

        assert_eq!(samples.len(), 2);
        assert_eq!(
            samples[0].time,
            New_York.with_ymd_and_hms(2025, 7, 24, 9, 0, 0).unwrap()
        );
        assert_eq!(samples[0].summary.as_deref(), Some("Clear"));
        assert_eq!(samples[0].apparent_temperature_f, Some(88.9));
        assert_eq!(samples[0].wind_speed_mph, Some(6.3));
        assert_eq!(samples[1].temperature_f, None);
        assert_eq!(samples[1].humidity, None);
    }

    #[test]
    fn test_missing_hourly_block() {
        let body = r#"{"currently": {"time": 1753362000}}"#;
        assert!(matches!(
            parse_forecast(body, &New_York),
            Err(UpstreamError::Payload(_))
        ));
    }

    #[test]
    fn test_empty_hourly_block() {
        let body = r#"{"hourly": {"data": []}}"#;
        assert!(parse_forecast(body, &New_York).unwrap().is_empty());
    }

    #[test]
    fn test_forecast_url() {
        let client = PirateWeatherClient::new(Client::new(), "abc", New_York);
        assert_eq!(
            client.forecast_url(Coordinate::new(38.397, -75.76)),
            "https://api.pirateweather.net/forecast/abc/38.397,-75.76"
        );
    }
}

//! Postal code geocoding through the OpenCage forward geocoding API.

use crate::service::{Geocoder, UpstreamError};
use crate::Coordinate;
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

const BASE_URL: &str = "https://api.opencagedata.com/geocode/v1/json";

#[derive(Debug, Deserialize)]
struct GeocodeResponse {
    #[serde(default)]
    results: Vec<GeocodeResult>,
}

#[derive(Debug, Deserialize)]
struct GeocodeResult {
    geometry: Geometry,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    lat: f64,
    lng: f64,
}

/// Take the first result's geometry. No results is an error.
pub fn parse_geocode(body: &str, postal_code: &str) -> Result<Coordinate, UpstreamError> {
    let response: GeocodeResponse = serde_json::from_str(body)?;
    response
        .results
        .into_iter()
        .next()
        .map(|r| Coordinate::new(r.geometry.lat, r.geometry.lng))
        .ok_or_else(|| UpstreamError::Payload(format!("no geocoding results for '{postal_code}'")))
}

pub struct OpenCageClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl OpenCageClient {
    pub fn new(http: Client, api_key: impl Into<String>) -> Self {
        Self {
            http,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        }
    }
}

#[async_trait]
impl Geocoder for OpenCageClient {
    async fn locate(&self, postal_code: &str) -> Result<Coordinate, UpstreamError> {
        debug!(postal_code, "geocoding postal code");
        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", postal_code),
                ("key", self.api_key.as_str()),
                ("limit", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status {
                service: "OpenCage",
                status,
            });
        }
        parse_geocode(&response.text().await?, postal_code)
    }
}

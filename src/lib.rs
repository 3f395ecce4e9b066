//! # Tide Weather Core Library
//!
//! This library merges NOAA tide predictions with an hourly weather forecast
//! into a single chronologically ordered table for one coastal station.
//!
//! ## Data Flow
//! 1. **Resolve**: optional postal code → coordinate → nearest eligible NOAA station
//! 2. **Fetch**: hourly and high/low tide predictions, hourly weather samples
//! 3. **Merge**: tide events sorted by time, each joined to the closest weather
//!    sample within the match tolerance
//! 4. **Display**: fixed-shape [`composer::ForecastRow`]s plus a next high/low summary
//!
//! Upstream failures never abort a forecast. Each collaborator failure becomes
//! an empty input and an advisory notice; the merge engine treats absence as
//! ordinary input.
//!
//! ## Core Types
//! - [`Station`]: a tide-monitoring station with coordinates
//! - [`TidePredictionSample`]: one hourly or high/low prediction
//! - [`WeatherSample`]: one hourly weather forecast point

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

// Module declarations
pub mod composer;
pub mod config;
pub mod geo;
pub mod geocoding;
pub mod nearest;
pub mod renderer;
pub mod service;
pub mod tide_data;
pub mod tide_series;
pub mod weather_align;
pub mod weather_data;
pub mod weather_icon;


/// A point on the Earth's surface in decimal degrees.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// A NOAA tide-monitoring station.
///
/// Stations are fetched fresh per request from the station directory and
/// never mutated locally.
///
/// # Example
/// ```
/// use tide_weather_lib::{Coordinate, Station};
///
/// let station = Station {
///     id: "8571858".to_string(),
///     name: "Sharptown, Nanticoke River, MD".to_string(),
///     location: Coordinate::new(38.3970, -75.7600),
/// };
/// assert_eq!(station.id, "8571858");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Station {
    /// NOAA station ID (e.g., "8571858")
    pub id: String,
    /// Human-readable station name
    pub name: String,
    /// Station position
    pub location: Coordinate,
}

/// Marker on a high/low prediction row.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TideExtreme {
    High,
    Low,
}

impl TideExtreme {
    /// Parse the NOAA `type` field ("H" / "L").
    pub fn from_code(code: &str) -> Option<Self> {
        match code.trim() {
            "H" | "h" | "HH" => Some(TideExtreme::High),
            "L" | "l" | "LL" => Some(TideExtreme::Low),
            _ => None,
        }
    }

    /// Single-letter label used in the forecast table.
    pub fn code(self) -> &'static str {
        match self {
            TideExtreme::High => "H",
            TideExtreme::Low => "L",
        }
    }
}

/// One tide prediction in local civil time.
///
/// `extreme` is `None` for regularly spaced hourly samples and
/// `Some(High | Low)` for rows from the high/low product.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TidePredictionSample {
    pub time: DateTime<Tz>,
    /// Height above the configured datum, in feet
    pub height_ft: Option<f64>,
    pub extreme: Option<TideExtreme>,
}

/// One hourly weather forecast point.
///
/// Every measurement is optional; upstream rows with missing fields still
/// produce a sample and the missing values render as empty cells.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct WeatherSample {
    pub time: DateTime<Tz>,
    pub summary: Option<String>,
    /// Air temperature in °F
    pub temperature_f: Option<f64>,
    /// Apparent ("feels like") temperature in °F
    pub apparent_temperature_f: Option<f64>,
    /// Precipitation probability as a fraction (0..1)
    pub precip_probability: Option<f64>,
    /// Wind speed in mph
    pub wind_speed_mph: Option<f64>,
    /// Relative humidity as a fraction (0..1)
    pub humidity: Option<f64>,
}

/// Attach a time zone to a naive local timestamp.
///
/// Ambiguous times (DST fall-back) resolve to the earlier instant and
/// nonexistent times (DST spring-forward gap) are shifted forward one hour.
pub fn localize(tz: &Tz, naive: NaiveDateTime) -> Option<DateTime<Tz>> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| {
            let shifted = naive.checked_add_signed(Duration::hours(1))?;
            tz.from_local_datetime(&shifted).earliest()
        })
}

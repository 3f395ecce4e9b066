//! # Nearest Station Matching
//!
//! Resolves a target coordinate to the closest NOAA tide station using
//! great-circle distance on a spherical Earth.
//!
//! ## Station Eligibility
//! The NOAA station directory reports an `active` flag that is sometimes
//! missing altogether. A station takes part in matching when it has both
//! coordinates and its flag is `true` or absent. Only stations explicitly
//! marked `active: false` are excluded.

use crate::nearest::nearest_by;
use crate::{Coordinate, Station};
use thiserror::Error;

/// Mean Earth radius in kilometres (IUGG).
const EARTH_RADIUS_KM: f64 = 6371.009;

const KM_PER_MILE: f64 = 1.609_344;

#[derive(Error, Debug, PartialEq)]
pub enum GeoError {
    /// The candidate list was empty
    #[error("no station found near {latitude:.4}, {longitude:.4}")]
    NotFound { latitude: f64, longitude: f64 },
}

/// A nearest-station match and its distance from the target.
#[derive(Clone, Debug, PartialEq)]
pub struct StationMatch {
    pub station: Station,
    pub distance_miles: f64,
}

/// Raw directory entry before the eligibility filter is applied.
#[derive(Clone, Debug, PartialEq)]
pub struct StationCandidate {
    pub id: String,
    pub name: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    /// `None` means the directory did not report activity for this station
    pub active: Option<bool>,
}

impl StationCandidate {
    /// Convert to a [`Station`] if it passes the eligibility policy.
    pub fn into_eligible(self) -> Option<Station> {
        if self.active == Some(false) {
            return None;
        }
        let (latitude, longitude) = (self.latitude?, self.longitude?);
        Some(Station {
            id: self.id,
            name: self.name,
            location: Coordinate::new(latitude, longitude),
        })
    }
}

/// Keep only stations usable for matching, preserving directory order.
pub fn eligible_stations<I>(candidates: I) -> Vec<Station>
where
    I: IntoIterator<Item = StationCandidate>,
{
    candidates
        .into_iter()
        .filter_map(StationCandidate::into_eligible)
        .collect()
}

/// Great-circle distance between two coordinates, in statute miles.
///
/// Uses the haversine formula, which stays well conditioned for the short
/// distances typical of station lookups.
pub fn great_circle_miles(a: Coordinate, b: Coordinate) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    let d_lat = (b.latitude - a.latitude).to_radians();
    let d_lon = (b.longitude - a.longitude).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let central_angle = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_KM * central_angle / KM_PER_MILE
}

/// Find the station closest to `target`.
///
/// Ties go to the station that appears first in `candidates`.
///
/// # Errors
/// [`GeoError::NotFound`] when `candidates` is empty. Callers fall back to
/// their configured default station.
pub fn find_nearest(target: Coordinate, candidates: &[Station]) -> Result<StationMatch, GeoError> {
    nearest_by(candidates, |station| great_circle_miles(target, station.location))
        .map(|(station, distance_miles)| StationMatch {
            station: station.clone(),
            distance_miles,
        })
        .ok_or(GeoError::NotFound {
            latitude: target.latitude,
            longitude: target.longitude,
        })
}

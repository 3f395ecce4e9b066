//! Join a tide event to the hourly weather sample closest in time.

use crate::nearest::nearest_by;
use crate::WeatherSample;
use chrono::{DateTime, Duration};
use chrono_tz::Tz;

/// Default maximum gap, in minutes, between a tide event and its weather sample.
pub const DEFAULT_MATCH_TOLERANCE_MINUTES: i64 = 30;

pub fn default_match_tolerance() -> Duration {
    Duration::minutes(DEFAULT_MATCH_TOLERANCE_MINUTES)
}

/// Outcome of aligning one event timestamp against the weather samples.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Alignment<'a> {
    Matched(&'a WeatherSample),
    /// No samples, event outside the sample range, or nearest sample too far
    NoForecast,
}

impl<'a> Alignment<'a> {
    pub fn sample(self) -> Option<&'a WeatherSample> {
        match self {
            Alignment::Matched(sample) => Some(sample),
            Alignment::NoForecast => None,
        }
    }
}

/// Find the weather sample closest to `event_time`.
///
/// Returns [`Alignment::NoForecast`] when `samples` is empty, when
/// `event_time` lies outside `[earliest, latest]` sample time (no
/// extrapolation), or when the closest sample is more than `tolerance` away.
/// A gap of exactly `tolerance` still matches. Equidistant samples resolve to
/// the first in sequence order.
pub fn align<'a>(
    event_time: DateTime<Tz>,
    samples: &'a [WeatherSample],
    tolerance: Duration,
) -> Alignment<'a> {
    let Some(earliest) = samples.iter().map(|s| s.time).min() else {
        return Alignment::NoForecast;
    };
    let Some(latest) = samples.iter().map(|s| s.time).max() else {
        return Alignment::NoForecast;
    };
    if event_time < earliest || event_time > latest {
        return Alignment::NoForecast;
    }

    match nearest_by(samples, |sample| (sample.time - event_time).abs()) {
        Some((sample, gap)) if gap <= tolerance => Alignment::Matched(sample),
        _ => Alignment::NoForecast,
    }
}

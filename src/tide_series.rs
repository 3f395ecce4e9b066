//! # Tide Event Series
//!
//! NOAA publishes hourly predictions and high/low predictions as two separate
//! products. This module interleaves them into one chronological sequence of
//! [`TideEvent`]s, tagging each event with where it came from.
//!
//! Events that share a timestamp keep their input order (hourly rows first,
//! since they are inserted first). No other tie-break is applied.

use crate::{TideExtreme, TidePredictionSample};
use chrono::DateTime;
use chrono_tz::Tz;
use serde::Serialize;

/// Origin of a tide event in the merged series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TideEventKind {
    Hourly,
    High,
    Low,
}

impl From<TideExtreme> for TideEventKind {
    fn from(extreme: TideExtreme) -> Self {
        match extreme {
            TideExtreme::High => TideEventKind::High,
            TideExtreme::Low => TideEventKind::Low,
        }
    }
}

/// One row of the merged tide series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TideEvent {
    pub time: DateTime<Tz>,
    pub height_ft: Option<f64>,
    pub kind: TideEventKind,
}

/// Merge hourly and high/low predictions into one ascending sequence.
///
/// Every input sample yields exactly one event, so the output length is
/// `hourly.len() + hilo.len()`. Hourly inputs are always tagged
/// [`TideEventKind::Hourly`]. High/low inputs are tagged by their extreme
/// marker; a high/low row without a marker is treated as hourly.
///
/// An empty result is not an error: it means no predictions were available.
pub fn build(hourly: &[TidePredictionSample], hilo: &[TidePredictionSample]) -> Vec<TideEvent> {
    let mut events = Vec::with_capacity(hourly.len() + hilo.len());

    events.extend(hourly.iter().map(|sample| TideEvent {
        time: sample.time,
        height_ft: sample.height_ft,
        kind: TideEventKind::Hourly,
    }));

    events.extend(hilo.iter().map(|sample| TideEvent {
        time: sample.time,
        height_ft: sample.height_ft,
        kind: sample
            .extreme
            .map(TideEventKind::from)
            .unwrap_or(TideEventKind::Hourly),
    }));

    // `sort_by_key` is stable, which preserves input order on equal timestamps
    events.sort_by_key(|event| event.time);
    events
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn at(hour: u32, minute: u32) -> DateTime<Tz> {
        New_York
            .with_ymd_and_hms(2025, 7, 24, hour, minute, 0)
            .unwrap()
    }

    fn sample(hour: u32, minute: u32, height: f64, extreme: Option<TideExtreme>) -> TidePredictionSample {
        TidePredictionSample {
            time: at(hour, minute),
            height_ft: Some(height),
            extreme,
        }
    }

    #[test]
    fn test_both_empty() {
        assert!(build(&[], &[]).is_empty());
    }

    #[test]
    fn test_hourly_only() {
        let hourly = vec![sample(1, 0, 1.0, None), sample(2, 0, 1.5, None)];
        let events = build(&hourly, &[]);
        assert_eq!(events.len(), 2);
        assert!(events.iter().all(|e| e.kind == TideEventKind::Hourly));
    }

    #[test]
    fn test_hilo_only() {
        let hilo = vec![
            sample(9, 12, 0.3, Some(TideExtreme::Low)),
            sample(3, 5, 2.8, Some(TideExtreme::High)),
        ];
        let events = build(&[], &hilo);
        assert_eq!(events[0].kind, TideEventKind::High);
        assert_eq!(events[1].kind, TideEventKind::Low);
    }

    #[test]
    fn test_interleaves_by_time() {
        let hourly = vec![
            sample(10, 0, 2.1, None),
            sample(11, 0, 2.2, None),
            sample(12, 0, 2.0, None),
        ];
        let hilo = vec![sample(11, 24, 2.4, Some(TideExtreme::High))];
        let events = build(&hourly, &hilo);

        let kinds: Vec<_> = events.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                TideEventKind::Hourly,
                TideEventKind::Hourly,
                TideEventKind::High,
                TideEventKind::Hourly
            ]
        );
        assert_eq!(events.len(), hourly.len() + hilo.len());
    }

    #[test]
    fn test_equal_timestamps_keep_input_order() {
        let hourly = vec![sample(6, 0, 0.4, None)];
        let hilo = vec![sample(6, 0, 0.4, Some(TideExtreme::Low))];
        let events = build(&hourly, &hilo);
        assert_eq!(events[0].kind, TideEventKind::Hourly);
        assert_eq!(events[1].kind, TideEventKind::Low);
    }

    #[test]
    fn test_missing_height_is_carried() {
        let hourly = vec![TidePredictionSample {
            time: at(4, 0),
            height_ft: None,
            extreme: None,
        }];
        let events = build(&hourly, &[]);
        assert_eq!(events[0].height_ft, None);
    }
}

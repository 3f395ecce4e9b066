//! # Forecast Composition
//!
//! Builds the combined tide-and-weather table for one station:
//!
//! 1. Merge hourly and high/low predictions with [`tide_series::build`]
//! 2. Align each tide event to the nearest weather sample within tolerance
//! 3. Classify the weather summary into an icon and format every cell
//! 4. Assign a row style, alternating only across hourly rows
//!
//! A separate [`NextTideSummary`] reports the first high and first low tide
//! strictly after `now`.
//!
//! Composition is a pure function of its inputs. It never reads the clock and
//! never fails: missing values become empty cells and unmatched events
//! become "No forecast" rows.

use crate::tide_series::{self, TideEvent, TideEventKind};
use crate::weather_align::{align, default_match_tolerance, Alignment};
use crate::weather_icon::{WeatherIcon, NO_FORECAST};
use crate::{Station, TideExtreme, TidePredictionSample, WeatherSample};
use chrono::{DateTime, Duration};
use chrono_tz::Tz;
use serde::Serialize;

/// Timestamp format for table cells and summary lines, e.g.
/// "2025-07-24 03:05 PM EDT".
const TIME_FORMAT: &str = "%Y-%m-%d %I:%M %p %Z";

/// Summary text for a matched sample that carries no summary of its own.
const MISSING_SUMMARY: &str = "N/A";

/// Message shown when no high or low tide lies after `now`.
pub const NO_FUTURE_TIDES: &str =
    "No future high/low tide predictions available for the specified date range.";

/// Visual treatment of a table row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum RowStyle {
    HighTide,
    LowTide,
    HourlyOdd,
    HourlyEven,
}

impl RowStyle {
    pub fn as_str(self) -> &'static str {
        match self {
            RowStyle::HighTide => "high-tide",
            RowStyle::LowTide => "low-tide",
            RowStyle::HourlyOdd => "hourly-odd",
            RowStyle::HourlyEven => "hourly-even",
        }
    }
}

/// One fully formatted line of the forecast table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ForecastRow {
    #[serde(skip)]
    pub event_time: DateTime<Tz>,
    pub time: String,
    /// "H", "L" or empty for hourly rows
    pub tide_event: String,
    pub tide_height: String,
    pub weather_icon: &'static str,
    pub weather_summary: String,
    pub temperature: String,
    pub precip_probability: String,
    pub wind: String,
    pub humidity: String,
    pub style: RowStyle,
}

/// A single upcoming tide extreme.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TideHighlight {
    pub time: DateTime<Tz>,
    pub height_ft: Option<f64>,
}

/// The next high and next low tide after `now`, chosen independently.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NextTideSummary {
    pub next_high: Option<TideHighlight>,
    pub next_low: Option<TideHighlight>,
}

impl NextTideSummary {
    /// Pick the earliest high and earliest low strictly after `now`.
    pub fn from_hilo(hilo: &[TidePredictionSample], now: DateTime<Tz>) -> Self {
        let earliest = |wanted: TideExtreme| {
            hilo.iter()
                .filter(|s| s.extreme == Some(wanted) && s.time > now)
                .min_by_key(|s| s.time)
                .map(|s| TideHighlight {
                    time: s.time,
                    height_ft: s.height_ft,
                })
        };

        Self {
            next_high: earliest(TideExtreme::High),
            next_low: earliest(TideExtreme::Low),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.next_high.is_none() && self.next_low.is_none()
    }

    /// Zero, one or two display lines; a fixed message when nothing is upcoming.
    pub fn lines(&self) -> Vec<String> {
        if self.is_empty() {
            return vec![NO_FUTURE_TIDES.to_string()];
        }

        let line = |label: &str, tide: &TideHighlight| {
            let mut text = format!("Next {label} Tide: {}", tide.time.format(TIME_FORMAT));
            if let Some(height) = tide.height_ft {
                text.push_str(&format!(" (Height: {height:.2} ft)"));
            }
            text
        };

        let mut lines = Vec::with_capacity(2);
        if let Some(high) = &self.next_high {
            lines.push(line("High", high));
        }
        if let Some(low) = &self.next_low {
            lines.push(line("Low", low));
        }
        lines
    }
}

/// Result of one composition.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Forecast {
    pub station: Station,
    pub rows: Vec<ForecastRow>,
    pub next_tide: NextTideSummary,
}

/// Merges tide and weather series using a fixed match tolerance.
#[derive(Debug, Clone, Copy)]
pub struct ForecastComposer {
    tolerance: Duration,
}

impl Default for ForecastComposer {
    fn default() -> Self {
        Self::new(default_match_tolerance())
    }
}

impl ForecastComposer {
    pub fn new(tolerance: Duration) -> Self {
        Self { tolerance }
    }

    /// Produce the ordered table and next-tide summary for `station`.
    ///
    /// Every tide event yields exactly one row. Rows are in non-decreasing
    /// event time. Identical inputs always produce identical output.
    pub fn compose(
        &self,
        station: &Station,
        tide_hourly: &[TidePredictionSample],
        tide_hilo: &[TidePredictionSample],
        weather: &[WeatherSample],
        now: DateTime<Tz>,
    ) -> Forecast {
        let events = tide_series::build(tide_hourly, tide_hilo);

        let mut hourly_rows = 0usize;
        let rows = events
            .iter()
            .map(|event| {
                let style = match event.kind {
                    TideEventKind::High => RowStyle::HighTide,
                    TideEventKind::Low => RowStyle::LowTide,
                    TideEventKind::Hourly => {
                        let style = if hourly_rows % 2 == 0 {
                            RowStyle::HourlyOdd
                        } else {
                            RowStyle::HourlyEven
                        };
                        hourly_rows += 1;
                        style
                    }
                };
                self.row(event, weather, style)
            })
            .collect();

        Forecast {
            station: station.clone(),
            rows,
            next_tide: NextTideSummary::from_hilo(tide_hilo, now),
        }
    }

    fn row(&self, event: &TideEvent, weather: &[WeatherSample], style: RowStyle) -> ForecastRow {
        let tide_event = match event.kind {
            TideEventKind::High => TideExtreme::High.code(),
            TideEventKind::Low => TideExtreme::Low.code(),
            TideEventKind::Hourly => "",
        };

        let base = ForecastRow {
            event_time: event.time,
            time: event.time.format(TIME_FORMAT).to_string(),
            tide_event: tide_event.to_string(),
            tide_height: format_height(event.height_ft),
            weather_icon: WeatherIcon::NoForecast.glyph(),
            weather_summary: NO_FORECAST.to_string(),
            temperature: String::new(),
            precip_probability: String::new(),
            wind: String::new(),
            humidity: String::new(),
            style,
        };

        match align(event.time, weather, self.tolerance) {
            Alignment::NoForecast => base,
            Alignment::Matched(sample) => {
                let summary = sample
                    .summary
                    .clone()
                    .unwrap_or_else(|| MISSING_SUMMARY.to_string());
                ForecastRow {
                    weather_icon: WeatherIcon::classify(&summary).glyph(),
                    weather_summary: summary,
                    temperature: format_temperature(sample.temperature_f),
                    precip_probability: format_percent(sample.precip_probability),
                    wind: format_wind(sample.wind_speed_mph),
                    humidity: format_percent(sample.humidity),
                    ..base
                }
            }
        }
    }
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

pub fn format_height(height_ft: Option<f64>) -> String {
    finite(height_ft)
        .map(|h| format!("{h:.2} ft"))
        .unwrap_or_default()
}

pub fn format_temperature(temperature_f: Option<f64>) -> String {
    finite(temperature_f)
        .map(|t| format!("{t:.1}°F"))
        .unwrap_or_default()
}

/// Format a 0..1 fraction as a whole percentage.
pub fn format_percent(fraction: Option<f64>) -> String {
    finite(fraction)
        .map(|f| format!("{:.0}%", f * 100.0))
        .unwrap_or_default()
}

pub fn format_wind(speed_mph: Option<f64>) -> String {
    finite(speed_mph)
        .map(|w| format!("{w:.1} mph"))
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Coordinate;
    use chrono::TimeZone;
    use chrono_tz::America::New_York;

    fn at(hour: u32, minute: u32) -> DateTime<Tz> {
        New_York
            .with_ymd_and_hms(2025, 7, 24, hour, minute, 0)
            .unwrap()
    }

    fn station() -> Station {
        Station {
            id: "8571858".to_string(),
            name: "Sharptown, Nanticoke River, MD".to_string(),
            location: Coordinate::new(38.397, -75.76),
        }
    }

    fn tide(hour: u32, minute: u32, height: f64, extreme: Option<TideExtreme>) -> TidePredictionSample {
        TidePredictionSample {
            time: at(hour, minute),
            height_ft: Some(height),
            extreme,
        }
    }

    fn weather(hour: u32, minute: u32, summary: &str) -> WeatherSample {
        WeatherSample {
            time: at(hour, minute),
            summary: Some(summary.to_string()),
            temperature_f: Some(78.26),
            apparent_temperature_f: Some(80.0),
            precip_probability: Some(0.15),
            wind_speed_mph: Some(6.04),
            humidity: Some(0.724),
        }
    }

    #[test]
    fn test_formatters() {
        assert_eq!(format_height(Some(2.1)), "2.10 ft");
        assert_eq!(format_height(Some(-0.456)), "-0.46 ft");
        assert_eq!(format_height(None), "");
        assert_eq!(format_height(Some(f64::NAN)), "");
        assert_eq!(format_temperature(Some(78.26)), "78.3°F");
        assert_eq!(format_percent(Some(0.724)), "72%");
        assert_eq!(format_percent(Some(0.0)), "0%");
        assert_eq!(format_wind(Some(6.04)), "6.0 mph");
        assert_eq!(format_wind(None), "");
    }

    #[test]
    fn test_single_hour_scenario() {
        let hourly = vec![tide(10, 0, 2.1, None)];
        let hilo = vec![tide(10, 5, 2.3, Some(TideExtreme::High))];
        let weather = vec![
            weather(9, 3, "Cloudy"),
            weather(10, 3, "Clear"),
            weather(11, 3, "Rain"),
        ];

        let forecast = ForecastComposer::default().compose(&station(), &hourly, &hilo, &weather, at(9, 0));

        assert_eq!(forecast.rows.len(), 2);
        let first = &forecast.rows[0];
        let second = &forecast.rows[1];

        assert_eq!(first.time, "2025-07-24 10:00 AM EDT");
        assert_eq!(first.tide_event, "");
        assert_eq!(first.tide_height, "2.10 ft");
        assert_eq!(first.style, RowStyle::HourlyOdd);
        assert_eq!(first.weather_summary, "Clear");
        assert_eq!(first.weather_icon, "☀️");
        assert_eq!(first.temperature, "78.3°F");
        assert_eq!(first.precip_probability, "15%");
        assert_eq!(first.wind, "6.0 mph");
        assert_eq!(first.humidity, "72%");

        assert_eq!(second.tide_event, "H");
        assert_eq!(second.style, RowStyle::HighTide);
        assert_eq!(second.weather_summary, "Clear");

        let next_high = forecast.next_tide.next_high.as_ref().unwrap();
        assert_eq!(next_high.time, at(10, 5));
        assert!(forecast.next_tide.next_low.is_none());
        assert_eq!(
            forecast.next_tide.lines(),
            vec!["Next High Tide: 2025-07-24 10:05 AM EDT (Height: 2.30 ft)".to_string()]
        );
    }

    #[test]
    fn test_single_sample_does_not_extrapolate() {
        // Both events are within 30 minutes of the lone sample but outside
        // its [earliest, latest] range
        let hourly = vec![tide(10, 0, 2.1, None)];
        let hilo = vec![tide(10, 5, 2.3, Some(TideExtreme::High))];
        let weather = vec![weather(10, 3, "Clear")];

        let forecast = ForecastComposer::default().compose(&station(), &hourly, &hilo, &weather, at(9, 0));
        assert!(forecast.rows.iter().all(|r| r.weather_summary == NO_FORECAST));
    }

    #[test]
    fn test_no_weather_rows_use_sentinel() {
        let hourly = vec![tide(1, 0, 1.0, None), tide(2, 0, 1.2, None)];
        let forecast = ForecastComposer::default().compose(&station(), &hourly, &[], &[], at(0, 0));

        for row in &forecast.rows {
            assert_eq!(row.weather_summary, NO_FORECAST);
            assert_eq!(row.weather_icon, "🚫");
            assert!(row.temperature.is_empty());
            assert!(row.precip_probability.is_empty());
            assert!(row.wind.is_empty());
            assert!(row.humidity.is_empty());
        }
    }

    #[test]
    fn test_matched_sample_without_summary() {
        let hourly = vec![tide(10, 0, 1.0, None)];
        let mut sample = weather(10, 0, "");
        sample.summary = None;
        sample.temperature_f = None;
        let forecast = ForecastComposer::default().compose(&station(), &hourly, &[], &[sample], at(9, 0));

        let row = &forecast.rows[0];
        assert_eq!(row.weather_summary, "N/A");
        assert_eq!(row.weather_icon, "❓");
        assert_eq!(row.temperature, "");
        assert_eq!(row.wind, "6.0 mph");
    }

    #[test]
    fn test_hourly_alternation_skips_extremes() {
        let hourly = vec![
            tide(1, 0, 1.0, None),
            tide(2, 0, 1.1, None),
            tide(3, 0, 1.2, None),
            tide(4, 0, 1.3, None),
        ];
        let hilo = vec![
            tide(1, 30, 0.9, Some(TideExtreme::Low)),
            tide(3, 45, 1.4, Some(TideExtreme::High)),
        ];
        let forecast = ForecastComposer::default().compose(&station(), &hourly, &hilo, &[], at(0, 0));

        let styles: Vec<_> = forecast.rows.iter().map(|r| r.style).collect();
        assert_eq!(
            styles,
            vec![
                RowStyle::HourlyOdd,
                RowStyle::LowTide,
                RowStyle::HourlyEven,
                RowStyle::HourlyOdd,
                RowStyle::HighTide,
                RowStyle::HourlyEven,
            ]
        );
    }

    #[test]
    fn test_next_tide_ignores_past_and_present() {
        let hilo = vec![
            tide(3, 0, 2.5, Some(TideExtreme::High)),
            tide(9, 0, 0.2, Some(TideExtreme::Low)),
            tide(15, 30, 2.7, Some(TideExtreme::High)),
            tide(21, 40, 0.1, Some(TideExtreme::Low)),
        ];
        let summary = NextTideSummary::from_hilo(&hilo, at(9, 0));
        assert_eq!(summary.next_high.unwrap().time, at(15, 30));
        assert_eq!(summary.next_low.unwrap().time, at(21, 40));
    }

    #[test]
    fn test_next_tide_none_upcoming() {
        let hilo = vec![tide(3, 0, 2.5, Some(TideExtreme::High))];
        let summary = NextTideSummary::from_hilo(&hilo, at(12, 0));
        assert!(summary.is_empty());
        assert_eq!(summary.lines(), vec![NO_FUTURE_TIDES.to_string()]);
    }

    #[test]
    fn test_next_tide_line_without_height() {
        let summary = NextTideSummary {
            next_high: None,
            next_low: Some(TideHighlight {
                time: at(16, 0),
                height_ft: None,
            }),
        };
        assert_eq!(
            summary.lines(),
            vec!["Next Low Tide: 2025-07-24 04:00 PM EDT".to_string()]
        );
    }

    #[test]
    fn test_row_style_names() {
        assert_eq!(RowStyle::HighTide.as_str(), "high-tide");
        assert_eq!(RowStyle::HourlyEven.as_str(), "hourly-even");
        let json = serde_json::to_string(&RowStyle::HourlyOdd).unwrap();
        assert_eq!(json, "\"hourly-odd\"");
    }
}

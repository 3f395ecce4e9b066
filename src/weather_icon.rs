//! Weather summary text → display glyph.

use serde::Serialize;

/// Summary text used when no weather sample matches a tide event.
pub const NO_FORECAST: &str = "No forecast";

/// Icon categories, in matching priority order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WeatherIcon {
    Clear,
    PartlyCloudy,
    Cloudy,
    Rain,
    Snow,
    Thunderstorm,
    Wind,
    NoForecast,
    Unknown,
}

/// Keyword table checked top to bottom; the first category with a matching
/// keyword wins. "partly cloudy" must precede "cloudy".
const KEYWORDS: &[(WeatherIcon, &[&str])] = &[
    (WeatherIcon::Clear, &["clear", "sun"]),
    (WeatherIcon::PartlyCloudy, &["partly cloudy"]),
    (WeatherIcon::Cloudy, &["cloudy"]),
    (WeatherIcon::Rain, &["rain", "drizzle"]),
    (WeatherIcon::Snow, &["snow", "flurries"]),
    (WeatherIcon::Thunderstorm, &["thunder", "storm"]),
    (WeatherIcon::Wind, &["wind"]),
    (WeatherIcon::NoForecast, &["no forecast"]),
];

impl WeatherIcon {
    /// Classify free-text summary by case-insensitive keyword match.
    pub fn classify(summary: &str) -> Self {
        let summary = summary.to_lowercase();
        KEYWORDS
            .iter()
            .find(|(_, words)| words.iter().any(|word| summary.contains(word)))
            .map(|(icon, _)| *icon)
            .unwrap_or(WeatherIcon::Unknown)
    }

    pub fn glyph(self) -> &'static str {
        match self {
            WeatherIcon::Clear => "☀️",
            WeatherIcon::PartlyCloudy => "⛅",
            WeatherIcon::Cloudy => "☁️",
            WeatherIcon::Rain => "🌧️",
            WeatherIcon::Snow => "❄️",
            WeatherIcon::Thunderstorm => "⛈️",
            WeatherIcon::Wind => "🌬️",
            WeatherIcon::NoForecast => "🚫",
            WeatherIcon::Unknown => "❓",
        }
    }
}

//! # Forecast Table Rendering
//!
//! Renders a [`ForecastPage`] as plain text for the terminal: advisory
//! notices first, then the station heading, the next high/low tide lines,
//! and finally the merged tide-and-weather table.
//!
//! Row styles map to a one-character marker in the first column so high and
//! low tide rows stand out and hourly rows stripe:
//!
//! | Style        | Marker |
//! |--------------|--------|
//! | high-tide    | `▲`    |
//! | low-tide     | `▼`    |
//! | hourly-odd   | ` `    |
//! | hourly-even  | `·`    |

use crate::composer::{ForecastRow, RowStyle};
use crate::service::{ForecastPage, NoticeLevel};

const HEADERS: [&str; 8] = [
    "Time",
    "Tide",
    "Height",
    "Weather",
    "Temp",
    "Precip",
    "Wind",
    "Humidity",
];

fn marker(style: RowStyle) -> char {
    match style {
        RowStyle::HighTide => '▲',
        RowStyle::LowTide => '▼',
        RowStyle::HourlyOdd => ' ',
        RowStyle::HourlyEven => '·',
    }
}

fn notice_prefix(level: NoticeLevel) -> &'static str {
    match level {
        NoticeLevel::Info => "ℹ",
        NoticeLevel::Warning => "⚠",
        NoticeLevel::Error => "✖",
    }
}

fn cells(row: &ForecastRow) -> [String; 8] {
    [
        row.time.clone(),
        row.tide_event.clone(),
        row.tide_height.clone(),
        format!("{} {}", row.weather_icon, row.weather_summary),
        row.temperature.clone(),
        row.precip_probability.clone(),
        row.wind.clone(),
        row.humidity.clone(),
    ]
}

/// Render the whole page to a string.
pub fn render_page(page: &ForecastPage) -> String {
    let mut out = String::new();

    for notice in &page.notices {
        out.push_str(&format!("{} {}\n", notice_prefix(notice.level), notice.message));
    }
    if !page.notices.is_empty() {
        out.push('\n');
    }

    let station = &page.forecast.station;
    out.push_str(&format!(
        "Tide and Weather Forecast: {} ({})\n",
        station.name, station.id
    ));
    for line in page.forecast.next_tide.lines() {
        out.push_str(&format!("  {line}\n"));
    }
    out.push('\n');

    if page.forecast.rows.is_empty() {
        return out;
    }

    let table: Vec<[String; 8]> = page.forecast.rows.iter().map(cells).collect();

    // Column width is the widest of header and cells, measured in chars
    let mut widths = HEADERS.map(|h| h.chars().count());
    for row in &table {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |marker: char, cells: &[String]| {
        let mut text = String::new();
        text.push(marker);
        for (cell, width) in cells.iter().zip(widths.iter().copied()) {
            text.push_str(&format!(" {cell:<width$} "));
        }
        text.trim_end().to_string()
    };

    let header: Vec<String> = HEADERS.iter().map(|h| h.to_string()).collect();
    out.push_str(&line(' ', &header[..]));
    out.push('\n');
    let rule_width = widths.iter().map(|w| w + 2).sum::<usize>() + 1;
    out.push_str(&"─".repeat(rule_width));
    out.push('\n');

    for (row, cells) in page.forecast.rows.iter().zip(table.iter()) {
        out.push_str(&line(marker(row.style), &cells[..]));
        out.push('\n');
    }
    out
}

/// Print the rendered page to stdout.
pub fn draw_ascii(page: &ForecastPage) {
    print!("{}", render_page(page));
}

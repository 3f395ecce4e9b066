//! # Tide Weather Application Entry Point
//!
//! Loads configuration, wires the NOAA, Pirate Weather and OpenCage clients
//! into a [`ForecastService`], runs one forecast and prints it either as a
//! terminal table or as JSON.

use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use std::path::PathBuf;
use tide_weather_lib::config::{Config, CONFIG_FILE};
use tide_weather_lib::geocoding::OpenCageClient;
use tide_weather_lib::renderer::draw_ascii;
use tide_weather_lib::service::{http_client, ForecastService, Geocoder, Sources, WeatherSource};
use tide_weather_lib::tide_data::NoaaClient;
use tide_weather_lib::weather_data::PirateWeatherClient;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tide-weather", version, about = "Combined tide and hourly weather forecast")]
struct Cli {
    /// Postal code used to find the nearest NOAA station
    #[arg(short, long)]
    zip: Option<String>,

    /// Path to the TOML configuration file
    #[arg(short, long, default_value = CONFIG_FILE)]
    config: PathBuf,

    /// Print the forecast as JSON instead of a table
    #[arg(long)]
    json: bool,

    /// Write the effective configuration to --config and exit
    #[arg(long)]
    init_config: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = Config::load_from_path(&cli.config).with_env_overrides();

    if cli.init_config {
        config
            .save_to_path(&cli.config)
            .with_context(|| format!("writing {}", cli.config.display()))?;
        return Ok(());
    }

    let tz = config.forecast.timezone()?;

    // Create Tokio runtime for async operations
    let rt = tokio::runtime::Runtime::new()?;
    let http = http_client(config.forecast.request_timeout())?;

    let geocoder = config
        .api
        .opencage_key()
        .map(|key| Box::new(OpenCageClient::new(http.clone(), key)) as Box<dyn Geocoder>);
    let weather = config.api.pirate_weather_key().map(|key| {
        Box::new(PirateWeatherClient::new(http.clone(), key, tz)) as Box<dyn WeatherSource>
    });
    debug!(
        geocoding = geocoder.is_some(),
        weather = weather.is_some(),
        "configured upstream sources"
    );

    let noaa = NoaaClient::new(http, tz);
    let service = ForecastService::new(
        &config,
        Sources {
            geocoder,
            stations: Box::new(noaa.clone()),
            tides: Box::new(noaa),
            weather,
        },
    );

    let now = Utc::now().with_timezone(&tz);
    let page = rt.block_on(service.run(cli.zip.as_deref(), now));
    info!(
        station = page.station_name(),
        rows = page.forecast.rows.len(),
        notices = page.notices.len(),
        "forecast ready"
    );

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&page)?);
    } else {
        draw_ascii(&page);
    }

    Ok(())
}

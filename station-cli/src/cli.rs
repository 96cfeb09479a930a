use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use inquire::{Confirm, CustomType, Password, PasswordDisplayMode};
use log::info;
use station_core::{Config, DEFAULT_FORECAST_STEPS, ReqwestTransport, WeatherStation, locate_by_ip};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-station", version, about = "OpenWeather station")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Args)]
pub struct Location {
    /// Latitude in degrees; defaults to the configured or IP-derived position.
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<f64>,

    /// Longitude in degrees.
    #[arg(long, allow_hyphen_values = true)]
    pub lon: Option<f64>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Store the OpenWeather API key and, optionally, a fixed position.
    Configure,

    /// Show current weather.
    Current {
        #[command(flatten)]
        location: Location,

        /// Print the record as JSON.
        #[arg(long)]
        json: bool,
    },

    /// Show the 5 day / 3 hour forecast.
    Forecast {
        #[command(flatten)]
        location: Location,

        /// Number of 3-hour steps; 0 lets the provider decide.
        #[arg(long, default_value_t = DEFAULT_FORECAST_STEPS)]
        steps: u32,

        #[arg(long)]
        json: bool,
    },

    /// Print the position derived from the public IP address.
    Locate,
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Current { location, json } => {
                let mut station = station_for(&location).await?;
                let weather = station
                    .fetch_current(location.lat, location.lon)
                    .await
                    .context("Failed to retrieve weather data")?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&weather)?);
                } else {
                    println!("{}", render::current(&weather));
                }
                Ok(())
            }
            Command::Forecast { location, steps, json } => {
                let mut station = station_for(&location).await?;
                let forecast = station
                    .fetch_forecast(location.lat, location.lon, Some(steps))
                    .await
                    .context("Failed to retrieve forecast data")?;

                if json {
                    println!("{}", serde_json::to_string_pretty(&forecast)?);
                } else {
                    print!("{}", render::forecast(&forecast));
                }
                Ok(())
            }
            Command::Locate => {
                let coord = locate_by_ip(&ReqwestTransport::new())
                    .await
                    .context("Couldn't retrieve position from IP")?;
                println!("{}", render::coordinates(&coord));
                Ok(())
            }
        }
    }
}

/// Station with key and position resolved from flags, then config, then IP.
async fn station_for(location: &Location) -> Result<WeatherStation> {
    let config = Config::load()?;
    config.require_api_key()?;

    let transport = ReqwestTransport::new();
    let mut station = WeatherStation::from_config(&config, Box::new(transport.clone()));

    let has_position = station.position().is_some()
        || (location.lat.is_some() && location.lon.is_some());
    if !has_position {
        let coord = locate_by_ip(&transport)
            .await
            .context("No position configured and IP lookup failed")?;
        if let (Some(lat), Some(lon)) = (coord.latitude, coord.longitude) {
            station.set_position(lat, lon);
        }
    }

    Ok(station)
}

fn configure() -> Result<()> {
    let mut config = Config::load()?;

    let api_key = Password::new("OpenWeather API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()?;
    config.open_weather_api_key = Some(api_key.trim().to_string());

    let fixed = Confirm::new("Use a fixed position instead of IP lookup?")
        .with_default(config.position.is_some())
        .prompt()?;
    if fixed {
        let latitude = CustomType::<f64>::new("Latitude:").prompt()?;
        let longitude = CustomType::<f64>::new("Longitude:").prompt()?;
        config.set_position(latitude, longitude);
    } else {
        config.position = None;
    }

    let path = config.save()?;
    info!("Configuration written to {}", path.display());
    println!("Saved configuration to {}", path.display());
    Ok(())
}

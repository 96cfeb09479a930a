//! Core library for the `weather-station` CLI.
//!
//! This crate defines:
//! - Domain records mapped from OpenWeather JSON payloads
//! - The weather station, which fetches and accumulates observations
//! - The HTTP transport seam and its reqwest implementation
//! - Configuration & credentials handling
//!
//! It is used by `station-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod locate;
pub mod model;
pub mod station;
pub mod transport;

pub use config::{Config, Position};
pub use error::{Defect, FetchError, ModelError, TransportError};
pub use locate::locate_by_ip;
pub use model::{
    City, CityShape, Cloud, Coordinates, Parameters, Precipitation, RawObject, Weather,
    WeatherCondition, WeatherMainData, Wind,
};
pub use station::{DEFAULT_FORECAST_STEPS, WeatherStation};
pub use transport::{Endpoints, HttpResponse, HttpTransport, ReqwestTransport};

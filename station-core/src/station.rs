//! Weather station: position and credential state plus the fetched history.

use log::{debug, error, info, warn};
use serde_json::Value;

use crate::{
    Config,
    error::{Defect, FetchError, ModelError},
    model::{City, Weather},
    transport::{Endpoints, HttpTransport},
};

/// Forecast steps requested when the caller does not say otherwise.
pub const DEFAULT_FORECAST_STEPS: u32 = 15;

#[derive(Debug)]
pub struct WeatherStation {
    api_key: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    endpoints: Endpoints,
    transport: Box<dyn HttpTransport>,
    history: Vec<Weather>,
}

impl WeatherStation {
    pub fn new(transport: Box<dyn HttpTransport>) -> Self {
        Self {
            api_key: String::new(),
            latitude: None,
            longitude: None,
            endpoints: Endpoints::default(),
            transport,
            history: Vec::new(),
        }
    }

    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    /// Station seeded with the key, position and base URL found in `config`.
    pub fn from_config(config: &Config, transport: Box<dyn HttpTransport>) -> Self {
        let mut station = Self::new(transport);
        if let Some(base_url) = &config.base_url {
            station.endpoints = Endpoints::with_base_url(base_url);
        }
        if let Some(key) = config.api_key() {
            station.set_api_key(key);
        }
        if let Some(pos) = config.position {
            station.set_position(pos.latitude, pos.longitude);
        }
        station
    }

    pub fn set_api_key(&mut self, key: impl Into<String>) {
        info!("Setting API key");
        self.api_key = key.into();
    }

    pub fn set_position(&mut self, latitude: f64, longitude: f64) {
        info!("Setting latitude to {latitude} and longitude to {longitude}");
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn position(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }

    /// Every record fetched so far, in fetch order.
    pub fn history(&self) -> &[Weather] {
        &self.history
    }

    pub fn latest(&self) -> Option<&Weather> {
        self.history.last()
    }

    /// Current weather at the given (or stored) position.
    pub async fn fetch_current(
        &mut self,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Weather, FetchError> {
        info!("Get current weather data");
        let query = self.query(latitude, longitude)?;

        let body = self.get_json(&self.endpoints.current, &query).await?;
        let weather = Weather::from_value(&body).inspect_err(|e| error!("{e}"))?;

        self.history.push(weather.clone());
        Ok(weather)
    }

    /// 5 day / 3 hour forecast.
    ///
    /// `None` does not omit `cnt`: it asks for [`DEFAULT_FORECAST_STEPS`].
    /// Pass `Some(0)` to leave `cnt` out so the provider picks the window.
    pub async fn fetch_forecast(
        &mut self,
        latitude: Option<f64>,
        longitude: Option<f64>,
        step_count: Option<u32>,
    ) -> Result<Vec<Weather>, FetchError> {
        info!("Get forecast weather data");
        let mut query = self.query(latitude, longitude)?;
        let steps = step_count.unwrap_or(DEFAULT_FORECAST_STEPS);
        if steps != 0 {
            query.push(("cnt", steps.to_string()));
        }

        let body = self.get_json(&self.endpoints.forecast, &query).await?;
        let forecast = parse_forecast(&body).inspect_err(|e| error!("{e}"))?;
        debug!("Parsed {} forecast steps", forecast.len());

        self.history.extend(forecast.iter().cloned());
        Ok(forecast)
    }

    /// `lat`, `lon` and `appid`; explicit coordinates win over stored ones.
    fn query(
        &self,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Result<Vec<(&'static str, String)>, FetchError> {
        let lat = latitude.or(self.latitude);
        let lon = longitude.or(self.longitude);
        let (Some(lat), Some(lon)) = (lat, lon) else {
            error!("No position available for the request");
            return Err(FetchError::MissingPosition);
        };

        if self.api_key.is_empty() {
            warn!("No API key set, the provider will most likely refuse the request");
        }

        Ok(vec![
            ("lat", lat.to_string()),
            ("lon", lon.to_string()),
            ("appid", self.api_key.clone()),
        ])
    }

    async fn get_json(&self, url: &str, query: &[(&str, String)]) -> Result<Value, FetchError> {
        let res = self.transport.get(url, query).await.inspect_err(|e| error!("{e}"))?;

        if !res.is_success() {
            error!("Status code: {}", res.status);
            return Err(FetchError::Status {
                status: res.status,
                body: truncate_body(&res.body),
            });
        }

        Ok(serde_json::from_str(&res.body)?)
    }
}

/// Every `list` entry carries the single `city` block of the response.
fn parse_forecast(body: &Value) -> Result<Vec<Weather>, ModelError> {
    let body = body
        .as_object()
        .ok_or_else(|| ModelError::malformed("<body>", Defect::WrongType))?;

    let city = City::from_raw(body.get("city").and_then(Value::as_object));

    let list = body
        .get("list")
        .ok_or_else(|| ModelError::malformed("list", Defect::Missing))?
        .as_array()
        .ok_or_else(|| ModelError::malformed("list", Defect::WrongType))?;

    list.iter()
        .map(|entry| Weather::from_value(entry).map(|w| w.with_city(city.clone())))
        .collect()
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}

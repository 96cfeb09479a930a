//! Domain records built from OpenWeather JSON payloads.
//!
//! Each record has one constructor that reads a raw object field by field.
//! Missing keys become `None`; only the sections a [`Weather`] cannot exist
//! without (`weather`, `main`, `dt`) turn into [`ModelError::MalformedPayload`].
//!
//! See <https://openweathermap.org/current> and
//! <https://openweathermap.org/forecast5> for the payload shapes.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{Defect, ModelError};

/// Untyped JSON object as returned by the provider.
pub type RawObject = Map<String, Value>;

fn object<'a>(raw: &'a RawObject, key: &str) -> Option<&'a RawObject> {
    raw.get(key).and_then(Value::as_object)
}

fn float(raw: &RawObject, key: &str) -> Option<f64> {
    raw.get(key).and_then(Value::as_f64)
}

fn integer(raw: &RawObject, key: &str) -> Option<i64> {
    raw.get(key).and_then(Value::as_i64)
}

fn text(raw: &RawObject, key: &str) -> Option<String> {
    raw.get(key).and_then(Value::as_str).map(str::to_owned)
}

/// Like [`text`], but numbers are kept as their JSON rendering.
fn text_or_number(raw: &RawObject, key: &str) -> Option<String> {
    match raw.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn non_empty(raw: Option<&RawObject>) -> Option<&RawObject> {
    raw.filter(|r| !r.is_empty())
}

fn unix_to_utc(ts: i64) -> Option<DateTime<Utc>> {
    DateTime::from_timestamp(ts, 0)
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinates {
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

impl Coordinates {
    /// `coord` block. An absent or empty block gives `None`, not a record of nulls.
    pub fn from_raw(raw: Option<&RawObject>) -> Option<Self> {
        let raw = non_empty(raw)?;
        Some(Self {
            latitude: float(raw, "lat"),
            longitude: float(raw, "lon"),
        })
    }
}

/// Where a city object keeps its country and sun times.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CityShape {
    /// Forecast `city` block: `population`, `country`, `sunrise`, `sunset` at top level.
    Flat,
    /// Current-weather body: country and sun times live in the `sys` block.
    Nested,
}

impl CityShape {
    /// The `population` key is the only discriminator.
    pub fn of(raw: &RawObject) -> Self {
        if raw.contains_key("population") {
            CityShape::Flat
        } else {
            CityShape::Nested
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct City {
    pub id: Option<i64>,
    pub name: Option<String>,
    pub coord: Option<Coordinates>,
    pub country: Option<String>,
    pub population: Option<i64>,
    /// Shift in seconds from UTC.
    pub timezone: Option<i64>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

impl City {
    pub fn from_raw(raw: Option<&RawObject>) -> Option<Self> {
        let raw = non_empty(raw)?;
        let city = match CityShape::of(raw) {
            CityShape::Flat => Self {
                population: integer(raw, "population"),
                ..Self::located(raw, raw)
            },
            CityShape::Nested => match object(raw, "sys") {
                Some(sys) => Self::located(raw, sys),
                None => Self {
                    country: None,
                    sunrise: None,
                    sunset: None,
                    ..Self::located(raw, raw)
                },
            },
        };
        Some(city)
    }

    /// Identity fields from `raw`, country and sun times from `sun`.
    fn located(raw: &RawObject, sun: &RawObject) -> Self {
        Self {
            id: integer(raw, "id"),
            name: text(raw, "name"),
            coord: Coordinates::from_raw(object(raw, "coord")),
            country: text(sun, "country"),
            population: None,
            timezone: integer(raw, "timezone"),
            sunrise: integer(sun, "sunrise"),
            sunset: integer(sun, "sunset"),
        }
    }

    pub fn sunrise_at(&self) -> Option<DateTime<Utc>> {
        self.sunrise.and_then(unix_to_utc)
    }

    pub fn sunset_at(&self) -> Option<DateTime<Utc>> {
        self.sunset.and_then(unix_to_utc)
    }
}

/// Condition as described in <https://openweathermap.org/weather-conditions>.
///
/// Unlike the other records, missing fields default to `0` / `""`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WeatherCondition {
    pub id: i64,
    /// Group label, e.g. "Rain".
    pub group: String,
    pub description: String,
    pub icon: String,
}

impl WeatherCondition {
    pub fn from_raw(raw: &RawObject) -> Self {
        Self {
            id: integer(raw, "id").unwrap_or(0),
            group: text(raw, "main").unwrap_or_default(),
            description: text(raw, "description").unwrap_or_default(),
            icon: text(raw, "icon").unwrap_or_default(),
        }
    }

    /// First element of the `weather` list.
    pub fn first_of(list: Option<&Value>) -> Result<Self, ModelError> {
        let list = list.ok_or_else(|| ModelError::malformed("weather", Defect::Missing))?;
        let list = list
            .as_array()
            .ok_or_else(|| ModelError::malformed("weather", Defect::WrongType))?;
        let first = list
            .first()
            .ok_or_else(|| ModelError::malformed("weather", Defect::Empty))?;
        let first = first
            .as_object()
            .ok_or_else(|| ModelError::malformed("weather[0]", Defect::WrongType))?;
        Ok(Self::from_raw(first))
    }
}

/// The `sys` block.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Parameters {
    pub kind: Option<i64>,
    pub id: Option<i64>,
    pub message: Option<String>,
    /// Part of day, `d` or `n` (forecast entries only).
    pub pod: Option<String>,
    pub country: Option<String>,
    pub sunrise: Option<i64>,
    pub sunset: Option<i64>,
}

impl Parameters {
    pub fn from_raw(raw: Option<&RawObject>) -> Option<Self> {
        let raw = raw?;
        Some(Self {
            kind: integer(raw, "type"),
            id: integer(raw, "id"),
            message: text_or_number(raw, "message"),
            pod: text(raw, "pod"),
            country: text(raw, "country"),
            sunrise: integer(raw, "sunrise"),
            sunset: integer(raw, "sunset"),
        })
    }
}

/// The `main` block. Temperatures stay in whatever units the request asked for.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeatherMainData {
    pub temp: Option<f64>,
    pub feels_like: Option<f64>,
    pub temp_min: Option<f64>,
    pub temp_max: Option<f64>,
    /// hPa
    pub pressure: Option<f64>,
    /// %
    pub humidity: Option<f64>,
    pub sea_level: Option<f64>,
    pub grnd_level: Option<f64>,
    pub temp_kf: Option<f64>,
}

impl WeatherMainData {
    pub fn from_raw(raw: Option<&RawObject>) -> Option<Self> {
        let raw = raw?;
        Some(Self {
            temp: float(raw, "temp"),
            feels_like: float(raw, "feels_like"),
            temp_min: float(raw, "temp_min"),
            temp_max: float(raw, "temp_max"),
            pressure: float(raw, "pressure"),
            humidity: float(raw, "humidity"),
            sea_level: float(raw, "sea_level"),
            grnd_level: float(raw, "grnd_level"),
            temp_kf: float(raw, "temp_kf"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Wind {
    pub speed: Option<f64>,
    /// Meteorological degrees.
    pub deg: Option<f64>,
    pub gust: Option<f64>,
}

impl Wind {
    pub fn from_raw(raw: Option<&RawObject>) -> Option<Self> {
        let raw = raw?;
        Some(Self {
            speed: float(raw, "speed"),
            deg: float(raw, "deg"),
            gust: float(raw, "gust"),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Cloud {
    /// Cloudiness, %.
    pub all: Option<i64>,
}

impl Cloud {
    pub fn from_raw(raw: Option<&RawObject>) -> Option<Self> {
        raw.map(|raw| Self { all: integer(raw, "all") })
    }
}

/// Rain or snow volume for the last hour, mm.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Precipitation {
    pub value: Option<f64>,
}

impl Precipitation {
    /// `rain` / `snow` entry; its `1h` member is the amount.
    pub fn from_raw(raw: Option<&Value>) -> Option<Self> {
        let raw = raw?;
        Some(Self {
            value: raw.as_object().and_then(|block| float(block, "1h")),
        })
    }
}

/// One observation: a current-weather body or a single forecast step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Weather {
    pub condition: WeatherCondition,
    pub base: Option<String>,
    pub main: Option<WeatherMainData>,
    /// Meters.
    pub visibility: Option<f64>,
    pub wind: Option<Wind>,
    pub clouds: Option<Cloud>,
    pub rain: Option<Precipitation>,
    pub snow: Option<Precipitation>,
    /// Time of data calculation, unix seconds.
    pub timestamp: i64,
    pub sys: Option<Parameters>,
    /// Probability of precipitation, 0..=1.
    pub pop: Option<f64>,
    pub city: Option<City>,
}

impl Weather {
    pub fn from_raw(raw: &RawObject) -> Result<Self, ModelError> {
        let condition = WeatherCondition::first_of(raw.get("weather"))?;

        let main = raw
            .get("main")
            .ok_or_else(|| ModelError::malformed("main", Defect::Missing))?
            .as_object()
            .ok_or_else(|| ModelError::malformed("main", Defect::WrongType))?;

        let timestamp = raw
            .get("dt")
            .ok_or_else(|| ModelError::malformed("dt", Defect::Missing))?
            .as_i64()
            .ok_or_else(|| ModelError::malformed("dt", Defect::WrongType))?;

        Ok(Self {
            condition,
            base: text(raw, "base"),
            main: WeatherMainData::from_raw(Some(main)),
            visibility: float(raw, "visibility"),
            wind: Wind::from_raw(object(raw, "wind")),
            clouds: Cloud::from_raw(object(raw, "clouds")),
            rain: Precipitation::from_raw(raw.get("rain")),
            snow: Precipitation::from_raw(raw.get("snow")),
            timestamp,
            sys: Parameters::from_raw(object(raw, "sys")),
            pop: float(raw, "pop"),
            city: City::from_raw(Some(raw)),
        })
    }

    /// Entry point for a whole response body or a `list` element.
    pub fn from_value(value: &Value) -> Result<Self, ModelError> {
        let raw = value
            .as_object()
            .ok_or_else(|| ModelError::malformed("<body>", Defect::WrongType))?;
        Self::from_raw(raw)
    }

    pub fn with_city(self, city: Option<City>) -> Self {
        Self { city, ..self }
    }

    pub fn observed_at(&self) -> Option<DateTime<Utc>> {
        unix_to_utc(self.timestamp)
    }
}

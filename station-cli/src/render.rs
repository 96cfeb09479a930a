use chrono::{DateTime, Utc};
use station_core::{Coordinates, Weather};

fn stamp(at: Option<DateTime<Utc>>) -> String {
    at.map(|t| t.format("%Y-%m-%d %H:%M UTC").to_string())
        .unwrap_or_else(|| "unknown time".to_string())
}

fn opt(value: Option<f64>, unit: &str) -> String {
    value.map_or_else(|| "n/a".to_string(), |v| format!("{v:.1}{unit}"))
}

pub fn coordinates(coord: &Coordinates) -> String {
    format!("lat {}, lon {}", opt(coord.latitude, ""), opt(coord.longitude, ""))
}

fn place(weather: &Weather) -> String {
    let Some(city) = &weather.city else {
        return "unknown location".to_string();
    };
    match (&city.name, &city.country) {
        (Some(name), Some(country)) => format!("{name}, {country}"),
        (Some(name), None) => name.clone(),
        _ => city.coord.as_ref().map_or_else(|| "unknown location".to_string(), coordinates),
    }
}

/// One observation, a few lines.
pub fn current(weather: &Weather) -> String {
    let main = weather.main.as_ref();
    let mut out = format!(
        "{} at {}\n  {} ({})\n  temperature {} (feels like {})\n  humidity {}",
        place(weather),
        stamp(weather.observed_at()),
        weather.condition.group,
        weather.condition.description,
        opt(main.and_then(|m| m.temp), " K"),
        opt(main.and_then(|m| m.feels_like), " K"),
        opt(main.and_then(|m| m.humidity), "%"),
    );

    if let Some(wind) = &weather.wind {
        out.push_str(&format!("\n  wind {}", opt(wind.speed, " m/s")));
    }
    if let Some(rain) = weather.rain {
        out.push_str(&format!("\n  rain {}", opt(rain.value, " mm/h")));
    }
    if let Some(snow) = weather.snow {
        out.push_str(&format!("\n  snow {}", opt(snow.value, " mm/h")));
    }
    out
}

/// One line per forecast step, in the order received.
pub fn forecast(steps: &[Weather]) -> String {
    let Some(first) = steps.first() else {
        return "No forecast data.\n".to_string();
    };

    let mut out = format!("Forecast for {}\n", place(first));
    for w in steps {
        out.push_str(&format!(
            "  {}  {:<12} {:>9}  pop {}\n",
            stamp(w.observed_at()),
            w.condition.group,
            opt(w.main.as_ref().and_then(|m| m.temp), " K"),
            w.pop.map_or_else(|| "n/a".to_string(), |p| format!("{:.0}%", p * 100.0)),
        ));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> Weather {
        Weather::from_value(&json!({
            "weather": [{ "id": 500, "main": "Rain", "description": "light rain" }],
            "main": { "temp": 284.25, "humidity": 60 },
            "rain": { "1h": 2.5 },
            "dt": 0,
            "name": "Montreal",
            "sys": { "country": "CA" },
            "pop": 0.5
        }))
        .unwrap()
    }

    #[test]
    fn current_mentions_place_and_condition() {
        let text = current(&sample());
        assert!(text.starts_with("Montreal, CA at 1970-01-01 00:00 UTC"));
        assert!(text.contains("Rain (light rain)"));
        assert!(text.contains("temperature 284.2 K") || text.contains("temperature 284.3 K"));
        assert!(text.contains("rain 2.5 mm/h"));
        assert!(!text.contains("snow"));
    }

    #[test]
    fn forecast_lists_each_step() {
        let text = forecast(&[sample(), sample()]);
        assert!(text.starts_with("Forecast for Montreal, CA\n"));
        assert_eq!(text.lines().count(), 3);
        assert!(text.contains("pop 50%"));
        assert_eq!(forecast(&[]), "No forecast data.\n");
    }
}

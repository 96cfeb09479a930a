use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{env, fs, path::PathBuf};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPEN_WEATHER_API_KEY";

/// Fixed station position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub latitude: f64,
    pub longitude: f64,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// open_weather_api_key = "..."
///
/// [position]
/// latitude = 45.5
/// longitude = -73.6
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    pub open_weather_api_key: Option<String>,

    /// When absent, the CLI looks the position up from the public IP.
    pub position: Option<Position>,

    /// Overrides `https://api.openweathermap.org/data/2.5`.
    pub base_url: Option<String>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            // First run: no config file, return empty.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<PathBuf> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(path)
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-station", "weather-station")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Option<String> {
        pick_key(env::var(API_KEY_ENV).ok(), self.open_weather_api_key.as_ref())
    }

    pub fn require_api_key(&self) -> Result<String> {
        self.api_key().ok_or_else(|| {
            anyhow!(
                "No OpenWeather API key configured.\n\
                 Hint: run `weather-station configure` or set {API_KEY_ENV}."
            )
        })
    }

    pub fn set_position(&mut self, latitude: f64, longitude: f64) {
        self.position = Some(Position { latitude, longitude });
    }
}

/// A non-empty environment value wins over the stored key.
fn pick_key(env: Option<String>, stored: Option<&String>) -> Option<String> {
    env.filter(|key| !key.is_empty()).or_else(|| stored.cloned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_full_file() {
        let cfg = Config::from_toml(
            r#"
            open_weather_api_key = "KEY"
            base_url = "http://localhost:9000"

            [position]
            latitude = 45.0
            longitude = -73.0
            "#,
        )
        .expect("valid config");

        assert_eq!(cfg.open_weather_api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.position, Some(Position { latitude: 45.0, longitude: -73.0 }));
        assert_eq!(cfg.base_url.as_deref(), Some("http://localhost:9000"));
    }

    #[test]
    fn empty_file_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn toml_roundtrip_keeps_position() {
        let mut cfg = Config::default();
        cfg.set_position(10.5, 20.25);

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn rejects_malformed_position() {
        let err = Config::from_toml("[position]\nlatitude = \"north\"").unwrap_err();
        assert!(!err.to_string().is_empty());
    }

    #[test]
    fn environment_key_overrides_stored_key() {
        let stored = "STORED".to_string();
        assert_eq!(pick_key(Some("FROM_ENV".into()), Some(&stored)).as_deref(), Some("FROM_ENV"));
        assert_eq!(pick_key(Some("FROM_ENV".into()), None).as_deref(), Some("FROM_ENV"));
    }

    #[test]
    fn empty_environment_key_falls_back_to_stored() {
        let stored = "STORED".to_string();
        assert_eq!(pick_key(Some(String::new()), Some(&stored)).as_deref(), Some("STORED"));
        assert_eq!(pick_key(None, Some(&stored)).as_deref(), Some("STORED"));
    }

    #[test]
    fn no_key_anywhere() {
        assert_eq!(pick_key(None, None), None);
        assert_eq!(pick_key(Some(String::new()), None), None);
    }
}

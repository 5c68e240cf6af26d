use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
};

use crate::{
    api::{DEFAULT_BASE_URL, DEFAULT_LANGUAGE, DEFAULT_UNITS, OpenWeatherClient},
    format::DateFormatter,
};

/// Environment variable that takes precedence over the stored API key.
pub const API_KEY_ENV: &str = "OPENWEATHER_API_KEY";

/// City shown when no name or position is given.
pub const FALLBACK_CITY: &str = "Moscow";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Kazan"
/// utc_offset_seconds = 10800
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Response language requested from the API.
    pub language: String,
    pub units: String,
    pub default_city: String,
    /// Display offset used when a response does not carry the location's own.
    pub utc_offset_seconds: i32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            language: DEFAULT_LANGUAGE.to_string(),
            units: DEFAULT_UNITS.to_string(),
            default_city: FALLBACK_CITY.to_string(),
            utc_offset_seconds: 0,
        }
    }
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::parse(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(contents)?;
        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key);
    }

    /// API key from the environment, falling back to the stored one.
    pub fn api_key(&self) -> Option<String> {
        Self::resolve_api_key(std::env::var(API_KEY_ENV).ok(), self.api_key.as_deref())
    }

    fn resolve_api_key(from_env: Option<String>, stored: Option<&str>) -> Option<String> {
        from_env
            .filter(|key| !key.trim().is_empty())
            .or_else(|| stored.map(str::to_string))
            .filter(|key| !key.trim().is_empty())
    }

    pub fn is_configured(&self) -> bool {
        self.api_key().is_some()
    }

    /// Build the HTTP client described by this config.
    pub fn client(&self) -> Result<OpenWeatherClient> {
        let api_key = self.api_key().ok_or_else(|| {
            anyhow!(
                "No API key configured.\n\
                 Hint: run `weather configure` or set {API_KEY_ENV}."
            )
        })?;

        Ok(OpenWeatherClient::new(api_key)
            .base_url(&self.base_url)
            .units(&self.units)
            .language(&self.language))
    }

    pub fn date_formatter(&self) -> DateFormatter {
        DateFormatter::from_offset_seconds(Some(self.utc_offset_seconds), DateFormatter::utc())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_target_metric_russian_moscow() {
        let cfg = Config::default();

        assert_eq!(cfg.units, "metric");
        assert_eq!(cfg.language, "ru");
        assert_eq!(cfg.default_city, "Moscow");
        assert_eq!(cfg.base_url, "https://api.openweathermap.org");
    }

    #[test]
    fn partial_file_fills_in_defaults() {
        let cfg = Config::parse("api_key = \"KEY\"\ndefault_city = \"Kazan\"\n").unwrap();

        assert_eq!(cfg.api_key.as_deref(), Some("KEY"));
        assert_eq!(cfg.default_city, "Kazan");
        assert_eq!(cfg.language, "ru");
        assert_eq!(cfg.utc_offset_seconds, 0);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(Config::parse("api_key = ").is_err());
    }

    #[test]
    fn environment_key_wins_over_stored_key() {
        assert_eq!(
            Config::resolve_api_key(Some("ENV".into()), Some("FILE")),
            Some("ENV".to_string())
        );
        assert_eq!(Config::resolve_api_key(Some("  ".into()), Some("FILE")), Some("FILE".to_string()));
        assert_eq!(Config::resolve_api_key(None, Some("")), None);
        assert_eq!(Config::resolve_api_key(None, None), None);
    }

    #[test]
    fn save_and_load_round_trip_through_a_file() {
        let dir = std::env::temp_dir().join(format!("weather-core-config-{}", std::process::id()));
        let path = dir.join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        cfg.default_city = "Sochi".into();
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, cfg);

        fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn missing_file_loads_defaults() {
        let path = std::env::temp_dir().join("weather-core-does-not-exist/config.toml");
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }

    #[test]
    fn client_builds_with_stored_key() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".into());
        assert!(cfg.is_configured());
        assert!(cfg.client().is_ok());
    }

    #[test]
    fn offset_feeds_the_date_formatter() {
        let cfg = Config { utc_offset_seconds: 3 * 3600, ..Config::default() };
        assert_eq!(cfg.date_formatter().offset().local_minus_utc(), 10800);
    }
}

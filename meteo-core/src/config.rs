use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{model::Coordinates, units::UnitSystem};

/// Upstream endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub geocoding_url: String,
    pub forecast_url: String,
    /// Passed straight through as the forecast `timezone` parameter.
    pub timezone: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            geocoding_url: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            forecast_url: "https://api.open-meteo.com/v1/forecast".to_string(),
            timezone: "auto".to_string(),
        }
    }
}

/// Tuning knobs. Durations are stored as plain integers so the TOML stays
/// readable; use the accessor methods to get a [`Duration`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub search_delay_ms: u64,
    pub suggestion_hide_delay_ms: u64,
    pub forecast_days: usize,
    pub hourly_forecast_hours: usize,
    pub cache_duration_secs: u64,
    pub cache_capacity: usize,
    pub geolocation_timeout_ms: u64,
    pub request_timeout_ms: u64,
    pub health_timeout_ms: u64,
    pub max_search_results: usize,
    pub refresh_after_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            search_delay_ms: 500,
            suggestion_hide_delay_ms: 150,
            forecast_days: 7,
            hourly_forecast_hours: 24,
            cache_duration_secs: 10 * 60,
            cache_capacity: 10,
            geolocation_timeout_ms: 10_000,
            request_timeout_ms: 10_000,
            health_timeout_ms: 5_000,
            max_search_results: 5,
            refresh_after_secs: 5 * 60,
        }
    }
}

impl Settings {
    pub fn search_delay(&self) -> Duration {
        Duration::from_millis(self.search_delay_ms)
    }

    pub fn suggestion_hide_delay(&self) -> Duration {
        Duration::from_millis(self.suggestion_hide_delay_ms)
    }

    pub fn cache_duration(&self) -> Duration {
        Duration::from_secs(self.cache_duration_secs)
    }

    pub fn geolocation_timeout(&self) -> Duration {
        Duration::from_millis(self.geolocation_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn refresh_after(&self) -> Duration {
        Duration::from_secs(self.refresh_after_secs)
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// default_city = "Berlin"
/// preferred_unit = "fahrenheit"
///
/// [settings]
/// cache_duration_secs = 300
///
/// [home]
/// latitude = 52.52
/// longitude = 13.41
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Shown when there is no remembered location.
    pub default_city: String,

    /// Initial unit, used until the user picks one.
    pub preferred_unit: UnitSystem,

    pub api: ApiConfig,
    pub settings: Settings,

    /// Fixed position reported as "my location".
    pub home: Option<Coordinates>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_city: "London".to_string(),
            preferred_unit: UnitSystem::default(),
            api: ApiConfig::default(),
            settings: Settings::default(),
            home: None,
        }
    }
}

impl Config {
    /// Load config from disk, or return the defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        Self::from_file(&path)
    }

    pub fn from_file(path: &std::path::Path) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;
        self.save_to(&path)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
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
        let dirs = ProjectDirs::from("dev", "meteo", "meteo")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn set_home(&mut self, latitude: f64, longitude: f64) -> Result<()> {
        if !(-90.0..=90.0).contains(&latitude) || !(-180.0..=180.0).contains(&longitude) {
            return Err(anyhow!(
                "Coordinates out of range: latitude must be within ±90, longitude within ±180."
            ));
        }

        self.home = Some(Coordinates::new(latitude, longitude));
        Ok(())
    }
}

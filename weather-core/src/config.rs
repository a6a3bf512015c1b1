use anyhow::{Context, Result, anyhow, bail};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use crate::provider::{mapsco, openmeteo};

/// Forecast day counts the service accepts.
pub const FORECAST_DAYS: std::ops::RangeInclusive<u8> = 3..=7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory served for paths no route matches.
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            static_dir: Some(PathBuf::from("public")),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForecastConfig {
    pub base_url: String,
    pub forecast_days: u8,
    /// Keep only the first `n` entries of every daily array; 0 keeps all.
    pub daily_window: usize,
}

impl Default for ForecastConfig {
    fn default() -> Self {
        Self {
            base_url: openmeteo::DEFAULT_BASE_URL.to_string(),
            forecast_days: 3,
            daily_window: 2,
        }
    }
}

impl ForecastConfig {
    pub fn window(&self) -> Option<usize> {
        (self.daily_window > 0).then_some(self.daily_window)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeocodeConfig {
    pub base_url: String,
    pub api_key: Option<String>,
}

impl Default for GeocodeConfig {
    fn default() -> Self {
        Self { base_url: mapsco::DEFAULT_BASE_URL.to_string(), api_key: None }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Upper bound for every single upstream call.
    pub timeout_secs: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

impl UpstreamConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchLogConfig {
    /// e.g. `sqlite:weather.db`. Search logging is off when unset.
    pub database_url: Option<String>,
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// [geocode]
/// api_key = "..."
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub forecast: ForecastConfig,
    pub geocode: GeocodeConfig,
    pub upstream: UpstreamConfig,
    pub search_log: SearchLogConfig,
}

impl Config {
    /// Load config from the platform config directory, or defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    /// Load config from `path`, or defaults if it doesn't exist.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            // First run: no config file, return defaults.
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

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
        let dirs = ProjectDirs::from("dev", "weather-task", "weather-server")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Override values from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| std::env::var(key).ok())
    }

    /// Override values from `lookup`, keyed by environment variable name.
    ///
    /// Recognised: `HOST`, `PORT`, `GEOCODE_MAPS_CO_API_KEY`,
    /// `SEARCH_LOG_DATABASE_URL`. Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(host) = get("HOST") {
            self.server.host = host;
        }
        if let Some(port) = get("PORT") {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("PORT is not a valid port number: {port}"))?;
        }
        if let Some(key) = get("GEOCODE_MAPS_CO_API_KEY") {
            self.set_geocode_api_key(key);
        }
        if let Some(url) = get("SEARCH_LOG_DATABASE_URL") {
            self.search_log.database_url = Some(url);
        }

        Ok(())
    }

    /// Reject settings the service cannot run with.
    pub fn validate(&self) -> Result<()> {
        if !FORECAST_DAYS.contains(&self.forecast.forecast_days) {
            bail!(
                "forecast.forecast_days must be between {} and {}, got {}",
                FORECAST_DAYS.start(),
                FORECAST_DAYS.end(),
                self.forecast.forecast_days
            );
        }
        if self.upstream.timeout_secs == 0 {
            bail!("upstream.timeout_secs must be at least 1");
        }
        Ok(())
    }

    pub fn set_geocode_api_key(&mut self, api_key: String) {
        self.geocode.api_key = Some(api_key);
    }

    /// Returns the geocoding API key, if present.
    pub fn geocode_api_key(&self) -> Option<&str> {
        self.geocode.api_key.as_deref().filter(|k| !k.is_empty())
    }

    /// Search log database, if one is configured.
    pub fn search_log_url(&self) -> Option<&str> {
        self.search_log.database_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> =
            pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_match_the_deployed_service() {
        let cfg = Config::default();

        assert_eq!(cfg.server.port, 3000);
        assert_eq!(cfg.forecast.forecast_days, 3);
        assert_eq!(cfg.forecast.window(), Some(2));
        assert_eq!(cfg.upstream.timeout(), Duration::from_secs(10));
        assert!(cfg.geocode_api_key().is_none());
        assert!(cfg.search_log_url().is_none());
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[forecast]\nforecast_days = 7\n\n[geocode]\napi_key = \"KEY\"\n").unwrap();

        let cfg = Config::load_from(&path).unwrap();

        assert_eq!(cfg.forecast.forecast_days, 7);
        assert_eq!(cfg.forecast.window(), Some(2));
        assert_eq!(cfg.geocode_api_key(), Some("KEY"));
        assert_eq!(cfg.server, ServerConfig::default());
    }

    #[test]
    fn save_then_load_preserves_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_geocode_api_key("SECRET".into());
        cfg.search_log.database_url = Some("sqlite:weather.db".into());
        cfg.save_to(&path).unwrap();

        assert_eq!(Config::load_from(&path).unwrap(), cfg);
    }

    #[test]
    fn malformed_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "[server\nport = ").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn environment_overrides_file_values() {
        let mut cfg = Config::default();
        cfg.apply_overrides(env(&[
            ("PORT", "8080"),
            ("GEOCODE_MAPS_CO_API_KEY", "ENV_KEY"),
            ("SEARCH_LOG_DATABASE_URL", "sqlite::memory:"),
            ("HOST", ""),
        ]))
        .unwrap();

        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.server.host, "0.0.0.0");
        assert_eq!(cfg.geocode_api_key(), Some("ENV_KEY"));
        assert_eq!(cfg.search_log_url(), Some("sqlite::memory:"));
    }

    #[test]
    fn zero_window_keeps_every_day() {
        let mut cfg = Config::default();
        cfg.forecast.daily_window = 0;
        assert_eq!(cfg.forecast.window(), None);
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn invalid_port_is_rejected() {
        let mut cfg = Config::default();
        let err = cfg.apply_overrides(env(&[("PORT", "eighty")])).unwrap_err();
        assert!(err.to_string().contains("PORT"));
    }

    #[test]
    fn validate_rejects_out_of_range_settings() {
        let mut cfg = Config::default();
        cfg.forecast.forecast_days = 8;
        assert!(cfg.validate().unwrap_err().to_string().contains("forecast_days"));

        let mut cfg = Config::default();
        cfg.forecast.forecast_days = 2;
        assert!(cfg.validate().is_err());

        let mut cfg = Config::default();
        cfg.upstream.timeout_secs = 0;
        assert!(cfg.validate().is_err());
    }
}

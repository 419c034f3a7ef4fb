use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf, time::Duration};

use crate::{controller::ScreenSettings, provider::weatherapi::DEFAULT_BASE_URL};

/// Environment variable that overrides the API key stored on disk.
pub const API_KEY_ENV: &str = "WEATHERAPI_KEY";

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// api_key = "..."
/// default_city = "Yangon"
/// debounce_ms = 1200
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// weatherapi.com key.
    pub api_key: Option<String>,
    pub base_url: String,
    pub timeout_secs: u64,
    /// City shown when no city has been picked yet.
    pub default_city: String,
    /// Forecast horizon in days.
    pub forecast_days: u8,
    /// Quiet interval for the search box.
    pub debounce_ms: u64,
    /// Queries shorter than this never reach the network.
    pub min_query_chars: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: 30,
            default_city: "Yangon".to_string(),
            forecast_days: 7,
            debounce_ms: 1200,
            min_query_chars: 3,
        }
    }
}

impl Config {
    /// API key from the environment, falling back to the config file. Blank keys count as missing.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(API_KEY_ENV)
            .ok()
            .or_else(|| self.api_key.clone())
            .filter(|key| !key.trim().is_empty())
    }

    pub fn set_api_key(&mut self, api_key: String) {
        self.api_key = Some(api_key.trim().to_string());
    }

    pub fn debounce_interval(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    pub fn screen_settings(&self) -> ScreenSettings {
        ScreenSettings {
            default_city: self.default_city.clone(),
            forecast_days: self.forecast_days,
            min_query_chars: self.min_query_chars,
        }
    }

    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
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
        Ok(project_dirs()?.config_dir().join("config.toml"))
    }
}

pub(crate) fn project_dirs() -> Result<ProjectDirs> {
    ProjectDirs::from("dev", "forecast-screen", "forecast")
        .ok_or_else(|| anyhow!("Could not determine platform config directory"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_screen_behaviour() {
        let cfg = Config::default();

        assert_eq!(cfg.default_city, "Yangon");
        assert_eq!(cfg.forecast_days, 7);
        assert_eq!(cfg.debounce_interval(), Duration::from_millis(1200));
        assert_eq!(cfg.min_query_chars, 3);
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: Config = toml::from_str("default_city = \"Tokyo\"").unwrap();

        assert_eq!(cfg.default_city, "Tokyo");
        assert_eq!(cfg.base_url, DEFAULT_BASE_URL);
        assert_eq!(cfg.forecast_days, 7);
    }

    #[test]
    fn save_and_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut cfg = Config::default();
        cfg.set_api_key("  SECRET  ".into());
        cfg.debounce_ms = 500;
        cfg.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.api_key.as_deref(), Some("SECRET"));
        assert_eq!(loaded.debounce_ms, 500);
    }

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let cfg = Config::load_from(&dir.path().join("absent.toml")).unwrap();

        assert!(cfg.api_key.is_none());
    }

    #[test]
    fn screen_settings_projection() {
        let cfg = Config { default_city: "Lima".into(), forecast_days: 3, ..Config::default() };
        let settings = cfg.screen_settings();

        assert_eq!(settings.default_city, "Lima");
        assert_eq!(settings.forecast_days, 3);
        assert_eq!(settings.min_query_chars, 3);
    }
}

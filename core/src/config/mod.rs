use crate::error::ConfigurationError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

const AIRA_DIR: &str = ".aira";
const AIRA_HOME_ENV: &str = "AIRA_HOME";

pub const DEFAULT_WEATHER_URL: &str = "https://api.open-meteo.com/v1/forecast";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueueConfig {
    pub poll_interval_ms: u64,
    pub pattern: String,
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 1000,
            pattern: crate::queue::DEFAULT_PATTERN.to_string(),
        }
    }
}

impl QueueConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct WeatherConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_WEATHER_URL.to_string(),
            timeout_secs: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub log_level: String,
    pub workspace_dir: PathBuf,
    pub queue: QueueConfig,
    pub weather: WeatherConfig,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "info".to_string(),
            workspace_dir: get_aira_dir().join("workspace"),
            queue: QueueConfig::default(),
            weather: WeatherConfig::default(),
        }
    }
}

/// `$AIRA_HOME`, or `~/.aira`.
pub fn get_aira_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(AIRA_HOME_ENV)
        && !dir.is_empty()
    {
        return PathBuf::from(dir);
    }
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(AIRA_DIR)
}

pub fn get_config_path() -> PathBuf {
    get_aira_dir().join("config.toml")
}

pub fn ensure_aira_dir() -> Result<PathBuf, ConfigurationError> {
    let aira_dir = get_aira_dir();

    if !aira_dir.exists() {
        std::fs::create_dir_all(&aira_dir).map_err(|e| {
            ConfigurationError::with_source(
                format!("Failed to create aira directory at {}", aira_dir.display()),
                e,
            )
        })?;
    }

    Ok(aira_dir)
}

impl Config {
    pub fn load_or_init() -> Result<Self, ConfigurationError> {
        if config_exists() {
            load_config()
        } else {
            Ok(Config::default())
        }
    }

    pub fn load_from(path: &Path) -> Result<Self, ConfigurationError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigurationError::with_source(
                    "Config file not found. Run 'aira init' to set up your configuration.",
                    e,
                )
            } else {
                ConfigurationError::with_source(
                    format!("Failed to read config from {}", path.display()),
                    e,
                )
            }
        })?;

        toml::from_str(&content).map_err(|e| {
            ConfigurationError::with_source(
                format!("Failed to parse config from {}", path.display()),
                e,
            )
        })
    }

    pub fn save_to(&self, path: &Path) -> Result<(), ConfigurationError> {
        let content = toml::to_string_pretty(self).map_err(|e| {
            ConfigurationError::with_source("Failed to serialize config to TOML", e)
        })?;

        std::fs::write(path, content).map_err(|e| {
            ConfigurationError::with_source(
                format!("Failed to write config to {}", path.display()),
                e,
            )
        })
    }
}

pub fn load_config() -> Result<Config, ConfigurationError> {
    Config::load_from(&get_config_path())
}

pub fn save_config(config: &Config) -> Result<(), ConfigurationError> {
    ensure_aira_dir()?;
    config.save_to(&get_config_path())
}

pub fn config_exists() -> bool {
    get_config_path().exists()
}

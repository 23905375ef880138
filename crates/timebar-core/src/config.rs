//! Application configuration.
//!
//! Built once at startup and handed by reference to every component. Values
//! come from `<config_dir>/timebar/settings.json` (all fields optional), then
//! environment overrides.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::credentials::DEFAULT_CREDENTIALS_PATH;
use crate::menubar::MenuBarOptions;

pub const DEFAULT_API_URL: &str = "http://localhost:3000/api/v2";

/// Environment variable overriding [`Config::api_url`]
pub const API_URL_ENV: &str = "TIMEBAR_API_URL";
/// Environment variable overriding [`Config::credentials_path`]
pub const CREDENTIALS_ENV: &str = "TIMEBAR_CREDENTIALS";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read settings {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("malformed settings {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("invalid API URL '{0}': must start with http:// or https://")]
    InvalidApiUrl(String),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the time-tracking API, without trailing slash
    pub api_url: String,
    pub credentials_path: PathBuf,
    pub request_timeout_secs: u64,
    pub poll: PollSettings,
    pub menubar: MenuBarOptions,
}

/// Poller intervals
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// How often the active timer is requested
    pub check_interval_ms: u64,
    /// How often elapsed time is recomputed and sent
    pub emit_interval_ms: u64,
    /// How often the day's time entries are refreshed
    pub entries_interval_secs: u64,
    /// Day whose entries are listed (today when unset)
    pub entries_date: Option<NaiveDate>,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            check_interval_ms: 1000,
            emit_interval_ms: 1000,
            entries_interval_secs: 30,
            entries_date: None,
        }
    }
}

impl PollSettings {
    pub fn check_interval(&self) -> Duration {
        Duration::from_millis(self.check_interval_ms.max(1))
    }

    pub fn emit_interval(&self) -> Duration {
        Duration::from_millis(self.emit_interval_ms.max(1))
    }

    pub fn entries_interval(&self) -> Duration {
        Duration::from_secs(self.entries_interval_secs.max(1))
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials_path: PathBuf::from(DEFAULT_CREDENTIALS_PATH),
            request_timeout_secs: 10,
            poll: PollSettings::default(),
            menubar: MenuBarOptions::default(),
        }
    }
}

impl Config {
    /// Default settings file location
    pub fn settings_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("timebar")
            .join("settings.json")
    }

    /// Load from the default settings file, `.env` and the environment
    pub fn load() -> Result<Self, ConfigError> {
        // A missing .env is normal
        let _ = dotenvy::dotenv();
        let mut config = Self::from_file(&Self::settings_path())?;
        config.apply_env(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    /// Read a settings file; a missing file yields defaults
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!("no settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Io {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };

        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Apply overrides from a variable lookup
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup(API_URL_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_url = url;
        }
        if let Some(path) = lookup(CREDENTIALS_ENV).filter(|v| !v.trim().is_empty()) {
            self.credentials_path = PathBuf::from(path);
        }
    }

    /// Check and normalize the API URL
    pub fn validate(&mut self) -> Result<(), ConfigError> {
        let trimmed = self.api_url.trim();
        if !trimmed.starts_with("http://") && !trimmed.starts_with("https://") {
            return Err(ConfigError::InvalidApiUrl(self.api_url.clone()));
        }
        self.api_url = trimmed.trim_end_matches('/').to_string();
        Ok(())
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

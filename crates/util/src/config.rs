//! On-disk configuration for srcbatch.
//!
//! The file is optional JSON stored in the standard configuration directory
//! (`~/.config/srcbatch/config.json` on most platforms). It only carries poll
//! policy overrides; connection settings come from the environment.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::parse_duration;
use dirs_next::{config_dir, home_dir};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

/// Environment variable allowing callers to override the config file path.
pub const CONFIG_PATH_ENV: &str = "SRCBATCH_CONFIG_PATH";

/// Default filename for the JSON payload.
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Error surfaced when reading the configuration fails.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// I/O failure other than a missing file.
    #[error("config I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// A duration field could not be parsed.
    #[error("invalid duration for '{field}': '{value}' (expected e.g. 5s, 2m, 1h)")]
    InvalidDuration { field: &'static str, value: String },
}

/// Persisted configuration values.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub poll: PollSettings,
}

/// Poll policy overrides. Every field is optional; unset fields keep the
/// built-in defaults.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PollSettings {
    /// Delay between resolution polls, e.g. `"5s"`.
    pub interval: Option<String>,
    /// Overall deadline for the polling phase, e.g. `"30m"`.
    pub timeout: Option<String>,
    /// Upper bound on the number of polls.
    pub max_attempts: Option<u32>,
    /// Labels treated as terminal success. Empty keeps the defaults.
    pub success_states: Vec<String>,
    /// Labels treated as terminal failure. Empty keeps the defaults.
    pub failure_states: Vec<String>,
}

impl PollSettings {
    /// Parsed poll interval, if configured.
    pub fn interval(&self) -> Result<Option<Duration>, ConfigError> {
        parse_optional_duration("poll.interval", self.interval.as_deref())
    }

    /// Parsed polling deadline, if configured.
    pub fn timeout(&self) -> Result<Option<Duration>, ConfigError> {
        parse_optional_duration("poll.timeout", self.timeout.as_deref())
    }
}

fn parse_optional_duration(field: &'static str, raw: Option<&str>) -> Result<Option<Duration>, ConfigError> {
    match raw {
        None => Ok(None),
        Some(value) => parse_duration(value).map(Some).ok_or_else(|| ConfigError::InvalidDuration {
            field,
            value: value.to_string(),
        }),
    }
}

/// Resolve the configuration path from `SRCBATCH_CONFIG_PATH` or the platform
/// config directory.
pub fn default_config_path() -> PathBuf {
    if let Ok(path) = env::var(CONFIG_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return expand_tilde(trimmed);
        }
    }

    config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("srcbatch")
        .join(CONFIG_FILE_NAME)
}

/// Load the configuration at `path`.
///
/// A missing file yields defaults. A file that is not valid JSON is reported
/// with a warning and also yields defaults, so a stray edit never blocks a run.
pub fn load_config(path: &Path) -> Result<ConfigFile, ConfigError> {
    match fs::read_to_string(path) {
        Ok(data) => match serde_json::from_str(&data) {
            Ok(config) => {
                debug!(path = %path.display(), "loaded config file");
                Ok(config)
            }
            Err(error) => {
                warn!(
                    path = %path.display(),
                    error = %error,
                    "Failed to parse config file; using defaults"
                );
                Ok(ConfigFile::default())
            }
        },
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => Ok(ConfigFile::default()),
        Err(error) => Err(ConfigError::Io(error)),
    }
}

fn expand_tilde(path: &str) -> PathBuf {
    let trimmed = path.trim();
    if trimmed == "~" {
        return home_dir().unwrap_or_else(|| PathBuf::from("~"));
    }
    if let Some(rest) = trimmed.strip_prefix("~/") {
        return home_dir().unwrap_or_else(|| PathBuf::from("~")).join(rest);
    }
    PathBuf::from(trimmed)
}

//! TOML-based application configuration.
//!
//! Holds local preferences the settings editor does not own: notification
//! and audio-sync toggles plus the blocking redirect target. Interval
//! durations live in the key-value store instead, because the external
//! editor owns them and they must be re-read fresh on every reset.
//!
//! Stored at `~/.config/focuspal/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::data_dir;
use crate::error::ConfigError;

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Mirror play/pause signals to the audio surface.
    #[serde(default = "default_true")]
    pub audio_sync: bool,
}

/// Blocking configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockingConfig {
    /// Where blocked navigations are redirected.
    #[serde(default = "default_redirect_target")]
    pub redirect_target: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `~/.config/focuspal/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub notifications: NotificationsConfig,
    #[serde(default)]
    pub blocking: BlockingConfig,
}

fn default_true() -> bool {
    true
}

fn default_redirect_target() -> String {
    "focuspal://blocked".to_string()
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            audio_sync: true,
        }
    }
}

impl Default for BlockingConfig {
    fn default() -> Self {
        Self {
            redirect_target: default_redirect_target(),
        }
    }
}

impl Config {
    fn path() -> Result<PathBuf, ConfigError> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load the configuration, falling back to defaults if the file does
    /// not exist yet.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::path()?;
        if !path.exists() {
            return Ok(Self::default());
        }
        let raw = std::fs::read_to_string(&path).map_err(|e| ConfigError::LoadFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        toml::from_str(&raw).map_err(|e| ConfigError::LoadFailed {
            path,
            message: e.to_string(),
        })
    }

    pub fn save(&self) -> Result<(), ConfigError> {
        let path = Self::path()?;
        let raw = toml::to_string_pretty(self).map_err(|e| ConfigError::SaveFailed {
            path: path.clone(),
            message: e.to_string(),
        })?;
        std::fs::write(&path, raw).map_err(|e| ConfigError::SaveFailed {
            path,
            message: e.to_string(),
        })
    }
}

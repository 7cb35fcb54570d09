mod config;
pub mod kv;

pub use config::{BlockingConfig, Config, NotificationsConfig};
pub use kv::{keys, MemoryStore, SqliteStore, StateStore};

use std::path::PathBuf;

use crate::error::ConfigError;

/// Returns `~/.config/focuspal[-dev]/` based on FOCUSPAL_ENV.
///
/// Set FOCUSPAL_ENV=dev to use a development data directory.
pub fn data_dir() -> Result<PathBuf, ConfigError> {
    let base_dir = dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config");

    let env = std::env::var("FOCUSPAL_ENV").unwrap_or_else(|_| "production".to_string());

    let dir = if env == "dev" {
        base_dir.join("focuspal-dev")
    } else {
        base_dir.join("focuspal")
    };

    std::fs::create_dir_all(&dir).map_err(|e| ConfigError::DataDir(e.to_string()))?;
    Ok(dir)
}

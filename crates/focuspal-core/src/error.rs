//! Core error types for focuspal-core.
//!
//! External-collaborator failures (store, rule engine, notifications) are
//! transient by contract: the coordinator catches and logs them at the call
//! site, so most of these types surface only at setup time.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focuspal-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Persistent store errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Rule engine errors
    #[error("Rule engine error: {0}")]
    Rules(#[from] RuleEngineError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Persistent-store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the backing database
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Rule-engine boundary errors.
#[derive(Error, Debug)]
pub enum RuleEngineError {
    /// Failed to publish the replacement rule set
    #[error("Failed to write rule set to {path}: {message}")]
    WriteFailed { path: PathBuf, message: String },

    /// Failed to read the current rule set
    #[error("Failed to read rule set: {0}")]
    ReadFailed(String),
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Failed to resolve or create the data directory
    #[error("Failed to prepare data directory: {0}")]
    DataDir(String),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! Error types for rutina-core.
//!
//! Expected timer conditions are not errors: commands aimed at an unknown
//! step id, pausing an already paused run, or completing a done step are
//! silent no-ops by contract. The types here cover storage, configuration
//! and serialization faults only.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for rutina-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// State store errors
    #[error("State store error: {0}")]
    Store(#[from] StoreError),

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// State store errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Could not create or locate the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Could not open the database file
    #[error("Failed to open state database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// A statement failed to execute
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        StoreError::QueryFailed(err.to_string())
    }
}

/// Configuration errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Could not create or locate the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(String),

    /// Could not read or parse the config file
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Could not serialize or write the config file
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Dot-path does not name a known setting
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Value does not fit the setting it targets
    #[error("Invalid value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! Core error types for touchgrass-core.
//!
//! This module defines the error hierarchy using thiserror so that the
//! CLI (and any future shell) can report failures uniformly.

use std::path::PathBuf;
use thiserror::Error;

use crate::settings::{MAX_EMERGENCY_APPS, MAX_PIN_RETRIES};

/// Core error type for touchgrass-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Preferences store errors
    #[error("Preferences error: {0}")]
    Preferences(#[from] PreferencesError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors raised by a preferences backend.
#[derive(Error, Debug)]
pub enum PreferencesError {
    /// The OS credential store rejected the operation.
    #[error("Secure store error: {0}")]
    Keyring(#[from] keyring::Error),

    /// Failed to open the local store.
    #[error("Failed to open local store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Local store query failed.
    #[error("Local store query failed: {0}")]
    QueryFailed(String),

    /// Local store is locked by another handle.
    #[error("Local store is locked")]
    Locked,

    /// The backend cannot be used on this device.
    #[error("Preferences backend '{0}' is unavailable")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Unknown configuration key
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Data directory could not be determined or created
    #[error("Data directory unavailable: {0}")]
    DataDir(String),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// PIN is not exactly four digits
    #[error("PIN must be exactly 4 digits")]
    MalformedPin,

    /// PIN did not match the stored one
    #[error("Incorrect PIN")]
    IncorrectPin,

    /// New PIN and confirmation differ
    #[error("PINs do not match")]
    PinMismatch,

    /// Key press was not a digit
    #[error("'{0}' is not a digit")]
    NotADigit(char),

    /// Retry count outside the allowed range
    #[error("PIN retry count {0} exceeds the maximum of {max}", max = MAX_PIN_RETRIES)]
    RetriesOutOfRange(u8),

    /// Emergency app selection is full
    #[error("At most {max} emergency apps can be selected", max = MAX_EMERGENCY_APPS)]
    EmergencyAppLimit,

    /// App name is not one of the known apps
    #[error("Unknown app: {0}")]
    UnknownApp(String),

    /// App is not among the configured emergency apps
    #[error("{0} is not configured as an emergency app")]
    NotAnEmergencyApp(String),

    /// Operation is not valid in the current state
    #[error("Invalid state: {0}")]
    InvalidState(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

// Helper implementations for converting from other error types

impl From<rusqlite::Error> for PreferencesError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg)
                if inner.code == rusqlite::ErrorCode::DatabaseLocked =>
            {
                PreferencesError::Locked
            }
            _ => PreferencesError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

//! Core error types for calmroom-core.
//!
//! Library operations return the narrow enum for their area. Callers that
//! span several areas, like the CLI commands, collect them in [`CoreError`].

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for calmroom-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Remote record store errors
    #[error("Record store error: {0}")]
    Store(#[from] StoreError),

    /// Chat service errors
    #[error("Chat error: {0}")]
    Chat(#[from] ChatError),

    /// Auth provider errors
    #[error("Auth error: {0}")]
    Auth(#[from] AuthError),

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

    /// Missing required configuration key
    #[error("Missing required configuration key: {0}")]
    MissingKey(String),

    /// Breathing profile with no phase longer than zero ticks
    #[error("Breathing profile '{profile}' has no phase with a positive duration")]
    EmptyProfile { profile: String },

    /// No breathing profile with the requested id
    #[error("Unknown breathing profile: {0}")]
    UnknownProfile(String),
}

/// Validation errors for user-supplied record fields.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ValidationError {
    /// Required text field is empty or whitespace-only
    #[error("'{field}' must not be empty")]
    EmptyField { field: &'static str },

    /// Mood level outside the supported scale
    #[error("Mood level {level} is out of range ({min}..={max})")]
    MoodLevelOutOfRange { level: u8, min: u8, max: u8 },
}

/// Errors from the remote record store.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Request could not be sent or the body could not be read
    #[error("Request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// Store answered with a non-success status
    #[error("Store returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// Response body did not match the expected shape
    #[error("Unexpected response: {0}")]
    Decode(String),

    /// Field validation failed before anything was sent
    #[error(transparent)]
    Validation(#[from] ValidationError),
}

/// Errors from the remote chat service.
#[derive(Error, Debug)]
pub enum ChatError {
    /// Request could not be sent
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Chat service answered with a non-success status
    #[error("Chat service returned HTTP {status}")]
    Status { status: u16 },

    /// Reading the response stream failed part way through
    #[error("Stream interrupted: {0}")]
    Stream(String),
}

/// Errors from the auth provider and credential storage.
#[derive(Error, Debug)]
pub enum AuthError {
    /// No stored session
    #[error("Not signed in")]
    NotSignedIn,

    /// Auth endpoint rejected or failed the request
    #[error("Auth request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// Auth endpoint answered with a non-success status
    #[error("Auth provider returned HTTP {status}")]
    Status { status: u16 },

    /// OS keyring failure
    #[error("Credential storage error: {0}")]
    Keyring(#[from] keyring::Error),
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

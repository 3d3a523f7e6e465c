//! Core error types for grove-core.
//!
//! One top-level `CoreError` with domain sub-enums, all via thiserror.
//! Nothing in this crate is allowed to take the control loop down: errors
//! are either recovered locally (notification + re-prompt) or logged and
//! defaulted. The taxonomy here exists so callers can tell those cases
//! apart.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for grove-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// User-supplied timer duration that is not a non-negative number.
    #[error("Invalid duration: {input:?}")]
    InvalidDuration { input: String },

    /// A stream resolution is already in flight.
    #[error("A resolution is already in progress")]
    Busy,

    /// Stream resolution errors (network / video service)
    #[error("Resolution error: {0}")]
    Resolution(#[from] ResolutionError),

    /// Media playback errors
    #[error("Playback error: {0}")]
    Playback(#[from] PlaybackError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Storage-related errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors from the video-resolution service boundary.
#[derive(Error, Debug, Clone)]
pub enum ResolutionError {
    /// The input could not be recognized as a watch URL.
    #[error("Not a recognizable stream URL: {0}")]
    BadUrl(String),

    /// A search returned no candidate streams.
    #[error("No results for query: {0}")]
    NoResults(String),

    /// Network-level failure reaching the service.
    #[error("Network failure: {0}")]
    Network(String),

    /// The service answered but the response could not be read.
    #[error("Unreadable response: {0}")]
    BadResponse(String),

    /// The playlist reference has no entries to pick from.
    #[error("Playlist is empty: {0}")]
    EmptyPlaylist(String),

    /// Retry budget spent without a playable stream.
    #[error("Gave up after {attempts} attempts")]
    Exhausted { attempts: u32 },
}

/// Errors from the media-playback service boundary.
#[derive(Error, Debug)]
pub enum PlaybackError {
    /// The backend could not open the given source.
    #[error("Cannot open media source: {0}")]
    OpenFailed(String),

    /// The device rejected a control call.
    #[error("Device error: {0}")]
    Device(String),
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

    /// A menu list configured with no entries
    #[error("Configured list '{0}' is empty")]
    EmptyList(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Storage-specific errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        StorageError::QueryFailed(err.to_string())
    }
}

impl From<reqwest::Error> for ResolutionError {
    fn from(err: reqwest::Error) -> Self {
        ResolutionError::Network(err.to_string())
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

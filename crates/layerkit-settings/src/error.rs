//! Error types for the settings crate.
//!
//! Loading and saving errors carry the file path. Binding and dialect
//! problems are [`ConfigurationError`]s from the core crate.

use layerkit_core::ConfigurationError;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during settings operations.
#[derive(Error, Debug)]
pub enum SettingsError {
    /// The settings file could not be read or decoded.
    #[error("Failed to load settings from {path:?}: {reason}")]
    LoadError { path: PathBuf, reason: String },

    /// The settings file could not be encoded or written.
    #[error("Failed to save settings to {path:?}: {reason}")]
    SaveError { path: PathBuf, reason: String },

    /// The file extension is neither `.json` nor `.toml`.
    #[error("Unsupported settings format for {0:?}: expected .json or .toml")]
    UnsupportedFormat(PathBuf),

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// TOML deserialization error.
    #[error("TOML error: {0}")]
    TomlError(#[from] toml::de::Error),

    /// TOML serialization error.
    #[error("TOML error: {0}")]
    TomlSerError(#[from] toml::ser::Error),

    /// A binding, override or dialect problem.
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

impl From<SettingsError> for layerkit_core::Error {
    fn from(err: SettingsError) -> Self {
        match err {
            SettingsError::Configuration(e) => layerkit_core::Error::Configuration(e),
            SettingsError::IoError(e) => layerkit_core::Error::Io(e),
            other => layerkit_core::Error::other(other.to_string()),
        }
    }
}

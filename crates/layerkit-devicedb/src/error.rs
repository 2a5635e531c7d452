//! Error types for the device database crate.
//!
//! This module provides structured error types for machine profile
//! management, persistence, and validation.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during machine library operations.
#[derive(Error, Debug)]
pub enum DeviceError {
    /// The requested profile was not found.
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// A profile with this ID already exists.
    #[error("Profile already exists: {0}")]
    ProfileAlreadyExists(String),

    /// Failed to load profiles from storage.
    #[error("Failed to load profiles from {path}: {reason}")]
    LoadError { path: PathBuf, reason: String },

    /// Failed to save profiles to storage.
    #[error("Failed to save profiles to {path}: {reason}")]
    SaveError { path: PathBuf, reason: String },

    /// I/O error during file operations.
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// JSON serialization/deserialization error.
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// A profile validation error occurred.
    #[error("Validation error: {0}")]
    Validation(#[from] ProfileError),
}

/// Errors related to machine profile validation.
#[derive(Error, Debug)]
pub enum ProfileError {
    /// A required field is missing or empty.
    #[error("Missing required field: {0}")]
    MissingField(String),

    /// The profile failed validation.
    #[error("Profile '{profile}' is invalid: {issues}")]
    Invalid { profile: String, issues: String },
}

/// Result type alias for machine library operations.
pub type DeviceResult<T> = Result<T, DeviceError>;

/// Result type alias for profile validation operations.
pub type ProfileResult<T> = Result<T, ProfileError>;

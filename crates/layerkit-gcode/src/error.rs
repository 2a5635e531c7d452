//! Error types for G-code persistence.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while saving or loading a G-code document.
#[derive(Error, Debug)]
pub enum GcodeIoError {
    /// The file could not be read or written.
    #[error("I/O error on {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The file was read but a line could not be parsed.
    #[error("Parse error in {path:?} at line {line}: {reason}")]
    Parse {
        path: PathBuf,
        line: usize,
        reason: String,
    },
}

impl GcodeIoError {
    /// Path of the file involved
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Io { path, .. } | Self::Parse { path, .. } => path,
        }
    }

    /// Offending line for parse errors
    pub fn line(&self) -> Option<usize> {
        match self {
            Self::Parse { line, .. } => Some(*line),
            Self::Io { .. } => None,
        }
    }
}

impl From<GcodeIoError> for layerkit_core::Error {
    fn from(err: GcodeIoError) -> Self {
        match err {
            GcodeIoError::Io { source, .. } => layerkit_core::Error::Io(source),
            GcodeIoError::Parse { line, reason, .. } => {
                layerkit_core::ParseError::new(line, reason).into()
            }
        }
    }
}

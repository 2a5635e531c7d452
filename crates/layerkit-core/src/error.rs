//! Error handling for LayerKit
//!
//! Provides the error taxonomy shared by all layers of the pipeline:
//! - Configuration errors (unsupported cardinality, missing dialect, type mismatch)
//! - Parse errors (malformed persisted documents, with location)
//! - Generation errors (part failures with context, cancellation)
//!
//! Field-level validation problems are not errors; they are reported as data
//! through [`crate::validation::ValidationReport`].
//!
//! All error types use `thiserror` for ergonomic error handling.

use thiserror::Error;

/// Configuration error type
///
/// Raised when the caller asks for something the current configuration
/// cannot provide. Always aborts the current call before any work starts.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigurationError {
    /// The generator does not accept this many parts
    #[error("Generator does not accept {count} parts")]
    UnsupportedPartCount {
        /// Number of parts supplied.
        count: usize,
    },

    /// The generator does not accept per-part settings overrides
    #[error("Generator does not accept per-part settings (part {part_index})")]
    PartSettingsNotSupported {
        /// First part carrying an override.
        part_index: usize,
    },

    /// Generation was requested with no parts
    #[error("No parts supplied")]
    NoParts,

    /// No instruction-stream assembler is registered for a settings type
    #[error("No G-code assembler registered for settings type {settings_type}")]
    MissingDialect {
        /// The concrete settings type name.
        settings_type: String,
    },

    /// A binding received a value of the wrong kind
    #[error("Setting '{setting}': expected {expected}, got {actual}")]
    TypeMismatch {
        /// Display name of the binding.
        setting: String,
        /// Kind the binding stores.
        expected: String,
        /// Kind that was supplied.
        actual: String,
    },

    /// A binding id is not part of the collection
    #[error("Unknown setting '{0}'")]
    UnknownSetting(String),

    /// A machine profile of the wrong class was bound to settings
    #[error("{settings_type} requires a {expected} machine profile, got {actual}")]
    ProfileClassMismatch {
        /// The settings type rejecting the profile.
        settings_type: String,
        /// The machine class the settings require.
        expected: String,
        /// The machine class that was supplied.
        actual: String,
    },

    /// Settings failed validation with blocking issues
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    /// A per-part override could not be applied
    #[error("Part {part_index}: {source}")]
    PartOverride {
        /// Index of the offending part.
        part_index: usize,
        /// The underlying configuration problem.
        source: Box<ConfigurationError>,
    },
}

/// Parse error with location
///
/// Produced when a persisted document cannot be read back.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("Parse error at line {line}: {reason}")]
pub struct ParseError {
    /// 1-based line number of the offending input.
    pub line: usize,
    /// What was wrong with the line.
    pub reason: String,
}

impl ParseError {
    /// Create a parse error at the given 1-based line
    pub fn new(line: usize, reason: impl Into<String>) -> Self {
        Self {
            line,
            reason: reason.into(),
        }
    }
}

/// Generation error type
///
/// Everything that can abort a generation call. No partial document is
/// returned alongside any of these.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// Intake or part preparation was rejected
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// A part failed during planning or assembly
    #[error(
        "Part {part_index} failed{}: {reason}",
        .layer_index.map(|l| format!(" at layer {l}")).unwrap_or_default()
    )]
    PartFailed {
        /// Index of the failing part in input order.
        part_index: usize,
        /// Layer being processed when the failure happened, if known.
        layer_index: Option<usize>,
        /// The collaborator's failure description.
        reason: String,
    },

    /// A sink or the cancel flag requested a stop
    #[error("Generation cancelled")]
    Cancelled,
}

impl GenerationError {
    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, GenerationError::Cancelled)
    }

    /// Check if this is a configuration error
    pub fn is_configuration_error(&self) -> bool {
        matches!(self, GenerationError::Configuration(_))
    }
}

/// Main error type for LayerKit
///
/// A unified error type that can represent any error from all layers.
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration error
    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    /// Parse error
    #[error(transparent)]
    Parse(#[from] ParseError),

    /// Generation error
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// Standard I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create an error from a string message
    pub fn other(msg: impl Into<String>) -> Self {
        Error::Other(msg.into())
    }

    /// Check if this is a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Error::Generation(GenerationError::Cancelled))
    }
}

/// Result type using Error
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_mismatch_display() {
        let err = ConfigurationError::TypeMismatch {
            setting: "Layer Height".to_string(),
            expected: "float".to_string(),
            actual: "text".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Setting 'Layer Height': expected float, got text"
        );
    }

    #[test]
    fn test_part_failed_display() {
        let err = GenerationError::PartFailed {
            part_index: 1,
            layer_index: Some(12),
            reason: "open contour".to_string(),
        };
        assert_eq!(err.to_string(), "Part 1 failed at layer 12: open contour");

        let err = GenerationError::PartFailed {
            part_index: 0,
            layer_index: None,
            reason: "empty mesh".to_string(),
        };
        assert_eq!(err.to_string(), "Part 0 failed: empty mesh");
    }

    #[test]
    fn test_parse_error_display() {
        let err = ParseError::new(7, "bad parameter 'Xq'");
        assert_eq!(err.to_string(), "Parse error at line 7: bad parameter 'Xq'");
    }

    #[test]
    fn test_error_conversion() {
        let err: GenerationError = ConfigurationError::NoParts.into();
        assert!(err.is_configuration_error());

        let err: Error = GenerationError::Cancelled.into();
        assert!(err.is_cancelled());

        let nested = ConfigurationError::PartOverride {
            part_index: 2,
            source: Box::new(ConfigurationError::UnknownSetting("shellz".to_string())),
        };
        assert_eq!(nested.to_string(), "Part 2: Unknown setting 'shellz'");
    }
}

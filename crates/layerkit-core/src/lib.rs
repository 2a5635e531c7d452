//! # LayerKit Core
//!
//! Core types shared by every LayerKit crate:
//! - The error taxonomy (configuration, parse, generation, cancellation)
//! - Field-level validation results collected into reports
//! - Sink/callback aliases used by the generator contract
//! - Feed-rate unit helpers

pub mod error;
pub mod types;
pub mod units;
pub mod validation;

pub use error::{ConfigurationError, Error, GenerationError, ParseError, Result};

pub use types::{observe, CancelFlag, ProgressSink, Sink, SinkControl};

pub use validation::{ValidationLevel, ValidationReport, ValidationResult};

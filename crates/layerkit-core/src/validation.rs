//! Field-level validation results
//!
//! Validation never aborts: every field is checked and every result is
//! collected into a [`ValidationReport`] so a caller can display all
//! violations at once and decide whether warnings block.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Severity of a single validation result
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum ValidationLevel {
    /// Value accepted
    #[default]
    Ok,
    /// Value accepted but suspicious
    Warning,
    /// Value rejected
    Error,
}

impl fmt::Display for ValidationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ok => write!(f, "ok"),
            Self::Warning => write!(f, "warning"),
            Self::Error => write!(f, "error"),
        }
    }
}

/// Outcome of validating one value
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationResult {
    /// Severity
    pub level: ValidationLevel,
    /// Human-readable explanation, absent for `Ok`
    pub message: Option<String>,
}

impl ValidationResult {
    /// An accepting result
    pub fn ok() -> Self {
        Self::default()
    }

    /// A warning with a message
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ValidationLevel::Warning,
            message: Some(message.into()),
        }
    }

    /// An error with a message
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: ValidationLevel::Error,
            message: Some(message.into()),
        }
    }

    /// True when the value was accepted without remarks
    pub fn is_ok(&self) -> bool {
        self.level == ValidationLevel::Ok
    }

    /// True for warnings
    pub fn is_warning(&self) -> bool {
        self.level == ValidationLevel::Warning
    }

    /// True for errors
    pub fn is_error(&self) -> bool {
        self.level == ValidationLevel::Error
    }

    /// Error unless `min <= value <= max`
    pub fn in_range(value: f64, min: f64, max: f64) -> Self {
        if value.is_nan() || value < min || value > max {
            Self::error(format!("{} is outside [{}, {}]", value, min, max))
        } else {
            Self::ok()
        }
    }

    /// Error unless `value >= 0`
    pub fn non_negative(value: f64) -> Self {
        if value.is_nan() || value < 0.0 {
            Self::error(format!("{} must be >= 0", value))
        } else {
            Self::ok()
        }
    }

    /// Error unless `value > 0`
    pub fn positive(value: f64) -> Self {
        if value.is_nan() || value <= 0.0 {
            Self::error(format!("{} must be > 0", value))
        } else {
            Self::ok()
        }
    }

    /// Error unless `value` is a fraction in [0, 1]
    pub fn unit_interval(value: f64) -> Self {
        Self::in_range(value, 0.0, 1.0)
    }

    /// Downgrade an error to a warning, keeping the message
    pub fn as_warning(self) -> Self {
        match self.level {
            ValidationLevel::Error => Self {
                level: ValidationLevel::Warning,
                message: self.message,
            },
            _ => self,
        }
    }
}

impl fmt::Display for ValidationResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(msg) => write!(f, "{}: {}", self.level, msg),
            None => write!(f, "{}", self.level),
        }
    }
}

/// Ordered mapping from field name to validation result
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    entries: Vec<(String, ValidationResult)>,
}

impl ValidationReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the result for a field, replacing any earlier result for it
    pub fn push(&mut self, field: impl Into<String>, result: ValidationResult) {
        let field = field.into();
        if let Some(entry) = self.entries.iter_mut().find(|(f, _)| *f == field) {
            entry.1 = result;
        } else {
            self.entries.push((field, result));
        }
    }

    /// Append every entry of `other`, with field names prefixed by `prefix.`
    pub fn merge_prefixed(&mut self, prefix: &str, other: ValidationReport) {
        for (field, result) in other.entries {
            self.push(format!("{}.{}", prefix, field), result);
        }
    }

    /// Result recorded for a field
    pub fn get(&self, field: &str) -> Option<&ValidationResult> {
        self.entries
            .iter()
            .find(|(f, _)| f == field)
            .map(|(_, r)| r)
    }

    /// Every entry in declaration order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ValidationResult)> {
        self.entries.iter().map(|(f, r)| (f.as_str(), r))
    }

    /// Entries that are not `Ok`
    pub fn issues(&self) -> impl Iterator<Item = (&str, &ValidationResult)> {
        self.iter().filter(|(_, r)| !r.is_ok())
    }

    /// Number of fields checked
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing was checked
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Any field rejected
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|(_, r)| r.is_error())
    }

    /// Any field flagged as a warning
    pub fn has_warnings(&self) -> bool {
        self.entries.iter().any(|(_, r)| r.is_warning())
    }

    /// Highest severity in the report
    pub fn worst(&self) -> ValidationLevel {
        self.entries
            .iter()
            .map(|(_, r)| r.level)
            .max()
            .unwrap_or_default()
    }

    /// One line per issue, `field: level: message`
    pub fn summary(&self) -> String {
        self.issues()
            .map(|(f, r)| format!("{}: {}", f, r))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (field, result) in self.issues() {
            writeln!(f, "{}: {}", field, result)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_helpers() {
        assert!(ValidationResult::in_range(45.0, 0.0, 90.0).is_ok());
        assert!(ValidationResult::in_range(91.0, 0.0, 90.0).is_error());
        assert!(ValidationResult::in_range(f64::NAN, 0.0, 90.0).is_error());
        assert!(ValidationResult::non_negative(0.0).is_ok());
        assert!(ValidationResult::positive(0.0).is_error());
        assert!(ValidationResult::unit_interval(1.0).is_ok());
    }

    #[test]
    fn test_report_collects_everything() {
        let mut report = ValidationReport::new();
        report.push("shells", ValidationResult::ok());
        report.push("angle", ValidationResult::error("too steep"));
        report.push("temp", ValidationResult::warning("hot"));

        assert_eq!(report.len(), 3);
        assert!(report.has_errors());
        assert!(report.has_warnings());
        assert_eq!(report.worst(), ValidationLevel::Error);
        assert_eq!(report.issues().count(), 2);
        assert_eq!(report.summary(), "angle: error: too steep; temp: warning: hot");
    }

    #[test]
    fn test_push_replaces_and_prefix_merges() {
        let mut inner = ValidationReport::new();
        inner.push("bed_size_x_mm", ValidationResult::error("must be > 0"));

        let mut report = ValidationReport::new();
        report.push("shells", ValidationResult::error("bad"));
        report.push("shells", ValidationResult::ok());
        report.merge_prefixed("machine", inner);

        assert!(report.get("shells").is_some_and(|r| r.is_ok()));
        assert!(report
            .get("machine.bed_size_x_mm")
            .is_some_and(|r| r.is_error()));
    }

    #[test]
    fn test_report_serializes() {
        let mut report = ValidationReport::new();
        report.push("angle", ValidationResult::warning("steep"));
        let json = serde_json::to_string(&report).unwrap();
        let back: ValidationReport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, report);
    }
}

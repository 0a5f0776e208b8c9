//! Error types for the dependency model
//!
//! Two families live here because every other crate needs them:
//! - `ValidationError` for construction-time invariant violations
//! - `DependencyGraphError` for descriptor detection and parsing failures

use std::path::{Path, PathBuf};

/// Construction-time invariant violation
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Required text field was empty or whitespace
    #[error("{field} must not be blank")]
    Blank {
        /// Field name
        field: &'static str,
    },

    /// Score or confidence outside the unit interval
    #[error("{field} must be within [0, 1], got {value}")]
    OutOfRange {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: f64,
    },

    /// Counter or size that must not be negative
    #[error("{field} must not be negative, got {value}")]
    Negative {
        /// Field name
        field: &'static str,
        /// Rejected value
        value: i64,
    },

    /// Anything else that fails a structural check
    #[error("invalid {field}: {reason}")]
    Invalid {
        /// Field name
        field: &'static str,
        /// Human-readable reason
        reason: String,
    },
}

impl ValidationError {
    /// Reject blank text
    ///
    /// # Errors
    /// Returns `ValidationError::Blank` when `value` is empty after trimming.
    #[inline]
    pub fn require_non_blank(field: &'static str, value: &str) -> Result<(), Self> {
        if value.trim().is_empty() {
            Err(Self::Blank { field })
        } else {
            Ok(())
        }
    }

    /// Reject values outside `[0, 1]` (NaN included)
    ///
    /// # Errors
    /// Returns `ValidationError::OutOfRange` for non-finite or out-of-range values.
    #[inline]
    pub fn require_unit(field: &'static str, value: f64) -> Result<f64, Self> {
        if value.is_finite() && (0.0..=1.0).contains(&value) {
            Ok(value)
        } else {
            Err(Self::OutOfRange { field, value })
        }
    }
}

/// Failure to turn a project into a dependency graph
#[derive(Debug, thiserror::Error)]
pub enum DependencyGraphError {
    /// No recognised build descriptor under the project root
    #[error("no build file found in project: {}", root.display())]
    NoDescriptor {
        /// Project root that was searched
        root: PathBuf,
    },

    /// Descriptor exists but could not be read
    #[error("failed to read {format} descriptor {}: {source}", path.display())]
    Io {
        /// Descriptor format name
        format: &'static str,
        /// Descriptor path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Descriptor content is not valid for its format
    #[error("malformed {format} descriptor {}: {cause}", path.display())]
    Malformed {
        /// Descriptor format name
        format: &'static str,
        /// Descriptor path
        path: PathBuf,
        /// What was wrong
        cause: String,
    },

    /// A parsed coordinate failed validation
    #[error("invalid coordinate in {format} descriptor: {source}")]
    InvalidCoordinate {
        /// Descriptor format name
        format: &'static str,
        /// Validation failure
        #[source]
        source: ValidationError,
    },
}

impl DependencyGraphError {
    /// Create I/O error with path context
    #[inline]
    pub fn io_error(format: &'static str, path: impl AsRef<Path>, source: std::io::Error) -> Self {
        Self::Io {
            format,
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create malformed-descriptor error
    #[inline]
    pub fn malformed(format: &'static str, path: impl AsRef<Path>, cause: impl Into<String>) -> Self {
        Self::Malformed {
            format,
            path: path.as_ref().to_path_buf(),
            cause: cause.into(),
        }
    }

    /// Descriptor format involved, if any
    #[must_use]
    pub fn format(&self) -> Option<&'static str> {
        match self {
            Self::NoDescriptor { .. } => None,
            Self::Io { format, .. }
            | Self::Malformed { format, .. }
            | Self::InvalidCoordinate { format, .. } => Some(format),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn blank_is_rejected() {
        assert!(ValidationError::require_non_blank("groupId", "  ").is_err());
        assert!(ValidationError::require_non_blank("groupId", "org.acme").is_ok());
    }

    #[test]
    fn unit_interval_bounds() {
        assert_eq!(ValidationError::require_unit("score", 0.0), Ok(0.0));
        assert_eq!(ValidationError::require_unit("score", 1.0), Ok(1.0));
        assert!(ValidationError::require_unit("score", 1.0001).is_err());
        assert!(ValidationError::require_unit("score", -0.1).is_err());
        assert!(ValidationError::require_unit("score", f64::NAN).is_err());
    }

    #[test]
    fn graph_error_display_and_format() {
        let err = DependencyGraphError::NoDescriptor {
            root: PathBuf::from("/tmp/app"),
        };
        assert!(err.to_string().contains("no build file found"));
        assert_eq!(err.format(), None);

        let err = DependencyGraphError::malformed("maven", "/tmp/app/pom.xml", "missing <project>");
        assert_eq!(err.format(), Some("maven"));
        assert!(err.to_string().contains("missing <project>"));
    }
}

//! Runtime verification records
//!
//! Value records carry smart constructors where they hold a score, so a
//! confidence or severity outside `[0, 1]` never exists as a value.

use crate::matcher::ErrorPatternMatcher;
use chrono::{DateTime, Utc};
use jmig_graph::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// JVM failure kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    ClassNotFound,
    NoClassDefFound,
    LinkageError,
    NoSuchMethod,
    NoSuchField,
    IllegalAccess,
    ClassCast,
    Other,
}

impl ErrorType {
    /// JVM throwable name
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::ClassNotFound => "ClassNotFoundException",
            Self::NoClassDefFound => "NoClassDefFoundError",
            Self::LinkageError => "LinkageError",
            Self::NoSuchMethod => "NoSuchMethodError",
            Self::NoSuchField => "NoSuchFieldError",
            Self::IllegalAccess => "IllegalAccessError",
            Self::ClassCast => "ClassCastException",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Migration-oriented classification of a failure
///
/// Declaration order is the classification precedence.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCategory {
    NamespaceMigration,
    ClasspathIssue,
    BinaryIncompatibility,
    ConfigurationError,
    Unknown,
}

impl ErrorCategory {
    /// Every category in precedence order
    pub const ALL: [Self; 5] = [
        Self::NamespaceMigration,
        Self::ClasspathIssue,
        Self::BinaryIncompatibility,
        Self::ConfigurationError,
        Self::Unknown,
    ];

    /// Caused by the namespace move
    #[inline]
    #[must_use]
    pub fn is_jakarta_migration_related(self) -> bool {
        matches!(
            self,
            Self::NamespaceMigration | Self::ClasspathIssue | Self::BinaryIncompatibility
        )
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NamespaceMigration => "NAMESPACE_MIGRATION",
            Self::ClasspathIssue => "CLASSPATH_ISSUE",
            Self::BinaryIncompatibility => "BINARY_INCOMPATIBILITY",
            Self::ConfigurationError => "CONFIGURATION_ERROR",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One `at ...` line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StackFrame {
    pub class_name: String,
    pub method_name: String,
    pub file_name: String,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StackTrace {
    pub exception_class: String,
    pub message: String,
    pub frames: Vec<StackFrame>,
}

/// Failure observed while running an artifact
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeError {
    error_type: ErrorType,
    message: String,
    stack_trace: StackTrace,
    class_name: Option<String>,
    method_name: Option<String>,
    timestamp: DateTime<Utc>,
    confidence: f64,
}

impl RuntimeError {
    /// Create runtime error
    ///
    /// # Errors
    /// Returns `ValidationError::OutOfRange` if `confidence` is outside `[0, 1]`.
    pub fn new(
        error_type: ErrorType,
        message: impl Into<String>,
        stack_trace: StackTrace,
        class_name: Option<String>,
        method_name: Option<String>,
        confidence: f64,
    ) -> Result<Self, ValidationError> {
        let confidence = ValidationError::require_unit("confidence", confidence)?;
        Ok(Self {
            error_type,
            message: message.into(),
            stack_trace,
            class_name,
            method_name,
            timestamp: Utc::now(),
            confidence,
        })
    }

    #[inline]
    #[must_use]
    pub fn error_type(&self) -> ErrorType {
        self.error_type
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    #[must_use]
    pub fn stack_trace(&self) -> &StackTrace {
        &self.stack_trace
    }

    /// Offending class, when one could be identified
    #[inline]
    #[must_use]
    pub fn class_name(&self) -> Option<&str> {
        self.class_name.as_deref()
    }

    /// Method of the top stack frame
    #[inline]
    #[must_use]
    pub fn method_name(&self) -> Option<&str> {
        self.method_name.as_deref()
    }

    #[inline]
    #[must_use]
    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    #[inline]
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Category from the message and class name
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        ErrorPatternMatcher::determine_error_category(Some(&self.message), self.class_name())
    }
}

/// Non-fatal finding
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    message: String,
    category: String,
    severity: f64,
}

impl Warning {
    /// Create warning
    ///
    /// # Errors
    /// Returns `ValidationError` for a blank message or a severity outside `[0, 1]`.
    pub fn new(message: impl Into<String>, category: impl Into<String>, severity: f64) -> Result<Self, ValidationError> {
        let message = message.into();
        ValidationError::require_non_blank("message", &message)?;
        let severity = ValidationError::require_unit("severity", severity)?;
        Ok(Self {
            message,
            category: category.into(),
            severity,
        })
    }

    #[inline]
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    #[inline]
    #[must_use]
    pub fn category(&self) -> &str {
        &self.category
    }

    #[inline]
    #[must_use]
    pub fn severity(&self) -> f64 {
        self.severity
    }
}

/// Suggested fix; lower priority runs first
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemediationStep {
    pub description: String,
    pub action: String,
    pub details: Vec<String>,
    pub priority: u8,
}

/// Earlier failure resembling the current one
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimilarFailure {
    pub error_pattern: String,
    pub resolution: String,
    pub similarity: f64,
}

/// Root-cause analysis over a set of runtime errors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorAnalysis {
    pub category: ErrorCategory,
    pub root_cause: String,
    pub contributing_factors: Vec<String>,
    pub similar_failures: Vec<SimilarFailure>,
    pub suggested_fixes: Vec<RemediationStep>,
    pub confidence: f64,
}

impl ErrorAnalysis {
    /// Analysis of an empty error list
    #[must_use]
    pub fn empty() -> Self {
        Self {
            category: ErrorCategory::Unknown,
            root_cause: "No errors to analyze".to_string(),
            contributing_factors: Vec::new(),
            similar_failures: Vec::new(),
            suggested_fixes: Vec::new(),
            confidence: 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Success,
    Failed,
    Partial,
    Timeout,
    Unknown,
}

/// Limits and capture settings for one verification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerificationOptions {
    pub timeout: Duration,
    pub max_memory_bytes: u64,
    pub capture_stdout: bool,
    pub capture_stderr: bool,
    pub jvm_args: Vec<String>,
}

impl Default for VerificationOptions {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5 * 60),
            max_memory_bytes: 2 * 1024 * 1024 * 1024,
            capture_stdout: true,
            capture_stderr: true,
            jvm_args: Vec::new(),
        }
    }
}

impl VerificationOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    #[must_use]
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_memory_bytes(mut self, bytes: u64) -> Self {
        self.max_memory_bytes = bytes;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_capture(mut self, stdout: bool, stderr: bool) -> Self {
        self.capture_stdout = stdout;
        self.capture_stderr = stderr;
        self
    }

    #[must_use]
    pub fn with_jvm_arg(mut self, arg: impl Into<String>) -> Self {
        self.jvm_args.push(arg.into());
        self
    }

    /// Check limits
    ///
    /// # Errors
    /// Returns `ValidationError::Invalid` for a zero timeout or memory ceiling.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout.is_zero() {
            return Err(ValidationError::Invalid {
                field: "timeout",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_memory_bytes == 0 {
            return Err(ValidationError::Invalid {
                field: "maxMemoryBytes",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// `-Xmx` flag for the memory ceiling, at least 1 MB
    #[must_use]
    pub fn xmx_arg(&self) -> String {
        format!("-Xmx{}m", (self.max_memory_bytes / (1024 * 1024)).max(1))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ExecutionMetrics {
    pub execution_time: Duration,
    /// Peak resident memory observed, 0 when not sampled
    pub memory_used_bytes: u64,
    /// `None` when the process was killed or never started
    pub exit_code: Option<i32>,
    pub timed_out: bool,
    pub memory_exceeded: bool,
}

/// Outcome of verifying one artifact or project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationResult {
    pub status: VerificationStatus,
    pub errors: Vec<RuntimeError>,
    pub warnings: Vec<Warning>,
    pub metrics: ExecutionMetrics,
    pub analysis: Option<ErrorAnalysis>,
    pub remediation_steps: Vec<RemediationStep>,
    pub stdout: String,
    pub stderr: String,
    /// Artifact that was run, if any
    pub artifact: Option<PathBuf>,
}

impl VerificationResult {
    /// Failed result that never reached a process
    #[must_use]
    pub fn not_run(error: RuntimeError, artifact: Option<PathBuf>) -> Self {
        Self {
            status: VerificationStatus::Failed,
            errors: vec![error],
            warnings: Vec::new(),
            metrics: ExecutionMetrics {
                exit_code: Some(-1),
                ..ExecutionMetrics::default()
            },
            analysis: None,
            remediation_steps: Vec::new(),
            stdout: String::new(),
            stderr: String::new(),
            artifact,
        }
    }

    #[inline]
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status == VerificationStatus::Success
    }

    /// Errors whose category is migration-related
    pub fn migration_errors<'a>(&'a self) -> impl Iterator<Item = &'a RuntimeError> + 'a {
        self.errors
            .iter()
            .filter(|e| e.category().is_jakarta_migration_related())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_error_rejects_bad_confidence() {
        let make = |c| RuntimeError::new(ErrorType::Other, "x", StackTrace::default(), None, None, c);
        assert!(make(0.5).is_ok());
        assert!(make(1.5).is_err());
        assert!(make(f64::NAN).is_err());
    }

    #[test]
    fn warning_rejects_bad_severity() {
        assert!(Warning::new("deprecated API", "DEPRECATION", 0.5).is_ok());
        assert!(Warning::new("deprecated API", "DEPRECATION", -0.1).is_err());
        assert!(Warning::new(" ", "DEPRECATION", 0.5).is_err());
    }

    #[test]
    fn options_defaults_and_validation() {
        let options = VerificationOptions::default();
        assert_eq!(options.timeout, Duration::from_secs(300));
        assert_eq!(options.xmx_arg(), "-Xmx2048m");
        assert!(options.validate().is_ok());
        assert!(options.clone().with_timeout(Duration::ZERO).validate().is_err());
        assert!(options.with_max_memory_bytes(0).validate().is_err());
        assert_eq!(VerificationOptions::new().with_max_memory_bytes(10).xmx_arg(), "-Xmx1m");
    }

    #[test]
    fn migration_related_categories() {
        let related: Vec<ErrorCategory> = ErrorCategory::ALL
            .into_iter()
            .filter(|c| c.is_jakarta_migration_related())
            .collect();
        assert_eq!(
            related,
            vec![
                ErrorCategory::NamespaceMigration,
                ErrorCategory::ClasspathIssue,
                ErrorCategory::BinaryIncompatibility,
            ]
        );
    }
}

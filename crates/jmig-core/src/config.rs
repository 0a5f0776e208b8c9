//! Pipeline configuration
//!
//! One TOML document with three optional sections:
//!
//! ```toml
//! [analysis]
//! readiness_weight_unblocked = 0.6
//! readiness_weight_risk = 0.4
//! parallel_classification = true
//!
//! [refactoring]
//! fail_on_residual = false
//! source_roots = ["src/main"]
//!
//! [verification]
//! timeout_secs = 300
//! max_memory_bytes = 2147483648
//! launcher = "java"
//! ```

use jmig_analysis::ReadinessWeights;
use jmig_graph::ValidationError;
use jmig_runtime::VerificationOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration error
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Configuration file could not be read
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// TOML parsing error
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("failed to serialize configuration: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value is out of its allowed range
    #[error("invalid configuration: {0}")]
    Invalid(#[from] ValidationError),
}

/// Dependency analysis settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Weight of the unblocked-artifact fraction in the readiness score
    pub readiness_weight_unblocked: f64,
    /// Weight of `1 - risk` in the readiness score
    pub readiness_weight_risk: f64,
    /// Classify artifacts and evaluate blockers on rayon
    pub parallel_classification: bool,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            readiness_weight_unblocked: 0.6,
            readiness_weight_risk: 0.4,
            parallel_classification: true,
        }
    }
}

impl AnalysisConfig {
    /// Normalised readiness weights
    ///
    /// # Errors
    /// Rejects negative weights or weights summing to zero.
    pub fn weights(&self) -> Result<ReadinessWeights, ValidationError> {
        ReadinessWeights::new(self.readiness_weight_unblocked, self.readiness_weight_risk)
    }
}

/// Refactoring settings
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RefactoringConfig {
    /// Roll the run back when legacy references survive the rewrite
    pub fail_on_residual: bool,
    /// Directories to scan, relative to the project root; empty scans the whole project
    pub source_roots: Vec<PathBuf>,
}

/// Runtime verification settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VerificationConfig {
    pub timeout_secs: u64,
    pub max_memory_bytes: u64,
    pub capture_stdout: bool,
    pub capture_stderr: bool,
    pub jvm_args: Vec<String>,
    /// Program used in place of `java`
    pub launcher: String,
    /// Look for a built jar under the project when none is given
    pub verify_built_artifact: bool,
}

impl Default for VerificationConfig {
    fn default() -> Self {
        let options = VerificationOptions::default();
        Self {
            timeout_secs: options.timeout.as_secs(),
            max_memory_bytes: options.max_memory_bytes,
            capture_stdout: options.capture_stdout,
            capture_stderr: options.capture_stderr,
            jvm_args: options.jvm_args,
            launcher: "java".to_string(),
            verify_built_artifact: false,
        }
    }
}

impl VerificationConfig {
    /// Options handed to the runtime verifier
    #[must_use]
    pub fn options(&self) -> VerificationOptions {
        self.jvm_args.iter().fold(
            VerificationOptions::default()
                .with_timeout(Duration::from_secs(self.timeout_secs))
                .with_max_memory_bytes(self.max_memory_bytes)
                .with_capture(self.capture_stdout, self.capture_stderr),
            |options, arg| options.with_jvm_arg(arg.clone()),
        )
    }
}

/// Full pipeline configuration
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct MigrationConfig {
    pub analysis: AnalysisConfig,
    pub refactoring: RefactoringConfig,
    pub verification: VerificationConfig,
}

impl MigrationConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate configuration from a file
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate configuration from a TOML string
    ///
    /// # Errors
    /// Returns `ConfigError` if the TOML is invalid or a value is out of range.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize configuration to TOML
    ///
    /// # Errors
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every value against its allowed range
    ///
    /// # Errors
    /// Returns the first invalid value.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.analysis.weights()?;
        self.verification.options().validate()?;
        ValidationError::require_non_blank("launcher", &self.verification.launcher)
    }

    #[inline]
    #[must_use]
    pub fn with_readiness_weights(mut self, unblocked: f64, risk: f64) -> Self {
        self.analysis.readiness_weight_unblocked = unblocked;
        self.analysis.readiness_weight_risk = risk;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_parallel_classification(mut self, parallel: bool) -> Self {
        self.analysis.parallel_classification = parallel;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_fail_on_residual(mut self, fail: bool) -> Self {
        self.refactoring.fail_on_residual = fail;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_source_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.refactoring.source_roots.push(root.into());
        self
    }

    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.verification.timeout_secs = secs;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_max_memory_bytes(mut self, bytes: u64) -> Self {
        self.verification.max_memory_bytes = bytes;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_launcher(mut self, launcher: impl Into<String>) -> Self {
        self.verification.launcher = launcher.into();
        self
    }

    #[inline]
    #[must_use]
    pub fn with_verify_built_artifact(mut self, verify: bool) -> Self {
        self.verification.verify_built_artifact = verify;
        self
    }
}

//! Runtime verifier
//!
//! Runs a built artifact on a JVM and reports what happened as a
//! [`VerificationResult`]. Status rules:
//! - timed out or over the memory ceiling → `TIMEOUT`
//! - non-zero exit with parsed errors → `FAILED`
//! - non-zero exit without errors, or zero exit with errors → `PARTIAL`
//! - otherwise `SUCCESS`

use crate::analyzer::ErrorAnalyzer;
use crate::error::VerificationError;
use crate::executor::{CommandSpec, ProcessExecutor, ProcessOutcome};
use crate::types::{
    ErrorType, RuntimeError, StackTrace, VerificationOptions, VerificationResult,
    VerificationStatus, Warning,
};
use async_trait::async_trait;
use ignore::WalkBuilder;
use jmig_graph::{legacy_family, MODERN_PREFIX};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::SystemTime;
use tracing::{info, warn};

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(?:static\s+)?((?:javax|jakarta)\.[\w.]+(?:\.\*)?)\s*;").expect("valid regex literal")
});

/// Directories searched for a built jar, relative to the project root
const ARTIFACT_DIRS: &[&str] = &["target", "build/libs"];

/// Findings from scanning sources without running anything
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StaticAnalysisResult {
    pub files_scanned: usize,
    pub warnings: Vec<Warning>,
    pub errors: Vec<RuntimeError>,
}

impl StaticAnalysisResult {
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty() && self.errors.is_empty()
    }
}

/// Verifies migrated artifacts at runtime
#[async_trait]
pub trait RuntimeVerifier: Send + Sync + fmt::Debug {
    /// Run one jar
    ///
    /// # Errors
    /// Invalid options or a process that cannot be started.
    async fn verify_runtime(&self, jar: &Path, options: &VerificationOptions) -> Result<VerificationResult, VerificationError>;

    /// Locate the project's newest built jar and run it
    ///
    /// # Errors
    /// As [`RuntimeVerifier::verify_runtime`].
    async fn verify_project(&self, root: &Path, options: &VerificationOptions) -> Result<VerificationResult, VerificationError>;

    /// Scan sources for namespace problems that will fail at runtime
    ///
    /// # Errors
    /// Returns `VerificationError::Io` if `root` is not a directory.
    fn analyze_static(&self, root: &Path) -> Result<StaticAnalysisResult, VerificationError>;
}

/// Verifier that launches `java -jar`
#[derive(Debug, Clone)]
pub struct JvmRuntimeVerifier {
    launcher: CommandSpec,
    analyzer: ErrorAnalyzer,
}

impl Default for JvmRuntimeVerifier {
    fn default() -> Self {
        Self {
            launcher: CommandSpec::new("java"),
            analyzer: ErrorAnalyzer::new(),
        }
    }
}

impl JvmRuntimeVerifier {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Launcher program plus any leading arguments
    #[inline]
    #[must_use]
    pub fn with_launcher(mut self, launcher: CommandSpec) -> Self {
        self.launcher = launcher;
        self
    }

    #[inline]
    #[must_use]
    pub fn with_analyzer(mut self, analyzer: ErrorAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    fn status_of(outcome: &ProcessOutcome, has_errors: bool) -> VerificationStatus {
        if outcome.timed_out || outcome.memory_exceeded {
            VerificationStatus::Timeout
        } else if !outcome.success() && has_errors {
            VerificationStatus::Failed
        } else if !outcome.success() || has_errors {
            VerificationStatus::Partial
        } else {
            VerificationStatus::Success
        }
    }

    fn not_run(message: String, artifact: Option<PathBuf>) -> Result<VerificationResult, VerificationError> {
        warn!("{message}");
        let error = RuntimeError::new(ErrorType::Other, message, StackTrace::default(), None, None, 1.0)?;
        Ok(VerificationResult::not_run(error, artifact))
    }

    /// Newest non-sources, non-javadoc jar in the artifact directories
    async fn newest_jar(root: &Path) -> Option<PathBuf> {
        let mut newest: Option<(SystemTime, PathBuf)> = None;
        for dir in ARTIFACT_DIRS {
            let Ok(mut entries) = tokio::fs::read_dir(root.join(dir)).await else {
                continue;
            };
            while let Ok(Some(entry)) = entries.next_entry().await {
                let path = entry.path();
                let name = entry.file_name().to_string_lossy().into_owned();
                if !name.ends_with(".jar") || name.ends_with("-sources.jar") || name.ends_with("-javadoc.jar") {
                    continue;
                }
                let Ok(meta) = entry.metadata().await else {
                    continue;
                };
                if !meta.is_file() {
                    continue;
                }
                let modified = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
                if newest.as_ref().map_or(true, |(t, _)| modified > *t) {
                    newest = Some((modified, path));
                }
            }
        }
        newest.map(|(_, path)| path)
    }
}

#[async_trait]
impl RuntimeVerifier for JvmRuntimeVerifier {
    async fn verify_runtime(&self, jar: &Path, options: &VerificationOptions) -> Result<VerificationResult, VerificationError> {
        options.validate()?;
        if !jar.is_file() {
            return Self::not_run(format!("Artifact not found: {}", jar.display()), Some(jar.to_path_buf()));
        }
        let jar = jar
            .canonicalize()
            .map_err(|e| VerificationError::io_error(jar, e))?;

        let mut spec = self
            .launcher
            .clone()
            .arg(options.xmx_arg())
            .args(options.jvm_args.iter().cloned())
            .arg("-jar")
            .arg(jar.to_string_lossy());
        if let Some(parent) = jar.parent() {
            spec = spec.current_dir(parent);
        }

        let outcome = ProcessExecutor::from_options(options).run(&spec).await?;
        let errors = self.analyzer.parse_output(&outcome.stdout, &outcome.stderr);
        let warnings = self.analyzer.parse_warnings(&outcome.stderr);
        let status = Self::status_of(&outcome, !errors.is_empty());
        let analysis = self.analyzer.analyze(&errors);
        let remediation_steps = self.analyzer.remediation_steps(&analysis);

        info!(
            "Verified {}: {:?}, {} errors, {} warnings",
            jar.display(),
            status,
            errors.len(),
            warnings.len()
        );
        Ok(VerificationResult {
            status,
            errors,
            warnings,
            metrics: outcome.metrics(),
            analysis: Some(analysis),
            remediation_steps,
            stdout: outcome.stdout,
            stderr: outcome.stderr,
            artifact: Some(jar),
        })
    }

    async fn verify_project(&self, root: &Path, options: &VerificationOptions) -> Result<VerificationResult, VerificationError> {
        match Self::newest_jar(root).await {
            Some(jar) => self.verify_runtime(&jar, options).await,
            None => Self::not_run(
                format!("No built jar under target/ or build/libs/ in {}", root.display()),
                None,
            ),
        }
    }

    fn analyze_static(&self, root: &Path) -> Result<StaticAnalysisResult, VerificationError> {
        if !root.is_dir() {
            return Err(VerificationError::io_error(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "project root is not a directory"),
            ));
        }

        let mut result = StaticAnalysisResult::default();
        let mut walker = WalkBuilder::new(root);
        walker.sort_by_file_name(|a, b| a.cmp(b));
        for entry in walker.build().flatten() {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("java") {
                continue;
            }
            let Ok(content) = std::fs::read_to_string(path) else {
                continue;
            };
            result.files_scanned += 1;

            let mut legacy = Vec::new();
            let mut modern = false;
            for (index, line) in content.lines().enumerate() {
                let Some(caps) = IMPORT.captures(line) else {
                    continue;
                };
                let name = &caps[1];
                if legacy_family(name).is_some() {
                    result.warnings.push(Warning::new(
                        format!("{}:{}: legacy import {name}", path.display(), index + 1),
                        "LEGACY_IMPORT",
                        0.7,
                    )?);
                    legacy.push(name.to_string());
                } else if name.starts_with(MODERN_PREFIX) {
                    modern = true;
                }
            }

            if modern && !legacy.is_empty() {
                result.errors.push(RuntimeError::new(
                    ErrorType::LinkageError,
                    format!("Mixed javax and jakarta imports in {}", path.display()),
                    StackTrace::default(),
                    legacy.first().cloned(),
                    None,
                    0.8,
                )?);
            }
        }

        info!(
            "Static analysis of {} files: {} warnings, {} errors",
            result.files_scanned,
            result.warnings.len(),
            result.errors.len()
        );
        Ok(result)
    }
}

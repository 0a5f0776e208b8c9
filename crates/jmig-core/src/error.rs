//! Pipeline error type
//!
//! Wraps every stage's error. Refactoring failures that were rolled back and
//! verification timeouts are outcomes, not errors, and never reach here.

use crate::config::ConfigError;
use jmig_analysis::AnalysisError;
use jmig_graph::ValidationError;
use jmig_refactor::RefactorError;
use jmig_runtime::VerificationError;

/// Pipeline error
#[derive(Debug, thiserror::Error)]
pub enum PipelineError {
    /// Dependency analysis failed
    #[error(transparent)]
    Analysis(#[from] AnalysisError),

    /// A derived value violated its invariants
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Scanning or applying the plan failed outside the rollback path
    #[error(transparent)]
    Refactor(#[from] RefactorError),

    /// The verifier could not run
    #[error(transparent)]
    Verification(#[from] VerificationError),

    /// Configuration is unusable
    #[error(transparent)]
    Config(#[from] ConfigError),
}

impl PipelineError {
    /// Whether the run could not start at all: no usable graph or configuration
    #[must_use]
    pub fn is_fatal(&self) -> bool {
        match self {
            Self::Analysis(e) => e.is_graph_build(),
            Self::Config(_) => true,
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmig_graph::DependencyGraphError;
    use std::path::PathBuf;

    #[test]
    fn fatality() {
        let graph: PipelineError = AnalysisError::from(DependencyGraphError::NoDescriptor {
            root: PathBuf::from("/srv/app"),
        })
        .into();
        assert!(graph.is_fatal());

        let config: PipelineError = ConfigError::from(ValidationError::Blank { field: "launcher" }).into();
        assert!(config.is_fatal());

        let validation: PipelineError = ValidationError::Blank { field: "reason" }.into();
        assert!(!validation.is_fatal());
        assert_eq!(validation.to_string(), "reason must not be blank");
    }
}

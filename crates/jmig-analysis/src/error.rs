//! Error types for dependency analysis
//!
//! Graph-build failures are fatal to one analysis call. Degraded collaborator
//! outcomes never surface here; they are recorded in the report instead.

use jmig_graph::{DependencyGraphError, ValidationError};

/// Dependency analysis error
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    /// Project could not be turned into a graph
    #[error("graph build failed: {0}")]
    GraphBuild(#[from] DependencyGraphError),

    /// A derived record violated its invariants
    #[error("invalid analysis value: {0}")]
    Validation(#[from] ValidationError),
}

impl AnalysisError {
    /// Whether the failure came from descriptor detection or parsing
    #[inline]
    #[must_use]
    pub fn is_graph_build(&self) -> bool {
        matches!(self, Self::GraphBuild(_))
    }
}

//! Error types for source refactoring
//!
//! Provides error handling for:
//! - Recipe rewrite failures
//! - Checkpoint argument validation
//! - Illegal run-state transitions
//! - File I/O while scanning or rewriting

use crate::state::MigrationState;
use jmig_graph::ValidationError;
use std::path::{Path, PathBuf};

/// Recipe application errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecipeError {
    /// Recipe is not in the library
    #[error("recipe not registered: {0}")]
    NotRegistered(String),

    /// Rewrite could not produce output for a file
    #[error("recipe {recipe} failed on {path}: {reason}")]
    RewriteFailed {
        recipe: String,
        path: PathBuf,
        reason: String,
    },
}

impl RecipeError {
    /// Create rewrite failure
    pub fn rewrite_failed(recipe: impl Into<String>, path: &Path, reason: impl Into<String>) -> Self {
        Self::RewriteFailed {
            recipe: recipe.into(),
            path: path.to_path_buf(),
            reason: reason.into(),
        }
    }
}

/// Checkpoint creation errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CheckpointError {
    /// A required argument was absent or blank
    #[error("checkpoint argument missing or blank: {0}")]
    MissingArgument(&'static str),
}

/// Run-state errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StateError {
    /// Transition not in the allowed table
    #[error("illegal migration state transition: {from} -> {to}")]
    IllegalTransition {
        from: MigrationState,
        to: MigrationState,
    },
}

/// Refactoring errors surfaced to callers
#[derive(Debug, thiserror::Error)]
pub enum RefactorError {
    /// Recipe failure
    #[error(transparent)]
    Recipe(#[from] RecipeError),

    /// Checkpoint failure
    #[error(transparent)]
    Checkpoint(#[from] CheckpointError),

    /// State machine violation
    #[error(transparent)]
    State(#[from] StateError),

    /// Invalid recipe or record
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// File I/O failure
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Checkpoint referenced by an outcome is gone
    #[error("checkpoint not found: {0}")]
    CheckpointMissing(String),
}

impl RefactorError {
    /// Create I/O error with path
    pub fn io_error(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_carry_context() {
        let err = RecipeError::rewrite_failed("MigrateJpa", Path::new("src/A.java"), "boom");
        assert_eq!(err.to_string(), "recipe MigrateJpa failed on src/A.java: boom");

        let err = StateError::IllegalTransition {
            from: MigrationState::NotStarted,
            to: MigrationState::Complete,
        };
        assert_eq!(
            err.to_string(),
            "illegal migration state transition: NOT_STARTED -> COMPLETE"
        );
    }

    #[test]
    fn io_error_keeps_source() {
        use std::error::Error as _;
        let err = RefactorError::io_error(
            "a.java",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.source().is_some());
    }
}

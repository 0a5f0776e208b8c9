//! Error types for runtime verification
//!
//! Process failures (non-zero exit, timeout, memory ceiling) are data on the
//! result. Only the cases below are raised.

use jmig_graph::ValidationError;
use std::path::PathBuf;

/// External tool invocation failure; the OS cause is kept as the source
#[derive(Debug, thiserror::Error)]
pub enum ToolExecutionError {
    /// Process could not be started
    #[error("failed to spawn {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// Waiting on or killing a running process failed
    #[error("failed while waiting on {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },
}

impl ToolExecutionError {
    /// Program that failed
    #[must_use]
    pub fn program(&self) -> &str {
        match self {
            Self::Spawn { program, .. } | Self::Wait { program, .. } => program,
        }
    }
}

/// Errors surfaced by verifiers
#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    /// Options or records failed validation
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// External process could not be run
    #[error(transparent)]
    Tool(#[from] ToolExecutionError),

    /// Filesystem access failed
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl VerificationError {
    /// Create I/O error with path context
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
    use std::error::Error as _;

    #[test]
    fn spawn_error_keeps_cause() {
        let err = ToolExecutionError::Spawn {
            program: "java".to_string(),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
        };
        assert_eq!(err.program(), "java");
        assert!(err.to_string().contains("failed to spawn java"));
        assert!(err.source().is_some());

        let wrapped: VerificationError = err.into();
        assert!(wrapped.source().is_some());
    }
}

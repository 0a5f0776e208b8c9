//! JMIG Runtime - verification of migrated artifacts
//!
//! Provides:
//! - JVM failure classification into migration categories
//! - Output parsing, root-cause analysis and remediation steps
//! - Deadline- and memory-bounded process execution
//! - The `RuntimeVerifier` capability and its JVM implementation
//!
//! # Example
//!
//! ```rust
//! use jmig_runtime::{ErrorCategory, ErrorPatternMatcher};
//!
//! let category = ErrorPatternMatcher::determine_error_category(
//!     Some("java.lang.ClassNotFoundException: javax.servlet.Servlet"),
//!     Some("javax.servlet.http.HttpServlet"),
//! );
//! assert_eq!(category, ErrorCategory::NamespaceMigration);
//! assert!(category.is_jakarta_migration_related());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod analyzer;
pub mod error;
pub mod executor;
pub mod matcher;
pub mod types;
pub mod verifier;

pub use analyzer::ErrorAnalyzer;
pub use error::{ToolExecutionError, VerificationError};
pub use executor::{CommandSpec, ProcessExecutor, ProcessOutcome};
pub use matcher::ErrorPatternMatcher;
pub use types::{
    ErrorAnalysis, ErrorCategory, ErrorType, ExecutionMetrics, RemediationStep, RuntimeError,
    SimilarFailure, StackFrame, StackTrace, VerificationOptions, VerificationResult,
    VerificationStatus, Warning,
};
pub use verifier::{JvmRuntimeVerifier, RuntimeVerifier, StaticAnalysisResult};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for runtime verification
    pub use crate::{
        ErrorCategory, ErrorPatternMatcher, JvmRuntimeVerifier, RuntimeVerifier,
        VerificationError, VerificationOptions, VerificationResult, VerificationStatus,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

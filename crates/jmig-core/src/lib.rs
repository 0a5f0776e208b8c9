//! JMIG Core - the javax → jakarta migration pipeline
//!
//! Ties the workspace together:
//! - Loads and validates [`MigrationConfig`]
//! - Installs tracing output
//! - Runs assess → plan → migrate → verify as one [`MigrationPipeline`]
//! - Feeds runtime failures back into risk, blockers and readiness
//!
//! # Example
//!
//! ```rust
//! use jmig_core::MigrationConfig;
//!
//! let config = MigrationConfig::from_toml(
//!     r#"
//!     [refactoring]
//!     fail_on_residual = true
//!
//!     [verification]
//!     timeout_secs = 60
//!     "#,
//! )
//! .unwrap();
//! assert!(config.refactoring.fail_on_residual);
//! assert_eq!(config.verification.launcher, "java");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod config;
pub mod error;
pub mod feedback;
pub mod pipeline;
pub mod telemetry;

pub use config::{AnalysisConfig, ConfigError, MigrationConfig, RefactoringConfig, VerificationConfig};
pub use error::PipelineError;
pub use feedback::{apply_runtime_feedback, runtime_blockers, RUNTIME_RISK_STEP};
pub use pipeline::{MigrationPipeline, PipelineReport, RunId};
pub use telemetry::{init_json_tracing, init_tracing};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for driving a migration
    pub use crate::{MigrationConfig, MigrationPipeline, PipelineError, PipelineReport, RunId};
    pub use jmig_refactor::{MigrationState, RunControl};
    pub use jmig_runtime::{VerificationResult, VerificationStatus};
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

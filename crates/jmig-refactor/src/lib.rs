//! JMIG Refactor - checkpoint-protected javax → jakarta source rewriting
//!
//! Provides:
//! - Recipe catalog with idempotent text rewrites
//! - Source scanning for legacy imports, schema URIs and reflective lookups
//! - Migration planning with deterministic ordering
//! - Change tracking through per-file checkpoints
//! - The run state machine and the refactoring engine
//!
//! # Example
//!
//! ```rust
//! use jmig_refactor::{RecipeLibrary, ADD_JAKARTA_NAMESPACE};
//! use std::path::Path;
//!
//! let library = RecipeLibrary::with_defaults().unwrap();
//! let recipe = library.get_by_name(ADD_JAKARTA_NAMESPACE).unwrap();
//! let out = recipe
//!     .apply(Path::new("A.java"), "import javax.servlet.Filter;\nimport javax.sql.DataSource;\n")
//!     .unwrap();
//! assert_eq!(out, "import jakarta.servlet.Filter;\nimport javax.sql.DataSource;\n");
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod engine;
pub mod error;
pub mod library;
pub mod planner;
pub mod recipe;
pub mod scanner;
pub mod state;
pub mod tracker;

pub use engine::{
    ChangeDetail, ChangeType, RefactoringEngine, RefactoringFailure, RefactoringOutcome,
    ResidualReference, RunControl,
};
pub use error::{CheckpointError, RecipeError, RefactorError, StateError};
pub use library::{RecipeLibrary, ADD_JAKARTA_NAMESPACE, UPDATE_PERSISTENCE_XML, UPDATE_WEB_XML};
pub use planner::{DependencyUpdate, MigrationPlan, MigrationPlanner, PlanEntry, PlanPhase};
pub use recipe::{PackageRewrite, Recipe, RecipeKind, SafetyLevel, TextRewrite, XmlNamespaceRewrite};
pub use scanner::{
    FileUsage, ImportStatement, ReflectionUsage, RegexSourceScanner, SourceScanResult,
    SourceScanner,
};
pub use state::{allowed_transitions, validate_transition, MigrationState, RunState, StateTransition};
pub use tracker::{ChangeTracker, Checkpoint, CheckpointId};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for refactoring runs
    pub use crate::{
        ChangeTracker, MigrationPlan, MigrationPlanner, MigrationState, RecipeLibrary,
        RefactorError, RefactoringEngine, RefactoringOutcome, RegexSourceScanner, RunControl,
        SourceScanner,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

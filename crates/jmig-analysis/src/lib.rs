//! JMIG Analysis - migration readiness of a project's dependencies
//!
//! Provides:
//! - Maven and Gradle descriptor parsing into a dependency graph
//! - Per-artifact namespace classification
//! - Legacy → modern coordinate mapping
//! - Blocker detection, transitive conflict scan, risk and readiness scoring
//!
//! # Example
//!
//! ```rust
//! use jmig_analysis::DependencyAnalysisEngine;
//! use jmig_graph::{Artifact, Dependency, DependencyGraph, Scope};
//!
//! let app = Artifact::compile("org.acme", "shop", "1.0.0").unwrap();
//! let servlet = Artifact::compile("javax.servlet", "javax.servlet-api", "4.0.1").unwrap();
//! let mut graph = DependencyGraph::new();
//! graph.add_edge(Dependency::new(app, servlet, Scope::Provided, false));
//!
//! let report = DependencyAnalysisEngine::new().analyze_graph(graph).unwrap();
//! assert_eq!(report.recommendations.len(), 1);
//! assert!(report.blockers.is_empty());
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod classifier;
pub mod compatibility;
pub mod descriptor;
pub mod engine;
pub mod error;
pub mod mapping;
pub mod types;

pub use classifier::{classify_graph, NamespaceClassifier, RuleBasedClassifier};
pub use compatibility::{
    BinaryCompatibilityChecker, BinaryCompatibilityRecord, BreakingChange, BreakingChangeType,
    CompatibilityOutcome, CompatibilityStatus, KnownIncompatibilityChecker, UnavailableChecker,
};
pub use descriptor::{
    DeclaredDependency, DependencyGraphBuilder, DescriptorParser, GradleParser, MavenPomParser,
    ParsedDescriptor,
};
pub use engine::{compatibility_score, DependencyAnalysisEngine};
pub use error::AnalysisError;
pub use mapping::{JakartaMapping, JakartaMappingService, MappingEntry};
pub use types::{
    Blocker, BlockerType, ConflictType, DependencyAnalysisReport, MigrationReadinessScore,
    ReadinessWeights, RiskAssessment, TransitiveConflict, TransitiveConflictReport,
    VersionRecommendation,
};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for dependency analysis
    pub use crate::{
        AnalysisError, Blocker, BlockerType, DependencyAnalysisEngine, DependencyAnalysisReport,
        DependencyGraphBuilder, JakartaMappingService, NamespaceClassifier, ReadinessWeights,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

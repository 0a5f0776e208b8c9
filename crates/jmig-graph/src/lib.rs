//! JMIG Graph - dependency model shared by every migration stage
//!
//! Provides:
//! - Immutable artifact coordinates with structural equality
//! - A value-typed dependency graph with copy-on-read accessors
//! - The legacy/modern namespace vocabulary and classification map
//! - Lenient version comparison and declared-range evaluation
//!
//! # Example
//!
//! ```rust
//! use jmig_graph::{Artifact, Dependency, DependencyGraph, Scope};
//!
//! let app = Artifact::compile("org.acme", "shop", "1.0.0").unwrap();
//! let servlet = Artifact::compile("javax.servlet", "javax.servlet-api", "4.0.1").unwrap();
//!
//! let mut graph = DependencyGraph::new();
//! graph.add_edge(Dependency::new(app.clone(), servlet.clone(), Scope::Provided, false));
//!
//! assert!(graph.contains_node(&servlet));
//! assert_eq!(graph.descendants(&app), vec![servlet]);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod artifact;
pub mod error;
pub mod graph;
pub mod namespace;
pub mod version;

pub use artifact::{Artifact, Dependency, Scope, UNKNOWN_VERSION};
pub use error::{DependencyGraphError, ValidationError};
pub use graph::DependencyGraph;
pub use namespace::{
    legacy_family, namespace_of_package, to_modern_package, Namespace, NamespaceCompatibilityMap,
    JDK_RETAINED, LEGACY_PREFIX, MIGRATABLE_FAMILIES, MODERN_PREFIX,
};
pub use version::{Version, VersionConstraint, VersionRange};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with the dependency model
    pub use crate::{
        Artifact, Dependency, DependencyGraph, DependencyGraphError, Namespace,
        NamespaceCompatibilityMap, Scope, ValidationError, Version,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

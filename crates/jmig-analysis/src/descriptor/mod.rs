//! Build-descriptor parsing
//!
//! A parser turns one descriptor file into the project coordinate and the
//! raw list of declared dependencies. Detection order and graph assembly
//! live in [`builder`].

use jmig_graph::{Artifact, DependencyGraphError, Scope};
use std::fmt;
use std::path::{Path, PathBuf};

pub mod builder;
pub mod gradle;
pub mod maven;

pub use builder::DependencyGraphBuilder;
pub use gradle::GradleParser;
pub use maven::MavenPomParser;

/// One declared dependency
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeclaredDependency {
    /// Dependency coordinate
    pub artifact: Artifact,
    /// Declared scope
    pub scope: Scope,
    /// Declared optional
    pub optional: bool,
}

/// Parsed descriptor contents
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedDescriptor {
    /// Format name (`maven`, `gradle`)
    pub format: &'static str,
    /// Descriptor path
    pub path: PathBuf,
    /// Project coordinate
    pub project: Artifact,
    /// Declared dependencies in file order
    pub dependencies: Vec<DeclaredDependency>,
}

/// Parses one build-descriptor format
pub trait DescriptorParser: Send + Sync + fmt::Debug {
    /// Format name used in errors
    fn format(&self) -> &'static str;

    /// File names this parser recognises, in detection order
    fn descriptor_names(&self) -> &'static [&'static str];

    /// Parse descriptor text read from `path`
    ///
    /// # Errors
    /// Returns `DependencyGraphError::Malformed` or `InvalidCoordinate` when the
    /// content cannot be interpreted.
    fn parse(&self, path: &Path, content: &str) -> Result<ParsedDescriptor, DependencyGraphError>;
}

/// Name of the directory containing `path`, used as a fallback project id
pub(crate) fn directory_name(path: &Path) -> String {
    path.parent()
        .and_then(Path::file_name)
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty())
        .unwrap_or(jmig_graph::UNKNOWN_VERSION)
        .to_string()
}

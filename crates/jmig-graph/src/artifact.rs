//! Artifact coordinates and dependency edges
//!
//! Artifacts are immutable values. Equality and hashing are structural over
//! every coordinate field, so two independently built artifacts with the same
//! coordinates are the same graph node.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Placeholder used when a descriptor does not pin a version
pub const UNKNOWN_VERSION: &str = "unknown";

/// Dependency scope as declared in a build descriptor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// Available everywhere (default)
    #[default]
    Compile,
    /// Supplied by the container at runtime
    Provided,
    /// Needed only at runtime
    Runtime,
    /// Test classpath only
    Test,
    /// Explicit local path
    System,
    /// BOM import
    Import,
}

impl Scope {
    /// Parse descriptor text; unrecognised text maps to `Compile`
    #[must_use]
    pub fn parse(text: &str) -> Self {
        match text.trim().to_ascii_lowercase().as_str() {
            "provided" => Self::Provided,
            "runtime" => Self::Runtime,
            "test" => Self::Test,
            "system" => Self::System,
            "import" => Self::Import,
            _ => Self::Compile,
        }
    }

    /// Lowercase descriptor spelling
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Compile => "compile",
            Self::Provided => "provided",
            Self::Runtime => "runtime",
            Self::Test => "test",
            Self::System => "system",
            Self::Import => "import",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A versioned, coordinate-identified unit of a dependency graph
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Artifact {
    group_id: String,
    artifact_id: String,
    version: String,
    scope: Scope,
    transitive: bool,
}

impl Artifact {
    /// Create a validated artifact
    ///
    /// A blank version is stored as [`UNKNOWN_VERSION`].
    ///
    /// # Errors
    /// Returns `ValidationError::Blank` for a blank group or artifact id.
    pub fn new(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
        scope: Scope,
        transitive: bool,
    ) -> Result<Self, ValidationError> {
        let group_id = group_id.into();
        let artifact_id = artifact_id.into();
        let version = version.into();
        ValidationError::require_non_blank("groupId", &group_id)?;
        ValidationError::require_non_blank("artifactId", &artifact_id)?;

        let version = if version.trim().is_empty() {
            UNKNOWN_VERSION.to_string()
        } else {
            version.trim().to_string()
        };

        Ok(Self {
            group_id: group_id.trim().to_string(),
            artifact_id: artifact_id.trim().to_string(),
            version,
            scope,
            transitive,
        })
    }

    /// Direct compile-scope artifact
    ///
    /// # Errors
    /// Same as [`Artifact::new`].
    #[inline]
    pub fn compile(
        group_id: impl Into<String>,
        artifact_id: impl Into<String>,
        version: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        Self::new(group_id, artifact_id, version, Scope::Compile, false)
    }

    /// Group id
    #[inline]
    #[must_use]
    pub fn group_id(&self) -> &str {
        &self.group_id
    }

    /// Artifact id
    #[inline]
    #[must_use]
    pub fn artifact_id(&self) -> &str {
        &self.artifact_id
    }

    /// Declared version text
    #[inline]
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Declared scope
    #[inline]
    #[must_use]
    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Whether the artifact was pulled in transitively
    #[inline]
    #[must_use]
    pub fn is_transitive(&self) -> bool {
        self.transitive
    }

    /// `group:artifact:version`
    #[must_use]
    pub fn coordinate(&self) -> String {
        format!("{}:{}:{}", self.group_id, self.artifact_id, self.version)
    }

    /// `group:artifact`
    #[must_use]
    pub fn identifier(&self) -> String {
        format!("{}:{}", self.group_id, self.artifact_id)
    }

    /// Whether the version is a placeholder
    #[inline]
    #[must_use]
    pub fn has_unknown_version(&self) -> bool {
        self.version == UNKNOWN_VERSION
    }

    /// Copy with a different scope
    #[inline]
    #[must_use]
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    /// Copy marked as transitive
    #[inline]
    #[must_use]
    pub fn as_transitive(mut self) -> Self {
        self.transitive = true;
        self
    }
}

impl fmt::Display for Artifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.coordinate())
    }
}

/// Directed edge: `from` depends on `to`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dependency {
    /// Depending artifact
    pub from: Artifact,
    /// Depended-upon artifact
    pub to: Artifact,
    /// Scope of the edge
    pub scope: Scope,
    /// Declared optional
    pub optional: bool,
}

impl Dependency {
    /// Create edge
    #[inline]
    #[must_use]
    pub fn new(from: Artifact, to: Artifact, scope: Scope, optional: bool) -> Self {
        Self {
            from,
            to,
            scope,
            optional,
        }
    }
}

impl fmt::Display for Dependency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.scope)
    }
}

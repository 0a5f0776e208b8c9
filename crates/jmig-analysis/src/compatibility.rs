//! Binary-compatibility capability
//!
//! The checker is chosen at composition time. `UnavailableChecker` stands in
//! when no real tool is wired up and reports every check as an error, which
//! the engine records as an unknown outcome instead of failing the run.

use jmig_graph::Artifact;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

/// Kind of binary-incompatible change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BreakingChangeType {
    /// Class no longer exists
    ClassRemoved,
    /// Method no longer exists
    MethodRemoved,
    /// Method parameters or return type changed
    MethodSignatureChanged,
    /// Field no longer exists
    FieldRemoved,
    /// Field type changed
    FieldTypeChanged,
    /// Implemented interface removed
    InterfaceRemoved,
    /// Member visibility reduced
    VisibilityChanged,
    /// Anything else
    Other,
}

/// One binary-incompatible change between two artifacts
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakingChange {
    /// Change kind
    pub change_type: BreakingChangeType,
    /// Affected class
    pub class_name: String,
    /// Affected member, if the change is member-level
    pub member: Option<String>,
    /// Human-readable description
    pub description: String,
}

impl BreakingChange {
    /// Create class-level change
    #[inline]
    #[must_use]
    pub fn new(
        change_type: BreakingChangeType,
        class_name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            change_type,
            class_name: class_name.into(),
            member: None,
            description: description.into(),
        }
    }

    /// With affected member
    #[inline]
    #[must_use]
    pub fn with_member(mut self, member: impl Into<String>) -> Self {
        self.member = Some(member.into());
        self
    }
}

impl fmt::Display for BreakingChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.member {
            Some(member) => write!(f, "{:?} {}#{}: {}", self.change_type, self.class_name, member, self.description),
            None => write!(f, "{:?} {}: {}", self.change_type, self.class_name, self.description),
        }
    }
}

/// Result of comparing an artifact with its replacement
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CompatibilityOutcome {
    /// No breaking changes
    Compatible,
    /// Breaking changes found
    Incompatible(Vec<BreakingChange>),
    /// Check could not be performed
    Error(String),
}

/// Compares an old artifact against its replacement
pub trait BinaryCompatibilityChecker: Send + Sync + fmt::Debug {
    /// Compare `old` against `new`
    fn check(&self, old: &Artifact, new: &Artifact) -> CompatibilityOutcome;

    /// Whether a real check is performed
    fn is_available(&self) -> bool {
        true
    }
}

/// Stand-in used when no checking tool is available
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableChecker;

impl BinaryCompatibilityChecker for UnavailableChecker {
    fn check(&self, _old: &Artifact, _new: &Artifact) -> CompatibilityOutcome {
        CompatibilityOutcome::Error("binary compatibility checker unavailable".to_string())
    }

    fn is_available(&self) -> bool {
        false
    }
}

/// Checker answering from a table of known incompatible pairs
///
/// Pairs are keyed by `group:artifact` identifiers so any version of the old
/// artifact matches. Pairs not in the table are compatible.
#[derive(Debug, Clone, Default)]
pub struct KnownIncompatibilityChecker {
    known: HashMap<(String, String), Vec<BreakingChange>>,
}

impl KnownIncompatibilityChecker {
    /// Create empty table
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a known incompatible pair
    #[must_use]
    pub fn with_incompatibility(
        mut self,
        old_identifier: impl Into<String>,
        new_identifier: impl Into<String>,
        changes: Vec<BreakingChange>,
    ) -> Self {
        self.known
            .insert((old_identifier.into(), new_identifier.into()), changes);
        self
    }
}

impl BinaryCompatibilityChecker for KnownIncompatibilityChecker {
    fn check(&self, old: &Artifact, new: &Artifact) -> CompatibilityOutcome {
        match self.known.get(&(old.identifier(), new.identifier())) {
            Some(changes) => CompatibilityOutcome::Incompatible(changes.clone()),
            None => CompatibilityOutcome::Compatible,
        }
    }
}

/// Recorded status of one compatibility check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CompatibilityStatus {
    /// Checker reported compatible
    Compatible,
    /// Checker reported breaking changes
    Incompatible,
    /// Checker errored or is unavailable
    Unknown,
}

/// Per-artifact compatibility record kept in the analysis report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BinaryCompatibilityRecord {
    /// Artifact being replaced
    pub artifact: Artifact,
    /// Proposed replacement
    pub candidate: Artifact,
    /// Outcome
    pub status: CompatibilityStatus,
    /// Breaking changes or error text
    pub detail: Option<String>,
}

impl BinaryCompatibilityRecord {
    /// Fold a checker outcome into a record
    #[must_use]
    pub fn from_outcome(artifact: Artifact, candidate: Artifact, outcome: &CompatibilityOutcome) -> Self {
        let (status, detail) = match outcome {
            CompatibilityOutcome::Compatible => (CompatibilityStatus::Compatible, None),
            CompatibilityOutcome::Incompatible(changes) => {
                let text: Vec<String> = changes.iter().map(ToString::to_string).collect();
                (CompatibilityStatus::Incompatible, Some(text.join("; ")))
            }
            CompatibilityOutcome::Error(message) => (CompatibilityStatus::Unknown, Some(message.clone())),
        };
        Self {
            artifact,
            candidate,
            status,
            detail,
        }
    }
}

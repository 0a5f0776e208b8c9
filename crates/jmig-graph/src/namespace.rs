//! Namespace vocabulary and per-artifact classification map
//!
//! The legacy namespace is `javax.` and the modern namespace is `jakarta.`.
//! Only the enterprise API families moved; JDK-owned `javax` packages such as
//! `javax.sql`, `javax.crypto` or `javax.swing` are never migration targets.

use crate::artifact::Artifact;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Legacy package prefix
pub const LEGACY_PREFIX: &str = "javax.";

/// Modern package prefix
pub const MODERN_PREFIX: &str = "jakarta.";

/// Enterprise API families that moved from `javax.` to `jakarta.`
pub const MIGRATABLE_FAMILIES: &[&str] = &[
    "activation",
    "annotation",
    "batch",
    "decorator",
    "ejb",
    "el",
    "enterprise",
    "faces",
    "inject",
    "interceptor",
    "jms",
    "json",
    "json.bind",
    "mail",
    "persistence",
    "resource",
    "security.auth.message",
    "security.enterprise",
    "security.jacc",
    "servlet",
    "servlet.jsp",
    "transaction",
    "validation",
    "websocket",
    "ws.rs",
    "xml.bind",
    "xml.soap",
    "xml.ws",
];

/// Sub-packages of migratable families that stay in the JDK
pub const JDK_RETAINED: &[&str] = &["annotation.processing", "transaction.xa"];

/// Namespace classification of an artifact or source file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Namespace {
    /// Only legacy packages observed
    Legacy,
    /// Only modern packages observed
    Modern,
    /// Both prefixes observed
    Mixed,
    /// No signal
    #[default]
    Unknown,
}

impl Namespace {
    /// Legacy or Modern
    #[inline]
    #[must_use]
    pub fn is_classified(self) -> bool {
        matches!(self, Self::Legacy | Self::Modern)
    }

    /// Whether artifacts in this namespace still need migrating
    #[inline]
    #[must_use]
    pub fn needs_migration(self) -> bool {
        matches!(self, Self::Legacy | Self::Mixed)
    }

    /// Combine two observations
    #[must_use]
    pub fn merge(self, other: Self) -> Self {
        match (self, other) {
            (Self::Unknown, x) | (x, Self::Unknown) => x,
            (a, b) if a == b => a,
            _ => Self::Mixed,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Legacy => "LEGACY",
            Self::Modern => "MODERN",
            Self::Mixed => "MIXED",
            Self::Unknown => "UNKNOWN",
        };
        f.write_str(s)
    }
}

/// Migratable family a legacy package belongs to
///
/// Returns the longest matching entry of [`MIGRATABLE_FAMILIES`], or `None`
/// for JDK packages and anything outside the legacy prefix.
#[must_use]
pub fn legacy_family(package: &str) -> Option<&'static str> {
    let rest = package.strip_prefix(LEGACY_PREFIX)?;
    if JDK_RETAINED.iter().any(|kept| within(rest, kept)) {
        return None;
    }
    MIGRATABLE_FAMILIES
        .iter()
        .filter(|family| within(rest, family))
        .max_by_key(|family| family.len())
        .copied()
}

/// Modern name of a migratable legacy package or class
#[must_use]
pub fn to_modern_package(name: &str) -> Option<String> {
    legacy_family(name)?;
    name.strip_prefix(LEGACY_PREFIX)
        .map(|rest| format!("{MODERN_PREFIX}{rest}"))
}

/// Namespace signalled by a single package or class name
#[must_use]
pub fn namespace_of_package(name: &str) -> Namespace {
    if legacy_family(name).is_some() {
        Namespace::Legacy
    } else if name.starts_with(MODERN_PREFIX) {
        Namespace::Modern
    } else {
        Namespace::Unknown
    }
}

fn within(rest: &str, family: &str) -> bool {
    rest == family
        || rest
            .strip_prefix(family)
            .is_some_and(|tail| tail.starts_with('.'))
}

/// Artifact → namespace map; absent keys read as `Unknown`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamespaceCompatibilityMap {
    #[serde(with = "indexmap::map::serde_seq")]
    entries: IndexMap<Artifact, Namespace>,
}

impl NamespaceCompatibilityMap {
    /// Create empty map
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a classification, replacing any previous one
    pub fn put(&mut self, artifact: Artifact, namespace: Namespace) {
        self.entries.insert(artifact, namespace);
    }

    /// Classification of `artifact`, `Unknown` if never recorded
    #[must_use]
    pub fn get(&self, artifact: &Artifact) -> Namespace {
        self.entries.get(artifact).copied().unwrap_or_default()
    }

    /// Whether `artifact` has an explicit entry
    #[inline]
    #[must_use]
    pub fn contains(&self, artifact: &Artifact) -> bool {
        self.entries.contains_key(artifact)
    }

    /// Number of recorded artifacts
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is recorded
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&Artifact, Namespace)> {
        self.entries.iter().map(|(a, ns)| (a, *ns))
    }

    /// Number of artifacts with the given classification
    #[must_use]
    pub fn count(&self, namespace: Namespace) -> usize {
        self.entries.values().filter(|ns| **ns == namespace).count()
    }
}

impl FromIterator<(Artifact, Namespace)> for NamespaceCompatibilityMap {
    fn from_iter<I: IntoIterator<Item = (Artifact, Namespace)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

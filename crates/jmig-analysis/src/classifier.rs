//! Namespace Classifier
//!
//! Classification is a pure function of the artifact's coordinates plus an
//! optional, injected index of the packages observed inside each archive.
//! Distinct nodes are classified independently, so graph-wide classification
//! runs on rayon when requested.

use jmig_graph::{
    namespace_of_package, Artifact, DependencyGraph, Namespace, NamespaceCompatibilityMap, Version,
};
use rayon::prelude::*;
use std::collections::HashMap;
use std::fmt;

/// Classifies a single artifact
pub trait NamespaceClassifier: Send + Sync + fmt::Debug {
    /// Namespace of `artifact`; must be deterministic
    fn classify(&self, artifact: &Artifact) -> Namespace;
}

/// Modern artifacts with the first version that ships `jakarta.` packages
const MODERN_MINIMUMS: &[(&str, &str)] = &[
    ("jakarta.servlet:jakarta.servlet-api", "6.0.0"),
    ("jakarta.persistence:jakarta.persistence-api", "3.1.0"),
    ("jakarta.validation:jakarta.validation-api", "3.0.0"),
    ("jakarta.annotation:jakarta.annotation-api", "2.1.0"),
    ("jakarta.transaction:jakarta.transaction-api", "2.0.0"),
];

/// Artifacts known to ship `javax.` packages in every version
const KNOWN_LEGACY: &[&str] = &[
    "javax.servlet:javax.servlet-api",
    "javax.persistence:javax.persistence-api",
    "javax.validation:validation-api",
    "javax.annotation:javax.annotation-api",
    "javax:javaee-api",
    "javax:javaee-web-api",
];

/// Coordinate rules with an optional archive package index
#[derive(Debug, Clone, Default)]
pub struct RuleBasedClassifier {
    packages: HashMap<String, Vec<String>>,
}

impl RuleBasedClassifier {
    /// Classifier using coordinates only
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the packages observed inside an archive, keyed by `group:artifact`
    #[must_use]
    pub fn with_packages<I, S>(mut self, identifier: impl Into<String>, packages: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.packages
            .entry(identifier.into())
            .or_default()
            .extend(packages.into_iter().map(Into::into));
        self
    }

    fn classify_by_packages(&self, artifact: &Artifact) -> Option<Namespace> {
        let packages = self.packages.get(&artifact.identifier())?;
        let observed = packages
            .iter()
            .map(|p| namespace_of_package(p))
            .fold(Namespace::Unknown, Namespace::merge);
        observed.ne(&Namespace::Unknown).then_some(observed)
    }

    fn classify_by_coordinates(artifact: &Artifact) -> Namespace {
        let identifier = artifact.identifier();
        let version = Version::parse(artifact.version());

        // below the minimum the group prefix decides
        let known_modern = MODERN_MINIMUMS
            .iter()
            .any(|(id, minimum)| *id == identifier && version.at_least(minimum));
        if known_modern {
            return Namespace::Modern;
        }
        if KNOWN_LEGACY.contains(&identifier.as_str()) {
            return Namespace::Legacy;
        }

        let group = artifact.group_id();
        if group == "org.springframework.boot" {
            return if version.at_least("3.0.0") {
                Namespace::Modern
            } else {
                Namespace::Legacy
            };
        }
        if group == "org.springframework" && artifact.artifact_id().starts_with("spring-") {
            return if version.at_least("6.0.0") {
                Namespace::Modern
            } else {
                Namespace::Legacy
            };
        }

        namespace_of_package(group)
    }
}

impl NamespaceClassifier for RuleBasedClassifier {
    fn classify(&self, artifact: &Artifact) -> Namespace {
        self.classify_by_packages(artifact)
            .unwrap_or_else(|| Self::classify_by_coordinates(artifact))
    }
}

/// Classify every node of `graph`
#[must_use]
pub fn classify_graph(
    classifier: &dyn NamespaceClassifier,
    graph: &DependencyGraph,
    parallel: bool,
) -> NamespaceCompatibilityMap {
    let nodes: Vec<&Artifact> = graph.iter_nodes().collect();
    let classified: Vec<(Artifact, Namespace)> = if parallel {
        nodes
            .par_iter()
            .map(|a| ((*a).clone(), classifier.classify(a)))
            .collect()
    } else {
        nodes
            .iter()
            .map(|a| ((*a).clone(), classifier.classify(a)))
            .collect()
    };
    classified.into_iter().collect()
}

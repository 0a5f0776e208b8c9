//! Dependency Analysis Engine
//!
//! Orchestrates, strictly in order:
//! 1. Graph build
//! 2. Node-wise namespace classification
//! 3. Blocker detection (independent rules per artifact)
//! 4. Version recommendations for mapped artifacts
//! 5. Transitive conflict scan
//! 6. Risk assessment
//! 7. Readiness score
//!
//! Steps 2 and 3 carry no shared mutable state and run on rayon when
//! parallelism is enabled.

use crate::classifier::{classify_graph, NamespaceClassifier, RuleBasedClassifier};
use crate::compatibility::{
    BinaryCompatibilityChecker, BinaryCompatibilityRecord, CompatibilityOutcome, UnavailableChecker,
};
use crate::descriptor::DependencyGraphBuilder;
use crate::error::AnalysisError;
use crate::mapping::{JakartaMapping, JakartaMappingService};
use crate::types::{
    Blocker, BlockerType, ConflictType, DependencyAnalysisReport, MigrationReadinessScore,
    ReadinessWeights, RiskAssessment, TransitiveConflict, TransitiveConflictReport,
    VersionRecommendation,
};
use indexmap::IndexSet;
use jmig_graph::{
    Artifact, DependencyGraph, Namespace, NamespaceCompatibilityMap, ValidationError, Version,
    VersionConstraint,
};
use rayon::prelude::*;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Share of the risk score driven by blockers; the rest comes from conflicts
const BLOCKER_RISK_SHARE: f64 = 0.75;

/// Per-artifact rule output
type Evaluation = (Vec<Blocker>, Option<BinaryCompatibilityRecord>);

/// Dependency analysis orchestrator
#[derive(Debug, Clone)]
pub struct DependencyAnalysisEngine {
    builder: Arc<DependencyGraphBuilder>,
    classifier: Arc<dyn NamespaceClassifier>,
    mapping: JakartaMappingService,
    checker: Arc<dyn BinaryCompatibilityChecker>,
    weights: ReadinessWeights,
    parallel: bool,
}

impl DependencyAnalysisEngine {
    /// Engine with the built-in classifier and mapping table and no
    /// binary-compatibility tool
    #[must_use]
    pub fn new() -> Self {
        Self {
            builder: Arc::new(DependencyGraphBuilder::new()),
            classifier: Arc::new(RuleBasedClassifier::new()),
            mapping: JakartaMappingService::new(),
            checker: Arc::new(UnavailableChecker),
            weights: ReadinessWeights::default(),
            parallel: true,
        }
    }

    /// Use a different graph builder
    #[inline]
    #[must_use]
    pub fn with_builder(mut self, builder: DependencyGraphBuilder) -> Self {
        self.builder = Arc::new(builder);
        self
    }

    /// Use a different classifier
    #[inline]
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn NamespaceClassifier>) -> Self {
        self.classifier = classifier;
        self
    }

    /// Use a different mapping service
    #[inline]
    #[must_use]
    pub fn with_mapping_service(mut self, mapping: JakartaMappingService) -> Self {
        self.mapping = mapping;
        self
    }

    /// Use a binary-compatibility checker
    #[inline]
    #[must_use]
    pub fn with_checker(mut self, checker: Arc<dyn BinaryCompatibilityChecker>) -> Self {
        self.checker = checker;
        self
    }

    /// Use different readiness weights
    #[inline]
    #[must_use]
    pub fn with_weights(mut self, weights: ReadinessWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Toggle rayon for classification and blocker rules
    #[inline]
    #[must_use]
    pub fn with_parallelism(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Mapping service in use
    #[inline]
    #[must_use]
    pub fn mapping(&self) -> &JakartaMappingService {
        &self.mapping
    }

    /// Readiness weights in use
    #[inline]
    #[must_use]
    pub fn weights(&self) -> ReadinessWeights {
        self.weights
    }

    /// Full analysis of a project directory
    ///
    /// # Errors
    /// Returns `AnalysisError::GraphBuild` when no descriptor is found or it
    /// cannot be parsed.
    pub fn analyze_project(&self, root: impl AsRef<Path>) -> Result<DependencyAnalysisReport, AnalysisError> {
        let graph = self.builder.build_from_project(root)?;
        self.analyze_graph(graph)
    }

    /// Full analysis of an already built graph
    ///
    /// # Errors
    /// Only if a derived record fails validation, which indicates a bug.
    pub fn analyze_graph(&self, graph: DependencyGraph) -> Result<DependencyAnalysisReport, AnalysisError> {
        let namespaces = self.identify_namespaces(&graph);
        let (blockers, binary_compatibility) = self.detect_blockers(&graph, &namespaces)?;
        let recommendations = self.recommend_versions(&graph)?;
        let transitive_conflicts = Self::analyze_transitive_conflicts(&graph, &namespaces);
        let risk = Self::assess_risk(&graph, &namespaces, &blockers, &transitive_conflicts)?;
        let readiness = self.readiness_score(&graph, &blockers, &risk)?;

        info!(
            "Analysis complete: {} nodes, {} blockers, {} recommendations, risk {:.2}, readiness {:.2}",
            graph.node_count(),
            blockers.len(),
            recommendations.len(),
            risk.risk_score(),
            readiness.score()
        );

        Ok(DependencyAnalysisReport {
            graph,
            namespaces,
            blockers,
            recommendations,
            transitive_conflicts,
            binary_compatibility,
            risk,
            readiness,
        })
    }

    /// Classify every node
    #[must_use]
    pub fn identify_namespaces(&self, graph: &DependencyGraph) -> NamespaceCompatibilityMap {
        let map = classify_graph(self.classifier.as_ref(), graph, self.parallel);
        debug!(
            "Classified {} nodes: {} legacy, {} modern, {} mixed",
            map.len(),
            map.count(Namespace::Legacy),
            map.count(Namespace::Modern),
            map.count(Namespace::Mixed)
        );
        map
    }

    /// Evaluate every blocker rule on every node
    ///
    /// Also returns one compatibility record per checked artifact, including
    /// checks that degraded to unknown.
    ///
    /// # Errors
    /// Only if a blocker fails validation.
    pub fn detect_blockers(
        &self,
        graph: &DependencyGraph,
        namespaces: &NamespaceCompatibilityMap,
    ) -> Result<(Vec<Blocker>, Vec<BinaryCompatibilityRecord>), ValidationError> {
        let nodes: Vec<&Artifact> = graph.iter_nodes().collect();
        let evaluations: Vec<Result<Evaluation, ValidationError>> = if self.parallel {
            nodes
                .par_iter()
                .map(|a| self.evaluate(graph, namespaces, a))
                .collect()
        } else {
            nodes
                .iter()
                .map(|a| self.evaluate(graph, namespaces, a))
                .collect()
        };

        let mut blockers = Vec::new();
        let mut records = Vec::new();
        for evaluation in evaluations {
            let (found, record) = evaluation?;
            blockers.extend(found);
            records.extend(record);
        }
        debug!("Detected {} blockers", blockers.len());
        Ok((blockers, records))
    }

    fn evaluate(
        &self,
        graph: &DependencyGraph,
        namespaces: &NamespaceCompatibilityMap,
        artifact: &Artifact,
    ) -> Result<Evaluation, ValidationError> {
        let namespace = namespaces.get(artifact);
        let mapping = self.mapping.find_mapping(artifact);
        let mut blockers = Vec::new();
        let mut record = None;

        if namespace.needs_migration() && mapping.is_none() {
            let confidence = if namespace == Namespace::Legacy { 0.9 } else { 0.6 };
            blockers.push(Blocker::new(
                artifact.clone(),
                BlockerType::NoModernEquivalent,
                format!("No Jakarta equivalent known for {}", artifact.identifier()),
                vec![
                    "Search for an alternative library that supports the jakarta namespace".to_string(),
                    "Repackage the library with a bytecode transformer".to_string(),
                    "Ask the maintainer for a Jakarta release".to_string(),
                ],
                confidence,
            )?);
        }

        if namespace == Namespace::Mixed {
            let classified_ancestors = graph
                .ancestors(artifact)
                .iter()
                .filter(|a| namespaces.get(a).is_classified())
                .count();
            if classified_ancestors > 1 {
                blockers.push(Blocker::new(
                    artifact.clone(),
                    BlockerType::TransitiveConflict,
                    format!(
                        "{} mixes javax and jakarta packages and is reachable from {classified_ancestors} classified artifacts",
                        artifact.identifier()
                    ),
                    vec![
                        "Pin a single namespace generation through dependency management".to_string(),
                        "Exclude the mixed artifact and depend on the modern split directly".to_string(),
                    ],
                    0.7,
                )?);
            }
        }

        if let Some(mapping) = &mapping {
            let outcome = self.checker.check(artifact, &mapping.modern);
            if let CompatibilityOutcome::Incompatible(changes) = &outcome {
                let summary: Vec<String> = changes.iter().map(ToString::to_string).collect();
                blockers.push(Blocker::new(
                    artifact.clone(),
                    BlockerType::BinaryIncompatible,
                    format!(
                        "{} is not binary compatible with {}: {}",
                        artifact.coordinate(),
                        mapping.modern.coordinate(),
                        summary.join("; ")
                    ),
                    vec![
                        "Recompile dependants against the new artifact".to_string(),
                        "Adapt call sites to the changed API".to_string(),
                    ],
                    0.85,
                )?);
            }
            record = Some(BinaryCompatibilityRecord::from_outcome(
                artifact.clone(),
                mapping.modern.clone(),
                &outcome,
            ));

            blockers.extend(Self::version_blocker(artifact, mapping)?);
        }

        Ok((blockers, record))
    }

    fn version_blocker(artifact: &Artifact, mapping: &JakartaMapping) -> Result<Option<Blocker>, ValidationError> {
        let target = Version::parse(mapping.modern.version());
        let blocker = match VersionConstraint::parse(artifact.version()) {
            VersionConstraint::Unresolved => Some(Blocker::new(
                artifact.clone(),
                BlockerType::VersionIncompatible,
                format!(
                    "Declared version of {} is unresolved; cannot confirm {} is acceptable",
                    artifact.identifier(),
                    mapping.modern.version()
                ),
                vec!["Declare an explicit version before migrating".to_string()],
                0.3,
            )?),
            constraint @ VersionConstraint::Ranges(_) if !constraint.allows(&target) => Some(Blocker::new(
                artifact.clone(),
                BlockerType::VersionIncompatible,
                format!(
                    "Declared range {} of {} excludes {}",
                    artifact.version(),
                    artifact.identifier(),
                    mapping.modern.coordinate()
                ),
                vec![
                    format!("Widen the declared range to include {}", mapping.modern.version()),
                    "Replace the range with the recommended version".to_string(),
                ],
                0.8,
            )?),
            _ => None,
        };
        Ok(blocker)
    }

    /// Recommendations for every mapped artifact
    ///
    /// # Errors
    /// Only if a recommendation fails validation.
    pub fn recommend_versions(&self, graph: &DependencyGraph) -> Result<Vec<VersionRecommendation>, ValidationError> {
        graph
            .iter_nodes()
            .filter_map(|a| self.mapping.find_mapping(a).map(|m| (a, m)))
            .map(|(artifact, mapping)| {
                let score = compatibility_score(artifact, &mapping.modern, mapping.breaking_changes.len());
                let path = if mapping.notes.is_empty() {
                    format!("{} → {}", artifact.coordinate(), mapping.modern.coordinate())
                } else {
                    format!(
                        "{} → {} ({})",
                        artifact.coordinate(),
                        mapping.modern.coordinate(),
                        mapping.notes
                    )
                };
                VersionRecommendation::new(
                    artifact.clone(),
                    mapping.modern,
                    path,
                    mapping.breaking_changes,
                    score,
                )
            })
            .collect()
    }

    /// Root → descendant namespace mismatches
    #[must_use]
    pub fn analyze_transitive_conflicts(
        graph: &DependencyGraph,
        namespaces: &NamespaceCompatibilityMap,
    ) -> TransitiveConflictReport {
        let mut conflicts = Vec::new();
        for root in graph.roots() {
            let root_ns = namespaces.get(&root);
            let descendants = graph.descendants(&root);

            if root_ns.is_classified() {
                for descendant in descendants {
                    let conflict_type = match (root_ns, namespaces.get(&descendant)) {
                        (Namespace::Legacy, Namespace::Modern) => ConflictType::ModernUnderLegacy,
                        (Namespace::Modern, Namespace::Legacy) => ConflictType::LegacyUnderModern,
                        (_, Namespace::Mixed) => ConflictType::MixedDescendant,
                        _ => continue,
                    };
                    let description = format!(
                        "{} ({root_ns}) depends on {} ({})",
                        root.coordinate(),
                        descendant.coordinate(),
                        namespaces.get(&descendant)
                    );
                    conflicts.push(TransitiveConflict {
                        root: root.clone(),
                        conflicting: descendant,
                        conflict_type,
                        description,
                    });
                }
            } else {
                let has = |ns: Namespace| descendants.iter().any(|d| namespaces.get(d) == ns);
                if has(Namespace::Legacy) && has(Namespace::Modern) {
                    for descendant in descendants.iter().filter(|d| namespaces.get(d) == Namespace::Legacy) {
                        conflicts.push(TransitiveConflict {
                            root: root.clone(),
                            conflicting: descendant.clone(),
                            conflict_type: ConflictType::MixedSubtree,
                            description: format!(
                                "{} pulls in legacy {} alongside jakarta artifacts",
                                root.coordinate(),
                                descendant.coordinate()
                            ),
                        });
                    }
                }
            }
        }
        TransitiveConflictReport::new(conflicts)
    }

    /// Weighted aggregate of blocker severity and conflict density
    ///
    /// # Errors
    /// Only if the computed score leaves `[0, 1]`, which indicates a bug.
    pub fn assess_risk(
        graph: &DependencyGraph,
        namespaces: &NamespaceCompatibilityMap,
        blockers: &[Blocker],
        conflicts: &TransitiveConflictReport,
    ) -> Result<RiskAssessment, ValidationError> {
        let needing_migration = namespaces.count(Namespace::Legacy) + namespaces.count(Namespace::Mixed);
        let weight: f64 = blockers.iter().map(Blocker::weight).sum();
        let blocker_part = (weight / needing_migration.max(1) as f64).min(1.0);
        let conflict_part = (conflicts.total as f64 / graph.node_count().max(1) as f64).min(1.0);
        let score = (BLOCKER_RISK_SHARE * blocker_part + (1.0 - BLOCKER_RISK_SHARE) * conflict_part).clamp(0.0, 1.0);

        let mut factors = Vec::new();
        if needing_migration > 0 {
            factors.push(format!("{needing_migration} artifact(s) still use the javax namespace"));
        }
        for blocker_type in [
            BlockerType::NoModernEquivalent,
            BlockerType::BinaryIncompatible,
            BlockerType::TransitiveConflict,
            BlockerType::VersionIncompatible,
        ] {
            let count = blockers.iter().filter(|b| b.blocker_type() == blocker_type).count();
            if count > 0 {
                factors.push(format!("{count} artifact(s) blocked by {blocker_type}"));
            }
        }
        if conflicts.total > 0 {
            factors.push(format!("{} transitive namespace conflict(s)", conflicts.total));
        }

        let mut mitigations: IndexSet<String> = blockers
            .iter()
            .flat_map(|b| b.mitigation_strategies().iter().cloned())
            .collect();
        if conflicts.total > 0 {
            mitigations.insert("Align transitive dependencies on one namespace through dependency management".to_string());
        }
        if score > 0.0 {
            mitigations.insert("Migrate incrementally and verify at runtime after each phase".to_string());
        }

        RiskAssessment::new(score, factors, mitigations.into_iter().collect())
    }

    /// `clamp01(w1 * fraction_not_blocked + w2 * (1 - risk))`
    ///
    /// # Errors
    /// Only if the computed score leaves `[0, 1]`, which indicates a bug.
    pub fn readiness_score(
        &self,
        graph: &DependencyGraph,
        blockers: &[Blocker],
        risk: &RiskAssessment,
    ) -> Result<MigrationReadinessScore, ValidationError> {
        let blocked: HashSet<&Artifact> = blockers.iter().map(Blocker::artifact).collect();
        let total = graph.node_count();
        let fraction = if total == 0 {
            1.0
        } else {
            let unblocked = graph.iter_nodes().filter(|a| !blocked.contains(a)).count();
            unblocked as f64 / total as f64
        };
        let score = self.weights.combine(fraction, risk.risk_score());
        MigrationReadinessScore::new(
            score,
            format!(
                "{:.0}% of {total} artifact(s) unblocked, {} blocker(s), risk {:.2}",
                fraction * 100.0,
                blockers.len(),
                risk.risk_score()
            ),
        )
    }
}

impl Default for DependencyAnalysisEngine {
    fn default() -> Self {
        Self::new()
    }
}

/// Distance-based score for replacing `old` with `new`
#[must_use]
pub fn compatibility_score(old: &Artifact, new: &Artifact, breaking_changes: usize) -> f64 {
    let mut score = 1.0;
    if old.group_id() != new.group_id() {
        score -= 0.15;
    }
    if old.artifact_id() != new.artifact_id() {
        score -= 0.10;
    }
    if !old.has_unknown_version() {
        let from = Version::parse(old.version()).major();
        let to = Version::parse(new.version()).major();
        if to.abs_diff(from) > 1 {
            score -= 0.15;
        }
    }
    score -= 0.05 * breaking_changes as f64;
    f64::clamp(score, 0.0, 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compatibility::{BreakingChange, BreakingChangeType, KnownIncompatibilityChecker};
    use crate::mapping::MappingEntry;
    use jmig_graph::{Dependency, Scope};

    fn art(g: &str, a: &str, v: &str) -> Artifact {
        Artifact::compile(g, a, v).unwrap()
    }

    fn project_with(deps: &[Artifact]) -> DependencyGraph {
        let root = art("com.acme", "app", "1.0");
        let mut graph = DependencyGraph::new();
        graph.add_node(root.clone());
        for d in deps {
            graph.add_edge(Dependency::new(root.clone(), d.clone(), Scope::Compile, false));
        }
        graph
    }

    #[test]
    fn unmapped_legacy_artifact_blocks() {
        let engine = DependencyAnalysisEngine::new();
        let report = engine
            .analyze_graph(project_with(&[art("javax.faces", "legacy-ui", "1.0")]))
            .unwrap();
        let blockers: Vec<_> = report.blockers_of(BlockerType::NoModernEquivalent).collect();
        assert_eq!(blockers.len(), 1);
        assert!((blockers[0].confidence() - 0.9).abs() < 1e-12);
        assert!(report.recommendations.is_empty());
    }

    #[test]
    fn early_jakarta_release_is_not_blocked() {
        let servlet5 = art("jakarta.servlet", "jakarta.servlet-api", "5.0.0");
        let report = DependencyAnalysisEngine::new()
            .analyze_graph(project_with(&[servlet5.clone()]))
            .unwrap();
        assert_eq!(report.namespaces.get(&servlet5), Namespace::Modern);
        assert_eq!(report.blockers_of(BlockerType::NoModernEquivalent).count(), 0);
        assert!(report.blockers.is_empty());
    }

    #[test]
    fn jdk_owned_javax_group_is_not_blocked() {
        let cache = art("javax.cache", "cache-api", "1.1.1");
        let report = DependencyAnalysisEngine::new()
            .analyze_graph(project_with(&[cache.clone()]))
            .unwrap();
        assert_eq!(report.namespaces.get(&cache), Namespace::Unknown);
        assert!(report.blockers.is_empty());
        assert!((report.readiness.score() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn spring_boot_two_is_an_upgrade_not_a_blocker() {
        let starter = art("org.springframework.boot", "spring-boot-starter-web", "2.7.18");
        let report = DependencyAnalysisEngine::new()
            .analyze_graph(project_with(&[starter.clone()]))
            .unwrap();
        assert_eq!(report.namespaces.get(&starter), Namespace::Legacy);
        assert!(report.blockers.is_empty());
        assert_eq!(report.recommendations.len(), 1);
        let rec = &report.recommendations[0];
        assert_eq!(rec.current_artifact(), &starter);
        assert_eq!(
            rec.recommended_artifact().coordinate(),
            "org.springframework.boot:spring-boot-starter-web:3.2.5"
        );
    }

    #[test]
    fn unknown_artifacts_are_not_blockers() {
        let engine = DependencyAnalysisEngine::new();
        let report = engine
            .analyze_graph(project_with(&[art("com.google.guava", "guava", "32.1.3-jre")]))
            .unwrap();
        assert!(report.blockers.is_empty());
        assert!((report.readiness.score() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn mapped_artifact_is_recommended_and_degraded_check_recorded() {
        let engine = DependencyAnalysisEngine::new();
        let report = engine
            .analyze_graph(project_with(&[art("javax.servlet", "javax.servlet-api", "4.0.1")]))
            .unwrap();
        assert!(report.blockers.is_empty());
        assert_eq!(report.recommendations.len(), 1);
        let rec = &report.recommendations[0];
        assert_eq!(rec.recommended_artifact().group_id(), "jakarta.servlet");
        assert!(rec.compatibility_score() < 1.0);
        assert_eq!(report.binary_compatibility.len(), 1);
        assert_eq!(
            report.binary_compatibility[0].status,
            crate::compatibility::CompatibilityStatus::Unknown
        );
    }

    #[test]
    fn incompatible_check_raises_binary_blocker() {
        let old = art("javax.xml.bind", "jaxb-api", "2.3.1");
        let checker = KnownIncompatibilityChecker::new().with_incompatibility(
            "javax.xml.bind:jaxb-api",
            "jakarta.xml.bind:jakarta.xml.bind-api",
            vec![BreakingChange::new(BreakingChangeType::ClassRemoved, "javax.xml.bind.Foo", "gone")],
        );
        let engine = DependencyAnalysisEngine::new().with_checker(Arc::new(checker));
        let report = engine.analyze_graph(project_with(&[old])).unwrap();
        assert_eq!(report.blockers_of(BlockerType::BinaryIncompatible).count(), 1);
    }

    #[test]
    fn range_excluding_target_is_version_incompatible() {
        let engine = DependencyAnalysisEngine::new();
        let report = engine
            .analyze_graph(project_with(&[art("javax.servlet", "javax.servlet-api", "[3.0,5.0)")]))
            .unwrap();
        let found: Vec<_> = report.blockers_of(BlockerType::VersionIncompatible).collect();
        assert_eq!(found.len(), 1);
        assert!((found[0].confidence() - 0.8).abs() < 1e-12);
    }

    #[test]
    fn unresolved_version_is_low_confidence_blocker() {
        let engine = DependencyAnalysisEngine::new();
        let report = engine
            .analyze_graph(project_with(&[art("javax.servlet", "javax.servlet-api", "unknown")]))
            .unwrap();
        let found: Vec<_> = report.blockers_of(BlockerType::VersionIncompatible).collect();
        assert_eq!(found.len(), 1);
        assert!((found[0].confidence() - 0.3).abs() < 1e-12);
    }

    #[test]
    fn mixed_artifact_with_two_classified_ancestors() {
        let bridge = art("com.acme", "bridge", "1.0");
        let legacy = art("javax.servlet", "javax.servlet-api", "4.0.1");
        let modern = art("jakarta.servlet", "jakarta.servlet-api", "6.0.0");
        let mut graph = DependencyGraph::new();
        graph.add_edge(Dependency::new(legacy.clone(), bridge.clone(), Scope::Compile, false));
        graph.add_edge(Dependency::new(modern.clone(), bridge.clone(), Scope::Compile, false));

        let classifier = RuleBasedClassifier::new()
            .with_packages("com.acme:bridge", ["javax.servlet", "jakarta.servlet"]);
        let engine = DependencyAnalysisEngine::new().with_classifier(Arc::new(classifier));
        let report = engine.analyze_graph(graph).unwrap();

        assert_eq!(report.blockers_of(BlockerType::TransitiveConflict).count(), 1);
        assert_eq!(report.blockers_of(BlockerType::NoModernEquivalent).count(), 1);
        // both roots are classified and reach the mixed bridge
        assert_eq!(report.transitive_conflicts.total, 2);
        assert!(report
            .transitive_conflicts
            .conflicts
            .iter()
            .all(|c| c.conflict_type == ConflictType::MixedDescendant));
    }

    #[test]
    fn unclassified_root_with_both_namespaces_is_mixed_subtree() {
        let graph = project_with(&[
            art("javax.servlet", "javax.servlet-api", "4.0.1"),
            art("jakarta.persistence", "jakarta.persistence-api", "3.1.0"),
        ]);
        let map = DependencyAnalysisEngine::new().identify_namespaces(&graph);
        let report = DependencyAnalysisEngine::analyze_transitive_conflicts(&graph, &map);
        assert_eq!(report.total, 1);
        assert_eq!(report.conflicts[0].conflict_type, ConflictType::MixedSubtree);
    }

    #[test]
    fn legacy_root_over_modern_child() {
        let root = art("javax.faces", "legacy-ui", "1.0");
        let child = art("jakarta.servlet", "jakarta.servlet-api", "6.0.0");
        let mut graph = DependencyGraph::new();
        graph.add_edge(Dependency::new(root, child, Scope::Compile, false));
        let map = DependencyAnalysisEngine::new().identify_namespaces(&graph);
        let report = DependencyAnalysisEngine::analyze_transitive_conflicts(&graph, &map);
        assert_eq!(report.conflicts[0].conflict_type, ConflictType::ModernUnderLegacy);
    }

    #[test]
    fn empty_graph_is_ready() {
        let report = DependencyAnalysisEngine::new()
            .analyze_graph(DependencyGraph::new())
            .unwrap();
        assert!((report.readiness.score() - 1.0).abs() < 1e-12);
        assert!(report.risk.risk_score().abs() < 1e-12);
    }

    #[test]
    fn score_penalises_distance() {
        let old = art("org.hibernate", "hibernate-validator", "6.2.0");
        let new = art("org.hibernate.validator", "hibernate-validator", "8.0.0");
        let same = art("org.hibernate", "hibernate-validator", "7.0.0");
        assert!(compatibility_score(&old, &new, 0) < compatibility_score(&old, &same, 0));
        assert!(compatibility_score(&old, &new, 100).abs() < 1e-12);
    }

    #[test]
    fn sequential_matches_parallel() {
        let graph = project_with(&[
            art("javax.servlet", "javax.servlet-api", "4.0.1"),
            art("javax.activation", "activation", "1.1"),
            art("org.slf4j", "slf4j-api", "2.0.9"),
        ]);
        let parallel = DependencyAnalysisEngine::new().analyze_graph(graph.clone()).unwrap();
        let sequential = DependencyAnalysisEngine::new()
            .with_parallelism(false)
            .analyze_graph(graph)
            .unwrap();
        assert_eq!(parallel, sequential);
    }

    #[test]
    fn custom_mapping_unblocks() {
        let legacy = art("javax.faces", "legacy-ui", "1.0");
        let mapping = JakartaMappingService::new().with_mapping(
            "javax.faces:legacy-ui",
            MappingEntry {
                group_id: "jakarta.faces".into(),
                artifact_id: "modern-ui".into(),
                version: "2.0".into(),
                notes: String::new(),
                breaking_changes: vec![],
            },
        );
        let report = DependencyAnalysisEngine::new()
            .with_mapping_service(mapping)
            .analyze_graph(project_with(&[legacy]))
            .unwrap();
        assert!(report.blockers.is_empty());
    }
}

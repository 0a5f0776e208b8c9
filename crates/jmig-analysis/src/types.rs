//! Analysis records
//!
//! Scored records are built through smart constructors that reject values
//! outside `[0, 1]`, so an out-of-range score is never observable. Records
//! are serializable for export; they are not deserialized back.

use crate::compatibility::BinaryCompatibilityRecord;
use jmig_graph::{Artifact, DependencyGraph, NamespaceCompatibilityMap, ValidationError};
use serde::Serialize;
use std::fmt;

/// Why an artifact blocks migration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BlockerType {
    /// No modern coordinate is known
    NoModernEquivalent,
    /// Mixed artifact reachable from several classified ancestors
    TransitiveConflict,
    /// Replacement breaks binary compatibility
    BinaryIncompatible,
    /// Declared version cannot accept the replacement
    VersionIncompatible,
}

impl BlockerType {
    /// Weight of this blocker in the risk aggregate
    #[inline]
    #[must_use]
    pub fn severity(self) -> f64 {
        match self {
            Self::NoModernEquivalent => 1.0,
            Self::BinaryIncompatible => 0.8,
            Self::TransitiveConflict => 0.6,
            Self::VersionIncompatible => 0.5,
        }
    }
}

impl fmt::Display for BlockerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::NoModernEquivalent => "NO_MODERN_EQUIVALENT",
            Self::TransitiveConflict => "TRANSITIVE_CONFLICT",
            Self::BinaryIncompatible => "BINARY_INCOMPATIBLE",
            Self::VersionIncompatible => "VERSION_INCOMPATIBLE",
        };
        f.write_str(s)
    }
}

/// Condition preventing migration of one artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Blocker {
    artifact: Artifact,
    blocker_type: BlockerType,
    reason: String,
    mitigation_strategies: Vec<String>,
    confidence: f64,
}

impl Blocker {
    /// Create blocker
    ///
    /// # Errors
    /// Rejects a blank reason or a confidence outside `[0, 1]`.
    pub fn new(
        artifact: Artifact,
        blocker_type: BlockerType,
        reason: impl Into<String>,
        mitigation_strategies: Vec<String>,
        confidence: f64,
    ) -> Result<Self, ValidationError> {
        let reason = reason.into();
        ValidationError::require_non_blank("reason", &reason)?;
        let confidence = ValidationError::require_unit("confidence", confidence)?;
        Ok(Self {
            artifact,
            blocker_type,
            reason,
            mitigation_strategies,
            confidence,
        })
    }

    /// Blocked artifact
    #[inline]
    #[must_use]
    pub fn artifact(&self) -> &Artifact {
        &self.artifact
    }

    /// Blocker kind
    #[inline]
    #[must_use]
    pub fn blocker_type(&self) -> BlockerType {
        self.blocker_type
    }

    /// Human-readable reason
    #[inline]
    #[must_use]
    pub fn reason(&self) -> &str {
        &self.reason
    }

    /// Ordered mitigation strategies
    #[inline]
    #[must_use]
    pub fn mitigation_strategies(&self) -> &[String] {
        &self.mitigation_strategies
    }

    /// Confidence in `[0, 1]`
    #[inline]
    #[must_use]
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Severity-weighted confidence
    #[inline]
    #[must_use]
    pub fn weight(&self) -> f64 {
        self.blocker_type.severity() * self.confidence
    }
}

/// Suggested replacement for a mapped artifact
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VersionRecommendation {
    current_artifact: Artifact,
    recommended_artifact: Artifact,
    migration_path: String,
    breaking_changes: Vec<String>,
    compatibility_score: f64,
}

impl VersionRecommendation {
    /// Create recommendation
    ///
    /// # Errors
    /// Rejects a compatibility score outside `[0, 1]`.
    pub fn new(
        current_artifact: Artifact,
        recommended_artifact: Artifact,
        migration_path: impl Into<String>,
        breaking_changes: Vec<String>,
        compatibility_score: f64,
    ) -> Result<Self, ValidationError> {
        let compatibility_score =
            ValidationError::require_unit("compatibilityScore", compatibility_score)?;
        Ok(Self {
            current_artifact,
            recommended_artifact,
            migration_path: migration_path.into(),
            breaking_changes,
            compatibility_score,
        })
    }

    /// Artifact being replaced
    #[inline]
    #[must_use]
    pub fn current_artifact(&self) -> &Artifact {
        &self.current_artifact
    }

    /// Replacement artifact
    #[inline]
    #[must_use]
    pub fn recommended_artifact(&self) -> &Artifact {
        &self.recommended_artifact
    }

    /// Path description
    #[inline]
    #[must_use]
    pub fn migration_path(&self) -> &str {
        &self.migration_path
    }

    /// Known breaking changes
    #[inline]
    #[must_use]
    pub fn breaking_changes(&self) -> &[String] {
        &self.breaking_changes
    }

    /// Compatibility score in `[0, 1]`
    #[inline]
    #[must_use]
    pub fn compatibility_score(&self) -> f64 {
        self.compatibility_score
    }
}

/// Aggregate migration risk
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RiskAssessment {
    risk_score: f64,
    risk_factors: Vec<String>,
    mitigation_suggestions: Vec<String>,
}

impl RiskAssessment {
    /// Create assessment
    ///
    /// # Errors
    /// Rejects a risk score outside `[0, 1]`.
    pub fn new(
        risk_score: f64,
        risk_factors: Vec<String>,
        mitigation_suggestions: Vec<String>,
    ) -> Result<Self, ValidationError> {
        let risk_score = ValidationError::require_unit("riskScore", risk_score)?;
        Ok(Self {
            risk_score,
            risk_factors,
            mitigation_suggestions,
        })
    }

    /// Zero-risk assessment
    #[must_use]
    pub fn none() -> Self {
        Self {
            risk_score: 0.0,
            risk_factors: Vec::new(),
            mitigation_suggestions: Vec::new(),
        }
    }

    /// Score in `[0, 1]`
    #[inline]
    #[must_use]
    pub fn risk_score(&self) -> f64 {
        self.risk_score
    }

    /// Contributing causes
    #[inline]
    #[must_use]
    pub fn risk_factors(&self) -> &[String] {
        &self.risk_factors
    }

    /// Suggested mitigations
    #[inline]
    #[must_use]
    pub fn mitigation_suggestions(&self) -> &[String] {
        &self.mitigation_suggestions
    }
}

/// `[0, 1]` summary of migration readiness
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MigrationReadinessScore {
    score: f64,
    explanation: String,
}

impl MigrationReadinessScore {
    /// Create score
    ///
    /// # Errors
    /// Rejects a score outside `[0, 1]`.
    pub fn new(score: f64, explanation: impl Into<String>) -> Result<Self, ValidationError> {
        let score = ValidationError::require_unit("readinessScore", score)?;
        Ok(Self {
            score,
            explanation: explanation.into(),
        })
    }

    /// Score in `[0, 1]`
    #[inline]
    #[must_use]
    pub fn score(&self) -> f64 {
        self.score
    }

    /// Explanation text
    #[inline]
    #[must_use]
    pub fn explanation(&self) -> &str {
        &self.explanation
    }
}

/// Weights of the readiness formula, normalised to sum to 1
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ReadinessWeights {
    unblocked: f64,
    risk: f64,
}

impl ReadinessWeights {
    /// Normalise raw weights
    ///
    /// # Errors
    /// Rejects negative or non-finite weights and an all-zero pair.
    pub fn new(unblocked: f64, risk: f64) -> Result<Self, ValidationError> {
        if !unblocked.is_finite() || !risk.is_finite() || unblocked < 0.0 || risk < 0.0 {
            return Err(ValidationError::Invalid {
                field: "readinessWeights",
                reason: format!("weights must be finite and non-negative, got ({unblocked}, {risk})"),
            });
        }
        let sum = unblocked + risk;
        if sum <= 0.0 {
            return Err(ValidationError::Invalid {
                field: "readinessWeights",
                reason: "weights must not both be zero".to_string(),
            });
        }
        Ok(Self {
            unblocked: unblocked / sum,
            risk: risk / sum,
        })
    }

    /// Weight of the unblocked fraction
    #[inline]
    #[must_use]
    pub fn unblocked(&self) -> f64 {
        self.unblocked
    }

    /// Weight of `1 - risk`
    #[inline]
    #[must_use]
    pub fn risk(&self) -> f64 {
        self.risk
    }

    /// `clamp01(w1 * fraction_not_blocked + w2 * (1 - risk_score))`
    #[must_use]
    pub fn combine(&self, fraction_not_blocked: f64, risk_score: f64) -> f64 {
        (self.unblocked * fraction_not_blocked + self.risk * (1.0 - risk_score)).clamp(0.0, 1.0)
    }
}

impl Default for ReadinessWeights {
    fn default() -> Self {
        Self {
            unblocked: 0.6,
            risk: 0.4,
        }
    }
}

/// How a root and descendant disagree
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConflictType {
    /// Legacy descendant under a modern root
    LegacyUnderModern,
    /// Modern descendant under a legacy root
    ModernUnderLegacy,
    /// Mixed descendant under a classified root
    MixedDescendant,
    /// Unclassified root whose subtree holds both namespaces
    MixedSubtree,
}

/// Namespace mismatch found along a dependency path
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TransitiveConflict {
    /// Root of the path
    pub root: Artifact,
    /// Descendant in conflict
    pub conflicting: Artifact,
    /// Conflict kind
    pub conflict_type: ConflictType,
    /// Human-readable description
    pub description: String,
}

/// All transitive conflicts of one analysis
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct TransitiveConflictReport {
    /// Conflicts in discovery order
    pub conflicts: Vec<TransitiveConflict>,
    /// Conflict count
    pub total: usize,
    /// One-line summary
    pub summary: String,
}

impl TransitiveConflictReport {
    /// Build report from conflicts
    #[must_use]
    pub fn new(conflicts: Vec<TransitiveConflict>) -> Self {
        let total = conflicts.len();
        let summary = if total == 0 {
            "No transitive namespace conflicts".to_string()
        } else {
            format!("{total} transitive namespace conflict(s) detected")
        };
        Self {
            conflicts,
            total,
            summary,
        }
    }

    /// Whether nothing was found
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.conflicts.is_empty()
    }
}

/// Immutable result of one analysis run
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DependencyAnalysisReport {
    /// Analysed graph
    pub graph: DependencyGraph,
    /// Node classifications
    pub namespaces: NamespaceCompatibilityMap,
    /// Detected blockers
    pub blockers: Vec<Blocker>,
    /// Replacement recommendations
    pub recommendations: Vec<VersionRecommendation>,
    /// Transitive conflicts
    pub transitive_conflicts: TransitiveConflictReport,
    /// Compatibility checks performed
    pub binary_compatibility: Vec<BinaryCompatibilityRecord>,
    /// Aggregate risk
    pub risk: RiskAssessment,
    /// Readiness summary
    pub readiness: MigrationReadinessScore,
}

impl DependencyAnalysisReport {
    /// Blockers of the given kind
    pub fn blockers_of(&self, blocker_type: BlockerType) -> impl Iterator<Item = &Blocker> {
        self.blockers
            .iter()
            .filter(move |b| b.blocker_type() == blocker_type)
    }

    /// Whether `artifact` has at least one blocker
    #[must_use]
    pub fn is_blocked(&self, artifact: &Artifact) -> bool {
        self.blockers.iter().any(|b| b.artifact() == artifact)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn artifact() -> Artifact {
        Artifact::compile("javax.activation", "activation", "1.1").unwrap()
    }

    #[test]
    fn blocker_rejects_blank_reason() {
        assert!(Blocker::new(artifact(), BlockerType::NoModernEquivalent, " ", vec![], 0.5).is_err());
    }

    #[test]
    fn weights_normalise() {
        let w = ReadinessWeights::new(3.0, 1.0).unwrap();
        assert!((w.unblocked() - 0.75).abs() < 1e-12);
        assert!((w.risk() - 0.25).abs() < 1e-12);
        assert!(ReadinessWeights::new(0.0, 0.0).is_err());
        assert!(ReadinessWeights::new(-1.0, 2.0).is_err());
    }

    #[test]
    fn combine_is_monotonic_in_risk() {
        let w = ReadinessWeights::default();
        assert!(w.combine(1.0, 0.2) >= w.combine(1.0, 0.8));
        assert!(w.combine(0.9, 0.5) >= w.combine(0.4, 0.5));
        assert!((w.combine(1.0, 0.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn conflict_report_summary() {
        assert!(TransitiveConflictReport::new(vec![]).summary.starts_with("No"));
    }

    proptest! {
        #[test]
        fn prop_scores_outside_unit_interval_rejected(v in prop_oneof![-1e6f64..-1e-9, 1.0f64 + 1e-9..1e6]) {
            prop_assert!(Blocker::new(artifact(), BlockerType::NoModernEquivalent, "r", vec![], v).is_err());
            prop_assert!(VersionRecommendation::new(artifact(), artifact(), "p", vec![], v).is_err());
            prop_assert!(RiskAssessment::new(v, vec![], vec![]).is_err());
            prop_assert!(MigrationReadinessScore::new(v, "e").is_err());
        }

        #[test]
        fn prop_scores_inside_unit_interval_accepted(v in 0.0f64..=1.0) {
            prop_assert!(Blocker::new(artifact(), BlockerType::VersionIncompatible, "r", vec![], v).is_ok());
            prop_assert!(VersionRecommendation::new(artifact(), artifact(), "p", vec![], v).is_ok());
            prop_assert!(RiskAssessment::new(v, vec![], vec![]).is_ok());
            prop_assert!(MigrationReadinessScore::new(v, "e").is_ok());
        }

        #[test]
        fn prop_readiness_never_increases_with_risk(
            fraction in 0.0f64..=1.0,
            low in 0.0f64..=1.0,
            high in 0.0f64..=1.0,
        ) {
            let (low, high) = if low <= high { (low, high) } else { (high, low) };
            let w = ReadinessWeights::default();
            prop_assert!(w.combine(fraction, high) <= w.combine(fraction, low));
        }
    }
}

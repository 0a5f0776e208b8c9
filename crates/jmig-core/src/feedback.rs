//! Runtime feedback
//!
//! Folds classified runtime failures back into the static vocabulary:
//! - each migration-related error raises risk by `0.1 × confidence`
//! - errors carrying a class name become blockers on the owning artifact

use indexmap::IndexSet;
use jmig_analysis::{Blocker, BlockerType, RiskAssessment};
use jmig_graph::{Artifact, DependencyGraph, Scope, ValidationError};
use jmig_runtime::{ErrorCategory, RuntimeError, VerificationResult};
use tracing::debug;

/// Risk added per migration-related error, scaled by its confidence
pub const RUNTIME_RISK_STEP: f64 = 0.1;

/// Risk adjusted by what verification observed
///
/// # Errors
/// Only if the adjusted score leaves `[0, 1]`, which indicates a bug.
pub fn apply_runtime_feedback(
    risk: &RiskAssessment,
    verification: &VerificationResult,
) -> Result<RiskAssessment, ValidationError> {
    let related: Vec<&RuntimeError> = verification.migration_errors().collect();
    let bump: f64 = related.iter().map(|e| RUNTIME_RISK_STEP * e.confidence()).sum();
    let score = (risk.risk_score() + bump).min(1.0);

    let mut factors: IndexSet<String> = risk.risk_factors().iter().cloned().collect();
    for category in ErrorCategory::ALL {
        let count = related.iter().filter(|e| e.category() == category).count();
        if count > 0 {
            factors.insert(format!("{count} runtime error(s) classified as {category}"));
        }
    }

    let mut mitigations: IndexSet<String> = risk.mitigation_suggestions().iter().cloned().collect();
    mitigations.extend(verification.remediation_steps.iter().map(|s| s.description.clone()));

    debug!(
        "Runtime feedback: {} related errors, risk {:.2} -> {score:.2}",
        related.len(),
        risk.risk_score()
    );
    RiskAssessment::new(score, factors.into_iter().collect(), mitigations.into_iter().collect())
}

/// Blockers implied by runtime errors
///
/// The owning artifact is the graph node with the longest group id that
/// prefixes the class name. Classes with no owner get a synthetic
/// runtime-scoped artifact named after their package.
///
/// # Errors
/// Returns `ValidationError` if a synthetic artifact or blocker is invalid.
pub fn runtime_blockers(
    verification: &VerificationResult,
    graph: &DependencyGraph,
) -> Result<Vec<Blocker>, ValidationError> {
    let mut blockers: Vec<Blocker> = Vec::new();
    for error in &verification.errors {
        let Some(class_name) = error.class_name() else {
            continue;
        };
        let (blocker_type, mitigation) = match error.category() {
            ErrorCategory::NamespaceMigration => (
                BlockerType::NoModernEquivalent,
                "Replace the javax dependency with its jakarta artifact",
            ),
            ErrorCategory::ClasspathIssue => (
                BlockerType::VersionIncompatible,
                "Add or upgrade the jakarta API artifact on the runtime classpath",
            ),
            ErrorCategory::BinaryIncompatibility => (
                BlockerType::BinaryIncompatible,
                "Recompile dependants against the jakarta API",
            ),
            ErrorCategory::ConfigurationError | ErrorCategory::Unknown => continue,
        };

        let artifact = match owning_artifact(graph, class_name) {
            Some(artifact) => artifact.clone(),
            None => synthetic_artifact(class_name)?,
        };
        if blockers
            .iter()
            .any(|b| b.artifact() == &artifact && b.blocker_type() == blocker_type)
        {
            continue;
        }
        blockers.push(Blocker::new(
            artifact,
            blocker_type,
            format!("Runtime {}: {}", error.error_type(), error.message()),
            vec![mitigation.to_string()],
            error.confidence(),
        )?);
    }
    Ok(blockers)
}

fn owning_artifact<'a>(graph: &'a DependencyGraph, class_name: &str) -> Option<&'a Artifact> {
    graph
        .iter_nodes()
        .filter(|a| {
            class_name
                .strip_prefix(a.group_id())
                .is_some_and(|rest| rest.starts_with('.'))
        })
        .max_by_key(|a| a.group_id().len())
}

fn synthetic_artifact(class_name: &str) -> Result<Artifact, ValidationError> {
    let (package, class) = class_name.rsplit_once('.').unwrap_or((class_name, class_name));
    Artifact::new(package, class, "", Scope::Runtime, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmig_runtime::{ErrorType, RemediationStep, StackTrace};
    use jmig_test_utils::{artifact, project_graph};
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn error(error_type: ErrorType, message: &str, class_name: Option<&str>, confidence: f64) -> RuntimeError {
        RuntimeError::new(
            error_type,
            message,
            StackTrace::default(),
            class_name.map(str::to_string),
            None,
            confidence,
        )
        .unwrap()
    }

    fn result(errors: Vec<RuntimeError>) -> VerificationResult {
        let mut errors = errors.into_iter();
        let mut result = VerificationResult::not_run(errors.next().unwrap(), None);
        result.errors.extend(errors);
        result
    }

    #[test]
    fn related_errors_raise_risk() {
        let risk = RiskAssessment::new(0.3, vec!["static".to_string()], vec![]).unwrap();
        let mut verification = result(vec![
            error(ErrorType::ClassNotFound, "ClassNotFoundException: javax.servlet.Filter", Some("javax.servlet.Filter"), 0.9),
            error(ErrorType::ClassNotFound, "ClassNotFoundException: jakarta.inject.Inject", Some("jakarta.inject.Inject"), 0.5),
            error(ErrorType::Other, "NullPointerException", Some("com.acme.Main"), 1.0),
        ]);
        verification.remediation_steps.push(RemediationStep {
            description: "Run the namespace rewrite".to_string(),
            action: "ADD_JAKARTA_NAMESPACE".to_string(),
            details: vec![],
            priority: 1,
        });

        let adjusted = apply_runtime_feedback(&risk, &verification).unwrap();
        assert!((adjusted.risk_score() - 0.44).abs() < 1e-9);
        assert_eq!(
            adjusted.risk_factors(),
            &[
                "static".to_string(),
                "1 runtime error(s) classified as NAMESPACE_MIGRATION".to_string(),
                "1 runtime error(s) classified as CLASSPATH_ISSUE".to_string(),
            ]
        );
        assert_eq!(adjusted.mitigation_suggestions(), &["Run the namespace rewrite".to_string()]);
    }

    #[test]
    fn risk_is_capped() {
        let risk = RiskAssessment::new(0.95, vec![], vec![]).unwrap();
        let verification = result(vec![
            error(ErrorType::NoClassDefFound, "javax.persistence.Entity", Some("javax.persistence.Entity"), 1.0),
        ]);
        let adjusted = apply_runtime_feedback(&risk, &verification).unwrap();
        assert!((adjusted.risk_score() - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn blockers_attach_to_owning_artifact() {
        let root = artifact("com.example", "shop", "1.0.0");
        let servlet = artifact("javax.servlet", "javax.servlet-api", "4.0.1");
        let graph = project_graph(&root, &[servlet.clone()]);
        let verification = result(vec![
            error(ErrorType::NoClassDefFound, "NoClassDefFoundError: javax/servlet/Filter", Some("javax.servlet.Filter"), 0.9),
            error(ErrorType::ClassNotFound, "ClassNotFoundException: javax.servlet.http.HttpServlet", Some("javax.servlet.http.HttpServlet"), 0.9),
            error(ErrorType::LinkageError, "LinkageError: javax vs jakarta", Some("com.acme.Api"), 0.8),
            error(ErrorType::Other, "NullPointerException", Some("com.acme.Main"), 0.5),
        ]);

        let blockers = runtime_blockers(&verification, &graph).unwrap();
        assert_eq!(blockers.len(), 2);
        assert_eq!(blockers[0].artifact(), &servlet);
        assert_eq!(blockers[0].blocker_type(), BlockerType::NoModernEquivalent);
        assert_eq!(blockers[1].blocker_type(), BlockerType::BinaryIncompatible);
        assert_eq!(blockers[1].artifact().group_id(), "com.acme");
        assert_eq!(blockers[1].artifact().artifact_id(), "Api");
    }

    proptest! {
        #[test]
        fn adjusted_risk_never_drops(base in 0.0f64..=1.0, confidences in prop::collection::vec(0.0f64..=1.0, 1..8)) {
            let risk = RiskAssessment::new(base, vec![], vec![]).unwrap();
            let verification = result(
                confidences
                    .iter()
                    .map(|c| error(ErrorType::ClassNotFound, "ClassNotFoundException: javax.servlet.Filter", Some("javax.servlet.Filter"), *c))
                    .collect(),
            );
            let adjusted = apply_runtime_feedback(&risk, &verification).unwrap();
            prop_assert!(adjusted.risk_score() >= base);
            prop_assert!(adjusted.risk_score() <= 1.0);
        }
    }
}

use jmig_core::prelude::*;
use jmig_core::telemetry::init_tracing;
use jmig_runtime::{CommandSpec, ErrorCategory, JvmRuntimeVerifier};
use jmig_test_utils::{TempProject, LEGACY_SERVLET};
use pretty_assertions::assert_eq;
use std::sync::Arc;

const SERVLET: &str = "src/main/java/com/example/web/HelloServlet.java";

const FAILING_LAUNCHER: &str = r#"echo 'Exception in thread "main" java.lang.NoClassDefFoundError: javax/servlet/Filter' >&2
echo '	at com.example.web.HelloServlet.init(HelloServlet.java:12)' >&2
exit 1
"#;

fn pipeline(config: MigrationConfig) -> MigrationPipeline {
    init_tracing("jmig=debug");
    MigrationPipeline::new(config).unwrap()
}

#[tokio::test]
async fn test_unverified_run_completes() -> anyhow::Result<()> {
    let project = TempProject::legacy_maven();
    let pipeline = pipeline(MigrationConfig::new());

    let report = pipeline.run(project.path(), None).await?;
    assert_eq!(report.plan.files().len(), 4);
    assert!(report.verification.is_none());
    assert!(report.is_complete());
    assert_eq!(report.refactoring.run_state, MigrationState::Complete);
    assert!(pipeline.tracker().is_empty());
    assert!(report.runtime_blockers.is_empty());
    assert_eq!(report.adjusted_risk, report.analysis.risk);
    assert!((report.adjusted_readiness.score() - report.analysis.readiness.score()).abs() < 1e-12);

    let servlet = project.read(SERVLET);
    assert!(servlet.contains("import jakarta.servlet.http.HttpServlet;"));
    assert!(!servlet.contains("javax.servlet"));
    assert_ne!(servlet, LEGACY_SERVLET);

    let json = serde_json::to_value(&report)?;
    assert_eq!(json["run_id"].as_str(), Some(report.run_id.to_string().as_str()));
    Ok(())
}

#[tokio::test]
async fn test_source_roots_limit_the_plan() -> anyhow::Result<()> {
    let project = TempProject::legacy_maven();
    let pipeline = pipeline(MigrationConfig::new().with_source_root("src/main/java").with_source_root("missing"));

    let analysis = pipeline.assess(project.path())?;
    let plan = pipeline.plan(project.path(), &analysis)?;
    assert_eq!(plan.files().len(), 2);
    assert!(plan.files().iter().all(|p| p.extension().and_then(|e| e.to_str()) == Some("java")));
    Ok(())
}

#[tokio::test]
async fn test_cancelled_run_leaves_sources_untouched() -> anyhow::Result<()> {
    let project = TempProject::legacy_maven();
    let pipeline = pipeline(MigrationConfig::new().with_verify_built_artifact(true));
    let control = RunControl::new();
    control.cancel();

    let report = pipeline.run_with_control(project.path(), None, &control).await?;
    assert_eq!(report.refactoring.run_state, MigrationState::RolledBack);
    assert!(report.verification.is_none());
    assert!(!report.is_complete());
    assert_eq!(project.read(SERVLET), LEGACY_SERVLET);
    assert!(pipeline.tracker().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_missing_descriptor_is_fatal() {
    let project = TempProject::new().with_file("src/Main.java", "class Main {}\n");
    let err = pipeline(MigrationConfig::new()).run(project.path(), None).await.unwrap_err();
    assert!(err.is_fatal());
}

#[test]
fn test_invalid_config_is_rejected() {
    let err = MigrationPipeline::new(MigrationConfig::new().with_timeout_secs(0)).unwrap_err();
    assert!(err.is_fatal());
}

#[tokio::test]
async fn test_missing_built_artifact_blocks_completion() -> anyhow::Result<()> {
    let project = TempProject::legacy_maven();
    let pipeline = pipeline(MigrationConfig::new().with_verify_built_artifact(true));

    let report = pipeline.run(project.path(), None).await?;
    let verification = report.verification.as_ref().expect("verification ran");
    assert_eq!(verification.status, VerificationStatus::Failed);
    assert_eq!(report.refactoring.run_state, MigrationState::Phase4Complete);
    assert!(!report.is_complete());
    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn test_runtime_failure_feeds_back() -> anyhow::Result<()> {
    let project = TempProject::legacy_maven()
        .with_file("launcher.sh", FAILING_LAUNCHER)
        .with_file("target/legacy-shop-1.0.0.war.jar", "jar");
    let verifier = JvmRuntimeVerifier::new()
        .with_launcher(CommandSpec::new("sh").arg(project.file("launcher.sh").to_string_lossy()));
    let pipeline = pipeline(MigrationConfig::new()).with_verifier(Arc::new(verifier));

    let jar = project.file("target/legacy-shop-1.0.0.war.jar");
    let report = pipeline.run(project.path(), Some(&jar)).await?;

    let verification = report.verification.as_ref().expect("verification ran");
    assert_eq!(verification.status, VerificationStatus::Failed);
    assert_eq!(report.refactoring.run_state, MigrationState::Phase4Complete);

    assert_eq!(report.runtime_blockers.len(), 1);
    assert_eq!(report.runtime_blockers[0].artifact().group_id(), "javax.servlet");
    assert!(report.adjusted_risk.risk_score() >= report.analysis.risk.risk_score());
    assert!(report
        .adjusted_risk
        .risk_factors()
        .iter()
        .any(|f| f.contains(ErrorCategory::NamespaceMigration.as_str())));
    assert!(report.adjusted_readiness.score() <= report.analysis.readiness.score());
    Ok(())
}

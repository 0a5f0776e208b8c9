//! Migration pipeline
//!
//! One run walks the stages in order:
//! 1. Assess: dependency analysis of the project's build descriptor
//! 2. Plan: source scan plus recipe selection
//! 3. Migrate: checkpointed refactoring, rolled back on failure
//! 4. Verify: run the built artifact, when one is given or configured
//! 5. Feedback: runtime errors adjust risk, blockers and readiness
//!
//! The pipeline owns its recipe library and change tracker; nothing is
//! shared between pipeline instances.

use crate::config::MigrationConfig;
use crate::error::PipelineError;
use crate::feedback::{apply_runtime_feedback, runtime_blockers};
use jmig_analysis::{
    BinaryCompatibilityChecker, Blocker, DependencyAnalysisEngine, DependencyAnalysisReport,
    MigrationReadinessScore, NamespaceClassifier, RiskAssessment,
};
use jmig_refactor::{
    ChangeTracker, MigrationPlan, MigrationPlanner, MigrationState, RecipeLibrary, RefactorError,
    RefactoringEngine, RefactoringOutcome, RegexSourceScanner, RunControl, SourceScanResult,
    SourceScanner,
};
use jmig_runtime::{CommandSpec, JvmRuntimeVerifier, RuntimeVerifier, VerificationResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{info, warn};
use ulid::Ulid;

/// Unique identifier of one pipeline run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Ulid);

impl RunId {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Ulid::new())
    }

    #[inline]
    #[must_use]
    pub fn as_ulid(&self) -> Ulid {
        self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = ulid::DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ulid::from_string(s).map(Self)
    }
}

/// Everything one run produced
#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub run_id: RunId,
    pub analysis: DependencyAnalysisReport,
    pub plan: MigrationPlan,
    pub refactoring: RefactoringOutcome,
    /// `None` when verification was skipped or the refactoring did not commit
    pub verification: Option<VerificationResult>,
    pub adjusted_risk: RiskAssessment,
    pub adjusted_readiness: MigrationReadinessScore,
    pub runtime_blockers: Vec<Blocker>,
}

impl PipelineReport {
    /// Refactoring committed and verification passed or was skipped
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.refactoring.run_state == MigrationState::Complete
    }
}

/// End-to-end javax → jakarta migration
#[derive(Debug)]
pub struct MigrationPipeline {
    config: MigrationConfig,
    analysis: DependencyAnalysisEngine,
    library: Arc<RecipeLibrary>,
    tracker: Arc<ChangeTracker>,
    scanner: Arc<dyn SourceScanner>,
    verifier: Arc<dyn RuntimeVerifier>,
}

impl MigrationPipeline {
    /// Pipeline with the default components
    ///
    /// # Errors
    /// Returns `PipelineError::Config` if `config` fails validation.
    pub fn new(config: MigrationConfig) -> Result<Self, PipelineError> {
        config.validate().map_err(crate::config::ConfigError::from)?;
        let analysis = DependencyAnalysisEngine::new()
            .with_weights(config.analysis.weights()?)
            .with_parallelism(config.analysis.parallel_classification);
        let verifier = JvmRuntimeVerifier::new().with_launcher(CommandSpec::new(config.verification.launcher.clone()));
        Ok(Self {
            analysis,
            library: Arc::new(RecipeLibrary::with_defaults()?),
            tracker: Arc::new(ChangeTracker::new()),
            scanner: Arc::new(RegexSourceScanner::new()),
            verifier: Arc::new(verifier),
            config,
        })
    }

    /// Use a different namespace classifier
    #[must_use]
    pub fn with_classifier(mut self, classifier: Arc<dyn NamespaceClassifier>) -> Self {
        self.analysis = self.analysis.with_classifier(classifier);
        self
    }

    /// Use a binary-compatibility checker
    #[must_use]
    pub fn with_checker(mut self, checker: Arc<dyn BinaryCompatibilityChecker>) -> Self {
        self.analysis = self.analysis.with_checker(checker);
        self
    }

    /// Use a different source scanner for planning and the residual check
    #[inline]
    #[must_use]
    pub fn with_scanner(mut self, scanner: Arc<dyn SourceScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    /// Use a different runtime verifier
    #[inline]
    #[must_use]
    pub fn with_verifier(mut self, verifier: Arc<dyn RuntimeVerifier>) -> Self {
        self.verifier = verifier;
        self
    }

    #[inline]
    #[must_use]
    pub fn config(&self) -> &MigrationConfig {
        &self.config
    }

    /// Recipe catalog, for registering project-specific recipes
    #[inline]
    #[must_use]
    pub fn library(&self) -> &Arc<RecipeLibrary> {
        &self.library
    }

    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &Arc<ChangeTracker> {
        &self.tracker
    }

    fn refactoring_engine(&self) -> RefactoringEngine {
        RefactoringEngine::new(Arc::clone(&self.tracker), Arc::clone(&self.library))
            .with_scanner(Arc::clone(&self.scanner))
            .with_fail_on_residual(self.config.refactoring.fail_on_residual)
    }

    /// Dependency analysis of the project at `root`
    ///
    /// # Errors
    /// Returns `PipelineError::Analysis` when the project has no usable descriptor.
    pub fn assess(&self, root: &Path) -> Result<DependencyAnalysisReport, PipelineError> {
        let report = self.analysis.analyze_project(root)?;
        info!(
            "Assessed {}: {} artifacts, {} blockers, readiness {:.2}",
            root.display(),
            report.graph.node_count(),
            report.blockers.len(),
            report.readiness.score()
        );
        Ok(report)
    }

    fn scan(&self, root: &Path) -> Result<SourceScanResult, RefactorError> {
        let roots = &self.config.refactoring.source_roots;
        if roots.is_empty() {
            return self.scanner.scan_project(root);
        }
        let mut merged = SourceScanResult::default();
        for relative in roots {
            let dir = root.join(relative);
            if !dir.is_dir() {
                warn!("Source root {} does not exist, skipping", dir.display());
                continue;
            }
            let scan = self.scanner.scan_project(&dir)?;
            merged.total_files_scanned += scan.total_files_scanned;
            for usage in scan.files {
                if merged.get(&usage.path).is_none() {
                    merged.files.push(usage);
                }
            }
        }
        merged.files.sort_by(|a, b| a.path.cmp(&b.path));
        Ok(merged)
    }

    /// Scan sources and build the application plan
    ///
    /// # Errors
    /// Returns `PipelineError::Refactor` if the sources cannot be walked.
    pub fn plan(&self, root: &Path, report: &DependencyAnalysisReport) -> Result<MigrationPlan, PipelineError> {
        let scan = self.scan(root)?;
        let plan = MigrationPlanner::new(Arc::clone(&self.library)).plan(report, &scan);
        info!(
            "Planned {} recipe applications over {} files",
            plan.len(),
            plan.files().len()
        );
        Ok(plan)
    }

    /// Apply `plan`; a rolled-back run also restores every file it had already finished
    ///
    /// # Errors
    /// Returns `PipelineError::Refactor` if the run cannot start or a restore fails.
    pub async fn migrate(&self, plan: &MigrationPlan, control: &RunControl) -> Result<RefactoringOutcome, PipelineError> {
        let engine = self.refactoring_engine();
        let mut outcome = engine.execute(plan, control).await?;
        if outcome.is_rolled_back() && !outcome.retained_checkpoints.is_empty() {
            let restored = engine.rollback(&mut outcome).await?;
            info!("Restored {restored} earlier files after rollback");
        }
        Ok(outcome)
    }

    /// Run one built jar
    ///
    /// # Errors
    /// Returns `PipelineError::Verification` if the process cannot be started.
    pub async fn verify(&self, jar: &Path) -> Result<VerificationResult, PipelineError> {
        Ok(self
            .verifier
            .verify_runtime(jar, &self.config.verification.options())
            .await?)
    }

    /// Assess, plan, migrate, verify and fold the runtime findings back in
    ///
    /// # Errors
    /// Returns the first stage error. A rolled-back refactoring or a failed
    /// verification is reported in the [`PipelineReport`] instead.
    pub async fn run(&self, root: &Path, jar: Option<&Path>) -> Result<PipelineReport, PipelineError> {
        self.run_with_control(root, jar, &RunControl::new()).await
    }

    /// [`MigrationPipeline::run`] with caller-controlled cancellation
    ///
    /// # Errors
    /// As [`MigrationPipeline::run`].
    pub async fn run_with_control(
        &self,
        root: &Path,
        jar: Option<&Path>,
        control: &RunControl,
    ) -> Result<PipelineReport, PipelineError> {
        let run_id = RunId::new();
        info!("Starting migration run {run_id} for {}", root.display());

        let analysis = self.assess(root)?;
        let plan = self.plan(root, &analysis)?;
        let mut refactoring = self.migrate(&plan, control).await?;

        let verification = if !refactoring.is_committed() {
            None
        } else if let Some(jar) = jar {
            Some(self.verify(jar).await?)
        } else if self.config.verification.verify_built_artifact {
            Some(
                self.verifier
                    .verify_project(root, &self.config.verification.options())
                    .await?,
            )
        } else {
            None
        };

        if refactoring.is_committed() && verification.as_ref().map_or(true, VerificationResult::is_success) {
            let engine = self.refactoring_engine();
            engine.mark_verified(&mut refactoring).map_err(RefactorError::from)?;
            engine.complete(&mut refactoring).map_err(RefactorError::from)?;
        }

        let (adjusted_risk, runtime_blockers) = match &verification {
            Some(result) => (
                apply_runtime_feedback(&analysis.risk, result)?,
                runtime_blockers(result, &analysis.graph)?,
            ),
            None => (analysis.risk.clone(), Vec::new()),
        };
        let all_blockers: Vec<Blocker> = analysis
            .blockers
            .iter()
            .chain(runtime_blockers.iter())
            .cloned()
            .collect();
        let adjusted_readiness = self
            .analysis
            .readiness_score(&analysis.graph, &all_blockers, &adjusted_risk)?;

        info!(
            "Run {run_id} finished in state {}, readiness {:.2} -> {:.2}",
            refactoring.run_state,
            analysis.readiness.score(),
            adjusted_readiness.score()
        );
        Ok(PipelineReport {
            run_id,
            analysis,
            plan,
            refactoring,
            verification,
            adjusted_risk,
            adjusted_readiness,
            runtime_blockers,
        })
    }
}

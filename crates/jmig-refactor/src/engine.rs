//! Refactoring Engine
//!
//! Applies a [`MigrationPlan`] under per-file checkpoints:
//! 1. Blanket namespace rewrites
//! 2. API-family and descriptor recipes
//! 3. Residual legacy-reference check over touched files
//! 4. Commit, releasing the run's checkpoints
//!
//! A failing entry restores its file and ends the run `ROLLED_BACK`.
//! Checkpoints of files migrated earlier in the run are handed back in the
//! outcome; [`RefactoringEngine::rollback`] restores them.

use crate::error::{RecipeError, RefactorError, StateError};
use crate::library::RecipeLibrary;
use crate::planner::{MigrationPlan, PlanEntry};
use crate::scanner::{RegexSourceScanner, SourceScanner};
use crate::state::{validate_transition, MigrationState, RunState, StateTransition};
use crate::tracker::{ChangeTracker, CheckpointId};
use chrono::Utc;
use indexmap::IndexMap;
use jmig_graph::MODERN_PREFIX;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::fs;
use tracing::{debug, info, warn};

/// Cooperative cancellation flag for one run
#[derive(Debug, Default)]
pub struct RunControl {
    cancelled: AtomicBool,
}

impl RunControl {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stop applying further entries
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::SeqCst)
    }
}

/// Kind of line-level change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ChangeType {
    ImportChange,
    PackageChange,
    XmlNamespaceChange,
    TypeReferenceChange,
    Other,
}

/// One changed line
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeDetail {
    pub path: PathBuf,
    /// 1-based
    pub line: usize,
    pub change_type: ChangeType,
    pub before: String,
    pub after: String,
    pub recipe: String,
}

/// Legacy reference still present after phases 1 and 2
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidualReference {
    pub path: PathBuf,
    pub line: usize,
    pub text: String,
}

/// Why a run stopped early
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringFailure {
    pub path: Option<PathBuf>,
    pub recipe: Option<String>,
    pub message: String,
}

/// Result of one run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefactoringOutcome {
    pub run_state: MigrationState,
    pub history: Vec<StateTransition>,
    pub changes: Vec<ChangeDetail>,
    /// Files left modified on disk
    pub files_modified: Vec<PathBuf>,
    /// Checkpoints still held after a failure
    pub retained_checkpoints: Vec<CheckpointId>,
    pub residual_references: Vec<ResidualReference>,
    pub failure: Option<RefactoringFailure>,
}

impl RefactoringOutcome {
    /// All four phases done
    #[must_use]
    pub fn is_committed(&self) -> bool {
        matches!(
            self.run_state,
            MigrationState::Phase4Complete | MigrationState::Verified | MigrationState::Complete
        )
    }

    #[must_use]
    pub fn is_rolled_back(&self) -> bool {
        self.run_state == MigrationState::RolledBack
    }

    fn advance(&mut self, to: MigrationState) -> Result<(), StateError> {
        validate_transition(self.run_state, to)?;
        self.history.push(StateTransition {
            from: self.run_state,
            to,
            at: Utc::now(),
        });
        self.run_state = to;
        Ok(())
    }
}

/// Mutable state of one `execute` call
struct RunContext {
    run: RunState,
    checkpoints: IndexMap<PathBuf, CheckpointId>,
    changes: Vec<ChangeDetail>,
}

impl RunContext {
    fn new() -> Self {
        Self {
            run: RunState::new(),
            checkpoints: IndexMap::new(),
            changes: Vec::new(),
        }
    }

    fn finish(
        self,
        failure: Option<RefactoringFailure>,
        residual_references: Vec<ResidualReference>,
        retain: bool,
    ) -> RefactoringOutcome {
        RefactoringOutcome {
            run_state: self.run.current(),
            history: self.run.history(),
            changes: self.changes,
            files_modified: self.checkpoints.keys().cloned().collect(),
            retained_checkpoints: if retain {
                self.checkpoints.values().copied().collect()
            } else {
                Vec::new()
            },
            residual_references,
            failure,
        }
    }
}

/// Checkpoint-protected plan executor
#[derive(Debug, Clone)]
pub struct RefactoringEngine {
    tracker: Arc<ChangeTracker>,
    library: Arc<RecipeLibrary>,
    scanner: Arc<dyn SourceScanner>,
    fail_on_residual: bool,
}

impl RefactoringEngine {
    #[must_use]
    pub fn new(tracker: Arc<ChangeTracker>, library: Arc<RecipeLibrary>) -> Self {
        Self {
            tracker,
            library,
            scanner: Arc::new(RegexSourceScanner),
            fail_on_residual: false,
        }
    }

    /// Scanner used for the residual check
    #[inline]
    #[must_use]
    pub fn with_scanner(mut self, scanner: Arc<dyn SourceScanner>) -> Self {
        self.scanner = scanner;
        self
    }

    /// Treat residual legacy references as a failure
    #[inline]
    #[must_use]
    pub fn with_fail_on_residual(mut self, fail: bool) -> Self {
        self.fail_on_residual = fail;
        self
    }

    #[inline]
    #[must_use]
    pub fn tracker(&self) -> &Arc<ChangeTracker> {
        &self.tracker
    }

    /// Apply `plan`
    ///
    /// Recipe and I/O failures are reported through the outcome's state.
    ///
    /// # Errors
    /// Only `RefactorError::State` on an internal transition bug.
    pub async fn execute(&self, plan: &MigrationPlan, control: &RunControl) -> Result<RefactoringOutcome, RefactorError> {
        let mut ctx = RunContext::new();
        ctx.run.transition(MigrationState::InProgress)?;
        info!("Refactoring run started: {} plan entries", plan.len());

        let (blanket, targeted): (Vec<&PlanEntry>, Vec<&PlanEntry>) =
            plan.entries.iter().partition(|e| e.is_blanket());

        for (entries, done) in [
            (blanket, MigrationState::Phase1Complete),
            (targeted, MigrationState::Phase2Complete),
        ] {
            for entry in entries {
                if control.is_cancelled() {
                    return self.abort_cancelled(ctx).await;
                }
                if let Err(e) = self.apply_entry(entry, &mut ctx).await {
                    let failure = RefactoringFailure {
                        path: Some(entry.path.clone()),
                        recipe: Some(entry.recipe.clone()),
                        message: e.to_string(),
                    };
                    return self.abort_failed(ctx, failure).await;
                }
            }
            ctx.run.transition(done)?;
        }

        let residual = self.residual_references(&ctx).await;
        if self.fail_on_residual && !residual.is_empty() {
            warn!("{} residual legacy references; rolling back run", residual.len());
            let failure = RefactoringFailure {
                path: None,
                recipe: None,
                message: format!("{} legacy references remain after rewriting", residual.len()),
            };
            return self.abort_all(ctx, failure, residual).await;
        }
        ctx.run.transition(MigrationState::Phase3Complete)?;

        if control.is_cancelled() {
            return self.abort_cancelled(ctx).await;
        }
        for id in ctx.checkpoints.values() {
            self.tracker.remove_checkpoint(id);
        }
        ctx.run.transition(MigrationState::Phase4Complete)?;
        info!(
            "Refactoring run committed: {} files, {} changed lines, {} residual references",
            ctx.checkpoints.len(),
            ctx.changes.len(),
            residual.len()
        );
        Ok(ctx.finish(None, residual, false))
    }

    async fn apply_entry(&self, entry: &PlanEntry, ctx: &mut RunContext) -> Result<(), RefactorError> {
        let recipe = self
            .library
            .get_by_name(&entry.recipe)
            .ok_or_else(|| RecipeError::NotRegistered(entry.recipe.clone()))?;
        if !recipe.applies_to(&entry.path) {
            debug!("{} does not apply to {}", recipe.name(), entry.path.display());
            return Ok(());
        }

        let original = fs::read_to_string(&entry.path)
            .await
            .map_err(|e| RefactorError::io_error(&entry.path, e))?;
        let rewritten = recipe.apply(&entry.path, &original)?;
        if rewritten == original {
            return Ok(());
        }

        if !ctx.checkpoints.contains_key(&entry.path) {
            let description = format!("Before {} on {}", recipe.name(), entry.path.display());
            let id = self
                .tracker
                .create_checkpoint(&entry.path, Some(&original), Some(&description))?;
            ctx.checkpoints.insert(entry.path.clone(), id);
        }
        fs::write(&entry.path, &rewritten)
            .await
            .map_err(|e| RefactorError::io_error(&entry.path, e))?;
        ctx.changes
            .extend(line_changes(&entry.path, &original, &rewritten, recipe.name()));
        debug!("Applied {} to {}", recipe.name(), entry.path.display());
        Ok(())
    }

    async fn abort_failed(&self, mut ctx: RunContext, failure: RefactoringFailure) -> Result<RefactoringOutcome, RefactorError> {
        warn!("Refactoring failed: {}", failure.message);
        let mut state = MigrationState::RolledBack;
        if let Some(path) = failure.path.clone() {
            if let Some(id) = ctx.checkpoints.shift_remove(&path) {
                match self.restore(&id).await {
                    Ok(()) => {
                        self.tracker.remove_checkpoint(&id);
                        ctx.changes.retain(|c| c.path != path);
                    }
                    Err(e) => {
                        warn!("Could not restore {}: {e}", path.display());
                        ctx.checkpoints.insert(path, id);
                        state = MigrationState::Failed;
                    }
                }
            }
        }
        ctx.run.transition(state)?;
        Ok(ctx.finish(Some(failure), Vec::new(), true))
    }

    async fn abort_cancelled(&self, ctx: RunContext) -> Result<RefactoringOutcome, RefactorError> {
        info!("Refactoring run cancelled; restoring {} files", ctx.checkpoints.len());
        let failure = RefactoringFailure {
            path: None,
            recipe: None,
            message: "run cancelled".to_string(),
        };
        self.abort_all(ctx, failure, Vec::new()).await
    }

    /// Restore every checkpointed file of the run
    async fn abort_all(
        &self,
        mut ctx: RunContext,
        failure: RefactoringFailure,
        residual: Vec<ResidualReference>,
    ) -> Result<RefactoringOutcome, RefactorError> {
        let mut unrestored = IndexMap::new();
        for (path, id) in std::mem::take(&mut ctx.checkpoints) {
            match self.restore(&id).await {
                Ok(()) => {
                    self.tracker.remove_checkpoint(&id);
                }
                Err(e) => {
                    warn!("Could not restore {}: {e}", path.display());
                    unrestored.insert(path, id);
                }
            }
        }
        let state = if unrestored.is_empty() {
            MigrationState::RolledBack
        } else {
            MigrationState::Failed
        };
        ctx.changes.retain(|c| unrestored.contains_key(&c.path));
        ctx.checkpoints = unrestored;
        ctx.run.transition(state)?;
        Ok(ctx.finish(Some(failure), residual, true))
    }

    async fn restore(&self, id: &CheckpointId) -> Result<(), RefactorError> {
        let checkpoint = self
            .tracker
            .get_checkpoint(id)
            .ok_or_else(|| RefactorError::CheckpointMissing(id.to_string()))?;
        let content = self
            .tracker
            .get_original_content(id)
            .ok_or_else(|| RefactorError::CheckpointMissing(id.to_string()))?;
        fs::write(&checkpoint.file_path, content)
            .await
            .map_err(|e| RefactorError::io_error(&checkpoint.file_path, e))?;
        debug!("Restored {} from checkpoint {id}", checkpoint.file_path.display());
        Ok(())
    }

    async fn residual_references(&self, ctx: &RunContext) -> Vec<ResidualReference> {
        let mut residual = Vec::new();
        for path in ctx.checkpoints.keys() {
            let content = match fs::read_to_string(path).await {
                Ok(content) => content,
                Err(e) => {
                    warn!("Residual check skipped {}: {e}", path.display());
                    continue;
                }
            };
            let usage = self.scanner.scan_file(path, &content);
            residual.extend(usage.legacy_imports.into_iter().map(|i| ResidualReference {
                path: path.clone(),
                line: i.line,
                text: i.full_name,
            }));
            residual.extend(usage.reflection_usages.into_iter().map(|r| ResidualReference {
                path: path.clone(),
                line: r.line,
                text: r.target,
            }));
            for uri in usage.xml_namespaces {
                let line = content
                    .lines()
                    .position(|l| l.contains(uri.as_str()))
                    .map_or(0, |i| i + 1);
                residual.push(ResidualReference {
                    path: path.clone(),
                    line,
                    text: uri,
                });
            }
        }
        residual
    }

    /// Restore and release every checkpoint still held by `outcome`
    ///
    /// Returns the number of files restored.
    ///
    /// # Errors
    /// Returns the first restore failure; checkpoints not yet processed stay
    /// in `outcome.retained_checkpoints`.
    pub async fn rollback(&self, outcome: &mut RefactoringOutcome) -> Result<usize, RefactorError> {
        let mut restored = 0;
        while let Some(id) = outcome.retained_checkpoints.first().copied() {
            let path = self.tracker.get_checkpoint(&id).map(|c| c.file_path);
            self.restore(&id).await?;
            self.tracker.remove_checkpoint(&id);
            outcome.retained_checkpoints.remove(0);
            if let Some(path) = path {
                outcome.files_modified.retain(|p| *p != path);
                outcome.changes.retain(|c| c.path != path);
            }
            restored += 1;
        }
        if restored > 0 {
            info!("Rolled back {restored} files");
        }
        Ok(restored)
    }

    /// Record successful runtime verification of a committed run
    ///
    /// # Errors
    /// Returns `StateError` unless the run is at `PHASE_4_COMPLETE`.
    pub fn mark_verified(&self, outcome: &mut RefactoringOutcome) -> Result<(), StateError> {
        outcome.advance(MigrationState::Verified)
    }

    /// Close a verified run
    ///
    /// # Errors
    /// Returns `StateError` unless the run is at `VERIFIED`.
    pub fn complete(&self, outcome: &mut RefactoringOutcome) -> Result<(), StateError> {
        outcome.advance(MigrationState::Complete)
    }
}

fn line_changes(path: &Path, before: &str, after: &str, recipe: &str) -> Vec<ChangeDetail> {
    let is_xml = path.extension().and_then(|e| e.to_str()) == Some("xml");
    before
        .lines()
        .zip(after.lines())
        .enumerate()
        .filter(|(_, (old, new))| old != new)
        .map(|(index, (old, new))| {
            let trimmed = new.trim_start();
            let change_type = if is_xml {
                ChangeType::XmlNamespaceChange
            } else if trimmed.starts_with("import ") {
                ChangeType::ImportChange
            } else if trimmed.starts_with("package ") {
                ChangeType::PackageChange
            } else if new.contains(MODERN_PREFIX) {
                ChangeType::TypeReferenceChange
            } else {
                ChangeType::Other
            };
            ChangeDetail {
                path: path.to_path_buf(),
                line: index + 1,
                change_type,
                before: old.to_string(),
                after: new.to_string(),
                recipe: recipe.to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::recipe::{RecipeKind, SafetyLevel};
    use jmig_test_utils::{TempProject, LEGACY_SERVLET};
    use pretty_assertions::assert_eq;

    fn engine() -> RefactoringEngine {
        RefactoringEngine::new(
            Arc::new(ChangeTracker::new()),
            Arc::new(RecipeLibrary::with_defaults().unwrap()),
        )
    }

    fn entry(path: PathBuf, recipe: &str, kind: RecipeKind) -> PlanEntry {
        PlanEntry {
            path,
            recipe: recipe.to_string(),
            safety: SafetyLevel::High,
            kind,
        }
    }

    #[test]
    fn change_classification() {
        let changes = line_changes(
            Path::new("A.java"),
            "import javax.servlet.Filter;\nclass A { javax.inject.Provider p; }\nint x;\n",
            "import jakarta.servlet.Filter;\nclass A { jakarta.inject.Provider p; }\nint x;\n",
            "AddJakartaNamespace",
        );
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].change_type, ChangeType::ImportChange);
        assert_eq!(changes[0].line, 1);
        assert_eq!(changes[1].change_type, ChangeType::TypeReferenceChange);
    }

    #[tokio::test]
    async fn committed_run_releases_checkpoints() {
        let project = TempProject::new().with_file("Hello.java", LEGACY_SERVLET);
        let engine = engine();
        let plan = MigrationPlan {
            entries: vec![
                entry(project.file("Hello.java"), "AddJakartaNamespace", RecipeKind::NamespaceRewrite),
                entry(project.file("Hello.java"), "MigrateServletApi", RecipeKind::ApiFamily),
            ],
            ..MigrationPlan::default()
        };

        let mut outcome = engine.execute(&plan, &RunControl::new()).await.unwrap();
        assert_eq!(outcome.run_state, MigrationState::Phase4Complete);
        assert!(engine.tracker().is_empty());
        assert!(outcome.residual_references.is_empty());
        assert_eq!(outcome.files_modified, vec![project.file("Hello.java")]);
        assert!(!project.read("Hello.java").contains("javax.servlet"));
        assert_eq!(outcome.changes.len(), 5);

        engine.mark_verified(&mut outcome).unwrap();
        engine.complete(&mut outcome).unwrap();
        assert_eq!(outcome.run_state, MigrationState::Complete);
        assert!(engine.complete(&mut outcome).is_err());
    }

    #[tokio::test]
    async fn unchanged_content_takes_no_checkpoint() {
        let project = TempProject::new().with_file("A.java", "import jakarta.servlet.Filter;\n");
        let engine = engine();
        let plan = MigrationPlan {
            entries: vec![entry(project.file("A.java"), "AddJakartaNamespace", RecipeKind::NamespaceRewrite)],
            ..MigrationPlan::default()
        };
        let outcome = engine.execute(&plan, &RunControl::new()).await.unwrap();
        assert!(outcome.is_committed());
        assert!(outcome.files_modified.is_empty());
        assert!(outcome.changes.is_empty());
    }

    #[tokio::test]
    async fn unknown_recipe_rolls_back() {
        let project = TempProject::new().with_file("A.java", "import javax.servlet.Filter;\n");
        let engine = engine();
        let plan = MigrationPlan {
            entries: vec![entry(project.file("A.java"), "NoSuchRecipe", RecipeKind::ApiFamily)],
            ..MigrationPlan::default()
        };
        let outcome = engine.execute(&plan, &RunControl::new()).await.unwrap();
        assert!(outcome.is_rolled_back());
        assert!(outcome.failure.unwrap().message.contains("NoSuchRecipe"));
    }

    #[tokio::test]
    async fn cancelled_run_restores_nothing_when_nothing_changed() {
        let project = TempProject::new().with_file("A.java", "import javax.servlet.Filter;\n");
        let engine = engine();
        let plan = MigrationPlan {
            entries: vec![entry(project.file("A.java"), "AddJakartaNamespace", RecipeKind::NamespaceRewrite)],
            ..MigrationPlan::default()
        };
        let control = RunControl::new();
        control.cancel();
        let outcome = engine.execute(&plan, &control).await.unwrap();
        assert_eq!(outcome.run_state, MigrationState::RolledBack);
        assert_eq!(project.read("A.java"), "import javax.servlet.Filter;\n");
    }
}

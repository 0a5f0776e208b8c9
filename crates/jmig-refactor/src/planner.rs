//! Migration Planner
//!
//! Turns an analysis report and a source scan into an ordered list of
//! (file, recipe) entries. Sort key:
//! 1. Blanket namespace rewrites before everything else
//! 2. Safety level, `HIGH` before `MEDIUM` before `LOW`
//! 3. File path
//! 4. Recipe name

use crate::library::RecipeLibrary;
use crate::recipe::{Recipe, RecipeKind, SafetyLevel};
use crate::scanner::{FileUsage, SourceScanResult};
use indexmap::IndexSet;
use jmig_analysis::DependencyAnalysisReport;
use jmig_graph::Artifact;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// One recipe application
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanEntry {
    pub path: PathBuf,
    pub recipe: String,
    pub safety: SafetyLevel,
    pub kind: RecipeKind,
}

impl PlanEntry {
    fn from_recipe(path: &Path, recipe: &Recipe) -> Self {
        Self {
            path: path.to_path_buf(),
            recipe: recipe.name().to_string(),
            safety: recipe.safety(),
            kind: recipe.kind(),
        }
    }

    /// Blanket namespace rewrite
    #[inline]
    #[must_use]
    pub fn is_blanket(&self) -> bool {
        self.kind == RecipeKind::NamespaceRewrite
    }

    fn sort_key(&self) -> (bool, SafetyLevel, &Path, &str) {
        (!self.is_blanket(), self.safety, &self.path, &self.recipe)
    }
}

/// Build-descriptor change that accompanies the source rewrite
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DependencyUpdate {
    pub current: Artifact,
    pub recommended: Artifact,
    pub migration_path: String,
    pub compatibility_score: f64,
}

/// Execution phase summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanPhase {
    pub number: u8,
    pub name: String,
    pub description: String,
    pub files: Vec<PathBuf>,
}

/// Ordered migration plan
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MigrationPlan {
    pub entries: Vec<PlanEntry>,
    pub phases: Vec<PlanPhase>,
    /// One line per blocker that should be resolved first
    pub prerequisites: Vec<String>,
    pub dependency_updates: Vec<DependencyUpdate>,
    pub overall_risk: f64,
}

impl MigrationPlan {
    /// Entries for one file, in plan order
    pub fn entries_for<'a>(&'a self, path: &'a Path) -> impl Iterator<Item = &'a PlanEntry> + 'a {
        self.entries.iter().filter(move |e| e.path == path)
    }

    /// Distinct files in first-appearance order
    #[must_use]
    pub fn files(&self) -> Vec<PathBuf> {
        self.entries
            .iter()
            .map(|e| e.path.clone())
            .collect::<IndexSet<_>>()
            .into_iter()
            .collect()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Plan builder over a recipe library
#[derive(Debug, Clone)]
pub struct MigrationPlanner {
    library: Arc<RecipeLibrary>,
}

impl MigrationPlanner {
    #[must_use]
    pub fn new(library: Arc<RecipeLibrary>) -> Self {
        Self { library }
    }

    /// Build the ordered plan
    #[must_use]
    pub fn plan(&self, report: &DependencyAnalysisReport, scan: &SourceScanResult) -> MigrationPlan {
        let mut entries: Vec<PlanEntry> = scan
            .files
            .iter()
            .flat_map(|usage| self.entries_for_file(usage))
            .collect();
        entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));

        let prerequisites = report
            .blockers
            .iter()
            .map(|b| format!("{} [{}]: {}", b.artifact().coordinate(), b.blocker_type(), b.reason()))
            .collect();
        let dependency_updates = report
            .recommendations
            .iter()
            .map(|r| DependencyUpdate {
                current: r.current_artifact().clone(),
                recommended: r.recommended_artifact().clone(),
                migration_path: r.migration_path().to_string(),
                compatibility_score: r.compatibility_score(),
            })
            .collect();

        let mut plan = MigrationPlan {
            entries,
            phases: Vec::new(),
            prerequisites,
            dependency_updates,
            overall_risk: report.risk.risk_score(),
        };
        plan.phases = Self::phases(&plan);

        info!(
            "Migration plan: {} entries over {} files, {} prerequisites",
            plan.len(),
            plan.files().len(),
            plan.prerequisites.len()
        );
        plan
    }

    fn entries_for_file(&self, usage: &FileUsage) -> Vec<PlanEntry> {
        let path = usage.path.as_path();
        let mut entries = Vec::new();

        if usage.is_descriptor() {
            if !usage.xml_namespaces.is_empty() {
                entries.extend(
                    self.library
                        .of_kind(RecipeKind::DescriptorUpdate)
                        .iter()
                        .filter(|r| r.applies_to(path))
                        .map(|r| PlanEntry::from_recipe(path, r)),
                );
            }
        } else {
            let families = usage.families();
            if !families.is_empty() {
                entries.extend(
                    self.library
                        .of_kind(RecipeKind::NamespaceRewrite)
                        .iter()
                        .filter(|r| r.applies_to(path))
                        .map(|r| PlanEntry::from_recipe(path, r)),
                );
                for family in families {
                    let recipe = self
                        .library
                        .recipe_for_package(&format!("{}{family}", jmig_graph::LEGACY_PREFIX))
                        .filter(|r| r.applies_to(path));
                    if let Some(recipe) = recipe {
                        let entry = PlanEntry::from_recipe(path, &recipe);
                        if !entries.contains(&entry) {
                            entries.push(entry);
                        }
                    }
                }
            }
        }

        if entries.is_empty() {
            debug!("No applicable recipe for {}", path.display());
        }
        entries
    }

    fn phases(plan: &MigrationPlan) -> Vec<PlanPhase> {
        let files_where = |pred: fn(&PlanEntry) -> bool| -> Vec<PathBuf> {
            plan.entries
                .iter()
                .filter(|e| pred(e))
                .map(|e| e.path.clone())
                .collect::<IndexSet<_>>()
                .into_iter()
                .collect()
        };
        let all = plan.files();
        vec![
            PlanPhase {
                number: 1,
                name: "Namespace rewrite".to_string(),
                description: "Rewrite javax imports and references to jakarta".to_string(),
                files: files_where(PlanEntry::is_blanket),
            },
            PlanPhase {
                number: 2,
                name: "Targeted recipes".to_string(),
                description: "Apply API-family and descriptor recipes".to_string(),
                files: files_where(|e| !e.is_blanket()),
            },
            PlanPhase {
                number: 3,
                name: "Residual check".to_string(),
                description: "Rescan touched files for remaining legacy references".to_string(),
                files: all.clone(),
            },
            PlanPhase {
                number: 4,
                name: "Commit".to_string(),
                description: "Confirm changes and release checkpoints".to_string(),
                files: all,
            },
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::{RegexSourceScanner, SourceScanner};
    use jmig_analysis::DependencyAnalysisEngine;
    use jmig_graph::DependencyGraph;

    fn empty_report() -> DependencyAnalysisReport {
        DependencyAnalysisEngine::new()
            .analyze_graph(DependencyGraph::new())
            .unwrap()
    }

    fn planner() -> MigrationPlanner {
        MigrationPlanner::new(Arc::new(RecipeLibrary::with_defaults().unwrap()))
    }

    fn scan(files: &[(&str, &str)]) -> SourceScanResult {
        let scanner = RegexSourceScanner;
        SourceScanResult {
            files: files
                .iter()
                .map(|(p, c)| scanner.scan_file(Path::new(p), c))
                .filter(FileUsage::has_legacy_usage)
                .collect(),
            total_files_scanned: files.len(),
        }
    }

    #[test]
    fn blanket_first_then_safety() {
        let scan = scan(&[
            ("b/Api.java", "import javax.xml.bind.JAXBContext;\nimport javax.persistence.Entity;\n"),
            ("a/Web.java", "import javax.servlet.Filter;\n"),
        ]);
        let plan = planner().plan(&empty_report(), &scan);
        let got: Vec<(&str, &str)> = plan
            .entries
            .iter()
            .map(|e| (e.path.to_str().unwrap(), e.recipe.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                ("a/Web.java", "AddJakartaNamespace"),
                ("b/Api.java", "AddJakartaNamespace"),
                ("a/Web.java", "MigrateServletApi"),
                ("b/Api.java", "MigrateJpa"),
                ("b/Api.java", "MigrateJaxb"),
            ]
        );
        assert_eq!(plan.phases[0].files.len(), 2);
        assert_eq!(plan.phases[1].files.len(), 2);
    }

    #[test]
    fn descriptor_gets_matching_recipe_only() {
        let scan = scan(&[
            ("META-INF/persistence.xml", jmig_test_utils::LEGACY_PERSISTENCE_XML),
            ("WEB-INF/beans.xml", "<beans xmlns=\"http://xmlns.jcp.org/xml/ns/javaee\"/>"),
        ]);
        let plan = planner().plan(&empty_report(), &scan);
        assert_eq!(plan.len(), 1);
        assert_eq!(plan.entries[0].recipe, "UpdatePersistenceXml");
    }

    #[test]
    fn jdk_only_file_is_omitted() {
        let scan = scan(&[("A.java", "import javax.sql.DataSource;\n")]);
        assert!(scan.files.is_empty());
        assert!(planner().plan(&empty_report(), &scan).is_empty());
    }

    #[test]
    fn report_fields_are_carried() {
        let graph = jmig_test_utils::project_graph(
            &jmig_test_utils::artifact("com.acme", "app", "1"),
            &[
                jmig_test_utils::artifact("javax.faces", "legacy-ui", "1.0"),
                jmig_test_utils::artifact("javax.servlet", "javax.servlet-api", "4.0.1"),
            ],
        );
        let report = DependencyAnalysisEngine::new().analyze_graph(graph).unwrap();
        let plan = planner().plan(&report, &SourceScanResult::default());
        assert_eq!(plan.prerequisites.len(), 1);
        assert!(plan.prerequisites[0].contains("NO_MODERN_EQUIVALENT"));
        assert_eq!(plan.dependency_updates.len(), 1);
        assert!(plan.overall_risk > 0.0);
    }
}

//! Source scanner
//!
//! Finds legacy-namespace usage in Java sources and XML descriptors:
//! - `import` and `import static` of migratable `javax` families
//! - legacy Java EE schema URIs in XML
//! - reflective lookups (`Class.forName`, `loadClass`, JNDI `lookup`)

use crate::error::RefactorError;
use ignore::WalkBuilder;
use jmig_graph::{legacy_family, to_modern_package};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

static IMPORT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*import\s+(static\s+)?(javax\.[\w.]+(?:\.\*)?)\s*;").expect("valid regex literal")
});

static LEGACY_XML_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"https?://(?:xmlns\.jcp\.org|java\.sun\.com)/xml/ns/[A-Za-z0-9_./-]+").expect("valid regex literal")
});

static REFLECTION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:Class\.forName|loadClass)\(\s*"(javax\.[\w.$]+)""#).expect("valid regex literal")
});

static JNDI_LOOKUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"lookup\(\s*"(java:comp/[^"]*javax[^"]*)""#).expect("valid regex literal"));

/// One legacy import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportStatement {
    /// Imported name as written, e.g. `javax.servlet.http.HttpServlet`
    pub full_name: String,
    /// Package part of the name
    pub package: String,
    /// Same name under the modern prefix
    pub modern_equivalent: String,
    /// 1-based line number
    pub line: usize,
    pub is_static: bool,
}

impl ImportStatement {
    /// Migratable family of the import
    #[must_use]
    pub fn family(&self) -> Option<&'static str> {
        legacy_family(&self.full_name)
    }
}

/// Reflective reference to a legacy name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReflectionUsage {
    pub target: String,
    pub line: usize,
}

/// Legacy usage found in one file
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FileUsage {
    pub path: PathBuf,
    pub legacy_imports: Vec<ImportStatement>,
    /// Distinct legacy schema URIs in an XML file
    pub xml_namespaces: Vec<String>,
    pub line_count: usize,
    pub reflection_usages: Vec<ReflectionUsage>,
}

impl FileUsage {
    /// Whether anything legacy was found
    #[must_use]
    pub fn has_legacy_usage(&self) -> bool {
        !self.legacy_imports.is_empty()
            || !self.xml_namespaces.is_empty()
            || !self.reflection_usages.is_empty()
    }

    /// Distinct families referenced by imports and reflection, in first-seen order
    #[must_use]
    pub fn families(&self) -> Vec<&'static str> {
        let mut families = Vec::new();
        let names = self
            .legacy_imports
            .iter()
            .map(|i| i.full_name.as_str())
            .chain(self.reflection_usages.iter().map(|r| r.target.as_str()));
        for family in names.filter_map(legacy_family) {
            if !families.contains(&family) {
                families.push(family);
            }
        }
        families
    }

    #[must_use]
    pub fn is_descriptor(&self) -> bool {
        self.path.extension().and_then(|e| e.to_str()) == Some("xml")
    }
}

/// Scan of a whole project
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SourceScanResult {
    /// Files with legacy usage, sorted by path
    pub files: Vec<FileUsage>,
    /// Java and XML files examined
    pub total_files_scanned: usize,
}

impl SourceScanResult {
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&FileUsage> {
        self.files.iter().find(|f| f.path == path)
    }

    #[must_use]
    pub fn legacy_import_count(&self) -> usize {
        self.files.iter().map(|f| f.legacy_imports.len()).sum()
    }
}

/// Finds legacy-namespace usage under a project root
pub trait SourceScanner: Send + Sync + fmt::Debug {
    /// Scan every relevant file under `root`
    ///
    /// # Errors
    /// Returns `RefactorError::Io` if `root` cannot be walked.
    fn scan_project(&self, root: &Path) -> Result<SourceScanResult, RefactorError>;

    /// Scan one file's content
    fn scan_file(&self, path: &Path, content: &str) -> FileUsage;
}

/// Line-oriented regex scanner
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexSourceScanner;

impl RegexSourceScanner {
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn is_candidate(path: &Path) -> bool {
        matches!(path.extension().and_then(|e| e.to_str()), Some("java" | "xml"))
    }
}

/// Leading lowercase segments of a dotted name
fn package_of(name: &str) -> String {
    name.split('.')
        .take_while(|segment| segment.chars().next().is_some_and(|c| c.is_ascii_lowercase()))
        .collect::<Vec<_>>()
        .join(".")
}

impl SourceScanner for RegexSourceScanner {
    fn scan_project(&self, root: &Path) -> Result<SourceScanResult, RefactorError> {
        if !root.is_dir() {
            return Err(RefactorError::io_error(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "project root is not a directory"),
            ));
        }

        let mut result = SourceScanResult::default();
        let mut walker = WalkBuilder::new(root);
        walker.follow_links(false);
        walker.sort_by_file_name(|a, b| a.cmp(b));
        for entry in walker.build() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!("Skipping unreadable entry: {e}");
                    continue;
                }
            };
            if !entry.file_type().is_some_and(|t| t.is_file()) || !Self::is_candidate(entry.path()) {
                continue;
            }
            let content = match std::fs::read_to_string(entry.path()) {
                Ok(content) => content,
                Err(e) => {
                    warn!("Skipping {}: {e}", entry.path().display());
                    continue;
                }
            };
            result.total_files_scanned += 1;
            let usage = self.scan_file(entry.path(), &content);
            if usage.has_legacy_usage() {
                debug!(
                    "{}: {} legacy imports, {} legacy schema URIs",
                    entry.path().display(),
                    usage.legacy_imports.len(),
                    usage.xml_namespaces.len()
                );
                result.files.push(usage);
            }
        }
        result.files.sort_by(|a, b| a.path.cmp(&b.path));

        info!(
            "Scanned {} files: {} with legacy usage, {} legacy imports",
            result.total_files_scanned,
            result.files.len(),
            result.legacy_import_count()
        );
        Ok(result)
    }

    fn scan_file(&self, path: &Path, content: &str) -> FileUsage {
        let mut usage = FileUsage {
            path: path.to_path_buf(),
            line_count: content.lines().count(),
            ..FileUsage::default()
        };
        let is_xml = path.extension().and_then(|e| e.to_str()) == Some("xml");

        for (index, line) in content.lines().enumerate() {
            let number = index + 1;
            if !is_xml {
                if let Some(caps) = IMPORT.captures(line) {
                    let full_name = caps[2].to_string();
                    if let Some(modern_equivalent) = to_modern_package(&full_name) {
                        usage.legacy_imports.push(ImportStatement {
                            package: package_of(&full_name),
                            modern_equivalent,
                            full_name,
                            line: number,
                            is_static: caps.get(1).is_some(),
                        });
                    }
                }
                for caps in REFLECTION.captures_iter(line) {
                    if legacy_family(&caps[1]).is_some() {
                        usage.reflection_usages.push(ReflectionUsage {
                            target: caps[1].to_string(),
                            line: number,
                        });
                    }
                }
                for caps in JNDI_LOOKUP.captures_iter(line) {
                    usage.reflection_usages.push(ReflectionUsage {
                        target: caps[1].to_string(),
                        line: number,
                    });
                }
            }
        }

        if is_xml {
            for m in LEGACY_XML_NAMESPACE.find_iter(content) {
                let uri = m.as_str().to_string();
                if !usage.xml_namespaces.contains(&uri) {
                    usage.xml_namespaces.push(uri);
                }
            }
        }
        usage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jmig_test_utils::{TempProject, LEGACY_ENTITY, LEGACY_PERSISTENCE_XML};
    use pretty_assertions::assert_eq;

    #[test]
    fn finds_migratable_imports_only() {
        let usage = RegexSourceScanner.scan_file(Path::new("Order.java"), LEGACY_ENTITY);
        let names: Vec<&str> = usage.legacy_imports.iter().map(|i| i.full_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "javax.persistence.Entity",
                "javax.persistence.Id",
                "javax.validation.constraints.NotNull",
            ]
        );
        assert_eq!(usage.legacy_imports[0].package, "javax.persistence");
        assert_eq!(usage.legacy_imports[0].modern_equivalent, "jakarta.persistence.Entity");
        assert_eq!(usage.legacy_imports[0].line, 3);
        assert_eq!(usage.families(), vec!["persistence", "validation"]);
    }

    #[test]
    fn static_and_wildcard_imports() {
        let src = "import static javax.persistence.CascadeType.ALL;\nimport javax.servlet.http.*;\n";
        let usage = RegexSourceScanner.scan_file(Path::new("A.java"), src);
        assert!(usage.legacy_imports[0].is_static);
        assert_eq!(usage.legacy_imports[0].package, "javax.persistence");
        assert_eq!(usage.legacy_imports[1].full_name, "javax.servlet.http.*");
        assert_eq!(usage.legacy_imports[1].package, "javax.servlet.http");
    }

    #[test]
    fn reflection_usages() {
        let src = r#"
Object a = Class.forName("javax.servlet.http.HttpServlet");
Object b = loader.loadClass("javax.sql.DataSource");
Object c = ctx.lookup("java:comp/env/javax.persistence.EntityManager");
"#;
        let usage = RegexSourceScanner.scan_file(Path::new("A.java"), src);
        let targets: Vec<&str> = usage.reflection_usages.iter().map(|r| r.target.as_str()).collect();
        assert_eq!(
            targets,
            vec!["javax.servlet.http.HttpServlet", "java:comp/env/javax.persistence.EntityManager"]
        );
    }

    #[test]
    fn xml_namespaces() {
        let usage = RegexSourceScanner.scan_file(Path::new("META-INF/persistence.xml"), LEGACY_PERSISTENCE_XML);
        assert_eq!(
            usage.xml_namespaces,
            vec![
                "http://xmlns.jcp.org/xml/ns/persistence",
                "http://xmlns.jcp.org/xml/ns/persistence/persistence_2_2.xsd",
            ]
        );
        assert!(usage.legacy_imports.is_empty());
    }

    #[test]
    fn project_scan_omits_clean_files() {
        let project = TempProject::legacy_maven()
            .with_file("src/main/java/com/example/Clean.java", "package com.example;\nimport java.util.List;\n");
        let result = RegexSourceScanner.scan_project(project.path()).unwrap();
        assert_eq!(result.total_files_scanned, 6);
        assert_eq!(result.files.len(), 4);
        assert!(result.get(&project.file("src/main/java/com/example/Clean.java")).is_none());
        assert!(result.get(&project.file("src/main/java/com/example/web/HelloServlet.java")).is_some());
    }

    #[test]
    fn missing_root_is_io_error() {
        let err = RegexSourceScanner.scan_project(Path::new("/no/such/root")).unwrap_err();
        assert!(matches!(err, RefactorError::Io { .. }));
    }
}

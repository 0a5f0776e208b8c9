//! Recipes: named, reversible, safety-leveled text transformations
//!
//! A recipe pairs catalog metadata with a [`TextRewrite`]. Every built-in
//! rewrite is idempotent: content already on the modern namespace comes back
//! byte-identical.

use crate::error::RecipeError;
use jmig_graph::{legacy_family, ValidationError, LEGACY_PREFIX, MODERN_PREFIX};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// How safe a recipe is to apply without review
///
/// Ordering follows application priority: `High < Medium < Low`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SafetyLevel {
    High,
    Medium,
    Low,
}

impl fmt::Display for SafetyLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        })
    }
}

/// What a recipe rewrites
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RecipeKind {
    /// Blanket `javax` → `jakarta` rewrite over every migratable family
    NamespaceRewrite,
    /// Rewrite limited to one API family
    ApiFamily,
    /// Deployment descriptor namespace update
    DescriptorUpdate,
}

/// Text transformation behind a recipe
pub trait TextRewrite: Send + Sync + fmt::Debug {
    /// Whether the rewrite handles this file at all
    fn applies_to(&self, path: &Path) -> bool;

    /// Rewritten content
    ///
    /// # Errors
    /// Returns `RecipeError` when the content cannot be transformed.
    fn rewrite(&self, path: &Path, content: &str) -> Result<String, RecipeError>;
}

/// Legacy package reference not preceded by an identifier character or a dot
static LEGACY_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(^|[^\w.$])javax\.([A-Za-z_][\w]*(?:\.[A-Za-z_*][\w]*)*)").expect("valid regex literal")
});

/// `javax.<family>` → `jakarta.<family>` over a set of families
///
/// JDK-owned packages (`javax.sql`, `javax.annotation.processing`, ...) are
/// never touched.
#[derive(Debug, Clone)]
pub struct PackageRewrite {
    /// `None` means every migratable family
    families: Option<Vec<String>>,
}

impl PackageRewrite {
    /// Rewrite every migratable family
    #[must_use]
    pub fn all() -> Self {
        Self { families: None }
    }

    /// Rewrite only the given families
    #[must_use]
    pub fn for_families<I, S>(families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            families: Some(families.into_iter().map(Into::into).collect()),
        }
    }

    fn covers(&self, family: &str) -> bool {
        self.families
            .as_ref()
            .map_or(true, |families| families.iter().any(|f| f == family))
    }

    /// Rewrite `content` without path filtering
    #[must_use]
    pub fn rewrite_text(&self, content: &str) -> String {
        LEGACY_REFERENCE
            .replace_all(content, |caps: &Captures<'_>| {
                let name = format!("{LEGACY_PREFIX}{}", &caps[2]);
                match legacy_family(&name) {
                    Some(family) if self.covers(family) => {
                        format!("{}{MODERN_PREFIX}{}", &caps[1], &caps[2])
                    }
                    _ => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}

impl TextRewrite for PackageRewrite {
    fn applies_to(&self, path: &Path) -> bool {
        matches!(
            path.extension().and_then(|e| e.to_str()),
            Some("java" | "kt" | "groovy" | "jsp" | "xml" | "properties")
        )
    }

    fn rewrite(&self, _path: &Path, content: &str) -> Result<String, RecipeError> {
        Ok(self.rewrite_text(content))
    }
}

/// Literal substitutions for one descriptor file name
///
/// Each replacement must not reintroduce its own source text, which keeps
/// the rewrite idempotent.
#[derive(Debug, Clone)]
pub struct XmlNamespaceRewrite {
    file_name: String,
    replacements: Vec<(String, String)>,
}

impl XmlNamespaceRewrite {
    #[must_use]
    pub fn new(file_name: impl Into<String>) -> Self {
        Self {
            file_name: file_name.into(),
            replacements: Vec::new(),
        }
    }

    /// Append a substitution
    #[must_use]
    pub fn replace(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.replacements.push((from.into(), to.into()));
        self
    }

    /// `persistence.xml`: namespace, schema, version and `javax.persistence.*` properties
    #[must_use]
    pub fn persistence() -> Self {
        Self::new("persistence.xml")
            .replace("http://xmlns.jcp.org/xml/ns/persistence/persistence_2_2.xsd", "https://jakarta.ee/xml/ns/persistence/persistence_3_0.xsd")
            .replace("http://xmlns.jcp.org/xml/ns/persistence/persistence_2_1.xsd", "https://jakarta.ee/xml/ns/persistence/persistence_3_0.xsd")
            .replace("http://java.sun.com/xml/ns/persistence/persistence_2_0.xsd", "https://jakarta.ee/xml/ns/persistence/persistence_3_0.xsd")
            .replace("http://xmlns.jcp.org/xml/ns/persistence", "https://jakarta.ee/xml/ns/persistence")
            .replace("http://java.sun.com/xml/ns/persistence", "https://jakarta.ee/xml/ns/persistence")
            .replace("version=\"2.2\"", "version=\"3.0\"")
            .replace("version=\"2.1\"", "version=\"3.0\"")
            .replace("version=\"2.0\"", "version=\"3.0\"")
            .replace("\"javax.persistence.", "\"jakarta.persistence.")
    }

    /// `web.xml`: Java EE schema to Jakarta EE 5.0 schema
    #[must_use]
    pub fn web() -> Self {
        Self::new("web.xml")
            .replace("http://xmlns.jcp.org/xml/ns/javaee/web-app_4_0.xsd", "https://jakarta.ee/xml/ns/jakartaee/web-app_5_0.xsd")
            .replace("http://xmlns.jcp.org/xml/ns/javaee/web-app_3_1.xsd", "https://jakarta.ee/xml/ns/jakartaee/web-app_5_0.xsd")
            .replace("http://java.sun.com/xml/ns/javaee/web-app_3_0.xsd", "https://jakarta.ee/xml/ns/jakartaee/web-app_5_0.xsd")
            .replace("http://xmlns.jcp.org/xml/ns/javaee", "https://jakarta.ee/xml/ns/jakartaee")
            .replace("http://java.sun.com/xml/ns/javaee", "https://jakarta.ee/xml/ns/jakartaee")
            .replace("version=\"4.0\"", "version=\"5.0\"")
            .replace("version=\"3.1\"", "version=\"5.0\"")
            .replace("version=\"3.0\"", "version=\"5.0\"")
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }
}

impl TextRewrite for XmlNamespaceRewrite {
    fn applies_to(&self, path: &Path) -> bool {
        path.file_name().and_then(|n| n.to_str()) == Some(self.file_name.as_str())
    }

    fn rewrite(&self, _path: &Path, content: &str) -> Result<String, RecipeError> {
        Ok(self
            .replacements
            .iter()
            .fold(content.to_string(), |text, (from, to)| text.replace(from.as_str(), to)))
    }
}

/// Catalog entry
#[derive(Debug, Clone)]
pub struct Recipe {
    name: String,
    description: String,
    pattern: String,
    safety: SafetyLevel,
    kind: RecipeKind,
    families: Vec<String>,
    rewrite: Arc<dyn TextRewrite>,
}

impl Recipe {
    /// Create recipe
    ///
    /// # Errors
    /// Returns `ValidationError::Blank` for a blank name.
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        pattern: impl Into<String>,
        safety: SafetyLevel,
        kind: RecipeKind,
        rewrite: Arc<dyn TextRewrite>,
    ) -> Result<Self, ValidationError> {
        let name = name.into();
        ValidationError::require_non_blank("name", &name)?;
        Ok(Self {
            name,
            description: description.into(),
            pattern: pattern.into(),
            safety,
            kind,
            families: Vec::new(),
            rewrite,
        })
    }

    /// API families an `ApiFamily` recipe is responsible for
    #[must_use]
    pub fn with_families<I, S>(mut self, families: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.families = families.into_iter().map(Into::into).collect();
        self
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[inline]
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Descriptive source → target substitution
    #[inline]
    #[must_use]
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    #[inline]
    #[must_use]
    pub fn safety(&self) -> SafetyLevel {
        self.safety
    }

    #[inline]
    #[must_use]
    pub fn kind(&self) -> RecipeKind {
        self.kind
    }

    #[inline]
    #[must_use]
    pub fn families(&self) -> &[String] {
        &self.families
    }

    /// Recipes are reversible through checkpoints
    #[inline]
    #[must_use]
    pub fn is_reversible(&self) -> bool {
        true
    }

    #[must_use]
    pub fn applies_to(&self, path: &Path) -> bool {
        self.rewrite.applies_to(path)
    }

    /// Apply the rewrite
    ///
    /// # Errors
    /// Propagates the rewrite's `RecipeError`.
    pub fn apply(&self, path: &Path, content: &str) -> Result<String, RecipeError> {
        self.rewrite.rewrite(path, content)
    }
}

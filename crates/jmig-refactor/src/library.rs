//! Recipe library
//!
//! Instance-owned registry keyed by unique recipe name. Registering an
//! existing name replaces the entry.

use crate::recipe::{PackageRewrite, Recipe, RecipeKind, SafetyLevel, XmlNamespaceRewrite};
use dashmap::DashMap;
use jmig_graph::{legacy_family, ValidationError};
use std::sync::Arc;
use tracing::debug;

/// Blanket namespace rewrite recipe
pub const ADD_JAKARTA_NAMESPACE: &str = "AddJakartaNamespace";
/// `persistence.xml` descriptor recipe
pub const UPDATE_PERSISTENCE_XML: &str = "UpdatePersistenceXml";
/// `web.xml` descriptor recipe
pub const UPDATE_WEB_XML: &str = "UpdateWebXml";

/// (name, families, safety, description)
const FAMILY_RECIPES: &[(&str, &[&str], SafetyLevel, &str)] = &[
    ("MigrateServletApi", &["servlet", "servlet.jsp"], SafetyLevel::High, "Servlet and JSP APIs"),
    ("MigrateJpa", &["persistence"], SafetyLevel::High, "Persistence API"),
    ("MigrateCdi", &["enterprise", "inject", "decorator", "interceptor"], SafetyLevel::High, "Contexts and Dependency Injection"),
    ("MigrateValidator", &["validation"], SafetyLevel::High, "Bean Validation"),
    ("MigrateEjb", &["ejb"], SafetyLevel::High, "Enterprise Beans"),
    ("MigrateJms", &["jms"], SafetyLevel::High, "Messaging"),
    ("MigrateJaxrs", &["ws.rs"], SafetyLevel::High, "RESTful Web Services"),
    ("MigrateJta", &["transaction"], SafetyLevel::High, "Transactions"),
    ("MigrateJavaMail", &["mail"], SafetyLevel::High, "Mail"),
    ("MigrateWebsocket", &["websocket"], SafetyLevel::High, "WebSocket"),
    ("MigrateJsonb", &["json.bind"], SafetyLevel::High, "JSON Binding"),
    ("MigrateJsonp", &["json"], SafetyLevel::High, "JSON Processing"),
    ("MigrateAnnotations", &["annotation"], SafetyLevel::High, "Common Annotations"),
    ("MigrateEl", &["el"], SafetyLevel::High, "Expression Language"),
    ("MigrateJaxb", &["xml.bind"], SafetyLevel::Medium, "XML Binding"),
    ("MigrateJaxws", &["xml.ws"], SafetyLevel::Medium, "XML Web Services"),
    ("MigrateActivation", &["activation"], SafetyLevel::Medium, "Activation"),
    ("MigrateSoap", &["xml.soap"], SafetyLevel::Medium, "SOAP with Attachments"),
    ("MigrateAuthorization", &["security.jacc", "security.auth.message", "security.enterprise"], SafetyLevel::Medium, "Authorization, Authentication and Security"),
    ("MigrateFaces", &["faces"], SafetyLevel::Medium, "Faces"),
    ("MigrateBatch", &["batch"], SafetyLevel::Medium, "Batch"),
    ("MigrateResource", &["resource"], SafetyLevel::Medium, "Connectors"),
];

/// Registry of recipes
#[derive(Debug, Default)]
pub struct RecipeLibrary {
    recipes: DashMap<String, Recipe>,
}

impl RecipeLibrary {
    /// Create empty library
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self {
            recipes: DashMap::new(),
        }
    }

    /// Create library with the seed recipes
    ///
    /// # Errors
    /// Only if a seed recipe fails validation.
    pub fn with_defaults() -> Result<Self, ValidationError> {
        let library = Self::new();
        library.register(Recipe::new(
            ADD_JAKARTA_NAMESPACE,
            "Rewrite every migratable javax package reference to jakarta",
            "javax.<family>.* -> jakarta.<family>.*",
            SafetyLevel::High,
            RecipeKind::NamespaceRewrite,
            Arc::new(PackageRewrite::all()),
        )?);
        library.register(Recipe::new(
            UPDATE_PERSISTENCE_XML,
            "Move persistence.xml to the Jakarta Persistence 3.0 schema",
            "xmlns.jcp.org/xml/ns/persistence -> jakarta.ee/xml/ns/persistence",
            SafetyLevel::High,
            RecipeKind::DescriptorUpdate,
            Arc::new(XmlNamespaceRewrite::persistence()),
        )?);
        library.register(Recipe::new(
            UPDATE_WEB_XML,
            "Move web.xml to the Jakarta EE web-app 5.0 schema",
            "xmlns.jcp.org/xml/ns/javaee -> jakarta.ee/xml/ns/jakartaee",
            SafetyLevel::Medium,
            RecipeKind::DescriptorUpdate,
            Arc::new(XmlNamespaceRewrite::web()),
        )?);

        for (name, families, safety, api) in FAMILY_RECIPES {
            let pattern = families
                .iter()
                .map(|f| format!("javax.{f} -> jakarta.{f}"))
                .collect::<Vec<_>>()
                .join(", ");
            library.register(
                Recipe::new(
                    *name,
                    format!("Migrate {api} imports and references"),
                    pattern,
                    *safety,
                    RecipeKind::ApiFamily,
                    Arc::new(PackageRewrite::for_families(families.iter().copied())),
                )?
                .with_families(families.iter().copied()),
            );
        }
        debug!("Recipe library seeded with {} recipes", library.len());
        Ok(library)
    }

    /// Register a recipe, returning the entry it replaced
    pub fn register(&self, recipe: Recipe) -> Option<Recipe> {
        self.recipes.insert(recipe.name().to_string(), recipe)
    }

    /// Look up by name
    #[must_use]
    pub fn get_by_name(&self, name: &str) -> Option<Recipe> {
        self.recipes.get(name).map(|r| r.value().clone())
    }

    /// All recipes sorted by name
    #[must_use]
    pub fn get_all(&self) -> Vec<Recipe> {
        let mut all: Vec<Recipe> = self.recipes.iter().map(|r| r.value().clone()).collect();
        all.sort_by(|a, b| a.name().cmp(b.name()));
        all
    }

    /// Check if a name is registered
    #[inline]
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.recipes.contains_key(name)
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.recipes.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.recipes.is_empty()
    }

    /// API-family recipe responsible for a legacy package or class
    #[must_use]
    pub fn recipe_for_package(&self, package: &str) -> Option<Recipe> {
        let family = legacy_family(package)?;
        self.get_all()
            .into_iter()
            .find(|r| r.kind() == RecipeKind::ApiFamily && r.families().iter().any(|f| f == family))
    }

    /// Recipes of one kind, sorted by name
    #[must_use]
    pub fn of_kind(&self, kind: RecipeKind) -> Vec<Recipe> {
        self.get_all().into_iter().filter(|r| r.kind() == kind).collect()
    }
}

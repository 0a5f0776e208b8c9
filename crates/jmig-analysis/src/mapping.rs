//! Jakarta Mapping Service
//!
//! Static legacy → modern coordinate table. A missing mapping is a signal
//! for blocker detection, never an error.
//!
//! Spring keeps its coordinates across the namespace switch, so Spring Boot
//! below 3.0 and Spring Framework below 6.0 map to a newer version of the
//! same artifact instead of a table row.

use jmig_graph::{Artifact, Version};
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::HashMap;

/// One row of the mapping table
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MappingEntry {
    /// Modern group id
    pub group_id: String,
    /// Modern artifact id
    pub artifact_id: String,
    /// Recommended modern version
    pub version: String,
    /// Migration notes
    pub notes: String,
    /// Known API breaks between the two coordinates
    pub breaking_changes: Vec<String>,
}

impl MappingEntry {
    fn row(group: &str, artifact: &str, version: &str, notes: &str, breaking: &[&str]) -> Self {
        Self {
            group_id: group.to_string(),
            artifact_id: artifact.to_string(),
            version: version.to_string(),
            notes: notes.to_string(),
            breaking_changes: breaking.iter().map(ToString::to_string).collect(),
        }
    }
}

/// Same-coordinate upgrade for a library whose modern line keeps its ids
#[derive(Debug)]
struct UpgradeRule {
    group_id: &'static str,
    artifact_prefix: &'static str,
    first_modern: &'static str,
    target: &'static str,
    notes: &'static str,
    breaking_changes: &'static [&'static str],
}

impl UpgradeRule {
    fn applies_to(&self, artifact: &Artifact) -> bool {
        artifact.group_id() == self.group_id
            && artifact.artifact_id().starts_with(self.artifact_prefix)
            && !Version::parse(artifact.version()).at_least(self.first_modern)
    }

    fn entry(&self, artifact: &Artifact) -> MappingEntry {
        MappingEntry::row(
            artifact.group_id(),
            artifact.artifact_id(),
            self.target,
            self.notes,
            self.breaking_changes,
        )
    }
}

const UPGRADES: &[UpgradeRule] = &[
    UpgradeRule {
        group_id: "org.springframework.boot",
        artifact_prefix: "",
        first_modern: "3.0.0",
        target: "3.2.5",
        notes: "Spring Boot 3 moves to Jakarta EE 10 and requires Java 17",
        breaking_changes: &[
            "Java 17 baseline",
            "spring.factories auto-configuration registration replaced by AutoConfiguration.imports",
        ],
    },
    UpgradeRule {
        group_id: "org.springframework",
        artifact_prefix: "spring-",
        first_modern: "6.0.0",
        target: "6.1.6",
        notes: "Spring Framework 6 moves to Jakarta EE 9+ and requires Java 17",
        breaking_changes: &["Java 17 baseline"],
    },
];

/// Resolved mapping for one artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JakartaMapping {
    /// Modern artifact, keeping the original scope
    pub modern: Artifact,
    /// Migration notes
    pub notes: String,
    /// Known API breaks
    pub breaking_changes: Vec<String>,
}

static DEFAULT_TABLE: Lazy<HashMap<String, MappingEntry>> = Lazy::new(|| {
    let rows = [
        ("javax.servlet:javax.servlet-api", MappingEntry::row(
            "jakarta.servlet", "jakarta.servlet-api", "6.0.0",
            "Servlet 6.0 requires Java 11",
            &["SingleThreadModel removed", "HttpSessionContext removed", "deprecated HttpServletRequest#isRequestedSessionIdFromUrl removed"],
        )),
        ("javax.servlet.jsp:javax.servlet.jsp-api", MappingEntry::row(
            "jakarta.servlet.jsp", "jakarta.servlet.jsp-api", "3.1.0", "JSP API", &[],
        )),
        ("org.glassfish.web:javax.servlet.jsp", MappingEntry::row(
            "org.glassfish.web", "jakarta.servlet.jsp", "3.1.0", "GlassFish JSP implementation", &[],
        )),
        ("javax.el:javax.el-api", MappingEntry::row(
            "jakarta.el", "jakarta.el-api", "5.0.0", "Expression Language API", &[],
        )),
        ("org.glassfish:javax.el", MappingEntry::row(
            "org.glassfish", "jakarta.el", "5.0.0", "GlassFish EL implementation", &[],
        )),
        ("javax.websocket:javax.websocket-api", MappingEntry::row(
            "jakarta.websocket", "jakarta.websocket-api", "2.1.0", "WebSocket API", &[],
        )),
        ("javax.persistence:javax.persistence-api", MappingEntry::row(
            "jakarta.persistence", "jakarta.persistence-api", "3.1.0",
            "Update persistence.xml schema alongside the API",
            &[],
        )),
        ("javax.transaction:javax.transaction-api", MappingEntry::row(
            "jakarta.transaction", "jakarta.transaction-api", "2.0.1",
            "javax.transaction.xa stays in the JDK",
            &[],
        )),
        ("javax.enterprise:cdi-api", MappingEntry::row(
            "jakarta.enterprise", "jakarta.enterprise.cdi-api", "4.0.1", "CDI API", &[],
        )),
        ("javax.enterprise:javax.enterprise-api", MappingEntry::row(
            "jakarta.enterprise", "jakarta.enterprise.cdi-api", "4.0.1", "CDI API", &[],
        )),
        ("javax.inject:javax.inject", MappingEntry::row(
            "jakarta.inject", "jakarta.inject-api", "2.0.1", "Dependency Injection API", &[],
        )),
        ("javax.inject:javax.inject-api", MappingEntry::row(
            "jakarta.inject", "jakarta.inject-api", "2.0.1", "Dependency Injection API", &[],
        )),
        ("javax.validation:validation-api", MappingEntry::row(
            "jakarta.validation", "jakarta.validation-api", "3.0.2", "Bean Validation API", &[],
        )),
        ("org.hibernate:hibernate-validator", MappingEntry::row(
            "org.hibernate.validator", "hibernate-validator", "8.0.0.Final",
            "Group id changed to org.hibernate.validator",
            &[],
        )),
        ("javax.json:javax.json-api", MappingEntry::row(
            "jakarta.json", "jakarta.json-api", "2.1.2", "JSON Processing API", &[],
        )),
        ("org.glassfish:javax.json", MappingEntry::row(
            "org.eclipse.parsson", "parsson", "1.1.2", "JSON-P implementation moved to Parsson", &[],
        )),
        ("javax.json.bind:javax.json.bind-api", MappingEntry::row(
            "jakarta.json.bind", "jakarta.json.bind-api", "3.0.0", "JSON Binding API", &[],
        )),
        ("javax.ws.rs:javax.ws.rs-api", MappingEntry::row(
            "jakarta.ws.rs", "jakarta.ws.rs-api", "3.1.0", "RESTful Web Services API", &[],
        )),
        ("javax.xml.bind:jaxb-api", MappingEntry::row(
            "jakarta.xml.bind", "jakarta.xml.bind-api", "4.0.0", "XML Binding API",
            &["javax.xml.bind.DatatypeConverterImpl no longer public"],
        )),
        ("org.glassfish.jaxb:jaxb-runtime", MappingEntry::row(
            "org.glassfish.jaxb", "jaxb-runtime", "4.0.0", "JAXB runtime for jakarta.xml.bind", &[],
        )),
        ("com.sun.xml.bind:jaxb-impl", MappingEntry::row(
            "org.glassfish.jaxb", "jaxb-runtime", "4.0.0",
            "Legacy JAXB reference implementation replaced by jaxb-runtime",
            &["com.sun.xml.bind internal classes removed"],
        )),
        ("com.sun.xml.bind:jaxb-core", MappingEntry::row(
            "org.glassfish.jaxb", "jaxb-runtime", "4.0.0",
            "Legacy JAXB core merged into jaxb-runtime",
            &["com.sun.xml.bind internal classes removed"],
        )),
        ("javax.xml.ws:jaxws-api", MappingEntry::row(
            "jakarta.xml.ws", "jakarta.xml.ws-api", "4.0.0", "XML Web Services API", &[],
        )),
        ("javax.xml.soap:javax.xml.soap-api", MappingEntry::row(
            "jakarta.xml.soap", "jakarta.xml.soap-api", "3.0.0", "SOAP with Attachments API", &[],
        )),
        ("javax.mail:javax.mail-api", MappingEntry::row(
            "jakarta.mail", "jakarta.mail-api", "2.1.2", "Mail API", &[],
        )),
        ("com.sun.mail:javax.mail", MappingEntry::row(
            "org.eclipse.angus", "angus-mail", "2.0.2", "Mail implementation moved to Eclipse Angus", &[],
        )),
        ("javax.activation:javax.activation-api", MappingEntry::row(
            "jakarta.activation", "jakarta.activation-api", "2.1.2", "Activation API", &[],
        )),
        ("javax.activation:activation", MappingEntry::row(
            "jakarta.activation", "jakarta.activation-api", "2.1.2", "Activation API", &[],
        )),
        ("com.sun.activation:javax.activation", MappingEntry::row(
            "jakarta.activation", "jakarta.activation-api", "2.1.2", "Activation API", &[],
        )),
        ("javax.jms:javax.jms-api", MappingEntry::row(
            "jakarta.jms", "jakarta.jms-api", "3.1.0", "Messaging API", &[],
        )),
        ("javax.annotation:javax.annotation-api", MappingEntry::row(
            "jakarta.annotation", "jakarta.annotation-api", "2.1.1",
            "javax.annotation.processing stays in the JDK",
            &[],
        )),
        ("javax.ejb:javax.ejb-api", MappingEntry::row(
            "jakarta.ejb", "jakarta.ejb-api", "4.0.1", "Enterprise Beans API", &[],
        )),
        ("javax.faces:javax.faces-api", MappingEntry::row(
            "jakarta.faces", "jakarta.faces-api", "4.0.1", "Faces API",
            &["JSP support for Faces views removed"],
        )),
        ("javax.security.enterprise:javax.security.enterprise-api", MappingEntry::row(
            "jakarta.security.enterprise", "jakarta.security.enterprise-api", "3.0.0", "Security API", &[],
        )),
        ("javax.batch:javax.batch-api", MappingEntry::row(
            "jakarta.batch", "jakarta.batch-api", "2.1.1", "Batch API", &[],
        )),
        ("javax:javaee-api", MappingEntry::row(
            "jakarta.platform", "jakarta.jakartaee-api", "10.0.0", "Full platform API", &[],
        )),
        ("javax:javaee-web-api", MappingEntry::row(
            "jakarta.platform", "jakarta.jakartaee-web-api", "10.0.0", "Web profile API", &[],
        )),
    ];
    rows.into_iter()
        .map(|(legacy, entry)| (legacy.to_string(), entry))
        .collect()
});

/// Legacy → modern coordinate lookup
///
/// Starts from the built-in table; `with_mapping` extends a single instance
/// without touching any other.
#[derive(Debug, Clone)]
pub struct JakartaMappingService {
    table: HashMap<String, MappingEntry>,
}

impl JakartaMappingService {
    /// Service backed by the built-in table
    #[must_use]
    pub fn new() -> Self {
        Self {
            table: DEFAULT_TABLE.clone(),
        }
    }

    /// Service with no mappings
    #[must_use]
    pub fn empty() -> Self {
        Self {
            table: HashMap::new(),
        }
    }

    /// Add or replace a mapping keyed by legacy `group:artifact`
    #[must_use]
    pub fn with_mapping(mut self, legacy_identifier: impl Into<String>, entry: MappingEntry) -> Self {
        self.table.insert(legacy_identifier.into(), entry);
        self
    }

    /// Modern equivalent of `artifact`, if one is known
    ///
    /// Table rows win over same-coordinate upgrades.
    #[must_use]
    pub fn find_mapping(&self, artifact: &Artifact) -> Option<JakartaMapping> {
        match self.table.get(&artifact.identifier()) {
            Some(entry) => Self::resolve(artifact, entry),
            None => {
                let rule = UPGRADES.iter().find(|rule| rule.applies_to(artifact))?;
                Self::resolve(artifact, &rule.entry(artifact))
            }
        }
    }

    fn resolve(artifact: &Artifact, entry: &MappingEntry) -> Option<JakartaMapping> {
        let modern = Artifact::new(
            entry.group_id.clone(),
            entry.artifact_id.clone(),
            entry.version.clone(),
            artifact.scope(),
            artifact.is_transitive(),
        )
        .ok()?;
        Some(JakartaMapping {
            modern,
            notes: entry.notes.clone(),
            breaking_changes: entry.breaking_changes.clone(),
        })
    }

    /// Whether a mapping exists
    #[inline]
    #[must_use]
    pub fn has_mapping(&self, artifact: &Artifact) -> bool {
        self.table.contains_key(&artifact.identifier())
            || UPGRADES.iter().any(|rule| rule.applies_to(artifact))
    }

    /// Number of table rows; same-coordinate upgrades are not counted
    #[inline]
    #[must_use]
    pub fn mapping_count(&self) -> usize {
        self.table.len()
    }
}

impl Default for JakartaMappingService {
    fn default() -> Self {
        Self::new()
    }
}

//! Error pattern matcher
//!
//! Keyword and regex classification of JVM failure text. Categories overlap,
//! so [`ErrorPatternMatcher::determine_error_category`] checks them in a fixed
//! precedence order:
//! 1. Legacy namespace signal → `NAMESPACE_MIGRATION`
//! 2. Modern namespace signal → `CLASSPATH_ISSUE`
//! 3. Linkage error or both namespaces in the text → `BINARY_INCOMPATIBILITY`
//! 4. Configuration vocabulary → `CONFIGURATION_ERROR`
//! 5. Otherwise `UNKNOWN`
//!
//! Class names may use `.` or the JVM's internal `/` separator.

use crate::types::{ErrorCategory, ErrorType};
use jmig_graph::{LEGACY_PREFIX, MODERN_PREFIX};
use once_cell::sync::Lazy;
use regex::Regex;

const FAMILIES: &str = "servlet|persistence|ejb|validation|ws|xml|jms|mail|security|transaction|annotation|inject|decorator|interceptor|batch|connector|json|jsonb|jta|jpa|faces|cdi";

fn missing_class(throwable: &str, prefix: &str) -> Regex {
    Regex::new(&format!(r"(?is){throwable}.*\b{prefix}[./](?:{FAMILIES})\b")).expect("valid regex literal")
}

static LEGACY_CLASS_NOT_FOUND: Lazy<Regex> = Lazy::new(|| missing_class("ClassNotFoundException", "javax"));
static LEGACY_NO_CLASS_DEF: Lazy<Regex> = Lazy::new(|| missing_class("NoClassDefFoundError", "javax"));
static MODERN_CLASS_NOT_FOUND: Lazy<Regex> = Lazy::new(|| missing_class("ClassNotFoundException", "jakarta"));
static MODERN_NO_CLASS_DEF: Lazy<Regex> = Lazy::new(|| missing_class("NoClassDefFoundError", "jakarta"));

static LINKAGE_ERROR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)LinkageError.*\b(?:javax|jakarta)\b").expect("valid regex literal"));

static MIXED_NAMESPACE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?is)\bjavax\b.*\bjakarta\b|\bjakarta\b.*\bjavax\b").expect("valid regex literal")
});

/// Keyword → type, first match wins
const TYPE_KEYWORDS: &[(&str, ErrorType)] = &[
    ("classnotfoundexception", ErrorType::ClassNotFound),
    ("noclassdeffounderror", ErrorType::NoClassDefFound),
    ("linkageerror", ErrorType::LinkageError),
    ("nosuchmethoderror", ErrorType::NoSuchMethod),
    ("nosuchfielderror", ErrorType::NoSuchField),
    ("illegalaccesserror", ErrorType::IllegalAccess),
    ("classcastexception", ErrorType::ClassCast),
];

const CONFIGURATION_WORDS: &[&str] = &["xml", "configuration", "properties"];

/// Stateless classifier over failure text
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorPatternMatcher;

impl ErrorPatternMatcher {
    /// Throwable kind named in `message`; `None` or no keyword gives `Other`
    #[must_use]
    pub fn determine_error_type(message: Option<&str>) -> ErrorType {
        let Some(message) = message else {
            return ErrorType::Other;
        };
        let lower = message.to_lowercase();
        TYPE_KEYWORDS
            .iter()
            .find(|(keyword, _)| lower.contains(keyword))
            .map_or(ErrorType::Other, |(_, error_type)| *error_type)
    }

    /// Migration category of a failure
    #[must_use]
    pub fn determine_error_category(message: Option<&str>, class_name: Option<&str>) -> ErrorCategory {
        if message.is_none() && class_name.is_none() {
            return ErrorCategory::Unknown;
        }
        let message = message.unwrap_or_default().to_lowercase();
        let class_name = class_name.unwrap_or_default().to_lowercase();
        let combined = format!("{message} {class_name}");

        let legacy_token = class_name.starts_with(LEGACY_PREFIX) || message.contains(LEGACY_PREFIX);
        if legacy_token || LEGACY_CLASS_NOT_FOUND.is_match(&combined) || LEGACY_NO_CLASS_DEF.is_match(&combined) {
            return ErrorCategory::NamespaceMigration;
        }

        let modern_token = class_name.starts_with(MODERN_PREFIX) || message.contains(MODERN_PREFIX);
        if modern_token || MODERN_CLASS_NOT_FOUND.is_match(&combined) || MODERN_NO_CLASS_DEF.is_match(&combined) {
            return ErrorCategory::ClasspathIssue;
        }

        if LINKAGE_ERROR.is_match(&combined) || MIXED_NAMESPACE.is_match(&combined) {
            return ErrorCategory::BinaryIncompatibility;
        }

        if CONFIGURATION_WORDS.iter().any(|w| combined.contains(w)) {
            return ErrorCategory::ConfigurationError;
        }
        ErrorCategory::Unknown
    }

    /// Category is one caused by the namespace move
    #[must_use]
    pub fn is_jakarta_migration_related(message: Option<&str>, class_name: Option<&str>) -> bool {
        Self::determine_error_category(message, class_name).is_jakarta_migration_related()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn error_types() {
        let cases = [
            ("java.lang.ClassNotFoundException: javax.servlet.Filter", ErrorType::ClassNotFound),
            ("java.lang.NoClassDefFoundError: javax/servlet/Filter", ErrorType::NoClassDefFound),
            ("java.lang.LinkageError: loader constraint violation", ErrorType::LinkageError),
            ("java.lang.NoSuchMethodError: 'void a.B.c()'", ErrorType::NoSuchMethod),
            ("java.lang.NoSuchFieldError: COUNT", ErrorType::NoSuchField),
            ("java.lang.IllegalAccessError: tried to access", ErrorType::IllegalAccess),
            ("java.lang.ClassCastException: a cannot be cast to b", ErrorType::ClassCast),
            ("CLASSNOTFOUNDEXCEPTION", ErrorType::ClassNotFound),
            ("java.lang.NullPointerException", ErrorType::Other),
        ];
        for (message, expected) in cases {
            assert_eq!(ErrorPatternMatcher::determine_error_type(Some(message)), expected, "{message}");
        }
        assert_eq!(ErrorPatternMatcher::determine_error_type(None), ErrorType::Other);
    }

    #[test]
    fn legacy_class_not_found_is_namespace_migration() {
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(
                Some("ClassNotFoundException: javax.servlet.Servlet"),
                Some("javax.servlet.http.HttpServlet"),
            ),
            ErrorCategory::NamespaceMigration
        );
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(Some("NoClassDefFoundError: javax/persistence/Entity"), None),
            ErrorCategory::NamespaceMigration
        );
    }

    #[test]
    fn modern_class_not_found_is_classpath_issue() {
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(
                Some("ClassNotFoundException: jakarta.servlet.Servlet"),
                Some("jakarta.servlet.http.HttpServlet"),
            ),
            ErrorCategory::ClasspathIssue
        );
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(Some("NoClassDefFoundError: jakarta/inject/Inject"), None),
            ErrorCategory::ClasspathIssue
        );
    }

    #[test]
    fn legacy_signal_wins_over_modern() {
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(
                Some("jakarta.servlet.Filter incompatible with javax.servlet.Filter"),
                None,
            ),
            ErrorCategory::NamespaceMigration
        );
    }

    #[test]
    fn linkage_and_mixed_tokens_are_binary_incompatibility() {
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(
                Some("LinkageError: loader constraint violation for jakarta/ws/rs/core/Response"),
                Some("com.acme.Api"),
            ),
            ErrorCategory::BinaryIncompatibility
        );
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(Some("both javax and jakarta apis on the path"), None),
            ErrorCategory::BinaryIncompatibility
        );
    }

    #[test]
    fn configuration_vocabulary() {
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(Some("Failed to parse persistence XML"), None),
            ErrorCategory::ConfigurationError
        );
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(None, Some("com.acme.ConfigurationLoader")),
            ErrorCategory::ConfigurationError
        );
    }

    #[test]
    fn unknown_defaults() {
        assert_eq!(ErrorPatternMatcher::determine_error_category(None, None), ErrorCategory::Unknown);
        assert_eq!(
            ErrorPatternMatcher::determine_error_category(Some("NullPointerException"), Some("com.acme.Main")),
            ErrorCategory::Unknown
        );
        assert!(!ErrorPatternMatcher::is_jakarta_migration_related(None, None));
        assert!(ErrorPatternMatcher::is_jakarta_migration_related(None, Some("javax.jms.Queue")));
    }
}

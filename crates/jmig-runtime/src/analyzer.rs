//! Error analyzer
//!
//! Turns captured process output into [`RuntimeError`]s and [`Warning`]s,
//! then reduces a set of errors to one [`ErrorAnalysis`] with remediation.

use crate::matcher::ErrorPatternMatcher;
use crate::types::{
    ErrorAnalysis, ErrorCategory, RemediationStep, RuntimeError, SimilarFailure, StackFrame,
    StackTrace, Warning,
};
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::debug;

static STACK_FRAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s*at\s+([\w.$]+)\.([\w$<>]+)\(([\w$]+\.java):(\d+)\)").expect("valid regex literal")
});

static NAMESPACE_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b(?:javax|jakarta)[./][\w./$]*\w").expect("valid regex literal"));

static THREAD_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"^Exception in thread "[^"]*"\s+"#).expect("valid regex literal"));

/// Parser and root-cause analyzer for JVM failures
#[derive(Debug, Clone, Default)]
pub struct ErrorAnalyzer {
    /// (lowercase message fragment, resolution)
    known_failures: Vec<(String, String)>,
}

/// Error under construction while scanning output lines
struct PendingError {
    exception_class: String,
    message: String,
    frames: Vec<StackFrame>,
}

impl PendingError {
    fn finish(self) -> Option<RuntimeError> {
        let text = if self.message.is_empty() {
            self.exception_class.clone()
        } else {
            format!("{}: {}", self.exception_class, self.message)
        };
        let error_type = ErrorPatternMatcher::determine_error_type(Some(&text));
        let class_name = class_name_of(&self.exception_class, &self.message);
        let method_name = self.frames.first().map(|f| f.method_name.clone());
        let confidence = if ErrorPatternMatcher::is_jakarta_migration_related(Some(&text), class_name.as_deref()) {
            0.9
        } else {
            0.5
        };
        let stack_trace = StackTrace {
            exception_class: self.exception_class,
            message: self.message,
            frames: self.frames,
        };
        RuntimeError::new(error_type, text, stack_trace, class_name, method_name, confidence).ok()
    }
}

fn in_namespace(name: &str) -> bool {
    ["javax.", "jakarta.", "javax/", "jakarta/"]
        .iter()
        .any(|prefix| name.starts_with(prefix))
}

/// Exception class if namespaced, else the first namespaced token of the message
fn class_name_of(exception_class: &str, message: &str) -> Option<String> {
    let raw = if in_namespace(exception_class) {
        Some(exception_class)
    } else {
        NAMESPACE_TOKEN.find(message).map(|m| m.as_str())
    };
    raw.map(|name| name.replace('/', "."))
}

fn step(description: &str, action: &str, details: Vec<String>, priority: u8) -> RemediationStep {
    RemediationStep {
        description: description.to_string(),
        action: action.to_string(),
        details,
        priority,
    }
}

impl ErrorAnalyzer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a failure seen before and how it was resolved
    #[must_use]
    pub fn with_known_failure(mut self, pattern: impl Into<String>, resolution: impl Into<String>) -> Self {
        self.known_failures
            .push((pattern.into().to_lowercase(), resolution.into()));
        self
    }

    /// Extract errors from captured output, stderr first
    #[must_use]
    pub fn parse_output(&self, stdout: &str, stderr: &str) -> Vec<RuntimeError> {
        let mut errors = Vec::new();
        let mut pending: Option<PendingError> = None;

        for line in stderr.lines().chain(stdout.lines()) {
            if let Some(caps) = STACK_FRAME.captures(line) {
                if let Some(current) = pending.as_mut() {
                    current.frames.push(StackFrame {
                        class_name: caps[1].to_string(),
                        method_name: caps[2].to_string(),
                        file_name: caps[3].to_string(),
                        line: caps[4].parse().unwrap_or(0),
                    });
                }
                continue;
            }
            if !(line.contains("Exception") || line.contains("Error")) {
                continue;
            }

            errors.extend(pending.take().and_then(PendingError::finish));
            let header = line.trim();
            let header = header.strip_prefix("Caused by:").map_or(header, str::trim);
            let header = THREAD_PREFIX.replace(header, "");
            let (exception_class, message) = match header.split_once(':') {
                Some((class, message)) => (class.trim().to_string(), message.trim().to_string()),
                None => (header.trim().to_string(), String::new()),
            };
            pending = Some(PendingError {
                exception_class,
                message,
                frames: Vec::new(),
            });
        }
        errors.extend(pending.and_then(PendingError::finish));

        debug!("Parsed {} runtime errors from process output", errors.len());
        errors
    }

    /// Warning and deprecation lines from stderr
    #[must_use]
    pub fn parse_warnings(&self, stderr: &str) -> Vec<Warning> {
        stderr
            .lines()
            .filter_map(|line| {
                let lower = line.to_lowercase();
                let category = if lower.contains("deprecated") {
                    "DEPRECATION"
                } else if lower.contains("warning") {
                    "WARNING"
                } else {
                    return None;
                };
                Warning::new(line.trim(), category, 0.5).ok()
            })
            .collect()
    }

    /// Reduce `errors` to one analysis around the dominant category
    #[must_use]
    pub fn analyze(&self, errors: &[RuntimeError]) -> ErrorAnalysis {
        if errors.is_empty() {
            return ErrorAnalysis::empty();
        }

        let categories: Vec<ErrorCategory> = errors.iter().map(RuntimeError::category).collect();
        let count = |category: ErrorCategory| categories.iter().filter(|c| **c == category).count();
        let mut category = ErrorCategory::Unknown;
        let mut best = 0;
        for candidate in ErrorCategory::ALL {
            let n = count(candidate);
            if n > best {
                best = n;
                category = candidate;
            }
        }

        let in_category: Vec<&RuntimeError> = errors
            .iter()
            .zip(&categories)
            .filter(|(_, c)| **c == category)
            .map(|(e, _)| e)
            .collect();
        let primary = in_category[0];
        #[allow(clippy::cast_precision_loss)]
        let confidence =
            in_category.iter().map(|e| e.confidence()).sum::<f64>() / in_category.len() as f64;

        ErrorAnalysis {
            category,
            root_cause: Self::root_cause(category, primary),
            contributing_factors: Self::contributing_factors(errors, &categories, category),
            similar_failures: self.similar_failures(errors),
            suggested_fixes: Self::fixes_for(category, primary),
            confidence,
        }
    }

    /// Steps for an analysis, by ascending priority
    #[must_use]
    pub fn remediation_steps(&self, analysis: &ErrorAnalysis) -> Vec<RemediationStep> {
        let mut steps = analysis.suggested_fixes.clone();
        steps.extend(analysis.similar_failures.iter().map(|f| {
            step(
                "Apply known resolution",
                &f.resolution,
                vec![format!("Previously seen: {}", f.error_pattern)],
                0,
            )
        }));
        steps.sort_by_key(|s| s.priority);
        steps
    }

    fn root_cause(category: ErrorCategory, primary: &RuntimeError) -> String {
        let class = primary.class_name().unwrap_or("unknown class");
        match category {
            ErrorCategory::NamespaceMigration => format!(
                "Legacy class '{class}' is still referenced but no javax artifact provides it at runtime"
            ),
            ErrorCategory::ClasspathIssue => {
                format!("Jakarta class '{class}' is referenced but missing from the runtime classpath")
            }
            ErrorCategory::BinaryIncompatibility => {
                "javax and jakarta APIs are both on the classpath and their classes do not link".to_string()
            }
            ErrorCategory::ConfigurationError => {
                "A configuration file still refers to the javax namespace or an old schema".to_string()
            }
            ErrorCategory::Unknown => format!("Unclassified failure: {}", primary.message()),
        }
    }

    fn contributing_factors(
        errors: &[RuntimeError],
        categories: &[ErrorCategory],
        dominant: ErrorCategory,
    ) -> Vec<String> {
        let mut factors = Vec::new();
        if errors.len() > 1 {
            factors.push(format!("Multiple errors detected ({} total)", errors.len()));
        }
        let has = |prefix: &str| errors.iter().any(|e| e.class_name().is_some_and(|c| c.starts_with(prefix)));
        if has("javax.") && has("jakarta.") {
            factors.push("Failing classes span both javax and jakarta namespaces".to_string());
        }
        for other in ErrorCategory::ALL {
            if other != dominant && categories.contains(&other) {
                factors.push(format!("Also observed: {other}"));
            }
        }
        factors
    }

    fn similar_failures(&self, errors: &[RuntimeError]) -> Vec<SimilarFailure> {
        self.known_failures
            .iter()
            .filter_map(|(pattern, resolution)| {
                let hits = errors
                    .iter()
                    .filter(|e| e.message().to_lowercase().contains(pattern.as_str()))
                    .count();
                #[allow(clippy::cast_precision_loss)]
                let similarity = hits as f64 / errors.len() as f64;
                (hits > 0).then(|| SimilarFailure {
                    error_pattern: pattern.clone(),
                    resolution: resolution.clone(),
                    similarity,
                })
            })
            .collect()
    }

    fn fixes_for(category: ErrorCategory, primary: &RuntimeError) -> Vec<RemediationStep> {
        let class = primary.class_name().unwrap_or("the failing class").to_string();
        match category {
            ErrorCategory::NamespaceMigration => vec![
                step(
                    "Update import statements",
                    "Replace javax imports with their jakarta equivalents",
                    vec![
                        format!("Find all references to {class}"),
                        "Rewrite them to the jakarta namespace".to_string(),
                        "Rebuild and rerun verification".to_string(),
                    ],
                    1,
                ),
                step(
                    "Add Jakarta dependency",
                    "Put the Jakarta artifact for this API on the classpath",
                    vec![
                        "Check pom.xml or build.gradle".to_string(),
                        "Add the jakarta artifact and remove the javax one".to_string(),
                    ],
                    2,
                ),
            ],
            ErrorCategory::ClasspathIssue => vec![step(
                "Add missing Jakarta dependency",
                "Declare the artifact that provides the class",
                vec![
                    format!("Identify the artifact providing {class}"),
                    "Add it to pom.xml or build.gradle".to_string(),
                    "Rebuild the project".to_string(),
                ],
                1,
            )],
            ErrorCategory::BinaryIncompatibility => vec![
                step(
                    "Remove javax dependencies",
                    "Exclude javax API artifacts that still arrive transitively",
                    vec![
                        "Inspect the dependency tree".to_string(),
                        "Exclude or upgrade the libraries that pull in javax APIs".to_string(),
                    ],
                    1,
                ),
                step(
                    "Upgrade to Jakarta-compatible libraries",
                    "Move each third-party library to its jakarta release",
                    vec!["Check each library's release notes for a jakarta build".to_string()],
                    2,
                ),
            ],
            ErrorCategory::ConfigurationError => vec![step(
                "Update configuration files",
                "Rewrite javax references and schema URIs in descriptors",
                vec![
                    "Check persistence.xml, web.xml and beans.xml".to_string(),
                    "Replace javax property names with jakarta ones".to_string(),
                ],
                1,
            )],
            ErrorCategory::Unknown => vec![step(
                "Investigate manually",
                "Review the full output and stack trace",
                vec![primary.message().to_string()],
                3,
            )],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ErrorType;
    use pretty_assertions::assert_eq;

    const TRACE: &str = r#"Exception in thread "main" java.lang.NoClassDefFoundError: javax/servlet/http/HttpServlet
	at java.base/java.lang.ClassLoader.defineClass1(Native Method)
	at com.example.Main.start(Main.java:42)
	at com.example.Main.main(Main.java:10)
Caused by: java.lang.ClassNotFoundException: javax.servlet.http.HttpServlet
	at java.base/jdk.internal.loader.BuiltinClassLoader.loadClass(BuiltinClassLoader.java:641)
"#;

    #[test]
    fn parses_chained_trace() {
        let errors = ErrorAnalyzer::new().parse_output("", TRACE);
        assert_eq!(errors.len(), 2);

        let first = &errors[0];
        assert_eq!(first.error_type(), ErrorType::NoClassDefFound);
        assert_eq!(first.class_name(), Some("javax.servlet.http.HttpServlet"));
        assert_eq!(first.stack_trace().exception_class, "java.lang.NoClassDefFoundError");
        assert_eq!(first.stack_trace().frames.len(), 2);
        assert_eq!(first.stack_trace().frames[0].line, 42);
        assert_eq!(first.method_name(), Some("start"));
        assert!((first.confidence() - 0.9).abs() < f64::EPSILON);

        assert_eq!(errors[1].error_type(), ErrorType::ClassNotFound);
        assert_eq!(errors[1].category(), ErrorCategory::NamespaceMigration);
    }

    #[test]
    fn unrelated_errors_get_low_confidence() {
        let errors = ErrorAnalyzer::new().parse_output("java.lang.IllegalStateException: boom", "");
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].class_name(), None);
        assert!((errors[0].confidence() - 0.5).abs() < f64::EPSILON);
    }

    #[test]
    fn warnings() {
        let stderr = "WARNING: An illegal reflective access\nok line\nNote: Foo.java uses a deprecated API\n";
        let warnings = ErrorAnalyzer::new().parse_warnings(stderr);
        assert_eq!(warnings.len(), 2);
        assert_eq!(warnings[0].category(), "WARNING");
        assert_eq!(warnings[1].category(), "DEPRECATION");
    }

    #[test]
    fn empty_analysis() {
        let analysis = ErrorAnalyzer::new().analyze(&[]);
        assert_eq!(analysis.category, ErrorCategory::Unknown);
        assert_eq!(analysis.confidence, 0.0);
    }

    #[test]
    fn dominant_category_with_tie_break() {
        let analyzer = ErrorAnalyzer::new();
        let errors = analyzer.parse_output(
            "",
            "java.lang.ClassNotFoundException: jakarta.inject.Inject\njava.lang.ClassNotFoundException: javax.jms.Queue\n",
        );
        let analysis = analyzer.analyze(&errors);
        assert_eq!(analysis.category, ErrorCategory::NamespaceMigration);
        assert!(analysis.root_cause.contains("javax.jms.Queue"));
        assert!(analysis
            .contributing_factors
            .contains(&"Also observed: CLASSPATH_ISSUE".to_string()));
    }

    #[test]
    fn known_failures_become_first_steps() {
        let analyzer = ErrorAnalyzer::new().with_known_failure("javax/servlet", "Add jakarta.servlet-api 6.0");
        let errors = analyzer.parse_output("", TRACE);
        let analysis = analyzer.analyze(&errors);
        assert_eq!(analysis.similar_failures.len(), 1);
        assert!((analysis.similar_failures[0].similarity - 0.5).abs() < f64::EPSILON);

        let steps = analyzer.remediation_steps(&analysis);
        assert_eq!(steps[0].action, "Add jakarta.servlet-api 6.0");
        assert!(steps.windows(2).all(|w| w[0].priority <= w[1].priority));
    }
}

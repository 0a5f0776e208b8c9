//! Gradle build-script parser (Groovy and Kotlin DSL)
//!
//! Recognises string notation (`implementation 'g:a:v'`,
//! `implementation("g:a:v")`) and map notation
//! (`implementation group: 'g', name: 'a', version: 'v'`).

use super::{directory_name, DeclaredDependency, DescriptorParser, ParsedDescriptor};
use jmig_graph::{Artifact, DependencyGraphError, Scope, UNKNOWN_VERSION};
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

const FORMAT: &str = "gradle";

const CONFIGURATIONS: &str = "implementation|api|compile|runtime|testImplementation|testRuntime|testCompile|testRuntimeOnly|testCompileOnly|compileOnly|runtimeOnly";

static BLOCK_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*.*?\*/").expect("valid regex literal"));

static LINE_COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?m)^\s*//.*$").expect("valid regex literal"));

static STRING_NOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"\b({CONFIGURATIONS})\s*\(?\s*['"]([^:'"\s]+):([^:'"\s]+)(?::([^:'"@\s]+))?[^'"]*['"]"#
    ))
    .expect("valid regex literal")
});

static MAP_NOTATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(
        r#"\b({CONFIGURATIONS})\s*\(?\s*group\s*[:=]\s*['"]([^'"]+)['"]\s*,\s*name\s*[:=]\s*['"]([^'"]+)['"](?:\s*,\s*version\s*[:=]\s*['"]([^'"]+)['"])?"#
    ))
    .expect("valid regex literal")
});

static PROJECT_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"(?:rootProject\.name|archivesBaseName|baseName)\s*=\s*['"]([^'"]+)['"]"#)
        .expect("valid regex literal")
});

static PROJECT_GROUP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*group\s*=\s*['"]([^'"]+)['"]"#).expect("valid regex literal"));

static PROJECT_VERSION: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"(?m)^\s*version\s*=\s*['"]([^'"]+)['"]"#).expect("valid regex literal"));

/// Parser for `build.gradle` and `build.gradle.kts`
#[derive(Debug, Clone, Copy, Default)]
pub struct GradleParser;

/// Scope implied by a dependency configuration name
#[must_use]
pub fn configuration_scope(configuration: &str) -> Scope {
    if configuration.starts_with("test") {
        Scope::Test
    } else if configuration == "runtime" || configuration == "runtimeOnly" {
        Scope::Runtime
    } else if configuration == "compileOnly" {
        Scope::Provided
    } else {
        Scope::Compile
    }
}

fn normalise_version(version: Option<&str>) -> String {
    match version {
        Some(v) if !v.contains('$') && !v.trim().is_empty() => v.trim().to_string(),
        _ => UNKNOWN_VERSION.to_string(),
    }
}

fn capture<'a>(re: &Regex, text: &'a str) -> Option<&'a str> {
    re.captures(text).and_then(|c| c.get(1)).map(|m| m.as_str())
}

impl GradleParser {
    fn parse_inner(path: &Path, content: &str) -> Result<ParsedDescriptor, DependencyGraphError> {
        let without_blocks = BLOCK_COMMENT.replace_all(content, "");
        let script = LINE_COMMENT.replace_all(&without_blocks, "");

        let opens = script.matches('{').count();
        let closes = script.matches('}').count();
        if opens != closes {
            return Err(DependencyGraphError::malformed(
                FORMAT,
                path,
                format!("unbalanced braces ({opens} opening, {closes} closing)"),
            ));
        }

        let name = capture(&PROJECT_NAME, &script)
            .map_or_else(|| directory_name(path), ToString::to_string);
        let group = capture(&PROJECT_GROUP, &script).unwrap_or(UNKNOWN_VERSION);
        let version = normalise_version(capture(&PROJECT_VERSION, &script));
        let project = Artifact::compile(group, name, version)
            .map_err(|source| DependencyGraphError::InvalidCoordinate { format: FORMAT, source })?;

        let mut found: Vec<(usize, DeclaredDependency)> = Vec::new();
        for re in [&*STRING_NOTATION, &*MAP_NOTATION] {
            for caps in re.captures_iter(&script) {
                let Some(whole) = caps.get(0) else { continue };
                let scope = configuration_scope(&caps[1]);
                let version = normalise_version(caps.get(4).map(|m| m.as_str()));
                let artifact = Artifact::new(&caps[2], &caps[3], version, scope, true)
                    .map_err(|source| DependencyGraphError::InvalidCoordinate { format: FORMAT, source })?;
                found.push((
                    whole.start(),
                    DeclaredDependency {
                        artifact,
                        scope,
                        optional: false,
                    },
                ));
            }
        }
        found.sort_by_key(|(offset, _)| *offset);

        Ok(ParsedDescriptor {
            format: FORMAT,
            path: path.to_path_buf(),
            project,
            dependencies: found.into_iter().map(|(_, d)| d).collect(),
        })
    }
}

impl DescriptorParser for GradleParser {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn descriptor_names(&self) -> &'static [&'static str] {
        &["build.gradle", "build.gradle.kts"]
    }

    fn parse(&self, path: &Path, content: &str) -> Result<ParsedDescriptor, DependencyGraphError> {
        Self::parse_inner(path, content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const GROOVY: &str = r#"
plugins { id 'war' }

group = 'org.acme'
version = '1.2.0'

dependencies {
    implementation 'javax.servlet:javax.servlet-api:4.0.1'
    compileOnly "org.projectlombok:lombok:1.18.30"
    runtimeOnly 'com.h2database:h2:2.2.224'
    testImplementation 'junit:junit:4.13.2'
    // implementation 'commented:out:1.0'
    implementation group: 'javax.persistence', name: 'javax.persistence-api', version: '2.2'
    implementation "org.springframework:spring-core:$springVersion"
}
"#;

    #[test]
    fn parses_groovy_script() {
        let parsed = GradleParser
            .parse(Path::new("/work/shop/build.gradle"), GROOVY)
            .unwrap();
        assert_eq!(parsed.project.coordinate(), "org.acme:shop:1.2.0");

        let got: Vec<(String, Scope)> = parsed
            .dependencies
            .iter()
            .map(|d| (d.artifact.coordinate(), d.scope))
            .collect();
        assert_eq!(
            got,
            vec![
                ("javax.servlet:javax.servlet-api:4.0.1".to_string(), Scope::Compile),
                ("org.projectlombok:lombok:1.18.30".to_string(), Scope::Provided),
                ("com.h2database:h2:2.2.224".to_string(), Scope::Runtime),
                ("junit:junit:4.13.2".to_string(), Scope::Test),
                ("javax.persistence:javax.persistence-api:2.2".to_string(), Scope::Compile),
                ("org.springframework:spring-core:unknown".to_string(), Scope::Compile),
            ]
        );
    }

    #[test]
    fn parses_kotlin_dsl_and_project_name() {
        let script = r#"
rootProject.name = "inventory"
dependencies {
    implementation("jakarta.servlet:jakarta.servlet-api:6.0.0")
    testRuntimeOnly("org.junit.platform:junit-platform-launcher:1.10.0")
}
"#;
        let parsed = GradleParser
            .parse(Path::new("/work/x/build.gradle.kts"), script)
            .unwrap();
        assert_eq!(parsed.project.artifact_id(), "inventory");
        assert_eq!(parsed.dependencies.len(), 2);
        assert_eq!(parsed.dependencies[1].scope, Scope::Test);
    }

    #[test]
    fn unbalanced_script_is_malformed() {
        let err = GradleParser
            .parse(Path::new("/work/x/build.gradle"), "dependencies {\n implementation 'a:b:1'\n")
            .unwrap_err();
        assert!(matches!(err, DependencyGraphError::Malformed { format: "gradle", .. }));
    }

    #[test]
    fn scope_mapping() {
        assert_eq!(configuration_scope("testImplementation"), Scope::Test);
        assert_eq!(configuration_scope("runtime"), Scope::Runtime);
        assert_eq!(configuration_scope("compileOnly"), Scope::Provided);
        assert_eq!(configuration_scope("api"), Scope::Compile);
    }
}

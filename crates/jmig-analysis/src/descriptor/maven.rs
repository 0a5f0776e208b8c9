//! Maven `pom.xml` parser
//!
//! Element-level scanning, not a general XML parser. It understands what the
//! graph needs:
//! - project coordinates with `<parent>` fallback
//! - `<properties>` substitution, including `project.*` keys
//! - `<dependencyManagement>` versions
//! - direct `<dependencies>` with scope and optional flag
//!
//! Plugin dependencies and profiles are ignored.

use super::{directory_name, DeclaredDependency, DescriptorParser, ParsedDescriptor};
use jmig_graph::{Artifact, DependencyGraphError, Scope, UNKNOWN_VERSION};
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;
use std::path::Path;

const FORMAT: &str = "maven";

static COMMENT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)<!--.*?-->").expect("valid regex literal"));

static PROPERTY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<([A-Za-z0-9_.\-]+)>\s*([^<]*?)\s*</([A-Za-z0-9_.\-]+)>").expect("valid regex literal")
});

static PLACEHOLDER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$\{([^}]+)\}").expect("valid regex literal"));

/// Sections whose nested coordinates are not the project's own
const NESTED_SECTIONS: &[&str] = &[
    "parent",
    "dependencyManagement",
    "dependencies",
    "build",
    "profiles",
    "reporting",
];

/// Parser for `pom.xml`
#[derive(Debug, Clone, Copy, Default)]
pub struct MavenPomParser;

/// Byte span of one element: whole element and its body
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    body_start: usize,
    body_end: usize,
    end: usize,
}

/// Locate every `<tag>` element, non-nested, in document order
fn spans(xml: &str, tag: &str) -> Result<Vec<Span>, String> {
    let open = format!("<{tag}");
    let close = format!("</{tag}>");
    let mut out = Vec::new();
    let mut pos = 0;

    while let Some(found) = xml[pos..].find(&open) {
        let start = pos + found;
        let after = start + open.len();
        let Some(gt) = xml[after..].find('>') else {
            return Err(format!("unterminated <{tag}> tag"));
        };
        let head = &xml[after..after + gt];
        // `<dependency` also prefixes `<dependencyManagement`
        if !(head.is_empty() || head.starts_with(char::is_whitespace) || head == "/") {
            pos = after;
            continue;
        }
        let body_start = after + gt + 1;
        if head.ends_with('/') {
            out.push(Span {
                start,
                body_start,
                body_end: body_start,
                end: body_start,
            });
            pos = body_start;
            continue;
        }
        let Some(close_at) = xml[body_start..].find(&close) else {
            return Err(format!("missing </{tag}>"));
        };
        let body_end = body_start + close_at;
        let end = body_end + close.len();
        out.push(Span {
            start,
            body_start,
            body_end,
            end,
        });
        pos = end;
    }
    Ok(out)
}

fn bodies<'a>(xml: &'a str, tag: &str) -> Result<Vec<&'a str>, String> {
    Ok(spans(xml, tag)?
        .into_iter()
        .map(|s| &xml[s.body_start..s.body_end])
        .collect())
}

fn first_body<'a>(xml: &'a str, tag: &str) -> Result<Option<&'a str>, String> {
    Ok(bodies(xml, tag)?.into_iter().next())
}

fn text(xml: &str, tag: &str) -> Result<Option<String>, String> {
    Ok(first_body(xml, tag)?
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(ToString::to_string))
}

/// Remove every element of the given tags
fn without(xml: &str, tags: &[&str]) -> Result<String, String> {
    let mut removed: Vec<Span> = Vec::new();
    for tag in tags {
        removed.extend(spans(xml, tag)?);
    }
    removed.sort_by_key(|s| s.start);

    let mut out = String::with_capacity(xml.len());
    let mut pos = 0;
    for span in removed {
        if span.start < pos {
            continue;
        }
        out.push_str(&xml[pos..span.start]);
        pos = span.end;
    }
    out.push_str(&xml[pos..]);
    Ok(out)
}

/// Property table with placeholder resolution
struct Properties(HashMap<String, String>);

impl Properties {
    fn resolve(&self, value: &str) -> Option<String> {
        let mut current = value.to_string();
        for _ in 0..8 {
            if !current.contains("${") {
                return Some(current);
            }
            current = PLACEHOLDER
                .replace_all(&current, |caps: &regex::Captures<'_>| {
                    self.0
                        .get(&caps[1])
                        .cloned()
                        .unwrap_or_else(|| caps[0].to_string())
                })
                .into_owned();
        }
        (!current.contains("${")).then_some(current)
    }
}

impl MavenPomParser {
    fn parse_inner(path: &Path, content: &str) -> Result<ParsedDescriptor, String> {
        let xml = COMMENT.replace_all(content, "");
        let project = first_body(&xml, "project")?.ok_or("no <project> root element")?;

        let parent = first_body(project, "parent")?.unwrap_or_default();
        let own = without(project, NESTED_SECTIONS)?;

        let group = text(&own, "groupId")?
            .or(text(parent, "groupId")?)
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        let artifact_id = text(&own, "artifactId")?.unwrap_or_else(|| directory_name(path));
        let version = text(&own, "version")?
            .or(text(parent, "version")?)
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());

        let mut props = HashMap::new();
        if let Some(block) = first_body(&own, "properties")? {
            for caps in PROPERTY.captures_iter(block) {
                if caps[1] == caps[3] {
                    props.insert(caps[1].to_string(), caps[2].to_string());
                }
            }
        }
        for key in ["project.version", "pom.version", "version"] {
            props.entry(key.to_string()).or_insert_with(|| version.clone());
        }
        for key in ["project.groupId", "pom.groupId", "groupId"] {
            props.entry(key.to_string()).or_insert_with(|| group.clone());
        }
        if let Some(parent_version) = text(parent, "version")? {
            props.insert("project.parent.version".to_string(), parent_version);
        }
        let props = Properties(props);

        let mut managed: HashMap<String, String> = HashMap::new();
        if let Some(dm) = first_body(project, "dependencyManagement")? {
            for dep in bodies(dm, "dependency")? {
                if let (Some(g), Some(a), Some(v)) =
                    (text(dep, "groupId")?, text(dep, "artifactId")?, text(dep, "version")?)
                {
                    managed.insert(format!("{g}:{a}"), v);
                }
            }
        }

        let project_artifact = Artifact::compile(
            props.resolve(&group).unwrap_or(group),
            artifact_id,
            props.resolve(&version).unwrap_or_else(|| UNKNOWN_VERSION.to_string()),
        )
        .map_err(|e| e.to_string())?;

        let direct = without(project, &["dependencyManagement", "build", "profiles", "reporting", "parent"])?;
        let mut dependencies = Vec::new();
        for block in bodies(&direct, "dependencies")? {
            for dep in bodies(block, "dependency")? {
                dependencies.push(Self::declared(dep, &props, &managed)?);
            }
        }

        Ok(ParsedDescriptor {
            format: FORMAT,
            path: path.to_path_buf(),
            project: project_artifact,
            dependencies,
        })
    }

    fn declared(
        dep: &str,
        props: &Properties,
        managed: &HashMap<String, String>,
    ) -> Result<DeclaredDependency, String> {
        let group = text(dep, "groupId")?
            .and_then(|g| props.resolve(&g))
            .ok_or("dependency without groupId")?;
        let artifact_id = text(dep, "artifactId")?
            .and_then(|a| props.resolve(&a))
            .ok_or("dependency without artifactId")?;
        let declared_version = text(dep, "version")?
            .or_else(|| managed.get(&format!("{group}:{artifact_id}")).cloned());
        let version = declared_version
            .and_then(|v| props.resolve(&v))
            .unwrap_or_else(|| UNKNOWN_VERSION.to_string());
        let scope = text(dep, "scope")?.map_or(Scope::Compile, |s| Scope::parse(&s));
        let optional = text(dep, "optional")?.is_some_and(|o| o.eq_ignore_ascii_case("true"));

        let artifact = Artifact::new(group, artifact_id, version, scope, true).map_err(|e| e.to_string())?;
        Ok(DeclaredDependency {
            artifact,
            scope,
            optional,
        })
    }
}

impl DescriptorParser for MavenPomParser {
    fn format(&self) -> &'static str {
        FORMAT
    }

    fn descriptor_names(&self) -> &'static [&'static str] {
        &["pom.xml"]
    }

    fn parse(&self, path: &Path, content: &str) -> Result<ParsedDescriptor, DependencyGraphError> {
        Self::parse_inner(path, content).map_err(|cause| DependencyGraphError::malformed(FORMAT, path, cause))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const POM: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<project xmlns="http://maven.apache.org/POM/4.0.0">
  <modelVersion>4.0.0</modelVersion>
  <parent>
    <groupId>org.acme</groupId>
    <artifactId>acme-parent</artifactId>
    <version>2.0.0</version>
  </parent>
  <artifactId>shop</artifactId>
  <properties>
    <servlet.version>4.0.1</servlet.version>
  </properties>
  <dependencyManagement>
    <dependencies>
      <dependency>
        <groupId>javax.persistence</groupId>
        <artifactId>javax.persistence-api</artifactId>
        <version>2.2</version>
      </dependency>
    </dependencies>
  </dependencyManagement>
  <dependencies>
    <!-- <dependency><groupId>commented</groupId><artifactId>out</artifactId></dependency> -->
    <dependency>
      <groupId>javax.servlet</groupId>
      <artifactId>javax.servlet-api</artifactId>
      <version>${servlet.version}</version>
      <scope>provided</scope>
    </dependency>
    <dependency>
      <groupId>javax.persistence</groupId>
      <artifactId>javax.persistence-api</artifactId>
    </dependency>
    <dependency>
      <groupId>org.acme</groupId>
      <artifactId>shop-common</artifactId>
      <version>${project.version}</version>
      <optional>true</optional>
    </dependency>
    <dependency>
      <groupId>com.example</groupId>
      <artifactId>floating</artifactId>
    </dependency>
  </dependencies>
  <build>
    <plugins>
      <plugin>
        <artifactId>maven-war-plugin</artifactId>
        <dependencies>
          <dependency><groupId>plugin</groupId><artifactId>only</artifactId></dependency>
        </dependencies>
      </plugin>
    </plugins>
  </build>
</project>"#;

    fn parse(content: &str) -> Result<ParsedDescriptor, DependencyGraphError> {
        MavenPomParser.parse(Path::new("/work/shop/pom.xml"), content)
    }

    #[test]
    fn parses_project_and_dependencies() {
        let parsed = parse(POM).unwrap();
        assert_eq!(parsed.project.coordinate(), "org.acme:shop:2.0.0");

        let coords: Vec<String> = parsed.dependencies.iter().map(|d| d.artifact.coordinate()).collect();
        assert_eq!(
            coords,
            vec![
                "javax.servlet:javax.servlet-api:4.0.1",
                "javax.persistence:javax.persistence-api:2.2",
                "org.acme:shop-common:2.0.0",
                "com.example:floating:unknown",
            ]
        );
        assert_eq!(parsed.dependencies[0].scope, Scope::Provided);
        assert_eq!(parsed.dependencies[1].scope, Scope::Compile);
        assert!(parsed.dependencies[2].optional);
        assert!(parsed.dependencies.iter().all(|d| d.artifact.is_transitive()));
    }

    #[test]
    fn missing_project_root_is_malformed() {
        let err = parse("<settings></settings>").unwrap_err();
        assert!(matches!(err, DependencyGraphError::Malformed { format: "maven", .. }));
    }

    #[test]
    fn unterminated_project_is_malformed() {
        assert!(parse("<project><artifactId>x</artifactId>").is_err());
    }

    #[test]
    fn dependency_without_group_is_malformed() {
        let pom = "<project><artifactId>x</artifactId><dependencies><dependency><artifactId>y</artifactId></dependency></dependencies></project>";
        let err = parse(pom).unwrap_err();
        assert!(err.to_string().contains("groupId"));
    }

    #[test]
    fn unresolvable_property_becomes_unknown() {
        let pom = "<project><groupId>g</groupId><artifactId>x</artifactId><version>1</version>\
            <dependencies><dependency><groupId>a</groupId><artifactId>b</artifactId>\
            <version>${missing}</version></dependency></dependencies></project>";
        let parsed = parse(pom).unwrap();
        assert_eq!(parsed.dependencies[0].artifact.version(), UNKNOWN_VERSION);
    }

    #[test]
    fn self_closing_dependencies() {
        let parsed = parse("<project><groupId>g</groupId><artifactId>x</artifactId><dependencies/></project>").unwrap();
        assert!(parsed.dependencies.is_empty());
    }
}

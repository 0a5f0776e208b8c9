//! Dependency Graph Builder
//!
//! Detection order: `pom.xml`, `build.gradle`, `build.gradle.kts` at the
//! project root, then the first descriptor found walking subdirectories in
//! sorted order. A graph is returned only when the whole descriptor parsed.

use super::{DescriptorParser, GradleParser, MavenPomParser, ParsedDescriptor};
use ignore::WalkBuilder;
use jmig_graph::{Dependency, DependencyGraph, DependencyGraphError};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Builds a dependency graph from a project directory
#[derive(Debug)]
pub struct DependencyGraphBuilder {
    parsers: Vec<Box<dyn DescriptorParser>>,
}

impl DependencyGraphBuilder {
    /// Builder with Maven and Gradle parsers
    #[must_use]
    pub fn new() -> Self {
        Self {
            parsers: vec![Box::new(MavenPomParser), Box::new(GradleParser)],
        }
    }

    /// Builder with no parsers
    #[must_use]
    pub fn empty() -> Self {
        Self { parsers: Vec::new() }
    }

    /// Append a parser; earlier parsers win detection ties
    #[must_use]
    pub fn with_parser(mut self, parser: Box<dyn DescriptorParser>) -> Self {
        self.parsers.push(parser);
        self
    }

    /// Auto-detect the descriptor under `root` and build its graph
    ///
    /// # Errors
    /// - `DependencyGraphError::NoDescriptor` if nothing recognisable exists
    /// - `Io`/`Malformed`/`InvalidCoordinate` if the descriptor cannot be parsed
    pub fn build_from_project(&self, root: impl AsRef<Path>) -> Result<DependencyGraph, DependencyGraphError> {
        let root = root.as_ref();
        let (parser, path) = self
            .locate(root)
            .ok_or_else(|| DependencyGraphError::NoDescriptor {
                root: root.to_path_buf(),
            })?;
        info!("Building dependency graph from {} ({})", path.display(), parser.format());
        let parsed = Self::read_and_parse(parser, &path)?;
        Ok(Self::assemble(&parsed))
    }

    /// Build a graph from one explicit descriptor file
    ///
    /// # Errors
    /// Same as [`DependencyGraphBuilder::build_from_project`].
    pub fn build_from_descriptor(&self, path: impl AsRef<Path>) -> Result<DependencyGraph, DependencyGraphError> {
        let path = path.as_ref();
        let parser = path
            .file_name()
            .and_then(|n| n.to_str())
            .and_then(|name| self.parser_for(name))
            .ok_or_else(|| DependencyGraphError::NoDescriptor {
                root: path.to_path_buf(),
            })?;
        let parsed = Self::read_and_parse(parser, path)?;
        Ok(Self::assemble(&parsed))
    }

    /// Descriptor that `build_from_project` would use
    #[must_use]
    pub fn locate_descriptor(&self, root: impl AsRef<Path>) -> Option<PathBuf> {
        self.locate(root.as_ref()).map(|(_, path)| path)
    }

    fn parser_for(&self, file_name: &str) -> Option<&dyn DescriptorParser> {
        self.parsers
            .iter()
            .find(|p| p.descriptor_names().contains(&file_name))
            .map(|p| &**p)
    }

    fn locate(&self, root: &Path) -> Option<(&dyn DescriptorParser, PathBuf)> {
        if !root.is_dir() {
            return None;
        }
        for parser in &self.parsers {
            for name in parser.descriptor_names() {
                let candidate = root.join(name);
                if candidate.is_file() {
                    return Some((&**parser, candidate));
                }
            }
        }

        let mut walker = WalkBuilder::new(root);
        walker.follow_links(false);
        walker.sort_by_file_name(|a, b| a.cmp(b));
        for entry in walker.build().flatten() {
            if !entry.file_type().is_some_and(|t| t.is_file()) {
                continue;
            }
            let Some(name) = entry.file_name().to_str() else {
                continue;
            };
            if let Some(parser) = self.parser_for(name) {
                debug!("Found nested descriptor {}", entry.path().display());
                return Some((parser, entry.into_path()));
            }
        }
        None
    }

    fn read_and_parse(parser: &dyn DescriptorParser, path: &Path) -> Result<ParsedDescriptor, DependencyGraphError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                DependencyGraphError::malformed(parser.format(), path, "descriptor is not valid UTF-8")
            } else {
                DependencyGraphError::io_error(parser.format(), path, e)
            }
        })?;
        parser.parse(path, &content)
    }

    fn assemble(parsed: &ParsedDescriptor) -> DependencyGraph {
        let mut graph = DependencyGraph::new();
        graph.add_node(parsed.project.clone());
        for declared in &parsed.dependencies {
            graph.add_edge(Dependency::new(
                parsed.project.clone(),
                declared.artifact.clone(),
                declared.scope,
                declared.optional,
            ));
        }
        info!(
            "Dependency graph built: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        graph
    }
}

impl Default for DependencyGraphBuilder {
    fn default() -> Self {
        Self::new()
    }
}

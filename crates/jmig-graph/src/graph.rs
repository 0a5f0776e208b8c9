//! Value-typed dependency graph
//!
//! Nodes and edges are insertion-ordered sets keyed by structural equality.
//! Adding an edge adds both endpoints, and readers always receive copies, so
//! every edge endpoint is a node at all times.

use crate::artifact::{Artifact, Dependency};
use indexmap::IndexSet;
use petgraph::graphmap::DiGraphMap;
use petgraph::visit::{Bfs, Reversed};
use serde::{Deserialize, Serialize};

/// Dependency graph of artifacts
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "GraphParts", into = "GraphParts")]
pub struct DependencyGraph {
    nodes: IndexSet<Artifact>,
    edges: IndexSet<Dependency>,
}

/// Serialized form; deserialization re-runs `add_edge` so the endpoint
/// invariant holds for any input document.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GraphParts {
    nodes: Vec<Artifact>,
    edges: Vec<Dependency>,
}

impl From<GraphParts> for DependencyGraph {
    fn from(parts: GraphParts) -> Self {
        let mut graph = Self::new();
        for node in parts.nodes {
            graph.add_node(node);
        }
        for edge in parts.edges {
            graph.add_edge(edge);
        }
        graph
    }
}

impl From<DependencyGraph> for GraphParts {
    fn from(graph: DependencyGraph) -> Self {
        Self {
            nodes: graph.nodes.into_iter().collect(),
            edges: graph.edges.into_iter().collect(),
        }
    }
}

impl DependencyGraph {
    /// Create empty graph
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add node; no-op if already present. Returns whether it was new.
    pub fn add_node(&mut self, artifact: Artifact) -> bool {
        self.nodes.insert(artifact)
    }

    /// Add edge and both endpoints; no-op if already present.
    /// Returns whether the edge was new.
    pub fn add_edge(&mut self, dependency: Dependency) -> bool {
        if self.edges.contains(&dependency) {
            return false;
        }
        self.nodes.insert(dependency.from.clone());
        self.nodes.insert(dependency.to.clone());
        self.edges.insert(dependency)
    }

    /// Membership by structural equality
    #[inline]
    #[must_use]
    pub fn contains_node(&self, artifact: &Artifact) -> bool {
        self.nodes.contains(artifact)
    }

    /// Membership by structural equality
    #[inline]
    #[must_use]
    pub fn contains_edge(&self, dependency: &Dependency) -> bool {
        self.edges.contains(dependency)
    }

    /// Copy of the node set
    #[must_use]
    pub fn nodes(&self) -> IndexSet<Artifact> {
        self.nodes.clone()
    }

    /// Copy of the edge set
    #[must_use]
    pub fn edges(&self) -> IndexSet<Dependency> {
        self.edges.clone()
    }

    /// Borrowing iterator over nodes in insertion order
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Artifact> {
        self.nodes.iter()
    }

    /// Borrowing iterator over edges in insertion order
    pub fn iter_edges(&self) -> impl Iterator<Item = &Dependency> {
        self.edges.iter()
    }

    /// Number of nodes
    #[inline]
    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Number of edges
    #[inline]
    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Whether the graph has no nodes
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Nodes with no incoming edge
    #[must_use]
    pub fn roots(&self) -> Vec<Artifact> {
        let targets: IndexSet<&Artifact> = self.edges.iter().map(|e| &e.to).collect();
        self.nodes
            .iter()
            .filter(|n| !targets.contains(n))
            .cloned()
            .collect()
    }

    /// Direct dependencies of `artifact`
    #[must_use]
    pub fn successors(&self, artifact: &Artifact) -> Vec<Artifact> {
        self.edges
            .iter()
            .filter(|e| &e.from == artifact)
            .map(|e| e.to.clone())
            .collect()
    }

    /// Direct dependents of `artifact`
    #[must_use]
    pub fn predecessors(&self, artifact: &Artifact) -> Vec<Artifact> {
        self.edges
            .iter()
            .filter(|e| &e.to == artifact)
            .map(|e| e.from.clone())
            .collect()
    }

    /// Every node reachable from `artifact`, breadth-first, excluding itself
    #[must_use]
    pub fn descendants(&self, artifact: &Artifact) -> Vec<Artifact> {
        let Some(start) = self.nodes.get_index_of(artifact) else {
            return Vec::new();
        };
        let index = self.index_graph();
        let mut bfs = Bfs::new(&index, start);
        let mut out = Vec::new();
        while let Some(ix) = bfs.next(&index) {
            if ix != start {
                out.push(self.nodes[ix].clone());
            }
        }
        out
    }

    /// Every node that can reach `artifact`, breadth-first, excluding itself
    #[must_use]
    pub fn ancestors(&self, artifact: &Artifact) -> Vec<Artifact> {
        let Some(start) = self.nodes.get_index_of(artifact) else {
            return Vec::new();
        };
        let index = self.index_graph();
        let reversed = Reversed(&index);
        let mut bfs = Bfs::new(reversed, start);
        let mut out = Vec::new();
        while let Some(ix) = bfs.next(reversed) {
            if ix != start {
                out.push(self.nodes[ix].clone());
            }
        }
        out
    }

    /// Adjacency over node positions
    fn index_graph(&self) -> DiGraphMap<usize, ()> {
        let mut index = DiGraphMap::with_capacity(self.nodes.len(), self.edges.len());
        for ix in 0..self.nodes.len() {
            index.add_node(ix);
        }
        for edge in &self.edges {
            if let (Some(from), Some(to)) = (
                self.nodes.get_index_of(&edge.from),
                self.nodes.get_index_of(&edge.to),
            ) {
                index.add_edge(from, to, ());
            }
        }
        index
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifact::Scope;

    fn art(id: &str) -> Artifact {
        Artifact::compile("org.acme", id, "1.0").unwrap()
    }

    fn dep(from: &str, to: &str) -> Dependency {
        Dependency::new(art(from), art(to), Scope::Compile, false)
    }

    #[test]
    fn add_edge_adds_endpoints() {
        let mut g = DependencyGraph::new();
        assert!(g.add_edge(dep("app", "lib")));
        assert!(g.contains_node(&art("app")));
        assert!(g.contains_node(&art("lib")));
        assert!(g.contains_edge(&dep("app", "lib")));
        assert_eq!(g.node_count(), 2);
    }

    #[test]
    fn adds_are_idempotent() {
        let mut g = DependencyGraph::new();
        assert!(g.add_node(art("a")));
        assert!(!g.add_node(art("a")));
        assert!(g.add_edge(dep("a", "b")));
        assert!(!g.add_edge(dep("a", "b")));
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn readers_get_copies() {
        let mut g = DependencyGraph::new();
        g.add_edge(dep("a", "b"));
        let mut nodes = g.nodes();
        nodes.clear();
        let mut edges = g.edges();
        edges.clear();
        assert_eq!(g.node_count(), 2);
        assert_eq!(g.edge_count(), 1);
    }

    #[test]
    fn traversal() {
        let mut g = DependencyGraph::new();
        g.add_edge(dep("app", "web"));
        g.add_edge(dep("web", "servlet"));
        g.add_edge(dep("app", "orm"));
        g.add_edge(dep("orm", "servlet"));

        assert_eq!(g.roots(), vec![art("app")]);
        assert_eq!(g.successors(&art("app")), vec![art("web"), art("orm")]);
        assert_eq!(g.predecessors(&art("servlet")).len(), 2);

        let desc = g.descendants(&art("app"));
        assert_eq!(desc.len(), 3);
        assert!(!desc.contains(&art("app")));

        let anc = g.ancestors(&art("servlet"));
        assert_eq!(anc.len(), 3);
        assert!(g.descendants(&art("missing")).is_empty());
    }

    #[test]
    fn cycles_terminate() {
        let mut g = DependencyGraph::new();
        g.add_edge(dep("a", "b"));
        g.add_edge(dep("b", "a"));
        assert_eq!(g.descendants(&art("a")), vec![art("b")]);
        assert!(g.roots().is_empty());
    }

    #[test]
    fn serde_keeps_invariant() {
        let json = serde_json::json!({
            "nodes": [],
            "edges": [serde_json::to_value(dep("x", "y")).unwrap()]
        });
        let g: DependencyGraph = serde_json::from_value(json).unwrap();
        assert!(g.contains_node(&art("x")));
        assert!(g.contains_node(&art("y")));
    }
}

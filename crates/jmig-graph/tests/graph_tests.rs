use jmig_graph::{
    Artifact, Dependency, DependencyGraph, Namespace, NamespaceCompatibilityMap, Scope,
};
use proptest::prelude::*;

fn artifact_strategy() -> impl Strategy<Value = Artifact> {
    (
        prop_oneof![Just("javax.servlet"), Just("jakarta.servlet"), Just("org.acme"), Just("com.example")],
        "[a-z]{1,8}",
        prop_oneof![Just("1.0"), Just("2.3.1"), Just("6.0.0"), Just("unknown")],
        any::<bool>(),
    )
        .prop_map(|(g, a, v, transitive)| {
            Artifact::new(g, a, v, Scope::Compile, transitive).unwrap()
        })
}

fn dependency_strategy() -> impl Strategy<Value = Dependency> {
    (
        artifact_strategy(),
        artifact_strategy(),
        prop_oneof![Just(Scope::Compile), Just(Scope::Test), Just(Scope::Provided)],
        any::<bool>(),
    )
        .prop_map(|(from, to, scope, optional)| Dependency::new(from, to, scope, optional))
}

proptest! {
    #[test]
    fn prop_add_edge_implies_membership(edges in prop::collection::vec(dependency_strategy(), 0..20)) {
        let mut graph = DependencyGraph::new();
        for edge in &edges {
            graph.add_edge(edge.clone());
            prop_assert!(graph.contains_node(&edge.from));
            prop_assert!(graph.contains_node(&edge.to));
            prop_assert!(graph.contains_edge(edge));
        }
        for edge in graph.iter_edges() {
            prop_assert!(graph.contains_node(&edge.from));
            prop_assert!(graph.contains_node(&edge.to));
        }
    }

    #[test]
    fn prop_re_adding_is_a_no_op(edges in prop::collection::vec(dependency_strategy(), 1..15)) {
        let mut graph = DependencyGraph::new();
        for edge in &edges {
            graph.add_edge(edge.clone());
        }
        let before = graph.clone();
        for edge in &edges {
            prop_assert!(!graph.add_edge(edge.clone()));
            prop_assert!(!graph.add_node(edge.from.clone()));
        }
        prop_assert_eq!(before, graph);
    }

    #[test]
    fn prop_unput_artifacts_read_unknown(put in artifact_strategy(), other in artifact_strategy()) {
        let mut map = NamespaceCompatibilityMap::new();
        map.put(put.clone(), Namespace::Legacy);
        if other != put {
            prop_assert_eq!(map.get(&other), Namespace::Unknown);
        }
    }
}

#[test]
fn structurally_equal_artifacts_share_a_node() {
    let mut graph = DependencyGraph::new();
    graph.add_node(Artifact::compile("g", "a", "1").unwrap());
    assert!(graph.contains_node(&Artifact::compile("g", "a", "1").unwrap()));
    assert!(!graph.contains_node(&Artifact::compile("g", "a", "2").unwrap()));
}

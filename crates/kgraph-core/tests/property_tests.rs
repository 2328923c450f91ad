//! # Property-Based Tests
//!
//! Determinism and identity invariants of the assembly pipeline, checked with
//! proptest over generated bindings.

use kgraph_core::{
    ConceptDict, ConceptGraph, ConversionMode, Properties, Role, SolutionFlag, Thing,
    VariableGraph, combine_2_graphs, combine_graphs, concept_dict_to_graph,
    concept_graph_to_indexed_graph,
};
use proptest::collection::btree_set;
use proptest::prelude::*;

/// One relation `r` with a player `p{n}` per id and a name attribute `n{n}`
/// owned by each player.
fn star(ids: &[u32], flag: SolutionFlag) -> (ConceptDict, VariableGraph) {
    let mut dict = ConceptDict::new();
    let mut vg = VariableGraph::new();
    dict.insert("r".to_string(), Thing::relation("R0", "membership"));
    vg.add_var("r", flag.properties());

    for id in ids {
        let player = format!("p{id}");
        let name = format!("n{id}");
        dict.insert(player.clone(), Thing::entity(format!("E{id}"), "person"));
        dict.insert(
            name.clone(),
            Thing::attribute(format!("A{id}"), "name", format!("name-{id}")),
        );
        vg.add_var(player.as_str(), flag.properties());
        vg.add_var(name.as_str(), flag.properties());
        vg.add_role_edge("r", player.as_str(), &Role::new("member"), flag.properties());
        vg.add_has_edge(player.as_str(), name.as_str(), flag.properties());
    }
    (dict, vg)
}

fn build(ids: &[u32], mode: ConversionMode) -> ConceptGraph {
    let (dict, vg) = star(ids, SolutionFlag::Preexists);
    concept_dict_to_graph(&dict, &vg, mode).expect("build")
}

// =============================================================================
// PROPERTY TESTS
// =============================================================================

proptest! {
    /// Math mode: one node per variable plus one per role edge.
    #[test]
    fn math_mode_node_count(ids in btree_set(0u32..500, 0..30)) {
        let ids: Vec<u32> = ids.into_iter().collect();
        let (dict, vg) = star(&ids, SolutionFlag::Preexists);
        let graph = concept_dict_to_graph(&dict, &vg, ConversionMode::Math).expect("build");

        prop_assert_eq!(graph.node_count(), vg.var_count() + ids.len());
        // relates + plays per role edge, one has edge per player
        prop_assert_eq!(graph.edge_count(), 3 * ids.len());
    }

    /// Building the same input twice gives the same indexed graph.
    #[test]
    fn building_is_deterministic(ids in btree_set(0u32..500, 1..30)) {
        let ids: Vec<u32> = ids.into_iter().collect();
        let first = concept_graph_to_indexed_graph(&build(&ids, ConversionMode::Math));
        let second = concept_graph_to_indexed_graph(&build(&ids, ConversionMode::Math));
        prop_assert_eq!(first, second);
    }

    /// Merging a graph with itself changes nothing but the name.
    #[test]
    fn self_merge_is_idempotent(ids in btree_set(0u32..500, 1..30)) {
        let ids: Vec<u32> = ids.into_iter().collect();
        let graph = build(&ids, ConversionMode::Math);
        let merged = combine_2_graphs(&graph, &graph).expect("merge");

        prop_assert_eq!(merged.nodes(), graph.nodes());
        prop_assert_eq!(merged.edges(), graph.edges());
    }

    /// Overlapping graphs merge to the union of their records.
    #[test]
    fn overlapping_merge_is_a_union(
        left in btree_set(0u32..100, 1..20),
        right in btree_set(0u32..100, 1..20),
    ) {
        let left_ids: Vec<u32> = left.iter().copied().collect();
        let right_ids: Vec<u32> = right.iter().copied().collect();
        let merged = combine_graphs([
            build(&left_ids, ConversionMode::Math),
            build(&right_ids, ConversionMode::Math),
        ])
        .expect("merge");

        let union = left.union(&right).count();
        // relation, then player + name + role node per id
        prop_assert_eq!(merged.node_count(), 1 + 3 * union);
        prop_assert_eq!(merged.edge_count(), 3 * union);
    }

    /// The same record flagged differently never merges silently.
    #[test]
    fn differing_flags_always_conflict(ids in btree_set(0u32..500, 1..10)) {
        let ids: Vec<u32> = ids.into_iter().collect();
        let (dict, vg) = star(&ids, SolutionFlag::Preexists);
        let (_, candidate_vg) = star(&ids, SolutionFlag::Candidate);

        let preexisting = concept_dict_to_graph(&dict, &vg, ConversionMode::Math).expect("build");
        let candidate =
            concept_dict_to_graph(&dict, &candidate_vg, ConversionMode::Math).expect("build");

        prop_assert!(combine_2_graphs(&preexisting, &candidate).is_err());
    }

    /// Indices are dense and in node order.
    #[test]
    fn indices_are_dense(ids in btree_set(0u32..500, 0..30)) {
        let ids: Vec<u32> = ids.into_iter().collect();
        let indexed = concept_graph_to_indexed_graph(&build(&ids, ConversionMode::Math));

        for (position, node) in indexed.nodes().iter().enumerate() {
            prop_assert_eq!(node.index, position);
        }
        for edge in indexed.edges() {
            prop_assert!(edge.sender < indexed.node_count());
            prop_assert!(edge.receiver < indexed.node_count());
        }
    }
}

#[test]
fn empty_properties_are_allowed_everywhere() {
    let dict = ConceptDict::from([("x".to_string(), Thing::entity("V1", "person"))]);
    let mut vg = VariableGraph::new();
    vg.add_var("x", Properties::new());
    let graph = concept_dict_to_graph(&dict, &vg, ConversionMode::Direct).expect("build");
    assert_eq!(graph.node_count(), 1);
}

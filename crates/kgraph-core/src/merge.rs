//! # Graph Merger
//!
//! Combines per-query concept graphs into one multigraph.
//!
//! Nodes are unified by identity and edges by `(sender, receiver, key)`.
//! Whenever both graphs describe the same node or edge, their property
//! dictionaries must be equal: a difference means the variable graphs gave
//! the same record inconsistent semantics, and the merge fails.

use crate::graph::{ConceptGraph, Insertion};
use crate::types::{ConflictSubject, KgraphError};
use tracing::{debug, trace};

/// Merge two graphs. The result is named `left+right`.
pub fn combine_2_graphs(
    left: &ConceptGraph,
    right: &ConceptGraph,
) -> Result<ConceptGraph, KgraphError> {
    let mut merged = left.clone();
    merge_into(&mut merged, right)?;
    Ok(merged)
}

/// Merge `right` into `acc` in place, renaming `acc` to `acc+right`.
///
/// On error `acc` may hold part of `right` and must be discarded.
pub fn merge_into(acc: &mut ConceptGraph, right: &ConceptGraph) -> Result<(), KgraphError> {
    let left_name = acc.name().to_string();
    let conflict = |subject, left_properties, right_properties| KgraphError::MergeConflict {
        subject,
        left_source: format!("graph {left_name}"),
        right_source: format!("graph {}", right.name()),
        left: left_properties,
        right: right_properties,
    };

    // Position in `right` -> position in `acc`.
    let mut positions = Vec::with_capacity(right.node_count());
    for node in right.nodes() {
        let insertion = acc.insert_node(node.concept.clone(), node.properties.clone())?;
        if let Insertion::Existing(index) = insertion {
            let existing = acc.node(index).map(|n| &n.properties);
            if existing != Some(&node.properties) {
                return Err(conflict(
                    ConflictSubject::Node(node.concept.to_string()),
                    existing.cloned().unwrap_or_default(),
                    node.properties.clone(),
                ));
            }
        }
        positions.push(insertion.index());
    }

    for edge in right.edges() {
        let (Some(&sender), Some(&receiver)) =
            (positions.get(edge.sender), positions.get(edge.receiver))
        else {
            continue;
        };

        match acc.edge(sender, receiver, edge.key) {
            Some(existing) if existing.properties != edge.properties => {
                return Err(conflict(
                    ConflictSubject::Edge {
                        sender: acc.describe(sender),
                        receiver: acc.describe(receiver),
                        key: edge.key,
                    },
                    existing.properties.clone(),
                    edge.properties.clone(),
                ));
            }
            Some(_) => {}
            None => {
                acc.add_edge(sender, receiver, edge.properties.clone());
            }
        }
    }

    acc.rename(format!("{left_name}+{}", right.name()));
    trace!(
        graph = acc.name(),
        nodes = acc.node_count(),
        edges = acc.edge_count(),
        "Merged graphs"
    );
    Ok(())
}

/// Merge any number of graphs, left to right.
///
/// A single graph is returned as is.
pub fn combine_graphs<I>(graphs: I) -> Result<ConceptGraph, KgraphError>
where
    I: IntoIterator<Item = ConceptGraph>,
{
    let mut graphs = graphs.into_iter();
    let mut merged = graphs.next().ok_or(KgraphError::NothingToMerge)?;

    let mut count = 1usize;
    for next in graphs {
        merge_into(&mut merged, &next)?;
        count += 1;
    }

    debug!(
        graphs = count,
        nodes = merged.node_count(),
        edges = merged.edge_count(),
        "Combined graphs"
    );
    Ok(merged)
}

// =============================================================================
// TESTS
// =============================================================================

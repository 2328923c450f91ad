//! # Indexer
//!
//! Converts an identity-keyed `ConceptGraph` into an `IndexedGraph` keyed by
//! sequential integers, ready for a numeric pipeline.
//!
//! Indices follow the concept graph's node order (first-seen order), so
//! indexing the same graph twice yields identical assignments. Each node keeps
//! its `Concept`, so predictions made against an index can be traced back to
//! the record in the store.

use crate::graph::ConceptGraph;
use crate::types::{Concept, NodeKey, Properties};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A node of an indexed graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedNode {
    pub index: usize,
    pub concept: Concept,
    #[serde(rename = "type")]
    pub type_label: String,
    pub properties: Properties,
}

/// An edge of an indexed graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedEdge {
    pub sender: usize,
    pub receiver: usize,
    pub key: usize,
    #[serde(rename = "type")]
    pub type_label: String,
    pub properties: Properties,
}

/// Integer-keyed graph handed to the numeric pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexedGraph {
    pub name: String,
    nodes: Vec<IndexedNode>,
    edges: Vec<IndexedEdge>,
}

/// Index every node of `graph` in node order and copy every edge.
#[must_use]
pub fn concept_graph_to_indexed_graph(graph: &ConceptGraph) -> IndexedGraph {
    let nodes = graph
        .nodes()
        .iter()
        .enumerate()
        .map(|(index, node)| IndexedNode {
            index,
            concept: node.concept.clone(),
            type_label: node.type_label().to_string(),
            properties: node.properties.clone(),
        })
        .collect();

    let edges = graph
        .edges()
        .iter()
        .map(|edge| IndexedEdge {
            sender: edge.sender,
            receiver: edge.receiver,
            key: edge.key,
            type_label: edge.type_label().unwrap_or_default().to_string(),
            properties: edge.properties.clone(),
        })
        .collect();

    IndexedGraph {
        name: graph.name().to_string(),
        nodes,
        edges,
    }
}

impl IndexedGraph {
    #[must_use]
    pub fn nodes(&self) -> &[IndexedNode] {
        &self.nodes
    }

    #[must_use]
    pub fn edges(&self) -> &[IndexedEdge] {
        &self.edges
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    #[must_use]
    pub fn node(&self, index: usize) -> Option<&IndexedNode> {
        self.nodes.get(index)
    }

    /// The concept behind an index, for writing results back to the store.
    #[must_use]
    pub fn concept(&self, index: usize) -> Option<&Concept> {
        self.node(index).map(|node| &node.concept)
    }

    /// The index assigned to the concept with identity `key`.
    #[must_use]
    pub fn index_of(&self, key: &NodeKey) -> Option<usize> {
        self.nodes
            .iter()
            .find(|node| &node.concept.key() == key)
            .map(|node| node.index)
    }

    /// Node types, by index.
    #[must_use]
    pub fn node_types(&self) -> Vec<&str> {
        self.nodes.iter().map(|n| n.type_label.as_str()).collect()
    }

    /// Edge types, in edge order.
    #[must_use]
    pub fn edge_types(&self) -> Vec<&str> {
        self.edges.iter().map(|e| e.type_label.as_str()).collect()
    }

    /// Distinct node and edge types.
    #[must_use]
    pub fn type_vocabulary(&self) -> BTreeSet<&str> {
        self.node_types()
            .into_iter()
            .chain(self.edge_types())
            .collect()
    }

    /// A copy in which every edge also appears reversed, with the same
    /// properties. Reversed edges follow the originals and get fresh keys.
    #[must_use]
    pub fn with_reversed_edges(&self) -> Self {
        let mut parallel: BTreeMap<(usize, usize), usize> = BTreeMap::new();
        for edge in &self.edges {
            *parallel.entry((edge.sender, edge.receiver)).or_insert(0) += 1;
        }

        let mut edges = self.edges.clone();
        for edge in &self.edges {
            let count = parallel.entry((edge.receiver, edge.sender)).or_insert(0);
            edges.push(IndexedEdge {
                sender: edge.receiver,
                receiver: edge.sender,
                key: *count,
                type_label: edge.type_label.clone(),
                properties: edge.properties.clone(),
            });
            *count += 1;
        }

        Self {
            name: self.name.clone(),
            nodes: self.nodes.clone(),
            edges,
        }
    }
}

// =============================================================================
// TESTS
// =============================================================================

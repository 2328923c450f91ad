//! # Concept Graph
//!
//! A directed multigraph whose nodes are `Concept`s (records or reified role
//! edges) and whose edges carry a `type` plus propagated metadata.
//!
//! ## Storage
//!
//! Arena + index: nodes live in an insertion-ordered `Vec`, looked up through a
//! `BTreeMap<NodeKey, NodeIndex>` keyed by explicit identity. Edges are
//! `(sender, receiver, key)` tuples over arena indices, where `key` counts the
//! edges already present between the same ordered pair. Node order is
//! therefore first-seen order, which the indexer relies on.

use crate::primitives::TYPE_KEY;
use crate::types::{Concept, KgraphError, NodeKey, Properties};
use std::collections::BTreeMap;

/// Position of a node in the graph's arena.
pub type NodeIndex = usize;

/// A node: its concept plus its property dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub concept: Concept,
    pub properties: Properties,
}

impl Node {
    /// The `type` property, falling back to the concept's own label.
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.properties
            .type_label()
            .unwrap_or_else(|| self.concept.type_label())
    }
}

/// An edge between two arena positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    pub sender: NodeIndex,
    pub receiver: NodeIndex,
    /// Parallel-edge index within `(sender, receiver)`.
    pub key: usize,
    pub properties: Properties,
}

impl Edge {
    #[must_use]
    pub fn type_label(&self) -> Option<&str> {
        self.properties.type_label()
    }
}

/// Outcome of inserting a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// A new node was created at this position.
    Added(NodeIndex),
    /// A node with the same identity already lives at this position; nothing
    /// was written.
    Existing(NodeIndex),
}

impl Insertion {
    #[must_use]
    pub const fn index(self) -> NodeIndex {
        match self {
            Self::Added(index) | Self::Existing(index) => index,
        }
    }
}

/// Identity-keyed concept multigraph.
#[derive(Debug, Clone, Default)]
pub struct ConceptGraph {
    name: String,
    nodes: Vec<Node>,
    node_index: BTreeMap<NodeKey, NodeIndex>,
    edges: Vec<Edge>,
    edge_index: BTreeMap<(NodeIndex, NodeIndex, usize), usize>,
    parallel: BTreeMap<(NodeIndex, NodeIndex), usize>,
}

impl ConceptGraph {
    /// Create an empty graph with a human-readable name for diagnostics.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    // =========================================================================
    // NODES
    // =========================================================================

    /// Insert a node unless one with the same identity exists.
    ///
    /// When the identity exists, the stored concept must be equal to the
    /// incoming one; property comparison is left to the caller, who knows
    /// what the two sides should be called in a conflict message.
    pub fn insert_node(
        &mut self,
        concept: Concept,
        properties: Properties,
    ) -> Result<Insertion, KgraphError> {
        let key = concept.key();
        if let Some(&index) = self.node_index.get(&key) {
            let existing = &self.nodes[index].concept;
            if existing != &concept {
                return Err(KgraphError::IdentityConflict {
                    id: identity_label(&key),
                    existing: existing.to_string(),
                    incoming: concept.to_string(),
                });
            }
            return Ok(Insertion::Existing(index));
        }

        let index = self.nodes.len();
        self.nodes.push(Node {
            concept,
            properties,
        });
        self.node_index.insert(key, index);
        Ok(Insertion::Added(index))
    }

    #[must_use]
    pub fn lookup(&self, key: &NodeKey) -> Option<NodeIndex> {
        self.node_index.get(key).copied()
    }

    #[must_use]
    pub fn node(&self, index: NodeIndex) -> Option<&Node> {
        self.nodes.get(index)
    }

    /// Find the node describing `concept`.
    #[must_use]
    pub fn find(&self, concept: &Concept) -> Option<&Node> {
        self.lookup(&concept.key())
            .and_then(|index| self.node(index))
            .filter(|node| &node.concept == concept)
    }

    /// Nodes in first-seen order.
    #[must_use]
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    #[must_use]
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    // =========================================================================
    // EDGES
    // =========================================================================

    /// Append an edge and return its parallel key.
    pub fn add_edge(
        &mut self,
        sender: NodeIndex,
        receiver: NodeIndex,
        properties: Properties,
    ) -> usize {
        debug_assert!(sender < self.nodes.len() && receiver < self.nodes.len());
        let count = self.parallel.entry((sender, receiver)).or_insert(0);
        let key = *count;
        *count += 1;

        self.edge_index
            .insert((sender, receiver, key), self.edges.len());
        self.edges.push(Edge {
            sender,
            receiver,
            key,
            properties,
        });
        key
    }

    /// Append an edge typed `edge_type`, carrying a copy of `metadata`.
    pub fn add_typed_edge(
        &mut self,
        sender: NodeIndex,
        receiver: NodeIndex,
        edge_type: &str,
        metadata: &Properties,
    ) -> usize {
        let mut properties = metadata.clone();
        properties.insert(TYPE_KEY, edge_type);
        self.add_edge(sender, receiver, properties)
    }

    #[must_use]
    pub fn edge(&self, sender: NodeIndex, receiver: NodeIndex, key: usize) -> Option<&Edge> {
        self.edge_index
            .get(&(sender, receiver, key))
            .and_then(|&position| self.edges.get(position))
    }

    /// Edges in insertion order.
    #[must_use]
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    /// Edges from `sender` to `receiver`, by ascending key.
    pub fn edges_between(
        &self,
        sender: NodeIndex,
        receiver: NodeIndex,
    ) -> impl Iterator<Item = &Edge> {
        self.edge_index
            .range((sender, receiver, 0)..=(sender, receiver, usize::MAX))
            .filter_map(|(_, &position)| self.edges.get(position))
    }

    // =========================================================================
    // TRANSFORMATIONS
    // =========================================================================

    /// Rewrite the `type` property of nodes and edges through `mapping`.
    ///
    /// Concepts keep their stored type labels; only the `type` properties
    /// change. Labels absent from `mapping` are left alone.
    pub fn relabel_types(&mut self, mapping: &BTreeMap<String, String>) {
        let rewrite = |properties: &mut Properties| {
            let replacement = properties
                .type_label()
                .and_then(|label| mapping.get(label))
                .cloned();
            if let Some(label) = replacement {
                properties.insert(TYPE_KEY, label);
            }
        };

        for node in &mut self.nodes {
            rewrite(&mut node.properties);
        }
        for edge in &mut self.edges {
            rewrite(&mut edge.properties);
        }
    }

    /// Display form of the node at `index`, for messages.
    #[must_use]
    pub fn describe(&self, index: NodeIndex) -> String {
        self.node(index)
            .map(|node| node.concept.to_string())
            .unwrap_or_else(|| format!("<node {index}>"))
    }
}

fn identity_label(key: &NodeKey) -> String {
    match key {
        NodeKey::Thing(id) => id.clone(),
        NodeKey::Edge {
            relation,
            roleplayer,
            role,
        } => format!("{relation} -[{role}]-> {roleplayer}"),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Thing;

    fn typed(label: &str) -> Properties {
        Properties::new().with(TYPE_KEY, label)
    }

    #[test]
    fn insert_is_identity_keyed() {
        let mut graph = ConceptGraph::new("g");
        let first = graph
            .insert_node(Thing::entity("V123", "person").into(), typed("person"))
            .expect("insert");
        let second = graph
            .insert_node(Thing::entity("V123", "person").into(), typed("person"))
            .expect("insert");

        assert_eq!(first, Insertion::Added(0));
        assert_eq!(second, Insertion::Existing(0));
        assert_eq!(graph.node_count(), 1);
    }

    #[test]
    fn same_id_different_record_is_rejected() {
        let mut graph = ConceptGraph::new("g");
        graph
            .insert_node(Thing::entity("V123", "person").into(), typed("person"))
            .expect("insert");
        let err = graph
            .insert_node(Thing::entity("V123", "company").into(), typed("company"))
            .expect_err("must conflict");

        assert!(matches!(err, KgraphError::IdentityConflict { ref id, .. } if id == "V123"));
        assert!(err.to_string().contains("<company, V123>"));
    }

    #[test]
    fn parallel_edges_get_sequential_keys() {
        let mut graph = ConceptGraph::new("g");
        let a = graph
            .insert_node(Thing::entity("V1", "person").into(), typed("person"))
            .expect("insert")
            .index();
        let b = graph
            .insert_node(Thing::attribute("V2", "name", "Bob").into(), typed("name"))
            .expect("insert")
            .index();

        assert_eq!(graph.add_typed_edge(a, b, "has", &Properties::new()), 0);
        assert_eq!(graph.add_typed_edge(a, b, "has", &Properties::new()), 1);
        assert_eq!(graph.add_typed_edge(b, a, "has", &Properties::new()), 0);

        assert_eq!(graph.edges_between(a, b).count(), 2);
        assert_eq!(graph.edge(a, b, 1).map(|e| e.key), Some(1));
        assert!(graph.edge(a, b, 2).is_none());
    }

    #[test]
    fn relabel_rewrites_properties_only() {
        let mut graph = ConceptGraph::new("g");
        let concept: Concept = Thing::relation("V5", "candidate-diagnosis").into();
        graph
            .insert_node(concept.clone(), typed("candidate-diagnosis"))
            .expect("insert");

        let mapping = BTreeMap::from([(
            "candidate-diagnosis".to_string(),
            "diagnosis".to_string(),
        )]);
        graph.relabel_types(&mapping);

        let node = graph.find(&concept).expect("present");
        assert_eq!(node.type_label(), "diagnosis");
        assert_eq!(node.concept.type_label(), "candidate-diagnosis");
    }
}

//! # Variable Graph -> Concept Graph
//!
//! Instantiates a `VariableGraph` against one extracted answer.
//!
//! Two modes:
//! - `Direct`: variables become nodes, `has` edges are kept; role edges are
//!   not representable and are rejected.
//! - `Math`: as `Direct`, but every role edge `relation -role-> player` is
//!   reified into a `ReifiedEdge` node `e` with `relation -relates-> e` and
//!   `player -plays-> e`. A hyperedge over N players thus becomes N binary
//!   role nodes.
//!
//! Two variables bound to the same record produce one node, provided both
//! variables declare the same metadata for it.

use crate::extract::ConceptDict;
use crate::graph::{ConceptGraph, Insertion, NodeIndex};
use crate::primitives::{DATATYPE_KEY, HAS, PLAYS, RELATES, TYPE_KEY, VALUE_KEY};
use crate::types::{
    Concept, ConflictSubject, KgraphError, Properties, ReifiedEdge, Role, Thing, ThingKind,
};
use crate::variable_graph::{VariableEdge, VariableGraph};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use tracing::trace;

/// How role edges are represented in the built graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConversionMode {
    /// Only `has` edges; role edges are rejected.
    Direct,
    /// Role edges are reified into role nodes.
    #[default]
    Math,
}

impl fmt::Display for ConversionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => f.write_str("direct"),
            Self::Math => f.write_str("math"),
        }
    }
}

/// Build the concept graph for one answer.
pub fn concept_dict_to_graph(
    concept_dict: &ConceptDict,
    variable_graph: &VariableGraph,
    mode: ConversionMode,
) -> Result<ConceptGraph, KgraphError> {
    check_variable_set(concept_dict, variable_graph)?;

    let mut builder = Builder {
        graph: ConceptGraph::new(mode.to_string()),
        owners: BTreeMap::new(),
    };

    let mut positions = BTreeMap::new();
    for var in variable_graph.vars() {
        let thing = bound(concept_dict, var)?;
        let mut properties = variable_graph.var_metadata(var).cloned().unwrap_or_default();
        properties.insert(TYPE_KEY, thing.type_label.as_str());
        if let ThingKind::Attribute(value) = &thing.kind {
            properties.insert(DATATYPE_KEY, value.data_type().as_str());
            properties.insert(VALUE_KEY, value.clone());
        }

        let index = builder.add_node(thing.clone().into(), properties, var)?;
        positions.insert(var, index.index());
    }

    for edge in variable_graph.edges() {
        let sender = bound(concept_dict, &edge.sender)?;
        let receiver = bound(concept_dict, &edge.receiver)?;
        check_edge_origin(edge, sender, receiver)?;

        let (Some(&sender_index), Some(&receiver_index)) = (
            positions.get(edge.sender.as_str()),
            positions.get(edge.receiver.as_str()),
        ) else {
            return Err(KgraphError::UnknownVariable {
                variable: edge.sender.clone(),
            });
        };

        if edge.is_has() {
            builder
                .graph
                .add_typed_edge(sender_index, receiver_index, HAS, &edge.metadata);
            continue;
        }

        match mode {
            ConversionMode::Direct => {
                return Err(KgraphError::RoleEdgeInDirectMode {
                    sender: edge.sender.clone(),
                    receiver: edge.receiver.clone(),
                    role: edge.edge_type.clone(),
                });
            }
            ConversionMode::Math => {
                builder.reify(edge, sender, receiver, sender_index, receiver_index)?;
            }
        }
    }

    trace!(
        mode = %mode,
        nodes = builder.graph.node_count(),
        edges = builder.graph.edge_count(),
        "Built concept graph"
    );
    Ok(builder.graph)
}

struct Builder {
    graph: ConceptGraph,
    /// Which variable (or role edge) first produced each node.
    owners: BTreeMap<NodeIndex, String>,
}

impl Builder {
    fn add_node(
        &mut self,
        concept: Concept,
        properties: Properties,
        source: &str,
    ) -> Result<Insertion, KgraphError> {
        let subject = concept.to_string();
        let insertion = self.graph.insert_node(concept, properties.clone())?;
        match insertion {
            Insertion::Added(index) => {
                self.owners.insert(index, source.to_string());
            }
            Insertion::Existing(index) => {
                let existing = self
                    .graph
                    .node(index)
                    .map(|node| node.properties.clone())
                    .unwrap_or_default();
                if existing != properties {
                    let first = self.owners.get(&index).cloned().unwrap_or_default();
                    return Err(KgraphError::MergeConflict {
                        subject: ConflictSubject::Node(subject),
                        left_source: format!("variable ${first}"),
                        right_source: format!("variable ${source}"),
                        left: existing,
                        right: properties,
                    });
                }
            }
        }
        Ok(insertion)
    }

    fn reify(
        &mut self,
        edge: &VariableEdge,
        relation: &Thing,
        player: &Thing,
        relation_index: NodeIndex,
        player_index: NodeIndex,
    ) -> Result<(), KgraphError> {
        let role = Role::new(edge.edge_type.as_str());
        let mut properties = edge.metadata.clone();
        properties.insert(TYPE_KEY, role.as_str());

        let reified = ReifiedEdge::new(relation.clone(), player.clone(), role);
        let source = format!("${} -[{}]-> ${}", edge.sender, edge.edge_type, edge.receiver);
        if let Insertion::Added(edge_index) = self.add_node(reified.into(), properties, &source)? {
            self.graph
                .add_typed_edge(relation_index, edge_index, RELATES, &edge.metadata);
            self.graph
                .add_typed_edge(player_index, edge_index, PLAYS, &edge.metadata);
        }
        Ok(())
    }
}

fn bound<'a>(concept_dict: &'a ConceptDict, var: &str) -> Result<&'a Thing, KgraphError> {
    concept_dict
        .get(var)
        .ok_or_else(|| KgraphError::UnknownVariable {
            variable: var.to_string(),
        })
}

/// The binding keys must equal the variable graph's nodes.
fn check_variable_set(
    concept_dict: &ConceptDict,
    variable_graph: &VariableGraph,
) -> Result<(), KgraphError> {
    let declared: BTreeSet<&str> = variable_graph.vars().collect();
    let bound: BTreeSet<&str> = concept_dict.keys().map(String::as_str).collect();

    if declared == bound {
        return Ok(());
    }

    Err(KgraphError::VariableSetMismatch {
        unbound: declared.difference(&bound).map(|v| v.to_string()).collect(),
        extraneous: bound.difference(&declared).map(|v| v.to_string()).collect(),
    })
}

/// Edges start at a relation, except `has` edges into an attribute.
fn check_edge_origin(
    edge: &VariableEdge,
    sender: &Thing,
    receiver: &Thing,
) -> Result<(), KgraphError> {
    if sender.is_relation() || (edge.is_has() && receiver.is_attribute()) {
        return Ok(());
    }
    Err(KgraphError::InvalidEdgeOrigin {
        sender: edge.sender.clone(),
        receiver: edge.receiver.clone(),
        edge_type: edge.edge_type.clone(),
        sender_kind: sender.base_kind(),
    })
}

// =============================================================================
// TESTS
// =============================================================================

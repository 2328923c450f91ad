//! # Variable Graph
//!
//! The declarative, query-shaped template a concept graph is built from.
//!
//! Nodes are variable names (without the `$` sigil), each with a metadata
//! dictionary. Edges are typed by a role label or by `has`, and carry their
//! own metadata. All metadata is copied verbatim onto the concept graph.
//!
//! Variables keep their declaration order; the builder visits them in that
//! order, so the node order of every graph built from this template is fixed.

use crate::primitives::{HAS, INPUT_KEY, SOLUTION_KEY};
use crate::types::{Properties, Role};
use std::collections::BTreeMap;

/// A directed, typed edge between two variables.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VariableEdge {
    pub sender: String,
    pub receiver: String,
    pub edge_type: String,
    pub metadata: Properties,
}

impl VariableEdge {
    #[must_use]
    pub fn is_has(&self) -> bool {
        self.edge_type == HAS
    }
}

/// A directed multigraph over variable names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VariableGraph {
    order: Vec<String>,
    metadata: BTreeMap<String, Properties>,
    edges: Vec<VariableEdge>,
}

impl VariableGraph {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare a variable. Re-declaring merges the metadata; later keys win.
    pub fn add_var(&mut self, var: impl Into<String>, metadata: Properties) -> &mut Self {
        let var = var.into();
        match self.metadata.get_mut(&var) {
            Some(existing) => existing.extend(&metadata),
            None => {
                self.order.push(var.clone());
                self.metadata.insert(var, metadata);
            }
        }
        self
    }

    /// Declare several variables sharing the same metadata.
    pub fn add_vars<I, S>(&mut self, vars: I, metadata: &Properties) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for var in vars {
            self.add_var(var, metadata.clone());
        }
        self
    }

    /// Add a typed edge. Undeclared endpoints are declared with no metadata.
    pub fn add_edge(
        &mut self,
        sender: impl Into<String>,
        receiver: impl Into<String>,
        edge_type: impl Into<String>,
        metadata: Properties,
    ) -> &mut Self {
        let sender = sender.into();
        let receiver = receiver.into();
        self.add_var(sender.clone(), Properties::new());
        self.add_var(receiver.clone(), Properties::new());
        self.edges.push(VariableEdge {
            sender,
            receiver,
            edge_type: edge_type.into(),
            metadata,
        });
        self
    }

    /// Add an ownership edge `owner -has-> attribute`.
    pub fn add_has_edge(
        &mut self,
        owner: impl Into<String>,
        attribute: impl Into<String>,
        metadata: Properties,
    ) -> &mut Self {
        self.add_edge(owner, attribute, HAS, metadata)
    }

    /// Add a role edge `relation -role-> player`.
    pub fn add_role_edge(
        &mut self,
        relation: impl Into<String>,
        player: impl Into<String>,
        role: &Role,
        metadata: Properties,
    ) -> &mut Self {
        self.add_edge(relation, player, role.as_str(), metadata)
    }

    /// Variables in declaration order.
    pub fn vars(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    #[must_use]
    pub fn contains_var(&self, var: &str) -> bool {
        self.metadata.contains_key(var)
    }

    #[must_use]
    pub fn var_metadata(&self, var: &str) -> Option<&Properties> {
        self.metadata.get(var)
    }

    #[must_use]
    pub fn edges(&self) -> &[VariableEdge] {
        &self.edges
    }

    #[must_use]
    pub fn var_count(&self) -> usize {
        self.order.len()
    }

    #[must_use]
    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }
}

// =============================================================================
// SOLUTION FLAGS
// =============================================================================

/// Labelling presets for the elements of a training example.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolutionFlag {
    /// Already in the store and shown to the model.
    Preexists,
    /// Hidden from the model; the element to be inferred.
    ToInfer,
    /// Hidden from the model; a candidate that is not the answer.
    Candidate,
}

impl SolutionFlag {
    /// The `{input, solution}` metadata for this flag.
    #[must_use]
    pub fn properties(self) -> Properties {
        let (input, solution) = match self {
            Self::Preexists => (1, 0),
            Self::ToInfer => (0, 2),
            Self::Candidate => (0, 1),
        };
        Properties::new()
            .with(INPUT_KEY, input)
            .with(SOLUTION_KEY, solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn edges_declare_their_endpoints() {
        let mut vg = VariableGraph::new();
        vg.add_role_edge("e", "p", &Role::new("employee"), Properties::new());

        assert_eq!(vg.vars().collect::<Vec<_>>(), vec!["e", "p"]);
        assert_eq!(vg.edge_count(), 1);
        assert!(!vg.edges()[0].is_has());
    }

    #[test]
    fn redeclaring_merges_metadata() {
        let mut vg = VariableGraph::new();
        vg.add_var("x", SolutionFlag::Preexists.properties());
        vg.add_has_edge("x", "n", SolutionFlag::Preexists.properties());
        vg.add_var("x", Properties::new().with("solution", 1));

        let meta = vg.var_metadata("x").expect("declared");
        assert_eq!(meta.get("input"), Some(&1.into()));
        assert_eq!(meta.get("solution"), Some(&1.into()));
        assert_eq!(vg.var_count(), 2);
    }

    #[test]
    fn add_vars_keeps_order() {
        let mut vg = VariableGraph::new();
        vg.add_vars(["c", "a", "b"], &SolutionFlag::Candidate.properties());
        assert_eq!(vg.vars().collect::<Vec<_>>(), vec!["c", "a", "b"]);
    }

    #[test]
    fn solution_flags() {
        assert_eq!(
            SolutionFlag::ToInfer.properties().to_string(),
            "{'input': 0, 'solution': 2}"
        );
        assert_eq!(
            SolutionFlag::Candidate.properties().to_string(),
            "{'input': 0, 'solution': 1}"
        );
    }
}

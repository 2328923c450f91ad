//! # Role and Attribute Discovery
//!
//! For answers that come without a declared variable graph, ask the store how
//! the bound records relate: which roles each record plays in a bound
//! relation, and which bound records own a bound attribute.
//!
//! Lookups are delegated to a caller-supplied `QueryExecutor`; this module
//! only writes the query texts and interprets the results. It performs no I/O
//! of its own.

use crate::extract::ConceptDict;
use crate::roles::{RoleHierarchy, find_specific_roles};
use crate::types::{KgraphError, Properties, Role, Thing, Value};
use crate::variable_graph::VariableGraph;
use std::collections::{BTreeMap, BTreeSet};
use tracing::debug;

/// Synchronous lookups against the data store.
pub trait QueryExecutor {
    /// Run a query whose answers are role labels.
    fn roles(&self, query: &str) -> Result<Vec<Role>, KgraphError>;

    /// Run a query whose answers are records.
    fn things(&self, query: &str) -> Result<Vec<Thing>, KgraphError>;
}

// =============================================================================
// QUERY TEXTS
// =============================================================================

/// Roles `player` plays in `relation`.
#[must_use]
pub fn roleplayer_query(relation: &Thing, player: &Thing) -> String {
    format!(
        "match $r($role: $x); $x id {}; $r id {}; get $role;",
        player.id, relation.id
    )
}

/// `candidate`, if it owns an attribute of `type_label` equal to `value`.
#[must_use]
pub fn attribute_owner_query(type_label: &str, value: &Value, candidate: &Thing) -> String {
    format!(
        "match $x has {} {}; $x id {}; get;",
        type_label,
        value.to_query_literal(),
        candidate.id
    )
}

// =============================================================================
// LOOKUPS
// =============================================================================

fn binding<'a>(bindings: &'a ConceptDict, variable: &str) -> Result<&'a Thing, KgraphError> {
    bindings
        .get(variable)
        .ok_or_else(|| KgraphError::UnknownVariable {
            variable: variable.to_string(),
        })
}

/// Roles each bound record plays in the relation bound to `relation_var`.
///
/// Variables playing no role are left out.
pub fn get_roleplayers<E: QueryExecutor + ?Sized>(
    bindings: &ConceptDict,
    relation_var: &str,
    executor: &E,
) -> Result<BTreeMap<String, BTreeSet<Role>>, KgraphError> {
    let relation = binding(bindings, relation_var)?;
    if !relation.is_relation() {
        return Err(KgraphError::NotARelation {
            variable: relation_var.to_string(),
            thing: relation.to_string(),
        });
    }

    let mut roleplayers = BTreeMap::new();
    for (variable, player) in bindings {
        let roles: BTreeSet<Role> = executor
            .roles(&roleplayer_query(relation, player))?
            .into_iter()
            .collect();
        if !roles.is_empty() {
            roleplayers.insert(variable.clone(), roles);
        }
    }
    Ok(roleplayers)
}

/// As `get_roleplayers`, with each role set reduced to its most specific roles.
pub fn discover_specific_roles<E, H>(
    bindings: &ConceptDict,
    relation_var: &str,
    executor: &E,
    hierarchy: &H,
) -> Result<BTreeMap<String, BTreeSet<Role>>, KgraphError>
where
    E: QueryExecutor + ?Sized,
    H: RoleHierarchy + ?Sized,
{
    get_roleplayers(bindings, relation_var, executor)?
        .into_iter()
        .map(|(variable, roles)| Ok((variable, find_specific_roles(&roles, hierarchy)?)))
        .collect()
}

/// Every other bound record owning the attribute bound to `attribute_var`.
pub fn get_attribute_owners<E: QueryExecutor + ?Sized>(
    bindings: &ConceptDict,
    attribute_var: &str,
    executor: &E,
) -> Result<Vec<Thing>, KgraphError> {
    let attribute = binding(bindings, attribute_var)?;
    let Some(value) = attribute.value() else {
        return Err(KgraphError::NotAnAttribute {
            variable: attribute_var.to_string(),
            thing: attribute.to_string(),
        });
    };

    let mut owners = Vec::new();
    for (variable, candidate) in bindings {
        if variable == attribute_var {
            continue;
        }
        let query = attribute_owner_query(&attribute.type_label, value, candidate);
        owners.extend(executor.things(&query)?);
    }
    Ok(owners)
}

/// Build a variable graph for bindings that came without one.
///
/// Relations get one role edge per specific role each bound record plays in
/// them; attributes get a `has` edge from each bound record that owns them.
/// No metadata is attached.
pub fn discover_variable_graph<E, H>(
    bindings: &ConceptDict,
    executor: &E,
    hierarchy: &H,
) -> Result<VariableGraph, KgraphError>
where
    E: QueryExecutor + ?Sized,
    H: RoleHierarchy + ?Sized,
{
    let mut graph = VariableGraph::new();
    graph.add_vars(bindings.keys(), &Properties::new());

    for (variable, thing) in bindings {
        if thing.is_relation() {
            for (player, roles) in discover_specific_roles(bindings, variable, executor, hierarchy)? {
                for role in &roles {
                    graph.add_role_edge(variable.as_str(), player.as_str(), role, Properties::new());
                }
            }
        } else if thing.is_attribute() {
            let owner_ids: BTreeSet<String> = get_attribute_owners(bindings, variable, executor)?
                .into_iter()
                .map(|owner| owner.id)
                .collect();
            for (owner_var, owner) in bindings {
                if owner_var != variable && owner_ids.contains(&owner.id) {
                    graph.add_has_edge(owner_var.as_str(), variable.as_str(), Properties::new());
                }
            }
        }
    }

    debug!(
        vars = graph.var_count(),
        edges = graph.edge_count(),
        "Discovered variable graph"
    );
    Ok(graph)
}

// =============================================================================
// TESTS
// =============================================================================

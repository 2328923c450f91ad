//! # Output Rendering
//!
//! JSON views of indexed graphs. Values are written as plain JSON scalars
//! (dates as ISO strings), not in the tagged form used by the binary format.

use kgraph_core::primitives::DATE_FORMAT;
use kgraph_core::{Concept, IndexedGraph, Properties, Thing, Value};
use serde_json::{Map, json};
use std::collections::BTreeMap;

pub fn value_to_json(value: &Value) -> serde_json::Value {
    match value {
        Value::Long(v) => json!(v),
        Value::Double(v) => json!(v),
        Value::Boolean(v) => json!(v),
        Value::Date(v) => json!(v.format(DATE_FORMAT).to_string()),
        Value::String(v) => json!(v),
    }
}

fn properties_to_json(properties: &Properties) -> serde_json::Value {
    let map: Map<String, serde_json::Value> = properties
        .iter()
        .map(|(key, value)| (key.clone(), value_to_json(value)))
        .collect();
    serde_json::Value::Object(map)
}

fn thing_to_json(thing: &Thing) -> serde_json::Value {
    let mut object = json!({
        "id": thing.id,
        "type": thing.type_label,
        "base_type": thing.base_kind().as_str(),
    });
    if let (Some(value), Some(map)) = (thing.value(), object.as_object_mut()) {
        map.insert("data_type".to_string(), json!(value.data_type().as_str()));
        map.insert("value".to_string(), value_to_json(value));
    }
    object
}

fn concept_to_json(concept: &Concept) -> serde_json::Value {
    match concept {
        Concept::Thing(thing) => thing_to_json(thing),
        Concept::Edge(edge) => json!({
            "role": edge.role.as_str(),
            "relation": thing_to_json(&edge.relation),
            "roleplayer": thing_to_json(&edge.roleplayer),
        }),
    }
}

/// Full JSON rendering of an indexed graph.
pub fn indexed_graph_to_json(graph: &IndexedGraph) -> serde_json::Value {
    let nodes: Vec<serde_json::Value> = graph
        .nodes()
        .iter()
        .map(|node| {
            json!({
                "index": node.index,
                "type": node.type_label,
                "concept": concept_to_json(&node.concept),
                "properties": properties_to_json(&node.properties),
            })
        })
        .collect();

    let edges: Vec<serde_json::Value> = graph
        .edges()
        .iter()
        .map(|edge| {
            json!({
                "sender": edge.sender,
                "receiver": edge.receiver,
                "key": edge.key,
                "type": edge.type_label,
                "properties": properties_to_json(&edge.properties),
            })
        })
        .collect();

    json!({
        "name": graph.name,
        "nodes": nodes,
        "edges": edges,
    })
}

/// Per-type node and edge counts.
pub fn type_counts(graph: &IndexedGraph) -> (BTreeMap<&str, usize>, BTreeMap<&str, usize>) {
    let mut nodes = BTreeMap::new();
    for label in graph.node_types() {
        *nodes.entry(label).or_insert(0) += 1;
    }
    let mut edges = BTreeMap::new();
    for label in graph.edge_types() {
        *edges.entry(label).or_insert(0) += 1;
    }
    (nodes, edges)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::{
        ConceptDict, ConversionMode, Properties, Role, VariableGraph, concept_dict_to_graph,
        concept_graph_to_indexed_graph,
    };

    fn sample() -> IndexedGraph {
        let dict = ConceptDict::from([
            ("x".to_string(), Thing::entity("V123", "person")),
            ("y".to_string(), Thing::relation("V567", "employment")),
            ("n".to_string(), Thing::attribute("V1234", "name", "Bob")),
        ]);
        let mut vg = VariableGraph::new();
        vg.add_role_edge("y", "x", &Role::new("employee"), Properties::new());
        vg.add_has_edge("x", "n", Properties::new().with("input", 1));
        let graph = concept_dict_to_graph(&dict, &vg, ConversionMode::Math).expect("build");
        concept_graph_to_indexed_graph(&graph)
    }

    #[test]
    fn values_are_plain_scalars() {
        let json = indexed_graph_to_json(&sample());

        assert_eq!(json["nodes"][2]["concept"]["value"], "Bob");
        assert_eq!(json["nodes"][2]["properties"]["datatype"], "string");
        assert_eq!(json["nodes"][3]["concept"]["role"], "employee");
        assert_eq!(json["edges"][2]["properties"]["input"], 1);
    }

    #[test]
    fn counts_by_type() {
        let graph = sample();
        let (nodes, edges) = type_counts(&graph);
        assert_eq!(nodes.get("person"), Some(&1));
        assert_eq!(edges.get("has"), Some(&1));
        assert_eq!(edges.values().sum::<usize>(), graph.edge_count());
    }
}

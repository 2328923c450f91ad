//! # Recorded Examples
//!
//! The JSON input of `kgraph build`: one example made of named sub-queries,
//! each with its variable graph and the answers the store returned for it.
//!
//! ```json
//! {
//!   "name": "example-1",
//!   "queries": [{
//!     "name": "positive",
//!     "query": "match $p isa person, has name $n; get;",
//!     "limit": 10,
//!     "variable_graph": {
//!       "vars": [{ "name": "p", "metadata": { "input": 1, "solution": 0 } }],
//!       "edges": [{ "sender": "p", "receiver": "n", "type": "has" }]
//!     },
//!     "answers": [{
//!       "p": { "id": "V123", "type": "person", "base_type": "ENTITY" },
//!       "n": { "id": "V1234", "type": "name", "base_type": "ATTRIBUTE",
//!              "data_type": "STRING", "value": "Bob" }
//!     }]
//!   }]
//! }
//! ```
//!
//! A query without a `variable_graph` has one discovered for each of its
//! answers, using the recorded `lookups` and `role_hierarchy`.

use kgraph_core::primitives::DATE_FORMAT;
use kgraph_core::{
    Answer, AnswerSource, ConceptHandle, DataType, KgraphError, Properties, QueryExecutor,
    ConceptDict, QueryHandle, Role, RoleTree, Thing, Value, VariableGraph,
    discover_variable_graph, thing_from_handle,
};
use chrono::{NaiveDate, NaiveDateTime};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};

// =============================================================================
// INPUT DOCUMENT
// =============================================================================

/// One recorded example.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordedExample {
    #[serde(default)]
    pub name: Option<String>,
    pub queries: Vec<RecordedQuery>,
    #[serde(default)]
    pub lookups: RecordedLookups,
    /// Super-role -> direct sub-roles.
    #[serde(default)]
    pub role_hierarchy: BTreeMap<String, Vec<String>>,
}

/// One sub-query with its recorded answers.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordedQuery {
    pub name: String,
    pub query: String,
    #[serde(default)]
    pub limit: Option<usize>,
    #[serde(default)]
    pub variable_graph: Option<VariableGraphInput>,
    #[serde(default)]
    pub answers: Vec<Answer<InputConcept>>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VariableGraphInput {
    #[serde(default)]
    pub vars: Vec<VarInput>,
    #[serde(default)]
    pub edges: Vec<EdgeInput>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct VarInput {
    pub name: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EdgeInput {
    pub sender: String,
    pub receiver: String,
    #[serde(rename = "type")]
    pub edge_type: String,
    #[serde(default)]
    pub metadata: serde_json::Map<String, serde_json::Value>,
}

/// A recorded store handle.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct InputConcept {
    pub id: String,
    #[serde(rename = "type")]
    pub type_label: String,
    pub base_type: String,
    #[serde(default)]
    pub data_type: Option<String>,
    #[serde(default)]
    pub value: Option<serde_json::Value>,
}

/// Recorded answers to discovery lookups, keyed by query text.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RecordedLookups {
    #[serde(default)]
    pub roles: BTreeMap<String, Vec<String>>,
    #[serde(default)]
    pub things: BTreeMap<String, Vec<InputConcept>>,
}

// =============================================================================
// JSON -> VALUE
// =============================================================================

/// Convert a JSON scalar, guided by a declared data type when there is one.
///
/// A value that does not fit the declared type is converted by its JSON kind
/// instead, so the extractor can report the mismatch.
pub fn json_to_value(json: &serde_json::Value, declared: Option<DataType>) -> Option<Value> {
    let coerced = match declared {
        Some(DataType::Long) => json.as_i64().map(Value::Long),
        Some(DataType::Double) => json.as_f64().map(Value::Double),
        Some(DataType::Boolean) => json.as_bool().map(Value::Boolean),
        Some(DataType::Date) => json.as_str().and_then(parse_date).map(Value::Date),
        Some(DataType::String) => json.as_str().map(Value::from),
        None => None,
    };
    coerced.or_else(|| match json {
        serde_json::Value::Bool(b) => Some(Value::Boolean(*b)),
        serde_json::Value::Number(n) => n
            .as_i64()
            .map(Value::Long)
            .or_else(|| n.as_f64().map(Value::Double)),
        serde_json::Value::String(s) => Some(Value::from(s.as_str())),
        serde_json::Value::Null | serde_json::Value::Array(_) | serde_json::Value::Object(_) => {
            None
        }
    })
}

/// Accepts `YYYY-MM-DDTHH:MM:SS[.fff]` or a bare `YYYY-MM-DD`.
fn parse_date(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text, DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

/// Convert a JSON metadata object into properties.
pub fn properties_from_json(
    metadata: &serde_json::Map<String, serde_json::Value>,
) -> Result<Properties, KgraphError> {
    let mut properties = Properties::new();
    for (key, json) in metadata {
        let value = json_to_value(json, None).ok_or_else(|| {
            KgraphError::SerializationError(format!(
                "Metadata '{key}' must be a number, boolean or string, got {json}"
            ))
        })?;
        properties.insert(key.as_str(), value);
    }
    Ok(properties)
}

impl ConceptHandle for InputConcept {
    fn id(&self) -> &str {
        &self.id
    }

    fn type_label(&self) -> &str {
        &self.type_label
    }

    fn base_type(&self) -> &str {
        &self.base_type
    }

    fn data_type(&self) -> Option<&str> {
        self.data_type.as_deref()
    }

    fn value(&self) -> Option<Value> {
        let declared = self.data_type.as_deref().and_then(DataType::parse);
        self.value
            .as_ref()
            .and_then(|json| json_to_value(json, declared))
    }
}

impl VariableGraphInput {
    pub fn to_variable_graph(&self) -> Result<VariableGraph, KgraphError> {
        let mut graph = VariableGraph::new();
        for var in &self.vars {
            graph.add_var(var.name.as_str(), properties_from_json(&var.metadata)?);
        }
        for edge in &self.edges {
            graph.add_edge(
                edge.sender.as_str(),
                edge.receiver.as_str(),
                edge.edge_type.as_str(),
                properties_from_json(&edge.metadata)?,
            );
        }
        Ok(graph)
    }
}

// =============================================================================
// COLLABORATORS
// =============================================================================

impl QueryExecutor for RecordedLookups {
    fn roles(&self, query: &str) -> Result<Vec<Role>, KgraphError> {
        Ok(self
            .roles
            .get(query)
            .map(|labels| labels.iter().map(|label| Role::new(label.as_str())).collect())
            .unwrap_or_default())
    }

    fn things(&self, query: &str) -> Result<Vec<Thing>, KgraphError> {
        self.things
            .get(query)
            .map(|handles| handles.iter().map(thing_from_handle).collect())
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

impl AnswerSource for RecordedExample {
    type Handle = InputConcept;

    /// Answers recorded under the handle's query name.
    fn answers(&self, handle: &QueryHandle) -> Result<Vec<Answer<InputConcept>>, KgraphError> {
        Ok(self
            .queries
            .iter()
            .find(|recorded| recorded.name == handle.name)
            .map(|recorded| recorded.answers.clone())
            .unwrap_or_default())
    }

    fn discover(
        &self,
        _handle: &QueryHandle,
        bindings: &ConceptDict,
    ) -> Result<VariableGraph, KgraphError> {
        discover_variable_graph(bindings, &self.lookups, &self.role_tree())
    }
}

impl RecordedExample {
    /// Parse an example. Query names must be unique within it.
    pub fn from_json(bytes: &[u8]) -> Result<Self, KgraphError> {
        let example: Self = serde_json::from_slice(bytes)
            .map_err(|e| KgraphError::SerializationError(format!("Invalid example: {e}")))?;

        let duplicate = {
            let mut names = BTreeSet::new();
            example
                .queries
                .iter()
                .find(|recorded| !names.insert(recorded.name.as_str()))
                .map(|recorded| recorded.name.clone())
        };
        if let Some(name) = duplicate {
            return Err(KgraphError::SerializationError(format!(
                "Invalid example: query name '{name}' is used more than once"
            )));
        }
        Ok(example)
    }

    /// The example's display name, falling back to `fallback`.
    #[must_use]
    pub fn display_name<'a>(&'a self, fallback: &'a str) -> &'a str {
        self.name.as_deref().unwrap_or(fallback)
    }

    pub fn role_tree(&self) -> RoleTree {
        let mut tree = RoleTree::new();
        for (sup, subs) in &self.role_hierarchy {
            for sub in subs {
                tree.add_sub(Role::new(sup.as_str()), Role::new(sub.as_str()));
            }
        }
        tree
    }

    /// Query handles for the pipeline.
    ///
    /// Queries without a `variable_graph` get one discovered per answer.
    pub fn query_handles(&self) -> Result<Vec<QueryHandle>, KgraphError> {
        let mut handles = Vec::with_capacity(self.queries.len());

        for recorded in &self.queries {
            let name = recorded.name.as_str();
            let query = recorded.query.as_str();
            let mut handle = match &recorded.variable_graph {
                Some(declared) => QueryHandle::new(name, query, declared.to_variable_graph()?),
                None => QueryHandle::discovered(name, query),
            };
            if let Some(limit) = recorded.limit {
                handle = handle.with_limit(limit);
            }
            handles.push(handle);
        }
        Ok(handles)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use kgraph_core::{Concept, ConversionMode, ThingKind, build_graph_from_queries};
    use serde_json::json;

    #[test]
    fn declared_type_guides_conversion() {
        assert_eq!(
            json_to_value(&json!(2), Some(DataType::Double)),
            Some(Value::Double(2.0))
        );
        assert_eq!(json_to_value(&json!(2), None), Some(Value::Long(2)));
        assert_eq!(
            json_to_value(&json!("2020-01-31"), Some(DataType::Date)),
            NaiveDate::from_ymd_opt(2020, 1, 31)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .map(Value::Date)
        );
        assert_eq!(json_to_value(&json!(null), None), None);
    }

    #[test]
    fn mismatched_value_falls_back_to_json_kind() {
        assert_eq!(
            json_to_value(&json!("forty"), Some(DataType::Long)),
            Some(Value::from("forty"))
        );
    }

    #[test]
    fn metadata_must_be_scalar() {
        let ok = json!({ "input": 1, "solution": 0 });
        let props = properties_from_json(ok.as_object().expect("object")).expect("convert");
        assert_eq!(props.to_string(), "{'input': 1, 'solution': 0}");

        let bad = json!({ "input": [1] });
        assert!(properties_from_json(bad.as_object().expect("object")).is_err());
    }

    #[test]
    fn input_concepts_extract() {
        let concept: InputConcept = serde_json::from_value(json!({
            "id": "V1", "type": "age", "base_type": "ATTRIBUTE",
            "data_type": "LONG", "value": 66
        }))
        .expect("parse");

        let thing = thing_from_handle(&concept).expect("extract");
        assert_eq!(thing.kind, ThingKind::Attribute(Value::Long(66)));
    }

    /// Employment example without a declared variable graph: answer one has
    /// P1 employed in R1, answer two has P2 employing in R2.
    fn two_employments() -> RecordedExample {
        let employment = |relation: &str, player: &str| {
            json!({
                "r": { "id": relation, "type": "employment", "base_type": "RELATION" },
                "p": { "id": player, "type": "person", "base_type": "ENTITY" }
            })
        };
        RecordedExample::from_json(
            json!({
                "queries": [{
                    "name": "q",
                    "query": "match $r($role: $p) isa employment; get;",
                    "answers": [employment("R1", "P1"), employment("R2", "P2")]
                }],
                "lookups": { "roles": {
                    "match $r($role: $x); $x id P1; $r id R1; get $role;": ["role", "employee"],
                    "match $r($role: $x); $x id P2; $r id R2; get $role;": ["role", "employer"]
                }},
                "role_hierarchy": { "role": ["employee", "employer"] }
            })
            .to_string()
            .as_bytes(),
        )
        .expect("parse")
    }

    #[test]
    fn missing_variable_graph_is_left_to_discovery() {
        let handles = two_employments().query_handles().expect("handles");
        assert!(handles[0].variable_graph.is_none());
    }

    #[test]
    fn each_answer_is_discovered_separately() {
        let example = two_employments();
        let handles = example.query_handles().expect("handles");
        let graph =
            build_graph_from_queries(&handles, &example, ConversionMode::Math).expect("build");

        let roles: Vec<String> = graph
            .nodes()
            .iter()
            .filter_map(|node| match &node.concept {
                Concept::Edge(edge) => {
                    Some(format!("{}:{}", edge.roleplayer.id, edge.role.as_str()))
                }
                Concept::Thing(_) => None,
            })
            .collect();
        assert_eq!(roles, vec!["P1:employee", "P2:employer"]);
    }

    #[test]
    fn queries_sharing_a_text_keep_their_own_answers() {
        let example = RecordedExample::from_json(
            json!({
                "queries": [
                    {
                        "name": "a",
                        "query": "q",
                        "variable_graph": { "vars": [{ "name": "x" }] },
                        "answers": [{ "x": { "id": "V1", "type": "person", "base_type": "ENTITY" } }]
                    },
                    {
                        "name": "b",
                        "query": "q",
                        "variable_graph": { "vars": [{ "name": "y" }] },
                        "answers": [{ "y": { "id": "V2", "type": "person", "base_type": "ENTITY" } }]
                    }
                ]
            })
            .to_string()
            .as_bytes(),
        )
        .expect("parse");

        let handles = example.query_handles().expect("handles");
        assert_eq!(example.answers(&handles[0]).expect("answers").len(), 1);
        assert_eq!(example.answers(&handles[1]).expect("answers").len(), 1);

        let graph =
            build_graph_from_queries(&handles, &example, ConversionMode::Direct).expect("build");
        assert_eq!(graph.node_count(), 2);
        assert_eq!(graph.name(), "a+b");
    }

    #[test]
    fn duplicate_query_names_are_rejected() {
        let err = RecordedExample::from_json(
            br#"{"queries": [{"name": "a", "query": "q1"}, {"name": "a", "query": "q2"}]}"#,
        )
        .expect_err("duplicate name");
        assert!(matches!(err, KgraphError::SerializationError(ref m) if m.contains("'a'")));
    }

    #[test]
    fn unnamed_example_uses_fallback() {
        let example = RecordedExample::from_json(
            br#"{"queries": [{"name": "a", "query": "q1", "answers": [{}]}]}"#,
        )
        .expect("parse");
        assert_eq!(example.display_name("file"), "file");
    }
}

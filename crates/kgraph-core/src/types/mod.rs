//! # Core Type Definitions
//!
//! This module contains all core types for kgraph:
//! - Data-store records (`Thing`, `ThingKind`, `BaseKind`)
//! - Attribute scalars (`Value`, `DataType`)
//! - Roles and reified role edges (`Role`, `ReifiedEdge`)
//! - Graph node payloads and identity keys (`Concept`, `NodeKey`)
//! - Property dictionaries (`Properties`)
//! - Error types (`KgraphError`)
//!
//! ## Ordering Guarantees
//!
//! Every type here implements `Ord` so that it can key a `BTreeMap`/`BTreeSet`.
//! `Value::Double` is ordered and hashed by its IEEE total ordering, which makes
//! attribute records usable as identity keys without special-casing floats.

use crate::primitives::DATE_FORMAT;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::hash::{Hash, Hasher};
use thiserror::Error;

// =============================================================================
// BASE KINDS & DATA TYPES
// =============================================================================

/// Structural kind of a record in the data store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BaseKind {
    Entity,
    Relation,
    Attribute,
}

impl BaseKind {
    /// Parse a base kind label, ignoring ASCII case (`ENTITY`, `entity`, ...).
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        [Self::Entity, Self::Relation, Self::Attribute]
            .into_iter()
            .find(|kind| kind.as_str().eq_ignore_ascii_case(label))
    }

    /// The lowercase label of this kind.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Entity => "entity",
            Self::Relation => "relation",
            Self::Attribute => "attribute",
        }
    }
}

impl fmt::Display for BaseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declared data type of an attribute. This set is closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Long,
    Double,
    Boolean,
    Date,
    String,
}

impl DataType {
    /// Parse a data type label, ignoring ASCII case.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        [
            Self::Long,
            Self::Double,
            Self::Boolean,
            Self::Date,
            Self::String,
        ]
        .into_iter()
        .find(|data_type| data_type.as_str().eq_ignore_ascii_case(label))
    }

    /// The lowercase label of this data type.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Long => "long",
            Self::Double => "double",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::String => "string",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// VALUE
// =============================================================================

/// A scalar value: an attribute's value, or a metadata/property value.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Value {
    Long(i64),
    Double(f64),
    Boolean(bool),
    Date(NaiveDateTime),
    String(String),
}

impl Value {
    /// The data type this value belongs to.
    #[must_use]
    pub const fn data_type(&self) -> DataType {
        match self {
            Self::Long(_) => DataType::Long,
            Self::Double(_) => DataType::Double,
            Self::Boolean(_) => DataType::Boolean,
            Self::Date(_) => DataType::Date,
            Self::String(_) => DataType::String,
        }
    }

    /// Get the value as a string slice, if it is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the value as an integer, if it is a long.
    #[must_use]
    pub const fn as_long(&self) -> Option<i64> {
        match self {
            Self::Long(v) => Some(*v),
            _ => None,
        }
    }

    /// Render the value as a literal that can be embedded in a query.
    ///
    /// Strings are double-quoted with `\` and `"` escaped; every other value is
    /// embedded verbatim.
    #[must_use]
    pub fn to_query_literal(&self) -> String {
        match self {
            Self::String(s) => {
                let mut literal = String::with_capacity(s.len() + 2);
                literal.push('"');
                for c in s.chars() {
                    if c == '"' || c == '\\' {
                        literal.push('\\');
                    }
                    literal.push(c);
                }
                literal.push('"');
                literal
            }
            other => other.to_string(),
        }
    }

    const fn rank(&self) -> u8 {
        match self {
            Self::Long(_) => 0,
            Self::Double(_) => 1,
            Self::Boolean(_) => 2,
            Self::Date(_) => 3,
            Self::String(_) => 4,
        }
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Long(a), Self::Long(b)) => a.cmp(b),
            (Self::Double(a), Self::Double(b)) => a.total_cmp(b),
            (Self::Boolean(a), Self::Boolean(b)) => a.cmp(b),
            (Self::Date(a), Self::Date(b)) => a.cmp(b),
            (Self::String(a), Self::String(b)) => a.cmp(b),
            _ => self.rank().cmp(&other.rank()),
        }
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Value {}

impl Hash for Value {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.rank().hash(state);
        match self {
            Self::Long(v) => v.hash(state),
            Self::Double(v) => v.to_bits().hash(state),
            Self::Boolean(v) => v.hash(state),
            Self::Date(v) => v.hash(state),
            Self::String(v) => v.hash(state),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Long(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v:?}"),
            Self::Boolean(v) => write!(f, "{v}"),
            Self::Date(v) => write!(f, "{}", v.format(DATE_FORMAT)),
            Self::String(v) => f.write_str(v),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Self::Long(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Self::Long(i64::from(v))
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Self::Boolean(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Self::Date(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Self::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Self::String(v)
    }
}

// =============================================================================
// THING (a data-store record)
// =============================================================================

/// The kind of a `Thing`, carrying the attribute value when there is one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThingKind {
    Entity,
    Relation,
    Attribute(Value),
}

/// One identity-bearing element of the data store.
///
/// Things are immutable value objects, produced fresh for every query answer.
/// Equality covers every field; graph identity uses `id` alone (see `NodeKey`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Thing {
    /// Opaque, globally unique identifier.
    pub id: String,
    /// Label of the schema type.
    pub type_label: String,
    /// Structural kind, with the value for attributes.
    pub kind: ThingKind,
}

impl Thing {
    /// Create an entity.
    #[must_use]
    pub fn entity(id: impl Into<String>, type_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_label: type_label.into(),
            kind: ThingKind::Entity,
        }
    }

    /// Create a relation.
    #[must_use]
    pub fn relation(id: impl Into<String>, type_label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            type_label: type_label.into(),
            kind: ThingKind::Relation,
        }
    }

    /// Create an attribute holding `value`.
    #[must_use]
    pub fn attribute(
        id: impl Into<String>,
        type_label: impl Into<String>,
        value: impl Into<Value>,
    ) -> Self {
        Self {
            id: id.into(),
            type_label: type_label.into(),
            kind: ThingKind::Attribute(value.into()),
        }
    }

    #[must_use]
    pub const fn base_kind(&self) -> BaseKind {
        match self.kind {
            ThingKind::Entity => BaseKind::Entity,
            ThingKind::Relation => BaseKind::Relation,
            ThingKind::Attribute(_) => BaseKind::Attribute,
        }
    }

    /// The attribute value, if this is an attribute.
    #[must_use]
    pub const fn value(&self) -> Option<&Value> {
        match &self.kind {
            ThingKind::Attribute(value) => Some(value),
            _ => None,
        }
    }

    /// The attribute data type, if this is an attribute.
    #[must_use]
    pub fn data_type(&self) -> Option<DataType> {
        self.value().map(Value::data_type)
    }

    #[must_use]
    pub const fn is_relation(&self) -> bool {
        matches!(self.kind, ThingKind::Relation)
    }

    #[must_use]
    pub const fn is_attribute(&self) -> bool {
        matches!(self.kind, ThingKind::Attribute(_))
    }
}

impl fmt::Display for Thing {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ThingKind::Attribute(value) => {
                write!(f, "<{}, {}: {}>", self.type_label, self.id, value)
            }
            ThingKind::Entity | ThingKind::Relation => {
                write!(f, "<{}, {}>", self.type_label, self.id)
            }
        }
    }
}

// =============================================================================
// ROLES & REIFIED EDGES
// =============================================================================

/// A role type label, e.g. `employee`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Role(pub String);

impl Role {
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One role a roleplayer plays in a relation, as a node of its own.
///
/// These never exist in the data store; the builder creates them when
/// reifying relations into binary edges.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ReifiedEdge {
    pub relation: Thing,
    pub roleplayer: Thing,
    pub role: Role,
}

impl ReifiedEdge {
    #[must_use]
    pub fn new(relation: Thing, roleplayer: Thing, role: Role) -> Self {
        Self {
            relation,
            roleplayer,
            role,
        }
    }

    /// A reified edge is typed by its role.
    #[must_use]
    pub fn type_label(&self) -> &str {
        self.role.as_str()
    }
}

impl fmt::Display for ReifiedEdge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}: {} -> {}>", self.role, self.relation, self.roleplayer)
    }
}

// =============================================================================
// CONCEPT (graph node payload) & NODE KEY (graph identity)
// =============================================================================

/// The payload of a concept graph node.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Concept {
    Thing(Thing),
    Edge(ReifiedEdge),
}

impl Concept {
    #[must_use]
    pub fn type_label(&self) -> &str {
        match self {
            Self::Thing(thing) => &thing.type_label,
            Self::Edge(edge) => edge.type_label(),
        }
    }

    /// The identity key used to decide whether two nodes are the same.
    #[must_use]
    pub fn key(&self) -> NodeKey {
        match self {
            Self::Thing(thing) => NodeKey::Thing(thing.id.clone()),
            Self::Edge(edge) => NodeKey::Edge {
                relation: edge.relation.id.clone(),
                roleplayer: edge.roleplayer.id.clone(),
                role: edge.role.clone(),
            },
        }
    }

    #[must_use]
    pub const fn as_thing(&self) -> Option<&Thing> {
        match self {
            Self::Thing(thing) => Some(thing),
            Self::Edge(_) => None,
        }
    }
}

impl fmt::Display for Concept {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Thing(thing) => thing.fmt(f),
            Self::Edge(edge) => edge.fmt(f),
        }
    }
}

impl From<Thing> for Concept {
    fn from(thing: Thing) -> Self {
        Self::Thing(thing)
    }
}

impl From<ReifiedEdge> for Concept {
    fn from(edge: ReifiedEdge) -> Self {
        Self::Edge(edge)
    }
}

/// Explicit identity key of a concept graph node.
///
/// Records are identified by their store id; reified edges by the ids of the
/// relation and roleplayer plus the role.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NodeKey {
    Thing(String),
    Edge {
        relation: String,
        roleplayer: String,
        role: Role,
    },
}

// =============================================================================
// PROPERTIES
// =============================================================================

/// The property dictionary attached to a node or edge.
///
/// Ordered by key, so two dictionaries with the same content always compare,
/// hash, print and serialize identically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Properties(BTreeMap<String, Value>);

impl Properties {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.0.insert(key.into(), value.into());
        self
    }

    /// Insert a property, returning the previous value for the key.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.0.insert(key.into(), value.into())
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// The `type` property, if present and a string.
    #[must_use]
    pub fn type_label(&self) -> Option<&str> {
        self.get(crate::primitives::TYPE_KEY)
            .and_then(Value::as_str)
    }

    /// Copy every entry of `other` into `self`; entries of `other` win.
    pub fn extend(&mut self, other: &Self) {
        for (key, value) in other {
            self.0.insert(key.clone(), value.clone());
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<'a> IntoIterator for &'a Properties {
    type Item = (&'a String, &'a Value);
    type IntoIter = std::collections::btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Properties {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(key, value)| (key.into(), value.into()))
                .collect(),
        )
    }
}

/// Dictionary-literal form, e.g. `{'input': 1, 'type': 'person'}`.
impl fmt::Display for Properties {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, (key, value)) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            match value {
                Value::Long(_) | Value::Double(_) | Value::Boolean(_) => {
                    write!(f, "'{key}': {value}")?;
                }
                Value::Date(_) | Value::String(_) => write!(f, "'{key}': '{value}'")?,
            }
        }
        f.write_str("}")
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// What a merge conflict is about.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConflictSubject {
    /// A node, by its display form.
    Node(String),
    /// An edge, by its endpoints' display forms and parallel-edge key.
    Edge {
        sender: String,
        receiver: String,
        key: usize,
    },
}

impl fmt::Display for ConflictSubject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Node(node) => write!(f, "node {node}"),
            Self::Edge {
                sender,
                receiver,
                key,
            } => write!(f, "edge ({sender}, {receiver}, {key})"),
        }
    }
}

/// Errors that can occur while assembling concept graphs.
///
/// - No silent failures, no partial results
/// - Every message names the offending variable, node or edge
/// - Mismatches print both sides verbatim
#[derive(Debug, Error)]
pub enum KgraphError {
    /// The bindings and the variable graph disagree on the set of variables.
    #[error(
        "The variables in the variable graph must match those in the bindings\n\
         In the variable graph but not in the bindings: {unbound:?}\n\
         In the bindings but not in the variable graph: {extraneous:?}"
    )]
    VariableSetMismatch {
        unbound: Vec<String>,
        extraneous: Vec<String>,
    },

    /// An edge starts at a node that cannot originate it.
    #[error(
        "An edge in the variable graph originates from a non-relation: \
         ${sender} ({sender_kind}) -[{edge_type}]-> ${receiver}"
    )]
    InvalidEdgeOrigin {
        sender: String,
        receiver: String,
        edge_type: String,
        sender_kind: BaseKind,
    },

    /// A role edge was given to the direct (non-reified) builder.
    #[error(
        "Role edge ${sender} -[{role}]-> ${receiver} cannot be represented in direct mode, \
         only `has` edges are allowed"
    )]
    RoleEdgeInDirectMode {
        sender: String,
        receiver: String,
        role: String,
    },

    /// The record's base kind is not entity, relation or attribute.
    #[error("Unsupported base kind '{kind}' for concept {id}")]
    UnsupportedBaseKind { id: String, kind: String },

    /// The attribute's data type is outside the closed set.
    #[error("Unsupported data type '{data_type}' for attribute {id}")]
    UnsupportedDataType { id: String, data_type: String },

    /// The attribute's value is missing or disagrees with its data type.
    #[error("Invalid value for attribute {id} of data type {data_type}: {reason}")]
    InvalidAttributeValue {
        id: String,
        data_type: DataType,
        reason: String,
    },

    /// The variable named as a relation is bound to something else.
    #[error("${variable} is bound to {thing}, which is not a relation")]
    NotARelation { variable: String, thing: String },

    /// The variable named as an attribute is bound to something else.
    #[error("${variable} is bound to {thing}, which is not an attribute")]
    NotAnAttribute { variable: String, thing: String },

    /// A variable was named that has no binding.
    #[error("Variable ${variable} is not bound")]
    UnknownVariable { variable: String },

    /// Two descriptions of the same node or edge carry different properties.
    #[error(
        "Found non-matching properties for {subject} between {left_source} and {right_source}:\n\
         In {left_source}: {left}\n\
         In {right_source}: {right}"
    )]
    MergeConflict {
        subject: ConflictSubject,
        left_source: String,
        right_source: String,
        left: Properties,
        right: Properties,
    },

    /// Two different records claim the same store id.
    #[error("Two different records share the id {id}: {existing} and {incoming}")]
    IdentityConflict {
        id: String,
        existing: String,
        incoming: String,
    },

    /// The query-execution collaborator failed.
    #[error("Lookup failed for query \"{query}\": {message}")]
    Lookup { query: String, message: String },

    /// None of an example's queries returned any answer.
    #[error(
        "The graph could not be created, since none of these queries returned results: {queries:?}"
    )]
    NoResults { queries: Vec<String> },

    /// An error raised while processing the answers of one query.
    #[error("{source}\nEncountered processing query:\n \"{query}\"")]
    InQuery {
        query: String,
        #[source]
        source: Box<KgraphError>,
    },

    /// A merge was requested over zero graphs.
    #[error("No graphs to merge")]
    NothingToMerge,

    /// A query has no declared variable graph and its source cannot discover one.
    #[error("Query '{name}' has no variable graph and its answers cannot be discovered")]
    MissingVariableGraph { name: String },

    /// A serialization or deserialization error occurred.
    #[error("Serialization error: {0}")]
    SerializationError(String),

    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    IoError(String),

    /// A configuration file could not be used.
    #[error("Configuration error: {0}")]
    ConfigError(String),
}

// =============================================================================
// TESTS
// =============================================================================

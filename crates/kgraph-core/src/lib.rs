//! # kgraph-core
//!
//! Assembles typed concept graphs from the answers of independent queries.
//!
//! The pipeline for one example:
//! - `extract`: answer handles -> typed `Thing` records
//! - `convert`: variable graph + records -> concept graph (direct or reified)
//! - `merge`: per-query concept graphs -> one multigraph, conflicts are errors
//! - `index`: concept graph -> integer-keyed graph for a numeric pipeline
//!
//! `discovery` and `roles` derive a variable graph when an answer comes
//! without one; `assemble` drives the whole pipeline over named sub-queries.
//!
//! ## Architectural Constraints
//!
//! - Pure and synchronous: no async, no network, no file I/O
//! - Queries are never executed here; they go through `AnswerSource` and
//!   `QueryExecutor`, implemented by the caller
//! - Deterministic: ordered maps and insertion-ordered arenas only

// =============================================================================
// MODULES
// =============================================================================

pub mod assemble;
pub mod convert;
pub mod discovery;
pub mod extract;
pub mod formats;
pub mod graph;
pub mod index;
pub mod merge;
pub mod primitives;
pub mod roles;
pub mod types;
pub mod variable_graph;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    BaseKind, Concept, ConflictSubject, DataType, KgraphError, NodeKey, Properties, ReifiedEdge,
    Role, Thing, ThingKind, Value,
};

// =============================================================================
// RE-EXPORTS: Pipeline
// =============================================================================

pub use assemble::{AnswerSource, QueryHandle, build_graph_from_queries};
pub use convert::{ConversionMode, concept_dict_to_graph};
pub use discovery::{
    QueryExecutor, attribute_owner_query, discover_specific_roles, discover_variable_graph,
    get_attribute_owners, get_roleplayers, roleplayer_query,
};
pub use extract::{Answer, ConceptDict, ConceptHandle, concept_dict_from_answer, thing_from_handle};
pub use graph::{ConceptGraph, Edge, Insertion, Node, NodeIndex};
pub use index::{IndexedEdge, IndexedGraph, IndexedNode, concept_graph_to_indexed_graph};
pub use merge::{combine_2_graphs, combine_graphs, merge_into};
pub use roles::{RoleHierarchy, RoleTree, find_specific_roles};
pub use variable_graph::{SolutionFlag, VariableEdge, VariableGraph};

// =============================================================================
// RE-EXPORTS: Formats (from formats module)
// =============================================================================

pub use formats::{FormatHeader, indexed_graph_from_bytes, indexed_graph_to_bytes};

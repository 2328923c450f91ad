//! # Example Assembly
//!
//! Builds the concept graph of one example from several named sub-queries.
//!
//! For every query: fetch its answers, build one graph per answer, and merge
//! them into the query's graph. The query graphs are then merged into the
//! example's graph. Errors raised while handling a query are wrapped with the
//! query text.
//!
//! A query declared without a variable graph has one discovered for each of
//! its answers, since different answers may relate their records differently.

use crate::convert::{ConversionMode, concept_dict_to_graph};
use crate::extract::{Answer, ConceptDict, ConceptHandle, concept_dict_from_answer};
use crate::graph::ConceptGraph;
use crate::merge::{combine_graphs, merge_into};
use crate::types::KgraphError;
use crate::variable_graph::VariableGraph;
use std::borrow::Cow;
use tracing::{debug, warn};

/// One named sub-query of an example.
#[derive(Debug, Clone)]
pub struct QueryHandle {
    /// Name of the query within its example, and of its graph in diagnostics.
    pub name: String,
    /// Query text.
    pub query: String,
    /// Shape of every answer of the query; `None` to discover it per answer.
    pub variable_graph: Option<VariableGraph>,
    /// Use at most this many answers.
    pub limit: Option<usize>,
}

impl QueryHandle {
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        query: impl Into<String>,
        variable_graph: VariableGraph,
    ) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            variable_graph: Some(variable_graph),
            limit: None,
        }
    }

    /// A query whose answers each get a discovered variable graph.
    #[must_use]
    pub fn discovered(name: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            query: query.into(),
            variable_graph: None,
            limit: None,
        }
    }

    #[must_use]
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Produces the answers of a query.
pub trait AnswerSource {
    type Handle: ConceptHandle;

    /// Answers of `handle`'s query.
    fn answers(&self, handle: &QueryHandle) -> Result<Vec<Answer<Self::Handle>>, KgraphError>;

    /// Variable graph for one answer of a query declared without one.
    fn discover(
        &self,
        handle: &QueryHandle,
        _bindings: &ConceptDict,
    ) -> Result<VariableGraph, KgraphError> {
        Err(KgraphError::MissingVariableGraph {
            name: handle.name.clone(),
        })
    }
}

/// Build and merge the graphs of every query of one example.
pub fn build_graph_from_queries<S: AnswerSource + ?Sized>(
    handles: &[QueryHandle],
    source: &S,
    mode: ConversionMode,
) -> Result<ConceptGraph, KgraphError> {
    let mut query_graphs = Vec::with_capacity(handles.len());

    for handle in handles {
        let in_query = |err: KgraphError| KgraphError::InQuery {
            query: handle.query.clone(),
            source: Box::new(err),
        };

        let answers = source.answers(handle).map_err(in_query)?;
        let limit = handle.limit.unwrap_or(usize::MAX);
        let mut query_graph: Option<ConceptGraph> = None;
        let mut used = 0usize;
        for (position, answer) in answers.iter().take(limit).enumerate() {
            let concept_dict = concept_dict_from_answer(answer).map_err(in_query)?;
            let variable_graph = match &handle.variable_graph {
                Some(declared) => Cow::Borrowed(declared),
                None => Cow::Owned(source.discover(handle, &concept_dict).map_err(in_query)?),
            };
            let mut graph = concept_dict_to_graph(&concept_dict, &variable_graph, mode)
                .map_err(in_query)?;
            graph.rename(format!("{}#{}", handle.name, position + 1));

            match query_graph.as_mut() {
                Some(acc) => merge_into(acc, &graph).map_err(in_query)?,
                None => query_graph = Some(graph),
            }
            used += 1;
        }

        let Some(mut query_graph) = query_graph else {
            warn!(query = %handle.query, name = %handle.name, "Query returned no results");
            continue;
        };

        debug!(name = %handle.name, answers = used, "Built query graph");
        query_graph.rename(handle.name.as_str());
        query_graphs.push(query_graph);
    }

    if query_graphs.is_empty() {
        return Err(KgraphError::NoResults {
            queries: handles.iter().map(|h| h.query.clone()).collect(),
        });
    }

    combine_graphs(query_graphs)
}

// =============================================================================
// TESTS
// =============================================================================

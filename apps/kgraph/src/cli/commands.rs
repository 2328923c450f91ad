//! # CLI Command Implementations
//!
//! This module contains the actual implementations of CLI commands.

use crate::config::OutputFormat;
use crate::input::RecordedExample;
use crate::output::{indexed_graph_to_json, type_counts};
use kgraph_core::primitives::MAX_PAYLOAD_SIZE;
use kgraph_core::{
    ConversionMode, IndexedGraph, KgraphError, build_graph_from_queries,
    concept_graph_to_indexed_graph, indexed_graph_from_bytes, indexed_graph_to_bytes,
};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

// =============================================================================
// FILE SIZE LIMITS
// =============================================================================

/// Maximum size of a recorded example (100 MB).
const MAX_EXAMPLE_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// Validate an input path and its size before reading.
///
/// Canonicalizes the path (resolving `..` and symlinks) and requires a
/// regular file no larger than `max_size`.
fn validate_input_file(path: &Path, max_size: u64) -> Result<PathBuf, KgraphError> {
    let canonical = path.canonicalize().map_err(|e| {
        KgraphError::IoError(format!("Invalid file path '{}': {}", path.display(), e))
    })?;

    if !canonical.is_file() {
        return Err(KgraphError::IoError(format!(
            "Path '{}' is not a regular file",
            path.display()
        )));
    }

    let metadata = std::fs::metadata(&canonical)
        .map_err(|e| KgraphError::IoError(format!("Cannot read file metadata: {}", e)))?;
    if metadata.len() > max_size {
        return Err(KgraphError::IoError(format!(
            "File size {} bytes exceeds maximum allowed {} bytes",
            metadata.len(),
            max_size
        )));
    }

    Ok(canonical)
}

/// Validate an output path: its parent must be an existing directory.
fn validate_output_path(path: &Path) -> Result<PathBuf, KgraphError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let canonical_parent = parent.canonicalize().map_err(|e| {
        KgraphError::IoError(format!(
            "Invalid output directory '{}': {}",
            parent.display(),
            e
        ))
    })?;

    if !canonical_parent.is_dir() {
        return Err(KgraphError::IoError(format!(
            "Output directory '{}' is not a valid directory",
            parent.display()
        )));
    }

    let filename = path
        .file_name()
        .ok_or_else(|| KgraphError::IoError("Output path has no filename".to_string()))?;

    Ok(canonical_parent.join(filename))
}

fn read_file(path: &Path, max_size: u64) -> Result<Vec<u8>, KgraphError> {
    let validated = validate_input_file(path, max_size)?;
    std::fs::read(&validated)
        .map_err(|e| KgraphError::IoError(format!("Read '{}': {}", path.display(), e)))
}

fn to_pretty_json(value: &serde_json::Value) -> Result<String, KgraphError> {
    serde_json::to_string_pretty(value).map_err(|e| KgraphError::SerializationError(e.to_string()))
}

// =============================================================================
// BUILD COMMAND
// =============================================================================

/// Settings for `build`, after merging flags over the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildOptions {
    pub mode: ConversionMode,
    pub format: OutputFormat,
    pub reverse_edges: bool,
    pub relabel: BTreeMap<String, String>,
}

/// Run the pipeline over a recorded example.
pub fn build_indexed_graph(
    example: &RecordedExample,
    options: &BuildOptions,
) -> Result<IndexedGraph, KgraphError> {
    let handles = example.query_handles()?;
    let mut graph = build_graph_from_queries(&handles, example, options.mode)?;

    if !options.relabel.is_empty() {
        graph.relabel_types(&options.relabel);
    }

    let indexed = concept_graph_to_indexed_graph(&graph);
    Ok(if options.reverse_edges {
        indexed.with_reversed_edges()
    } else {
        indexed
    })
}

/// Build the indexed graph of a recorded example and write it out.
pub fn cmd_build(
    input: &Path,
    output: Option<&Path>,
    options: &BuildOptions,
    json_mode: bool,
) -> Result<(), KgraphError> {
    tracing::info!(input = %input.display(), mode = %options.mode, "Building example");

    let example = RecordedExample::from_json(&read_file(input, MAX_EXAMPLE_FILE_SIZE)?)?;
    let fallback_name = input
        .file_stem()
        .map(|stem| stem.to_string_lossy().into_owned())
        .unwrap_or_default();

    let mut indexed = build_indexed_graph(&example, options)?;
    indexed.name = example.display_name(&fallback_name).to_string();

    let Some(output) = output else {
        if options.format == OutputFormat::Binary {
            return Err(KgraphError::IoError(
                "Binary output needs an output file (--output)".to_string(),
            ));
        }
        println!("{}", to_pretty_json(&indexed_graph_to_json(&indexed))?);
        return Ok(());
    };

    let validated_output = validate_output_path(output)?;
    let data = match options.format {
        OutputFormat::Json => to_pretty_json(&indexed_graph_to_json(&indexed))?.into_bytes(),
        OutputFormat::Binary => indexed_graph_to_bytes(&indexed)?,
    };
    std::fs::write(&validated_output, &data)
        .map_err(|e| KgraphError::IoError(format!("Write file: {}", e)))?;

    if json_mode {
        let summary = serde_json::json!({
            "name": indexed.name,
            "nodes": indexed.node_count(),
            "edges": indexed.edge_count(),
            "bytes": data.len(),
            "output": validated_output.to_string_lossy(),
        });
        println!("{}", to_pretty_json(&summary)?);
    } else {
        println!(
            "Built '{}': {} nodes, {} edges",
            indexed.name,
            indexed.node_count(),
            indexed.edge_count()
        );
        println!("Wrote {} bytes to {:?}", data.len(), validated_output);
    }

    Ok(())
}

// =============================================================================
// INSPECT COMMAND
// =============================================================================

/// Summarize a binary indexed graph.
pub fn cmd_inspect(input: &Path, json_mode: bool) -> Result<(), KgraphError> {
    let bytes = read_file(input, MAX_PAYLOAD_SIZE as u64)?;
    let graph = indexed_graph_from_bytes(&bytes)?;
    let (node_types, edge_types) = type_counts(&graph);

    if json_mode {
        let summary = serde_json::json!({
            "name": graph.name,
            "nodes": graph.node_count(),
            "edges": graph.edge_count(),
            "node_types": node_types,
            "edge_types": edge_types,
        });
        println!("{}", to_pretty_json(&summary)?);
        return Ok(());
    }

    println!("Graph: {}", graph.name);
    println!("  Nodes: {}", graph.node_count());
    for (label, count) in &node_types {
        println!("    {label}: {count}");
    }
    println!("  Edges: {}", graph.edge_count());
    for (label, count) in &edge_types {
        println!("    {label}: {count}");
    }

    Ok(())
}

//! End-to-end tests for the kgraph CLI: recorded example in, indexed graph out.

use clap::Parser;
use kgraph::cli::{self, BuildOptions, Cli, build_indexed_graph};
use kgraph::config::OutputFormat;
use kgraph::input::RecordedExample;
use kgraph_core::{ConversionMode, KgraphError, indexed_graph_from_bytes};
use std::collections::BTreeMap;
use std::path::Path;

// =============================================================================
// FIXTURES
// =============================================================================

const EXAMPLE: &str = r#"{
  "name": "employment-1",
  "queries": [
    {
      "name": "positive",
      "query": "match $y(employee: $x) isa employment; $x has name $n; get;",
      "variable_graph": {
        "vars": [
          { "name": "y", "metadata": { "input": 1, "solution": 0 } },
          { "name": "x", "metadata": { "input": 1, "solution": 0 } },
          { "name": "n", "metadata": { "input": 1, "solution": 0 } }
        ],
        "edges": [
          { "sender": "y", "receiver": "x", "type": "employee",
            "metadata": { "input": 1, "solution": 0 } },
          { "sender": "x", "receiver": "n", "type": "has",
            "metadata": { "input": 1, "solution": 0 } }
        ]
      },
      "answers": [
        {
          "y": { "id": "V567", "type": "employment", "base_type": "RELATION" },
          "x": { "id": "V123", "type": "person", "base_type": "ENTITY" },
          "n": { "id": "V1234", "type": "name", "base_type": "ATTRIBUTE",
                 "data_type": "STRING", "value": "Bob" }
        }
      ]
    },
    {
      "name": "empty",
      "query": "match $x isa company; get;",
      "answers": []
    }
  ]
}"#;

const DISCOVERED: &str = r#"{
  "queries": [
    {
      "name": "ownership",
      "query": "match $x isa person, has name $n; get;",
      "answers": [
        {
          "x": { "id": "V123", "type": "person", "base_type": "ENTITY" },
          "n": { "id": "V1234", "type": "name", "base_type": "ATTRIBUTE",
                 "data_type": "STRING", "value": "Bob" }
        }
      ]
    }
  ],
  "lookups": {
    "things": {
      "match $x has name \"Bob\"; $x id V123; get;": [
        { "id": "V123", "type": "person", "base_type": "ENTITY" }
      ]
    }
  }
}"#;

fn options(mode: ConversionMode) -> BuildOptions {
    BuildOptions {
        mode,
        format: OutputFormat::Json,
        reverse_edges: false,
        relabel: BTreeMap::new(),
    }
}

fn write(dir: &Path, name: &str, contents: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, contents).expect("write fixture");
    path
}

fn run(args: &[&str]) -> Result<(), KgraphError> {
    cli::execute(Cli::parse_from(args))
}

// =============================================================================
// PIPELINE
// =============================================================================

#[test]
fn math_mode_reifies_role_edges() {
    let example = RecordedExample::from_json(EXAMPLE.as_bytes()).expect("parse");
    let graph = build_indexed_graph(&example, &options(ConversionMode::Math)).expect("build");

    assert_eq!(
        graph.node_types(),
        vec!["employment", "person", "name", "employee"]
    );
    assert_eq!(graph.edge_types(), vec!["relates", "plays", "has"]);
}

#[test]
fn direct_mode_rejects_role_edges() {
    let example = RecordedExample::from_json(EXAMPLE.as_bytes()).expect("parse");
    let err = build_indexed_graph(&example, &options(ConversionMode::Direct))
        .expect_err("role edges need math mode");

    assert!(matches!(err, KgraphError::InQuery { ref query, .. } if query.contains("employee")));
}

#[test]
fn relabel_and_reverse_edges() {
    let example = RecordedExample::from_json(EXAMPLE.as_bytes()).expect("parse");
    let mut opts = options(ConversionMode::Math);
    opts.relabel.insert("person".to_string(), "agent".to_string());
    opts.reverse_edges = true;

    let graph = build_indexed_graph(&example, &opts).expect("build");

    assert!(graph.node_types().contains(&"agent"));
    assert!(!graph.node_types().contains(&"person"));
    assert_eq!(graph.edge_count(), 6);
}

#[test]
fn missing_variable_graph_is_discovered() {
    let example = RecordedExample::from_json(DISCOVERED.as_bytes()).expect("parse");
    let graph = build_indexed_graph(&example, &options(ConversionMode::Direct)).expect("build");

    assert_eq!(graph.node_types(), vec!["name", "person"]);
    assert_eq!(graph.edge_types(), vec!["has"]);
}

#[test]
fn unknown_fields_are_rejected() {
    let err = RecordedExample::from_json(br#"{ "queries": [], "extra": 1 }"#)
        .expect_err("unknown field");
    assert!(matches!(err, KgraphError::SerializationError(_)));
}

// =============================================================================
// COMMANDS
// =============================================================================

#[test]
fn build_writes_binary_that_inspect_reads() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "example.json", EXAMPLE);
    let output = dir.path().join("example.kgix");

    run(&[
        "kgraph",
        "--quiet",
        "build",
        "-i",
        input.to_str().expect("utf-8 path"),
        "-o",
        output.to_str().expect("utf-8 path"),
        "-t",
        "binary",
    ])
    .expect("build");

    let bytes = std::fs::read(&output).expect("read output");
    let graph = indexed_graph_from_bytes(&bytes).expect("decode");
    assert_eq!(graph.name, "employment-1");
    assert_eq!(graph.node_count(), 4);

    run(&["kgraph", "--json-mode", "inspect", "-i", output.to_str().expect("utf-8 path")])
        .expect("inspect");
}

#[test]
fn config_file_sets_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "example.json", EXAMPLE);
    let config = write(
        dir.path(),
        "kgraph.toml",
        "mode = \"math\"\nreverse_edges = true\n\n[relabel]\nname = \"label\"\n",
    );
    let output = dir.path().join("graph.json");

    run(&[
        "kgraph",
        "--quiet",
        "--config",
        config.to_str().expect("utf-8 path"),
        "build",
        "-i",
        input.to_str().expect("utf-8 path"),
        "-o",
        output.to_str().expect("utf-8 path"),
    ])
    .expect("build");

    let text = std::fs::read_to_string(&output).expect("read output");
    let json: serde_json::Value = serde_json::from_str(&text).expect("json output");
    assert_eq!(json["name"], "employment-1");
    assert_eq!(json["nodes"][2]["type"], "label");
    assert_eq!(json["edges"].as_array().map(Vec::len), Some(6));
}

#[test]
fn binary_to_stdout_is_refused() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "example.json", EXAMPLE);

    let err = run(&[
        "kgraph",
        "--quiet",
        "build",
        "-i",
        input.to_str().expect("utf-8 path"),
        "-t",
        "binary",
    ])
    .expect_err("binary needs a file");
    assert!(matches!(err, KgraphError::IoError(_)));
}

#[test]
fn inspect_rejects_json_input() {
    let dir = tempfile::tempdir().expect("tempdir");
    let input = write(dir.path(), "example.json", EXAMPLE);

    let err = run(&["kgraph", "inspect", "-i", input.to_str().expect("utf-8 path")])
        .expect_err("not a binary graph");
    assert!(matches!(err, KgraphError::SerializationError(_)));
}

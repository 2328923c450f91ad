//! # Fixed Vocabulary
//!
//! Hardcoded property keys, edge labels and format constants for kgraph.
//!
//! These are compiled into the binary and shared by every pipeline stage, so
//! that the builder, the merger and the indexer agree on the exact spelling of
//! every key they read or write.

// =============================================================================
// PROPERTY KEYS
// =============================================================================

/// Node property holding the node's type label.
pub const TYPE_KEY: &str = "type";

/// Attribute node property holding the attribute's data type.
pub const DATATYPE_KEY: &str = "datatype";

/// Attribute node property holding the attribute's value.
pub const VALUE_KEY: &str = "value";

// =============================================================================
// EDGE LABELS
// =============================================================================

/// Ownership edge: owner -> attribute.
pub const HAS: &str = "has";

/// Reified mode: relation -> reified role edge.
pub const RELATES: &str = "relates";

/// Reified mode: roleplayer -> reified role edge.
pub const PLAYS: &str = "plays";

// =============================================================================
// SOLUTION-FLAG METADATA
// =============================================================================

/// Metadata key: element is part of the model's input.
pub const INPUT_KEY: &str = "input";

/// Metadata key: element's learning target.
pub const SOLUTION_KEY: &str = "solution";

// =============================================================================
// TEXT FORMATS
// =============================================================================

/// Rendering of `Value::Date` in messages, properties and JSON output.
pub const DATE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.f";

// =============================================================================
// BINARY FORMAT
// =============================================================================

/// Magic bytes for the indexed-graph binary format header.
///
/// - File Header = Magic Bytes ("KGIX") + Version (u8) before payload.
pub const MAGIC_BYTES: &[u8; 4] = b"KGIX";

/// Current serialization format version.
///
/// Increment this when making breaking changes to the serialization format.
pub const FORMAT_VERSION: u8 = 1;

/// Maximum payload size accepted when decoding an indexed graph.
///
/// Checked before deserialization so corrupt input cannot force a huge
/// allocation.
pub const MAX_PAYLOAD_SIZE: usize = 500 * 1024 * 1024;

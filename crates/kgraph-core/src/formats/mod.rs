//! # Formats
//!
//! Byte-level encodings of indexed graphs. File I/O stays in the app layer.

pub mod persistence;

pub use persistence::{FormatHeader, indexed_graph_from_bytes, indexed_graph_to_bytes};

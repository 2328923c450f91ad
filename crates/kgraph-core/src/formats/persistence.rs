//! # Hand-off Format
//!
//! Binary encoding of an `IndexedGraph` for the numeric pipeline.
//!
//! Layout: Header (5 bytes) + postcard-serialized graph.
//! - 4 bytes: Magic ("KGIX")
//! - 1 byte: Version
//!
//! Size and header are checked before the payload is decoded, so corrupt or
//! hostile input is rejected without allocating for it.

use crate::index::IndexedGraph;
use crate::primitives::{FORMAT_VERSION, MAGIC_BYTES, MAX_PAYLOAD_SIZE};
use crate::types::KgraphError;

const HEADER_LEN: usize = 5;

// =============================================================================
// HEADER
// =============================================================================

/// The header preceding every encoded graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatHeader {
    pub magic: [u8; 4],
    pub version: u8,
}

impl FormatHeader {
    /// Header for the current format version.
    #[must_use]
    pub fn current() -> Self {
        Self {
            magic: *MAGIC_BYTES,
            version: FORMAT_VERSION,
        }
    }

    pub fn validate(&self) -> Result<(), KgraphError> {
        if &self.magic != MAGIC_BYTES {
            return Err(KgraphError::SerializationError(
                "Not an indexed graph: bad magic bytes".to_string(),
            ));
        }
        if self.version != FORMAT_VERSION {
            return Err(KgraphError::SerializationError(format!(
                "Unsupported format version {} (expected {})",
                self.version, FORMAT_VERSION
            )));
        }
        Ok(())
    }

    #[must_use]
    pub fn to_bytes(&self) -> [u8; HEADER_LEN] {
        let mut bytes = [0u8; HEADER_LEN];
        bytes[..4].copy_from_slice(&self.magic);
        bytes[4] = self.version;
        bytes
    }

    pub fn from_bytes(bytes: &[u8]) -> Result<Self, KgraphError> {
        let Some(header) = bytes.get(..HEADER_LEN) else {
            return Err(KgraphError::SerializationError(format!(
                "Data too short: {} bytes, header needs {HEADER_LEN}",
                bytes.len()
            )));
        };
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&header[..4]);
        Ok(Self {
            magic,
            version: header[4],
        })
    }
}

// =============================================================================
// ENCODE / DECODE
// =============================================================================

/// Encode a graph (header + payload). Pure; no file I/O.
pub fn indexed_graph_to_bytes(graph: &IndexedGraph) -> Result<Vec<u8>, KgraphError> {
    let payload =
        postcard::to_stdvec(graph).map_err(|e| KgraphError::SerializationError(e.to_string()))?;

    let mut bytes = Vec::with_capacity(HEADER_LEN + payload.len());
    bytes.extend_from_slice(&FormatHeader::current().to_bytes());
    bytes.extend_from_slice(&payload);
    Ok(bytes)
}

/// Decode a graph produced by `indexed_graph_to_bytes`.
pub fn indexed_graph_from_bytes(bytes: &[u8]) -> Result<IndexedGraph, KgraphError> {
    if bytes.len() > MAX_PAYLOAD_SIZE {
        return Err(KgraphError::SerializationError(format!(
            "Data size {} bytes exceeds maximum allowed {} bytes",
            bytes.len(),
            MAX_PAYLOAD_SIZE
        )));
    }

    FormatHeader::from_bytes(bytes)?.validate()?;

    postcard::from_bytes(&bytes[HEADER_LEN..]).map_err(|e| {
        KgraphError::SerializationError(format!("Failed to decode indexed graph: {e}"))
    })
}

// =============================================================================
// TESTS
// =============================================================================

//! # Configuration File
//!
//! Optional TOML settings for `kgraph build`. Command-line flags override
//! every value read here.
//!
//! ```toml
//! mode = "math"          # or "direct"
//! reverse_edges = true
//! format = "binary"      # or "json"
//!
//! [relabel]
//! candidate-diagnosis = "diagnosis"
//! ```

use kgraph_core::{ConversionMode, KgraphError};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::Path;

/// Maximum config file size (1 MB).
const MAX_CONFIG_FILE_SIZE: u64 = 1024 * 1024;

/// Encoding of the indexed graph written by `build`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// Header + postcard payload.
    Binary,
}

/// Settings read from the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub mode: ConversionMode,
    pub reverse_edges: bool,
    pub format: OutputFormat,
    /// Type label rewrites applied before indexing.
    pub relabel: BTreeMap<String, String>,
}

impl Config {
    pub fn from_toml_str(text: &str) -> Result<Self, KgraphError> {
        toml::from_str(text).map_err(|e| KgraphError::ConfigError(e.to_string()))
    }

    pub fn load(path: &Path) -> Result<Self, KgraphError> {
        let metadata = std::fs::metadata(path).map_err(|e| {
            KgraphError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        if metadata.len() > MAX_CONFIG_FILE_SIZE {
            return Err(KgraphError::ConfigError(format!(
                "'{}' is {} bytes, maximum is {}",
                path.display(),
                metadata.len(),
                MAX_CONFIG_FILE_SIZE
            )));
        }

        let text = std::fs::read_to_string(path).map_err(|e| {
            KgraphError::ConfigError(format!("Cannot read '{}': {}", path.display(), e))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), ?config, "Loaded config");
        Ok(config)
    }
}

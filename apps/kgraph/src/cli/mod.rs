//! # kgraph CLI Module
//!
//! This module implements the command-line interface for kgraph.
//!
//! ## Available Commands
//!
//! - `build` - Assemble, index and write the graph of a recorded example
//! - `inspect` - Summarize an indexed graph written by `build`

mod commands;

use crate::config::{Config, OutputFormat};
use clap::{Parser, Subcommand, ValueEnum};
use kgraph_core::{ConversionMode, KgraphError};
use std::path::PathBuf;

pub use commands::*;

// =============================================================================
// CLI STRUCTURE
// =============================================================================

/// kgraph - concept graph assembly
///
/// Builds one typed multigraph per example from the answers of several
/// sub-queries, reifies relations and indexes the result.
#[derive(Parser, Debug)]
#[command(name = "kgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress banner output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Output in JSON format (for programmatic access)
    #[arg(long, global = true)]
    pub json_mode: bool,

    /// Path to a TOML config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Conversion mode flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ModeArg {
    /// Keep only `has` edges
    Direct,
    /// Reify role edges into role nodes
    Math,
}

impl From<ModeArg> for ConversionMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Direct => Self::Direct,
            ModeArg::Math => Self::Math,
        }
    }
}

/// Available CLI commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Build the indexed graph of a recorded example
    Build {
        /// Path to the example (JSON)
        #[arg(short, long)]
        input: PathBuf,

        /// Output file; JSON goes to stdout when omitted
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short = 't', long, value_enum)]
        format: Option<OutputFormat>,

        /// Conversion mode
        #[arg(short, long, value_enum)]
        mode: Option<ModeArg>,

        /// Also add every edge in reverse
        #[arg(long)]
        reverse_edges: bool,
    },

    /// Summarize an indexed graph file
    Inspect {
        /// Path to the indexed graph (binary)
        #[arg(short, long)]
        input: PathBuf,
    },
}

// =============================================================================
// COMMAND EXECUTION
// =============================================================================

/// Execute the CLI with parsed arguments.
pub fn execute(cli: Cli) -> Result<(), KgraphError> {
    let json_mode = cli.json_mode;

    match cli.command {
        Commands::Build {
            input,
            output,
            format,
            mode,
            reverse_edges,
        } => {
            let config = match &cli.config {
                Some(path) => Config::load(path)?,
                None => Config::default(),
            };
            let options = BuildOptions {
                mode: mode.map_or(config.mode, ConversionMode::from),
                format: format.unwrap_or(config.format),
                reverse_edges: reverse_edges || config.reverse_edges,
                relabel: config.relabel,
            };
            cmd_build(&input, output.as_deref(), &options, json_mode)
        }
        Commands::Inspect { input } => cmd_inspect(&input, json_mode),
    }
}

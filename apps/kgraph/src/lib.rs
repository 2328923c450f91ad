//! # kgraph
//!
//! The command-line application around `kgraph-core`: recorded-example input,
//! TOML configuration, and JSON/binary output of indexed graphs.

pub mod cli;
pub mod config;
pub mod input;
pub mod output;

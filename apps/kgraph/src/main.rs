//! # kgraph - Concept Graph Assembly
//!
//! The main binary for kgraph.
//!
//! This application provides:
//! - Loading of recorded examples (sub-queries, variable graphs, answers)
//! - The build pipeline: extract -> convert -> merge -> index
//! - Output as JSON or the binary hand-off format
//!
//! ## Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────┐
//! │              apps/kgraph (THE BINARY)         │
//! │                                               │
//! │  ┌────────────┐  ┌────────────┐  ┌─────────┐  │
//! │  │    CLI     │  │   Config   │  │  Input  │  │
//! │  │   (clap)   │  │   (toml)   │  │ (json)  │  │
//! │  └─────┬──────┘  └─────┬──────┘  └────┬────┘  │
//! │        └───────────────┼──────────────┘       │
//! │                        ▼                      │
//! │                ┌───────────────┐              │
//! │                │  kgraph-core  │              │
//! │                │  (THE LOGIC)  │              │
//! │                └───────────────┘              │
//! └───────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```bash
//! kgraph build -i example.json -o example.kgix -t binary --mode math
//! kgraph --config kgraph.toml build -i example.json
//! kgraph inspect -i example.kgix
//! ```

use clap::Parser;
use kgraph::cli;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

// =============================================================================
// APPLICATION ENTRY POINT
// =============================================================================

fn main() {
    let cli = cli::Cli::parse();

    // KGRAPH_LOG_FORMAT=json enables machine-parseable output.
    let log_format = std::env::var("KGRAPH_LOG_FORMAT").unwrap_or_else(|_| "text".to_string());

    let default_filter = if cli.verbose {
        "kgraph=debug,kgraph_core=debug"
    } else {
        "kgraph=info,kgraph_core=warn"
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| default_filter.into());

    match log_format.as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(filter)
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .init();
        }
    }

    // Display startup banner
    if !cli.quiet && !cli.json_mode {
        print_banner();
    }

    // Execute command
    if let Err(e) = cli::execute(cli) {
        tracing::error!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Print the kgraph startup banner to stderr, leaving stdout for output.
fn print_banner() {
    eprintln!(
        "kgraph v{} - concept graph assembly",
        env!("CARGO_PKG_VERSION")
    );
}

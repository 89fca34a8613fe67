#![forbid(unsafe_code)]

//! Command-line front end for `parbreak`.
//!
//! Reads plain text (a file or stdin), splits it into paragraphs at blank
//! lines, justifies each paragraph in terminal cells, and prints either the
//! rendered rows or a JSON report of every line's ratio and fill.

pub mod cli;
pub mod error;
pub mod report;

pub use cli::{Cli, Preset, justify_text, run, run_from_env};
pub use error::{CliError, Result};

/// Install the stderr log subscriber. `RUST_LOG` overrides the default
/// `warn` level, so fallback warnings show up unless silenced.
pub fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    // A subscriber installed by an embedding process wins.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

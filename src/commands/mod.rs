//! Command handlers module.
//!
//! This module organizes the CLI command implementations into separate files:
//! - `completions.rs`: Shell completion scripts
//! - `config.rs`: Configuration display command
//! - `digest.rs`: One-off digest rendering (text or JSON report)
//! - `hook.rs`: Session-start hook event handler

mod completions;
mod config;
mod digest;
mod hook;

use std::path::Path;
use std::sync::Arc;

use clap::{Subcommand, ValueEnum};
use faildigest::sources::{InMemorySource, JsonFileSource, RunSource, parse_runs};

// Re-export command functions
pub use completions::cmd_completions;
pub use config::cmd_config;
pub use digest::{DigestArgs, cmd_digest};
pub use hook::cmd_hook;

/// Hook events.
#[derive(Subcommand, Clone, Copy, Debug)]
pub enum HookEvent {
    /// Session start hook.
    SessionStart,
}

impl HookEvent {
    /// Returns the hook event as a lowercase hyphenated string.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::SessionStart => "session-start",
        }
    }
}

/// Output format of the `digest` command.
#[derive(ValueEnum, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// The digest text as injected into a session.
    #[default]
    Text,
    /// A structured report including group fingerprints.
    Json,
}

/// Opens a run source for `path`; `-` reads runs from stdin once.
fn open_source(path: &Path) -> Result<Arc<dyn RunSource>, Box<dyn std::error::Error>> {
    if path == Path::new("-") {
        use std::io::Read;

        let mut contents = String::new();
        std::io::stdin().read_to_string(&mut contents)?;
        let runs = parse_runs(&contents);
        tracing::debug!(runs = runs.len(), "Read runs from stdin");
        return Ok(Arc::new(InMemorySource::new(runs)));
    }
    Ok(Arc::new(JsonFileSource::new(path)))
}

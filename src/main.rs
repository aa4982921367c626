//! Binary entry point for faildigest.
//!
//! This binary provides the CLI interface: the session-start hook, an
//! on-demand digest, configuration display and shell completions.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(missing_docs)]
// Allow print_stderr in main binary for CLI output
#![allow(clippy::print_stderr)]
#![allow(clippy::print_stdout)]
// Allow needless_pass_by_value for command functions
#![allow(clippy::needless_pass_by_value)]
// Allow unnecessary_wraps for consistent command function signatures
#![allow(clippy::unnecessary_wraps)]
// Allow multiple crate versions from transitive dependencies
#![allow(clippy::multiple_crate_versions)]

mod commands;

use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use commands::{DigestArgs, HookEvent, cmd_completions, cmd_config, cmd_digest, cmd_hook};
use faildigest::config::FaildigestConfig;
use faildigest::observability::{self, LoggingConfig};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

/// Faildigest - learnings from recent tool failures for AI coding sessions.
#[derive(Parser)]
#[command(name = "faildigest")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output.
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file.
    #[arg(short, long, global = true, env = "FAILDIGEST_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
enum Commands {
    /// Handle assistant hook events.
    Hook {
        /// Hook event type.
        #[command(subcommand)]
        event: HookEvent,
    },

    /// Render the digest for a project.
    Digest(DigestArgs),

    /// Manage configuration.
    Config {
        /// Show current configuration.
        #[arg(long)]
        show: bool,
    },

    /// Generate shell completions.
    Completions {
        /// Target shell.
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> ExitCode {
    // A missing .env is normal; variables already set are never overridden.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let is_hook = cli.command.is_hook();

    let config = match resolve_config(cli.config.as_deref(), is_hook) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            return ExitCode::FAILURE;
        },
    };

    let logging = LoggingConfig::from_settings(&config.logging, cli.verbose);
    if let Err(e) = observability::init(&logging) {
        if !is_hook {
            eprintln!("Failed to initialize observability: {e}");
            return ExitCode::FAILURE;
        }
        // The hook still has to answer; log to stderr instead.
        eprintln!("Failed to initialize observability, logging to stderr: {e}");
        if let Err(e) = observability::init(&logging.without_file()) {
            eprintln!("Logging disabled: {e}");
        }
    }

    let result = run_command(cli, config);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::FAILURE
        },
    }
}

impl Commands {
    /// Returns `true` for hook invocations, which must never fail.
    const fn is_hook(&self) -> bool {
        matches!(self, Self::Hook { .. })
    }
}

/// Runs the selected command.
fn run_command(cli: Cli, config: FaildigestConfig) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Hook { event } => cmd_hook(event, &config),

        Commands::Digest(args) => cmd_digest(args, &config),

        Commands::Config { show } => cmd_config(&config, show),

        Commands::Completions { shell } => cmd_completions(shell, Cli::command()),
    }
}

/// Loads configuration for a command.
///
/// A hook must print a response whatever happens, so an unusable explicit
/// config file falls back to the default location for hooks instead of
/// failing the invocation.
fn resolve_config(
    path: Option<&Path>,
    is_hook: bool,
) -> Result<FaildigestConfig, Box<dyn std::error::Error>> {
    match load_config(path) {
        Err(e) if is_hook => {
            eprintln!("Ignoring configuration, using defaults: {e}");
            load_config(None)
        },
        result => result,
    }
}

/// Loads configuration: explicit file or default location, then environment.
///
/// `--config` (or `FAILDIGEST_CONFIG`) must name a readable, valid file; a
/// broken file in the default location is ignored.
fn load_config(path: Option<&Path>) -> Result<FaildigestConfig, Box<dyn std::error::Error>> {
    let config = match path.filter(|p| !p.as_os_str().is_empty()) {
        Some(config_path) => FaildigestConfig::load_from_file(config_path)?,
        None => FaildigestConfig::load_default(),
    };

    Ok(config.with_env_overrides())
}

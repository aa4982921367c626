//! Digest command handler.
//!
//! Renders the digest for a project on demand, outside any hook, for
//! previewing what the next session will be told.

use std::path::PathBuf;

use chrono::Utc;
use clap::Args;
use faildigest::config::FaildigestConfig;
use faildigest::context::resolve_identity;
use faildigest::models::ProjectIdentity;
use faildigest::observability::{RequestContext, enter_request_context};
use faildigest::services::{DigestService, RunFetcher};

use super::{OutputFormat, open_source};

/// Arguments of the `digest` command.
#[derive(Args, Debug, Clone, Default)]
pub struct DigestArgs {
    /// Runs file (JSON array or JSON Lines); `-` reads stdin.
    /// Defaults to the configured runs path.
    #[arg(short, long)]
    pub runs: Option<PathBuf>,

    /// Repository name to digest instead of the detected one.
    #[arg(long)]
    pub repo: Option<String>,

    /// Folder name shown in the header instead of the detected one.
    #[arg(long)]
    pub folder: Option<String>,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Directory used to detect the project (default: current directory).
    #[arg(long)]
    pub cwd: Option<PathBuf>,
}

/// Digest command.
pub fn cmd_digest(
    args: DigestArgs,
    config: &FaildigestConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let _request_guard = enter_request_context(RequestContext::new());

    let Some(runs_path) = args.runs.clone().or_else(|| config.source.runs_path.clone()) else {
        return Err("no runs source: pass --runs or set FAILDIGEST_RUNS_PATH".into());
    };

    let identity = identity_for(&args)?;
    if identity.is_unknown() {
        tracing::warn!(folder = %identity.folder_name, "Project not identified; pass --repo");
    }

    let fetcher = RunFetcher::from_config(open_source(&runs_path)?, config);
    let now = Utc::now();
    let runs = fetcher.try_fetch(&identity, now)?;
    let service = DigestService::new(config.digest);

    match args.format {
        OutputFormat::Text => {
            let digest = service.render(&identity, &runs, now);
            if !digest.is_empty() {
                println!("{digest}");
            }
        },
        OutputFormat::Json => {
            let report = service.report(&identity, &runs, now);
            println!("{}", serde_json::to_string_pretty(&report)?);
        },
    }

    Ok(())
}

/// Resolves the identity, letting `--repo`/`--folder` override detection.
fn identity_for(args: &DigestArgs) -> Result<ProjectIdentity, Box<dyn std::error::Error>> {
    let cwd = match &args.cwd {
        Some(cwd) => cwd.clone(),
        None => std::env::current_dir()?,
    };
    let detected = resolve_identity(&cwd);

    let repo_name = args.repo.clone().unwrap_or(detected.repo_name);
    let folder_name = args.folder.clone().unwrap_or(detected.folder_name);
    Ok(ProjectIdentity::new(repo_name, folder_name))
}

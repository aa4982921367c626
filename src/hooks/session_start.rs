//! Session start hook handler.

use super::{HookHandler, context_response, serialize_response};
use crate::Result;
use crate::context::{resolve_identity, resolve_identity_from_cwd};
use crate::models::ProjectIdentity;
use crate::services::{DigestService, RunFetcher};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::PathBuf;
use tracing::instrument;

/// Input sent by the host on session start.
///
/// Every field is optional; unknown fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct SessionStartInput {
    /// Session identifier.
    pub session_id: Option<String>,
    /// Directory the session was started in.
    pub cwd: Option<PathBuf>,
    /// Event name, normally `SessionStart`.
    pub hook_event_name: Option<String>,
    /// Why the session started (`startup`, `resume`, `clear`, ...).
    pub source: Option<String>,
}

impl SessionStartInput {
    /// Parses hook input, falling back to defaults on empty or malformed JSON.
    #[must_use]
    pub fn parse(input: &str) -> Self {
        if input.trim().is_empty() {
            return Self::default();
        }
        serde_json::from_str(input).unwrap_or_else(|e| {
            tracing::debug!(error = %e, "Unparseable SessionStart input, using defaults");
            Self::default()
        })
    }
}

/// Handles `SessionStart` hook events.
///
/// Resolves the project, fetches its recent failed tool runs and injects the
/// digest as `additionalContext`. Anything that goes wrong on the way
/// (unknown project, no source, fetch timeout) produces `{}`; the session
/// start is never blocked or failed by the digest.
pub struct SessionStartHandler {
    digest: DigestService,
    fetcher: Option<RunFetcher>,
    identity: Option<ProjectIdentity>,
    now: Option<DateTime<Utc>>,
}

impl SessionStartHandler {
    /// Creates a new handler.
    #[must_use]
    pub fn new() -> Self {
        Self {
            digest: DigestService::default(),
            fetcher: None,
            identity: None,
            now: None,
        }
    }

    /// Sets the digest service.
    #[must_use]
    pub fn with_digest(mut self, digest: DigestService) -> Self {
        self.digest = digest;
        self
    }

    /// Sets the run fetcher.
    #[must_use]
    pub fn with_fetcher(mut self, fetcher: RunFetcher) -> Self {
        self.fetcher = Some(fetcher);
        self
    }

    /// Uses a fixed identity instead of resolving one from the input `cwd`.
    #[must_use]
    pub fn with_identity(mut self, identity: ProjectIdentity) -> Self {
        self.identity = Some(identity);
        self
    }

    /// Uses a fixed invocation time.
    #[must_use]
    pub const fn with_now(mut self, now: DateTime<Utc>) -> Self {
        self.now = Some(now);
        self
    }

    fn identity_for(&self, input: &SessionStartInput) -> ProjectIdentity {
        if let Some(identity) = &self.identity {
            return identity.clone();
        }
        input
            .cwd
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
            .map_or_else(resolve_identity_from_cwd, resolve_identity)
    }

    /// Builds the digest text for the input; empty means nothing to inject.
    fn build_digest(&self, input: &SessionStartInput) -> (&'static str, String) {
        let Some(fetcher) = &self.fetcher else {
            tracing::debug!("No run source configured, skipping digest");
            return ("no_source", String::new());
        };

        let identity = self.identity_for(input);
        if identity.is_unknown() {
            tracing::debug!(
                folder = %identity.folder_name,
                "Project not identified, skipping digest"
            );
            return ("unknown_project", String::new());
        }

        let now = self.now.unwrap_or_else(Utc::now);
        let runs = fetcher.fetch(&identity, now);
        let digest = self.digest.render(&identity, &runs, now);
        let outcome = if digest.is_empty() { "empty" } else { "learnings" };

        tracing::debug!(
            repo = %identity.repo_name,
            folder = %identity.folder_name,
            runs = runs.len(),
            chars = digest.chars().count(),
            outcome,
            "Built session-start digest"
        );
        (outcome, digest)
    }
}

impl Default for SessionStartHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl HookHandler for SessionStartHandler {
    fn event_type(&self) -> &'static str {
        "SessionStart"
    }

    #[instrument(
        name = "faildigest.hook.session_start",
        skip(self, input),
        fields(hook = "SessionStart", session_id = tracing::field::Empty)
    )]
    fn handle(&self, input: &str) -> Result<String> {
        let input = SessionStartInput::parse(input);
        if let Some(session_id) = &input.session_id {
            tracing::Span::current().record("session_id", session_id.as_str());
        }

        let (outcome, digest) = self.build_digest(&input);
        metrics::counter!("faildigest_hook_invocations_total", "outcome" => outcome).increment(1);

        serialize_response(&context_response(self.event_type(), &digest))
    }
}

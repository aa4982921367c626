//! Fetching runs for a project under a wall-clock budget.

use crate::config::{DEFAULT_FETCH_TIMEOUT_MS, DigestWindows, FaildigestConfig};
use crate::models::{ProjectIdentity, RawRun};
use crate::observability::{RequestContext, current_request_id, enter_request_context};
use crate::sources::{QueryStrategy, RunQuery, RunSource};
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::sync::Arc;
use std::time::Duration;

/// Default number of runs requested per query.
pub const DEFAULT_MAX_RUNS: usize = 200;

/// Fetches the failure window for a project.
///
/// Query strategies are tried in order and the first non-empty answer wins;
/// answers are never merged. The whole chain runs on a helper thread and the
/// caller waits at most the configured timeout. Every failure mode (source
/// errors, timeouts, a panicking source) degrades to zero runs, so a session
/// never waits on, or breaks because of, the trace store.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use faildigest::models::{ProjectIdentity, RawRun};
/// use faildigest::services::RunFetcher;
/// use faildigest::sources::InMemorySource;
/// use std::sync::Arc;
///
/// let source = InMemorySource::new(vec![
///     RawRun::tool("r1", "bash", "boom").with_metadata("repo", "api"),
/// ]);
/// let fetcher = RunFetcher::new(Arc::new(source));
///
/// let runs = fetcher.fetch(&ProjectIdentity::new("api", "api"), Utc::now());
/// assert_eq!(runs.len(), 1);
/// ```
#[derive(Clone)]
pub struct RunFetcher {
    source: Arc<dyn RunSource>,
    strategies: Vec<QueryStrategy>,
    max_runs: usize,
    windows: DigestWindows,
    timeout: Duration,
}

impl std::fmt::Debug for RunFetcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RunFetcher")
            .field("source", &self.source.name())
            .field("strategies", &self.strategies)
            .field("max_runs", &self.max_runs)
            .field("windows", &self.windows)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl RunFetcher {
    /// Creates a fetcher with the default strategy chain and limits.
    #[must_use]
    pub fn new(source: Arc<dyn RunSource>) -> Self {
        Self {
            source,
            strategies: QueryStrategy::default_chain(),
            max_runs: DEFAULT_MAX_RUNS,
            windows: DigestWindows::default(),
            timeout: Duration::from_millis(DEFAULT_FETCH_TIMEOUT_MS),
        }
    }

    /// Creates a fetcher from the loaded configuration.
    #[must_use]
    pub fn from_config(source: Arc<dyn RunSource>, config: &FaildigestConfig) -> Self {
        Self::new(source)
            .with_strategies(config.source.strategies.clone())
            .with_max_runs(config.digest.limits.max_runs)
            .with_windows(config.digest.windows)
            .with_timeout(Duration::from_millis(config.source.fetch_timeout_ms))
    }

    /// Sets the query strategies. An empty list keeps the current chain.
    #[must_use]
    pub fn with_strategies(mut self, strategies: Vec<QueryStrategy>) -> Self {
        if !strategies.is_empty() {
            self.strategies = strategies;
        }
        self
    }

    /// Sets the per-query run cap.
    #[must_use]
    pub const fn with_max_runs(mut self, max_runs: usize) -> Self {
        self.max_runs = max_runs;
        self
    }

    /// Sets the age window.
    #[must_use]
    pub const fn with_windows(mut self, windows: DigestWindows) -> Self {
        self.windows = windows;
        self
    }

    /// Sets the wall-clock budget.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Returns the strategy chain.
    #[must_use]
    pub fn strategies(&self) -> &[QueryStrategy] {
        &self.strategies
    }

    /// Builds the query for each strategy, in order.
    #[must_use]
    pub fn queries(&self, identity: &ProjectIdentity, now: DateTime<Utc>) -> Vec<RunQuery> {
        let since = self.windows.age_cutoff(now);
        self.strategies
            .iter()
            .map(|strategy| RunQuery {
                repo_name: identity.repo_name.clone(),
                strategy: strategy.clone(),
                since,
                limit: self.max_runs,
                errors_only: true,
            })
            .collect()
    }

    /// Fetches runs, degrading every failure to an empty window.
    #[must_use]
    pub fn fetch(&self, identity: &ProjectIdentity, now: DateTime<Utc>) -> Vec<RawRun> {
        match self.try_fetch(identity, now) {
            Ok(runs) => runs,
            Err(e) => {
                tracing::warn!(
                    source = self.source.name(),
                    request_id = current_request_id().unwrap_or_default(),
                    repo = %identity.repo_name,
                    error = %e,
                    "Run fetch failed, continuing without learnings"
                );
                Vec::new()
            },
        }
    }

    /// Fetches runs, reporting why nothing came back.
    ///
    /// An unknown project yields `Ok(vec![])` without touching the source.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Timeout`] when the budget elapses, and the last source
    /// error when every strategy failed.
    pub fn try_fetch(
        &self,
        identity: &ProjectIdentity,
        now: DateTime<Utc>,
    ) -> Result<Vec<RawRun>> {
        if identity.is_unknown() {
            tracing::debug!("Project identity unknown, skipping fetch");
            metrics::counter!("faildigest_fetch_completed", "status" => "skipped").increment(1);
            return Ok(Vec::new());
        }

        let queries = self.queries(identity, now);
        let source = Arc::clone(&self.source);
        let (tx, rx) = mpsc::channel();
        let parent_span = tracing::Span::current();
        let request_id = current_request_id();

        std::thread::spawn(move || {
            let _request_guard = request_id
                .map(RequestContext::from_id)
                .map(enter_request_context);
            let _parent = parent_span.enter();
            let span = tracing::debug_span!(
                "faildigest.fetch",
                source = source.name(),
                request_id = tracing::field::Empty
            );
            if let Some(id) = current_request_id() {
                span.record("request_id", id.as_str());
            }
            let _guard = span.enter();
            let result = run_chain(source.as_ref(), &queries);
            // The receiver is gone after a timeout; nothing left to report to.
            let _ = tx.send(result);
        });

        let timeout_ms = u64::try_from(self.timeout.as_millis()).unwrap_or(u64::MAX);
        match rx.recv_timeout(self.timeout) {
            Ok(Ok(runs)) => {
                let status = if runs.is_empty() { "empty" } else { "success" };
                metrics::counter!("faildigest_fetch_completed", "status" => status).increment(1);
                Ok(runs)
            },
            Ok(Err(e)) => {
                metrics::counter!("faildigest_fetch_completed", "status" => "error").increment(1);
                Err(e)
            },
            Err(RecvTimeoutError::Timeout) => {
                // The worker keeps running until the source returns.
                metrics::counter!("faildigest_fetch_completed", "status" => "timeout")
                    .increment(1);
                Err(Error::Timeout {
                    operation: "fetch_runs".to_string(),
                    timeout_ms,
                })
            },
            Err(RecvTimeoutError::Disconnected) => {
                metrics::counter!("faildigest_fetch_completed", "status" => "disconnected")
                    .increment(1);
                Err(Error::OperationFailed {
                    operation: "fetch_runs".to_string(),
                    cause: "run source worker exited without a result".to_string(),
                })
            },
        }
    }
}

/// Runs queries in order until one returns runs.
///
/// A failing strategy is logged and skipped. The chain only fails when every
/// strategy failed.
fn run_chain(source: &dyn RunSource, queries: &[RunQuery]) -> Result<Vec<RawRun>> {
    let mut last_error = None;
    let mut answered = false;

    for query in queries {
        match source.query(query) {
            Ok(runs) if !runs.is_empty() => {
                tracing::debug!(
                    strategy = %query.strategy,
                    runs = runs.len(),
                    "Query strategy returned runs"
                );
                return Ok(runs);
            },
            Ok(_) => {
                answered = true;
                tracing::debug!(strategy = %query.strategy, "Query strategy returned no runs");
            },
            Err(e) => {
                tracing::warn!(strategy = %query.strategy, error = %e, "Query strategy failed");
                last_error = Some(e);
            },
        }
    }

    match last_error {
        Some(e) if !answered => Err(e),
        _ => Ok(Vec::new()),
    }
}

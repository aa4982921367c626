//! Failure digest pipeline.
//!
//! Turns a window of raw runs into the learnings block shown at session
//! start:
//!
//! 1. **Admit**: keep failed tool runs inside the age window ([`grouper::is_admitted`])
//! 2. **Normalize**: derive canonical errors and recent flags ([`normalizer::annotate`])
//! 3. **Group**: bucket by `(tool, canonical error)` ([`grouper::group_records`])
//! 4. **Rank**: recent groups first, then larger groups ([`ranker::rank`])
//! 5. **Hint**: attach the first matching remediation ([`hints::hint_for`])
//! 6. **Render**: compose and truncate the text block ([`renderer::render`])
//!
//! Every step is pure. The invocation time is passed in, so the same input
//! always produces the same digest.

pub mod grouper;
pub mod hints;
pub mod normalizer;
pub mod ranker;
pub mod renderer;
mod report;

pub use hints::{HINT_RULES, HintRule, hint_for};
pub use normalizer::normalize_error;
pub use renderer::{ELLIPSIS, truncate_chars};
pub use report::{DigestReport, ReportGroup, group_fingerprint};

use crate::config::DigestConfig;
use crate::models::{FailureGroup, FailureRecord, ProjectIdentity, RawRun};
use chrono::{DateTime, Utc};
use tracing::instrument;

/// A ranked group with its remediation hint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankedGroup {
    /// The failure group.
    pub group: FailureGroup,
    /// Remediation, if a hint rule matched.
    pub hint: Option<&'static str>,
}

/// Builds failure digests.
///
/// # Example
///
/// ```rust
/// use chrono::{Duration, Utc};
/// use faildigest::config::DigestConfig;
/// use faildigest::models::{ProjectIdentity, RawRun};
/// use faildigest::services::DigestService;
///
/// let now = Utc::now();
/// let runs = vec![
///     RawRun::tool("a1", "bash", "permission denied: /tmp/x").with_start_time(now),
///     RawRun::tool("a2", "bash", "permission denied: /tmp/y")
///         .with_start_time(now - Duration::hours(1)),
/// ];
///
/// let service = DigestService::new(DigestConfig::default());
/// let groups = service.analyze(&runs, now);
/// assert_eq!(groups.len(), 1);
/// assert_eq!(groups[0].group.count, 2);
/// assert!(groups[0].hint.is_some());
/// ```
#[derive(Debug, Clone, Default)]
pub struct DigestService {
    config: DigestConfig,
}

impl DigestService {
    /// Creates a digest service.
    #[must_use]
    pub const fn new(config: DigestConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    #[must_use]
    pub const fn config(&self) -> &DigestConfig {
        &self.config
    }

    /// Admits and annotates runs, preserving their order.
    #[must_use]
    pub fn records(&self, runs: &[RawRun], now: DateTime<Utc>) -> Vec<FailureRecord> {
        let age_cutoff = self.config.windows.age_cutoff(now);
        runs.iter()
            .filter(|run| grouper::is_admitted(run, age_cutoff))
            .map(|run| normalizer::annotate(run, &self.config, now))
            .collect()
    }

    /// Groups, ranks and hints the admitted runs.
    #[must_use]
    #[instrument(
        name = "faildigest.digest.analyze",
        skip(self, runs),
        fields(runs = runs.len())
    )]
    pub fn analyze(&self, runs: &[RawRun], now: DateTime<Utc>) -> Vec<RankedGroup> {
        let records = self.records(runs, now);
        let admitted = records.len();
        metrics::counter!("faildigest_records_admitted_total").increment(admitted as u64);

        let groups = grouper::group_records(records);
        let distinct = groups.len();
        let ranked: Vec<RankedGroup> = ranker::rank(groups, self.config.limits.max_groups)
            .into_iter()
            .map(|group| {
                let hint = hint_for(&group.tool_name, &group.representative_error);
                RankedGroup { group, hint }
            })
            .collect();

        tracing::debug!(
            admitted,
            distinct,
            kept = ranked.len(),
            "Analyzed failure runs"
        );
        ranked
    }

    /// Builds the digest text.
    ///
    /// Returns an empty string when no run qualifies; the renderer is not
    /// invoked in that case.
    #[must_use]
    pub fn render(
        &self,
        identity: &ProjectIdentity,
        runs: &[RawRun],
        now: DateTime<Utc>,
    ) -> String {
        let groups = self.analyze(runs, now);
        self.render_groups(identity, &groups)
    }

    /// Renders already analyzed groups.
    #[must_use]
    pub fn render_groups(&self, identity: &ProjectIdentity, groups: &[RankedGroup]) -> String {
        if groups.is_empty() {
            return String::new();
        }
        metrics::counter!("faildigest_groups_rendered_total").increment(groups.len() as u64);
        renderer::render(identity, groups, &self.config)
    }

    /// Builds a structured report alongside the digest text.
    #[must_use]
    pub fn report(
        &self,
        identity: &ProjectIdentity,
        runs: &[RawRun],
        now: DateTime<Utc>,
    ) -> DigestReport {
        let groups = self.analyze(runs, now);
        let text = self.render_groups(identity, &groups);
        DigestReport::new(identity, now, runs.len(), &groups, text)
    }
}

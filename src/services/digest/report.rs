//! Structured digest report.

use super::RankedGroup;
use super::hints::matching_rule;
use crate::models::ProjectIdentity;
use chrono::{DateTime, Utc};
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Length of a group fingerprint in hex characters.
pub const FINGERPRINT_LEN: usize = 16;

/// Stable identifier for a failure group.
///
/// The first 16 hex characters of the SHA-256 of `tool`, a NUL byte, and the
/// canonical error. The same group gets the same fingerprint on every run,
/// which lets callers track a pattern across sessions.
///
/// ```rust
/// use faildigest::services::digest::group_fingerprint;
///
/// let fp = group_fingerprint("bash", "exit <n>");
/// assert_eq!(fp.len(), 16);
/// assert_eq!(fp, group_fingerprint("bash", "exit <n>"));
/// assert_ne!(fp, group_fingerprint("read", "exit <n>"));
/// ```
#[must_use]
pub fn group_fingerprint(tool: &str, canonical_error: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(tool.as_bytes());
    hasher.update([0u8]);
    hasher.update(canonical_error.as_bytes());
    let mut digest = hex::encode(hasher.finalize());
    digest.truncate(FINGERPRINT_LEN);
    digest
}

/// One group in a [`DigestReport`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportGroup {
    /// See [`group_fingerprint`].
    pub fingerprint: String,
    /// Tool name.
    pub tool: String,
    /// Number of failures.
    pub count: usize,
    /// Failures inside the recent window.
    pub recent_count: usize,
    /// Newest failure time, or `unknown`.
    pub last_seen: String,
    /// Run id prefix of the newest failure.
    pub run_id: String,
    /// Raw error of the newest failure (untruncated).
    pub error: String,
    /// Inputs preview of the newest failure.
    pub inputs: String,
    /// Remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Name of the hint rule that matched.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint_rule: Option<String>,
}

impl From<&RankedGroup> for ReportGroup {
    fn from(ranked: &RankedGroup) -> Self {
        let group = &ranked.group;
        let rule = ranked
            .hint
            .and_then(|_| matching_rule(&group.tool_name, &group.representative_error));
        Self {
            fingerprint: group_fingerprint(&group.tool_name, &group.canonical_error),
            tool: group.tool_name.clone(),
            count: group.count,
            recent_count: group.recent_count,
            last_seen: group.last_seen.clone(),
            run_id: group.representative_run_id_prefix.clone(),
            error: group.representative_error.clone(),
            inputs: group.representative_inputs_preview.clone(),
            hint: ranked.hint.map(str::to_string),
            hint_rule: rule.map(|r| r.name.to_string()),
        }
    }
}

/// Machine-readable digest, emitted by `faildigest digest --format json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DigestReport {
    /// Repository name.
    pub repo: String,
    /// Folder name.
    pub folder: String,
    /// Invocation time.
    pub generated_at: DateTime<Utc>,
    /// Runs handed to the pipeline, before admission.
    pub record_count: usize,
    /// Ranked groups.
    pub groups: Vec<ReportGroup>,
    /// Rendered digest text; empty when there is nothing to report.
    pub text: String,
}

impl DigestReport {
    pub(crate) fn new(
        identity: &ProjectIdentity,
        generated_at: DateTime<Utc>,
        record_count: usize,
        groups: &[RankedGroup],
        text: String,
    ) -> Self {
        Self {
            repo: identity.repo_name.clone(),
            folder: identity.folder_name.clone(),
            generated_at,
            record_count,
            groups: groups.iter().map(ReportGroup::from).collect(),
            text,
        }
    }

    /// Returns `true` if the report has no groups.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

//! Failure records and the groups they fold into.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

/// Placeholder used wherever a displayed value is missing.
pub const UNKNOWN: &str = "unknown";

/// A single failed tool invocation, annotated for grouping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureRecord {
    /// Run identifier.
    pub id: String,
    /// Tool that failed.
    pub tool_name: String,
    /// Error text exactly as reported.
    pub error_text: String,
    /// Error text with volatile substrings replaced; used only as a group key.
    pub canonical_error: String,
    /// When the run started, if known.
    pub start_time: Option<DateTime<Utc>>,
    /// Bounded single-line preview of the run inputs; empty when there are none.
    pub inputs_preview: String,
    /// Whether the run started inside the recent window.
    pub is_recent: bool,
}

impl FailureRecord {
    /// Returns the grouping key of this record.
    #[must_use]
    pub fn key(&self) -> GroupKey {
        GroupKey {
            tool_name: self.tool_name.clone(),
            canonical_error: self.canonical_error.clone(),
        }
    }
}

/// Identity of a failure group: exact, case-sensitive tool and canonical error.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GroupKey {
    /// Tool name.
    pub tool_name: String,
    /// Canonical error.
    pub canonical_error: String,
}

/// Failure records sharing a [`GroupKey`].
///
/// `members` is ordered newest first, with records lacking a start time at the
/// end. Representative fields are taken from the newest member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FailureGroup {
    /// Tool name shared by every member.
    pub tool_name: String,
    /// Canonical error shared by every member.
    pub canonical_error: String,
    /// Members, newest first.
    pub members: Vec<FailureRecord>,
    /// Number of members.
    pub count: usize,
    /// Number of members inside the recent window.
    pub recent_count: usize,
    /// Start time of the newest member as RFC 3339, or `unknown`.
    pub last_seen: String,
    /// First eight characters of the newest member's run id, or `unknown`.
    pub representative_run_id_prefix: String,
    /// Raw error of the newest member.
    pub representative_error: String,
    /// Inputs preview of the newest member.
    pub representative_inputs_preview: String,
}

impl FailureGroup {
    /// Length of the run id prefix shown for a group.
    pub const RUN_ID_PREFIX_LEN: usize = 8;

    /// Builds a group from its members.
    ///
    /// Members are stably sorted newest first; members without a start time
    /// sort last and keep their relative order. Returns `None` for an empty
    /// member list, since a group always has a representative.
    #[must_use]
    pub fn from_members(mut members: Vec<FailureRecord>) -> Option<Self> {
        members.sort_by(|a, b| b.start_time.cmp(&a.start_time));

        let newest = members.first()?;
        let tool_name = newest.tool_name.clone();
        let canonical_error = newest.canonical_error.clone();
        let last_seen = newest.start_time.map_or_else(
            || UNKNOWN.to_string(),
            |ts| ts.to_rfc3339_opts(SecondsFormat::Secs, true),
        );
        let representative_run_id_prefix = run_id_prefix(&newest.id);
        let representative_error = newest.error_text.clone();
        let representative_inputs_preview = newest.inputs_preview.clone();
        let recent_count = members.iter().filter(|m| m.is_recent).count();

        Some(Self {
            tool_name,
            canonical_error,
            count: members.len(),
            recent_count,
            last_seen,
            representative_run_id_prefix,
            representative_error,
            representative_inputs_preview,
            members,
        })
    }

    /// Returns the grouping key of this group.
    #[must_use]
    pub fn key(&self) -> GroupKey {
        GroupKey {
            tool_name: self.tool_name.clone(),
            canonical_error: self.canonical_error.clone(),
        }
    }

    /// Returns `true` if at least one member is recent.
    #[must_use]
    pub const fn has_recent(&self) -> bool {
        self.recent_count > 0
    }
}

fn run_id_prefix(id: &str) -> String {
    let id = id.trim();
    if id.is_empty() {
        return UNKNOWN.to_string();
    }
    id.chars().take(FailureGroup::RUN_ID_PREFIX_LEN).collect()
}

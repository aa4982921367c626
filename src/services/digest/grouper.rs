//! Admission and grouping of failure records.

use crate::models::{FailureGroup, FailureRecord, GroupKey, RawRun, RunType};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

/// Returns `true` if a run may contribute to a digest.
///
/// A run is admitted when it is a tool invocation, carries a non-blank error,
/// and either has no start time or started at or after `age_cutoff`.
#[must_use]
pub fn is_admitted(run: &RawRun, age_cutoff: DateTime<Utc>) -> bool {
    run.run_type == RunType::Tool
        && run.is_error()
        && run.start_time.is_none_or(|ts| ts >= age_cutoff)
}

/// Buckets records by exact `(tool_name, canonical_error)`.
///
/// Groups come back in first-encounter order. Records with an empty
/// canonical error are dropped.
#[must_use]
pub fn group_records<I>(records: I) -> Vec<FailureGroup>
where
    I: IntoIterator<Item = FailureRecord>,
{
    let mut index: HashMap<GroupKey, usize> = HashMap::new();
    let mut buckets: Vec<Vec<FailureRecord>> = Vec::new();

    for record in records {
        if record.canonical_error.is_empty() {
            continue;
        }
        let slot = *index.entry(record.key()).or_insert_with(|| {
            buckets.push(Vec::new());
            buckets.len() - 1
        });
        buckets[slot].push(record);
    }

    buckets
        .into_iter()
        .filter_map(FailureGroup::from_members)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DigestConfig;
    use crate::services::digest::normalizer::annotate;
    use chrono::Duration;

    fn records(runs: &[RawRun], now: DateTime<Utc>) -> Vec<FailureRecord> {
        let config = DigestConfig::default();
        runs.iter().map(|r| annotate(r, &config, now)).collect()
    }

    #[test]
    fn test_admission() {
        let now = Utc::now();
        let cutoff = now - Duration::days(7);

        assert!(is_admitted(&RawRun::tool("r", "bash", "boom"), cutoff));
        assert!(is_admitted(
            &RawRun::tool("r", "bash", "boom").with_start_time(cutoff),
            cutoff
        ));
        assert!(!is_admitted(
            &RawRun::tool("r", "bash", "boom").with_start_time(cutoff - Duration::seconds(1)),
            cutoff
        ));
        assert!(!is_admitted(&RawRun::tool("r", "bash", "  "), cutoff));
        assert!(!is_admitted(
            &RawRun::tool("r", "claude", "overloaded").with_run_type(RunType::Llm),
            cutoff
        ));
        assert!(!is_admitted(
            &RawRun::tool("r", "agent", "boom").with_run_type(RunType::Chain),
            cutoff
        ));
    }

    #[test]
    fn test_volatile_text_colocates() {
        let now = Utc::now();
        let runs = [
            RawRun::tool("r1", "bash", "exit 127 at 0xdead").with_start_time(now),
            RawRun::tool("r2", "bash", "exit 1 at 0xbeef")
                .with_start_time(now - Duration::hours(1)),
        ];

        let groups = group_records(records(&runs, now));
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].count, 2);
        assert_eq!(groups[0].canonical_error, "exit <n> at <hex>");
        assert_eq!(groups[0].representative_error, "exit 127 at 0xdead");
    }

    #[test]
    fn test_key_is_exact_and_case_sensitive() {
        let now = Utc::now();
        let runs = [
            RawRun::tool("r1", "bash", "boom"),
            RawRun::tool("r2", "Bash", "boom"),
            RawRun::tool("r3", "bash", "Boom"),
            RawRun::tool("r4", "read", "boom"),
            RawRun::tool("r5", "bash", "boom"),
        ];

        let groups = group_records(records(&runs, now));
        let summary: Vec<(&str, &str, usize)> = groups
            .iter()
            .map(|g| (g.tool_name.as_str(), g.canonical_error.as_str(), g.count))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("bash", "boom", 2),
                ("Bash", "boom", 1),
                ("bash", "Boom", 1),
                ("read", "boom", 1),
            ]
        );
    }

    #[test]
    fn test_counts_and_recency() {
        let now = Utc::now();
        let runs = [
            RawRun::tool("r1", "bash", "boom").with_start_time(now - Duration::hours(1)),
            RawRun::tool("r2", "bash", "boom").with_start_time(now - Duration::days(3)),
            RawRun::tool("r3", "bash", "boom"),
        ];

        let groups = group_records(records(&runs, now));
        let group = &groups[0];
        assert_eq!(group.count, group.members.len());
        assert_eq!(group.count, 3);
        assert_eq!(group.recent_count, 1);
        assert!(group.recent_count <= group.count);
        assert_eq!(group.members.last().unwrap().id, "r3");
    }

    #[test]
    fn test_deterministic() {
        let now = Utc::now();
        let runs: Vec<RawRun> = (0..40)
            .map(|i| {
                RawRun::tool(format!("run-{i}"), format!("tool-{}", i % 3), format!("code {i}"))
            })
            .collect();

        let first = group_records(records(&runs, now));
        let second = group_records(records(&runs, now));
        assert_eq!(first, second);
        assert_eq!(first.len(), 3);
    }

    #[test]
    fn test_empty_canonical_dropped() {
        let record = FailureRecord {
            id: "r".to_string(),
            tool_name: "bash".to_string(),
            error_text: String::new(),
            canonical_error: String::new(),
            start_time: None,
            inputs_preview: String::new(),
            is_recent: false,
        };
        assert!(group_records(vec![record]).is_empty());
    }
}

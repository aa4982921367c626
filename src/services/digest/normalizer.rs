//! Error normalization and record annotation.
// Allow expect() on static regex patterns - these are guaranteed to compile
#![allow(clippy::expect_used)]

use super::renderer::truncate_chars;
use crate::config::DigestConfig;
use crate::models::{FailureRecord, RawRun, UNKNOWN};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

/// Replaces hexadecimal tokens.
pub const HEX_PLACEHOLDER: &str = "<hex>";
/// Replaces ISO-8601 UTC timestamps.
pub const TIMESTAMP_PLACEHOLDER: &str = "<ts>";
/// Replaces runs of decimal digits.
pub const NUMBER_PLACEHOLDER: &str = "<n>";
/// Replaces absolute filesystem paths.
pub const PATH_PLACEHOLDER: &str = "<path>";

static HEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"0[xX][0-9a-fA-F]+").expect("static regex: hex token"));

static TIMESTAMP: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\d{4}-\d{2}-\d{2}T\d{2}:\d{2}:\d{2}(?:\.\d+)?Z")
        .expect("static regex: iso-8601 utc timestamp")
});

static DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("static regex: digit run"));

// An absolute path starts a token: at the beginning, after whitespace, or
// after one of `:=("'[,`. It runs until whitespace or a delimiter.
static ABSOLUTE_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(^|[\s:=("'\[,])/[^\s"'()\[\],;]+"#).expect("static regex: absolute path")
});

/// Maps a raw error to the canonical form used as a group key.
///
/// Hex tokens, then UTC timestamps, then digit runs, then absolute paths are
/// replaced with fixed placeholders; whitespace runs collapse to one space and
/// the result is trimmed. No placeholder contains a digit or a slash, so
/// normalizing twice is the same as normalizing once.
///
/// ```rust
/// use faildigest::services::digest::normalize_error;
///
/// assert_eq!(
///     normalize_error("exit 137 at 0xdeadbeef\n  (2024-05-01T10:00:00.5Z)"),
///     "exit <n> at <hex> (<ts>)"
/// );
/// assert_eq!(
///     normalize_error("permission denied: /tmp/x"),
///     normalize_error("permission denied: /tmp/y"),
/// );
/// ```
#[must_use]
pub fn normalize_error(raw: &str) -> String {
    if raw.trim().is_empty() {
        return String::new();
    }

    let text = HEX.replace_all(raw, HEX_PLACEHOLDER);
    let text = TIMESTAMP.replace_all(&text, TIMESTAMP_PLACEHOLDER);
    let text = DIGITS.replace_all(&text, NUMBER_PLACEHOLDER);
    let text = ABSOLUTE_PATH.replace_all(&text, format!("${{1}}{PATH_PLACEHOLDER}").as_str());
    collapse_whitespace(&text)
}

/// Collapses whitespace runs to single spaces and trims.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Builds the failure record for a run.
///
/// The canonical error and the recent flag are derived here; admission is
/// decided separately by the grouper.
#[must_use]
pub fn annotate(run: &RawRun, config: &DigestConfig, now: DateTime<Utc>) -> FailureRecord {
    let error_text = run.error_text().to_string();
    let recent_cutoff = config.windows.recent_cutoff(now);
    let tool_name = if run.name.trim().is_empty() {
        UNKNOWN.to_string()
    } else {
        run.name.clone()
    };

    FailureRecord {
        id: run.id.clone(),
        tool_name,
        canonical_error: normalize_error(&error_text),
        error_text,
        start_time: run.start_time,
        inputs_preview: inputs_preview(run.inputs.as_ref(), config.limits.max_input_chars),
        is_recent: run.start_time.is_some_and(|ts| ts >= recent_cutoff),
    }
}

/// Single-line preview of run inputs, bounded to `max_chars`.
///
/// String inputs are used as-is, other values as compact JSON. Null and empty
/// values have no preview.
#[must_use]
pub fn inputs_preview(inputs: Option<&Value>, max_chars: usize) -> String {
    let preview = match inputs {
        None | Some(Value::Null) => return String::new(),
        Some(Value::String(s)) => collapse_whitespace(s),
        Some(Value::Object(map)) if map.is_empty() => return String::new(),
        Some(Value::Array(items)) if items.is_empty() => return String::new(),
        Some(value) => serde_json::to_string(value).unwrap_or_default(),
    };
    truncate_chars(&preview, max_chars)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::json;

    #[test]
    fn test_placeholders_cover_volatile_parts() {
        let canonical =
            normalize_error("failed at 0xFF1A with code 404 at 2024-01-02T03:04:05Z");
        assert_eq!(canonical, "failed at <hex> with code <n> at <ts>");
        for original in ["0xFF1A", "FF1A", "404", "2024-01-02T03:04:05Z"] {
            assert!(!canonical.contains(original), "{original} leaked");
        }
        assert!(!canonical.chars().any(|c| c.is_ascii_digit()));
    }

    #[test]
    fn test_timestamp_with_fraction() {
        assert_eq!(
            normalize_error("at 2024-01-02T03:04:05.123456Z done"),
            "at <ts> done"
        );
    }

    #[test]
    fn test_offset_timestamp_is_only_digit_masked() {
        assert_eq!(
            normalize_error("at 2024-01-02T03:04:05+02:00"),
            "at <n>-<n>-<n>T<n>:<n>:<n>+<n>:<n>"
        );
    }

    #[test]
    fn test_hex_inside_word() {
        assert_eq!(normalize_error("addr 10xFF"), "addr <n><hex>");
    }

    #[test]
    fn test_whitespace_collapsed() {
        assert_eq!(
            normalize_error("  permission\tdenied:\n\n /tmp/x  "),
            "permission denied: <path>"
        );
    }

    #[test]
    fn test_absolute_paths() {
        assert_eq!(
            normalize_error("open /var/log/app-12.log: denied"),
            "open <path> denied"
        );
        assert_eq!(normalize_error("cd: /work/app: No such file"), "cd: <path> No such file");
        assert_eq!(normalize_error("path=\"/a/b\",(/c)"), "path=\"<path>\",(<path>)");
        assert_eq!(normalize_error("ratio 3/4 and a / b"), "ratio <n>/<n> and a / b");
        assert_eq!(normalize_error("see src/main.rs"), "see src/main.rs");
    }

    #[test]
    fn test_empty_and_blank() {
        assert_eq!(normalize_error(""), "");
        assert_eq!(normalize_error(" \n\t "), "");
    }

    #[test]
    fn test_idempotent_on_samples() {
        for sample in [
            "failed at 0xFF1A with code 404 at 2024-01-02T03:04:05Z",
            "0x 0xg 0x1 x0x0",
            "<n> <hex> <ts> 12<n>",
            "line 1:2 col 0x",
            "/a;/b ,/c )/d http://host/x?q=1",
        ] {
            let once = normalize_error(sample);
            assert_eq!(normalize_error(&once), once, "sample: {sample}");
        }
    }

    #[test]
    fn test_case_preserved() {
        assert_eq!(normalize_error("Permission Denied"), "Permission Denied");
    }

    #[test]
    fn test_annotate() {
        let now = Utc::now();
        let config = DigestConfig::default();
        let run = RawRun::tool("run-123", "bash", "exit 1")
            .with_start_time(now - Duration::hours(2))
            .with_inputs(json!({"command": "ls"}));

        let record = annotate(&run, &config, now);
        assert_eq!(record.canonical_error, "exit <n>");
        assert_eq!(record.error_text, "exit 1");
        assert!(record.is_recent);
        assert_eq!(record.inputs_preview, r#"{"command":"ls"}"#);
    }

    #[test]
    fn test_annotate_recency_boundaries() {
        let now = Utc::now();
        let config = DigestConfig::default();
        let at = |ts| annotate(&RawRun::tool("r", "bash", "x").with_start_time(ts), &config, now);

        assert!(at(now - Duration::hours(24)).is_recent);
        assert!(!at(now - Duration::hours(24) - Duration::seconds(1)).is_recent);
        assert!(!annotate(&RawRun::tool("r", "bash", "x"), &config, now).is_recent);
    }

    #[test]
    fn test_annotate_missing_tool_name() {
        let record = annotate(&RawRun::tool("r", " ", "x"), &DigestConfig::default(), Utc::now());
        assert_eq!(record.tool_name, UNKNOWN);
    }

    #[test]
    fn test_inputs_preview() {
        assert_eq!(inputs_preview(None, 10), "");
        assert_eq!(inputs_preview(Some(&Value::Null), 10), "");
        assert_eq!(inputs_preview(Some(&json!({})), 10), "");
        assert_eq!(inputs_preview(Some(&json!([])), 10), "");
        assert_eq!(inputs_preview(Some(&json!("")), 10), "");
        assert_eq!(inputs_preview(Some(&json!("ls\n  -la")), 10), "ls -la");
        assert_eq!(inputs_preview(Some(&json!([1, 2])), 10), "[1,2]");

        let long = inputs_preview(Some(&json!({"command": "a".repeat(50)})), 10);
        assert_eq!(long.chars().count(), 10);
        assert!(long.ends_with('…'));
    }
}

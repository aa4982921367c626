//! Digest rendering.

use super::RankedGroup;
use super::normalizer::collapse_whitespace;
use crate::config::DigestConfig;
use crate::models::ProjectIdentity;

/// Marker appended to truncated text.
pub const ELLIPSIS: char = '…';

/// Digest title line.
pub const TITLE: &str = "# Learnings from recent tool failures";

/// Heading above the group list.
pub const SUBHEADING: &str = "## Top failure patterns";

/// Truncates `text` to at most `limit` characters.
///
/// Text longer than the limit keeps its first `limit - 1` characters followed
/// by [`ELLIPSIS`], so the result is exactly `limit` characters long. Shorter
/// text is returned unchanged. Lengths count `char`s, never bytes, so the cut
/// always lands on a character boundary.
///
/// ```rust
/// use faildigest::services::digest::truncate_chars;
///
/// assert_eq!(truncate_chars("permission denied", 10), "permissio…");
/// assert_eq!(truncate_chars("short", 10), "short");
/// ```
#[must_use]
pub fn truncate_chars(text: &str, limit: usize) -> String {
    if limit == 0 {
        return String::new();
    }
    match text.char_indices().nth(limit) {
        None => text.to_string(),
        Some(_) => {
            let keep = text
                .char_indices()
                .nth(limit - 1)
                .map_or(text.len(), |(idx, _)| idx);
            let mut truncated = String::with_capacity(keep + ELLIPSIS.len_utf8());
            truncated.push_str(&text[..keep]);
            truncated.push(ELLIPSIS);
            truncated
        },
    }
}

/// Renders ranked groups into the digest text.
///
/// Returns an empty string when there are no groups; callers skip rendering
/// entirely in that case, so an empty digest never carries a header.
#[must_use]
pub fn render(identity: &ProjectIdentity, groups: &[RankedGroup], config: &DigestConfig) -> String {
    if groups.is_empty() {
        return String::new();
    }

    let limits = &config.limits;
    let mut lines = vec![
        TITLE.to_string(),
        format!(
            "Repo: {} | Folder: {}",
            collapse_whitespace(&identity.repo_name),
            collapse_whitespace(&identity.folder_name)
        ),
        format!(
            "Recurring tool failures from the last {} days for this project; avoid repeating them.",
            config.windows.max_age_days
        ),
        String::new(),
        SUBHEADING.to_string(),
    ];

    for ranked in groups {
        let group = &ranked.group;
        lines.push(summary_line(ranked));
        lines.push(format!(
            "  Error: {}",
            truncate_chars(
                &collapse_whitespace(&group.representative_error),
                limits.max_error_chars
            )
        ));
        if !group.representative_inputs_preview.is_empty() {
            lines.push(format!(
                "  Inputs: {}",
                truncate_chars(&group.representative_inputs_preview, limits.max_input_chars)
            ));
        }
        if let Some(hint) = ranked.hint {
            lines.push(format!("  Try: {hint}"));
        }
        lines.push(String::new());
    }

    let block = lines.join("\n");
    truncate_chars(block.trim_end(), limits.max_total_chars)
}

/// One-line summary of a group.
///
/// Tool names and run ids come from the trace store verbatim; whitespace in
/// them is collapsed so a summary always stays on one line.
#[must_use]
pub fn summary_line(ranked: &RankedGroup) -> String {
    let group = &ranked.group;
    format!(
        "- {} • {}× • last_seen={} • run_id={}",
        collapse_whitespace(&group.tool_name),
        group.count,
        group.last_seen,
        collapse_whitespace(&group.representative_run_id_prefix)
    )
}

//! Remediation hints.
//!
//! Hints are an ordered table of rules. Each rule looks at the lower-cased
//! tool name and error text of a group's representative failure; the first
//! rule that matches supplies the hint. Order matters: a shell `cd` into a
//! missing directory reports `no such file or directory` and is therefore
//! answered by the missing-binary rule before the more specific shell rule
//! gets a look.
//!
//! | Rule | Matches |
//! |------|---------|
//! | `project-root` | Project root variable reported unset or missing |
//! | `missing-binary` | `command not found`, `no such file or directory` |
//! | `permission` | `permission denied`, `operation not permitted` |
//! | `malformed-json` | JSON decode and parse failures |
//! | `rate-limit` | Rate limiting, HTTP 429 |
//! | `timeout` | `timeout`, `timed out` |
//! | `shell-cwd` | Shell tool failing to `cd` into a missing path |

/// Lower-cased view of a failure, used only for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HintContext {
    /// Lower-cased tool name.
    pub tool: String,
    /// Lower-cased error text.
    pub error: String,
}

impl HintContext {
    /// Builds a matching context; the inputs are not modified.
    #[must_use]
    pub fn new(tool: &str, error: &str) -> Self {
        Self {
            tool: tool.to_lowercase(),
            error: error.to_lowercase(),
        }
    }

    fn error_has_any(&self, needles: &[&str]) -> bool {
        needles.iter().any(|n| self.error.contains(n))
    }
}

/// A remediation rule.
#[derive(Debug, Clone, Copy)]
pub struct HintRule {
    /// Stable rule name, used in logs and reports.
    pub name: &'static str,
    /// Predicate over the lower-cased failure.
    pub matches: fn(&HintContext) -> bool,
    /// One-sentence remediation.
    pub message: &'static str,
}

/// Hint rules in priority order.
pub static HINT_RULES: &[HintRule] = &[
    HintRule {
        name: "project-root",
        matches: mentions_unset_project_root,
        message: "Set CLAUDE_PROJECT_DIR to the git top-level directory (git rev-parse --show-toplevel) before the hook runs.",
    },
    HintRule {
        name: "missing-binary",
        matches: mentions_missing_binary,
        message: "Verify the required binaries are installed and on PATH (check with `command -v <name>`).",
    },
    HintRule {
        name: "permission",
        matches: mentions_permission_failure,
        message: "Check file permissions and sandbox restrictions, and write under the project directory instead of system paths.",
    },
    HintRule {
        name: "malformed-json",
        matches: mentions_malformed_json,
        message: "Validate the hook input before parsing it and guard the JSON parser with a fallback for empty or partial payloads.",
    },
    HintRule {
        name: "rate-limit",
        matches: mentions_rate_limit,
        message: "Reduce how often the store is queried or narrow the filters, and cache results between sessions.",
    },
    HintRule {
        name: "timeout",
        matches: mentions_timeout,
        message: "Use a smaller query or raise the timeout.",
    },
    HintRule {
        name: "shell-cwd",
        matches: shell_cd_into_missing_path,
        message: "Double-check the working directory before changing into it and prefer absolute paths.",
    },
];

/// Returns the first rule matching the failure.
#[must_use]
pub fn matching_rule(tool: &str, error: &str) -> Option<&'static HintRule> {
    let ctx = HintContext::new(tool, error);
    HINT_RULES.iter().find(|rule| (rule.matches)(&ctx))
}

/// Returns the remediation for a failure, if a rule matches.
#[must_use]
pub fn hint_for(tool: &str, error: &str) -> Option<&'static str> {
    matching_rule(tool, error).map(|rule| rule.message)
}

fn mentions_unset_project_root(ctx: &HintContext) -> bool {
    let names_root = ctx.error_has_any(&["claude_project_dir", "project_root", "project root"]);
    names_root
        && ctx.error_has_any(&["not set", "unset", "unbound", "missing", "undefined", "empty"])
}

fn mentions_missing_binary(ctx: &HintContext) -> bool {
    ctx.error_has_any(&["command not found", "no such file or directory"])
}

fn mentions_permission_failure(ctx: &HintContext) -> bool {
    ctx.error_has_any(&["permission denied", "operation not permitted"])
}

fn mentions_malformed_json(ctx: &HintContext) -> bool {
    ctx.error_has_any(&[
        "jsondecodeerror",
        "json decode",
        "invalid json",
        "malformed json",
        "json parse",
        "expecting value",
        "unexpected token",
        "unexpected end of json",
    ])
}

fn mentions_rate_limit(ctx: &HintContext) -> bool {
    ctx.error_has_any(&["rate limit", "rate-limit", "ratelimit", "too many requests", "429"])
}

fn mentions_timeout(ctx: &HintContext) -> bool {
    ctx.error_has_any(&["timeout", "timed out"])
}

fn is_shell_tool(tool: &str) -> bool {
    tool == "sh" || tool.contains("bash") || tool.contains("shell")
}

fn shell_cd_into_missing_path(ctx: &HintContext) -> bool {
    is_shell_tool(&ctx.tool)
        && ctx.error_has_any(&["cd ", "cd:"])
        && ctx.error.contains("no such file")
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("bash", "CLAUDE_PROJECT_DIR: unbound variable", "project-root"; "unbound project dir")]
    #[test_case("bash", "project root is not set", "project-root"; "project root not set")]
    #[test_case("bash", "zsh: command not found: rg", "missing-binary"; "command not found")]
    #[test_case("read", "ENOENT: No such file or directory", "missing-binary"; "enoent")]
    #[test_case("write", "EACCES: Permission denied", "permission"; "permission denied")]
    #[test_case("bash", "rm: Operation not permitted", "permission"; "not permitted")]
    #[test_case("hook", "json.decoder.JSONDecodeError: Expecting value", "malformed-json"; "python json")]
    #[test_case("hook", "SyntaxError: Unexpected token } in JSON", "malformed-json"; "js json")]
    #[test_case("fetch", "HTTP 429 Too Many Requests", "rate-limit"; "http 429")]
    #[test_case("fetch", "Rate limit exceeded", "rate-limit"; "rate limit")]
    #[test_case("fetch", "request timed out after 30s", "timeout"; "timed out")]
    #[test_case("fetch", "ReadTimeout", "timeout"; "timeout word")]
    #[test_case("Bash", "cd: /work/app: No such file", "shell-cwd"; "shell cd")]
    #[test_case("run_shell", "cd /nope failed: no such file", "shell-cwd"; "shell tool variant")]
    fn test_rule_matches(tool: &str, error: &str, expected: &str) {
        let rule = matching_rule(tool, error).unwrap();
        assert_eq!(rule.name, expected);
    }

    #[test_case("bash", "exit status 1"; "generic failure")]
    #[test_case("read", "cd: /work/app: No such file"; "cd outside shell")]
    #[test_case("bash", "CLAUDE_PROJECT_DIR=/work"; "project dir without failure")]
    #[test_case("", ""; "empty")]
    fn test_no_hint(tool: &str, error: &str) {
        assert!(hint_for(tool, error).is_none());
    }

    #[test]
    fn test_first_match_wins() {
        // Both permission and timeout phrases: permission is earlier.
        let rule = matching_rule("bash", "permission denied after timeout").unwrap();
        assert_eq!(rule.name, "permission");

        // A shell cd into a missing directory is answered by the binary rule.
        let rule = matching_rule("bash", "cd: /x: No such file or directory").unwrap();
        assert_eq!(rule.name, "missing-binary");
    }

    #[test]
    fn test_matching_does_not_mutate_inputs() {
        let tool = String::from("Bash");
        let error = String::from("Permission Denied");
        let _ = hint_for(&tool, &error);
        assert_eq!(tool, "Bash");
        assert_eq!(error, "Permission Denied");
    }

    #[test]
    fn test_rule_names_unique() {
        let mut names: Vec<&str> = HINT_RULES.iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), HINT_RULES.len());
    }
}

//! Hook Edge Case Tests
//!
//! Tests the session-start hook with edge cases, focusing on:
//! - Malformed input handling
//! - Empty/missing fields
//! - Project detection from the input `cwd`
//! - Graceful degradation without a run source
//! - Hook response format compliance
//!
//! These tests run without external services; runs come from memory and
//! repositories are created in temporary directories.

// Integration tests use expect/unwrap for simplicity - panics are acceptable in tests
#![allow(
    clippy::expect_used,
    clippy::unwrap_used,
    clippy::panic,
    clippy::missing_const_for_fn
)]

use chrono::{Duration, Utc};
use faildigest::hooks::{HookHandler, SessionStartHandler};
use faildigest::models::{ProjectIdentity, RawRun};
use faildigest::services::RunFetcher;
use faildigest::sources::InMemorySource;
use serde_json::{Value, json};
use std::sync::Arc;
use test_case::test_case;

fn api_runs() -> Vec<RawRun> {
    let now = Utc::now();
    vec![
        RawRun::tool("5f0c2a9e-aaaa", "bash", "permission denied: /tmp/x")
            .with_start_time(now)
            .with_metadata("repo_name", "api"),
        RawRun::tool("7a1b3c4d-bbbb", "bash", "permission denied: /tmp/y")
            .with_start_time(now - Duration::hours(1))
            .with_metadata("repo_name", "api"),
    ]
}

fn fetcher(runs: Vec<RawRun>) -> RunFetcher {
    RunFetcher::new(Arc::new(InMemorySource::new(runs)))
}

fn parse(response: &str) -> Value {
    serde_json::from_str(response).expect("hook response must be JSON")
}

// ============================================================================
// Input handling
// ============================================================================

#[test_case(""; "empty")]
#[test_case("   \n"; "whitespace")]
#[test_case("not valid json {{{{"; "garbage")]
#[test_case("[]"; "array")]
#[test_case("null"; "null")]
#[test_case(r#"{"session_id": 42}"#; "wrong field type")]
#[test_case(r#"{"cwd": ""}"#; "empty cwd")]
fn test_tolerates_bad_input(input: &str) {
    let handler = SessionStartHandler::new()
        .with_fetcher(fetcher(api_runs()))
        .with_identity(ProjectIdentity::new("api", "api"));

    let response = parse(&handler.handle(input).unwrap());
    assert!(response["hookSpecificOutput"]["additionalContext"]
        .as_str()
        .unwrap()
        .contains("bash • 2×"));
}

#[test]
fn test_unknown_fields_ignored() {
    let handler = SessionStartHandler::new()
        .with_fetcher(fetcher(api_runs()))
        .with_identity(ProjectIdentity::new("api", "api"));
    let input = json!({
        "session_id": "s-1",
        "hook_event_name": "SessionStart",
        "source": "resume",
        "transcript_path": "/tmp/t.jsonl",
        "nested": {"a": [1, 2, 3]}
    });

    let response = parse(&handler.handle(&input.to_string()).unwrap());
    assert!(response.get("hookSpecificOutput").is_some());
}

// ============================================================================
// Response format
// ============================================================================

#[test]
fn test_envelope_shape() {
    let handler = SessionStartHandler::new()
        .with_fetcher(fetcher(api_runs()))
        .with_identity(ProjectIdentity::new("api", "api-feature"));

    let response = parse(&handler.handle("{}").unwrap());
    let object = response.as_object().unwrap();
    assert_eq!(object.len(), 1);

    let output = &response["hookSpecificOutput"];
    assert_eq!(output["hookEventName"], "SessionStart");
    let context = output["additionalContext"].as_str().unwrap();
    assert!(context.starts_with("# Learnings from recent tool failures\n"));
    assert!(context.contains("Repo: api | Folder: api-feature"));
    assert!(context.contains("  Try: "));
}

#[test]
fn test_no_learnings_is_empty_object() {
    let handler = SessionStartHandler::new()
        .with_fetcher(fetcher(Vec::new()))
        .with_identity(ProjectIdentity::new("api", "api"));
    assert_eq!(handler.handle("{}").unwrap(), "{}");
}

#[test]
fn test_without_source_is_empty_object() {
    let handler = SessionStartHandler::default();
    assert_eq!(handler.handle("").unwrap(), "{}");
    assert_eq!(handler.handle("{}").unwrap(), "{}");
}

// ============================================================================
// Project detection
// ============================================================================

mod detection {
    use super::*;
    use git2::Repository;
    use tempfile::TempDir;

    #[test]
    fn test_identity_from_input_cwd() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("checkout");
        let repo = Repository::init(&root).unwrap();
        repo.remote("origin", "git@github.com:acme/api.git").unwrap();

        let handler = SessionStartHandler::new().with_fetcher(fetcher(api_runs()));
        let input = json!({"cwd": root}).to_string();

        let response = parse(&handler.handle(&input).unwrap());
        let context = response["hookSpecificOutput"]["additionalContext"]
            .as_str()
            .unwrap();
        assert!(context.contains("Repo: api | Folder: checkout"));
    }

    #[test]
    fn test_other_repository_gets_nothing() {
        let dir = TempDir::new().unwrap();
        let root = dir.path().join("billing");
        let repo = Repository::init(&root).unwrap();
        repo.remote("origin", "https://github.com/acme/billing.git")
            .unwrap();

        let handler = SessionStartHandler::new().with_fetcher(fetcher(api_runs()));
        let input = json!({"cwd": root}).to_string();
        assert_eq!(handler.handle(&input).unwrap(), "{}");
    }

    #[test]
    fn test_non_repository_cwd_gets_nothing() {
        let dir = TempDir::new().unwrap();
        let handler = SessionStartHandler::new().with_fetcher(fetcher(api_runs()));
        let input = json!({"cwd": dir.path()}).to_string();
        assert_eq!(handler.handle(&input).unwrap(), "{}");
    }
}

//! # Faildigest
//!
//! Session-start learnings built from recent tool-invocation failures.
//!
//! A trace store records every tool call an assistant makes in a project.
//! Faildigest reads the failed ones from the last week, folds near-identical
//! errors together, ranks what keeps happening, attaches a short remediation
//! where one is known, and renders a size-bounded block of text that a
//! session-start hook can inject into the next session.
//!
//! ## Pipeline
//!
//! ```text
//! runs ─► normalize ─► group ─► rank ─► hint ─► render ─► digest text
//! ```
//!
//! The pipeline is a pure function of the runs, the project identity, the
//! configured limits and the invocation time. Everything that touches the
//! outside world (git discovery, reading runs, hook I/O) lives in
//! [`context`], [`sources`], [`services::fetch`] and [`hooks`].
//!
//! ## Example
//!
//! ```rust
//! use chrono::Utc;
//! use faildigest::models::{ProjectIdentity, RawRun};
//! use faildigest::services::DigestService;
//! use faildigest::config::DigestConfig;
//!
//! let now = Utc::now();
//! let runs = vec![
//!     RawRun::tool("run-1", "bash", "permission denied: /tmp/x").with_start_time(now),
//! ];
//! let service = DigestService::new(DigestConfig::default());
//! let digest = service.render(&ProjectIdentity::new("api", "api"), &runs, now);
//! assert!(digest.contains("bash • 1×"));
//! ```

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![warn(missing_docs)]
#![forbid(unsafe_code)]
#![allow(clippy::multiple_crate_versions)]

use thiserror::Error as ThisError;

// Module declarations
pub mod config;
pub mod context;
pub mod hooks;
pub mod models;
pub mod observability;
pub mod services;
pub mod sources;

// Re-exports for convenience
pub use config::{DigestConfig, DigestLimits, DigestWindows, FaildigestConfig};
pub use models::{FailureGroup, FailureRecord, ProjectIdentity, RawRun, RunType};
pub use services::{DigestService, RunFetcher};
pub use sources::{QueryStrategy, RunQuery, RunSource};

/// Error type for faildigest operations.
///
/// The digest pipeline itself never fails; these errors come from the
/// surrounding plumbing and are degraded to "no learnings" at the hook
/// boundary.
///
/// | Variant | Raised When |
/// |---------|-------------|
/// | `InvalidInput` | Unparseable query strategy, bad config value, bad CLI argument |
/// | `OperationFailed` | Config or run file cannot be read or parsed, log file cannot be opened |
/// | `Timeout` | A run source did not answer within the fetch budget |
#[derive(Debug, ThisError)]
pub enum Error {
    /// Invalid input was provided.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// An operation failed.
    #[error("operation '{operation}' failed: {cause}")]
    OperationFailed {
        /// The operation that failed.
        operation: String,
        /// The underlying cause.
        cause: String,
    },

    /// An operation exceeded its wall-clock budget.
    #[error("operation '{operation}' timed out after {timeout_ms}ms")]
    Timeout {
        /// The operation that timed out.
        operation: String,
        /// The budget that was exceeded.
        timeout_ms: u64,
    },
}

/// Result type alias for faildigest operations.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::InvalidInput("test error".to_string());
        assert_eq!(err.to_string(), "invalid input: test error");

        let err = Error::OperationFailed {
            operation: "read_runs".to_string(),
            cause: "failed".to_string(),
        };
        assert_eq!(err.to_string(), "operation 'read_runs' failed: failed");

        let err = Error::Timeout {
            operation: "fetch_runs".to_string(),
            timeout_ms: 5000,
        };
        assert_eq!(
            err.to_string(),
            "operation 'fetch_runs' timed out after 5000ms"
        );
    }
}

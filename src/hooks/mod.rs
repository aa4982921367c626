//! Assistant hooks.
//!
//! Implements handlers for hook events emitted by the coding assistant.
//!
//! # Hook Response JSON Format
//!
//! Context-injecting hooks answer with `hookSpecificOutput`:
//!
//! | Event | `hookEventName` | `additionalContext` Content |
//! |-------|-----------------|----------------------------|
//! | Session start | `SessionStart` | Learnings from recent tool failures |
//!
//! Example response:
//!
//! ```json
//! {
//!   "hookSpecificOutput": {
//!     "hookEventName": "SessionStart",
//!     "additionalContext": "# Learnings from recent tool failures\n..."
//!   }
//! }
//! ```
//!
//! ## Empty Response
//!
//! When there is nothing to inject, handlers return an empty object `{}`.
//!
//! # Handler Configuration
//!
//! Handlers use a builder pattern for dependency injection:
//!
//! | Handler | Required Service | Builder Method |
//! |---------|-----------------|----------------|
//! | [`SessionStartHandler`] | [`RunFetcher`](crate::services::RunFetcher) | `with_fetcher()` |
//!
//! Handlers degrade gracefully when required services are not configured,
//! returning `{}` and logging debug messages.

mod session_start;

pub use session_start::{SessionStartHandler, SessionStartInput};

use crate::Result;
use serde_json::{Value, json};

/// Trait for hook handlers.
pub trait HookHandler: Send + Sync {
    /// The hook event type this handler processes.
    fn event_type(&self) -> &'static str;

    /// Handles the hook event.
    ///
    /// # Errors
    ///
    /// Returns an error if the response cannot be serialized.
    fn handle(&self, input: &str) -> Result<String>;
}

/// Builds the response value for a context-injecting hook.
///
/// Empty context yields `{}`.
#[must_use]
pub fn context_response(event_name: &str, context: &str) -> Value {
    if context.is_empty() {
        return json!({});
    }
    json!({
        "hookSpecificOutput": {
            "hookEventName": event_name,
            "additionalContext": context,
        }
    })
}

/// Serializes a hook response.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn serialize_response(response: &Value) -> Result<String> {
    serde_json::to_string(response).map_err(|e| crate::Error::OperationFailed {
        operation: "serialize_response".to_string(),
        cause: e.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_context_is_empty_object() {
        assert_eq!(context_response("SessionStart", ""), json!({}));
    }

    #[test]
    fn test_context_envelope() {
        let response = context_response("SessionStart", "# Learnings");
        assert_eq!(
            response["hookSpecificOutput"]["hookEventName"],
            "SessionStart"
        );
        assert_eq!(
            response["hookSpecificOutput"]["additionalContext"],
            "# Learnings"
        );
        assert_eq!(
            serialize_response(&context_response("SessionStart", "")).unwrap(),
            "{}"
        );
    }
}

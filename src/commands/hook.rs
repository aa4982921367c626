//! Hook command handler.
//!
//! Contains the implementation of the `hook` CLI command for
//! assistant hook event handling.

use faildigest::config::FaildigestConfig;
use faildigest::hooks::{HookHandler, SessionStartHandler};
use faildigest::observability::{RequestContext, enter_request_context};
use faildigest::services::{DigestService, RunFetcher};
use tracing::info_span;

use super::{HookEvent, open_source};

/// Hook command.
///
/// Always prints a valid response. Digest problems degrade to `{}` so the
/// host session is never blocked by this hook.
pub fn cmd_hook(
    event: HookEvent,
    config: &FaildigestConfig,
) -> Result<(), Box<dyn std::error::Error>> {
    let request_context = RequestContext::new();
    let request_id = request_context.request_id().to_string();
    let _request_guard = enter_request_context(request_context);
    let span = info_span!(
        "faildigest.hook.invoke",
        request_id = %request_id,
        component = "hooks",
        operation = "invoke",
        hook = event.as_str()
    );
    let _span_guard = span.enter();

    let input = read_hook_input().unwrap_or_else(|e| {
        tracing::warn!(error = %e, "Failed to read hook input, using defaults");
        "{}".to_string()
    });

    let response = match event {
        HookEvent::SessionStart => session_start_handler(config).handle(&input),
    };

    let response = response.unwrap_or_else(|e| {
        tracing::warn!(error = %e, hook = event.as_str(), "Hook failed, returning empty response");
        "{}".to_string()
    });

    // Output response (already JSON string)
    println!("{response}");

    Ok(())
}

/// Builds the session-start handler from configuration.
///
/// The runs file is the only source a hook can use; stdin carries the hook
/// input.
fn session_start_handler(config: &FaildigestConfig) -> SessionStartHandler {
    let handler = SessionStartHandler::new().with_digest(DigestService::new(config.digest));

    let Some(path) = config.source.runs_path.as_deref() else {
        return handler;
    };
    if path.as_os_str() == "-" {
        tracing::warn!("Runs cannot be read from stdin in a hook, skipping digest");
        return handler;
    }

    match open_source(path) {
        Ok(source) => handler.with_fetcher(RunFetcher::from_config(source, config)),
        Err(e) => {
            tracing::warn!(error = %e, "Failed to open run source");
            handler
        },
    }
}

/// Reads hook input from stdin as a string.
fn read_hook_input() -> Result<String, Box<dyn std::error::Error>> {
    use std::io::{self, Read};

    let mut input = String::new();
    io::stdin().read_to_string(&mut input)?;

    if input.trim().is_empty() {
        Ok("{}".to_string())
    } else {
        Ok(input)
    }
}

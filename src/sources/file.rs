//! File-backed run source.

use super::{RunQuery, RunSource};
use crate::models::RawRun;
use crate::{Error, Result};
use serde_json::Value;
use std::path::{Path, PathBuf};

/// Reads runs exported from a trace store.
///
/// The file is read on every query; nothing is cached between invocations.
/// Both a JSON array of runs and JSON Lines (one run per line) are accepted.
#[derive(Debug, Clone)]
pub struct JsonFileSource {
    path: PathBuf,
}

impl JsonFileSource {
    /// Creates a source reading from `path`.
    #[must_use]
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Returns the file path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn load(&self) -> Result<Vec<RawRun>> {
        let contents =
            std::fs::read_to_string(&self.path).map_err(|e| Error::OperationFailed {
                operation: "read_runs_file".to_string(),
                cause: format!("{}: {e}", self.path.display()),
            })?;
        Ok(parse_runs(&contents))
    }
}

impl RunSource for JsonFileSource {
    fn name(&self) -> &'static str {
        "json_file"
    }

    fn query(&self, query: &RunQuery) -> Result<Vec<RawRun>> {
        let runs = self.load()?;
        let total = runs.len();
        let selected = query.apply(runs);
        tracing::debug!(
            path = %self.path.display(),
            strategy = %query.strategy,
            total,
            selected = selected.len(),
            "Queried runs file"
        );
        Ok(selected)
    }
}

/// Parses exported runs.
///
/// Text starting with `[` is read as a JSON array; if that fails, or the text
/// is anything else, it is read as JSON Lines. Blank lines are ignored. An
/// array element or line that does not parse as a run is skipped with a
/// warning; the rest of the file is still read.
#[must_use]
pub fn parse_runs(contents: &str) -> Vec<RawRun> {
    let trimmed = contents.trim_start();
    if trimmed.starts_with('[') {
        match serde_json::from_str::<Vec<Value>>(trimmed) {
            Ok(values) => return parse_array(values),
            Err(e) => {
                tracing::debug!(error = %e, "Runs are not a JSON array, trying JSON Lines");
            },
        }
    }

    contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .filter_map(|(idx, line)| match serde_json::from_str::<RawRun>(line) {
            Ok(run) => Some(run),
            Err(e) => {
                tracing::warn!(line = idx + 1, error = %e, "Skipping malformed run");
                None
            },
        })
        .collect()
}

fn parse_array(values: Vec<Value>) -> Vec<RawRun> {
    values
        .into_iter()
        .enumerate()
        .filter_map(|(idx, value)| match serde_json::from_value::<RawRun>(value) {
            Ok(run) => Some(run),
            Err(e) => {
                tracing::warn!(index = idx, error = %e, "Skipping malformed run");
                None
            },
        })
        .collect()
}

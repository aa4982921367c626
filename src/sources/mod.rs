//! Run sources.
//!
//! A [`RunSource`] answers one [`RunQuery`] at a time: "failed runs for this
//! repository, newer than `since`, at most `limit`, newest first". How a
//! repository is recognised in the trace store has changed over time, so a
//! query carries a [`QueryStrategy`] and the fetcher tries several of them in
//! order (see [`RunFetcher`](crate::services::RunFetcher)).
//!
//! | Source | Backing |
//! |--------|---------|
//! | [`JsonFileSource`] | Exported runs as a JSON array or JSON Lines file |
//! | [`InMemorySource`] | Runs already in memory (stdin, tests) |

mod file;
mod memory;
mod strategy;

pub use file::{JsonFileSource, parse_runs};
pub use memory::InMemorySource;
pub use strategy::QueryStrategy;

use crate::Result;
use crate::models::RawRun;
use chrono::{DateTime, Utc};

/// One request against a run source.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunQuery {
    /// Repository the runs must belong to.
    pub repo_name: String,
    /// How repository membership is decided.
    pub strategy: QueryStrategy,
    /// Runs that started before this instant are excluded. Runs without a
    /// start time are kept.
    pub since: DateTime<Utc>,
    /// Maximum number of runs returned.
    pub limit: usize,
    /// Only return runs that carry an error.
    pub errors_only: bool,
}

impl RunQuery {
    /// Returns `true` if a run satisfies every condition of this query.
    #[must_use]
    pub fn matches(&self, run: &RawRun) -> bool {
        if self.errors_only && !run.is_error() {
            return false;
        }
        if run.start_time.is_some_and(|ts| ts < self.since) {
            return false;
        }
        self.strategy.matches(run, &self.repo_name)
    }

    /// Filters runs through this query, orders them newest first (runs
    /// without a start time last, in arrival order) and applies the limit.
    #[must_use]
    pub fn apply<I>(&self, runs: I) -> Vec<RawRun>
    where
        I: IntoIterator<Item = RawRun>,
    {
        let mut selected: Vec<RawRun> = runs.into_iter().filter(|r| self.matches(r)).collect();
        selected.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        selected.truncate(self.limit);
        selected
    }
}

/// Trait for run sources.
pub trait RunSource: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Returns the runs matching the query, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store cannot be read.
    fn query(&self, query: &RunQuery) -> Result<Vec<RawRun>>;
}

//! In-memory run source.

use super::{RunQuery, RunSource};
use crate::Result;
use crate::models::RawRun;

/// Serves runs that are already in memory, such as runs piped on stdin.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    runs: Vec<RawRun>,
}

impl InMemorySource {
    /// Creates a source over the given runs.
    #[must_use]
    pub const fn new(runs: Vec<RawRun>) -> Self {
        Self { runs }
    }

    /// Returns the number of runs held.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    /// Returns `true` if the source holds no runs.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl RunSource for InMemorySource {
    fn name(&self) -> &'static str {
        "in_memory"
    }

    fn query(&self, query: &RunQuery) -> Result<Vec<RawRun>> {
        Ok(query.apply(self.runs.iter().cloned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::QueryStrategy;
    use chrono::{DateTime, Utc};

    #[test]
    fn test_query_filters() {
        let source = InMemorySource::new(vec![
            RawRun::tool("r1", "bash", "boom").with_metadata("repo", "api"),
            RawRun::tool("r2", "bash", "boom").with_metadata("repo", "web"),
        ]);
        let query = RunQuery {
            repo_name: "api".to_string(),
            strategy: QueryStrategy::Metadata { key: "repo".into() },
            since: DateTime::<Utc>::MIN_UTC,
            limit: 10,
            errors_only: true,
        };

        let runs = source.query(&query).unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].id, "r1");
        assert_eq!(source.len(), 2);
        assert!(!source.is_empty());
    }
}

//! Project identity.

use serde::Serialize;
use std::fmt;

use super::UNKNOWN;

/// The project a digest is built for.
///
/// `repo_name` selects the runs; `folder_name` is only shown in the header so
/// a reader can tell worktrees and checkouts of the same repository apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectIdentity {
    /// Repository name, usually the last path segment of the origin remote.
    pub repo_name: String,
    /// Name of the working directory.
    pub folder_name: String,
}

impl ProjectIdentity {
    /// Creates a project identity.
    #[must_use]
    pub fn new(repo_name: impl Into<String>, folder_name: impl Into<String>) -> Self {
        Self {
            repo_name: repo_name.into(),
            folder_name: folder_name.into(),
        }
    }

    /// Returns `true` if the repository could not be identified.
    ///
    /// Runs are looked up by repository name, so an unknown identity never
    /// produces a digest.
    #[must_use]
    pub fn is_unknown(&self) -> bool {
        let repo = self.repo_name.trim();
        repo.is_empty() || repo == UNKNOWN
    }
}

impl Default for ProjectIdentity {
    fn default() -> Self {
        Self::new(UNKNOWN, UNKNOWN)
    }
}

impl fmt::Display for ProjectIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.repo_name, self.folder_name)
    }
}

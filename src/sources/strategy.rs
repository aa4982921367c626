//! Query strategies.

use crate::models::RawRun;
use crate::{Error, Result};
use serde::{Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// How a run is attributed to a repository.
///
/// Written in config as `metadata:<key>` or `tag:<prefix>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum QueryStrategy {
    /// Run metadata `key` equals the repository name.
    Metadata {
        /// Metadata key holding the repository name.
        key: String,
    },
    /// Run carries the tag `<prefix><repository name>`.
    Tag {
        /// Tag prefix; may be empty.
        prefix: String,
    },
}

impl QueryStrategy {
    /// Strategies tried when none are configured: the current metadata key
    /// first, then the one older tracers wrote.
    #[must_use]
    pub fn default_chain() -> Vec<Self> {
        vec![
            Self::Metadata {
                key: "repo_name".to_string(),
            },
            Self::Metadata {
                key: "repo".to_string(),
            },
        ]
    }

    /// Parses a comma-separated list of strategies.
    ///
    /// # Errors
    ///
    /// Returns an error if any entry is not a valid strategy.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        raw.split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::parse)
            .collect()
    }

    /// Returns `true` if the run belongs to `repo_name` under this strategy.
    #[must_use]
    pub fn matches(&self, run: &RawRun, repo_name: &str) -> bool {
        match self {
            Self::Metadata { key } => run.metadata_str(key) == Some(repo_name),
            Self::Tag { prefix } => run
                .tags
                .iter()
                .any(|tag| tag.strip_prefix(prefix.as_str()) == Some(repo_name)),
        }
    }
}

impl FromStr for QueryStrategy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let (kind, arg) = s.trim().split_once(':').ok_or_else(|| {
            Error::InvalidInput(format!(
                "query strategy '{s}' must look like 'metadata:<key>' or 'tag:<prefix>'"
            ))
        })?;

        match kind.trim().to_lowercase().as_str() {
            "metadata" => {
                let key = arg.trim();
                if key.is_empty() {
                    return Err(Error::InvalidInput(format!(
                        "query strategy '{s}' is missing a metadata key"
                    )));
                }
                Ok(Self::Metadata {
                    key: key.to_string(),
                })
            },
            "tag" => Ok(Self::Tag {
                prefix: arg.to_string(),
            }),
            other => Err(Error::InvalidInput(format!(
                "unknown query strategy kind '{other}'"
            ))),
        }
    }
}

impl fmt::Display for QueryStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Metadata { key } => write!(f, "metadata:{key}"),
            Self::Tag { prefix } => write!(f, "tag:{prefix}"),
        }
    }
}

impl Serialize for QueryStrategy {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

//! Configuration management.
//!
//! Configuration is layered once, in `main`, and then passed down by value:
//!
//! 1. Built-in defaults
//! 2. A TOML file (`--config`, or `faildigest/config.toml` in the platform
//!    config dir, or `~/.config/faildigest/config.toml`)
//! 3. Environment overrides (`FAILDIGEST_*`)
//!
//! Nothing below the CLI reads the environment.

mod limits;

pub use limits::{DigestConfig, DigestLimits, DigestWindows};

use crate::sources::QueryStrategy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default fetch budget in milliseconds.
pub const DEFAULT_FETCH_TIMEOUT_MS: u64 = 5_000;

/// Main configuration for faildigest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FaildigestConfig {
    /// Digest limits and windows.
    pub digest: DigestConfig,
    /// Run source configuration.
    pub source: SourceConfig,
    /// Logging settings.
    pub logging: LoggingSettings,
}

/// Where runs come from and how they are queried.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceConfig {
    /// Exported runs file (JSON array or JSON Lines).
    pub runs_path: Option<PathBuf>,
    /// Query strategies, tried in order until one yields runs.
    pub strategies: Vec<QueryStrategy>,
    /// Wall-clock budget for fetching runs, in milliseconds.
    pub fetch_timeout_ms: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            runs_path: None,
            strategies: QueryStrategy::default_chain(),
            fetch_timeout_ms: DEFAULT_FETCH_TIMEOUT_MS,
        }
    }
}

/// Logging section of the config file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggingSettings {
    /// Output format: `pretty` or `json`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    /// Filter directive, e.g. `faildigest=debug`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<String>,
    /// Append logs to this file instead of stderr.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Configuration file structure (for TOML parsing).
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    /// Digest section.
    pub digest: Option<ConfigFileDigest>,
    /// Source section.
    pub source: Option<ConfigFileSource>,
    /// Logging section.
    pub logging: Option<LoggingSettings>,
}

/// Digest section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileDigest {
    /// Maximum rendered groups.
    pub max_groups: Option<usize>,
    /// Maximum characters per error line.
    pub max_error_chars: Option<usize>,
    /// Maximum characters per inputs line.
    pub max_input_chars: Option<usize>,
    /// Maximum characters of the whole digest.
    pub max_total_chars: Option<usize>,
    /// Maximum runs requested from the source.
    pub max_runs: Option<usize>,
    /// Recent window in hours.
    pub recent_hours: Option<i64>,
    /// Maximum run age in days.
    pub max_age_days: Option<i64>,
}

/// Source section in config file.
#[derive(Debug, Deserialize, Default)]
#[serde(deny_unknown_fields)]
pub struct ConfigFileSource {
    /// Exported runs file.
    pub runs_path: Option<String>,
    /// Query strategies such as `metadata:repo_name` or `tag:repo:`.
    pub strategies: Option<Vec<String>>,
    /// Fetch budget in milliseconds.
    pub fetch_timeout_ms: Option<u64>,
}

impl Default for FaildigestConfig {
    fn default() -> Self {
        Self {
            digest: DigestConfig::default(),
            source: SourceConfig::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl FaildigestConfig {
    /// Creates a new configuration with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads configuration from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or if it names
    /// an unknown query strategy.
    pub fn load_from_file(path: &Path) -> crate::Result<Self> {
        let contents =
            std::fs::read_to_string(path).map_err(|e| crate::Error::OperationFailed {
                operation: "read_config_file".to_string(),
                cause: format!("{}: {e}", path.display()),
            })?;

        Self::from_toml(&contents)
    }

    /// Parses configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid config file.
    pub fn from_toml(contents: &str) -> crate::Result<Self> {
        let file: ConfigFile =
            toml::from_str(contents).map_err(|e| crate::Error::OperationFailed {
                operation: "parse_config_file".to_string(),
                cause: e.to_string(),
            })?;

        Self::from_config_file(file)
    }

    /// Loads configuration from the default location.
    ///
    /// Checks the following paths in order:
    /// 1. Platform-specific config dir (`~/Library/Application Support/faildigest/` on macOS)
    /// 2. XDG config dir (`~/.config/faildigest/` for Unix compatibility)
    ///
    /// Returns default configuration if no usable config file is found.
    #[must_use]
    pub fn load_default() -> Self {
        let Some(base_dirs) = directories::BaseDirs::new() else {
            return Self::default();
        };

        let candidates = [
            base_dirs.config_dir().join("faildigest").join("config.toml"),
            base_dirs
                .home_dir()
                .join(".config")
                .join("faildigest")
                .join("config.toml"),
        ];

        for path in candidates.iter().filter(|p| p.exists()) {
            match Self::load_from_file(path) {
                Ok(config) => return config,
                Err(e) => {
                    tracing::debug!(
                        path = %path.display(),
                        error = %e,
                        "Ignoring unusable config file"
                    );
                },
            }
        }

        Self::default()
    }

    /// Converts a `ConfigFile` to `FaildigestConfig`.
    fn from_config_file(file: ConfigFile) -> crate::Result<Self> {
        let mut config = Self::default();

        if let Some(digest) = file.digest {
            let limits = &mut config.digest.limits;
            if let Some(v) = digest.max_groups {
                limits.max_groups = v;
            }
            if let Some(v) = digest.max_error_chars {
                limits.max_error_chars = v;
            }
            if let Some(v) = digest.max_input_chars {
                limits.max_input_chars = v;
            }
            if let Some(v) = digest.max_total_chars {
                limits.max_total_chars = v;
            }
            if let Some(v) = digest.max_runs {
                limits.max_runs = v;
            }
            let windows = &mut config.digest.windows;
            if let Some(v) = digest.recent_hours {
                windows.recent_hours = v;
            }
            if let Some(v) = digest.max_age_days {
                windows.max_age_days = v;
            }
        }

        if let Some(source) = file.source {
            if let Some(path) = source.runs_path {
                config.source.runs_path = Some(PathBuf::from(path));
            }
            if let Some(strategies) = source.strategies {
                config.source.strategies = strategies
                    .iter()
                    .map(|s| s.parse())
                    .collect::<crate::Result<Vec<_>>>()?;
            }
            if let Some(v) = source.fetch_timeout_ms {
                config.source.fetch_timeout_ms = v;
            }
        }

        if let Some(logging) = file.logging {
            config.logging = logging;
        }

        Ok(config)
    }

    /// Applies `FAILDIGEST_*` overrides from the process environment.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Applies `FAILDIGEST_*` overrides using the given variable lookup.
    ///
    /// Values that fail to parse are ignored.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(path) = lookup("FAILDIGEST_RUNS_PATH").filter(|v| !v.trim().is_empty()) {
            self.source.runs_path = Some(PathBuf::from(path));
        }
        if let Some(raw) = lookup("FAILDIGEST_STRATEGIES") {
            match QueryStrategy::parse_list(&raw) {
                Ok(strategies) if !strategies.is_empty() => self.source.strategies = strategies,
                Ok(_) => {},
                Err(e) => tracing::debug!(error = %e, "Ignoring FAILDIGEST_STRATEGIES"),
            }
        }
        if let Some(v) = parse_env(&lookup, "FAILDIGEST_FETCH_TIMEOUT_MS") {
            self.source.fetch_timeout_ms = v;
        }

        let limits = &mut self.digest.limits;
        if let Some(v) = parse_env(&lookup, "FAILDIGEST_MAX_GROUPS") {
            limits.max_groups = v;
        }
        if let Some(v) = parse_env(&lookup, "FAILDIGEST_MAX_RUNS") {
            limits.max_runs = v;
        }
        if let Some(v) = parse_env(&lookup, "FAILDIGEST_MAX_ERROR_CHARS") {
            limits.max_error_chars = v;
        }
        if let Some(v) = parse_env(&lookup, "FAILDIGEST_MAX_INPUT_CHARS") {
            limits.max_input_chars = v;
        }
        if let Some(v) = parse_env(&lookup, "FAILDIGEST_MAX_TOTAL_CHARS") {
            limits.max_total_chars = v;
        }

        self
    }

    /// Sets the runs file.
    #[must_use]
    pub fn with_runs_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.source.runs_path = Some(path.into());
        self
    }

    /// Renders the configuration as TOML for display.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_toml(&self) -> crate::Result<String> {
        toml::to_string_pretty(self).map_err(|e| crate::Error::OperationFailed {
            operation: "serialize_config".to_string(),
            cause: e.to_string(),
        })
    }
}

fn parse_env<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
) -> Option<T> {
    let raw = lookup(key)?;
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        tracing::debug!(key, value = %raw, "Ignoring unparseable environment override");
    }
    parsed
}

//! Structured logging configuration.

use crate::config::LoggingSettings;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_subscriber::EnvFilter;

/// Default filter when neither the config nor the environment sets one.
pub const DEFAULT_FILTER: &str = "faildigest=warn";

/// Default filter with `--verbose`.
pub const VERBOSE_FILTER: &str = "faildigest=debug";

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// Human-readable, multi-line.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(crate::Error::InvalidInput(format!(
                "unknown log format '{other}' (expected 'pretty' or 'json')"
            ))),
        }
    }
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoggingConfig {
    /// Output format.
    pub format: LogFormat,
    /// Filter directives in `EnvFilter` syntax.
    pub directives: String,
    /// Append to this file instead of writing to stderr.
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    /// Builds logging configuration from config settings with env overrides.
    #[must_use]
    pub fn from_settings(settings: &LoggingSettings, verbose: bool) -> Self {
        Self::from_settings_with(settings, verbose, |key| std::env::var(key).ok())
    }

    /// Builds logging configuration using the given variable lookup.
    ///
    /// Precedence, highest first: `FAILDIGEST_LOG_FORMAT` / `FAILDIGEST_LOG_FILE`
    /// / `FAILDIGEST_LOG` (then `RUST_LOG`), the `[logging]` section, and
    /// finally the defaults. `verbose` only changes the default filter.
    #[must_use]
    pub fn from_settings_with(
        settings: &LoggingSettings,
        verbose: bool,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Self {
        let format = lookup("FAILDIGEST_LOG_FORMAT")
            .or_else(|| settings.format.clone())
            .and_then(|raw| raw.parse().ok())
            .unwrap_or_default();

        let file = lookup("FAILDIGEST_LOG_FILE")
            .or_else(|| settings.file.clone())
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
        let directives = lookup("FAILDIGEST_LOG")
            .or_else(|| lookup("RUST_LOG"))
            .or_else(|| settings.level.clone())
            .filter(|d| !d.trim().is_empty())
            .unwrap_or_else(|| default_filter.to_string());

        Self {
            format,
            directives,
            file,
        }
    }

    /// Same configuration, writing to stderr instead of a file.
    #[must_use]
    pub fn without_file(mut self) -> Self {
        self.file = None;
        self
    }

    /// Builds the event filter. Invalid directives fall back to the default.
    #[must_use]
    pub fn filter(&self) -> EnvFilter {
        EnvFilter::try_new(&self.directives).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            directives: DEFAULT_FILTER.to_string(),
            file: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use test_case::test_case;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test_case("json", LogFormat::Json; "json")]
    #[test_case("JSON", LogFormat::Json; "upper")]
    #[test_case("pretty", LogFormat::Pretty; "pretty")]
    #[test_case(" text ", LogFormat::Pretty; "text alias")]
    fn test_format_parse(raw: &str, expected: LogFormat) {
        assert_eq!(raw.parse::<LogFormat>().unwrap(), expected);
    }

    #[test]
    fn test_format_parse_rejects_unknown() {
        assert!("xml".parse::<LogFormat>().is_err());
    }

    #[test]
    fn test_defaults() {
        let config =
            LoggingConfig::from_settings_with(&LoggingSettings::default(), false, lookup(&[]));
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file.is_none());
        assert_eq!(config.directives, DEFAULT_FILTER);
    }

    #[test]
    fn test_without_file_keeps_format_and_filter() {
        let config = LoggingConfig::from_settings_with(
            &LoggingSettings::default(),
            false,
            lookup(&[
                ("FAILDIGEST_LOG_FORMAT", "json"),
                ("FAILDIGEST_LOG_FILE", "/nonexistent/dir/fd.log"),
                ("FAILDIGEST_LOG", "faildigest=info"),
            ]),
        )
        .without_file();

        assert!(config.file.is_none());
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.directives, "faildigest=info");
    }

    #[test]
    fn test_verbose_default_filter() {
        let config =
            LoggingConfig::from_settings_with(&LoggingSettings::default(), true, lookup(&[]));
        assert_eq!(config.directives, VERBOSE_FILTER);
    }

    #[test]
    fn test_settings_then_env() {
        let settings = LoggingSettings {
            format: Some("json".to_string()),
            level: Some("faildigest=info".to_string()),
            file: Some("/var/log/faildigest.log".to_string()),
        };

        let config = LoggingConfig::from_settings_with(&settings, true, lookup(&[]));
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.directives, "faildigest=info");
        assert_eq!(config.file, Some(PathBuf::from("/var/log/faildigest.log")));

        let config = LoggingConfig::from_settings_with(
            &settings,
            false,
            lookup(&[
                ("FAILDIGEST_LOG_FORMAT", "pretty"),
                ("RUST_LOG", "faildigest=trace"),
                ("FAILDIGEST_LOG_FILE", "/tmp/fd.log"),
            ]),
        );
        assert_eq!(config.format, LogFormat::Pretty);
        assert_eq!(config.directives, "faildigest=trace");
        assert_eq!(config.file, Some(PathBuf::from("/tmp/fd.log")));
    }

    #[test]
    fn test_faildigest_log_beats_rust_log() {
        let config = LoggingConfig::from_settings_with(
            &LoggingSettings::default(),
            false,
            lookup(&[("FAILDIGEST_LOG", "faildigest=info"), ("RUST_LOG", "trace")]),
        );
        assert_eq!(config.directives, "faildigest=info");
    }

    #[test]
    fn test_invalid_directives_still_build_a_filter() {
        let config = LoggingConfig::from_settings_with(
            &LoggingSettings::default(),
            false,
            lookup(&[("FAILDIGEST_LOG", "faildigest=[[[")]),
        );
        assert_eq!(config.directives, "faildigest=[[[");
        let _filter = config.filter();
    }

    #[test]
    fn test_bad_format_falls_back() {
        let config = LoggingConfig::from_settings_with(
            &LoggingSettings::default(),
            false,
            lookup(&[("FAILDIGEST_LOG_FORMAT", "xml")]),
        );
        assert_eq!(config.format, LogFormat::Pretty);
    }
}

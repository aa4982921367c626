//! Raw runs as exported by a trace store.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Kind of traced run.
///
/// Only [`RunType::Tool`] runs are admitted into a digest; model and chain
/// runs fail for reasons the next session cannot act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunType {
    /// A tool invocation.
    Tool,
    /// A language model call.
    Llm,
    /// A chain or agent step wrapping other runs.
    Chain,
    /// A retriever call.
    Retriever,
    /// A prompt formatting step.
    Prompt,
    /// An output parser step.
    Parser,
    /// An embedding call.
    Embedding,
    /// Anything the trace store reports that is not listed above.
    #[default]
    #[serde(other)]
    Other,
}

impl RunType {
    /// Returns the wire name of the run type.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Tool => "tool",
            Self::Llm => "llm",
            Self::Chain => "chain",
            Self::Retriever => "retriever",
            Self::Prompt => "prompt",
            Self::Parser => "parser",
            Self::Embedding => "embedding",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for RunType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A run record as delivered by a [`RunSource`](crate::sources::RunSource).
///
/// Every field is optional on the wire, and an explicit `null` reads the same
/// as a missing key. Fields of the wrong shape degrade instead of rejecting
/// the run: a non-string `error` reads as empty, an unparseable `start_time`
/// as absent, non-object `metadata` as empty and non-string tags are dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawRun {
    /// Run identifier assigned by the trace store.
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub id: String,
    /// Kind of run.
    #[serde(default, alias = "runType", deserialize_with = "null_as_default")]
    pub run_type: RunType,
    /// Tool (or model, or chain) name.
    #[serde(default, deserialize_with = "deserialize_lenient_string")]
    pub name: String,
    /// Error reported by the run, if it failed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<Value>,
    /// When the run started.
    #[serde(
        default,
        alias = "startTime",
        deserialize_with = "deserialize_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub start_time: Option<DateTime<Utc>>,
    /// Inputs the run was called with.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub inputs: Option<Value>,
    /// Free-form metadata attached by the tracer.
    #[serde(
        default,
        deserialize_with = "deserialize_metadata",
        skip_serializing_if = "Map::is_empty"
    )]
    pub metadata: Map<String, Value>,
    /// Tags attached by the tracer.
    #[serde(
        default,
        deserialize_with = "deserialize_tags",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub tags: Vec<String>,
}

impl RawRun {
    /// Creates a failed tool run.
    #[must_use]
    pub fn tool(id: impl Into<String>, name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            run_type: RunType::Tool,
            name: name.into(),
            error: Some(Value::String(error.into())),
            ..Self::default()
        }
    }

    /// Sets the run type.
    #[must_use]
    pub const fn with_run_type(mut self, run_type: RunType) -> Self {
        self.run_type = run_type;
        self
    }

    /// Sets the start time.
    #[must_use]
    pub const fn with_start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = Some(start_time);
        self
    }

    /// Sets the inputs.
    #[must_use]
    pub fn with_inputs(mut self, inputs: Value) -> Self {
        self.inputs = Some(inputs);
        self
    }

    /// Adds a metadata entry.
    #[must_use]
    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.push(tag.into());
        self
    }

    /// Returns the error text, or an empty string when the run has no error
    /// or the error is not a string.
    #[must_use]
    pub fn error_text(&self) -> &str {
        match &self.error {
            Some(Value::String(text)) => text,
            _ => "",
        }
    }

    /// Returns `true` if the run carries a non-blank error string.
    #[must_use]
    pub fn is_error(&self) -> bool {
        !self.error_text().trim().is_empty()
    }

    /// Returns a metadata value as a string slice, if present and a string.
    #[must_use]
    pub fn metadata_str(&self, key: &str) -> Option<&str> {
        self.metadata.get(key).and_then(Value::as_str)
    }
}

/// Parses a run timestamp leniently.
///
/// Accepts RFC 3339 with any offset, or a naive ISO-8601 timestamp which is
/// read as UTC. Anything else, including non-string values, is absent.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
        return Some(parsed.with_timezone(&Utc));
    }

    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

fn deserialize_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(raw)) => parse_timestamp(&raw),
        _ => None,
    })
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Strings pass through, numbers are stringified, anything else is empty.
fn deserialize_lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        _ => String::new(),
    })
}

fn deserialize_metadata<'de, D>(deserializer: D) -> Result<Map<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Object(map)) => map,
        _ => Map::new(),
    })
}

fn deserialize_tags<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|item| match item {
                Value::String(tag) => Some(tag),
                _ => None,
            })
            .collect(),
        _ => Vec::new(),
    })
}

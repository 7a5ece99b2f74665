//! # Probe Target Model
//!
//! Defines the endpoints whose liveness is verified.
//!
//! A target can be parsed from:
//! * A bare URL (e.g., `https://example.com/page`), which doubles as its identifier.
//! * A labeled URL (e.g., `docs=https://docs.rs`), where the label becomes the identifier.
//!
//! Only `http` and `https` endpoints are accepted.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;
use serde_json::Value;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TargetError {
    #[error("target must not be empty")]
    Empty,
    #[error("invalid url '{input}': {reason}")]
    InvalidUrl { input: String, reason: String },
    #[error("unsupported scheme '{0}', expected http or https")]
    UnsupportedScheme(String),
}

/// One endpoint to be checked for liveness.
///
/// Targets are immutable once built. The `id` is what tracks a target from
/// pass to pass, so two targets with the same URL but different ids are
/// reported separately.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Target {
    id: String,
    url: Url,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<Value>,
}

impl Target {
    /// Builds a target with an explicit identifier.
    pub fn new(id: impl Into<String>, url: &str) -> Result<Self, TargetError> {
        let url: Url = parse_url(url)?;
        let id: String = id.into();
        let id: String = if id.trim().is_empty() { url.to_string() } else { id };
        Ok(Self { id, url, metadata: None })
    }

    /// Builds a target identified by its own URL.
    pub fn from_url(url: &str) -> Result<Self, TargetError> {
        let url: Url = parse_url(url)?;
        Ok(Self {
            id: url.to_string(),
            url,
            metadata: None,
        })
    }

    /// Attaches opaque metadata. The engine never reads it.
    pub fn with_metadata(mut self, metadata: Value) -> Self {
        self.metadata = match metadata {
            Value::Null => None,
            Value::Object(ref map) if map.is_empty() => None,
            other => Some(other),
        };
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn metadata(&self) -> Option<&Value> {
        self.metadata.as_ref()
    }
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.id == self.url.as_str() {
            write!(f, "{}", self.url)
        } else {
            write!(f, "{} ({})", self.id, self.url)
        }
    }
}

impl FromStr for Target {
    type Err = TargetError;

    /// Parses a string into a `Target`.
    ///
    /// Supported formats:
    /// * **URL**: "https://example.com/a?b=c"
    /// * **Labeled**: "label=https://example.com"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(TargetError::Empty);
        }

        match split_label(s) {
            Some((label, url)) => Target::new(label, url),
            None => Target::from_url(s),
        }
    }
}

/// Splits "label=url" while leaving query strings alone.
fn split_label(s: &str) -> Option<(&str, &str)> {
    let (label, rest) = s.split_once('=')?;
    let label = label.trim();
    let looks_like_label = !label.is_empty()
        && !label.contains("://")
        && !label.contains(['/', '?', '#']);

    if looks_like_label && rest.contains("://") {
        Some((label, rest.trim()))
    } else {
        None
    }
}

fn parse_url(input: &str) -> Result<Url, TargetError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(TargetError::Empty);
    }

    let url = Url::parse(input).map_err(|e| TargetError::InvalidUrl {
        input: input.to_string(),
        reason: e.to_string(),
    })?;

    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(TargetError::UnsupportedScheme(other.to_string())),
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

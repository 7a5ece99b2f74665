//! Classified results of a single reachability check.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Why a target could not be confirmed live.
///
/// These are retryable outcomes, never faults. They only differ in what
/// they tell a human reading the report.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum Unreachable {
    /// The endpoint answered, but with a non-success status code.
    #[error("bad status {0}")]
    BadStatus(u16),
    /// No usable response: DNS, timeout, refused or reset connection.
    #[error("transport failure: {0}")]
    TransportFailure(String),
    /// Never probed: the schedule ended before the first pass.
    #[error("not probed")]
    Unprobed,
}

/// Result of one probe against one target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum ProbeOutcome {
    Live,
    Unreachable(Unreachable),
}

impl ProbeOutcome {
    pub fn bad_status(code: u16) -> Self {
        Self::Unreachable(Unreachable::BadStatus(code))
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Unreachable(Unreachable::TransportFailure(message.into()))
    }

    pub fn is_live(&self) -> bool {
        matches!(self, Self::Live)
    }

    /// Returns the failure reason, if any.
    pub fn into_unreachable(self) -> Option<Unreachable> {
        match self {
            Self::Live => None,
            Self::Unreachable(reason) => Some(reason),
        }
    }
}

impl fmt::Display for ProbeOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Live => write!(f, "live"),
            Self::Unreachable(reason) => write!(f, "unreachable ({reason})"),
        }
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

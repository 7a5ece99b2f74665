use std::fs;
use std::path::Path;

use anyhow::Context;
use serde::Serialize;
use serde_json::Value;

use reachr_common::outcome::Unreachable;
use reachr_core::executor::Failure;

#[derive(Serialize)]
struct UnresolvedEntry<'a> {
    id: &'a str,
    url: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    metadata: Option<&'a Value>,
    reason: &'a Unreachable,
}

impl<'a> From<&'a Failure> for UnresolvedEntry<'a> {
    fn from(failure: &'a Failure) -> Self {
        Self {
            id: failure.target.id(),
            url: failure.target.url().as_str(),
            metadata: failure.target.metadata(),
            reason: &failure.reason,
        }
    }
}

pub fn render_unresolved(unresolved: &[Failure]) -> serde_json::Result<String> {
    let entries: Vec<UnresolvedEntry<'_>> = unresolved.iter().map(UnresolvedEntry::from).collect();
    serde_json::to_string_pretty(&entries)
}

/// Writes the unresolved set as a JSON array, even when it is empty.
pub fn write_unresolved(path: &Path, unresolved: &[Failure]) -> anyhow::Result<()> {
    let json: String = render_unresolved(unresolved).context("serializing unresolved targets")?;
    fs::write(path, json + "\n").with_context(|| format!("writing {}", path.display()))
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

//! Reads the target list handed to `reachr check`.
//!
//! Two shapes are accepted:
//! * a JSON array whose entries are URL strings or objects with a `url`,
//!   an optional `id` and any other fields, which are kept as metadata;
//! * plain text, one target per line (`url` or `label=url`), where blank
//!   lines and `#` comments are skipped.

use std::fs;
use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;
use serde_json::{Map, Value};

use reachr_common::target::Target;

#[derive(Deserialize)]
#[serde(untagged)]
enum Entry {
    Url(String),
    Object(Map<String, Value>),
}

pub fn load_targets(path: &Path) -> anyhow::Result<Vec<Target>> {
    let raw: String =
        fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;

    let targets: Vec<Target> =
        parse_targets(&raw).with_context(|| format!("parsing {}", path.display()))?;

    if targets.is_empty() {
        bail!("{} contains no targets", path.display());
    }
    Ok(targets)
}

pub fn parse_targets(raw: &str) -> anyhow::Result<Vec<Target>> {
    if raw.trim_start().starts_with('[') {
        parse_json(raw)
    } else {
        parse_lines(raw)
    }
}

fn parse_json(raw: &str) -> anyhow::Result<Vec<Target>> {
    let entries: Vec<Entry> = serde_json::from_str(raw).context("invalid JSON target list")?;

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, entry)| from_entry(entry).with_context(|| format!("entry #{}", idx + 1)))
        .collect()
}

fn from_entry(entry: Entry) -> anyhow::Result<Target> {
    let mut fields: Map<String, Value> = match entry {
        Entry::Url(url) => return Ok(Target::from_url(&url)?),
        Entry::Object(fields) => fields,
    };

    let url: String = match fields.remove("url") {
        Some(Value::String(url)) => url,
        Some(_) => bail!("'url' must be a string"),
        None => bail!("missing 'url'"),
    };

    let id: String = match fields.remove("id") {
        Some(Value::String(id)) => id,
        Some(Value::Number(n)) => n.to_string(),
        Some(_) => bail!("'id' must be a string or a number"),
        None => String::new(),
    };

    Ok(Target::new(&id, &url)?.with_metadata(Value::Object(fields)))
}

fn parse_lines(raw: &str) -> anyhow::Result<Vec<Target>> {
    raw.lines()
        .enumerate()
        .map(|(idx, line)| (idx + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(lineno, line)| line.parse::<Target>().with_context(|| format!("line {lineno}")))
        .collect()
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝

//! Reading, parsing and writing `.git/config` files.
//!
//! The parser is line-based and lenient: blank lines, comments and entries
//! outside any section are skipped rather than rejected. Only the literal
//! values `true` and `false` coerce to booleans, so version-like values
//! such as `repositoryformatversion = 0` stay strings.

use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Error, Result};
use crate::io::{map_locate_error, read_file, write_file};

/// A single configuration value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GitValue {
    /// A literal `true` or `false`, or a key given without a value.
    Bool(bool),
    /// Any other value, kept verbatim.
    Text(String),
}

impl GitValue {
    /// Returns the boolean value, if this is one.
    #[must_use]
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            Self::Text(_) => None,
        }
    }

    /// Returns the text value, if this is one.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Bool(_) => None,
        }
    }
}

impl fmt::Display for GitValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// The body of one `[section]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GitSection {
    /// Plain `key = value` entries.
    Values(BTreeMap<String, GitValue>),
    /// Named subsections, as in `[remote "origin"]`.
    Subsections(BTreeMap<String, BTreeMap<String, GitValue>>),
}

/// A parsed git configuration, keyed by section name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GitConfig {
    /// Sections in name order.
    pub sections: BTreeMap<String, GitSection>,
}

impl GitConfig {
    /// Entries of a plain section such as `core`.
    #[must_use]
    pub fn section(&self, name: &str) -> Option<&BTreeMap<String, GitValue>> {
        match self.sections.get(name)? {
            GitSection::Values(values) => Some(values),
            GitSection::Subsections(_) => None,
        }
    }

    /// Entries of a subsection such as `remote "origin"`.
    #[must_use]
    pub fn subsection(&self, name: &str, sub: &str) -> Option<&BTreeMap<String, GitValue>> {
        match self.sections.get(name)? {
            GitSection::Subsections(subs) => subs.get(sub),
            GitSection::Values(_) => None,
        }
    }
}

fn parse_value(raw: &str) -> GitValue {
    let unquoted = raw
        .strip_prefix('"')
        .and_then(|rest| rest.strip_suffix('"'))
        .unwrap_or(raw);
    match unquoted {
        "true" => GitValue::Bool(true),
        "false" => GitValue::Bool(false),
        other => GitValue::Text(other.to_string()),
    }
}

/// Parses git config text. Never fails: malformed lines are skipped.
#[must_use]
pub fn parse_git_config(text: &str) -> GitConfig {
    #[derive(Default)]
    struct Acc {
        values: BTreeMap<String, GitValue>,
        subsections: BTreeMap<String, BTreeMap<String, GitValue>>,
    }

    let mut sections: BTreeMap<String, Acc> = BTreeMap::new();
    let mut current: Option<(String, Option<String>)> = None;

    for raw in text.lines() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(header) = line
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(']'))
        {
            let header = header.trim();
            let parsed = match header.split_once(' ') {
                Some((name, sub)) => (
                    name.trim().to_string(),
                    Some(sub.trim().trim_matches('"').to_string()),
                ),
                None => (header.to_string(), None),
            };
            sections.entry(parsed.0.clone()).or_default();
            current = Some(parsed);
            continue;
        }
        let Some((name, sub)) = &current else {
            continue;
        };
        let (key, value) = match line.split_once('=') {
            Some((key, value)) => (key.trim(), parse_value(value.trim())),
            // A key without a value is boolean true in git semantics.
            None => (line, GitValue::Bool(true)),
        };
        if key.is_empty() {
            continue;
        }
        let acc = sections.entry(name.clone()).or_default();
        match sub {
            Some(sub) => {
                acc.subsections
                    .entry(sub.clone())
                    .or_default()
                    .insert(key.to_string(), value);
            }
            None => {
                acc.values.insert(key.to_string(), value);
            }
        }
    }

    let mut out = BTreeMap::new();
    for (name, acc) in sections {
        let section = if acc.subsections.is_empty() {
            GitSection::Values(acc.values)
        } else {
            if !acc.values.is_empty() {
                warn!(
                    section = %name,
                    "section has both plain entries and subsections, keeping subsections"
                );
            }
            GitSection::Subsections(acc.subsections)
        };
        out.insert(name, section);
    }
    GitConfig { sections: out }
}

/// Renders a configuration back to git config text.
#[must_use]
pub fn stringify_git_config(config: &GitConfig) -> String {
    fn write_entries(out: &mut String, values: &BTreeMap<String, GitValue>) {
        for (key, value) in values {
            out.push_str(&format!("\t{key} = {value}\n"));
        }
    }

    let mut out = String::new();
    for (name, section) in &config.sections {
        match section {
            GitSection::Values(values) => {
                out.push_str(&format!("[{name}]\n"));
                write_entries(&mut out, values);
            }
            GitSection::Subsections(subsections) => {
                for (sub, values) in subsections {
                    out.push_str(&format!("[{name} \"{sub}\"]\n"));
                    write_entries(&mut out, values);
                }
            }
        }
    }
    out
}

/// Resolves the nearest `.git/config` from `from`.
///
/// # Errors
///
/// Returns [`Error::GitConfigNotFound`] when no enclosing repository exists.
pub fn resolve_git_config(from: impl AsRef<Path>) -> Result<PathBuf> {
    repokit_locate::find_nearest_file(&[".git/config"], from)
        .map_err(|err| map_locate_error(err, |start| Error::GitConfigNotFound { start }))
}

/// Reads and parses the nearest `.git/config` from `from`.
///
/// # Errors
///
/// Returns [`Error::GitConfigNotFound`] when no repository encloses `from`,
/// or an I/O error when the config cannot be read.
pub fn read_git_config(from: impl AsRef<Path>) -> Result<GitConfig> {
    let path = resolve_git_config(from)?;
    let text = read_file(&path, "reading git config")?;
    Ok(parse_git_config(&text))
}

/// Writes `config` to `path` in git config syntax.
///
/// # Errors
///
/// Returns an I/O error when the write fails.
pub fn write_git_config(path: impl AsRef<Path>, config: &GitConfig) -> Result<()> {
    write_file(path.as_ref(), &stringify_git_config(config), "writing git config")
}

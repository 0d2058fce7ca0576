//! Reading, writing and resolving manifest and tsconfig files.
//!
//! Format dispatch is by file extension: `.json5` goes through the JSON5
//! parser, `.yaml` through YAML, and everything else is tried as strict
//! JSON first with a JSONC retry, so manifests with comments or trailing
//! commas still load. tsconfig files are always read as JSONC.

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::Value;
use tracing::trace;

use crate::error::{Error, Result};
use crate::types::{PackageManifest, TsConfig};
use crate::PACKAGE_FILES;

/// Maps a locator miss to a domain error, preserving I/O context.
pub(crate) fn map_locate_error(
    err: repokit_locate::Error,
    missing: impl FnOnce(PathBuf) -> Error,
) -> Error {
    match err {
        repokit_locate::Error::NotFound { start, .. } => missing(start),
        repokit_locate::Error::InvalidStart { source, path } => Error::Io {
            source,
            path: Some(path),
            operation: "resolving starting path".to_string(),
        },
    }
}

pub(crate) fn read_file(path: &Path, operation: &str) -> Result<String> {
    fs::read_to_string(path).map_err(|source| Error::Io {
        source,
        path: Some(path.to_path_buf()),
        operation: operation.to_string(),
    })
}

pub(crate) fn write_file(path: &Path, contents: &str, operation: &str) -> Result<()> {
    fs::write(path, contents).map_err(|source| Error::Io {
        source,
        path: Some(path.to_path_buf()),
        operation: operation.to_string(),
    })
}

/// Converts a parsed JSONC tree into a `serde_json` value.
fn jsonc_to_json(value: jsonc_parser::JsonValue<'_>) -> Value {
    match value {
        jsonc_parser::JsonValue::Null => Value::Null,
        jsonc_parser::JsonValue::Boolean(b) => Value::Bool(b),
        jsonc_parser::JsonValue::Number(n) => {
            if let Ok(i) = n.parse::<i64>() {
                Value::Number(i.into())
            } else if let Ok(f) = n.parse::<f64>() {
                serde_json::Number::from_f64(f).map_or(Value::Null, Value::Number)
            } else {
                Value::Null
            }
        }
        jsonc_parser::JsonValue::String(s) => Value::String(s.to_string()),
        jsonc_parser::JsonValue::Array(arr) => {
            Value::Array(arr.into_iter().map(jsonc_to_json).collect())
        }
        jsonc_parser::JsonValue::Object(obj) => {
            let mut map = serde_json::Map::new();
            for (key, value) in obj {
                map.insert(key, jsonc_to_json(value));
            }
            Value::Object(map)
        }
    }
}

/// Parses JSONC text to a JSON value. An empty document parses to `Null`.
pub(crate) fn parse_jsonc_value(text: &str, path: &Path) -> Result<Value> {
    let parsed = jsonc_parser::parse_to_value(text, &jsonc_parser::ParseOptions::default())
        .map_err(|err| Error::Jsonc {
            message: format!("{err:?}"),
            path: Some(path.to_path_buf()),
        })?;
    Ok(parsed.map_or(Value::Null, jsonc_to_json))
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

/// Resolves the nearest package manifest (any supported format) from
/// `from`, walking upward with the default boundary.
///
/// # Errors
///
/// Returns [`Error::ManifestNotFound`] when no manifest exists on the chain.
pub fn resolve_manifest(from: impl AsRef<Path>) -> Result<PathBuf> {
    repokit_locate::find_nearest_file(PACKAGE_FILES, from)
        .map_err(|err| map_locate_error(err, |start| Error::ManifestNotFound { start }))
}

/// Reads and parses the manifest file at `path`.
///
/// # Errors
///
/// Returns an I/O error when the file cannot be read, or the format's parse
/// error when its content is invalid.
pub fn read_manifest(path: impl AsRef<Path>) -> Result<PackageManifest> {
    let path = path.as_ref();
    let text = read_file(path, "reading manifest")?;
    manifest_from_str(&text, path)
}

fn manifest_from_str(text: &str, path: &Path) -> Result<PackageManifest> {
    match extension(path) {
        Some("json5") => json5::from_str(text).map_err(|source| Error::Json5 {
            source,
            path: Some(path.to_path_buf()),
        }),
        Some("yaml") => serde_yaml::from_str(text).map_err(|source| Error::Yaml {
            source,
            path: Some(path.to_path_buf()),
        }),
        _ => match serde_json::from_str(text) {
            Ok(manifest) => Ok(manifest),
            Err(_) => {
                trace!(path = %path.display(), "strict JSON parse failed, retrying as JSONC");
                let value = parse_jsonc_value(text, path)?;
                serde_json::from_value(value).map_err(|source| Error::Json {
                    source,
                    path: Some(path.to_path_buf()),
                })
            }
        },
    }
}

/// Serializes `manifest` and writes it to `path`, choosing the format from
/// the file extension. JSON output is 2-space indented with a trailing
/// newline.
///
/// # Errors
///
/// Returns the format's serialization error or an I/O error from the write.
pub fn write_manifest(path: impl AsRef<Path>, manifest: &PackageManifest) -> Result<()> {
    let path = path.as_ref();
    let text = match extension(path) {
        Some("json5") => json5::to_string(manifest).map_err(|source| Error::Json5 {
            source,
            path: Some(path.to_path_buf()),
        })?,
        Some("yaml") => serde_yaml::to_string(manifest).map_err(|source| Error::Yaml {
            source,
            path: Some(path.to_path_buf()),
        })?,
        _ => {
            let mut text = serde_json::to_string_pretty(manifest).map_err(|source| {
                Error::Json {
                    source,
                    path: Some(path.to_path_buf()),
                }
            })?;
            text.push('\n');
            text
        }
    };
    write_file(path, &text, "writing manifest")
}

/// Reads any supported config file into a raw JSON value, with the same
/// extension dispatch as [`read_manifest`]: `.json5` via JSON5, `.yaml` via
/// YAML, anything else strict JSON retried as JSONC.
///
/// # Errors
///
/// Returns an I/O error when the file cannot be read, or the format's parse
/// error when its content is invalid.
pub fn read_value(path: impl AsRef<Path>) -> Result<Value> {
    let path = path.as_ref();
    let text = read_file(path, "reading config")?;
    match extension(path) {
        Some("json5") => json5::from_str(&text).map_err(|source| Error::Json5 {
            source,
            path: Some(path.to_path_buf()),
        }),
        Some("yaml") => serde_yaml::from_str(&text).map_err(|source| Error::Yaml {
            source,
            path: Some(path.to_path_buf()),
        }),
        _ => match serde_json::from_str(&text) {
            Ok(value) => Ok(value),
            Err(_) => parse_jsonc_value(&text, path),
        },
    }
}

/// Resolves the nearest `tsconfig.json` from `from`.
///
/// # Errors
///
/// Returns [`Error::TsconfigNotFound`] when no tsconfig exists on the chain.
pub fn resolve_tsconfig(from: impl AsRef<Path>) -> Result<PathBuf> {
    repokit_locate::find_nearest_file(&["tsconfig.json"], from)
        .map_err(|err| map_locate_error(err, |start| Error::TsconfigNotFound { start }))
}

/// Reads and parses the tsconfig file at `path` (always as JSONC).
///
/// # Errors
///
/// Returns an I/O error when the file cannot be read, or a JSONC/JSON error
/// when its content is invalid.
pub fn read_tsconfig(path: impl AsRef<Path>) -> Result<TsConfig> {
    let path = path.as_ref();
    let text = read_file(path, "reading tsconfig")?;
    let value = parse_jsonc_value(&text, path)?;
    serde_json::from_value(value).map_err(|source| Error::Json {
        source,
        path: Some(path.to_path_buf()),
    })
}

/// Serializes `tsconfig` as 2-space JSON and writes it to `path`.
///
/// # Errors
///
/// Returns a JSON serialization error or an I/O error from the write.
pub fn write_tsconfig(path: impl AsRef<Path>, tsconfig: &TsConfig) -> Result<()> {
    let path = path.as_ref();
    let mut text = serde_json::to_string_pretty(tsconfig).map_err(|source| Error::Json {
        source,
        path: Some(path.to_path_buf()),
    })?;
    text.push('\n');
    write_file(path, &text, "writing tsconfig")
}

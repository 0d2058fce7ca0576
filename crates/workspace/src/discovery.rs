//! Member package discovery.
//!
//! Member glob patterns describe package directories; each pattern is
//! expanded with every supported manifest filename and matched against the
//! workspace tree, so a pattern hit is always a concrete manifest file.
//! `!`-prefixed patterns exclude. A pattern set that matches nothing is an
//! empty workspace, not an error.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use glob::{MatchOptions, Pattern};
use tracing::{debug, trace, warn};
use walkdir::WalkDir;

use repokit_manifest::{read_manifest_cached, ManifestCache, PACKAGE_FILES};

use crate::error::Result;
use crate::types::{WorkspaceConfig, WorkspacePackage};

/// Suffixes each member pattern with every supported manifest filename,
/// keeping `!` negations and tolerating trailing slashes and `./` prefixes.
fn expand_member_patterns(patterns: &[String]) -> Vec<String> {
    let mut expanded = Vec::with_capacity(patterns.len() * PACKAGE_FILES.len());
    for raw in patterns {
        let (negated, body) = match raw.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, raw.as_str()),
        };
        let base = body.trim_end_matches('/');
        let base = base.strip_prefix("./").unwrap_or(base);
        for file in PACKAGE_FILES {
            let joined = if base.is_empty() || base == "." {
                (*file).to_string()
            } else {
                format!("{base}/{file}")
            };
            expanded.push(if negated {
                format!("!{joined}")
            } else {
                joined
            });
        }
    }
    expanded
}

fn compile_patterns(expanded: Vec<String>) -> (Vec<Pattern>, Vec<Pattern>) {
    let mut includes = Vec::new();
    let mut excludes = Vec::new();
    for pattern in expanded {
        let (negated, body) = match pattern.strip_prefix('!') {
            Some(rest) => (true, rest),
            None => (false, pattern.as_str()),
        };
        match Pattern::new(body) {
            Ok(compiled) => {
                if negated {
                    excludes.push(compiled);
                } else {
                    includes.push(compiled);
                }
            }
            Err(err) => {
                warn!(pattern = %body, error = %err, "skipping invalid member pattern");
            }
        }
    }
    (includes, excludes)
}

// `*` must not cross directory separators and must not match dotfiles,
// matching how package managers interpret member patterns. `**` still
// recurses.
fn match_options() -> MatchOptions {
    MatchOptions {
        require_literal_separator: true,
        require_literal_leading_dot: true,
        ..MatchOptions::new()
    }
}

fn is_pruned(entry: &walkdir::DirEntry) -> bool {
    entry.file_type().is_dir()
        && matches!(entry.file_name().to_str(), Some("node_modules" | ".git"))
}

fn fallback_name(relative_dir: &Path) -> String {
    let name = relative_dir
        .iter()
        .map(|segment| segment.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    if name.is_empty() {
        ".".to_string()
    } else {
        name
    }
}

/// Discovers the member packages of a resolved workspace.
///
/// # Errors
///
/// Returns an error when a matched manifest cannot be read or parsed.
pub fn discover_packages(config: &WorkspaceConfig) -> Result<Vec<WorkspacePackage>> {
    let mut cache = ManifestCache::new();
    discover_packages_with(config, &mut cache)
}

/// Discovers member packages, reading manifests through the caller's cache.
///
/// Matched manifest paths are collected in sorted order and deduplicated by
/// containing directory, so a directory holding both a `package.json` and a
/// `package.json5` contributes one package (from the higher-priority file).
/// The result is sorted by package name.
///
/// # Errors
///
/// Returns an error when a matched manifest cannot be read or parsed.
pub fn discover_packages_with(
    config: &WorkspaceConfig,
    cache: &mut ManifestCache,
) -> Result<Vec<WorkspacePackage>> {
    let (includes, excludes) = compile_patterns(expand_member_patterns(&config.member_patterns));
    if includes.is_empty() {
        return Ok(Vec::new());
    }
    let options = match_options();

    let mut manifest_paths: Vec<PathBuf> = Vec::new();
    let walker = WalkDir::new(&config.root_dir).follow_links(false);
    for entry in walker
        .into_iter()
        .filter_entry(|entry| !is_pruned(entry))
        .filter_map(std::result::Result::ok)
    {
        if !entry.file_type().is_file() {
            continue;
        }
        let Ok(relative) = entry.path().strip_prefix(&config.root_dir) else {
            continue;
        };
        if includes
            .iter()
            .any(|pattern| pattern.matches_path_with(relative, options))
            && !excludes
                .iter()
                .any(|pattern| pattern.matches_path_with(relative, options))
        {
            manifest_paths.push(entry.path().to_path_buf());
        }
    }
    manifest_paths.sort();

    let mut seen_dirs: HashSet<PathBuf> = HashSet::new();
    let mut packages = Vec::new();
    for manifest_path in manifest_paths {
        let Some(dir) = manifest_path.parent().map(Path::to_path_buf) else {
            continue;
        };
        if !seen_dirs.insert(dir.clone()) {
            trace!(dir = %dir.display(), "directory already discovered, skipping extra manifest");
            continue;
        }
        let manifest = read_manifest_cached(&manifest_path, cache)?;
        let relative_dir = dir
            .strip_prefix(&config.root_dir)
            .map_or_else(|_| dir.clone(), Path::to_path_buf);
        let name = manifest
            .name
            .clone()
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| fallback_name(&relative_dir));
        packages.push(WorkspacePackage {
            name,
            dir,
            relative_dir,
            manifest_path,
            manifest,
        });
    }

    packages.sort_by(|a, b| a.name.cmp(&b.name));
    debug!(count = packages.len(), "discovered workspace packages");
    Ok(packages)
}

//! The workspace format resolution cascade.
//!
//! Formats are probed in a fixed priority order: pnpm, rush, lerna, deno,
//! then the manifest `workspaces` field. Each probe locates its own config
//! file independently from the starting path; a probe whose config declares
//! no members declines, and the cascade moves on. A config file that exists
//! but cannot be parsed or has the wrong shape aborts resolution instead of
//! being treated as absent.

use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use tracing::{debug, trace};

use repokit_locate::SearchSpec;
use repokit_manifest::{read_manifest, read_value, PackageManifest, PACKAGE_FILES};

use crate::error::{Error, Result};
use crate::types::{WorkspaceConfig, WorkspaceType};

/// Formats probed by [`resolve_workspace_config`], in priority order.
#[derive(Debug, Clone, Copy)]
enum FormatProbe {
    Pnpm,
    Rush,
    Lerna,
    Deno,
    Manifest,
}

const CASCADE: [FormatProbe; 5] = [
    FormatProbe::Pnpm,
    FormatProbe::Rush,
    FormatProbe::Lerna,
    FormatProbe::Deno,
    FormatProbe::Manifest,
];

/// Resolves the workspace configuration governing `start`.
///
/// # Errors
///
/// Returns [`Error::WorkspaceNotFound`] when every format declines, or a
/// parse/shape error when a config file is present but unreadable.
pub fn resolve_workspace_config(start: impl AsRef<Path>) -> Result<WorkspaceConfig> {
    let start = start.as_ref();
    for probe in CASCADE {
        if let Some(config) = probe.detect(start)? {
            debug!(
                workspace_type = %config.workspace_type,
                root = %config.root_dir.display(),
                "workspace format detected"
            );
            return Ok(config);
        }
    }
    Err(Error::WorkspaceNotFound {
        start: start.to_path_buf(),
    })
}

impl FormatProbe {
    fn detect(self, start: &Path) -> Result<Option<WorkspaceConfig>> {
        match self {
            Self::Pnpm => detect_config_file(
                start,
                &["pnpm-workspace.yaml"],
                WorkspaceType::Pnpm,
                pnpm_patterns,
            ),
            Self::Rush => detect_config_file(start, &["rush.json"], WorkspaceType::Rush, rush_patterns),
            Self::Lerna => {
                detect_config_file(start, &["lerna.json"], WorkspaceType::Lerna, lerna_patterns)
            }
            Self::Deno => detect_config_file(
                start,
                &["deno.json", "deno.jsonc"],
                WorkspaceType::Deno,
                deno_patterns,
            ),
            Self::Manifest => detect_manifest(start),
        }
    }
}

/// Locates the nearest of `names`; a miss declines rather than failing.
fn probe_nearest(start: &Path, names: &[&str]) -> Result<Option<PathBuf>> {
    swallow_miss(repokit_locate::find_nearest_file(names, start))
}

fn swallow_miss(found: repokit_locate::Result<PathBuf>) -> Result<Option<PathBuf>> {
    match found {
        Ok(path) => Ok(Some(path)),
        Err(repokit_locate::Error::NotFound { .. }) => Ok(None),
        Err(repokit_locate::Error::InvalidStart { source, path }) => Err(Error::Io {
            source,
            path: Some(path),
            operation: "resolving starting path".to_string(),
        }),
    }
}

fn detect_config_file(
    start: &Path,
    names: &[&str],
    workspace_type: WorkspaceType,
    extract: fn(&Value, &Path) -> Result<Vec<String>>,
) -> Result<Option<WorkspaceConfig>> {
    let Some(config_path) = probe_nearest(start, names)? else {
        return Ok(None);
    };
    let raw = read_value(&config_path)?;
    let member_patterns = extract(&raw, &config_path)?;
    if member_patterns.is_empty() {
        trace!(path = %config_path.display(), "config declares no members, falling through");
        return Ok(None);
    }
    Ok(Some(make_config(
        workspace_type,
        config_path,
        member_patterns,
        raw,
    )))
}

fn detect_manifest(start: &Path) -> Result<Option<WorkspaceConfig>> {
    let spec = SearchSpec::new(start, PACKAGE_FILES.iter().copied());
    let found = repokit_locate::locate_with(&spec, |path| {
        path.is_file() && read_manifest(path).is_ok_and(|manifest| manifest.has_workspaces())
    });
    let Some(config_path) = swallow_miss(found)? else {
        return Ok(None);
    };
    let manifest = read_manifest(&config_path)?;
    let member_patterns = manifest.workspace_patterns().to_vec();
    if member_patterns.is_empty() {
        return Ok(None);
    }
    let root_dir = config_path
        .parent()
        .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
    let workspace_type = refine_manifest_type(&manifest, &root_dir);
    let raw = read_value(&config_path)?;
    Ok(Some(make_config(
        workspace_type,
        config_path,
        member_patterns,
        raw,
    )))
}

/// Picks npm, yarn or bun for a manifest-declared workspace: an explicit
/// `packageManager` name wins, then a `yarn.lock` next to the manifest,
/// then npm.
fn refine_manifest_type(manifest: &PackageManifest, root_dir: &Path) -> WorkspaceType {
    if let Some(package_manager) = manifest.package_manager.as_deref() {
        let name = package_manager
            .split_once('@')
            .map_or(package_manager, |(name, _)| name);
        match name {
            "yarn" => return WorkspaceType::Yarn,
            "bun" => return WorkspaceType::Bun,
            _ => {}
        }
    }
    if root_dir.join("yarn.lock").is_file() {
        return WorkspaceType::Yarn;
    }
    WorkspaceType::Npm
}

fn make_config(
    workspace_type: WorkspaceType,
    config_path: PathBuf,
    member_patterns: Vec<String>,
    raw_config: Value,
) -> WorkspaceConfig {
    let root_dir = config_path
        .parent()
        .map_or_else(|| PathBuf::from("/"), Path::to_path_buf);
    WorkspaceConfig {
        workspace_type,
        root_dir,
        config_path,
        member_patterns,
        raw_config,
    }
}

fn shape<T: DeserializeOwned>(raw: &Value, path: &Path) -> Result<T> {
    serde_json::from_value(raw.clone()).map_err(|source| Error::InvalidConfig {
        path: path.to_path_buf(),
        source,
    })
}

fn pnpm_patterns(raw: &Value, path: &Path) -> Result<Vec<String>> {
    let file: PnpmWorkspaceFile = shape(raw, path)?;
    Ok(file.packages.unwrap_or_default())
}

fn rush_patterns(raw: &Value, path: &Path) -> Result<Vec<String>> {
    let file: RushFile = shape(raw, path)?;
    Ok(file
        .projects
        .unwrap_or_default()
        .into_iter()
        .map(|project| project.project_folder)
        .collect())
}

fn lerna_patterns(raw: &Value, path: &Path) -> Result<Vec<String>> {
    let file: LernaFile = shape(raw, path)?;
    Ok(file.packages.unwrap_or_default())
}

fn deno_patterns(raw: &Value, path: &Path) -> Result<Vec<String>> {
    let file: DenoFile = shape(raw, path)?;
    Ok(file
        .workspace
        .map_or_else(Vec::new, DenoWorkspace::into_members))
}

// A field given as explicit `null` declines the same way as an absent one,
// so these are Options rather than `#[serde(default)]` vectors.

#[derive(Deserialize)]
struct PnpmWorkspaceFile {
    packages: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct RushFile {
    projects: Option<Vec<RushProject>>,
}

#[derive(Deserialize)]
struct RushProject {
    #[serde(rename = "projectFolder")]
    project_folder: String,
}

#[derive(Deserialize)]
struct LernaFile {
    packages: Option<Vec<String>>,
}

#[derive(Deserialize)]
struct DenoFile {
    workspace: Option<DenoWorkspace>,
}

/// `deno.json` accepts both `"workspace": [...]` and
/// `"workspace": {"members": [...]}`.
#[derive(Deserialize)]
#[serde(untagged)]
enum DenoWorkspace {
    Members(Vec<String>),
    Grouped { members: Option<Vec<String>> },
}

impl DenoWorkspace {
    fn into_members(self) -> Vec<String> {
        match self {
            Self::Members(members) => members,
            Self::Grouped { members } => members.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(path: &Path, contents: &str) {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, contents).unwrap();
    }

    #[test]
    fn test_pnpm_outranks_manifest_workspaces() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("pnpm-workspace.yaml"),
            "packages:\n  - packages/*\n",
        );
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["other/*"]}"#,
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Pnpm);
        assert_eq!(config.member_patterns, ["packages/*"]);
        assert_eq!(config.root_dir, temp.path());
        assert_eq!(config.config_path, temp.path().join("pnpm-workspace.yaml"));
    }

    #[test]
    fn test_empty_pnpm_packages_falls_through_to_npm() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("pnpm-workspace.yaml"), "packages: []\n");
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["pkgs/*"]}"#,
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Npm);
        assert_eq!(config.member_patterns, ["pkgs/*"]);
    }

    #[test]
    fn test_null_pnpm_packages_also_declines() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("pnpm-workspace.yaml"), "packages:\n");
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["pkgs/*"]}"#,
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Npm);
    }

    #[test]
    fn test_manifest_without_workspaces_is_passed_over() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["packages/*"]}"#,
        );
        write(
            &temp.path().join("packages/app/package.json"),
            r#"{"name": "app"}"#,
        );

        // The nearer manifest has no workspaces field, so the search keeps
        // ascending to the declaring one.
        let config = resolve_workspace_config(temp.path().join("packages/app")).unwrap();
        assert_eq!(config.root_dir, temp.path());
        assert_eq!(config.workspace_type, WorkspaceType::Npm);
    }

    #[test]
    fn test_workspaces_object_form_is_accepted() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": {"packages": ["packages/*"], "nohoist": ["**/react"]}}"#,
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.member_patterns, ["packages/*"]);
    }

    #[test]
    fn test_package_manager_field_selects_yarn_and_bun() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["packages/*"], "packageManager": "yarn@4.1.0"}"#,
        );
        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Yarn);

        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["packages/*"], "packageManager": "bun@1.1.0"}"#,
        );
        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Bun);
    }

    #[test]
    fn test_yarn_lock_refines_the_manifest_type() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["packages/*"]}"#,
        );
        write(&temp.path().join("yarn.lock"), "");

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Yarn);
    }

    #[test]
    fn test_rush_projects_become_member_patterns() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("rush.json"),
            "{\n  // rush config\n  \"projects\": [\n    {\"packageName\": \"a\", \"projectFolder\": \"apps/a\"},\n    {\"packageName\": \"b\", \"projectFolder\": \"libs/b\"}\n  ]\n}\n",
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Rush);
        assert_eq!(config.member_patterns, ["apps/a", "libs/b"]);
    }

    #[test]
    fn test_lerna_packages_resolve_even_with_use_workspaces() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("lerna.json"),
            r#"{"packages": ["packages/*"], "useWorkspaces": true}"#,
        );
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["other/*"]}"#,
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Lerna);
        assert_eq!(config.member_patterns, ["packages/*"]);
    }

    #[test]
    fn test_lerna_without_packages_declines() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("lerna.json"), r#"{"version": "5.0.0"}"#);
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["pkgs/*"]}"#,
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Npm);
    }

    #[test]
    fn test_deno_workspace_both_shapes() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("deno.json"),
            r#"{"workspace": ["./add", "./subtract"]}"#,
        );
        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Deno);
        assert_eq!(config.member_patterns, ["./add", "./subtract"]);

        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("deno.json"),
            r#"{"workspace": {"members": ["packages/*"]}}"#,
        );
        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.member_patterns, ["packages/*"]);
    }

    #[test]
    fn test_deno_jsonc_with_comments() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("deno.jsonc"),
            "{\n  // workspace members\n  \"workspace\": [\"./tools\"],\n}\n",
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(config.workspace_type, WorkspaceType::Deno);
        assert_eq!(config.config_path, temp.path().join("deno.jsonc"));
    }

    #[test]
    fn test_corrupt_config_aborts_the_cascade() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("pnpm-workspace.yaml"), "packages: [unterminated\n");
        write(
            &temp.path().join("package.json"),
            r#"{"workspaces": ["pkgs/*"]}"#,
        );

        assert!(resolve_workspace_config(temp.path()).is_err());
    }

    #[test]
    fn test_wrong_shape_is_invalid_config() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("rush.json"),
            r#"{"projects": "not-an-array"}"#,
        );

        let err = resolve_workspace_config(temp.path()).unwrap_err();
        assert!(matches!(err, Error::InvalidConfig { .. }));
    }

    #[test]
    fn test_nothing_resolves_to_workspace_not_found() {
        let temp = TempDir::new().unwrap();
        write(&temp.path().join("package.json"), r#"{"name": "plain"}"#);

        let err = resolve_workspace_config(temp.path()).unwrap_err();
        assert!(matches!(err, Error::WorkspaceNotFound { .. }));
    }

    #[test]
    fn test_raw_config_carries_the_parsed_file() {
        let temp = TempDir::new().unwrap();
        write(
            &temp.path().join("pnpm-workspace.yaml"),
            "packages:\n  - packages/*\ncatalog:\n  react: ^18.0.0\n",
        );

        let config = resolve_workspace_config(temp.path()).unwrap();
        assert_eq!(
            config.raw_config["catalog"]["react"],
            Value::String("^18.0.0".into())
        );
    }
}

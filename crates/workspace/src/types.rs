//! Data model for resolved workspaces, discovered packages and graphs.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use repokit_manifest::PackageManifest;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// The workspace format that won the resolution cascade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkspaceType {
    /// `package.json` `workspaces` field, npm flavored.
    Npm,
    /// `package.json` `workspaces` field with yarn markers.
    Yarn,
    /// `pnpm-workspace.yaml`.
    Pnpm,
    /// `package.json` `workspaces` field with bun markers.
    Bun,
    /// `lerna.json`.
    Lerna,
    /// `rush.json`.
    Rush,
    /// `deno.json` / `deno.jsonc` `workspace` field.
    Deno,
}

impl fmt::Display for WorkspaceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Npm => "npm",
            Self::Yarn => "yarn",
            Self::Pnpm => "pnpm",
            Self::Bun => "bun",
            Self::Lerna => "lerna",
            Self::Rush => "rush",
            Self::Deno => "deno",
        };
        f.write_str(name)
    }
}

/// The winning workspace configuration. Immutable once resolved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceConfig {
    /// Detected workspace format.
    #[serde(rename = "type")]
    pub workspace_type: WorkspaceType,
    /// Directory containing the winning config file.
    pub root_dir: PathBuf,
    /// Absolute path of the winning config file.
    pub config_path: PathBuf,
    /// Member glob patterns, in declaration order.
    pub member_patterns: Vec<String>,
    /// The config file content as parsed, before interpretation.
    pub raw_config: Value,
}

/// One discovered member package.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePackage {
    /// Declared manifest name, or the root-relative directory when the
    /// manifest declares none.
    pub name: String,
    /// Absolute package directory.
    pub dir: PathBuf,
    /// Directory relative to the workspace root.
    pub relative_dir: PathBuf,
    /// Absolute path of the manifest that identified this package.
    pub manifest_path: PathBuf,
    /// The parsed manifest.
    pub manifest: PackageManifest,
}

/// A package plus its intra-workspace dependency edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceGraphNode {
    /// The underlying package.
    #[serde(flatten)]
    pub package: WorkspacePackage,
    /// Names from `dependencies` and `optionalDependencies` that are
    /// workspace members.
    pub direct_dependencies: BTreeSet<String>,
    /// Names from `devDependencies` that are workspace members.
    pub direct_dev_dependencies: BTreeSet<String>,
    /// Every member reachable over direct and dev edges. A package appears
    /// in its own closure only when a cycle leads back to it.
    pub transitive_dependencies: BTreeSet<String>,
}

/// The dependency graph of a workspace.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspaceGraph {
    /// Nodes keyed by package name.
    pub nodes: BTreeMap<String, WorkspaceGraphNode>,
    /// Package names in topological order, dependencies before dependents
    /// wherever the edges are acyclic.
    pub sorted: Vec<String>,
    /// The configuration the graph was built from.
    pub root: WorkspaceConfig,
}

impl WorkspaceGraph {
    /// Looks up a node by package name.
    #[must_use]
    pub fn node(&self, name: &str) -> Option<&WorkspaceGraphNode> {
        self.nodes.get(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workspace_type_serializes_lowercase() {
        let json = serde_json::to_string(&WorkspaceType::Pnpm).unwrap();
        assert_eq!(json, "\"pnpm\"");
        assert_eq!(WorkspaceType::Deno.to_string(), "deno");
    }

    #[test]
    fn test_config_uses_camel_case_wire_names() {
        let config = WorkspaceConfig {
            workspace_type: WorkspaceType::Npm,
            root_dir: PathBuf::from("/repo"),
            config_path: PathBuf::from("/repo/package.json"),
            member_patterns: vec!["packages/*".to_string()],
            raw_config: serde_json::json!({}),
        };
        let value = serde_json::to_value(&config).unwrap();
        assert_eq!(value["type"], "npm");
        assert_eq!(value["rootDir"], "/repo");
        assert_eq!(value["memberPatterns"][0], "packages/*");
        assert!(value.get("rawConfig").is_some());
    }

    #[test]
    fn test_graph_node_flattens_package_fields() {
        let node = WorkspaceGraphNode {
            package: WorkspacePackage {
                name: "app".to_string(),
                dir: PathBuf::from("/repo/packages/app"),
                relative_dir: PathBuf::from("packages/app"),
                manifest_path: PathBuf::from("/repo/packages/app/package.json"),
                manifest: PackageManifest::default(),
            },
            direct_dependencies: BTreeSet::new(),
            direct_dev_dependencies: BTreeSet::new(),
            transitive_dependencies: BTreeSet::new(),
        };
        let value = serde_json::to_value(&node).unwrap();
        assert_eq!(value["name"], "app");
        assert_eq!(value["relativeDir"], "packages/app");
        assert!(value["directDependencies"].as_array().unwrap().is_empty());
    }
}

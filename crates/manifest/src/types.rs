//! Typed views of package manifests and tsconfig documents.
//!
//! These types are deliberately loose: the known fields the rest of the
//! system acts on are typed, everything else is carried verbatim in a
//! flattened `rest` map so a read/modify/write cycle does not lose data.
//! Field names follow the on-disk camelCase convention.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Parsed view of a package manifest (`package.json` and friends).
///
/// Dependency sections are ordered maps, so a rewritten manifest always
/// serializes with key-sorted sections; sections left empty are omitted
/// entirely.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PackageManifest {
    /// Declared package name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// Declared package version.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// `packageManager` pin, e.g. `yarn@4.1.0`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub package_manager: Option<String>,

    /// Workspace member declaration, in either of its two shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workspaces: Option<WorkspacesField>,

    /// Runtime dependencies.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dependencies: BTreeMap<String, String>,

    /// Development-only dependencies.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub dev_dependencies: BTreeMap<String, String>,

    /// Optional runtime dependencies.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub optional_dependencies: BTreeMap<String, String>,

    /// Peer dependencies.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub peer_dependencies: BTreeMap<String, String>,

    /// Per-peer metadata (`{"optional": true}` entries).
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub peer_dependencies_meta: BTreeMap<String, PeerDependencyMeta>,

    /// Every field this crate does not model, carried verbatim.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

impl PackageManifest {
    /// Workspace member patterns, regardless of which declaration shape the
    /// manifest uses. Empty when the field is absent.
    #[must_use]
    pub fn workspace_patterns(&self) -> &[String] {
        self.workspaces
            .as_ref()
            .map_or(&[], WorkspacesField::patterns)
    }

    /// Whether the manifest declares at least one workspace member pattern.
    #[must_use]
    pub fn has_workspaces(&self) -> bool {
        !self.workspace_patterns().is_empty()
    }
}

/// The two shapes of the `workspaces` field: a bare pattern array, or an
/// object with a `packages` array (yarn's extended form).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum WorkspacesField {
    /// `"workspaces": ["packages/*"]`
    Patterns(Vec<String>),
    /// `"workspaces": {"packages": ["packages/*"], ...}`
    Grouped {
        /// Member glob patterns.
        #[serde(default)]
        packages: Vec<String>,
        /// Extra keys (e.g. `nohoist`), carried verbatim.
        #[serde(flatten)]
        rest: serde_json::Map<String, Value>,
    },
}

impl WorkspacesField {
    /// The member glob patterns, whichever shape holds them.
    #[must_use]
    pub fn patterns(&self) -> &[String] {
        match self {
            Self::Patterns(patterns) => patterns,
            Self::Grouped { packages, .. } => packages,
        }
    }
}

/// Metadata attached to one peer dependency.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerDependencyMeta {
    /// Whether the peer is optional for consumers.
    #[serde(default)]
    pub optional: bool,
}

/// Manifest section targeted by a dependency edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DependencyKind {
    /// `dependencies`
    Prod,
    /// `devDependencies`
    Dev,
    /// `optionalDependencies`
    Optional,
    /// `peerDependencies`
    Peer,
    /// `peerDependencies` plus `peerDependenciesMeta.<name>.optional = true`
    OptionalPeer,
}

impl fmt::Display for DependencyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Prod => "dependencies",
            Self::Dev => "devDependencies",
            Self::Optional => "optionalDependencies",
            Self::Peer => "peerDependencies",
            Self::OptionalPeer => "optionalPeerDependencies",
        };
        write!(f, "{name}")
    }
}

/// Parsed view of a `tsconfig.json` document.
///
/// tsconfig files routinely carry comments and trailing commas, so they are
/// always read through the JSONC path.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TsConfig {
    /// Base config(s) this one extends.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extends: Option<TsConfigExtends>,

    /// Compiler options, kept opaque.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub compiler_options: Option<Value>,

    /// Include globs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub include: Option<Vec<String>>,

    /// Exclude globs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exclude: Option<Vec<String>>,

    /// Explicit file list.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub files: Option<Vec<String>>,

    /// Project references.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub references: Option<Vec<TsConfigReference>>,

    /// Every field this crate does not model, carried verbatim.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

/// `extends` accepts a single path or a list of paths.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TsConfigExtends {
    /// A single base config path.
    Single(String),
    /// Multiple base config paths, applied in order.
    Many(Vec<String>),
}

/// One entry of a tsconfig `references` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TsConfigReference {
    /// Path to the referenced project.
    pub path: String,
    /// Extra keys, carried verbatim.
    #[serde(flatten)]
    pub rest: serde_json::Map<String, Value>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_deserializes_camel_case_fields() {
        let manifest: PackageManifest = serde_json::from_str(
            r#"{
                "name": "demo",
                "version": "1.0.0",
                "packageManager": "yarn@4.1.0",
                "devDependencies": {"vitest": "^1.0.0"},
                "peerDependenciesMeta": {"react": {"optional": true}}
            }"#,
        )
        .unwrap();

        assert_eq!(manifest.name.as_deref(), Some("demo"));
        assert_eq!(manifest.package_manager.as_deref(), Some("yarn@4.1.0"));
        assert_eq!(manifest.dev_dependencies.get("vitest").unwrap(), "^1.0.0");
        assert!(manifest.peer_dependencies_meta["react"].optional);
    }

    #[test]
    fn test_workspaces_field_both_shapes() {
        let array: PackageManifest =
            serde_json::from_str(r#"{"workspaces": ["packages/*"]}"#).unwrap();
        assert_eq!(array.workspace_patterns(), ["packages/*"]);

        let grouped: PackageManifest = serde_json::from_str(
            r#"{"workspaces": {"packages": ["pkgs/*"], "nohoist": ["**/tape"]}}"#,
        )
        .unwrap();
        assert_eq!(grouped.workspace_patterns(), ["pkgs/*"]);
        assert!(grouped.has_workspaces());

        let none: PackageManifest = serde_json::from_str("{}").unwrap();
        assert!(none.workspace_patterns().is_empty());
        assert!(!none.has_workspaces());
    }

    #[test]
    fn test_unknown_fields_survive_round_trip() {
        let source = r#"{"name":"demo","scripts":{"build":"tsc"},"private":true}"#;
        let manifest: PackageManifest = serde_json::from_str(source).unwrap();
        assert!(manifest.rest.contains_key("scripts"));

        let out = serde_json::to_string(&manifest).unwrap();
        let value: Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["scripts"]["build"], "tsc");
        assert_eq!(value["private"], true);
    }

    #[test]
    fn test_empty_sections_are_omitted() {
        let manifest = PackageManifest {
            name: Some("demo".to_string()),
            ..PackageManifest::default()
        };
        let out = serde_json::to_string(&manifest).unwrap();
        assert!(!out.contains("dependencies"));
        assert!(!out.contains("workspaces"));
    }

    #[test]
    fn test_tsconfig_extends_shapes() {
        let single: TsConfig =
            serde_json::from_str(r#"{"extends": "./base.json"}"#).unwrap();
        assert_eq!(
            single.extends,
            Some(TsConfigExtends::Single("./base.json".to_string()))
        );

        let many: TsConfig =
            serde_json::from_str(r#"{"extends": ["./a.json", "./b.json"]}"#).unwrap();
        assert!(matches!(many.extends, Some(TsConfigExtends::Many(ref v)) if v.len() == 2));
    }

    #[test]
    fn test_dependency_kind_display() {
        assert_eq!(DependencyKind::Prod.to_string(), "dependencies");
        assert_eq!(
            DependencyKind::OptionalPeer.to_string(),
            "optionalPeerDependencies"
        );
    }
}

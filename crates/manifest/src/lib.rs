//! Reading, writing and editing the metadata files of JavaScript and
//! TypeScript repositories.
//!
//! The crate covers four file families: package manifests (`package.json`
//! and its JSON5/YAML variants), `tsconfig.json`, package manager lockfiles
//! and `.git/config`. Resolution walks the directory chain through
//! [`repokit_locate`], parsing is strict about I/O but tolerant of the
//! formats people actually write (comments and trailing commas in JSON
//! files are accepted), and all caching is owned by the caller through
//! [`ManifestCache`].
//!
//! # Example
//!
//! ```no_run
//! use repokit_manifest::{read_manifest, resolve_manifest, Result};
//!
//! fn manifest_name() -> Result<Option<String>> {
//!     let path = resolve_manifest(".")?;
//!     let manifest = read_manifest(&path)?;
//!     Ok(manifest.name)
//! }
//! ```

pub mod cache;
pub mod edit;
pub mod error;
pub mod gitconfig;
pub mod io;
pub mod roots;
pub mod types;

pub use cache::{read_manifest_cached, ManifestCache};
pub use edit::{add_dependency, remove_dependency, update_manifest};
pub use error::{Error, Result};
pub use gitconfig::{
    parse_git_config, read_git_config, resolve_git_config, stringify_git_config, write_git_config,
    GitConfig, GitSection, GitValue,
};
pub use io::{
    read_manifest, read_tsconfig, read_value, resolve_manifest, resolve_tsconfig, write_manifest,
    write_tsconfig,
};
pub use roots::{
    find_workspace_dir, find_workspace_dir_with, resolve_lockfile, RootMarker,
    DEFAULT_ROOT_MARKERS,
};
pub use types::{
    DependencyKind, PackageManifest, PeerDependencyMeta, TsConfig, TsConfigExtends,
    TsConfigReference, WorkspacesField,
};

/// Manifest file names, in resolution priority order.
pub const PACKAGE_FILES: &[&str] = &["package.json", "package.json5", "package.yaml"];

/// Lockfile names written by the package managers this crate understands.
pub const LOCK_FILES: &[&str] = &[
    "yarn.lock",
    "package-lock.json",
    "pnpm-lock.yaml",
    "npm-shrinkwrap.json",
    "bun.lockb",
    "bun.lock",
    "deno.lock",
];

/// Config files that mark a workspace root on their own.
pub const WORKSPACE_FILES: &[&str] = &[
    "pnpm-workspace.yaml",
    "lerna.json",
    "turbo.json",
    "rush.json",
    "deno.json",
    "deno.jsonc",
];

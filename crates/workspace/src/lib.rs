//! Workspace detection, package discovery and dependency graphs for
//! JavaScript monorepos.
//!
//! The crate works in three stages, each usable on its own:
//!
//! - [`resolve_workspace_config`] walks up from a starting path and detects
//!   the workspace root, trying pnpm, Rush, Lerna and Deno configuration
//!   files at every level before falling back to the nearest package
//!   manifest with a `workspaces` field.
//! - [`discover_packages`] expands the member patterns against the
//!   workspace root and reads every member's manifest.
//! - [`build_graph`] links members through their `dependencies`,
//!   `devDependencies` and `optionalDependencies`, resolving `workspace:`
//!   specifiers, and derives a dependency-first order plus per-package
//!   transitive closures. Dependency cycles degrade gracefully instead of
//!   failing.
//!
//! [`read_workspace_graph`] runs all three:
//!
//! ```no_run
//! use repokit_workspace::{read_workspace_graph, Result};
//!
//! fn print_build_order() -> Result<()> {
//!     let graph = read_workspace_graph(".")?;
//!     println!(
//!         "{} workspace at {}",
//!         graph.root.workspace_type,
//!         graph.root.root_dir.display()
//!     );
//!     for name in &graph.sorted {
//!         println!("  {name}");
//!     }
//!     Ok(())
//! }
//! ```

use std::path::Path;

pub mod discovery;
pub mod error;
pub mod graph;
pub mod resolver;
pub mod types;

pub use discovery::{discover_packages, discover_packages_with};
pub use error::{Error, Result};
pub use graph::build_graph;
pub use resolver::resolve_workspace_config;
pub use types::{
    WorkspaceConfig, WorkspaceGraph, WorkspaceGraphNode, WorkspacePackage, WorkspaceType,
};

/// Resolves the workspace containing `start`, discovers its member packages
/// and builds the dependency graph.
///
/// # Errors
///
/// Returns an error when no workspace configuration is found, when a
/// configuration file cannot be read or has the wrong shape, or when a
/// member manifest fails to parse.
pub fn read_workspace_graph(start: impl AsRef<Path>) -> Result<WorkspaceGraph> {
    let config = resolve_workspace_config(start)?;
    let packages = discover_packages(&config)?;
    Ok(build_graph(config, packages))
}

//! Error types for workspace resolution, discovery and graph building.

use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

/// Errors produced while resolving or traversing a workspace.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No workspace format matched during the resolution cascade.
    #[error("no workspace configuration found from {start}")]
    #[diagnostic(
        code(repokit::workspace::workspace_not_found),
        help(
            "a workspace needs a pnpm-workspace.yaml, rush.json, lerna.json, deno.json \
             or a manifest with a non-empty `workspaces` field"
        )
    )]
    WorkspaceNotFound {
        /// Directory the cascade started from.
        start: PathBuf,
    },

    /// A workspace config file parsed but did not have the expected shape.
    #[error("invalid workspace configuration at {path}: {source}")]
    #[diagnostic(
        code(repokit::workspace::invalid_config),
        help("check the member/packages declaration against the format's documentation")
    )]
    InvalidConfig {
        /// The config file that failed structural validation.
        path: PathBuf,
        /// The underlying shape error.
        #[source]
        source: serde_json::Error,
    },

    /// An I/O failure outside manifest reading.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(repokit::workspace::io_error),
        help("check that the path exists and is accessible")
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// File or directory involved, when known.
        path: Option<PathBuf>,
        /// What was being attempted.
        operation: String,
    },

    /// A manifest or config file failed to read or parse.
    #[error(transparent)]
    #[diagnostic(transparent)]
    Manifest(#[from] repokit_manifest::Error),
}

/// Convenience alias used throughout this crate.
pub type Result<T> = std::result::Result<T, Error>;

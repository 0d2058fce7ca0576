//! Error types for manifest operations.

use miette::Diagnostic;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for manifest operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while resolving, parsing or writing project
/// metadata files.
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No package manifest was found on the directory chain.
    #[error("No package manifest found starting from {start}")]
    #[diagnostic(
        code(repokit::manifest::manifest_not_found),
        help(
            "Expected one of package.json, package.json5 or package.yaml in the starting directory or a parent"
        )
    )]
    ManifestNotFound {
        /// Absolute path the search started from.
        start: PathBuf,
    },

    /// No tsconfig.json was found on the directory chain.
    #[error("No tsconfig.json found starting from {start}")]
    #[diagnostic(
        code(repokit::manifest::tsconfig_not_found),
        help("Expected a tsconfig.json in the starting directory or a parent")
    )]
    TsconfigNotFound {
        /// Absolute path the search started from.
        start: PathBuf,
    },

    /// No lockfile was found on the directory chain.
    #[error("No lockfile found starting from {start}")]
    #[diagnostic(
        code(repokit::manifest::lockfile_not_found),
        help(
            "Run your package manager's install command to generate a lockfile (e.g. 'npm install', 'pnpm install')"
        )
    )]
    LockfileNotFound {
        /// Absolute path the search started from.
        start: PathBuf,
    },

    /// No .git/config was found on the directory chain.
    #[error("No .git/config found starting from {start}")]
    #[diagnostic(
        code(repokit::manifest::git_config_not_found),
        help("The starting path does not appear to be inside a git repository")
    )]
    GitConfigNotFound {
        /// Absolute path the search started from.
        start: PathBuf,
    },

    /// No workspace root marker matched.
    #[error("Cannot detect workspace root from {start}")]
    #[diagnostic(
        code(repokit::manifest::workspace_root_not_found),
        help(
            "No workspace config file, .git directory, lockfile or package manifest was found on the directory chain"
        )
    )]
    WorkspaceRootNotFound {
        /// Path the detection started from.
        start: PathBuf,
    },

    /// I/O error occurred.
    #[error("I/O error during {operation}{}: {source}", path.as_ref().map(|p| format!(" at {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(repokit::manifest::io_error),
        help(
            "Check that the referenced paths exist and that you have permission to read or write them"
        )
    )]
    Io {
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
        /// Optional path where the error occurred.
        path: Option<PathBuf>,
        /// Description of the operation being performed.
        operation: String,
    },

    /// JSON parsing or serialization error.
    #[error("JSON error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(repokit::manifest::json_error),
        help("Ensure the JSON has valid syntax and matches the expected document shape")
    )]
    Json {
        /// The underlying JSON error.
        #[source]
        source: serde_json::Error,
        /// Optional path to the file being processed.
        path: Option<PathBuf>,
    },

    /// JSON5 parsing or serialization error.
    #[error("JSON5 error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(repokit::manifest::json5_error),
        help("Ensure the JSON5 has valid syntax and matches the expected document shape")
    )]
    Json5 {
        /// The underlying JSON5 error.
        #[source]
        source: json5::Error,
        /// Optional path to the file being processed.
        path: Option<PathBuf>,
    },

    /// JSONC parsing error.
    #[error("JSONC error{}: {message}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(repokit::manifest::jsonc_error),
        help("Ensure the document is valid JSON with at most comments and trailing commas on top")
    )]
    Jsonc {
        /// Description of the parse error.
        message: String,
        /// Optional path to the file being processed.
        path: Option<PathBuf>,
    },

    /// YAML parsing or serialization error.
    #[error("YAML error{}: {source}", path.as_ref().map(|p| format!(" in {}", p.display())).unwrap_or_default())]
    #[diagnostic(
        code(repokit::manifest::yaml_error),
        help("Ensure the YAML has valid syntax and matches the expected document shape")
    )]
    Yaml {
        /// The underlying YAML error.
        #[source]
        source: serde_yaml::Error,
        /// Optional path to the file being processed.
        path: Option<PathBuf>,
    },
}

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Self::Io {
            source,
            path: None,
            operation: "file operation".to_string(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(source: serde_json::Error) -> Self {
        Self::Json { source, path: None }
    }
}

impl From<serde_yaml::Error> for Error {
    fn from(source: serde_yaml::Error) -> Self {
        Self::Yaml { source, path: None }
    }
}

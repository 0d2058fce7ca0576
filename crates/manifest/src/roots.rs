//! Workspace root and lockfile detection.
//!
//! The root of a repository is inferred from marker files. Each marker
//! carries its own search direction: a `.git/config` belongs to the nearest
//! enclosing repository, while workspace configs, lockfiles and manifests
//! are taken from the outermost directory that has one, so nested packages
//! still resolve to the monorepo root.

use std::path::{Path, PathBuf};

use tracing::debug;

use repokit_locate::{Direction, SearchSpec};

use crate::error::{Error, Result};
use crate::io::map_locate_error;
use crate::{LOCK_FILES, PACKAGE_FILES, WORKSPACE_FILES};

/// A file whose presence marks a workspace root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RootMarker {
    /// Workspace manager configs such as `pnpm-workspace.yaml` or
    /// `lerna.json`.
    WorkspaceFile,
    /// A `.git/config`, marking the repository itself.
    GitConfig,
    /// Package manager lockfiles.
    LockFile,
    /// Any package manifest.
    PackageJson,
}

impl RootMarker {
    /// File names probed for this marker, in priority order.
    #[must_use]
    pub fn candidates(self) -> &'static [&'static str] {
        match self {
            Self::WorkspaceFile => WORKSPACE_FILES,
            Self::GitConfig => &[".git/config"],
            Self::LockFile => LOCK_FILES,
            Self::PackageJson => PACKAGE_FILES,
        }
    }

    /// Search direction for this marker. Git configs bind to the nearest
    /// repository; every other marker prefers the outermost match.
    #[must_use]
    pub fn direction(self) -> Direction {
        match self {
            Self::GitConfig => Direction::Ascend,
            _ => Direction::Descend,
        }
    }

    /// Workspace root directory implied by a found marker file.
    fn root_dir(self, found: &Path) -> Option<PathBuf> {
        match self {
            // found is <root>/.git/config, so the root is two levels up.
            Self::GitConfig => found.parent().and_then(Path::parent).map(Path::to_path_buf),
            _ => found.parent().map(Path::to_path_buf),
        }
    }
}

/// Marker priority used by [`find_workspace_dir`].
pub const DEFAULT_ROOT_MARKERS: [RootMarker; 4] = [
    RootMarker::WorkspaceFile,
    RootMarker::GitConfig,
    RootMarker::LockFile,
    RootMarker::PackageJson,
];

/// Finds the workspace root directory for `from` using
/// [`DEFAULT_ROOT_MARKERS`].
///
/// # Errors
///
/// Returns [`Error::WorkspaceRootNotFound`] when no marker matches.
pub fn find_workspace_dir(from: impl AsRef<Path>) -> Result<PathBuf> {
    find_workspace_dir_with(from, &DEFAULT_ROOT_MARKERS)
}

/// Finds the workspace root directory for `from`, trying `markers` in
/// order. A marker that finds nothing is skipped; the first hit wins.
///
/// # Errors
///
/// Returns [`Error::WorkspaceRootNotFound`] when every marker misses.
pub fn find_workspace_dir_with(from: impl AsRef<Path>, markers: &[RootMarker]) -> Result<PathBuf> {
    let from = from.as_ref();
    for marker in markers {
        let spec = SearchSpec::new(from, marker.candidates().iter().copied())
            .with_direction(marker.direction());
        match repokit_locate::locate(&spec) {
            Ok(found) => {
                if let Some(dir) = marker.root_dir(&found) {
                    debug!(marker = ?marker, root = %dir.display(), "workspace root detected");
                    return Ok(dir);
                }
            }
            Err(err) => {
                debug!(marker = ?marker, error = %err, "root marker missed");
            }
        }
    }
    Err(Error::WorkspaceRootNotFound {
        start: from.to_path_buf(),
    })
}

/// Resolves the nearest lockfile from `from`.
///
/// # Errors
///
/// Returns [`Error::LockfileNotFound`] when no lockfile exists on the chain.
pub fn resolve_lockfile(from: impl AsRef<Path>) -> Result<PathBuf> {
    repokit_locate::find_nearest_file(LOCK_FILES, from)
        .map_err(|err| map_locate_error(err, |start| Error::LockfileNotFound { start }))
}

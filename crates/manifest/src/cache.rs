//! Caller-owned cache for parsed manifests.
//!
//! Nothing in this crate caches implicitly. Callers that read the same
//! manifest repeatedly (workspace scans, graph builds) thread a
//! [`ManifestCache`] through and decide its lifetime themselves.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{Error, Result};
use crate::io::read_manifest;
use crate::types::PackageManifest;

/// Map from normalized manifest path to its parsed content.
#[derive(Debug, Default, Clone)]
pub struct ManifestCache {
    entries: HashMap<PathBuf, PackageManifest>,
}

impl ManifestCache {
    /// Creates an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached manifest for `path`, if present.
    ///
    /// Keys are stored as given to [`insert`](Self::insert);
    /// [`read_manifest_cached`] always keys by the normalized absolute path.
    #[must_use]
    pub fn get(&self, path: &Path) -> Option<&PackageManifest> {
        self.entries.get(path)
    }

    /// Stores `manifest` under `path`, replacing any earlier entry.
    pub fn insert(&mut self, path: PathBuf, manifest: PackageManifest) {
        self.entries.insert(path, manifest);
    }

    /// Drops the entry for `path`, returning it if one was cached.
    pub fn invalidate(&mut self, path: &Path) -> Option<PackageManifest> {
        self.entries.remove(path)
    }

    /// Drops every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Number of cached manifests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the cache holds no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Reads the manifest at `path` through `cache`.
///
/// The cache key is the normalized absolute form of `path`, so relative and
/// absolute spellings of the same file share one entry. A hit returns a
/// clone of the cached value without touching the filesystem.
///
/// # Errors
///
/// Returns an I/O error when the path cannot be normalized or read, or a
/// parse error for invalid content.
pub fn read_manifest_cached(
    path: impl AsRef<Path>,
    cache: &mut ManifestCache,
) -> Result<PackageManifest> {
    let path = path.as_ref();
    let key = std::path::absolute(path).map_err(|source| Error::Io {
        source,
        path: Some(path.to_path_buf()),
        operation: "normalizing manifest path".to_string(),
    })?;
    if let Some(hit) = cache.get(&key) {
        trace!(path = %key.display(), "manifest cache hit");
        return Ok(hit.clone());
    }
    let manifest = read_manifest(&key)?;
    cache.insert(key, manifest.clone());
    Ok(manifest)
}

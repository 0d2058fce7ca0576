//! In-memory manifest edits and a read-modify-write helper.

use std::path::Path;

use tracing::debug;

use crate::error::Result;
use crate::io::{read_manifest, write_manifest};
use crate::types::{DependencyKind, PackageManifest, PeerDependencyMeta};

/// Records `name@version` under the section selected by `kind`.
///
/// [`DependencyKind::OptionalPeer`] writes to `peerDependencies` and marks
/// the entry optional in `peerDependenciesMeta`. Adding a plain peer
/// dependency clears a previous optional marker for the same name.
pub fn add_dependency(
    manifest: &mut PackageManifest,
    name: impl Into<String>,
    version: impl Into<String>,
    kind: DependencyKind,
) {
    let name = name.into();
    let version = version.into();
    debug!(dependency = %name, section = %kind, "adding dependency");
    match kind {
        DependencyKind::Prod => {
            manifest.dependencies.insert(name, version);
        }
        DependencyKind::Dev => {
            manifest.dev_dependencies.insert(name, version);
        }
        DependencyKind::Optional => {
            manifest.optional_dependencies.insert(name, version);
        }
        DependencyKind::Peer => {
            manifest.peer_dependencies_meta.remove(&name);
            manifest.peer_dependencies.insert(name, version);
        }
        DependencyKind::OptionalPeer => {
            manifest
                .peer_dependencies_meta
                .insert(name.clone(), PeerDependencyMeta { optional: true });
            manifest.peer_dependencies.insert(name, version);
        }
    }
}

/// Removes `name` from every dependency section, including its peer
/// metadata. Returns whether anything was removed.
pub fn remove_dependency(manifest: &mut PackageManifest, name: &str) -> bool {
    let mut removed = manifest.dependencies.remove(name).is_some();
    removed |= manifest.dev_dependencies.remove(name).is_some();
    removed |= manifest.optional_dependencies.remove(name).is_some();
    removed |= manifest.peer_dependencies.remove(name).is_some();
    removed |= manifest.peer_dependencies_meta.remove(name).is_some();
    if removed {
        debug!(dependency = %name, "removed dependency");
    }
    removed
}

/// Reads the manifest at `path`, applies `mutate`, writes it back in the
/// same format and returns the updated value.
///
/// # Errors
///
/// Returns any read, parse, serialization or write error from the
/// underlying I/O.
pub fn update_manifest(
    path: impl AsRef<Path>,
    mutate: impl FnOnce(&mut PackageManifest),
) -> Result<PackageManifest> {
    let path = path.as_ref();
    let mut manifest = read_manifest(path)?;
    mutate(&mut manifest);
    write_manifest(path, &manifest)?;
    Ok(manifest)
}

//! Directory-chain file search.
//!
//! This crate answers one question: starting from a path, where is the
//! nearest (or outermost) file with one of a set of names? It walks the
//! chain of parent directories either upward (`Ascend`, the default) or
//! downward from the root (`Descend`), probing every candidate name at each
//! level, and stops at the first accepted hit. A boundary pattern keeps the
//! search from escaping dependency-isolation directories such as
//! `node_modules`.
//!
//! Acceptance defaults to "a regular file exists here" but can be replaced
//! with an arbitrary predicate, which lets callers require semantic content
//! on top of existence (for example "this manifest declares a `workspaces`
//! field").
//!
//! # Example
//!
//! ```no_run
//! use repokit_locate::{find_nearest_file, SearchSpec, locate};
//!
//! // Nearest package manifest, starting from the current directory.
//! let manifest = find_nearest_file(&["package.json"], ".")?;
//!
//! // The same search, spelled out.
//! let spec = SearchSpec::new(".", ["package.json"]);
//! let manifest = locate(&spec)?;
//! # Ok::<(), repokit_locate::Error>(())
//! ```

use std::ffi::{OsStr, OsString};
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::{debug, trace};

/// Segment name that bounds searches when no explicit boundary is set.
pub const DEFAULT_BOUNDARY_SEGMENT: &str = "node_modules";

/// Direction of a directory-chain search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Walk from the starting path toward the filesystem root, longest
    /// prefix first. Finds the nearest match.
    #[default]
    Ascend,
    /// Walk from the boundary (or the filesystem root) toward the starting
    /// path, shortest prefix first. Finds the outermost match.
    Descend,
}

/// Description of one directory-chain search.
///
/// `candidate_names` are probed in order at every level, so the name order
/// is a priority: within a single directory the first listed name wins.
/// Between directories the prefix order wins — a later-named file in a
/// nearer directory beats an earlier-named file further away.
#[derive(Debug, Clone)]
pub struct SearchSpec {
    /// Directory (or file) path the search starts from. Normalized to an
    /// absolute path before searching.
    pub starting_path: PathBuf,
    /// Candidate filenames probed at each level, in priority order. Names
    /// may contain separators (`.git/config`). An empty list never matches.
    pub candidate_names: Vec<String>,
    /// Path segment pattern the search must not cross. `None` bounds the
    /// search at segments literally named [`DEFAULT_BOUNDARY_SEGMENT`].
    pub boundary: Option<Regex>,
    /// Search direction.
    pub direction: Direction,
}

impl SearchSpec {
    /// Creates a spec with the default boundary and ascending direction.
    pub fn new(
        starting_path: impl Into<PathBuf>,
        candidate_names: impl IntoIterator<Item = impl Into<String>>,
    ) -> Self {
        Self {
            starting_path: starting_path.into(),
            candidate_names: candidate_names.into_iter().map(Into::into).collect(),
            boundary: None,
            direction: Direction::Ascend,
        }
    }

    /// Replaces the boundary pattern.
    #[must_use]
    pub fn with_boundary(mut self, boundary: Regex) -> Self {
        self.boundary = Some(boundary);
        self
    }

    /// Replaces the search direction.
    #[must_use]
    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = direction;
        self
    }

    fn is_boundary_segment(&self, segment: &OsStr) -> bool {
        let segment = segment.to_string_lossy();
        match &self.boundary {
            Some(pattern) => pattern.is_match(&segment),
            None => segment == DEFAULT_BOUNDARY_SEGMENT,
        }
    }
}

/// Errors returned by directory-chain searches.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Every prefix/name pair was probed and none was accepted. Expected
    /// and recoverable; callers decide whether a miss is fatal.
    #[error("no file matching [{}] found starting from {}", names.join(", "), start.display())]
    NotFound {
        /// Candidate filenames that were probed.
        names: Vec<String>,
        /// Absolute path the search started from.
        start: PathBuf,
    },

    /// The starting path could not be normalized to an absolute path.
    #[error("cannot resolve starting path {}: {source}", path.display())]
    InvalidStart {
        /// Underlying error from path normalization.
        #[source]
        source: std::io::Error,
        /// The path as given by the caller.
        path: PathBuf,
    },
}

/// Result type for locate operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Runs a search, accepting the first candidate that is a regular file.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when no candidate is accepted and
/// [`Error::InvalidStart`] when the starting path cannot be normalized.
pub fn locate(spec: &SearchSpec) -> Result<PathBuf> {
    locate_with(spec, |path| path.is_file())
}

/// Runs a search with a caller-supplied accept predicate.
///
/// The predicate is invoked sequentially, longest (or shortest) prefix
/// first and candidate names in order within each prefix; the search
/// short-circuits on the first acceptance. When ascending, the starting
/// path itself is offered first if its final segment is one of the
/// candidate names, so passing the path of a manifest file resolves to
/// that file.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when no candidate is accepted and
/// [`Error::InvalidStart`] when the starting path cannot be normalized.
pub fn locate_with<F>(spec: &SearchSpec, mut accept: F) -> Result<PathBuf>
where
    F: FnMut(&Path) -> bool,
{
    let start = std::path::absolute(&spec.starting_path).map_err(|source| Error::InvalidStart {
        source,
        path: spec.starting_path.clone(),
    })?;

    let segments: Vec<OsString> = start
        .components()
        .map(|c| c.as_os_str().to_os_string())
        .collect();

    // First segment (scanning from the root) matching the boundary; 0 means
    // the search space is the whole chain.
    let boundary_index = segments
        .iter()
        .position(|s| spec.is_boundary_segment(s))
        .unwrap_or(0);

    if spec.direction == Direction::Ascend {
        if let Some(last) = segments.last() {
            let is_candidate = spec
                .candidate_names
                .iter()
                .any(|name| OsStr::new(name) == last.as_os_str());
            if is_candidate && accept(&start) {
                debug!(path = %start.display(), "starting path accepted as candidate");
                return Ok(start);
            }
        }
    }

    let prefix_lengths: Vec<usize> = match spec.direction {
        Direction::Ascend => ((boundary_index + 1)..=segments.len()).rev().collect(),
        Direction::Descend => ((boundary_index + 1)..=segments.len()).collect(),
    };

    for len in prefix_lengths {
        let mut base = PathBuf::new();
        for segment in &segments[..len] {
            base.push(segment);
        }
        for name in &spec.candidate_names {
            let candidate = base.join(name);
            trace!(path = %candidate.display(), "probing candidate");
            if accept(&candidate) {
                debug!(path = %candidate.display(), "candidate accepted");
                return Ok(candidate);
            }
        }
    }

    Err(Error::NotFound {
        names: spec.candidate_names.clone(),
        start,
    })
}

/// Finds the nearest file with one of `names`, walking upward from
/// `starting_path` with the default boundary.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when no candidate exists below the boundary.
pub fn find_nearest_file(names: &[&str], starting_path: impl AsRef<Path>) -> Result<PathBuf> {
    locate(&SearchSpec::new(starting_path.as_ref(), names.iter().copied()))
}

/// Finds the outermost file with one of `names`, walking downward from the
/// boundary (or the filesystem root) toward `starting_path`.
///
/// # Errors
///
/// Returns [`Error::NotFound`] when no candidate exists on the chain.
pub fn find_farthest_file(names: &[&str], starting_path: impl AsRef<Path>) -> Result<PathBuf> {
    locate(
        &SearchSpec::new(starting_path.as_ref(), names.iter().copied())
            .with_direction(Direction::Descend),
    )
}

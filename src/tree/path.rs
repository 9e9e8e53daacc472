//! Root normalization and source/replica path correspondence
//!
//! Paths are mapped between the two trees by stripping one root and
//! re-joining the relative remainder under the other root. Relative paths
//! are compared component-wise as raw `OsStr`s: no case folding and no
//! Unicode normalization, on every platform.

use crate::error::{EntryError, PreconditionError};
use std::path::{Path, PathBuf};
use tracing::info;

/// The canonical source and replica roots of one mirror
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MirrorRoots {
    source: PathBuf,
    replica: PathBuf,
}

/// Corresponding locations of one relative path in both trees
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct PathPair {
    pub relative: PathBuf,
    pub source: PathBuf,
    pub replica: PathBuf,
}

impl MirrorRoots {
    /// Resolve two existing directories into canonical mirror roots
    pub fn resolve(source: &Path, replica: &Path) -> Result<Self, PreconditionError> {
        let source = canonicalize_root(source)
            .map_err(|_| PreconditionError::SourceMissing(source.to_path_buf()))?;
        if !source.is_dir() {
            return Err(PreconditionError::SourceNotDirectory(source));
        }

        let replica = canonicalize_root(replica).map_err(|e| PreconditionError::Canonicalize {
            path: replica.to_path_buf(),
            source: e,
        })?;
        if !replica.is_dir() {
            return Err(PreconditionError::ReplicaNotDirectory(replica));
        }

        if source.starts_with(&replica) || replica.starts_with(&source) {
            return Err(PreconditionError::OverlappingRoots {
                source_root: source,
                replica_root: replica,
            });
        }

        Ok(Self { source, replica })
    }

    /// Validate the source, create the replica root if needed, then resolve
    ///
    /// Returns the roots and whether the replica root had to be created.
    pub fn prepare(source: &Path, replica: &Path) -> Result<(Self, bool), PreconditionError> {
        if !source.exists() {
            return Err(PreconditionError::SourceMissing(source.to_path_buf()));
        }

        let mut created = false;
        if !replica.exists() {
            // Refuse to create a replica that would end up inside the source
            let source_canonical = canonicalize_root(source)
                .map_err(|_| PreconditionError::SourceMissing(source.to_path_buf()))?;
            if absolute(replica).starts_with(&source_canonical) {
                return Err(PreconditionError::OverlappingRoots {
                    source_root: source_canonical,
                    replica_root: absolute(replica),
                });
            }

            std::fs::create_dir_all(replica).map_err(|e| PreconditionError::ReplicaCreate {
                path: replica.to_path_buf(),
                source: e,
            })?;
            info!(replica = %replica.display(), "Created replica directory");
            created = true;
        }

        Ok((Self::resolve(source, replica)?, created))
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    /// Build the path pair for a path relative to both roots
    pub fn pair(&self, relative: &Path) -> PathPair {
        PathPair {
            relative: relative.to_path_buf(),
            source: self.source.join(relative),
            replica: self.replica.join(relative),
        }
    }

    /// Gate for every removal in the replica tree
    ///
    /// The target must lie strictly inside the replica root and must not be
    /// the source root or one of its ancestors.
    pub fn guard_removal(&self, target: &Path) -> Result<(), EntryError> {
        let inside_replica = target.starts_with(&self.replica) && target != self.replica;
        let covers_source = self.source.starts_with(target);
        if inside_replica && !covers_source {
            Ok(())
        } else {
            Err(EntryError::UnsafeRemoval(target.to_path_buf()))
        }
    }
}

/// Canonicalize a root directory (UNC-free on Windows via dunce)
pub fn canonicalize_root(path: &Path) -> std::io::Result<PathBuf> {
    dunce::canonicalize(path)
}

/// Canonical form of a path that may not exist yet
///
/// The deepest existing ancestor is canonicalized and the missing tail is
/// re-joined onto it.
fn absolute(path: &Path) -> PathBuf {
    let mut existing = path;
    let mut tail = Vec::new();
    while !existing.exists() {
        match (existing.parent(), existing.file_name()) {
            (Some(parent), Some(name)) => {
                tail.push(name.to_os_string());
                existing = parent;
            }
            _ => break,
        }
    }

    let base = if existing.as_os_str().is_empty() {
        std::env::current_dir().ok()
    } else {
        canonicalize_root(existing).ok()
    };
    match base {
        Some(mut base) => {
            base.extend(tail.iter().rev());
            base
        }
        None => path.to_path_buf(),
    }
}

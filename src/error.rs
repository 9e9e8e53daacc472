//! Error types for the dirmirror one-way mirroring system.

use std::path::PathBuf;
use thiserror::Error;

/// Conditions that prevent a mirror run from starting at all
#[derive(Debug, Error)]
pub enum PreconditionError {
    #[error("Source directory does not exist: {0}")]
    SourceMissing(PathBuf),

    #[error("Source is not a directory: {0}")]
    SourceNotDirectory(PathBuf),

    #[error("Replica is not a directory: {0}")]
    ReplicaNotDirectory(PathBuf),

    #[error("Source and replica overlap: {source_root} and {replica_root} must not contain each other")]
    OverlappingRoots {
        source_root: PathBuf,
        replica_root: PathBuf,
    },

    #[error("Failed to resolve path {path}: {source}")]
    Canonicalize {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to create replica directory {path}: {source}")]
    ReplicaCreate {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Failure confined to a single entry; the pass continues without it
#[derive(Debug, Error)]
pub enum EntryError {
    #[error("Failed to {action} {path}: {source}")]
    Io {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to traverse {path}: {message}")]
    Traversal { path: PathBuf, message: String },

    #[error("Unsupported entry (symlink or special file): {0}")]
    Unsupported(PathBuf),

    #[error("Copy verification failed for {path}: expected {expected}, got {actual}")]
    Verification {
        path: PathBuf,
        expected: String,
        actual: String,
    },

    #[error("Refusing to remove {0}: outside the replica tree or containing the source")]
    UnsafeRemoval(PathBuf),
}

impl EntryError {
    pub(crate) fn io(
        action: &'static str,
        path: impl Into<PathBuf>,
        source: std::io::Error,
    ) -> Self {
        EntryError::Io {
            action,
            path: path.into(),
            source,
        }
    }

    /// Path of the entry that failed
    pub fn path(&self) -> &std::path::Path {
        match self {
            EntryError::Io { path, .. }
            | EntryError::Traversal { path, .. }
            | EntryError::Verification { path, .. } => path,
            EntryError::Unsupported(path) | EntryError::UnsafeRemoval(path) => path,
        }
    }
}

/// A traversal failure on one of the roots; the whole pass stops
#[derive(Debug, Error)]
#[error("Pass aborted while traversing root {root}: {message}")]
pub struct PassAbort {
    pub root: PathBuf,
    pub message: String,
}

/// Top-level errors surfaced to the binary
#[derive(Debug, Error)]
pub enum MirrorError {
    #[error(transparent)]
    Precondition(#[from] PreconditionError),

    #[error(transparent)]
    Aborted(#[from] PassAbort),

    #[error("Synchronization pass did not complete")]
    PassFailed,

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Logging error: {0}")]
    LoggingError(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<config::ConfigError> for MirrorError {
    fn from(err: config::ConfigError) -> Self {
        MirrorError::ConfigError(err.to_string())
    }
}

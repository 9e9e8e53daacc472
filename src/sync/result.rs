//! Typed outcome of one synchronization pass

use crate::error::EntryError;
use crate::sync::action::MirrorAction;
use chrono::{DateTime, Local};
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Which half of the pass an event belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Phase {
    Forward,
    Reverse,
}

/// Coarse classification of per-entry failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Filesystem,
    Traversal,
    Unsupported,
    Verification,
    UnsafeRemoval,
}

/// A per-entry failure recorded in the pass result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EntryFailure {
    pub phase: Phase,
    pub path: PathBuf,
    pub kind: FailureKind,
    pub message: String,
}

impl EntryFailure {
    pub fn new(phase: Phase, error: &EntryError) -> Self {
        let kind = match error {
            EntryError::Io { .. } => FailureKind::Filesystem,
            EntryError::Traversal { .. } => FailureKind::Traversal,
            EntryError::Unsupported(_) => FailureKind::Unsupported,
            EntryError::Verification { .. } => FailureKind::Verification,
            EntryError::UnsafeRemoval(_) => FailureKind::UnsafeRemoval,
        };
        Self {
            phase,
            path: error.path().to_path_buf(),
            kind,
            message: error.to_string(),
        }
    }
}

impl fmt::Display for EntryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// How the pass ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "reason", rename_all = "snake_case")]
pub enum PassOutcome {
    /// Both phases ran to the end (individual entries may still have failed)
    Completed,
    /// A shutdown request stopped the pass at a checkpoint
    Cancelled,
    /// A root could not be traversed
    Aborted(String),
}

/// Everything a caller needs to introspect one pass
#[derive(Debug, Clone, Serialize)]
pub struct PassResult {
    pub started_at: DateTime<Local>,
    #[serde(with = "duration_millis")]
    pub elapsed: Duration,
    pub outcome: PassOutcome,
    /// Actions that changed the replica, in application order
    pub applied: Vec<MirrorAction>,
    pub failures: Vec<EntryFailure>,
}

impl PassResult {
    pub(crate) fn started() -> Self {
        Self {
            started_at: Local::now(),
            elapsed: Duration::ZERO,
            outcome: PassOutcome::Completed,
            applied: Vec::new(),
            failures: Vec::new(),
        }
    }

    pub(crate) fn finish(mut self, outcome: PassOutcome) -> Self {
        self.outcome = outcome;
        self.elapsed = (Local::now() - self.started_at).to_std().unwrap_or_default();
        self
    }

    /// No mutations and no failures: the replica already matched
    pub fn is_converged(&self) -> bool {
        self.outcome == PassOutcome::Completed
            && self.applied.is_empty()
            && self.failures.is_empty()
    }

    pub fn is_cancelled(&self) -> bool {
        self.outcome == PassOutcome::Cancelled
    }

    pub fn mutation_count(&self) -> usize {
        self.applied.len()
    }

    pub fn conflict_count(&self) -> usize {
        self.applied.iter().filter(|a| a.is_conflict()).count()
    }

    pub fn removal_count(&self) -> usize {
        self.applied.iter().filter(|a| a.is_removal()).count()
    }
}

mod duration_millis {
    use serde::Serializer;
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_millis() as u64)
    }
}

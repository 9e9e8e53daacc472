//! Mirror actions produced by the planner and applied by the executor

use crate::tree::path::PathPair;
use serde::Serialize;
use std::fmt;

/// Why a file is being copied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CopyReason {
    /// No replica file exists yet
    Missing,
    /// The replica file's content differs from the source
    Changed,
}

/// One step towards making the replica match the source
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum MirrorAction {
    CreateDirectory { pair: PathPair },
    CopyFile { pair: PathPair, reason: CopyReason },
    /// Type conflict: the replica holds a non-directory where the source has a directory
    ReplaceWithDirectory { pair: PathPair },
    /// Type conflict: the replica holds a directory where the source has a file
    ReplaceWithFile { pair: PathPair },
    RemoveFile { pair: PathPair },
    RemoveDirectory { pair: PathPair },
}

impl MirrorAction {
    pub fn pair(&self) -> &PathPair {
        match self {
            MirrorAction::CreateDirectory { pair }
            | MirrorAction::CopyFile { pair, .. }
            | MirrorAction::ReplaceWithDirectory { pair }
            | MirrorAction::ReplaceWithFile { pair }
            | MirrorAction::RemoveFile { pair }
            | MirrorAction::RemoveDirectory { pair } => pair,
        }
    }

    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            MirrorAction::ReplaceWithDirectory { .. } | MirrorAction::ReplaceWithFile { .. }
        )
    }

    pub fn is_removal(&self) -> bool {
        matches!(
            self,
            MirrorAction::RemoveFile { .. } | MirrorAction::RemoveDirectory { .. }
        )
    }
}

impl fmt::Display for MirrorAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MirrorAction::CreateDirectory { pair } => {
                write!(f, "Created folder: {}", pair.replica.display())
            }
            MirrorAction::CopyFile { pair, reason } => {
                let verb = match reason {
                    CopyReason::Missing => "Copied file",
                    CopyReason::Changed => "Updated file",
                };
                write!(
                    f,
                    "{}: {} -> {}",
                    verb,
                    pair.source.display(),
                    pair.replica.display()
                )
            }
            MirrorAction::ReplaceWithDirectory { pair } => write!(
                f,
                "Type conflict: replaced file {} with directory from {}",
                pair.replica.display(),
                pair.source.display()
            ),
            MirrorAction::ReplaceWithFile { pair } => write!(
                f,
                "Type conflict: replaced directory {} (recursively) with file from {}",
                pair.replica.display(),
                pair.source.display()
            ),
            MirrorAction::RemoveFile { pair } => {
                write!(f, "Removed file: {}", pair.replica.display())
            }
            MirrorAction::RemoveDirectory { pair } => {
                write!(f, "Removed folder: {}", pair.replica.display())
            }
        }
    }
}

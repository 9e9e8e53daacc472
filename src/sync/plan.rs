//! Tree comparator
//!
//! Decides, without touching the replica, which actions converge it towards
//! the source. The forward plan walks the source; the reverse plan walks the
//! replica and must only be computed after the forward actions were applied.

use crate::error::{EntryError, PassAbort};
use crate::sync::action::{CopyReason, MirrorAction};
use crate::sync::cancel::CancelFlag;
use crate::sync::result::{EntryFailure, Phase};
use crate::sync::SyncJob;
use crate::tree::compare::files_identical;
use crate::tree::walker::{Entry, Visit, WalkEvent, Walker, WalkerConfig};
use serde::Serialize;
use std::collections::HashSet;
use std::fs::Metadata;
use std::io;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Actions and failures collected by one planning walk
#[derive(Debug, Default, Serialize)]
pub struct Plan {
    pub actions: Vec<MirrorAction>,
    pub failures: Vec<EntryFailure>,
    pub cancelled: bool,
}

impl Plan {
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty() && self.failures.is_empty()
    }

    fn fail(&mut self, phase: Phase, error: EntryError) {
        self.failures.push(EntryFailure::new(phase, &error));
    }
}

/// What sits at a path on the other side
enum Presence {
    Absent,
    Directory,
    File,
    /// Symlink or special file
    Other,
}

/// Inspect `path`; with `follow`, a symlink counts as whatever it points at
fn presence(path: &Path, follow: bool) -> io::Result<Presence> {
    let metadata = if follow {
        std::fs::metadata(path)
    } else {
        std::fs::symlink_metadata(path)
    };
    match metadata {
        Ok(metadata) => Ok(classify(&metadata)),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Presence::Absent),
        Err(e) => Err(e),
    }
}

fn classify(metadata: &Metadata) -> Presence {
    let file_type = metadata.file_type();
    if file_type.is_dir() {
        Presence::Directory
    } else if file_type.is_file() {
        Presence::File
    } else {
        Presence::Other
    }
}

/// Plan creates, copies and type-conflict replacements (source -> replica)
pub fn plan_forward(job: &SyncJob, cancel: &CancelFlag) -> Result<Plan, PassAbort> {
    let roots = job.roots();
    let mut plan = Plan::default();
    // Replica directories this plan creates; their children are known absent
    let mut fresh: HashSet<PathBuf> = HashSet::new();

    let walker = Walker::with_config(roots.source().to_path_buf(), job.options().walker.clone());
    walker.visit(|event| {
        if cancel.is_cancelled() {
            plan.cancelled = true;
            return Visit::Stop;
        }

        let entry = match event {
            WalkEvent::Entry(entry) => entry,
            WalkEvent::Error { path, message } => {
                plan.fail(Phase::Forward, EntryError::Traversal { path, message });
                return Visit::Continue;
            }
        };

        let pair = roots.pair(entry.relative());
        let parent_fresh = pair
            .relative
            .parent()
            .map(|parent| fresh.contains(parent))
            .unwrap_or(false);
        let replica = if parent_fresh {
            Ok(Presence::Absent)
        } else {
            presence(&pair.replica, false)
        };

        match (entry, replica) {
            (_, Err(e)) => {
                // The replica side cannot be inspected; leave this subtree alone
                plan.fail(Phase::Forward, EntryError::io("inspect", &pair.replica, e));
                Visit::SkipDirectory
            }
            (Entry::Directory { .. }, Ok(Presence::Directory)) => Visit::Continue,
            (Entry::Directory { relative }, Ok(Presence::Absent)) => {
                fresh.insert(relative);
                plan.actions.push(MirrorAction::CreateDirectory { pair });
                Visit::Continue
            }
            (Entry::Directory { relative }, Ok(Presence::File | Presence::Other)) => {
                fresh.insert(relative);
                plan.actions.push(MirrorAction::ReplaceWithDirectory { pair });
                Visit::Continue
            }
            (Entry::File { .. }, Ok(Presence::Absent)) => {
                plan.actions.push(MirrorAction::CopyFile {
                    pair,
                    reason: CopyReason::Missing,
                });
                Visit::Continue
            }
            (Entry::File { .. }, Ok(Presence::Directory)) => {
                plan.actions.push(MirrorAction::ReplaceWithFile { pair });
                Visit::Continue
            }
            (Entry::File { .. }, Ok(Presence::Other)) => {
                // A symlink in the replica is never trusted as equal content
                plan.actions.push(MirrorAction::CopyFile {
                    pair,
                    reason: CopyReason::Changed,
                });
                Visit::Continue
            }
            (Entry::File { size, .. }, Ok(Presence::File)) => {
                match files_identical(&pair.source, &pair.replica, size, job.options().compare) {
                    Ok(true) => {}
                    Ok(false) => plan.actions.push(MirrorAction::CopyFile {
                        pair,
                        reason: CopyReason::Changed,
                    }),
                    Err(e) => plan.fail(Phase::Forward, EntryError::io("compare", &pair.source, e)),
                }
                Visit::Continue
            }
            (Entry::Symlink { .. } | Entry::Other { .. }, Ok(_)) => {
                plan.fail(Phase::Forward, EntryError::Unsupported(pair.source));
                Visit::Continue
            }
        }
    })?;

    debug!(
        actions = plan.actions.len(),
        failures = plan.failures.len(),
        "Forward plan computed"
    );
    Ok(plan)
}

/// Plan removals of replica entries that have no source counterpart
///
/// A replica entry whose source counterpart exists with a different type is
/// left alone: the forward phase owns type conflicts.
pub fn plan_reverse(job: &SyncJob, cancel: &CancelFlag) -> Result<Plan, PassAbort> {
    let roots = job.roots();
    let mut plan = Plan::default();

    // Links inside the replica are entries to remove or replace, never followed
    let follow_source = job.options().walker.follow_symlinks;
    let config = WalkerConfig {
        follow_symlinks: false,
        ..job.options().walker.clone()
    };
    let walker = Walker::with_config(roots.replica().to_path_buf(), config);
    walker.visit(|event| {
        if cancel.is_cancelled() {
            plan.cancelled = true;
            return Visit::Stop;
        }

        let entry = match event {
            WalkEvent::Entry(entry) => entry,
            WalkEvent::Error { path, message } => {
                plan.fail(Phase::Reverse, EntryError::Traversal { path, message });
                return Visit::Continue;
            }
        };

        let pair = roots.pair(entry.relative());
        match (entry, presence(&pair.source, follow_source)) {
            (_, Err(e)) => {
                // Never delete what cannot be checked against the source
                plan.fail(Phase::Reverse, EntryError::io("inspect", &pair.source, e));
                Visit::SkipDirectory
            }
            (Entry::Directory { .. }, Ok(Presence::Absent)) => {
                plan.actions.push(MirrorAction::RemoveDirectory { pair });
                // Its contents go with it
                Visit::SkipDirectory
            }
            (_, Ok(Presence::Absent)) => {
                plan.actions.push(MirrorAction::RemoveFile { pair });
                Visit::Continue
            }
            (Entry::Directory { .. }, Ok(Presence::Directory)) => Visit::Continue,
            // Present with another type: a forward conflict, not a removal
            (Entry::Directory { .. }, Ok(_)) => Visit::SkipDirectory,
            (_, Ok(_)) => Visit::Continue,
        }
    })?;

    debug!(
        actions = plan.actions.len(),
        failures = plan.failures.len(),
        "Reverse plan computed"
    );
    Ok(plan)
}

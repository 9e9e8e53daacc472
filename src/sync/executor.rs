//! Mirror executor
//!
//! Applies planned actions to the replica. Every action is idempotent: an
//! action whose effect is already in place reports `AlreadyConverged` and is
//! not logged.

use crate::error::EntryError;
use crate::sync::action::MirrorAction;
use crate::sync::SyncJob;
use crate::tree::hasher::{self, CHUNK_SIZE};
use crate::tree::path::PathPair;
use crate::types::Hash;
use std::fs::{self, File, FileTimes};
use std::io::{self, BufReader, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

/// In-flight copies are `.dirmirror-XXXXXX.tmp` siblings of their destination;
/// leftovers are swept by the next reverse phase
pub const TEMP_PREFIX: &str = ".dirmirror-";
pub const TEMP_SUFFIX: &str = ".tmp";

/// Effect of applying one action
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Changed,
    AlreadyConverged,
}

pub struct MirrorExecutor<'a> {
    job: &'a SyncJob,
}

impl<'a> MirrorExecutor<'a> {
    pub fn new(job: &'a SyncJob) -> Self {
        Self { job }
    }

    /// Apply one action to the replica
    pub fn apply(&self, action: &MirrorAction) -> Result<Applied, EntryError> {
        match action {
            MirrorAction::CreateDirectory { pair } => self.create_directory(&pair.replica),
            MirrorAction::CopyFile { pair, .. } => self.copy_file(pair),
            MirrorAction::ReplaceWithDirectory { pair } => {
                self.remove_file(&pair.replica)?;
                self.create_directory(&pair.replica)?;
                Ok(Applied::Changed)
            }
            MirrorAction::ReplaceWithFile { pair } => {
                self.remove_directory(&pair.replica)?;
                self.copy_file(pair)
            }
            MirrorAction::RemoveFile { pair } => self.remove_file(&pair.replica),
            MirrorAction::RemoveDirectory { pair } => self.remove_directory(&pair.replica),
        }
    }

    /// Create a directory and any missing ancestors
    pub fn create_directory(&self, path: &Path) -> Result<Applied, EntryError> {
        if path.is_dir() {
            return Ok(Applied::AlreadyConverged);
        }
        fs::create_dir_all(path).map_err(|e| EntryError::io("create directory", path, e))?;
        Ok(Applied::Changed)
    }

    /// Copy content, permissions and timestamps via a sibling temp file
    ///
    /// The destination is replaced by a rename, so readers never observe a
    /// partially written file. The temp file is freshly named and created
    /// exclusively; it never clobbers an existing replica entry and is
    /// deleted on every error path.
    pub fn copy_file(&self, pair: &PathPair) -> Result<Applied, EntryError> {
        let (temp, source_hash) = self.write_temp_copy(pair)?;
        self.finish_copy(temp, &source_hash, pair)?;
        Ok(Applied::Changed)
    }

    fn write_temp_copy(&self, pair: &PathPair) -> Result<(NamedTempFile, Hash), EntryError> {
        let source_file =
            File::open(&pair.source).map_err(|e| EntryError::io("open", &pair.source, e))?;
        let metadata = source_file
            .metadata()
            .map_err(|e| EntryError::io("read metadata of", &pair.source, e))?;

        let parent = pair.replica.parent().unwrap_or(self.job.roots().replica());
        let mut temp = tempfile::Builder::new()
            .prefix(TEMP_PREFIX)
            .suffix(TEMP_SUFFIX)
            .tempfile_in(parent)
            .map_err(|e| EntryError::io("create temporary file in", parent, e))?;

        let reader = BufReader::with_capacity(CHUNK_SIZE, source_file);
        let source_hash = hasher::copy_hashing(reader, temp.as_file_mut())
            .map_err(|e| EntryError::io("copy", &pair.source, e))?;
        temp.as_file_mut()
            .flush()
            .map_err(|e| EntryError::io("write", temp.path(), e))?;

        let mut times = FileTimes::new();
        if let Ok(modified) = metadata.modified() {
            times = times.set_modified(modified);
        }
        if let Ok(accessed) = metadata.accessed() {
            times = times.set_accessed(accessed);
        }
        temp.as_file()
            .set_times(times)
            .map_err(|e| EntryError::io("set timestamps on", temp.path(), e))?;
        temp.as_file()
            .set_permissions(metadata.permissions())
            .map_err(|e| EntryError::io("set permissions on", temp.path(), e))?;

        Ok((temp, source_hash))
    }

    /// Verify (when enabled) and move the temp copy over the destination
    fn finish_copy(
        &self,
        temp: NamedTempFile,
        source_hash: &Hash,
        pair: &PathPair,
    ) -> Result<(), EntryError> {
        if self.job.options().verify_copies {
            let copied_hash = hasher::hash_file(temp.path())
                .map_err(|e| EntryError::io("verify", temp.path(), e))?;
            if copied_hash != *source_hash {
                return Err(EntryError::Verification {
                    path: pair.replica.clone(),
                    expected: hasher::to_hex(source_hash),
                    actual: hasher::to_hex(&copied_hash),
                });
            }
        }

        temp.persist(&pair.replica)
            .map_err(|e| EntryError::io("replace", &pair.replica, e.error))?;
        Ok(())
    }

    /// Remove one non-directory entry; a vanished entry is already converged
    pub fn remove_file(&self, path: &Path) -> Result<Applied, EntryError> {
        self.job.roots().guard_removal(path)?;
        match fs::remove_file(path) {
            Ok(()) => Ok(Applied::Changed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "File already gone");
                Ok(Applied::AlreadyConverged)
            }
            Err(e) => Err(EntryError::io("remove file", path, e)),
        }
    }

    /// Remove a directory and everything under it
    pub fn remove_directory(&self, path: &Path) -> Result<Applied, EntryError> {
        self.job.roots().guard_removal(path)?;
        match fs::remove_dir_all(path) {
            Ok(()) => Ok(Applied::Changed),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "Directory already gone");
                Ok(Applied::AlreadyConverged)
            }
            Err(e) => Err(EntryError::io("remove directory", path, e)),
        }
    }
}

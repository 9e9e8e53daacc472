//! Integration tests for deletion safety

use super::test_utils::{write, Fixture};
use dirmirror::error::PreconditionError;
use dirmirror::sync::{CancelFlag, MemorySink, PassOutcome, SyncJob, SyncOptions};
use dirmirror::synchronize;
use dirmirror::tree::path::MirrorRoots;
use dirmirror::tree::walker::WalkerConfig;
use std::fs;

#[test]
fn test_nested_roots_are_refused() {
    let fx = Fixture::new();
    write(&fx.source, "a.txt", "a");
    let inner = fx.source.join("inner-replica");
    fs::create_dir(&inner).unwrap();

    assert!(matches!(
        MirrorRoots::resolve(&fx.source, &inner),
        Err(PreconditionError::OverlappingRoots { .. })
    ));
    assert!(matches!(
        MirrorRoots::resolve(&inner, &fx.source),
        Err(PreconditionError::OverlappingRoots { .. })
    ));
    assert!(MirrorRoots::resolve(&fx.source, &fx.source).is_err());

    let result = synchronize(&inner, &fx.source, &MemorySink::new());
    assert!(matches!(result.outcome, PassOutcome::Aborted(_)));
    assert!(fx.source.join("a.txt").exists());
}

#[test]
fn test_prepare_refuses_missing_replica_inside_source() {
    let fx = Fixture::new();
    let nested = fx.source.join("backup");

    assert!(MirrorRoots::prepare(&fx.source, &nested).is_err());
    assert!(!nested.exists());
}

#[test]
fn test_ignored_names_are_never_deleted() {
    let fx = Fixture::new();
    write(&fx.source, "doc.txt", "doc");
    write(&fx.replica, ".snapshots/monday/doc.txt", "old");
    write(&fx.replica, "unrelated.txt", "stale");

    let job = SyncJob::new(
        MirrorRoots::resolve(&fx.source, &fx.replica).unwrap(),
        SyncOptions {
            walker: WalkerConfig {
                follow_symlinks: false,
                ignore_patterns: vec![".snapshots".to_string()],
            },
            ..SyncOptions::default()
        },
    );
    let result = job.run(&MemorySink::new(), &CancelFlag::new());

    assert!(result.failures.is_empty());
    assert!(fx.replica.join(".snapshots/monday/doc.txt").exists());
    assert!(!fx.replica.join("unrelated.txt").exists());
    assert!(fx.replica.join("doc.txt").exists());
}

#[cfg(unix)]
#[test]
fn test_replica_symlink_removal_spares_its_target() {
    let fx = Fixture::new();
    let outside = fx.base().join("outside");
    write(&outside, "valuable.txt", "do not delete");
    std::os::unix::fs::symlink(&outside, fx.replica.join("link-to-outside")).unwrap();

    let sink = MemorySink::new();
    let result = synchronize(&fx.source, &fx.replica, &sink);

    assert_eq!(result.removal_count(), 1);
    assert!(fs::symlink_metadata(fx.replica.join("link-to-outside")).is_err());
    assert_eq!(
        fs::read_to_string(outside.join("valuable.txt")).unwrap(),
        "do not delete"
    );
}

#[test]
fn test_leftover_temp_files_are_swept() {
    let fx = Fixture::new();
    write(&fx.source, "a.txt", "a");
    write(&fx.replica, ".dirmirror-Qx81zA.tmp", "half written");

    synchronize(&fx.source, &fx.replica, &MemorySink::new());

    assert!(!fx.replica.join(".dirmirror-Qx81zA.tmp").exists());
    assert_eq!(fs::read_to_string(fx.replica.join("a.txt")).unwrap(), "a");
}

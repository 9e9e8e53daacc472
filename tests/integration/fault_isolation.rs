//! Integration tests for per-entry failure isolation

use super::test_utils::{write, Fixture};
use dirmirror::sync::{FailureKind, MemorySink, PassOutcome, Phase};
use dirmirror::synchronize;
use std::fs;

#[cfg(unix)]
mod unix {
    use super::*;
    use std::os::unix::fs::PermissionsExt;
    use std::path::Path;

    fn set_mode(path: &Path, mode: u32) {
        fs::set_permissions(path, fs::Permissions::from_mode(mode)).unwrap();
    }

    /// Permission bits do not stop privileged users
    fn permissions_enforced(path: &Path) -> bool {
        fs::read(path).is_err()
    }

    #[test]
    fn test_unreadable_file_does_not_stop_the_pass() {
        let fx = Fixture::new();
        write(&fx.source, "a_first.txt", "first");
        write(&fx.source, "b_locked.txt", "secret");
        write(&fx.source, "c_last.txt", "last");
        let locked = fx.source.join("b_locked.txt");
        set_mode(&locked, 0o000);
        if !permissions_enforced(&locked) {
            set_mode(&locked, 0o644);
            return;
        }

        let sink = MemorySink::new();
        let result = synchronize(&fx.source, &fx.replica, &sink);

        assert_eq!(result.outcome, PassOutcome::Completed);
        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].kind, FailureKind::Filesystem);
        assert_eq!(result.failures[0].phase, Phase::Forward);
        assert!(fx.replica.join("a_first.txt").exists());
        assert!(fx.replica.join("c_last.txt").exists());
        assert!(!fx.replica.join("b_locked.txt").exists());
        assert!(sink
            .lines()
            .iter()
            .any(|l| l.contains("Error:") && l.contains("b_locked.txt")));

        // Fixed on the source side: picked up by the next pass
        set_mode(&locked, 0o644);
        let retry = synchronize(&fx.source, &fx.replica, &MemorySink::new());
        assert!(retry.failures.is_empty());
        assert_eq!(fs::read_to_string(fx.replica.join("b_locked.txt")).unwrap(), "secret");
    }

    #[test]
    fn test_unreadable_source_directory_is_skipped_not_deleted() {
        let fx = Fixture::new();
        write(&fx.source, "open/a.txt", "a");
        write(&fx.source, "sealed/b.txt", "b");
        synchronize(&fx.source, &fx.replica, &MemorySink::new());

        let sealed = fx.source.join("sealed");
        set_mode(&sealed, 0o000);
        if fs::read_dir(&sealed).is_ok() {
            set_mode(&sealed, 0o755);
            return;
        }

        let result = synchronize(&fx.source, &fx.replica, &MemorySink::new());
        set_mode(&sealed, 0o755);

        assert!(!result.failures.is_empty());
        assert_eq!(result.outcome, PassOutcome::Completed);
        // What could not be checked against the source is left in place
        assert!(fx.replica.join("sealed").join("b.txt").exists());
        assert!(fx.replica.join("open").join("a.txt").exists());
    }

    #[test]
    fn test_source_symlink_is_reported_and_skipped() {
        let fx = Fixture::new();
        write(&fx.source, "real.txt", "real");
        std::os::unix::fs::symlink(fx.source.join("real.txt"), fx.source.join("link.txt")).unwrap();

        let result = synchronize(&fx.source, &fx.replica, &MemorySink::new());

        assert_eq!(result.failures.len(), 1);
        assert_eq!(result.failures[0].kind, FailureKind::Unsupported);
        assert!(fx.replica.join("real.txt").exists());
        assert!(fs::symlink_metadata(fx.replica.join("link.txt")).is_err());
    }
}

#[test]
fn test_missing_root_aborts_without_touching_replica() {
    let fx = Fixture::new();
    write(&fx.replica, "precious.txt", "keep me");

    let sink = MemorySink::new();
    let result = synchronize(&fx.base().join("no-such-source"), &fx.replica, &sink);

    assert!(matches!(result.outcome, PassOutcome::Aborted(_)));
    assert!(result.applied.is_empty());
    assert!(fx.replica.join("precious.txt").exists());
    assert!(sink.lines()[0].contains("Error:"));
}

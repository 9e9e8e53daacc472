//! Integration tests for file/directory type conflicts

use super::test_utils::{assert_mirrored, mkdir, write, Fixture};
use dirmirror::sync::{MemorySink, MirrorAction};
use dirmirror::synchronize;

#[test]
fn test_replica_file_replaced_by_source_directory() {
    let fx = Fixture::new();
    write(&fx.source, "foo/inner.txt", "inner");
    mkdir(&fx.source, "foo/sub");
    write(&fx.replica, "foo", "I was a file");

    let sink = MemorySink::new();
    let result = synchronize(&fx.source, &fx.replica, &sink);

    assert!(result.failures.is_empty(), "{:?}", result.failures);
    assert_eq!(result.conflict_count(), 1);
    assert!(matches!(
        result.applied[0],
        MirrorAction::ReplaceWithDirectory { .. }
    ));
    assert!(sink.lines()[0].contains("Type conflict: replaced file"));
    assert_mirrored(&fx.source, &fx.replica);
}

#[test]
fn test_replica_directory_replaced_by_source_file() {
    let fx = Fixture::new();
    write(&fx.source, "foo", "I am a file");
    write(&fx.replica, "foo/a/b.txt", "doomed");
    write(&fx.replica, "foo/c.txt", "doomed too");

    let sink = MemorySink::new();
    let result = synchronize(&fx.source, &fx.replica, &sink);

    assert!(result.failures.is_empty(), "{:?}", result.failures);
    assert_eq!(result.conflict_count(), 1);
    // The subtree went with the replacement; nothing left for the reverse phase
    assert_eq!(result.removal_count(), 0);
    assert!(sink.lines()[0].contains("(recursively)"));
    assert_mirrored(&fx.source, &fx.replica);
}

#[test]
fn test_conflicts_resolve_in_a_single_pass() {
    let fx = Fixture::new();
    write(&fx.source, "x", "file");
    write(&fx.source, "y/z.txt", "z");
    mkdir(&fx.replica, "x/deep");
    write(&fx.replica, "y", "file");

    synchronize(&fx.source, &fx.replica, &MemorySink::new());
    assert_mirrored(&fx.source, &fx.replica);

    let second = synchronize(&fx.source, &fx.replica, &MemorySink::new());
    assert!(second.is_converged());
}

//! Integration tests for idempotent passes

use super::test_utils::{assert_mirrored, mkdir, write, Fixture};
use dirmirror::sync::{CancelFlag, MemorySink, SyncJob, SyncOptions};
use dirmirror::synchronize;
use dirmirror::tree::path::MirrorRoots;

#[test]
fn test_second_pass_is_a_no_op() {
    let fx = Fixture::new();
    write(&fx.source, "a/b/c.txt", "c");
    write(&fx.source, "d.bin", vec![0u8; 200_000]);
    mkdir(&fx.source, "e/f");
    write(&fx.replica, "junk/x", "x");

    let first = synchronize(&fx.source, &fx.replica, &MemorySink::new());
    assert!(first.mutation_count() > 0);

    let sink = MemorySink::new();
    let second = synchronize(&fx.source, &fx.replica, &sink);
    assert!(second.is_converged());
    assert!(sink.is_empty(), "converged pass logged: {:?}", sink.lines());
}

#[test]
fn test_interrupted_pass_is_completed_by_the_next_one() {
    let fx = Fixture::new();
    for i in 0..20 {
        write(&fx.source, &format!("dir{}/file{}.txt", i % 4, i), format!("{}", i));
    }
    let job = SyncJob::new(
        MirrorRoots::resolve(&fx.source, &fx.replica).unwrap(),
        SyncOptions::default(),
    );

    let cancel = CancelFlag::new();
    cancel.cancel();
    let interrupted = job.run(&MemorySink::new(), &cancel);
    assert!(interrupted.is_cancelled());

    let resumed = job.run(&MemorySink::new(), &CancelFlag::new());
    assert!(resumed.failures.is_empty());
    assert_mirrored(&fx.source, &fx.replica);
}

#[test]
fn test_repeated_passes_keep_replica_stable() {
    let fx = Fixture::new();
    write(&fx.source, "x/y.txt", "y");

    for _ in 0..3 {
        synchronize(&fx.source, &fx.replica, &MemorySink::new());
        assert_mirrored(&fx.source, &fx.replica);
    }
}

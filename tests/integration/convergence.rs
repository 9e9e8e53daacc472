//! Integration tests for one-pass convergence

use super::test_utils::{assert_mirrored, mkdir, snapshot, write, Fixture, Node};
use dirmirror::sync::{MemorySink, MirrorAction, PassOutcome};
use dirmirror::synchronize;
use std::path::PathBuf;

#[test]
fn test_empty_replica_converges_in_one_pass() {
    let fx = Fixture::new();
    write(&fx.source, "readme.md", "# hello");
    write(&fx.source, "src/main.rs", "fn main() {}");
    write(&fx.source, "src/nested/deep/leaf.txt", "leaf");
    mkdir(&fx.source, "assets/empty");

    let sink = MemorySink::new();
    let result = synchronize(&fx.source, &fx.replica, &sink);

    assert_eq!(result.outcome, PassOutcome::Completed);
    assert!(result.failures.is_empty());
    assert_mirrored(&fx.source, &fx.replica);
    assert_eq!(sink.len(), result.mutation_count());
}

#[test]
fn test_empty_directories_are_mirrored() {
    let fx = Fixture::new();
    mkdir(&fx.source, "a/b/c");
    mkdir(&fx.source, "z");

    let result = synchronize(&fx.source, &fx.replica, &MemorySink::new());

    let created: Vec<PathBuf> = result
        .applied
        .iter()
        .filter(|a| matches!(a, MirrorAction::CreateDirectory { .. }))
        .map(|a| a.pair().relative.clone())
        .collect();
    // Parents strictly before children
    assert_eq!(
        created,
        vec![
            PathBuf::from("a"),
            PathBuf::from("a/b"),
            PathBuf::from("a/b/c"),
            PathBuf::from("z"),
        ]
    );
    assert_eq!(snapshot(&fx.replica).get(&PathBuf::from("a/b/c")), Some(&Node::Dir));
}

#[test]
fn test_stale_replica_entries_are_removed() {
    let fx = Fixture::new();
    write(&fx.source, "keep/file.txt", "keep");
    write(&fx.replica, "keep/file.txt", "keep");
    write(&fx.replica, "keep/stale.txt", "stale");
    write(&fx.replica, "old/tree/deep.txt", "deep");
    mkdir(&fx.replica, "old/empty");

    let sink = MemorySink::new();
    let result = synchronize(&fx.source, &fx.replica, &sink);

    assert_mirrored(&fx.source, &fx.replica);
    // The whole "old" subtree goes in one recursive removal
    assert_eq!(result.removal_count(), 2);
    let lines = sink.lines();
    assert!(lines.iter().any(|l| l.contains("Removed folder:") && l.contains("old")));
    assert!(lines.iter().any(|l| l.contains("Removed file:") && l.contains("stale.txt")));
}

#[test]
fn test_log_lines_are_timestamped_and_name_both_paths() {
    let fx = Fixture::new();
    write(&fx.source, "a.txt", "a");

    let sink = MemorySink::new();
    synchronize(&fx.source, &fx.replica, &sink);

    let lines = sink.lines();
    assert_eq!(lines.len(), 1);
    let line = &lines[0];
    assert!(line.starts_with('['));
    assert!(line.contains("] Copied file: "));
    assert!(line.contains(" -> "));
    assert!(line.ends_with("a.txt"));
}

#[test]
fn test_modified_source_is_propagated() {
    let fx = Fixture::new();
    write(&fx.source, "config.ini", "v=1");
    synchronize(&fx.source, &fx.replica, &MemorySink::new());

    write(&fx.source, "config.ini", "v=2 and more");
    let sink = MemorySink::new();
    let result = synchronize(&fx.source, &fx.replica, &sink);

    assert_eq!(result.mutation_count(), 1);
    assert!(sink.lines()[0].contains("Updated file:"));
    assert_mirrored(&fx.source, &fx.replica);
}

#[test]
fn test_long_file_names_converge_in_one_pass() {
    let fx = Fixture::new();
    let name = "n".repeat(250);
    write(&fx.source, &name, "long");
    write(&fx.source, &format!("dir/{}", name), "nested long");

    let result = synchronize(&fx.source, &fx.replica, &MemorySink::new());

    assert!(result.failures.is_empty(), "{:?}", result.failures);
    assert_mirrored(&fx.source, &fx.replica);
    assert!(synchronize(&fx.source, &fx.replica, &MemorySink::new()).is_converged());
}

#[test]
fn test_source_files_named_like_temp_copies_converge() {
    let fx = Fixture::new();
    write(&fx.source, "foo", "foo");
    write(&fx.source, ".foo.dirmirror-tmp", "not a temp file");
    write(&fx.source, ".dirmirror-abc123.tmp", "not one either");

    let first = synchronize(&fx.source, &fx.replica, &MemorySink::new());
    assert!(first.failures.is_empty());
    assert_mirrored(&fx.source, &fx.replica);

    let second = synchronize(&fx.source, &fx.replica, &MemorySink::new());
    assert!(second.is_converged());
    assert_eq!(second.mutation_count(), 0);
}

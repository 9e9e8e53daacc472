//! Integration tests for the periodic mirror daemon

use super::test_utils::{assert_mirrored, write, Fixture};
use dirmirror::daemon::MirrorDaemon;
use dirmirror::sync::{MemorySink, SyncJob, SyncOptions};
use dirmirror::tree::path::MirrorRoots;
use std::sync::Arc;
use std::time::{Duration, Instant};

async fn wait_for(condition: impl Fn() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !condition() {
        assert!(Instant::now() < deadline, "condition not reached in time");
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_daemon_picks_up_changes_between_passes() {
    let fx = Fixture::new();
    write(&fx.source, "first.txt", "1");

    let job = SyncJob::new(
        MirrorRoots::resolve(&fx.source, &fx.replica).unwrap(),
        SyncOptions::default(),
    );
    let sink = Arc::new(MemorySink::new());
    let daemon = MirrorDaemon::new(job, Duration::from_millis(50), sink.clone());
    let (stop_tx, stop_rx) = tokio::sync::oneshot::channel::<()>();

    let handle = tokio::spawn(async move {
        daemon
            .run_until(async {
                let _ = stop_rx.await;
            })
            .await
    });

    let replica = fx.replica.clone();
    wait_for(|| replica.join("first.txt").exists()).await;

    write(&fx.source, "second.txt", "2");
    std::fs::remove_file(fx.source.join("first.txt")).unwrap();
    let replica = fx.replica.clone();
    wait_for(|| replica.join("second.txt").exists() && !replica.join("first.txt").exists()).await;

    stop_tx.send(()).unwrap();
    let passes = handle.await.unwrap();

    assert!(passes >= 2);
    assert_mirrored(&fx.source, &fx.replica);
    let lines = sink.lines();
    assert!(lines.last().unwrap().ends_with("Sync stopped"));
    assert!(lines.iter().all(|l| !l.contains("Error:")));
}

#[tokio::test]
async fn test_daemon_survives_vanished_source_root() {
    let fx = Fixture::new();
    write(&fx.source, "a.txt", "a");
    let job = SyncJob::new(
        MirrorRoots::resolve(&fx.source, &fx.replica).unwrap(),
        SyncOptions::default(),
    );
    let sink = Arc::new(MemorySink::new());
    let daemon = MirrorDaemon::new(job, Duration::from_millis(10), sink.clone());

    assert!(daemon.run_once().await.is_some());
    std::fs::remove_dir_all(&fx.source).unwrap();

    // Aborted passes are logged and the loop keeps going
    let passes = daemon
        .run_until(tokio::time::sleep(Duration::from_millis(200)))
        .await;
    assert!(passes >= 1);
    assert!(sink.lines().iter().any(|l| l.contains("Error:")));
    assert!(fx.replica.join("a.txt").exists(), "replica kept when the source vanished");
}

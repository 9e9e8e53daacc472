//! Mirror daemon
//!
//! Runs one synchronization pass per interval until shutdown. Passes run on
//! the blocking pool, one at a time; the async side only waits for the pass,
//! the interval timer, or the shutdown signal.

use crate::sync::{CancelFlag, LogSink, PassOutcome, PassResult, SyncJob};
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{debug, error, info};

pub struct MirrorDaemon {
    job: Arc<SyncJob>,
    interval: Duration,
    sink: Arc<dyn LogSink>,
}

impl MirrorDaemon {
    pub fn new(job: SyncJob, interval: Duration, sink: Arc<dyn LogSink>) -> Self {
        Self {
            job: Arc::new(job),
            interval,
            sink,
        }
    }

    /// Loop until Ctrl-C; returns the number of passes that ran to the end
    pub async fn run(&self) -> usize {
        self.run_until(ctrl_c()).await
    }

    /// Loop until `shutdown` resolves
    ///
    /// A shutdown that arrives mid-pass cancels the pass at its next
    /// checkpoint and waits for it, so no pass outlives the loop.
    pub async fn run_until<F>(&self, shutdown: F) -> usize
    where
        F: Future<Output = ()>,
    {
        tokio::pin!(shutdown);
        let mut passes = 0;
        info!(
            source = %self.job.roots().source().display(),
            replica = %self.job.roots().replica().display(),
            interval_secs = self.interval.as_secs(),
            "Sync started"
        );

        loop {
            let cancel = CancelFlag::new();
            let mut pass = self.spawn_pass(cancel.clone());

            let joined = tokio::select! {
                biased;
                () = &mut shutdown => None,
                joined = &mut pass => Some(joined),
            };
            let Some(joined) = joined else {
                cancel.cancel();
                if let Ok(result) = pass.await {
                    debug!(outcome = ?result.outcome, "In-flight pass stopped");
                }
                break;
            };

            if self.report(joined).is_some() {
                passes += 1;
            }

            let stop = tokio::select! {
                biased;
                () = &mut shutdown => true,
                () = tokio::time::sleep(self.interval) => false,
            };
            if stop {
                break;
            }
        }

        self.sink.log("Sync stopped");
        passes
    }

    /// Run a single pass, stopping it at its next checkpoint on Ctrl-C
    pub async fn run_once(&self) -> Option<PassResult> {
        self.run_once_until(ctrl_c()).await
    }

    /// Run a single pass unless `shutdown` resolves first
    ///
    /// On shutdown the pass is cancelled and awaited; its result then
    /// reports `Cancelled` (or whatever it reached before the checkpoint).
    pub async fn run_once_until<F>(&self, shutdown: F) -> Option<PassResult>
    where
        F: Future<Output = ()>,
    {
        let cancel = CancelFlag::new();
        let mut pass = self.spawn_pass(cancel.clone());
        let finished = tokio::select! {
            biased;
            () = shutdown => None,
            joined = &mut pass => Some(joined),
        };
        let joined = match finished {
            Some(joined) => joined,
            None => {
                cancel.cancel();
                pass.await
            }
        };
        self.report(joined)
    }

    fn spawn_pass(&self, cancel: CancelFlag) -> tokio::task::JoinHandle<PassResult> {
        let job = Arc::clone(&self.job);
        let sink = Arc::clone(&self.sink);
        tokio::task::spawn_blocking(move || job.run(sink.as_ref(), &cancel))
    }

    /// Log what the sink has not already seen; None when the pass panicked
    fn report(&self, joined: Result<PassResult, JoinError>) -> Option<PassResult> {
        match joined {
            Ok(result) => {
                match &result.outcome {
                    PassOutcome::Completed => debug!(
                        mutations = result.mutation_count(),
                        failures = result.failures.len(),
                        elapsed_ms = result.elapsed.as_millis() as u64,
                        "Pass finished"
                    ),
                    PassOutcome::Aborted(reason) => {
                        debug!(reason = %reason, "Pass aborted; retrying next interval")
                    }
                    PassOutcome::Cancelled => {}
                }
                Some(result)
            }
            Err(e) => {
                self.sink
                    .error(&format!("Error: synchronization pass failed: {}", e));
                None
            }
        }
    }
}

/// Resolves on Ctrl-C; never resolves when the handler cannot be installed
async fn ctrl_c() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!(error = %e, "Unable to listen for Ctrl-C; running until killed");
        std::future::pending::<()>().await;
    }
}

//! One-way synchronization passes
//!
//! A pass runs the forward phase (create and update, source to replica) to
//! completion before the reverse phase (delete entries missing from the
//! source) starts. Passes hold no state between runs: every pass compares
//! both trees from scratch, so anything that failed is retried next time.

pub mod action;
pub mod cancel;
pub mod executor;
pub mod plan;
pub mod result;
pub mod sink;

pub use action::{CopyReason, MirrorAction};
pub use cancel::CancelFlag;
pub use executor::{Applied, MirrorExecutor};
pub use plan::{plan_forward, plan_reverse, Plan};
pub use result::{EntryFailure, FailureKind, PassOutcome, PassResult, Phase};
pub use sink::{LogSink, MemorySink, TracingSink};

use crate::tree::compare::CompareStrategy;
use crate::tree::path::MirrorRoots;
use crate::tree::walker::WalkerConfig;
use std::path::Path;
use tracing::{debug, info};

/// Knobs that change how a pass compares and copies
#[derive(Debug, Clone, Default)]
pub struct SyncOptions {
    pub compare: CompareStrategy,
    /// Re-hash every copied file before it replaces the destination
    pub verify_copies: bool,
    pub walker: WalkerConfig,
}

/// A mirror between two resolved roots
#[derive(Debug, Clone)]
pub struct SyncJob {
    roots: MirrorRoots,
    options: SyncOptions,
}

impl SyncJob {
    pub fn new(roots: MirrorRoots, options: SyncOptions) -> Self {
        Self { roots, options }
    }

    pub fn roots(&self) -> &MirrorRoots {
        &self.roots
    }

    pub fn options(&self) -> &SyncOptions {
        &self.options
    }

    /// Run one full pass: forward plan and apply, then reverse plan and apply
    pub fn run(&self, sink: &dyn LogSink, cancel: &CancelFlag) -> PassResult {
        let mut result = PassResult::started();
        debug!(
            source = %self.roots.source().display(),
            replica = %self.roots.replica().display(),
            "Synchronization pass started"
        );

        for phase in [Phase::Forward, Phase::Reverse] {
            let planned = match phase {
                Phase::Forward => plan_forward(self, cancel),
                Phase::Reverse => plan_reverse(self, cancel),
            };
            let plan = match planned {
                Ok(plan) => plan,
                Err(abort) => {
                    sink.error(&format!("Error: {}", abort));
                    return result.finish(PassOutcome::Aborted(abort.to_string()));
                }
            };

            for failure in plan.failures {
                sink.error(&format!("Error: {}", failure));
                result.failures.push(failure);
            }
            if plan.cancelled || !self.apply(phase, plan.actions, sink, cancel, &mut result) {
                info!("Synchronization pass interrupted");
                return result.finish(PassOutcome::Cancelled);
            }
        }

        if result.is_converged() {
            debug!("Synchronization pass found no changes");
        } else {
            info!(
                mutations = result.mutation_count(),
                failures = result.failures.len(),
                "Synchronization pass completed"
            );
        }
        result.finish(PassOutcome::Completed)
    }

    /// Apply actions in order; false when cancelled before finishing
    fn apply(
        &self,
        phase: Phase,
        actions: Vec<MirrorAction>,
        sink: &dyn LogSink,
        cancel: &CancelFlag,
        result: &mut PassResult,
    ) -> bool {
        let executor = MirrorExecutor::new(self);
        for action in actions {
            if cancel.is_cancelled() {
                return false;
            }
            match executor.apply(&action) {
                Ok(Applied::Changed) => {
                    if action.is_conflict() {
                        sink.warn(&action.to_string());
                    } else {
                        sink.log(&action.to_string());
                    }
                    result.applied.push(action);
                }
                Ok(Applied::AlreadyConverged) => {}
                Err(error) => {
                    let failure = EntryFailure::new(phase, &error);
                    sink.error(&format!("Error: {}", failure));
                    result.failures.push(failure);
                }
            }
        }
        true
    }

    /// Dry run: both plans, computed against the current replica, no mutations
    pub fn preview(&self, cancel: &CancelFlag) -> Result<Plan, crate::error::PassAbort> {
        let mut forward = plan_forward(self, cancel)?;
        if forward.cancelled {
            return Ok(forward);
        }
        let reverse = plan_reverse(self, cancel)?;
        forward.actions.extend(reverse.actions);
        forward.failures.extend(reverse.failures);
        forward.cancelled = reverse.cancelled;
        Ok(forward)
    }
}

/// Make `replica` match `source` once, logging every mutation to `sink`
///
/// Both roots must exist. Root problems yield an aborted result instead of
/// an error so a scheduling loop can simply try again later.
pub fn synchronize(source: &Path, replica: &Path, sink: &dyn LogSink) -> PassResult {
    match MirrorRoots::resolve(source, replica) {
        Ok(roots) => SyncJob::new(roots, SyncOptions::default()).run(sink, &CancelFlag::new()),
        Err(e) => {
            sink.error(&format!("Error: {}", e));
            PassResult::started().finish(PassOutcome::Aborted(e.to_string()))
        }
    }
}

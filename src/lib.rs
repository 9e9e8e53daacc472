//! dirmirror: One-Way Directory Mirroring
//!
//! Keeps a replica directory identical to a source directory by re-running a
//! two-phase pass (create and update, then delete) on a fixed interval.

pub mod cli;
pub mod config;
pub mod daemon;
pub mod error;
pub mod logging;
pub mod sync;
pub mod tree;
pub mod types;

pub use sync::{synchronize, LogSink, PassOutcome, PassResult};

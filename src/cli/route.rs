//! CLI route: run context and dispatch to the sync services and presentation.

use crate::cli::parse::{Cli, OutputFormat};
use crate::cli::presentation::{
    format_pass_result_json, format_pass_result_text, format_plan_json, format_plan_text,
};
use crate::config::{ConfigLoader, ConfigOverrides, MirrorConfig};
use crate::daemon::MirrorDaemon;
use crate::error::MirrorError;
use crate::sync::{CancelFlag, SyncJob, TracingSink};
use crate::tree::path::MirrorRoots;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// What the invocation asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    PrintConfig,
    DryRun,
    Once,
    Daemon,
}

/// Runtime context for CLI execution: the effective configuration and mode.
pub struct RunContext {
    config: MirrorConfig,
    mode: RunMode,
    format: OutputFormat,
}

impl RunContext {
    /// Load layered configuration and apply command-line overrides
    pub fn new(cli: &Cli) -> Result<Self, MirrorError> {
        let mut config = ConfigLoader::load(cli.config.as_deref())?;
        overrides_from(cli).apply(&mut config);

        let mode = if cli.print_config {
            RunMode::PrintConfig
        } else if cli.dry_run {
            RunMode::DryRun
        } else if cli.once {
            RunMode::Once
        } else {
            RunMode::Daemon
        };

        if mode != RunMode::PrintConfig {
            config.validate().map_err(|errors| {
                let error_msgs: Vec<String> = errors.iter().map(|e| e.to_string()).collect();
                MirrorError::ConfigError(format!(
                    "Configuration validation failed:\n{}",
                    error_msgs.join("\n")
                ))
            })?;
        }

        Ok(Self {
            config,
            mode,
            format: cli.format,
        })
    }

    pub fn config(&self) -> &MirrorConfig {
        &self.config
    }

    pub fn mode(&self) -> RunMode {
        self.mode
    }

    /// Run the requested mode; returns text to print, if any
    pub fn execute(&self) -> Result<Option<String>, MirrorError> {
        if self.mode == RunMode::PrintConfig {
            return self
                .config
                .to_toml()
                .map(Some)
                .map_err(|e| MirrorError::ConfigError(format!("Failed to render config: {}", e)));
        }

        let job = self.job()?;
        match self.mode {
            RunMode::DryRun => {
                let plan = job.preview(&CancelFlag::new())?;
                let rendered = match self.format {
                    OutputFormat::Text => format_plan_text(&plan),
                    OutputFormat::Json => format_plan_json(&plan)?,
                };
                Ok(Some(rendered))
            }
            RunMode::Once => {
                let daemon = self.daemon(job);
                // Ctrl-C stops the pass at a checkpoint and still exits cleanly
                let result = runtime()?
                    .block_on(daemon.run_once())
                    .ok_or(MirrorError::PassFailed)?;
                let rendered = match self.format {
                    OutputFormat::Text => format_pass_result_text(&result),
                    OutputFormat::Json => format_pass_result_json(&result)?,
                };
                Ok(Some(rendered))
            }
            RunMode::Daemon => {
                let daemon = self.daemon(job);
                let passes = runtime()?.block_on(daemon.run());
                info!(passes, "Daemon exiting");
                Ok(None)
            }
            RunMode::PrintConfig => Ok(None),
        }
    }

    fn daemon(&self, job: SyncJob) -> MirrorDaemon {
        MirrorDaemon::new(
            job,
            Duration::from_secs(self.config.sync.interval_secs),
            Arc::new(TracingSink),
        )
    }

    /// Check the source, create the replica root if needed, and resolve both
    fn job(&self) -> Result<SyncJob, MirrorError> {
        let source = required(&self.config.source, "source")?;
        let replica = required(&self.config.replica, "replica")?;
        let roots = if self.mode == RunMode::DryRun {
            // A dry run never creates anything, not even the replica root
            MirrorRoots::resolve(&source, &replica)?
        } else {
            MirrorRoots::prepare(&source, &replica)?.0
        };
        Ok(SyncJob::new(roots, self.config.sync_options()))
    }
}

fn runtime() -> Result<tokio::runtime::Runtime, MirrorError> {
    Ok(tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?)
}

fn required(path: &Option<PathBuf>, name: &str) -> Result<PathBuf, MirrorError> {
    path.clone()
        .ok_or_else(|| MirrorError::ConfigError(format!("{} directory is required", name)))
}

fn overrides_from(cli: &Cli) -> ConfigOverrides {
    ConfigOverrides {
        source: cli.source.clone(),
        replica: cli.replica.clone(),
        interval_secs: cli.interval_secs,
        log_file: cli.log_file.clone(),
        compare: cli.compare,
        verify_copies: cli.verify,
        follow_symlinks: cli.follow_symlinks,
        ignore: cli.ignore.clone(),
        log_level: cli.log_level.clone(),
        log_format: cli.log_format.clone(),
        log_output: cli.log_output.clone(),
    }
}

//! CLI parse: clap types for dirmirror. No behavior; definitions only.

use crate::tree::compare::CompareStrategy;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// dirmirror - keep a replica directory identical to a source directory
#[derive(Debug, Parser)]
#[command(name = "dirmirror", version)]
#[command(about = "Periodically mirror a source directory into a replica directory")]
pub struct Cli {
    /// Directory to mirror from
    pub source: Option<PathBuf>,

    /// Directory made to match the source (created if absent)
    pub replica: Option<PathBuf>,

    /// Seconds between synchronization passes
    pub interval_secs: Option<u64>,

    /// Durable log file, appended to
    pub log_file: Option<PathBuf>,

    /// Configuration file path (layered over the global config file)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Run a single pass and exit
    #[arg(long)]
    pub once: bool,

    /// Show what a pass would change without touching the replica
    #[arg(long, conflicts_with = "once")]
    pub dry_run: bool,

    /// File comparison strategy
    #[arg(long, value_enum)]
    pub compare: Option<CompareStrategy>,

    /// Re-hash every copied file before it replaces the replica file
    #[arg(long)]
    pub verify: bool,

    /// Follow symbolic links in both trees
    #[arg(long)]
    pub follow_symlinks: bool,

    /// Entry name to skip on both sides (repeatable)
    #[arg(long = "ignore", value_name = "NAME")]
    pub ignore: Vec<String>,

    /// Keep the console silent (the log file, if any, still receives everything)
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stdout, stderr, file, file+stdout, file+stderr)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Summary format for --once and --dry-run
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    pub print_config: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

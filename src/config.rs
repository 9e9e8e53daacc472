//! Configuration System
//!
//! Layered configuration for the mirror daemon: built-in defaults, the global
//! config file, an explicit `--config` file, `DIRMIRROR_*` environment
//! variables, then command-line arguments. Tests included.

use crate::logging::{LogOutput, LoggingConfig};
use crate::sync::SyncOptions;
use crate::tree::compare::CompareStrategy;
use crate::tree::walker::WalkerConfig;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

mod facade;
mod merge;
mod sources;

pub use facade::{ConfigLoader, ENV_PREFIX};
pub use merge::merge_policy::DEFAULT_INTERVAL_SECS;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MirrorConfig {
    /// Directory mirrored from
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<PathBuf>,

    /// Directory made to match the source
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replica: Option<PathBuf>,

    /// Pass behavior
    #[serde(default)]
    pub sync: SyncSettings,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings that shape every pass
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SyncSettings {
    /// Seconds to sleep between passes
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,

    /// How file contents are compared
    #[serde(default)]
    pub compare: CompareStrategy,

    /// Re-hash copies before they replace the destination
    #[serde(default)]
    pub verify_copies: bool,

    /// Follow symbolic links in both trees
    #[serde(default)]
    pub follow_symlinks: bool,

    /// Entry names skipped on both sides
    #[serde(default)]
    pub ignore: Vec<String>,
}

fn default_interval_secs() -> u64 {
    DEFAULT_INTERVAL_SECS
}

impl Default for SyncSettings {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            compare: CompareStrategy::default(),
            verify_copies: false,
            follow_symlinks: false,
            ignore: Vec::new(),
        }
    }
}

impl From<&SyncSettings> for SyncOptions {
    fn from(settings: &SyncSettings) -> Self {
        SyncOptions {
            compare: settings.compare,
            verify_copies: settings.verify_copies,
            walker: WalkerConfig {
                follow_symlinks: settings.follow_symlinks,
                ignore_patterns: settings.ignore.clone(),
            },
        }
    }
}

/// Command-line values; each one set wins over every other layer
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub source: Option<PathBuf>,
    pub replica: Option<PathBuf>,
    pub interval_secs: Option<u64>,
    pub log_file: Option<PathBuf>,
    pub compare: Option<CompareStrategy>,
    pub verify_copies: bool,
    pub follow_symlinks: bool,
    /// Appended to the configured ignore list
    pub ignore: Vec<String>,
    pub log_level: Option<String>,
    pub log_format: Option<String>,
    pub log_output: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(self, config: &mut MirrorConfig) {
        if let Some(source) = self.source {
            config.source = Some(source);
        }
        if let Some(replica) = self.replica {
            config.replica = Some(replica);
        }
        if let Some(interval) = self.interval_secs {
            config.sync.interval_secs = interval;
        }
        if let Some(compare) = self.compare {
            config.sync.compare = compare;
        }
        // Flags can only switch a feature on
        config.sync.verify_copies |= self.verify_copies;
        config.sync.follow_symlinks |= self.follow_symlinks;
        for name in self.ignore {
            if !config.sync.ignore.contains(&name) {
                config.sync.ignore.push(name);
            }
        }

        if let Some(file) = self.log_file {
            config.logging.file = Some(file);
        }
        if let Some(level) = self.log_level {
            config.logging.level = level;
        }
        if let Some(format) = self.log_format {
            config.logging.format = format;
        }
        if let Some(output) = self.log_output {
            config.logging.output = Some(output);
        }
    }
}

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq)]
pub enum ValidationError {
    Roots(String),
    Sync(String),
    Logging(String),
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValidationError::Roots(msg) => write!(f, "Roots: {}", msg),
            ValidationError::Sync(msg) => write!(f, "Sync: {}", msg),
            ValidationError::Logging(msg) => write!(f, "Logging: {}", msg),
        }
    }
}

impl std::error::Error for ValidationError {}

impl SyncSettings {
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.interval_secs == 0 {
            errors.push("interval_secs must be greater than zero".to_string());
        }
        for name in &self.ignore {
            if name.trim().is_empty() {
                errors.push("ignore entries cannot be empty".to_string());
            } else if name.contains('/') || name.contains('\\') {
                errors.push(format!(
                    "ignore entry '{}' must be a single file or directory name",
                    name
                ));
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

impl MirrorConfig {
    /// Validate the entire configuration
    pub fn validate(&self) -> Result<(), Vec<ValidationError>> {
        let mut errors = Vec::new();

        if is_unset(&self.source) {
            errors.push(ValidationError::Roots("source directory is required".to_string()));
        }
        if is_unset(&self.replica) {
            errors.push(ValidationError::Roots("replica directory is required".to_string()));
        }

        if let Err(sync_errors) = self.sync.validate() {
            errors.extend(sync_errors.into_iter().map(ValidationError::Sync));
        }

        if let Some(output) = &self.logging.output {
            if let Err(e) = LogOutput::parse(output) {
                errors.push(ValidationError::Logging(e.to_string()));
            }
        }
        if self.logging.format != "text" && self.logging.format != "json" {
            errors.push(ValidationError::Logging(format!(
                "Invalid log format: {} (must be 'json' or 'text')",
                self.logging.format
            )));
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// Effective configuration rendered as TOML
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    pub fn sync_options(&self) -> SyncOptions {
        SyncOptions::from(&self.sync)
    }
}

fn is_unset(path: &Option<PathBuf>) -> bool {
    path.as_ref().map_or(true, |p| p.as_os_str().is_empty())
}

//! Logging System
//!
//! Structured logging on `tracing`. Console and durable file output are
//! separate layers so a log file that cannot be opened never silences the
//! console.

use crate::error::MirrorError;
use crate::sync::sink::TIMESTAMP_FORMAT;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::{File, OpenOptions};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing_subscriber::fmt::time::ChronoLocal;
use tracing_subscriber::fmt::MakeWriter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Logging configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Install a subscriber at all
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Log level: trace, debug, info, warn, error, off
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Output format: json, text (default: text)
    #[serde(default = "default_format")]
    pub format: String,

    /// stdout, stderr, file, file+stdout, file+stderr
    ///
    /// Unset means `file+stdout` when a log file is configured, otherwise `stdout`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,

    /// Durable log file (appended to, never truncated)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,

    /// Enable colored output (text format only, console only)
    #[serde(default = "default_true")]
    pub color: bool,

    /// Module-specific log levels
    #[serde(default)]
    pub modules: HashMap<String, String>,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            level: default_log_level(),
            format: default_format(),
            output: None,
            file: None,
            color: true,
            modules: HashMap::new(),
        }
    }
}

/// Where log lines go
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    Stderr,
    File,
    FileAndStdout,
    FileAndStderr,
}

impl LogOutput {
    pub fn parse(output: &str) -> Result<Self, MirrorError> {
        match output {
            "stdout" => Ok(LogOutput::Stdout),
            "stderr" => Ok(LogOutput::Stderr),
            "file" => Ok(LogOutput::File),
            "file+stdout" => Ok(LogOutput::FileAndStdout),
            "file+stderr" => Ok(LogOutput::FileAndStderr),
            _ => Err(MirrorError::ConfigError(format!(
                "Invalid log output: {} (must be 'stdout', 'stderr', 'file', 'file+stdout' or 'file+stderr')",
                output
            ))),
        }
    }

    pub fn includes_file(self) -> bool {
        matches!(
            self,
            LogOutput::File | LogOutput::FileAndStdout | LogOutput::FileAndStderr
        )
    }

    fn console(self) -> Option<Console> {
        match self {
            LogOutput::Stdout | LogOutput::FileAndStdout => Some(Console::Stdout),
            LogOutput::Stderr | LogOutput::FileAndStderr => Some(Console::Stderr),
            LogOutput::File => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Console {
    Stdout,
    Stderr,
}

impl LoggingConfig {
    /// Effective output, applying the log-file default
    pub fn resolved_output(&self) -> Result<LogOutput, MirrorError> {
        match &self.output {
            Some(output) => LogOutput::parse(output),
            None if self.file.is_some() => Ok(LogOutput::FileAndStdout),
            None => Ok(LogOutput::Stdout),
        }
    }

    /// Configured log file, or the per-user state directory default
    pub fn resolved_file(&self) -> Option<PathBuf> {
        self.file.clone().or_else(default_log_file)
    }
}

/// `<state dir>/dirmirror.log` for this user
pub fn default_log_file() -> Option<PathBuf> {
    let dirs = ProjectDirs::from("", "", "dirmirror")?;
    let base = dirs.state_dir().unwrap_or_else(|| dirs.data_local_dir());
    Some(base.join("dirmirror.log"))
}

type BoxedLayer = Box<dyn Layer<Registry> + Send + Sync>;

/// Initialize the logging system
///
/// Priority order (highest to lowest):
/// 1. Environment variables (DIRMIRROR_LOG, DIRMIRROR_LOG_FORMAT)
/// 2. The resolved configuration (CLI arguments already merged in)
/// 3. Defaults
pub fn init_logging(config: Option<&LoggingConfig>) -> Result<(), MirrorError> {
    let default_config = LoggingConfig::default();
    let config = config.unwrap_or(&default_config);
    if !config.enabled {
        return Ok(());
    }

    let json = determine_format(config)? == "json";
    let output = config.resolved_output()?;

    let mut layers: Vec<BoxedLayer> = Vec::new();
    let mut file_warning = None;

    if output.includes_file() {
        match config.resolved_file() {
            Some(path) => match open_log_file(&path) {
                Ok(file) => {
                    let filter = build_env_filter(config)?;
                    layers.push(build_layer(Mutex::new(file), json, false, filter));
                }
                Err(message) => file_warning = Some(message),
            },
            None => {
                file_warning =
                    Some("No log file configured and no state directory available".to_string())
            }
        }
    }

    // A file-only setup that lost its file still needs somewhere to report
    let console = match output.console() {
        Some(console) => Some(console),
        None if file_warning.is_some() => Some(Console::Stderr),
        None => None,
    };
    match console {
        Some(Console::Stdout) => {
            let filter = build_env_filter(config)?;
            layers.push(build_layer(std::io::stdout, json, config.color, filter));
        }
        Some(Console::Stderr) => {
            let filter = build_env_filter(config)?;
            layers.push(build_layer(std::io::stderr, json, config.color, filter));
        }
        None => {}
    }

    tracing_subscriber::registry()
        .with(layers)
        .try_init()
        .map_err(|e| MirrorError::LoggingError(format!("Failed to install subscriber: {}", e)))?;

    if let Some(message) = file_warning {
        tracing::warn!("{}; logging to the console only", message);
    }
    Ok(())
}

fn build_layer<W>(writer: W, json: bool, ansi: bool, filter: EnvFilter) -> BoxedLayer
where
    W: for<'a> MakeWriter<'a> + Send + Sync + 'static,
{
    let layer = fmt::layer()
        .with_target(true)
        .with_timer(ChronoLocal::new(TIMESTAMP_FORMAT.to_string()))
        .with_writer(writer);
    if json {
        layer.json().with_filter(filter).boxed()
    } else {
        layer.with_ansi(ansi).with_filter(filter).boxed()
    }
}

fn open_log_file(path: &Path) -> Result<File, String> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(|e| {
                format!("Failed to create log directory {}: {}", parent.display(), e)
            })?;
        }
    }
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| format!("Failed to open log file {}: {}", path.display(), e))
}

/// Build environment filter from config or environment variables
fn build_env_filter(config: &LoggingConfig) -> Result<EnvFilter, MirrorError> {
    if let Ok(filter) = EnvFilter::try_from_env("DIRMIRROR_LOG") {
        return Ok(filter);
    }

    if config.level == "off" {
        return Ok(EnvFilter::new("off"));
    }

    let mut filter = EnvFilter::try_new(&config.level)
        .map_err(|e| {
            MirrorError::ConfigError(format!("Invalid log level {}: {}", config.level, e))
        })?;

    for (module, module_level) in &config.modules {
        let directive = format!("{}={}", module, module_level);
        filter = filter.add_directive(
            directive
                .parse()
                .map_err(|e| MirrorError::ConfigError(format!("Invalid log directive: {}", e)))?,
        );
    }

    Ok(filter)
}

/// Determine output format from config or environment
fn determine_format(config: &LoggingConfig) -> Result<String, MirrorError> {
    if let Ok(format) = std::env::var("DIRMIRROR_LOG_FORMAT") {
        if format == "json" || format == "text" {
            return Ok(format);
        }
    }

    if config.format != "json" && config.format != "text" {
        return Err(MirrorError::ConfigError(format!(
            "Invalid log format: {} (must be 'json' or 'text')",
            config.format
        )));
    }

    Ok(config.format.clone())
}

//! Merge rules: defaults, override order, conflict handling.

use config::Config;
use config::ConfigBuilder;
use config::ConfigError;

/// Seconds between passes when nothing else says otherwise
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Create a Config builder with merge policy defaults applied.
pub fn builder_with_defaults() -> Result<ConfigBuilder<config::builder::DefaultState>, ConfigError>
{
    Config::builder()
        .set_default("sync.interval_secs", DEFAULT_INTERVAL_SECS)?
        .set_default("sync.compare", "bytes")?
        .set_default("sync.verify_copies", false)?
        .set_default("sync.follow_symlinks", false)?
        .set_default("sync.ignore", Vec::<String>::new())?
        .set_default("logging.enabled", true)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "text")
}

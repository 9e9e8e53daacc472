//! Config loader: assembles the layered sources into a `MirrorConfig`

use super::merge::merge_policy;
use super::sources::{explicit_file, global_file};
use super::MirrorConfig;
use config::{ConfigError, Environment};
use std::path::Path;

/// Prefix of environment overrides, e.g. `DIRMIRROR_SYNC__INTERVAL_SECS`
pub const ENV_PREFIX: &str = "DIRMIRROR";

pub struct ConfigLoader;

impl ConfigLoader {
    /// Defaults, global file, `explicit` (when given), then environment
    pub fn load(explicit: Option<&Path>) -> Result<MirrorConfig, ConfigError> {
        let mut builder = merge_policy::builder_with_defaults()?;
        builder = global_file::add_to_builder(builder)?;
        if let Some(path) = explicit {
            builder = explicit_file::add_to_builder(builder, path)?;
        }
        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("sync.ignore"),
        );
        builder.build()?.try_deserialize()
    }

    /// Defaults plus one file, nothing else
    pub fn load_from_file(path: &Path) -> Result<MirrorConfig, ConfigError> {
        let builder = explicit_file::add_to_builder(merge_policy::builder_with_defaults()?, path)?;
        builder.build()?.try_deserialize()
    }
}

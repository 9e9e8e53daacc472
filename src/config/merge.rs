//! Merge layer: defaults and override ordering.

pub mod merge_policy;

//! Configuration sources, lowest precedence first.

pub mod explicit_file;
pub mod global_file;

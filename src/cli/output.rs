//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::MirrorError;

/// Exit status for a clean shutdown, including Ctrl-C
pub const EXIT_OK: i32 = 0;
/// Exit status when configuration or root preconditions fail
pub const EXIT_FAILURE: i32 = 1;

/// Map domain/service errors to a string for CLI output.
pub fn map_error(e: &MirrorError) -> String {
    format!("Error: {}", e)
}

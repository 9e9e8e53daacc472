//! CLI domain: parse, route, output, and presentation only.
//! No sync logic lives here; the route dispatches to the sync services.

mod output;
mod parse;
mod presentation;
mod route;

pub use output::{map_error, EXIT_FAILURE, EXIT_OK};
pub use parse::{Cli, OutputFormat};
pub use presentation::{
    format_pass_result_json, format_pass_result_text, format_plan_json, format_plan_text,
};
pub use route::{RunContext, RunMode};

//! dirmirror CLI Binary
//!
//! Mirrors a source directory into a replica directory, once or on an interval.

use clap::Parser;
use dirmirror::cli::{map_error, Cli, RunContext, EXIT_FAILURE};
use dirmirror::config::MirrorConfig;
use dirmirror::logging::{init_logging, LogOutput, LoggingConfig};
use std::process;
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();

    let context = match RunContext::new(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{}", map_error(&e));
            process::exit(EXIT_FAILURE);
        }
    };

    let logging_config = build_logging_config(&cli, context.config());
    if let Err(e) = init_logging(Some(&logging_config)) {
        eprintln!("Failed to initialize logging: {}", e);
        process::exit(EXIT_FAILURE);
    }
    debug!(mode = ?context.mode(), "dirmirror starting");

    match context.execute() {
        Ok(Some(output)) => println!("{}", output),
        Ok(None) => {}
        Err(e) => {
            error!("{}", e);
            eprintln!("{}", map_error(&e));
            process::exit(EXIT_FAILURE);
        }
    }
}

/// Build logging configuration from the effective config and console flags.
/// An explicit --log-output value wins over --quiet and --verbose defaults.
fn build_logging_config(cli: &Cli, config: &MirrorConfig) -> LoggingConfig {
    let mut logging = config.logging.clone();
    let explicit_output = cli.log_output.is_some();

    if cli.quiet && !explicit_output {
        // Silence the console but keep the durable log
        if logging.file.is_some() {
            logging.output = Some("file".to_string());
        } else {
            logging.enabled = false;
        }
    }
    if cli.verbose {
        logging.level = "debug".to_string();
        if !explicit_output && logging.resolved_output().ok() == Some(LogOutput::File) {
            logging.output = Some("file+stderr".to_string());
        }
    }

    logging
}

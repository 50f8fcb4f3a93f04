//! Help text generation and utilities

use crate::cli::args::Cli;
use clap::CommandFactory;

/// Generate comprehensive help text for the CLI
pub fn generate_help() -> String {
    Cli::command().render_help().to_string()
}

/// Get the log filter for a verbosity level; `None` keeps the configured level
pub fn get_log_level(verbose: u8) -> Option<&'static str> {
    match verbose {
        0 => None,
        1 => Some("debug"),
        2 => Some("trace"),
        _ => Some("trace,hyper=debug,reqwest=debug"), // -vvv shows everything including dependencies
    }
}

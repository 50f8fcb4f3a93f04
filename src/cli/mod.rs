//! CLI command handlers
//!
//! This module contains all CLI-related functionality including:
//! - Argument parsing structures
//! - Command routing onto the orchestrator
//! - Log level selection

pub mod args;
pub mod help;
pub mod router;

// Re-export the main CLI structures for convenience
pub use args::{Cli, Commands, GroupArgs};
pub use help::{generate_help, get_log_level};
pub use router::execute_command;

//! CLI module
//!
//! Provides command-line interface for:
//! - serve: Run the HTTP server with the echo engine
//! - sweep-uploads: Delete expired uploads once

mod args;
mod commands;
mod errors;

pub use args::{Cli, Command};
pub use commands::{load_config, run, run_command, serve, sweep_uploads};
pub use errors::{CliError, CliErrorCode, CliResult};

//! CLI module for jobsys
//!
//! Provides command-line interface for:
//! - init: Create the database and schema
//! - serve: Boot the store and serve the HTTP API

mod args;
mod commands;
mod errors;
mod io;

pub use args::{Cli, Command};
pub use commands::{init, run, run_command, serve};
pub use errors::{CliError, CliErrorCode, CliResult};

//! CLI argument definitions using clap
//!
//! Commands:
//! - jobsys init --config <path> [--database <path>]
//! - jobsys serve --config <path> [--host <host>] [--port <port>] [--database <path>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// jobsys - a REST API for tracking jobs, their parameters and logs
#[derive(Parser, Debug)]
#[command(name = "jobsys")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the database and its schema
    Init {
        /// Path to configuration file
        #[arg(long, default_value = "./jobsys.json")]
        config: PathBuf,

        /// Database file, overriding the configuration
        #[arg(long)]
        database: Option<PathBuf>,
    },

    /// Start the HTTP server
    Serve {
        /// Path to configuration file
        #[arg(long, default_value = "./jobsys.json")]
        config: PathBuf,

        /// Host to bind, overriding the configuration
        #[arg(long)]
        host: Option<String>,

        /// Port to bind, overriding the configuration
        #[arg(long)]
        port: Option<u16>,

        /// Database file, overriding the configuration
        #[arg(long)]
        database: Option<PathBuf>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

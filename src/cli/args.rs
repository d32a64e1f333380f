//! CLI argument definitions using clap
//!
//! Commands:
//! - graphql-http-handler serve [--config <path>] [--port <port>]
//! - graphql-http-handler sweep-uploads [--config <path>] [--max-age-secs <secs>]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// GraphQL over HTTP with GraphiQL and multipart uploads
#[derive(Parser, Debug)]
#[command(name = "graphql-http-handler")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Serve the diagnostic echo engine over HTTP
    Serve {
        /// Path to a JSON server configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Port to bind, overriding the configuration file
        #[arg(long)]
        port: Option<u16>,

        /// Name reported by the echo schema
        #[arg(long, default_value = "echo")]
        schema_name: String,
    },

    /// Delete expired uploads and exit
    SweepUploads {
        /// Path to a JSON server configuration file
        #[arg(long)]
        config: Option<PathBuf>,

        /// Maximum upload age, overriding `upload_retention_secs`
        #[arg(long)]
        max_age_secs: Option<u64>,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

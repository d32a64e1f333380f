//! CLI command implementations
//!
//! `serve` runs the echo engine behind the HTTP server until the process is
//! killed. `sweep-uploads` applies the upload retention window once.

use std::path::Path;

use crate::engine::{EchoEngine, EchoSchema};
use crate::http_server::{HttpServer, HttpServerConfig};
use crate::options::{UploadMaterializer, UploadRetention};

use super::args::Command;
use super::errors::{CliError, CliResult};

/// Main CLI entry point
///
/// Parses arguments and dispatches to the appropriate command.
pub fn run() -> CliResult<()> {
    let cli = super::args::Cli::parse_args();
    run_command(cli.command)
}

/// Run the appropriate command based on CLI args
pub fn run_command(cmd: Command) -> CliResult<()> {
    match cmd {
        Command::Serve {
            config,
            port,
            schema_name,
        } => serve(config.as_deref(), port, &schema_name),
        Command::SweepUploads {
            config,
            max_age_secs,
        } => sweep_uploads(config.as_deref(), max_age_secs).map(|_| ()),
    }
}

/// Load the server config, or defaults when no file is given
pub fn load_config(config_path: Option<&Path>) -> CliResult<HttpServerConfig> {
    match config_path {
        Some(path) => Ok(HttpServerConfig::load(path)?),
        None => Ok(HttpServerConfig::default()),
    }
}

/// Serve the echo engine
pub fn serve(config_path: Option<&Path>, port: Option<u16>, schema_name: &str) -> CliResult<()> {
    let mut config = load_config(config_path)?;
    if let Some(port) = port {
        config.port = port;
    }

    let server = HttpServer::with_config(config, EchoEngine, EchoSchema::new(schema_name))?;

    let rt = tokio::runtime::Runtime::new()
        .map_err(|e| CliError::serve_failed(format!("Failed to create tokio runtime: {}", e)))?;

    rt.block_on(server.start())?;

    Ok(())
}

/// Delete expired uploads, returning how many were removed
pub fn sweep_uploads(config_path: Option<&Path>, max_age_secs: Option<u64>) -> CliResult<usize> {
    let config = load_config(config_path)?;

    let retention = match max_age_secs {
        Some(secs) => UploadRetention::from_secs(Some(secs)),
        None => config.upload_retention(),
    };
    if retention == UploadRetention::KeepForever {
        return Err(CliError::config_error(
            "No retention window: set upload_retention_secs or --max-age-secs",
        ));
    }

    let uploads = UploadMaterializer::new(&config.upload_dir)?.with_retention(retention);
    let removed = uploads.sweep_expired()?;

    tracing::info!(
        event = "SWEEP_COMPLETE",
        removed,
        dir = %uploads.dir().display()
    );

    Ok(removed)
}

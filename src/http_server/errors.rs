//! # HTTP Server Errors

use thiserror::Error;

use crate::handler::HandlerError;

/// Result type for server setup
pub type ServerResult<T> = Result<T, ServerError>;

/// Startup failures. All are fatal.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Handler(#[from] HandlerError),

    #[error("Invalid socket address: {0}")]
    Address(String),

    #[error("HTTP server failed: {0}")]
    Io(#[from] std::io::Error),
}

//! # Handler Errors
//!
//! Construction-time faults. Once built, a handler never fails a request.

use thiserror::Error;

/// Result type for handler construction
pub type HandlerResult<T> = Result<T, HandlerError>;

#[derive(Debug, Error)]
pub enum HandlerError {
    #[error("undefined GraphQL schema")]
    MissingSchema,

    #[error("Cannot resolve upload directory: {0}")]
    UploadDir(#[source] std::io::Error),
}

//! # Resolution Errors
//!
//! Every reason a request can fail to yield options. The lenient resolver maps
//! all of them to empty options; callers that want to see the reason use
//! [`OptionResolver::resolve`](super::OptionResolver::resolve) directly.

use thiserror::Error;

/// Result type for option resolution
pub type ResolveResult<T> = Result<T, ResolveError>;

/// Result type for upload materialization
pub type UploadResult<T> = Result<T, UploadError>;

/// Why a request produced no options
#[derive(Debug, Error)]
pub enum ResolveError {
    /// Body could not be read (I/O failure or over the size cap)
    #[error("Failed to read request body: {0}")]
    BodyRead(String),

    /// `application/x-www-form-urlencoded` body did not parse
    #[error("Malformed form body: {0}")]
    FormParse(String),

    /// `multipart/form-data` body did not parse
    #[error("Malformed multipart body: {0}")]
    MultipartParse(String),

    /// Form or multipart body carried no `query` field
    #[error("No query in request")]
    MissingQuery,

    /// `variables.input.fieldName` absent or not a string
    #[error("Upload variables lack input.fieldName")]
    MissingUploadField,

    /// `fieldName` names a part that is not an uploaded file
    #[error("Upload part not found: {0}")]
    UploadPartMissing(String),

    /// Saving the upload failed
    #[error(transparent)]
    Upload(#[from] UploadError),
}

impl ResolveError {
    /// Short event code used in log lines
    pub fn code(&self) -> &'static str {
        match self {
            ResolveError::BodyRead(_) => "BODY_READ_FAILED",
            ResolveError::FormParse(_) => "FORM_PARSE_FAILED",
            ResolveError::MultipartParse(_) => "MULTIPART_PARSE_FAILED",
            ResolveError::MissingQuery => "QUERY_MISSING",
            ResolveError::MissingUploadField => "UPLOAD_FIELD_MISSING",
            ResolveError::UploadPartMissing(_) => "UPLOAD_PART_MISSING",
            ResolveError::Upload(_) => "UPLOAD_FAILED",
        }
    }
}

/// Upload storage errors
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("Failed to create upload directory {path}: {source}")]
    CreateDir {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to write upload {path}: {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to spool multipart part: {0}")]
    Spool(#[source] std::io::Error),

    #[error("Failed to sweep upload directory: {0}")]
    Sweep(#[source] std::io::Error),

    /// The blocking upload task panicked or was cancelled
    #[error("Upload task failed: {0}")]
    Task(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes() {
        assert_eq!(ResolveError::MissingQuery.code(), "QUERY_MISSING");
        assert_eq!(
            ResolveError::UploadPartMissing("file".into()).code(),
            "UPLOAD_PART_MISSING"
        );
        let err: ResolveError =
            UploadError::Spool(std::io::Error::new(std::io::ErrorKind::Other, "disk")).into();
        assert_eq!(err.code(), "UPLOAD_FAILED");
    }

    #[test]
    fn test_upload_error_message_names_path() {
        let err = UploadError::Write {
            path: "/tmp/x".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert!(err.to_string().contains("/tmp/x"));
    }
}

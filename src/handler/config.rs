//! Handler Configuration
//!
//! Fixed at construction; read-only while serving.

use std::path::PathBuf;
use std::sync::Arc;

use crate::options::{UploadRetention, DEFAULT_MAX_BODY_BYTES, DEFAULT_UPLOAD_DIR};

/// Construction-time handler settings
#[derive(Debug)]
pub struct HandlerConfig<S> {
    /// Engine schema. Required: a handler without one refuses to build.
    pub schema: Option<Arc<S>>,

    /// Tab-indent JSON responses (default: true)
    pub pretty: bool,

    /// Serve GraphiQL to browsers (default: true)
    pub graphiql: bool,

    /// Where uploads are materialized (default: "tmp" under the working dir)
    pub upload_dir: PathBuf,

    /// How long uploads are kept (default: forever)
    pub upload_retention: UploadRetention,

    /// Cap on buffered request bodies (default: 10 MiB)
    pub max_body_bytes: usize,
}

impl<S> HandlerConfig<S> {
    /// Defaults with no schema
    pub fn new() -> Self {
        Self {
            schema: None,
            pretty: true,
            graphiql: true,
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            upload_retention: UploadRetention::KeepForever,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    /// Defaults with `schema`
    pub fn with_schema(schema: S) -> Self {
        Self::with_shared_schema(Arc::new(schema))
    }

    /// Defaults with a schema shared with other owners
    pub fn with_shared_schema(schema: Arc<S>) -> Self {
        Self {
            schema: Some(schema),
            ..Self::new()
        }
    }

    pub fn pretty(mut self, pretty: bool) -> Self {
        self.pretty = pretty;
        self
    }

    pub fn graphiql(mut self, graphiql: bool) -> Self {
        self.graphiql = graphiql;
        self
    }

    pub fn upload_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.upload_dir = dir.into();
        self
    }

    pub fn upload_retention(mut self, retention: UploadRetention) -> Self {
        self.upload_retention = retention;
        self
    }

    pub fn max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }
}

impl<S> Default for HandlerConfig<S> {
    fn default() -> Self {
        Self::new()
    }
}

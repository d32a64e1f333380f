//! HTTP Server Configuration
//!
//! Host, port and CORS settings plus the handler options, loadable from a
//! JSON file. Every field has a default.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use super::errors::{ServerError, ServerResult};
use crate::handler::HandlerConfig;
use crate::options::{UploadRetention, DEFAULT_MAX_BODY_BYTES, DEFAULT_UPLOAD_DIR};

/// HTTP server configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Host to bind to (default: "0.0.0.0")
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind to (default: 8080)
    #[serde(default = "default_port")]
    pub port: u16,

    /// CORS allowed origins (default: none, meaning any origin)
    #[serde(default)]
    pub cors_origins: Vec<String>,

    /// Path the GraphQL endpoint is mounted on (default: "/graphql")
    #[serde(default = "default_graphql_path")]
    pub graphql_path: String,

    /// Tab-indent JSON responses (default: true)
    #[serde(default = "default_true")]
    pub pretty: bool,

    /// Serve GraphiQL to browsers (default: true)
    #[serde(default = "default_true")]
    pub graphiql: bool,

    /// Upload directory (default: "tmp")
    #[serde(default = "default_upload_dir")]
    pub upload_dir: PathBuf,

    /// Seconds to keep uploads; absent keeps them forever
    #[serde(default)]
    pub upload_retention_secs: Option<u64>,

    /// Cap on buffered request bodies (default: 10 MiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_graphql_path() -> String {
    "/graphql".to_string()
}

fn default_true() -> bool {
    true
}

fn default_upload_dir() -> PathBuf {
    PathBuf::from(DEFAULT_UPLOAD_DIR)
}

fn default_max_body_bytes() -> usize {
    DEFAULT_MAX_BODY_BYTES
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: Vec::new(),
            graphql_path: default_graphql_path(),
            pretty: true,
            graphiql: true,
            upload_dir: default_upload_dir(),
            upload_retention_secs: None,
            max_body_bytes: default_max_body_bytes(),
        }
    }
}

impl HttpServerConfig {
    /// Create a new config with specified port
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// Load configuration from a JSON file
    pub fn load(path: &Path) -> ServerResult<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ServerError::Config(format!("Failed to read {}: {}", path.display(), e))
        })?;

        let config: HttpServerConfig = serde_json::from_str(&content)
            .map_err(|e| ServerError::Config(format!("Invalid config JSON: {}", e)))?;

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> ServerResult<()> {
        if !self.graphql_path.starts_with('/') {
            return Err(ServerError::Config(format!(
                "graphql_path must start with '/': '{}'",
                self.graphql_path
            )));
        }

        if self.max_body_bytes == 0 {
            return Err(ServerError::Config("max_body_bytes must be > 0".into()));
        }

        Ok(())
    }

    /// Get the socket address string
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn upload_retention(&self) -> UploadRetention {
        UploadRetention::from_secs(self.upload_retention_secs)
    }

    /// Handler settings for `schema`
    pub fn handler_config<S>(&self, schema: S) -> HandlerConfig<S> {
        HandlerConfig::with_schema(schema)
            .pretty(self.pretty)
            .graphiql(self.graphiql)
            .upload_dir(self.upload_dir.clone())
            .upload_retention(self.upload_retention())
            .max_body_bytes(self.max_body_bytes)
    }
}

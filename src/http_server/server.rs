//! # HTTP Server
//!
//! Mounts the GraphQL handler and the health check behind CORS and request
//! tracing.

use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::config::HttpServerConfig;
use super::errors::{ServerError, ServerResult};
use super::observability_routes::health_routes;
use crate::engine::QueryEngine;
use crate::handler::GraphQLHandler;

/// HTTP server for one GraphQL handler
pub struct HttpServer<E: QueryEngine> {
    config: HttpServerConfig,
    handler: GraphQLHandler<E>,
    router: Router,
}

impl<E: QueryEngine> HttpServer<E> {
    /// Build a server for `engine` over `schema`
    pub fn with_config(config: HttpServerConfig, engine: E, schema: E::Schema) -> ServerResult<Self> {
        let handler = GraphQLHandler::new(config.handler_config(schema), engine)?;
        Ok(Self::with_handler(config, handler))
    }

    /// Build a server around an existing handler
    pub fn with_handler(config: HttpServerConfig, handler: GraphQLHandler<E>) -> Self {
        let router = Self::build_router(&config, &handler);
        Self {
            config,
            handler,
            router,
        }
    }

    fn build_router(config: &HttpServerConfig, handler: &GraphQLHandler<E>) -> Router {
        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        Router::new()
            .merge(health_routes())
            .merge(handler.router(&config.graphql_path))
            .layer(TraceLayer::new_for_http())
            .layer(cors)
    }

    /// Get the socket address
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    pub fn config(&self) -> &HttpServerConfig {
        &self.config
    }

    pub fn handler(&self) -> &GraphQLHandler<E> {
        &self.handler
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Bind and serve until the process exits
    pub async fn start(self) -> ServerResult<()> {
        let addr: SocketAddr = self
            .config
            .socket_addr()
            .parse()
            .map_err(|_| ServerError::Address(self.config.socket_addr()))?;

        let listener = TcpListener::bind(addr).await?;

        tracing::info!(
            event = "SERVER_LISTENING",
            addr = %addr,
            graphql_path = %self.config.graphql_path,
            upload_dir = %self.handler.resolver().uploads().dir().display(),
            retention = ?self.handler.resolver().uploads().retention()
        );

        axum::serve(listener, self.router).await?;

        Ok(())
    }
}

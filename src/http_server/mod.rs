//! # HTTP Server Module
//!
//! Standalone axum server around a [`GraphQLHandler`](crate::handler::GraphQLHandler).
//!
//! # Endpoints
//!
//! - `/health` - Health check
//! - `/graphql` (configurable) - GraphQL over HTTP, any method

pub mod config;
pub mod errors;
pub mod observability_routes;
pub mod server;

pub use config::HttpServerConfig;
pub use errors::{ServerError, ServerResult};
pub use server::HttpServer;

//! # GraphQL Request Handler
//!
//! Resolve options, execute once, then answer with GraphiQL or JSON.
//!
//! ```ignore
//! use graphql_http_handler::engine::{EchoEngine, EchoSchema};
//! use graphql_http_handler::handler::{GraphQLHandler, HandlerConfig};
//!
//! let config = HandlerConfig::with_schema(EchoSchema::new("demo"));
//! let handler = GraphQLHandler::new(config, EchoEngine)?;
//! let app = handler.router("/graphql");
//! ```

mod config;
mod errors;

pub use config::HandlerConfig;
pub use errors::{HandlerError, HandlerResult};

use std::sync::Arc;

use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Request, State};
use axum::response::Response;
use axum::routing::any;
use axum::Router;

use crate::engine::{ExecutionParams, QueryEngine, RequestContext};
use crate::options::{OptionResolver, UploadMaterializer};
use crate::response::{json_response, wants_console, ConsoleRenderer, GraphiQL};

struct Inner<E: QueryEngine> {
    schema: Arc<E::Schema>,
    engine: E,
    console: Box<dyn ConsoleRenderer<E::Schema>>,
    resolver: OptionResolver,
    pretty: bool,
    graphiql: bool,
}

/// Serves GraphQL over HTTP for one engine and schema
pub struct GraphQLHandler<E: QueryEngine> {
    inner: Arc<Inner<E>>,
}

impl<E: QueryEngine> Clone for GraphQLHandler<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: QueryEngine> GraphQLHandler<E> {
    /// Build a handler with the GraphiQL console
    pub fn new(config: HandlerConfig<E::Schema>, engine: E) -> HandlerResult<Self> {
        Self::with_console(config, engine, GraphiQL)
    }

    /// Build a handler with a custom console renderer
    pub fn with_console(
        config: HandlerConfig<E::Schema>,
        engine: E,
        console: impl ConsoleRenderer<E::Schema> + 'static,
    ) -> HandlerResult<Self> {
        let schema = config.schema.ok_or(HandlerError::MissingSchema)?;

        let uploads = UploadMaterializer::new(config.upload_dir)
            .map_err(HandlerError::UploadDir)?
            .with_retention(config.upload_retention);
        let resolver = OptionResolver::new(uploads).with_max_body_bytes(config.max_body_bytes);

        Ok(Self {
            inner: Arc::new(Inner {
                schema,
                engine,
                console: Box::new(console),
                resolver,
                pretty: config.pretty,
                graphiql: config.graphiql,
            }),
        })
    }

    pub fn schema(&self) -> &Arc<E::Schema> {
        &self.inner.schema
    }

    pub fn resolver(&self) -> &OptionResolver {
        &self.inner.resolver
    }

    /// Handle a request, deriving the engine context from it
    pub async fn serve(&self, request: Request<Body>) -> Response {
        let ctx = RequestContext::from_request(&request);
        self.serve_with_context(ctx, request).await
    }

    /// Handle a request with a caller-supplied engine context
    pub async fn serve_with_context(&self, ctx: RequestContext, request: Request<Body>) -> Response {
        let inner = &self.inner;
        let render_console = inner.graphiql && wants_console(request.headers(), request.uri());

        let options = inner.resolver.resolve_lenient(request).await;
        let params = ExecutionParams::new(Arc::clone(&inner.schema), options, ctx);

        tracing::debug!(
            event = "EXECUTE",
            request_id = %params.context.request_id,
            operation = %params.operation_name
        );
        let result = inner.engine.execute(params.clone());
        if result.has_errors() {
            tracing::debug!(
                event = "EXECUTE_ERRORS",
                request_id = %params.context.request_id,
                count = result.errors.len(),
                elapsed_ms = params.context.elapsed_ms() as u64
            );
        }

        if render_console {
            return inner.console.render(&params, &result);
        }

        json_response(&result, inner.pretty)
    }

    /// Router serving this handler at `path` for every method
    pub fn router(&self, path: &str) -> Router {
        Router::new()
            .route(path, any(graphql_endpoint::<E>))
            // Multipart extraction enforces its own 2 MiB default otherwise
            .layer(DefaultBodyLimit::max(self.inner.resolver.max_body_bytes()))
            .with_state(self.clone())
    }
}

async fn graphql_endpoint<E: QueryEngine>(
    State(handler): State<GraphQLHandler<E>>,
    request: Request,
) -> Response {
    handler.serve(request).await
}

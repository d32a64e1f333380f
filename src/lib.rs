//! graphql-http-handler - GraphQL over HTTP for a pluggable query engine
//!
//! Resolves `{query, variables, operationName}` from query strings, JSON,
//! form and multipart bodies (saving one uploaded file), runs the engine
//! once and answers with JSON or the GraphiQL console.

pub mod cli;
pub mod engine;
pub mod handler;
pub mod http_server;
pub mod observability;
pub mod options;
pub mod response;

//! # Responses
//!
//! JSON output for API clients, or the GraphiQL console for browsers.

pub mod console;
pub mod graphiql;
pub mod writer;

pub use console::{wants_console, ConsoleRenderer, RAW_PARAM};
pub use graphiql::GraphiQL;
pub use writer::{json_response, to_json_bytes, JSON_CONTENT_TYPE};

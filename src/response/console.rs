//! Console negotiation: JSON or the in-browser console

use axum::http::{header, HeaderMap, Uri};
use axum::response::Response;

use crate::engine::{ExecutionParams, ExecutionResult};
use crate::options::FormFields;

/// URL parameter that forces JSON
pub const RAW_PARAM: &str = "raw";

/// Renders an interactive console pre-filled from the resolved request
pub trait ConsoleRenderer<S>: Send + Sync {
    fn render(&self, params: &ExecutionParams<S>, result: &ExecutionResult) -> Response;
}

/// Whether a request prefers the console over JSON.
///
/// True only when `raw` is absent from the URL and the first `Accept` value
/// asks for `text/html` without asking for `application/json`.
pub fn wants_console(headers: &HeaderMap, uri: &Uri) -> bool {
    if FormFields::from_uri(uri).contains(RAW_PARAM) {
        return false;
    }

    let accept = headers
        .get(header::ACCEPT)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();

    !accept.contains("application/json") && accept.contains("text/html")
}

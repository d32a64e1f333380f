//! JSON response writer.
//!
//! Always 200: query-level failures travel inside the `errors` array.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";

/// Serialize `value`, tab-indented when `pretty`
pub fn to_json_bytes<T: Serialize + ?Sized>(value: &T, pretty: bool) -> serde_json::Result<Vec<u8>> {
    if !pretty {
        return serde_json::to_vec(value);
    }

    let mut buffer = Vec::with_capacity(256);
    let mut serializer = Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(b"\t"));
    value.serialize(&mut serializer)?;
    Ok(buffer)
}

/// Build the 200 JSON response. A value that fails to serialize yields an
/// empty body.
pub fn json_response<T: Serialize + ?Sized>(value: &T, pretty: bool) -> Response {
    let body = match to_json_bytes(value, pretty) {
        Ok(body) => body,
        Err(e) => {
            tracing::error!(event = "RESPONSE_SERIALIZE_FAILED", error = %e);
            Vec::new()
        }
    };

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, HeaderValue::from_static(JSON_CONTENT_TYPE))],
        body,
    )
        .into_response()
}

//! JSON body decoding with the string-variables fallback

use serde::Deserialize;
use serde_json::{Map, Value};

use super::{CompatibilityOptions, RequestOptions};

const FIELDS: [&str; 3] = ["query", "variables", "operationName"];

/// Decode a JSON request body.
///
/// Field names match case-insensitively, an exact match taking precedence.
/// Tries the canonical shape first, then the legacy shape where `variables`
/// is a JSON string, and finally picks out whichever fields have usable
/// types. Never fails; a body that is not a JSON object yields empty options.
pub fn options_from_json(body: &[u8]) -> RequestOptions {
    let value = match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(object)) => Value::Object(canonical_keys(object)),
        _ => return RequestOptions::default(),
    };

    if let Ok(options) = RequestOptions::deserialize(&value) {
        return options;
    }

    if let Ok(compat) = CompatibilityOptions::deserialize(&value) {
        return RequestOptions {
            query: compat.query,
            variables: decode_variables_string(&compat.variables),
            operation_name: compat.operation_name,
        };
    }

    partial_options(&value)
}

/// Rename `Query`, `OPERATIONNAME` and the like to the wire names
fn canonical_keys(mut object: Map<String, Value>) -> Map<String, Value> {
    for field in FIELDS {
        if object.contains_key(field) {
            continue;
        }

        let alias = object
            .keys()
            .find(|key| key.eq_ignore_ascii_case(field))
            .cloned();
        if let Some(value) = alias.and_then(|alias| object.remove(&alias)) {
            object.insert(field.to_string(), value);
        }
    }
    object
}

fn decode_variables_string(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

fn partial_options(object: &Value) -> RequestOptions {
    let string_field = |key: &str| {
        object
            .get(key)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string()
    };

    let variables = match object.get("variables") {
        Some(Value::Object(map)) => Some(map.clone()),
        Some(Value::String(text)) => decode_variables_string(text),
        _ => None,
    };

    RequestOptions {
        query: string_field("query"),
        variables,
        operation_name: string_field("operationName"),
    }
}

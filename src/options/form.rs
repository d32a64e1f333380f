//! Form-style option extraction, shared by the URL query string,
//! urlencoded bodies and multipart text fields.

use axum::http::Uri;
use serde_json::{Map, Value};

use super::RequestOptions;

/// Ordered key/value pairs; lookups return the first value for a key
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    pairs: Vec<(String, String)>,
}

impl FormFields {
    /// Parse a URL query string. Malformed escapes are decoded leniently.
    pub fn from_uri(uri: &Uri) -> Self {
        uri.query()
            .map(|query| Self::parse_lenient(query.as_bytes()))
            .unwrap_or_default()
    }

    /// Parse an urlencoded body, rejecting malformed percent escapes
    pub fn parse_body(body: &[u8]) -> Result<Self, String> {
        if let Some(offset) = invalid_escape(body) {
            return Err(format!("invalid percent escape at byte {}", offset));
        }
        Ok(Self::parse_lenient(body))
    }

    fn parse_lenient(input: &[u8]) -> Self {
        Self {
            pairs: url::form_urlencoded::parse(input).into_owned().collect(),
        }
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// First value for `key`, or `""`
    pub fn get_or_empty(&self, key: &str) -> &str {
        self.get(key).unwrap_or("")
    }

    /// Whether `key` appears at all, even with an empty value
    pub fn contains(&self, key: &str) -> bool {
        self.pairs.iter().any(|(k, _)| k == key)
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.pairs.push((key.into(), value.into()));
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}

impl FromIterator<(String, String)> for FormFields {
    fn from_iter<I: IntoIterator<Item = (String, String)>>(iter: I) -> Self {
        Self {
            pairs: iter.into_iter().collect(),
        }
    }
}

/// Build options from form fields. `None` unless `query` is non-empty.
pub fn options_from_form(fields: &FormFields) -> Option<RequestOptions> {
    let query = fields.get_or_empty("query");
    if query.is_empty() {
        return None;
    }

    Some(RequestOptions {
        query: query.to_string(),
        variables: Some(parse_variables(fields.get_or_empty("variables"))),
        operation_name: fields.get_or_empty("operationName").to_string(),
    })
}

/// Decode a JSON-encoded variables object. Anything that is not a JSON
/// object decodes to an empty map.
pub fn parse_variables(text: &str) -> Map<String, Value> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => map,
        _ => Map::new(),
    }
}

fn invalid_escape(input: &[u8]) -> Option<usize> {
    let mut i = 0;
    while i < input.len() {
        if input[i] == b'%' {
            let valid = input.len() > i + 2
                && input[i + 1].is_ascii_hexdigit()
                && input[i + 2].is_ascii_hexdigit();
            if !valid {
                return Some(i);
            }
            i += 3;
        } else {
            i += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_value_wins() {
        let fields = FormFields::parse_body(b"query=a&query=b").unwrap();
        assert_eq!(fields.get("query"), Some("a"));
        assert_eq!(fields.len(), 2);
    }

    #[test]
    fn test_presence_without_value() {
        let uri: Uri = "/graphql?raw".parse().unwrap();
        let fields = FormFields::from_uri(&uri);
        assert!(fields.contains("raw"));
        assert_eq!(fields.get("raw"), Some(""));
    }

    #[test]
    fn test_no_query_string() {
        let uri: Uri = "/graphql".parse().unwrap();
        assert!(FormFields::from_uri(&uri).is_empty());
    }

    #[test]
    fn test_options_need_query() {
        let fields = FormFields::parse_body(b"operationName=Op").unwrap();
        assert_eq!(options_from_form(&fields), None);

        let fields = FormFields::parse_body(b"query=").unwrap();
        assert_eq!(options_from_form(&fields), None);
    }

    #[test]
    fn test_options_from_fields() {
        let fields = FormFields::parse_body(
            b"query=%7Bping%7D&operationName=Test&variables=%7B%22a%22%3A1%7D",
        )
        .unwrap();
        let options = options_from_form(&fields).unwrap();

        assert_eq!(options.query, "{ping}");
        assert_eq!(options.operation_name, "Test");
        assert_eq!(options.variables.unwrap()["a"], json!(1));
    }

    #[test]
    fn test_bad_variables_are_empty() {
        assert!(parse_variables("").is_empty());
        assert!(parse_variables("{not json").is_empty());
        assert!(parse_variables("[1,2]").is_empty());
        assert!(parse_variables("null").is_empty());
        assert_eq!(parse_variables(r#"{"x":"y"}"#)["x"], json!("y"));
    }

    #[test]
    fn test_malformed_escape_rejected() {
        assert!(FormFields::parse_body(b"query=%zz").is_err());
        assert!(FormFields::parse_body(b"query=abc%").is_err());
        assert!(FormFields::parse_body(b"query=%4").is_err());
        assert!(FormFields::parse_body(b"query=%41").is_ok());
    }

    #[test]
    fn test_plus_decodes_to_space() {
        let fields = FormFields::parse_body(b"query=%7B+ping+%7D").unwrap();
        assert_eq!(fields.get("query"), Some("{ ping }"));
    }
}

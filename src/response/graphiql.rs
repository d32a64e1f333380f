//! Default console: a GraphiQL page loaded from a CDN and pre-filled with the
//! resolved query, variables, operation name and result.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde_json::Value;

use super::console::ConsoleRenderer;
use crate::engine::{ExecutionParams, ExecutionResult};

pub const GRAPHIQL_VERSION: &str = "3.0.6";
pub const REACT_VERSION: &str = "18.2.0";

const HTML_CONTENT_TYPE: &str = "text/html; charset=utf-8";

const TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8" />
  <title>GraphiQL</title>
  <meta name="robots" content="noindex" />
  <meta name="referrer" content="origin" />
  <style>
    body { height: 100%; margin: 0; width: 100%; overflow: hidden; }
    #graphiql { height: 100vh; }
  </style>
  <link rel="stylesheet" href="https://unpkg.com/graphiql@%%GRAPHIQL_VERSION%%/graphiql.min.css" />
  <script crossorigin src="https://unpkg.com/react@%%REACT_VERSION%%/umd/react.production.min.js"></script>
  <script crossorigin src="https://unpkg.com/react-dom@%%REACT_VERSION%%/umd/react-dom.production.min.js"></script>
  <script crossorigin src="https://unpkg.com/graphiql@%%GRAPHIQL_VERSION%%/graphiql.min.js"></script>
</head>
<body>
  <div id="graphiql">Loading...</div>
  <script>
    var initial = {
      query: %%QUERY%%,
      variables: %%VARIABLES%%,
      operationName: %%OPERATION_NAME%%,
      response: %%RESULT%%
    };

    var parameters = {};
    if (initial.query) parameters.query = initial.query;
    if (initial.variables) parameters.variables = initial.variables;
    if (initial.operationName) parameters.operationName = initial.operationName;

    function updateURL() {
      var search = Object.keys(parameters).filter(function (key) {
        return Boolean(parameters[key]);
      }).map(function (key) {
        return encodeURIComponent(key) + '=' + encodeURIComponent(parameters[key]);
      }).join('&');
      history.replaceState(null, null, '?' + search);
    }

    var fetcher = GraphiQL.createFetcher({
      url: window.location.pathname,
      headers: { 'Accept': 'application/json' }
    });

    var root = ReactDOM.createRoot(document.getElementById('graphiql'));
    root.render(React.createElement(GraphiQL, {
      fetcher: fetcher,
      query: initial.query || undefined,
      variables: initial.variables || undefined,
      operationName: initial.operationName || undefined,
      response: initial.response || undefined,
      onEditQuery: function (query) { parameters.query = query; updateURL(); },
      onEditVariables: function (variables) { parameters.variables = variables; updateURL(); },
      onEditOperationName: function (name) { parameters.operationName = name; updateURL(); }
    }));
  </script>
</body>
</html>
"#;

/// Renders the GraphiQL console
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphiQL;

impl GraphiQL {
    /// Produce the page for already-resolved parameters
    pub fn render_page<S>(params: &ExecutionParams<S>, result: &ExecutionResult) -> String {
        let variables = params
            .variable_values
            .as_ref()
            .map(|vars| pretty(&Value::Object(vars.clone())))
            .unwrap_or_default();

        let result = if params.request_string.is_empty() {
            String::new()
        } else {
            serde_json::to_value(result)
                .map(|value| pretty(&value))
                .unwrap_or_default()
        };

        fill(
            TEMPLATE,
            &[
                ("GRAPHIQL_VERSION", GRAPHIQL_VERSION),
                ("REACT_VERSION", REACT_VERSION),
                ("QUERY", &script_string(&params.request_string)),
                ("VARIABLES", &script_string(&variables)),
                ("OPERATION_NAME", &script_string(&params.operation_name)),
                ("RESULT", &script_string(&result)),
            ],
        )
    }
}

impl<S> ConsoleRenderer<S> for GraphiQL {
    fn render(&self, params: &ExecutionParams<S>, result: &ExecutionResult) -> Response {
        (
            StatusCode::OK,
            [(header::CONTENT_TYPE, HeaderValue::from_static(HTML_CONTENT_TYPE))],
            Self::render_page(params, result),
        )
            .into_response()
    }
}

/// Substitute `%%KEY%%` placeholders in one pass, so substituted text is
/// never rescanned.
fn fill(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(template.len() + 512);
    let mut rest = template;

    while let Some(start) = rest.find("%%") {
        out.push_str(&rest[..start]);
        let after = &rest[start + 2..];
        let substitution = after.find("%%").and_then(|end| {
            values
                .iter()
                .find(|(key, _)| *key == &after[..end])
                .map(|(_, value)| (*value, end))
        });

        match substitution {
            Some((value, end)) => {
                out.push_str(value);
                rest = &after[end + 2..];
            }
            None => {
                out.push_str("%%");
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

/// A JS string literal that cannot close the surrounding `<script>`
fn script_string(s: &str) -> String {
    serde_json::to_string(s)
        .unwrap_or_else(|_| "\"\"".to_string())
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

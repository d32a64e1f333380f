//! # Request Options
//!
//! Turns an inbound HTTP request into the `{query, variables, operationName}`
//! triple a query engine expects.
//!
//! Resolution order (first match wins):
//!
//! 1. `query` in the URL query string, any method
//! 2. anything other than POST resolves to empty options
//! 3. dispatch on `Content-Type`:
//!    - `application/graphql` - the raw body is the query
//!    - `application/x-www-form-urlencoded` - same fields as the query string
//!    - `multipart/form-data` - form fields plus one uploaded file
//!    - `application/json` or anything else - JSON body, with a fallback for
//!      clients that send `variables` as a JSON string
//!
//! Nothing here rejects a request. [`OptionResolver::resolve`] reports why a
//! request yielded nothing; [`OptionResolver::resolve_lenient`] turns every
//! such reason into empty options.

mod errors;
mod form;
mod json;
mod multipart;
mod resolver;
mod upload;

pub use errors::{ResolveError, ResolveResult, UploadError, UploadResult};
pub use form::{options_from_form, parse_variables, FormFields};
pub use json::options_from_json;
pub use multipart::{options_from_multipart_form, MultipartForm, SpooledPart};
pub use resolver::{ContentKind, OptionResolver, DEFAULT_MAX_BODY_BYTES, MULTIPART_MEMORY_THRESHOLD};
pub use upload::{UploadMaterializer, UploadRetention, DEFAULT_UPLOAD_DIR};

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Query, variables and operation name extracted from one request
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestOptions {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub query: String,

    /// `None` when the request carried no variables object at all
    #[serde(default)]
    pub variables: Option<Map<String, Value>>,

    #[serde(
        default,
        rename = "operationName",
        deserialize_with = "null_as_empty"
    )]
    pub operation_name: String,
}

impl RequestOptions {
    /// Options carrying only a query
    pub fn with_query(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    /// True when nothing could be extracted
    pub fn is_empty(&self) -> bool {
        self.query.is_empty() && self.variables.is_none() && self.operation_name.is_empty()
    }
}

/// Legacy request shape: `variables` double-encoded as a JSON string
#[derive(Debug, Clone, Default, Deserialize)]
pub(crate) struct CompatibilityOptions {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub query: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub variables: String,

    #[serde(
        default,
        rename = "operationName",
        deserialize_with = "null_as_empty"
    )]
    pub operation_name: String,
}

/// Clients routinely send `"operationName": null`; treat it as absent.
fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

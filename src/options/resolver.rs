//! Option resolution entrypoint and content-type dispatch

use axum::body::{self, Body};
use axum::extract::{FromRequest, Multipart};
use axum::http::{header, HeaderMap, Method, Request};

use super::errors::{ResolveError, ResolveResult};
use super::form::{options_from_form, FormFields};
use super::json::options_from_json;
use super::multipart::options_from_multipart;
use super::upload::UploadMaterializer;
use super::RequestOptions;

/// File parts above this many bytes are spooled to disk
pub const MULTIPART_MEMORY_THRESHOLD: usize = 4096;

/// Cap on buffered request bodies (10 MiB)
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 << 20;

const CONTENT_TYPE_GRAPHQL: &str = "application/graphql";
const CONTENT_TYPE_FORM: &str = "application/x-www-form-urlencoded";
const CONTENT_TYPE_MULTIPART: &str = "multipart/form-data";

/// Body encodings the resolver distinguishes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    GraphQL,
    FormUrlEncoded,
    Multipart,
    /// `application/json` and every unrecognized or missing type
    Json,
}

impl ContentKind {
    /// Classify by the media type before the first `;`
    pub fn from_content_type(content_type: &str) -> Self {
        let media_type = content_type.split(';').next().unwrap_or_default().trim();

        if media_type.eq_ignore_ascii_case(CONTENT_TYPE_GRAPHQL) {
            ContentKind::GraphQL
        } else if media_type.eq_ignore_ascii_case(CONTENT_TYPE_FORM) {
            ContentKind::FormUrlEncoded
        } else if media_type.eq_ignore_ascii_case(CONTENT_TYPE_MULTIPART) {
            ContentKind::Multipart
        } else {
            ContentKind::Json
        }
    }

    pub fn from_headers(headers: &HeaderMap) -> Self {
        let content_type = headers
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .unwrap_or_default();
        Self::from_content_type(content_type)
    }
}

/// Extracts [`RequestOptions`] from HTTP requests
#[derive(Debug, Clone)]
pub struct OptionResolver {
    uploads: UploadMaterializer,
    max_body_bytes: usize,
}

impl OptionResolver {
    pub fn new(uploads: UploadMaterializer) -> Self {
        Self {
            uploads,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn uploads(&self) -> &UploadMaterializer {
        &self.uploads
    }

    pub fn max_body_bytes(&self) -> usize {
        self.max_body_bytes
    }

    /// Resolve options, reporting why a request yielded nothing.
    ///
    /// Requests that simply carry no query (a plain GET, say) resolve to
    /// empty options rather than an error.
    pub async fn resolve(&self, request: Request<Body>) -> ResolveResult<RequestOptions> {
        if let Some(options) = options_from_form(&FormFields::from_uri(request.uri())) {
            return Ok(options);
        }

        if request.method() != Method::POST {
            return Ok(RequestOptions::default());
        }

        match ContentKind::from_headers(request.headers()) {
            ContentKind::GraphQL => {
                let body = self.read_body(request).await?;
                Ok(RequestOptions::with_query(String::from_utf8_lossy(&body)))
            }
            ContentKind::FormUrlEncoded => {
                let body = self.read_body(request).await?;
                let fields = FormFields::parse_body(&body).map_err(ResolveError::FormParse)?;
                options_from_form(&fields).ok_or(ResolveError::MissingQuery)
            }
            ContentKind::Multipart => {
                let multipart = Multipart::from_request(request, &())
                    .await
                    .map_err(|e| ResolveError::MultipartParse(e.to_string()))?;
                options_from_multipart(multipart, &self.uploads).await
            }
            ContentKind::Json => {
                let body = self.read_body(request).await?;
                Ok(options_from_json(&body))
            }
        }
    }

    /// Resolve options, falling back to empty options on any failure
    pub async fn resolve_lenient(&self, request: Request<Body>) -> RequestOptions {
        match self.resolve(request).await {
            Ok(options) => options,
            Err(ResolveError::MissingQuery) => {
                tracing::debug!(event = "QUERY_MISSING");
                RequestOptions::default()
            }
            Err(e) => {
                tracing::warn!(event = e.code(), error = %e, "falling back to empty request options");
                RequestOptions::default()
            }
        }
    }

    async fn read_body(&self, request: Request<Body>) -> ResolveResult<body::Bytes> {
        body::to_bytes(request.into_body(), self.max_body_bytes)
            .await
            .map_err(|e| ResolveError::BodyRead(e.to_string()))
    }
}

//! End-to-End HTTP Tests
//!
//! Requests go through the axum router exactly as a server would route them:
//! - every response is 200 with the engine's `{data, errors}`
//! - browsers get GraphiQL unless `raw` is present
//! - the engine sees the request context

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use graphql_http_handler::engine::{EchoEngine, EchoSchema, RequestContext};
use graphql_http_handler::handler::{GraphQLHandler, HandlerConfig};
use graphql_http_handler::http_server::{HttpServer, HttpServerConfig};
use graphql_http_handler::response::JSON_CONTENT_TYPE;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;
use uuid::Uuid;

// =============================================================================
// Test Utilities
// =============================================================================

fn handler(temp_dir: &TempDir, pretty: bool) -> GraphQLHandler<EchoEngine> {
    let config = HandlerConfig::with_schema(EchoSchema::new("test"))
        .pretty(pretty)
        .upload_dir(temp_dir.path());
    GraphQLHandler::new(config, EchoEngine).unwrap()
}

fn app(temp_dir: &TempDir) -> Router {
    handler(temp_dir, true).router("/graphql")
}

async fn body_string(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

async fn body_json(response: Response) -> Value {
    serde_json::from_str(&body_string(response).await).unwrap()
}

fn content_type(response: &Response) -> &str {
    response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
}

fn json_post(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn browser_get(uri: &str) -> Request<Body> {
    Request::builder()
        .uri(uri)
        .header(
            header::ACCEPT,
            "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8",
        )
        .body(Body::empty())
        .unwrap()
}

// =============================================================================
// JSON responses
// =============================================================================

#[tokio::test]
async fn test_json_post_executes() {
    let temp_dir = TempDir::new().unwrap();
    let response = app(&temp_dir)
        .oneshot(json_post(json!({
            "query": "query Q { ping }",
            "variables": {"a": 1},
            "operationName": "Q"
        })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(content_type(&response), JSON_CONTENT_TYPE);

    let body = body_json(response).await;
    let echo = &body["data"]["echo"];
    assert_eq!(echo["schema"], json!("test"));
    assert_eq!(echo["query"], json!("query Q { ping }"));
    assert_eq!(echo["variables"], json!({"a": 1}));
    assert_eq!(echo["operationName"], json!("Q"));
    assert!(body.get("errors").is_none());
}

#[tokio::test]
async fn test_pretty_output_uses_tabs() {
    let temp_dir = TempDir::new().unwrap();

    let pretty = handler(&temp_dir, true)
        .router("/graphql")
        .oneshot(json_post(json!({"query": "{ ping }"})))
        .await
        .unwrap();
    assert!(body_string(pretty).await.contains("\n\t\"data\""));

    let compact = handler(&temp_dir, false)
        .router("/graphql")
        .oneshot(json_post(json!({"query": "{ ping }"})))
        .await
        .unwrap();
    assert!(!body_string(compact).await.contains('\n'));
}

#[tokio::test]
async fn test_engine_errors_still_return_ok() {
    let temp_dir = TempDir::new().unwrap();
    let response = app(&temp_dir)
        .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"], Value::Null);
    assert_eq!(body["errors"][0]["message"], json!("Must provide an operation."));
}

#[tokio::test]
async fn test_malformed_body_reaches_engine_as_empty() {
    let temp_dir = TempDir::new().unwrap();
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ definitely not json"))
        .unwrap();

    let response = app(&temp_dir).oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["message"], json!("Must provide an operation."));
}

// =============================================================================
// Console negotiation
// =============================================================================

#[tokio::test]
async fn test_browser_gets_graphiql() {
    let temp_dir = TempDir::new().unwrap();
    let response = app(&temp_dir)
        .oneshot(browser_get("/graphql?query=%7Bping%7D"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(content_type(&response).starts_with("text/html"));

    let page = body_string(response).await;
    assert!(page.contains("<title>GraphiQL</title>"));
    assert!(page.contains("{ping}"));
}

#[tokio::test]
async fn test_raw_forces_json() {
    let temp_dir = TempDir::new().unwrap();
    let response = app(&temp_dir)
        .oneshot(browser_get("/graphql?query=%7Bping%7D&raw"))
        .await
        .unwrap();

    assert_eq!(content_type(&response), JSON_CONTENT_TYPE);
    let body = body_json(response).await;
    assert_eq!(body["data"]["echo"]["query"], json!("{ping}"));
}

#[tokio::test]
async fn test_json_accept_gets_json() {
    let temp_dir = TempDir::new().unwrap();
    let request = Request::builder()
        .uri("/graphql?query=%7Bping%7D")
        .header(header::ACCEPT, "application/json, text/html")
        .body(Body::empty())
        .unwrap();

    let response = app(&temp_dir).oneshot(request).await.unwrap();
    assert_eq!(content_type(&response), JSON_CONTENT_TYPE);
}

#[tokio::test]
async fn test_console_disabled_serves_json() {
    let temp_dir = TempDir::new().unwrap();
    let config = HandlerConfig::with_schema(EchoSchema::new("test"))
        .graphiql(false)
        .upload_dir(temp_dir.path());
    let app = GraphQLHandler::new(config, EchoEngine)
        .unwrap()
        .router("/graphql");

    let response = app
        .oneshot(browser_get("/graphql?query=%7Bping%7D"))
        .await
        .unwrap();
    assert_eq!(content_type(&response), JSON_CONTENT_TYPE);
}

// =============================================================================
// Request context
// =============================================================================

#[tokio::test]
async fn test_request_id_header_reaches_engine() {
    let temp_dir = TempDir::new().unwrap();
    let request_id = Uuid::new_v4();
    let request = Request::builder()
        .uri("/graphql?query=%7Bping%7D")
        .header("x-request-id", request_id.to_string())
        .body(Body::empty())
        .unwrap();

    let response = app(&temp_dir).oneshot(request).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(
        body["data"]["echo"]["requestId"],
        json!(request_id.to_string())
    );
}

#[tokio::test]
async fn test_serve_with_context_uses_caller_context() {
    let temp_dir = TempDir::new().unwrap();
    let handler = handler(&temp_dir, false);

    let expired = RequestContext::new().with_timeout(Duration::ZERO);
    let request = Request::builder()
        .uri("/graphql?query=%7Bping%7D")
        .body(Body::empty())
        .unwrap();

    let response = handler.serve_with_context(expired, request).await;
    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["message"], json!("Deadline exceeded"));
}

// =============================================================================
// Server router
// =============================================================================

fn server_router(temp_dir: &TempDir, graphql_path: &str) -> Router {
    let config = HttpServerConfig {
        graphql_path: graphql_path.to_string(),
        upload_dir: temp_dir.path().to_path_buf(),
        ..Default::default()
    };
    HttpServer::with_config(config, EchoEngine, EchoSchema::new("served"))
        .unwrap()
        .router()
}

#[tokio::test]
async fn test_health_route() {
    let temp_dir = TempDir::new().unwrap();
    let response = server_router(&temp_dir, "/graphql")
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], json!("ok"));
    assert_eq!(body["version"], json!(env!("CARGO_PKG_VERSION")));
}

#[tokio::test]
async fn test_server_mounts_configured_path() {
    let temp_dir = TempDir::new().unwrap();
    let router = server_router(&temp_dir, "/api/graphql");

    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/api/graphql?query=%7Bping%7D")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["data"]["echo"]["schema"], json!("served"));

    let missing = router
        .oneshot(Request::builder().uri("/graphql").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::NOT_FOUND);
}

fn upload_request(payload: &[u8]) -> Request<Body> {
    let boundary = "SERVER-BOUNDARY";
    let variables = json!({"input": {"fieldName": "file"}}).to_string();

    let mut body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"query\"\r\n\r\nmutation {{ upload }}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"variables\"\r\n\r\n{v}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"x.bin\"\r\n\r\n",
        b = boundary,
        v = variables
    )
    .into_bytes();
    body.extend_from_slice(payload);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

async fn saved_upload(response: Response) -> Vec<u8> {
    let body = body_json(response).await;
    let buffer = body["data"]["echo"]["variables"]["input"]["buffer"]
        .as_str()
        .unwrap_or_else(|| panic!("no upload in response: {}", body));
    std::fs::read(buffer).unwrap()
}

#[tokio::test]
async fn test_server_accepts_uploads() {
    let temp_dir = TempDir::new().unwrap();
    let payload = vec![b'x'; 10_000];

    let response = server_router(&temp_dir, "/graphql")
        .oneshot(upload_request(&payload))
        .await
        .unwrap();

    assert_eq!(saved_upload(response).await, payload);
}

#[tokio::test]
async fn test_handler_router_accepts_uploads_past_two_mib() {
    let temp_dir = TempDir::new().unwrap();
    let payload: Vec<u8> = (0..3 * 1024 * 1024).map(|i| (i % 253) as u8).collect();

    let response = app(&temp_dir)
        .oneshot(upload_request(&payload))
        .await
        .unwrap();

    assert_eq!(saved_upload(response).await, payload);
}

#[tokio::test]
async fn test_handler_router_enforces_configured_limit() {
    let temp_dir = TempDir::new().unwrap();
    let config = HandlerConfig::with_schema(EchoSchema::new("test"))
        .upload_dir(temp_dir.path())
        .max_body_bytes(64 * 1024);
    let app = GraphQLHandler::new(config, EchoEngine)
        .unwrap()
        .router("/graphql");

    let response = app
        .oneshot(upload_request(&vec![b'x'; 128 * 1024]))
        .await
        .unwrap();

    let body = body_json(response).await;
    assert_eq!(body["errors"][0]["message"], json!("Must provide an operation."));
    assert_eq!(std::fs::read_dir(temp_dir.path()).unwrap().count(), 0);
}

//! Request decoding and request IDs.
//!
//! # Responsibilities
//! - Decode the transport request into the form the matcher and handlers see
//!   (method, path, query params, headers, parsed JSON body)
//! - Generate unique request IDs for correlation
//!
//! # Design Decisions
//! - The body is parsed once here; handlers and the matcher never touch raw
//!   bytes. A missing or non-JSON body decodes to an empty object
//! - Query parameter values decode as JSON strings so body and params share
//!   one field matcher

use axum::body::Body;
use axum::http::{HeaderValue, Request};
use serde::Serialize;
use serde_json::{json, Map, Value};
use tower_http::request_id::{MakeRequestId, RequestId};

/// Header carrying the per-request correlation id.
pub const X_REQUEST_ID: &str = "x-request-id";

/// A decoded inbound request, independent of the transport types.
#[derive(Debug, Clone, Serialize)]
pub struct GatewayRequest {
    pub method: String,
    pub path: String,
    /// Query parameters; values are JSON strings.
    pub params: Map<String, Value>,
    /// Request headers; values are JSON strings, names lowercased.
    pub headers: Map<String, Value>,
    /// Parsed JSON body; an empty object when absent or unparseable.
    pub body: Value,
}

impl GatewayRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            params: Map::new(),
            headers: Map::new(),
            body: json!({}),
        }
    }

    /// Decode an axum request. `max_body` bounds how much body is buffered.
    pub async fn decode(request: Request<Body>, max_body: usize) -> Self {
        let (parts, body) = request.into_parts();

        let mut params = Map::new();
        if let Some(query) = parts.uri.query() {
            for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
                params.insert(key.into_owned(), Value::String(value.into_owned()));
            }
        }

        let mut headers = Map::new();
        for (name, value) in &parts.headers {
            if let Ok(text) = value.to_str() {
                headers.insert(name.as_str().to_string(), Value::String(text.to_string()));
            }
        }

        let body = match axum::body::to_bytes(body, max_body).await {
            Ok(bytes) if !bytes.is_empty() => {
                serde_json::from_slice(&bytes).unwrap_or_else(|_| json!({}))
            }
            _ => json!({}),
        };

        Self {
            method: parts.method.to_string(),
            path: parts.uri.path().to_string(),
            params,
            headers,
            body,
        }
    }

    /// The correlation id set by the request-id middleware, if any.
    pub fn request_id(&self) -> &str {
        self.headers
            .get(X_REQUEST_ID)
            .and_then(Value::as_str)
            .unwrap_or("unknown")
    }
}

/// Request id source for the tower-http request-id middleware.
#[derive(Clone, Copy, Default)]
pub struct UuidRequestId;

impl MakeRequestId for UuidRequestId {
    fn make_request_id<B>(&mut self, _request: &Request<B>) -> Option<RequestId> {
        let id = uuid::Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

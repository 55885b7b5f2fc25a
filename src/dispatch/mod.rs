//! Request dispatch.
//!
//! # Data Flow
//! ```text
//! decoded request
//!     → rule set build (per request)
//!     → first-match scan
//!     → handler resolution (registry / cache / code store)
//!     → invocation with (request, writer, utils, vars)
//!     → response (handler-written, or a translated failure)
//! ```
//!
//! # Design Decisions
//! - No route is a normal outcome (404), not a fault
//! - Resolution and invocation failures log full detail and answer with a
//!   generic 500; internal error text never reaches the caller
//! - The dispatcher converts exactly what the handler wrote; it adds nothing
//!   to a written response

use std::time::Instant;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;

use crate::handlers::{HandlerResolver, Vars};
use crate::http::request::GatewayRequest;
use crate::http::response::ResponseWriter;
use crate::observability::metrics;
use crate::rules::{matcher, RuleStore};
use crate::utils::{mask_sensitive, PlatformUtils};

/// Per-process dispatch pipeline. Shared across all in-flight requests; the
/// only mutable state behind it is the handler cache.
pub struct Dispatcher {
    rules: RuleStore,
    resolver: HandlerResolver,
    utils: PlatformUtils,
}

impl Dispatcher {
    pub fn new(rules: RuleStore, resolver: HandlerResolver, utils: PlatformUtils) -> Self {
        Self {
            rules,
            resolver,
            utils,
        }
    }

    /// Run one request through the pipeline and produce its response.
    pub async fn dispatch(&self, req: GatewayRequest) -> Response {
        let start = Instant::now();
        let request_id = req.request_id().to_string();

        tracing::debug!(
            request_id = %request_id,
            method = %req.method,
            path = %req.path,
            body = %mask_sensitive(&req.body),
            "dispatching request"
        );

        let rule_set = self.rules.load().await;

        let Some(rule) = rule_set.iter().find(|rule| matcher::matches(&req, rule)) else {
            tracing::debug!(request_id = %request_id, path = %req.path, "no rule matched");
            metrics::record_dispatch(&req.method, 404, "none", start);
            return (StatusCode::NOT_FOUND, Json(json!({"error": "Not Found"}))).into_response();
        };

        tracing::debug!(request_id = %request_id, handler = %rule.handler, "rule matched");

        let handler = match self.resolver.resolve(&rule.handler).await {
            Ok(handler) => handler,
            Err(err) => {
                tracing::error!(
                    request_id = %request_id,
                    handler = %rule.handler,
                    error = %err,
                    "handler resolution failed"
                );
                metrics::record_dispatch(&req.method, 500, &rule.handler, start);
                return internal_error();
            }
        };

        let vars: &Vars = &rule.vars;
        let mut writer = ResponseWriter::new();

        match handler.handle(&req, &mut writer, &self.utils, vars).await {
            Ok(()) => {
                let response = writer.into_response();
                metrics::record_dispatch(
                    &req.method,
                    response.status().as_u16(),
                    &rule.handler,
                    start,
                );
                response
            }
            Err(err) => {
                tracing::error!(
                    request_id = %request_id,
                    handler = %rule.handler,
                    error = %err,
                    "handler invocation failed"
                );
                metrics::record_dispatch(&req.method, 500, &rule.handler, start);
                internal_error()
            }
        }
    }
}

fn internal_error() -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({"error": "Internal Server Error"})),
    )
        .into_response()
}

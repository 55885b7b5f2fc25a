//! Response writing for handlers.
//!
//! # Design Decisions
//! - Handlers own the response: the dispatcher converts whatever the writer
//!   holds and never replaces a handler-written status or body
//! - An untouched writer becomes an empty 200; the transport has to send
//!   something, but nothing the handler wrote is ever clobbered

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::Value;

/// The response-writing capability handed to every handler.
#[derive(Debug, Default)]
pub struct ResponseWriter {
    status: Option<u16>,
    headers: Vec<(String, String)>,
    body: Option<Value>,
}

impl ResponseWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the response status. Chainable, so handlers can write
    /// `res.status(400).send(...)`.
    pub fn status(&mut self, code: u16) -> &mut Self {
        self.status = Some(code);
        self
    }

    /// Add a response header.
    pub fn header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Set the JSON response body.
    pub fn send(&mut self, body: Value) {
        self.body = Some(body);
    }

    /// Whether the handler produced any part of a response.
    pub fn is_written(&self) -> bool {
        self.status.is_some() || self.body.is_some()
    }

    /// Convert into the transport response.
    pub fn into_response(self) -> Response {
        let status = self
            .status
            .and_then(|code| StatusCode::from_u16(code).ok())
            .unwrap_or(StatusCode::OK);

        let mut response = match self.body {
            Some(body) => (status, Json(body)).into_response(),
            None => status.into_response(),
        };

        for (name, value) in self.headers {
            if let (Ok(name), Ok(value)) = (
                name.parse::<HeaderName>(),
                HeaderValue::from_str(&value),
            ) {
                response.headers_mut().insert(name, value);
            }
        }

        response
    }
}

//! Request IDs and the access log
//!
//! `request_id_middleware` assigns every request an `X-Request-Id` and echoes
//! it back. [`AccessLog`] plugs into `TraceLayer`: one span per request
//! carrying the ID, and one line per response with the status, the latency
//! and, for error responses, the [`ErrorMessage`] recorded by the error
//! responder.

use std::time::Duration;

use axum::{
    body::Body,
    http::{HeaderValue, Request, Response},
    middleware::Next,
};
use tower_http::trace::{MakeSpan, OnResponse};
use tracing::{info, warn, Span};
use uuid::Uuid;

use crate::interfaces::http::error::ErrorMessage;

/// Header name for the request correlation ID.
pub const REQUEST_ID_HEADER: &str = "x-request-id";

/// Middleware that assigns (or propagates) `X-Request-Id`.
pub async fn request_id_middleware(
    mut request: Request<Body>,
    next: Next,
) -> axum::response::Response {
    let request_id = match request.headers().get(REQUEST_ID_HEADER) {
        Some(value) => value.clone(),
        None => {
            let generated = HeaderValue::from_str(&Uuid::new_v4().to_string())
                .unwrap_or_else(|_| HeaderValue::from_static("unknown"));
            request
                .headers_mut()
                .insert(REQUEST_ID_HEADER, generated.clone());
            generated
        }
    };

    let mut response = next.run(request).await;
    response.headers_mut().insert(REQUEST_ID_HEADER, request_id);
    response
}

/// Span and response hooks for `TraceLayer`
#[derive(Debug, Clone, Copy, Default)]
pub struct AccessLog;

impl<B> MakeSpan<B> for AccessLog {
    fn make_span(&mut self, request: &Request<B>) -> Span {
        let request_id = request
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("-");

        tracing::info_span!(
            "request",
            request_id = %request_id,
            method = %request.method(),
            uri = %request.uri(),
        )
    }
}

impl<B> OnResponse<B> for AccessLog {
    fn on_response(self, response: &Response<B>, latency: Duration, _span: &Span) {
        let status = response.status().as_u16();
        let latency_ms = latency.as_millis() as u64;

        match response.extensions().get::<ErrorMessage>() {
            Some(ErrorMessage(message)) => {
                warn!(status, latency_ms, message = %message, "request failed")
            }
            None => info!(status, latency_ms, "request completed"),
        }
    }
}

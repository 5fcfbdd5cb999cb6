//! Second stage: render an [`ApiError`] as the JSON error response

use std::any::Any;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error};
use utoipa::ToSchema;

use super::convert::{convert_error, Thrown};
use super::status::{reason_phrase, valid_status};
use super::ApiError;
use crate::config::AppConfig;

/// Error response body
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    pub code: u16,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<String>>,
    /// Only in development
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Message of an error response, recorded for the access log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorMessage(pub String);

/// Renders errors according to the running environment.
#[derive(Debug, Clone, Copy, Default)]
pub struct ErrorResponder {
    /// Include the stack in response bodies
    pub include_stack: bool,
    /// Render non-operational errors as a bare 500
    pub mask_non_operational: bool,
}

impl From<&AppConfig> for ErrorResponder {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            include_stack: cfg.environment.is_development(),
            mask_non_operational: cfg.errors.mask_non_operational,
        }
    }
}

impl ErrorResponder {
    pub fn development() -> Self {
        Self {
            include_stack: true,
            ..Self::default()
        }
    }

    /// Effective status and body for `err`.
    pub fn render(&self, err: &ApiError) -> (StatusCode, ErrorBody) {
        let mut status =
            valid_status(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut message = if err.message().is_empty() {
            reason_phrase(status.as_u16()).to_string()
        } else {
            err.message().to_string()
        };

        if self.mask_non_operational && !err.is_operational() {
            status = StatusCode::INTERNAL_SERVER_ERROR;
            message = reason_phrase(status.as_u16()).to_string();
        }

        let body = ErrorBody {
            code: status.as_u16(),
            message,
            errors: err.errors().map(<[String]>::to_vec),
            stack: self.include_stack.then(|| err.stack().to_string()),
        };
        (status, body)
    }

    /// Terminal handler: log, record the message and send the body.
    pub fn respond(&self, err: &ApiError) -> Response {
        let (status, body) = self.render(err);

        if status.is_server_error() {
            error!(
                status = status.as_u16(),
                message = %body.message,
                operational = err.is_operational(),
                stack = %err.stack(),
                "Request failed"
            );
        } else {
            debug!(status = status.as_u16(), message = %body.message, "Request rejected");
        }

        let message = ErrorMessage(body.message.clone());
        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(message);
        response
    }
}

/// Production-safe rendering that carries the error along so
/// [`handle_errors`] can re-render it with the configured responder.
impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = ErrorResponder::default().render(&self);
        let message = ErrorMessage(body.message.clone());

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(message);
        response.extensions_mut().insert(self);
        response
    }
}

/// Middleware routing every `ApiError` response through `responder`.
pub async fn handle_errors(
    State(responder): State<ErrorResponder>,
    request: Request,
    next: Next,
) -> Response {
    let mut response = next.run(request).await;

    match response.extensions_mut().remove::<ApiError>() {
        Some(err) => responder.respond(&err),
        None => response,
    }
}

/// `CatchPanicLayer` hook
pub fn panic_to_response(payload: Box<dyn Any + Send + 'static>) -> Response {
    convert_error(Thrown::Opaque(payload)).into_response()
}

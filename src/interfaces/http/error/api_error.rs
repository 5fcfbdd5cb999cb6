//! The typed error every failure is normalized into

use std::backtrace::{Backtrace, BacktraceStatus};

use axum::http::StatusCode;
use thiserror::Error;

use super::status::reason_phrase;

/// Error carrying everything the response stage needs.
///
/// Errors built through the constructors here are *operational*: expected,
/// user-facing failures. Errors produced by [`convert_error`] from anything
/// else are not.
///
/// [`convert_error`]: super::convert_error
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{status_code} {message}")]
pub struct ApiError {
    status_code: u16,
    message: String,
    errors: Option<Vec<String>>,
    stack: String,
    is_operational: bool,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self::from_parts(status.as_u16(), Some(message.into()))
    }

    /// Build from a raw status code.
    ///
    /// `None` uses the reason phrase of `status_code`. The code is not checked;
    /// the response stage substitutes 500 for anything that is not an error
    /// status.
    pub fn from_parts(status_code: u16, message: Option<String>) -> Self {
        let message = message.unwrap_or_else(|| reason_phrase(status_code).to_string());
        let stack = capture_stack(&message);
        Self {
            status_code,
            message,
            errors: None,
            stack,
            is_operational: true,
        }
    }

    pub(super) fn converted(
        status_code: u16,
        message: String,
        errors: Option<Vec<String>>,
        stack: Option<String>,
    ) -> Self {
        let stack = stack.unwrap_or_else(|| capture_stack(&message));
        Self {
            status_code,
            message,
            errors,
            stack,
            is_operational: false,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// Attach per-field messages.
    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn status_code(&self) -> u16 {
        self.status_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn errors(&self) -> Option<&[String]> {
        self.errors.as_deref()
    }

    pub fn stack(&self) -> &str {
        &self.stack
    }

    pub fn is_operational(&self) -> bool {
        self.is_operational
    }
}

/// Headline plus the current backtrace when `RUST_BACKTRACE` enables one.
fn capture_stack(message: &str) -> String {
    let backtrace = Backtrace::capture();
    match backtrace.status() {
        BacktraceStatus::Captured => format!("Error: {}\n{}", message, backtrace),
        _ => format!("Error: {}", message),
    }
}

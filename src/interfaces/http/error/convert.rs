//! First stage: turn whatever a request failed with into an [`ApiError`]

use std::any::Any;

use axum::extract::rejection::{JsonRejection, PathRejection, QueryRejection};
use axum::http::StatusCode;
use sea_orm::DbErr;

use super::status::{reason_phrase, valid_status};
use super::ApiError;
use crate::domain::DomainError;

/// Every shape of failure that can reach the error pipeline
#[derive(Debug)]
pub enum Thrown {
    /// Already normalized; passes through untouched
    Api(ApiError),
    /// A generic error that may carry its own status
    Failure(Failure),
    /// Raised by the data-mapping layer
    Persistence(DbErr),
    /// Anything else, e.g. a panic payload
    Opaque(Box<dyn Any + Send>),
}

/// Generic error with optional status, field errors and stack
#[derive(Debug, Clone, Default)]
pub struct Failure {
    pub status: Option<u16>,
    pub message: String,
    pub errors: Option<Vec<String>>,
    pub stack: Option<String>,
}

impl Failure {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn with_errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Normalize a thrown value. Total over every input shape.
pub fn convert_error(thrown: Thrown) -> ApiError {
    let (status, message, errors, stack) = match thrown {
        Thrown::Api(err) => return err,
        Thrown::Failure(failure) => {
            let status = failure
                .status
                .and_then(valid_status)
                .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
            (status, failure.message, failure.errors, failure.stack)
        }
        Thrown::Persistence(err) => (StatusCode::BAD_REQUEST, err.to_string(), None, None),
        Thrown::Opaque(payload) => {
            let stack = panic_message(payload.as_ref()).map(|msg| format!("panicked at: {}", msg));
            (StatusCode::INTERNAL_SERVER_ERROR, String::new(), None, stack)
        }
    };

    let message = if message.is_empty() {
        reason_phrase(status.as_u16()).to_string()
    } else {
        message
    };

    ApiError::converted(status.as_u16(), message, errors, stack)
}

fn panic_message(payload: &(dyn Any + Send)) -> Option<&str> {
    payload
        .downcast_ref::<&str>()
        .copied()
        .or_else(|| payload.downcast_ref::<String>().map(String::as_str))
}

// ── Conversions for `?` in handlers ─────────────────────────────

impl From<Thrown> for ApiError {
    fn from(thrown: Thrown) -> Self {
        convert_error(thrown)
    }
}

impl From<DbErr> for ApiError {
    fn from(err: DbErr) -> Self {
        convert_error(Thrown::Persistence(err))
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::NotFound { .. } => ApiError::not_found(err.to_string()),
            DomainError::EmailTaken => ApiError::bad_request(err.to_string()),
            DomainError::InvalidFields(fields) => {
                ApiError::bad_request(fields.join("; ")).with_errors(fields)
            }
            DomainError::Unauthorized(message) => ApiError::unauthorized(message),
            DomainError::Forbidden(message) => ApiError::forbidden(message),
            DomainError::Persistence(db) => convert_error(Thrown::Persistence(db)),
            DomainError::Hashing(message) => convert_error(Thrown::Failure(Failure::new(message))),
        }
    }
}

/// Extractor rejections are client errors the framework already classified.
macro_rules! impl_from_rejection {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for ApiError {
                fn from(rejection: $rejection) -> Self {
                    ApiError::from_parts(rejection.status().as_u16(), Some(rejection.body_text()))
                }
            }
        )+
    };
}

impl_from_rejection!(JsonRejection, PathRejection, QueryRejection);

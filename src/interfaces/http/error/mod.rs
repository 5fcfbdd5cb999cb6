//! Error normalization for the HTTP layer
//!
//! Failures travel through two stages:
//!
//! 1. [`convert_error`] turns any [`Thrown`] value into an [`ApiError`].
//!    Handlers get this for free through the `From` impls and `?`.
//! 2. [`ErrorResponder`] renders the `ApiError` as
//!    `{"code", "message", "errors"?, "stack"?}`. The [`handle_errors`]
//!    middleware applies it to every error response the router produces.

mod api_error;
mod convert;
mod respond;
mod status;

pub use api_error::ApiError;
pub use convert::{convert_error, Failure, Thrown};
pub use respond::{handle_errors, panic_to_response, ErrorBody, ErrorMessage, ErrorResponder};
pub use status::{reason_phrase, valid_status};

/// Result alias for HTTP handlers
pub type ApiResult<T> = Result<T, ApiError>;

//! Status-code helpers shared by both error stages

use axum::http::StatusCode;

/// A status an error response may carry: a known 4xx or 5xx code.
pub fn valid_status(code: u16) -> Option<StatusCode> {
    if !(400..=599).contains(&code) {
        return None;
    }
    StatusCode::from_u16(code).ok()
}

/// Standard reason phrase for `code`.
///
/// Codes without a registered phrase fall back to the phrase of their class.
pub fn reason_phrase(code: u16) -> &'static str {
    match StatusCode::from_u16(code).ok().and_then(|s| s.canonical_reason()) {
        Some(phrase) => phrase,
        None if (400..500).contains(&code) => "Bad Request",
        None => "Internal Server Error",
    }
}

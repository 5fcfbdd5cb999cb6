//! HTTP REST API interfaces
//!
//! - `error`: Two-stage error normalization and the JSON error body
//! - `middleware`: JWT authentication
//! - `access_log`: Request IDs and per-request logging
//! - `modules`: Request handlers and DTOs per resource
//! - `router`: API router with Swagger documentation

pub mod access_log;
pub mod common;
pub mod error;
pub mod middleware;
pub mod modules;
pub mod router;

pub use router::{create_api_router, AppState};

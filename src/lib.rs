//! # Accounts Service
//!
//! User account management over a REST API: registration, login with JWT
//! bearer tokens and role-based user administration.
//!
//! ## Architecture
//!
//! - **domain**: the user aggregate, its DTOs and domain errors
//! - **application**: the user service (use cases)
//! - **infrastructure**: database entities, migrations, repositories and crypto
//! - **interfaces**: the HTTP API, including the error normalization pipeline
//! - **server**: process lifecycle (startup, default admin, graceful shutdown)

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod interfaces;
pub mod server;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export database types for easy access
pub use infrastructure::{init_database, DatabaseConfig};

// Re-export API router
pub use interfaces::http::{create_api_router, AppState};

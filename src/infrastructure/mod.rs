//! Infrastructure layer - external concerns

pub mod crypto;
pub mod database;

pub use database::{init_and_migrate, init_database, DatabaseConfig};

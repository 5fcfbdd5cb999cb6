//! Shared HTTP building blocks

pub mod extract;

pub use extract::{ApiJson, ApiPath, ApiQuery};

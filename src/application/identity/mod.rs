//! Identity module: user management & authentication
//!
//! Contains the `UserService` which orchestrates all user-related
//! use-cases: registration, login, profile updates and deletion.

pub mod service;

pub use service::{normalize_email, UserService};

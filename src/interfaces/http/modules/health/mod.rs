//! Health module: database reachability and schema state

pub mod handlers;

pub use handlers::*;

//! User aggregate
//!
//! Contains the User entity, DTOs, field rules and the repository interface.

pub mod model;
pub mod repository;
pub mod validation;

mod dto_create;
mod dto_get;
mod dto_update;

// Re-export model types
pub use model::{Right, User, UserRole};

// Re-export DTOs
pub use dto_create::CreateUserDto;
pub use dto_get::{GetUserDto, SortOrder, UserSort, UserSortField};
pub use dto_update::UpdateUserDto;

pub use validation::flatten_validation_errors;

// Re-export repository trait
pub use repository::UserRepositoryInterface;

//! Domain layer: the user aggregate and domain errors

pub mod error;
pub mod user;

pub use error::{DomainError, DomainResult};
pub use user::{
    CreateUserDto, GetUserDto, Right, UpdateUserDto, User, UserRepositoryInterface, UserRole,
};

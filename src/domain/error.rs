//! Domain errors

use thiserror::Error;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

#[derive(Debug, Error)]
pub enum DomainError {
    #[error("{entity} not found")]
    NotFound { entity: &'static str, id: String },

    #[error("Email already taken")]
    EmailTaken,

    /// One or more field rules failed; each entry reads `field: message`.
    #[error("{}", .0.join("; "))]
    InvalidFields(Vec<String>),

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("Database error: {0}")]
    Persistence(#[from] sea_orm::DbErr),

    #[error("Password hashing failed: {0}")]
    Hashing(String),
}

impl DomainError {
    pub fn user_not_found(id: impl Into<String>) -> Self {
        DomainError::NotFound {
            entity: "User",
            id: id.into(),
        }
    }
}

impl From<validator::ValidationErrors> for DomainError {
    fn from(errors: validator::ValidationErrors) -> Self {
        DomainError::InvalidFields(crate::domain::user::flatten_validation_errors(&errors))
    }
}

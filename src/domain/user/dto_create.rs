use validator::Validate;

use super::validation::{validate_password_strength, validate_role};

#[derive(Debug, Clone, Validate)]
pub struct CreateUserDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: String,
    #[validate(email(message = "invalid email"))]
    pub email: String,
    /// Plaintext; hashed by the persistence layer before it is written.
    #[validate(
        length(min = 8, message = "password must be at least 8 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: String,
    /// Defaults to `user` when absent
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

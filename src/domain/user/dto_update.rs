use validator::Validate;

use super::validation::{validate_password_strength, validate_role};

/// Partial update; `None` leaves the stored value untouched.
#[derive(Debug, Clone, Default, Validate)]
pub struct UpdateUserDto {
    #[validate(length(min = 1, message = "name is required"))]
    pub name: Option<String>,
    #[validate(email(message = "invalid email"))]
    pub email: Option<String>,
    #[validate(
        length(min = 8, message = "password must be at least 8 characters"),
        custom(function = "validate_password_strength")
    )]
    pub password: Option<String>,
    #[validate(custom(function = "validate_role"))]
    pub role: Option<String>,
}

impl UpdateUserDto {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.password.is_none() && self.role.is_none()
    }
}

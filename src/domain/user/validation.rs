//! Field rules shared by the user DTOs
//!
//! The DTOs declare their rules with `validator` derives; the custom
//! checks that a derive cannot express live here.

use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

use super::UserRole;

/// Password must contain at least one ASCII letter and one digit.
pub fn validate_password_strength(password: &str) -> Result<(), ValidationError> {
    let has_letter = password.chars().any(|c| c.is_ascii_alphabetic());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());

    if has_letter && has_digit {
        Ok(())
    } else {
        Err(ValidationError::new("password_strength").with_message(Cow::Borrowed(
            "password must contain at least 1 letter and 1 number",
        )))
    }
}

pub fn validate_role(role: &str) -> Result<(), ValidationError> {
    match role.parse::<UserRole>() {
        Ok(_) => Ok(()),
        Err(_) => Err(ValidationError::new("role").with_message(Cow::Owned(format!(
            "role must be one of [{}]",
            UserRole::ALL.map(UserRole::as_str).join(", ")
        )))),
    }
}

/// Flatten `validator` output into sorted `field: message` lines.
pub fn flatten_validation_errors(errors: &ValidationErrors) -> Vec<String> {
    let mut lines: Vec<String> = errors
        .field_errors()
        .iter()
        .flat_map(|(field, errs)| {
            errs.iter().map(move |e| {
                let msg = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| e.code.to_string());
                format!("{}: {}", field, msg)
            })
        })
        .collect();
    lines.sort();
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::user::{CreateUserDto, UpdateUserDto};
    use validator::Validate;

    fn valid_user() -> CreateUserDto {
        CreateUserDto {
            name: "Jane Doe".to_string(),
            email: "jane@example.com".to_string(),
            password: "password1".to_string(),
            role: Some("user".to_string()),
        }
    }

    fn failing_fields(dto: &CreateUserDto) -> Vec<String> {
        let errors = dto.validate().unwrap_err();
        let mut fields: Vec<String> = errors
            .field_errors()
            .keys()
            .map(|k| k.to_string())
            .collect();
        fields.sort();
        fields
    }

    #[test]
    fn fully_valid_user_passes() {
        assert!(valid_user().validate().is_ok());

        let without_role = CreateUserDto {
            role: None,
            ..valid_user()
        };
        assert!(without_role.validate().is_ok());
    }

    #[test]
    fn invalid_email_fails() {
        for email in ["invalidEmail", "jane@", "@example.com", ""] {
            let dto = CreateUserDto {
                email: email.to_string(),
                ..valid_user()
            };
            assert_eq!(failing_fields(&dto), vec!["email"], "email {:?}", email);
        }
    }

    #[test]
    fn short_password_fails() {
        let dto = CreateUserDto {
            password: "pass1".to_string(),
            ..valid_user()
        };
        assert_eq!(failing_fields(&dto), vec!["password"]);
    }

    #[test]
    fn password_without_digits_fails() {
        let dto = CreateUserDto {
            password: "password".to_string(),
            ..valid_user()
        };
        assert_eq!(failing_fields(&dto), vec!["password"]);
    }

    #[test]
    fn password_without_letters_fails() {
        let dto = CreateUserDto {
            password: "11111111".to_string(),
            ..valid_user()
        };
        assert_eq!(failing_fields(&dto), vec!["password"]);
    }

    #[test]
    fn unknown_role_fails() {
        let dto = CreateUserDto {
            role: Some("invalid".to_string()),
            ..valid_user()
        };
        assert_eq!(failing_fields(&dto), vec!["role"]);
    }

    #[test]
    fn every_violation_is_reported_at_once() {
        let dto = CreateUserDto {
            name: String::new(),
            email: "nope".to_string(),
            password: "short".to_string(),
            role: Some("root".to_string()),
        };
        assert_eq!(
            failing_fields(&dto),
            vec!["email", "name", "password", "role"]
        );

        let lines = flatten_validation_errors(&dto.validate().unwrap_err());
        assert!(lines.contains(&"role: role must be one of [user, admin]".to_string()));
        assert!(lines.iter().all(|l| l.contains(": ")));
        let mut sorted = lines.clone();
        sorted.sort();
        assert_eq!(lines, sorted);
    }

    #[test]
    fn update_checks_only_present_fields() {
        assert!(UpdateUserDto::default().validate().is_ok());

        let dto = UpdateUserDto {
            password: Some("abcdefgh".to_string()),
            ..UpdateUserDto::default()
        };
        let lines = flatten_validation_errors(&dto.validate().unwrap_err());
        assert_eq!(
            lines,
            vec!["password: password must contain at least 1 letter and 1 number".to_string()]
        );
    }
}

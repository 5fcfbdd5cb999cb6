//! User DTOs

use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

use crate::domain::user::validation::validate_role;
use crate::domain::user::UserSort;
use crate::domain::{CreateUserDto, DomainError, GetUserDto, UpdateUserDto, User, UserRole};
use crate::shared::PaginatedResult;

/// User API representation; never carries the password
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserDto {
    pub id: String,
    pub name: String,
    pub email: String,
    /// `user` or `admin`
    pub role: String,
    pub is_email_verified: bool,
}

impl From<User> for UserDto {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: u.role.to_string(),
            is_email_verified: u.is_email_verified,
        }
    }
}

/// Create user request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateUserRequest {
    pub name: String,
    pub email: String,
    /// At least 8 characters with a letter and a digit
    pub password: String,
    /// Defaults to `user`
    pub role: Option<String>,
}

impl From<CreateUserRequest> for CreateUserDto {
    fn from(r: CreateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
            role: r.role,
        }
    }
}

/// Update user request; omitted fields are left as they are
#[derive(Debug, Default, Deserialize, ToSchema)]
pub struct UpdateUserRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

impl From<UpdateUserRequest> for UpdateUserDto {
    fn from(r: UpdateUserRequest) -> Self {
        Self {
            name: r.name,
            email: r.email,
            password: r.password,
            role: r.role,
        }
    }
}

/// List users query parameters
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ListUsersParams {
    /// Exact name match
    pub name: Option<String>,
    /// Filter by role (user, admin)
    pub role: Option<String>,
    /// `field:order` pairs separated by commas, e.g. `name:asc,created_at:desc`
    pub sort_by: Option<String>,
    /// Page size (default 10, max 100)
    pub limit: Option<u32>,
    /// 1-based page number
    pub page: Option<u32>,
}

impl TryFrom<ListUsersParams> for GetUserDto {
    type Error = DomainError;

    fn try_from(p: ListUsersParams) -> Result<Self, Self::Error> {
        let role = match p.role.as_deref() {
            Some(raw) => {
                validate_role(raw).map_err(|e| {
                    let message = e.message.map_or_else(|| e.code.to_string(), |m| m.to_string());
                    DomainError::InvalidFields(vec![format!("role: {}", message)])
                })?;
                raw.parse::<UserRole>().ok()
            }
            None => None,
        };

        Ok(Self {
            name: p.name,
            role,
            sort: p.sort_by.as_deref().map(UserSort::parse_list).unwrap_or_default(),
            page: p.page,
            limit: p.limit,
        })
    }
}

/// One page of users
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct UserPage {
    pub results: Vec<UserDto>,
    pub page: u32,
    pub limit: u32,
    pub total_pages: u32,
    pub total_results: u64,
}

impl From<PaginatedResult<User>> for UserPage {
    fn from(p: PaginatedResult<User>) -> Self {
        let p = p.map(UserDto::from);
        Self {
            results: p.items,
            page: p.page,
            limit: p.limit,
            total_pages: p.total_pages,
            total_results: p.total,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_filter_is_a_field_error() {
        let err = GetUserDto::try_from(ListUsersParams {
            role: Some("root".into()),
            ..ListUsersParams::default()
        })
        .unwrap_err();

        let DomainError::InvalidFields(fields) = err else {
            panic!("expected field errors");
        };
        assert_eq!(fields, vec!["role: role must be one of [user, admin]".to_string()]);
    }

    #[test]
    fn params_become_a_query() {
        let query = GetUserDto::try_from(ListUsersParams {
            role: Some("admin".into()),
            sort_by: Some("name:desc".into()),
            limit: Some(5),
            ..ListUsersParams::default()
        })
        .unwrap();

        assert_eq!(query.role, Some(UserRole::Admin));
        assert_eq!(query.sort, UserSort::parse_list("name:desc"));
        assert_eq!(query.limit, Some(5));
        assert_eq!(query.page, None);
    }
}

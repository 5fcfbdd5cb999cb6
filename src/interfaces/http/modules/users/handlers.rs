//! User management API handlers
//!
//! Listing and creating users needs the matching right; reading, updating
//! and deleting a single user is also allowed on one's own account.
//! Delegates to `UserService` from the application/identity layer.

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Extension, Json};

use super::dto::{CreateUserRequest, ListUsersParams, UpdateUserRequest, UserDto, UserPage};
use crate::application::UserService;
use crate::domain::{GetUserDto, Right};
use crate::infrastructure::database::repositories::UserRepository;
use crate::interfaces::http::common::{ApiJson, ApiPath, ApiQuery};
use crate::interfaces::http::error::{ApiResult, ErrorBody};
use crate::interfaces::http::middleware::AuthenticatedUser;

/// User handler state, concrete over `UserRepository` for Axum compatibility.
#[derive(Clone)]
pub struct UserHandlerState {
    pub user_service: Arc<UserService<UserRepository>>,
}

#[utoipa::path(
    post,
    path = "/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = UserDto),
        (status = 400, description = "Validation error or email taken", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody)
    )
)]
pub async fn create_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiJson(request): ApiJson<CreateUserRequest>,
) -> ApiResult<(StatusCode, Json<UserDto>)> {
    auth.require_right(Right::ManageUsers)?;

    let user = state.user_service.create_user(request.into()).await?;
    Ok((StatusCode::CREATED, Json(UserDto::from(user))))
}

#[utoipa::path(
    get,
    path = "/v1/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(ListUsersParams),
    responses(
        (status = 200, description = "User list", body = UserPage),
        (status = 400, description = "Invalid query", body = ErrorBody),
        (status = 401, description = "Unauthorized", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody)
    )
)]
pub async fn list_users(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiQuery(params): ApiQuery<ListUsersParams>,
) -> ApiResult<Json<UserPage>> {
    auth.require_right(Right::GetUsers)?;

    let query = GetUserDto::try_from(params)?;
    let page = state.user_service.query_users(query).await?;
    Ok(Json(UserPage::from(page)))
}

#[utoipa::path(
    get,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 200, description = "User details", body = UserDto),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn get_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<Json<UserDto>> {
    auth.require_right_or_self(Right::GetUsers, &id)?;

    let user = state.user_service.get_user_by_id(&id).await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    patch,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    request_body = UpdateUserRequest,
    responses(
        (status = 200, description = "User updated", body = UserDto),
        (status = 400, description = "Validation error or email taken", body = ErrorBody),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn update_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<String>,
    ApiJson(request): ApiJson<UpdateUserRequest>,
) -> ApiResult<Json<UserDto>> {
    auth.require_right_or_self(Right::ManageUsers, &id)?;
    // Changing a role is never self-service
    if request.role.is_some() {
        auth.require_right(Right::ManageUsers)?;
    }

    let user = state.user_service.update_user_by_id(&id, request.into()).await?;
    Ok(Json(UserDto::from(user)))
}

#[utoipa::path(
    delete,
    path = "/v1/users/{id}",
    tag = "Users",
    security(("bearer_auth" = [])),
    params(("id" = String, Path, description = "User ID")),
    responses(
        (status = 204, description = "User deleted"),
        (status = 403, description = "Forbidden", body = ErrorBody),
        (status = 404, description = "Not found", body = ErrorBody)
    )
)]
pub async fn delete_user(
    State(state): State<UserHandlerState>,
    Extension(auth): Extension<AuthenticatedUser>,
    ApiPath(id): ApiPath<String>,
) -> ApiResult<StatusCode> {
    auth.require_right_or_self(Right::ManageUsers, &id)?;

    state.user_service.delete_user_by_id(&id).await?;
    Ok(StatusCode::NO_CONTENT)
}

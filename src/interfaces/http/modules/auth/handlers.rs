//! Authentication API handlers

use std::sync::Arc;

use axum::{extract::State, http::StatusCode, Json};

use super::dto::{AuthResponse, LoginRequest, RegisterRequest, TokenResponse};
use crate::application::UserService;
use crate::domain::User;
use crate::infrastructure::crypto::jwt::{create_token, JwtConfig};
use crate::infrastructure::database::repositories::UserRepository;
use crate::interfaces::http::common::ApiJson;
use crate::interfaces::http::error::{convert_error, ApiResult, ErrorBody, Failure, Thrown};
use crate::interfaces::http::modules::users::UserDto;

/// Auth state
#[derive(Clone)]
pub struct AuthHandlerState {
    pub user_service: Arc<UserService<UserRepository>>,
    pub jwt_config: JwtConfig,
}

fn auth_response(user: User, jwt_config: &JwtConfig) -> ApiResult<AuthResponse> {
    let token = create_token(&user.id, &user.email, user.role.as_str(), jwt_config)
        .map_err(|e| convert_error(Thrown::Failure(Failure::new(e.to_string()))))?;

    Ok(AuthResponse {
        user: UserDto::from(user),
        token: TokenResponse {
            token,
            token_type: "Bearer".to_string(),
            expires_in: jwt_config.expiration_hours * 3600,
        },
    })
}

#[utoipa::path(
    post,
    path = "/v1/auth/register",
    tag = "Authentication",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "User created", body = AuthResponse),
        (status = 400, description = "Validation error or email taken", body = ErrorBody)
    )
)]
pub async fn register(
    State(state): State<AuthHandlerState>,
    ApiJson(request): ApiJson<RegisterRequest>,
) -> ApiResult<(StatusCode, Json<AuthResponse>)> {
    let user = state.user_service.register(request.into()).await?;
    let response = auth_response(user, &state.jwt_config)?;

    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    post,
    path = "/v1/auth/login",
    tag = "Authentication",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Successful login", body = AuthResponse),
        (status = 401, description = "Incorrect email or password", body = ErrorBody)
    )
)]
pub async fn login(
    State(state): State<AuthHandlerState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> ApiResult<Json<AuthResponse>> {
    let user = state
        .user_service
        .login_with_email_and_password(&request.email, &request.password)
        .await?;

    Ok(Json(auth_response(user, &state.jwt_config)?))
}

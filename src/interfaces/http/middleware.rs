//! Authentication middleware for Axum

use std::sync::Arc;

use axum::{
    body::Body,
    extract::State,
    http::{header, Request},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::debug;

use crate::application::UserService;
use crate::domain::{DomainError, Right, User, UserRole};
use crate::infrastructure::crypto::jwt::{verify_token, JwtConfig};
use crate::infrastructure::database::repositories::UserRepository;
use crate::interfaces::http::error::ApiError;

const UNAUTHENTICATED: &str = "Please authenticate";

/// Authentication state containing JWT config and the user service
#[derive(Clone)]
pub struct AuthState {
    pub jwt_config: JwtConfig,
    pub user_service: Arc<UserService<UserRepository>>,
}

/// Authenticated user information, resolved from the token subject
#[derive(Clone, Debug)]
pub struct AuthenticatedUser {
    pub user_id: String,
    pub email: String,
    pub role: UserRole,
}

impl AuthenticatedUser {
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id.clone(),
            email: user.email.clone(),
            role: user.role,
        }
    }

    /// 403 unless the role grants `right`.
    pub fn require_right(&self, right: Right) -> Result<(), ApiError> {
        if self.role.has_right(right) {
            Ok(())
        } else {
            Err(ApiError::forbidden("Forbidden"))
        }
    }

    /// Users may always act on their own account.
    pub fn require_right_or_self(&self, right: Right, user_id: &str) -> Result<(), ApiError> {
        if self.user_id == user_id {
            return Ok(());
        }
        self.require_right(right)
    }
}

fn extract_token(auth_header: &str) -> Option<&str> {
    auth_header.strip_prefix("Bearer ")
}

/// JWT authentication middleware
///
/// The token must be valid and its subject must still exist; the role comes
/// from the stored user, not from the token.
pub async fn auth_middleware(
    State(auth_state): State<AuthState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(extract_token)
        .map(str::to_owned);

    let user = match authenticate(&auth_state, token.as_deref()).await {
        Ok(user) => user,
        Err(err) => return err.into_response(),
    };

    request.extensions_mut().insert(user);
    next.run(request).await
}

async fn authenticate(
    auth_state: &AuthState,
    token: Option<&str>,
) -> Result<AuthenticatedUser, ApiError> {
    let token = token.ok_or_else(|| ApiError::unauthorized(UNAUTHENTICATED))?;

    let claims = verify_token(token, &auth_state.jwt_config).map_err(|e| {
        debug!(error = %e, "Rejected bearer token");
        ApiError::unauthorized(UNAUTHENTICATED)
    })?;

    let user = auth_state
        .user_service
        .get_user_by_id(&claims.sub)
        .await
        .map_err(|err| match err {
            DomainError::NotFound { .. } => ApiError::unauthorized(UNAUTHENTICATED),
            other => ApiError::from(other),
        })?;

    Ok(AuthenticatedUser::from_user(&user))
}

//! API Router with Swagger UI

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::FromRef,
    middleware,
    routing::{get, post},
    Router,
};
use sea_orm::DatabaseConnection;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};
use utoipa_swagger_ui::SwaggerUi;

use crate::application::UserService;
use crate::config::AppConfig;
use crate::infrastructure::crypto::jwt::JwtConfig;
use crate::infrastructure::database::repositories::UserRepository;
use crate::interfaces::http::access_log::{request_id_middleware, AccessLog};
use crate::interfaces::http::error::{
    handle_errors, panic_to_response, ApiError, ErrorBody, ErrorResponder,
};
use crate::interfaces::http::middleware::{auth_middleware, AuthState};

use super::modules::{auth, health, users};

/// Everything the routes need. Handlers extract their own slice via `FromRef`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub user_service: Arc<UserService<UserRepository>>,
    pub jwt_config: JwtConfig,
    pub responder: ErrorResponder,
    pub started_at: Arc<Instant>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: &AppConfig) -> Self {
        let repo = Arc::new(UserRepository::new(db.clone()));
        Self {
            db,
            user_service: Arc::new(UserService::new(repo)),
            jwt_config: JwtConfig::from(config),
            responder: ErrorResponder::from(config),
            started_at: Arc::new(Instant::now()),
        }
    }
}

// -- FromRef implementations so each handler keeps its own State<T> extractor --

impl FromRef<AppState> for AuthState {
    fn from_ref(s: &AppState) -> Self {
        AuthState {
            jwt_config: s.jwt_config.clone(),
            user_service: Arc::clone(&s.user_service),
        }
    }
}

impl FromRef<AppState> for auth::AuthHandlerState {
    fn from_ref(s: &AppState) -> Self {
        auth::AuthHandlerState {
            user_service: Arc::clone(&s.user_service),
            jwt_config: s.jwt_config.clone(),
        }
    }
}

impl FromRef<AppState> for users::UserHandlerState {
    fn from_ref(s: &AppState) -> Self {
        users::UserHandlerState {
            user_service: Arc::clone(&s.user_service),
        }
    }
}

impl FromRef<AppState> for health::HealthState {
    fn from_ref(s: &AppState) -> Self {
        health::HealthState {
            db: s.db.clone(),
            started_at: Arc::clone(&s.started_at),
        }
    }
}

/// Security scheme modifier for OpenAPI
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT Bearer token"))
                        .build(),
                ),
            );
        }
    }
}

/// OpenAPI documentation
#[derive(OpenApi)]
#[openapi(
    paths(
        // Health
        health::health_check,
        // Auth
        auth::register,
        auth::login,
        // Users
        users::create_user,
        users::list_users,
        users::get_user,
        users::update_user,
        users::delete_user,
    ),
    components(
        schemas(
            ErrorBody,
            health::HealthResponse,
            health::HealthStatus,
            health::DatabaseHealth,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::AuthResponse,
            auth::TokenResponse,
            users::UserDto,
            users::UserPage,
            users::CreateUserRequest,
            users::UpdateUserRequest,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Health", description = "Server health check endpoints"),
        (name = "Authentication", description = "Registration and login (JWT)"),
        (name = "Users", description = "User management"),
    ),
    info(
        title = "Accounts Service API",
        version = "1.0.0",
        description = "User accounts with uniform JSON error responses",
        license(name = "MIT")
    )
)]
pub struct ApiDoc;

async fn not_found() -> ApiError {
    ApiError::not_found("Not found")
}

async fn method_not_allowed() -> ApiError {
    ApiError::from_parts(405, None)
}

/// Create the API router with all routes
pub fn create_api_router(state: AppState) -> Router {
    let auth_state = AuthState::from_ref(&state);

    // Auth routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // User routes (protected)
    let user_routes = Router::new()
        .route("/", get(users::list_users).post(users::create_user))
        .route(
            "/{id}",
            get(users::get_user)
                .patch(users::update_user)
                .delete(users::delete_user),
        )
        .layer(middleware::from_fn_with_state(auth_state, auth_middleware));

    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let swagger_routes = SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi());

    let responder = state.responder;

    Router::new()
        // Health
        .route("/health", get(health::health_check))
        // Auth
        .nest("/v1/auth", auth_routes)
        // Users
        .nest("/v1/users", user_routes)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .with_state(state)
        // Swagger UI
        .merge(swagger_routes)
        // Middleware, innermost first
        .layer(CatchPanicLayer::custom(panic_to_response))
        .layer(middleware::from_fn_with_state(responder, handle_errors))
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(AccessLog)
                .on_response(AccessLog),
        )
        .layer(middleware::from_fn(request_id_middleware))
}

//! Reusable accounts server runtime.
//!
//! Provides [`ServerHandle`] that encapsulates the full server lifecycle:
//! database init, migrations, default admin, REST API and graceful shutdown.

use std::net::SocketAddr;
use std::time::Duration;

use sea_orm::DatabaseConnection;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::application::UserService;
use crate::config::AppConfig;
use crate::domain::{CreateUserDto, DomainError, GetUserDto, UserRepositoryInterface, UserRole};
use crate::infrastructure::{init_and_migrate, init_database, DatabaseConfig};
use crate::interfaces::http::{create_api_router, AppState};
use crate::shared::shutdown::{listen_for_shutdown_signals, ShutdownSignal};

/// Startup failures
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        source: std::io::Error,
    },

    #[error("Failed to create default admin: {0}")]
    DefaultAdmin(#[from] DomainError),
}

// ── Options ────────────────────────────────────────────────────────

/// Options for starting the accounts server.
pub struct ServerOptions {
    /// Application configuration.
    pub config: AppConfig,
    /// Run database migrations on startup (default: `database.auto_migrate`).
    pub auto_migrate: bool,
    /// Create default admin user if none exists (default: `admin.create_default`).
    pub create_default_admin: bool,
}

impl ServerOptions {
    pub fn new(config: AppConfig) -> Self {
        Self {
            auto_migrate: config.database.auto_migrate,
            create_default_admin: config.admin.create_default,
            config,
        }
    }
}

impl Default for ServerOptions {
    fn default() -> Self {
        Self::new(AppConfig::default())
    }
}

// ── ServerHandle ───────────────────────────────────────────────────

/// Handle to a running accounts server.
///
/// # Examples
///
/// ```rust,no_run
/// use accounts_api::server::{ServerHandle, ServerOptions};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let handle = ServerHandle::start(ServerOptions::default()).await?;
///     handle.install_signal_handler();
///     handle.shutdown_signal().wait().await;
///     handle.wait().await;
///     Ok(())
/// }
/// ```
pub struct ServerHandle {
    /// The configuration the server was started with.
    pub config: AppConfig,
    /// Address the API is listening on.
    pub local_addr: SocketAddr,

    db: DatabaseConnection,
    shutdown: ShutdownSignal,
    api_task: tokio::task::JoinHandle<()>,
}

impl ServerHandle {
    /// Start the accounts server with the given options.
    ///
    /// This will:
    /// 1. Connect to the database and run migrations (if enabled)
    /// 2. Create the default admin user (if enabled and no user exists)
    /// 3. Start the REST API server (with Swagger UI)
    pub async fn start(opts: ServerOptions) -> Result<Self, ServerError> {
        let app_cfg = opts.config;

        info!(environment = %app_cfg.environment, "Starting accounts service...");

        // ── Database ───────────────────────────────────────────
        let db_config = DatabaseConfig::from(&app_cfg);
        let db = if opts.auto_migrate {
            init_and_migrate(&db_config).await?
        } else {
            init_database(&db_config).await?
        };

        let state = AppState::new(db.clone(), &app_cfg);

        if opts.create_default_admin {
            ensure_default_admin(&state.user_service, &app_cfg).await?;
        }

        info!(
            expiration_hours = state.jwt_config.expiration_hours,
            "JWT configured"
        );

        // ── REST API server ────────────────────────────────────
        let api_router = create_api_router(state);

        let api_addr = app_cfg.server.address();
        let listener = tokio::net::TcpListener::bind(&api_addr)
            .await
            .map_err(|source| ServerError::Bind {
                addr: api_addr.clone(),
                source,
            })?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: api_addr.clone(),
            source,
        })?;
        info!("REST API server listening on http://{}", local_addr);
        info!("Swagger UI available at http://{}/docs/", local_addr);

        let shutdown = ShutdownSignal::new();
        let api_shutdown = shutdown.clone();
        let api_server = axum::serve(listener, api_router).with_graceful_shutdown(async move {
            api_shutdown.wait().await;
            info!("REST API server received shutdown signal");
        });

        let api_task = tokio::spawn(async move {
            if let Err(e) = api_server.await {
                error!("REST API server error: {}", e);
            }
        });

        Ok(Self {
            config: app_cfg,
            local_addr,
            db,
            shutdown,
            api_task,
        })
    }

    /// Get a cloneable shutdown signal.
    pub fn shutdown_signal(&self) -> ShutdownSignal {
        self.shutdown.clone()
    }

    /// Install OS signal listeners (SIGTERM, SIGINT) that trigger shutdown.
    pub fn install_signal_handler(&self) {
        tokio::spawn(listen_for_shutdown_signals(self.shutdown.clone()));
    }

    /// Trigger graceful shutdown (non-blocking).
    pub fn trigger_shutdown(&self) {
        self.shutdown.trigger();
    }

    /// Wait for the server to stop after shutdown has been triggered.
    ///
    /// In-flight requests get `server.shutdown_timeout` seconds to finish.
    pub async fn wait(self) {
        let timeout = Duration::from_secs(self.config.server.shutdown_timeout);
        info!(timeout_secs = timeout.as_secs(), "Waiting for server tasks to complete...");

        let mut api_task = self.api_task;
        match tokio::time::timeout(timeout, &mut api_task).await {
            Ok(Ok(())) => info!("REST API server stopped"),
            Ok(Err(e)) => error!("REST API server task panicked: {}", e),
            Err(_) => {
                warn!("Graceful shutdown timed out, aborting open connections");
                api_task.abort();
            }
        }

        if let Err(e) = self.db.close().await {
            warn!("Error closing database connection: {}", e);
        } else {
            info!("Database connection closed");
        }

        info!("Accounts service shutdown complete");
    }

    /// Trigger shutdown and wait for completion.
    pub async fn shutdown(self) {
        info!("Shutting down accounts service...");
        self.trigger_shutdown();
        self.wait().await;
    }

    /// Check if the server is still running.
    pub fn is_running(&self) -> bool {
        !self.api_task.is_finished()
    }
}

// ── Helpers ────────────────────────────────────────────────────────

/// Create the configured admin when the users table is empty.
///
/// Returns whether an admin was created.
pub async fn ensure_default_admin<R: UserRepositoryInterface>(
    service: &UserService<R>,
    app_cfg: &AppConfig,
) -> Result<bool, DomainError> {
    let existing = service
        .query_users(GetUserDto {
            limit: Some(1),
            ..GetUserDto::default()
        })
        .await?;
    if existing.total > 0 {
        return Ok(false);
    }

    info!("Creating default admin user...");
    let admin = service
        .create_user(CreateUserDto {
            name: app_cfg.admin.name.clone(),
            email: app_cfg.admin.email.clone(),
            password: app_cfg.admin.password.clone(),
            role: Some(UserRole::Admin.as_str().to_string()),
        })
        .await?;

    info!(email = %admin.email, "Default admin created");
    warn!("Please change the default admin password immediately!");
    Ok(true)
}

/// Initialize tracing (logging) from the application config.
///
/// Call this once at process startup (before [`ServerHandle::start`]).
pub fn init_tracing(config: &AppConfig) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    match config.logging.format.to_lowercase().as_str() {
        "json" => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().json())
                .init();
        }
        _ => {
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer())
                .init();
        }
    }
}

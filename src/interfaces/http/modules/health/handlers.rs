//! Health check handler
//!
//! Healthy means the database answers, its schema is fully migrated and the
//! users table can be read.

use std::sync::Arc;
use std::time::Instant;

use axum::{extract::State, http::StatusCode, Json};
use sea_orm::{DatabaseConnection, DbErr, EntityTrait, PaginatorTrait};
use sea_orm_migration::MigratorTrait;
use serde::Serialize;
use tracing::warn;
use utoipa::ToSchema;

use crate::infrastructure::database::entities::User as UserEntity;
use crate::infrastructure::database::migrator::Migrator;

/// Health check state
#[derive(Clone)]
pub struct HealthState {
    pub db: DatabaseConnection,
    pub started_at: Arc<Instant>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Ok,
    Degraded,
}

/// Service health response
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub version: String,
    pub uptime_seconds: u64,
    pub database: DatabaseHealth,
}

/// What the service sees of its database
#[derive(Debug, Default, Serialize, ToSchema)]
pub struct DatabaseHealth {
    pub reachable: bool,
    /// Migrations known to this build but not applied yet
    pub pending_migrations: Option<usize>,
    pub user_count: Option<u64>,
}

impl DatabaseHealth {
    fn is_healthy(&self) -> bool {
        self.reachable && self.pending_migrations == Some(0)
    }
}

async fn inspect_database(db: &DatabaseConnection) -> Result<DatabaseHealth, DbErr> {
    let pending = Migrator::get_pending_migrations(db).await?.len();
    let user_count = UserEntity::find().count(db).await?;

    Ok(DatabaseHealth {
        reachable: true,
        pending_migrations: Some(pending),
        user_count: Some(user_count),
    })
}

#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Database unreachable or schema out of date", body = HealthResponse)
    )
)]
pub async fn health_check(State(state): State<HealthState>) -> (StatusCode, Json<HealthResponse>) {
    let database = inspect_database(&state.db).await.unwrap_or_else(|e| {
        warn!(error = %e, "Health check could not inspect the database");
        DatabaseHealth::default()
    });

    let (status, http_status) = if database.is_healthy() {
        (HealthStatus::Ok, StatusCode::OK)
    } else {
        (HealthStatus::Degraded, StatusCode::SERVICE_UNAVAILABLE)
    };

    (
        http_status,
        Json(HealthResponse {
            status,
            version: env!("CARGO_PKG_VERSION").to_string(),
            uptime_seconds: state.started_at.elapsed().as_secs(),
            database,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::database::{init_database, test_database, DatabaseConfig};

    fn state(db: DatabaseConnection) -> State<HealthState> {
        State(HealthState {
            db,
            started_at: Arc::new(Instant::now()),
        })
    }

    #[tokio::test]
    async fn migrated_database_is_healthy() {
        let (status, Json(body)) = health_check(state(test_database().await)).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.status, HealthStatus::Ok);
        assert_eq!(body.database.pending_migrations, Some(0));
        assert_eq!(body.database.user_count, Some(0));
    }

    #[tokio::test]
    async fn unmigrated_database_is_degraded() {
        let db = init_database(&DatabaseConfig::in_memory()).await.unwrap();

        let (status, Json(body)) = health_check(state(db)).await;

        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body.status, HealthStatus::Degraded);
    }
}

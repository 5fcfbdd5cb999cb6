pub mod entities;
pub mod migrator;
pub mod repositories;

use tracing::info;
use sea_orm::{ConnectOptions, Database, DatabaseConnection};
use sea_orm_migration::MigratorTrait;

use crate::config::AppConfig;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// Database URL (e.g., "sqlite://./accounts.db?mode=rwc")
    pub url: String,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "sqlite://./accounts.db?mode=rwc".to_string(),
        }
    }
}

impl DatabaseConfig {
    /// Private in-memory SQLite database
    pub fn in_memory() -> Self {
        Self {
            url: "sqlite::memory:".to_string(),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.url.contains(":memory:")
    }
}

impl From<&AppConfig> for DatabaseConfig {
    fn from(cfg: &AppConfig) -> Self {
        Self {
            url: cfg.database.url.clone(),
        }
    }
}

/// Initialize database connection
pub async fn init_database(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    info!(url = %config.url, "Connecting to database");

    let mut options = ConnectOptions::new(config.url.clone());
    options.sqlx_logging(false);
    // Every pooled connection would open its own empty in-memory database.
    if config.is_in_memory() {
        options.max_connections(1).min_connections(1);
    }

    let db = Database::connect(options).await?;
    info!("Database connected successfully");
    Ok(db)
}

/// Connect and bring the schema up to date
pub async fn init_and_migrate(config: &DatabaseConfig) -> Result<DatabaseConnection, sea_orm::DbErr> {
    let db = init_database(config).await?;
    info!("Running database migrations...");
    migrator::Migrator::up(&db, None).await?;
    info!("Migrations completed");
    Ok(db)
}

/// Fresh in-memory database with all migrations applied
#[cfg(test)]
pub(crate) async fn test_database() -> DatabaseConnection {
    init_and_migrate(&DatabaseConfig::in_memory()).await.unwrap()
}

//! Accounts service: CLI server
//!
//! Headless user accounts API suitable for deployment as a systemd
//! service, Docker container, or standalone process.
//!
//! ```sh
//! # Run with default config (~/.config/accounts-service/config.toml)
//! accounts-service
//!
//! # Custom config path
//! accounts-service --config /etc/accounts-service/config.toml
//!
//! # Override port and environment
//! accounts-service --port 8080 --env development
//!
//! # Validate config without starting
//! accounts-service --check
//! ```

use std::path::PathBuf;

use clap::Parser;
use tracing::{error, info};

use accounts_api::config::{AppConfig, Environment};
use accounts_api::server::{init_tracing, ServerHandle, ServerOptions};

/// Accounts service: user registration, login and administration.
#[derive(Parser, Debug)]
#[command(
    name = "accounts-service",
    version,
    about = "User accounts REST API",
    long_about = "Accounts service: REST API for user registration, JWT login \
                  and role-based user management.\n\n\
                  Default config: ~/.config/accounts-service/config.toml"
)]
struct Cli {
    /// Path to the configuration file (TOML).
    #[arg(short, long, env = "ACCOUNTS_CONFIG")]
    config: Option<PathBuf>,

    /// Override the REST API listen port.
    #[arg(short, long)]
    port: Option<u16>,

    /// Override the log level (trace, debug, info, warn, error).
    #[arg(short, long)]
    log_level: Option<String>,

    /// Override the runtime environment (development, production, test).
    #[arg(short, long)]
    env: Option<Environment>,

    /// Validate the configuration file and exit without starting the server.
    #[arg(long)]
    check: bool,

    /// Skip database migrations on startup.
    #[arg(long)]
    no_migrate: bool,

    /// Skip creating the default admin user.
    #[arg(long)]
    no_admin: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // ── Load configuration ─────────────────────────────────────
    let config_path = cli.config.unwrap_or_else(accounts_api::default_config_path);

    let mut config = match AppConfig::load(&config_path) {
        Ok(cfg) => cfg,
        Err(e) => {
            // Fallback tracing init
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config from {}: {}", config_path.display(), e);
            return Err(e.into());
        }
    };

    // ── Apply CLI overrides ────────────────────────────────────
    if let Some(ref level) = cli.log_level {
        config.logging.level = level.clone();
    }
    init_tracing(&config);
    info!("Configuration loaded from {}", config_path.display());

    if let Some(port) = cli.port {
        info!("CLI override: port = {}", port);
        config.server.port = port;
    }
    if let Some(env) = cli.env {
        info!("CLI override: environment = {}", env);
        config.environment = env;
    }

    // ── Config validation mode ─────────────────────────────────
    if cli.check {
        println!("Configuration is valid");
        println!("   Config file : {}", config_path.display());
        println!("   Environment : {}", config.environment);
        println!("   API address : {}", config.server.address());
        println!("   Database    : {}", config.database.url);
        println!("   Log level   : {}", config.logging.level);
        return Ok(());
    }

    // ── Start server ───────────────────────────────────────────
    let mut options = ServerOptions::new(config);
    options.auto_migrate &= !cli.no_migrate;
    options.create_default_admin &= !cli.no_admin;
    let handle = ServerHandle::start(options).await?;

    // Install OS signal handlers (SIGTERM, SIGINT)
    handle.install_signal_handler();

    info!("Press Ctrl+C to shutdown gracefully.");

    // Wait for shutdown signal, then clean up
    handle.shutdown_signal().wait().await;
    handle.wait().await;

    Ok(())
}

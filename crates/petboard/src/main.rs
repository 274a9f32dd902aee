//! Petboard - pet listing board with role-gated REST API

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::Path;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod bootstrap;
mod config;

use config::{Config, LogFormat};
use petboard_api::{AppState, create_router};
use petboard_auth::{AuthConfig, PasswordHasher, TokenIssuer};
use petboard_db::Database;

/// Petboard - pet listing board
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "PETBOARD_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "PETBOARD_PORT")]
    port: Option<u16>,

    /// Access token signing secret
    #[arg(long, env = "ACCESS_TOKEN_SECRET", hide_env_values = true)]
    access_token_secret: Option<String>,

    /// Refresh token signing secret
    #[arg(long, env = "REFRESH_TOKEN_SECRET", hide_env_values = true)]
    refresh_token_secret: Option<String>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Secrets may come from a .env file; load it before clap reads the env
    dotenv::dotenv().ok();

    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level, config.logging.format);

    info!("Starting Petboard v{}", env!("CARGO_PKG_VERSION"));

    // Token configuration; a missing secret is fatal
    let auth_config = AuthConfig::new(
        args.access_token_secret,
        args.refresh_token_secret,
        config.auth.access_token_ttl_secs,
        config.auth.refresh_token_ttl_secs,
    )?;

    // Initialize metrics
    let metrics_handle = PrometheusBuilder::new().install_recorder()?;

    // Create data directory
    if let Some(parent) = Path::new(&config.database.path).parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_path = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_path).await?;

    let hasher = Arc::new(PasswordHasher::new(&config.auth.hashing)?);
    let tokens = Arc::new(TokenIssuer::new(&auth_config));

    // Create the configured admin on first start
    bootstrap::ensure_admin(&db, &hasher, config.auth.bootstrap_admin.as_ref()).await?;

    // Create application state
    let state = AppState::new(db, hasher, tokens);

    // Create router
    let app = create_router(state, Some(Arc::new(metrics_handle)))
        .layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str, format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Pretty => registry.with(fmt::layer()).init(),
        LogFormat::Json => registry.with(fmt::layer().json()).init(),
    }
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}

//! Studio booking server
//!
//! REST API for booking time in a single-room studio.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use sqlx::postgres::PgPoolOptions;
use tokio::sync::Notify;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use studio_booking::{
    api,
    config::AppConfig,
    metrics::Metrics,
    repository::Repository,
    scheduling::{CalendarRules, SystemClock},
    services::Services,
    AppState,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| format!("studio_booking={},tower_http=info", config.logging.level).into());

    let registry = tracing_subscriber::registry().with(filter);
    if config.logging.format == "json" {
        registry.with(tracing_subscriber::fmt::layer().json()).init();
    } else {
        registry.with(tracing_subscriber::fmt::layer()).init();
    }

    tracing::info!("Starting studio booking server v{}", env!("CARGO_PKG_VERSION"));

    // Compile calendar rules; a bad rule set must stop startup
    let rules = CalendarRules::compile(&config.rules).context("Invalid calendar rules")?;
    tracing::info!(
        timezone = %rules.timezone(),
        booking_window_days = rules.booking_window_days(),
        "Calendar rules compiled"
    );

    // Create database connection pool
    let pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .min_connections(config.database.min_connections)
        .acquire_timeout(Duration::from_secs(config.database.acquire_timeout_secs))
        .connect(&config.database.url)
        .await
        .context("Failed to connect to database")?;

    tracing::info!("Connected to database");

    // Run migrations
    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;

    tracing::info!("Database migrations completed");

    // Save server settings before moving config
    let server_host = config.server.host.clone();
    let server_port = config.server.port;
    let shutdown_timeout = Duration::from_secs(config.server.shutdown_timeout_secs);

    // Create repository and services
    let repository = Repository::new(pool);
    let services = Services::new(Arc::new(repository.bookings.clone()), rules, Arc::new(SystemClock));
    let metrics = Metrics::new().context("Failed to register metrics")?;

    // Create application state
    let state = AppState {
        config: Arc::new(config),
        services: Arc::new(services),
        metrics,
    };

    // Build router
    let app = api::router(state);

    // Start server
    let addr = SocketAddr::new(
        server_host.parse().context("Invalid host address")?,
        server_port,
    );

    tracing::info!("Server listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let stopping = Arc::new(Notify::new());
    let server = axum::serve(listener, app).with_graceful_shutdown(shutdown_signal(stopping.clone()));

    tokio::select! {
        result = server => result?,
        _ = async {
            stopping.notified().await;
            tokio::time::sleep(shutdown_timeout).await;
        } => {
            tracing::warn!("In-flight requests did not finish within {:?}, exiting", shutdown_timeout);
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal(stopping: Arc<Notify>) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, draining connections");
    stopping.notify_one();
}

//! Contact API - contact form endpoint
//!
//! Accepts contact-form submissions, stores them in PostgreSQL and lets an
//! operator list messages and update their status. Authentication for the
//! operator routes is expected to be provided by a gateway in front of this
//! service.

mod config;
mod db;
mod error;
mod models;
mod routes;
mod state;
mod store;

use crate::config::{LogFormat, Settings, StorageBackend};
use crate::db::PgContactStore;
use crate::routes::create_router;
use crate::state::AppState;
use crate::store::{ContactStore, MemoryContactStore};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (reads .env as well)
    let settings = Settings::load()?;

    // Initialize tracing subscriber for structured logging
    init_tracing(settings.log_format);

    info!("🚀 Starting Contact API...");
    info!("📋 Configuration loaded successfully");

    let store: Arc<dyn ContactStore> = match settings.storage {
        StorageBackend::Postgres => {
            let pool = db::init_pool(&settings.database).await?;
            info!("✅ Database pool created successfully");

            // Create tables if they don't exist
            if let Err(e) = db::ensure_schema(&pool).await {
                warn!("⚠️  Warning creating tables: {}", e);
            }

            Arc::new(PgContactStore::new(pool))
        }
        StorageBackend::Memory => {
            warn!("⚠️  STORAGE_BACKEND=memory, messages will be lost on restart");
            Arc::new(MemoryContactStore::new())
        }
    };
    let state = Arc::new(AppState::new(store));

    // Build the router
    let app = create_router(state, &settings);

    // Create socket address
    let addr = SocketAddr::from((settings.server.host, settings.server.port));

    info!("🌐 Server listening on http://{}", addr);
    info!("📚 API Endpoints:");
    info!("   POST /api/contact            - Submit the contact form");
    info!("   GET  /api/contact/messages   - List the latest messages");
    info!("   PUT  /api/contact/{{id}}       - Update a message status");
    info!("   GET  /health                 - Health check");

    // Create TCP listener and serve
    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("👋 Server shutdown complete");
    Ok(())
}

/// Initialize tracing with structured logging
fn init_tracing(format: LogFormat) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,contact_api=debug,tower_http=debug"));

    let registry = tracing_subscriber::registry().with(env_filter);

    match format {
        LogFormat::Json => registry
            .with(fmt::layer().json().with_target(true).with_current_span(true))
            .init(),
        LogFormat::Compact => registry
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_level(true)
                    .with_thread_ids(true)
                    .with_file(true)
                    .with_line_number(true)
                    .compact(),
            )
            .init(),
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("📴 Received Ctrl+C signal, initiating graceful shutdown...");
        },
        _ = terminate => {
            info!("📴 Received terminate signal, initiating graceful shutdown...");
        },
    }
}

//! Database connection management
//!
//! Builds the connection pool, bootstraps the `contact_messages` table and
//! exposes the PostgreSQL [`ContactStore`](crate::store::ContactStore).

pub mod queries;
mod service;

pub use service::PgContactStore;

use crate::config::DatabaseConfig;
use crate::store::StoreError;
use deadpool_postgres::{Config, ManagerConfig, Pool, PoolConfig, RecyclingMethod, Runtime};
use tokio_postgres::NoTls;
use tracing::{info, warn};

/// Create a connection pool and verify that the database answers
pub async fn init_pool(config: &DatabaseConfig) -> anyhow::Result<Pool> {
    let pool = create_pool(config)?;

    let client = pool
        .get()
        .await
        .map_err(|e| anyhow::anyhow!("Failed to get pool connection: {}", e))?;
    client
        .query_one("SELECT 1 as ok", &[])
        .await
        .map_err(|e| anyhow::anyhow!("Failed to verify database connection: {}", e))?;

    info!(
        "✅ Database connection successful ({}:{}/{}, TLS: {})",
        config.host, config.port, config.database, config.require_tls
    );
    Ok(pool)
}

fn create_pool(config: &DatabaseConfig) -> anyhow::Result<Pool> {
    let mut cfg = Config::new();
    cfg.host = Some(config.host.clone());
    cfg.port = Some(config.port);
    cfg.user = Some(config.user.clone());
    cfg.password = Some(config.password.clone());
    cfg.dbname = Some(config.database.clone());
    cfg.manager = Some(ManagerConfig {
        recycling_method: RecyclingMethod::Fast,
    });
    cfg.pool = Some(PoolConfig::new(config.max_pool_size));

    let pool = if config.require_tls {
        let certs = rustls_native_certs::load_native_certs();
        for e in &certs.errors {
            warn!("Skipping unreadable native certificate: {}", e);
        }
        let mut root_store = rustls::RootCertStore::empty();
        for cert in certs.certs {
            root_store.add(cert).ok();
        }

        let tls_config = rustls::ClientConfig::builder()
            .with_root_certificates(root_store)
            .with_no_client_auth();

        let tls = tokio_postgres_rustls::MakeRustlsConnect::new(tls_config);
        cfg.create_pool(Some(Runtime::Tokio1), tls)
            .map_err(|e| anyhow::anyhow!("Failed to create TLS pool: {}", e))?
    } else {
        cfg.create_pool(Some(Runtime::Tokio1), NoTls)
            .map_err(|e| anyhow::anyhow!("Failed to create pool: {}", e))?
    };

    Ok(pool)
}

/// Create the table and its indexes if they don't exist
pub async fn ensure_schema(pool: &Pool) -> Result<(), StoreError> {
    let client = pool.get().await?;

    client.execute(queries::CREATE_CONTACT_MESSAGES, &[]).await?;
    for statement in queries::CREATE_INDEXES {
        client.execute(statement, &[]).await?;
    }

    info!("✅ contact_messages table ready");
    Ok(())
}

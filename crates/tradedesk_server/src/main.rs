//! tradedesk_server: REST server for the order desk.
//!
//! See [`tradedesk_server::config`] for the environment variables it reads.

use anyhow::Context;
use tokio::net::TcpListener;
use tradedesk_core::{memory::MemoryStore, seeds, Services};
use tradedesk_postgres::{mask_database_url, PgStores};
use tradedesk_server::config::{ServerConfig, StorageBackend};
use tradedesk_server::router::build_router;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tradedesk_server=debug,tower_http=debug".into()),
        )
        .init();

    let config = ServerConfig::from_env().context("invalid server configuration")?;

    let stores = match config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            MemoryStore::new().into_stores()
        }
        StorageBackend::Postgres => {
            let pool = tradedesk_postgres::connect(&config.database)
                .await
                .with_context(|| {
                    format!(
                        "failed to connect to {}",
                        mask_database_url(&config.database.database_url)
                    )
                })?;
            if config.run_migrations {
                tradedesk_postgres::run_migrations(&pool)
                    .await
                    .context("failed to apply migrations")?;
            }
            PgStores::new(pool).into_stores()
        }
    };

    if config.seed_data {
        seeds::seed_if_empty(&stores)
            .await
            .context("failed to seed demo data")?;
    }

    let app = build_router(Services::new(&stores));

    let listener = TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind to {}", config.bind_addr))?;
    tracing::info!(
        "tradedesk_server listening on {} ({} storage)",
        config.bind_addr,
        config.storage.as_ref()
    );

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}

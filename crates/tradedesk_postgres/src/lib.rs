//! Postgres adapters for the tradedesk_core ports.
//!
//! Each store wraps a shared `PgPool`. Queries are built at runtime with
//! `sqlx::query_as` / `QueryBuilder`, so the crate compiles without a live
//! database.

use std::sync::Arc;
use std::time::Duration;

use sqlx::postgres::{PgPool, PgPoolOptions};
use tracing::{info, warn};
use tradedesk_core::{Stores, TradeError};

mod customer;
mod customer_order;
mod orders;
mod product;
mod rows;
mod search;
mod supplier;
mod supplier_order;

pub use customer::PgCustomerStore;
pub use customer_order::PgCustomerOrderStore;
pub use product::PgProductStore;
pub use supplier::PgSupplierStore;
pub use supplier_order::PgSupplierOrderStore;

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub database_url: String,
    pub max_connections: u32,
    pub connection_timeout: Duration,
    pub idle_timeout: Option<Duration>,
    pub max_lifetime: Option<Duration>,
}

pub const DEFAULT_DATABASE_URL: &str = "postgresql:///tradedesk";
pub const DEFAULT_POOL_SIZE: u32 = 10;

impl DatabaseConfig {
    /// Standard timeouts around the given URL and pool size.
    pub fn new(database_url: impl Into<String>, max_connections: u32) -> Self {
        Self {
            database_url: database_url.into(),
            max_connections,
            connection_timeout: Duration::from_secs(30),
            idle_timeout: Some(Duration::from_secs(600)),
            max_lifetime: Some(Duration::from_secs(1800)),
        }
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(
            std::env::var("DATABASE_URL").unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
            std::env::var("DATABASE_POOL_SIZE")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_POOL_SIZE),
        )
    }
}

/// Open a pool and prove it with a round trip.
pub async fn connect(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    info!(
        "Connecting to database: {}",
        mask_database_url(&config.database_url)
    );

    let pool = PgPoolOptions::new()
        .max_connections(config.max_connections)
        .acquire_timeout(config.connection_timeout)
        .idle_timeout(config.idle_timeout)
        .max_lifetime(config.max_lifetime)
        .connect(&config.database_url)
        .await
        .map_err(|e| {
            warn!("Database connection failed: {}", e);
            e
        })?;

    sqlx::query("SELECT 1").execute(&pool).await?;
    info!(
        "Database connection established ({} max connections)",
        config.max_connections
    );
    Ok(pool)
}

/// Apply the bundled schema migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied");
    Ok(())
}

/// Mask the password in a connection URL for logging.
pub fn mask_database_url(url: &str) -> String {
    if let Ok(mut parsed) = url::Url::parse(url) {
        if parsed.password().is_some() {
            let _ = parsed.set_password(Some("***"));
        }
        parsed.to_string()
    } else {
        "invalid-url".to_string()
    }
}

/// All five Postgres stores over one pool.
#[derive(Clone)]
pub struct PgStores {
    pool: PgPool,
}

impl PgStores {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub fn into_stores(self) -> Stores {
        Stores {
            customers: Arc::new(PgCustomerStore::new(self.pool.clone())),
            suppliers: Arc::new(PgSupplierStore::new(self.pool.clone())),
            products: Arc::new(PgProductStore::new(self.pool.clone())),
            customer_orders: Arc::new(PgCustomerOrderStore::new(self.pool.clone())),
            supplier_orders: Arc::new(PgSupplierOrderStore::new(self.pool)),
        }
    }
}

// ── Error mapping ─────────────────────────────────────────────

const UNIQUE_VIOLATION: &str = "23505";
const FOREIGN_KEY_VIOLATION: &str = "23503";
const PRODUCT_CODE_INDEX: &str = "ux_products_code";

/// Map a driver error onto the domain error.
///
/// A duplicate product code becomes a field error on `code`; a foreign key
/// violation (restrict on delete, dangling reference on write) a conflict.
pub(crate) fn db_err(e: sqlx::Error) -> TradeError {
    if let sqlx::Error::Database(db) = &e {
        match db.code().as_deref() {
            Some(UNIQUE_VIOLATION) if db.constraint() == Some(PRODUCT_CODE_INDEX) => {
                return TradeError::validation("code", "Product code already exists.");
            }
            Some(FOREIGN_KEY_VIOLATION) => {
                return TradeError::Conflict(db.message().to_string());
            }
            _ => {}
        }
    }
    TradeError::Internal(e.into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_password() {
        let masked = mask_database_url("postgresql://app:secret@db:5432/tradedesk");
        assert!(!masked.contains("secret"));
        assert!(masked.contains("***"));
        assert!(masked.contains("db:5432/tradedesk"));
    }

    #[test]
    fn url_without_password_unchanged() {
        assert_eq!(
            mask_database_url("postgresql://db/tradedesk"),
            "postgresql://db/tradedesk"
        );
        assert_eq!(mask_database_url("not a url"), "invalid-url");
    }

    #[test]
    fn non_database_errors_are_internal() {
        let err = db_err(sqlx::Error::RowNotFound);
        assert_eq!(err.http_status(), 500);
    }
}

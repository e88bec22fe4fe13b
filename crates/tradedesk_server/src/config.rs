//! Server configuration from environment variables.
//!
//!   DATABASE_URL        Postgres connection string
//!   DATABASE_POOL_SIZE  pool size (default: 10)
//!   BIND_ADDR           listen address (default: 0.0.0.0:3000)
//!   STORAGE             `postgres` or `memory` (default: postgres)
//!   SEED_DATA           seed demo data into an empty store (default: true)
//!   RUN_MIGRATIONS      apply migrations on startup (default: true)

use std::str::FromStr;

use anyhow::{anyhow, Result};
use tradedesk_postgres::{DatabaseConfig, DEFAULT_DATABASE_URL, DEFAULT_POOL_SIZE};

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::AsRefStr)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Postgres,
    Memory,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_addr: String,
    pub storage: StorageBackend,
    pub seed_data: bool,
    pub run_migrations: bool,
    pub database: DatabaseConfig,
}

impl ServerConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; `from_env` passes the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let storage = match lookup("STORAGE") {
            Some(raw) => StorageBackend::from_str(raw.trim())
                .map_err(|_| anyhow!("STORAGE must be 'postgres' or 'memory', got '{raw}'"))?,
            None => StorageBackend::Postgres,
        };

        let database_url =
            lookup("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let pool_size = match lookup("DATABASE_POOL_SIZE") {
            Some(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|n| *n > 0)
                .ok_or_else(|| {
                    anyhow!("DATABASE_POOL_SIZE must be a positive integer, got '{raw}'")
                })?,
            None => DEFAULT_POOL_SIZE,
        };
        let database = DatabaseConfig::new(database_url, pool_size);

        Ok(Self {
            bind_addr: lookup("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            storage,
            seed_data: flag(&lookup, "SEED_DATA", true)?,
            run_migrations: flag(&lookup, "RUN_MIGRATIONS", true)?,
            database,
        })
    }
}

fn flag(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: bool) -> Result<bool> {
    let Some(raw) = lookup(key) else {
        return Ok(default);
    };
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(anyhow!("{key} must be true or false, got '{raw}'")),
    }
}

//! tradedesk REST server.
//!
//! Exposes customers, suppliers, products and both order kinds over JSON,
//! backed by either Postgres or the in-memory store.

pub mod config;
pub mod error;
pub mod forms;
pub mod handlers;
pub mod router;
pub mod views;

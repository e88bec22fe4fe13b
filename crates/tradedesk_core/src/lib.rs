//! tradedesk core: entities, read models, repository ports and the
//! business-rule services for customers, suppliers, products and orders.
//!
//! Nothing here talks to a database. Storage is reached through the port
//! traits in [`ports`], implemented by [`memory::MemoryStore`] and by the
//! `tradedesk_postgres` crate.

pub mod dto;
pub mod error;
pub mod memory;
pub mod ports;
pub mod query;
pub mod reconcile;
pub mod seeds;
pub mod service;
pub mod types;
pub mod validate;

pub use error::{FieldError, TradeError, ValidationErrors};
pub use ports::Stores;
pub use service::Services;

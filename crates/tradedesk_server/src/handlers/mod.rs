//! Route handlers, one module per entity.
//!
//! Every entity follows the same shape: index, details, create (form and
//! submit), edit (form and submit), delete (confirmation and execute).

use tradedesk_core::TradeError;
use uuid::Uuid;

use crate::error::AppError;

pub mod customer_orders;
pub mod customers;
pub mod health;
pub mod products;
pub mod supplier_orders;
pub mod suppliers;

/// A nil id in the path is a malformed request, not a missing record.
pub(crate) fn require_id(id: Uuid) -> Result<Uuid, AppError> {
    if id.is_nil() {
        return Err(AppError::bad_request("id is required"));
    }
    Ok(id)
}

/// Absent record as a 404.
pub(crate) fn found<T>(value: Option<T>, what: &str, id: Uuid) -> Result<T, AppError> {
    value.ok_or_else(|| AppError(TradeError::NotFound(format!("{what} {id}"))))
}

//! Persisted entities.
//!
//! These are the write models stored by the port implementations. Read
//! models with joined names and derived totals live in [`crate::dto`].

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::TradeError;

// ── Parties ───────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Customer {
    pub customer_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Supplier {
    pub supplier_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

// ── Products ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub product_id: Uuid,
    /// Globally unique.
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub supplier_id: Uuid,
}

impl Product {
    /// Name used in user-facing messages; falls back to the code.
    pub fn display_name(&self) -> &str {
        match self.name.as_deref() {
            Some(n) if !n.is_empty() => n,
            _ => &self.code,
        }
    }
}

// ── Order status ──────────────────────────────────────────────

/// Lifecycle of a customer order. Persisted as `SMALLINT`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::AsRefStr,
)]
pub enum CustomerOrderStatus {
    #[default]
    Pending,
    Confirmed,
    Shipped,
    Cancelled,
}

impl CustomerOrderStatus {
    pub fn code(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Confirmed => 1,
            Self::Shipped => 2,
            Self::Cancelled => -1,
        }
    }

    pub const ALL: [Self; 4] = [Self::Pending, Self::Confirmed, Self::Shipped, Self::Cancelled];
}

impl TryFrom<i16> for CustomerOrderStatus {
    type Error = TradeError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Confirmed),
            2 => Ok(Self::Shipped),
            -1 => Ok(Self::Cancelled),
            other => Err(TradeError::InvalidInput(format!(
                "unknown customer order status code {other}"
            ))),
        }
    }
}

/// Lifecycle of a supplier order. Persisted as `SMALLINT`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, strum::AsRefStr,
)]
pub enum SupplierOrderStatus {
    #[default]
    Pending,
    Confirmed,
    Received,
    Cancelled,
}

impl SupplierOrderStatus {
    pub fn code(self) -> i16 {
        match self {
            Self::Pending => 0,
            Self::Confirmed => 1,
            Self::Received => 2,
            Self::Cancelled => -1,
        }
    }

    pub const ALL: [Self; 4] = [Self::Pending, Self::Confirmed, Self::Received, Self::Cancelled];
}

impl TryFrom<i16> for SupplierOrderStatus {
    type Error = TradeError;

    fn try_from(code: i16) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Confirmed),
            2 => Ok(Self::Received),
            -1 => Ok(Self::Cancelled),
            other => Err(TradeError::InvalidInput(format!(
                "unknown supplier order status code {other}"
            ))),
        }
    }
}

// ── Orders ────────────────────────────────────────────────────

/// Order header. Items are stored separately and passed alongside.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub customer_id: Uuid,
    pub notes: Option<String>,
    pub status: CustomerOrderStatus,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SupplierOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub supplier_id: Uuid,
    pub notes: Option<String>,
    pub status: SupplierOrderStatus,
}

/// Line item shared by both order kinds; the owning order id is implied by
/// the store call it is passed to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItem {
    pub item_id: Uuid,
    pub item_number: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl OrderItem {
    pub fn line_total(&self) -> Decimal {
        Decimal::from(self.quantity) * self.unit_price
    }
}

//! Row shapes returned by the queries, and their conversion to core types.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tradedesk_core::dto::{OrderItemDto, ProductDto};
use tradedesk_core::types::{Customer, Product, Supplier};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct PartyRow {
    pub id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

impl From<PartyRow> for Customer {
    fn from(r: PartyRow) -> Self {
        Self {
            customer_id: r.id,
            name: r.name,
            phone_number: r.phone_number,
            email: r.email,
            address: r.address,
            contact_person: r.contact_person,
        }
    }
}

impl From<PartyRow> for Supplier {
    fn from(r: PartyRow) -> Self {
        Self {
            supplier_id: r.id,
            name: r.name,
            phone_number: r.phone_number,
            email: r.email,
            address: r.address,
            contact_person: r.contact_person,
        }
    }
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductRow {
    pub product_id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub supplier_id: Uuid,
}

impl From<ProductRow> for Product {
    fn from(r: ProductRow) -> Self {
        Self {
            product_id: r.product_id,
            code: r.code,
            name: r.name,
            description: r.description,
            supplier_id: r.supplier_id,
        }
    }
}

/// Product joined with its supplier's name.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ProductViewRow {
    pub product_id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub supplier_id: Uuid,
    pub supplier_name: Option<String>,
}

impl From<ProductViewRow> for ProductDto {
    fn from(r: ProductViewRow) -> Self {
        Self {
            product_id: r.product_id,
            code: r.code,
            name: r.name,
            description: r.description,
            supplier_id: r.supplier_id,
            supplier_name: r.supplier_name,
        }
    }
}

/// Order header with party name and item total; same shape for both kinds.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct OrderRow {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub party_id: Uuid,
    pub party_name: Option<String>,
    pub notes: Option<String>,
    pub status: i16,
    pub total: Decimal,
}

#[derive(Debug, sqlx::FromRow)]
pub(crate) struct ItemRow {
    pub item_id: Uuid,
    pub item_number: i32,
    pub product_id: Uuid,
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
}

impl From<ItemRow> for OrderItemDto {
    fn from(r: ItemRow) -> Self {
        Self {
            item_id: r.item_id,
            item_number: r.item_number,
            product_id: r.product_id,
            product_code: r.product_code,
            product_name: r.product_name,
            quantity: r.quantity,
            unit_price: r.unit_price,
            line_total: Decimal::from(r.quantity) * r.unit_price,
        }
    }
}

//! Read models and input forms.
//!
//! `*Dto` types are what the services hand out (joined names, derived
//! totals). `Create*` / `Update*` types are what the services accept.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{
    Customer, CustomerOrderStatus, OrderItem, Product, Supplier, SupplierOrderStatus,
};

// ── Customers ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub customer_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    #[serde(default)]
    pub orders: Vec<CustomerOrderDto>,
}

impl From<Customer> for CustomerDto {
    fn from(c: Customer) -> Self {
        Self {
            customer_id: c.customer_id,
            name: c.name,
            phone_number: c.phone_number,
            email: c.email,
            address: c.address,
            contact_person: c.contact_person,
            orders: Vec::new(),
        }
    }
}

impl CustomerDto {
    pub fn to_update(&self) -> UpdateCustomer {
        UpdateCustomer {
            customer_id: self.customer_id,
            name: self.name.clone(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            contact_person: self.contact_person.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateCustomer {
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateCustomer {
    pub customer_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

// ── Suppliers ─────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierDto {
    pub supplier_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
    #[serde(default)]
    pub orders: Vec<SupplierOrderDto>,
    #[serde(default)]
    pub products: Vec<ProductDto>,
}

impl From<Supplier> for SupplierDto {
    fn from(s: Supplier) -> Self {
        Self {
            supplier_id: s.supplier_id,
            name: s.name,
            phone_number: s.phone_number,
            email: s.email,
            address: s.address,
            contact_person: s.contact_person,
            orders: Vec::new(),
            products: Vec::new(),
        }
    }
}

impl SupplierDto {
    pub fn to_update(&self) -> UpdateSupplier {
        UpdateSupplier {
            supplier_id: self.supplier_id,
            name: self.name.clone(),
            phone_number: self.phone_number.clone(),
            email: self.email.clone(),
            address: self.address.clone(),
            contact_person: self.contact_person.clone(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateSupplier {
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSupplier {
    pub supplier_id: Uuid,
    pub name: String,
    pub phone_number: Option<String>,
    pub email: Option<String>,
    pub address: Option<String>,
    pub contact_person: Option<String>,
}

// ── Products ──────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDto {
    pub product_id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub supplier_id: Uuid,
    pub supplier_name: Option<String>,
}

impl ProductDto {
    pub fn from_product(p: Product, supplier_name: Option<String>) -> Self {
        Self {
            product_id: p.product_id,
            code: p.code,
            name: p.name,
            description: p.description,
            supplier_id: p.supplier_id,
            supplier_name,
        }
    }

    pub fn to_update(&self) -> UpdateProduct {
        UpdateProduct {
            product_id: self.product_id,
            code: self.code.clone(),
            name: self.name.clone(),
            description: self.description.clone(),
            supplier_id: self.supplier_id,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateProduct {
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub supplier_id: Uuid,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateProduct {
    pub product_id: Uuid,
    pub code: String,
    pub name: Option<String>,
    pub description: Option<String>,
    pub supplier_id: Uuid,
}

/// Orders that reference a product; shown before a product is deleted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductUsage {
    pub customer_orders: Vec<CustomerOrderDto>,
    pub supplier_orders: Vec<SupplierOrderDto>,
}

impl ProductUsage {
    pub fn in_use(&self) -> bool {
        !self.customer_orders.is_empty() || !self.supplier_orders.is_empty()
    }
}

// ── Order items ───────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderItemDto {
    pub item_id: Uuid,
    pub item_number: i32,
    pub product_id: Uuid,
    pub product_code: Option<String>,
    pub product_name: Option<String>,
    pub quantity: i32,
    pub unit_price: Decimal,
    pub line_total: Decimal,
}

impl OrderItemDto {
    pub fn from_item(item: &OrderItem, product: Option<&Product>) -> Self {
        Self {
            item_id: item.item_id,
            item_number: item.item_number,
            product_id: item.product_id,
            product_code: product.map(|p| p.code.clone()),
            product_name: product.and_then(|p| p.name.clone()),
            quantity: item.quantity,
            unit_price: item.unit_price,
            line_total: item.line_total(),
        }
    }

    pub fn to_input(&self) -> OrderItemInput {
        OrderItemInput {
            item_id: self.item_id,
            item_number: self.item_number,
            product_id: self.product_id,
            quantity: self.quantity,
            unit_price: self.unit_price,
        }
    }
}

/// Incoming line item. A nil `item_id` marks a row added on the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OrderItemInput {
    pub item_id: Uuid,
    pub item_number: i32,
    pub product_id: Uuid,
    pub quantity: i32,
    pub unit_price: Decimal,
}

pub fn order_total(items: &[OrderItemDto]) -> Decimal {
    items.iter().map(|i| i.line_total).sum()
}

// ── Customer orders ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomerOrderDto {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub customer_id: Uuid,
    pub customer_name: Option<String>,
    pub notes: Option<String>,
    pub status: CustomerOrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItemDto>,
    pub total: Decimal,
}

impl CustomerOrderDto {
    pub fn to_update(&self) -> UpdateCustomerOrder {
        UpdateCustomerOrder {
            order_id: self.order_id,
            order_number: self.order_number.clone(),
            order_date: Some(self.order_date),
            customer_id: self.customer_id,
            notes: self.notes.clone(),
            status: self.status,
            items: self.items.iter().map(OrderItemDto::to_input).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateCustomerOrder {
    pub order_number: String,
    /// Today when absent.
    pub order_date: Option<NaiveDate>,
    pub customer_id: Uuid,
    pub notes: Option<String>,
    pub status: CustomerOrderStatus,
    pub items: Vec<OrderItemInput>,
    /// Set when the form was opened from a customer's details page.
    pub from_customer: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateCustomerOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: Option<NaiveDate>,
    pub customer_id: Uuid,
    pub notes: Option<String>,
    pub status: CustomerOrderStatus,
    pub items: Vec<OrderItemInput>,
}

// ── Supplier orders ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SupplierOrderDto {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: NaiveDate,
    pub supplier_id: Uuid,
    pub supplier_name: Option<String>,
    pub notes: Option<String>,
    pub status: SupplierOrderStatus,
    #[serde(default)]
    pub items: Vec<OrderItemDto>,
    pub total: Decimal,
}

impl SupplierOrderDto {
    pub fn to_update(&self) -> UpdateSupplierOrder {
        UpdateSupplierOrder {
            order_id: self.order_id,
            order_number: self.order_number.clone(),
            order_date: Some(self.order_date),
            supplier_id: self.supplier_id,
            notes: self.notes.clone(),
            status: self.status,
            items: self.items.iter().map(OrderItemDto::to_input).collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreateSupplierOrder {
    pub order_number: String,
    pub order_date: Option<NaiveDate>,
    pub supplier_id: Uuid,
    pub notes: Option<String>,
    pub status: SupplierOrderStatus,
    pub items: Vec<OrderItemInput>,
    /// Set when the form was opened from a supplier's details page.
    pub from_supplier: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UpdateSupplierOrder {
    pub order_id: Uuid,
    pub order_number: String,
    pub order_date: Option<NaiveDate>,
    pub supplier_id: Uuid,
    pub notes: Option<String>,
    pub status: SupplierOrderStatus,
    pub items: Vec<OrderItemInput>,
}

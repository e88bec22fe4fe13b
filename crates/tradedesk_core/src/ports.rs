//! Repository port traits.
//!
//! Implemented by [`crate::memory::MemoryStore`] and by the Postgres adapters
//! in `tradedesk_postgres`. Ports do no validation of their own beyond what
//! the storage engine enforces (unique product code, restrict on delete).

use std::sync::Arc;

use async_trait::async_trait;
use uuid::Uuid;

use crate::{
    dto::{CustomerOrderDto, ProductDto, SupplierOrderDto},
    error::TradeError,
    query::{OrderQuery, Page, PartyQuery, ProductQuery},
    reconcile::ItemChangeSet,
    types::*,
};

pub type Result<T> = std::result::Result<T, TradeError>;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Customer>>;
    async fn list_all(&self) -> Result<Vec<Customer>>;
    async fn search(&self, query: &PartyQuery) -> Result<Page<Customer>>;
    async fn insert(&self, customer: &Customer) -> Result<()>;
    /// `false` when no row matched.
    async fn update(&self, customer: &Customer) -> Result<bool>;
    /// `false` when no row matched; `Conflict` when orders still reference it.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait SupplierStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Supplier>>;
    async fn list_all(&self) -> Result<Vec<Supplier>>;
    async fn search(&self, query: &PartyQuery) -> Result<Page<Supplier>>;
    async fn insert(&self, supplier: &Supplier) -> Result<()>;
    async fn update(&self, supplier: &Supplier) -> Result<bool>;
    /// `Conflict` when orders or products still reference it.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait ProductStore: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<Product>>;
    async fn get_by_code(&self, code: &str) -> Result<Option<Product>>;
    /// Unknown ids are skipped.
    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Product>>;
    async fn list_all(&self) -> Result<Vec<ProductDto>>;
    async fn list_by_supplier(&self, supplier_id: Uuid) -> Result<Vec<ProductDto>>;
    async fn search(&self, query: &ProductQuery) -> Result<Page<ProductDto>>;
    /// Exact, case-sensitive code match, optionally ignoring one product.
    async fn code_exists(&self, code: &str, exclude: Option<Uuid>) -> Result<bool>;
    /// A duplicate code surfaces as a `Validation` error on `code`.
    async fn insert(&self, product: &Product) -> Result<()>;
    async fn update(&self, product: &Product) -> Result<bool>;
    /// `Conflict` when order items still reference it.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait CustomerOrderStore: Send + Sync {
    /// Items, when requested, come sorted by item number.
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<CustomerOrderDto>>;
    async fn search(&self, query: &OrderQuery<CustomerOrderStatus>)
        -> Result<Page<CustomerOrderDto>>;
    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<CustomerOrderDto>>;
    async fn list_containing_product(&self, product_id: Uuid) -> Result<Vec<CustomerOrderDto>>;
    async fn insert(&self, order: &CustomerOrder, items: &[OrderItem]) -> Result<()>;
    /// Header update and item change set applied as one unit of work.
    async fn update(&self, order: &CustomerOrder, changes: &ItemChangeSet) -> Result<bool>;
    /// Items go with the order.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

#[async_trait]
pub trait SupplierOrderStore: Send + Sync {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<SupplierOrderDto>>;
    async fn search(&self, query: &OrderQuery<SupplierOrderStatus>)
        -> Result<Page<SupplierOrderDto>>;
    async fn list_for_supplier(&self, supplier_id: Uuid) -> Result<Vec<SupplierOrderDto>>;
    async fn list_containing_product(&self, product_id: Uuid) -> Result<Vec<SupplierOrderDto>>;
    async fn insert(&self, order: &SupplierOrder, items: &[OrderItem]) -> Result<()>;
    async fn update(&self, order: &SupplierOrder, changes: &ItemChangeSet) -> Result<bool>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

/// Every port, ready to hand to [`crate::service::Services::new`].
#[derive(Clone)]
pub struct Stores {
    pub customers: Arc<dyn CustomerStore>,
    pub suppliers: Arc<dyn SupplierStore>,
    pub products: Arc<dyn ProductStore>,
    pub customer_orders: Arc<dyn CustomerOrderStore>,
    pub supplier_orders: Arc<dyn SupplierOrderStore>,
}

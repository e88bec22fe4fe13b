//! Business-rule services.
//!
//! Each service is a trait with a `*ServiceImpl` holding `Arc<dyn …Store>`
//! ports, so the same rules run against Postgres or [`crate::memory::MemoryStore`].

use std::sync::Arc;

use crate::ports::Stores;

pub mod customer;
pub mod customer_order;
pub mod product;
pub mod supplier;
pub mod supplier_order;

pub use customer::{CustomerService, CustomerServiceImpl};
pub use customer_order::{CustomerOrderService, CustomerOrderServiceImpl};
pub use product::{ProductService, ProductServiceImpl};
pub use supplier::{SupplierService, SupplierServiceImpl};
pub use supplier_order::{SupplierOrderService, SupplierOrderServiceImpl};

/// All services, wired over one set of stores.
#[derive(Clone)]
pub struct Services {
    pub customers: Arc<dyn CustomerService>,
    pub suppliers: Arc<dyn SupplierService>,
    pub products: Arc<dyn ProductService>,
    pub customer_orders: Arc<dyn CustomerOrderService>,
    pub supplier_orders: Arc<dyn SupplierOrderService>,
}

impl Services {
    pub fn new(stores: &Stores) -> Self {
        Self {
            customers: Arc::new(CustomerServiceImpl::new(
                Arc::clone(&stores.customers),
                Arc::clone(&stores.customer_orders),
            )),
            suppliers: Arc::new(SupplierServiceImpl::new(
                Arc::clone(&stores.suppliers),
                Arc::clone(&stores.supplier_orders),
                Arc::clone(&stores.products),
            )),
            products: Arc::new(ProductServiceImpl::new(
                Arc::clone(&stores.products),
                Arc::clone(&stores.suppliers),
                Arc::clone(&stores.customer_orders),
                Arc::clone(&stores.supplier_orders),
            )),
            customer_orders: Arc::new(CustomerOrderServiceImpl::new(
                Arc::clone(&stores.customer_orders),
                Arc::clone(&stores.customers),
                Arc::clone(&stores.products),
            )),
            supplier_orders: Arc::new(SupplierOrderServiceImpl::new(
                Arc::clone(&stores.supplier_orders),
                Arc::clone(&stores.suppliers),
                Arc::clone(&stores.products),
            )),
        }
    }
}

/// Existing products among `ids`, keyed by id.
pub(crate) async fn load_products(
    products: &dyn crate::ports::ProductStore,
    ids: &[uuid::Uuid],
) -> crate::ports::Result<std::collections::HashMap<uuid::Uuid, crate::types::Product>> {
    if ids.is_empty() {
        return Ok(Default::default());
    }
    let found = products.get_many(ids).await?;
    Ok(found.into_iter().map(|p| (p.product_id, p)).collect())
}

/// A store-level restrict violation means "not deleted", not failure.
pub(crate) fn blocked_as_false(
    result: crate::ports::Result<bool>,
    what: &str,
    id: uuid::Uuid,
) -> crate::ports::Result<bool> {
    match result {
        Err(crate::error::TradeError::Conflict(msg)) => {
            tracing::warn!("{} {} not deleted: {}", what, id, msg);
            Ok(false)
        }
        other => other,
    }
}

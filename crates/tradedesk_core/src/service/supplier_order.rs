use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{CreateSupplierOrder, OrderItemInput, SupplierOrderDto, UpdateSupplierOrder},
    error::{TradeError, ValidationErrors},
    ports::{ProductStore, Result, SupplierOrderStore, SupplierStore},
    query::{OrderQuery, Page},
    reconcile::reconcile_items,
    types::{SupplierOrder, SupplierOrderStatus},
    validate::{
        distinct_product_ids, normalize_optional, number_items, validate_order_header,
        validate_order_items,
    },
};

#[async_trait]
pub trait SupplierOrderService: Send + Sync {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<SupplierOrderDto>>;
    async fn search(
        &self,
        query: &OrderQuery<SupplierOrderStatus>,
    ) -> Result<Page<SupplierOrderDto>>;
    async fn create(&self, input: CreateSupplierOrder) -> Result<Uuid>;
    async fn update(&self, input: UpdateSupplierOrder) -> Result<bool>;
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct SupplierOrderServiceImpl {
    orders: Arc<dyn SupplierOrderStore>,
    suppliers: Arc<dyn SupplierStore>,
    products: Arc<dyn ProductStore>,
}

impl SupplierOrderServiceImpl {
    pub fn new(
        orders: Arc<dyn SupplierOrderStore>,
        suppliers: Arc<dyn SupplierStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            orders,
            suppliers,
            products,
        }
    }

    /// Like customer orders, plus every product must come from `supplier_id`.
    async fn validate(
        &self,
        errors: &mut ValidationErrors,
        order_number: &str,
        notes: Option<&str>,
        supplier_id: Uuid,
        items: &[OrderItemInput],
    ) -> Result<(String, Option<String>)> {
        let order_number = order_number.trim().to_string();
        let notes = normalize_optional(notes);
        validate_order_header(errors, &order_number, notes.as_deref());

        if supplier_id.is_nil() || self.suppliers.get(supplier_id).await?.is_none() {
            errors.add("supplier_id", "Supplier is required.");
        }

        let products =
            super::load_products(self.products.as_ref(), &distinct_product_ids(items)).await?;
        validate_order_items(errors, items, &products, Some(supplier_id));
        Ok((order_number, notes))
    }
}

#[async_trait]
impl SupplierOrderService for SupplierOrderServiceImpl {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<SupplierOrderDto>> {
        self.orders.get(id, include_items).await
    }

    async fn search(
        &self,
        query: &OrderQuery<SupplierOrderStatus>,
    ) -> Result<Page<SupplierOrderDto>> {
        self.orders.search(query).await
    }

    async fn create(&self, mut input: CreateSupplierOrder) -> Result<Uuid> {
        number_items(&mut input.items);
        let mut errors = ValidationErrors::new();
        let (order_number, notes) = self
            .validate(
                &mut errors,
                &input.order_number,
                input.notes.as_deref(),
                input.supplier_id,
                &input.items,
            )
            .await?;
        errors.into_result()?;

        let order = SupplierOrder {
            order_id: Uuid::new_v4(),
            order_number,
            order_date: input.order_date.unwrap_or_else(|| Utc::now().date_naive()),
            supplier_id: input.supplier_id,
            notes,
            status: input.status,
        };
        let items = reconcile_items(&[], &input.items).inserts;
        self.orders.insert(&order, &items).await?;
        info!(
            "Created supplier order {} ({}) with {} item(s)",
            order.order_id,
            order.order_number,
            items.len()
        );
        Ok(order.order_id)
    }

    async fn update(&self, mut input: UpdateSupplierOrder) -> Result<bool> {
        let Some(existing) = self.orders.get(input.order_id, true).await? else {
            return Err(TradeError::validation("", "Order not found."));
        };

        number_items(&mut input.items);
        let mut errors = ValidationErrors::new();
        let (order_number, notes) = self
            .validate(
                &mut errors,
                &input.order_number,
                input.notes.as_deref(),
                input.supplier_id,
                &input.items,
            )
            .await?;
        errors.into_result()?;

        let order = SupplierOrder {
            order_id: existing.order_id,
            order_number,
            order_date: input.order_date.unwrap_or(existing.order_date),
            supplier_id: input.supplier_id,
            notes,
            status: input.status,
        };
        let existing_ids: Vec<Uuid> = existing.items.iter().map(|i| i.item_id).collect();
        let changes = reconcile_items(&existing_ids, &input.items);

        let updated = self.orders.update(&order, &changes).await?;
        if updated {
            info!(
                "Updated supplier order {}: {} inserted, {} updated, {} deleted",
                order.order_id,
                changes.inserts.len(),
                changes.updates.len(),
                changes.deletes.len()
            );
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let deleted = self.orders.delete(id).await?;
        if deleted {
            info!("Deleted supplier order {}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CreateProduct, CreateSupplier};
    use crate::memory::MemoryStore;
    use crate::query::{OrderField, TextFilter};
    use crate::service::Services;
    use rust_decimal::Decimal;

    async fn supplier_with_product(services: &Services, name: &str, code: &str) -> (Uuid, Uuid) {
        let supplier_id = services
            .suppliers
            .create(CreateSupplier {
                name: name.into(),
                email: Some("sales@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let product_id = services
            .products
            .create(CreateProduct {
                code: code.into(),
                name: Some(format!("{name} widget")),
                supplier_id,
                ..Default::default()
            })
            .await
            .unwrap();
        (supplier_id, product_id)
    }

    fn line(product_id: Uuid) -> OrderItemInput {
        OrderItemInput {
            product_id,
            quantity: 1,
            unit_price: Decimal::new(1999, 2),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn foreign_product_rejected_on_create() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let (mine, _) = supplier_with_product(&services, "Mine", "M-1").await;
        let (_, theirs) = supplier_with_product(&services, "Theirs", "T-1").await;

        let err = services
            .supplier_orders
            .create(CreateSupplierOrder {
                order_number: "SO-1".into(),
                supplier_id: mine,
                items: vec![line(theirs)],
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            TradeError::Validation(v) => {
                let msgs: Vec<_> = v.iter().map(|e| e.message.clone()).collect();
                assert_eq!(
                    msgs,
                    vec!["Product Theirs widget does not belong to the selected supplier."]
                );
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn foreign_product_rejected_on_update() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let (mine, own) = supplier_with_product(&services, "Mine", "M-1").await;
        let (_, theirs) = supplier_with_product(&services, "Theirs", "T-1").await;

        let id = services
            .supplier_orders
            .create(CreateSupplierOrder {
                order_number: "SO-1".into(),
                supplier_id: mine,
                items: vec![line(own)],
                ..Default::default()
            })
            .await
            .unwrap();

        let mut form = services
            .supplier_orders
            .get(id, true)
            .await
            .unwrap()
            .unwrap()
            .to_update();
        form.items.push(line(theirs));
        let err = services.supplier_orders.update(form).await.unwrap_err();
        assert_eq!(err.http_status(), 422);

        let order = services.supplier_orders.get(id, true).await.unwrap().unwrap();
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.items[0].product_id, own);
    }

    #[tokio::test]
    async fn status_and_party_search() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let (a, pa) = supplier_with_product(&services, "Alpha", "A-1").await;
        let (b, pb) = supplier_with_product(&services, "Bravo", "B-1").await;
        for (number, supplier_id, product_id, status) in [
            ("SO-1", a, pa, SupplierOrderStatus::Received),
            ("SO-2", b, pb, SupplierOrderStatus::Pending),
        ] {
            services
                .supplier_orders
                .create(CreateSupplierOrder {
                    order_number: number.into(),
                    supplier_id,
                    status,
                    items: vec![line(product_id)],
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let by_name = OrderQuery::<SupplierOrderStatus> {
            filter: TextFilter {
                term: Some("bravo".into()),
                field: Some(OrderField::Party),
            },
            ..Default::default()
        };
        let page = services.supplier_orders.search(&by_name).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].supplier_name.as_deref(), Some("Bravo"));

        let received = OrderQuery::<SupplierOrderStatus> {
            status: Some(SupplierOrderStatus::Received),
            ..Default::default()
        };
        let page = services.supplier_orders.search(&received).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].supplier_id, a);
        assert_eq!(page.items[0].total, Decimal::new(1999, 2));
    }
}

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::{
    dto::{CreateCustomerOrder, CustomerOrderDto, UpdateCustomerOrder},
    error::{TradeError, ValidationErrors},
    ports::{CustomerOrderStore, CustomerStore, ProductStore, Result},
    query::{OrderQuery, Page},
    reconcile::{reconcile_items, ItemChangeSet},
    types::{CustomerOrder, CustomerOrderStatus, OrderItem},
    validate::{
        distinct_product_ids, normalize_optional, number_items, validate_order_header,
        validate_order_items,
    },
};

#[async_trait]
pub trait CustomerOrderService: Send + Sync {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<CustomerOrderDto>>;
    async fn search(
        &self,
        query: &OrderQuery<CustomerOrderStatus>,
    ) -> Result<Page<CustomerOrderDto>>;
    async fn create(&self, input: CreateCustomerOrder) -> Result<Uuid>;
    /// Header and items are replaced together; see [`reconcile_items`].
    async fn update(&self, input: UpdateCustomerOrder) -> Result<bool>;
    /// `Ok(false)` when the order does not exist.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct CustomerOrderServiceImpl {
    orders: Arc<dyn CustomerOrderStore>,
    customers: Arc<dyn CustomerStore>,
    products: Arc<dyn ProductStore>,
}

impl CustomerOrderServiceImpl {
    pub fn new(
        orders: Arc<dyn CustomerOrderStore>,
        customers: Arc<dyn CustomerStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            orders,
            customers,
            products,
        }
    }

    /// Shared create/update checks. Returns the normalised header fields.
    async fn validate(
        &self,
        errors: &mut ValidationErrors,
        order_number: &str,
        notes: Option<&str>,
        customer_id: Uuid,
        items: &[crate::dto::OrderItemInput],
    ) -> Result<(String, Option<String>)> {
        let order_number = order_number.trim().to_string();
        let notes = normalize_optional(notes);
        validate_order_header(errors, &order_number, notes.as_deref());

        if customer_id.is_nil() || self.customers.get(customer_id).await?.is_none() {
            errors.add("customer_id", "Customer is required.");
        }

        let products =
            super::load_products(self.products.as_ref(), &distinct_product_ids(items)).await?;
        validate_order_items(errors, items, &products, None);
        Ok((order_number, notes))
    }
}

#[async_trait]
impl CustomerOrderService for CustomerOrderServiceImpl {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<CustomerOrderDto>> {
        self.orders.get(id, include_items).await
    }

    async fn search(
        &self,
        query: &OrderQuery<CustomerOrderStatus>,
    ) -> Result<Page<CustomerOrderDto>> {
        self.orders.search(query).await
    }

    async fn create(&self, mut input: CreateCustomerOrder) -> Result<Uuid> {
        number_items(&mut input.items);
        let mut errors = ValidationErrors::new();
        let (order_number, notes) = self
            .validate(
                &mut errors,
                &input.order_number,
                input.notes.as_deref(),
                input.customer_id,
                &input.items,
            )
            .await?;
        errors.into_result()?;

        let order = CustomerOrder {
            order_id: Uuid::new_v4(),
            order_number,
            order_date: input.order_date.unwrap_or_else(|| Utc::now().date_naive()),
            customer_id: input.customer_id,
            notes,
            status: input.status,
        };
        let items: Vec<OrderItem> = reconcile_items(&[], &input.items).inserts;
        self.orders.insert(&order, &items).await?;
        info!(
            "Created customer order {} ({}) with {} item(s)",
            order.order_id,
            order.order_number,
            items.len()
        );
        Ok(order.order_id)
    }

    async fn update(&self, mut input: UpdateCustomerOrder) -> Result<bool> {
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
                input.customer_id,
                &input.items,
            )
            .await?;
        errors.into_result()?;

        let order = CustomerOrder {
            order_id: existing.order_id,
            order_number,
            order_date: input.order_date.unwrap_or(existing.order_date),
            customer_id: input.customer_id,
            notes,
            status: input.status,
        };
        let existing_ids: Vec<Uuid> = existing.items.iter().map(|i| i.item_id).collect();
        let changes: ItemChangeSet = reconcile_items(&existing_ids, &input.items);

        let updated = self.orders.update(&order, &changes).await?;
        if updated {
            info!(
                "Updated customer order {}: {} inserted, {} updated, {} deleted",
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
            info!("Deleted customer order {}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CreateCustomer, CreateProduct, CreateSupplier, OrderItemInput};
    use crate::memory::MemoryStore;
    use crate::query::{OrderListParams, PageRequest};
    use crate::service::Services;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    struct Fixture {
        services: Services,
        customer_id: Uuid,
        products: Vec<Uuid>,
    }

    async fn fixture() -> Fixture {
        let services = Services::new(&MemoryStore::default().into_stores());
        let customer_id = services
            .customers
            .create(CreateCustomer {
                name: "Acme".into(),
                email: Some("acme@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let supplier_id = services
            .suppliers
            .create(CreateSupplier {
                name: "Parts Co".into(),
                email: Some("parts@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let mut products = Vec::new();
        for (code, name) in [("P-1", "Anvil"), ("P-2", "Bolt"), ("P-3", "Chain")] {
            products.push(
                services
                    .products
                    .create(CreateProduct {
                        code: code.into(),
                        name: Some(name.into()),
                        supplier_id,
                        ..Default::default()
                    })
                    .await
                    .unwrap(),
            );
        }
        Fixture {
            services,
            customer_id,
            products,
        }
    }

    fn line(product_id: Uuid, quantity: i32, cents: i64) -> OrderItemInput {
        OrderItemInput {
            product_id,
            quantity,
            unit_price: Decimal::new(cents, 2),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_numbers_items_and_totals() {
        let f = fixture().await;
        let id = f
            .services
            .customer_orders
            .create(CreateCustomerOrder {
                order_number: " CO-1 ".into(),
                customer_id: f.customer_id,
                items: vec![line(f.products[0], 2, 250), line(f.products[1], 1, 1000)],
                ..Default::default()
            })
            .await
            .unwrap();

        let order = f.services.customer_orders.get(id, true).await.unwrap().unwrap();
        assert_eq!(order.order_number, "CO-1");
        assert_eq!(order.status, CustomerOrderStatus::Pending);
        assert_eq!(order.customer_name.as_deref(), Some("Acme"));
        let numbers: Vec<_> = order.items.iter().map(|i| i.item_number).collect();
        assert_eq!(numbers, vec![1, 2]);
        assert_eq!(order.items[0].product_name.as_deref(), Some("Anvil"));
        assert_eq!(order.total, Decimal::new(1500, 2));
    }

    #[tokio::test]
    async fn duplicate_product_fails_validation() {
        let f = fixture().await;
        let err = f
            .services
            .customer_orders
            .create(CreateCustomerOrder {
                order_number: "CO-1".into(),
                customer_id: f.customer_id,
                items: vec![line(f.products[0], 1, 100), line(f.products[0], 2, 100)],
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            TradeError::Validation(v) => {
                let msgs: Vec<_> = v.iter().map(|e| e.message.clone()).collect();
                assert_eq!(msgs, vec!["Duplicate products: Anvil"]);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_customer_and_number_accumulate() {
        let f = fixture().await;
        let err = f
            .services
            .customer_orders
            .create(CreateCustomerOrder {
                order_number: "  ".into(),
                customer_id: Uuid::nil(),
                items: vec![line(f.products[0], 0, 100)],
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            TradeError::Validation(v) => {
                assert!(v.has_field("order_number"));
                assert!(v.has_field("customer_id"));
                assert!(v.has_field("quantity"));
                assert_eq!(v.len(), 3);
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_reconciles_items() {
        let f = fixture().await;
        let id = f
            .services
            .customer_orders
            .create(CreateCustomerOrder {
                order_number: "CO-1".into(),
                customer_id: f.customer_id,
                items: vec![line(f.products[0], 1, 100), line(f.products[1], 1, 200)],
                ..Default::default()
            })
            .await
            .unwrap();

        let before = f.services.customer_orders.get(id, true).await.unwrap().unwrap();
        let kept_id = before.items[0].item_id;
        let dropped_id = before.items[1].item_id;

        let mut form = before.to_update();
        form.items.remove(1);
        form.items[0].quantity = 5;
        form.items[0].unit_price = Decimal::new(150, 2);
        form.items.push(line(f.products[2], 3, 300));
        form.status = CustomerOrderStatus::Shipped;
        assert!(f.services.customer_orders.update(form).await.unwrap());

        let after = f.services.customer_orders.get(id, true).await.unwrap().unwrap();
        assert_eq!(after.items.len(), 2);
        assert_eq!(after.status, CustomerOrderStatus::Shipped);

        let kept = after.items.iter().find(|i| i.item_id == kept_id).unwrap();
        assert_eq!(kept.quantity, 5);
        assert_eq!(kept.unit_price, Decimal::new(150, 2));
        assert!(after.items.iter().all(|i| i.item_id != dropped_id));

        let added = after.items.iter().find(|i| i.item_id != kept_id).unwrap();
        assert_eq!(added.product_id, f.products[2]);
        assert_eq!(added.quantity, 3);
        assert_eq!(after.total, Decimal::new(1650, 2));
    }

    #[tokio::test]
    async fn update_with_duplicate_product_fails() {
        let f = fixture().await;
        let id = f
            .services
            .customer_orders
            .create(CreateCustomerOrder {
                order_number: "CO-1".into(),
                customer_id: f.customer_id,
                items: vec![line(f.products[0], 1, 100)],
                ..Default::default()
            })
            .await
            .unwrap();
        let mut form = f
            .services
            .customer_orders
            .get(id, true)
            .await
            .unwrap()
            .unwrap()
            .to_update();
        form.items.push(line(f.products[0], 4, 100));
        let err = f.services.customer_orders.update(form).await.unwrap_err();
        assert_eq!(err.http_status(), 422);

        let unchanged = f.services.customer_orders.get(id, true).await.unwrap().unwrap();
        assert_eq!(unchanged.items.len(), 1);
    }

    #[tokio::test]
    async fn update_missing_order_is_validation_error() {
        let f = fixture().await;
        let err = f
            .services
            .customer_orders
            .update(UpdateCustomerOrder {
                order_id: Uuid::new_v4(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            TradeError::Validation(v) => {
                assert_eq!(v.iter().next().map(|e| e.message.as_str()), Some("Order not found."));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_removes_order_and_unknown_is_false() {
        let f = fixture().await;
        let id = f
            .services
            .customer_orders
            .create(CreateCustomerOrder {
                order_number: "CO-1".into(),
                customer_id: f.customer_id,
                items: vec![line(f.products[0], 1, 100)],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(f.services.customer_orders.delete(id).await.unwrap());
        assert!(!f.services.customer_orders.delete(id).await.unwrap());
        assert!(f.services.customers.delete(f.customer_id).await.unwrap());
    }

    #[tokio::test]
    async fn default_sort_is_newest_first_and_page_two() {
        let f = fixture().await;
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for n in 0..45 {
            f.services
                .customer_orders
                .create(CreateCustomerOrder {
                    order_number: format!("CO-{:04}", n),
                    order_date: Some(start + chrono::Days::new(n)),
                    customer_id: f.customer_id,
                    items: vec![line(f.products[0], 1, 100)],
                    ..Default::default()
                })
                .await
                .unwrap();
        }

        let first = f
            .services
            .customer_orders
            .search(&OrderQuery::default())
            .await
            .unwrap();
        assert_eq!(first.items[0].order_number, "CO-0044");
        assert_eq!(first.total_count, 45);

        let params: OrderListParams<CustomerOrderStatus> = OrderListParams {
            sort_by: Some("ordernumber".into()),
            page: Some(2),
            page_size: Some(20),
            ..Default::default()
        };
        let page = f
            .services
            .customer_orders
            .search(&params.order_query())
            .await
            .unwrap();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0].order_number, "CO-0020");
        assert_eq!(page.items[19].order_number, "CO-0039");
        assert_eq!(page.total_pages, 3);

        let ranged = OrderQuery::<CustomerOrderStatus> {
            from: Some(start + chrono::Days::new(10)),
            to: Some(start + chrono::Days::new(14)),
            page: PageRequest::new(1, 100),
            ..Default::default()
        };
        let page = f.services.customer_orders.search(&ranged).await.unwrap();
        assert_eq!(page.total_count, 5);
    }
}

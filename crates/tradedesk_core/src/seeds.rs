//! Demo data for an empty database.

use chrono::{Days, Utc};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use tracing::info;
use uuid::Uuid;

use crate::ports::{Result, Stores};
use crate::types::*;

pub const SEED_SUPPLIERS: usize = 25;
pub const SEED_CUSTOMERS: usize = 25;
pub const SEED_PRODUCTS: usize = 100;
pub const SEED_ORDERS: usize = 25;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SeedReport {
    pub suppliers: usize,
    pub customers: usize,
    pub products: usize,
    pub supplier_orders: usize,
    pub customer_orders: usize,
}

/// Seed only when no supplier exists. Returns `None` when skipped.
pub async fn seed_if_empty(stores: &Stores) -> Result<Option<SeedReport>> {
    if !stores.suppliers.list_all().await?.is_empty() {
        info!("Seed skipped: suppliers already present");
        return Ok(None);
    }
    let mut rng = StdRng::from_entropy();
    let report = seed_with(stores, &mut rng).await?;
    info!(
        "Seeded {} suppliers, {} customers, {} products, {} supplier orders, {} customer orders",
        report.suppliers,
        report.customers,
        report.products,
        report.supplier_orders,
        report.customer_orders
    );
    Ok(Some(report))
}

/// Unconditional seeding with a caller-provided generator.
pub async fn seed_with(stores: &Stores, rng: &mut StdRng) -> Result<SeedReport> {
    let mut report = SeedReport::default();
    let today = Utc::now().date_naive();

    let mut suppliers = Vec::with_capacity(SEED_SUPPLIERS);
    for i in 1..=SEED_SUPPLIERS {
        let s = Supplier {
            supplier_id: Uuid::new_v4(),
            name: format!("Supplier {i}"),
            phone_number: Some(format!("+1-555-01{i:02}000")),
            email: Some(format!("supplier{i}@example.com")),
            address: Some(format!("{} Supplier St, City {i}", 100 + i)),
            contact_person: Some(format!("Supplier Contact {i}")),
        };
        stores.suppliers.insert(&s).await?;
        suppliers.push(s);
    }
    report.suppliers = suppliers.len();

    let mut customers = Vec::with_capacity(SEED_CUSTOMERS);
    for i in 1..=SEED_CUSTOMERS {
        let c = Customer {
            customer_id: Uuid::new_v4(),
            name: format!("Customer {i}"),
            phone_number: Some(format!("+1-555-02{i:02}000")),
            email: Some(format!("customer{i}@example.com")),
            address: Some(format!("{} Customer Ave, City {i}", 200 + i)),
            contact_person: Some(format!("Customer Contact {i}")),
        };
        stores.customers.insert(&c).await?;
        customers.push(c);
    }
    report.customers = customers.len();

    let mut products = Vec::with_capacity(SEED_PRODUCTS);
    for i in 1..=SEED_PRODUCTS {
        let supplier = &suppliers[rng.gen_range(0..suppliers.len())];
        let p = Product {
            product_id: Uuid::new_v4(),
            code: format!("P-{}", 1000 + i),
            name: Some(format!("Product {i}")),
            description: Some(format!("Sample description for Product {i}.")),
            supplier_id: supplier.supplier_id,
        };
        stores.products.insert(&p).await?;
        products.push(p);
    }
    report.products = products.len();

    for i in 1..=SEED_ORDERS {
        let supplier = &suppliers[rng.gen_range(0..suppliers.len())];
        let own: Vec<&Product> = products
            .iter()
            .filter(|p| p.supplier_id == supplier.supplier_id)
            .collect();
        // A supplier that drew no products gets no order.
        if own.is_empty() {
            continue;
        }
        let count = rng.gen_range(5..=10).min(own.len());
        let items = random_items(rng, &own, count, 50..500);
        let order = SupplierOrder {
            order_id: Uuid::new_v4(),
            order_number: format!("SO-{}", 1000 + i),
            order_date: today - Days::new(rng.gen_range(0..100)),
            supplier_id: supplier.supplier_id,
            notes: Some(format!("Notes for supplier order {i}.")),
            status: SupplierOrderStatus::Confirmed,
        };
        stores.supplier_orders.insert(&order, &items).await?;
        report.supplier_orders += 1;
    }

    let all: Vec<&Product> = products.iter().collect();
    for i in 1..=SEED_ORDERS {
        let customer = &customers[rng.gen_range(0..customers.len())];
        let count = rng.gen_range(5..=10);
        let items = random_items(rng, &all, count, 1..50);
        let order = CustomerOrder {
            order_id: Uuid::new_v4(),
            order_number: format!("CO-{}", 1000 + i),
            order_date: today - Days::new(rng.gen_range(0..100)),
            customer_id: customer.customer_id,
            notes: Some(format!("Notes for customer order {i}.")),
            status: CustomerOrderStatus::Confirmed,
        };
        stores.customer_orders.insert(&order, &items).await?;
        report.customer_orders += 1;
    }

    Ok(report)
}

/// `count` items over distinct products, numbered from 1, priced 1.00..=99.99.
fn random_items(
    rng: &mut StdRng,
    pool: &[&Product],
    count: usize,
    quantity: std::ops::Range<i32>,
) -> Vec<OrderItem> {
    let picked: Vec<Uuid> = pool
        .choose_multiple(rng, count)
        .map(|p| p.product_id)
        .collect();
    picked
        .into_iter()
        .enumerate()
        .map(|(n, product_id)| OrderItem {
            item_id: Uuid::new_v4(),
            item_number: i32::try_from(n + 1).unwrap_or(i32::MAX),
            product_id,
            quantity: rng.gen_range(quantity.clone()),
            unit_price: Decimal::new(rng.gen_range(100..10_000), 2),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::memory::MemoryStore;
    use crate::query::{OrderQuery, PageRequest};
    use std::collections::HashSet;

    #[tokio::test]
    async fn seeds_once() {
        let stores = MemoryStore::new().into_stores();
        let report = seed_if_empty(&stores).await.unwrap().unwrap();
        assert_eq!(report.suppliers, SEED_SUPPLIERS);
        assert_eq!(report.customers, SEED_CUSTOMERS);
        assert_eq!(report.products, SEED_PRODUCTS);
        assert_eq!(report.customer_orders, SEED_ORDERS);
        assert!(report.supplier_orders <= SEED_ORDERS);

        assert!(seed_if_empty(&stores).await.unwrap().is_none());
        assert_eq!(stores.suppliers.list_all().await.unwrap().len(), SEED_SUPPLIERS);
    }

    #[tokio::test]
    async fn seeded_orders_are_valid() {
        let stores = MemoryStore::new().into_stores();
        let mut rng = StdRng::seed_from_u64(7);
        seed_with(&stores, &mut rng).await.unwrap();

        let query = OrderQuery::<SupplierOrderStatus> {
            page: PageRequest::new(1, 100),
            ..Default::default()
        };
        let page = stores.supplier_orders.search(&query).await.unwrap();
        for summary in page.items {
            let order = stores
                .supplier_orders
                .get(summary.order_id, true)
                .await
                .unwrap()
                .unwrap();
            assert_eq!(order.status, SupplierOrderStatus::Confirmed);
            let distinct: HashSet<_> = order.items.iter().map(|i| i.product_id).collect();
            assert_eq!(distinct.len(), order.items.len());
            for item in &order.items {
                let product = stores.products.get(item.product_id).await.unwrap().unwrap();
                assert_eq!(product.supplier_id, order.supplier_id);
                assert!(item.unit_price > Decimal::ZERO);
                assert!(item.quantity >= 50);
            }
        }

        let customer_orders = stores
            .customer_orders
            .search(&OrderQuery::default())
            .await
            .unwrap();
        assert_eq!(customer_orders.total_count, SEED_ORDERS as i64);
        assert!(customer_orders.items.iter().all(|o| o.total > Decimal::ZERO));
    }
}

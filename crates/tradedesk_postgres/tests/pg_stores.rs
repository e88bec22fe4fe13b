//! Store tests against a live database.
//!
//! Run with: DATABASE_URL=postgresql:///tradedesk_test cargo test -p tradedesk_postgres -- --ignored

use chrono::NaiveDate;
use rust_decimal::Decimal;
use tradedesk_core::{
    dto::OrderItemInput,
    query::{OrderQuery, PageRequest, PartyQuery, SortSpec, TextFilter},
    reconcile::reconcile_items,
    types::*,
    Stores, TradeError,
};
use tradedesk_postgres::{connect, run_migrations, DatabaseConfig, PgStores};
use uuid::Uuid;

async fn stores() -> Stores {
    let config = DatabaseConfig::default();
    let pool = connect(&config).await.unwrap();
    run_migrations(&pool).await.unwrap();
    PgStores::new(pool).into_stores()
}

fn unique(prefix: &str) -> String {
    format!("{prefix}-{}", &Uuid::new_v4().simple().to_string()[..8])
}

async fn supplier(stores: &Stores, name: &str) -> Supplier {
    let s = Supplier {
        supplier_id: Uuid::new_v4(),
        name: name.to_string(),
        phone_number: None,
        email: Some("orders@example.com".into()),
        address: None,
        contact_person: None,
    };
    stores.suppliers.insert(&s).await.unwrap();
    s
}

async fn product(stores: &Stores, supplier_id: Uuid) -> Product {
    let p = Product {
        product_id: Uuid::new_v4(),
        code: unique("P"),
        name: Some("Widget".into()),
        description: None,
        supplier_id,
    };
    stores.products.insert(&p).await.unwrap();
    p
}

fn item(n: i32, product_id: Uuid, quantity: i32, cents: i64) -> OrderItem {
    OrderItem {
        item_id: Uuid::new_v4(),
        item_number: n,
        product_id,
        quantity,
        unit_price: Decimal::new(cents, 2),
    }
}

#[tokio::test]
#[ignore]
async fn duplicate_product_code_is_field_error() {
    let stores = stores().await;
    let s = supplier(&stores, &unique("Supplier")).await;
    let p = product(&stores, s.supplier_id).await;

    let dup = Product {
        product_id: Uuid::new_v4(),
        ..p.clone()
    };
    match stores.products.insert(&dup).await {
        Err(TradeError::Validation(v)) => assert!(v.has_field("code")),
        other => panic!("unexpected: {other:?}"),
    }
    assert!(stores.products.code_exists(&p.code, None).await.unwrap());
    assert!(!stores
        .products
        .code_exists(&p.code, Some(p.product_id))
        .await
        .unwrap());
}

#[tokio::test]
#[ignore]
async fn supplier_delete_restricted_by_products() {
    let stores = stores().await;
    let s = supplier(&stores, &unique("Supplier")).await;
    let p = product(&stores, s.supplier_id).await;

    let err = stores.suppliers.delete(s.supplier_id).await.unwrap_err();
    assert_eq!(err.http_status(), 409);

    assert!(stores.products.delete(p.product_id).await.unwrap());
    assert!(stores.suppliers.delete(s.supplier_id).await.unwrap());
    assert!(!stores.suppliers.delete(s.supplier_id).await.unwrap());
}

#[tokio::test]
#[ignore]
async fn party_search_escapes_wildcards() {
    let stores = stores().await;
    let tag = unique("pct");
    let plain = Customer {
        customer_id: Uuid::new_v4(),
        name: format!("{tag} plain"),
        phone_number: None,
        email: Some("a@example.com".into()),
        address: None,
        contact_person: None,
    };
    let literal = Customer {
        customer_id: Uuid::new_v4(),
        name: format!("{tag} 100% done"),
        ..plain.clone()
    };
    stores.customers.insert(&plain).await.unwrap();
    stores.customers.insert(&literal).await.unwrap();

    let term = format!("{tag} 100%");
    let query = PartyQuery {
        filter: TextFilter::parse(Some(term.as_str()), Some("name")),
        sort: SortSpec::default(),
        page: PageRequest::default(),
    };
    let page = stores.customers.search(&query).await.unwrap();
    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].customer_id, literal.customer_id);
}

#[tokio::test]
#[ignore]
async fn order_update_applies_change_set_atomically() {
    let stores = stores().await;
    let s = supplier(&stores, &unique("Supplier")).await;
    let a = product(&stores, s.supplier_id).await;
    let b = product(&stores, s.supplier_id).await;
    let c = product(&stores, s.supplier_id).await;

    let order = SupplierOrder {
        order_id: Uuid::new_v4(),
        order_number: unique("SO"),
        order_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
        supplier_id: s.supplier_id,
        notes: None,
        status: SupplierOrderStatus::Pending,
    };
    let first = item(1, a.product_id, 2, 1000);
    let second = item(2, b.product_id, 1, 550);
    stores
        .supplier_orders
        .insert(&order, &[first.clone(), second.clone()])
        .await
        .unwrap();

    let stored = stores
        .supplier_orders
        .get(order.order_id, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(stored.total, Decimal::new(2550, 2));
    assert_eq!(stored.supplier_name.as_deref(), Some(s.name.as_str()));

    // Keep the first row with a new quantity, drop the second, add a third.
    let incoming = vec![
        OrderItemInput {
            quantity: 3,
            ..stored.items[0].to_input()
        },
        OrderItemInput {
            item_number: 2,
            product_id: c.product_id,
            quantity: 1,
            unit_price: Decimal::new(100, 2),
            ..Default::default()
        },
    ];
    let existing: Vec<Uuid> = stored.items.iter().map(|i| i.item_id).collect();
    let changes = reconcile_items(&existing, &incoming);
    let updated = SupplierOrder {
        status: SupplierOrderStatus::Received,
        ..order.clone()
    };
    assert!(stores
        .supplier_orders
        .update(&updated, &changes)
        .await
        .unwrap());

    let after = stores
        .supplier_orders
        .get(order.order_id, true)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.status, SupplierOrderStatus::Received);
    assert_eq!(after.items.len(), 2);
    assert_eq!(after.items[0].item_id, first.item_id);
    assert_eq!(after.items[0].quantity, 3);
    assert_eq!(after.items[1].product_id, c.product_id);
    assert_eq!(after.total, Decimal::new(3100, 2));

    // A product referenced by an order cannot go.
    let err = stores.products.delete(a.product_id).await.unwrap_err();
    assert_eq!(err.http_status(), 409);

    let found = stores
        .supplier_orders
        .search(&OrderQuery {
            party_id: Some(s.supplier_id),
            status: Some(SupplierOrderStatus::Received),
            ..Default::default()
        })
        .await
        .unwrap();
    assert_eq!(found.total_count, 1);

    assert!(stores.supplier_orders.delete(order.order_id).await.unwrap());
    assert!(stores.products.delete(a.product_id).await.unwrap());
}

//! SQL shared by customer and supplier orders.
//!
//! The two kinds have identical layouts and differ only in table and party
//! column names, captured by [`OrderTables`]. The per-kind stores convert
//! [`OrderRow`] into their own read model.

use chrono::NaiveDate;
use sqlx::{PgConnection, PgPool, Postgres, QueryBuilder};
use tradedesk_core::{
    dto::OrderItemDto,
    ports::Result,
    query::{OrderField, OrderQuery, OrderSort, Page},
    reconcile::ItemChangeSet,
    types::OrderItem,
};
use uuid::Uuid;

use crate::db_err;
use crate::rows::{ItemRow, OrderRow};
use crate::search::{push_order_by, push_page, push_text_filter, SortKind};

pub(crate) struct OrderTables {
    pub orders: &'static str,
    pub items: &'static str,
    pub parties: &'static str,
    pub party_column: &'static str,
}

pub(crate) const CUSTOMER_ORDERS: OrderTables = OrderTables {
    orders: "customer_orders",
    items: "customer_order_items",
    parties: "customers",
    party_column: "customer_id",
};

pub(crate) const SUPPLIER_ORDERS: OrderTables = OrderTables {
    orders: "supplier_orders",
    items: "supplier_order_items",
    parties: "suppliers",
    party_column: "supplier_id",
};

/// Header values written by insert and update.
pub(crate) struct OrderHeader<'a> {
    pub order_id: Uuid,
    pub order_number: &'a str,
    pub order_date: NaiveDate,
    pub party_id: Uuid,
    pub notes: Option<&'a str>,
    pub status: i16,
}

impl OrderTables {
    fn from_clause(&self) -> String {
        format!(
            "FROM {orders} o LEFT JOIN {parties} p ON p.{party} = o.{party} WHERE TRUE",
            orders = self.orders,
            parties = self.parties,
            party = self.party_column,
        )
    }

    fn select_head(&self) -> String {
        format!(
            "SELECT o.order_id, o.order_number, o.order_date, o.{party} AS party_id, \
             p.name AS party_name, o.notes, o.status, \
             COALESCE((SELECT SUM(i.quantity * i.unit_price) FROM {items} i \
                       WHERE i.order_id = o.order_id), 0) AS total {from}",
            party = self.party_column,
            items = self.items,
            from = self.from_clause(),
        )
    }

    fn push_filters<S>(
        &self,
        qb: &mut QueryBuilder<'_, Postgres>,
        query: &OrderQuery<S>,
        status: Option<i16>,
    ) {
        if let Some(party_id) = query.party_id {
            qb.push(format!(" AND o.{} = ", self.party_column))
                .push_bind(party_id);
        }
        if let Some(code) = status {
            qb.push(" AND o.status = ").push_bind(code);
        }
        if let Some(from) = query.from {
            qb.push(" AND o.order_date >= ").push_bind(from);
        }
        if let Some(to) = query.to {
            qb.push(" AND o.order_date <= ").push_bind(to);
        }
        let columns: Vec<&'static str> = [
            (OrderField::OrderNumber, "o.order_number"),
            (OrderField::Notes, "o.notes"),
            (OrderField::Party, "p.name"),
        ]
        .into_iter()
        .filter(|(f, _)| query.filter.applies_to(*f))
        .map(|(_, col)| col)
        .collect();
        push_text_filter(qb, query.filter.term.as_deref(), &columns);
    }
}

fn sort_column(sort: OrderSort) -> (&'static str, SortKind) {
    match sort {
        OrderSort::OrderNumber => ("o.order_number", SortKind::Text),
        OrderSort::OrderDate => ("o.order_date", SortKind::Plain),
        OrderSort::Party => ("p.name", SortKind::Text),
        OrderSort::Notes => ("o.notes", SortKind::Text),
        OrderSort::Status => ("o.status", SortKind::Plain),
    }
}

// ── Reads ─────────────────────────────────────────────────────

pub(crate) async fn get(pool: &PgPool, t: &OrderTables, id: Uuid) -> Result<Option<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(&format!("{} AND o.order_id = $1", t.select_head()))
        .bind(id)
        .fetch_optional(pool)
        .await
        .map_err(db_err)
}

/// Items joined with product code and name, by item number.
pub(crate) async fn items(
    pool: &PgPool,
    t: &OrderTables,
    order_id: Uuid,
) -> Result<Vec<OrderItemDto>> {
    let rows = sqlx::query_as::<_, ItemRow>(&format!(
        r#"SELECT i.item_id, i.item_number, i.product_id,
                  pr.code AS product_code, pr.name AS product_name,
                  i.quantity, i.unit_price
           FROM {} i
           LEFT JOIN products pr ON pr.product_id = i.product_id
           WHERE i.order_id = $1
           ORDER BY i.item_number, i.item_id"#,
        t.items
    ))
    .bind(order_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)?;
    Ok(rows.into_iter().map(OrderItemDto::from).collect())
}

pub(crate) async fn search<S>(
    pool: &PgPool,
    t: &OrderTables,
    query: &OrderQuery<S>,
    status: Option<i16>,
) -> Result<Page<OrderRow>> {
    let mut count = QueryBuilder::new(format!("SELECT COUNT(*) {}", t.from_clause()));
    t.push_filters(&mut count, query, status);
    let total: i64 = count
        .build_query_scalar()
        .fetch_one(pool)
        .await
        .map_err(db_err)?;

    let mut select = QueryBuilder::new(t.select_head());
    t.push_filters(&mut select, query, status);
    let (column, descending) = query.sort.resolve(OrderSort::OrderDate, true);
    let (column, kind) = sort_column(column);
    push_order_by(&mut select, column, kind, descending, "o.order_id");
    push_page(&mut select, query.page);
    let rows: Vec<OrderRow> = select
        .build_query_as()
        .fetch_all(pool)
        .await
        .map_err(db_err)?;

    Ok(Page::new(rows, total, query.page))
}

/// Newest first.
pub(crate) async fn list_for_party(
    pool: &PgPool,
    t: &OrderTables,
    party_id: Uuid,
) -> Result<Vec<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(&format!(
        "{} AND o.{} = $1 ORDER BY o.order_date DESC, o.order_id",
        t.select_head(),
        t.party_column
    ))
    .bind(party_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)
}

pub(crate) async fn list_containing_product(
    pool: &PgPool,
    t: &OrderTables,
    product_id: Uuid,
) -> Result<Vec<OrderRow>> {
    sqlx::query_as::<_, OrderRow>(&format!(
        "{} AND EXISTS (SELECT 1 FROM {} x WHERE x.order_id = o.order_id AND x.product_id = $1) \
         ORDER BY o.order_date DESC, o.order_id",
        t.select_head(),
        t.items
    ))
    .bind(product_id)
    .fetch_all(pool)
    .await
    .map_err(db_err)
}

// ── Writes ────────────────────────────────────────────────────

async fn insert_items(
    conn: &mut PgConnection,
    t: &OrderTables,
    order_id: Uuid,
    items: &[OrderItem],
) -> Result<()> {
    if items.is_empty() {
        return Ok(());
    }
    let mut qb = QueryBuilder::<Postgres>::new(format!(
        "INSERT INTO {} (item_id, order_id, item_number, product_id, quantity, unit_price) ",
        t.items
    ));
    qb.push_values(items, |mut b, item| {
        b.push_bind(item.item_id)
            .push_bind(order_id)
            .push_bind(item.item_number)
            .push_bind(item.product_id)
            .push_bind(item.quantity)
            .push_bind(item.unit_price);
    });
    qb.build().execute(&mut *conn).await.map_err(db_err)?;
    Ok(())
}

/// Header and items in one transaction.
pub(crate) async fn insert(
    pool: &PgPool,
    t: &OrderTables,
    header: &OrderHeader<'_>,
    items: &[OrderItem],
) -> Result<()> {
    let mut tx = pool.begin().await.map_err(db_err)?;
    sqlx::query(&format!(
        "INSERT INTO {} (order_id, order_number, order_date, {}, notes, status) \
         VALUES ($1, $2, $3, $4, $5, $6)",
        t.orders, t.party_column
    ))
    .bind(header.order_id)
    .bind(header.order_number)
    .bind(header.order_date)
    .bind(header.party_id)
    .bind(header.notes)
    .bind(header.status)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;
    insert_items(&mut *tx, t, header.order_id, items).await?;
    tx.commit().await.map_err(db_err)?;
    Ok(())
}

/// Header update plus item deletes, updates and inserts; all or nothing.
pub(crate) async fn update(
    pool: &PgPool,
    t: &OrderTables,
    header: &OrderHeader<'_>,
    changes: &ItemChangeSet,
) -> Result<bool> {
    let mut tx = pool.begin().await.map_err(db_err)?;
    let result = sqlx::query(&format!(
        "UPDATE {} SET order_number = $2, order_date = $3, {} = $4, notes = $5, status = $6 \
         WHERE order_id = $1",
        t.orders, t.party_column
    ))
    .bind(header.order_id)
    .bind(header.order_number)
    .bind(header.order_date)
    .bind(header.party_id)
    .bind(header.notes)
    .bind(header.status)
    .execute(&mut *tx)
    .await
    .map_err(db_err)?;
    if result.rows_affected() == 0 {
        return Ok(false);
    }

    if !changes.deletes.is_empty() {
        sqlx::query(&format!(
            "DELETE FROM {} WHERE order_id = $1 AND item_id = ANY($2)",
            t.items
        ))
        .bind(header.order_id)
        .bind(changes.deletes.as_slice())
        .execute(&mut *tx)
        .await
        .map_err(db_err)?;
    }

    let update_item = format!(
        "UPDATE {} SET item_number = $3, product_id = $4, quantity = $5, unit_price = $6 \
         WHERE item_id = $1 AND order_id = $2",
        t.items
    );
    for item in &changes.updates {
        sqlx::query(&update_item)
            .bind(item.item_id)
            .bind(header.order_id)
            .bind(item.item_number)
            .bind(item.product_id)
            .bind(item.quantity)
            .bind(item.unit_price)
            .execute(&mut *tx)
            .await
            .map_err(db_err)?;
    }

    insert_items(&mut *tx, t, header.order_id, &changes.inserts).await?;
    tx.commit().await.map_err(db_err)?;
    Ok(true)
}

/// Items cascade with the header.
pub(crate) async fn delete(pool: &PgPool, t: &OrderTables, id: Uuid) -> Result<bool> {
    let result = sqlx::query(&format!("DELETE FROM {} WHERE order_id = $1", t.orders))
        .bind(id)
        .execute(pool)
        .await
        .map_err(db_err)?;
    Ok(result.rows_affected() > 0)
}

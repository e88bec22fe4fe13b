use async_trait::async_trait;
use sqlx::PgPool;
use tradedesk_core::{
    dto::{SupplierOrderDto, OrderItemDto},
    ports::{SupplierOrderStore, Result},
    query::{OrderQuery, Page},
    reconcile::ItemChangeSet,
    types::{SupplierOrder, SupplierOrderStatus, OrderItem},
};
use uuid::Uuid;

use crate::orders::{self, OrderHeader, SUPPLIER_ORDERS};
use crate::rows::OrderRow;

fn to_dto(row: OrderRow, items: Vec<OrderItemDto>) -> Result<SupplierOrderDto> {
    Ok(SupplierOrderDto {
        order_id: row.order_id,
        order_number: row.order_number,
        order_date: row.order_date,
        supplier_id: row.party_id,
        supplier_name: row.party_name,
        notes: row.notes,
        status: SupplierOrderStatus::try_from(row.status)?,
        items,
        total: row.total,
    })
}

fn to_dtos(rows: Vec<OrderRow>) -> Result<Vec<SupplierOrderDto>> {
    rows.into_iter().map(|r| to_dto(r, Vec::new())).collect()
}

fn header(order: &SupplierOrder) -> OrderHeader<'_> {
    OrderHeader {
        order_id: order.order_id,
        order_number: &order.order_number,
        order_date: order.order_date,
        party_id: order.supplier_id,
        notes: order.notes.as_deref(),
        status: order.status.code(),
    }
}

pub struct PgSupplierOrderStore {
    pool: PgPool,
}

impl PgSupplierOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupplierOrderStore for PgSupplierOrderStore {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<SupplierOrderDto>> {
        let Some(row) = orders::get(&self.pool, &SUPPLIER_ORDERS, id).await? else {
            return Ok(None);
        };
        let items = if include_items {
            orders::items(&self.pool, &SUPPLIER_ORDERS, id).await?
        } else {
            Vec::new()
        };
        to_dto(row, items).map(Some)
    }

    async fn search(
        &self,
        query: &OrderQuery<SupplierOrderStatus>,
    ) -> Result<Page<SupplierOrderDto>> {
        let status = query.status.map(SupplierOrderStatus::code);
        let page = orders::search(&self.pool, &SUPPLIER_ORDERS, query, status).await?;
        let items = to_dtos(page.items)?;
        Ok(Page {
            items,
            total_count: page.total_count,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        })
    }

    async fn list_for_supplier(&self, supplier_id: Uuid) -> Result<Vec<SupplierOrderDto>> {
        to_dtos(orders::list_for_party(&self.pool, &SUPPLIER_ORDERS, supplier_id).await?)
    }

    async fn list_containing_product(&self, product_id: Uuid) -> Result<Vec<SupplierOrderDto>> {
        to_dtos(orders::list_containing_product(&self.pool, &SUPPLIER_ORDERS, product_id).await?)
    }

    async fn insert(&self, order: &SupplierOrder, items: &[OrderItem]) -> Result<()> {
        orders::insert(&self.pool, &SUPPLIER_ORDERS, &header(order), items).await
    }

    async fn update(&self, order: &SupplierOrder, changes: &ItemChangeSet) -> Result<bool> {
        orders::update(&self.pool, &SUPPLIER_ORDERS, &header(order), changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        orders::delete(&self.pool, &SUPPLIER_ORDERS, id).await
    }
}

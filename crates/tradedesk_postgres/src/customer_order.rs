use async_trait::async_trait;
use sqlx::PgPool;
use tradedesk_core::{
    dto::{CustomerOrderDto, OrderItemDto},
    ports::{CustomerOrderStore, Result},
    query::{OrderQuery, Page},
    reconcile::ItemChangeSet,
    types::{CustomerOrder, CustomerOrderStatus, OrderItem},
};
use uuid::Uuid;

use crate::orders::{self, OrderHeader, CUSTOMER_ORDERS};
use crate::rows::OrderRow;

fn to_dto(row: OrderRow, items: Vec<OrderItemDto>) -> Result<CustomerOrderDto> {
    Ok(CustomerOrderDto {
        order_id: row.order_id,
        order_number: row.order_number,
        order_date: row.order_date,
        customer_id: row.party_id,
        customer_name: row.party_name,
        notes: row.notes,
        status: CustomerOrderStatus::try_from(row.status)?,
        items,
        total: row.total,
    })
}

fn to_dtos(rows: Vec<OrderRow>) -> Result<Vec<CustomerOrderDto>> {
    rows.into_iter().map(|r| to_dto(r, Vec::new())).collect()
}

fn header(order: &CustomerOrder) -> OrderHeader<'_> {
    OrderHeader {
        order_id: order.order_id,
        order_number: &order.order_number,
        order_date: order.order_date,
        party_id: order.customer_id,
        notes: order.notes.as_deref(),
        status: order.status.code(),
    }
}

pub struct PgCustomerOrderStore {
    pool: PgPool,
}

impl PgCustomerOrderStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerOrderStore for PgCustomerOrderStore {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<CustomerOrderDto>> {
        let Some(row) = orders::get(&self.pool, &CUSTOMER_ORDERS, id).await? else {
            return Ok(None);
        };
        let items = if include_items {
            orders::items(&self.pool, &CUSTOMER_ORDERS, id).await?
        } else {
            Vec::new()
        };
        to_dto(row, items).map(Some)
    }

    async fn search(
        &self,
        query: &OrderQuery<CustomerOrderStatus>,
    ) -> Result<Page<CustomerOrderDto>> {
        let status = query.status.map(CustomerOrderStatus::code);
        let page = orders::search(&self.pool, &CUSTOMER_ORDERS, query, status).await?;
        let items = to_dtos(page.items)?;
        Ok(Page {
            items,
            total_count: page.total_count,
            page: page.page,
            page_size: page.page_size,
            total_pages: page.total_pages,
        })
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<CustomerOrderDto>> {
        to_dtos(orders::list_for_party(&self.pool, &CUSTOMER_ORDERS, customer_id).await?)
    }

    async fn list_containing_product(&self, product_id: Uuid) -> Result<Vec<CustomerOrderDto>> {
        to_dtos(orders::list_containing_product(&self.pool, &CUSTOMER_ORDERS, product_id).await?)
    }

    async fn insert(&self, order: &CustomerOrder, items: &[OrderItem]) -> Result<()> {
        orders::insert(&self.pool, &CUSTOMER_ORDERS, &header(order), items).await
    }

    async fn update(&self, order: &CustomerOrder, changes: &ItemChangeSet) -> Result<bool> {
        orders::update(&self.pool, &CUSTOMER_ORDERS, &header(order), changes).await
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        orders::delete(&self.pool, &CUSTOMER_ORDERS, id).await
    }
}

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use tradedesk_core::{
    ports::{CustomerStore, Result},
    query::{Page, PartyField, PartyQuery},
    types::Customer,
};
use uuid::Uuid;

use crate::db_err;
use crate::rows::PartyRow;
use crate::search::{
    party_column, party_filter_columns, push_order_by, push_page, push_text_filter, SortKind,
};

const COLUMNS: &str =
    "customer_id AS id, name, phone_number, email, address, contact_person";

pub struct PgCustomerStore {
    pool: PgPool,
}

impl PgCustomerStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for PgCustomerStore {
    async fn get(&self, id: Uuid) -> Result<Option<Customer>> {
        let row = sqlx::query_as::<_, PartyRow>(&format!(
            "SELECT {COLUMNS} FROM customers WHERE customer_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Customer::from))
    }

    async fn list_all(&self) -> Result<Vec<Customer>> {
        let rows = sqlx::query_as::<_, PartyRow>(&format!(
            "SELECT {COLUMNS} FROM customers ORDER BY lower(name), customer_id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Customer::from).collect())
    }

    async fn search(&self, query: &PartyQuery) -> Result<Page<Customer>> {
        let columns = party_filter_columns(&query.filter);
        let term = query.filter.term.as_deref();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM customers WHERE TRUE");
        push_text_filter(&mut count, term, &columns);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM customers WHERE TRUE"));
        push_text_filter(&mut select, term, &columns);
        let (column, descending) = query.sort.resolve(PartyField::Name, false);
        push_order_by(
            &mut select,
            party_column(column),
            SortKind::Text,
            descending,
            "customer_id",
        );
        push_page(&mut select, query.page);
        let rows: Vec<PartyRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(Page::new(
            rows.into_iter().map(Customer::from).collect(),
            total,
            query.page,
        ))
    }

    async fn insert(&self, customer: &Customer) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO customers
                   (customer_id, name, phone_number, email, address, contact_person)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(customer.customer_id)
        .bind(&customer.name)
        .bind(&customer.phone_number)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.contact_person)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update(&self, customer: &Customer) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE customers
               SET name = $2, phone_number = $3, email = $4, address = $5, contact_person = $6
               WHERE customer_id = $1"#,
        )
        .bind(customer.customer_id)
        .bind(&customer.name)
        .bind(&customer.phone_number)
        .bind(&customer.email)
        .bind(&customer.address)
        .bind(&customer.contact_person)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM customers WHERE customer_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

use async_trait::async_trait;
use sqlx::{PgPool, QueryBuilder};
use tradedesk_core::{
    ports::{Result, SupplierStore},
    query::{Page, PartyField, PartyQuery},
    types::Supplier,
};
use uuid::Uuid;

use crate::db_err;
use crate::rows::PartyRow;
use crate::search::{
    party_column, party_filter_columns, push_order_by, push_page, push_text_filter, SortKind,
};

const COLUMNS: &str =
    "supplier_id AS id, name, phone_number, email, address, contact_person";

pub struct PgSupplierStore {
    pool: PgPool,
}

impl PgSupplierStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SupplierStore for PgSupplierStore {
    async fn get(&self, id: Uuid) -> Result<Option<Supplier>> {
        let row = sqlx::query_as::<_, PartyRow>(&format!(
            "SELECT {COLUMNS} FROM suppliers WHERE supplier_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Supplier::from))
    }

    async fn list_all(&self) -> Result<Vec<Supplier>> {
        let rows = sqlx::query_as::<_, PartyRow>(&format!(
            "SELECT {COLUMNS} FROM suppliers ORDER BY lower(name), supplier_id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Supplier::from).collect())
    }

    async fn search(&self, query: &PartyQuery) -> Result<Page<Supplier>> {
        let columns = party_filter_columns(&query.filter);
        let term = query.filter.term.as_deref();

        let mut count = QueryBuilder::new("SELECT COUNT(*) FROM suppliers WHERE TRUE");
        push_text_filter(&mut count, term, &columns);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut select = QueryBuilder::new(format!("SELECT {COLUMNS} FROM suppliers WHERE TRUE"));
        push_text_filter(&mut select, term, &columns);
        let (column, descending) = query.sort.resolve(PartyField::Name, false);
        push_order_by(
            &mut select,
            party_column(column),
            SortKind::Text,
            descending,
            "supplier_id",
        );
        push_page(&mut select, query.page);
        let rows: Vec<PartyRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(Page::new(
            rows.into_iter().map(Supplier::from).collect(),
            total,
            query.page,
        ))
    }

    async fn insert(&self, supplier: &Supplier) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO suppliers
                   (supplier_id, name, phone_number, email, address, contact_person)
               VALUES ($1, $2, $3, $4, $5, $6)"#,
        )
        .bind(supplier.supplier_id)
        .bind(&supplier.name)
        .bind(&supplier.phone_number)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.contact_person)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE suppliers
               SET name = $2, phone_number = $3, email = $4, address = $5, contact_person = $6
               WHERE supplier_id = $1"#,
        )
        .bind(supplier.supplier_id)
        .bind(&supplier.name)
        .bind(&supplier.phone_number)
        .bind(&supplier.email)
        .bind(&supplier.address)
        .bind(&supplier.contact_person)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    /// Products and orders hold RESTRICT keys on the supplier.
    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM suppliers WHERE supplier_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

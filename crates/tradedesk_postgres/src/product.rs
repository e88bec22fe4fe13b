use async_trait::async_trait;
use sqlx::{PgPool, Postgres, QueryBuilder};
use tradedesk_core::{
    dto::ProductDto,
    ports::{ProductStore, Result},
    query::{Page, ProductField, ProductQuery, ProductSort},
    types::Product,
};
use uuid::Uuid;

use crate::db_err;
use crate::rows::{ProductRow, ProductViewRow};
use crate::search::{push_order_by, push_page, push_text_filter, SortKind};

const COLUMNS: &str = "product_id, code, name, description, supplier_id";

const VIEW: &str = r#"SELECT p.product_id, p.code, p.name, p.description, p.supplier_id,
       s.name AS supplier_name
FROM products p
LEFT JOIN suppliers s ON s.supplier_id = p.supplier_id
WHERE TRUE"#;

fn filter_columns(query: &ProductQuery) -> Vec<&'static str> {
    [
        (ProductField::Code, "p.code"),
        (ProductField::Name, "p.name"),
        (ProductField::Description, "p.description"),
    ]
    .into_iter()
    .filter(|(f, _)| query.filter.applies_to(*f))
    .map(|(_, col)| col)
    .collect()
}

fn sort_column(sort: ProductSort) -> &'static str {
    match sort {
        ProductSort::Code => "p.code",
        ProductSort::Name => "p.name",
        ProductSort::Description => "p.description",
        ProductSort::Supplier => "s.name",
    }
}

fn push_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &ProductQuery) {
    if let Some(supplier_id) = query.supplier_id {
        qb.push(" AND p.supplier_id = ").push_bind(supplier_id);
    }
    push_text_filter(qb, query.filter.term.as_deref(), &filter_columns(query));
}

pub struct PgProductStore {
    pool: PgPool,
}

impl PgProductStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ProductStore for PgProductStore {
    async fn get(&self, id: Uuid) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM products WHERE product_id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Product::from))
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Product>> {
        let row = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM products WHERE code = $1"
        ))
        .bind(code)
        .fetch_optional(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(row.map(Product::from))
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = sqlx::query_as::<_, ProductRow>(&format!(
            "SELECT {COLUMNS} FROM products WHERE product_id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(Product::from).collect())
    }

    async fn list_all(&self) -> Result<Vec<ProductDto>> {
        let rows = sqlx::query_as::<_, ProductViewRow>(&format!(
            "{VIEW} ORDER BY lower(p.code), p.product_id"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(ProductDto::from).collect())
    }

    async fn list_by_supplier(&self, supplier_id: Uuid) -> Result<Vec<ProductDto>> {
        let rows = sqlx::query_as::<_, ProductViewRow>(&format!(
            "{VIEW} AND p.supplier_id = $1 ORDER BY lower(p.code), p.product_id"
        ))
        .bind(supplier_id)
        .fetch_all(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(rows.into_iter().map(ProductDto::from).collect())
    }

    async fn search(&self, query: &ProductQuery) -> Result<Page<ProductDto>> {
        let mut count = QueryBuilder::new(
            "SELECT COUNT(*) FROM products p \
             LEFT JOIN suppliers s ON s.supplier_id = p.supplier_id WHERE TRUE",
        );
        push_filters(&mut count, query);
        let total: i64 = count
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(db_err)?;

        let mut select = QueryBuilder::new(VIEW);
        push_filters(&mut select, query);
        let (column, descending) = query.sort.resolve(ProductSort::Code, false);
        push_order_by(
            &mut select,
            sort_column(column),
            SortKind::Text,
            descending,
            "p.product_id",
        );
        push_page(&mut select, query.page);
        let rows: Vec<ProductViewRow> = select
            .build_query_as()
            .fetch_all(&self.pool)
            .await
            .map_err(db_err)?;

        Ok(Page::new(
            rows.into_iter().map(ProductDto::from).collect(),
            total,
            query.page,
        ))
    }

    async fn code_exists(&self, code: &str, exclude: Option<Uuid>) -> Result<bool> {
        sqlx::query_scalar::<_, bool>(
            r#"SELECT EXISTS (
                   SELECT 1 FROM products
                   WHERE code = $1 AND ($2::uuid IS NULL OR product_id <> $2)
               )"#,
        )
        .bind(code)
        .bind(exclude)
        .fetch_one(&self.pool)
        .await
        .map_err(db_err)
    }

    async fn insert(&self, product: &Product) -> Result<()> {
        sqlx::query(
            r#"INSERT INTO products (product_id, code, name, description, supplier_id)
               VALUES ($1, $2, $3, $4, $5)"#,
        )
        .bind(product.product_id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.supplier_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool> {
        let result = sqlx::query(
            r#"UPDATE products
               SET code = $2, name = $3, description = $4, supplier_id = $5
               WHERE product_id = $1"#,
        )
        .bind(product.product_id)
        .bind(&product.code)
        .bind(&product.name)
        .bind(&product.description)
        .bind(product.supplier_id)
        .execute(&self.pool)
        .await
        .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let result = sqlx::query("DELETE FROM products WHERE product_id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(db_err)?;
        Ok(result.rows_affected() > 0)
    }
}

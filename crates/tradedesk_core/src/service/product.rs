use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{CreateProduct, ProductDto, ProductUsage, UpdateProduct},
    error::{TradeError, ValidationErrors},
    ports::{CustomerOrderStore, ProductStore, Result, SupplierOrderStore, SupplierStore},
    query::{Page, ProductQuery},
    types::Product,
    validate::{normalize_optional, validate_product_fields},
};

#[async_trait]
pub trait ProductService: Send + Sync {
    async fn get(&self, id: Uuid) -> Result<Option<ProductDto>>;
    async fn get_by_code(&self, code: &str) -> Result<Option<ProductDto>>;
    async fn list_all(&self) -> Result<Vec<ProductDto>>;
    async fn list_by_supplier(&self, supplier_id: Uuid) -> Result<Vec<ProductDto>>;
    async fn search(&self, query: &ProductQuery) -> Result<Page<ProductDto>>;
    async fn create(&self, input: CreateProduct) -> Result<Uuid>;
    async fn update(&self, input: UpdateProduct) -> Result<()>;
    /// `Ok(false)` when order items still reference the product.
    async fn delete(&self, id: Uuid) -> Result<bool>;
    async fn code_exists(&self, code: &str, exclude: Option<Uuid>) -> Result<bool>;
    /// Orders of either kind containing the product.
    async fn usage(&self, id: Uuid) -> Result<ProductUsage>;
}

pub struct ProductServiceImpl {
    products: Arc<dyn ProductStore>,
    suppliers: Arc<dyn SupplierStore>,
    customer_orders: Arc<dyn CustomerOrderStore>,
    supplier_orders: Arc<dyn SupplierOrderStore>,
}

impl ProductServiceImpl {
    pub fn new(
        products: Arc<dyn ProductStore>,
        suppliers: Arc<dyn SupplierStore>,
        customer_orders: Arc<dyn CustomerOrderStore>,
        supplier_orders: Arc<dyn SupplierOrderStore>,
    ) -> Self {
        Self {
            products,
            suppliers,
            customer_orders,
            supplier_orders,
        }
    }

    async fn to_dto(&self, product: Product) -> Result<ProductDto> {
        let supplier_name = self
            .suppliers
            .get(product.supplier_id)
            .await?
            .map(|s| s.name);
        Ok(ProductDto::from_product(product, supplier_name))
    }

    async fn check_supplier(&self, errors: &mut ValidationErrors, supplier_id: Uuid) -> Result<()> {
        if supplier_id.is_nil() || self.suppliers.get(supplier_id).await?.is_none() {
            errors.add("supplier_id", "Invalid supplier.");
        }
        Ok(())
    }
}

#[async_trait]
impl ProductService for ProductServiceImpl {
    async fn get(&self, id: Uuid) -> Result<Option<ProductDto>> {
        match self.products.get(id).await? {
            Some(p) => Ok(Some(self.to_dto(p).await?)),
            None => Ok(None),
        }
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<ProductDto>> {
        match self.products.get_by_code(code.trim()).await? {
            Some(p) => Ok(Some(self.to_dto(p).await?)),
            None => Ok(None),
        }
    }

    async fn list_all(&self) -> Result<Vec<ProductDto>> {
        self.products.list_all().await
    }

    async fn list_by_supplier(&self, supplier_id: Uuid) -> Result<Vec<ProductDto>> {
        self.products.list_by_supplier(supplier_id).await
    }

    async fn search(&self, query: &ProductQuery) -> Result<Page<ProductDto>> {
        self.products.search(query).await
    }

    async fn create(&self, input: CreateProduct) -> Result<Uuid> {
        let code = input.code.trim().to_string();
        let name = normalize_optional(input.name.as_deref());
        let description = normalize_optional(input.description.as_deref());

        let mut errors = ValidationErrors::new();
        self.check_supplier(&mut errors, input.supplier_id).await?;
        validate_product_fields(&mut errors, &code, name.as_deref(), description.as_deref());
        if !code.is_empty() && self.products.code_exists(&code, None).await? {
            errors.add("code", "Product code already exists.");
        }
        errors.into_result()?;

        let product = Product {
            product_id: Uuid::new_v4(),
            code,
            name,
            description,
            supplier_id: input.supplier_id,
        };
        // A concurrent insert of the same code comes back from the store as
        // a `Validation` error on `code`.
        self.products.insert(&product).await?;
        info!("Created product {} ({})", product.product_id, product.code);
        Ok(product.product_id)
    }

    async fn update(&self, input: UpdateProduct) -> Result<()> {
        let code = input.code.trim().to_string();
        let name = normalize_optional(input.name.as_deref());
        let description = normalize_optional(input.description.as_deref());

        let mut errors = ValidationErrors::new();
        let existing = if input.product_id.is_nil() {
            None
        } else {
            self.products.get(input.product_id).await?
        };
        match existing {
            None => errors.add("product_id", "Invalid product."),
            // Supplier orders only hold their own supplier's products.
            Some(p) if p.supplier_id != input.supplier_id => {
                let orders = self
                    .supplier_orders
                    .list_containing_product(input.product_id)
                    .await?;
                if !orders.is_empty() {
                    errors.add(
                        "supplier_id",
                        "Cannot change the supplier of a product used in supplier orders.",
                    );
                }
            }
            Some(_) => {}
        }
        self.check_supplier(&mut errors, input.supplier_id).await?;
        validate_product_fields(&mut errors, &code, name.as_deref(), description.as_deref());
        if !code.is_empty()
            && self
                .products
                .code_exists(&code, Some(input.product_id))
                .await?
        {
            errors.add("code", "Product code already exists.");
        }
        errors.into_result()?;

        let product = Product {
            product_id: input.product_id,
            code,
            name,
            description,
            supplier_id: input.supplier_id,
        };
        if !self.products.update(&product).await? {
            return Err(TradeError::validation("product_id", "Invalid product."));
        }
        info!("Updated product {}", product.product_id);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        if id.is_nil() || self.products.get(id).await?.is_none() {
            return Err(TradeError::validation("product_id", "Invalid product."));
        }
        if self.usage(id).await?.in_use() {
            warn!("Product {} is used by orders; not deleted", id);
            return Ok(false);
        }
        let deleted = super::blocked_as_false(self.products.delete(id).await, "product", id)?;
        if deleted {
            info!("Deleted product {}", id);
        }
        Ok(deleted)
    }

    async fn code_exists(&self, code: &str, exclude: Option<Uuid>) -> Result<bool> {
        self.products.code_exists(code.trim(), exclude).await
    }

    async fn usage(&self, id: Uuid) -> Result<ProductUsage> {
        Ok(ProductUsage {
            customer_orders: self.customer_orders.list_containing_product(id).await?,
            supplier_orders: self.supplier_orders.list_containing_product(id).await?,
        })
    }
}

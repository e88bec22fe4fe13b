use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{CreateSupplier, ProductDto, SupplierDto, SupplierOrderDto, UpdateSupplier},
    error::{TradeError, ValidationErrors},
    ports::{ProductStore, Result, SupplierOrderStore, SupplierStore},
    query::{Page, PartyQuery},
    types::Supplier,
    validate::PartyFields,
};

#[async_trait]
pub trait SupplierService: Send + Sync {
    async fn get(
        &self,
        id: Uuid,
        include_orders: bool,
        include_products: bool,
    ) -> Result<Option<SupplierDto>>;
    async fn list_all(&self) -> Result<Vec<SupplierDto>>;
    async fn search(&self, query: &PartyQuery) -> Result<Page<SupplierDto>>;
    async fn orders_of(&self, supplier_id: Uuid) -> Result<Vec<SupplierOrderDto>>;
    async fn products_of(&self, supplier_id: Uuid) -> Result<Vec<ProductDto>>;
    async fn create(&self, input: CreateSupplier) -> Result<Uuid>;
    async fn update(&self, input: UpdateSupplier) -> Result<()>;
    /// `Ok(false)` when unknown, or when orders or products still reference it.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct SupplierServiceImpl {
    suppliers: Arc<dyn SupplierStore>,
    orders: Arc<dyn SupplierOrderStore>,
    products: Arc<dyn ProductStore>,
}

impl SupplierServiceImpl {
    pub fn new(
        suppliers: Arc<dyn SupplierStore>,
        orders: Arc<dyn SupplierOrderStore>,
        products: Arc<dyn ProductStore>,
    ) -> Self {
        Self {
            suppliers,
            orders,
            products,
        }
    }

    fn to_entity(id: Uuid, fields: PartyFields) -> Supplier {
        Supplier {
            supplier_id: id,
            name: fields.name,
            phone_number: fields.phone_number,
            email: fields.email,
            address: fields.address,
            contact_person: fields.contact_person,
        }
    }
}

#[async_trait]
impl SupplierService for SupplierServiceImpl {
    async fn get(
        &self,
        id: Uuid,
        include_orders: bool,
        include_products: bool,
    ) -> Result<Option<SupplierDto>> {
        let Some(supplier) = self.suppliers.get(id).await? else {
            return Ok(None);
        };
        let mut dto = SupplierDto::from(supplier);
        if include_orders {
            dto.orders = self.orders.list_for_supplier(id).await?;
        }
        if include_products {
            dto.products = self.products.list_by_supplier(id).await?;
        }
        Ok(Some(dto))
    }

    async fn list_all(&self) -> Result<Vec<SupplierDto>> {
        let all = self.suppliers.list_all().await?;
        Ok(all.into_iter().map(SupplierDto::from).collect())
    }

    async fn search(&self, query: &PartyQuery) -> Result<Page<SupplierDto>> {
        Ok(self.suppliers.search(query).await?.map(SupplierDto::from))
    }

    async fn orders_of(&self, supplier_id: Uuid) -> Result<Vec<SupplierOrderDto>> {
        self.orders.list_for_supplier(supplier_id).await
    }

    async fn products_of(&self, supplier_id: Uuid) -> Result<Vec<ProductDto>> {
        self.products.list_by_supplier(supplier_id).await
    }

    async fn create(&self, input: CreateSupplier) -> Result<Uuid> {
        let fields = PartyFields::normalize(
            &input.name,
            input.phone_number.as_deref(),
            input.email.as_deref(),
            input.address.as_deref(),
            input.contact_person.as_deref(),
        );
        let mut errors = ValidationErrors::new();
        fields.validate(&mut errors);
        errors.into_result()?;

        let supplier = Self::to_entity(Uuid::new_v4(), fields);
        self.suppliers.insert(&supplier).await?;
        info!("Created supplier {} ({})", supplier.supplier_id, supplier.name);
        Ok(supplier.supplier_id)
    }

    async fn update(&self, input: UpdateSupplier) -> Result<()> {
        let fields = PartyFields::normalize(
            &input.name,
            input.phone_number.as_deref(),
            input.email.as_deref(),
            input.address.as_deref(),
            input.contact_person.as_deref(),
        );
        let mut errors = ValidationErrors::new();
        fields.validate(&mut errors);
        if self.suppliers.get(input.supplier_id).await?.is_none() {
            errors.add("supplier_id", "Supplier not found.");
        }
        errors.into_result()?;

        let supplier = Self::to_entity(input.supplier_id, fields);
        if !self.suppliers.update(&supplier).await? {
            return Err(TradeError::validation("supplier_id", "Supplier not found."));
        }
        info!("Updated supplier {}", supplier.supplier_id);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        if self.suppliers.get(id).await?.is_none() {
            return Ok(false);
        }
        let has_orders = !self.orders.list_for_supplier(id).await?.is_empty();
        let has_products = !self.products.list_by_supplier(id).await?.is_empty();
        if has_orders || has_products {
            warn!(
                "Supplier {} not deleted (orders: {}, products: {})",
                id, has_orders, has_products
            );
            return Ok(false);
        }
        let deleted = super::blocked_as_false(self.suppliers.delete(id).await, "supplier", id)?;
        if deleted {
            info!("Deleted supplier {}", id);
        }
        Ok(deleted)
    }
}

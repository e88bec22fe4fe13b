use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};
use uuid::Uuid;

use crate::{
    dto::{CreateCustomer, CustomerDto, CustomerOrderDto, UpdateCustomer},
    error::{TradeError, ValidationErrors},
    ports::{CustomerOrderStore, CustomerStore, Result},
    query::{Page, PartyQuery},
    types::Customer,
    validate::PartyFields,
};

#[async_trait]
pub trait CustomerService: Send + Sync {
    async fn get(&self, id: Uuid, include_orders: bool) -> Result<Option<CustomerDto>>;
    async fn list_all(&self) -> Result<Vec<CustomerDto>>;
    async fn search(&self, query: &PartyQuery) -> Result<Page<CustomerDto>>;
    async fn orders_of(&self, customer_id: Uuid) -> Result<Vec<CustomerOrderDto>>;
    async fn create(&self, input: CreateCustomer) -> Result<Uuid>;
    async fn update(&self, input: UpdateCustomer) -> Result<()>;
    /// `Ok(false)` when the customer still has orders.
    async fn delete(&self, id: Uuid) -> Result<bool>;
}

pub struct CustomerServiceImpl {
    customers: Arc<dyn CustomerStore>,
    orders: Arc<dyn CustomerOrderStore>,
}

impl CustomerServiceImpl {
    pub fn new(customers: Arc<dyn CustomerStore>, orders: Arc<dyn CustomerOrderStore>) -> Self {
        Self { customers, orders }
    }
}

#[async_trait]
impl CustomerService for CustomerServiceImpl {
    async fn get(&self, id: Uuid, include_orders: bool) -> Result<Option<CustomerDto>> {
        let Some(customer) = self.customers.get(id).await? else {
            return Ok(None);
        };
        let mut dto = CustomerDto::from(customer);
        if include_orders {
            dto.orders = self.orders.list_for_customer(id).await?;
        }
        Ok(Some(dto))
    }

    async fn list_all(&self) -> Result<Vec<CustomerDto>> {
        let all = self.customers.list_all().await?;
        Ok(all.into_iter().map(CustomerDto::from).collect())
    }

    async fn search(&self, query: &PartyQuery) -> Result<Page<CustomerDto>> {
        Ok(self.customers.search(query).await?.map(CustomerDto::from))
    }

    async fn orders_of(&self, customer_id: Uuid) -> Result<Vec<CustomerOrderDto>> {
        self.orders.list_for_customer(customer_id).await
    }

    async fn create(&self, input: CreateCustomer) -> Result<Uuid> {
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

        let customer = Customer {
            customer_id: Uuid::new_v4(),
            name: fields.name,
            phone_number: fields.phone_number,
            email: fields.email,
            address: fields.address,
            contact_person: fields.contact_person,
        };
        self.customers.insert(&customer).await?;
        info!("Created customer {} ({})", customer.customer_id, customer.name);
        Ok(customer.customer_id)
    }

    async fn update(&self, input: UpdateCustomer) -> Result<()> {
        let fields = PartyFields::normalize(
            &input.name,
            input.phone_number.as_deref(),
            input.email.as_deref(),
            input.address.as_deref(),
            input.contact_person.as_deref(),
        );
        let mut errors = ValidationErrors::new();
        fields.validate(&mut errors);
        if self.customers.get(input.customer_id).await?.is_none() {
            errors.add("customer_id", "Customer not found.");
        }
        errors.into_result()?;

        let customer = Customer {
            customer_id: input.customer_id,
            name: fields.name,
            phone_number: fields.phone_number,
            email: fields.email,
            address: fields.address,
            contact_person: fields.contact_person,
        };
        if !self.customers.update(&customer).await? {
            return Err(TradeError::validation("customer_id", "Customer not found."));
        }
        info!("Updated customer {}", customer.customer_id);
        Ok(())
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        if id.is_nil() || self.customers.get(id).await?.is_none() {
            return Err(TradeError::validation("", "Invalid customer."));
        }
        if !self.orders.list_for_customer(id).await?.is_empty() {
            warn!("Customer {} has orders; not deleted", id);
            return Ok(false);
        }
        let deleted = super::blocked_as_false(self.customers.delete(id).await, "customer", id)?;
        if deleted {
            info!("Deleted customer {}", id);
        }
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dto::{CreateCustomerOrder, CreateProduct, CreateSupplier, OrderItemInput};
    use crate::memory::MemoryStore;
    use crate::query::ListParams;
    use crate::service::Services;
    use rust_decimal::Decimal;

    fn customer(name: &str) -> CreateCustomer {
        CreateCustomer {
            name: name.into(),
            email: Some(format!("{}@example.com", name.to_lowercase())),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_trims_and_blanks_optional_fields() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let id = services
            .customers
            .create(CreateCustomer {
                name: "  Acme  ".into(),
                phone_number: Some("   ".into()),
                email: Some(" a@acme.io ".into()),
                ..Default::default()
            })
            .await
            .unwrap();

        let dto = services.customers.get(id, false).await.unwrap().unwrap();
        assert_eq!(dto.name, "Acme");
        assert_eq!(dto.phone_number, None);
        assert_eq!(dto.email.as_deref(), Some("a@acme.io"));
    }

    #[tokio::test]
    async fn create_rejects_missing_fields() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let err = services
            .customers
            .create(CreateCustomer::default())
            .await
            .unwrap_err();
        match err {
            TradeError::Validation(v) => {
                assert!(v.has_field("name"));
                assert!(v.has_field("email"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_unknown_customer_fails() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let err = services
            .customers
            .update(UpdateCustomer {
                customer_id: Uuid::new_v4(),
                name: "Ghost".into(),
                email: Some("ghost@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        match err {
            TradeError::Validation(v) => assert!(v.has_field("customer_id")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[tokio::test]
    async fn delete_nil_id_is_invalid() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let err = services.customers.delete(Uuid::nil()).await.unwrap_err();
        assert_eq!(err.http_status(), 422);
    }

    #[tokio::test]
    async fn delete_blocked_while_orders_exist() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let customer_id = services.customers.create(customer("Acme")).await.unwrap();
        let supplier_id = services
            .suppliers
            .create(CreateSupplier {
                name: "Parts Co".into(),
                email: Some("parts@example.com".into()),
                ..Default::default()
            })
            .await
            .unwrap();
        let product_id = services
            .products
            .create(CreateProduct {
                code: "P-1".into(),
                name: Some("Anvil".into()),
                supplier_id,
                ..Default::default()
            })
            .await
            .unwrap();
        services
            .customer_orders
            .create(CreateCustomerOrder {
                order_number: "CO-1".into(),
                customer_id,
                items: vec![OrderItemInput {
                    product_id,
                    quantity: 1,
                    unit_price: Decimal::new(500, 2),
                    ..Default::default()
                }],
                ..Default::default()
            })
            .await
            .unwrap();

        assert!(!services.customers.delete(customer_id).await.unwrap());
        assert!(services.customers.get(customer_id, false).await.unwrap().is_some());

        let orders = services.customers.orders_of(customer_id).await.unwrap();
        assert_eq!(orders.len(), 1);
    }

    #[tokio::test]
    async fn delete_without_orders_succeeds() {
        let services = Services::new(&MemoryStore::default().into_stores());
        let id = services.customers.create(customer("Solo")).await.unwrap();
        assert!(services.customers.delete(id).await.unwrap());
        assert!(services.customers.get(id, false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn search_is_case_insensitive_and_sorted_by_name() {
        let services = Services::new(&MemoryStore::default().into_stores());
        for name in ["Zeta Trading", "alpha traders", "Beta Supplies"] {
            services.customers.create(customer(&name.replace(' ', ""))).await.unwrap();
        }
        let params = ListParams {
            search_string: Some("TRAD".into()),
            ..Default::default()
        };
        let page = services.customers.search(&params.party_query()).await.unwrap();
        let names: Vec<_> = page.items.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["alphatraders", "ZetaTrading"]);
        assert_eq!(page.total_count, 2);
    }
}

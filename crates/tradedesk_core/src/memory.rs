//! In-memory implementation of every port.
//!
//! Backs the unit tests, the router tests and `STORAGE=memory`. Filtering,
//! sorting, paging and restrict-on-delete behave like the Postgres adapters.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    dto::{order_total, CustomerOrderDto, OrderItemDto, ProductDto, SupplierOrderDto},
    error::TradeError,
    ports::*,
    query::{
        OrderField, OrderQuery, OrderSort, Page, PartyField, PartyQuery, ProductField,
        ProductQuery, ProductSort, TextFilter,
    },
    reconcile::ItemChangeSet,
    types::*,
};

#[derive(Default)]
struct State {
    customers: HashMap<Uuid, Customer>,
    suppliers: HashMap<Uuid, Supplier>,
    products: HashMap<Uuid, Product>,
    customer_orders: HashMap<Uuid, CustomerOrder>,
    customer_items: HashMap<Uuid, Vec<OrderItem>>,
    supplier_orders: HashMap<Uuid, SupplierOrder>,
    supplier_items: HashMap<Uuid, Vec<OrderItem>>,
}

#[derive(Default)]
pub struct MemoryStore {
    state: RwLock<State>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// One shared store behind every port.
    pub fn into_stores(self) -> Stores {
        let this = Arc::new(self);
        Stores {
            customers: this.clone(),
            suppliers: this.clone(),
            products: this.clone(),
            customer_orders: this.clone(),
            supplier_orders: this,
        }
    }
}

// ── Matching and ordering helpers ─────────────────────────────

fn contains_ci(haystack: Option<&str>, needle: &str) -> bool {
    haystack.is_some_and(|h| h.to_lowercase().contains(&needle.to_lowercase()))
}

/// Case-insensitive; `None` sorts before any value.
fn cmp_text(a: Option<&str>, b: Option<&str>) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Less,
        (Some(_), None) => Ordering::Greater,
        (Some(x), Some(y)) => x.to_lowercase().cmp(&y.to_lowercase()),
    }
}

fn directed(ord: Ordering, descending: bool) -> Ordering {
    if descending {
        ord.reverse()
    } else {
        ord
    }
}

fn party_value<'a>(
    field: PartyField,
    name: &'a str,
    parts: [Option<&'a str>; 4],
) -> Option<&'a str> {
    let [phone, email, address, contact] = parts;
    match field {
        PartyField::Name => Some(name),
        PartyField::Email => email,
        PartyField::PhoneNumber => phone,
        PartyField::Address => address,
        PartyField::ContactPerson => contact,
    }
}

const PARTY_FIELDS: [PartyField; 5] = [
    PartyField::Name,
    PartyField::Email,
    PartyField::PhoneNumber,
    PartyField::Address,
    PartyField::ContactPerson,
];

fn party_matches(
    filter: &TextFilter<PartyField>,
    name: &str,
    parts: [Option<&str>; 4],
) -> bool {
    let Some(term) = filter.term.as_deref() else {
        return true;
    };
    PARTY_FIELDS
        .iter()
        .filter(|f| filter.applies_to(**f))
        .any(|f| contains_ci(party_value(*f, name, parts), term))
}

fn customer_parts(c: &Customer) -> [Option<&str>; 4] {
    [
        c.phone_number.as_deref(),
        c.email.as_deref(),
        c.address.as_deref(),
        c.contact_person.as_deref(),
    ]
}

fn supplier_parts(s: &Supplier) -> [Option<&str>; 4] {
    [
        s.phone_number.as_deref(),
        s.email.as_deref(),
        s.address.as_deref(),
        s.contact_person.as_deref(),
    ]
}

fn search_parties<T: Clone>(
    all: impl Iterator<Item = T>,
    query: &PartyQuery,
    key: impl Fn(&T) -> (Uuid, &str, [Option<&str>; 4]),
) -> Page<T> {
    let mut rows: Vec<T> = all
        .filter(|row| {
            let (_, name, parts) = key(row);
            party_matches(&query.filter, name, parts)
        })
        .collect();
    let (column, descending) = query.sort.resolve(PartyField::Name, false);
    rows.sort_by(|a, b| {
        let (ida, na, pa) = key(a);
        let (idb, nb, pb) = key(b);
        directed(
            cmp_text(party_value(column, na, pa), party_value(column, nb, pb)),
            descending,
        )
        .then(ida.cmp(&idb))
    });
    Page::from_sorted(rows, query.page)
}

// ── Read-model assembly ───────────────────────────────────────

fn item_dtos(items: &[OrderItem], products: &HashMap<Uuid, Product>) -> Vec<OrderItemDto> {
    let mut out: Vec<OrderItemDto> = items
        .iter()
        .map(|i| OrderItemDto::from_item(i, products.get(&i.product_id)))
        .collect();
    out.sort_by_key(|i| (i.item_number, i.item_id));
    out
}

fn product_dto(state: &State, p: &Product) -> ProductDto {
    let supplier_name = state.suppliers.get(&p.supplier_id).map(|s| s.name.clone());
    ProductDto::from_product(p.clone(), supplier_name)
}

fn customer_order_dto(state: &State, o: &CustomerOrder, include_items: bool) -> CustomerOrderDto {
    let items = item_dtos(
        state.customer_items.get(&o.order_id).map_or(&[][..], Vec::as_slice),
        &state.products,
    );
    CustomerOrderDto {
        order_id: o.order_id,
        order_number: o.order_number.clone(),
        order_date: o.order_date,
        customer_id: o.customer_id,
        customer_name: state.customers.get(&o.customer_id).map(|c| c.name.clone()),
        notes: o.notes.clone(),
        status: o.status,
        total: order_total(&items),
        items: if include_items { items } else { Vec::new() },
    }
}

fn supplier_order_dto(state: &State, o: &SupplierOrder, include_items: bool) -> SupplierOrderDto {
    let items = item_dtos(
        state.supplier_items.get(&o.order_id).map_or(&[][..], Vec::as_slice),
        &state.products,
    );
    SupplierOrderDto {
        order_id: o.order_id,
        order_number: o.order_number.clone(),
        order_date: o.order_date,
        supplier_id: o.supplier_id,
        supplier_name: state.suppliers.get(&o.supplier_id).map(|s| s.name.clone()),
        notes: o.notes.clone(),
        status: o.status,
        total: order_total(&items),
        items: if include_items { items } else { Vec::new() },
    }
}

/// Fields common to both order read models, for filtering and sorting.
struct OrderView<'a> {
    id: Uuid,
    number: &'a str,
    date: chrono::NaiveDate,
    party_id: Uuid,
    party_name: Option<&'a str>,
    notes: Option<&'a str>,
    status_code: i16,
}

fn order_matches<S: Copy + PartialEq>(
    q: &OrderQuery<S>,
    v: &OrderView<'_>,
    status: S,
) -> bool {
    if q.party_id.is_some_and(|id| id != v.party_id) {
        return false;
    }
    if q.status.is_some_and(|s| s != status) {
        return false;
    }
    if !q.in_date_range(v.date) {
        return false;
    }
    let Some(term) = q.filter.term.as_deref() else {
        return true;
    };
    (q.filter.applies_to(OrderField::OrderNumber) && contains_ci(Some(v.number), term))
        || (q.filter.applies_to(OrderField::Notes) && contains_ci(v.notes, term))
        || (q.filter.applies_to(OrderField::Party) && contains_ci(v.party_name, term))
}

fn cmp_orders(
    column: OrderSort,
    descending: bool,
    a: &OrderView<'_>,
    b: &OrderView<'_>,
) -> Ordering {
    let ord = match column {
        OrderSort::OrderNumber => cmp_text(Some(a.number), Some(b.number)),
        OrderSort::OrderDate => a.date.cmp(&b.date),
        OrderSort::Party => cmp_text(a.party_name, b.party_name),
        OrderSort::Notes => cmp_text(a.notes, b.notes),
        OrderSort::Status => a.status_code.cmp(&b.status_code),
    };
    directed(ord, descending).then(a.id.cmp(&b.id))
}

fn customer_view<'a>(state: &'a State, o: &'a CustomerOrder) -> OrderView<'a> {
    OrderView {
        id: o.order_id,
        number: &o.order_number,
        date: o.order_date,
        party_id: o.customer_id,
        party_name: state.customers.get(&o.customer_id).map(|c| c.name.as_str()),
        notes: o.notes.as_deref(),
        status_code: o.status.code(),
    }
}

fn supplier_view<'a>(state: &'a State, o: &'a SupplierOrder) -> OrderView<'a> {
    OrderView {
        id: o.order_id,
        number: &o.order_number,
        date: o.order_date,
        party_id: o.supplier_id,
        party_name: state.suppliers.get(&o.supplier_id).map(|s| s.name.as_str()),
        notes: o.notes.as_deref(),
        status_code: o.status.code(),
    }
}

/// Apply a change set to an order's item list.
fn apply_changes(items: &mut Vec<OrderItem>, changes: &ItemChangeSet) {
    items.retain(|i| !changes.deletes.contains(&i.item_id));
    for upd in &changes.updates {
        if let Some(existing) = items.iter_mut().find(|i| i.item_id == upd.item_id) {
            *existing = upd.clone();
        }
    }
    items.extend(changes.inserts.iter().cloned());
}

fn check_products_exist(state: &State, items: &[OrderItem]) -> Result<()> {
    match items.iter().find(|i| !state.products.contains_key(&i.product_id)) {
        Some(i) => Err(TradeError::Conflict(format!(
            "product {} does not exist",
            i.product_id
        ))),
        None => Ok(()),
    }
}

fn duplicate_code() -> TradeError {
    TradeError::validation("code", "Product code already exists.")
}

// ── Customers ─────────────────────────────────────────────────

#[async_trait]
impl CustomerStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Customer>> {
        Ok(self.state.read().await.customers.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Customer>> {
        let state = self.state.read().await;
        let mut all: Vec<Customer> = state.customers.values().cloned().collect();
        all.sort_by(|a, b| {
            cmp_text(Some(a.name.as_str()), Some(b.name.as_str()))
                .then(a.customer_id.cmp(&b.customer_id))
        });
        Ok(all)
    }

    async fn search(&self, query: &PartyQuery) -> Result<Page<Customer>> {
        let state = self.state.read().await;
        Ok(search_parties(state.customers.values().cloned(), query, |c| {
            (c.customer_id, c.name.as_str(), customer_parts(c))
        }))
    }

    async fn insert(&self, customer: &Customer) -> Result<()> {
        let mut state = self.state.write().await;
        if state.customers.contains_key(&customer.customer_id) {
            return Err(TradeError::Conflict(format!(
                "customer {} already exists",
                customer.customer_id
            )));
        }
        state.customers.insert(customer.customer_id, customer.clone());
        Ok(())
    }

    async fn update(&self, customer: &Customer) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.customers.get_mut(&customer.customer_id) {
            Some(existing) => {
                *existing = customer.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.customer_orders.values().any(|o| o.customer_id == id) {
            return Err(TradeError::Conflict(format!("customer {id} has orders")));
        }
        Ok(state.customers.remove(&id).is_some())
    }
}

// ── Suppliers ─────────────────────────────────────────────────

#[async_trait]
impl SupplierStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Supplier>> {
        Ok(self.state.read().await.suppliers.get(&id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<Supplier>> {
        let state = self.state.read().await;
        let mut all: Vec<Supplier> = state.suppliers.values().cloned().collect();
        all.sort_by(|a, b| {
            cmp_text(Some(a.name.as_str()), Some(b.name.as_str()))
                .then(a.supplier_id.cmp(&b.supplier_id))
        });
        Ok(all)
    }

    async fn search(&self, query: &PartyQuery) -> Result<Page<Supplier>> {
        let state = self.state.read().await;
        Ok(search_parties(state.suppliers.values().cloned(), query, |s| {
            (s.supplier_id, s.name.as_str(), supplier_parts(s))
        }))
    }

    async fn insert(&self, supplier: &Supplier) -> Result<()> {
        let mut state = self.state.write().await;
        if state.suppliers.contains_key(&supplier.supplier_id) {
            return Err(TradeError::Conflict(format!(
                "supplier {} already exists",
                supplier.supplier_id
            )));
        }
        state.suppliers.insert(supplier.supplier_id, supplier.clone());
        Ok(())
    }

    async fn update(&self, supplier: &Supplier) -> Result<bool> {
        let mut state = self.state.write().await;
        match state.suppliers.get_mut(&supplier.supplier_id) {
            Some(existing) => {
                *existing = supplier.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        if state.supplier_orders.values().any(|o| o.supplier_id == id) {
            return Err(TradeError::Conflict(format!("supplier {id} has orders")));
        }
        if state.products.values().any(|p| p.supplier_id == id) {
            return Err(TradeError::Conflict(format!("supplier {id} has products")));
        }
        Ok(state.suppliers.remove(&id).is_some())
    }
}

// ── Products ──────────────────────────────────────────────────

fn product_text(p: &Product, field: ProductField) -> Option<&str> {
    match field {
        ProductField::Code => Some(p.code.as_str()),
        ProductField::Name => p.name.as_deref(),
        ProductField::Description => p.description.as_deref(),
    }
}

fn sorted_products(
    state: &State,
    mut rows: Vec<&Product>,
    column: ProductSort,
    descending: bool,
) -> Vec<ProductDto> {
    let supplier_name =
        |p: &Product| state.suppliers.get(&p.supplier_id).map(|s| s.name.as_str());
    rows.sort_by(|a, b| {
        let ord = match column {
            ProductSort::Code => cmp_text(Some(a.code.as_str()), Some(b.code.as_str())),
            ProductSort::Name => cmp_text(a.name.as_deref(), b.name.as_deref()),
            ProductSort::Description => {
                cmp_text(a.description.as_deref(), b.description.as_deref())
            }
            ProductSort::Supplier => cmp_text(supplier_name(*a), supplier_name(*b)),
        };
        directed(ord, descending).then(a.product_id.cmp(&b.product_id))
    });
    rows.into_iter().map(|p| product_dto(state, p)).collect()
}

#[async_trait]
impl ProductStore for MemoryStore {
    async fn get(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_by_code(&self, code: &str) -> Result<Option<Product>> {
        let state = self.state.read().await;
        Ok(state.products.values().find(|p| p.code == code).cloned())
    }

    async fn get_many(&self, ids: &[Uuid]) -> Result<Vec<Product>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).cloned())
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<ProductDto>> {
        let state = self.state.read().await;
        let rows: Vec<&Product> = state.products.values().collect();
        Ok(sorted_products(&state, rows, ProductSort::Code, false))
    }

    async fn list_by_supplier(&self, supplier_id: Uuid) -> Result<Vec<ProductDto>> {
        let state = self.state.read().await;
        let rows: Vec<&Product> = state
            .products
            .values()
            .filter(|p| p.supplier_id == supplier_id)
            .collect();
        Ok(sorted_products(&state, rows, ProductSort::Code, false))
    }

    async fn search(&self, query: &ProductQuery) -> Result<Page<ProductDto>> {
        let state = self.state.read().await;
        let rows: Vec<&Product> = state
            .products
            .values()
            .filter(|p| query.supplier_id.map_or(true, |s| p.supplier_id == s))
            .filter(|p| match query.filter.term.as_deref() {
                None => true,
                Some(term) => [ProductField::Code, ProductField::Name, ProductField::Description]
                    .into_iter()
                    .filter(|f| query.filter.applies_to(*f))
                    .any(|f| contains_ci(product_text(p, f), term)),
            })
            .collect();
        let (column, descending) = query.sort.resolve(ProductSort::Code, false);
        let sorted = sorted_products(&state, rows, column, descending);
        Ok(Page::from_sorted(sorted, query.page))
    }

    async fn code_exists(&self, code: &str, exclude: Option<Uuid>) -> Result<bool> {
        let state = self.state.read().await;
        Ok(state
            .products
            .values()
            .any(|p| p.code == code && Some(p.product_id) != exclude))
    }

    async fn insert(&self, product: &Product) -> Result<()> {
        let mut state = self.state.write().await;
        if state.products.values().any(|p| p.code == product.code) {
            return Err(duplicate_code());
        }
        if !state.suppliers.contains_key(&product.supplier_id) {
            return Err(TradeError::Conflict(format!(
                "supplier {} does not exist",
                product.supplier_id
            )));
        }
        state.products.insert(product.product_id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<bool> {
        let mut state = self.state.write().await;
        if state
            .products
            .values()
            .any(|p| p.code == product.code && p.product_id != product.product_id)
        {
            return Err(duplicate_code());
        }
        match state.products.get_mut(&product.product_id) {
            Some(existing) => {
                *existing = product.clone();
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        let referenced = state
            .customer_items
            .values()
            .chain(state.supplier_items.values())
            .flatten()
            .any(|i| i.product_id == id);
        if referenced {
            return Err(TradeError::Conflict(format!("product {id} is used by orders")));
        }
        Ok(state.products.remove(&id).is_some())
    }
}

// ── Customer orders ───────────────────────────────────────────

fn customer_orders_where(
    state: &State,
    keep: impl Fn(&CustomerOrder) -> bool,
) -> Vec<CustomerOrderDto> {
    let mut rows: Vec<&CustomerOrder> =
        state.customer_orders.values().filter(|o| keep(o)).collect();
    rows.sort_by(|a, b| {
        cmp_orders(
            OrderSort::OrderDate,
            true,
            &customer_view(state, a),
            &customer_view(state, b),
        )
    });
    rows.into_iter()
        .map(|o| customer_order_dto(state, o, false))
        .collect()
}

#[async_trait]
impl CustomerOrderStore for MemoryStore {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<CustomerOrderDto>> {
        let state = self.state.read().await;
        Ok(state
            .customer_orders
            .get(&id)
            .map(|o| customer_order_dto(&state, o, include_items)))
    }

    async fn search(
        &self,
        query: &OrderQuery<CustomerOrderStatus>,
    ) -> Result<Page<CustomerOrderDto>> {
        let state = self.state.read().await;
        let mut rows: Vec<&CustomerOrder> = state
            .customer_orders
            .values()
            .filter(|o| order_matches(query, &customer_view(&state, o), o.status))
            .collect();
        let (column, descending) = query.sort.resolve(OrderSort::OrderDate, true);
        rows.sort_by(|a, b| {
            cmp_orders(column, descending, &customer_view(&state, a), &customer_view(&state, b))
        });
        let dtos = rows
            .into_iter()
            .map(|o| customer_order_dto(&state, o, false))
            .collect();
        Ok(Page::from_sorted(dtos, query.page))
    }

    async fn list_for_customer(&self, customer_id: Uuid) -> Result<Vec<CustomerOrderDto>> {
        let state = self.state.read().await;
        Ok(customer_orders_where(&state, |o| o.customer_id == customer_id))
    }

    async fn list_containing_product(&self, product_id: Uuid) -> Result<Vec<CustomerOrderDto>> {
        let state = self.state.read().await;
        Ok(customer_orders_where(&state, |o| {
            state
                .customer_items
                .get(&o.order_id)
                .is_some_and(|items| items.iter().any(|i| i.product_id == product_id))
        }))
    }

    async fn insert(&self, order: &CustomerOrder, items: &[OrderItem]) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.customers.contains_key(&order.customer_id) {
            return Err(TradeError::Conflict(format!(
                "customer {} does not exist",
                order.customer_id
            )));
        }
        check_products_exist(&state, items)?;
        state.customer_orders.insert(order.order_id, order.clone());
        state.customer_items.insert(order.order_id, items.to_vec());
        Ok(())
    }

    async fn update(&self, order: &CustomerOrder, changes: &ItemChangeSet) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.customer_orders.contains_key(&order.order_id) {
            return Ok(false);
        }
        if !state.customers.contains_key(&order.customer_id) {
            return Err(TradeError::Conflict(format!(
                "customer {} does not exist",
                order.customer_id
            )));
        }
        check_products_exist(&state, &changes.inserts)?;
        check_products_exist(&state, &changes.updates)?;

        state.customer_orders.insert(order.order_id, order.clone());
        let items = state.customer_items.entry(order.order_id).or_default();
        apply_changes(items, changes);
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        state.customer_items.remove(&id);
        Ok(state.customer_orders.remove(&id).is_some())
    }
}

// ── Supplier orders ───────────────────────────────────────────

fn supplier_orders_where(
    state: &State,
    keep: impl Fn(&SupplierOrder) -> bool,
) -> Vec<SupplierOrderDto> {
    let mut rows: Vec<&SupplierOrder> =
        state.supplier_orders.values().filter(|o| keep(o)).collect();
    rows.sort_by(|a, b| {
        cmp_orders(
            OrderSort::OrderDate,
            true,
            &supplier_view(state, a),
            &supplier_view(state, b),
        )
    });
    rows.into_iter()
        .map(|o| supplier_order_dto(state, o, false))
        .collect()
}

#[async_trait]
impl SupplierOrderStore for MemoryStore {
    async fn get(&self, id: Uuid, include_items: bool) -> Result<Option<SupplierOrderDto>> {
        let state = self.state.read().await;
        Ok(state
            .supplier_orders
            .get(&id)
            .map(|o| supplier_order_dto(&state, o, include_items)))
    }

    async fn search(
        &self,
        query: &OrderQuery<SupplierOrderStatus>,
    ) -> Result<Page<SupplierOrderDto>> {
        let state = self.state.read().await;
        let mut rows: Vec<&SupplierOrder> = state
            .supplier_orders
            .values()
            .filter(|o| order_matches(query, &supplier_view(&state, o), o.status))
            .collect();
        let (column, descending) = query.sort.resolve(OrderSort::OrderDate, true);
        rows.sort_by(|a, b| {
            cmp_orders(column, descending, &supplier_view(&state, a), &supplier_view(&state, b))
        });
        let dtos = rows
            .into_iter()
            .map(|o| supplier_order_dto(&state, o, false))
            .collect();
        Ok(Page::from_sorted(dtos, query.page))
    }

    async fn list_for_supplier(&self, supplier_id: Uuid) -> Result<Vec<SupplierOrderDto>> {
        let state = self.state.read().await;
        Ok(supplier_orders_where(&state, |o| o.supplier_id == supplier_id))
    }

    async fn list_containing_product(&self, product_id: Uuid) -> Result<Vec<SupplierOrderDto>> {
        let state = self.state.read().await;
        Ok(supplier_orders_where(&state, |o| {
            state
                .supplier_items
                .get(&o.order_id)
                .is_some_and(|items| items.iter().any(|i| i.product_id == product_id))
        }))
    }

    async fn insert(&self, order: &SupplierOrder, items: &[OrderItem]) -> Result<()> {
        let mut state = self.state.write().await;
        if !state.suppliers.contains_key(&order.supplier_id) {
            return Err(TradeError::Conflict(format!(
                "supplier {} does not exist",
                order.supplier_id
            )));
        }
        check_products_exist(&state, items)?;
        state.supplier_orders.insert(order.order_id, order.clone());
        state.supplier_items.insert(order.order_id, items.to_vec());
        Ok(())
    }

    async fn update(&self, order: &SupplierOrder, changes: &ItemChangeSet) -> Result<bool> {
        let mut state = self.state.write().await;
        if !state.supplier_orders.contains_key(&order.order_id) {
            return Ok(false);
        }
        if !state.suppliers.contains_key(&order.supplier_id) {
            return Err(TradeError::Conflict(format!(
                "supplier {} does not exist",
                order.supplier_id
            )));
        }
        check_products_exist(&state, &changes.inserts)?;
        check_products_exist(&state, &changes.updates)?;

        state.supplier_orders.insert(order.order_id, order.clone());
        let items = state.supplier_items.entry(order.order_id).or_default();
        apply_changes(items, changes);
        Ok(true)
    }

    async fn delete(&self, id: Uuid) -> Result<bool> {
        let mut state = self.state.write().await;
        state.supplier_items.remove(&id);
        Ok(state.supplier_orders.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::{PageRequest, SortSpec};
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn customer(name: &str, email: Option<&str>) -> Customer {
        Customer {
            customer_id: Uuid::new_v4(),
            name: name.into(),
            phone_number: None,
            email: email.map(str::to_string),
            address: None,
            contact_person: None,
        }
    }

    #[tokio::test]
    async fn party_search_by_single_field() {
        let store = MemoryStore::new();
        CustomerStore::insert(&store, &customer("Harbor Foods", Some("ops@harbor.io")))
            .await
            .unwrap();
        CustomerStore::insert(&store, &customer("Inland Goods", Some("harbor@inland.io")))
            .await
            .unwrap();

        let query = PartyQuery {
            filter: TextFilter::parse(Some("HARBOR"), Some("name")),
            ..Default::default()
        };
        let page = CustomerStore::search(&store, &query).await.unwrap();
        assert_eq!(page.total_count, 1);
        assert_eq!(page.items[0].name, "Harbor Foods");

        let query = PartyQuery {
            filter: TextFilter::parse(Some("HARBOR"), None),
            ..Default::default()
        };
        assert_eq!(CustomerStore::search(&store, &query).await.unwrap().total_count, 2);
    }

    #[tokio::test]
    async fn nulls_sort_first_ascending_last_descending() {
        let store = MemoryStore::new();
        CustomerStore::insert(&store, &customer("B", Some("b@x.io"))).await.unwrap();
        CustomerStore::insert(&store, &customer("A", None)).await.unwrap();

        let mut query = PartyQuery {
            sort: SortSpec::parse(Some("email"), false),
            ..Default::default()
        };
        let asc = CustomerStore::search(&store, &query).await.unwrap();
        assert_eq!(asc.items[0].name, "A");

        query.sort.descending = true;
        let desc = CustomerStore::search(&store, &query).await.unwrap();
        assert_eq!(desc.items[0].name, "B");
    }

    #[tokio::test]
    async fn customer_delete_restricted_by_orders() {
        let store = MemoryStore::new();
        let c = customer("Acme", None);
        CustomerStore::insert(&store, &c).await.unwrap();
        let order = CustomerOrder {
            order_id: Uuid::new_v4(),
            order_number: "CO-1".into(),
            order_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            customer_id: c.customer_id,
            notes: None,
            status: CustomerOrderStatus::Pending,
        };
        CustomerOrderStore::insert(&store, &order, &[]).await.unwrap();

        let err = CustomerStore::delete(&store, c.customer_id).await.unwrap_err();
        assert_eq!(err.http_status(), 409);

        assert!(CustomerOrderStore::delete(&store, order.order_id).await.unwrap());
        assert!(CustomerStore::delete(&store, c.customer_id).await.unwrap());
    }

    #[tokio::test]
    async fn product_code_unique_and_restricted() {
        let store = MemoryStore::new();
        let supplier = Supplier {
            supplier_id: Uuid::new_v4(),
            name: "S".into(),
            phone_number: None,
            email: None,
            address: None,
            contact_person: None,
        };
        SupplierStore::insert(&store, &supplier).await.unwrap();
        let p = Product {
            product_id: Uuid::new_v4(),
            code: "X-1".into(),
            name: None,
            description: None,
            supplier_id: supplier.supplier_id,
        };
        ProductStore::insert(&store, &p).await.unwrap();

        let dup = Product {
            product_id: Uuid::new_v4(),
            ..p.clone()
        };
        let err = ProductStore::insert(&store, &dup).await.unwrap_err();
        assert_eq!(err.http_status(), 422);

        let order = SupplierOrder {
            order_id: Uuid::new_v4(),
            order_number: "SO-1".into(),
            order_date: NaiveDate::from_ymd_opt(2024, 5, 1).unwrap(),
            supplier_id: supplier.supplier_id,
            notes: None,
            status: SupplierOrderStatus::Confirmed,
        };
        let item = OrderItem {
            item_id: Uuid::new_v4(),
            item_number: 1,
            product_id: p.product_id,
            quantity: 2,
            unit_price: Decimal::new(500, 2),
        };
        SupplierOrderStore::insert(&store, &order, &[item]).await.unwrap();

        let err = ProductStore::delete(&store, p.product_id).await.unwrap_err();
        assert_eq!(err.http_status(), 409);
        let err = SupplierStore::delete(&store, supplier.supplier_id).await.unwrap_err();
        assert_eq!(err.http_status(), 409);

        let listed = SupplierOrderStore::list_containing_product(&store, p.product_id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].total, Decimal::new(1000, 2));
        assert!(listed[0].items.is_empty());
    }

    #[tokio::test]
    async fn party_page_two_of_twenty() {
        let store = MemoryStore::new();
        for n in 0..50 {
            CustomerStore::insert(&store, &customer(&format!("Customer {n:02}"), None))
                .await
                .unwrap();
        }
        let query = PartyQuery {
            page: PageRequest::new(2, 20),
            ..Default::default()
        };
        let page = CustomerStore::search(&store, &query).await.unwrap();
        assert_eq!(page.items.len(), 20);
        assert_eq!(page.items[0].name, "Customer 20");
        assert_eq!(page.items[19].name, "Customer 39");
    }

    #[test]
    fn items_with_equal_numbers_fall_back_to_id_order() {
        let item = |item_number: i32| OrderItem {
            item_id: Uuid::new_v4(),
            item_number,
            product_id: Uuid::new_v4(),
            quantity: 1,
            unit_price: Decimal::ONE,
        };
        let items = vec![item(2), item(1), item(1), item(1)];
        let dtos = item_dtos(&items, &HashMap::new());

        let keys: Vec<_> = dtos.iter().map(|d| (d.item_number, d.item_id)).collect();
        let mut expected: Vec<_> = items.iter().map(|i| (i.item_number, i.item_id)).collect();
        expected.sort();
        assert_eq!(keys, expected);
        assert_eq!(dtos.last().map(|d| d.item_number), Some(2));
    }
}

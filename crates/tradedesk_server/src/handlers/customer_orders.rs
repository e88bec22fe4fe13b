//! /customerorders

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use tradedesk_core::{
    dto::{CreateCustomerOrder, CustomerOrderDto, UpdateCustomerOrder},
    query::OrderListParams,
    types::CustomerOrderStatus,
    Services,
};
use uuid::Uuid;

use super::{found, require_id};
use crate::error::AppError;
use crate::forms::{check_order_form, CUSTOMER};
use crate::views::{
    customer_options, product_options, status_options, Created, DeleteOutcome, FormOptions,
    FormView, IndexView, Updated,
};

/// `?id=<customer>&c=true` when the form is opened from a customer's page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FromCustomer {
    pub id: Option<Uuid>,
    pub c: bool,
}

fn statuses() -> Vec<crate::views::StatusOption> {
    status_options(&CustomerOrderStatus::ALL, |s| s.code())
}

async fn dropdowns(services: &Services) -> Result<FormOptions, AppError> {
    let customers = services.customers.list_all().await?;
    let products = services.products.list_all().await?;
    Ok(FormOptions {
        customers: Some(customer_options(&customers)),
        products: Some(product_options(&products)),
        statuses: Some(statuses()),
        ..Default::default()
    })
}

async fn customer_exists(services: &Services, id: Uuid) -> Result<bool, AppError> {
    Ok(!id.is_nil() && services.customers.get(id, false).await?.is_some())
}

pub async fn index(
    Extension(services): Extension<Services>,
    Query(params): Query<OrderListParams<CustomerOrderStatus>>,
) -> Result<Json<IndexView<CustomerOrderDto, OrderListParams<CustomerOrderStatus>>>, AppError> {
    let page = services.customer_orders.search(&params.order_query()).await?;
    let customers = services.customers.list_all().await?;
    let filters = FormOptions {
        customers: Some(customer_options(&customers)),
        statuses: Some(statuses()),
        ..Default::default()
    };
    Ok(Json(IndexView::new(page, params).with_filters(filters)))
}

/// Always with items.
pub async fn details(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerOrderDto>, AppError> {
    let id = require_id(id)?;
    let order = found(services.customer_orders.get(id, true).await?, "order", id)?;
    Ok(Json(order))
}

pub async fn create_form(
    Extension(services): Extension<Services>,
    Query(from): Query<FromCustomer>,
) -> Result<Json<FormView<CreateCustomerOrder>>, AppError> {
    let mut form = CreateCustomerOrder::default();
    if from.c {
        form.customer_id = from.id.unwrap_or_default();
        form.from_customer = true;
    }
    let mut view = FormView::with_options(form, dropdowns(&services).await?);
    view.from_party = from.c;
    Ok(Json(view))
}

pub async fn create(
    Extension(services): Extension<Services>,
    Json(input): Json<CreateCustomerOrder>,
) -> Result<Created, AppError> {
    let exists = customer_exists(&services, input.customer_id).await?;
    let errors = check_order_form(CUSTOMER, exists, &input.order_number, &input.items);
    if !errors.is_empty() {
        return Err(AppError::form(errors));
    }
    let id = services.customer_orders.create(input).await?;
    Ok(Created { id })
}

pub async fn edit_form(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Query(from): Query<FromCustomer>,
) -> Result<Json<FormView<UpdateCustomerOrder>>, AppError> {
    let order = found(services.customer_orders.get(id, true).await?, "order", id)?;
    let mut view = FormView::with_options(order.to_update(), dropdowns(&services).await?);
    view.from_party = from.c;
    Ok(Json(view))
}

pub async fn edit(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Json(mut input): Json<UpdateCustomerOrder>,
) -> Result<Json<Updated>, AppError> {
    found(services.customer_orders.get(id, false).await?, "order", id)?;
    input.order_id = id;

    let exists = customer_exists(&services, input.customer_id).await?;
    let errors = check_order_form(CUSTOMER, exists, &input.order_number, &input.items);
    if !errors.is_empty() {
        return Err(AppError::form(errors));
    }
    if !services.customer_orders.update(input).await? {
        return Err(AppError::not_found(format!("order {id}")));
    }
    Ok(Json(Updated { updated: true }))
}

pub async fn delete_view(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerOrderDto>, AppError> {
    let order = found(services.customer_orders.get(id, false).await?, "order", id)?;
    Ok(Json(order))
}

pub async fn delete(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<DeleteOutcome, AppError> {
    if !services.customer_orders.delete(id).await? {
        return Err(AppError::not_found(format!("order {id}")));
    }
    Ok(DeleteOutcome::deleted())
}

//! /customers

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use tradedesk_core::{
    dto::{CreateCustomer, CustomerDto, UpdateCustomer},
    query::ListParams,
    Services,
};
use uuid::Uuid;

use super::{found, require_id};
use crate::error::AppError;
use crate::views::{Created, CustomerDeleteView, DeleteOutcome, FormView, IndexView, Updated};

pub async fn index(
    Extension(services): Extension<Services>,
    Query(params): Query<ListParams>,
) -> Result<Json<IndexView<CustomerDto, ListParams>>, AppError> {
    let page = services.customers.search(&params.party_query()).await?;
    Ok(Json(IndexView::new(page, params)))
}

pub async fn details(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerDto>, AppError> {
    let id = require_id(id)?;
    let customer = found(services.customers.get(id, true).await?, "customer", id)?;
    Ok(Json(customer))
}

pub async fn create_form() -> Json<FormView<CreateCustomer>> {
    Json(FormView::new(CreateCustomer::default()))
}

pub async fn create(
    Extension(services): Extension<Services>,
    Json(input): Json<CreateCustomer>,
) -> Result<Created, AppError> {
    let id = services.customers.create(input).await?;
    Ok(Created { id })
}

pub async fn edit_form(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormView<UpdateCustomer>>, AppError> {
    let customer = found(services.customers.get(id, false).await?, "customer", id)?;
    Ok(Json(FormView::new(customer.to_update())))
}

pub async fn edit(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Json(mut input): Json<UpdateCustomer>,
) -> Result<Json<Updated>, AppError> {
    input.customer_id = id;
    services.customers.update(input).await?;
    Ok(Json(Updated { updated: true }))
}

pub async fn delete_view(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<CustomerDeleteView>, AppError> {
    let customer = found(services.customers.get(id, true).await?, "customer", id)?;
    Ok(Json(CustomerDeleteView {
        has_orders: !customer.orders.is_empty(),
        customer,
    }))
}

pub async fn delete(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<DeleteOutcome, AppError> {
    let customer = found(services.customers.get(id, true).await?, "customer", id)?;
    if !customer.orders.is_empty() {
        return Ok(DeleteOutcome::blocked(
            "This customer cannot be deleted because they have existing orders.",
        ));
    }
    if services.customers.delete(id).await? {
        Ok(DeleteOutcome::deleted())
    } else {
        Ok(DeleteOutcome::blocked("This customer cannot be deleted."))
    }
}

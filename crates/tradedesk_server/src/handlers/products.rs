//! /products

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use tradedesk_core::{
    dto::{CreateProduct, ProductDto, UpdateProduct},
    query::ListParams,
    Services,
};
use uuid::Uuid;

use super::{found, require_id};
use crate::error::AppError;
use crate::views::{
    supplier_options, Created, DeleteOutcome, FormOptions, FormView, IndexView,
    ProductDeleteView, Updated,
};

async fn supplier_dropdown(services: &Services) -> Result<FormOptions, AppError> {
    let suppliers = services.suppliers.list_all().await?;
    Ok(FormOptions {
        suppliers: Some(supplier_options(&suppliers)),
        ..Default::default()
    })
}

/// Filterable by `supplier_id`; the supplier dropdown comes along.
pub async fn index(
    Extension(services): Extension<Services>,
    Query(params): Query<ListParams>,
) -> Result<Json<IndexView<ProductDto, ListParams>>, AppError> {
    let page = services.products.search(&params.product_query()).await?;
    let filters = supplier_dropdown(&services).await?;
    Ok(Json(IndexView::new(page, params).with_filters(filters)))
}

pub async fn details(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDto>, AppError> {
    let id = require_id(id)?;
    let product = found(services.products.get(id).await?, "product", id)?;
    Ok(Json(product))
}

pub async fn create_form(
    Extension(services): Extension<Services>,
) -> Result<Json<FormView<CreateProduct>>, AppError> {
    let options = supplier_dropdown(&services).await?;
    Ok(Json(FormView::with_options(CreateProduct::default(), options)))
}

pub async fn create(
    Extension(services): Extension<Services>,
    Json(input): Json<CreateProduct>,
) -> Result<Created, AppError> {
    let id = services.products.create(input).await?;
    Ok(Created { id })
}

pub async fn edit_form(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormView<UpdateProduct>>, AppError> {
    let product = found(services.products.get(id).await?, "product", id)?;
    let options = supplier_dropdown(&services).await?;
    Ok(Json(FormView::with_options(product.to_update(), options)))
}

pub async fn edit(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Json(mut input): Json<UpdateProduct>,
) -> Result<Json<Updated>, AppError> {
    input.product_id = id;
    services.products.update(input).await?;
    Ok(Json(Updated { updated: true }))
}

/// Lists the orders that would block the delete.
pub async fn delete_view(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<ProductDeleteView>, AppError> {
    let product = found(services.products.get(id).await?, "product", id)?;
    let usage = services.products.usage(id).await?;
    Ok(Json(ProductDeleteView {
        product,
        in_customer_orders: !usage.customer_orders.is_empty(),
        in_supplier_orders: !usage.supplier_orders.is_empty(),
        usage,
    }))
}

pub async fn delete(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<DeleteOutcome, AppError> {
    found(services.products.get(id).await?, "product", id)?;
    if services.products.delete(id).await? {
        Ok(DeleteOutcome::deleted())
    } else {
        Ok(DeleteOutcome::blocked(
            "This product cannot be deleted because it is used in orders.",
        ))
    }
}

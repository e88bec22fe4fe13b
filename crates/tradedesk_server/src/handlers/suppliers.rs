//! /suppliers

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use tradedesk_core::{
    dto::{CreateSupplier, SupplierDto, UpdateSupplier},
    query::ListParams,
    Services,
};
use uuid::Uuid;

use super::{found, require_id};
use crate::error::AppError;
use crate::views::{Created, DeleteOutcome, FormView, IndexView, SupplierDeleteView, Updated};

pub async fn index(
    Extension(services): Extension<Services>,
    Query(params): Query<ListParams>,
) -> Result<Json<IndexView<SupplierDto, ListParams>>, AppError> {
    let page = services.suppliers.search(&params.party_query()).await?;
    Ok(Json(IndexView::new(page, params)))
}

/// Orders and products included.
pub async fn details(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplierDto>, AppError> {
    let id = require_id(id)?;
    let supplier = found(services.suppliers.get(id, true, true).await?, "supplier", id)?;
    Ok(Json(supplier))
}

pub async fn create_form() -> Json<FormView<CreateSupplier>> {
    Json(FormView::new(CreateSupplier::default()))
}

pub async fn create(
    Extension(services): Extension<Services>,
    Json(input): Json<CreateSupplier>,
) -> Result<Created, AppError> {
    let id = services.suppliers.create(input).await?;
    Ok(Created { id })
}

pub async fn edit_form(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<FormView<UpdateSupplier>>, AppError> {
    let supplier = found(services.suppliers.get(id, false, false).await?, "supplier", id)?;
    Ok(Json(FormView::new(supplier.to_update())))
}

pub async fn edit(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Json(mut input): Json<UpdateSupplier>,
) -> Result<Json<Updated>, AppError> {
    input.supplier_id = id;
    services.suppliers.update(input).await?;
    Ok(Json(Updated { updated: true }))
}

pub async fn delete_view(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplierDeleteView>, AppError> {
    let supplier = found(services.suppliers.get(id, true, true).await?, "supplier", id)?;
    Ok(Json(SupplierDeleteView {
        has_orders: !supplier.orders.is_empty(),
        has_products: !supplier.products.is_empty(),
        supplier,
    }))
}

pub async fn delete(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<DeleteOutcome, AppError> {
    let supplier = found(services.suppliers.get(id, true, true).await?, "supplier", id)?;
    if !supplier.orders.is_empty() {
        return Ok(DeleteOutcome::blocked(
            "Cannot delete supplier with existing orders.",
        ));
    }
    if !supplier.products.is_empty() {
        return Ok(DeleteOutcome::blocked(
            "Cannot delete supplier with existing products.",
        ));
    }
    if services.suppliers.delete(id).await? {
        Ok(DeleteOutcome::deleted())
    } else {
        Ok(DeleteOutcome::blocked("This supplier cannot be deleted."))
    }
}

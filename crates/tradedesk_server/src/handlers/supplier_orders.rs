//! /supplierorders

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::Deserialize;
use tradedesk_core::{
    dto::{CreateSupplierOrder, SupplierOrderDto, UpdateSupplierOrder},
    query::OrderListParams,
    types::SupplierOrderStatus,
    Services,
};
use uuid::Uuid;

use super::{found, require_id};
use crate::error::AppError;
use crate::forms::{check_order_form, SUPPLIER};
use crate::views::{
    product_options, status_options, supplier_options, Created, DeleteOutcome, FormOptions,
    FormView, IndexView, StatusOption, Updated,
};

/// `?id=<supplier>&c=true` when the form is opened from a supplier's page.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FromSupplier {
    pub id: Option<Uuid>,
    pub c: bool,
}

fn statuses() -> Vec<StatusOption> {
    status_options(&SupplierOrderStatus::ALL, |s| s.code())
}

/// Product choices narrow to the supplier's own once one is known.
async fn dropdowns(services: &Services, supplier_id: Uuid) -> Result<FormOptions, AppError> {
    let suppliers = services.suppliers.list_all().await?;
    let products = if supplier_id.is_nil() {
        services.products.list_all().await?
    } else {
        services.products.list_by_supplier(supplier_id).await?
    };
    Ok(FormOptions {
        suppliers: Some(supplier_options(&suppliers)),
        products: Some(product_options(&products)),
        statuses: Some(statuses()),
        ..Default::default()
    })
}

async fn supplier_exists(services: &Services, id: Uuid) -> Result<bool, AppError> {
    Ok(!id.is_nil() && services.suppliers.get(id, false, false).await?.is_some())
}

pub async fn index(
    Extension(services): Extension<Services>,
    Query(params): Query<OrderListParams<SupplierOrderStatus>>,
) -> Result<Json<IndexView<SupplierOrderDto, OrderListParams<SupplierOrderStatus>>>, AppError> {
    let page = services.supplier_orders.search(&params.order_query()).await?;
    let suppliers = services.suppliers.list_all().await?;
    let filters = FormOptions {
        suppliers: Some(supplier_options(&suppliers)),
        statuses: Some(statuses()),
        ..Default::default()
    };
    Ok(Json(IndexView::new(page, params).with_filters(filters)))
}

pub async fn details(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplierOrderDto>, AppError> {
    let id = require_id(id)?;
    let order = found(services.supplier_orders.get(id, true).await?, "order", id)?;
    Ok(Json(order))
}

pub async fn create_form(
    Extension(services): Extension<Services>,
    Query(from): Query<FromSupplier>,
) -> Result<Json<FormView<CreateSupplierOrder>>, AppError> {
    let mut form = CreateSupplierOrder::default();
    if from.c {
        form.supplier_id = from.id.unwrap_or_default();
        form.from_supplier = true;
    }
    let options = dropdowns(&services, form.supplier_id).await?;
    let mut view = FormView::with_options(form, options);
    view.from_party = from.c;
    Ok(Json(view))
}

pub async fn create(
    Extension(services): Extension<Services>,
    Json(input): Json<CreateSupplierOrder>,
) -> Result<Created, AppError> {
    let exists = supplier_exists(&services, input.supplier_id).await?;
    let errors = check_order_form(SUPPLIER, exists, &input.order_number, &input.items);
    if !errors.is_empty() {
        return Err(AppError::form(errors));
    }
    let id = services.supplier_orders.create(input).await?;
    Ok(Created { id })
}

pub async fn edit_form(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Query(from): Query<FromSupplier>,
) -> Result<Json<FormView<UpdateSupplierOrder>>, AppError> {
    let order = found(services.supplier_orders.get(id, true).await?, "order", id)?;
    let options = dropdowns(&services, order.supplier_id).await?;
    let mut view = FormView::with_options(order.to_update(), options);
    view.from_party = from.c;
    Ok(Json(view))
}

pub async fn edit(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
    Json(mut input): Json<UpdateSupplierOrder>,
) -> Result<Json<Updated>, AppError> {
    found(services.supplier_orders.get(id, false).await?, "order", id)?;
    input.order_id = id;

    let exists = supplier_exists(&services, input.supplier_id).await?;
    let errors = check_order_form(SUPPLIER, exists, &input.order_number, &input.items);
    if !errors.is_empty() {
        return Err(AppError::form(errors));
    }
    if !services.supplier_orders.update(input).await? {
        return Err(AppError::not_found(format!("order {id}")));
    }
    Ok(Json(Updated { updated: true }))
}

pub async fn delete_view(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<Json<SupplierOrderDto>, AppError> {
    let order = found(services.supplier_orders.get(id, false).await?, "order", id)?;
    Ok(Json(order))
}

pub async fn delete(
    Extension(services): Extension<Services>,
    Path(id): Path<Uuid>,
) -> Result<DeleteOutcome, AppError> {
    if !services.supplier_orders.delete(id).await? {
        return Err(AppError::not_found(format!("order {id}")));
    }
    Ok(DeleteOutcome::deleted())
}

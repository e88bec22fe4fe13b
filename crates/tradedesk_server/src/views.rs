//! JSON view models returned by the handlers.

use axum::{http::StatusCode, response::IntoResponse, response::Response, Json};
use serde::Serialize;
use tradedesk_core::dto::{CustomerDto, ProductDto, ProductUsage, SupplierDto};
use tradedesk_core::query::Page;
use uuid::Uuid;

pub const PLEASE_SELECT: &str = "-- please select --";

/// A result page plus the parameters that produced it.
#[derive(Debug, Serialize)]
pub struct IndexView<T, P> {
    #[serde(flatten)]
    pub page: Page<T>,
    pub query: P,
    /// Dropdowns for the filter bar, where the index has any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filters: Option<FormOptions>,
}

impl<T, P> IndexView<T, P> {
    pub fn new(page: Page<T>, query: P) -> Self {
        Self {
            page,
            query,
            filters: None,
        }
    }

    pub fn with_filters(mut self, filters: FormOptions) -> Self {
        self.filters = Some(filters);
        self
    }
}

// ── Forms ─────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    pub value: Uuid,
    pub label: String,
}

impl SelectOption {
    /// Nil-valued first entry of every dropdown.
    pub fn placeholder() -> Self {
        Self {
            value: Uuid::nil(),
            label: PLEASE_SELECT.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusOption {
    pub code: i16,
    pub name: String,
}

#[derive(Debug, Default, Serialize)]
pub struct FormOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customers: Option<Vec<SelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suppliers: Option<Vec<SelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub products: Option<Vec<SelectOption>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub statuses: Option<Vec<StatusOption>>,
}

#[derive(Debug, Serialize)]
pub struct FormView<F> {
    pub form: F,
    pub options: FormOptions,
    /// Opened from the party's details page.
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub from_party: bool,
}

impl<F> FormView<F> {
    pub fn new(form: F) -> Self {
        Self {
            form,
            options: FormOptions::default(),
            from_party: false,
        }
    }

    pub fn with_options(form: F, options: FormOptions) -> Self {
        Self {
            form,
            options,
            from_party: false,
        }
    }
}

fn with_placeholder(options: impl IntoIterator<Item = SelectOption>) -> Vec<SelectOption> {
    std::iter::once(SelectOption::placeholder())
        .chain(options)
        .collect()
}

pub fn customer_options(customers: &[CustomerDto]) -> Vec<SelectOption> {
    with_placeholder(customers.iter().map(|c| SelectOption {
        value: c.customer_id,
        label: c.name.clone(),
    }))
}

pub fn supplier_options(suppliers: &[SupplierDto]) -> Vec<SelectOption> {
    with_placeholder(suppliers.iter().map(|s| SelectOption {
        value: s.supplier_id,
        label: s.name.clone(),
    }))
}

/// Labelled "code - name", or just the code for unnamed products.
pub fn product_options(products: &[ProductDto]) -> Vec<SelectOption> {
    with_placeholder(products.iter().map(|p| SelectOption {
        value: p.product_id,
        label: match &p.name {
            Some(name) => format!("{} - {}", p.code, name),
            None => p.code.clone(),
        },
    }))
}

pub fn status_options<S: AsRef<str>>(all: &[S], code: impl Fn(&S) -> i16) -> Vec<StatusOption> {
    all.iter()
        .map(|s| StatusOption {
            code: code(s),
            name: s.as_ref().to_string(),
        })
        .collect()
}

// ── Write results ─────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct Created {
    pub id: Uuid,
}

impl IntoResponse for Created {
    fn into_response(self) -> Response {
        (StatusCode::CREATED, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct Updated {
    pub updated: bool,
}

/// 200 when deleted, 409 with a warning when a reference blocked it.
#[derive(Debug, Serialize)]
pub struct DeleteOutcome {
    pub deleted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub warning: Option<String>,
}

impl DeleteOutcome {
    pub fn deleted() -> Self {
        Self {
            deleted: true,
            warning: None,
        }
    }

    pub fn blocked(warning: impl Into<String>) -> Self {
        Self {
            deleted: false,
            warning: Some(warning.into()),
        }
    }
}

impl IntoResponse for DeleteOutcome {
    fn into_response(self) -> Response {
        let status = if self.deleted {
            StatusCode::OK
        } else {
            StatusCode::CONFLICT
        };
        (status, Json(self)).into_response()
    }
}

// ── Delete confirmations ──────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CustomerDeleteView {
    #[serde(flatten)]
    pub customer: CustomerDto,
    pub has_orders: bool,
}

#[derive(Debug, Serialize)]
pub struct SupplierDeleteView {
    #[serde(flatten)]
    pub supplier: SupplierDto,
    pub has_orders: bool,
    pub has_products: bool,
}

#[derive(Debug, Serialize)]
pub struct ProductDeleteView {
    #[serde(flatten)]
    pub product: ProductDto,
    pub in_customer_orders: bool,
    pub in_supplier_orders: bool,
    pub usage: ProductUsage,
}

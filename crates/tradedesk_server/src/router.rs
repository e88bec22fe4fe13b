//! Router construction for the tradedesk server.

use axum::{routing::get, Extension, Router};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tradedesk_core::Services;

use crate::handlers::{
    customer_orders, customers, health, products, supplier_orders, suppliers,
};

/// Build the full axum router with all routes and middleware.
///
/// Each entity answers on `/{entity}`, `/{entity}/index`, `/{entity}/details/:id`,
/// and GET (form) / POST (submit) pairs under `create`, `edit/:id` and `delete/:id`.
pub fn build_router(services: Services) -> Router {
    let customers = Router::new()
        .route("/customers", get(customers::index))
        .route("/customers/index", get(customers::index))
        .route("/customers/details/:id", get(customers::details))
        .route(
            "/customers/create",
            get(customers::create_form).post(customers::create),
        )
        .route(
            "/customers/edit/:id",
            get(customers::edit_form).post(customers::edit),
        )
        .route(
            "/customers/delete/:id",
            get(customers::delete_view).post(customers::delete),
        );

    let suppliers = Router::new()
        .route("/suppliers", get(suppliers::index))
        .route("/suppliers/index", get(suppliers::index))
        .route("/suppliers/details/:id", get(suppliers::details))
        .route(
            "/suppliers/create",
            get(suppliers::create_form).post(suppliers::create),
        )
        .route(
            "/suppliers/edit/:id",
            get(suppliers::edit_form).post(suppliers::edit),
        )
        .route(
            "/suppliers/delete/:id",
            get(suppliers::delete_view).post(suppliers::delete),
        );

    let products = Router::new()
        .route("/products", get(products::index))
        .route("/products/index", get(products::index))
        .route("/products/details/:id", get(products::details))
        .route(
            "/products/create",
            get(products::create_form).post(products::create),
        )
        .route(
            "/products/edit/:id",
            get(products::edit_form).post(products::edit),
        )
        .route(
            "/products/delete/:id",
            get(products::delete_view).post(products::delete),
        );

    let customer_orders = Router::new()
        .route("/customerorders", get(customer_orders::index))
        .route("/customerorders/index", get(customer_orders::index))
        .route("/customerorders/details/:id", get(customer_orders::details))
        .route(
            "/customerorders/create",
            get(customer_orders::create_form).post(customer_orders::create),
        )
        .route(
            "/customerorders/edit/:id",
            get(customer_orders::edit_form).post(customer_orders::edit),
        )
        .route(
            "/customerorders/delete/:id",
            get(customer_orders::delete_view).post(customer_orders::delete),
        );

    let supplier_orders = Router::new()
        .route("/supplierorders", get(supplier_orders::index))
        .route("/supplierorders/index", get(supplier_orders::index))
        .route("/supplierorders/details/:id", get(supplier_orders::details))
        .route(
            "/supplierorders/create",
            get(supplier_orders::create_form).post(supplier_orders::create),
        )
        .route(
            "/supplierorders/edit/:id",
            get(supplier_orders::edit_form).post(supplier_orders::edit),
        )
        .route(
            "/supplierorders/delete/:id",
            get(supplier_orders::delete_view).post(supplier_orders::delete),
        );

    Router::new()
        .route("/health", get(health::health))
        .merge(customers)
        .merge(suppliers)
        .merge(products)
        .merge(customer_orders)
        .merge(supplier_orders)
        .layer(Extension(services))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}

// src/lib.rs

use axum::{
    routing::{get, patch, post},
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

pub mod common;
pub mod config;
pub mod db;
pub mod docs;
pub mod handlers;
pub mod models;
pub mod services;

use crate::config::AppState;
use crate::docs::ApiDoc;

/// Tabela única de rotas. Registrar o mesmo método + caminho duas vezes
/// faz o axum entrar em pânico já na montagem do Router.
pub fn router(app_state: AppState) -> Router {
    let product_routes = Router::new()
        .route(
            "/",
            post(handlers::inventory::create_product).get(handlers::inventory::list_products),
        )
        .route("/batch", post(handlers::inventory::create_products_batch))
        .route("/quick-purchase", post(handlers::inventory::quick_purchase))
        .route("/{id}", patch(handlers::inventory::update_product))
        .route("/{id}/purchase", post(handlers::inventory::record_purchase))
        .route("/{id}/history", get(handlers::inventory::get_history))
        .route("/{id}/summary", get(handlers::inventory::get_summary));

    let order_routes = Router::new()
        .route(
            "/",
            post(handlers::operations::create_order).get(handlers::operations::list_orders),
        )
        .route("/{id}", get(handlers::operations::get_order));

    let customer_routes = Router::new()
        .route(
            "/",
            post(handlers::crm::upsert_customer).get(handlers::crm::list_customers),
        )
        .route("/{phone}", get(handlers::crm::get_customer));

    // Combina tudo no router principal
    Router::new()
        .route("/", get(handlers::inventory::root))
        .nest("/products", product_routes)
        .nest("/orders", order_routes)
        .nest("/customers", customer_routes)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .fallback(handlers::inventory::not_found)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(app_state)
}

// src/docs.rs

use utoipa::OpenApi;

use crate::handlers;
use crate::models;

#[derive(OpenApi)]
#[openapi(
    info(title = "Saleh Digital API", description = "Estoque, compras, pedidos e clientes"),
    paths(
        // --- INVENTORY ---
        handlers::inventory::create_product,
        handlers::inventory::create_products_batch,
        handlers::inventory::list_products,
        handlers::inventory::record_purchase,
        handlers::inventory::quick_purchase,
        handlers::inventory::get_history,
        handlers::inventory::get_summary,
        handlers::inventory::update_product,

        // --- ORDERS ---
        handlers::operations::create_order,
        handlers::operations::list_orders,
        handlers::operations::get_order,

        // --- CRM ---
        handlers::crm::upsert_customer,
        handlers::crm::list_customers,
        handlers::crm::get_customer,
    ),
    components(
        schemas(
            // --- Inventory ---
            models::inventory::Product,
            models::inventory::Purchase,
            models::inventory::ProductHistory,
            models::inventory::ProductSummary,
            models::inventory::BatchItemResult,

            // --- Orders ---
            models::operations::Order,

            // --- CRM ---
            models::crm::Customer,

            // --- Payloads ---
            handlers::inventory::CreateProductPayload,
            handlers::inventory::BatchProductItem,
            handlers::inventory::BatchProductsPayload,
            handlers::inventory::RecordPurchasePayload,
            handlers::inventory::QuickPurchasePayload,
            handlers::inventory::UpdateProductPayload,
            handlers::operations::CreateOrderPayload,
            handlers::crm::UpsertCustomerPayload,

            // --- Respostas ---
            handlers::inventory::CreatedResponse,
            handlers::inventory::BatchResponse,
            handlers::inventory::PurchaseResponse,
            handlers::inventory::QuickPurchaseResponse,
        )
    ),
    tags(
        (name = "Inventory", description = "Produtos, compras e estoque"),
        (name = "Orders", description = "Pedidos do garçom, cozinha e NicoChat"),
        (name = "CRM", description = "Clientes por telefone")
    )
)]
pub struct ApiDoc;

// src/handlers/operations.rs

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    config::AppState,
    handlers::inventory::CreatedResponse,
    models::operations::{NewOrder, Order},
};

// =============================================================================
//  PEDIDOS (GARÇOM / COZINHA / NICOCHAT)
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
    // Número ou rótulo da mesa ("12", 12, "A3"), guardado como veio
    #[schema(value_type = Option<Object>, example = "A3")]
    pub table_number: Option<Value>,

    #[schema(example = "João")]
    pub customer_name: Option<String>,

    // "garcom" | "nicochat" | "app"
    #[schema(example = "garcom")]
    pub channel: Option<String>,

    #[serde(default)]
    #[schema(value_type = Object)]
    pub items: Value,

    #[serde(default)]
    #[schema(example = "Sem cebola")]
    pub notes: String,
}

impl From<CreateOrderPayload> for NewOrder {
    fn from(payload: CreateOrderPayload) -> Self {
        NewOrder {
            table_number: payload.table_number,
            customer_name: payload.customer_name,
            channel: payload.channel,
            // Sem itens vira lista vazia
            items: match payload.items {
                Value::Null => Value::Array(Vec::new()),
                items => items,
            },
            notes: payload.notes,
        }
    }
}

// POST /orders
#[utoipa::path(
    post,
    path = "/orders",
    tag = "Orders",
    request_body = CreateOrderPayload,
    responses(
        (status = 201, description = "Pedido criado (status pendente)", body = CreatedResponse)
    )
)]
pub async fn create_order(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateOrderPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state
        .operations_service
        .create_order(payload.into())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: order.id,
            message: "Pedido criado".into(),
        }),
    ))
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListOrdersQuery {
    /// Padrão: "pendente"
    pub status: Option<String>,
}

// GET /orders?status=pendente
#[utoipa::path(
    get,
    path = "/orders",
    tag = "Orders",
    params(ListOrdersQuery),
    responses(
        (status = 200, description = "Pedidos com o status pedido", body = Vec<Order>)
    )
)]
pub async fn list_orders(
    State(app_state): State<AppState>,
    Query(query): Query<ListOrdersQuery>,
) -> Result<impl IntoResponse, AppError> {
    let orders = app_state
        .operations_service
        .list_orders(query.status.as_deref())
        .await?;

    Ok((StatusCode::OK, Json(orders)))
}

// GET /orders/{id}
#[utoipa::path(
    get,
    path = "/orders/{id}",
    tag = "Orders",
    responses(
        (status = 200, description = "Pedido", body = Order),
        (status = 404, description = "Pedido não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Pedido")
    )
)]
pub async fn get_order(
    State(app_state): State<AppState>,
    WithRejection(Path(order_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let order = app_state.operations_service.get_order(order_id).await?;
    Ok((StatusCode::OK, Json(order)))
}

// src/handlers/crm.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use utoipa::ToSchema;

use crate::{
    common::error::AppError,
    config::AppState,
    models::crm::{Customer, CustomerUpsert, DEFAULT_CUSTOMER_CHANNEL},
};

// =============================================================================
//  CLIENTES / CRM
// =============================================================================

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpsertCustomerPayload {
    #[schema(example = "Maria da Silva")]
    pub name: Option<String>,

    #[schema(example = "5511999990000")]
    pub phone: Option<String>,

    // garcom | nicochat | app | presencial
    #[schema(example = "nicochat")]
    pub channel: Option<String>,

    #[serde(default)]
    pub notes: String,
}

impl TryFrom<UpsertCustomerPayload> for CustomerUpsert {
    type Error = AppError;

    fn try_from(payload: UpsertCustomerPayload) -> Result<Self, Self::Error> {
        let phone = payload
            .phone
            .filter(|p| !p.trim().is_empty())
            .ok_or_else(|| AppError::BadRequest("Telefone (phone) é obrigatório".into()))?;

        // Os padrões valem tanto na criação quanto na atualização
        Ok(CustomerUpsert {
            phone,
            name: payload.name,
            channel: payload
                .channel
                .unwrap_or_else(|| DEFAULT_CUSTOMER_CHANNEL.to_string()),
            notes: payload.notes,
        })
    }
}

// POST /customers
#[utoipa::path(
    post,
    path = "/customers",
    tag = "CRM",
    request_body = UpsertCustomerPayload,
    responses(
        (status = 201, description = "Cliente criado", body = Customer),
        (status = 200, description = "Cliente atualizado", body = Customer),
        (status = 400, description = "Telefone ausente")
    )
)]
pub async fn upsert_customer(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<UpsertCustomerPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .crm_service
        .upsert_customer(CustomerUpsert::try_from(payload)?)
        .await?;

    let status = if outcome.created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };
    Ok((status, Json(outcome.customer)))
}

// GET /customers
#[utoipa::path(
    get,
    path = "/customers",
    tag = "CRM",
    responses(
        (status = 200, description = "Clientes por nome (máximo 200)", body = Vec<Customer>)
    )
)]
pub async fn list_customers(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let customers = app_state.crm_service.list_customers().await?;
    Ok((StatusCode::OK, Json(customers)))
}

// GET /customers/{phone}
#[utoipa::path(
    get,
    path = "/customers/{phone}",
    tag = "CRM",
    responses(
        (status = 200, description = "Cliente", body = Customer),
        (status = 404, description = "Cliente não encontrado")
    ),
    params(
        ("phone" = String, Path, description = "Telefone do cliente")
    )
)]
pub async fn get_customer(
    State(app_state): State<AppState>,
    WithRejection(Path(phone), _): WithRejection<Path<String>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let customer = app_state.crm_service.get_customer(&phone).await?;
    Ok((StatusCode::OK, Json(customer)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_phone_is_a_bad_request() {
        let payload: UpsertCustomerPayload =
            serde_json::from_str(r#"{"name":"Maria"}"#).unwrap();
        assert!(matches!(
            CustomerUpsert::try_from(payload),
            Err(AppError::BadRequest(_))
        ));
    }

    #[test]
    fn channel_defaults_to_walk_in() {
        let payload: UpsertCustomerPayload =
            serde_json::from_str(r#"{"name":"Maria","phone":"5511999990000"}"#).unwrap();
        let upsert = CustomerUpsert::try_from(payload).unwrap();

        assert_eq!(upsert.channel, "presencial");
        assert_eq!(upsert.notes, "");
    }
}

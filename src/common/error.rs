// src/common/error.rs

use axum::{
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::models::inventory::PurchaseError;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Erro de validação")]
    ValidationError(#[from] validator::ValidationErrors),

    // Campos obrigatórios ausentes ou requisição sem nada para fazer
    #[error("Requisição inválida: {0}")]
    BadRequest(String),

    #[error(transparent)]
    InvalidPurchase(#[from] PurchaseError),

    #[error("Produto não encontrado")]
    ProductNotFound,

    #[error("Pedido não encontrado")]
    OrderNotFound,

    #[error("Cliente não encontrado")]
    CustomerNotFound,

    #[error("Erro de banco de dados")]
    DatabaseError(#[from] sqlx::Error),

    #[error("Erro interno do servidor")]
    InternalServerError(#[from] anyhow::Error),
}

// Corpo ou caminho mal formado vira 400 com o envelope JSON padrão.
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::BadRequest(_)
            | AppError::InvalidPurchase(_) => StatusCode::BAD_REQUEST,
            AppError::ProductNotFound | AppError::OrderNotFound | AppError::CustomerNotFound => {
                StatusCode::NOT_FOUND
            }
            AppError::DatabaseError(_) | AppError::InternalServerError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_message = match self {
            // Retorna os detalhes da validação campo a campo.
            AppError::ValidationError(errors) => {
                let mut details = std::collections::HashMap::new();
                for (field, field_errors) in errors.field_errors() {
                    let messages: Vec<String> = field_errors
                        .iter()
                        .filter_map(|e| e.message.as_ref().map(|m| m.to_string()))
                        .collect();
                    details.insert(field.to_string(), messages);
                }
                let body = Json(json!({
                    "error": "Um ou mais campos são inválidos.",
                    "details": details,
                }));
                return (status, body).into_response();
            }
            AppError::BadRequest(message) => message,
            AppError::InvalidPurchase(reason) => reason.to_string(),
            AppError::ProductNotFound => "Produto não encontrado".to_string(),
            AppError::OrderNotFound => "Pedido não encontrado".to_string(),
            AppError::CustomerNotFound => "Cliente não encontrado".to_string(),

            // O resto vira 500. A causa vai só para o log, nunca para o cliente.
            ref e @ (AppError::DatabaseError(_) | AppError::InternalServerError(_)) => {
                tracing::error!("Erro Interno do Servidor: {:?}", e);
                "Ocorreu um erro inesperado.".to_string()
            }
        };

        let body = Json(json!({ "error": error_message }));
        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_variants_map_to_404() {
        assert_eq!(AppError::ProductNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::OrderNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::CustomerNotFound.status_code(), StatusCode::NOT_FOUND);
    }

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn internal_errors_hide_the_cause() {
        let response =
            AppError::InternalServerError(anyhow::anyhow!("senha=123 vazou")).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Ocorreu um erro inesperado." })
        );
    }

    #[tokio::test]
    async fn purchase_errors_are_bad_requests() {
        let response = AppError::from(PurchaseError::Overflow).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            body_json(response).await,
            json!({ "error": "Os valores da compra excedem o limite suportado." })
        );
    }
}

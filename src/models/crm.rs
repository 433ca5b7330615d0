// src/models/crm.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Canal padrão do cliente (atendimento no balcão).
pub const DEFAULT_CUSTOMER_CHANNEL: &str = "presencial";

// --- CLIENTE ---
// A chave natural é o telefone: `id` e `phone` têm sempre o mesmo valor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    #[schema(example = "5511999990000")]
    pub id: String,
    #[schema(example = "Maria da Silva")]
    pub name: Option<String>,
    #[schema(example = "5511999990000")]
    pub phone: String,
    // garcom | nicochat | app | presencial
    #[schema(example = "presencial")]
    pub channel: String,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Dados do upsert, com os padrões já aplicados.
#[derive(Debug, Clone)]
pub struct CustomerUpsert {
    pub phone: String,
    pub name: Option<String>,
    pub channel: String,
    pub notes: String,
}

/// Indica se o upsert criou ou atualizou o cliente.
#[derive(Debug, Clone)]
pub struct UpsertOutcome {
    pub customer: Customer,
    pub created: bool,
}

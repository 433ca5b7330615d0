// src/models/operations.rs

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Status com que todo pedido nasce.
pub const DEFAULT_ORDER_STATUS: &str = "pendente";

// --- Pedido (Garçom / Cozinha / NicoChat) ---
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: Uuid,
    // Número ou rótulo da mesa ("12", 12, "A3"), guardado como veio
    #[schema(value_type = Option<Object>, example = "A3")]
    pub table_number: Option<Value>,
    #[schema(example = "João")]
    pub customer_name: Option<String>,
    // "garcom" | "nicochat" | "app" (não validado)
    #[schema(example = "garcom")]
    pub channel: Option<String>,
    #[schema(example = "pendente")]
    pub status: String,
    // Itens opacos: o backend só guarda o que o cliente mandou
    #[schema(value_type = Object, example = json!([{"name": "X-Burger", "qty": 2}]))]
    pub items: Value,
    pub notes: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub table_number: Option<Value>,
    pub customer_name: Option<String>,
    pub channel: Option<String>,
    pub items: Value,
    pub notes: String,
}

impl NewOrder {
    pub fn into_order(self, id: Uuid, now: DateTime<Utc>) -> Order {
        Order {
            id,
            table_number: self.table_number,
            customer_name: self.customer_name,
            channel: self.channel,
            status: DEFAULT_ORDER_STATUS.to_string(),
            items: self.items,
            notes: self.notes,
            created_at: now,
            updated_at: now,
        }
    }
}

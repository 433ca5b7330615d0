// src/services/operation_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::OrderStore,
    models::operations::{NewOrder, Order, DEFAULT_ORDER_STATUS},
};

#[derive(Clone)]
pub struct OperationsService {
    store: Arc<dyn OrderStore>,
}

impl OperationsService {
    pub fn new(store: Arc<dyn OrderStore>) -> Self {
        Self { store }
    }

    // --- PEDIDOS ---

    /// O pedido sempre nasce "pendente". Canal e itens não são validados.
    pub async fn create_order(&self, order: NewOrder) -> Result<Order, AppError> {
        let order = self.store.insert_order(order).await?;
        tracing::info!(order_id = %order.id, channel = ?order.channel, "Pedido criado");
        Ok(order)
    }

    pub async fn list_orders(&self, status: Option<&str>) -> Result<Vec<Order>, AppError> {
        let status = status
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_ORDER_STATUS);
        self.store.list_orders_by_status(status).await
    }

    pub async fn get_order(&self, id: Uuid) -> Result<Order, AppError> {
        self.store
            .find_order(id)
            .await?
            .ok_or(AppError::OrderNotFound)
    }
}

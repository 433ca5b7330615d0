// src/db/operations_repo.rs

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::operations::{NewOrder, Order, DEFAULT_ORDER_STATUS},
};

#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError>;

    /// Filtro simples por igualdade, sem ordenação.
    async fn list_orders_by_status(&self, status: &str) -> Result<Vec<Order>, AppError>;

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError>;
}

#[derive(Clone)]
pub struct OperationsRepository {
    pool: PgPool,
}

impl OperationsRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl OrderStore for OperationsRepository {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError> {
        let order = sqlx::query_as::<_, Order>(
            r#"
            INSERT INTO orders (id, table_number, customer_name, channel, status, items, notes)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(order.table_number)
        .bind(order.customer_name)
        .bind(order.channel)
        .bind(DEFAULT_ORDER_STATUS)
        .bind(order.items)
        .bind(order.notes)
        .fetch_one(&self.pool)
        .await?;
        Ok(order)
    }

    async fn list_orders_by_status(&self, status: &str) -> Result<Vec<Order>, AppError> {
        let orders = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE status = $1")
            .bind(status)
            .fetch_all(&self.pool)
            .await?;
        Ok(orders)
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let order = sqlx::query_as::<_, Order>("SELECT * FROM orders WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(order)
    }
}

// src/db/crm_repo.rs

use async_trait::async_trait;
use sqlx::{FromRow, PgPool};

use crate::{
    common::error::AppError,
    models::crm::{Customer, CustomerUpsert, UpsertOutcome},
};

/// Máximo de clientes devolvidos pela listagem (não há paginação).
pub const CUSTOMER_LIST_LIMIT: i64 = 200;

#[async_trait]
pub trait CustomerStore: Send + Sync {
    /// Cria o cliente se o telefone não existir; senão sobrescreve nome, canal e notas.
    async fn upsert_customer(&self, customer: CustomerUpsert) -> Result<UpsertOutcome, AppError>;

    /// Clientes por nome, no máximo `CUSTOMER_LIST_LIMIT`.
    async fn list_customers(&self) -> Result<Vec<Customer>, AppError>;

    async fn find_customer(&self, phone: &str) -> Result<Option<Customer>, AppError>;
}

#[derive(FromRow)]
struct UpsertedCustomer {
    #[sqlx(flatten)]
    customer: Customer,
    inserted: bool,
}

#[derive(Clone)]
pub struct CrmRepository {
    pool: PgPool,
}

impl CrmRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CustomerStore for CrmRepository {
    async fn upsert_customer(&self, customer: CustomerUpsert) -> Result<UpsertOutcome, AppError> {
        // UPSERT atômico. `xmax = 0` só é verdadeiro quando a linha acabou de ser inserida.
        let row = sqlx::query_as::<_, UpsertedCustomer>(
            r#"
            INSERT INTO customers (id, name, phone, channel, notes)
            VALUES ($1, $2, $1, $3, $4)
            ON CONFLICT (id) DO UPDATE SET
                name = EXCLUDED.name,
                channel = EXCLUDED.channel,
                notes = EXCLUDED.notes,
                updated_at = now()
            RETURNING *, (xmax = 0) AS inserted
            "#,
        )
        .bind(&customer.phone)
        .bind(&customer.name)
        .bind(&customer.channel)
        .bind(&customer.notes)
        .fetch_one(&self.pool)
        .await?;

        Ok(UpsertOutcome {
            customer: row.customer,
            created: row.inserted,
        })
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let customers = sqlx::query_as::<_, Customer>(
            r#"SELECT * FROM customers ORDER BY name COLLATE "C" ASC LIMIT $1"#,
        )
        .bind(CUSTOMER_LIST_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(customers)
    }

    async fn find_customer(&self, phone: &str) -> Result<Option<Customer>, AppError> {
        let customer = sqlx::query_as::<_, Customer>("SELECT * FROM customers WHERE id = $1")
            .bind(phone)
            .fetch_optional(&self.pool)
            .await?;
        Ok(customer)
    }
}

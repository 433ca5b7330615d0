// src/services/crm_service.rs

use std::sync::Arc;

use crate::{
    common::error::AppError,
    db::CustomerStore,
    models::crm::{Customer, CustomerUpsert, UpsertOutcome},
};

#[derive(Clone)]
pub struct CrmService {
    store: Arc<dyn CustomerStore>,
}

impl CrmService {
    pub fn new(store: Arc<dyn CustomerStore>) -> Self {
        Self { store }
    }

    /// Cria ou atualiza o cliente pela chave natural (telefone).
    pub async fn upsert_customer(&self, customer: CustomerUpsert) -> Result<UpsertOutcome, AppError> {
        if customer.phone.trim().is_empty() {
            return Err(AppError::BadRequest("Telefone (phone) é obrigatório".into()));
        }

        let outcome = self.store.upsert_customer(customer).await?;
        tracing::info!(
            phone = %outcome.customer.phone,
            created = outcome.created,
            "Cliente salvo"
        );
        Ok(outcome)
    }

    pub async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        self.store.list_customers().await
    }

    pub async fn get_customer(&self, phone: &str) -> Result<Customer, AppError> {
        self.store
            .find_customer(phone)
            .await?
            .ok_or(AppError::CustomerNotFound)
    }
}

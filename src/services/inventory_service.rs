// src/services/inventory_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::InventoryStore,
    models::inventory::{
        average_unit_price, BatchItemResult, NewProduct, Product, ProductChanges, ProductHistory,
        ProductSummary, Purchase, PurchaseEntry, QuickPurchaseOutcome,
    },
};

/// Quantas compras entram na média do resumo.
pub const RECENT_PURCHASES: usize = 4;

/// Uma linha do cadastro em lote, do jeito que veio (campos podem faltar).
#[derive(Debug, Clone, Default)]
pub struct BatchCandidate {
    pub description: Option<String>,
    pub unit: Option<String>,
    pub unit_price: Option<rust_decimal::Decimal>,
}

impl BatchCandidate {
    /// Linha válida vira um produto "em branco"; inválida devolve o motivo.
    fn into_new_product(self) -> Result<NewProduct, String> {
        let description = self.description.filter(|d| !d.trim().is_empty());
        let unit = self.unit.filter(|u| !u.trim().is_empty());

        match (description, unit, self.unit_price) {
            (Some(description), Some(unit), Some(unit_price)) => {
                Ok(NewProduct::blank(description, unit, unit_price))
            }
            (description, unit, unit_price) => {
                let mut missing = Vec::new();
                if description.is_none() {
                    missing.push("description");
                }
                if unit.is_none() {
                    missing.push("unit");
                }
                if unit_price.is_none() {
                    missing.push("unitPrice");
                }
                Err(format!("Campos obrigatórios ausentes: {}", missing.join(", ")))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub total: usize,
    pub created: usize,
    pub results: Vec<BatchItemResult>,
}

#[derive(Clone)]
pub struct InventoryService {
    store: Arc<dyn InventoryStore>,
}

impl InventoryService {
    pub fn new(store: Arc<dyn InventoryStore>) -> Self {
        Self { store }
    }

    // --- PRODUTOS ---

    pub async fn create_product(&self, product: NewProduct) -> Result<Product, AppError> {
        let product = self.store.insert_product(product).await?;
        tracing::info!(product_id = %product.id, "Produto criado");
        Ok(product)
    }

    /// Linhas inválidas são rejeitadas e reportadas; as válidas vão num único lote atômico.
    pub async fn create_products_batch(
        &self,
        candidates: Vec<BatchCandidate>,
    ) -> Result<BatchOutcome, AppError> {
        let total = candidates.len();
        if total == 0 {
            return Err(AppError::BadRequest(
                "Envie um array de produtos em 'items' ou um array direto no body".into(),
            ));
        }

        let mut accepted = Vec::new();
        let mut rejected = Vec::new();
        for (index, candidate) in candidates.into_iter().enumerate() {
            match candidate.into_new_product() {
                Ok(product) => accepted.push((index, product)),
                Err(reason) => rejected.push(BatchItemResult::Rejected { index, reason }),
            }
        }

        let (indexes, products): (Vec<usize>, Vec<NewProduct>) = accepted.into_iter().unzip();
        let created = if products.is_empty() {
            Vec::new()
        } else {
            self.store.insert_products(products).await?
        };

        let mut results: Vec<BatchItemResult> = indexes
            .into_iter()
            .zip(created.iter())
            .map(|(index, product)| BatchItemResult::Accepted { index, id: product.id })
            .chain(rejected)
            .collect();
        results.sort_by_key(|r| match r {
            BatchItemResult::Accepted { index, .. } | BatchItemResult::Rejected { index, .. } => {
                *index
            }
        });

        if created.len() < total {
            tracing::warn!(total, created = created.len(), "Lote com linhas rejeitadas");
        }

        Ok(BatchOutcome {
            total,
            created: created.len(),
            results,
        })
    }

    pub async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        self.store.list_products().await
    }

    pub async fn update_product(
        &self,
        id: Uuid,
        changes: ProductChanges,
    ) -> Result<Product, AppError> {
        // Primeiro a existência (404), depois se há algo para gravar (400)
        self.store
            .find_product(id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        if changes.is_empty() {
            return Err(AppError::BadRequest("Nenhum campo para atualizar".into()));
        }

        self.store
            .update_product(id, &changes)
            .await?
            .ok_or(AppError::ProductNotFound)
    }

    // --- COMPRAS ---

    pub async fn record_purchase(
        &self,
        product_id: Uuid,
        entry: PurchaseEntry,
    ) -> Result<Purchase, AppError> {
        let (product, purchase) = self
            .store
            .record_purchase(product_id, entry)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        tracing::info!(
            product_id = %product.id,
            stock_before = %purchase.stock_before,
            stock_after = %purchase.stock_after,
            "Compra registrada"
        );
        Ok(purchase)
    }

    pub async fn quick_purchase(
        &self,
        description: &str,
        unit: &str,
        entry: PurchaseEntry,
    ) -> Result<QuickPurchaseOutcome, AppError> {
        let outcome = self.store.quick_purchase(description, unit, entry).await?;

        tracing::info!(
            product_id = %outcome.product.id,
            created_new = outcome.created_new,
            "Compra rápida registrada"
        );
        Ok(outcome)
    }

    // --- CONSULTAS ---

    pub async fn history(&self, product_id: Uuid) -> Result<ProductHistory, AppError> {
        let product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        let purchases = self.store.list_purchases(product_id, None).await?;
        let recent = &purchases[..purchases.len().min(RECENT_PURCHASES)];
        let average_last4_unit_price = average_unit_price(recent);

        Ok(ProductHistory {
            product,
            purchases,
            average_last4_unit_price,
        })
    }

    pub async fn summary(&self, product_id: Uuid) -> Result<ProductSummary, AppError> {
        let product = self
            .store
            .find_product(product_id)
            .await?
            .ok_or(AppError::ProductNotFound)?;

        let last_purchases = self
            .store
            .list_purchases(product_id, Some(RECENT_PURCHASES as i64))
            .await?;
        let avg_last4_unit_price = average_unit_price(&last_purchases);

        Ok(ProductSummary {
            product,
            last_purchases,
            avg_last4_unit_price,
        })
    }
}

// src/models/inventory.rs

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use utoipa::ToSchema;
use uuid::Uuid;

// --- 1. Produto (Insumo) ---
// Guarda o saldo corrente e o preço unitário da última compra.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: Uuid,
    #[schema(example = "Farinha de trigo")]
    pub description: String,
    #[schema(example = "kg")]
    pub unit: String,
    pub unit_size: Option<Decimal>,
    #[schema(example = 5.5)]
    pub unit_price: Decimal,
    // 100 na criação simples, nulo no lote e na compra rápida
    pub yield_percent: Option<Decimal>,
    pub notes: String,
    pub location: String,

    // Modelo simples de estoque: current = previous + purchase
    pub previous_quantity: Decimal,
    pub purchase_quantity: Decimal,
    pub current_quantity: Decimal,

    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

// --- 2. Compra (Histórico) ---
// Filha do produto. Criada uma vez, nunca alterada.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromRow, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Purchase {
    pub id: Uuid,
    pub product_id: Uuid,
    #[schema(value_type = String, format = Date, example = "2025-11-20")]
    pub purchase_date: NaiveDate,
    pub quantity: Decimal,
    pub total_price: Decimal,
    // Registros antigos podem não ter o preço unitário
    pub unit_price: Option<Decimal>,
    pub stock_before: Decimal,
    pub stock_after: Decimal,
    pub supplier: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Dados de um produto novo, já com os padrões aplicados.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub description: String,
    pub unit: String,
    pub unit_size: Option<Decimal>,
    pub unit_price: Decimal,
    pub yield_percent: Option<Decimal>,
    pub notes: String,
    pub location: String,
    pub previous_quantity: Decimal,
    pub purchase_quantity: Decimal,
    pub current_quantity: Decimal,
}

impl NewProduct {
    /// Produto "em branco" usado pelo cadastro em lote: só descrição, unidade e preço.
    pub fn blank(description: String, unit: String, unit_price: Decimal) -> Self {
        Self {
            description,
            unit,
            unit_size: None,
            unit_price,
            yield_percent: None,
            notes: String::new(),
            location: String::new(),
            previous_quantity: Decimal::ZERO,
            purchase_quantity: Decimal::ZERO,
            current_quantity: Decimal::ZERO,
        }
    }

    pub fn into_product(self, id: Uuid, now: DateTime<Utc>) -> Product {
        Product {
            id,
            description: self.description,
            unit: self.unit,
            unit_size: self.unit_size,
            unit_price: self.unit_price,
            yield_percent: self.yield_percent,
            notes: self.notes,
            location: self.location,
            previous_quantity: self.previous_quantity,
            purchase_quantity: self.purchase_quantity,
            current_quantity: self.current_quantity,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Uma entrada de compra (o que veio na requisição, já validado).
#[derive(Debug, Clone)]
pub struct PurchaseEntry {
    pub purchase_date: NaiveDate,
    pub quantity: Decimal,
    pub total_price: Decimal,
    pub supplier: Option<String>,
}

/// Compra que não pode ser aplicada ao saldo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PurchaseError {
    #[error("A quantidade da compra deve ser maior que zero.")]
    NonPositiveQuantity,

    #[error("Os valores da compra excedem o limite suportado.")]
    Overflow,
}

/// Valores derivados que uma compra grava no produto e no histórico.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StockUpdate {
    pub previous_quantity: Decimal,
    pub purchase_quantity: Decimal,
    pub current_quantity: Decimal,
    pub unit_price: Decimal,
}

impl StockUpdate {
    /// Saldo novo = saldo atual + quantidade comprada; preço = total / quantidade.
    pub fn for_purchase(
        current_quantity: Decimal,
        entry: &PurchaseEntry,
    ) -> Result<Self, PurchaseError> {
        if entry.quantity <= Decimal::ZERO {
            return Err(PurchaseError::NonPositiveQuantity);
        }
        let unit_price = entry
            .total_price
            .checked_div(entry.quantity)
            .ok_or(PurchaseError::Overflow)?;
        let new_quantity = current_quantity
            .checked_add(entry.quantity)
            .ok_or(PurchaseError::Overflow)?;

        Ok(Self {
            previous_quantity: current_quantity,
            purchase_quantity: entry.quantity,
            current_quantity: new_quantity,
            unit_price,
        })
    }

    pub fn apply_to(&self, product: &mut Product, now: DateTime<Utc>) {
        product.previous_quantity = self.previous_quantity;
        product.purchase_quantity = self.purchase_quantity;
        product.current_quantity = self.current_quantity;
        product.unit_price = self.unit_price;
        product.updated_at = now;
    }

    pub fn into_purchase(
        self,
        id: Uuid,
        product_id: Uuid,
        entry: PurchaseEntry,
        now: DateTime<Utc>,
    ) -> Purchase {
        Purchase {
            id,
            product_id,
            purchase_date: entry.purchase_date,
            quantity: entry.quantity,
            total_price: entry.total_price,
            unit_price: Some(self.unit_price),
            stock_before: self.previous_quantity,
            stock_after: self.current_quantity,
            supplier: entry.supplier,
            created_at: now,
        }
    }
}

/// Média simples do preço unitário. Compras sem preço ficam fora da soma e da contagem.
/// Se a soma estoura o `Decimal`, divide cada parcela antes de somar.
pub fn average_unit_price(purchases: &[Purchase]) -> Option<Decimal> {
    let prices: Vec<Decimal> = purchases.iter().filter_map(|p| p.unit_price).collect();
    if prices.is_empty() {
        return None;
    }
    let count = Decimal::from(prices.len());

    match prices
        .iter()
        .try_fold(Decimal::ZERO, |acc, price| acc.checked_add(*price))
    {
        Some(total) => total.checked_div(count),
        None => prices.iter().try_fold(Decimal::ZERO, |acc, price| {
            acc.checked_add(price.checked_div(count)?)
        }),
    }
}

/// Alteração parcial do produto. Só os campos da lista permitida.
/// `Some(None)` nos campos anuláveis significa "gravar nulo".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProductChanges {
    pub description: Option<String>,
    pub unit: Option<String>,
    pub unit_size: Option<Option<Decimal>>,
    pub unit_price: Option<Decimal>,
    pub yield_percent: Option<Option<Decimal>>,
    pub notes: Option<String>,
    pub location: Option<String>,
}

impl ProductChanges {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    pub fn apply_to(&self, product: &mut Product) {
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(unit) = &self.unit {
            product.unit = unit.clone();
        }
        if let Some(unit_size) = self.unit_size {
            product.unit_size = unit_size;
        }
        if let Some(unit_price) = self.unit_price {
            product.unit_price = unit_price;
        }
        if let Some(yield_percent) = self.yield_percent {
            product.yield_percent = yield_percent;
        }
        if let Some(notes) = &self.notes {
            product.notes = notes.clone();
        }
        if let Some(location) = &self.location {
            product.location = location.clone();
        }
    }
}

// --- Respostas compostas ---

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductHistory {
    pub product: Product,
    pub purchases: Vec<Purchase>,
    pub average_last4_unit_price: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProductSummary {
    pub product: Product,
    pub last_purchases: Vec<Purchase>,
    pub avg_last4_unit_price: Option<Decimal>,
}

/// Resultado da compra rápida.
#[derive(Debug, Clone)]
pub struct QuickPurchaseOutcome {
    pub product: Product,
    pub purchase: Purchase,
    pub created_new: bool,
}

/// Resultado de cada linha do cadastro em lote.
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(tag = "status", rename_all = "camelCase")]
pub enum BatchItemResult {
    Accepted { index: usize, id: Uuid },
    Rejected { index: usize, reason: String },
}

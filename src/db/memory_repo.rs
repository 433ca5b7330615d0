// src/db/memory_repo.rs

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::{
        crm_repo::{CustomerStore, CUSTOMER_LIST_LIMIT},
        inventory_repo::InventoryStore,
        operations_repo::OrderStore,
    },
    models::{
        crm::{Customer, CustomerUpsert, UpsertOutcome},
        inventory::{
            NewProduct, Product, ProductChanges, Purchase, PurchaseEntry, QuickPurchaseOutcome,
            StockUpdate,
        },
        operations::{NewOrder, Order},
    },
};

#[derive(Default)]
struct MemoryState {
    // Vec mantém a ordem de inserção (a "ordem indefinida" do banco)
    products: Vec<Product>,
    purchases: HashMap<Uuid, Vec<Purchase>>,
    orders: Vec<Order>,
    customers: HashMap<String, Customer>,
}

impl MemoryState {
    fn product_mut(&mut self, id: Uuid) -> Option<&mut Product> {
        self.products.iter_mut().find(|p| p.id == id)
    }

    fn push_purchase(&mut self, purchase: Purchase) {
        self.purchases
            .entry(purchase.product_id)
            .or_default()
            .push(purchase);
    }
}

/// Armazenamento em memória, usado nos testes e em `STORE_BACKEND=memory`.
/// Cada operação segura o lock de escrita do começo ao fim, então as compras são atômicas.
#[derive(Default)]
pub struct MemoryRepository {
    state: RwLock<MemoryState>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl InventoryStore for MemoryRepository {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, AppError> {
        let product = product.into_product(Uuid::new_v4(), Utc::now());
        self.state.write().await.products.push(product.clone());
        Ok(product)
    }

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, AppError> {
        let now = Utc::now();
        let created: Vec<Product> = products
            .into_iter()
            .map(|p| p.into_product(Uuid::new_v4(), now))
            .collect();

        self.state.write().await.products.extend(created.iter().cloned());
        Ok(created)
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        let mut products = self.state.read().await.products.clone();
        // `String::cmp` compara bytes, igual ao COLLATE "C" do Postgres
        products.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let state = self.state.read().await;
        Ok(state.products.iter().find(|p| p.id == id).cloned())
    }

    async fn record_purchase(
        &self,
        product_id: Uuid,
        entry: PurchaseEntry,
    ) -> Result<Option<(Product, Purchase)>, AppError> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let Some(product) = state.product_mut(product_id) else {
            return Ok(None);
        };

        let update = StockUpdate::for_purchase(product.current_quantity, &entry)?;
        update.apply_to(product, now);
        let product = product.clone();

        let purchase = update.into_purchase(Uuid::new_v4(), product_id, entry, now);
        state.push_purchase(purchase.clone());

        Ok(Some((product, purchase)))
    }

    async fn quick_purchase(
        &self,
        description: &str,
        unit: &str,
        entry: PurchaseEntry,
    ) -> Result<QuickPurchaseOutcome, AppError> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        let existing = state
            .products
            .iter_mut()
            .find(|p| p.description == description && p.unit == unit);

        let current_quantity = existing
            .as_ref()
            .map(|p| p.current_quantity)
            .unwrap_or_default();
        let update = StockUpdate::for_purchase(current_quantity, &entry)?;

        let (product, created_new) = match existing {
            Some(product) => {
                update.apply_to(product, now);
                (product.clone(), false)
            }
            None => {
                let product = NewProduct {
                    previous_quantity: update.previous_quantity,
                    purchase_quantity: update.purchase_quantity,
                    current_quantity: update.current_quantity,
                    ..NewProduct::blank(description.to_string(), unit.to_string(), update.unit_price)
                }
                .into_product(Uuid::new_v4(), now);
                state.products.push(product.clone());
                (product, true)
            }
        };

        let purchase = update.into_purchase(Uuid::new_v4(), product.id, entry, now);
        state.push_purchase(purchase.clone());

        Ok(QuickPurchaseOutcome {
            product,
            purchase,
            created_new,
        })
    }

    async fn list_purchases(
        &self,
        product_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Purchase>, AppError> {
        let state = self.state.read().await;

        // Invertido antes do sort estável: no empate de data, a mais nova vem primeiro
        let mut purchases: Vec<Purchase> = state
            .purchases
            .get(&product_id)
            .map(|list| list.iter().rev().cloned().collect())
            .unwrap_or_default();
        purchases.sort_by(|a, b| b.purchase_date.cmp(&a.purchase_date));

        if let Some(limit) = limit {
            purchases.truncate(usize::try_from(limit).unwrap_or(0));
        }
        Ok(purchases)
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        let mut state = self.state.write().await;

        let Some(product) = state.product_mut(id) else {
            return Ok(None);
        };

        changes.apply_to(product);
        product.updated_at = Utc::now();
        Ok(Some(product.clone()))
    }
}

#[async_trait]
impl OrderStore for MemoryRepository {
    async fn insert_order(&self, order: NewOrder) -> Result<Order, AppError> {
        let order = order.into_order(Uuid::new_v4(), Utc::now());
        self.state.write().await.orders.push(order.clone());
        Ok(order)
    }

    async fn list_orders_by_status(&self, status: &str) -> Result<Vec<Order>, AppError> {
        let state = self.state.read().await;
        Ok(state
            .orders
            .iter()
            .filter(|o| o.status == status)
            .cloned()
            .collect())
    }

    async fn find_order(&self, id: Uuid) -> Result<Option<Order>, AppError> {
        let state = self.state.read().await;
        Ok(state.orders.iter().find(|o| o.id == id).cloned())
    }
}

#[async_trait]
impl CustomerStore for MemoryRepository {
    async fn upsert_customer(&self, customer: CustomerUpsert) -> Result<UpsertOutcome, AppError> {
        let mut state = self.state.write().await;
        let now = Utc::now();

        if let Some(existing) = state.customers.get_mut(&customer.phone) {
            existing.name = customer.name;
            existing.channel = customer.channel;
            existing.notes = customer.notes;
            existing.updated_at = now;
            return Ok(UpsertOutcome {
                customer: existing.clone(),
                created: false,
            });
        }

        let created = Customer {
            id: customer.phone.clone(),
            name: customer.name,
            phone: customer.phone,
            channel: customer.channel,
            notes: customer.notes,
            created_at: now,
            updated_at: now,
        };
        state.customers.insert(created.id.clone(), created.clone());

        Ok(UpsertOutcome {
            customer: created,
            created: true,
        })
    }

    async fn list_customers(&self) -> Result<Vec<Customer>, AppError> {
        let state = self.state.read().await;
        let mut customers: Vec<Customer> = state.customers.values().cloned().collect();
        // Nulos por último, igual ao ORDER BY ASC do Postgres
        customers.sort_by(|a, b| match (&a.name, &b.name) {
            (Some(a), Some(b)) => a.cmp(b),
            (Some(_), None) => std::cmp::Ordering::Less,
            (None, Some(_)) => std::cmp::Ordering::Greater,
            (None, None) => std::cmp::Ordering::Equal,
        });
        customers.truncate(CUSTOMER_LIST_LIMIT as usize);
        Ok(customers)
    }

    async fn find_customer(&self, phone: &str) -> Result<Option<Customer>, AppError> {
        let state = self.state.read().await;
        Ok(state.customers.get(phone).cloned())
    }
}

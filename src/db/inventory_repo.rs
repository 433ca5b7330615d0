// src/db/inventory_repo.rs

use async_trait::async_trait;
use sqlx::{Executor, PgPool, Postgres};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::inventory::{
        NewProduct, Product, ProductChanges, Purchase, PurchaseEntry, QuickPurchaseOutcome,
        StockUpdate,
    },
};

/// Operações de estoque que o serviço precisa do armazenamento.
/// As compras (leitura + escrita do saldo) são atômicas em qualquer implementação.
#[async_trait]
pub trait InventoryStore: Send + Sync {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, AppError>;

    /// Grava todos os produtos de uma vez (tudo ou nada).
    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, AppError>;

    /// Todos os produtos, por descrição (ordem lexicográfica).
    async fn list_products(&self) -> Result<Vec<Product>, AppError>;

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError>;

    /// `None` quando o produto não existe.
    async fn record_purchase(
        &self,
        product_id: Uuid,
        entry: PurchaseEntry,
    ) -> Result<Option<(Product, Purchase)>, AppError>;

    /// Procura por descrição + unidade; cria o produto se não existir.
    async fn quick_purchase(
        &self,
        description: &str,
        unit: &str,
        entry: PurchaseEntry,
    ) -> Result<QuickPurchaseOutcome, AppError>;

    /// Compras do produto, da mais recente para a mais antiga.
    async fn list_purchases(
        &self,
        product_id: Uuid,
        limit: Option<i64>,
    ) -> Result<Vec<Purchase>, AppError>;

    async fn update_product(
        &self,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError>;
}

#[derive(Clone)]
pub struct InventoryRepository {
    pool: PgPool,
}

impl InventoryRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    // ---
    // Helpers genéricos (rodam na pool ou dentro de uma transação)
    // ---

    async fn insert_product_with<'e, E>(
        &self,
        executor: E,
        product: NewProduct,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            INSERT INTO products (
                id, description, unit, unit_size, unit_price, yield_percent, notes, location,
                previous_quantity, purchase_quantity, current_quantity
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product.description)
        .bind(product.unit)
        .bind(product.unit_size)
        .bind(product.unit_price)
        .bind(product.yield_percent)
        .bind(product.notes)
        .bind(product.location)
        .bind(product.previous_quantity)
        .bind(product.purchase_quantity)
        .bind(product.current_quantity)
        .fetch_one(executor)
        .await?;

        Ok(product)
    }

    async fn update_stock<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        update: &StockUpdate,
    ) -> Result<Product, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET previous_quantity = $2,
                purchase_quantity = $3,
                current_quantity = $4,
                unit_price = $5,
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(product_id)
        .bind(update.previous_quantity)
        .bind(update.purchase_quantity)
        .bind(update.current_quantity)
        .bind(update.unit_price)
        .fetch_one(executor)
        .await?;

        Ok(product)
    }

    /// Registra a compra no livro-razão (com estoque antes/depois).
    async fn insert_purchase<'e, E>(
        &self,
        executor: E,
        product_id: Uuid,
        update: &StockUpdate,
        entry: PurchaseEntry,
    ) -> Result<Purchase, AppError>
    where
        E: Executor<'e, Database = Postgres>,
    {
        let purchase = sqlx::query_as::<_, Purchase>(
            r#"
            INSERT INTO purchases (
                id, product_id, purchase_date, quantity, total_price, unit_price,
                stock_before, stock_after, supplier
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(product_id)
        .bind(entry.purchase_date)
        .bind(entry.quantity)
        .bind(entry.total_price)
        .bind(update.unit_price)
        .bind(update.previous_quantity)
        .bind(update.current_quantity)
        .bind(entry.supplier)
        .fetch_one(executor)
        .await?;

        Ok(purchase)
    }
}

#[async_trait]
impl InventoryStore for InventoryRepository {
    async fn insert_product(&self, product: NewProduct) -> Result<Product, AppError> {
        self.insert_product_with(&self.pool, product).await
    }

    async fn insert_products(&self, products: Vec<NewProduct>) -> Result<Vec<Product>, AppError> {
        let mut tx = self.pool.begin().await?;

        let mut created = Vec::with_capacity(products.len());
        for product in products {
            created.push(self.insert_product_with(&mut *tx, product).await?);
        }

        tx.commit().await?;
        Ok(created)
    }

    async fn list_products(&self) -> Result<Vec<Product>, AppError> {
        // COLLATE "C": ordem por bytes, independente do locale do banco
        let products = sqlx::query_as::<_, Product>(
            r#"SELECT * FROM products ORDER BY description COLLATE "C" ASC"#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(products)
    }

    async fn find_product(&self, id: Uuid) -> Result<Option<Product>, AppError> {
        let product = sqlx::query_as::<_, Product>("SELECT * FROM products WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(product)
    }

    async fn record_purchase(
        &self,
        product_id: Uuid,
        entry: PurchaseEntry,
    ) -> Result<Option<(Product, Purchase)>, AppError> {
        let mut tx = self.pool.begin().await?;

        // Trava a linha: duas compras simultâneas não perdem saldo
        let current = sqlx::query_as::<_, Product>(
            "SELECT * FROM products WHERE id = $1 FOR UPDATE",
        )
        .bind(product_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(current) = current else {
            return Ok(None);
        };

        let update = StockUpdate::for_purchase(current.current_quantity, &entry)?;

        let purchase = self.insert_purchase(&mut *tx, product_id, &update, entry).await?;
        let product = self.update_stock(&mut *tx, product_id, &update).await?;

        tx.commit().await?;
        Ok(Some((product, purchase)))
    }

    async fn quick_purchase(
        &self,
        description: &str,
        unit: &str,
        entry: PurchaseEntry,
    ) -> Result<QuickPurchaseOutcome, AppError> {
        let mut tx = self.pool.begin().await?;

        // Serializa compras rápidas do mesmo par descrição + unidade,
        // senão duas requisições podiam criar o mesmo produto duas vezes.
        sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1 || '|' || $2))")
            .bind(description)
            .bind(unit)
            .execute(&mut *tx)
            .await?;

        let existing = sqlx::query_as::<_, Product>(
            r#"
            SELECT * FROM products
            WHERE description = $1 AND unit = $2
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(description)
        .bind(unit)
        .fetch_optional(&mut *tx)
        .await?;

        let current_quantity = existing
            .as_ref()
            .map(|p| p.current_quantity)
            .unwrap_or_default();
        let update = StockUpdate::for_purchase(current_quantity, &entry)?;

        let (product, created_new) = match existing {
            Some(existing) => {
                let product = self.update_stock(&mut *tx, existing.id, &update).await?;
                (product, false)
            }
            None => {
                // Produto novo já nasce com o saldo desta compra
                let new_product = NewProduct {
                    previous_quantity: update.previous_quantity,
                    purchase_quantity: update.purchase_quantity,
                    current_quantity: update.current_quantity,
                    ..NewProduct::blank(description.to_string(), unit.to_string(), update.unit_price)
                };
                let product = self.insert_product_with(&mut *tx, new_product).await?;
                (product, true)
            }
        };

        let purchase = self.insert_purchase(&mut *tx, product.id, &update, entry).await?;

        tx.commit().await?;
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
        // LIMIT NULL = sem limite
        let purchases = sqlx::query_as::<_, Purchase>(
            r#"
            SELECT * FROM purchases
            WHERE product_id = $1
            ORDER BY purchase_date DESC, created_at DESC
            LIMIT $2
            "#,
        )
        .bind(product_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;
        Ok(purchases)
    }

    async fn update_product(
        &self,
        id: Uuid,
        changes: &ProductChanges,
    ) -> Result<Option<Product>, AppError> {
        // Campos anuláveis usam uma flag "veio no body" para poder gravar NULL
        let product = sqlx::query_as::<_, Product>(
            r#"
            UPDATE products
            SET description = COALESCE($2, description),
                unit = COALESCE($3, unit),
                unit_size = CASE WHEN $4 THEN $5 ELSE unit_size END,
                unit_price = COALESCE($6, unit_price),
                yield_percent = CASE WHEN $7 THEN $8 ELSE yield_percent END,
                notes = COALESCE($9, notes),
                location = COALESCE($10, location),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(changes.description.as_deref())
        .bind(changes.unit.as_deref())
        .bind(changes.unit_size.is_some())
        .bind(changes.unit_size.flatten())
        .bind(changes.unit_price)
        .bind(changes.yield_percent.is_some())
        .bind(changes.yield_percent.flatten())
        .bind(changes.notes.as_deref())
        .bind(changes.location.as_deref())
        .fetch_optional(&self.pool)
        .await?;
        Ok(product)
    }
}

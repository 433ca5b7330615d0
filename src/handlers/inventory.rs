// src/handlers/inventory.rs

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use axum_extra::extract::WithRejection;
use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::json;
use utoipa::ToSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

use crate::{
    common::error::AppError,
    config::AppState,
    models::inventory::{
        BatchItemResult, NewProduct, Product, ProductChanges, ProductHistory, ProductSummary,
        PurchaseEntry,
    },
    services::inventory_service::BatchCandidate,
};

// ---
// Validações customizadas
// ---
fn validate_not_negative(val: &Decimal) -> Result<(), ValidationError> {
    if val.is_sign_negative() && !val.is_zero() {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor não pode ser negativo.".into());
        return Err(err);
    }
    Ok(())
}

fn validate_positive(val: &Decimal) -> Result<(), ValidationError> {
    if *val <= Decimal::ZERO {
        let mut err = ValidationError::new("range");
        err.add_param("min".into(), &0.0);
        err.message = Some("O valor deve ser maior que zero.".into());
        return Err(err);
    }
    Ok(())
}

// Só espaços conta como vazio, igual ao cadastro em lote
fn validate_not_blank(val: &str) -> Result<(), ValidationError> {
    if val.trim().is_empty() {
        let mut err = ValidationError::new("blank");
        err.message = Some("O campo não pode ficar vazio.".into());
        return Err(err);
    }
    Ok(())
}

/// Distingue "campo ausente" (None) de "campo null" (Some(None)) no PATCH.
fn deserialize_present<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

/// Campo não anulável do PATCH: ausente é None, `null` é erro.
fn deserialize_not_null<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer)?
        .map(Some)
        .ok_or_else(|| serde::de::Error::custom("o campo não aceita null"))
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}

fn missing_fields(fields: &str) -> AppError {
    AppError::BadRequest(format!("Campos obrigatórios: {fields}"))
}

// ---
// Payload: CreateProduct
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "Farinha de trigo")]
    pub description: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    #[schema(example = "kg")]
    pub unit: Option<String>,

    #[validate(custom(function = "validate_not_negative"))]
    pub unit_size: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = 5.5)]
    pub unit_price: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    pub yield_percent: Option<Decimal>,

    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub location: String,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub previous_quantity: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub purchase_quantity: Decimal,
    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default)]
    pub current_quantity: Decimal,
}

impl TryFrom<CreateProductPayload> for NewProduct {
    type Error = AppError;

    fn try_from(payload: CreateProductPayload) -> Result<Self, Self::Error> {
        let (Some(description), Some(unit), Some(unit_price)) =
            (payload.description, payload.unit, payload.unit_price)
        else {
            return Err(missing_fields("description, unit, unitPrice"));
        };

        Ok(NewProduct {
            description,
            unit,
            unit_size: payload.unit_size,
            unit_price,
            yield_percent: Some(payload.yield_percent.unwrap_or(Decimal::ONE_HUNDRED)),
            notes: payload.notes,
            location: payload.location,
            previous_quantity: payload.previous_quantity,
            purchase_quantity: payload.purchase_quantity,
            current_quantity: payload.current_quantity,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
    #[schema(example = "Produto criado")]
    pub message: String,
}

// POST /products
#[utoipa::path(
    post,
    path = "/products",
    tag = "Inventory",
    request_body = CreateProductPayload,
    responses(
        (status = 201, description = "Produto criado", body = CreatedResponse),
        (status = 400, description = "Dados inválidos")
    )
)]
pub async fn create_product(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<CreateProductPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .inventory_service
        .create_product(NewProduct::try_from(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreatedResponse {
            id: product.id,
            message: "Produto criado".into(),
        }),
    ))
}

// ---
// Payload: Batch (array direto ou { "items": [...] })
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BatchProductItem {
    #[schema(example = "Sal")]
    pub description: Option<String>,
    #[schema(example = "kg")]
    pub unit: Option<String>,
    #[schema(example = 5)]
    pub unit_price: Option<Decimal>,
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum BatchProductsPayload {
    List(Vec<BatchProductItem>),
    Wrapped { items: Option<Vec<BatchProductItem>> },
}

impl BatchProductsPayload {
    fn into_candidates(self) -> Vec<BatchCandidate> {
        let items = match self {
            BatchProductsPayload::List(items) => items,
            BatchProductsPayload::Wrapped { items } => items.unwrap_or_default(),
        };
        items
            .into_iter()
            .map(|item| BatchCandidate {
                description: item.description,
                unit: item.unit,
                unit_price: item.unit_price,
            })
            .collect()
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct BatchResponse {
    #[schema(example = "Produtos criados em lote com sucesso")]
    pub message: String,
    /// Quantidade de linhas recebidas (inclusive as rejeitadas)
    pub total: usize,
    pub created: usize,
    pub results: Vec<BatchItemResult>,
}

// POST /products/batch
#[utoipa::path(
    post,
    path = "/products/batch",
    tag = "Inventory",
    request_body = BatchProductsPayload,
    responses(
        (status = 201, description = "Lote processado", body = BatchResponse),
        (status = 400, description = "Lista vazia ou ausente")
    )
)]
pub async fn create_products_batch(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<BatchProductsPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let outcome = app_state
        .inventory_service
        .create_products_batch(payload.into_candidates())
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(BatchResponse {
            message: "Produtos criados em lote com sucesso".into(),
            total: outcome.total,
            created: outcome.created,
            results: outcome.results,
        }),
    ))
}

// GET /products
#[utoipa::path(
    get,
    path = "/products",
    tag = "Inventory",
    responses(
        (status = 200, description = "Produtos por descrição", body = Vec<Product>)
    )
)]
pub async fn list_products(
    State(app_state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    let products = app_state.inventory_service.list_products().await?;
    Ok((StatusCode::OK, Json(products)))
}

// ---
// Payload: RecordPurchase
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordPurchasePayload {
    // Na unidade do produto
    #[validate(custom(function = "validate_positive"))]
    #[schema(example = 10)]
    pub quantity: Option<Decimal>,

    #[validate(custom(function = "validate_not_negative"))]
    #[schema(example = 55.0)]
    pub total_price: Option<Decimal>,

    // "YYYY-MM-DD"; hoje (UTC) se vier vazio
    #[schema(value_type = Option<String>, format = Date, example = "2025-11-20")]
    pub purchase_date: Option<NaiveDate>,

    pub supplier: Option<String>,
}

impl TryFrom<RecordPurchasePayload> for PurchaseEntry {
    type Error = AppError;

    fn try_from(payload: RecordPurchasePayload) -> Result<Self, Self::Error> {
        let (Some(quantity), Some(total_price)) = (payload.quantity, payload.total_price) else {
            return Err(missing_fields("quantity, totalPrice"));
        };

        Ok(PurchaseEntry {
            purchase_date: payload.purchase_date.unwrap_or_else(today),
            quantity,
            total_price,
            supplier: payload.supplier,
        })
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseResponse {
    pub purchase_id: Uuid,
    #[schema(example = "Compra registrada com sucesso")]
    pub message: String,
}

// POST /products/{id}/purchase
#[utoipa::path(
    post,
    path = "/products/{id}/purchase",
    tag = "Inventory",
    request_body = RecordPurchasePayload,
    responses(
        (status = 201, description = "Compra registrada, estoque atualizado", body = PurchaseResponse),
        (status = 400, description = "Dados inválidos"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto")
    )
)]
pub async fn record_purchase(
    State(app_state): State<AppState>,
    WithRejection(Path(product_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<RecordPurchasePayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let purchase = app_state
        .inventory_service
        .record_purchase(product_id, PurchaseEntry::try_from(payload)?)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(PurchaseResponse {
            purchase_id: purchase.id,
            message: "Compra registrada com sucesso".into(),
        }),
    ))
}

// ---
// Payload: QuickPurchase (encontra ou cria por descrição + unidade)
// ---
#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickPurchasePayload {
    #[schema(example = "Tomate")]
    pub description: Option<String>,
    #[schema(example = "kg")]
    pub unit: Option<String>,

    #[schema(example = 3)]
    pub quantity: Option<Decimal>,

    #[schema(example = 21.0)]
    pub total_price: Option<Decimal>,

    #[schema(value_type = Option<String>, format = Date, example = "2025-11-20")]
    pub purchase_date: Option<NaiveDate>,

    #[schema(example = "CEASA")]
    pub supplier: Option<String>,
}

impl QuickPurchasePayload {
    /// Descrição, unidade e a entrada de compra. Obrigatório vazio ou zerado vira 400.
    fn into_parts(self) -> Result<(String, String, PurchaseEntry), AppError> {
        let description = self.description.filter(|d| validate_not_blank(d).is_ok());
        let unit = self.unit.filter(|u| validate_not_blank(u).is_ok());
        let quantity = self.quantity.filter(|q| validate_positive(q).is_ok());
        let total_price = self.total_price.filter(|t| validate_positive(t).is_ok());

        let (Some(description), Some(unit), Some(quantity), Some(total_price)) =
            (description, unit, quantity, total_price)
        else {
            return Err(missing_fields("description, unit, quantity, totalPrice"));
        };

        let entry = PurchaseEntry {
            purchase_date: self.purchase_date.unwrap_or_else(today),
            quantity,
            total_price,
            supplier: Some(self.supplier.unwrap_or_default()),
        };
        Ok((description, unit, entry))
    }
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuickPurchaseResponse {
    #[schema(example = "Compra registrada com sucesso (quick-purchase)")]
    pub message: String,
    pub product_id: Uuid,
    pub purchase_id: Uuid,
    pub created_new_product: bool,
}

// POST /products/quick-purchase
#[utoipa::path(
    post,
    path = "/products/quick-purchase",
    tag = "Inventory",
    request_body = QuickPurchasePayload,
    responses(
        (status = 201, description = "Compra registrada", body = QuickPurchaseResponse),
        (status = 400, description = "Campos obrigatórios ausentes")
    )
)]
pub async fn quick_purchase(
    State(app_state): State<AppState>,
    WithRejection(Json(payload), _): WithRejection<Json<QuickPurchasePayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let (description, unit, entry) = payload.into_parts()?;

    let outcome = app_state
        .inventory_service
        .quick_purchase(&description, &unit, entry)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(QuickPurchaseResponse {
            message: "Compra registrada com sucesso (quick-purchase)".into(),
            product_id: outcome.product.id,
            purchase_id: outcome.purchase.id,
            created_new_product: outcome.created_new,
        }),
    ))
}

// GET /products/{id}/history
#[utoipa::path(
    get,
    path = "/products/{id}/history",
    tag = "Inventory",
    responses(
        (status = 200, description = "Produto, compras e média dos últimos 4 preços", body = ProductHistory),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto")
    )
)]
pub async fn get_history(
    State(app_state): State<AppState>,
    WithRejection(Path(product_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let history = app_state.inventory_service.history(product_id).await?;
    Ok((StatusCode::OK, Json(history)))
}

// GET /products/{id}/summary
#[utoipa::path(
    get,
    path = "/products/{id}/summary",
    tag = "Inventory",
    responses(
        (status = 200, description = "Resumo do produto", body = ProductSummary),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto")
    )
)]
pub async fn get_summary(
    State(app_state): State<AppState>,
    WithRejection(Path(product_id), _): WithRejection<Path<Uuid>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    let summary = app_state.inventory_service.summary(product_id).await?;
    Ok((StatusCode::OK, Json(summary)))
}

// ---
// Payload: UpdateProduct (só os campos permitidos; o resto é ignorado)
// ---
#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductPayload {
    #[validate(custom(function = "validate_not_blank"))]
    #[serde(default, deserialize_with = "deserialize_not_null")]
    pub description: Option<String>,

    #[validate(custom(function = "validate_not_blank"))]
    #[serde(default, deserialize_with = "deserialize_not_null")]
    pub unit: Option<String>,

    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<f64>)]
    pub unit_size: Option<Option<Decimal>>,

    #[validate(custom(function = "validate_not_negative"))]
    #[serde(default, deserialize_with = "deserialize_not_null")]
    pub unit_price: Option<Decimal>,

    #[serde(default, deserialize_with = "deserialize_present")]
    #[schema(value_type = Option<f64>)]
    pub yield_percent: Option<Option<Decimal>>,

    #[serde(default, deserialize_with = "deserialize_not_null")]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "deserialize_not_null")]
    pub location: Option<String>,
}

impl From<UpdateProductPayload> for ProductChanges {
    fn from(payload: UpdateProductPayload) -> Self {
        ProductChanges {
            description: payload.description,
            unit: payload.unit,
            unit_size: payload.unit_size,
            unit_price: payload.unit_price,
            yield_percent: payload.yield_percent,
            notes: payload.notes,
            location: payload.location,
        }
    }
}

// PATCH /products/{id}
#[utoipa::path(
    patch,
    path = "/products/{id}",
    tag = "Inventory",
    request_body = UpdateProductPayload,
    responses(
        (status = 200, description = "Produto atualizado", body = Product),
        (status = 400, description = "Nenhum campo para atualizar"),
        (status = 404, description = "Produto não encontrado")
    ),
    params(
        ("id" = Uuid, Path, description = "ID do Produto")
    )
)]
pub async fn update_product(
    State(app_state): State<AppState>,
    WithRejection(Path(product_id), _): WithRejection<Path<Uuid>, AppError>,
    WithRejection(Json(payload), _): WithRejection<Json<UpdateProductPayload>, AppError>,
) -> Result<impl IntoResponse, AppError> {
    payload.validate()?;

    let product = app_state
        .inventory_service
        .update_product(product_id, payload.into())
        .await?;

    Ok((StatusCode::OK, Json(product)))
}

// GET /
pub async fn root() -> impl IntoResponse {
    "Saleh Digital API está no ar ✅"
}

// Resposta usada pelo fallback de rotas inexistentes
pub async fn not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "error": "Rota não encontrada" })),
    )
}

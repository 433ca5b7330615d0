//! Testes de ponta a ponta: Router completo sobre o armazenamento em memória.

use axum::{
    http::{Method, StatusCode},
    Router,
};
use serde_json::{json, Value};

use saleh_backend::config::AppState;

mod common;
use common::{num, send};

fn app() -> Router {
    saleh_backend::router(AppState::in_memory())
}

async fn create_product(app: &Router, description: &str, unit: &str, unit_price: f64) -> String {
    let (status, body) = send(
        app,
        Method::POST,
        "/products",
        Some(json!({ "description": description, "unit": unit, "unitPrice": unit_price })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

async fn get_product(app: &Router, id: &str) -> Value {
    let (status, body) = send(app, Method::GET, &format!("/products/{id}/summary"), None).await;
    assert_eq!(status, StatusCode::OK);
    body["product"].clone()
}

async fn purchase(app: &Router, id: &str, quantity: f64, total: f64, date: &str) -> (StatusCode, Value) {
    send(
        app,
        Method::POST,
        &format!("/products/{id}/purchase"),
        Some(json!({ "quantity": quantity, "totalPrice": total, "purchaseDate": date })),
    )
    .await
}

// --- Liveness e rotas ---

#[tokio::test]
async fn root_answers_liveness_text() {
    let (status, body) = send(&app(), Method::GET, "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.as_str().unwrap().contains("Saleh Digital API"));
}

#[tokio::test]
async fn unknown_route_is_404() {
    let (status, _) = send(&app(), Method::GET, "/nao-existe", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn openapi_document_is_served() {
    let (status, body) = send(&app(), Method::GET, "/api-docs/openapi.json", None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/products/quick-purchase"].is_object());
}

// --- Produtos ---

#[tokio::test]
async fn created_product_gets_defaults() {
    let app = app();
    let id = create_product(&app, "Óleo", "un", 9.5).await;

    let product = get_product(&app, &id).await;
    assert_eq!(num(&product["yieldPercent"]), 100.0);
    assert_eq!(num(&product["currentQuantity"]), 0.0);
    assert_eq!(product["notes"], "");
    assert!(product["unitSize"].is_null());
}

#[tokio::test]
async fn create_product_without_required_fields_is_400() {
    let (status, body) = send(&app(), Method::POST, "/products", Some(json!({ "unit": "kg" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("description"));
}

#[tokio::test]
async fn create_product_with_blank_description_is_400() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({ "description": "   ", "unit": "kg", "unitPrice": 1 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["details"]["description"].is_array());

    let (_, products) = send(&app, Method::GET, "/products", None).await;
    assert!(products.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn wrongly_typed_body_is_400_json() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/products",
        Some(json!({ "description": "Sal", "unit": "kg", "unitPrice": "barato" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unitPrice"));
}

#[tokio::test]
async fn malformed_id_in_path_is_400_json() {
    let (status, body) = send(&app(), Method::GET, "/products/nao-e-uuid/summary", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn products_are_listed_by_description() {
    let app = app();
    for description in ["Tomate", "Arroz", "Feijão", "Arroz"] {
        create_product(&app, description, "kg", 1.0).await;
    }

    let (status, body) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(status, StatusCode::OK);
    let descriptions: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["description"].as_str().unwrap())
        .collect();
    assert_eq!(descriptions, vec!["Arroz", "Arroz", "Feijão", "Tomate"]);
}

#[tokio::test]
async fn batch_skips_invalid_rows_and_reports_them() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/products/batch",
        Some(json!([
            { "description": "Sal", "unit": "kg", "unitPrice": 5 },
            { "unit": "kg", "unitPrice": 3 }
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["total"], 2);
    assert_eq!(body["created"], 1);
    assert_eq!(body["results"][0]["status"], "accepted");
    assert_eq!(body["results"][1]["status"], "rejected");
    assert_eq!(body["results"][1]["index"], 1);

    let (_, products) = send(&app, Method::GET, "/products", None).await;
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["description"], "Sal");
    assert!(products[0]["yieldPercent"].is_null());
}

#[tokio::test]
async fn batch_accepts_wrapped_items() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/products/batch",
        Some(json!({ "items": [{ "description": "Açúcar", "unit": "kg", "unitPrice": 4 }] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], 1);
}

#[tokio::test]
async fn empty_batch_is_400() {
    let (status, _) = send(&app(), Method::POST, "/products/batch", Some(json!({ "items": [] }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

// --- Compras ---

#[tokio::test]
async fn purchase_updates_stock_and_unit_price() {
    let app = app();
    let id = create_product(&app, "Farinha", "kg", 3.0).await;

    let (status, body) = purchase(&app, &id, 4.0, 10.0, "2025-11-01").await;
    assert_eq!(status, StatusCode::CREATED);
    assert!(body["purchaseId"].is_string());

    let (status, _) = purchase(&app, &id, 6.0, 30.0, "2025-11-02").await;
    assert_eq!(status, StatusCode::CREATED);

    let product = get_product(&app, &id).await;
    assert_eq!(num(&product["previousQuantity"]), 4.0);
    assert_eq!(num(&product["purchaseQuantity"]), 6.0);
    assert_eq!(num(&product["currentQuantity"]), 10.0);
    assert_eq!(num(&product["unitPrice"]), 5.0);
}

#[tokio::test]
async fn purchase_records_stock_snapshots() {
    let app = app();
    let id = create_product(&app, "Leite", "un", 4.0).await;
    purchase(&app, &id, 2.0, 8.0, "2025-11-01").await;
    purchase(&app, &id, 3.0, 15.0, "2025-11-05").await;

    let (status, body) = send(&app, Method::GET, &format!("/products/{id}/history"), None).await;
    assert_eq!(status, StatusCode::OK);

    let purchases = body["purchases"].as_array().unwrap();
    assert_eq!(purchases.len(), 2);
    // Mais recente primeiro
    assert_eq!(purchases[0]["purchaseDate"], "2025-11-05");
    assert_eq!(num(&purchases[0]["stockBefore"]), 2.0);
    assert_eq!(num(&purchases[0]["stockAfter"]), 5.0);
    assert_eq!(num(&purchases[1]["stockBefore"]), 0.0);
    assert_eq!(num(&body["averageLast4UnitPrice"]), 4.5);
    assert_eq!(body["product"]["id"], id.as_str());
}

#[tokio::test]
async fn purchase_on_missing_product_is_404() {
    let missing = uuid::Uuid::new_v4();
    let (status, body) = purchase(&app(), &missing.to_string(), 1.0, 1.0, "2025-11-01").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Produto não encontrado");
}

#[tokio::test]
async fn purchase_with_zero_quantity_is_400() {
    let app = app();
    let id = create_product(&app, "Café", "kg", 30.0).await;

    let (status, _) = purchase(&app, &id, 0.0, 10.0, "2025-11-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let product = get_product(&app, &id).await;
    assert_eq!(num(&product["currentQuantity"]), 0.0);
}

#[tokio::test]
async fn quick_purchase_creates_product_when_missing() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/products/quick-purchase",
        Some(json!({ "description": "Tomate", "unit": "kg", "quantity": 3, "totalPrice": 21 })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["createdNewProduct"], true);

    let product_id = body["productId"].as_str().unwrap();
    let product = get_product(&app, product_id).await;
    assert_eq!(num(&product["currentQuantity"]), 3.0);
    assert_eq!(num(&product["previousQuantity"]), 0.0);
    assert_eq!(num(&product["unitPrice"]), 7.0);

    let (_, products) = send(&app, Method::GET, "/products", None).await;
    assert_eq!(products.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn quick_purchase_reuses_existing_product() {
    let app = app();
    let id = create_product(&app, "Cebola", "kg", 2.0).await;
    purchase(&app, &id, 5.0, 10.0, "2025-11-01").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/products/quick-purchase",
        Some(json!({
            "description": "Cebola",
            "unit": "kg",
            "quantity": 2,
            "totalPrice": 8,
            "purchaseDate": "2025-11-03",
            "supplier": "CEASA"
        })),
    )
    .await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["createdNewProduct"], false);
    assert_eq!(body["productId"], id.as_str());

    let (_, history) = send(&app, Method::GET, &format!("/products/{id}/history"), None).await;
    let latest = &history["purchases"][0];
    assert_eq!(num(&latest["stockBefore"]), 5.0);
    assert_eq!(num(&latest["stockAfter"]), 7.0);
    assert_eq!(latest["supplier"], "CEASA");
    assert_eq!(history["purchases"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn quick_purchase_with_different_unit_creates_new_product() {
    let app = app();
    create_product(&app, "Queijo", "kg", 40.0).await;

    let (_, body) = send(
        &app,
        Method::POST,
        "/products/quick-purchase",
        Some(json!({ "description": "Queijo", "unit": "un", "quantity": 1, "totalPrice": 12 })),
    )
    .await;
    assert_eq!(body["createdNewProduct"], true);
}

#[tokio::test]
async fn quick_purchase_missing_fields_is_400() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/products/quick-purchase",
        Some(json!({ "description": "Tomate", "quantity": 3 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("totalPrice"));
}

#[tokio::test]
async fn purchase_that_overflows_stock_is_400() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/products",
        Some(json!({ "description": "Sal grosso", "unit": "kg", "unitPrice": 1, "currentQuantity": 7e28 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let id = body["id"].as_str().unwrap().to_string();

    let (status, body) = purchase(&app, &id, 2e28, 1.0, "2025-11-01").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    // Nada foi gravado
    let (_, history) = send(&app, Method::GET, &format!("/products/{id}/history"), None).await;
    assert!(history["purchases"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn concurrent_purchases_do_not_lose_updates() {
    let app = app();
    let id = create_product(&app, "Arroz", "kg", 5.0).await;

    let tasks: Vec<_> = (0..50)
        .map(|_| {
            let app = app.clone();
            let id = id.clone();
            tokio::spawn(async move { purchase(&app, &id, 1.0, 5.0, "2025-11-01").await.0 })
        })
        .collect();
    for task in tasks {
        assert_eq!(task.await.unwrap(), StatusCode::CREATED);
    }

    let product = get_product(&app, &id).await;
    assert_eq!(num(&product["currentQuantity"]), 50.0);

    let (_, history) = send(&app, Method::GET, &format!("/products/{id}/history"), None).await;
    assert_eq!(history["purchases"].as_array().unwrap().len(), 50);
}

#[tokio::test]
async fn concurrent_quick_purchases_create_one_product() {
    let app = app();

    let tasks: Vec<_> = (0..20)
        .map(|_| {
            let app = app.clone();
            tokio::spawn(async move {
                send(
                    &app,
                    Method::POST,
                    "/products/quick-purchase",
                    Some(json!({ "description": "Batata", "unit": "kg", "quantity": 1, "totalPrice": 4 })),
                )
                .await
            })
        })
        .collect();

    let mut created_new = 0;
    for task in tasks {
        let (status, body) = task.await.unwrap();
        assert_eq!(status, StatusCode::CREATED);
        if body["createdNewProduct"] == true {
            created_new += 1;
        }
    }
    assert_eq!(created_new, 1);

    let (_, products) = send(&app, Method::GET, "/products", None).await;
    let products = products.as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(num(&products[0]["currentQuantity"]), 20.0);
}

// --- Resumo ---

#[tokio::test]
async fn summary_averages_last_four_purchases() {
    let app = app();
    let id = create_product(&app, "Carne", "kg", 30.0).await;

    // Preços unitários: 10, 20, 30, 40, 50 (o de 10 é o mais antigo e fica de fora)
    for (day, price) in [(1, 10.0), (2, 20.0), (3, 30.0), (4, 40.0), (5, 50.0)] {
        let (status, _) = purchase(&app, &id, 1.0, price, &format!("2025-11-0{day}")).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, &format!("/products/{id}/summary"), None).await;
    assert_eq!(status, StatusCode::OK);

    let last = body["lastPurchases"].as_array().unwrap();
    assert_eq!(last.len(), 4);
    assert_eq!(last[0]["purchaseDate"], "2025-11-05");
    assert_eq!(last[3]["purchaseDate"], "2025-11-02");
    assert_eq!(num(&body["avgLast4UnitPrice"]), 35.0);
}

#[tokio::test]
async fn summary_without_purchases_has_null_average() {
    let app = app();
    let id = create_product(&app, "Pimenta", "kg", 80.0).await;

    let (_, body) = send(&app, Method::GET, &format!("/products/{id}/summary"), None).await;
    assert!(body["avgLast4UnitPrice"].is_null());
    assert_eq!(body["lastPurchases"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn summary_survives_huge_unit_prices() {
    let app = app();
    let id = create_product(&app, "Trufa", "g", 1.0).await;
    for day in 1..=2 {
        let (status, _) = purchase(&app, &id, 1.0, 5e28, &format!("2025-11-0{day}")).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = send(&app, Method::GET, &format!("/products/{id}/summary"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(num(&body["avgLast4UnitPrice"]) > 4.9e28);

    let (status, _) = send(&app, Method::GET, &format!("/products/{id}/history"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn summary_of_missing_product_is_404() {
    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(&app(), Method::GET, &format!("/products/{missing}/summary"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- PATCH ---

#[tokio::test]
async fn patch_updates_only_allowed_fields() {
    let app = app();
    let id = create_product(&app, "Azeite", "un", 30.0).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/products/{id}"),
        Some(json!({ "description": "Azeite extra virgem", "location": "Despensa", "currentQuantity": 99 })),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["description"], "Azeite extra virgem");
    assert_eq!(body["location"], "Despensa");
    assert_eq!(body["unit"], "un");
    assert_eq!(num(&body["currentQuantity"]), 0.0);
}

#[tokio::test]
async fn patch_without_allowed_fields_is_400_and_writes_nothing() {
    let app = app();
    let id = create_product(&app, "Vinagre", "un", 6.0).await;
    let before = get_product(&app, &id).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/products/{id}"),
        Some(json!({ "currentQuantity": 50 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Nenhum campo para atualizar");

    assert_eq!(get_product(&app, &id).await, before);
}

#[tokio::test]
async fn patch_can_clear_nullable_fields() {
    let app = app();
    let id = create_product(&app, "Manteiga", "un", 12.0).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/products/{id}"),
        Some(json!({ "yieldPercent": null })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["yieldPercent"].is_null());
}

#[tokio::test]
async fn patch_with_null_unit_price_is_400() {
    let app = app();
    let id = create_product(&app, "Mel", "un", 25.0).await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/products/{id}"),
        Some(json!({ "unitPrice": null })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("unitPrice"));
    assert_eq!(num(&get_product(&app, &id).await["unitPrice"]), 25.0);
}

#[tokio::test]
async fn patch_missing_product_is_404() {
    let missing = uuid::Uuid::new_v4();
    let (status, _) = send(
        &app(),
        Method::PATCH,
        &format!("/products/{missing}"),
        Some(json!({ "notes": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

// --- Pedidos ---

#[tokio::test]
async fn orders_start_pending_and_are_filtered_by_status() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(json!({
            "tableNumber": 7,
            "customerName": "João",
            "channel": "garcom",
            "items": [{ "name": "X-Burger", "qty": 2 }]
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Pedido criado");
    let id = body["id"].as_str().unwrap().to_string();

    let (status, order) = send(&app, Method::GET, &format!("/orders/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(order["status"], "pendente");
    assert_eq!(order["tableNumber"], 7);
    assert_eq!(order["items"][0]["name"], "X-Burger");
    assert_eq!(order["notes"], "");

    let (_, pending) = send(&app, Method::GET, "/orders", None).await;
    assert_eq!(pending.as_array().unwrap().len(), 1);

    let (_, done) = send(&app, Method::GET, "/orders?status=pronto", None).await;
    assert!(done.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn order_table_label_is_kept_as_sent() {
    let app = app();
    let (status, body) = send(
        &app,
        Method::POST,
        "/orders",
        Some(json!({ "tableNumber": "A3", "items": [] })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);

    let id = body["id"].as_str().unwrap();
    let (_, order) = send(&app, Method::GET, &format!("/orders/{id}"), None).await;
    assert_eq!(order["tableNumber"], "A3");
}

#[tokio::test]
async fn order_with_wrongly_typed_field_is_400_json() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/orders",
        Some(json!({ "customerName": 42 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("customerName"));
}

#[tokio::test]
async fn missing_order_is_404() {
    let missing = uuid::Uuid::new_v4();
    let (status, body) = send(&app(), Method::GET, &format!("/orders/{missing}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Pedido não encontrado");
}

// --- Clientes ---

#[tokio::test]
async fn customer_upsert_creates_then_updates() {
    let app = app();
    let (status, created) = send(
        &app,
        Method::POST,
        "/customers",
        Some(json!({ "name": "Maria", "phone": "5511999990000" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["id"], "5511999990000");
    assert_eq!(created["channel"], "presencial");

    let (status, updated) = send(
        &app,
        Method::POST,
        "/customers",
        Some(json!({ "name": "Maria Souza", "phone": "5511999990000", "channel": "nicochat" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["name"], "Maria Souza");

    let (status, fetched) = send(&app, Method::GET, "/customers/5511999990000", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched["name"], "Maria Souza");
    assert_eq!(fetched["channel"], "nicochat");
    assert_eq!(fetched["createdAt"], created["createdAt"]);
}

#[tokio::test]
async fn customer_without_phone_is_400() {
    let (status, _) = send(&app(), Method::POST, "/customers", Some(json!({ "name": "Ana" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn customers_are_listed_by_name() {
    let app = app();
    for (name, phone) in [("Carlos", "1"), ("Ana", "2"), ("Bruna", "3")] {
        send(&app, Method::POST, "/customers", Some(json!({ "name": name, "phone": phone }))).await;
    }

    let (status, body) = send(&app, Method::GET, "/customers", None).await;
    assert_eq!(status, StatusCode::OK);
    let names: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Ana", "Bruna", "Carlos"]);
}

#[tokio::test]
async fn customer_list_is_capped_at_200() {
    let app = app();
    for i in 0..205 {
        send(
            &app,
            Method::POST,
            "/customers",
            Some(json!({ "name": format!("Cliente {i:03}"), "phone": format!("55{i:05}") })),
        )
        .await;
    }

    let (_, body) = send(&app, Method::GET, "/customers", None).await;
    assert_eq!(body.as_array().unwrap().len(), 200);
}

#[tokio::test]
async fn missing_customer_is_404() {
    let (status, body) = send(&app(), Method::GET, "/customers/000", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Cliente não encontrado");
}

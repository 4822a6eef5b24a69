//! Client tests against an in-process fake backend.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use rust_decimal::Decimal;
use secrecy::SecretString;
use serde_json::{Value, json};
use shopfront_api::{ApiClient, ApiClientConfig, ApiError, ProbeOutcome, diagnostics_endpoints};
use shopfront_core::{LoginRequest, ProductId, ProductInput, UserRole};
use url::Url;

const TOKEN: &str = "good-token";

#[derive(Default)]
struct Hits {
    products: AtomicUsize,
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some("Bearer good-token")
}

fn product_json(id: i32, price: &str) -> Value {
    json!({ "id": id, "name": format!("Product {id}"), "price": price, "stock": 4 })
}

async fn list_products(State(hits): State<Arc<Hits>>) -> Json<Value> {
    hits.products.fetch_add(1, Ordering::SeqCst);
    Json(json!({ "data": [product_json(1, "19.99"), product_json(2, "5.00")], "total": 2 }))
}

async fn get_product(Path(id): Path<i32>) -> Response {
    if id == 1 {
        Json(product_json(1, "19.99")).into_response()
    } else {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "message": "Product not found", "statusCode": 404 })),
        )
            .into_response()
    }
}

async fn update_product(
    headers: HeaderMap,
    Path(id): Path<i32>,
    Json(body): Json<Value>,
) -> Response {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({ "message": "Unauthorized" })))
            .into_response();
    }
    if body["price"].as_f64().is_some_and(|p| p < 0.0) {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "message": ["price must not be less than 0"] })),
        )
            .into_response();
    }
    let mut product = product_json(id, "0");
    product["name"] = body["name"].clone();
    product["price"] = body["price"].clone();
    Json(json!({ "data": product })).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["email"] == "admin@example.com" && body["password"] == "secret" {
        Json(json!({
            "accessToken": TOKEN,
            "user": { "id": 1, "email": "admin@example.com", "name": "Admin", "role": "ADMIN" }
        }))
        .into_response()
    } else {
        (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "message": "Invalid credentials" })),
        )
            .into_response()
    }
}

async fn customers(headers: HeaderMap) -> Response {
    if !authorized(&headers) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    Json(json!([
        { "id": 1, "email": "admin@example.com", "name": "Admin", "role": "admin" },
        { "id": 2, "email": "shopper@example.com", "role": "user" }
    ]))
    .into_response()
}

async fn orders() -> Response {
    (StatusCode::INTERNAL_SERVER_ERROR, "database unavailable").into_response()
}

async fn analytics() -> Response {
    (StatusCode::TOO_MANY_REQUESTS, [(header::RETRY_AFTER, "7")]).into_response()
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok", "uptime": 12.5 }))
}

async fn spawn_backend() -> (Url, Arc<Hits>) {
    let hits = Arc::new(Hits::default());
    let app = Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product).patch(update_product))
        .route("/api/auth/login", post(login))
        .route("/api/users/admin/all", get(customers))
        .route("/api/orders/admin/all", get(orders))
        .route("/api/analytics/dashboard", get(analytics))
        .route("/api/health", get(health))
        .with_state(hits.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (Url::parse(&format!("http://{addr}/api")).unwrap(), hits)
}

async fn client() -> (ApiClient, Arc<Hits>) {
    let (url, hits) = spawn_backend().await;
    (ApiClient::new(&ApiClientConfig::new(url)), hits)
}

fn token() -> SecretString {
    SecretString::from(TOKEN)
}

// =============================================================================
// Catalog
// =============================================================================

#[tokio::test]
async fn test_products_unwraps_data_envelope() {
    let (client, _) = client().await;
    let products = client.products().await.unwrap();
    assert_eq!(products.len(), 2);
    assert_eq!(products[0].price, Decimal::new(1999, 2));
}

#[tokio::test]
async fn test_products_are_cached() {
    let (client, hits) = client().await;
    client.products().await.unwrap();
    client.products().await.unwrap();
    assert_eq!(hits.products.load(Ordering::SeqCst), 1);

    client.clear_cache();
    client.products().await.unwrap();
    assert_eq!(hits.products.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_cache_disabled_with_zero_ttl() {
    let (url, hits) = spawn_backend().await;
    let mut config = ApiClientConfig::new(url);
    config.cache_ttl = std::time::Duration::ZERO;
    let client = ApiClient::new(&config);

    client.products().await.unwrap();
    client.products().await.unwrap();
    assert_eq!(hits.products.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_missing_product_is_not_found() {
    let (client, _) = client().await;
    let err = client.product(ProductId::new(42)).await.unwrap_err();
    assert!(err.is_not_found());
    assert_eq!(err.user_message(), "Product not found");
}

#[tokio::test]
async fn test_update_product_invalidates_list() {
    let (client, hits) = client().await;
    let product = client.product(ProductId::new(1)).await.unwrap();
    client.products().await.unwrap();

    let mut input = ProductInput::from(&product);
    input.name = "Renamed".to_string();
    let updated = client
        .update_product(&token(), product.id, &input)
        .await
        .unwrap();
    assert_eq!(updated.name, "Renamed");

    client.products().await.unwrap();
    assert_eq!(hits.products.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_update_product_validation_message() {
    let (client, _) = client().await;
    let product = client.product(ProductId::new(1)).await.unwrap();
    let mut input = ProductInput::from(&product);
    input.price = Decimal::new(-1, 0);

    let err = client
        .update_product(&token(), product.id, &input)
        .await
        .unwrap_err();
    assert!(err.is_client_error());
    assert_eq!(err.user_message(), "price must not be less than 0");
}

#[tokio::test]
async fn test_update_product_without_valid_token() {
    let (client, _) = client().await;
    let product = client.product(ProductId::new(1)).await.unwrap();
    let err = client
        .update_product(
            &SecretString::from("stale"),
            product.id,
            &ProductInput::from(&product),
        )
        .await
        .unwrap_err();
    assert!(err.is_unauthorized());
}

// =============================================================================
// Auth and admin
// =============================================================================

#[tokio::test]
async fn test_login_success_and_failure() {
    let (client, _) = client().await;

    let session = client
        .login(&LoginRequest {
            email: "admin@example.com".to_string(),
            password: "secret".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(session.access_token, TOKEN);
    assert!(session.user.is_admin());

    let err = client
        .login(&LoginRequest {
            email: "admin@example.com".to_string(),
            password: "wrong".to_string(),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized(ref m) if m == "Invalid credentials"));
}

#[tokio::test]
async fn test_admin_customers_bare_array() {
    let (client, _) = client().await;
    let customers = client.admin_customers(&token()).await.unwrap();
    assert_eq!(customers.len(), 2);
    assert_eq!(customers[1].role, UserRole::Customer);
    assert_eq!(customers[1].display_name(), "shopper");
}

#[tokio::test]
async fn test_server_error_carries_body_text() {
    let (client, _) = client().await;
    let err = client.admin_orders(&token()).await.unwrap_err();
    assert!(matches!(err, ApiError::Status { status: 500, .. }));
    assert_eq!(err.user_message(), "database unavailable");
}

#[tokio::test]
async fn test_rate_limit_reads_retry_after() {
    let (client, _) = client().await;
    let err = client.dashboard_analytics(&token()).await.unwrap_err();
    assert!(matches!(err, ApiError::RateLimited(7)));
}

// =============================================================================
// Diagnostics
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (client, _) = client().await;
    assert!(client.health().await.unwrap().is_healthy());
}

#[tokio::test]
async fn test_probe_outcomes() {
    let (client, _) = client().await;
    let token = token();
    let endpoints = diagnostics_endpoints();
    let find = |path: &str| *endpoints.iter().find(|e| e.path == path).unwrap();

    let health = client.probe(find("/health"), None).await;
    assert_eq!(health.outcome, ProbeOutcome::Healthy);
    assert_eq!(health.status, Some(200));

    let customers = client.probe(find("/users/admin/all"), None).await;
    assert_eq!(customers.outcome, ProbeOutcome::Degraded);

    let customers = client.probe(find("/users/admin/all"), Some(&token)).await;
    assert_eq!(customers.outcome, ProbeOutcome::Healthy);

    let orders = client.probe(find("/orders/admin/all"), Some(&token)).await;
    assert_eq!(orders.outcome, ProbeOutcome::Failing);
    assert_eq!(orders.detail.as_deref(), Some("database unavailable"));
}

#[tokio::test]
async fn test_probe_unreachable() {
    // Bind then drop to get a port with nothing listening
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = ApiClient::new(&ApiClientConfig::new(
        Url::parse(&format!("http://{addr}")).unwrap(),
    ));
    let result = client.probe(diagnostics_endpoints()[0], None).await;
    assert_eq!(result.outcome, ProbeOutcome::Unreachable);
    assert!(result.status.is_none());
    assert!(result.detail.is_some());
}

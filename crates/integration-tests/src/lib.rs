//! End-to-end test harness for Shopfront.
//!
//! Each test gets its own in-process commerce backend on an ephemeral port
//! and real storefront/admin servers pointed at it. Nothing external is
//! needed: `cargo test -p shopfront-integration-tests`.
//!
//! The fake backend keeps its records in memory and speaks the same JSON
//! shapes as the real one, including the `{"data": ...}` envelope and
//! bearer-token checks on admin endpoints.

#![allow(clippy::unwrap_used, clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path as UrlPath, State};
use axum::http::{HeaderMap, StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{Value, json};
use shopfront_api::ApiClientConfig;
use shopfront_core::ShippingPolicy;
use url::Url;

pub const ADMIN_EMAIL: &str = "admin@example.com";
pub const SHOPPER_EMAIL: &str = "shopper@example.com";
pub const PASSWORD: &str = "correct-horse";

const ADMIN_TOKEN: &str = "admin-token";
const SHOPPER_TOKEN: &str = "shopper-token";

// =============================================================================
// Fake backend
// =============================================================================

struct BackendData {
    products: Vec<Value>,
    categories: Vec<Value>,
    next_id: i64,
}

/// Shared state of the fake backend.
#[derive(Clone)]
pub struct Backend {
    data: Arc<Mutex<BackendData>>,
    tokens_revoked: Arc<AtomicBool>,
    pub url: Url,
}

impl Backend {
    /// Start a backend seeded with two categories, four products, orders
    /// and customers.
    pub async fn spawn() -> Self {
        let data = BackendData {
            categories: vec![
                json!({
                    "id": 1,
                    "name": "Bags",
                    "slug": "bags",
                    "description": "Totes and satchels",
                }),
                json!({ "id": 2, "name": "Kitchen", "slug": "kitchen" }),
            ],
            products: vec![
                product(1, "Canvas Tote", "19.99", 5, 1, "active"),
                product(2, "Leather Satchel", "89.00", 2, 1, "active"),
                product(3, "Enamel Mug", "12.50", 0, 2, "active"),
                product(4, "Prototype Kettle", "45.00", 9, 2, "draft"),
            ],
            next_id: 100,
        };

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let backend = Self {
            data: Arc::new(Mutex::new(data)),
            tokens_revoked: Arc::new(AtomicBool::new(false)),
            url: Url::parse(&format!("http://{addr}/api/")).unwrap(),
        };

        let app = Router::new()
            .route("/api/health", get(health))
            .route("/api/auth/login", post(login))
            .route("/api/auth/register", post(register))
            .route("/api/products", get(list_products).post(create_product))
            .route(
                "/api/products/{id}",
                get(get_product).patch(update_product).delete(delete_product),
            )
            .route("/api/categories", get(list_categories).post(create_category))
            .route(
                "/api/categories/{id}",
                get(get_category)
                    .patch(update_category)
                    .delete(delete_category),
            )
            .route("/api/users/admin/all", get(customers))
            .route("/api/orders/admin/all", get(orders))
            .route("/api/analytics/dashboard", get(analytics))
            .with_state(backend.clone());

        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        backend
    }

    /// Make every admin endpoint answer 401 from now on.
    pub fn revoke_tokens(&self) {
        self.tokens_revoked.store(true, Ordering::SeqCst);
    }

    /// Current record for product `id`, if it exists.
    pub fn product(&self, id: i64) -> Option<Value> {
        let data = self.data.lock().unwrap();
        data.products.iter().find(|p| p["id"] == id).cloned()
    }

    pub fn product_named(&self, name: &str) -> Option<Value> {
        let data = self.data.lock().unwrap();
        data.products.iter().find(|p| p["name"] == name).cloned()
    }

    pub fn category_named(&self, name: &str) -> Option<Value> {
        let data = self.data.lock().unwrap();
        data.categories.iter().find(|c| c["name"] == name).cloned()
    }

    fn is_admin(&self, headers: &HeaderMap) -> bool {
        !self.tokens_revoked.load(Ordering::SeqCst)
            && headers
                .get(header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                == Some(format!("Bearer {ADMIN_TOKEN}").as_str())
    }
}

fn product(id: i64, name: &str, price: &str, stock: u32, category: i64, status: &str) -> Value {
    let category_name = if category == 1 { "Bags" } else { "Kitchen" };
    json!({
        "id": id,
        "name": name,
        "description": format!("{name} description"),
        "price": price,
        "stock": stock,
        "categoryId": category,
        "category": { "id": category, "name": category_name },
        "status": status,
        "rating": 4.2,
        "createdAt": format!("2026-0{}-01T12:00:00Z", id.clamp(1, 9)),
    })
}

fn unauthorized() -> Response {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({ "message": "Unauthorized", "statusCode": 401 })),
    )
        .into_response()
}

fn not_found(what: &str) -> Response {
    (
        StatusCode::NOT_FOUND,
        Json(json!({ "message": format!("{what} not found"), "statusCode": 404 })),
    )
        .into_response()
}

fn merge(target: &mut Value, patch: &Value) {
    if let (Some(target), Some(patch)) = (target.as_object_mut(), patch.as_object()) {
        for (key, value) in patch {
            target.insert(key.clone(), value.clone());
        }
    }
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

fn session(token: &str, id: i64, email: &str, name: &str, role: &str) -> Value {
    json!({
        "accessToken": token,
        "user": { "id": id, "email": email, "name": name, "role": role }
    })
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["password"] != PASSWORD {
        return unauthorized();
    }
    match body["email"].as_str() {
        Some(ADMIN_EMAIL) => Json(session(ADMIN_TOKEN, 1, ADMIN_EMAIL, "Avery Admin", "ADMIN"))
            .into_response(),
        Some(SHOPPER_EMAIL) => Json(session(SHOPPER_TOKEN, 2, SHOPPER_EMAIL, "Sam Shopper", "USER"))
            .into_response(),
        _ => unauthorized(),
    }
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == SHOPPER_EMAIL || body["email"] == ADMIN_EMAIL {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Email already registered", "statusCode": 409 })),
        )
            .into_response();
    }
    let email = body["email"].as_str().unwrap_or_default();
    let name = body["name"].as_str().unwrap_or_default();
    (
        StatusCode::CREATED,
        Json(session("new-token", 3, email, name, "USER")),
    )
        .into_response()
}

async fn list_products(State(backend): State<Backend>) -> Json<Value> {
    let data = backend.data.lock().unwrap();
    Json(json!({ "data": data.products, "total": data.products.len() }))
}

async fn get_product(State(backend): State<Backend>, UrlPath(id): UrlPath<i64>) -> Response {
    match backend.product(id) {
        Some(product) => Json(json!({ "data": product })).into_response(),
        None => not_found("Product"),
    }
}

async fn create_product(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    let mut data = backend.data.lock().unwrap();
    data.next_id += 1;
    let mut record = json!({ "id": data.next_id, "createdAt": "2026-10-01T09:00:00Z" });
    merge(&mut record, &body);
    data.products.push(record.clone());
    (StatusCode::CREATED, Json(json!({ "data": record }))).into_response()
}

async fn update_product(
    State(backend): State<Backend>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    let mut data = backend.data.lock().unwrap();
    let Some(record) = data.products.iter_mut().find(|p| p["id"] == id) else {
        return not_found("Product");
    };
    merge(record, &body);
    // The embedded category follows the id it was built from
    if body.get("categoryId").is_some()
        && let Some(fields) = record.as_object_mut()
    {
        fields.remove("category");
    }
    Json(json!({ "data": record.clone() })).into_response()
}

async fn delete_product(
    State(backend): State<Backend>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    let mut data = backend.data.lock().unwrap();
    let before = data.products.len();
    data.products.retain(|p| p["id"] != id);
    if data.products.len() == before {
        return not_found("Product");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn list_categories(State(backend): State<Backend>) -> Json<Value> {
    let data = backend.data.lock().unwrap();
    Json(json!(data.categories))
}

async fn get_category(State(backend): State<Backend>, UrlPath(id): UrlPath<i64>) -> Response {
    let data = backend.data.lock().unwrap();
    match data.categories.iter().find(|c| c["id"] == id) {
        Some(category) => Json(category.clone()).into_response(),
        None => not_found("Category"),
    }
}

async fn create_category(
    State(backend): State<Backend>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    let mut data = backend.data.lock().unwrap();
    if data.categories.iter().any(|c| c["slug"] == body["slug"]) {
        return (
            StatusCode::CONFLICT,
            Json(json!({ "message": "Slug already in use", "statusCode": 409 })),
        )
            .into_response();
    }
    data.next_id += 1;
    let mut record = json!({ "id": data.next_id });
    merge(&mut record, &body);
    data.categories.push(record.clone());
    (StatusCode::CREATED, Json(record)).into_response()
}

async fn update_category(
    State(backend): State<Backend>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
    Json(body): Json<Value>,
) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    let mut data = backend.data.lock().unwrap();
    let Some(record) = data.categories.iter_mut().find(|c| c["id"] == id) else {
        return not_found("Category");
    };
    merge(record, &body);
    Json(record.clone()).into_response()
}

async fn delete_category(
    State(backend): State<Backend>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<i64>,
) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    let mut data = backend.data.lock().unwrap();
    let before = data.categories.len();
    data.categories.retain(|c| c["id"] != id);
    if data.categories.len() == before {
        return not_found("Category");
    }
    StatusCode::NO_CONTENT.into_response()
}

async fn customers(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    Json(json!([
        { "id": 1, "name": "Avery Admin", "email": ADMIN_EMAIL, "role": "ADMIN", "orderCount": 0 },
        { "id": 2, "name": "Sam Shopper", "email": SHOPPER_EMAIL, "role": "USER", "orderCount": 2 },
        { "id": 3, "email": "quiet@example.com", "role": "USER", "orderCount": 0 }
    ]))
    .into_response()
}

fn orders_json() -> Value {
    json!([
        {
            "id": 11, "orderNumber": "1001", "total": 39.98, "status": "delivered",
            "customer": { "name": "Sam Shopper", "email": SHOPPER_EMAIL },
            "items": [{ "productId": 1, "quantity": 2, "price": 19.99 }],
            "createdAt": "2026-08-03T10:00:00Z"
        },
        {
            "id": 12, "orderNumber": "1002", "total": 89.00, "status": "pending",
            "customer": { "name": "Sam Shopper", "email": SHOPPER_EMAIL },
            "items": [{ "productId": 2, "quantity": 1, "price": 89.00 }],
            "createdAt": "2026-09-14T16:30:00Z"
        }
    ])
}

async fn orders(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    Json(json!({ "data": orders_json() })).into_response()
}

async fn analytics(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !backend.is_admin(&headers) {
        return unauthorized();
    }
    Json(json!({
        "totalRevenue": 128.98,
        "totalOrders": 2,
        "totalCustomers": 3,
        "totalProducts": 4,
        "recentOrders": orders_json(),
        "revenueByMonth": [
            { "month": "Aug", "revenue": 39.98 },
            { "month": "Sep", "revenue": 89.00 }
        ]
    }))
    .into_response()
}

// =============================================================================
// Application servers
// =============================================================================

fn static_dir(crate_name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("..")
        .join(crate_name)
        .join("static")
}

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{addr}")
}

/// Start a storefront against `backend`, reading its theme from `theme_path`.
pub async fn spawn_storefront(backend: &Backend, theme_path: &Path) -> String {
    use shopfront_storefront::config::StorefrontConfig;
    use shopfront_storefront::state::AppState;

    let mut api = ApiClientConfig::new(backend.url.clone());
    api.timeout = Duration::from_secs(5);

    let config = StorefrontConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        api,
        theme_path: theme_path.to_path_buf(),
        static_dir: static_dir("storefront"),
        products_per_page: 12,
        shipping: ShippingPolicy::default(),
        sentry_dsn: None,
        sentry_environment: None,
        sentry_traces_sample_rate: 0.0,
    };

    serve(shopfront_storefront::app(AppState::new(config))).await
}

/// Start an admin panel against `backend`, writing its theme to `theme_path`.
pub async fn spawn_admin(backend: &Backend, theme_path: &Path) -> String {
    use shopfront_admin::config::AdminConfig;
    use shopfront_admin::state::AppState;

    let mut api = ApiClientConfig::new(backend.url.clone());
    api.timeout = Duration::from_secs(5);
    api.cache_ttl = Duration::ZERO;

    let config = AdminConfig {
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        base_url: "http://127.0.0.1".to_string(),
        api,
        theme_path: theme_path.to_path_buf(),
        static_dir: static_dir("admin"),
        page_size: 20,
        sentry_dsn: None,
        sentry_environment: None,
        sentry_sample_rate: 0.0,
        sentry_traces_sample_rate: 0.0,
    };

    serve(shopfront_admin::app(AppState::new(config))).await
}

/// Browser-like client: keeps cookies, does not follow redirects so tests
/// can assert on them.
#[must_use]
pub fn browser() -> reqwest::Client {
    reqwest::Client::builder()
        .cookie_store(true)
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap()
}

/// `Location` header of a redirect response.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

/// Sign `client` into the admin panel at `admin_url` as the seeded admin.
pub async fn admin_login(client: &reqwest::Client, admin_url: &str) {
    let response = client
        .post(format!("{admin_url}/auth/login"))
        .form(&[("email", ADMIN_EMAIL), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

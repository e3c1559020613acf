//! Integration test support for the Marketplace storefront client.
//!
//! [`FakeBackend`] is an in-process axum server that speaks the same REST
//! surface as the real Marketplace API: bearer-token login, a fixed product
//! catalogue and one cart per user with stock checks. Each test starts its
//! own backend on `127.0.0.1:0`, so tests run in parallel without sharing
//! state.
//!
//! # Example
//!
//! ```rust,ignore
//! let backend = FakeBackend::start().await;
//! let storefront = backend.storefront();
//! storefront.login(EMAIL, &SecretString::from(PASSWORD)).await?;
//! ```

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{Path, Query, RawQuery, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{delete, get, post},
};
use parking_lot::Mutex;
use serde::Deserialize;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use marketplace_core::{Price, ProductSort};
use marketplace_storefront::{KeyValueStore, MemoryStore, Storefront, StorefrontConfig};

/// Email of the seeded account.
pub const EMAIL: &str = "john.doe@example.com";

/// Password of the seeded account.
pub const PASSWORD: &str = "password123";

/// In stock (5 units), featured, with a compare-at price.
pub const LAMP_ID: &str = "prod-lamp";

/// In stock (10 units).
pub const MUG_ID: &str = "prod-mug";

/// Out of stock.
pub const POSTER_ID: &str = "prod-poster";

// =============================================================================
// Catalogue
// =============================================================================

#[derive(Debug, Clone)]
struct FakeProduct {
    id: &'static str,
    name: &'static str,
    description: &'static str,
    price_cents: i64,
    compare_at_cents: Option<i64>,
    stock: i64,
    rating: f64,
    review_count: i64,
    featured: bool,
    created: u32,
}

impl FakeProduct {
    fn price(&self) -> Price {
        Price::from_cents(self.price_cents)
    }

    fn to_json(&self) -> Value {
        // The sold-out product has no photo.
        let images: Vec<String> = if self.stock > 0 {
            vec![format!("https://cdn.example.com/{}.jpg", self.id)]
        } else {
            Vec::new()
        };
        let mut product = json!({
            "id": self.id,
            "name": self.name,
            "description": self.description,
            "price": self.price(),
            "images": images,
            "stock": self.stock,
            "rating": self.rating,
            "reviewCount": self.review_count,
            "featured": self.featured,
        });
        if let Some(cents) = self.compare_at_cents {
            product["compareAtPrice"] = json!(Price::from_cents(cents));
            product["specifications"] = json!({"Wattage": "9W", "Color": "Brass"});
        }
        product
    }

    fn to_cart_json(&self) -> Value {
        json!({
            "id": self.id,
            "name": self.name,
            "price": self.price(),
            "images": [],
            "stock": self.stock,
        })
    }
}

fn catalogue() -> Vec<FakeProduct> {
    vec![
        FakeProduct {
            id: LAMP_ID,
            name: "Desk Lamp",
            description: "A warm brass desk lamp with a dimmable LED and a weighted base that \
                          keeps it steady on any surface.",
            price_cents: 4999,
            compare_at_cents: Some(5999),
            stock: 5,
            rating: 4.5,
            review_count: 12,
            featured: true,
            created: 1,
        },
        FakeProduct {
            id: MUG_ID,
            name: "Coffee Mug",
            description: "Stoneware mug.",
            price_cents: 800,
            compare_at_cents: None,
            stock: 10,
            rating: 4.0,
            review_count: 3,
            featured: false,
            created: 2,
        },
        FakeProduct {
            id: POSTER_ID,
            name: "Gallery Poster",
            description: "Limited print.",
            price_cents: 1500,
            compare_at_cents: None,
            stock: 0,
            rating: 0.0,
            review_count: 0,
            featured: false,
            created: 3,
        },
    ]
}

// =============================================================================
// FakeBackend
// =============================================================================

#[derive(Default)]
struct BackendState {
    products: Vec<FakeProduct>,
    /// token -> user id
    sessions: Mutex<HashMap<String, String>>,
    /// user id -> lines of (product id, quantity) in insertion order
    carts: Mutex<HashMap<String, Vec<(String, i64)>>>,
    last_query: Mutex<Option<String>>,
    requests: Mutex<Vec<String>>,
}

impl BackendState {
    fn product(&self, id: &str) -> Option<&FakeProduct> {
        self.products.iter().find(|p| p.id == id)
    }

    fn record(&self, request: impl Into<String>) {
        self.requests.lock().push(request.into());
    }

    fn authorize(&self, headers: &HeaderMap) -> Result<String, Response> {
        let token = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.strip_prefix("Bearer "));

        token
            .and_then(|t| self.sessions.lock().get(t).cloned())
            .ok_or_else(|| fail(StatusCode::UNAUTHORIZED, "Not authorized, token failed"))
    }

    fn cart_json(&self, user_id: &str) -> Value {
        let carts = self.carts.lock();
        let lines = carts.get(user_id).map(Vec::as_slice).unwrap_or_default();

        let mut subtotal_cents = 0;
        let items: Vec<Value> = lines
            .iter()
            .filter_map(|(product_id, quantity)| {
                let product = self.product(product_id)?;
                subtotal_cents += product.price_cents * quantity;
                Some(json!({
                    "id": format!("line-{product_id}"),
                    "productId": product_id,
                    "quantity": quantity,
                    "product": product.to_cart_json(),
                }))
            })
            .collect();

        json!({"items": items, "subtotal": Price::from_cents(subtotal_cents)})
    }
}

/// In-process fake of the Marketplace REST API.
pub struct FakeBackend {
    /// Address the server listens on.
    pub addr: SocketAddr,
    state: Arc<BackendState>,
}

impl FakeBackend {
    /// Start a backend with the seeded account and catalogue.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    #[allow(clippy::unwrap_used)]
    pub async fn start() -> Self {
        let state = Arc::new(BackendState {
            products: catalogue(),
            ..Default::default()
        });

        let app = router(state.clone());
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "Fake backend stopped");
            }
        });

        Self { addr, state }
    }

    /// Base URL of the API, e.g. `http://127.0.0.1:53012/api`.
    #[must_use]
    pub fn api_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Storefront client pointing at this backend with an in-memory session.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    pub fn storefront(&self) -> Storefront {
        self.storefront_with_store(Arc::new(MemoryStore::new()))
    }

    /// Storefront client pointing at this backend over `store`.
    ///
    /// # Panics
    ///
    /// Panics if the client cannot be built.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn storefront_with_store(&self, store: Arc<dyn KeyValueStore>) -> Storefront {
        let config = StorefrontConfig::new(&self.api_url(), "/dev/null").unwrap();
        Storefront::new(config, store).unwrap()
    }

    /// Invalidate every issued token, as if they had all expired.
    pub fn expire_sessions(&self) {
        self.state.sessions.lock().clear();
    }

    /// Number of tokens currently valid.
    #[must_use]
    pub fn active_sessions(&self) -> usize {
        self.state.sessions.lock().len()
    }

    /// Raw query string of the most recent `GET /products`.
    #[must_use]
    pub fn last_product_query(&self) -> Option<String> {
        self.state.last_query.lock().clone()
    }

    /// Requests received so far, as `METHOD /path`.
    #[must_use]
    pub fn requests(&self) -> Vec<String> {
        self.state.requests.lock().clone()
    }
}

fn router(state: Arc<BackendState>) -> Router {
    Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
        .route("/api/cart", get(get_cart).post(add_to_cart).delete(clear_cart))
        .route(
            "/api/cart/{product_id}",
            delete(remove_from_cart).put(update_cart_item),
        )
        .with_state(state)
}

// =============================================================================
// Handlers
// =============================================================================

fn ok(data: Value) -> Response {
    Json(json!({"success": true, "data": data})).into_response()
}

fn done(message: &str) -> Response {
    Json(json!({"success": true, "message": message})).into_response()
}

fn fail(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({"success": false, "message": message}))).into_response()
}

#[derive(Deserialize)]
struct LoginBody {
    email: String,
    password: String,
}

async fn login(State(state): State<Arc<BackendState>>, Json(body): Json<LoginBody>) -> Response {
    state.record("POST /auth/login");
    if body.email != EMAIL || body.password != PASSWORD {
        return fail(StatusCode::UNAUTHORIZED, "Invalid email or password");
    }

    let token = uuid::Uuid::new_v4().to_string();
    state.sessions.lock().insert(token.clone(), "user-1".to_string());

    ok(json!({
        "token": token,
        "user": {"id": "user-1", "email": EMAIL, "name": "John Doe", "role": "customer"},
    }))
}

async fn list_products(
    State(state): State<Arc<BackendState>>,
    RawQuery(raw): RawQuery,
    Query(params): Query<HashMap<String, String>>,
) -> Response {
    state.record("GET /products");
    *state.last_query.lock() = raw;

    let search = params.get("search").map(|s| s.to_lowercase());
    let min = params.get("minPrice").and_then(|v| v.parse::<Price>().ok());
    let max = params.get("maxPrice").and_then(|v| v.parse::<Price>().ok());
    let featured = params.get("featured").is_some_and(|v| v == "true");

    let mut products: Vec<&FakeProduct> = state
        .products
        .iter()
        .filter(|p| search.as_ref().is_none_or(|s| p.name.to_lowercase().contains(s)))
        .filter(|p| min.is_none_or(|min| p.price() >= min))
        .filter(|p| max.is_none_or(|max| p.price() <= max))
        .filter(|p| !featured || p.featured)
        .collect();

    match params.get("sort").and_then(|s| s.parse::<ProductSort>().ok()) {
        Some(ProductSort::PriceAsc) => products.sort_by_key(|p| p.price_cents),
        Some(ProductSort::PriceDesc) => products.sort_by_key(|p| std::cmp::Reverse(p.price_cents)),
        Some(ProductSort::Rating) => products.sort_by(|a, b| b.rating.total_cmp(&a.rating)),
        Some(ProductSort::Newest) => products.sort_by_key(|p| std::cmp::Reverse(p.created)),
        None => {}
    }

    let products: Vec<Value> = products.into_iter().map(FakeProduct::to_json).collect();
    ok(json!({"products": products}))
}

async fn get_product(State(state): State<Arc<BackendState>>, Path(id): Path<String>) -> Response {
    state.record(format!("GET /products/{id}"));
    state
        .product(&id)
        .map_or_else(|| fail(StatusCode::NOT_FOUND, "Product not found"), |p| ok(p.to_json()))
}

async fn get_cart(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.record("GET /cart");
    match state.authorize(&headers) {
        Ok(user_id) => ok(state.cart_json(&user_id)),
        Err(rejection) => rejection,
    }
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AddBody {
    product_id: String,
    quantity: i64,
}

async fn add_to_cart(
    State(state): State<Arc<BackendState>>,
    headers: HeaderMap,
    Json(body): Json<AddBody>,
) -> Response {
    state.record(format!("POST /cart {} {}", body.product_id, body.quantity));
    let user_id = match state.authorize(&headers) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection,
    };
    let Some(product) = state.product(&body.product_id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    if body.quantity < 1 {
        return fail(StatusCode::BAD_REQUEST, "Quantity must be at least 1");
    }

    let mut carts = state.carts.lock();
    let lines = carts.entry(user_id).or_default();
    let existing = lines
        .iter()
        .find(|(id, _)| id == product.id)
        .map_or(0, |(_, q)| *q);

    if existing + body.quantity > product.stock {
        return fail(
            StatusCode::BAD_REQUEST,
            &format!("Only {} left in stock", product.stock),
        );
    }

    match lines.iter_mut().find(|(id, _)| id == product.id) {
        Some((_, quantity)) => *quantity += body.quantity,
        None => lines.push((product.id.to_string(), body.quantity)),
    }
    done("Item added to cart")
}

#[derive(Deserialize)]
struct UpdateBody {
    quantity: i64,
}

async fn update_cart_item(
    State(state): State<Arc<BackendState>>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
    Json(body): Json<UpdateBody>,
) -> Response {
    state.record(format!("PUT /cart/{product_id} {}", body.quantity));
    let user_id = match state.authorize(&headers) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection,
    };
    let Some(product) = state.product(&product_id) else {
        return fail(StatusCode::NOT_FOUND, "Product not found");
    };
    if body.quantity < 1 {
        return fail(StatusCode::BAD_REQUEST, "Quantity must be at least 1");
    }
    if body.quantity > product.stock {
        return fail(
            StatusCode::BAD_REQUEST,
            &format!("Only {} left in stock", product.stock),
        );
    }

    let mut carts = state.carts.lock();
    match carts
        .entry(user_id)
        .or_default()
        .iter_mut()
        .find(|(id, _)| *id == product_id)
    {
        Some((_, quantity)) => {
            *quantity = body.quantity;
            done("Cart updated")
        }
        None => fail(StatusCode::NOT_FOUND, "Item not found in cart"),
    }
}

async fn remove_from_cart(
    State(state): State<Arc<BackendState>>,
    Path(product_id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.record(format!("DELETE /cart/{product_id}"));
    let user_id = match state.authorize(&headers) {
        Ok(user_id) => user_id,
        Err(rejection) => return rejection,
    };

    let mut carts = state.carts.lock();
    let lines = carts.entry(user_id).or_default();
    let before = lines.len();
    lines.retain(|(id, _)| *id != product_id);

    if lines.len() == before {
        fail(StatusCode::NOT_FOUND, "Item not found in cart")
    } else {
        done("Item removed from cart")
    }
}

async fn clear_cart(State(state): State<Arc<BackendState>>, headers: HeaderMap) -> Response {
    state.record("DELETE /cart");
    match state.authorize(&headers) {
        Ok(user_id) => {
            state.carts.lock().remove(&user_id);
            done("Cart cleared")
        }
        Err(rejection) => rejection,
    }
}

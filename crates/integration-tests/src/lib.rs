//! End-to-end test harness for the Emporium storefront.
//!
//! [`MockCatalog`] serves the catalog REST API from memory and records what
//! it receives. [`TestStorefront`] runs the real storefront router against it
//! and drives it with a cookie-keeping HTTP client, one per visitor.
//!
//! Both bind to `127.0.0.1:0`, so tests can run in parallel.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post},
};
use reqwest::{Client, redirect};
use secrecy::SecretString;
use serde_json::{Value, json};
use tokio::net::TcpListener;

use emporium_storefront::config::{CatalogConfig, StorefrontConfig};
use emporium_storefront::state::AppState;

// =============================================================================
// Mock Catalog
// =============================================================================

#[derive(Default)]
struct CatalogState {
    products: Mutex<Vec<Value>>,
    created: Mutex<Vec<Value>>,
    list_calls: AtomicUsize,
    fail_deletes: AtomicBool,
    next_id: AtomicUsize,
}

fn locked<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().expect("mock catalog lock poisoned")
}

/// In-memory stand-in for the catalog backend.
#[derive(Clone)]
pub struct MockCatalog {
    addr: SocketAddr,
    state: Arc<CatalogState>,
}

impl MockCatalog {
    /// Start a catalog serving `products`.
    pub async fn start(products: Vec<Value>) -> Self {
        let state = Arc::new(CatalogState {
            products: Mutex::new(products),
            ..CatalogState::default()
        });

        let router = Router::new()
            .route("/api/getproduct", get(list_products))
            .route("/api/postProduct", post(create_product))
            .route("/api/deleteProduct/{id}", delete(delete_product))
            .with_state(Arc::clone(&state));

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind mock catalog");
        let addr = listener.local_addr().expect("Failed to read mock catalog address");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Mock catalog server failed");
        });

        Self { addr, state }
    }

    /// Base URL the storefront should be pointed at.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/", self.addr)
    }

    /// Number of listing requests served so far.
    #[must_use]
    pub fn list_calls(&self) -> usize {
        self.state.list_calls.load(Ordering::SeqCst)
    }

    /// Request bodies received by the create endpoint.
    #[must_use]
    pub fn created(&self) -> Vec<Value> {
        locked(&self.state.created).clone()
    }

    /// Products currently held by the catalog.
    #[must_use]
    pub fn products(&self) -> Vec<Value> {
        locked(&self.state.products).clone()
    }

    /// Make every delete request fail with a 500 and leave the data untouched.
    pub fn fail_deletes(&self, fail: bool) {
        self.state.fail_deletes.store(fail, Ordering::SeqCst);
    }
}

async fn list_products(State(state): State<Arc<CatalogState>>) -> Json<Vec<Value>> {
    state.list_calls.fetch_add(1, Ordering::SeqCst);
    Json(locked(&state.products).clone())
}

async fn create_product(
    State(state): State<Arc<CatalogState>>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    locked(&state.created).push(body.clone());

    let id = format!("new{}", state.next_id.fetch_add(1, Ordering::SeqCst));
    let mut product = body;
    if let Some(fields) = product.as_object_mut() {
        fields.insert("_id".to_string(), json!(id));
    }
    locked(&state.products).push(product.clone());

    (StatusCode::CREATED, Json(product))
}

async fn delete_product(
    State(state): State<Arc<CatalogState>>,
    Path(id): Path<String>,
) -> (StatusCode, Json<Value>) {
    if state.fail_deletes.load(Ordering::SeqCst) {
        return (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "message": "delete failed" })),
        );
    }

    locked(&state.products).retain(|product| product["_id"] != id.as_str());
    (StatusCode::OK, Json(json!({ "message": "deleted" })))
}

/// A catalog product record as the backend returns it.
#[must_use]
pub fn product(id: &str, name: &str, price: u32) -> Value {
    json!({
        "_id": id,
        "name": name,
        "description": format!("{name} for every room"),
        "price": price,
        "image": format!("https://img.example/{id}.jpg"),
        "category": "home",
        "stock": 12,
        "createdAt": "2024-03-01T10:00:00.000Z",
        "__v": 0
    })
}

// =============================================================================
// Storefront
// =============================================================================

/// A running storefront wired to a [`MockCatalog`].
pub struct TestStorefront {
    base_url: String,
    pub catalog: MockCatalog,
}

impl TestStorefront {
    /// Start a storefront in front of a catalog holding `products`.
    pub async fn start(products: Vec<Value>) -> Self {
        let catalog = MockCatalog::start(products).await;

        let config = StorefrontConfig {
            host: [127, 0, 0, 1].into(),
            port: 0,
            base_url: "http://localhost".to_string(),
            session_secret: SecretString::from("emporium-integration-".repeat(4)),
            login_delay: Duration::ZERO,
            catalog: CatalogConfig::new(&catalog.url()).expect("Invalid mock catalog URL"),
            sentry_dsn: None,
            sentry_environment: None,
        };
        let state = AppState::new(config).expect("Failed to build app state");
        let router = emporium_storefront::app(state).expect("Failed to build router");

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind storefront");
        let addr = listener.local_addr().expect("Failed to read storefront address");
        tokio::spawn(async move {
            axum::serve(listener, router)
                .await
                .expect("Storefront server failed");
        });

        Self {
            base_url: format!("http://{addr}"),
            catalog,
        }
    }

    /// Absolute URL for a storefront path.
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    /// A new visitor: its own cookie jar, redirects not followed.
    #[must_use]
    pub fn visitor(&self) -> Client {
        Client::builder()
            .cookie_store(true)
            .redirect(redirect::Policy::none())
            .build()
            .expect("Failed to create HTTP client")
    }

    /// A visitor that has already signed in as `name`.
    pub async fn signed_in_visitor(&self, name: &str) -> Client {
        let client = self.visitor();
        let response = client
            .post(self.url("/login"))
            .form(&[("email", name), ("password", "hunter2")])
            .send()
            .await
            .expect("Login request failed");
        assert_eq!(response.status(), reqwest::StatusCode::SEE_OTHER);
        client
    }
}

/// Extract the `Location` header of a redirect response.
#[must_use]
pub fn location(response: &reqwest::Response) -> String {
    response
        .headers()
        .get(reqwest::header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string()
}

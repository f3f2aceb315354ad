//! Shared fixtures for integration tests
//!
//! Runs a small storefront API on a local port so the reqwest client and
//! the cache are exercised over real HTTP.

#![allow(dead_code)]

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use storefront_cache::Config;
use tokio::net::TcpListener;

static TRACING: Once = Once::new();

/// Installs a test-friendly subscriber once per test binary.
pub fn init_tracing() {
    TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "storefront_cache=debug".into()),
            )
            .with_test_writer()
            .try_init();
    });
}

// == Fixture Storefront ==
/// Shared state of the fixture API.
#[derive(Clone, Default)]
pub struct Storefront {
    /// GET requests served, successful or not
    pub reads: Arc<AtomicUsize>,
    /// When set, every request answers 500
    pub failing: Arc<AtomicBool>,
}

impl Storefront {
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
}

fn catalog() -> Vec<Value> {
    vec![
        json!({"id": 1, "name": "Oxford Shirt", "price": 39.0, "category": "shirts", "featured": true, "stock": 4}),
        json!({"id": 2, "name": "Runner", "price": 89.5, "category": "shoes", "featured": false, "stock": 10}),
        json!({"id": 3, "name": "Trail Boot", "price": 120.0, "category": "shoes", "featured": true, "stock": 2}),
    ]
}

async fn list_products(
    State(store): State<Storefront>,
    Query(query): Query<HashMap<String, String>>,
) -> Result<Json<Value>, StatusCode> {
    store.reads.fetch_add(1, Ordering::SeqCst);
    if store.failing.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }

    let limit = query
        .get("limit")
        .and_then(|l| l.parse::<usize>().ok())
        .unwrap_or(usize::MAX);
    let products: Vec<Value> = catalog()
        .into_iter()
        .filter(|p| match query.get("category") {
            Some(category) => p["category"] == category.as_str(),
            None => true,
        })
        .filter(|p| query.get("featured").map_or(true, |_| p["featured"] == true))
        .take(limit)
        .collect();
    Ok(Json(Value::Array(products)))
}

async fn get_product(
    State(store): State<Storefront>,
    Path(id): Path<u64>,
) -> Result<Json<Value>, StatusCode> {
    store.reads.fetch_add(1, Ordering::SeqCst);
    if store.failing.load(Ordering::SeqCst) {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    catalog()
        .into_iter()
        .find(|p| p["id"] == id)
        .map(Json)
        .ok_or(StatusCode::NOT_FOUND)
}

async fn update_product(
    Path(id): Path<u64>,
    Json(changes): Json<Value>,
) -> Result<Json<Value>, StatusCode> {
    let mut product = catalog()
        .into_iter()
        .find(|p| p["id"] == id)
        .ok_or(StatusCode::NOT_FOUND)?;
    if let (Some(target), Some(changes)) = (product.as_object_mut(), changes.as_object()) {
        for (field, value) in changes {
            target.insert(field.clone(), value.clone());
        }
    }
    Ok(Json(product))
}

/// Starts the fixture API on an ephemeral port.
pub async fn spawn_storefront() -> (SocketAddr, Storefront) {
    init_tracing();

    let store = Storefront::default();
    let app = Router::new()
        .route("/api/products", get(list_products))
        .route("/api/products/:id", get(get_product).put(update_product))
        .with_state(store.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (addr, store)
}

/// Configuration pointing the client at `addr`.
pub fn config_for(addr: SocketAddr) -> Config {
    Config {
        api_base_url: format!("http://{}/api", addr),
        api_timeout_secs: 5,
        ..Config::default()
    }
}

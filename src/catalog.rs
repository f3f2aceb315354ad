//! Product Catalog Module
//!
//! Storefront product reads served through the caching fetcher, plus the
//! cache management surface (size, targeted clear, full clear).

use std::sync::Arc;
use std::time::Duration;

use serde_json::{json, Value};
use tracing::info;

use crate::cache::TtlCache;
use crate::config::Config;
use crate::error::{FetchError, Result};
use crate::fetch::{CachingFetcher, HttpClient, Method, ReqwestClient};
use crate::models::{CacheReport, Product, ProductFilter, ProductUpdate};
use crate::storage::KeyValueStore;

// == Operation Tags ==
/// Tag for product list and search queries.
pub const PRODUCTS_OPERATION: &str = "products";
/// Tag for single product lookups.
pub const PRODUCT_OPERATION: &str = "product";
/// Tag for featured product subsets.
pub const FEATURED_OPERATION: &str = "featured_products";

/// Every tag whose entries a product mutation can make stale.
pub const PRODUCT_OPERATIONS: [&str; 3] =
    [PRODUCTS_OPERATION, PRODUCT_OPERATION, FEATURED_OPERATION];

// == Cache Policy ==
/// TTL per operation class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CachePolicy {
    pub list_ttl: Duration,
    pub detail_ttl: Duration,
    pub featured_ttl: Duration,
}

impl CachePolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            list_ttl: Duration::from_secs(config.products_ttl_secs),
            detail_ttl: Duration::from_secs(config.product_detail_ttl_secs),
            featured_ttl: Duration::from_secs(config.featured_ttl_secs),
        }
    }
}

impl Default for CachePolicy {
    fn default() -> Self {
        Self {
            list_ttl: Duration::from_secs(15 * 60),
            detail_ttl: Duration::from_secs(30 * 60),
            featured_ttl: Duration::from_secs(20 * 60),
        }
    }
}

// == Product Catalog ==
/// Product reads and cache management for the storefront.
#[derive(Clone)]
pub struct ProductCatalog {
    fetcher: CachingFetcher,
    policy: CachePolicy,
}

impl ProductCatalog {
    // == Constructor ==
    pub fn new(fetcher: CachingFetcher, policy: CachePolicy) -> Self {
        Self { fetcher, policy }
    }

    /// Wires a reqwest client and a cache over `storage` from configuration.
    pub fn from_config(config: &Config, storage: Arc<dyn KeyValueStore>) -> Result<Self> {
        let client: Arc<dyn HttpClient> = Arc::new(ReqwestClient::from_config(config)?);
        let cache = Arc::new(TtlCache::from_config(storage, config));
        Ok(Self::new(
            CachingFetcher::new(client, cache),
            CachePolicy::from_config(config),
        ))
    }

    pub fn policy(&self) -> CachePolicy {
        self.policy
    }

    pub fn fetcher(&self) -> &CachingFetcher {
        &self.fetcher
    }

    // == Reads ==
    /// Products matching `filter`.
    pub async fn products(&self, filter: &ProductFilter) -> Result<Vec<Product>> {
        self.fetcher
            .fetch_cached(PRODUCTS_OPERATION, "/products", filter, self.policy.list_ttl)
            .await
    }

    /// One product by id.
    ///
    /// The id travels in the path; the entry is keyed `product_{"id":<id>}`.
    pub async fn product(&self, id: u64) -> Result<Product> {
        self.fetcher
            .fetch_cached_with_query(
                PRODUCT_OPERATION,
                &json!({ "id": id }),
                &format!("/products/{}", id),
                &Value::Null,
                self.policy.detail_ttl,
            )
            .await
    }

    /// Up to `limit` featured products.
    pub async fn featured_products(&self, limit: u32) -> Result<Vec<Product>> {
        self.fetcher
            .fetch_cached(
                FEATURED_OPERATION,
                "/products",
                &json!({"featured": true, "limit": limit}),
                self.policy.featured_ttl,
            )
            .await
    }

    // == Mutations ==
    /// Applies an administrative update, then drops product-related entries.
    ///
    /// Nothing is invalidated if the update itself fails.
    pub async fn update_product(&self, id: u64, update: &ProductUpdate) -> Result<Product> {
        if let Some(message) = update.validate() {
            return Err(FetchError::InvalidParams(message));
        }

        let body =
            serde_json::to_value(update).map_err(|e| FetchError::InvalidParams(e.to_string()))?;
        let response = self
            .fetcher
            .client()
            .send(Method::PUT, &format!("/products/{}", id), Some(&body))
            .await?;
        let product: Product = serde_json::from_value(response).map_err(FetchError::Decode)?;

        self.clear_product_cache().await;
        Ok(product)
    }

    // == Cache Management ==
    /// Stored cache entries, expired ones included.
    pub async fn cache_size(&self) -> usize {
        self.fetcher.cache().size().await
    }

    /// Removes product list, detail and featured entries only.
    pub async fn clear_product_cache(&self) -> bool {
        match self.fetcher.invalidate_operations(&PRODUCT_OPERATIONS).await {
            Some(removed) => {
                info!("Cleared {} product cache entries", removed);
                true
            }
            None => false,
        }
    }

    /// Removes every cache entry.
    pub async fn clear_all_cache(&self) -> bool {
        self.fetcher.cache().clear().await
    }

    /// Size, counters and hit rate for diagnostics.
    pub async fn cache_report(&self) -> CacheReport {
        CacheReport::new(self.fetcher.cache().stats().await)
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::ManualClock;
    use crate::storage::MemoryStorage;
    use crate::fetch::query_pairs;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// In-process storefront recording every request path.
    ///
    /// Reads flatten their params like the reqwest client does.
    #[derive(Default)]
    struct FakeStorefront {
        requests: Mutex<Vec<String>>,
    }

    impl FakeStorefront {
        fn requests(&self) -> Vec<String> {
            self.requests.lock().unwrap().clone()
        }
    }

    fn shirt(id: u64) -> Value {
        json!({"id": id, "name": format!("Shirt {}", id), "price": 19.99, "featured": id % 2 == 0})
    }

    #[async_trait]
    impl HttpClient for FakeStorefront {
        async fn fetch(&self, path: &str, params: &Value) -> Result<Value> {
            query_pairs(params)?;
            self.requests.lock().unwrap().push(format!("GET {} {}", path, params));
            match path.strip_prefix("/products/") {
                Some(id) => Ok(shirt(id.parse().unwrap_or(0))),
                None => Ok(json!([shirt(1), shirt(2)])),
            }
        }

        async fn send(&self, method: Method, path: &str, body: Option<&Value>) -> Result<Value> {
            self.requests.lock().unwrap().push(format!("{} {}", method, path));
            let mut product = shirt(1);
            if let Some(name) = body.and_then(|b| b.get("name")) {
                product["name"] = name.clone();
            }
            Ok(product)
        }
    }

    fn catalog() -> (ProductCatalog, Arc<FakeStorefront>, Arc<MemoryStorage>, ManualClock) {
        let api = Arc::new(FakeStorefront::default());
        let storage = Arc::new(MemoryStorage::new());
        let clock = ManualClock::new(0);
        let cache = Arc::new(TtlCache::new(storage.clone()).with_clock(Arc::new(clock.clone())));
        let catalog = ProductCatalog::new(
            CachingFetcher::new(api.clone(), cache),
            CachePolicy::default(),
        );
        (catalog, api, storage, clock)
    }

    #[tokio::test]
    async fn test_products_cached_under_products_key() {
        let (catalog, api, storage, _) = catalog();

        let first = catalog.products(&ProductFilter::default()).await.unwrap();
        let second = catalog.products(&ProductFilter::default()).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(api.requests().len(), 1);
        assert!(storage
            .get_item("@ecommerce_cache_products_{}")
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_product_detail_outlives_list() {
        let (catalog, api, _, clock) = catalog();
        catalog.products(&ProductFilter::default()).await.unwrap();
        catalog.product(7).await.unwrap();

        // Past 15 minutes: list is stale, detail is not
        clock.advance(16 * 60 * 1000);
        catalog.products(&ProductFilter::default()).await.unwrap();
        let product = catalog.product(7).await.unwrap();

        assert_eq!(product.id, 7);
        assert_eq!(api.requests().len(), 3);
    }

    #[tokio::test]
    async fn test_featured_uses_own_ttl() {
        let (catalog, api, _, clock) = catalog();
        catalog.featured_products(4).await.unwrap();

        clock.advance(19 * 60 * 1000);
        catalog.featured_products(4).await.unwrap();
        assert_eq!(api.requests().len(), 1);

        clock.advance(2 * 60 * 1000);
        catalog.featured_products(4).await.unwrap();
        assert_eq!(api.requests().len(), 2);
    }

    #[tokio::test]
    async fn test_filters_are_cached_separately() {
        let (catalog, api, _, _) = catalog();
        catalog.products(&ProductFilter::category("shirts")).await.unwrap();
        catalog.products(&ProductFilter::category("hats")).await.unwrap();
        catalog.products(&ProductFilter::category("shirts")).await.unwrap();

        assert_eq!(api.requests().len(), 2);
        assert_eq!(catalog.cache_size().await, 2);
    }

    #[tokio::test]
    async fn test_clear_product_cache_keeps_other_entries() {
        let (catalog, _, storage, _) = catalog();
        storage.set_item("auth_token", "t".to_string()).await.unwrap();
        catalog.products(&ProductFilter::default()).await.unwrap();
        catalog.product(1).await.unwrap();
        catalog.featured_products(2).await.unwrap();
        catalog
            .fetcher()
            .cache()
            .set("settings", &json!({"currency": "USD"}), Duration::from_secs(60))
            .await;

        assert!(catalog.clear_product_cache().await);

        assert_eq!(catalog.cache_size().await, 1);
        assert!(catalog.fetcher().cache().has("settings").await);
        assert!(storage.get_item("auth_token").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_product_detail_sends_no_query() {
        let (catalog, api, storage, _) = catalog();

        let product = catalog.product(3).await.unwrap();

        assert_eq!(product.id, 3);
        assert_eq!(api.requests(), vec!["GET /products/3 null".to_string()]);
        assert!(storage
            .get_item(r#"@ecommerce_cache_product_{"id":3}"#)
            .await
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn test_product_details_cached_per_id() {
        let (catalog, api, _, _) = catalog();
        catalog.product(1).await.unwrap();
        catalog.product(2).await.unwrap();
        catalog.product(1).await.unwrap();

        assert_eq!(api.requests().len(), 2);
        assert_eq!(catalog.cache_size().await, 2);
    }

    #[tokio::test]
    async fn test_clear_product_cache_keeps_similar_tags() {
        let (catalog, _, _, _) = catalog();
        let cache = catalog.fetcher().cache();
        catalog.product(1).await.unwrap();
        cache.set(r#"product_reviews_{"id":1}"#, &json!([]), Duration::from_secs(60)).await;
        cache.set("product_settings", &json!({"grid": true}), Duration::from_secs(60)).await;

        assert!(catalog.clear_product_cache().await);

        assert_eq!(catalog.cache_size().await, 2);
        assert!(cache.has(r#"product_reviews_{"id":1}"#).await);
        assert!(cache.has("product_settings").await);
    }

    #[tokio::test]
    async fn test_clear_all_cache() {
        let (catalog, _, storage, _) = catalog();
        storage.set_item("theme", "dark".to_string()).await.unwrap();
        catalog.products(&ProductFilter::default()).await.unwrap();
        catalog.product(1).await.unwrap();

        assert!(catalog.clear_all_cache().await);
        assert_eq!(catalog.cache_size().await, 0);
        assert_eq!(storage.len().await, 1);
    }

    #[tokio::test]
    async fn test_update_invalidates_product_entries() {
        let (catalog, api, _, _) = catalog();
        catalog.product(1).await.unwrap();
        catalog.products(&ProductFilter::default()).await.unwrap();

        let update = ProductUpdate {
            name: Some("Linen Shirt".to_string()),
            ..ProductUpdate::default()
        };
        let updated = catalog.update_product(1, &update).await.unwrap();

        assert_eq!(updated.name, "Linen Shirt");
        assert_eq!(catalog.cache_size().await, 0);

        catalog.product(1).await.unwrap();
        assert_eq!(api.requests().len(), 4);
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected_before_network() {
        let (catalog, api, _, _) = catalog();
        catalog.product(1).await.unwrap();

        let update = ProductUpdate {
            price: Some(-3.0),
            ..ProductUpdate::default()
        };
        let result = catalog.update_product(1, &update).await;

        assert!(matches!(result, Err(FetchError::InvalidParams(_))));
        assert_eq!(api.requests().len(), 1);
        assert_eq!(catalog.cache_size().await, 1);
    }

    #[tokio::test]
    async fn test_cache_report() {
        let (catalog, _, _, _) = catalog();
        catalog.product(1).await.unwrap(); // miss
        catalog.product(1).await.unwrap(); // hit

        let report = catalog.cache_report().await;
        assert_eq!(report.size, 1);
        assert_eq!(report.stats.hits, 1);
        assert_eq!(report.stats.misses, 1);
        assert!((report.hit_rate - 0.5).abs() < 0.001);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = CachePolicy::from_config(&Config::default());
        assert_eq!(policy, CachePolicy::default());
    }
}

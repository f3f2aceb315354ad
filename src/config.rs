//! Configuration Module
//!
//! Handles loading cache and API client configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Default namespace prefix for every persisted cache key.
pub const DEFAULT_NAMESPACE: &str = "@ecommerce_cache_";

/// Cache and client configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Prefix prepended to every cache key in shared storage
    pub namespace: String,
    /// File backing the persistent store, None = in-memory only
    pub storage_path: Option<PathBuf>,
    /// Base URL of the storefront REST API
    pub api_base_url: String,
    /// Per-request timeout in seconds
    pub api_timeout_secs: u64,
    /// TTL for list/search queries in seconds
    pub products_ttl_secs: u64,
    /// TTL for single product lookups in seconds
    pub product_detail_ttl_secs: u64,
    /// TTL for featured product subsets in seconds
    pub featured_ttl_secs: u64,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_NAMESPACE` - Key prefix (default: `@ecommerce_cache_`)
    /// - `CACHE_STORAGE_PATH` - Persistent store file (default: unset, in-memory)
    /// - `API_BASE_URL` - Storefront API root (default: `http://localhost:5000/api`)
    /// - `API_TIMEOUT_SECS` - Request timeout (default: 10)
    /// - `PRODUCTS_TTL_SECS` - List query TTL (default: 900)
    /// - `PRODUCT_DETAIL_TTL_SECS` - Detail lookup TTL (default: 1800)
    /// - `FEATURED_TTL_SECS` - Featured subset TTL (default: 1200)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            namespace: env::var("CACHE_NAMESPACE")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.namespace),
            storage_path: env::var("CACHE_STORAGE_PATH")
                .ok()
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            api_base_url: env::var("API_BASE_URL")
                .ok()
                .filter(|v| !v.is_empty())
                .unwrap_or(defaults.api_base_url),
            api_timeout_secs: parse_var("API_TIMEOUT_SECS").unwrap_or(defaults.api_timeout_secs),
            products_ttl_secs: parse_var("PRODUCTS_TTL_SECS")
                .unwrap_or(defaults.products_ttl_secs),
            product_detail_ttl_secs: parse_var("PRODUCT_DETAIL_TTL_SECS")
                .unwrap_or(defaults.product_detail_ttl_secs),
            featured_ttl_secs: parse_var("FEATURED_TTL_SECS")
                .unwrap_or(defaults.featured_ttl_secs),
        }
    }

    /// Request timeout as a Duration.
    pub fn api_timeout(&self) -> Duration {
        Duration::from_secs(self.api_timeout_secs)
    }
}

fn parse_var(name: &str) -> Option<u64> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

impl Default for Config {
    fn default() -> Self {
        Self {
            namespace: DEFAULT_NAMESPACE.to_string(),
            storage_path: None,
            api_base_url: "http://localhost:5000/api".to_string(),
            api_timeout_secs: 10,
            products_ttl_secs: 15 * 60,
            product_detail_ttl_secs: 30 * 60,
            featured_ttl_secs: 20 * 60,
        }
    }
}

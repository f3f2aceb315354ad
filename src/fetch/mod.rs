//! Fetch Module
//!
//! Network client abstraction and the read-through caching fetcher.

mod client;
mod fetcher;
mod key;

pub use client::{HttpClient, ReqwestClient};
pub use fetcher::CachingFetcher;
pub use key::derive_key;

#[cfg(test)]
pub(crate) use client::query_pairs;
pub(crate) use key::is_operation_key;

// Re-exported so `HttpClient` implementors need not depend on reqwest directly
pub use reqwest::Method;

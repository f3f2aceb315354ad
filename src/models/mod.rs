//! Storefront data models
//!
//! Payloads exchanged with the storefront API and reported by the cache
//! management surface.

pub mod product;
pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use product::Product;
pub use requests::{ProductFilter, ProductUpdate};
pub use responses::CacheReport;
